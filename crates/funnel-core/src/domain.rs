use std::fmt;

/// Numeric id of the person pressing buttons; the record store key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id={}", self.0)
    }
}

/// Where a message goes: a private chat, the base channel (negative) or the report chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// The message a button hangs off; deleted once the press is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

impl From<UserId> for ChatId {
    /// Private chats share their id with the user.
    fn from(u: UserId) -> Self {
        ChatId(u.0)
    }
}
