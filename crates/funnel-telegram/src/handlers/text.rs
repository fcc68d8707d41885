use teloxide::types::{Chat, Message, User};

use funnel_core::{
    domain::{ChatId, UserId},
    messaging::types::{ChatKind, Sender, TextMessage},
};

pub(crate) fn chat_kind(chat: &Chat) -> ChatKind {
    if chat.is_private() {
        ChatKind::Private
    } else if chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Group
    }
}

pub(crate) fn sender(user: &User) -> Sender {
    Sender {
        user_id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()).filter(|n| !n.is_empty()),
    }
}

/// Core view of a text message. Messages without text or without a sender are skipped.
pub fn text_message(msg: &Message) -> Option<TextMessage> {
    let user = msg.from()?;
    let text = msg.text()?;

    Some(TextMessage {
        chat_id: ChatId(msg.chat.id.0),
        chat_kind: chat_kind(&msg.chat),
        from: sender(user),
        text: text.to_string(),
    })
}
