use crate::domain::{ChatId, MessageRef, UserId};

/// Kind of chat an update originated from.
///
/// Supergroups are folded into `Group`; the bot only distinguishes private chats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Channel,
}

/// Who sent an update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub user_id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl Sender {
    /// `@username` when the user has one, `id=<user_id>` otherwise.
    pub fn mention(&self) -> String {
        match &self.username {
            Some(u) => format!("@{u}"),
            None => self.user_id.to_string(),
        }
    }
}

/// Inbound text message.
#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub chat_kind: ChatKind,
    pub from: Sender,
    pub text: String,
}

/// Inbound inline-button press.
#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub callback_id: String,
    pub chat_kind: ChatKind,
    pub from: Sender,
    pub data: String,
    /// The message carrying the pressed button.
    pub message: MessageRef,
}

/// What pressing an inline button does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    Callback(String),
    Url(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: ButtonAction,
}

impl InlineButton {
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

/// Inline keyboard, laid out one button per row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

impl InlineKeyboard {
    pub fn new(buttons: Vec<InlineButton>) -> Self {
        Self { buttons }
    }

    /// Callback payloads in button order (url buttons are skipped).
    pub fn callback_data(&self) -> Vec<&str> {
        self.buttons
            .iter()
            .filter_map(|b| match &b.action {
                ButtonAction::Callback(d) => Some(d.as_str()),
                ButtonAction::Url(_) => None,
            })
            .collect()
    }
}
