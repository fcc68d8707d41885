use std::path::Path;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::InlineKeyboard,
    Result,
};

/// Outbound messaging port.
///
/// Telegram is the only implementation; the onboarding flow and broadcast talk to it
/// exclusively through this trait so they can be exercised against fakes.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef>;

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &Path,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef>;

    async fn send_document(&self, chat_id: ChatId, document: &Path) -> Result<MessageRef>;

    /// Fails with `Error::BadRequest` when the message is already gone or too old.
    async fn delete_message(&self, msg: MessageRef) -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()>;
}
