//! Telegram adapter (teloxide).
//!
//! This crate implements the `funnel-core` messaging and channel ports over the Telegram
//! Bot API and wires the polling dispatcher.

use std::path::Path;

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile},
    ApiError, RequestError,
};

use tokio::time::sleep;

pub mod channel;
pub mod handlers;
pub mod router;

pub use channel::TelegramChannel;

use funnel_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ButtonAction, InlineKeyboard},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn tg_markup(keyboard: InlineKeyboard) -> Result<InlineKeyboardMarkup> {
        let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
        for b in keyboard.buttons {
            let button = match b.action {
                ButtonAction::Callback(data) => InlineKeyboardButton::callback(b.label, data),
                ButtonAction::Url(url) => {
                    let url = reqwest::Url::parse(&url)
                        .map_err(|e| Error::External(format!("invalid button url {url:?}: {e}")))?;
                    InlineKeyboardButton::url(b.label, url)
                }
            };
            rows.push(vec![button]);
        }
        Ok(InlineKeyboardMarkup::new(rows))
    }
}

/// Run a Telegram request, retrying once when Telegram asks us to back off.
pub(crate) async fn with_retry<T, Fut>(mut op: impl FnMut() -> Fut) -> Result<T>
where
    Fut: std::future::IntoFuture<Output = std::result::Result<T, RequestError>>,
    Fut::IntoFuture: Send,
{
    const MAX_RETRIES: usize = 1;
    let mut attempts = 0usize;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => match e {
                RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    sleep(d).await;
                    continue;
                }
                other => return Err(map_err(other)),
            },
        }
    }
}

/// Split Telegram errors into "Bad Request" rejections and everything else.
pub(crate) fn map_err(e: RequestError) -> Error {
    match &e {
        RequestError::Api(api) if is_bad_request(api) => Error::BadRequest(api_description(api)),
        _ => Error::External(format!("telegram error: {e}")),
    }
}

fn api_description(api: &ApiError) -> String {
    match api {
        // Unknown carries the raw description Telegram sent.
        ApiError::Unknown(desc) => desc.clone(),
        other => other.to_string(),
    }
}

fn is_bad_request(api: &ApiError) -> bool {
    api_description(api).starts_with("Bad Request")
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        let markup = keyboard.map(Self::tg_markup).transpose()?;

        let msg = with_retry(|| {
            let req = self.bot.send_message(Self::tg_chat(chat_id), text.to_string());
            match &markup {
                Some(m) => req.reply_markup(m.clone()),
                None => req,
            }
        })
        .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &Path,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        let markup = keyboard.map(Self::tg_markup).transpose()?;

        let msg = with_retry(|| {
            let req = self
                .bot
                .send_photo(Self::tg_chat(chat_id), InputFile::file(photo.to_path_buf()))
                .caption(caption.to_string());
            match &markup {
                Some(m) => req.reply_markup(m.clone()),
                None => req,
            }
        })
        .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_document(&self, chat_id: ChatId, document: &Path) -> Result<MessageRef> {
        let msg = with_retry(|| {
            self.bot.send_document(
                Self::tg_chat(chat_id),
                InputFile::file(document.to_path_buf()),
            )
        })
        .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        with_retry(|| {
            self.bot
                .delete_message(Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg.message_id))
        })
        .await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        with_retry(|| self.bot.answer_callback_query(callback_id.to_string()))
            .await?;
        Ok(())
    }
}
