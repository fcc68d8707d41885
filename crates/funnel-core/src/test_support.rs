//! In-memory fakes for the messaging and channel ports.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;

use crate::{
    channel::{ChannelPort, MemberStatus},
    domain::{ChatId, MessageId, MessageRef, UserId},
    errors::Error,
    messaging::{port::MessagingPort, types::InlineKeyboard},
    Result,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Sent {
    Text {
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    Photo {
        chat_id: ChatId,
        caption: String,
        keyboard: Option<InlineKeyboard>,
    },
    Document {
        chat_id: ChatId,
        path: PathBuf,
        existed: bool,
    },
    Delete(MessageRef),
    Answer(String),
}

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    sent: Mutex<Vec<Sent>>,
    failing_chats: Mutex<HashSet<i64>>,
    delete_error: Mutex<Option<fn() -> Error>>,
}

impl FakeMessenger {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Text bodies delivered to `chat_id`, in order.
    pub fn texts_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { chat_id: c, text, .. } if c == chat_id => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn fail_sends_to(&self, chat_id: ChatId) {
        self.failing_chats.lock().unwrap().insert(chat_id.0);
    }

    pub fn fail_delete_with(&self, make: fn() -> Error) {
        *self.delete_error.lock().unwrap() = Some(make);
    }

    fn deliver(&self, chat_id: ChatId, sent: Sent) -> Result<MessageRef> {
        if self.failing_chats.lock().unwrap().contains(&chat_id.0) {
            return Err(Error::External("Forbidden: bot was blocked by the user".to_string()));
        }
        self.sent.lock().unwrap().push(sent);

        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        })
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.deliver(
            chat_id,
            Sent::Text {
                chat_id,
                text: text.to_string(),
                keyboard,
            },
        )
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        _photo: &Path,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.deliver(
            chat_id,
            Sent::Photo {
                chat_id,
                caption: caption.to_string(),
                keyboard,
            },
        )
    }

    async fn send_document(&self, chat_id: ChatId, document: &Path) -> Result<MessageRef> {
        self.deliver(
            chat_id,
            Sent::Document {
                chat_id,
                path: document.to_path_buf(),
                existed: document.exists(),
            },
        )
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        if let Some(make) = *self.delete_error.lock().unwrap() {
            return Err(make());
        }
        self.sent.lock().unwrap().push(Sent::Delete(msg));
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Answer(callback_id.to_string()));
        Ok(())
    }
}

/// Channel whose member status is set by the test; `None` answers with a bad request.
pub struct FakeChannel {
    status: Mutex<Option<MemberStatus>>,
}

impl Default for FakeChannel {
    fn default() -> Self {
        Self {
            status: Mutex::new(Some(MemberStatus::Left)),
        }
    }
}

impl FakeChannel {
    pub fn set_status(&self, status: Option<MemberStatus>) {
        *self.status.lock().unwrap() = status;
    }
}

#[async_trait]
impl ChannelPort for FakeChannel {
    async fn invite_link(&self, _channel: ChatId) -> Result<Option<String>> {
        Ok(Some("https://t.me/+existing".to_string()))
    }

    async fn create_invite_link(&self, _channel: ChatId) -> Result<String> {
        Ok("https://t.me/+created".to_string())
    }

    async fn member_status(&self, _channel: ChatId, _user: UserId) -> Result<MemberStatus> {
        match *self.status.lock().unwrap() {
            Some(s) => Ok(s),
            None => Err(Error::BadRequest("Bad Request: user not found".to_string())),
        }
    }
}
