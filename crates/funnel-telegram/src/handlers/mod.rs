//! Telegram update handlers.
//!
//! Each handler converts the teloxide update into the core update model and hands it to
//! the onboarding dispatcher. Failures are logged and the update is dropped; the
//! dispatcher keeps polling.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};
use tracing::error;

use crate::router::AppState;

mod callback;
mod text;

pub use callback::callback_query;
pub use text::text_message;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(query) = callback_query(&q) else {
        return Ok(());
    };

    if let Err(e) = state.onboarding.handle_callback(&query).await {
        error!(
            user_id = query.from.user_id.0,
            data = %query.data,
            error = %e,
            "callback handling failed"
        );
    }
    Ok(())
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = text_message(&msg) else {
        return Ok(());
    };

    if let Err(e) = state.onboarding.handle_text(&text).await {
        error!(
            user_id = text.from.user_id.0,
            chat_id = text.chat_id.0,
            error = %e,
            "message handling failed"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::{
        domain::{ChatId, MessageId, UserId},
        messaging::types::ChatKind,
    };
    use serde_json::json;

    fn user() -> serde_json::Value {
        json!({ "id": 10, "is_bot": false, "first_name": "Alice", "username": "alice" })
    }

    fn message(chat: serde_json::Value, text: Option<&str>) -> Message {
        let mut v = json!({
            "message_id": 5,
            "date": 1_700_000_000,
            "chat": chat,
            "from": user(),
        });
        match text {
            Some(t) => v["text"] = json!(t),
            None => v["location"] = json!({ "longitude": 30.3, "latitude": 59.9 }),
        }
        serde_json::from_value(v).unwrap()
    }

    fn private_chat() -> serde_json::Value {
        json!({ "id": 10, "type": "private", "first_name": "Alice" })
    }

    #[test]
    fn private_text_is_converted() {
        let m = text_message(&message(private_chat(), Some("/start"))).unwrap();
        assert_eq!(m.chat_id, ChatId(10));
        assert_eq!(m.chat_kind, ChatKind::Private);
        assert_eq!(m.from.user_id, UserId(10));
        assert_eq!(m.from.username.as_deref(), Some("alice"));
        assert_eq!(m.from.first_name.as_deref(), Some("Alice"));
        assert_eq!(m.text, "/start");
    }

    #[test]
    fn group_and_channel_chats_are_marked() {
        let g = text_message(&message(
            json!({ "id": -5, "type": "group", "title": "G" }),
            Some("/start"),
        ))
        .unwrap();
        assert_eq!(g.chat_kind, ChatKind::Group);

        let c = text_message(&message(
            json!({ "id": -100, "type": "channel", "title": "C" }),
            Some("/start"),
        ))
        .unwrap();
        assert_eq!(c.chat_kind, ChatKind::Channel);
    }

    #[test]
    fn non_text_messages_are_skipped() {
        assert!(text_message(&message(private_chat(), None)).is_none());
    }

    #[test]
    fn button_press_is_converted() {
        let q: CallbackQuery = serde_json::from_value(json!({
            "id": "cb1",
            "from": user(),
            "chat_instance": "ci",
            "data": "want_in",
            "message": {
                "message_id": 42,
                "date": 1_700_000_000,
                "chat": private_chat(),
                "text": "hi"
            }
        }))
        .unwrap();

        let cq = callback_query(&q).unwrap();
        assert_eq!(cq.callback_id, "cb1");
        assert_eq!(cq.data, "want_in");
        assert_eq!(cq.chat_kind, ChatKind::Private);
        assert_eq!(cq.message.message_id, MessageId(42));
    }

    #[test]
    fn inline_mode_press_is_skipped() {
        let q: CallbackQuery = serde_json::from_value(json!({
            "id": "cb2",
            "from": user(),
            "chat_instance": "ci",
            "inline_message_id": "im",
            "data": "want_in"
        }))
        .unwrap();
        assert!(callback_query(&q).is_none());
    }
}
