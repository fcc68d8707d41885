use teloxide::types::CallbackQuery;

use funnel_core::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::types,
};

use super::text::{chat_kind, sender};

/// Core view of a button press. Presses without an originating message (inline mode)
/// have no chat to check and are skipped.
pub fn callback_query(q: &CallbackQuery) -> Option<types::CallbackQuery> {
    let msg = q.message.as_ref()?;

    Some(types::CallbackQuery {
        callback_id: q.id.clone(),
        chat_kind: chat_kind(&msg.chat),
        from: sender(&q.from),
        data: q.data.clone().unwrap_or_default(),
        message: MessageRef {
            chat_id: ChatId(msg.chat.id.0),
            message_id: MessageId(msg.id.0),
        },
    })
}
