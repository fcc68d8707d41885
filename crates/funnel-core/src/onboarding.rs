//! Update dispatcher for the onboarding funnel.
//!
//! `/start` → welcome photo with "want in" / "what's inside" → "why join" with a
//! subscribe link and an "I subscribed" re-check → membership confirmation. Only private
//! chats are served. The operator additionally gets `/table` (spreadsheet export) and
//! `рассылка <text>` (broadcast to subscribers).

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    broadcast::{broadcast, BroadcastReport},
    channel::ChannelPort,
    config::Config,
    domain::{ChatId, MessageRef},
    errors::Error,
    export::write_users_xlsx,
    invite::InviteLinkResolver,
    membership::MembershipGate,
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, ChatKind, InlineButton, InlineKeyboard, Sender, TextMessage},
    },
    store::{NewUser, SqliteStore, UserRecord},
    texts, Result,
};

/// Recognized text commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextCommand<'a> {
    Start,
    Table,
    /// Broadcast body (may be empty).
    Broadcast(&'a str),
    Other,
}

impl<'a> TextCommand<'a> {
    pub fn parse(text: &'a str) -> Self {
        let trimmed = text.trim();
        let (head, rest) = match trimmed.find(char::is_whitespace) {
            Some(i) => (&trimmed[..i], &trimmed[i..]),
            None => (trimmed, ""),
        };
        let head_lower = head.to_lowercase();

        if head_lower == texts::BROADCAST_KEYWORD {
            return TextCommand::Broadcast(broadcast_body(rest));
        }
        if !rest.trim().is_empty() {
            return TextCommand::Other;
        }

        // Telegram may send `/cmd@botname`.
        match head_lower.split('@').next().unwrap_or("") {
            "/start" => TextCommand::Start,
            "/table" => TextCommand::Table,
            _ => TextCommand::Other,
        }
    }
}

/// Drop the one separator after the keyword; the admin's layout is kept as typed.
fn broadcast_body(rest: &str) -> &str {
    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix(|c: char| c.is_whitespace()))
        .unwrap_or(rest);
    if body.trim().is_empty() {
        ""
    } else {
        body
    }
}

/// Inline button payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    WantIn,
    WhatIn,
    ISubscribe,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            texts::CB_WANT_IN => Some(Self::WantIn),
            texts::CB_WHAT_IN => Some(Self::WhatIn),
            texts::CB_I_SUBSCRIBE => Some(Self::ISubscribe),
            _ => None,
        }
    }
}

pub struct Onboarding {
    cfg: Arc<Config>,
    store: SqliteStore,
    messenger: Arc<dyn MessagingPort>,
    invites: InviteLinkResolver,
    gate: MembershipGate,
}

impl Onboarding {
    pub fn new(
        cfg: Arc<Config>,
        store: SqliteStore,
        messenger: Arc<dyn MessagingPort>,
        channel: Arc<dyn ChannelPort>,
    ) -> Self {
        let invites =
            InviteLinkResolver::new(channel.clone(), cfg.base_chat_id, cfg.base_chat_link.clone());
        let gate = MembershipGate::new(channel, cfg.base_chat_id);
        Self {
            cfg,
            store,
            messenger,
            invites,
            gate,
        }
    }

    pub async fn handle_text(&self, msg: &TextMessage) -> Result<()> {
        if msg.chat_kind != ChatKind::Private {
            return Ok(());
        }

        let (_, created) = self.ensure_user(&msg.from).await?;
        if created {
            self.report(&texts::report_started(&msg.from.mention())).await;
        }

        let user_id = msg.from.user_id;
        let chat_id = msg.chat_id;
        match TextCommand::parse(&msg.text) {
            TextCommand::Start => self.start(chat_id).await,
            TextCommand::Table if self.cfg.is_admin(user_id) => self.export_table(chat_id).await,
            TextCommand::Broadcast(body) if self.cfg.is_admin(user_id) => {
                if body.is_empty() {
                    self.messenger
                        .send_text(chat_id, texts::BROADCAST_USAGE, None)
                        .await?;
                    return Ok(());
                }
                self.run_broadcast(chat_id, body).await.map(|_| ())
            }
            _ => Ok(()),
        }
    }

    pub async fn handle_callback(&self, q: &CallbackQuery) -> Result<()> {
        if q.chat_kind != ChatKind::Private {
            return Ok(());
        }

        if let Err(e) = self.messenger.answer_callback_query(&q.callback_id).await {
            debug!(error = %e, "answer_callback_query failed");
        }

        let Some(action) = CallbackAction::parse(&q.data) else {
            debug!(data = %q.data, "unknown callback payload");
            return Ok(());
        };

        let (record, _) = self.ensure_user(&q.from).await?;
        let chat_id: ChatId = q.from.user_id.into();

        match action {
            CallbackAction::WantIn => self.want_in(chat_id).await?,
            CallbackAction::WhatIn => self.what_in(chat_id).await?,
            CallbackAction::ISubscribe => self.i_subscribe(chat_id, &q.from, &record).await?,
        }

        self.delete_trigger(q.message).await
    }

    /// Load the sender's record, creating it if absent. The flag is true on creation.
    async fn ensure_user(&self, from: &Sender) -> Result<(UserRecord, bool)> {
        let (record, created) = self
            .store
            .get_or_create(NewUser {
                user_id: from.user_id,
                username: from.username.clone(),
                first_name: from.first_name.clone(),
            })
            .await?;

        if created {
            info!(user_id = from.user_id.0, "new user");
        }
        Ok((record, created))
    }

    async fn start(&self, chat_id: ChatId) -> Result<()> {
        let keyboard = InlineKeyboard::new(vec![
            InlineButton::callback(texts::BUTTON_WANT_IN, texts::CB_WANT_IN),
            InlineButton::callback(texts::BUTTON_WHAT_IN, texts::CB_WHAT_IN),
        ]);
        self.messenger
            .send_photo(
                chat_id,
                &self.cfg.welcome_photo_path,
                texts::WELCOME_CAPTION,
                Some(keyboard),
            )
            .await?;
        Ok(())
    }

    async fn want_in(&self, chat_id: ChatId) -> Result<()> {
        let keyboard = self.subscribe_keyboard().await?;
        self.messenger
            .send_text(chat_id, texts::WHY_JOIN, Some(keyboard))
            .await?;
        Ok(())
    }

    async fn what_in(&self, chat_id: ChatId) -> Result<()> {
        let keyboard = InlineKeyboard::new(vec![InlineButton::callback(
            texts::BUTTON_WANT_IN,
            texts::CB_WANT_IN,
        )]);
        self.messenger
            .send_text(chat_id, texts::WHATS_INSIDE, Some(keyboard))
            .await?;
        Ok(())
    }

    async fn i_subscribe(
        &self,
        chat_id: ChatId,
        from: &Sender,
        record: &UserRecord,
    ) -> Result<()> {
        if !self.gate.check_subscribed(from.user_id).await? {
            let keyboard = self.subscribe_keyboard().await?;
            self.messenger
                .send_text(chat_id, texts::NOT_SUBSCRIBED, Some(keyboard))
                .await?;
            return Ok(());
        }

        self.messenger
            .send_text(chat_id, texts::SUBSCRIBED, None)
            .await?;
        self.store.set_subscribed(from.user_id).await?;

        if !record.subscribed {
            info!(user_id = from.user_id.0, "subscription confirmed");
            self.report(&texts::report_subscribed(&from.mention())).await;
        }
        Ok(())
    }

    async fn subscribe_keyboard(&self) -> Result<InlineKeyboard> {
        let link = self.invites.resolve_invite_link().await?;
        Ok(InlineKeyboard::new(vec![
            InlineButton::url(texts::BUTTON_SUBSCRIBE, link),
            InlineButton::callback(texts::BUTTON_I_SUBSCRIBED, texts::CB_I_SUBSCRIBE),
        ]))
    }

    async fn export_table(&self, chat_id: ChatId) -> Result<()> {
        let records = self.store.list_all().await?;
        let dir = self.cfg.export_dir.clone();
        let today = chrono::Local::now().date_naive();

        let path = tokio::task::spawn_blocking(move || write_users_xlsx(&records, &dir, today))
            .await
            .map_err(|e| Error::Export(format!("export task failed: {e}")))??;

        let sent = self.messenger.send_document(chat_id, &path).await;
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "failed to remove export file");
        }
        sent.map(|_| ())
    }

    /// Broadcast to all subscribers and tell the operator how many sends went through.
    pub async fn run_broadcast(&self, admin_chat: ChatId, body: &str) -> Result<BroadcastReport> {
        let recipients = self.store.list_subscribed().await?;
        let report = broadcast(self.messenger.as_ref(), &recipients, body).await;
        self.messenger
            .send_text(admin_chat, &texts::broadcast_done(report.delivered), None)
            .await?;
        Ok(report)
    }

    /// Remove the message whose button was pressed. A message that is already gone (or too
    /// old to delete) is fine; anything else propagates.
    async fn delete_trigger(&self, msg: MessageRef) -> Result<()> {
        match self.messenger.delete_message(msg).await {
            Ok(()) => Ok(()),
            Err(Error::BadRequest(reason)) => {
                debug!(message_id = msg.message_id.0, %reason, "trigger message not deleted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Post to the report channel, if one is configured. Never fails the caller.
    async fn report(&self, text: &str) {
        let Some(report_chat) = self.cfg.report_chat_id else {
            return;
        };
        if let Err(e) = self.messenger.send_text(report_chat, text, None).await {
            warn!(chat_id = report_chat.0, error = %e, "report notification failed");
        }
    }
}
