use async_trait::async_trait;

use teloxide::{prelude::*, types::ChatMemberStatus};

use funnel_core::{
    channel::{ChannelPort, MemberStatus},
    domain::{ChatId, UserId},
    Result,
};

use crate::with_retry;

/// Base-channel queries over the Bot API. The bot must be an admin of the channel.
#[derive(Clone)]
pub struct TelegramChannel {
    bot: Bot,
}

impl TelegramChannel {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

pub(crate) fn member_status(status: ChatMemberStatus) -> MemberStatus {
    match status {
        ChatMemberStatus::Owner => MemberStatus::Owner,
        ChatMemberStatus::Administrator => MemberStatus::Administrator,
        ChatMemberStatus::Member => MemberStatus::Member,
        ChatMemberStatus::Restricted => MemberStatus::Restricted,
        ChatMemberStatus::Left => MemberStatus::Left,
        ChatMemberStatus::Banned => MemberStatus::Banned,
    }
}

#[async_trait]
impl ChannelPort for TelegramChannel {
    async fn invite_link(&self, channel: ChatId) -> Result<Option<String>> {
        let chat = with_retry(|| self.bot.get_chat(teloxide::types::ChatId(channel.0))).await?;
        Ok(chat.invite_link().map(str::to_string))
    }

    async fn create_invite_link(&self, channel: ChatId) -> Result<String> {
        let link = with_retry(|| {
            self.bot
                .create_chat_invite_link(teloxide::types::ChatId(channel.0))
        })
        .await?;
        Ok(link.invite_link)
    }

    async fn member_status(&self, channel: ChatId, user: UserId) -> Result<MemberStatus> {
        let member = with_retry(|| {
            self.bot.get_chat_member(
                teloxide::types::ChatId(channel.0),
                teloxide::types::UserId(user.0 as u64),
            )
        })
        .await?;
        Ok(member_status(member.kind.status()))
    }
}
