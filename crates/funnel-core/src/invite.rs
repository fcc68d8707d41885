use std::sync::Arc;

use tracing::debug;

use crate::{channel::ChannelPort, domain::ChatId, Result};

/// Resolves the link behind the "subscribe" button.
///
/// Order: configured link, then the channel's existing link, then a freshly created
/// one. Nothing is cached; each call walks the chain again.
pub struct InviteLinkResolver {
    channel: Arc<dyn ChannelPort>,
    base_chat: ChatId,
    static_link: Option<String>,
}

impl InviteLinkResolver {
    pub fn new(
        channel: Arc<dyn ChannelPort>,
        base_chat: ChatId,
        static_link: Option<String>,
    ) -> Self {
        Self {
            channel,
            base_chat,
            static_link: static_link.filter(|l| !l.trim().is_empty()),
        }
    }

    pub async fn resolve_invite_link(&self) -> Result<String> {
        if let Some(link) = &self.static_link {
            return Ok(link.clone());
        }

        if let Some(link) = self
            .channel
            .invite_link(self.base_chat)
            .await?
            .filter(|l| !l.is_empty())
        {
            return Ok(link);
        }

        debug!(chat_id = self.base_chat.0, "no invite link on channel, creating one");
        self.channel.create_invite_link(self.base_chat).await
    }
}
