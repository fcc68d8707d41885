use async_trait::async_trait;

use crate::{
    domain::{ChatId, UserId},
    Result,
};

/// Membership status of a user in a chat, as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

/// Queries against the base channel.
#[async_trait]
pub trait ChannelPort: Send + Sync {
    /// The channel's primary invite link, if it has one.
    async fn invite_link(&self, channel: ChatId) -> Result<Option<String>>;

    /// Create an additional invite link for the channel.
    async fn create_invite_link(&self, channel: ChatId) -> Result<String>;

    /// Fails with `Error::BadRequest` when the platform does not know the user in this chat.
    async fn member_status(&self, channel: ChatId, user: UserId) -> Result<MemberStatus>;
}
