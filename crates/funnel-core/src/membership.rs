use std::sync::Arc;

use tracing::debug;

use crate::{
    channel::{ChannelPort, MemberStatus},
    domain::{ChatId, UserId},
    errors::Error,
    Result,
};

/// Decides whether a user counts as subscribed to the base channel.
///
/// Every call asks the platform; there is no memoization.
pub struct MembershipGate {
    channel: Arc<dyn ChannelPort>,
    base_chat: ChatId,
}

impl MembershipGate {
    pub fn new(channel: Arc<dyn ChannelPort>, base_chat: ChatId) -> Self {
        Self { channel, base_chat }
    }

    /// `Left` is the only negative status. A bad-request answer (user never seen by the
    /// channel, channel unreachable) also counts as not subscribed; other errors propagate.
    pub async fn check_subscribed(&self, user: UserId) -> Result<bool> {
        match self.channel.member_status(self.base_chat, user).await {
            Ok(status) => Ok(classify(status)),
            Err(Error::BadRequest(reason)) => {
                debug!(user_id = user.0, %reason, "membership lookup rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

pub fn classify(status: MemberStatus) -> bool {
    !matches!(status, MemberStatus::Left)
}
