use tracing::{info, warn};

use crate::{messaging::port::MessagingPort, store::UserRecord};

/// Outcome of a broadcast run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub delivered: usize,
}

/// Send `text` to every recipient in order.
///
/// A failed send is logged and skipped; it never stops the remaining sends.
pub async fn broadcast(
    messenger: &dyn MessagingPort,
    recipients: &[UserRecord],
    text: &str,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    for rec in recipients {
        report.attempted += 1;
        match messenger.send_text(rec.user_id.into(), text, None).await {
            Ok(_) => report.delivered += 1,
            Err(e) => warn!(user_id = rec.user_id.0, error = %e, "broadcast send failed"),
        }
    }

    info!(
        attempted = report.attempted,
        delivered = report.delivered,
        "broadcast finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChatId, UserId},
        test_support::FakeMessenger,
    };

    fn rec(id: i64) -> UserRecord {
        UserRecord {
            id,
            user_id: UserId(id),
            username: None,
            first_name: None,
            subscribed: true,
        }
    }

    #[tokio::test]
    async fn failure_does_not_stop_later_recipients() {
        let m = FakeMessenger::default();
        m.fail_sends_to(ChatId(1));

        let report = broadcast(&m, &[rec(1), rec(2), rec(3)], "hi").await;

        assert_eq!(
            report,
            BroadcastReport {
                attempted: 3,
                delivered: 2
            }
        );
        assert_eq!(m.texts_to(ChatId(2)), vec!["hi".to_string()]);
        assert_eq!(m.texts_to(ChatId(3)), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn nobody_to_send_to() {
        let m = FakeMessenger::default();
        assert_eq!(broadcast(&m, &[], "hi").await, BroadcastReport::default());
        assert!(m.sent().is_empty());
    }
}
