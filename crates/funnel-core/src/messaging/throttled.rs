use std::{collections::HashMap, path::Path, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{
    domain::{ChatId, MessageRef},
    messaging::{port::MessagingPort, types::InlineKeyboard},
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    /// Minimum spacing between *any* Telegram API calls (global flood control).
    pub global_min_interval: Duration,
    /// Minimum spacing between sends to the same chat.
    pub per_chat_min_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            global_min_interval: Duration::from_millis(40), // ~25/sec, under the 30/sec bot limit
            per_chat_min_interval: Duration::from_millis(1050), // ~0.95/sec
        }
    }
}

#[derive(Debug)]
struct IntervalLimiter {
    interval: Duration,
    next: Instant,
}

impl IntervalLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Reserve the next slot and return the wait duration required before executing.
    fn reserve(&mut self) -> Duration {
        self.reserve_at(Instant::now())
    }

    fn reserve_at(&mut self, now: Instant) -> Duration {
        let start = if now >= self.next { now } else { self.next };
        self.next = start + self.interval;
        start.saturating_duration_since(now)
    }
}

/// MessagingPort decorator that rate-limits outbound calls.
///
/// Broadcasts fan out to every subscriber in one go; this keeps them under Telegram's
/// flood limits instead of collecting 429s. Deletes and callback answers only take the
/// global slot.
pub struct ThrottledMessenger {
    inner: Arc<dyn MessagingPort>,
    cfg: ThrottleConfig,
    global: Mutex<IntervalLimiter>,
    per_chat: Mutex<HashMap<i64, Arc<Mutex<IntervalLimiter>>>>,
}

impl ThrottledMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, cfg: ThrottleConfig) -> Self {
        Self {
            inner,
            cfg,
            global: Mutex::new(IntervalLimiter::new(cfg.global_min_interval)),
            per_chat: Mutex::new(HashMap::new()),
        }
    }

    async fn limiter_for_chat(&self, chat_id: i64) -> Arc<Mutex<IntervalLimiter>> {
        let mut map = self.per_chat.lock().await;
        if let Some(lim) = map.get(&chat_id) {
            return lim.clone();
        }

        // A limiter whose slot is already free carries no state.
        let now = Instant::now();
        map.retain(|_, lim| match lim.try_lock() {
            Ok(guard) => guard.next > now,
            Err(_) => true,
        });

        let lim = Arc::new(Mutex::new(IntervalLimiter::new(
            self.cfg.per_chat_min_interval,
        )));
        map.insert(chat_id, lim.clone());
        lim
    }

    async fn throttle_chat(&self, chat_id: ChatId) {
        let global_wait = { self.global.lock().await.reserve() };
        let chat_wait = {
            let lim = self.limiter_for_chat(chat_id.0).await;
            let mut guard = lim.lock().await;
            guard.reserve()
        };

        let wait = global_wait.max(chat_wait);
        if wait > Duration::ZERO {
            sleep(wait).await;
        }
    }

    async fn throttle_global(&self) {
        let wait = { self.global.lock().await.reserve() };
        if wait > Duration::ZERO {
            sleep(wait).await;
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for ThrottledMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.throttle_chat(chat_id).await;
        self.inner.send_text(chat_id, text, keyboard).await
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &Path,
        caption: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.throttle_chat(chat_id).await;
        self.inner.send_photo(chat_id, photo, caption, keyboard).await
    }

    async fn send_document(&self, chat_id: ChatId, document: &Path) -> Result<MessageRef> {
        self.throttle_chat(chat_id).await;
        self.inner.send_document(chat_id, document).await
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.throttle_global().await;
        self.inner.delete_message(msg).await
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        // No chat_id available here; apply global throttling only.
        self.throttle_global().await;
        self.inner.answer_callback_query(callback_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeMessenger;

    fn throttled() -> ThrottledMessenger {
        ThrottledMessenger::new(Arc::new(FakeMessenger::default()), ThrottleConfig::default())
    }

    #[test]
    fn limiter_spaces_consecutive_reservations() {
        let now = Instant::now();
        let mut lim = IntervalLimiter {
            interval: Duration::from_millis(100),
            next: now,
        };
        assert_eq!(lim.reserve_at(now), Duration::ZERO);
        assert_eq!(lim.reserve_at(now), Duration::from_millis(100));
        assert_eq!(lim.reserve_at(now), Duration::from_millis(200));
    }

    #[test]
    fn limiter_is_free_after_idle_period() {
        let now = Instant::now();
        let mut lim = IntervalLimiter {
            interval: Duration::from_millis(100),
            next: now,
        };
        lim.reserve_at(now);
        let later = now + Duration::from_secs(1);
        assert_eq!(lim.reserve_at(later), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn sends_to_one_chat_are_spaced() {
        let m = throttled();
        let started = Instant::now();

        m.send_text(ChatId(1), "a", None).await.unwrap();
        m.send_text(ChatId(1), "b", None).await.unwrap();

        assert!(started.elapsed() >= ThrottleConfig::default().per_chat_min_interval);
    }

    #[tokio::test(start_paused = true)]
    async fn different_chats_only_wait_for_the_global_slot() {
        let m = throttled();
        let started = Instant::now();

        m.send_text(ChatId(1), "a", None).await.unwrap();
        m.send_text(ChatId(2), "b", None).await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= ThrottleConfig::default().global_min_interval);
        assert!(elapsed < ThrottleConfig::default().per_chat_min_interval);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_chat_limiters_are_dropped() {
        let m = throttled();
        m.send_text(ChatId(1), "a", None).await.unwrap();
        m.send_text(ChatId(2), "b", None).await.unwrap();
        assert_eq!(m.per_chat.lock().await.len(), 2);

        tokio::time::advance(Duration::from_secs(5)).await;
        m.send_text(ChatId(3), "c", None).await.unwrap();

        let map = m.per_chat.lock().await;
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&3));
    }
}
