//! An embedded, in-process [`Queue`] backed by an ordered map.
//!
//! Lock expiry is tracked with [`tokio::time::Instant`] (monotonic, immune to wall-clock
//! adjustments); [`Message::next_visible_at`] is only derived from it for display purposes.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::SystemTime,
};

use async_trait::async_trait;
use indexmap::IndexMap;
use radius_shared::time::Duration;
use tokio::{sync::RwLock, time::Instant};

use crate::{
    error::{LockExpiredSnafu, NotFoundSnafu, Result},
    model::{LockToken, Message, MessageId},
    queue::Queue,
};
use snafu::OptionExt as _;

struct Entry<T> {
    data: T,
    dequeue_count: u32,
    next_visible_at: Instant,
    lock_token: u64,
}

/// An embedded, ordered-map-backed [`Queue`].
///
/// A message whose `dequeue_count` would exceed `max_deliveries` on the next dequeue is moved
/// to an internal dead-letter list instead of being redelivered forever.
pub struct MemoryQueue<T> {
    entries: RwLock<IndexMap<String, Entry<T>>>,
    dead_letters: RwLock<Vec<(String, Entry<T>)>>,
    max_deliveries: u32,
    next_id: AtomicU64,
    next_lock_token: AtomicU64,
}

impl<T> MemoryQueue<T> {
    pub fn new(max_deliveries: u32) -> Self {
        MemoryQueue {
            entries: RwLock::new(IndexMap::new()),
            dead_letters: RwLock::new(Vec::new()),
            max_deliveries,
            next_id: AtomicU64::new(1),
            next_lock_token: AtomicU64::new(1),
        }
    }

    /// Messages moved to the dead letter area after exceeding `max_deliveries` redeliveries.
    pub async fn dead_letter_count(&self) -> usize {
        self.dead_letters.read().await.len()
    }
}

fn to_system_time(deadline: Instant) -> SystemTime {
    let now_instant = Instant::now();
    let now_system = SystemTime::now();
    if deadline >= now_instant {
        now_system + (deadline - now_instant)
    } else {
        now_system
    }
}

#[async_trait]
impl<T> Queue<T> for MemoryQueue<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn enqueue(&self, data: T) -> Result<MessageId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let mut entries = self.entries.write().await;
        entries.insert(
            id.clone(),
            Entry {
                data,
                dequeue_count: 0,
                next_visible_at: Instant::now(),
                lock_token: 0,
            },
        );
        Ok(MessageId::new(id))
    }

    async fn dequeue(&self, visibility_timeout: Duration) -> Result<Option<Message<T>>> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        loop {
            let Some(key) = entries
                .iter()
                .find(|(_, entry)| entry.next_visible_at <= now)
                .map(|(key, _)| key.clone())
            else {
                return Ok(None);
            };

            let entry = entries.get_mut(&key).expect("key was just found");
            if entry.dequeue_count + 1 > self.max_deliveries {
                let (key, entry) = entries.shift_remove_entry(&key).expect("key was just found");
                self.dead_letters.write().await.push((key, entry));
                continue;
            }

            entry.dequeue_count += 1;
            entry.next_visible_at = now + std::time::Duration::from(visibility_timeout);
            entry.lock_token = self.next_lock_token.fetch_add(1, Ordering::Relaxed);

            return Ok(Some(Message {
                id: MessageId::new(key),
                data: entry.data.clone(),
                dequeue_count: entry.dequeue_count,
                next_visible_at: to_system_time(entry.next_visible_at),
                lock_token: LockToken(entry.lock_token),
            }));
        }
    }

    async fn extend(
        &self,
        id: &MessageId,
        lock_token: LockToken,
        visibility_timeout: Duration,
    ) -> Result<()> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(id.as_str())
            .context(NotFoundSnafu { id: id.clone() })?;
        if entry.lock_token != lock_token.0 {
            return LockExpiredSnafu { id: id.clone() }.fail();
        }
        entry.next_visible_at = Instant::now() + std::time::Duration::from(visibility_timeout);
        Ok(())
    }

    async fn finish(&self, id: &MessageId, lock_token: LockToken) -> Result<()> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get(id.as_str()) else {
            return Ok(());
        };
        if entry.lock_token != lock_token.0 {
            return LockExpiredSnafu { id: id.clone() }.fail();
        }
        entries.shift_remove(id.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enqueue_then_dequeue_round_trips() {
        let queue: MemoryQueue<String> = MemoryQueue::new(5);
        queue.enqueue("hello".to_string()).await.unwrap();

        let message = queue
            .dequeue(Duration::from_secs(30))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.data, "hello");
        assert_eq!(message.dequeue_count, 1);
    }

    #[tokio::test]
    async fn locked_message_is_invisible_until_expiry() {
        let queue: MemoryQueue<String> = MemoryQueue::new(5);
        queue.enqueue("hello".to_string()).await.unwrap();

        queue.dequeue(Duration::from_secs(30)).await.unwrap();
        let second = queue.dequeue(Duration::from_secs(30)).await.unwrap();
        assert!(second.is_none(), "message should still be locked");
    }

    #[tokio::test]
    async fn finish_removes_message() {
        let queue: MemoryQueue<String> = MemoryQueue::new(5);
        queue.enqueue("hello".to_string()).await.unwrap();
        let message = queue
            .dequeue(Duration::from_secs(30))
            .await
            .unwrap()
            .unwrap();

        queue.finish(&message.id, message.lock_token).await.unwrap();

        assert!(queue.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn finish_with_stale_lock_token_is_rejected() {
        let queue: MemoryQueue<String> = MemoryQueue::new(5);
        queue.enqueue("hello".to_string()).await.unwrap();
        let first = queue
            .dequeue(Duration::from_secs(0))
            .await
            .unwrap()
            .unwrap();

        // The lock already expired (visibility_timeout of 0), so this is a fresh delivery with a
        // new lock token.
        let second = queue
            .dequeue(Duration::from_secs(30))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.dequeue_count, 2);

        let err = queue.finish(&first.id, first.lock_token).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::LockExpired { .. }));
    }

    #[tokio::test]
    async fn redelivery_past_max_deliveries_dead_letters() {
        let queue: MemoryQueue<String> = MemoryQueue::new(1);
        queue.enqueue("hello".to_string()).await.unwrap();

        // First delivery consumes the single allowed attempt but is never finished, so its lock
        // immediately expires (visibility_timeout 0).
        queue.dequeue(Duration::from_secs(0)).await.unwrap();

        let redelivered = queue.dequeue(Duration::from_secs(30)).await.unwrap();
        assert!(
            redelivered.is_none(),
            "message should have been dead-lettered instead of redelivered"
        );
        assert_eq!(queue.dead_letter_count().await, 1);
    }
}
