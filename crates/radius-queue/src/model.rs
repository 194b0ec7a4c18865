//! The message envelope handed back from a queue dequeue.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Identifies a single enqueued message, stable across redeliveries.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Self {
        MessageId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fences a consumer's visibility lock against a later redelivery of the same message.
///
/// Every successful dequeue mints a fresh token; [`Queue::extend`](crate::Queue::extend) and
/// [`Queue::finish`](crate::Queue::finish) are rejected with
/// [`Error::LockExpired`](crate::Error::LockExpired) once a different token has been minted for
/// the same message id, so a consumer whose lock already expired can never finish or extend work
/// that has since been handed to someone else.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LockToken(pub(crate) u64);

/// A dequeued message, invisible to other consumers until `next_visible_at`.
///
/// `dequeue_count` starts at 1 on first delivery and increments on every redelivery caused
/// by a lock expiring before [`Queue::finish`](crate::Queue::finish) or
/// [`Queue::extend`](crate::Queue::extend) is called.
#[derive(Clone, Debug)]
pub struct Message<T> {
    pub id: MessageId,
    pub data: T,
    pub dequeue_count: u32,
    pub next_visible_at: SystemTime,
    pub lock_token: LockToken,
}
