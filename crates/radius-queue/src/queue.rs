use async_trait::async_trait;
use radius_shared::time::Duration;

use crate::{
    error::Result,
    model::{LockToken, Message, MessageId},
};

/// A durable, at-least-once work queue.
///
/// Every dequeued message is invisible to further [`Queue::dequeue`] calls for
/// `visibility_timeout`; a consumer still working past that deadline must call
/// [`Queue::extend`] before it elapses or the message is redelivered to another consumer. A
/// message redelivered more than the backend's configured maximum number of times is moved to
/// a dead-letter area instead of being returned again.
#[async_trait]
pub trait Queue<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Enqueues `data`, immediately visible to the next [`Queue::dequeue`] call.
    async fn enqueue(&self, data: T) -> Result<MessageId>;

    /// Pops the oldest visible message, if any, locking it for `visibility_timeout`.
    async fn dequeue(&self, visibility_timeout: Duration) -> Result<Option<Message<T>>>;

    /// Renews a held lock for another `visibility_timeout`, fenced by `lock_token`.
    async fn extend(
        &self,
        id: &MessageId,
        lock_token: LockToken,
        visibility_timeout: Duration,
    ) -> Result<()>;

    /// Permanently removes a message once it has been fully processed.
    async fn finish(&self, id: &MessageId, lock_token: LockToken) -> Result<()>;
}
