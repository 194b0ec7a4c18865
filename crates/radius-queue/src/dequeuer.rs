//! Adapts a polling [`Queue`] into a channel the worker pool can `select!` against.

use std::sync::Arc;

use radius_shared::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::{model::Message, queue::Queue};

/// Spawns a background task that repeatedly calls [`Queue::dequeue`] and forwards whatever it
/// receives over the returned channel, sleeping `poll_interval` between empty polls.
///
/// The task exits once `shutdown` resolves, dropping the sender so the worker pool's receive
/// loop drains naturally.
pub fn start_dequeuer<T, Q>(
    queue: Arc<Q>,
    visibility_timeout: Duration,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> mpsc::Receiver<Message<T>>
where
    T: Send + Sync + 'static,
    Q: Queue<T> + 'static,
{
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                _ = shutdown.changed() => break,
                dequeued = queue.dequeue(visibility_timeout) => {
                    match dequeued {
                        Ok(Some(message)) => {
                            if tx.send(message).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => {
                            tokio::time::sleep(poll_interval.into()).await;
                        }
                        Err(error) => {
                            warn!(%error, "failed to dequeue message, backing off");
                            tokio::time::sleep(poll_interval.into()).await;
                        }
                    }
                }
            }
        }

        debug!("dequeuer loop exiting, shutdown observed");
    });

    rx
}
