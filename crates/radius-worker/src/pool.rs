//! A fixed-size pool of tasks draining the deployment queue, each holding its lock open with
//! a periodic extend for as long as its work item is in flight.

use std::sync::Arc;

use radius_queue::{LockToken, Message, MessageId, Queue};
use radius_shared::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info, warn};

use crate::{deployer::Deployer, model::WorkItem};

/// Spawns `concurrency` tasks pulling from `receiver`, each processing one [`WorkItem`] at a
/// time through `deployer` and keeping its visibility lock alive via `queue` while it works.
pub fn spawn<Q>(
    concurrency: usize,
    receiver: mpsc::Receiver<Message<WorkItem>>,
    queue: Arc<Q>,
    deployer: Arc<Deployer>,
    visibility_timeout: Duration,
) -> Vec<tokio::task::JoinHandle<()>>
where
    Q: Queue<WorkItem> + 'static,
{
    let receiver = Arc::new(Mutex::new(receiver));

    (0..concurrency)
        .map(|worker_id| {
            let receiver = receiver.clone();
            let queue = queue.clone();
            let deployer = deployer.clone();
            tokio::spawn(async move {
                loop {
                    let message = {
                        let mut receiver = receiver.lock().await;
                        receiver.recv().await
                    };
                    let Some(message) = message else {
                        info!(worker_id, "queue closed, worker exiting");
                        break;
                    };

                    handle_one(&queue, &deployer, message, visibility_timeout).await;
                }
            })
        })
        .collect()
}

async fn handle_one<Q>(
    queue: &Arc<Q>,
    deployer: &Arc<Deployer>,
    message: Message<WorkItem>,
    visibility_timeout: Duration,
) where
    Q: Queue<WorkItem> + 'static,
{
    let extender = spawn_lock_extender(queue.clone(), message.id.clone(), message.lock_token, visibility_timeout);

    let result = deployer.process(&message.data).await;
    extender.abort();

    match result {
        Ok(()) => {
            if let Err(source) = queue.finish(&message.id, message.lock_token).await {
                warn!(%source, "failed to finish completed work item");
            }
        }
        Err(error) if error.is_transient() => {
            warn!(%error, "work item failed transiently, leaving it for redelivery");
        }
        Err(error) => {
            error!(%error, "work item failed permanently");
            deployer.fail(&message.data, error.to_string()).await;
            if let Err(source) = queue.finish(&message.id, message.lock_token).await {
                warn!(%source, "failed to finish permanently-failed work item");
            }
        }
    }
}

/// Renews the visibility lock at half its timeout for as long as the work item is processed;
/// aborted as soon as `process` returns so it never outlives the message it is extending.
fn spawn_lock_extender<Q, T>(
    queue: Arc<Q>,
    id: MessageId,
    lock_token: LockToken,
    visibility_timeout: Duration,
) -> tokio::task::AbortHandle
where
    Q: Queue<T> + 'static,
    T: Send + Sync + 'static,
{
    let period: std::time::Duration = visibility_timeout.into();
    let period = period / 2;

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            if queue.extend(&id, lock_token, visibility_timeout).await.is_err() {
                break;
            }
        }
    })
    .abort_handle()
}
