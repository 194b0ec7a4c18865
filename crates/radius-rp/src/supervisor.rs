//! Fans the control plane's long-running services — the ARM request pipeline and the worker
//! pool — out across tasks sharing one `SIGTERM` signal, and waits for both to drain before
//! returning, so a failed or interrupted supervisor never leaves orphaned work in flight.

use std::{net::SocketAddr, sync::Arc};

use radius_async_ops::AsyncOperationTracker;
use radius_core::utils::signal::SignalWatcher;
use radius_processor::DeploymentProcessor;
use radius_queue::{Queue, start_dequeuer};
use radius_render::RendererRegistry;
use radius_shared::time::Duration;
use radius_store::ResourceStore;
use radius_worker::{Deployer, WorkItem, pool};
use serde_json::Value;
use snafu::ResultExt as _;
use tokio::{net::TcpListener, sync::watch};
use tracing::info;

use crate::error::{BindListenerSnafu, Result, ServiceFailedSnafu, SignalSnafu};

/// Everything the host supervisor needs to run the ARM request pipeline (D) side by side with
/// the worker pool (F), sharing the resource store (A), the queue (B), the async-operation
/// tracker (E), the application model (I), and the deployment processor (H).
pub struct Supervisor<Q> {
    pub store: Arc<dyn ResourceStore<Value>>,
    pub queue: Arc<Q>,
    pub operations: Arc<dyn AsyncOperationTracker>,
    pub renderers: Arc<RendererRegistry>,
    pub processor: Arc<DeploymentProcessor>,
    pub http_addr: SocketAddr,
    pub worker_concurrency: usize,
    pub visibility_timeout: Duration,
    pub poll_interval: Duration,
}

impl<Q> Supervisor<Q>
where
    Q: Queue<WorkItem> + 'static,
{
    /// Runs until `SIGTERM` is received, then drains in-flight HTTP requests and worker tasks
    /// before returning.
    pub async fn run(self) -> Result<()> {
        let signal = SignalWatcher::<()>::sigterm().context(SignalSnafu)?;

        let api_state = radius_api::ApiState {
            store: self.store.clone(),
            queue: self.queue.clone(),
            operations: self.operations.clone(),
        };
        let router = radius_api::build_router(api_state);
        let listener =
            TcpListener::bind(self.http_addr)
                .await
                .context(BindListenerSnafu {
                    addr: self.http_addr.to_string(),
                })?;
        info!(addr = %self.http_addr, "ARM request pipeline listening");

        // `start_dequeuer` wants a plain bool watch, not a future; bridge the two so the queue
        // stops producing work items at the same moment the HTTP listener starts draining.
        let (dequeue_shutdown_tx, dequeue_shutdown_rx) = watch::channel(false);
        let dequeue_signal = signal.handle();
        tokio::spawn(async move {
            dequeue_signal.await;
            let _ = dequeue_shutdown_tx.send(true);
        });

        let receiver = start_dequeuer(
            self.queue.clone(),
            self.visibility_timeout,
            self.poll_interval,
            dequeue_shutdown_rx,
        );
        let deployer = Arc::new(Deployer {
            store: self.store.clone(),
            renderers: self.renderers.clone(),
            processor: self.processor.clone(),
            operations: self.operations.clone(),
        });
        let workers = pool::spawn(
            self.worker_concurrency,
            receiver,
            self.queue.clone(),
            deployer,
            self.visibility_timeout,
        );
        info!(concurrency = self.worker_concurrency, "worker pool started");

        axum::serve(listener, router)
            .with_graceful_shutdown(signal.handle())
            .await
            .context(ServiceFailedSnafu {
                service: "radius-api",
            })?;

        info!("HTTP listener stopped, waiting for worker pool to drain");
        for worker in workers {
            let _ = worker.await;
        }

        Ok(())
    }
}
