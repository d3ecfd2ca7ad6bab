use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::StoreError;
use crate::executor::{WriteExecutor, WriteJob, WriteOutcome};

type Reply = oneshot::Sender<Result<WriteOutcome, StoreError>>;

/// Single-flight FIFO serializer for writes.
///
/// Jobs run one at a time in the order `enqueue` was called. Each job gets
/// `timeout`; when it runs over, the caller gets `WriteTimeout`, the executor is
/// interrupted and the next job starts.
pub struct WriteQueue {
    tx: Mutex<Option<mpsc::UnboundedSender<(WriteJob, Reply)>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WriteQueue {
    /// Spawn the queue worker. Must be called inside a tokio runtime.
    pub fn spawn(executor: Arc<dyn WriteExecutor>, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(executor, rx, timeout));
        Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Queue `job`. Its position is fixed when this returns, before the
    /// returned future is first polled.
    pub fn enqueue(
        &self,
        job: WriteJob,
    ) -> impl Future<Output = Result<WriteOutcome, StoreError>> + Send + 'static {
        let (reply, rx) = oneshot::channel();
        let queued = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|tx| tx.send((job, reply)).is_ok());

        async move {
            if !queued {
                return Err(StoreError::QueueClosed);
            }
            rx.await.map_err(|_| StoreError::QueueClosed)?
        }
    }

    /// Stop accepting jobs and wait for the queued ones to finish.
    pub async fn shutdown(&self) {
        drop(self.tx.lock().unwrap_or_else(PoisonError::into_inner).take());
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker
            && let Err(e) = worker.await
        {
            tracing::error!("Write queue worker failed: {e}");
        }
    }
}

async fn run(
    executor: Arc<dyn WriteExecutor>,
    mut rx: mpsc::UnboundedReceiver<(WriteJob, Reply)>,
    timeout: Duration,
) {
    while let Some((job, reply)) = rx.recv().await {
        let task = {
            let executor = executor.clone();
            tokio::task::spawn_blocking(move || executor.execute(&job))
        };

        let result = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(StoreError::Join(e.to_string())),
            Err(_) => {
                tracing::warn!("Write exceeded {timeout:?}, interrupting");
                executor.interrupt();
                Err(StoreError::WriteTimeout(timeout))
            }
        };

        if let Err(e) = &result {
            tracing::debug!("Write failed: {e}");
        }
        // Caller may have gone away; the job still counted
        let _ = reply.send(result);
    }
    tracing::info!("Write queue drained");
}
