use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

use pdfsum_core::models::{Language, SummaryStyle};

/// One summary generation request handed to the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryJob {
    pub summary_id: Uuid,
    pub pdf_id: Uuid,
    pub language: Language,
    pub style: SummaryStyle,
}

/// Final state reached by a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed(String),
}

/// Executes a single job. The outcome is already persisted by the handler when
/// this returns; the queue only logs it.
#[async_trait::async_trait]
pub trait SummaryJobHandler: Send + Sync {
    async fn handle(&self, job: SummaryJob) -> JobOutcome;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("summary queue is full")]
    Full,

    #[error("summary queue is closed")]
    Closed,
}

/// Bounded summary job queue
///
/// Jobs wait in a channel of `queue_size` slots; at most `max_concurrent` of them
/// run at once. A full channel rejects new jobs instead of waiting.
#[derive(Clone)]
pub struct SummaryJobQueue {
    tx: mpsc::Sender<SummaryJob>,
}

impl SummaryJobQueue {
    /// Create the queue and spawn its worker pool on the current runtime.
    pub fn new(handler: Arc<dyn SummaryJobHandler>, max_concurrent: usize, queue_size: usize) -> Self {
        let queue_size = queue_size.max(1);
        let max_concurrent = max_concurrent.max(1);

        let (tx, rx) = mpsc::channel(queue_size);

        tokio::spawn(async move {
            Self::worker_pool(rx, handler, max_concurrent).await;
        });

        tracing::info!(
            queue_size = queue_size,
            max_concurrent = max_concurrent,
            "Summary job queue initialized with bounded channel"
        );

        Self { tx }
    }

    #[tracing::instrument(skip(self), fields(summary_id = %job.summary_id, pdf_id = %job.pdf_id))]
    pub fn submit(&self, job: SummaryJob) -> Result<(), QueueError> {
        tracing::info!("Enqueuing summary job");

        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!("Summary job queue is full, rejecting job");
                QueueError::Full
            }
            mpsc::error::TrySendError::Closed(_) => {
                tracing::error!("Summary job queue is closed");
                QueueError::Closed
            }
        })
    }

    async fn worker_pool(
        mut rx: mpsc::Receiver<SummaryJob>,
        handler: Arc<dyn SummaryJobHandler>,
        max_concurrent: usize,
    ) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        while let Some(job) = rx.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let handler = handler.clone();

            tokio::spawn(async move {
                let _permit = permit;
                Self::process_job(job, handler).await;
            });
        }

        tracing::info!("Summary job queue worker pool stopped");
    }

    #[tracing::instrument(skip(handler), fields(summary_id = %job.summary_id, job.status = tracing::field::Empty))]
    async fn process_job(job: SummaryJob, handler: Arc<dyn SummaryJobHandler>) {
        let start = std::time::Instant::now();
        tracing::info!(pdf_id = %job.pdf_id, "Starting summary job");

        let outcome = handler.handle(job).await;
        let elapsed = start.elapsed();

        match outcome {
            JobOutcome::Completed => {
                tracing::Span::current().record("job.status", "completed");
                tracing::info!(
                    duration_ms = elapsed.as_millis() as u64,
                    "Summary job completed"
                );
            }
            JobOutcome::Failed(reason) => {
                tracing::Span::current().record("job.status", "failed");
                tracing::warn!(
                    reason = %reason,
                    duration_ms = elapsed.as_millis() as u64,
                    "Summary job failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn job() -> SummaryJob {
        SummaryJob {
            summary_id: Uuid::new_v4(),
            pdf_id: Uuid::new_v4(),
            language: Language::En,
            style: SummaryStyle::Simple,
        }
    }

    /// Blocks every job until released, tracking the peak number running at once.
    struct GatedHandler {
        release: Notify,
        running: AtomicUsize,
        peak: AtomicUsize,
        done: AtomicUsize,
    }

    impl GatedHandler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                release: Notify::new(),
                running: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                done: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl SummaryJobHandler for GatedHandler {
        async fn handle(&self, _job: SummaryJob) -> JobOutcome {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.release.notified().await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            self.done.fetch_add(1, Ordering::SeqCst);
            JobOutcome::Completed
        }
    }

    async fn wait_until(cond: impl Fn() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let handler = GatedHandler::new();
        let queue = SummaryJobQueue::new(handler.clone(), 2, 10);

        for _ in 0..5 {
            queue.submit(job()).unwrap();
        }

        wait_until(|| handler.running.load(Ordering::SeqCst) == 2).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(handler.running.load(Ordering::SeqCst), 2);

        while handler.done.load(Ordering::SeqCst) < 5 {
            handler.release.notify_waiters();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(handler.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_full_queue_rejects_immediately() {
        let handler = GatedHandler::new();
        let queue = SummaryJobQueue::new(handler.clone(), 1, 1);

        // First job occupies the only worker
        queue.submit(job()).unwrap();
        wait_until(|| handler.running.load(Ordering::SeqCst) == 1).await;

        // Second job is pulled by the dispatcher, which then waits for a permit
        queue.submit(job()).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Third fills the single channel slot, fourth is rejected
        queue.submit(job()).unwrap();
        assert_eq!(queue.submit(job()), Err(QueueError::Full));

        while handler.done.load(Ordering::SeqCst) < 3 {
            handler.release.notify_waiters();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}
