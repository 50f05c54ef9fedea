//! Batch queue lifecycle integration tests.
//!
//! These tests verify the queue with an all-mock pipeline:
//! - Submission through terminal states, including invalid requests
//! - Cancellation (before start, mid-run, idempotency, unknown jobs)
//! - The concurrency bound and drain liveness
//! - Panic isolation between jobs
//! - Scratch cleanup on every terminal path

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use slidecast_core::testing::{fixtures, MockComposer, MockImageFetcher};
use slidecast_core::{
    BatchQueue, JobId, JobRequest, JobStatus, Pipeline, PipelineConfig, QueueConfig, QueueError,
    Services,
};

/// Test helper wiring a queue to mock collaborators.
struct TestHarness {
    queue: BatchQueue,
    composer: Arc<MockComposer>,
    scratch_dir: TempDir,
    output_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        Self::with_concurrency(2).await
    }

    async fn with_concurrency(max_concurrent_jobs: usize) -> Self {
        let scratch_dir = TempDir::new().expect("Failed to create scratch dir");
        let output_dir = TempDir::new().expect("Failed to create output dir");

        let composer = Arc::new(MockComposer::new());
        let fetcher = Arc::new(MockImageFetcher::with_images(3).await);
        let services = fixtures::mock_services()
            .await
            .composer(composer.clone())
            .images(fetcher)
            .build();

        let config = QueueConfig {
            max_concurrent_jobs,
            scratch_root: scratch_dir.path().to_path_buf(),
            progress_buffer: 64,
        };
        let pipeline = Pipeline::new(services, PipelineConfig::default());

        Self {
            queue: BatchQueue::new(config, pipeline),
            composer,
            scratch_dir,
            output_dir,
        }
    }

    fn request(&self) -> JobRequest {
        fixtures::job_request(self.output_dir.path())
    }

    /// Poll until the job reaches a terminal state.
    async fn wait_terminal(&self, job_id: JobId) -> JobStatus {
        for _ in 0..500 {
            let report = self.queue.status(job_id).await.expect("job should exist");
            if report.status.is_terminal() {
                return report.status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {job_id} did not reach a terminal state");
    }

    fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

// =============================================================================
// Submission and Terminal States
// =============================================================================

#[tokio::test]
async fn test_submitted_job_succeeds_and_reports_output() {
    let harness = TestHarness::new().await;

    let job_id = harness.queue.submit(harness.request()).await.unwrap();
    let status = harness.wait_terminal(job_id).await;

    match status {
        JobStatus::Succeeded { output } => {
            assert!(output.exists());
            assert!(output.starts_with(harness.output_dir.path()));
        }
        other => panic!("expected Succeeded, got {other:?}"),
    }

    let report = harness.queue.status(job_id).await.unwrap();
    let last = report.last_progress.expect("progress was emitted");
    assert_eq!(last.percent, Some(100.0));
}

#[tokio::test]
async fn test_invalid_request_fails_immediately() {
    let harness = TestHarness::new().await;
    let mut request = harness.request();
    request.text = String::new();

    let job_id = harness.queue.submit(request).await.unwrap();

    // No polling needed: the entry is terminal at submission time.
    let report = harness.queue.status(job_id).await.unwrap();
    match report.status {
        JobStatus::Failed { error } => assert!(error.contains("text"), "error: {error}"),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(harness.composer.recorded_compositions().await.len(), 0);
}

#[tokio::test]
async fn test_status_of_unknown_job_is_an_error() {
    let harness = TestHarness::new().await;
    let result = harness.queue.status(JobId::new()).await;
    assert!(matches!(result, Err(QueueError::JobNotFound(_))));
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_running_job() {
    let harness = TestHarness::new().await;
    harness
        .composer
        .set_latency(Duration::from_millis(500))
        .await;

    let job_id = harness.queue.submit(harness.request()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(harness.queue.cancel(job_id).await.unwrap());
    let status = harness.wait_terminal(job_id).await;
    assert_eq!(status, JobStatus::Cancelled);

    let files = std::fs::read_dir(harness.output_dir.path()).unwrap().count();
    assert_eq!(files, 0, "cancelled job produced no output");
}

#[tokio::test]
async fn test_cancel_waiting_job_never_runs() {
    let harness = TestHarness::with_concurrency(1).await;
    harness
        .composer
        .set_latency(Duration::from_millis(300))
        .await;

    let first = harness.queue.submit(harness.request()).await.unwrap();
    let second = harness.queue.submit(harness.request()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(harness.queue.cancel(second).await.unwrap());

    assert_eq!(harness.wait_terminal(second).await, JobStatus::Cancelled);
    assert!(matches!(
        harness.wait_terminal(first).await,
        JobStatus::Succeeded { .. }
    ));
    // Only the first job ever reached the composer.
    assert_eq!(harness.composer.recorded_compositions().await.len(), 1);
}

#[tokio::test]
async fn test_cancelled_queued_job_settles_without_waiting_for_a_permit() {
    let harness = TestHarness::with_concurrency(1).await;
    harness
        .composer
        .set_latency(Duration::from_millis(800))
        .await;

    let running = harness.queue.submit(harness.request()).await.unwrap();
    let queued = harness.queue.submit(harness.request()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(harness.queue.cancel(queued).await.unwrap());

    // The queued job reaches Cancelled while the only permit is still held.
    assert_eq!(harness.wait_terminal(queued).await, JobStatus::Cancelled);
    let report = harness.queue.status(running).await.unwrap();
    assert!(
        !report.status.is_terminal(),
        "first job still holds the permit"
    );

    assert!(matches!(
        harness.wait_terminal(running).await,
        JobStatus::Succeeded { .. }
    ));
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let harness = TestHarness::new().await;
    harness
        .composer
        .set_latency(Duration::from_millis(300))
        .await;

    let job_id = harness.queue.submit(harness.request()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(harness.queue.cancel(job_id).await.unwrap());
    assert!(
        !harness.queue.cancel(job_id).await.unwrap(),
        "second cancel is a no-op"
    );

    harness.wait_terminal(job_id).await;
    assert!(
        !harness.queue.cancel(job_id).await.unwrap(),
        "cancelling a terminal job is a no-op"
    );
}

#[tokio::test]
async fn test_cancel_unknown_job_is_an_error() {
    let harness = TestHarness::new().await;
    let result = harness.queue.cancel(JobId::new()).await;
    assert!(matches!(result, Err(QueueError::JobNotFound(_))));
}

// =============================================================================
// Concurrency and Drain
// =============================================================================

#[tokio::test]
async fn test_concurrency_bound_is_respected() {
    let harness = TestHarness::with_concurrency(2).await;
    harness
        .composer
        .set_latency(Duration::from_millis(200))
        .await;

    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(harness.queue.submit(harness.request()).await.unwrap());
    }

    // Sample while jobs are in flight.
    for _ in 0..10 {
        let status = harness.queue.queue_status().await;
        assert!(
            status.running <= 2,
            "running={} exceeds the bound",
            status.running
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    for id in ids {
        assert!(matches!(
            harness.wait_terminal(id).await,
            JobStatus::Succeeded { .. }
        ));
    }
    assert_eq!(harness.composer.recorded_compositions().await.len(), 4);
}

#[tokio::test]
async fn test_drain_waits_for_everything_and_rejects_new_work() {
    let harness = TestHarness::with_concurrency(1).await;
    harness
        .composer
        .set_latency(Duration::from_millis(100))
        .await;

    for _ in 0..3 {
        harness.queue.submit(harness.request()).await.unwrap();
    }

    harness.queue.drain().await;

    let status = harness.queue.queue_status().await;
    assert!(status.draining);
    assert_eq!(status.total, 3);
    assert_eq!(status.succeeded, 3);
    assert_eq!(status.running, 0);
    assert_eq!(status.pending, 0);

    let result = harness.queue.submit(harness.request()).await;
    assert!(matches!(result, Err(QueueError::ShuttingDown)));
}

// =============================================================================
// Panic Isolation
// =============================================================================

#[tokio::test]
async fn test_panicking_collaborator_fails_only_its_own_job() {
    let harness = TestHarness::new().await;

    harness.composer.set_panic(true).await;
    let poisoned = harness.queue.submit(harness.request()).await.unwrap();
    match harness.wait_terminal(poisoned).await {
        JobStatus::Failed { error } => assert!(error.contains("panicked"), "error: {error}"),
        other => panic!("expected Failed, got {other:?}"),
    }

    // The queue survives and the next job is unaffected.
    harness.composer.set_panic(false).await;
    let healthy = harness.queue.submit(harness.request()).await.unwrap();
    assert!(matches!(
        harness.wait_terminal(healthy).await,
        JobStatus::Succeeded { .. }
    ));
}

// =============================================================================
// Scratch Cleanup
// =============================================================================

#[tokio::test]
async fn test_scratch_is_cleaned_on_every_terminal_path() {
    let harness = TestHarness::new().await;

    // Success path.
    let ok = harness.queue.submit(harness.request()).await.unwrap();
    harness.wait_terminal(ok).await;
    assert_eq!(harness.scratch_entries(), 0);

    // Cancelled path.
    harness
        .composer
        .set_latency(Duration::from_millis(300))
        .await;
    let cancelled = harness.queue.submit(harness.request()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    harness.queue.cancel(cancelled).await.unwrap();
    harness.wait_terminal(cancelled).await;
    assert_eq!(harness.scratch_entries(), 0);

    // Panic path.
    harness.composer.set_latency(Duration::from_millis(0)).await;
    harness.composer.set_panic(true).await;
    let panicked = harness.queue.submit(harness.request()).await.unwrap();
    harness.wait_terminal(panicked).await;
    assert_eq!(harness.scratch_entries(), 0);
}
