use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::error::CompareError;
use crate::files::MAX_FILES;
use crate::models::{ComparisonResult, SelectedFile};
use crate::network::{CompareOutcome, CompareRequest, ComparisonClient};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    /// `None` when the service answered without a result to show.
    Succeeded(Option<ComparisonResult>),
    Failed(String),
}

/// Bookkeeping of the last applied success, shown next to the result.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub comparison_id: Option<String>,
    pub at: DateTime<Local>,
}

/// A submission that passed the guard and is waiting for its network call.
pub struct PendingSubmission {
    pub seq: u64,
    pub request: CompareRequest,
}

#[derive(Default)]
struct Inner {
    state: SubmissionState,
    validation_error: Option<String>,
    latest_seq: u64,
    completion: Option<Completion>,
}

/// Owns the submission state machine.
///
/// Every submission gets a sequence number; a resolution is applied only if
/// it belongs to the latest one issued, so a slow older call never overwrites
/// the outcome of a newer one. Cloning shares the same state.
#[derive(Clone)]
pub struct SubmissionController {
    client: Arc<dyn ComparisonClient>,
    inner: Arc<Mutex<Inner>>,
}

impl SubmissionController {
    pub fn new(client: Arc<dyn ComparisonClient>) -> Self {
        Self {
            client,
            inner: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.lock().state, SubmissionState::Loading)
    }

    /// The local precondition message, kept apart from service errors.
    pub fn validation_error(&self) -> Option<String> {
        self.lock().validation_error.clone()
    }

    pub fn clear_validation_error(&self) {
        self.lock().validation_error = None;
    }

    pub fn completion(&self) -> Option<Completion> {
        self.lock().completion.clone()
    }

    /// Checks the guard, moves to Loading and builds the request.
    /// With the wrong number of files the state is left untouched.
    pub fn begin(&self, files: &[SelectedFile], prompt: &str) -> Result<PendingSubmission, CompareError> {
        let mut inner = self.lock();
        if files.len() != MAX_FILES {
            let err = CompareError::WrongFileCount { found: files.len() };
            debug!(found = files.len(), "submission refused by precondition");
            inner.validation_error = Some(err.display_message());
            return Err(err);
        }

        inner.latest_seq += 1;
        inner.state = SubmissionState::Loading;
        inner.validation_error = None;
        info!(seq = inner.latest_seq, "submission started");

        Ok(PendingSubmission {
            seq: inner.latest_seq,
            request: CompareRequest {
                files: files.to_vec(),
                prompt: prompt.to_string(),
            },
        })
    }

    /// Applies the outcome of submission `seq`. Returns false when a newer
    /// submission has been issued since, in which case nothing changes.
    pub fn resolve(&self, seq: u64, outcome: Result<CompareOutcome, CompareError>) -> bool {
        let mut inner = self.lock();
        if seq != inner.latest_seq {
            debug!(seq, latest = inner.latest_seq, "stale resolution discarded");
            return false;
        }
        match outcome {
            Ok(CompareOutcome { comparison_id, result }) => {
                info!(seq, comparison_id = ?comparison_id, "comparison succeeded");
                inner.completion = Some(Completion { comparison_id, at: Local::now() });
                inner.state = SubmissionState::Succeeded(result);
            }
            Err(err) => {
                warn!(seq, error = %err, "comparison failed");
                inner.state = SubmissionState::Failed(err.display_message());
            }
        }
        true
    }

    /// Runs the network call of a pending submission and resolves it.
    pub async fn complete(&self, pending: PendingSubmission) -> bool {
        let PendingSubmission { seq, request } = pending;
        let outcome = self.client.compare(request).await;
        self.resolve(seq, outcome)
    }

    /// Checks the guard and moves to Loading right away; the returned future
    /// performs the call and resolves it. It resolves to false when a newer
    /// submission has been issued meanwhile.
    pub fn submit(
        &self,
        files: &[SelectedFile],
        prompt: &str,
    ) -> Result<impl Future<Output = bool> + Send + use<>, CompareError> {
        let pending = self.begin(files, prompt)?;
        let controller = self.clone();
        Ok(async move { controller.complete(pending).await })
    }

    /// Starts a cycle in the background; the state is updated when the call returns.
    pub fn spawn_submit(&self, runtime: &Handle, files: &[SelectedFile], prompt: &str) -> Result<(), CompareError> {
        let call = self.submit(files, prompt)?;
        runtime.spawn(call);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::GENERIC_FAILURE;
    use crate::models::PDF_MIME;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns queued outcomes in order and counts calls.
    #[derive(Default)]
    pub(crate) struct MockComparisonClient {
        outcomes: Mutex<VecDeque<Result<CompareOutcome, CompareError>>>,
        pub calls: AtomicUsize,
        pub last_prompt: Mutex<Option<String>>,
    }

    impl MockComparisonClient {
        pub(crate) fn queue(&self, outcome: Result<CompareOutcome, CompareError>) {
            self.outcomes.lock().unwrap().push_back(outcome);
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ComparisonClient for MockComparisonClient {
        async fn compare(&self, request: CompareRequest) -> Result<CompareOutcome, CompareError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(request.prompt);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(CompareError::Status { status: 500, detail: None }))
        }
    }

    pub(crate) fn success(recommendation: &str) -> Result<CompareOutcome, CompareError> {
        Ok(CompareOutcome {
            comparison_id: Some("cmp-1".into()),
            result: Some(ComparisonResult {
                recommendation: Some(recommendation.into()),
                ..Default::default()
            }),
        })
    }

    fn two_files() -> Vec<SelectedFile> {
        vec![
            SelectedFile::new("a.pdf", PDF_MIME, b"%PDF-a".to_vec()),
            SelectedFile::new("b.pdf", PDF_MIME, b"%PDF-b".to_vec()),
        ]
    }

    fn controller() -> (SubmissionController, Arc<MockComparisonClient>) {
        let client = Arc::new(MockComparisonClient::default());
        (SubmissionController::new(client.clone()), client)
    }

    #[tokio::test]
    async fn wrong_file_count_never_calls_the_service() {
        let (controller, client) = controller();
        for count in [0, 1, 3] {
            let files: Vec<SelectedFile> = two_files().into_iter().cycle().take(count).collect();
            let Err(err) = controller.submit(&files, "prompt") else {
                panic!("submission with {count} files was accepted");
            };
            assert!(matches!(err, CompareError::WrongFileCount { found } if found == count));
        }
        assert_eq!(client.calls(), 0);
        assert_eq!(controller.state(), SubmissionState::Idle);
        assert_eq!(controller.validation_error().as_deref(), Some("Please select exactly two PDF files."));
    }

    #[tokio::test]
    async fn precondition_failure_keeps_previous_result() {
        let (controller, client) = controller();
        client.queue(success("Devis 1"));
        controller.submit(&two_files(), "prompt").unwrap().await;

        let before = controller.state();
        assert!(controller.submit(&two_files()[..1], "prompt").is_err());
        assert_eq!(controller.state(), before);
        assert!(controller.validation_error().is_some());
    }

    #[tokio::test]
    async fn success_stores_result_and_prompt_is_forwarded() {
        let (controller, client) = controller();
        client.queue(success("Devis 1"));
        controller.submit(&two_files(), "Compare les délais").unwrap().await;

        match controller.state() {
            SubmissionState::Succeeded(Some(result)) => assert_eq!(result.recommendation.as_deref(), Some("Devis 1")),
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(client.last_prompt.lock().unwrap().as_deref(), Some("Compare les délais"));
        assert_eq!(controller.completion().unwrap().comparison_id.as_deref(), Some("cmp-1"));
        assert_eq!(controller.validation_error(), None);
    }

    #[tokio::test]
    async fn success_without_result_is_not_a_failure() {
        let (controller, client) = controller();
        client.queue(Ok(CompareOutcome { comparison_id: Some("cmp-2".into()), result: None }));
        controller.submit(&two_files(), "prompt").unwrap().await;

        assert_eq!(controller.state(), SubmissionState::Succeeded(None));
        assert_eq!(crate::render::render(&controller.state()), crate::render::RenderedView::Empty);
    }

    #[tokio::test]
    async fn service_detail_becomes_the_failure_message() {
        let (controller, client) = controller();
        client.queue(Err(CompareError::Status { status: 400, detail: Some("fichier invalide".into()) }));
        controller.submit(&two_files(), "prompt").unwrap().await;
        assert_eq!(controller.state(), SubmissionState::Failed("fichier invalide".into()));
    }

    #[tokio::test]
    async fn failure_without_detail_uses_fallback() {
        let (controller, client) = controller();
        client.queue(Err(CompareError::Status { status: 502, detail: None }));
        controller.submit(&two_files(), "prompt").unwrap().await;
        assert_eq!(controller.state(), SubmissionState::Failed(GENERIC_FAILURE.into()));
    }

    #[test]
    fn begin_clears_previous_outcome_and_enters_loading() {
        let (controller, _client) = controller();
        controller.resolve(0, Err(CompareError::Status { status: 500, detail: None }));
        assert!(matches!(controller.state(), SubmissionState::Failed(_)));

        let pending = controller.begin(&two_files(), "prompt").unwrap();
        assert_eq!(pending.seq, 1);
        assert_eq!(pending.request.files.len(), 2);
        assert!(controller.is_loading());
    }

    #[test]
    fn stale_resolution_is_discarded() {
        let (controller, _client) = controller();
        let first = controller.begin(&two_files(), "prompt").unwrap();
        let second = controller.begin(&two_files(), "prompt").unwrap();
        assert!(second.seq > first.seq);

        assert!(controller.resolve(second.seq, success("Devis 2")));
        assert!(!controller.resolve(first.seq, Err(CompareError::Status { status: 500, detail: None })));

        match controller.state() {
            SubmissionState::Succeeded(Some(result)) => assert_eq!(result.recommendation.as_deref(), Some("Devis 2")),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn older_call_resolving_first_does_not_end_loading() {
        let (controller, _client) = controller();
        let first = controller.begin(&two_files(), "prompt").unwrap();
        let _second = controller.begin(&two_files(), "prompt").unwrap();
        assert!(!controller.resolve(first.seq, success("Devis 1")));
        assert!(controller.is_loading());
    }

    #[tokio::test]
    async fn spawned_submission_resolves_in_background() {
        let (controller, client) = controller();
        client.queue(success("Devis 1"));
        controller
            .spawn_submit(&Handle::current(), &two_files(), "prompt")
            .unwrap();
        assert!(controller.is_loading());

        for _ in 0..100 {
            if !controller.is_loading() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(matches!(controller.state(), SubmissionState::Succeeded(_)));
    }
}
