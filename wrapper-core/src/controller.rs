//! The request lifecycle.
//!
//! [`RequestController`] owns the [`FormInput`] and the [`SubmissionState`]
//! and is the only place either one changes.
//! The network call runs on a worker task; its outcome comes back through
//! [`RequestController::next_outcome`] and is applied with
//! [`RequestController::resolve`] on the caller's side, so every transition
//! happens on the task that owns the controller.

use std::sync::Arc;

use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::JoinHandle,
};
use tracing::instrument;

use crate::{
    endpoint::{QueryEndpoint, QueryRequest, QueryResponse},
    error::{Error, Result},
    form::FormInput,
    model::ModelCatalog,
    state::{SubmissionState, Trigger},
};

pub type QueryOutcome = Result<QueryResponse>;

/// What happened to a call to [`RequestController::submit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submission {
    /// The request is on its way and the state is `Loading`.
    Issued,
    /// A precondition did not hold. Nothing changed.
    Ignored(Guard),
    /// The worker is gone. The state is `Failed`.
    Undeliverable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Guard {
    EmptyText,
    InFlight,
}

#[derive(Debug)]
pub struct RequestController {
    catalog: ModelCatalog,
    form: FormInput,
    state: SubmissionState,
    worker: QueryWorker,
}

impl RequestController {
    /// Must be called from within a tokio runtime.
    pub fn new(catalog: ModelCatalog, endpoint: Arc<dyn QueryEndpoint>) -> Self {
        let form = FormInput::new(catalog.default_model().clone());
        RequestController {
            catalog,
            form,
            state: SubmissionState::Idle,
            worker: QueryWorker::spawn(endpoint),
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn form(&self) -> &FormInput {
        &self.form
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn trigger(&self) -> Trigger {
        Trigger::of(&self.form, &self.state)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.form.set_text(text);
    }

    pub fn select_model(&mut self, id: &str) -> Result<()> {
        let model = self.catalog.resolve(id)?;
        tracing::debug!(%model, "model selected");
        self.form.set_model(model);
        Ok(())
    }

    #[instrument(skip(self), fields(state = self.state.name(), model = %self.form.model()))]
    pub fn submit(&mut self) -> Submission {
        if self.state.is_loading() {
            tracing::debug!(guard = %Guard::InFlight, "submission ignored");
            return Submission::Ignored(Guard::InFlight);
        }
        if !self.form.has_text() {
            tracing::debug!(guard = %Guard::EmptyText, "submission ignored");
            return Submission::Ignored(Guard::EmptyText);
        }

        let request = self.form.to_request();
        // replaces any previous response or error in one step
        self.transition(SubmissionState::Loading);

        match self.worker.request_sender.try_send(request) {
            Ok(()) => Submission::Issued,
            Err(error) => {
                tracing::error!(%error, "unable to hand request to the query worker");
                self.fail(&Error::WorkerClosed);
                Submission::Undeliverable
            }
        }
    }

    /// Waits for the in-flight request to finish.
    /// A worker that stops mid-request yields [`Error::WorkerClosed`];
    /// with nothing in flight a stopped worker yields `None`.
    pub async fn next_outcome(&mut self) -> Option<QueryOutcome> {
        match self.worker.outcome_receiver.recv().await {
            Some(outcome) => Some(outcome),
            None if self.state.is_loading() => {
                tracing::error!("query worker stopped with a request in flight");
                Some(Err(Error::WorkerClosed))
            }
            None => None,
        }
    }

    pub fn resolve(&mut self, outcome: QueryOutcome) {
        if !self.state.is_loading() {
            tracing::warn!(state = self.state.name(), "outcome arrived with nothing in flight");
            return;
        }

        match outcome {
            Ok(QueryResponse { response }) => {
                self.transition(SubmissionState::Succeeded(response.into()));
            }
            Err(error) => self.fail(&error),
        }
    }

    /// [`Self::next_outcome`] followed by [`Self::resolve`],
    /// for callers that are not running their own event loop.
    pub async fn settle(&mut self) -> &SubmissionState {
        if self.state.is_loading() {
            match self.next_outcome().await {
                Some(outcome) => self.resolve(outcome),
                None => self.fail(&Error::WorkerClosed),
            }
        }
        &self.state
    }

    fn fail(&mut self, error: &Error) {
        tracing::error!(
            %error,
            kind = %error.failure_kind(),
            "submission failed"
        );
        self.transition(SubmissionState::Failed(error.user_message().into()));
    }

    fn transition(&mut self, next: SubmissionState) {
        tracing::info!(from = self.state.name(), to = next.name(), "submission state changed");
        self.state = next;
    }
}

#[derive(Debug)]
struct QueryWorker {
    _handle: JoinHandle<()>,
    request_sender: Sender<QueryRequest>,
    outcome_receiver: Receiver<QueryOutcome>,
}

impl QueryWorker {
    fn spawn(endpoint: Arc<dyn QueryEndpoint>) -> Self {
        // one slot each way: at most one request is ever in flight
        let (request_sender, mut request_receiver) = mpsc::channel::<QueryRequest>(1);
        let (outcome_sender, outcome_receiver) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            while let Some(request) = request_receiver.recv().await {
                tracing::debug!(model = %request.model, "issuing query");
                let outcome = endpoint.query(&request).await;
                if outcome_sender.send(outcome).await.is_err() {
                    tracing::info!("outcome receiver dropped");
                    break;
                }
            }
            tracing::info!("query worker closed");
        });

        QueryWorker {
            _handle: handle,
            request_sender,
            outcome_receiver,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    use super::*;
    use crate::state::Region;

    /// Answers every query with the same response after `gate` opens.
    #[derive(Debug, Default)]
    struct GatedEndpoint {
        calls: AtomicUsize,
        gate: Notify,
    }

    #[async_trait]
    impl QueryEndpoint for GatedEndpoint {
        async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(QueryResponse {
                response: format!("echo: {}", request.text),
            })
        }
    }

    fn controller(endpoint: Arc<GatedEndpoint>) -> RequestController {
        RequestController::new(ModelCatalog::default(), endpoint)
    }

    #[tokio::test]
    async fn empty_text_is_ignored() {
        let endpoint = Arc::new(GatedEndpoint::default());
        let mut controller = controller(endpoint.clone());

        assert_eq!(controller.submit(), Submission::Ignored(Guard::EmptyText));
        assert_eq!(controller.state(), &SubmissionState::Idle);
        assert_eq!(controller.trigger(), Trigger::Disabled);

        tokio::task::yield_now().await;
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_submit_while_loading_is_ignored() {
        let endpoint = Arc::new(GatedEndpoint::default());
        let mut controller = controller(endpoint.clone());
        controller.set_text("hi");

        assert_eq!(controller.submit(), Submission::Issued);
        assert_eq!(controller.submit(), Submission::Ignored(Guard::InFlight));
        assert_eq!(controller.trigger(), Trigger::InProgress);

        endpoint.gate.notify_one();
        let state = controller.settle().await.clone();

        assert_eq!(state, SubmissionState::Succeeded("echo: hi".into()));
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loading_clears_previous_result() {
        let endpoint = Arc::new(GatedEndpoint::default());
        let mut controller = controller(endpoint.clone());
        controller.set_text("first");
        controller.submit();
        endpoint.gate.notify_one();
        controller.settle().await;
        assert!(matches!(controller.state().region(), Region::Response(_)));

        controller.set_text("second");
        controller.submit();

        assert_eq!(controller.state(), &SubmissionState::Loading);
        assert_eq!(controller.state().region(), Region::LoadingIndicator);

        endpoint.gate.notify_one();
        controller.settle().await;
        assert_eq!(
            controller.state().region(),
            Region::Response("echo: second")
        );
    }

    #[tokio::test]
    async fn select_model_rejects_unknown_ids() {
        let endpoint = Arc::new(GatedEndpoint::default());
        let mut controller = controller(endpoint);

        assert!(controller.select_model("claude-3").is_ok());
        assert_eq!(controller.form().model().as_str(), "claude-3");

        let result = controller.select_model("gpt-5");
        assert!(matches!(result, Err(Error::UnknownModel(id)) if id == "gpt-5"));
        assert_eq!(controller.form().model().as_str(), "claude-3");
        assert_eq!(controller.state(), &SubmissionState::Idle);
    }

    #[tokio::test]
    async fn stray_outcome_is_ignored() {
        let endpoint = Arc::new(GatedEndpoint::default());
        let mut controller = controller(endpoint);

        controller.resolve(Ok(QueryResponse {
            response: "late".into(),
        }));

        assert_eq!(controller.state(), &SubmissionState::Idle);
    }

    #[derive(Debug)]
    struct PanickingEndpoint;

    #[async_trait]
    impl QueryEndpoint for PanickingEndpoint {
        async fn query(&self, _request: &QueryRequest) -> Result<QueryResponse> {
            panic!("endpoint blew up");
        }
    }

    #[tokio::test]
    async fn dead_worker_fails_the_submission() {
        let mut controller = RequestController::new(
            ModelCatalog::default(),
            Arc::new(PanickingEndpoint),
        );
        controller.set_text("hi");
        assert_eq!(controller.submit(), Submission::Issued);

        let outcome = controller.next_outcome().await;
        assert!(matches!(outcome, Some(Err(Error::WorkerClosed))));
        controller.resolve(outcome.unwrap());

        assert_eq!(
            controller.state(),
            &SubmissionState::Failed("Something went wrong".into())
        );
        assert_eq!(controller.trigger(), Trigger::Enabled);
        assert!(controller.next_outcome().await.is_none());

        assert_eq!(controller.submit(), Submission::Undeliverable);
        assert!(matches!(controller.state(), SubmissionState::Failed(_)));
    }

    #[tokio::test]
    async fn settle_without_request_keeps_state() {
        let endpoint = Arc::new(GatedEndpoint::default());
        let mut controller = controller(endpoint);

        assert_eq!(controller.settle().await, &SubmissionState::Idle);
    }
}
