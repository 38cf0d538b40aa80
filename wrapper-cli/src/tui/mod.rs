use std::time::Duration;

use event::{EventDefinitions, EventProcessor, InputMode};
use form::{FormView as _, FormViewModel};
use futures::StreamExt as _;
use ratatui::{crossterm::event::Event, DefaultTerminal, Frame};
use wrapper_core::controller::{QueryOutcome, RequestController, Submission};

use crate::error::{Error, Result};

pub mod event;
pub mod form;
pub mod input;
pub mod models;
pub mod output;
mod widgets_ext;

pub struct AppContext {
    controller: RequestController,
    event_processor: EventProcessor,
    view: FormViewModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    TextChanged,
    Submit,
    SelectModel(usize),
    InputMode(InputMode),
    Quit,
}

impl AppContext {
    pub fn new(controller: RequestController, keymap: EventDefinitions) -> Self {
        Self {
            controller,
            event_processor: EventProcessor::new(keymap),
            view: Default::default(),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        frame.form_view(frame.area(), &mut self.view, &self.controller);
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> anyhow::Result<()> {
        let period = Duration::from_secs_f32(1.0 / 15.0);
        let mut interval = tokio::time::interval(period);
        let mut events = ratatui::crossterm::event::EventStream::new();
        loop {
            tokio::select! {
                _ = interval.tick() => { terminal.draw(|frame| self.draw(frame))?; },
                Some(Ok(event)) = events.next() => {
                    if let Some(app_event) = self.handle_input(event) {
                        if !self.handle_event(app_event)? {
                            return Ok(());
                        }
                    }
                },
                Some(outcome) = self.controller.next_outcome() => {
                    self.handle_outcome(outcome);
                }
            }
        }
    }

    fn handle_outcome(&mut self, outcome: QueryOutcome) {
        self.controller.resolve(outcome);
        self.view.output.reset();
    }

    fn handle_input(&mut self, event: Event) -> Option<AppEvent> {
        let action = self.event_processor.process(event);
        self.view.handle_action(action, &self.controller)
    }

    /// Returns true if the event was handled
    /// and false if the app should quit.
    fn handle_event(&mut self, event: AppEvent) -> Result<bool> {
        match event {
            AppEvent::TextChanged => {
                self.controller.set_text(self.view.input.text());
            }
            AppEvent::Submit => match self.controller.submit() {
                Submission::Issued | Submission::Undeliverable => self.view.output.reset(),
                Submission::Ignored(guard) => tracing::debug!(%guard, "submit ignored"),
            },
            AppEvent::SelectModel(index) => {
                let id = self
                    .controller
                    .catalog()
                    .get(index)
                    .map(|option| option.id.clone())
                    .ok_or(Error::BadIndex {
                        index,
                        msg: "no model at this position",
                    })?;
                self.controller.select_model(id.as_str())?;
            }
            AppEvent::InputMode(input_mode) => self.event_processor.input_mode(input_mode),
            AppEvent::Quit => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use wrapper_core::{
        endpoint::{QueryEndpoint, QueryRequest, QueryResponse},
        model::ModelCatalog,
        state::{SubmissionState, Trigger},
    };

    use super::*;

    #[derive(Debug)]
    struct EchoEndpoint;

    #[async_trait]
    impl QueryEndpoint for EchoEndpoint {
        async fn query(&self, request: &QueryRequest) -> wrapper_core::Result<QueryResponse> {
            Ok(QueryResponse {
                response: format!("{}: {}", request.model, request.text),
            })
        }
    }

    #[derive(Debug)]
    struct PanickingEndpoint;

    #[async_trait]
    impl QueryEndpoint for PanickingEndpoint {
        async fn query(&self, _request: &QueryRequest) -> wrapper_core::Result<QueryResponse> {
            panic!("endpoint blew up");
        }
    }

    fn app_with(endpoint: Arc<dyn QueryEndpoint>) -> AppContext {
        AppContext::new(
            RequestController::new(ModelCatalog::default(), endpoint),
            EventDefinitions::default(),
        )
    }

    fn app() -> AppContext {
        app_with(Arc::new(EchoEndpoint))
    }

    fn press(app: &mut AppContext, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let event = Event::Key(KeyEvent::new(code, modifiers));
        match app.handle_input(event) {
            Some(app_event) => app.handle_event(app_event).unwrap(),
            None => true,
        }
    }

    fn type_text(app: &mut AppContext, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[tokio::test]
    async fn typing_then_submitting() {
        let mut app = app();

        press(&mut app, KeyCode::Char('e'), KeyModifiers::NONE);
        assert_eq!(app.event_processor.input_mode, InputMode::Edit);

        type_text(&mut app, "hi");
        assert_eq!(app.controller.form().text(), "hi");

        press(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(app.controller.state().is_loading());

        let state = app.controller.settle().await;
        assert_eq!(state, &SubmissionState::Succeeded("gpt-4: hi".into()));
    }

    #[tokio::test]
    async fn submit_with_empty_text_is_ignored() {
        let mut app = app();

        press(&mut app, KeyCode::Char('s'), KeyModifiers::NONE);

        assert_eq!(app.controller.state(), &SubmissionState::Idle);
    }

    #[tokio::test]
    async fn picking_a_model() {
        let mut app = app();

        // input -> models, activate, move down
        press(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('j'), KeyModifiers::NONE);

        assert_eq!(app.controller.form().model().as_str(), "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn bad_model_index() {
        let mut app = app();

        let error = app.handle_event(AppEvent::SelectModel(7)).unwrap_err();

        assert!(matches!(error, Error::BadIndex { index: 7, .. }));
    }

    #[tokio::test]
    async fn dead_worker_fails_instead_of_loading_forever() {
        let mut app = app_with(Arc::new(PanickingEndpoint));
        app.controller.set_text("hi");
        assert_eq!(app.controller.submit(), Submission::Issued);

        let outcome = app.controller.next_outcome().await.unwrap();
        app.handle_outcome(outcome);

        assert_eq!(
            app.controller.state(),
            &SubmissionState::Failed("Something went wrong".into())
        );
        assert_eq!(app.controller.trigger(), Trigger::Enabled);
        assert!(app.controller.next_outcome().await.is_none());

        assert!(press(&mut app, KeyCode::Char('s'), KeyModifiers::NONE));
        assert!(!app.controller.state().is_loading());
    }

    #[tokio::test]
    async fn quit_from_normal_mode() {
        let mut app = app();

        assert!(!press(&mut app, KeyCode::Char('q'), KeyModifiers::NONE));
    }
}
