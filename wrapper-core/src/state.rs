use std::sync::Arc;

use crate::form::FormInput;

/// Where a submission stands.
/// `Succeeded` and `Failed` are display states; a new submission replaces them.
#[derive(Clone, Debug, Default, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    Succeeded(Arc<str>),
    Failed(Arc<str>),
}

/// The one thing the output area shows for a given [`SubmissionState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region<'a> {
    Nothing,
    LoadingIndicator,
    Response(&'a str),
    Error(&'a str),
}

/// How the submit control should look.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Trigger {
    Enabled,
    Disabled,
    InProgress,
}

impl SubmissionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SubmissionState::Loading)
    }

    pub fn name(&self) -> &str {
        self.as_ref()
    }

    pub fn region(&self) -> Region<'_> {
        match self {
            SubmissionState::Idle => Region::Nothing,
            SubmissionState::Loading => Region::LoadingIndicator,
            SubmissionState::Succeeded(response) => Region::Response(response),
            SubmissionState::Failed(message) => Region::Error(message),
        }
    }
}

impl Trigger {
    pub fn of(form: &FormInput, state: &SubmissionState) -> Self {
        if state.is_loading() {
            Trigger::InProgress
        } else if form.has_text() {
            Trigger::Enabled
        } else {
            Trigger::Disabled
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trigger::Enabled | Trigger::Disabled => "Submit",
            Trigger::InProgress => "Processing...",
        }
    }
}
