use std::sync::Mutex;

use tracing::{info, warn};
use uuid::Uuid;

use crate::drafts::Draft;
use crate::http::LeadClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackLevel {
    Success,
    Error,
}

/// What the page should show and do after a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub text: String,
    pub reset_form: bool,
    pub close_modal: bool,
}

impl Feedback {
    fn error(text: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Error,
            text: text.into(),
            reset_form: false,
            close_modal: false,
        }
    }
}

/// Submit cycle of one form. A second submit while the first is still
/// validating or in flight is refused.
#[derive(Debug)]
pub struct FormFlow {
    state: Mutex<FormState>,
}

impl Default for FormFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FormFlow {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FormState::Idle),
        }
    }

    pub fn state(&self) -> FormState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn submit(&self, client: &LeadClient, draft: &Draft) -> Feedback {
        let Some(_busy) = Busy::acquire(&self.state) else {
            return Feedback::error("Submission already in progress, please wait");
        };

        let submission = match draft.validate() {
            Ok(submission) => submission,
            Err(problems) => return Feedback::error(problems.join(". ")),
        };

        self.set(FormState::Submitting);
        // Fresh key per attempt: a resubmit after an error is a new
        // submission to the server.
        let key = Uuid::new_v4().to_string();
        match client.submit(&submission, Some(&key)).await {
            Ok(id) => {
                info!("{} form stored as #{}", submission.kind(), id);
                Feedback {
                    level: FeedbackLevel::Success,
                    text: draft.success_message(),
                    reset_form: true,
                    close_modal: draft.in_modal(),
                }
            }
            Err(e) => {
                warn!("{} form submit failed: {}", submission.kind(), e);
                Feedback::error(e.to_string())
            }
        }
    }

    fn set(&self, state: FormState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }
}

/// Holds the form out of `Idle`; dropping it (including on cancellation)
/// puts the form back.
struct Busy<'a>(&'a Mutex<FormState>);

impl<'a> Busy<'a> {
    fn acquire(state: &'a Mutex<FormState>) -> Option<Self> {
        let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
        if *guard != FormState::Idle {
            return None;
        }
        *guard = FormState::Validating;
        Some(Self(state))
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = FormState::Idle;
    }
}
