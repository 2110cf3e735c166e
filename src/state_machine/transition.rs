//! Pure state transition function
//!
//! Idle + Submit -> AwaitingResponse (append user entry, call transport)
//! AwaitingResponse + TransportCompleted -> Idle (append exactly one assistant entry)
//!
//! Everything else is rejected without effects.

use super::{Effect, Event, SessionState, Submission};
use crate::transport::TransportError;
use thiserror::Error;

/// Shortest free-text submission, in characters after trimming
pub const MIN_PROMPT_CHARS: usize = 3;

const APOLOGY: &str = "I apologize, but I'm experiencing technical difficulties. ";
const CONNECTIVITY_HINT: &str = "This appears to be a network connectivity issue. ";
const CALL_TO_ACTION: &str =
    "Please try again later or consult with a healthcare professional for immediate assistance.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event was not applied
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A request is already in flight")]
    Busy,
    #[error("Input too short: {chars} characters, need at least 3")]
    InputTooShort { chars: usize },
    #[error("Quick prompt has no title or prompt text")]
    EmptyInput,
    #[error("Transport completion arrived with no request in flight")]
    NotAwaiting,
}

impl TransitionError {
    /// Guarded-input rejections; these are silent no-ops for the user
    pub fn is_validation(&self) -> bool {
        !matches!(self, TransitionError::NotAwaiting)
    }
}

/// User-safe text for a failed request. The cause itself is never included.
pub fn failure_message(error: &TransportError) -> String {
    let mut message = String::from(APOLOGY);
    if error.is_connectivity() {
        message.push_str(CONNECTIVITY_HINT);
    }
    message.push_str(CALL_TO_ACTION);
    message
}

/// Pure transition function: no I/O, same inputs give the same outputs.
pub fn transition(state: SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        (SessionState::Idle, Event::Submit(submission)) => {
            validate(&submission)?;
            Ok(TransitionResult::new(SessionState::AwaitingResponse)
                .with_effect(Effect::append_user(submission.display_text()))
                .with_effect(Effect::NotifyStateChange(SessionState::AwaitingResponse))
                .with_effect(Effect::CallTransport {
                    prompt: submission.payload().to_string(),
                }))
        }

        // No queueing: the gate simply stays shut
        (SessionState::AwaitingResponse, Event::Submit(_)) => Err(TransitionError::Busy),

        (SessionState::AwaitingResponse, Event::TransportCompleted { result: Ok(text) }) => {
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::append_assistant(text))
                .with_effect(Effect::NotifyStateChange(SessionState::Idle)))
        }

        (SessionState::AwaitingResponse, Event::TransportCompleted { result: Err(error) }) => {
            let message = failure_message(&error);
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::ReportFailure { error })
                .with_effect(Effect::append_assistant(message))
                .with_effect(Effect::NotifyStateChange(SessionState::Idle)))
        }

        (SessionState::Idle, Event::TransportCompleted { .. }) => Err(TransitionError::NotAwaiting),
    }
}

fn validate(submission: &Submission) -> Result<(), TransitionError> {
    match submission {
        Submission::FreeText(text) => {
            let chars = text.trim().chars().count();
            if chars < MIN_PROMPT_CHARS {
                return Err(TransitionError::InputTooShort { chars });
            }
        }
        Submission::Quick(prompt) => {
            if prompt.title.trim().is_empty() || prompt.prompt.trim().is_empty() {
                return Err(TransitionError::EmptyInput);
            }
        }
    }
    Ok(())
}
