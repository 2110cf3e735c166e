//! Session state

use serde::{Deserialize, Serialize};

/// Whether the session can take a new submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Ready for user input
    #[default]
    Idle,
    /// A request is in flight; submissions are ignored until it resolves
    AwaitingResponse,
}

impl SessionState {
    pub fn accepts_submissions(self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingResponse => "awaiting_response",
        }
    }
}
