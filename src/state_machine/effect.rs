//! Effects produced by state transitions

use super::SessionState;
use crate::transcript::Role;
use crate::transport::TransportError;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone)]
pub enum Effect {
    /// Append an entry to the transcript
    AppendEntry { role: Role, content: String },

    /// Dispatch the single in-flight transport call
    CallTransport { prompt: String },

    /// Record a transport failure for operators
    ReportFailure { error: TransportError },

    /// Tell observers the session state changed
    NotifyStateChange(SessionState),
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendEntry {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendEntry {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
