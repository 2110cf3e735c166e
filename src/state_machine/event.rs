//! Events that drive the session

use crate::catalog::QuickPrompt;
use crate::transport::TransportError;

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Typed input, trimmed before use
    FreeText(String),
    /// Catalog selection: the title is shown, the prompt is sent
    Quick(QuickPrompt),
}

impl Submission {
    /// Text that becomes the user's transcript entry
    pub fn display_text(&self) -> &str {
        match self {
            Submission::FreeText(text) => text.trim(),
            Submission::Quick(prompt) => &prompt.title,
        }
    }

    /// Text sent to the endpoint
    pub fn payload(&self) -> &str {
        match self {
            Submission::FreeText(text) => text.trim(),
            Submission::Quick(prompt) => &prompt.prompt,
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// User submitted free text or picked a quick prompt
    Submit(Submission),

    /// The in-flight transport call finished
    TransportCompleted {
        result: Result<String, TransportError>,
    },
}
