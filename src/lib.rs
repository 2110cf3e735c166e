//! Conversation session engine for the clinical pharmacy assistant
//!
//! Collects user prompts, forwards them to a remote text-generation
//! endpoint, and keeps the exchange as an ordered, append-only transcript.
//! A view layer subscribes to session events, renders the transcript, and
//! drives the scroll-follow policy.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod endpoint;
pub mod format;
pub mod runtime;
pub mod scroll;
pub mod state_machine;
pub mod system_prompt;
pub mod transcript;
pub mod transport;

pub use catalog::{QuickPrompt, QuickPromptCatalog};
pub use config::SessionConfig;
pub use runtime::{start_session, SessionEvent, SessionHandle, SessionSnapshot};
pub use scroll::{ScrollFollow, TranscriptView};
pub use state_machine::{SessionState, Submission};
pub use transcript::{ChatEntry, EntryId, Role, Transcript};
pub use transport::{HttpTransport, LoggingTransport, Transport, TransportError};
