//! Runtime for a chat session
//!
//! Owns the transcript and session state, applies state machine transitions,
//! executes their effects, and broadcasts changes to observers such as the
//! view and the scroll-follow policy.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use crate::catalog::QuickPrompt;
use crate::state_machine::{SessionState, Submission};
use crate::transcript::ChatEntry;
use crate::transport::Transport;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use uuid::Uuid;

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const BROADCAST_CAPACITY: usize = 256;

/// Events sent to session observers
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new entry is in the transcript
    EntryAppended(ChatEntry),
    /// The submission control should be enabled (Idle) or disabled
    StateChanged(SessionState),
}

/// Point-in-time copy of the session for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub state: SessionState,
    pub entries: Vec<ChatEntry>,
}

/// Requests from handles to the runtime, processed in arrival order
#[derive(Debug)]
pub(crate) enum Command {
    Submit(Submission),
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

#[derive(Debug, Error)]
#[error("session runtime has stopped")]
pub struct SessionClosed;

/// Handle to interact with a running session.
///
/// The session ends when the last handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Submit typed text. Too-short input, or input sent while a request is
    /// in flight, is ignored.
    pub async fn submit_text(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.submit(Submission::FreeText(text.into())).await
    }

    /// Ask a catalog question. Ignored while a request is in flight.
    pub async fn ask_quick(&self, prompt: QuickPrompt) -> Result<(), SessionClosed> {
        self.submit(Submission::Quick(prompt)).await
    }

    pub async fn submit(&self, submission: Submission) -> Result<(), SessionClosed> {
        self.command_tx
            .send(Command::Submit(submission))
            .await
            .map_err(|_| SessionClosed)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionClosed> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Snapshot(reply_tx))
            .await
            .map_err(|_| SessionClosed)?;
        reply_rx.await.map_err(|_| SessionClosed)
    }

    /// Wait until no request is in flight and return the settled session
    pub async fn settle(&self) -> Result<SessionSnapshot, SessionClosed> {
        // Subscribe first so an Idle sent after the snapshot is not missed
        let mut events = self.subscribe();
        loop {
            let snapshot = self.snapshot().await?;
            if snapshot.state.accepts_submissions() {
                return Ok(snapshot);
            }
            loop {
                match events.recv().await {
                    Ok(SessionEvent::StateChanged(SessionState::Idle))
                    | Err(broadcast::error::RecvError::Lagged(_)) => break,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Closed) => return Err(SessionClosed),
                }
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }
}

/// Start a session on the current tokio runtime.
///
/// The endpoint behind `transport` is fixed for the life of the session;
/// `context` is sent with every prompt.
pub fn start_session<T>(transport: T, context: impl Into<String>) -> SessionHandle
where
    T: Transport + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

    let runtime = SessionRuntime::new(transport, context.into(), command_rx, broadcast_tx.clone());
    tokio::spawn(runtime.run());

    SessionHandle {
        command_tx,
        broadcast_tx,
    }
}
