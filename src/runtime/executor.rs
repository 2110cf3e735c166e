//! Session runtime executor

use super::{Command, SessionEvent, SessionSnapshot};
use crate::state_machine::{transition, Effect, Event, SessionState};
use crate::transcript::Transcript;
use crate::transport::{Transport, TransportError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Runs one session: the only writer of its transcript and state.
///
/// All mutation happens on this task. The transport call is the one
/// suspension point and runs as a spawned task that reports back through the
/// completion channel, so submissions arriving meanwhile are seen (and
/// rejected) rather than queued.
pub struct SessionRuntime<T>
where
    T: Transport + 'static,
{
    transcript: Transcript,
    state: SessionState,
    transport: Arc<T>,
    context: Arc<str>,
    command_rx: mpsc::Receiver<Command>,
    completion_tx: mpsc::Sender<Result<String, TransportError>>,
    completion_rx: mpsc::Receiver<Result<String, TransportError>>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl<T> SessionRuntime<T>
where
    T: Transport + 'static,
{
    pub(crate) fn new(
        transport: T,
        context: String,
        command_rx: mpsc::Receiver<Command>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        // Capacity 1: at most one request is ever in flight
        let (completion_tx, completion_rx) = mpsc::channel(1);
        Self {
            transcript: Transcript::new(),
            state: SessionState::Idle,
            transport: Arc::new(transport),
            context: Arc::from(context),
            command_rx,
            completion_tx,
            completion_rx,
            broadcast_tx,
        }
    }

    pub async fn run(mut self) {
        let session_id = self.transcript.session_id();
        tracing::info!(
            session_id = %session_id,
            endpoint = %self.transport.endpoint(),
            "Starting session runtime"
        );

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(Command::Submit(submission)) => {
                        self.process_event(Event::Submit(submission));
                    }
                    Some(Command::Snapshot(reply)) => {
                        let _ = reply.send(self.snapshot());
                    }
                    None => break,
                },
                Some(result) = self.completion_rx.recv() => {
                    self.process_event(Event::TransportCompleted { result });
                }
            }
        }

        tracing::info!(
            session_id = %session_id,
            entries = self.transcript.len(),
            "Session runtime stopped"
        );
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.transcript.session_id(),
            state: self.state,
            entries: self.transcript.entries().to_vec(),
        }
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(self.state, event) {
            Ok(r) => r,
            Err(e) if e.is_validation() => {
                tracing::debug!(
                    session_id = %self.transcript.session_id(),
                    state = self.state.as_str(),
                    reason = %e,
                    "Submission ignored"
                );
                return;
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.transcript.session_id(),
                    error = %e,
                    "Dropping unexpected event"
                );
                return;
            }
        };

        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendEntry { role, content } => {
                match self.transcript.append(role, &content) {
                    Ok(entry) => {
                        tracing::debug!(
                            session_id = %self.transcript.session_id(),
                            entry_id = %entry.id,
                            role = ?entry.role,
                            "Entry appended"
                        );
                        let _ = self.broadcast_tx.send(SessionEvent::EntryAppended(entry));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, role = ?role, "Failed to append entry");
                    }
                }
            }

            Effect::CallTransport { prompt } => self.dispatch(prompt),

            Effect::ReportFailure { error } => {
                tracing::error!(
                    session_id = %self.transcript.session_id(),
                    kind = ?error.kind,
                    status = ?error.status,
                    error = %error.message,
                    "Generation request failed, replying with apology"
                );
            }

            Effect::NotifyStateChange(state) => {
                let _ = self.broadcast_tx.send(SessionEvent::StateChanged(state));
            }
        }
    }

    fn dispatch(&self, prompt: String) {
        let transport = Arc::clone(&self.transport);
        let context = Arc::clone(&self.context);
        let completion_tx = self.completion_tx.clone();
        let session_id = self.transcript.session_id();

        tokio::spawn(async move {
            // The call runs in its own task so a panic still yields a completion
            let call = tokio::spawn(async move { transport.call_ai(&prompt, &context).await });
            let result = match call.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(session_id = %session_id, error = %e, "Transport task aborted");
                    Err(TransportError::internal(format!("Transport task aborted: {e}")))
                }
            };
            if completion_tx.send(result).await.is_err() {
                tracing::debug!(session_id = %session_id, "Session ended before response arrived");
            }
        });
    }
}
