//! Mock implementations for testing
//!
//! These mocks drive a real session runtime without network I/O.

use super::{start_session, SessionEvent, SessionHandle, SessionSnapshot};
use crate::state_machine::SessionState;
use crate::system_prompt::ASSISTANT_CONTEXT;
use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};

// ============================================================================
// Mock Transport
// ============================================================================

/// Mock transport that returns queued responses
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    /// Record of all (prompt, context) pairs sent
    pub calls: Mutex<Vec<(String, String)>>,
    /// When set, each call blocks until `release` is called
    gate: Option<Semaphore>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Calls are recorded immediately but do not resolve until released
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Let one gated call resolve
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn recorded_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call_ai(&self, prompt: &str, context: &str) -> Result<String, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), context.to_string()));

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock response queued")))
    }

    fn endpoint(&self) -> &str {
        "mock://generic"
    }
}

// ============================================================================
// Test Session
// ============================================================================

/// A running session wired to a mock transport, with its event stream
pub struct TestSession {
    pub handle: SessionHandle,
    pub transport: Arc<MockTransport>,
    events: broadcast::Receiver<SessionEvent>,
    /// Every event observed so far, in order
    pub seen: Vec<SessionEvent>,
}

impl TestSession {
    pub fn new(transport: MockTransport) -> Self {
        let transport = Arc::new(transport);
        let handle = start_session(Arc::clone(&transport), ASSISTANT_CONTEXT);
        let events = handle.subscribe();
        Self {
            handle,
            transport,
            events,
            seen: Vec::new(),
        }
    }

    /// Consume events until the session reports `state`
    pub async fn wait_for_state(&mut self, state: SessionState, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match tokio::time::timeout_at(deadline, self.events.recv()).await {
                Ok(Ok(event)) => {
                    let reached = event == SessionEvent::StateChanged(state);
                    self.seen.push(event);
                    if reached {
                        return true;
                    }
                }
                Ok(Err(broadcast::error::RecvError::Lagged(_))) => {}
                Ok(Err(broadcast::error::RecvError::Closed)) | Err(_) => return false,
            }
        }
    }

    pub async fn wait_for_idle(&mut self) -> bool {
        self.wait_for_state(SessionState::Idle, Duration::from_secs(2))
            .await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.handle.snapshot().await.unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{QuickPrompt, QuickPromptCatalog};
    use crate::transcript::Role;

    #[tokio::test]
    async fn test_mock_transport() {
        let mock = MockTransport::new();
        mock.queue_response("Hello");

        assert_eq!(mock.call_ai("q", "c").await.unwrap(), "Hello");
        // Second call fails (nothing queued)
        assert!(mock.call_ai("q", "c").await.is_err());
        assert_eq!(mock.recorded_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_simple_text_response() {
        let mock = MockTransport::new();
        mock.queue_response("**INR** target is usually 2-3.\n- check weekly");

        let mut rt = TestSession::new(mock);
        rt.handle
            .submit_text("  What INR should I target on warfarin?  ")
            .await
            .unwrap();
        assert!(rt.wait_for_idle().await);

        let snapshot = rt.snapshot().await;
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[0].role, Role::User);
        assert_eq!(
            snapshot.entries[0].content,
            "What INR should I target on warfarin?"
        );
        assert_eq!(snapshot.entries[1].role, Role::Assistant);
        assert_eq!(
            snapshot.entries[1].content,
            "<strong>INR</strong> target is usually 2-3.<ul><li>check weekly</li></ul>"
        );

        let calls = rt.transport.recorded_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "What INR should I target on warfarin?");
        assert_eq!(calls[0].1, ASSISTANT_CONTEXT);
    }

    #[tokio::test]
    async fn test_event_order() {
        let mock = MockTransport::new();
        mock.queue_response("answer");

        let mut rt = TestSession::new(mock);
        rt.handle.submit_text("question").await.unwrap();
        assert!(rt.wait_for_idle().await);

        assert!(matches!(
            &rt.seen[..],
            [
                SessionEvent::EntryAppended(user),
                SessionEvent::StateChanged(SessionState::AwaitingResponse),
                SessionEvent::EntryAppended(assistant),
                SessionEvent::StateChanged(SessionState::Idle),
            ] if user.role == Role::User && assistant.role == Role::Assistant && user.id < assistant.id
        ));
    }

    #[tokio::test]
    async fn test_quick_prompt_shows_title_sends_prompt() {
        let mock = MockTransport::new();
        mock.queue_response("Metformin can cause GI upset.");
        let catalog = QuickPromptCatalog::builtin();
        let quick = catalog.get(1).unwrap().clone();

        let mut rt = TestSession::new(mock);
        rt.handle.ask_quick(quick.clone()).await.unwrap();
        assert!(rt.wait_for_idle().await);

        let snapshot = rt.snapshot().await;
        assert_eq!(snapshot.entries[0].content, quick.title);
        assert_eq!(rt.transport.recorded_calls()[0].0, quick.prompt);
    }

    #[tokio::test]
    async fn test_submission_while_awaiting_is_ignored() {
        let mock = MockTransport::gated();
        mock.queue_response("first answer");
        mock.queue_response("never used");

        let mut rt = TestSession::new(mock);
        rt.handle.submit_text("First question").await.unwrap();
        assert!(
            rt.wait_for_state(SessionState::AwaitingResponse, Duration::from_secs(2))
                .await
        );

        rt.handle.submit_text("Second question").await.unwrap();
        rt.handle
            .ask_quick(QuickPrompt::new("Quick", "Quick prompt"))
            .await
            .unwrap();

        let snapshot = rt.snapshot().await;
        assert_eq!(snapshot.state, SessionState::AwaitingResponse);
        assert_eq!(snapshot.entries.len(), 1);

        rt.transport.release();
        assert!(rt.wait_for_idle().await);

        let snapshot = rt.snapshot().await;
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[1].content, "first answer");
        assert_eq!(rt.transport.recorded_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_short_input_is_ignored() {
        let mut rt = TestSession::new(MockTransport::new());
        rt.handle.submit_text("hi").await.unwrap();
        rt.handle.submit_text("   ").await.unwrap();

        let snapshot = rt.snapshot().await;
        assert_eq!(snapshot.state, SessionState::Idle);
        assert!(snapshot.entries.is_empty());
        assert!(rt.transport.recorded_calls().is_empty());
        assert!(!rt
            .wait_for_state(SessionState::AwaitingResponse, Duration::from_millis(50))
            .await);
    }

    #[tokio::test]
    async fn test_network_failure_then_retry() {
        let mock = MockTransport::new();
        mock.queue_error(TransportError::network("Connection failed: refused"));
        mock.queue_response("Recovered answer");

        let mut rt = TestSession::new(mock);
        rt.handle.submit_text("Antibiotic stewardship?").await.unwrap();
        assert!(rt.wait_for_idle().await);

        let snapshot = rt.snapshot().await;
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(snapshot.entries.len(), 2);
        let reply = &snapshot.entries[1];
        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.starts_with("I apologize, but I"));
        assert!(reply.content.contains("network connectivity issue"));
        assert!(reply.content.ends_with("immediate assistance."));
        assert!(!reply.content.contains("refused"));

        // The session is usable again straight away
        rt.handle.submit_text("Trying again").await.unwrap();
        assert!(rt.wait_for_idle().await);

        let snapshot = rt.snapshot().await;
        assert_eq!(snapshot.entries.len(), 4);
        assert_eq!(snapshot.entries[3].content, "Recovered answer");
    }

    #[tokio::test]
    async fn test_http_failure_has_no_connectivity_hint() {
        let mock = MockTransport::new();
        mock.queue_error(TransportError::http_status(500, "HTTP 500: boom"));

        let mut rt = TestSession::new(mock);
        rt.handle.submit_text("Hypertension therapy?").await.unwrap();
        assert!(rt.wait_for_idle().await);

        let snapshot = rt.snapshot().await;
        let reply = &snapshot.entries[1].content;
        assert!(!reply.contains("network connectivity issue"));
        assert!(!reply.contains("boom"));
        assert!(reply.starts_with("I apologize, but I'm experiencing technical difficulties."));
    }

    #[tokio::test]
    async fn test_settle_waits_for_reply_in_flight() {
        let mock = MockTransport::gated();
        mock.queue_response("Avoid NSAIDs.");

        let rt = TestSession::new(mock);
        rt.handle.submit_text("Warfarin and ibuprofen?").await.unwrap();

        let settle = tokio::spawn({
            let handle = rt.handle.clone();
            async move { handle.settle().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!settle.is_finished());

        rt.transport.release();
        let snapshot = tokio::time::timeout(Duration::from_secs(2), settle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[1].content, "Avoid NSAIDs.");
    }

    #[tokio::test]
    async fn test_settle_returns_at_once_when_idle() {
        let rt = TestSession::new(MockTransport::new());
        let snapshot = tokio::time::timeout(Duration::from_millis(500), rt.handle.settle())
            .await
            .unwrap()
            .unwrap();
        assert!(snapshot.entries.is_empty());
    }

    struct PanickingTransport;

    #[async_trait]
    impl Transport for PanickingTransport {
        async fn call_ai(&self, _prompt: &str, _context: &str) -> Result<String, TransportError> {
            panic!("transport blew up");
        }

        fn endpoint(&self) -> &str {
            "mock://panics"
        }
    }

    #[tokio::test]
    async fn test_transport_panic_returns_to_idle() {
        let handle = start_session(PanickingTransport, ASSISTANT_CONTEXT);
        let mut events = handle.subscribe();

        for round in 1..=2 {
            handle.submit_text("Warfarin interactions?").await.unwrap();
            let idle = tokio::time::timeout(Duration::from_secs(2), async {
                loop {
                    match events.recv().await {
                        Ok(SessionEvent::StateChanged(SessionState::Idle)) => break true,
                        Ok(_) => {}
                        Err(_) => break false,
                    }
                }
            })
            .await;
            assert!(matches!(idle, Ok(true)), "round {round}");

            let snapshot = handle.snapshot().await.unwrap();
            assert_eq!(snapshot.state, SessionState::Idle);
            assert_eq!(snapshot.entries.len(), round * 2);
            let reply = &snapshot.entries[round * 2 - 1];
            assert_eq!(reply.role, Role::Assistant);
            assert!(reply.content.starts_with("I apologize, but I"));
            assert!(!reply.content.contains("network connectivity issue"));
            assert!(!reply.content.contains("blew up"));
        }
    }

    #[tokio::test]
    async fn test_cloned_handles_share_session() {
        let mock = MockTransport::new();
        mock.queue_response("shared");

        let mut rt = TestSession::new(mock);
        let other = rt.handle.clone();
        other.submit_text("From another handle").await.unwrap();
        assert!(rt.wait_for_idle().await);

        let mine = rt.snapshot().await;
        let theirs = other.snapshot().await.unwrap();
        assert_eq!(mine, theirs);
        assert_eq!(mine.entries.len(), 2);
    }
}
