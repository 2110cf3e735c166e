//! medassist - terminal client for the clinical pharmacy assistant
//!
//! Reads prompts from stdin and renders the transcript to stdout. Logs go to
//! stderr as JSON so they never interleave with the conversation.

use medassist::catalog::QuickPromptCatalog;
use medassist::state_machine::MIN_PROMPT_CHARS;
use medassist::system_prompt::ASSISTANT_CONTEXT;
use medassist::{
    start_session, ChatEntry, EntryId, HttpTransport, LoggingTransport, Role, ScrollFollow,
    SessionConfig, SessionEvent, SessionHandle, SessionState, TranscriptView,
};
use regex::Regex;
use std::io::{self, Stdout, Write};
use std::sync::{Arc, LazyLock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Renders entries as plain text and follows the newest one
struct TerminalView {
    out: Stdout,
    last_rendered: Option<EntryId>,
}

impl TerminalView {
    fn new() -> Self {
        Self {
            out: io::stdout(),
            last_rendered: None,
        }
    }

    fn render(&mut self, entry: &ChatEntry) -> io::Result<()> {
        if self.last_rendered.is_some_and(|last| last >= entry.id) {
            return Ok(());
        }
        let speaker = match entry.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        writeln!(
            self.out,
            "\n[{}] {speaker}:\n{}",
            entry.created_at.format("%H:%M:%S"),
            markup_to_text(&entry.content)
        )?;
        self.last_rendered = Some(entry.id);
        Ok(())
    }

    fn show_state(&mut self, state: SessionState) -> io::Result<()> {
        match state {
            SessionState::AwaitingResponse => writeln!(self.out, "(thinking...)"),
            SessionState::Idle => self.prompt(),
        }
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "\n> ")?;
        self.out.flush()
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "({message})")?;
        self.prompt()
    }

    fn print_catalog(&mut self, catalog: &QuickPromptCatalog) -> io::Result<()> {
        writeln!(self.out, "Quick questions (type /ask N):")?;
        for (i, prompt) in catalog.iter().enumerate() {
            writeln!(self.out, "  {}. {}", i + 1, prompt.title)?;
        }
        writeln!(self.out, "Type a question, /prompts to list, /quit to leave.")
    }

    /// Catch up after missing broadcast events
    async fn resync(&mut self, session: &SessionHandle) -> Result<SessionState, Box<dyn std::error::Error>> {
        let snapshot = session.snapshot().await?;
        for entry in &snapshot.entries {
            self.render(entry)?;
        }
        Ok(snapshot.state)
    }
}

impl TranscriptView for TerminalView {
    fn last_rendered(&self) -> Option<EntryId> {
        self.last_rendered
    }

    fn scroll_to_end(&mut self) {
        let _ = self.out.flush();
    }
}

/// Strip display markup down to terminal text
fn markup_to_text(markup: &str) -> String {
    let text = markup
        .replace("<br>", "\n")
        .replace("<li>", "\n  * ")
        .replace("</ul>", "\n");
    TAG.replace_all(&text, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .trim_end()
        .to_string()
}

enum Input {
    Quit,
    ListPrompts,
    Ask(usize),
    Text(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let mut words = line.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("/quit" | "/exit"), None, _) => Input::Quit,
        (Some("/prompts"), None, _) => Input::ListPrompts,
        (Some("/ask"), n, None) => Input::Ask(n.and_then(|n| n.parse().ok()).unwrap_or(0)),
        _ => Input::Text(line.to_string()),
    }
}

/// Render one session event and apply the scroll-follow policy
fn show_event(
    view: &mut TerminalView,
    follow: &mut ScrollFollow,
    state: &mut SessionState,
    event: &SessionEvent,
) -> io::Result<()> {
    follow.observe(event);
    match event {
        SessionEvent::EntryAppended(entry) => view.render(entry)?,
        SessionEvent::StateChanged(new_state) => {
            *state = *new_state;
            view.show_state(*state)?;
        }
    }
    follow.after_render(view);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medassist=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(io::stderr),
        )
        .init();

    // Configuration
    let config = SessionConfig::from_env()?;
    let catalog = config.catalog()?;
    let url = config.request_url()?;
    tracing::info!(
        host = %config.host,
        endpoint = %url,
        production = config.endpoint().is_production(),
        quick_prompts = catalog.len(),
        "Resolved generation endpoint"
    );

    let http = HttpTransport::new(url, config.request_timeout)?;
    let session = start_session(LoggingTransport::new(Arc::new(http)), ASSISTANT_CONTEXT);
    let mut events = session.subscribe();

    let mut view = TerminalView::new();
    let mut follow = ScrollFollow::new();
    let mut state = SessionState::Idle;

    view.print_catalog(&catalog)?;
    view.prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // Input is done; let a reply still in flight arrive first
                    session.settle().await?;
                    break;
                };
                match parse_input(&line) {
                    Input::Quit => break,
                    Input::ListPrompts => {
                        view.print_catalog(&catalog)?;
                        view.prompt()?;
                    }
                    // The submission control is disabled while a reply is pending
                    _ if !state.accepts_submissions() => {
                        view.notice("still waiting for the previous answer")?;
                    }
                    Input::Ask(n) => match n.checked_sub(1).and_then(|i| catalog.get(i)) {
                        Some(prompt) => session.ask_quick(prompt.clone()).await?,
                        None => view.notice(&format!("no quick question {n}"))?,
                    },
                    Input::Text(text) => {
                        if text.chars().count() < MIN_PROMPT_CHARS {
                            view.prompt()?;
                        } else {
                            session.submit_text(text).await?;
                        }
                    }
                }
            }
            event = events.recv() => match event {
                Ok(event) => show_event(&mut view, &mut follow, &mut state, &event)?,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "View fell behind, resyncing");
                    state = view.resync(&session).await?;
                    if let Some(last) = view.last_rendered() {
                        follow.entry_appended(last);
                    }
                    follow.after_render(&mut view);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    // Show whatever was delivered before the session goes away
    while let Ok(event) = events.try_recv() {
        show_event(&mut view, &mut follow, &mut state, &event)?;
    }
    view.resync(&session).await?;

    tracing::info!("Session closed");
    Ok(())
}
