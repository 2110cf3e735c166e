//! Scroll-follow policy
//!
//! Appending an entry only marks a follow as pending. The scroll itself is
//! applied after the view has rendered that entry; scrolling any earlier
//! would land on the previous extent.

use crate::runtime::SessionEvent;
use crate::transcript::EntryId;

/// The transcript view as seen by the scroll policy
pub trait TranscriptView {
    /// Newest entry the view has laid out, if any
    fn last_rendered(&self) -> Option<EntryId>;

    /// Bring the end of the transcript into view
    fn scroll_to_end(&mut self);
}

#[derive(Debug, Default)]
pub struct ScrollFollow {
    pending: Option<EntryId>,
}

impl ScrollFollow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a follow as pending for a newly appended entry
    pub fn entry_appended(&mut self, id: EntryId) {
        // Ids only grow, so the newest entry covers every earlier one
        self.pending = Some(self.pending.map_or(id, |p| p.max(id)));
    }

    /// Feed a session event; only appends matter
    pub fn observe(&mut self, event: &SessionEvent) {
        if let SessionEvent::EntryAppended(entry) = event {
            self.entry_appended(entry.id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Post-render hook. Scrolls and clears the flag once the view has
    /// rendered the pending entry; otherwise leaves it pending.
    ///
    /// Returns whether a scroll was applied.
    pub fn after_render<V: TranscriptView + ?Sized>(&mut self, view: &mut V) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };
        match view.last_rendered() {
            Some(rendered) if rendered >= pending => {
                view.scroll_to_end();
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
