//! Delayed seen-marking.
//!
//! The deadline lives inside the [`VisibleMessage`] it belongs to. Replacing
//! the displayed message drops its deadline with it, so no timer handle has
//! to be cancelled when the user moves on.

use crate::Message;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// The message occupying the detail pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleMessage {
    pub message: Message,
    pub mark_seen_at: Option<DateTime<Utc>>,
}

impl VisibleMessage {
    /// Wrap a freshly fetched message; no deadline until [`opened`](Self::opened).
    pub fn new(message: Message) -> Self {
        Self {
            message,
            mark_seen_at: None,
        }
    }

    /// Record that the message was put on screen at `at`.
    ///
    /// Arms the deadline only for unseen messages. A delay past the end of
    /// the calendar saturates to the latest representable instant.
    pub fn opened(&mut self, at: DateTime<Utc>, delay: Duration) {
        if self.message.seen {
            return;
        }
        let deadline = TimeDelta::from_std(delay)
            .ok()
            .and_then(|delay| at.checked_add_signed(delay))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.mark_seen_at = Some(deadline);
    }

    /// Returns true exactly once, on the first probe at or after the deadline.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.mark_seen_at {
            Some(deadline) if now >= deadline => {
                self.mark_seen_at = None;
                true
            }
            _ => false,
        }
    }

    /// Whether the probe timer has anything to check.
    pub fn wants_probe(&self) -> bool {
        self.mark_seen_at.is_some()
    }
}
