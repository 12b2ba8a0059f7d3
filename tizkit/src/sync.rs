//! Bookkeeping for the "regenerate LaTeX after edits settle" loop.
//!
//! The host owns the clock and the network. It reports edits with
//! [`LatexSync::note_edit`], polls [`LatexSync::is_due`], sends a request
//! tagged with the ticket from [`LatexSync::begin`], and hands the answer back
//! with [`LatexSync::complete`]. Answers that arrive after a newer one has
//! been applied are dropped.

use crate::options::SyncOptions;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ticket(pub u64);

#[derive(Clone, Debug, Default)]
pub struct LatexSync {
    opts: SyncOptions,
    pending_since: Option<f64>,
    issued: u64,
    applied: u64,
    latest: Option<String>,
    last_error: Option<(Ticket, String)>,
}

impl LatexSync {
    pub fn new() -> Self {
        Self::with_options(SyncOptions::default())
    }

    pub fn with_options(opts: SyncOptions) -> Self {
        LatexSync { opts, ..Default::default() }
    }

    /// Restart the debounce window at `now_ms`.
    pub fn note_edit(&mut self, now_ms: f64) {
        self.pending_since = Some(now_ms);
    }

    pub fn has_pending_edit(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn is_due(&self, now_ms: f64) -> bool {
        match self.pending_since {
            Some(t) => now_ms - t >= self.opts.debounce_ms,
            None => false,
        }
    }

    /// Issue a ticket for a new generation request and consume the pending edit.
    pub fn begin(&mut self) -> Ticket {
        self.pending_since = None;
        self.issued += 1;
        tracing::debug!(ticket = self.issued, "latex generation started");
        Ticket(self.issued)
    }

    /// Apply a generation result; returns false when the ticket is stale or unknown.
    pub fn complete(&mut self, ticket: Ticket, latex: impl Into<String>) -> bool {
        if ticket.0 == 0 || ticket.0 > self.issued {
            tracing::warn!(ticket = ticket.0, issued = self.issued, "unknown latex ticket");
            return false;
        }
        if ticket.0 <= self.applied {
            tracing::warn!(ticket = ticket.0, applied = self.applied, "dropping stale latex result");
            return false;
        }
        self.applied = ticket.0;
        self.latest = Some(latex.into());
        true
    }

    /// Record a failed generation. The latest code stays as it was.
    pub fn fail(&mut self, ticket: Ticket, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(ticket = ticket.0, %message, "latex generation failed");
        self.last_error = Some((ticket, message));
    }

    pub fn latest(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    pub fn applied_ticket(&self) -> Option<Ticket> {
        (self.applied > 0).then_some(Ticket(self.applied))
    }

    /// Take the last failure for display; subsequent calls return `None`.
    pub fn take_error(&mut self) -> Option<(Ticket, String)> {
        self.last_error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_waits_for_quiet_period() {
        let mut s = LatexSync::new();
        assert!(!s.is_due(0.0));
        s.note_edit(0.0);
        assert!(!s.is_due(299.0));
        s.note_edit(200.0);
        assert!(!s.is_due(450.0));
        assert!(s.is_due(500.0));
        s.begin();
        assert!(!s.is_due(10_000.0));
    }

    #[test]
    fn out_of_order_results_keep_newest() {
        let mut s = LatexSync::new();
        let t1 = s.begin();
        let t2 = s.begin();
        assert!(s.complete(t2, "second"));
        assert!(!s.complete(t1, "first"));
        assert_eq!(s.latest(), Some("second"));
        assert_eq!(s.applied_ticket(), Some(t2));
    }

    #[test]
    fn older_result_applies_while_newer_in_flight() {
        let mut s = LatexSync::new();
        let t1 = s.begin();
        let t2 = s.begin();
        assert!(s.complete(t1, "first"));
        assert!(s.complete(t2, "second"));
        assert_eq!(s.latest(), Some("second"));
    }

    #[test]
    fn failure_keeps_previous_code() {
        let mut s = LatexSync::new();
        let t1 = s.begin();
        s.complete(t1, "ok");
        let t2 = s.begin();
        s.fail(t2, "timeout");
        assert_eq!(s.latest(), Some("ok"));
        assert_eq!(s.take_error(), Some((t2, "timeout".to_string())));
        assert_eq!(s.take_error(), None);
    }

    #[test]
    fn unknown_ticket_is_rejected() {
        let mut s = LatexSync::new();
        assert!(!s.complete(Ticket(7), "x"));
        assert!(!s.complete(Ticket(0), "x"));
    }
}
