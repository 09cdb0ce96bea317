//! Quiet-interval gating for address lookups
//!
//! Every trigger takes a ticket. A ticket settles only if no newer
//! trigger arrived during the quiet interval, so a burst of edits
//! produces one lookup for the last value.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Handle for one trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Register new input, superseding every earlier ticket
    pub fn trigger(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no newer trigger has happened since this ticket
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Wait out the quiet interval; true if the ticket is still current
    pub async fn settle(&self, ticket: Ticket) -> bool {
        tokio::time::sleep(self.quiet).await;
        self.is_current(ticket)
    }
}
