//! Notification banner queue.
//!
//! DESIGN
//! ======
//! Screens push short messages after actions (saved, cancelled, failed) and
//! the banner shows the newest one. The clock is passed in rather than read,
//! so expiry is deterministic in tests. The queue is bounded; the oldest
//! notice is evicted when full.

#[cfg(test)]
#[path = "notice_test.rs"]
mod tests;

use std::time::{Duration, Instant};

/// Maximum number of notices retained at once.
pub const NOTICE_CAP: usize = 5;

pub const INFO_TTL: Duration = Duration::from_secs(5);
pub const ERROR_TTL: Duration = Duration::from_secs(8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

impl NoticeKind {
    #[must_use]
    pub fn ttl(self) -> Duration {
        match self {
            Self::Success | Self::Info => INFO_TTL,
            Self::Error => ERROR_TTL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub created_at: Instant,
}

impl Notice {
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.kind.ttl()
    }
}

#[derive(Clone, Debug, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NoticeBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message and return its id.
    ///
    /// An identical active message (same kind and text) is refreshed in place
    /// and keeps its id instead of stacking a duplicate banner.
    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) -> u64 {
        let message = message.into();
        if let Some(pos) = self
            .notices
            .iter()
            .position(|n| n.kind == kind && n.message == message && !n.is_expired(now))
        {
            let mut existing = self.notices.remove(pos);
            existing.created_at = now;
            let id = existing.id;
            self.notices.push(existing);
            return id;
        }

        if self.notices.len() >= NOTICE_CAP {
            self.notices.remove(0);
        }
        self.next_id += 1;
        let id = self.next_id;
        self.notices.push(Notice { id, kind, message, created_at: now });
        id
    }

    /// Remove a notice; returns whether it was present.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Drop expired notices; returns how many were removed.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.notices.len();
        self.notices.retain(|n| !n.is_expired(now));
        before - self.notices.len()
    }

    /// Newest notice, which the banner shows.
    #[must_use]
    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}
