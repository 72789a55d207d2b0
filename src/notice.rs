// Transient notice banner
//
// Validation and persistence problems surface as a short-lived message that
// dismisses itself after two seconds. The board holds at most one notice as
// a plain value with an expiry point. Each post hands out a token; a timer
// firing with a stale token is a cancelled timer and does nothing, so a new
// error always restarts the full display window.

use std::time::{Duration, Instant};

/// How long a notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(2);

/// Identifies one posted notice, for expiring it from a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeToken(u64);

/// One visible message and when it was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    message: String,
    posted_at: Instant,
}

impl Notice {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn expires_at(&self) -> Instant {
        self.posted_at + NOTICE_TTL
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    /// Time left on screen, for scheduling the dismissal timer.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at().saturating_duration_since(now)
    }
}

/// Holder of the single active notice.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notice: Option<Notice>,
    generation: u64,
}

impl NoticeBoard {
    pub fn new() -> Self {
        NoticeBoard::default()
    }

    /// Posts a message, replacing whatever is showing. The returned token
    /// belongs to this notice alone; tokens from earlier posts go stale.
    pub fn post(&mut self, message: impl Into<String>, now: Instant) -> NoticeToken {
        self.generation += 1;
        self.notice = Some(Notice {
            message: message.into(),
            posted_at: now,
        });
        NoticeToken(self.generation)
    }

    /// The notice to render, if one is posted and still inside its window.
    pub fn current(&self, now: Instant) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| !n.is_expired(now))
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.current(now).is_some()
    }

    /// Timer callback: dismisses the notice the token was issued for. A
    /// stale token means a newer notice took over; leave it alone.
    pub fn expire(&mut self, token: NoticeToken) {
        if token.0 == self.generation {
            self.notice = None;
        }
    }

    /// Unconditional dismissal, for explicit user action.
    pub fn clear(&mut self) {
        self.notice = None;
    }
}
