//! Navigation and access-gate state.
//!
//! The whole session is an explicit value: current page, selected book, and
//! auth gate. Transitions are pure methods taking `self` and, where time
//! matters, an explicit `Instant`; nothing here reads a clock.
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::model::Book;

/// Inactivity window after which an unlocked session reverts to locked.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageId {
    Dashboard,
    Library,
    BookDetail,
    Calendar,
    Timer,
    Todo,
}

impl PageId {
    pub fn title(&self) -> &'static str {
        match self {
            PageId::Dashboard => "Dashboard",
            PageId::Library => "Library",
            PageId::BookDetail => "Book Detail",
            PageId::Calendar => "Calendar",
            PageId::Timer => "Focus Timer",
            PageId::Todo => "Todo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGate {
    Locked,
    Unlocked { last_activity: Instant },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub page: PageId,
    pub selected: Option<Book>,
    pub auth: AuthGate,
}

impl AppState {
    /// Fresh session: dashboard, no selection, locked.
    pub fn locked() -> Self {
        Self {
            page: PageId::Dashboard,
            selected: None,
            auth: AuthGate::Locked,
        }
    }

    /// Attempt to unlock with a password. Success marks activity at `now`;
    /// failure leaves the gate locked.
    pub fn unlock(mut self, config: &Config, password: &str, now: Instant) -> (Self, bool) {
        if config.accepts_password(password) {
            self.auth = AuthGate::Unlocked { last_activity: now };
            (self, true)
        } else {
            self.auth = AuthGate::Locked;
            (self, false)
        }
    }

    pub fn is_unlocked(&self, now: Instant) -> bool {
        match self.auth {
            AuthGate::Unlocked { last_activity } => {
                now.saturating_duration_since(last_activity) <= SESSION_TIMEOUT
            }
            AuthGate::Locked => false,
        }
    }

    /// Record user activity: refreshes the inactivity window, or locks the
    /// session if it has already expired.
    pub fn touch(mut self, now: Instant) -> Self {
        self.auth = match self.auth {
            AuthGate::Unlocked { last_activity }
                if now.saturating_duration_since(last_activity) <= SESSION_TIMEOUT =>
            {
                AuthGate::Unlocked { last_activity: now }
            }
            _ => AuthGate::Locked,
        };
        self
    }

    /// Navigate to a page. Book detail without a selection redirects to the
    /// library; the selection itself is kept across pages.
    pub fn navigate(mut self, target: PageId) -> Self {
        self.page = match target {
            PageId::BookDetail if self.selected.is_none() => PageId::Library,
            other => other,
        };
        self
    }

    /// Select a book and open its detail page.
    pub fn open_book(mut self, book: Book) -> Self {
        self.selected = Some(book);
        self.page = PageId::BookDetail;
        self
    }

    /// There is no back-stack; back always lands on the library.
    pub fn back(mut self) -> Self {
        self.page = PageId::Library;
        self
    }
}
