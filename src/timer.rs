//! Cancellable focus-timer countdown.
//!
//! The countdown runs as a spawned task publishing remaining seconds over a
//! watch channel; cancellation goes through a notify token, so callers never
//! block on the full duration.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPreset {
    Focus,
    ShortBreak,
    LongBreak,
    Custom(u64),
}

impl TimerPreset {
    pub fn minutes(&self) -> u64 {
        match self {
            TimerPreset::Focus => 25,
            TimerPreset::ShortBreak => 5,
            TimerPreset::LongBreak => 15,
            TimerPreset::Custom(minutes) => *minutes,
        }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        match minutes {
            25 => TimerPreset::Focus,
            5 => TimerPreset::ShortBreak,
            15 => TimerPreset::LongBreak,
            other => TimerPreset::Custom(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Finished,
    Cancelled,
}

pub struct Countdown {
    remaining: watch::Receiver<u64>,
    cancel: Arc<Notify>,
    task: JoinHandle<TimerOutcome>,
}

impl Countdown {
    /// Start a countdown ticking once per second.
    pub fn start(total_secs: u64) -> Self {
        Self::with_tick(total_secs, Duration::from_secs(1))
    }

    /// Tick interval is injectable so tests run in milliseconds.
    pub fn with_tick(total_secs: u64, tick: Duration) -> Self {
        let (tx, rx) = watch::channel(total_secs);
        let cancel = Arc::new(Notify::new());
        let cancel_token = cancel.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;
            let mut left = total_secs;
            while left > 0 {
                tokio::select! {
                    _ = interval.tick() => {
                        left -= 1;
                        let _ = tx.send(left);
                    }
                    _ = cancel_token.notified() => {
                        return TimerOutcome::Cancelled;
                    }
                }
            }
            TimerOutcome::Finished
        });
        Self {
            remaining: rx,
            cancel,
            task,
        }
    }

    pub fn remaining(&self) -> u64 {
        *self.remaining.borrow()
    }

    /// Receiver for pushed remaining-time updates.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.clone()
    }

    /// Request cancellation. Safe to call before the task is waiting; the
    /// permit is kept until the next poll.
    pub fn cancel(&self) {
        self.cancel.notify_one();
    }

    /// Wait for the countdown to end either way.
    pub async fn wait(self) -> TimerOutcome {
        self.task.await.unwrap_or(TimerOutcome::Cancelled)
    }
}

pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
