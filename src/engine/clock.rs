//! Shared game countdown with pause accounting and one-shot threshold signals.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::engine::models::Millis;

/// Wall time source. The only environmental input to the engine.
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> Millis;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_ms(&self) -> Millis {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as Millis)
            .unwrap_or(0)
    }
}

/// Explicitly advanced clock for simulations and tests. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn starting_at(now: Millis) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub fn set(&self, now: Millis) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Millis) -> Millis {
        self.0.fetch_add(delta, Ordering::SeqCst) + delta
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> Millis {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    Warning { remaining_ms: Millis },
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameClock {
    started_at: Option<Millis>,
    paused_total: Millis,
    paused_since: Option<Millis>,
    limit_ms: Millis,
    warning_ms: Millis,
    warning_fired: bool,
    expiry_fired: bool,
}

impl GameClock {
    pub fn new(limit_ms: Millis, warning_ms: Millis) -> Self {
        Self {
            started_at: None,
            paused_total: 0,
            paused_since: None,
            limit_ms,
            warning_ms,
            warning_fired: false,
            expiry_fired: false,
        }
    }

    pub fn start(&mut self, now: Millis) {
        *self = Self::new(self.limit_ms, self.warning_ms);
        self.started_at = Some(now);
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    pub fn limit_ms(&self) -> Millis {
        self.limit_ms
    }

    /// Game time elapsed, excluding every paused interval including an ongoing one.
    pub fn elapsed(&self, now: Millis) -> Millis {
        let Some(start) = self.started_at else {
            return 0;
        };
        let end = self.paused_since.unwrap_or(now);
        end.saturating_sub(start).saturating_sub(self.paused_total)
    }

    pub fn remaining(&self, now: Millis) -> Millis {
        if !self.is_started() {
            return self.limit_ms;
        }
        self.limit_ms.saturating_sub(self.elapsed(now))
    }

    pub fn is_expired(&self, now: Millis) -> bool {
        self.is_started() && self.remaining(now) == 0
    }

    /// Returns false when not running or already paused.
    pub fn pause(&mut self, now: Millis) -> bool {
        if !self.is_started() || self.is_paused() {
            return false;
        }
        self.paused_since = Some(now);
        true
    }

    /// Folds the paused interval into the accumulated offset and returns its length.
    pub fn resume(&mut self, now: Millis) -> Option<Millis> {
        let since = self.paused_since.take()?;
        let paused = now.saturating_sub(since);
        self.paused_total += paused;
        Some(paused)
    }

    /// Edge-triggered threshold check: each signal is produced at most once per start.
    pub fn poll(&mut self, now: Millis) -> Vec<ClockSignal> {
        let mut signals = Vec::new();
        if !self.is_started() || self.expiry_fired {
            return signals;
        }
        let remaining = self.remaining(now);
        if remaining == 0 {
            self.expiry_fired = true;
            self.warning_fired = true;
            signals.push(ClockSignal::Expired);
            return signals;
        }
        if !self.warning_fired && self.limit_ms > self.warning_ms && remaining <= self.warning_ms {
            self.warning_fired = true;
            signals.push(ClockSignal::Warning {
                remaining_ms: remaining,
            });
        }
        signals
    }
}
