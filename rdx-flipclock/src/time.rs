//! Wall-clock sources for the engine.
//!
//! The scheduler measures drift against wall time and the formatter reads the
//! hour, minute and second from it, so both go through the [`WallClock`] trait.
//! [`SystemWallClock`] reads the local system time. [`VirtualWallClock`] is
//! anchored to a fixed date-time and advances with the tokio clock, which makes
//! it fully deterministic under `tokio::time::pause`.

use chrono::{DateTime, FixedOffset, Local};
use std::time::Duration;
use tokio::time::Instant;

/// A source of the current local date-time.
pub trait WallClock: Send + Sync {
    /// The current local date-time.
    fn now(&self) -> DateTime<FixedOffset>;

    /// The current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Reads the operating system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A wall clock that starts at a chosen date-time and moves forward exactly as
/// far as the tokio clock does.
#[derive(Debug, Clone)]
pub struct VirtualWallClock {
    origin: DateTime<FixedOffset>,
    started: Instant,
}

impl VirtualWallClock {
    /// Anchors the clock at `origin`, as of the tokio instant of this call.
    pub fn starting_at(origin: DateTime<FixedOffset>) -> Self {
        Self {
            origin,
            started: Instant::now(),
        }
    }

    /// Anchors the clock at an RFC 3339 timestamp such as
    /// `2026-10-19T09:05:06.600+00:00`.
    pub fn parse(rfc3339: &str) -> anyhow::Result<Self> {
        Ok(Self::starting_at(DateTime::parse_from_rfc3339(rfc3339)?))
    }

    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.started)
    }
}

impl WallClock for VirtualWallClock {
    fn now(&self) -> DateTime<FixedOffset> {
        // Sub-millisecond precision is irrelevant for a one-second display.
        let elapsed = chrono::Duration::milliseconds(self.elapsed().as_millis() as i64);
        self.origin + elapsed
    }
}
