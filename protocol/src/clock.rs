//! # Time Source
//!
//! Contracts never read the wall clock. The current time is an input to
//! every call (see [`crate::call::Call`]), produced by a [`Clock`] owned by
//! whoever executes the call. Production code uses [`SystemClock`] and tests
//! drive a [`ManualClock`]. Every shift of time goes through [`shift_secs`],
//! which reports out-of-range results as [`ClockError::OutOfRange`].

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use thiserror::Error;

/// A point in time as seen by contracts.
pub type Timestamp = DateTime<Utc>;

/// Errors from moving time around.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    /// The requested time is earlier than the current time.
    #[error("clock is monotonic: cannot move from {current} back to {requested}")]
    Backwards {
        /// Time before the request.
        current: Timestamp,
        /// Time that was requested.
        requested: Timestamp,
    },

    /// The shifted time is not representable.
    #[error("cannot move {base} by {secs} seconds: out of range")]
    OutOfRange {
        /// Time being shifted.
        base: Timestamp,
        /// Requested shift.
        secs: i128,
    },
}

/// Returns `base` moved by `secs` seconds, or an error instead of
/// overflowing the timestamp range.
pub fn shift_secs(base: Timestamp, secs: i128) -> Result<Timestamp, ClockError> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|delta| base.checked_add_signed(delta))
        .ok_or(ClockError::OutOfRange { base, secs })
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time, truncated to whole seconds like a block timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        truncate_to_secs(Utc::now())
    }
}

/// A clock that only moves when told to. Monotonic.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Creates a clock frozen at the current wall-clock second.
    pub fn starting_now() -> Self {
        Self::new(SystemClock.now())
    }

    /// Moves the clock forward by `delta`. Negative deltas are rejected.
    pub fn advance(&self, delta: Duration) -> Result<Timestamp, ClockError> {
        let mut now = self.now.lock();
        let requested = shift_secs(*now, delta.num_seconds().into())?;
        if requested < *now {
            return Err(ClockError::Backwards {
                current: *now,
                requested,
            });
        }
        *now = requested;
        Ok(requested)
    }

    /// Sets the clock to `target`, which must not be in the clock's past.
    pub fn increase_to(&self, target: Timestamp) -> Result<(), ClockError> {
        let mut now = self.now.lock();
        if target < *now {
            return Err(ClockError::Backwards {
                current: *now,
                requested: target,
            });
        }
        *now = target;
        Ok(())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

fn truncate_to_secs(t: Timestamp) -> Timestamp {
    DateTime::from_timestamp(t.timestamp(), 0).unwrap_or(t)
}
