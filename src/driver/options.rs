//! Process-wide driver options.
//!
//! Controls wait budgets, polling cadence and gesture timings shared by every
//! element and view produced by one [`Driver`](super::Driver).
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use vom::Options;
//!
//! let options = Options::new()
//!     .with_wait(Duration::from_secs(10))
//!     .with_drag_duration(Duration::from_millis(300));
//!
//! // Or from a JSON document; missing keys keep their defaults
//! let options = Options::from_json(r#"{ "drag_duration_in_millis": 250 }"#)?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default resolution wait budget (5 seconds).
pub const DEFAULT_WAIT_MS: u64 = 5_000;

/// Default retry interval while waiting (250 milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Default duration of `drag(target)` (100 milliseconds).
pub const DEFAULT_DRAG_DURATION_MS: u64 = 100;

/// Hold time for a long press (2 seconds).
pub const DEFAULT_LONG_PRESS_MS: u64 = 2_000;

// ============================================================================
// Options
// ============================================================================

/// Driver configuration.
///
/// Serialized key names follow the `*_in_millis` property convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Default wait budget for element resolution.
    #[serde(rename = "wait_in_millis")]
    pub wait_ms: u64,

    /// Fixed interval between lookup attempts.
    #[serde(rename = "poll_interval_in_millis")]
    pub poll_interval_ms: u64,

    /// Duration of `drag(target)` when none is given.
    #[serde(rename = "drag_duration_in_millis")]
    pub drag_duration_ms: u64,

    /// How long a long press holds before releasing.
    #[serde(rename = "long_press_in_millis")]
    pub long_press_ms: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Options {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wait_ms: DEFAULT_WAIT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            drag_duration_ms: DEFAULT_DRAG_DURATION_MS,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
        }
    }

    /// Parses options from JSON. Absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Json`] on malformed input, [`Error::Config`] if the values
    /// fail [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Options {
    /// Sets the default wait budget.
    #[inline]
    #[must_use]
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait_ms = millis(wait);
        self
    }

    /// Sets the retry interval.
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = millis(interval);
        self
    }

    /// Sets the default drag duration.
    #[inline]
    #[must_use]
    pub fn with_drag_duration(mut self, duration: Duration) -> Self {
        self.drag_duration_ms = millis(duration);
        self
    }

    /// Sets the long press hold time.
    #[inline]
    #[must_use]
    pub fn with_long_press(mut self, hold: Duration) -> Self {
        self.long_press_ms = millis(hold);
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Options {
    /// Default wait budget.
    #[inline]
    #[must_use]
    pub const fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    /// Retry interval.
    #[inline]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Default drag duration.
    #[inline]
    #[must_use]
    pub const fn drag_duration(&self) -> Duration {
        Duration::from_millis(self.drag_duration_ms)
    }

    /// Long press hold time.
    #[inline]
    #[must_use]
    pub const fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    /// Checks the options are usable.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the poll interval is zero.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::config(
                "poll_interval_in_millis must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
