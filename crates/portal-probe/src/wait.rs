//! Timed wait protocol
//!
//! Bounded polling used to synchronise with non-deterministic render timing.
//! This is the only place in the crate that suspends the calling thread.
//!
//! - A zero [`WaitBudget`] checks once and never sleeps.
//! - A positive budget polls at a fixed interval until the poll yields a
//!   value or the budget is spent, then fails with [`ProbeError::Timeout`].
//! - Stale-handle failures inside a poll count as "not yet".

use crate::browser::BrowserHandle;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default budget for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT BUDGET
// =============================================================================

/// Maximum time a caller allows a poll to keep retrying
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct WaitBudget(Duration);

impl WaitBudget {
    /// Check once, synchronously
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Budget in milliseconds
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    /// Whether this budget means "check once"
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Budget as a duration
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    /// Budget in whole milliseconds
    #[must_use]
    pub fn as_millis(&self) -> u64 {
        u64::try_from(self.0.as_millis()).unwrap_or(u64::MAX)
    }
}

impl From<Duration> for WaitBudget {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl std::fmt::Display for WaitBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// How long to keep polling
    pub budget: WaitBudget,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitOptions {
    /// Default budget and interval
    #[must_use]
    pub const fn new() -> Self {
        Self {
            budget: WaitBudget::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Check once without waiting
    #[must_use]
    pub const fn immediate() -> Self {
        Self::new().with_budget(WaitBudget::ZERO)
    }

    /// Set the budget
    #[must_use]
    pub const fn with_budget(mut self, budget: WaitBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Set the budget in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.budget = WaitBudget::from_millis(timeout_ms);
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Outcome of a wait, with diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult<T> {
    /// Value the poll produced; `None` only for zero budgets
    pub value: Option<T>,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of poll invocations
    pub attempts: u32,
}

/// Poll until `poll` yields a value, reporting attempts and elapsed time.
///
/// # Errors
///
/// `ProbeError::Timeout` when a positive budget is spent; any non-stale
/// error returned by `poll` immediately.
pub fn poll_until<T, F>(
    browser: &dyn BrowserHandle,
    options: &WaitOptions,
    waited_for: &str,
    mut poll: F,
) -> ProbeResult<WaitResult<T>>
where
    F: FnMut() -> ProbeResult<Option<T>>,
{
    let start = Instant::now();
    let budget = options.budget.as_duration();
    let mut attempts = 0;

    loop {
        attempts += 1;
        match poll() {
            Ok(Some(value)) => {
                trace!(waited_for, attempts, "wait satisfied");
                return Ok(WaitResult {
                    value: Some(value),
                    elapsed: start.elapsed(),
                    attempts,
                });
            }
            Ok(None) => {}
            Err(err) if err.is_stale() => trace!(waited_for, %err, "stale handle while polling"),
            Err(err) => return Err(err),
        }

        if options.budget.is_zero() {
            return Ok(WaitResult {
                value: None,
                elapsed: start.elapsed(),
                attempts,
            });
        }

        let elapsed = start.elapsed();
        if elapsed >= budget {
            debug!(waited_for, attempts, budget_ms = options.budget.as_millis(), "wait timed out");
            return Err(ProbeError::Timeout {
                ms: options.budget.as_millis(),
                waited_for: waited_for.to_owned(),
            });
        }
        browser.sleep(options.poll_interval().min(budget - elapsed));
    }
}

/// Bounded wait returning the poll's value.
///
/// With a zero budget `poll` runs exactly once and its result (possibly
/// `None`) is returned. With a positive budget `None` is never returned.
pub fn await_condition<T, F>(
    browser: &dyn BrowserHandle,
    options: &WaitOptions,
    waited_for: &str,
    poll: F,
) -> ProbeResult<Option<T>>
where
    F: FnMut() -> ProbeResult<Option<T>>,
{
    poll_until(browser, options, waited_for, poll).map(|r| r.value)
}

/// Like [`await_condition`] but absence is an error for every budget
pub fn await_some<T, F>(
    browser: &dyn BrowserHandle,
    options: &WaitOptions,
    waited_for: &str,
    poll: F,
) -> ProbeResult<T>
where
    F: FnMut() -> ProbeResult<Option<T>>,
{
    await_condition(browser, options, waited_for, poll)?.ok_or_else(|| ProbeError::Timeout {
        ms: options.budget.as_millis(),
        waited_for: waited_for.to_owned(),
    })
}

/// Wait until `present` reports `false`.
///
/// Returns whether the thing is gone; with a positive budget this is always
/// `true` or a timeout.
pub fn await_absent<F>(
    browser: &dyn BrowserHandle,
    options: &WaitOptions,
    waited_for: &str,
    mut present: F,
) -> ProbeResult<bool>
where
    F: FnMut() -> ProbeResult<bool>,
{
    let gone = await_condition(browser, options, waited_for, || {
        Ok((!present()?).then_some(()))
    })?;
    Ok(gone.is_some())
}
