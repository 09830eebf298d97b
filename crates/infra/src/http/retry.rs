//! Retry policy shared by every outbound call
//!
//! Which failures are transient is decided by `ApiError::should_retry`;
//! the policy only caps attempts and spaces them out. The delay before retry `n` (1-based) is `unit * base^n`, so the
//! defaults wait 2s, 4s and 8s. The policy keeps no state between calls.

use std::time::Duration;

use pinesync_domain::RetryConfig;

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// `unit * base^attempt`
    Exponential { unit: Duration, base: u32 },
    /// `unit * attempt`
    Linear { unit: Duration },
}

impl BackoffStrategy {
    /// Delay before the given retry (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Self::Exponential { unit, base } => {
                let factor = base.checked_pow(attempt).unwrap_or(u32::MAX);
                unit.saturating_mul(factor)
            }
            Self::Linear { unit } => unit.saturating_mul(attempt),
        }
    }
}

/// Decision for whether to retry an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the delay, then re-issue the full request
    RetryAfter(Duration),
    /// Hand the current result to the caller
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: BackoffStrategy,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, backoff: BackoffStrategy) -> Self {
        Self { max_retries, backoff }
    }

    /// Exponential policy with the given retry cap, base and delay unit.
    pub const fn exponential(max_retries: u32, base: u32, unit: Duration) -> Self {
        Self::new(max_retries, BackoffStrategy::Exponential { unit, base })
    }

    pub const fn no_retry() -> Self {
        Self::new(0, BackoffStrategy::Linear { unit: Duration::ZERO })
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        let unit = Duration::from_millis(config.delay_unit_ms);
        let backoff = if config.use_exponential_backoff {
            BackoffStrategy::Exponential { unit, base: config.backoff_base }
        } else {
            BackoffStrategy::Linear { unit }
        };
        Self::new(config.max_retries, backoff)
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Initial try plus retries.
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    /// Decide after `retries_done` retries whether a transient failure gets
    /// another attempt.
    pub fn decide(&self, retries_done: u32, transient: bool) -> RetryDecision {
        if transient && retries_done < self.max_retries {
            RetryDecision::RetryAfter(self.delay_for(retries_done + 1))
        } else {
            RetryDecision::Stop
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
