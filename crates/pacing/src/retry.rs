use crate::delay::{DelayPlan, DelayStage, DelayVariant};
use eclipse_batch_types::{DelayRange, ModuleError};
use rand::Rng;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq)]
pub enum RetryError {
    #[error("attempt budget must be at least 1")]
    NoAttempts,

    #[error("invalid retry delay range [{min}, {max}]")]
    InvalidDelay { min: f64, max: f64 },
}

/// Attempt budget plus the pause between attempts.
///
/// The executor never retries on its own; every module runs its operation
/// through `run` with the budget it was handed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: DelayRange,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: DelayRange) -> Result<Self, RetryError> {
        if attempts == 0 {
            return Err(RetryError::NoAttempts);
        }
        if !delay.is_valid() {
            return Err(RetryError::InvalidDelay {
                min: delay.min,
                max: delay.max,
            });
        }

        Ok(Self { attempts, delay })
    }

    /// Budget with no pause between attempts
    pub fn immediate(attempts: u32) -> Result<Self, RetryError> {
        Self::new(attempts, DelayRange::ZERO)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay_plan(&self) -> DelayPlan {
        DelayPlan {
            stage: DelayStage::BetweenRetries,
            variant: DelayVariant::Short,
            range: self.delay,
        }
    }

    /// Run `operation` until it succeeds or the budget is spent.
    ///
    /// The closure receives the 1-based attempt number. `ModuleError::Cancelled`
    /// stops the loop immediately. Exhaustion yields
    /// `ModuleError::AttemptsExhausted` carrying the last error.
    pub async fn run<T, F, Fut, R>(
        &self,
        module: &str,
        rng: &mut R,
        mut operation: F,
    ) -> Result<T, ModuleError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ModuleError>>,
        R: Rng + ?Sized,
    {
        let plan = self.delay_plan();
        let mut last_error = None;

        for attempt in 1..=self.attempts {
            match operation(attempt).await {
                Ok(value) => {
                    debug!(module, attempt, "Attempt succeeded");
                    return Ok(value);
                }
                Err(ModuleError::Cancelled) => return Err(ModuleError::Cancelled),
                Err(e) => {
                    warn!(module, attempt, attempts = self.attempts, error = %e, "Attempt failed");
                    last_error = Some(e);

                    if attempt < self.attempts {
                        plan.pause(rng).await;
                    }
                }
            }
        }

        Err(ModuleError::AttemptsExhausted {
            module: module.to_string(),
            attempts: self.attempts,
            last: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}
