use eclipse_batch_types::{DelayRange, ExecutionOutcome};
use rand::Rng;
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Time unit a sampled delay value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayUnit {
    Seconds,
    Minutes,
}

impl DelayUnit {
    pub fn to_duration(self, value: f64) -> Duration {
        let secs = match self {
            DelayUnit::Seconds => value,
            DelayUnit::Minutes => value * 60.0,
        };
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }
}

impl fmt::Display for DelayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayUnit::Seconds => write!(f, "seconds"),
            DelayUnit::Minutes => write!(f, "minutes"),
        }
    }
}

/// Long delays follow a success and are counted in minutes, short ones in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayVariant {
    Long,
    Short,
}

impl DelayVariant {
    pub fn unit(self) -> DelayUnit {
        match self {
            DelayVariant::Long => DelayUnit::Minutes,
            DelayVariant::Short => DelayUnit::Seconds,
        }
    }
}

/// Configured range a plan was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayStage {
    BetweenModules,
    BetweenAccounts,
    BetweenRetries,
}

impl fmt::Display for DelayStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayStage::BetweenModules => write!(f, "between_modules"),
            DelayStage::BetweenAccounts => write!(f, "between_accounts"),
            DelayStage::BetweenRetries => write!(f, "between_retries"),
        }
    }
}

/// A delay decision: which range to draw from and in which unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayPlan {
    pub stage: DelayStage,
    pub variant: DelayVariant,
    pub range: DelayRange,
}

impl DelayPlan {
    pub fn unit(&self) -> DelayUnit {
        self.variant.unit()
    }

    /// Uniform draw from the range, converted with the plan's unit
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        self.unit().to_duration(self.range.sample(rng))
    }

    /// Draw a delay, log it and sleep on the current task
    pub async fn pause<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let value = self.range.sample(rng);
        let unit = self.unit();
        let duration = unit.to_duration(value);

        info!(stage = %self.stage, "Waiting {:.2} {}", value, unit);
        tokio::time::sleep(duration).await;

        duration
    }
}

/// Chooses the delay to apply after each module and each account
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayPolicy {
    pub between_accounts: DelayRange,
    pub between_modules: DelayRange,
}

impl DelayPolicy {
    pub fn new(between_accounts: DelayRange, between_modules: DelayRange) -> Self {
        Self {
            between_accounts,
            between_modules,
        }
    }

    /// No waiting at all
    pub fn immediate() -> Self {
        Self::new(DelayRange::ZERO, DelayRange::ZERO)
    }

    /// Delay after one module of an account.
    ///
    /// The last module always draws the short variant from the between-accounts
    /// range. Otherwise a success, or a failure that carried no error, draws the
    /// long variant of the between-modules range and an error draws the short one.
    pub fn after_module(&self, outcome: &ExecutionOutcome, is_last: bool) -> DelayPlan {
        if is_last {
            return DelayPlan {
                stage: DelayStage::BetweenAccounts,
                variant: DelayVariant::Short,
                range: self.between_accounts,
            };
        }

        let variant = if outcome.is_success_compatible() {
            DelayVariant::Long
        } else {
            DelayVariant::Short
        };

        DelayPlan {
            stage: DelayStage::BetweenModules,
            variant,
            range: self.between_modules,
        }
    }

    /// Delay before the next account of the same worker, in minutes
    pub fn after_account(&self) -> DelayPlan {
        DelayPlan {
            stage: DelayStage::BetweenAccounts,
            variant: DelayVariant::Long,
            range: self.between_accounts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eclipse_batch_types::ModuleError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn policy() -> DelayPolicy {
        DelayPolicy::new(DelayRange::new(100.0, 200.0), DelayRange::new(1.0, 2.0))
    }

    #[test]
    fn test_success_uses_module_range_in_minutes() {
        let plan = policy().after_module(&ExecutionOutcome::success(), false);
        assert_eq!(plan.stage, DelayStage::BetweenModules);
        assert_eq!(plan.unit(), DelayUnit::Minutes);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let delay = plan.sample(&mut rng);
            assert!(delay >= Duration::from_secs(60));
            assert!(delay <= Duration::from_secs(120));
        }
    }

    #[test]
    fn test_failure_uses_module_range_in_seconds() {
        let outcome = ExecutionOutcome::failure(ModuleError::Quote("no route".into()));
        let plan = policy().after_module(&outcome, false);
        assert_eq!(plan.stage, DelayStage::BetweenModules);
        assert_eq!(plan.variant, DelayVariant::Short);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let delay = plan.sample(&mut rng);
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_secs(2));
        }
    }

    #[test]
    fn test_failure_without_error_paces_like_success() {
        let plan = policy().after_module(&ExecutionOutcome::failed_without_error(), false);
        assert_eq!(plan.variant, DelayVariant::Long);
    }

    #[test]
    fn test_last_module_uses_account_range_regardless_of_outcome() {
        let failed = ExecutionOutcome::failure(ModuleError::Other("boom".into()));
        let mut rng = StdRng::seed_from_u64(42);

        for outcome in [ExecutionOutcome::success(), failed] {
            let plan = policy().after_module(&outcome, true);
            assert_eq!(plan.stage, DelayStage::BetweenAccounts);
            assert_eq!(plan.variant, DelayVariant::Short);
            assert_eq!(plan.range, DelayRange::new(100.0, 200.0));

            let delay = plan.sample(&mut rng);
            assert!(delay >= Duration::from_secs(100));
            assert!(delay <= Duration::from_secs(200));
        }
    }

    #[test]
    fn test_after_account_in_minutes() {
        let plan = policy().after_account();
        assert_eq!(plan.stage, DelayStage::BetweenAccounts);
        assert_eq!(plan.unit(), DelayUnit::Minutes);
    }

    #[test]
    fn test_invalid_value_becomes_zero() {
        assert_eq!(DelayUnit::Seconds.to_duration(-1.0), Duration::ZERO);
        assert_eq!(DelayUnit::Minutes.to_duration(f64::NAN), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_sleeps_for_sampled_duration() {
        let plan = DelayPolicy::new(DelayRange::new(3.0, 3.0), DelayRange::ZERO).after_account();

        let start = tokio::time::Instant::now();
        let mut rng = StdRng::seed_from_u64(1);
        let slept = plan.pause(&mut rng).await;

        assert_eq!(slept, Duration::from_secs(180));
        assert!(start.elapsed() >= Duration::from_secs(180));
    }
}
