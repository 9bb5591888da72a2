//! In-process stand-ins for every known module.
//!
//! Each call runs the retry loop against a coin flip with the configured
//! success rate, then reports and records the result the way a chain-backed
//! module does.

use async_trait::async_trait;
use eclipse_batch_config::SwapConfig;
use eclipse_batch_engine::{
    CatalogError, IndexedModule, LexicalModule, ModuleContext, ModuleFactory, ModuleHandle,
    ModuleRecord, PlainModule, ProxyLookup, ResultRecorder,
};
use eclipse_batch_pacing::RetryPolicy;
use eclipse_batch_types::{AmountRange, ModuleDescriptor, ModuleError, ModuleVariant};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Knobs shared by every simulated module
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Probability that one attempt lands (0.0 to 1.0)
    pub success_rate: f64,
    /// Latency range per attempt (ms)
    pub latency_range: (u64, u64),
    pub swaps: SwapConfig,
}

impl SimulationSettings {
    pub fn new(success_rate: f64, latency_ms: u64, swaps: SwapConfig) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            latency_range: (latency_ms, latency_ms * 3),
            swaps,
        }
    }

    fn amount_range(&self, token: &str) -> AmountRange {
        match token {
            "ETH" => self.swaps.native.eth,
            "SOL" => self.swaps.native.sol,
            _ => self.swaps.stable,
        }
    }
}

pub struct SimulatedModule {
    name: String,
    settings: Arc<SimulationSettings>,
}

impl SimulatedModule {
    pub fn new(name: impl Into<String>, settings: Arc<SimulationSettings>) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }

    async fn simulate_latency(&self) {
        let delay = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.settings.latency_range.0..=self.settings.latency_range.1)
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    fn should_succeed(&self) -> bool {
        let mut rng = rand::thread_rng();
        rng.gen::<f64>() < self.settings.success_rate
    }

    /// Retry loop, then report and record
    async fn perform(
        &self,
        ctx: &ModuleContext<'_>,
        retry: &RetryPolicy,
        action: &str,
    ) -> Result<bool, ModuleError> {
        let mut rng = StdRng::from_entropy();
        let token = self
            .settings
            .swaps
            .tokens
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| "ETH".to_string());
        let amount = self.settings.amount_range(&token).sample(&mut rng);

        let result = retry
            .run(&self.name, &mut rng, |attempt| async move {
                if ctx.run.is_cancelled() {
                    return Err(ModuleError::Cancelled);
                }

                self.simulate_latency().await;

                if self.should_succeed() {
                    Ok(fake_signature(ctx.wallet(), &self.name, attempt))
                } else {
                    Err(ModuleError::Confirmation("transaction was not confirmed".into()))
                }
            })
            .await;

        let wallet = ctx.wallet();
        match result {
            Ok(signature) => {
                self.record(ctx, amount, &token, &signature).await;
                ctx.notifier
                    .add_success_with_link(
                        wallet,
                        &format!("{}: {} {} {}", self.name, action, amount, token),
                        ctx.scan_url,
                        &signature,
                    )
                    .await;
                Ok(true)
            }
            Err(e) => {
                ctx.notifier
                    .add_error(wallet, &format!("{}: {}", self.name, e))
                    .await;
                Err(e)
            }
        }
    }

    async fn record(&self, ctx: &ModuleContext<'_>, amount: Decimal, token: &str, signature: &str) {
        let record = ModuleRecord::new(ctx.wallet(), &self.name, amount, token, signature);
        if let Err(e) = ctx.recorder.record(record).await {
            warn!(module = %self.name, error = %e, "Failed to record result");
        }
    }
}

fn fake_signature(wallet: &str, module: &str, attempt: u32) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(wallet.as_bytes());
    hasher.update(module.as_bytes());
    hasher.update(attempt.to_be_bytes());
    hasher.update(nanos.to_be_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl IndexedModule for SimulatedModule {
    async fn execute(
        &self,
        ctx: &ModuleContext<'_>,
        proxies: &dyn ProxyLookup,
        account_index: usize,
        retry: &RetryPolicy,
    ) -> Result<bool, ModuleError> {
        debug!(
            module = %self.name,
            proxy = proxies.proxy_url(account_index).as_deref().unwrap_or("direct"),
            "Routing through account proxy"
        );
        self.perform(ctx, retry, "swapped").await
    }
}

#[async_trait]
impl LexicalModule for SimulatedModule {
    async fn execute(
        &self,
        ctx: &ModuleContext<'_>,
        _client: &reqwest::Client,
        words: &[String],
        retry: &RetryPolicy,
    ) -> Result<bool, ModuleError> {
        let name = {
            let mut rng = rand::thread_rng();
            words
                .choose_multiple(&mut rng, 2)
                .cloned()
                .collect::<Vec<_>>()
                .join("-")
        };
        if name.is_empty() {
            return Err(ModuleError::Other("word list is empty".into()));
        }

        self.perform(ctx, retry, &format!("minted \"{name}\" for")).await
    }
}

#[async_trait]
impl PlainModule for SimulatedModule {
    async fn execute(
        &self,
        ctx: &ModuleContext<'_>,
        _client: &reqwest::Client,
        retry: &RetryPolicy,
    ) -> Result<bool, ModuleError> {
        self.perform(ctx, retry, "swapped").await
    }
}

/// Simulated module of the descriptor's variant for every known module
pub struct SimulatedModuleFactory {
    settings: Arc<SimulationSettings>,
}

impl SimulatedModuleFactory {
    pub fn new(settings: SimulationSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

impl ModuleFactory for SimulatedModuleFactory {
    fn create(&self, descriptor: &ModuleDescriptor) -> Result<ModuleHandle, CatalogError> {
        let module = Arc::new(SimulatedModule::new(&descriptor.name, self.settings.clone()));

        Ok(match descriptor.variant {
            ModuleVariant::Indexed => ModuleHandle::Indexed(module),
            ModuleVariant::Lexical => ModuleHandle::Lexical(module),
            ModuleVariant::Plain => ModuleHandle::Plain(module),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_signature_shape() {
        let signature = fake_signature("wallet", "Orca", 1);
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_factory_matches_declared_variant() {
        let factory = SimulatedModuleFactory::new(SimulationSettings::new(1.0, 0, SwapConfig::default()));
        for module in eclipse_batch_types::KnownModule::ALL {
            let descriptor = module.descriptor();
            let handle = factory.create(&descriptor).unwrap();
            assert_eq!(handle.variant(), descriptor.variant);
        }
    }

    #[test]
    fn test_success_rate_clamped() {
        let settings = SimulationSettings::new(3.0, 10, SwapConfig::default());
        assert_eq!(settings.success_rate, 1.0);
        assert_eq!(settings.latency_range, (10, 30));
    }
}
