//! Core configuration structures for the batch runner

use eclipse_batch_types::{AmountRange, CountRange, DelayRange, KnownModule, ECLIPSE_SCAN_URL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chain endpoints and logging
    #[serde(default)]
    pub network: NetworkConfig,

    /// Concurrent worker settings
    #[serde(default)]
    pub threads: ThreadConfig,

    /// Module selection
    pub modules: ModulesConfig,

    /// Pacing between retries, modules and accounts
    pub delay: DelayConfig,

    /// Amount ranges handed to swap modules
    #[serde(default)]
    pub swaps: SwapConfig,

    /// Telegram delivery of per-wallet reports
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Shuffle wallet pairs before the run
    #[serde(default)]
    pub is_shuffle: bool,

    /// Input file locations
    #[serde(default)]
    pub data: DataPaths,
}

/// Network and logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Eclipse RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Explorer prefix used for transaction links
    #[serde(default = "default_scan_url")]
    pub scan_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Worker configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThreadConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_thread_count")]
    pub count: usize,
}

impl ThreadConfig {
    /// Number of workers the executor will spawn
    pub fn worker_count(&self) -> usize {
        if self.enabled {
            self.count
        } else {
            1
        }
    }
}

/// How modules are chosen for each account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModuleMode {
    /// Run `modules.sequence` verbatim
    #[serde(rename = "queue", alias = "sequence")]
    Sequence,

    /// Sample `modules.modules_count` modules with replacement
    #[default]
    #[serde(rename = "random")]
    Random,

    /// One swap into ETH through a randomly chosen DEX
    #[serde(rename = "eth", alias = "single_asset")]
    SingleAsset,
}

/// Module selection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModulesConfig {
    #[serde(default)]
    pub mode: ModuleMode,

    /// Ordered module names for sequence mode
    #[serde(default)]
    pub sequence: Vec<String>,

    /// Per-account module count for random mode
    #[serde(default = "default_modules_count")]
    pub modules_count: CountRange,

    /// Enabled flags
    #[serde(default)]
    pub enabled: EnabledModules,
}

impl ModulesConfig {
    /// Modules the catalog must hold for the configured mode.
    ///
    /// Sequence mode adds every module named in the sequence and single-asset
    /// mode adds the swap candidates, regardless of their flags.
    pub fn effective_enabled(&self) -> EnabledModules {
        let mut enabled = self.enabled;

        match self.mode {
            ModuleMode::Sequence => {
                for module in self.sequence.iter().filter_map(|n| KnownModule::from_name(n)) {
                    enabled.set(module, true);
                }
            }
            ModuleMode::SingleAsset => {
                for module in KnownModule::SWAPS {
                    enabled.set(module, true);
                }
            }
            ModuleMode::Random => {}
        }

        enabled
    }

    /// Whether the bridge module runs once per account before selection
    pub fn bridge_pre_step(&self) -> bool {
        self.mode != ModuleMode::SingleAsset && self.enabled.is_enabled(KnownModule::BRIDGE)
    }
}

/// Enabled flag per known module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnabledModules {
    #[serde(default)]
    pub orca: bool,
    #[serde(default)]
    pub lifinity: bool,
    #[serde(default)]
    pub invariant: bool,
    #[serde(default)]
    pub relay: bool,
    #[serde(default)]
    pub solar: bool,
    #[serde(default)]
    pub underdog: bool,
    #[serde(default)]
    pub gas_station: bool,
}

impl EnabledModules {
    pub fn is_enabled(&self, module: KnownModule) -> bool {
        match module {
            KnownModule::Orca => self.orca,
            KnownModule::Underdog => self.underdog,
            KnownModule::Invariant => self.invariant,
            KnownModule::Relay => self.relay,
            KnownModule::Lifinity => self.lifinity,
            KnownModule::Solar => self.solar,
            KnownModule::GasStation => self.gas_station,
        }
    }

    pub fn set(&mut self, module: KnownModule, enabled: bool) {
        let flag = match module {
            KnownModule::Orca => &mut self.orca,
            KnownModule::Underdog => &mut self.underdog,
            KnownModule::Invariant => &mut self.invariant,
            KnownModule::Relay => &mut self.relay,
            KnownModule::Lifinity => &mut self.lifinity,
            KnownModule::Solar => &mut self.solar,
            KnownModule::GasStation => &mut self.gas_station,
        };
        *flag = enabled;
    }

    /// Enabled modules in catalog order
    pub fn iter(&self) -> impl Iterator<Item = KnownModule> + '_ {
        KnownModule::ALL
            .into_iter()
            .filter(move |module| self.is_enabled(*module))
    }

    pub fn only(modules: &[KnownModule]) -> Self {
        let mut enabled = Self::default();
        for module in modules {
            enabled.set(*module, true);
        }
        enabled
    }
}

/// Delay configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DelayConfig {
    pub between_accounts: DelayRange,
    pub between_modules: DelayRange,
    pub between_retries: RetryConfig,
}

/// Retry pacing and the attempt budget handed to every module
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

impl RetryConfig {
    pub fn range(&self) -> DelayRange {
        DelayRange::new(self.min, self.max)
    }
}

/// Swap amount configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwapConfig {
    /// Token symbols swap modules may pick from
    #[serde(default = "default_tokens")]
    pub tokens: Vec<String>,

    #[serde(default)]
    pub native: NativeAmounts,

    #[serde(default)]
    pub stable: AmountRange,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NativeAmounts {
    #[serde(default)]
    pub eth: AmountRange,
    #[serde(default)]
    pub sol: AmountRange,
}

/// Telegram configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub bot_token: String,

    /// Chat that receives the reports
    #[serde(default)]
    pub user_id: i64,
}

/// Input file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    #[serde(default = "default_evm_wallets")]
    pub evm_wallets: PathBuf,

    #[serde(default = "default_eclipse_wallets")]
    pub eclipse_wallets: PathBuf,

    #[serde(default = "default_proxies")]
    pub proxies: PathBuf,

    #[serde(default = "default_words")]
    pub words: PathBuf,
}

// Default value functions
fn default_rpc_url() -> String {
    "https://mainnetbeta-rpc.eclipse.xyz".to_string()
}

fn default_scan_url() -> String {
    ECLIPSE_SCAN_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_thread_count() -> usize {
    1
}

fn default_modules_count() -> CountRange {
    CountRange::new(1, 3)
}

fn default_attempts() -> u32 {
    3
}

fn default_tokens() -> Vec<String> {
    vec!["ETH".to_string(), "USDC".to_string()]
}

fn default_evm_wallets() -> PathBuf {
    PathBuf::from("data/evm_wallets.txt")
}

fn default_eclipse_wallets() -> PathBuf {
    PathBuf::from("data/eclipse_wallets.txt")
}

fn default_proxies() -> PathBuf {
    PathBuf::from("data/proxies.txt")
}

fn default_words() -> PathBuf {
    PathBuf::from("words/words.txt")
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            scan_url: default_scan_url(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            count: default_thread_count(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min: 5.0,
            max: 15.0,
            attempts: default_attempts(),
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            evm_wallets: default_evm_wallets(),
            eclipse_wallets: default_eclipse_wallets(),
            proxies: default_proxies(),
            words: default_words(),
        }
    }
}
