//! Eclipse account batch runner
//!
//! Loads the run configuration and wallet lists, builds the module catalog and
//! walks every account pair through the selected modules.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use eclipse_batch::files;
use eclipse_batch::simulated::{SimulatedModuleFactory, SimulationSettings};
use eclipse_batch_config::{validate_config, AppConfig, ConfigLoader, ENV_PREFIX};
use eclipse_batch_engine::{
    BatchExecutor, InMemoryResultStore, ModuleCatalog, ProxyLookup, ProxyManager, RunContext,
    SeedStrategy,
};
use eclipse_batch_notify::{LogSink, MessageSink, Notifier, TelegramSink};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

/// Eclipse batch runner CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the run configuration (yaml, toml or json)
    #[arg(long, default_value = "config/config.yaml")]
    config: PathBuf,

    /// Seed for reproducible module selection and pacing
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a simulated module attempt succeeds
    #[arg(long, default_value = "0.9")]
    success_rate: f64,

    /// Base latency of simulated module attempts in milliseconds
    #[arg(long, default_value = "200")]
    mock_latency_ms: u64,

    /// Pause after listing the enabled modules, in seconds
    #[arg(long, default_value = "10")]
    start_delay_secs: u64,

    /// Log output format
    #[arg(long, value_enum, default_value = "plain")]
    log_format: LogFormat,
}

fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Plain => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
    .context("failed to initialize tracing")
}

fn build_notifier(config: &AppConfig) -> Result<Notifier> {
    let sink: Arc<dyn MessageSink> = if config.telegram.enabled {
        Arc::new(TelegramSink::new(
            config.telegram.bot_token.clone(),
            config.telegram.user_id,
        )?)
    } else {
        Arc::new(LogSink)
    };

    Ok(Notifier::new(sink))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::from_file_with_env(&args.config, ENV_PREFIX)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    validate_config(&config)?;

    init_tracing(&config.network.log_level, args.log_format)?;

    let mut pool = files::load_pool(&config.data.evm_wallets, &config.data.eclipse_wallets)?;
    if pool.is_empty() {
        warn!("No wallets found, nothing to do");
        return Ok(());
    }

    if config.is_shuffle {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        pool.shuffle(&mut rng);
        info!("Wallets shuffled");
    }

    let proxy_list = files::read_optional_lines(&config.data.proxies)?;
    let proxies: Arc<dyn ProxyLookup> = if proxy_list.is_empty() {
        warn!("No proxies configured, using direct connections");
        Arc::new(ProxyManager::direct())
    } else {
        Arc::new(ProxyManager::new(proxy_list, pool.len())?)
    };

    let words = files::read_optional_lines(&config.data.words)?;

    let factory = SimulatedModuleFactory::new(SimulationSettings::new(
        args.success_rate,
        args.mock_latency_ms,
        config.swaps.clone(),
    ));
    let catalog = ModuleCatalog::build(&config.modules.effective_enabled(), &factory)?;

    info!("Accounts: {}", pool.len());
    info!("Workers: {}", config.threads.worker_count());
    info!("Mode: {:?}", config.modules.mode);
    info!("Enabled modules: {}", catalog.names().collect::<Vec<_>>().join(", "));
    if config.modules.bridge_pre_step() {
        info!("Relay runs before every account's modules");
    }

    let context = RunContext::new();
    let recorder = Arc::new(InMemoryResultStore::new());
    let seed = args.seed.map(SeedStrategy::Fixed).unwrap_or_default();

    let executor = BatchExecutor::builder()
        .with_run_config(&config)?
        .with_pool(pool)
        .with_catalog(catalog)
        .with_notifier(Arc::new(build_notifier(&config)?))
        .with_proxies(proxies)
        .with_recorder(recorder.clone())
        .with_words(words)
        .with_seed(seed)
        .with_context(context.clone())
        .build()?;

    info!("Starting in {} seconds", args.start_delay_secs);
    tokio::time::sleep(Duration::from_secs(args.start_delay_secs)).await;

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current accounts");
            context.cancel();
        }
    });

    let report = executor.run().await?;

    info!(
        accounts = report.accounts.len(),
        modules = report.modules_run(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        skipped = report.skipped(),
        accounts_with_errors = report.accounts_with_errors(),
        records = recorder.records().await.len(),
        cancelled = report.cancelled,
        "Run summary"
    );

    Ok(())
}
