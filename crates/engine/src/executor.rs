use eclipse_batch_config::AppConfig;
use eclipse_batch_notify::Notifier;
use eclipse_batch_pacing::{DelayPolicy, RetryError, RetryPolicy};
use eclipse_batch_types::{AccountPool, ExecutionOutcome, KnownModule, WorkerPartition, ECLIPSE_SCAN_URL};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogEntry, ModuleCatalog};
use crate::module::{dispatch, ModuleContext, ModuleInputs};
use crate::proxy::{ProxyError, ProxyLookup};
use crate::record::{InMemoryResultStore, ResultRecorder};
use crate::report::{AccountReport, ModuleStatus, RunReport};
use crate::selector::ModuleSelector;
use crate::RunContext;

const DEFAULT_RPC_URL: &str = "https://mainnetbeta-rpc.eclipse.xyz";

/// Run-fatal errors
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("worker {worker}: {source}")]
    Proxy {
        worker: usize,
        #[source]
        source: ProxyError,
    },

    #[error("worker {worker}: account index {index} is outside the pool")]
    AccountOutOfRange { worker: usize, index: usize },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

/// Builder error
#[derive(Debug, Error, PartialEq)]
pub enum BuilderError {
    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error(transparent)]
    Retry(#[from] RetryError),
}

/// Where per-worker random generators come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedStrategy {
    #[default]
    Entropy,
    /// Worker `i` is seeded with `seed + i`
    Fixed(u64),
}

impl SeedStrategy {
    fn rng_for(self, worker: usize) -> StdRng {
        match self {
            SeedStrategy::Entropy => StdRng::from_entropy(),
            SeedStrategy::Fixed(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
        }
    }
}

/// Builder for BatchExecutor
pub struct BatchExecutorBuilder {
    pool: Option<AccountPool>,
    catalog: Option<ModuleCatalog>,
    selector: Option<ModuleSelector>,
    notifier: Option<Arc<Notifier>>,
    proxies: Option<Arc<dyn ProxyLookup>>,
    retry: Option<RetryPolicy>,
    recorder: Arc<dyn ResultRecorder>,
    delays: DelayPolicy,
    workers: usize,
    bridge_pre_step: bool,
    words: Vec<String>,
    rpc_url: String,
    scan_url: String,
    seed: SeedStrategy,
    context: RunContext,
}

impl BatchExecutorBuilder {
    pub fn new() -> Self {
        Self {
            pool: None,
            catalog: None,
            selector: None,
            notifier: None,
            proxies: None,
            retry: None,
            recorder: Arc::new(InMemoryResultStore::new()),
            delays: DelayPolicy::immediate(),
            workers: 1,
            bridge_pre_step: false,
            words: Vec::new(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            scan_url: ECLIPSE_SCAN_URL.to_string(),
            seed: SeedStrategy::Entropy,
            context: RunContext::new(),
        }
    }

    /// Apply workers, pacing, retry budget, selection and endpoints from a run configuration
    pub fn with_run_config(mut self, config: &AppConfig) -> Result<Self, BuilderError> {
        if config.threads.enabled && config.threads.count == 0 {
            return Err(BuilderError::InvalidWorkerCount);
        }

        let retries = &config.delay.between_retries;
        self.retry = Some(RetryPolicy::new(retries.attempts, retries.range())?);
        self.delays = DelayPolicy::new(config.delay.between_accounts, config.delay.between_modules);
        self.workers = config.threads.worker_count();
        self.selector = Some(ModuleSelector::from_config(&config.modules));
        self.bridge_pre_step = config.modules.bridge_pre_step();
        self.rpc_url = config.network.rpc_url.clone();
        self.scan_url = config.network.scan_url.clone();
        Ok(self)
    }

    pub fn with_pool(mut self, pool: AccountPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn with_catalog(mut self, catalog: ModuleCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_selector(mut self, selector: ModuleSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_proxies(mut self, proxies: Arc<dyn ProxyLookup>) -> Self {
        self.proxies = Some(proxies);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn ResultRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_delays(mut self, delays: DelayPolicy) -> Self {
        self.delays = delays;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Run the bridge once per account before the selected modules
    pub fn with_bridge_pre_step(mut self, enabled: bool) -> Self {
        self.bridge_pre_step = enabled;
        self
    }

    pub fn with_words(mut self, words: Vec<String>) -> Self {
        self.words = words;
        self
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn with_scan_url(mut self, scan_url: impl Into<String>) -> Self {
        self.scan_url = scan_url.into();
        self
    }

    pub fn with_seed(mut self, seed: SeedStrategy) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_context(mut self, context: RunContext) -> Self {
        self.context = context;
        self
    }

    /// Build the BatchExecutor, validating that all required fields are set
    pub fn build(self) -> Result<BatchExecutor, BuilderError> {
        let pool = self.pool.ok_or_else(|| BuilderError::MissingField {
            field: "pool".to_string(),
        })?;

        let catalog = self.catalog.ok_or_else(|| BuilderError::MissingField {
            field: "catalog".to_string(),
        })?;

        let selector = self.selector.ok_or_else(|| BuilderError::MissingField {
            field: "selector".to_string(),
        })?;

        let notifier = self.notifier.ok_or_else(|| BuilderError::MissingField {
            field: "notifier".to_string(),
        })?;

        let proxies = self.proxies.ok_or_else(|| BuilderError::MissingField {
            field: "proxies".to_string(),
        })?;

        let retry = self.retry.ok_or_else(|| BuilderError::MissingField {
            field: "retry".to_string(),
        })?;

        if self.workers == 0 {
            return Err(BuilderError::InvalidWorkerCount);
        }

        Ok(BatchExecutor {
            shared: Arc::new(Shared {
                pool,
                catalog,
                selector,
                notifier,
                proxies,
                retry,
                recorder: self.recorder,
                delays: self.delays,
                bridge_pre_step: self.bridge_pre_step,
                words: self.words,
                rpc_url: self.rpc_url,
                scan_url: self.scan_url,
                context: self.context,
            }),
            workers: self.workers,
            seed: self.seed,
        })
    }
}

impl Default for BatchExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// State every worker reads
struct Shared {
    pool: AccountPool,
    catalog: ModuleCatalog,
    selector: ModuleSelector,
    notifier: Arc<Notifier>,
    proxies: Arc<dyn ProxyLookup>,
    retry: RetryPolicy,
    recorder: Arc<dyn ResultRecorder>,
    delays: DelayPolicy,
    bridge_pre_step: bool,
    words: Vec<String>,
    rpc_url: String,
    scan_url: String,
    context: RunContext,
}

/// Walks the account pool with one task per worker partition
pub struct BatchExecutor {
    shared: Arc<Shared>,
    workers: usize,
    seed: SeedStrategy,
}

impl BatchExecutor {
    pub fn builder() -> BatchExecutorBuilder {
        BatchExecutorBuilder::new()
    }

    pub fn context(&self) -> &RunContext {
        &self.shared.context
    }

    pub fn partitions(&self) -> Vec<WorkerPartition> {
        WorkerPartition::split(self.shared.pool.len(), self.workers)
    }

    /// Process every account and return the per-account report.
    ///
    /// Module failures only show up in the report. A worker-level error stops
    /// that worker; siblings run to the end of their partitions and the first
    /// error received is returned once all of them have joined.
    pub async fn run(&self) -> Result<RunReport, ExecutorError> {
        let partitions = self.partitions();
        let (errors_tx, mut errors_rx) = mpsc::channel(partitions.len());

        info!(
            pool_size = self.shared.pool.len(),
            workers = partitions.len(),
            modules = self.shared.catalog.len(),
            "Starting batch run"
        );

        let handles: Vec<_> = partitions
            .iter()
            .map(|partition| {
                let shared = self.shared.clone();
                let rng = self.seed.rng_for(partition.worker);
                let errors = errors_tx.clone();
                tokio::spawn(run_worker(shared, *partition, rng, errors))
            })
            .collect();
        drop(errors_tx);

        let mut accounts = Vec::new();
        let mut panicked = None;

        for (partition, joined) in partitions.iter().zip(join_all(handles).await) {
            match joined {
                Ok(reports) => accounts.extend(reports),
                Err(e) => {
                    error!(worker = partition.worker, error = %e, "Worker task failed");
                    panicked.get_or_insert(ExecutorError::WorkerPanicked {
                        worker: partition.worker,
                    });
                }
            }
        }

        if let Some(e) = errors_rx.recv().await {
            return Err(e);
        }
        if let Some(e) = panicked {
            return Err(e);
        }

        let report = RunReport::new(accounts, self.shared.context.is_cancelled());
        info!(
            accounts = report.accounts.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Batch run finished"
        );

        Ok(report)
    }
}

async fn run_worker(
    shared: Arc<Shared>,
    partition: WorkerPartition,
    mut rng: StdRng,
    errors: mpsc::Sender<ExecutorError>,
) -> Vec<AccountReport> {
    let pool_size = shared.pool.len();
    let mut reports = Vec::with_capacity(partition.len());

    debug!(worker = partition.worker, start = partition.start, end = partition.end, "Worker started");

    for index in partition.range() {
        if shared.context.is_cancelled() {
            warn!(worker = partition.worker, account = index + 1, "Run cancelled, stopping worker");
            break;
        }

        match shared.process_account(partition.worker, index, &mut rng).await {
            Ok(report) => {
                let status = if report.has_errors() { "ended with errors" } else { "successfully ended" };
                info!(
                    worker = partition.worker,
                    account = index + 1,
                    pool_size,
                    wallet = %report.wallet,
                    "Account {}", status
                );
                reports.push(report);
            }
            Err(e) => {
                error!(worker = partition.worker, account = index + 1, error = %e, "Worker aborted");
                if errors.send(e).await.is_err() {
                    warn!(worker = partition.worker, "Error channel closed");
                }
                break;
            }
        }

        if index + 1 == pool_size {
            info!(worker = partition.worker, "All accounts processed");
        }

        if partition.is_last(index) {
            break;
        }

        shared.delays.after_account().pause(&mut rng).await;
    }

    reports
}

impl Shared {
    async fn process_account(
        &self,
        worker: usize,
        index: usize,
        rng: &mut StdRng,
    ) -> Result<AccountReport, ExecutorError> {
        let pool_size = self.pool.len();
        let account = self
            .pool
            .get(index)
            .ok_or(ExecutorError::AccountOutOfRange { worker, index })?;
        let client = self
            .proxies
            .client(index)
            .map_err(|source| ExecutorError::Proxy { worker, source })?;

        let wallet = account.wallet_key();
        info!(
            worker,
            account = index + 1,
            pool_size,
            evm = %account.evm.address,
            eclipse = %account.eclipse.address,
            "Starting account"
        );

        self.notifier
            .add_message(
                wallet,
                format!(
                    "[{}/{}]\nEVM: {}\nECLIPSE: {}",
                    index + 1,
                    pool_size,
                    account.evm.address,
                    account.eclipse.address
                ),
            )
            .await;

        let ctx = ModuleContext {
            run: &self.context,
            account,
            rpc_url: &self.rpc_url,
            scan_url: &self.scan_url,
            notifier: &self.notifier,
            recorder: self.recorder.as_ref(),
        };
        let inputs = ModuleInputs {
            proxies: self.proxies.as_ref(),
            account_index: index,
            client: &client,
            words: &self.words,
        };
        let mut report = AccountReport::new(index, worker, wallet);

        if self.bridge_pre_step {
            let bridge = KnownModule::BRIDGE.name();
            match self.catalog.get(bridge) {
                Some(entry) => {
                    info!(worker, account = index + 1, module = bridge, "Running pre-step");
                    if let Some(outcome) = self.invoke(entry, &ctx, inputs, &mut report).await {
                        self.delays.after_module(&outcome, false).pause(rng).await;
                    }
                }
                None => warn!(module = bridge, "Pre-step module is not in the catalog"),
            }
        }

        let selected = self.selector.select(&self.catalog, rng);
        debug!(worker, account = index + 1, modules = ?selected, "Selected modules");

        for (position, name) in selected.iter().enumerate() {
            if self.context.is_cancelled() {
                warn!(worker, account = index + 1, "Run cancelled, skipping remaining modules");
                break;
            }

            info!(worker, account = index + 1, "module {}/{}: {}", position + 1, selected.len(), name);

            let Some(entry) = self.catalog.get(name) else {
                warn!(worker, account = index + 1, module = %name, "Module is not in the catalog, skipping");
                report.push(name, ModuleStatus::Skipped, Some("not in the catalog".to_string()));
                continue;
            };

            if let Some(outcome) = self.invoke(entry, &ctx, inputs, &mut report).await {
                let is_last = position + 1 == selected.len();
                self.delays.after_module(&outcome, is_last).pause(rng).await;
            }
        }

        if report.has_errors() {
            self.notifier
                .add_error(wallet, &report.error_summary())
                .await;
        }

        match self.notifier.flush(wallet).await {
            Ok(()) => debug!(worker, account = index + 1, "Messages delivered"),
            Err(e) => error!(worker, account = index + 1, error = %e, "Failed to deliver messages"),
        }

        Ok(report)
    }

    /// Run one catalog entry; `None` when it was skipped without running
    async fn invoke(
        &self,
        entry: &CatalogEntry,
        ctx: &ModuleContext<'_>,
        inputs: ModuleInputs<'_>,
        report: &mut AccountReport,
    ) -> Option<ExecutionOutcome> {
        let name = entry.descriptor.name.as_str();

        match dispatch(&entry.descriptor, &entry.handle, ctx, inputs, &self.retry).await {
            Ok(result) => {
                let outcome = ExecutionOutcome::from(result);
                match (&outcome.error, outcome.succeeded) {
                    (_, true) => report.push(name, ModuleStatus::Succeeded, None),
                    (Some(e), false) => {
                        error!(account = inputs.account_index + 1, module = name, error = %e, "Module failed");
                        report.push(name, ModuleStatus::Failed, Some(e.to_string()));
                    }
                    (None, false) => {
                        warn!(account = inputs.account_index + 1, module = name, "Module finished without success");
                        report.push(name, ModuleStatus::Failed, None);
                    }
                }
                Some(outcome)
            }
            Err(e) => {
                error!(account = inputs.account_index + 1, module = name, error = %e, "Module skipped");
                report.push(name, ModuleStatus::Skipped, Some(e.to_string()));
                None
            }
        }
    }
}
