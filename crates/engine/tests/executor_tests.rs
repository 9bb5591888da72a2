//! Batch executor scenarios with stub modules

use async_trait::async_trait;
use eclipse_batch_engine::{
    BatchExecutor, ExecutorError, IndexedModule, LexicalModule, ModuleCatalog, ModuleContext,
    ModuleHandle, ModuleSelector, PlainModule, ProxyError, ProxyLookup, ProxyManager, SeedStrategy,
};
use eclipse_batch_notify::{MemorySink, Notifier};
use eclipse_batch_pacing::{DelayPolicy, RetryPolicy};
use eclipse_batch_types::{
    AccountPair, AccountPool, ChainAccount, DelayRange, KnownModule, ModuleDescriptor, ModuleError,
    ModuleVariant,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn pool(n: usize) -> AccountPool {
    AccountPool::from_pairs(
        (0..n)
            .map(|i| {
                AccountPair::new(
                    ChainAccount::watch_only(format!("0xevm{i}")),
                    ChainAccount::watch_only(format!("eclipse{i}")),
                )
            })
            .collect(),
    )
}

/// Always succeeds and reports one success line for the wallet
struct SuccessfulOrca;

#[async_trait]
impl IndexedModule for SuccessfulOrca {
    async fn execute(
        &self,
        ctx: &ModuleContext<'_>,
        _: &dyn ProxyLookup,
        _: usize,
        _: &RetryPolicy,
    ) -> Result<bool, ModuleError> {
        ctx.notifier.add_success(ctx.wallet(), "Orca swap").await;
        Ok(true)
    }
}

/// Counts visits per wallet
#[derive(Default)]
struct VisitCounter {
    visits: Mutex<HashMap<String, u32>>,
}

#[async_trait]
impl PlainModule for VisitCounter {
    async fn execute(
        &self,
        ctx: &ModuleContext<'_>,
        _: &reqwest::Client,
        _: &RetryPolicy,
    ) -> Result<bool, ModuleError> {
        *self
            .visits
            .lock()
            .unwrap()
            .entry(ctx.wallet().to_string())
            .or_default() += 1;
        Ok(true)
    }
}

/// Runs a failing operation through the retry budget it was handed
#[derive(Default)]
struct AlwaysFailing {
    attempts: AtomicU32,
}

#[async_trait]
impl PlainModule for AlwaysFailing {
    async fn execute(
        &self,
        _: &ModuleContext<'_>,
        _: &reqwest::Client,
        retry: &RetryPolicy,
    ) -> Result<bool, ModuleError> {
        let mut rng = StdRng::seed_from_u64(0);
        retry
            .run("Solar", &mut rng, |_| {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<bool, _>(ModuleError::Quote("no route".into())) }
            })
            .await
    }
}

/// Word-list module that succeeds when it received words
struct WordCounter;

#[async_trait]
impl LexicalModule for WordCounter {
    async fn execute(
        &self,
        _: &ModuleContext<'_>,
        _: &reqwest::Client,
        words: &[String],
        _: &RetryPolicy,
    ) -> Result<bool, ModuleError> {
        Ok(!words.is_empty())
    }
}

/// Proxy lookup that cannot serve any account
struct BrokenProxies;

impl ProxyLookup for BrokenProxies {
    fn client(&self, account_index: usize) -> Result<reqwest::Client, ProxyError> {
        Err(ProxyError::NoClient(account_index))
    }

    fn proxy_url(&self, _: usize) -> Option<String> {
        None
    }
}

fn catalog_with(name: KnownModule, handle: ModuleHandle) -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    catalog.insert(name.descriptor(), handle).unwrap();
    catalog
}

#[tokio::test]
async fn test_sequential_run_reports_every_wallet_in_order() {
    let sink = Arc::new(MemorySink::new());
    let executor = BatchExecutor::builder()
        .with_pool(pool(4))
        .with_catalog(catalog_with(
            KnownModule::Orca,
            ModuleHandle::Indexed(Arc::new(SuccessfulOrca)),
        ))
        .with_selector(ModuleSelector::sequence(vec!["Orca".into()]))
        .with_notifier(Arc::new(Notifier::new(sink.clone())))
        .with_proxies(Arc::new(ProxyManager::direct()))
        .with_retry(RetryPolicy::immediate(3).unwrap())
        .build()
        .unwrap();

    let report = executor.run().await.unwrap();
    assert_eq!(report.succeeded(), 4);
    assert_eq!(report.failed(), 0);

    let sent = sink.sent().await;
    let wallets: Vec<&str> = sent.iter().map(|(w, _)| w.as_str()).collect();
    assert_eq!(wallets, vec!["eclipse0", "eclipse1", "eclipse2", "eclipse3"]);

    for (i, (_, message)) in sent.iter().enumerate() {
        assert!(message.text.starts_with(&format!("[{}/4]\nEVM: 0xevm{i}\nECLIPSE: eclipse{i}", i + 1)));
        assert_eq!(message.text.matches("✅ Orca swap").count(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn test_every_account_visited_once_across_workers() {
    let counter = Arc::new(VisitCounter::default());
    let executor = BatchExecutor::builder()
        .with_pool(pool(10))
        .with_catalog(catalog_with(KnownModule::Solar, ModuleHandle::Plain(counter.clone())))
        .with_selector(ModuleSelector::sequence(vec!["Solar".into()]))
        .with_notifier(Arc::new(Notifier::new(Arc::new(MemorySink::new()))))
        .with_proxies(Arc::new(ProxyManager::direct()))
        .with_retry(RetryPolicy::immediate(1).unwrap())
        .with_workers(3)
        .build()
        .unwrap();

    let sizes: Vec<usize> = executor.partitions().iter().map(|p| p.len()).collect();
    assert_eq!(sizes, vec![3, 3, 4]);

    let report = executor.run().await.unwrap();
    assert_eq!(report.accounts.len(), 10);

    let visits = counter.visits.lock().unwrap();
    assert_eq!(visits.len(), 10);
    assert!(visits.values().all(|&count| count == 1));

    let indices: Vec<usize> = report.accounts.iter().map(|a| a.index).collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_retry_exhaustion_marks_module_failed() {
    let module = Arc::new(AlwaysFailing::default());
    let sink = Arc::new(MemorySink::new());
    let executor = BatchExecutor::builder()
        .with_pool(pool(1))
        .with_catalog(catalog_with(KnownModule::Solar, ModuleHandle::Plain(module.clone())))
        .with_selector(ModuleSelector::sequence(vec!["Solar".into()]))
        .with_notifier(Arc::new(Notifier::new(sink.clone())))
        .with_proxies(Arc::new(ProxyManager::direct()))
        .with_retry(RetryPolicy::immediate(3).unwrap())
        .build()
        .unwrap();

    let report = executor.run().await.unwrap();

    assert_eq!(module.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(report.failed(), 1);
    assert!(report.accounts[0].modules[0]
        .error
        .as_deref()
        .unwrap()
        .contains("all 3 attempts failed"));

    let sent = sink.sent().await;
    assert!(sent[0].1.text.contains("❌ Account ended with errors"));
}

#[tokio::test]
async fn test_proxy_failure_is_returned() {
    let executor = BatchExecutor::builder()
        .with_pool(pool(2))
        .with_catalog(catalog_with(
            KnownModule::Orca,
            ModuleHandle::Indexed(Arc::new(SuccessfulOrca)),
        ))
        .with_selector(ModuleSelector::sequence(vec!["Orca".into()]))
        .with_notifier(Arc::new(Notifier::new(Arc::new(MemorySink::new()))))
        .with_proxies(Arc::new(BrokenProxies))
        .with_retry(RetryPolicy::immediate(1).unwrap())
        .build()
        .unwrap();

    let result = executor.run().await;
    assert!(matches!(result, Err(ExecutorError::Proxy { worker: 0, .. })));
}

#[tokio::test]
async fn test_variant_mismatch_is_skipped_not_fatal() {
    let sink = Arc::new(MemorySink::new());
    let mut catalog = ModuleCatalog::new();
    catalog
        .insert(
            ModuleDescriptor::new("Underdog", ModuleVariant::Lexical),
            ModuleHandle::Plain(Arc::new(VisitCounter::default())),
        )
        .unwrap();

    let executor = BatchExecutor::builder()
        .with_pool(pool(2))
        .with_catalog(catalog)
        .with_selector(ModuleSelector::sequence(vec!["Underdog".into()]))
        .with_notifier(Arc::new(Notifier::new(sink.clone())))
        .with_proxies(Arc::new(ProxyManager::direct()))
        .with_retry(RetryPolicy::immediate(1).unwrap())
        .build()
        .unwrap();

    let report = executor.run().await.unwrap();
    assert_eq!(report.skipped(), 2);
    assert_eq!(report.succeeded(), 0);
    assert_eq!(report.accounts_with_errors(), 2);

    let sent = sink.sent().await;
    assert_eq!(sent.len(), 2);
    for (_, message) in &sent {
        assert!(message
            .text
            .contains("❌ Account ended with errors (0 failed, 1 skipped)"));
    }
}

#[tokio::test]
async fn test_lexical_module_receives_words() {
    let executor = BatchExecutor::builder()
        .with_pool(pool(1))
        .with_catalog(catalog_with(KnownModule::Underdog, ModuleHandle::Lexical(Arc::new(WordCounter))))
        .with_selector(ModuleSelector::sequence(vec!["Underdog".into()]))
        .with_notifier(Arc::new(Notifier::new(Arc::new(MemorySink::new()))))
        .with_proxies(Arc::new(ProxyManager::direct()))
        .with_retry(RetryPolicy::immediate(1).unwrap())
        .with_words(vec!["aurora".into(), "comet".into()])
        .build()
        .unwrap();

    let report = executor.run().await.unwrap();
    assert_eq!(report.succeeded(), 1);
}

#[tokio::test]
async fn test_bridge_pre_step_runs_before_selection() {
    let bridge = Arc::new(VisitCounter::default());
    let mut catalog = catalog_with(KnownModule::Relay, ModuleHandle::Plain(bridge.clone()));
    catalog
        .insert(KnownModule::Orca.descriptor(), ModuleHandle::Indexed(Arc::new(SuccessfulOrca)))
        .unwrap();

    let executor = BatchExecutor::builder()
        .with_pool(pool(3))
        .with_catalog(catalog)
        .with_selector(ModuleSelector::random(eclipse_batch_types::CountRange::new(2, 2)))
        .with_bridge_pre_step(true)
        .with_seed(SeedStrategy::Fixed(1))
        .with_notifier(Arc::new(Notifier::new(Arc::new(MemorySink::new()))))
        .with_proxies(Arc::new(ProxyManager::direct()))
        .with_retry(RetryPolicy::immediate(1).unwrap())
        .build()
        .unwrap();

    let report = executor.run().await.unwrap();

    assert_eq!(bridge.visits.lock().unwrap().values().sum::<u32>(), 3);
    for account in &report.accounts {
        let names: Vec<&str> = account.modules.iter().map(|m| m.module.as_str()).collect();
        assert_eq!(names, vec!["Relay", "Orca", "Orca"]);
    }
}

#[tokio::test(start_paused = true)]
async fn test_last_account_skips_inter_account_delay() {
    let delays = DelayPolicy::new(DelayRange::new(1.0, 1.0), DelayRange::new(1.0, 1.0));

    let executor = BatchExecutor::builder()
        .with_pool(pool(2))
        .with_catalog(catalog_with(
            KnownModule::Orca,
            ModuleHandle::Indexed(Arc::new(SuccessfulOrca)),
        ))
        .with_selector(ModuleSelector::sequence(vec!["Orca".into()]))
        .with_delays(delays)
        .with_notifier(Arc::new(Notifier::new(Arc::new(MemorySink::new()))))
        .with_proxies(Arc::new(ProxyManager::direct()))
        .with_retry(RetryPolicy::immediate(1).unwrap())
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    executor.run().await.unwrap();

    // Each account: last-module delay of 1 second. Between the two accounts: 1 minute.
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(62));
    assert!(elapsed < Duration::from_secs(63));
}
