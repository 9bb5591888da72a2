use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to store record: {0}")]
    Storage(String),
}

/// One successful on-chain operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub wallet: String,
    pub module: String,
    pub amount: Decimal,
    pub token: String,
    pub tx_hash: String,
    pub recorded_at: DateTime<Utc>,
}

impl ModuleRecord {
    pub fn new(
        wallet: impl Into<String>,
        module: impl Into<String>,
        amount: Decimal,
        token: impl Into<String>,
        tx_hash: impl Into<String>,
    ) -> Self {
        Self {
            wallet: wallet.into(),
            module: module.into(),
            amount,
            token: token.into(),
            tx_hash: tx_hash.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Sink for module results
#[async_trait]
pub trait ResultRecorder: Send + Sync {
    async fn record(&self, record: ModuleRecord) -> Result<(), RecordError>;
}

/// Records kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    records: RwLock<Vec<ModuleRecord>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<ModuleRecord> {
        self.records.read().await.clone()
    }

    pub async fn count_for_wallet(&self, wallet: &str) -> usize {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.wallet == wallet)
            .count()
    }

    pub async fn count_for_module(&self, wallet: &str, module: &str) -> usize {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.wallet == wallet && r.module == module)
            .count()
    }
}

#[async_trait]
impl ResultRecorder for InMemoryResultStore {
    async fn record(&self, record: ModuleRecord) -> Result<(), RecordError> {
        self.records.write().await.push(record);
        Ok(())
    }
}
