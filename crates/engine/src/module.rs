use async_trait::async_trait;
use eclipse_batch_notify::Notifier;
use eclipse_batch_pacing::RetryPolicy;
use eclipse_batch_types::{AccountPair, ModuleDescriptor, ModuleError, ModuleVariant};
use std::sync::Arc;
use thiserror::Error;

use crate::proxy::ProxyLookup;
use crate::record::ResultRecorder;
use crate::RunContext;

/// Collaborators every module receives for one account
pub struct ModuleContext<'a> {
    pub run: &'a RunContext,
    pub account: &'a AccountPair,
    pub rpc_url: &'a str,
    pub scan_url: &'a str,
    pub notifier: &'a Notifier,
    pub recorder: &'a dyn ResultRecorder,
}

impl ModuleContext<'_> {
    /// Queue key for the account's reports
    pub fn wallet(&self) -> &str {
        self.account.wallet_key()
    }
}

/// Module that routes through the proxy assigned to the account's position
#[async_trait]
pub trait IndexedModule: Send + Sync {
    async fn execute(
        &self,
        ctx: &ModuleContext<'_>,
        proxies: &dyn ProxyLookup,
        account_index: usize,
        retry: &RetryPolicy,
    ) -> Result<bool, ModuleError>;
}

/// Module that needs a word list to generate names or descriptions
#[async_trait]
pub trait LexicalModule: Send + Sync {
    async fn execute(
        &self,
        ctx: &ModuleContext<'_>,
        client: &reqwest::Client,
        words: &[String],
        retry: &RetryPolicy,
    ) -> Result<bool, ModuleError>;
}

/// Module that only needs an HTTP client and the RPC endpoint
#[async_trait]
pub trait PlainModule: Send + Sync {
    async fn execute(
        &self,
        ctx: &ModuleContext<'_>,
        client: &reqwest::Client,
        retry: &RetryPolicy,
    ) -> Result<bool, ModuleError>;
}

/// A module instance tagged with its calling convention
#[derive(Clone)]
pub enum ModuleHandle {
    Indexed(Arc<dyn IndexedModule>),
    Lexical(Arc<dyn LexicalModule>),
    Plain(Arc<dyn PlainModule>),
}

impl ModuleHandle {
    pub fn variant(&self) -> ModuleVariant {
        match self {
            ModuleHandle::Indexed(_) => ModuleVariant::Indexed,
            ModuleHandle::Lexical(_) => ModuleVariant::Lexical,
            ModuleHandle::Plain(_) => ModuleVariant::Plain,
        }
    }
}

impl std::fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ModuleHandle::{}", self.variant())
    }
}

/// Variant-specific inputs available for one account
#[derive(Clone, Copy)]
pub struct ModuleInputs<'a> {
    pub proxies: &'a dyn ProxyLookup,
    pub account_index: usize,
    pub client: &'a reqwest::Client,
    pub words: &'a [String],
}

#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("module {module} is declared {declared} but implements {actual}")]
    VariantMismatch {
        module: String,
        declared: ModuleVariant,
        actual: ModuleVariant,
    },
}

/// Invoke a module with the inputs of its declared variant.
///
/// The handle must implement the variant the descriptor declares; a mismatch
/// is reported without calling the module.
pub async fn dispatch(
    descriptor: &ModuleDescriptor,
    handle: &ModuleHandle,
    ctx: &ModuleContext<'_>,
    inputs: ModuleInputs<'_>,
    retry: &RetryPolicy,
) -> Result<Result<bool, ModuleError>, DispatchError> {
    if handle.variant() != descriptor.variant {
        return Err(DispatchError::VariantMismatch {
            module: descriptor.name.clone(),
            declared: descriptor.variant,
            actual: handle.variant(),
        });
    }

    let result = match handle {
        ModuleHandle::Indexed(module) => {
            module
                .execute(ctx, inputs.proxies, inputs.account_index, retry)
                .await
        }
        ModuleHandle::Lexical(module) => {
            module
                .execute(ctx, inputs.client, inputs.words, retry)
                .await
        }
        ModuleHandle::Plain(module) => module.execute(ctx, inputs.client, retry).await,
    };

    Ok(result)
}
