//! Account batch execution engine
//!
//! Wires the module catalog, the per-account module selector and the pacing
//! policy into a `BatchExecutor` that walks the account pool with one task per
//! worker partition.

pub mod catalog;
pub mod context;
pub mod executor;
pub mod module;
pub mod proxy;
pub mod record;
pub mod report;
pub mod selector;

pub use catalog::{CatalogEntry, CatalogError, ModuleCatalog, ModuleFactory};
pub use context::RunContext;
pub use executor::{BatchExecutor, BatchExecutorBuilder, BuilderError, ExecutorError, SeedStrategy};
pub use module::{
    dispatch, DispatchError, IndexedModule, LexicalModule, ModuleContext, ModuleHandle,
    ModuleInputs, PlainModule,
};
pub use proxy::{ProxyError, ProxyLookup, ProxyManager};
pub use record::{InMemoryResultStore, ModuleRecord, RecordError, ResultRecorder};
pub use report::{AccountReport, ModuleRun, ModuleStatus, RunReport};
pub use selector::ModuleSelector;
