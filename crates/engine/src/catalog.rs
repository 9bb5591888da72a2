use eclipse_batch_config::EnabledModules;
use eclipse_batch_types::{KnownModule, ModuleDescriptor};
use thiserror::Error;
use tracing::debug;

use crate::module::ModuleHandle;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("failed to construct module {module}: {reason}")]
    Construction { module: String, reason: String },

    #[error("module {0} is already registered")]
    Duplicate(String),
}

/// Builds concrete module instances for descriptors
pub trait ModuleFactory: Send + Sync {
    fn create(&self, descriptor: &ModuleDescriptor) -> Result<ModuleHandle, CatalogError>;
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub descriptor: ModuleDescriptor,
    pub handle: ModuleHandle,
}

/// Enabled modules in registration order, looked up by name
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    entries: Vec<CatalogEntry>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per enabled module, in `KnownModule::ALL` order.
    ///
    /// Any constructor failure aborts the whole build.
    pub fn build(enabled: &EnabledModules, factory: &dyn ModuleFactory) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();

        for module in enabled.iter() {
            let descriptor = module.descriptor();
            let handle = factory.create(&descriptor)?;
            debug!(module = %descriptor.name, variant = %descriptor.variant, "Registered module");
            catalog.insert(descriptor, handle)?;
        }

        Ok(catalog)
    }

    pub fn insert(&mut self, descriptor: ModuleDescriptor, handle: ModuleHandle) -> Result<(), CatalogError> {
        if self.contains(&descriptor.name) {
            return Err(CatalogError::Duplicate(descriptor.name));
        }

        self.entries.push(CatalogEntry { descriptor, handle });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.descriptor.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.descriptor.name.as_str())
    }

    /// Names eligible for random sampling; the bridge runs as a separate pre-step
    pub fn sampling_pool(&self) -> Vec<&str> {
        self.names()
            .filter(|name| *name != KnownModule::BRIDGE.name())
            .collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::module::{IndexedModule, LexicalModule, ModuleContext, PlainModule};
    use crate::ProxyLookup;
    use async_trait::async_trait;
    use eclipse_batch_pacing::RetryPolicy;
    use eclipse_batch_types::{ModuleError, ModuleVariant};
    use std::sync::Arc;

    pub(crate) struct Noop;

    #[async_trait]
    impl IndexedModule for Noop {
        async fn execute(
            &self,
            _: &ModuleContext<'_>,
            _: &dyn ProxyLookup,
            _: usize,
            _: &RetryPolicy,
        ) -> Result<bool, ModuleError> {
            Ok(true)
        }
    }

    #[async_trait]
    impl LexicalModule for Noop {
        async fn execute(
            &self,
            _: &ModuleContext<'_>,
            _: &reqwest::Client,
            _: &[String],
            _: &RetryPolicy,
        ) -> Result<bool, ModuleError> {
            Ok(true)
        }
    }

    #[async_trait]
    impl PlainModule for Noop {
        async fn execute(
            &self,
            _: &ModuleContext<'_>,
            _: &reqwest::Client,
            _: &RetryPolicy,
        ) -> Result<bool, ModuleError> {
            Ok(true)
        }
    }

    /// Builds a no-op handle of the declared variant
    pub(crate) struct NoopFactory;

    impl ModuleFactory for NoopFactory {
        fn create(&self, descriptor: &ModuleDescriptor) -> Result<ModuleHandle, CatalogError> {
            Ok(match descriptor.variant {
                ModuleVariant::Indexed => ModuleHandle::Indexed(Arc::new(Noop)),
                ModuleVariant::Lexical => ModuleHandle::Lexical(Arc::new(Noop)),
                ModuleVariant::Plain => ModuleHandle::Plain(Arc::new(Noop)),
            })
        }
    }

    struct BrokenFactory;

    impl ModuleFactory for BrokenFactory {
        fn create(&self, descriptor: &ModuleDescriptor) -> Result<ModuleHandle, CatalogError> {
            if descriptor.name == "Underdog" {
                return Err(CatalogError::Construction {
                    module: descriptor.name.clone(),
                    reason: "word list missing".into(),
                });
            }
            NoopFactory.create(descriptor)
        }
    }

    pub(crate) fn catalog_of(modules: &[KnownModule]) -> ModuleCatalog {
        ModuleCatalog::build(&EnabledModules::only(modules), &NoopFactory).unwrap()
    }

    #[test]
    fn test_build_keeps_registry_order_and_variants() {
        let catalog = catalog_of(&[KnownModule::Solar, KnownModule::Underdog, KnownModule::Orca]);

        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["Orca", "Underdog", "Solar"]);

        assert_eq!(catalog.get("Orca").unwrap().handle.variant(), ModuleVariant::Indexed);
        assert_eq!(catalog.get("Underdog").unwrap().descriptor.variant, ModuleVariant::Lexical);
        assert_eq!(catalog.get("Solar").unwrap().handle.variant(), ModuleVariant::Plain);
    }

    #[test]
    fn test_build_is_deterministic() {
        let modules = [KnownModule::Relay, KnownModule::Lifinity, KnownModule::GasStation];
        let first: Vec<String> = catalog_of(&modules).names().map(String::from).collect();
        let second: Vec<String> = catalog_of(&modules).names().map(String::from).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_constructor_failure_aborts_build() {
        let enabled = EnabledModules::only(&[KnownModule::Orca, KnownModule::Underdog]);
        let result = ModuleCatalog::build(&enabled, &BrokenFactory);
        assert!(matches!(result, Err(CatalogError::Construction { .. })));
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut catalog = catalog_of(&[KnownModule::Orca]);
        let result = catalog.insert(
            KnownModule::Orca.descriptor(),
            ModuleHandle::Indexed(Arc::new(Noop)),
        );
        assert_eq!(result, Err(CatalogError::Duplicate("Orca".into())));
    }

    #[test]
    fn test_sampling_pool_excludes_bridge() {
        let catalog = catalog_of(&[KnownModule::Relay, KnownModule::Orca]);
        assert_eq!(catalog.sampling_pool(), vec!["Orca"]);
    }
}
