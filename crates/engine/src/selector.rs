use eclipse_batch_config::{ModuleMode, ModulesConfig};
use eclipse_batch_types::{CountRange, KnownModule};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::ModuleCatalog;

/// Decides which modules run for one account, and in which order
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSelector {
    mode: ModuleMode,
    sequence: Vec<String>,
    count: CountRange,
}

impl ModuleSelector {
    pub fn new(mode: ModuleMode, sequence: Vec<String>, count: CountRange) -> Self {
        Self {
            mode,
            sequence,
            count,
        }
    }

    /// Sequence entries naming a known module are normalized to its catalog name
    pub fn from_config(config: &ModulesConfig) -> Self {
        let sequence = config
            .sequence
            .iter()
            .map(|name| match KnownModule::from_name(name) {
                Some(module) => module.name().to_string(),
                None => name.clone(),
            })
            .collect();

        Self::new(config.mode, sequence, config.modules_count)
    }

    pub fn sequence(sequence: Vec<String>) -> Self {
        Self::new(ModuleMode::Sequence, sequence, CountRange::new(0, 0))
    }

    pub fn random(count: CountRange) -> Self {
        Self::new(ModuleMode::Random, Vec::new(), count)
    }

    pub fn single_asset() -> Self {
        Self::new(ModuleMode::SingleAsset, Vec::new(), CountRange::new(1, 1))
    }

    pub fn mode(&self) -> ModuleMode {
        self.mode
    }

    /// Module names for one account.
    ///
    /// Sequence mode returns the configured list verbatim. Random mode draws
    /// `k` from the count range and samples `k` names with replacement from the
    /// catalog, leaving out the bridge. Single-asset mode picks one swap module.
    pub fn select<R: Rng + ?Sized>(&self, catalog: &ModuleCatalog, rng: &mut R) -> Vec<String> {
        match self.mode {
            ModuleMode::Sequence => self.sequence.clone(),
            ModuleMode::Random => {
                let pool = catalog.sampling_pool();
                if pool.is_empty() {
                    return Vec::new();
                }

                let count = self.count.sample(rng);
                (0..count)
                    .filter_map(|_| pool.choose(rng).map(|name| name.to_string()))
                    .collect()
            }
            ModuleMode::SingleAsset => KnownModule::SWAPS
                .choose(rng)
                .map(|module| vec![module.name().to_string()])
                .unwrap_or_default(),
        }
    }
}
