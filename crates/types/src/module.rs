use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Calling convention a module needs from the executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleVariant {
    /// Needs the proxy lookup and the account's pool index
    Indexed,
    /// Needs the auxiliary word list
    Lexical,
    /// Needs only an HTTP client and the chain RPC
    Plain,
}

impl fmt::Display for ModuleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleVariant::Indexed => "indexed",
            ModuleVariant::Lexical => "lexical",
            ModuleVariant::Plain => "plain",
        };
        f.write_str(name)
    }
}

/// Identifies one automatable operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub variant: ModuleVariant,
    pub enabled: bool,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, variant: ModuleVariant) -> Self {
        Self {
            name: name.into(),
            variant,
            enabled: true,
        }
    }
}

/// The modules this runner knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownModule {
    Orca,
    Underdog,
    Invariant,
    Relay,
    Lifinity,
    Solar,
    GasStation,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown module: {0}")]
pub struct UnknownModule(pub String);

impl KnownModule {
    /// Catalog insertion order
    pub const ALL: [KnownModule; 7] = [
        KnownModule::Orca,
        KnownModule::Underdog,
        KnownModule::Invariant,
        KnownModule::Relay,
        KnownModule::Lifinity,
        KnownModule::Solar,
        KnownModule::GasStation,
    ];

    /// Bridge run as a pre-step, never sampled in random mode
    pub const BRIDGE: KnownModule = KnownModule::Relay;

    /// Candidates for single-asset mode
    pub const SWAPS: [KnownModule; 4] = [
        KnownModule::Orca,
        KnownModule::Solar,
        KnownModule::Invariant,
        KnownModule::Lifinity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KnownModule::Orca => "Orca",
            KnownModule::Underdog => "Underdog",
            KnownModule::Invariant => "Invariant",
            KnownModule::Relay => "Relay",
            KnownModule::Lifinity => "Lifinity",
            KnownModule::Solar => "Solar",
            KnownModule::GasStation => "Gas Station",
        }
    }

    pub fn variant(self) -> ModuleVariant {
        match self {
            KnownModule::Orca => ModuleVariant::Indexed,
            KnownModule::Underdog => ModuleVariant::Lexical,
            _ => ModuleVariant::Plain,
        }
    }

    /// Case-insensitive lookup by display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|module| module.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn descriptor(self) -> ModuleDescriptor {
        ModuleDescriptor::new(self.name(), self.variant())
    }
}

impl fmt::Display for KnownModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KnownModule {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownModule(s.to_string()))
    }
}
