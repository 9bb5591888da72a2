use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use thiserror::Error;

/// Signing material for one chain account
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Vec<u8>);

impl Credential {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// An address on one chain, optionally with the key that controls it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainAccount {
    pub address: String,
    credential: Option<Credential>,
}

impl ChainAccount {
    pub fn watch_only(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            credential: None,
        }
    }

    pub fn with_credential(address: impl Into<String>, credential: Credential) -> Self {
        Self {
            address: address.into(),
            credential: Some(credential),
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn can_sign(&self) -> bool {
        self.credential.is_some()
    }
}

/// One actor's identity on the EVM side and on Eclipse, paired by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPair {
    pub evm: ChainAccount,
    pub eclipse: ChainAccount,
}

impl AccountPair {
    pub fn new(evm: ChainAccount, eclipse: ChainAccount) -> Self {
        Self { evm, eclipse }
    }

    /// Key under which notifications and results for this actor are grouped
    pub fn wallet_key(&self) -> &str {
        &self.eclipse.address
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("number of evm accounts ({evm}) does not match the number of eclipse accounts ({eclipse})")]
    CountMismatch { evm: usize, eclipse: usize },
}

/// Read-only pool of account pairs shared by every worker of a run
#[derive(Debug, Clone, Default)]
pub struct AccountPool {
    pairs: Vec<AccountPair>,
}

impl AccountPool {
    /// Pair two per-chain lists by index. Both lists must have the same length.
    pub fn from_lists(
        evm: Vec<ChainAccount>,
        eclipse: Vec<ChainAccount>,
    ) -> Result<Self, AccountError> {
        if evm.len() != eclipse.len() {
            return Err(AccountError::CountMismatch {
                evm: evm.len(),
                eclipse: eclipse.len(),
            });
        }

        let pairs = evm
            .into_iter()
            .zip(eclipse)
            .map(|(evm, eclipse)| AccountPair::new(evm, eclipse))
            .collect();

        Ok(Self { pairs })
    }

    pub fn from_pairs(pairs: Vec<AccountPair>) -> Self {
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AccountPair> {
        self.pairs.get(index)
    }

    pub fn pairs(&self) -> &[AccountPair] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountPair> {
        self.pairs.iter()
    }

    /// Shuffle whole pairs, so both chains are permuted identically
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pairs.shuffle(rng);
    }
}
