use thiserror::Error;

/// Failure reported by a module after its own attempt loop
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModuleError {
    #[error("quote failed: {0}")]
    Quote(String),

    #[error("insufficient {token} balance: needed {needed}, available {available}")]
    InsufficientBalance {
        token: String,
        needed: String,
        available: String,
    },

    #[error("transaction not confirmed: {0}")]
    Confirmation(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("run cancelled")]
    Cancelled,

    #[error("{module}: all {attempts} attempts failed, last error: {last}")]
    AttemptsExhausted {
        module: String,
        attempts: u32,
        last: String,
    },

    #[error("{0}")]
    Other(String),
}
