pub mod account;
pub mod error;
pub mod execution;
pub mod module;
pub mod range;

pub use account::*;
pub use error::*;
pub use execution::*;
pub use module::*;
pub use range::*;

/// Explorer prefix for Eclipse transaction signatures
pub const ECLIPSE_SCAN_URL: &str = "https://eclipsescan.xyz/tx/";
