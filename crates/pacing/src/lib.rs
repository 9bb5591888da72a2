//! Pacing for the batch runner
//!
//! - `DelayPolicy`: picks the delay range and unit after a module or an account
//! - `DelayPlan`: a chosen range that can be sampled and slept on
//! - `RetryPolicy`: the bounded attempt loop modules run their operations in

pub mod delay;
pub mod retry;

pub use delay::{DelayPlan, DelayPolicy, DelayStage, DelayUnit, DelayVariant};
pub use retry::{RetryError, RetryPolicy};
