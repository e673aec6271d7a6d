pub mod cascade;
pub mod scanner;
mod text_fallback;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use cascade::Cascade;
pub use scanner::{ScanOutcome, Scanner};
pub use types::{CascadeSettings, DecodeAttempt, Decoded, Environment, StrategyId};
