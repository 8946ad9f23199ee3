//! Execution domain - on-demand swap pipeline

mod swap_executor;

pub use swap_executor::{decode_transaction, encode_transaction, SwapExecutor, SwapOutcome};
