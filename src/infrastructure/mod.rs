//! Infrastructure layer - adapters for HTTP endpoints, the chain, chat and storage

pub mod blockchain;
pub mod jupiter;
pub mod messaging;
pub mod storage;
