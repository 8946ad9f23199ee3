//! Domain layer - core business logic and entities

pub mod discovery;
pub mod execution;
pub mod notification;
pub mod price;
pub mod settings;
