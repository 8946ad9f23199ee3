//! Application layer - use cases and services

pub mod chat_intake;
pub mod commands;
pub mod scheduler;
pub mod services;

pub use commands::{Cli, Commands, CommandExecutor};
pub use scheduler::{PeriodicJob, Scheduler, SchedulerHandle};
pub use services::AgentService;
