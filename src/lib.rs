pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod k8s;
pub mod stack;

pub use error::{Result, StackError};
pub use stackls_common::{OrchestratorKind, StackEntry, StackRecord};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
