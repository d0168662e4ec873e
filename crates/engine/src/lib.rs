//! `engine` crate: runs Posty5 nodes over item lists the way the host
//! workflow runtime does (operation pinning, fan-out, continue-on-failure).

pub mod error;
pub mod executor;
pub mod models;

pub use error::EngineError;
pub use executor::{builtin_registry, ExecutorConfig, NodeExecutor, NodeRegistry};
pub use models::{ExecutionResult, OutputItem};

#[cfg(test)]
mod executor_tests;
