//! Core traits, types, configuration, and error handling for opshub.
//!
//! This crate provides the foundational abstractions used across all opshub
//! components: the error taxonomy, the TOML configuration layer, the wire
//! types shared by both remotes, and the provider traits the front-ends
//! (MCP and HTTP) call through.

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use provider::{
    RepositoryProvider, Services, TelemetryProvider, TestPlanProvider, WorkItemProvider,
};
