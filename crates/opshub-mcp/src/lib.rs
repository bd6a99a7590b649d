//! MCP (Model Context Protocol) server for opshub.
//!
//! Exposes the work-tracking and telemetry services as MCP tools over
//! newline-delimited JSON-RPC on stdio, so AI assistants can drive them.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use server::McpServer;
