//! Application Insights telemetry client for opshub.
//!
//! [`InsightsClient`] implements the `TelemetryProvider` trait from
//! `opshub-core`: free-form queries, application metadata, metrics,
//! events, and the table shortcuts compiled by [`query`].

pub mod client;
pub mod query;

pub use client::InsightsClient;
pub use query::TelemetryTable;
