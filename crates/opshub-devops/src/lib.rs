//! Azure DevOps client for opshub.
//!
//! One shared [`DevOpsClient`] implements the three work-tracking provider
//! traits from `opshub-core`: work items, repositories, and test plans.
//! The leaf modules hold the pure pieces the services compose: resource
//! path composition ([`url`]), patch documents ([`patch`]), tag set
//! operations ([`tags`]), and Gherkin step / parameter formatting
//! ([`steps`]).

pub mod client;
pub mod patch;
pub mod steps;
pub mod tags;
pub mod url;

mod repos;
mod testplans;
mod workitems;

pub use client::DevOpsClient;
pub use url::ApiVersions;
