//! Check suite for the product catalog API.
//!
//! [`suite`] holds the declarative check cases and the sequential runner;
//! [`config`] loads `catalog.toml` and environment overrides.

pub mod config;
pub mod suite;

pub use config::{ConfigError, SuiteConfig};
pub use suite::{
    run_suite, CaseOutcome, CaseStatus, CheckCase, CheckFailure, RunMode, RunnerOptions, Suite,
    SuiteContext, SuiteReport,
};
