use std::time::Instant;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::report::{CaseOutcome, CaseStatus, SuiteReport};
use super::{matches_filter, Suite, SuiteContext};

/// `run` is the unattended mode and retries flaky cases; `open` is the
/// interactive mode and reports the first failure as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Run,
    Open,
}

impl RunMode {
    pub fn default_retries(&self) -> u32 {
        match self {
            RunMode::Run => 2,
            RunMode::Open => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Run => "run",
            RunMode::Open => "open",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    pub mode: RunMode,
    pub retries: u32,
    pub filter: Option<String>,
}

/// Resolve the retry count.
/// - retries: from param → env(CATALOG_RETRIES) → config file → mode default (run: 2, open: 0)
pub fn resolve_retries(param: Option<u32>, file: Option<u32>, mode: RunMode) -> (u32, &'static str) {
    resolve_retries_with(param, file, mode, |name| std::env::var(name).ok())
}

pub fn resolve_retries_with<F>(
    param: Option<u32>,
    file: Option<u32>,
    mode: RunMode,
    env: F,
) -> (u32, &'static str)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(p) = param {
        (p, "param")
    } else if let Some(e) = env("CATALOG_RETRIES").and_then(|v| v.trim().parse::<u32>().ok()) {
        (e, "env")
    } else if let Some(f) = file {
        (f, "config")
    } else {
        (mode.default_retries(), "default")
    }
}

/// Runs the matching cases one after another, retrying each failed case up
/// to `options.retries` times. A missing cached token is never retried.
pub async fn run_suite(suite: &Suite, ctx: &mut SuiteContext, options: &RunnerOptions) -> SuiteReport {
    let mut report = SuiteReport::new(ctx.client.base_url().as_str(), options.mode, options.retries);

    for case in suite.cases() {
        if !matches_filter(case, options.filter.as_deref()) {
            report.push(CaseOutcome::skipped(case));
            continue;
        }

        let start = Instant::now();
        let mut attempts = 0u32;
        let outcome = loop {
            attempts += 1;
            match case.run(ctx).await {
                Ok(()) => {
                    info!(target: "catalog.suite", group = case.group(), case = case.name(), attempts, "passed");
                    break CaseOutcome::passed(case, attempts, start.elapsed());
                }
                Err(failure) if failure.is_retryable() && attempts <= options.retries => {
                    warn!(target: "catalog.suite", group = case.group(), case = case.name(), attempt = attempts, error = %failure, "retrying");
                }
                Err(failure) => {
                    warn!(target: "catalog.suite", group = case.group(), case = case.name(), attempts, error = %failure, "failed");
                    break CaseOutcome::failed(case, attempts, start.elapsed(), &failure);
                }
            }
        };
        report.push(outcome);
    }

    report
}
