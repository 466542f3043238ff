//! Declarative check cases and the sequential runner.
//!
//! Every case is registered in [`Suite::standard`]; registration order is
//! execution order, so auth cases that read cached tokens come after login.

mod auth;
mod expect;
mod products;
mod report;
mod runner;

use async_trait::async_trait;
use catalog_client::{ApiResponse, CatalogClient, Credentials, RequestDescriptor, Session};
use futures_util::future::BoxFuture;

use crate::config::Expectations;

pub use expect::{CheckFailure, CheckResult};
pub use report::{CaseOutcome, CaseStatus, SuiteReport};
pub use runner::{resolve_retries, resolve_retries_with, run_suite, RunMode, RunnerOptions};

/// State shared by the cases of one run.
pub struct SuiteContext {
    pub client: CatalogClient,
    pub session: Session,
    pub credentials: Credentials,
    pub expectations: Expectations,
}

impl SuiteContext {
    pub fn new(client: CatalogClient, credentials: Credentials, expectations: Expectations) -> Self {
        Self {
            client,
            session: Session::new(),
            credentials,
            expectations,
        }
    }

    pub async fn call(&self, req: &RequestDescriptor) -> Result<ApiResponse, CheckFailure> {
        Ok(self.client.execute(req).await?)
    }
}

#[async_trait]
pub trait CheckCase: Send + Sync {
    fn name(&self) -> &str;
    fn group(&self) -> &str;
    fn description(&self) -> &str;
    async fn run(&self, ctx: &mut SuiteContext) -> CheckResult;
}

pub type CaseFn = for<'a> fn(&'a mut SuiteContext) -> BoxFuture<'a, CheckResult>;

/// A check backed by a plain function.
pub struct Case {
    name: &'static str,
    group: &'static str,
    description: &'static str,
    body: CaseFn,
}

impl Case {
    pub const fn new(
        group: &'static str,
        name: &'static str,
        description: &'static str,
        body: CaseFn,
    ) -> Self {
        Self {
            name,
            group,
            description,
            body,
        }
    }
}

#[async_trait]
impl CheckCase for Case {
    fn name(&self) -> &str {
        self.name
    }

    fn group(&self) -> &str {
        self.group
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn run(&self, ctx: &mut SuiteContext) -> CheckResult {
        (self.body)(ctx).await
    }
}

pub struct Suite {
    cases: Vec<Box<dyn CheckCase>>,
}

impl Suite {
    pub fn empty() -> Self {
        Self { cases: Vec::new() }
    }

    pub fn standard() -> Self {
        let mut suite = Self::empty();
        for case in products::cases().into_iter().chain(auth::cases()) {
            suite.register(Box::new(case));
        }
        suite
    }

    pub fn register(&mut self, case: Box<dyn CheckCase>) {
        self.cases.push(case);
    }

    pub fn cases(&self) -> impl Iterator<Item = &dyn CheckCase> {
        self.cases.iter().map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Case-insensitive substring match on `group.name`.
pub(crate) fn matches_filter(case: &dyn CheckCase, filter: Option<&str>) -> bool {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        None => true,
        Some(f) => format!("{}.{}", case.group(), case.name())
            .to_lowercase()
            .contains(&f.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn standard_suite_names_are_unique() {
        let suite = Suite::standard();
        let names: HashSet<String> = suite
            .cases()
            .map(|c| format!("{}.{}", c.group(), c.name()))
            .collect();
        assert_eq!(names.len(), suite.len());
        assert!(suite.len() >= 20);
    }

    #[test]
    fn login_runs_before_token_readers() {
        let suite = Suite::standard();
        let order: Vec<&str> = suite.cases().map(|c| c.name()).collect();
        let login = order.iter().position(|n| *n == "login").unwrap();
        let me = order.iter().position(|n| *n == "current_user").unwrap();
        let refresh = order.iter().position(|n| *n == "refresh_rotates_tokens").unwrap();
        assert!(login < me && me < refresh);
    }

    #[test]
    fn filter_matches_group_or_name() {
        let suite = Suite::standard();
        let auth: Vec<_> = suite
            .cases()
            .filter(|c| matches_filter(*c, Some("AUTH.")))
            .collect();
        assert!(!auth.is_empty());
        assert!(auth.iter().all(|c| c.group() == "auth"));
        assert!(suite.cases().all(|c| matches_filter(c, None)));
        assert!(suite.cases().all(|c| matches_filter(c, Some("  "))));
    }
}
