use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::expect::CheckFailure;
use super::runner::RunMode;
use super::CheckCase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub group: String,
    pub name: String,
    pub status: CaseStatus,
    pub attempts: u32,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Value>,
}

impl CaseOutcome {
    fn base(case: &dyn CheckCase, status: CaseStatus, attempts: u32, elapsed: Duration) -> Self {
        Self {
            group: case.group().to_string(),
            name: case.name().to_string(),
            status,
            attempts,
            elapsed_ms: elapsed.as_millis() as u64,
            error: None,
            diagnostic: None,
        }
    }

    pub fn passed(case: &dyn CheckCase, attempts: u32, elapsed: Duration) -> Self {
        Self::base(case, CaseStatus::Passed, attempts, elapsed)
    }

    pub fn failed(case: &dyn CheckCase, attempts: u32, elapsed: Duration, failure: &CheckFailure) -> Self {
        Self {
            error: Some(failure.to_string()),
            diagnostic: failure.diagnostic(),
            ..Self::base(case, CaseStatus::Failed, attempts, elapsed)
        }
    }

    pub fn skipped(case: &dyn CheckCase) -> Self {
        Self::base(case, CaseStatus::Skipped, 0, Duration::ZERO)
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.group, self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub base_url: String,
    pub mode: RunMode,
    pub retries: u32,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cases: Vec<CaseOutcome>,
}

impl SuiteReport {
    pub fn new(base_url: &str, mode: RunMode, retries: u32) -> Self {
        Self {
            base_url: base_url.to_string(),
            mode,
            retries,
            passed: 0,
            failed: 0,
            skipped: 0,
            cases: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: CaseOutcome) {
        match outcome.status {
            CaseStatus::Passed => self.passed += 1,
            CaseStatus::Failed => self.failed += 1,
            CaseStatus::Skipped => self.skipped += 1,
        }
        self.cases.push(outcome);
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn outcome(&self, full_name: &str) -> Option<&CaseOutcome> {
        self.cases.iter().find(|c| c.full_name() == full_name)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "catalog checks against {} (mode {}, retries {})",
            self.base_url,
            self.mode.as_str(),
            self.retries
        );
        for case in self.cases.iter().filter(|c| c.status != CaseStatus::Skipped) {
            let mark = match case.status {
                CaseStatus::Passed => "ok  ",
                _ => "FAIL",
            };
            let _ = write!(out, "  {} {} ({} ms", mark, case.full_name(), case.elapsed_ms);
            if case.attempts > 1 {
                let _ = write!(out, ", {} attempts", case.attempts);
            }
            let _ = writeln!(out, ")");
            if let Some(error) = &case.error {
                let _ = writeln!(out, "       {}", error);
            }
        }
        let _ = writeln!(
            out,
            "{} passed, {} failed, {} skipped",
            self.passed, self.failed, self.skipped
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, status: CaseStatus) -> CaseOutcome {
        CaseOutcome {
            group: "products".into(),
            name: name.into(),
            status,
            attempts: 1,
            elapsed_ms: 3,
            error: (status == CaseStatus::Failed).then(|| "expected status 200, got 500".to_string()),
            diagnostic: None,
        }
    }

    #[test]
    fn counts_and_rendering() {
        let mut report = SuiteReport::new("http://x", RunMode::Run, 2);
        report.push(outcome("a", CaseStatus::Passed));
        report.push(outcome("b", CaseStatus::Failed));
        report.push(outcome("c", CaseStatus::Skipped));
        assert_eq!((report.passed, report.failed, report.skipped), (1, 1, 1));
        assert!(!report.is_success());

        let text = report.render_text();
        assert!(text.contains("ok   products.a"));
        assert!(text.contains("FAIL products.b"));
        assert!(!text.contains("products.c"));
        assert!(text.contains("1 passed, 1 failed, 1 skipped"));
    }

    #[test]
    fn json_shape_omits_empty_error() {
        let mut report = SuiteReport::new("http://x", RunMode::Open, 0);
        report.push(outcome("a", CaseStatus::Passed));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "open");
        assert_eq!(json["cases"][0]["status"], "passed");
        assert!(json["cases"][0].get("error").is_none());
    }
}
