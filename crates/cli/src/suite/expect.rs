use catalog_client::{ApiResponse, ClientError};
use catalog_ordering::OrderingViolation;
use serde_json::Value;
use thiserror::Error;

pub type CheckResult = Result<(), CheckFailure>;

#[derive(Debug, Error)]
pub enum CheckFailure {
    #[error("expected status {expected}, got {actual}: {body}")]
    Status {
        expected: u16,
        actual: u16,
        body: Value,
    },

    #[error("expected {what} to be {expected}, got {actual}")]
    Count {
        what: String,
        expected: u64,
        actual: u64,
    },

    #[error("missing field '{field}' in {context}")]
    MissingField { field: String, context: String },

    #[error("{0}")]
    Assertion(String),

    #[error(transparent)]
    Ordering(#[from] OrderingViolation),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl CheckFailure {
    /// A missing cached token means cases ran out of order; retrying cannot
    /// fix that.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CheckFailure::Client(e) if e.is_missing_credential())
    }

    pub fn diagnostic(&self) -> Option<Value> {
        match self {
            CheckFailure::Ordering(v) => Some(v.diagnostic()),
            _ => None,
        }
    }
}

pub fn expect_status(resp: &ApiResponse, expected: u16) -> CheckResult {
    if resp.status == expected {
        return Ok(());
    }
    Err(CheckFailure::Status {
        expected,
        actual: resp.status,
        body: truncate_body(&resp.body),
    })
}

pub fn expect_count(what: &str, expected: u64, actual: u64) -> CheckResult {
    if expected == actual {
        return Ok(());
    }
    Err(CheckFailure::Count {
        what: what.to_string(),
        expected,
        actual,
    })
}

pub fn expect_that(condition: bool, message: impl FnOnce() -> String) -> CheckResult {
    if condition {
        Ok(())
    } else {
        Err(CheckFailure::Assertion(message()))
    }
}

pub fn field<'a>(record: &'a Value, name: &str, context: &str) -> Result<&'a Value, CheckFailure> {
    record
        .get(name)
        .filter(|v| !v.is_null())
        .ok_or_else(|| CheckFailure::MissingField {
            field: name.to_string(),
            context: context.to_string(),
        })
}

pub fn str_field<'a>(record: &'a Value, name: &str, context: &str) -> Result<&'a str, CheckFailure> {
    field(record, name, context)?.as_str().ok_or_else(|| {
        CheckFailure::Assertion(format!("field '{name}' in {context} is not a string"))
    })
}

pub fn u64_field(record: &Value, name: &str, context: &str) -> Result<u64, CheckFailure> {
    field(record, name, context)?.as_u64().ok_or_else(|| {
        CheckFailure::Assertion(format!("field '{name}' in {context} is not an unsigned integer"))
    })
}

pub fn expect_fields(record: &Value, names: &[&str], context: &str) -> CheckResult {
    for name in names {
        field(record, name, context)?;
    }
    Ok(())
}

fn truncate_body(body: &Value) -> Value {
    const MAX: usize = 512;
    let text = body.to_string();
    if text.len() <= MAX {
        return body.clone();
    }
    let mut cut = MAX;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    Value::String(format!("{}...", &text[..cut]))
}
