use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::directive::{SortDirective, SortOrder};
use crate::normalize::{normalize, record_id, sort_keys};

/// A listing that does not match its expected sorted form.
///
/// `index` is the first position where the listing and the expected order
/// disagree; `expected` and `actual` are the records at that position.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("records are not sorted by '{key}' {order}{}", describe_mismatch(.index, .expected, .actual))]
pub struct OrderingViolation {
    pub index: Option<usize>,
    pub key: String,
    pub order: SortOrder,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
}

impl OrderingViolation {
    /// Diagnostic record attached to a failing check.
    pub fn diagnostic(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn describe_mismatch(index: &Option<usize>, expected: &Option<Value>, actual: &Option<Value>) -> String {
    match index {
        Some(i) => format!(
            ": first mismatch at index {} (expected {}, got {})",
            i,
            expected.as_ref().unwrap_or(&Value::Null),
            actual.as_ref().unwrap_or(&Value::Null)
        ),
        None => String::new(),
    }
}

/// Records of `records` rearranged into the order a conforming service would
/// return for `directive`. Stable: records equal on both keys keep their
/// input order.
pub fn expected_order(records: &[Value], directive: &SortDirective) -> Vec<Value> {
    let keys = sort_keys(
        records
            .iter()
            .map(|r| normalize(r.get(directive.field.as_str())))
            .collect(),
    );
    let ids: Vec<f64> = records.iter().map(record_id).collect();

    let mut positions: Vec<usize> = (0..records.len()).collect();
    positions.sort_by(|&a, &b| {
        directive
            .order
            .apply(keys[a].compare(&keys[b]))
            .then_with(|| ids[a].partial_cmp(&ids[b]).unwrap_or(Ordering::Equal))
    });

    positions.into_iter().map(|i| records[i].clone()).collect()
}

pub fn verify_order(records: &[Value], directive: &SortDirective) -> Result<(), OrderingViolation> {
    let expected = expected_order(records, directive);
    if expected.as_slice() == records {
        debug!(target: "catalog.ordering", key = %directive.field, order = %directive.order, len = records.len(), "order verified");
        return Ok(());
    }

    let index = records
        .iter()
        .zip(expected.iter())
        .position(|(actual, expected)| actual != expected);
    let violation = OrderingViolation {
        index,
        key: directive.field.clone(),
        order: directive.order,
        expected: index.and_then(|i| expected.get(i).cloned()),
        actual: index.and_then(|i| records.get(i).cloned()),
    };
    warn!(target: "catalog.ordering", key = %violation.key, order = %violation.order, index = ?violation.index, "ordering violation");
    Err(violation)
}

/// Fails with [`OrderingViolation`] unless `records` is already sorted by
/// `key` in direction `order`. Never mutates the input.
pub fn assert_sorted_by_key(
    records: &[Value],
    key: &str,
    order: SortOrder,
) -> Result<(), OrderingViolation> {
    verify_order(records, &SortDirective::new(key, order))
}
