//! Structural comparison of evaluation outcomes against expected patterns.
//!
//! Both entry points return `None` on an exact match and a non-empty
//! [`Diff`] otherwise. The catalog is only consulted to render type names
//! in diff messages.

use std::collections::BTreeSet;
use std::fmt;

use crate::types::values::{json_decimal, DISCRIMINATOR};
use crate::types::{value_to_json, Catalog, MissingElement, Outcome, OutcomeKind};

/// The item a diff entry is about.
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    Element(MissingElement),
    Field {
        path: String,
        value: serde_json::Value,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiffEntry {
    KindMismatch {
        expected: OutcomeKind,
        actual: OutcomeKind,
    },
    ExpectedButAbsent(Mismatch),
    PresentButUnexpected(Mismatch),
    ValueMismatch {
        path: String,
        expected: serde_json::Value,
        actual: serde_json::Value,
    },
    InvalidPattern(String),
}

/// A non-empty list of mismatches with rendered messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    pub entries: Vec<DiffEntry>,
    pub messages: Vec<String>,
}

impl Diff {
    fn from_entries(entries: Vec<DiffEntry>, catalog: &Catalog) -> Option<Diff> {
        if entries.is_empty() {
            return None;
        }
        let messages = entries.iter().map(|e| describe(e, catalog)).collect();
        Some(Diff { entries, messages })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.messages.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", m)?;
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Missing-data comparison
// ──────────────────────────────────────────────

/// Compare an outcome against an expected `MissingData` pattern.
///
/// The pattern is the wire shape `{"type":"MissingData","elements":[...]}`
/// or just the elements array. Both sides are compared as sets.
pub fn has_missing_info(
    outcome: &Outcome,
    expected: &serde_json::Value,
    catalog: &Catalog,
) -> Option<Diff> {
    let expected_elements = match parse_missing_pattern(expected) {
        Ok(elements) => elements,
        Err(message) => return Diff::from_entries(vec![DiffEntry::InvalidPattern(message)], catalog),
    };

    let actual = match outcome {
        Outcome::MissingData(elements) => elements,
        other => {
            return Diff::from_entries(
                vec![DiffEntry::KindMismatch {
                    expected: OutcomeKind::MissingData,
                    actual: other.kind(),
                }],
                catalog,
            )
        }
    };

    let expected_set: BTreeSet<&MissingElement> = expected_elements.iter().collect();
    let actual_set: BTreeSet<&MissingElement> = actual.iter().collect();

    let mut entries = Vec::new();
    let mut reported = BTreeSet::new();
    for e in &expected_elements {
        if !actual_set.contains(e) && reported.insert(e) {
            entries.push(DiffEntry::ExpectedButAbsent(Mismatch::Element(e.clone())));
        }
    }
    for a in actual {
        if !expected_set.contains(a) {
            entries.push(DiffEntry::PresentButUnexpected(Mismatch::Element(a.clone())));
        }
    }
    Diff::from_entries(entries, catalog)
}

fn parse_missing_pattern(expected: &serde_json::Value) -> Result<Vec<MissingElement>, String> {
    let elements = match expected {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(obj) => {
            if let Some(t) = obj.get("type") {
                if t != "MissingData" {
                    return Err(format!("expected pattern type 'MissingData', got {}", t));
                }
            }
            obj.get("elements")
                .and_then(|e| e.as_array())
                .ok_or_else(|| "missing-data pattern needs an 'elements' array".to_string())?
        }
        other => {
            return Err(format!(
                "missing-data pattern must be an object or array, got {}",
                other
            ))
        }
    };
    elements
        .iter()
        .map(|e| {
            serde_json::from_value::<MissingElement>(e.clone())
                .map_err(|err| format!("invalid missing-data element {}: {}", e, err))
        })
        .collect()
}

// ──────────────────────────────────────────────
// Known-value comparison
// ──────────────────────────────────────────────

/// Compare an outcome against an expected `Completed` value pattern.
///
/// `{}` matches any value at any depth. The pattern may also be wrapped as
/// `{"type":"Completed","value":...}`.
pub fn has_known_value(
    outcome: &Outcome,
    expected: &serde_json::Value,
    catalog: &Catalog,
) -> Option<Diff> {
    let actual = match outcome {
        Outcome::Completed(done) => value_to_json(&done.value),
        other => {
            return Diff::from_entries(
                vec![DiffEntry::KindMismatch {
                    expected: OutcomeKind::Completed,
                    actual: other.kind(),
                }],
                catalog,
            )
        }
    };

    let mut entries = Vec::new();
    if let Some(pattern) = unwrap_completed_pattern(expected) {
        compare_json("value", pattern, &actual, &mut entries);
    }
    Diff::from_entries(entries, catalog)
}

/// Strip a `{"type":"Completed",...}` wrapper. `None` means the wrapper
/// has no `value` and accepts any completed value.
fn unwrap_completed_pattern(expected: &serde_json::Value) -> Option<&serde_json::Value> {
    if let Some(obj) = expected.as_object() {
        let wrapper_keys = obj
            .keys()
            .all(|k| k == "type" || k == "value" || k == "resultType");
        if obj.get("type").and_then(|t| t.as_str()) == Some("Completed") && wrapper_keys {
            return obj.get("value");
        }
    }
    Some(expected)
}

fn is_wildcard(v: &serde_json::Value) -> bool {
    v.as_object().is_some_and(|o| o.is_empty())
}

fn compare_json(
    path: &str,
    expected: &serde_json::Value,
    actual: &serde_json::Value,
    entries: &mut Vec<DiffEntry>,
) {
    if is_wildcard(expected) {
        return;
    }
    match (expected, actual) {
        (serde_json::Value::Object(e), serde_json::Value::Object(a)) => {
            for (key, ev) in e {
                let child = format!("{}.{}", path, key);
                match a.get(key) {
                    Some(av) => compare_json(&child, ev, av, entries),
                    None => entries.push(DiffEntry::ExpectedButAbsent(Mismatch::Field {
                        path: child,
                        value: ev.clone(),
                    })),
                }
            }
            for (key, av) in a {
                if key != DISCRIMINATOR && !e.contains_key(key) {
                    entries.push(DiffEntry::PresentButUnexpected(Mismatch::Field {
                        path: format!("{}.{}", path, key),
                        value: av.clone(),
                    }));
                }
            }
        }
        (serde_json::Value::Array(e), serde_json::Value::Array(a)) => {
            for (i, ev) in e.iter().enumerate() {
                let child = format!("{}.{}", path, i);
                match a.get(i) {
                    Some(av) => compare_json(&child, ev, av, entries),
                    None => entries.push(DiffEntry::ExpectedButAbsent(Mismatch::Field {
                        path: child,
                        value: ev.clone(),
                    })),
                }
            }
            for (i, av) in a.iter().enumerate().skip(e.len()) {
                entries.push(DiffEntry::PresentButUnexpected(Mismatch::Field {
                    path: format!("{}.{}", path, i),
                    value: av.clone(),
                }));
            }
        }
        _ => {
            if !scalars_equal(expected, actual) {
                entries.push(DiffEntry::ValueMismatch {
                    path: path.to_string(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
        }
    }
}

/// Decimals compare numerically so `1.50`, `"1.5"` and `1.5` agree.
fn scalars_equal(expected: &serde_json::Value, actual: &serde_json::Value) -> bool {
    if expected == actual {
        return true;
    }
    let numeric = expected.is_number() || actual.is_number();
    match (json_decimal(expected), json_decimal(actual)) {
        (Some(e), Some(a)) if numeric || (expected.is_string() && actual.is_string()) => e == a,
        _ => false,
    }
}

// ──────────────────────────────────────────────
// Messages
// ──────────────────────────────────────────────

fn describe(entry: &DiffEntry, catalog: &Catalog) -> String {
    match entry {
        DiffEntry::KindMismatch { expected, actual } => {
            format!("expected a {} outcome, got {}", expected, actual)
        }
        DiffEntry::ExpectedButAbsent(m) => format!("expected {}, but it is absent", mismatch(m, catalog)),
        DiffEntry::PresentButUnexpected(m) => {
            format!("unexpected {}", mismatch(m, catalog))
        }
        DiffEntry::ValueMismatch {
            path,
            expected,
            actual,
        } => format!(
            "'{}': expected {}, got {}",
            path,
            render(expected, catalog),
            render(actual, catalog)
        ),
        DiffEntry::InvalidPattern(message) => format!("invalid pattern: {}", message),
    }
}

fn mismatch(m: &Mismatch, catalog: &Catalog) -> String {
    match m {
        Mismatch::Element(e) => format!(
            "missing {} '{}' ({}) of {} ({})",
            e.kind,
            e.member,
            catalog.display_name(&e.member_type),
            e.target,
            catalog.display_name(&e.target_type)
        ),
        Mismatch::Field { path, value } => {
            format!("field '{}' = {}", path, render(value, catalog))
        }
    }
}

/// Render a value, naming tagged composites by their display name.
fn render(value: &serde_json::Value, catalog: &Catalog) -> String {
    match value.get(DISCRIMINATOR).and_then(|t| t.as_str()) {
        Some(tag) => format!("{} {}", catalog.display_name(tag), value),
        None => value.to_string(),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
