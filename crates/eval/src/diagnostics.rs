//! Accumulator for missing-data diagnostics and field reads.
//!
//! Threaded through one evaluation; entries keep first-seen order so the
//! reported order is the traversal order of the logic tree.

use crate::types::MissingElement;

/// Collector that tracks missing required members and the fields read
/// while walking a decision function.
#[derive(Debug, Clone)]
pub struct DiagnosticCollector {
    pub missing: Vec<MissingElement>,
    pub fields_read: Vec<String>,
}

impl Default for DiagnosticCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        DiagnosticCollector {
            missing: Vec::new(),
            fields_read: Vec::new(),
        }
    }

    /// Record a missing required member.
    pub fn record_missing(&mut self, element: MissingElement) {
        if !self.missing.contains(&element) {
            self.missing.push(element);
        }
    }

    /// Record a present field read.
    pub fn record_read(&mut self, path: &str) {
        if !self.fields_read.iter().any(|p| p == path) {
            self.fields_read.push(path.to_string());
        }
    }

    pub fn has_missing(&self) -> bool {
        !self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequirementKind;

    fn element(member: &str) -> MissingElement {
        MissingElement {
            target: "the customer request".to_string(),
            target_type: "demo.config.CustomerRequest".to_string(),
            member: member.to_string(),
            member_type: "Boolean".to_string(),
            kind: RequirementKind::Has,
        }
    }

    #[test]
    fn collector_keeps_first_seen_order() {
        let mut c = DiagnosticCollector::new();
        c.record_missing(element("b"));
        c.record_missing(element("a"));
        assert_eq!(c.missing, vec![element("b"), element("a")]);
        assert!(c.has_missing());
    }

    #[test]
    fn collector_deduplicates_missing() {
        let mut c = DiagnosticCollector::new();
        c.record_missing(element("a"));
        c.record_missing(element("a"));
        assert_eq!(c.missing.len(), 1);
    }

    #[test]
    fn collector_deduplicates_reads() {
        let mut c = DiagnosticCollector::new();
        c.record_read("the configuration.cluster");
        c.record_read("the configuration.cluster");
        c.record_read("the configuration.cluster.scaling");
        assert_eq!(
            c.fields_read,
            vec!["the configuration.cluster", "the configuration.cluster.scaling"]
        );
        assert!(!c.has_missing());
    }
}
