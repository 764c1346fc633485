//! Change-reason engine.
//!
//! Compares two parsed orders with the rule table in [`rules`] and reports
//! the clinically meaningful differences, ignoring wording-only changes.

pub mod rules;


use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DiffConfig;
use crate::lexicon::Lexicon;
use crate::models::{ChangeLabel, ParsedOrder};
use crate::parser::parse_order;

pub use rules::{Comparator, Rule, RULES};

/// Read-only inputs shared by every rule.
#[derive(Debug, Clone, Copy)]
pub struct DiffContext<'a> {
    pub lexicon: &'a Lexicon,
    pub config: &'a DiffConfig,
}

/// Triggered labels in report order, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeReport {
    pub labels: Vec<ChangeLabel>,
}

impl ChangeReport {
    pub fn is_unchanged(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: ChangeLabel) -> bool {
        self.labels.contains(&label)
    }
}

impl fmt::Display for ChangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return f.write_str("Unchanged");
        }
        let labels: Vec<&str> = self.labels.iter().map(ChangeLabel::as_str).collect();
        f.write_str(&labels.join(", "))
    }
}

/// Evaluates [`RULES`] against pairs of orders.
#[derive(Debug, Clone)]
pub struct ChangeReasoner<'a> {
    lexicon: &'a Lexicon,
    config: DiffConfig,
}

impl<'a> ChangeReasoner<'a> {
    pub fn new(lexicon: &'a Lexicon, config: DiffConfig) -> Self {
        Self { lexicon, config }
    }

    pub fn report(&self, before: &ParsedOrder, after: &ParsedOrder) -> ChangeReport {
        let ctx = DiffContext {
            lexicon: self.lexicon,
            config: &self.config,
        };

        let fired: Vec<&Rule> = RULES
            .iter()
            .filter(|rule| (rule.changed)(before, after, &ctx))
            .collect();
        let raised: BTreeSet<ChangeLabel> = fired.iter().map(|rule| rule.label).collect();
        let labels: BTreeSet<ChangeLabel> = fired
            .iter()
            .filter(|rule| !rule.suppressed_by.iter().any(|s| raised.contains(s)))
            .map(|rule| rule.label)
            .collect();

        let report = ChangeReport {
            labels: labels.into_iter().collect(),
        };
        tracing::debug!(
            changes = report.labels.len(),
            suppressed = fired.len().saturating_sub(report.labels.len()),
            "Orders compared"
        );
        report
    }

    pub fn reason(&self, before: &ParsedOrder, after: &ParsedOrder) -> String {
        self.report(before, after).to_string()
    }
}

impl Default for ChangeReasoner<'static> {
    fn default() -> Self {
        Self::new(Lexicon::global(), DiffConfig::default())
    }
}

/// Change reason between two orders with the built-in lexicon and default
/// configuration: `"Unchanged"` or labels joined with `", "`.
pub fn get_change_reason(before: &ParsedOrder, after: &ParsedOrder) -> String {
    ChangeReasoner::default().reason(before, after)
}

/// Parse both order strings and compare them.
pub fn diff_orders(before: &str, after: &str) -> ChangeReport {
    ChangeReasoner::default().report(&parse_order(before), &parse_order(after))
}
