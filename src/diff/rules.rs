//! Declarative change rules.
//!
//! One row per label, in report order. A row fires when its comparator says
//! the field changed, unless one of the labels in `suppressed_by` also fired
//! for the same pair.

use std::collections::BTreeSet;

use crate::config::IndicationPolicy;
use crate::equivalence::{
    formulations_equivalent_with, frequencies_equivalent_with, normalize_administration_with,
    normalize_frequency_with, normalize_indication_text_with, normalize_time_of_day_with,
    same_drug_core_with, salt_changes_formulation_with, tod_changed_with,
};
use crate::lexicon::phrase_key;
use crate::models::{ChangeLabel, Dose, ParsedOrder};

use super::DiffContext;

pub type Comparator = fn(&ParsedOrder, &ParsedOrder, &DiffContext<'_>) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub label: ChangeLabel,
    pub changed: Comparator,
    pub suppressed_by: &'static [ChangeLabel],
}

pub const RULES: &[Rule] = &[
    Rule { label: ChangeLabel::Dose, changed: dose_changed, suppressed_by: &[] },
    Rule { label: ChangeLabel::Quantity, changed: quantity_changed, suppressed_by: &[] },
    Rule { label: ChangeLabel::Frequency, changed: frequency_changed, suppressed_by: &[] },
    Rule { label: ChangeLabel::TimeOfDay, changed: time_of_day_changed, suppressed_by: &[] },
    Rule { label: ChangeLabel::Route, changed: route_changed, suppressed_by: &[] },
    Rule { label: ChangeLabel::Form, changed: form_changed, suppressed_by: &[] },
    Rule {
        label: ChangeLabel::Formulation,
        changed: formulation_changed,
        suppressed_by: &[ChangeLabel::Form],
    },
    Rule { label: ChangeLabel::BrandGeneric, changed: brand_changed, suppressed_by: &[] },
    Rule { label: ChangeLabel::Indication, changed: indication_changed, suppressed_by: &[] },
    Rule {
        label: ChangeLabel::Administration,
        changed: administration_changed,
        suppressed_by: &[],
    },
    Rule { label: ChangeLabel::Refills, changed: refills_changed, suppressed_by: &[] },
    Rule { label: ChangeLabel::Prn, changed: prn_flag_changed, suppressed_by: &[] },
    Rule {
        label: ChangeLabel::Prn,
        changed: prn_condition_changed,
        suppressed_by: &[ChangeLabel::Indication],
    },
];

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

fn dose_values_differ(a: &Dose, b: &Dose, tolerance: f64) -> bool {
    let (Some(va), Some(vb)) = (&a.value, &b.value) else {
        return a.value.is_some() != b.value.is_some();
    };
    if va.as_single().is_some() != vb.as_single().is_some() {
        return true;
    }
    let (xs, ys) = (va.values(), vb.values());
    xs.len() != ys.len() || xs.iter().zip(ys).any(|(x, y)| !close(*x, *y, tolerance))
}

pub fn dose_changed(a: &ParsedOrder, b: &ParsedOrder, ctx: &DiffContext<'_>) -> bool {
    let tolerance = ctx.config.dose_tolerance;
    if a.dose.is_empty() && b.dose.is_empty() {
        return false;
    }
    if dose_values_differ(&a.dose, &b.dose, tolerance) {
        return true;
    }
    if !a.dose.unit.is_empty() && !b.dose.unit.is_empty() && a.dose.unit != b.dose.unit {
        return true;
    }
    match (a.dose.total, b.dose.total) {
        (Some(x), Some(y)) => !close(x, y, tolerance),
        _ => false,
    }
}

/// Quantity compared as written; an order with no count gives one unit.
pub fn quantity_changed(a: &ParsedOrder, b: &ParsedOrder, _ctx: &DiffContext<'_>) -> bool {
    !close(a.qty.unwrap_or(1.0), b.qty.unwrap_or(1.0), 1e-9)
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

pub fn frequency_changed(a: &ParsedOrder, b: &ParsedOrder, ctx: &DiffContext<'_>) -> bool {
    !frequencies_equivalent_with(ctx.lexicon, &a.frequency, &b.frequency)
}

fn is_once_daily(order: &ParsedOrder, ctx: &DiffContext<'_>) -> bool {
    let code = normalize_frequency_with(ctx.lexicon, &order.frequency);
    code.is_empty() || code == "daily"
}

/// Time-of-day slot used for comparison against `other`. A once-daily
/// order with no slot is read as a morning dose when the other side names
/// one.
fn effective_time_of_day(order: &ParsedOrder, other: &ParsedOrder, ctx: &DiffContext<'_>) -> String {
    let slot = normalize_time_of_day_with(ctx.lexicon, &order.time_of_day);
    let other_slot = normalize_time_of_day_with(ctx.lexicon, &other.time_of_day);
    if slot.is_empty()
        && !other_slot.is_empty()
        && ctx.config.implied_morning_for_daily
        && is_once_daily(order, ctx)
    {
        return "morning".into();
    }
    slot
}

pub fn time_of_day_changed(a: &ParsedOrder, b: &ParsedOrder, ctx: &DiffContext<'_>) -> bool {
    let tod_a = effective_time_of_day(a, b, ctx);
    let tod_b = effective_time_of_day(b, a, ctx);
    tod_changed_with(ctx.lexicon, &tod_a, &tod_b)
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

fn both_set_and_differ(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && a != b
}

pub fn route_changed(a: &ParsedOrder, b: &ParsedOrder, _ctx: &DiffContext<'_>) -> bool {
    both_set_and_differ(&a.route, &b.route)
}

pub fn form_changed(a: &ParsedOrder, b: &ParsedOrder, _ctx: &DiffContext<'_>) -> bool {
    both_set_and_differ(&a.form, &b.form)
}

pub fn formulation_changed(a: &ParsedOrder, b: &ParsedOrder, ctx: &DiffContext<'_>) -> bool {
    !formulations_equivalent_with(ctx.lexicon, &a.formulation, &b.formulation)
        || salt_changes_formulation_with(ctx.lexicon, &a.drug, &a.salt, &b.drug, &b.salt)
}

/// Same active ingredient, but one side names a brand the other does not.
pub fn brand_changed(a: &ParsedOrder, b: &ParsedOrder, ctx: &DiffContext<'_>) -> bool {
    if !same_drug_core_with(ctx.lexicon, &a.drug, &b.drug) {
        return false;
    }
    let brands = |order: &ParsedOrder| -> BTreeSet<String> {
        order.brand_tokens.iter().map(|t| phrase_key(t)).collect()
    };
    brands(a) != brands(b)
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

pub fn indication_changed(a: &ParsedOrder, b: &ParsedOrder, ctx: &DiffContext<'_>) -> bool {
    let ia = normalize_indication_text_with(ctx.lexicon, &a.indication);
    let ib = normalize_indication_text_with(ctx.lexicon, &b.indication);
    match ctx.config.indication_policy {
        IndicationPolicy::BothPresent => both_set_and_differ(&ia, &ib),
        IndicationPolicy::AnyDifference => ia != ib,
    }
}

pub fn administration_changed(a: &ParsedOrder, b: &ParsedOrder, ctx: &DiffContext<'_>) -> bool {
    normalize_administration_with(ctx.lexicon, &a.administration)
        != normalize_administration_with(ctx.lexicon, &b.administration)
}

pub fn refills_changed(a: &ParsedOrder, b: &ParsedOrder, _ctx: &DiffContext<'_>) -> bool {
    matches!((a.refills, b.refills), (Some(x), Some(y)) if x != y)
}

pub fn prn_flag_changed(a: &ParsedOrder, b: &ParsedOrder, _ctx: &DiffContext<'_>) -> bool {
    a.prn != b.prn
}

/// Both orders are as-needed, for different stated conditions.
pub fn prn_condition_changed(a: &ParsedOrder, b: &ParsedOrder, ctx: &DiffContext<'_>) -> bool {
    if !(a.prn && b.prn) {
        return false;
    }
    let ca = normalize_indication_text_with(ctx.lexicon, &a.prn_condition);
    let cb = normalize_indication_text_with(ctx.lexicon, &b.prn_condition);
    both_set_and_differ(&ca, &cb)
}
