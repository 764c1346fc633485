//! Application constants and tunables for parsing and diffing.
//!
//! Parsing and diffing are pure functions; everything that changes their
//! behavior is carried explicitly in [`ParserConfig`] and [`DiffConfig`]
//! rather than read from global state.

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "medrecon";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming an optional lexicon overlay (JSON).
pub const LEXICON_ENV: &str = "MEDRECON_LEXICON";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medrecon_lib=info,medrecon=info"
}

// ═══════════════════════════════════════════════════════════
// Parser
// ═══════════════════════════════════════════════════════════

/// Knobs for the order parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Downgrade `tid` to `bid` when the order literally says
    /// "twice a day with meals" or "bid with meals".
    pub meal_tid_downgrade: bool,
    /// Decimal places kept on normalized dose values and totals.
    pub dose_precision: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            meal_tid_downgrade: true,
            dose_precision: 3,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Differ
// ═══════════════════════════════════════════════════════════

/// When two indications count as a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicationPolicy {
    /// Only when both orders state an indication and they differ.
    BothPresent,
    /// Any difference, including one side being blank.
    AnyDifference,
}

/// Knobs for the change-reason engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub indication_policy: IndicationPolicy,
    /// Read a blank time-of-day on a once-daily order as the morning slot.
    pub implied_morning_for_daily: bool,
    /// Absolute tolerance when comparing normalized dose values (mg).
    pub dose_tolerance: f64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            indication_policy: IndicationPolicy::BothPresent,
            implied_morning_for_daily: true,
            dose_tolerance: 0.0005,
        }
    }
}
