use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dose amount: one number, or one number per ingredient for
/// combination products ("20-12.5 mg").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DoseValue {
    Single(f64),
    Multiple(Vec<f64>),
}

impl DoseValue {
    pub fn as_single(&self) -> Option<f64> {
        match self {
            Self::Single(v) => Some(*v),
            Self::Multiple(_) => None,
        }
    }

    pub fn values(&self) -> &[f64] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Multiple(vs) => vs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dose {
    pub value: Option<DoseValue>,
    /// Normalized unit (`mg`, `mg/kg`, `mEq`, `unit`, `mL`, `tablet`, ...).
    pub unit: String,
    /// `value × qty` for scalar doses, otherwise the value itself.
    pub total: Option<f64>,
}

impl Dose {
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn scalar(&self) -> Option<f64> {
        self.value.as_ref().and_then(DoseValue::as_single)
    }
}

/// Structured view of one free-text medication order.
///
/// String fields are lowercase and empty when the order does not mention them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedOrder {
    /// Drug residue with whitespace and punctuation removed.
    pub drug: String,
    /// Drug phrase as written.
    pub raw_drug: String,
    /// Salt word from the drug phrase (`besylate`, `sodium`, ...).
    pub salt: String,
    pub dose: Dose,
    pub qty: Option<f64>,
    /// Standard unit of the quantity word (`tablet`, `puff`, ...).
    pub qty_unit: String,
    pub route: String,
    pub frequency: String,
    pub frequency_tokens: Vec<String>,
    pub time_of_day: String,
    pub time_of_day_original: String,
    pub administration: String,
    pub prn: bool,
    pub prn_condition: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub form: String,
    pub formulation: String,
    pub indication: String,
    pub brand_tokens: Vec<String>,
    /// Unit seen before mcg/g folding; `mg` once folded.
    pub raw_unit: String,
    pub taper_flag: Option<String>,
    pub refills: Option<u32>,
    pub trough_note: Option<String>,
    pub original_raw: String,
}

impl ParsedOrder {
    pub fn new(original_raw: &str) -> Self {
        Self {
            original_raw: original_raw.to_string(),
            ..Self::default()
        }
    }

    /// Record a brand token once, ignoring case.
    pub fn push_brand_token(&mut self, token: &str) {
        let token = token.to_lowercase();
        if !self.brand_tokens.iter().any(|t| *t == token) {
            self.brand_tokens.push(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_tokens_dedupe_case_insensitively() {
        let mut order = ParsedOrder::new("Lasix 20 mg (LASIX)");
        order.push_brand_token("Lasix");
        order.push_brand_token("LASIX");
        assert_eq!(order.brand_tokens, vec!["lasix"]);
    }

    #[test]
    fn dose_value_serializes_untagged() {
        let single = serde_json::to_string(&DoseValue::Single(20.0)).unwrap();
        let multi = serde_json::to_string(&DoseValue::Multiple(vec![20.0, 12.5])).unwrap();
        assert_eq!(single, "20.0");
        assert_eq!(multi, "[20.0,12.5]");
    }

    #[test]
    fn order_uses_camel_case_keys() {
        let order = ParsedOrder::new("Metformin 500 mg");
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("originalRaw").is_some());
        assert!(json.get("frequencyTokens").is_some());
        assert!(json.get("brandTokens").is_some());
    }

    #[test]
    fn scalar_ignores_combinations() {
        let dose = Dose {
            value: Some(DoseValue::Multiple(vec![20.0, 12.5])),
            unit: "mg".into(),
            total: None,
        };
        assert_eq!(dose.scalar(), None);
        assert_eq!(dose.value.unwrap().values(), &[20.0, 12.5]);
    }
}
