//! Table-driven canonicalization of administration, indication and
//! formulation text.

use crate::lexicon::{phrase_key, Lexicon, PhraseTable};
use crate::parser::indication::clean_indication;

/// Replace every phrase the table knows with its canonical value.
fn fold_phrases(table: &PhraseTable, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for m in table.find_iter(text) {
        out.push_str(&text[cursor..m.start]);
        out.push_str(&m.canonical);
        cursor = m.end;
    }
    out.push_str(&text[cursor..]);
    phrase_key(&out)
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

/// Canonical administration instructions, deduplicated and sorted so that
/// listing order does not matter.
pub fn normalize_administration_with(lexicon: &Lexicon, text: &str) -> String {
    let lowered = phrase_key(text);
    let mut parts: Vec<String> = lowered
        .split([',', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match lexicon.administration().lookup(part) {
            Some(canon) => canon.to_string(),
            None => fold_phrases(lexicon.administration(), part),
        })
        .collect();
    parts.sort();
    parts.dedup();
    parts.join(", ")
}

pub fn normalize_administration(text: &str) -> String {
    normalize_administration_with(Lexicon::global(), text)
}

// ---------------------------------------------------------------------------
// Indication
// ---------------------------------------------------------------------------

/// Indication with filler stripped and clinical synonyms folded
/// ("for wheezing x 5 days" → "breathing difficulty").
pub fn normalize_indication_text_with(lexicon: &Lexicon, text: &str) -> String {
    let cleaned = clean_indication(text);
    if cleaned.is_empty() {
        return cleaned;
    }
    match lexicon.indications().lookup(&cleaned) {
        Some(canon) => canon.to_string(),
        None => fold_phrases(lexicon.indications(), &cleaned),
    }
}

pub fn normalize_indication_text(text: &str) -> String {
    normalize_indication_text_with(Lexicon::global(), text)
}

// ---------------------------------------------------------------------------
// Formulation
// ---------------------------------------------------------------------------

/// Release family of a formulation marker. Immediate release is the
/// default release profile and maps to the empty family.
pub fn formulation_family_with(lexicon: &Lexicon, text: &str) -> String {
    let key = phrase_key(text);
    let family = lexicon
        .formulations()
        .lookup(&key)
        .map(str::to_string)
        .or_else(|| lexicon.formulations().find(&key).map(|m| m.canonical))
        .unwrap_or(key);
    if family == "immediate release" {
        String::new()
    } else {
        family
    }
}

pub fn formulation_family(text: &str) -> String {
    formulation_family_with(Lexicon::global(), text)
}

pub fn formulations_equivalent_with(lexicon: &Lexicon, a: &str, b: &str) -> bool {
    formulation_family_with(lexicon, a) == formulation_family_with(lexicon, b)
}

pub fn formulations_equivalent(a: &str, b: &str) -> bool {
    formulations_equivalent_with(Lexicon::global(), a, b)
}
