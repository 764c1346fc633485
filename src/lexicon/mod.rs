//! Normalization lexicon: every synonym table the parser and the differ use.
//!
//! Built once from the tables in [`tables`], optionally extended with a JSON
//! overlay, and immutable afterwards. All phrase tables are compiled into a
//! single alternation each, longest phrase first, so a scan returns the
//! earliest match and, at that position, the longest phrase.

pub mod tables;

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Lexicon overlay load failed ({0}): {1}")]
    Load(String, String),

    #[error("Lexicon overlay parse failed ({0}): {1}")]
    Parse(String, String),

    #[error("Lexicon pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

static GLOBAL: LazyLock<Lexicon> = LazyLock::new(Lexicon::builtin);

/// A written amount: "5", "12.5", or with thousands separators "50,000".
pub const NUMBER: &str = r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?";

/// Value of a string matched by [`NUMBER`].
pub fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', "").parse().ok()
}

/// Lowercase, single-spaced form used as the lookup key for phrases.
pub fn phrase_key(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase alphanumerics only: "K-Dur 20" → "kdur20".
pub fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// PhraseTable
// ---------------------------------------------------------------------------

/// One phrase found in a text.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseMatch {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub canonical: String,
    /// Position of the canonical value in table order.
    pub rank: usize,
}

/// Phrase → canonical value, matched case-insensitively on word boundaries.
#[derive(Debug)]
pub struct PhraseTable {
    regex: Option<Regex>,
    canonical: HashMap<String, (String, usize)>,
}

impl PhraseTable {
    /// Later entries for the same phrase replace earlier ones.
    pub fn build(entries: &[(String, String)]) -> Result<Self, LexiconError> {
        let mut ranks: HashMap<&str, usize> = HashMap::new();
        let mut canonical = HashMap::new();
        for (phrase, canon) in entries {
            let next = ranks.len();
            let rank = *ranks.entry(canon.as_str()).or_insert(next);
            canonical.insert(phrase_key(phrase), (canon.clone(), rank));
        }

        let mut phrases: Vec<&String> = canonical.keys().collect();
        phrases.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));

        let regex = if phrases.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = phrases.iter().map(|p| phrase_pattern(p)).collect();
            Some(Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))?)
        };

        Ok(Self { regex, canonical })
    }

    pub fn lookup(&self, phrase: &str) -> Option<&str> {
        self.canonical
            .get(&phrase_key(phrase))
            .map(|(canon, _)| canon.as_str())
    }

    pub fn find_iter(&self, text: &str) -> Vec<PhraseMatch> {
        let Some(regex) = &self.regex else {
            return Vec::new();
        };
        regex
            .find_iter(text)
            .filter_map(|m| {
                let (canon, rank) = self.canonical.get(&phrase_key(m.as_str()))?;
                Some(PhraseMatch {
                    start: m.start(),
                    end: m.end(),
                    text: m.as_str().to_string(),
                    canonical: canon.clone(),
                    rank: *rank,
                })
            })
            .collect()
    }

    pub fn find(&self, text: &str) -> Option<PhraseMatch> {
        self.find_iter(text).into_iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// Escaped phrase with word boundaries on alphanumeric edges only, so that
/// "b.i.d." and "w/" still match.
fn phrase_pattern(phrase: &str) -> String {
    let body = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let lead = if phrase.starts_with(char::is_alphanumeric) { r"\b" } else { "" };
    let trail = if phrase.ends_with(char::is_alphanumeric) { r"\b" } else { "" };
    format!("{lead}{body}{trail}")
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// Site-specific additions loaded from JSON.
///
/// ```json
/// { "brands": { "eliquis": "apixaban" }, "indications": { "afib rvr": "atrial fibrillation" } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconOverlay {
    pub brands: HashMap<String, String>,
    pub generics: Vec<String>,
    pub indications: HashMap<String, String>,
    pub administration: HashMap<String, String>,
    pub abbreviations: HashMap<String, String>,
}

impl LexiconOverlay {
    pub fn entry_count(&self) -> usize {
        self.brands.len()
            + self.generics.len()
            + self.indications.len()
            + self.administration.len()
            + self.abbreviations.len()
    }
}

/// Owned copy of every table, kept so overlays can be merged later.
#[derive(Debug, Clone)]
struct LexiconSource {
    units: Vec<(String, String)>,
    abbreviations: Vec<(String, String)>,
    frequencies: Vec<(String, String)>,
    time_of_day: Vec<(String, String)>,
    brands: Vec<(String, String)>,
    generics: Vec<String>,
    ingredient_abbreviations: Vec<(String, String)>,
    salts: Vec<String>,
    functional_salt_drugs: Vec<String>,
    formulations: Vec<(String, String)>,
    routes: Vec<(String, String)>,
    forms: Vec<(String, String)>,
    administration: Vec<(String, String)>,
    indications: Vec<(String, String)>,
}

fn pairs(table: &[(&str, &str)]) -> Vec<(String, String)> {
    table
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// Flatten `canonical → [phrases]` groups into `(phrase, canonical)` pairs.
fn grouped(table: &[(&str, &[&str])]) -> Vec<(String, String)> {
    table
        .iter()
        .flat_map(|(canon, phrases)| phrases.iter().map(move |p| (p.to_string(), canon.to_string())))
        .collect()
}

impl LexiconSource {
    fn builtin() -> Self {
        Self {
            units: tables::UNIT_VARIANTS
                .iter()
                .flat_map(|(standard, variants)| {
                    variants.iter().map(move |v| (v.to_string(), standard.to_string()))
                })
                .collect(),
            abbreviations: pairs(tables::ABBREVIATIONS),
            frequencies: pairs(tables::FREQUENCY_PHRASES),
            time_of_day: tables::TIME_OF_DAY
                .iter()
                .flat_map(|(slot, phrases)| {
                    phrases
                        .iter()
                        .map(move |p| (p.to_string(), slot.as_str().to_string()))
                })
                .collect(),
            brands: pairs(tables::BRANDS),
            generics: tables::GENERICS.iter().map(|g| g.to_string()).collect(),
            ingredient_abbreviations: pairs(tables::INGREDIENT_ABBREVIATIONS),
            salts: tables::SALTS.iter().map(|s| s.to_string()).collect(),
            functional_salt_drugs: tables::FUNCTIONAL_SALT_DRUGS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            formulations: grouped(tables::FORMULATIONS),
            routes: grouped(tables::ROUTES),
            forms: grouped(tables::FORMS),
            administration: grouped(tables::ADMINISTRATION),
            indications: grouped(tables::INDICATIONS),
        }
    }

    fn merge(&mut self, overlay: &LexiconOverlay) {
        merge_pairs(&mut self.brands, &overlay.brands, "brands");
        merge_pairs(&mut self.indications, &overlay.indications, "indications");
        merge_pairs(&mut self.administration, &overlay.administration, "administration");
        merge_pairs(&mut self.abbreviations, &overlay.abbreviations, "abbreviations");
        for generic in &overlay.generics {
            let generic = phrase_key(generic);
            if generic.is_empty() {
                tracing::warn!(table = "generics", "Skipping blank lexicon overlay entry");
                continue;
            }
            if !self.generics.contains(&generic) {
                self.generics.push(generic);
            }
        }
    }
}

fn merge_pairs(target: &mut Vec<(String, String)>, additions: &HashMap<String, String>, table: &str) {
    let mut keys: Vec<&String> = additions.keys().collect();
    keys.sort();
    for key in keys {
        let phrase = phrase_key(key);
        let canonical = phrase_key(&additions[key]);
        if phrase.is_empty() || canonical.is_empty() {
            tracing::warn!(table, "Skipping blank lexicon overlay entry");
            continue;
        }
        target.retain(|(p, _)| *p != phrase);
        target.push((phrase, canonical));
    }
}

// ---------------------------------------------------------------------------
// Lexicon
// ---------------------------------------------------------------------------

/// A searchable key for ingredient detection in compacted drug names.
#[derive(Debug, Clone)]
pub struct IngredientKey {
    pub key: String,
    pub ingredients: Vec<String>,
    /// Short abbreviations only count when they are the whole name.
    pub whole_name_only: bool,
}

/// Compiled normalization tables.
#[derive(Debug)]
pub struct Lexicon {
    source: LexiconSource,
    units: HashMap<String, String>,
    unit_scan: Regex,
    abbreviations: PhraseTable,
    frequencies: PhraseTable,
    time_of_day: PhraseTable,
    brands: PhraseTable,
    ingredient_keys: Vec<IngredientKey>,
    salts: PhraseTable,
    salt_keys: Vec<String>,
    formulations: PhraseTable,
    routes: PhraseTable,
    forms: PhraseTable,
    administration: PhraseTable,
    indications: PhraseTable,
}

impl Lexicon {
    /// The built-in tables.
    ///
    /// # Panics
    /// Only if the built-in tables produce an invalid pattern, which the
    /// tests rule out.
    pub fn builtin() -> Self {
        Self::compile(LexiconSource::builtin()).expect("built-in lexicon tables compile")
    }

    /// Shared built-in lexicon, compiled on first use.
    pub fn global() -> &'static Lexicon {
        &GLOBAL
    }

    /// Read an overlay file.
    pub fn load_overlay(path: &Path) -> Result<LexiconOverlay, LexiconError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| LexiconError::Load(path.display().to_string(), e.to_string()))?;
        serde_json::from_str(&json)
            .map_err(|e| LexiconError::Parse(path.display().to_string(), e.to_string()))
    }

    /// Built-in tables extended with the overlay at `path`.
    pub fn from_overlay_file(path: &Path) -> Result<Self, LexiconError> {
        let overlay = Self::load_overlay(path)?;
        let lexicon = Self::builtin().with_overlay(&overlay)?;
        tracing::info!(
            entries = overlay.entry_count(),
            "Lexicon overlay applied"
        );
        Ok(lexicon)
    }

    /// A new lexicon with the overlay merged over this one.
    pub fn with_overlay(&self, overlay: &LexiconOverlay) -> Result<Self, LexiconError> {
        let mut source = self.source.clone();
        source.merge(overlay);
        Self::compile(source)
    }

    fn compile(source: LexiconSource) -> Result<Self, LexiconError> {
        let units: HashMap<String, String> = source
            .units
            .iter()
            .map(|(variant, standard)| (variant.to_lowercase(), standard.clone()))
            .collect();

        let mut variants: Vec<&String> = units.keys().collect();
        variants.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let unit_alternation = variants
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|");
        let unit_scan = Regex::new(&format!(
            r"(?i)({NUMBER})\s*({unit_alternation})\b"
        ))?;

        let salt_entries: Vec<(String, String)> =
            source.salts.iter().map(|s| (s.clone(), s.clone())).collect();
        let mut salt_keys: Vec<String> = source.salts.iter().map(|s| compact(s)).collect();
        salt_keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        salt_keys.dedup();

        Ok(Self {
            units,
            unit_scan,
            abbreviations: PhraseTable::build(&source.abbreviations)?,
            frequencies: PhraseTable::build(&source.frequencies)?,
            time_of_day: PhraseTable::build(&source.time_of_day)?,
            brands: PhraseTable::build(&source.brands)?,
            ingredient_keys: ingredient_keys(&source),
            salts: PhraseTable::build(&salt_entries)?,
            salt_keys,
            formulations: PhraseTable::build(&source.formulations)?,
            routes: PhraseTable::build(&source.routes)?,
            forms: PhraseTable::build(&source.forms)?,
            administration: PhraseTable::build(&source.administration)?,
            indications: PhraseTable::build(&source.indications)?,
            source,
        })
    }

    // ── Units ──────────────────────────────────────────────

    /// Standard unit for a written variant ("Tabs" → "tablet").
    pub fn standard_unit(&self, raw: &str) -> Option<&str> {
        self.units.get(&raw.to_lowercase()).map(String::as_str)
    }

    /// `(number)(unit variant)` scanner; group 1 is the value, group 2 the unit.
    pub fn unit_scan(&self) -> &Regex {
        &self.unit_scan
    }

    /// Rank of a standard unit in dose-candidate ordering (lower wins).
    pub fn unit_rank(&self, unit: &str) -> usize {
        tables::UNIT_PRECEDENCE
            .iter()
            .position(|u| *u == unit)
            .unwrap_or(tables::UNIT_PRECEDENCE.len())
    }

    pub fn is_countable(&self, unit: &str) -> bool {
        tables::COUNTABLE_UNITS.contains(&unit)
    }

    /// Dosage form implied by a counted unit ("puff" → "inhaler").
    pub fn form_for_unit(&self, unit: &str) -> Option<&'static str> {
        tables::QTY_UNIT_FORMS
            .iter()
            .find(|(u, _)| *u == unit)
            .map(|(_, form)| *form)
    }

    // ── Phrase tables ──────────────────────────────────────

    pub fn abbreviations(&self) -> &PhraseTable {
        &self.abbreviations
    }

    pub fn frequencies(&self) -> &PhraseTable {
        &self.frequencies
    }

    pub fn time_of_day(&self) -> &PhraseTable {
        &self.time_of_day
    }

    pub fn brands(&self) -> &PhraseTable {
        &self.brands
    }

    pub fn salts(&self) -> &PhraseTable {
        &self.salts
    }

    pub fn formulations(&self) -> &PhraseTable {
        &self.formulations
    }

    pub fn routes(&self) -> &PhraseTable {
        &self.routes
    }

    pub fn forms(&self) -> &PhraseTable {
        &self.forms
    }

    pub fn administration(&self) -> &PhraseTable {
        &self.administration
    }

    pub fn indications(&self) -> &PhraseTable {
        &self.indications
    }

    // ── Drugs ──────────────────────────────────────────────

    /// Ingredient search keys, longest first.
    pub fn ingredient_keys(&self) -> &[IngredientKey] {
        &self.ingredient_keys
    }

    /// Compacted salt words, longest first.
    pub fn salt_keys(&self) -> &[String] {
        &self.salt_keys
    }

    pub fn is_functional_salt_drug(&self, ingredient: &str) -> bool {
        self.source
            .functional_salt_drugs
            .iter()
            .any(|d| d == ingredient)
    }
}

fn ingredient_keys(source: &LexiconSource) -> Vec<IngredientKey> {
    let mut by_key: HashMap<String, (Vec<String>, bool)> = HashMap::new();
    let mut add = |name: &str, ingredients: Vec<String>, whole_name_only: bool| {
        let key = compact(name);
        if !key.is_empty() {
            by_key.entry(key).or_insert((ingredients, whole_name_only));
        }
    };

    for (brand, generic) in &source.brands {
        let parts: Vec<String> = generic.split('/').map(phrase_key).collect();
        for part in &parts {
            add(part.as_str(), vec![part.clone()], false);
        }
        add(brand.as_str(), parts, false);
    }
    for generic in &source.generics {
        add(generic.as_str(), vec![phrase_key(generic)], false);
    }
    for (abbreviation, generic) in &source.ingredient_abbreviations {
        let whole_name_only = compact(abbreviation).len() < 4;
        add(abbreviation.as_str(), vec![phrase_key(generic)], whole_name_only);
    }

    let mut keys: Vec<IngredientKey> = by_key
        .into_iter()
        .map(|(key, (ingredients, whole_name_only))| IngredientKey {
            key,
            ingredients,
            whole_name_only,
        })
        .collect();
    keys.sort_by(|a, b| b.key.len().cmp(&a.key.len()).then(a.key.cmp(&b.key)));
    keys
}
