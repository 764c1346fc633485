//! Drug name, salt and brand tokens.
//!
//! Runs last among the extractors: whatever leads the residual once every
//! other field is removed is the drug phrase. Brand tokens are read from the
//! untouched order text instead, since earlier stages may have cut them.

use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::{compact, phrase_key};

use super::{collapse_whitespace, ParseContext, ParseState};

static HEAD_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+-(?:\s+|$)|[;,]").unwrap());
/// Hyphenated names that carry a number ("Omega-3", "Interferon-2b").
static HYPHEN_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,}-\d+[A-Za-z]*$").unwrap());

/// Instruction words that can be left in front of or inside the drug phrase.
const STOP_WORDS: &[&str] = &[
    "take", "give", "administer", "inhale", "apply", "use", "inject", "instill", "chew",
    "dissolve", "place", "insert", "contents", "of", "via", "device", "each", "per", "in", "the",
    "and", "then", "continue", "home", "dose", "combination", "with", "by", "mouth", "a", "an",
    "x", "as", "directed", "hold",
];

pub fn run(mut state: ParseState, ctx: &ParseContext<'_>) -> ParseState {
    for brand in ctx.lexicon.brands().find_iter(&state.order.original_raw) {
        state.order.push_brand_token(&phrase_key(&brand.text));
    }

    let end = HEAD_END
        .find(&state.residual)
        .map_or(state.residual.len(), |m| m.start());
    let head: Vec<&str> = state.residual[..end]
        .split_whitespace()
        .take_while(|token| {
            !token.chars().any(|c| c.is_ascii_digit()) || HYPHEN_NUMBER.is_match(token)
        })
        .collect();
    let head = head.join(" ");

    if let Some(salt) = ctx.lexicon.salts().find(&head) {
        // "potassium chloride" is an ingredient, not a salt of one
        let names_ingredient = ctx
            .lexicon
            .ingredient_keys()
            .iter()
            .any(|k| k.key.contains(&compact(&salt.text)) && compact(&head).contains(&k.key));
        if !names_ingredient {
            state.order.salt = salt.canonical;
        }
    }

    state.order.raw_drug = head
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string();
    let kept: Vec<&str> = head
        .split_whitespace()
        .filter(|token| {
            let word = token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            !STOP_WORDS.contains(&word.as_str())
        })
        .collect();
    state.order.drug = compact(&kept.join(" "));

    let rest = collapse_whitespace(&state.residual[end..]);
    state.residual = rest;
    tracing::debug!(
        brand_tokens = state.order.brand_tokens.len(),
        has_salt = !state.order.salt.is_empty(),
        "Drug extracted"
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexicon::Lexicon;
    use crate::models::ParsedOrder;

    fn apply(residual: &str, raw: &str) -> ParseState {
        let config = ParserConfig::default();
        let ctx = ParseContext {
            lexicon: Lexicon::global(),
            config: &config,
        };
        run(ParseState::new(residual.to_string(), ParsedOrder::new(raw)), &ctx)
    }

    #[test]
    fn head_before_dash() {
        let state = apply("Metformin - take", "Metformin 500 mg tablet - take 1 tablet daily");
        assert_eq!(state.order.drug, "metformin");
        assert_eq!(state.order.raw_drug, "Metformin");
        assert!(state.order.brand_tokens.is_empty());
        assert_eq!(state.residual, "- take");
    }

    #[test]
    fn punctuation_and_spaces_are_removed() {
        let state = apply("Lisinopril/HCTZ - daily", "Lisinopril/HCTZ 20-12.5mg - 1 tab daily");
        assert_eq!(state.order.drug, "lisinoprilhctz");
        let combo = apply(
            "Lisinopril / Hydrochlorothiazide combination - PO",
            "Lisinopril 20mg / Hydrochlorothiazide 12.5mg combination tablet - 1 tablet PO daily",
        );
        assert_eq!(combo.order.drug, "lisinoprilhydrochlorothiazide");
    }

    #[test]
    fn brand_tokens_come_from_the_original_text() {
        let state = apply(
            "Tiotropium Bromide (Spiriva ) - contents of via device",
            "Tiotropium Bromide (Spiriva HandiHaler) 18 mcg capsule - inhale contents of one capsule via HandiHaler device once daily",
        );
        assert_eq!(state.order.brand_tokens, vec!["spiriva"]);
        assert_eq!(state.order.salt, "bromide");
        assert_eq!(state.order.drug, "tiotropiumbromidespiriva");
    }

    #[test]
    fn brand_tokens_are_deduplicated() {
        let state = apply("Lasix", "Lasix 20 mg (LASIX) qAM");
        assert_eq!(state.order.brand_tokens, vec!["lasix"]);
        assert_eq!(state.order.drug, "lasix");
    }

    #[test]
    fn generic_names_are_not_brands() {
        let state = apply("Furosemide", "Furosemide 20 mg daily");
        assert!(state.order.brand_tokens.is_empty());
    }

    #[test]
    fn salts_are_recorded() {
        assert_eq!(apply("Amlodipine besylate - PO", "").order.salt, "besylate");
        assert_eq!(apply("Warfarin sodium", "").order.salt, "sodium");
        assert_eq!(apply("Amlodipine - PO", "").order.salt, "");
    }

    #[test]
    fn potassium_chloride_is_not_a_salt() {
        let state = apply("Potassium chloride ER", "");
        assert_eq!(state.order.salt, "");
        assert_eq!(state.order.drug, "potassiumchlorideer");
    }

    #[test]
    fn instruction_words_are_dropped() {
        let state = apply("take Ondansetron", "");
        assert_eq!(state.order.drug, "ondansetron");
    }

    #[test]
    fn hyphenated_number_stays_in_the_name() {
        let state = apply("Omega-3", "Omega-3 1 g bid");
        assert_eq!(state.order.drug, "omega3");
        assert_eq!(state.order.raw_drug, "Omega-3");

        let state = apply("Metformin 500", "Metformin 500");
        assert_eq!(state.order.drug, "metformin");
    }

    #[test]
    fn empty_residual() {
        let state = apply("", "");
        assert_eq!(state.order.drug, "");
        assert_eq!(state.order.raw_drug, "");
    }
}
