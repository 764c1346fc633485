// Normalize raw order text before extraction.
// Unifies dash variants, drops invisible characters, lifts monitoring
// footnotes out of the order and expands prescriber shorthand.

use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::Lexicon;

use super::collapse_whitespace;

static DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{2010}-\u{2015}\u{2212}]").unwrap());
static TROUGH_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\s*[-,;]\s*|\s+)((?:target\s+)?trough\b.*)$").unwrap()
});
static INR_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*[,;(-]?\s*(?:(?:goal|target)\s+)?\binr\b\s*(?:goal|target)?\s*(?:of|:)?\s*\d+(?:\.\d+)?\s*(?:-|to)\s*\d+(?:\.\d+)?\s*\)?",
    )
    .unwrap()
});

/// Output of [`preprocess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    /// Order text ready for extraction, original case preserved.
    pub cleaned: String,
    /// Trailing `[target] trough ...` clause, if the order carried one.
    pub trough_note: Option<String>,
}

/// Clean an order string. Never fails; text without noise comes back with
/// only whitespace collapsed.
pub fn preprocess(raw: &str, lexicon: &Lexicon) -> Preprocessed {
    let visible = remove_invisible_chars(raw);
    let dashed = DASHES.replace_all(&visible, "-");

    let (without_trough, trough_note) = match TROUGH_NOTE.captures(&dashed) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let note = caps.get(1).map(|m| m.as_str().trim().to_string());
            (dashed[..whole.start].to_string(), note)
        }
        None => (dashed.to_string(), None),
    };

    let without_inr = INR_NOTE.replace_all(&without_trough, " ");
    let expanded = expand_abbreviations(&without_inr, lexicon);

    Preprocessed {
        cleaned: collapse_whitespace(&expanded),
        trough_note: trough_note.filter(|n| !n.is_empty()),
    }
}

/// Replace shorthand (qhs, qAM, stat, ...) with its long form.
fn expand_abbreviations(text: &str, lexicon: &Lexicon) -> String {
    let matches = lexicon.abbreviations().find_iter(text);
    if matches.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut cursor = 0;
    for m in matches {
        out.push_str(&text[cursor..m.start]);
        out.push(' ');
        out.push_str(&m.canonical);
        out.push(' ');
        cursor = m.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Remove zero-width and bidi formatting characters; non-breaking spaces
/// become plain spaces.
fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{00A0}' | '\u{202F}' => Some(' '),
            '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}'
            | '\u{FEFF}' | '\u{00AD}' => None,
            _ => Some(c),
        })
        .collect()
}
