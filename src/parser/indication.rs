//! PRN markers, PRN conditions and indications ("for atrial fibrillation").

use std::sync::LazyLock;

use regex::Regex;

use super::{collapse_whitespace, ParseContext, ParseState};

static PRN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\bp\.r\.n\.|\b(?:prn|as needed|as required|when needed|if needed|if need be)\b)",
    )
    .unwrap()
});
static FOR_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:for|if)\s+").unwrap());
/// Hold parameters ("hold if HR < 60") are instructions, not indications.
static HOLD_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[,;]?\s*\bhold(?:ing)?\s+(?:if|for|when|while)\b").unwrap()
});
/// Where a condition ends: a separator, or the start of dosing wording.
static CLAUSE_STOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s+-(?:\s+|$)|[;,(]|\.(?:\s|$)|\b(?:every|each|daily|bid|tid|qid|q\d+\w*|po|by\s+mouth|orally|may\s+repeat|max(?:imum)?|not\s+to\s+exceed|do\s+not\s+exceed|up\s+to|then|until|take|use|give|inhale|apply|inject)\b",
    )
    .unwrap()
});
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:for|x)\s*)?\b\d+\s*(?:more\s+)?(?:days?|weeks?|wks?|months?|doses?)\b",
    )
    .unwrap()
});
static LEADING_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:for|x)?\s*\d+\s*(?:more\s+)?(?:days?|weeks?|wks?|months?|doses?)\b")
        .unwrap()
});
static ASIDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:check|monitor|follow\s+up|f/u|recheck|per|see)\b.*$").unwrap()
});
static FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:then\s+)?(?:stop|discontinue|d/c)\b|\bas\s+directed\b|\bcontinue\s+home\s+dose\b|\btaper(?:ing)?\b",
    )
    .unwrap()
});
static EDGE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:for|if|of|and|or|then|with)\s+)+|(?:\s+(?:and|or|then|with|for))+$")
        .unwrap()
});
/// First words that mean the PRN marker is followed by dosing, not a condition.
static NOT_A_CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d|q\d|every\b|each\b|daily\b|bid\b|tid\b|qid\b|po\b|by\b|orally\b|at\b|in\b|up\b|max|may\b|not\b|to\b|x\b)")
        .unwrap()
});

/// Strip durations, stop instructions and monitoring asides from an
/// indication phrase; lowercase, single-spaced.
pub fn clean_indication(text: &str) -> String {
    let lower = text.to_lowercase();
    let without_aside = ASIDE.replace(&lower, " ");
    let without_duration = DURATION.replace_all(&without_aside, " ");
    let without_filler = FILLER.replace_all(&without_duration, " ");
    let collapsed = collapse_whitespace(&without_filler);
    let trimmed = collapsed.trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
    let edged = EDGE_WORDS.replace_all(trimmed, "");
    edged
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string()
}

/// End of the clause starting at `from`.
fn clause_end(text: &str, from: usize) -> usize {
    CLAUSE_STOP
        .find_at(text, from)
        .map_or(text.len(), |m| m.start())
        .max(from)
}

/// Condition written right after a PRN marker ("PRN wheeze").
fn condition_after_marker(tail: &str) -> Option<String> {
    let tail = tail.trim_start();
    let tail = FOR_CLAUSE
        .find(tail)
        .filter(|m| m.start() == 0)
        .map_or(tail, |m| &tail[m.end()..]);
    if tail.is_empty() || NOT_A_CONDITION.is_match(tail) {
        return None;
    }
    let cleaned = clean_indication(tail);
    (!cleaned.is_empty()).then_some(cleaned)
}

pub fn run(mut state: ParseState, _ctx: &ParseContext<'_>) -> ParseState {
    let mut spans: Vec<(usize, usize)> = hold_clauses(&state.residual);
    let mut condition: Option<String> = None;

    if let Some(marker) = PRN_MARKER
        .find_iter(&state.residual)
        .find(|m| !spans.iter().any(|(s, e)| m.start() < *e && *s < m.end()))
    {
        state.order.prn = true;
        spans.push((marker.start(), marker.end()));
        let end = clause_end(&state.residual, marker.end());
        if let Some(found) = condition_after_marker(&state.residual[marker.end()..end]) {
            condition = Some(found);
            spans.push((marker.end(), end));
        }
    }

    if condition.is_none() {
        let mut from = 0;
        while let Some(m) = FOR_CLAUSE.find_at(&state.residual, from) {
            from = m.end();
            if spans.iter().any(|(s, e)| m.start() < *e && *s < m.end()) {
                continue;
            }
            // "for 10 days" is a duration, not an indication
            if let Some(duration) = LEADING_DURATION.find(&state.residual[m.end()..]) {
                spans.push((m.start(), m.end() + duration.end()));
                from = m.end() + duration.end();
                continue;
            }
            let end = clause_end(&state.residual, m.end());
            let cleaned = clean_indication(&state.residual[m.end()..end]);
            if cleaned.starts_with(char::is_alphabetic) {
                spans.push((m.start(), end));
                condition = Some(cleaned);
                break;
            }
        }
    }

    if let Some(found) = condition {
        if state.order.prn {
            state.order.prn_condition = found.clone();
        }
        state.order.indication = found;
    }

    state.excise(&spans);
    tracing::debug!(
        prn = state.order.prn,
        has_indication = !state.order.indication.is_empty(),
        "PRN and indication extracted"
    );
    state
}

/// Spans of hold parameters, each running to the end of its clause.
fn hold_clauses(text: &str) -> Vec<(usize, usize)> {
    let spans: Vec<(usize, usize)> = HOLD_CLAUSE
        .find_iter(text)
        .map(|m| (m.start(), clause_end(text, m.end())))
        .collect();
    if !spans.is_empty() {
        tracing::debug!(count = spans.len(), "Hold parameters removed");
    }
    spans
}
