//! Time-of-day extraction ("in the morning", "nightly", "pm").

use super::{ParseContext, ParseState};

/// Record every time-of-day phrase as a slot, in order of appearance,
/// and remove them from the residual.
pub fn run(mut state: ParseState, ctx: &ParseContext<'_>) -> ParseState {
    let matches = ctx.lexicon.time_of_day().find_iter(&state.residual);
    if matches.is_empty() {
        return state;
    }

    let mut slots: Vec<&str> = Vec::new();
    let mut originals: Vec<String> = Vec::new();
    for m in &matches {
        if !slots.contains(&m.canonical.as_str()) {
            slots.push(&m.canonical);
        }
        originals.push(m.text.to_lowercase());
    }
    state.order.time_of_day = slots.join(", ");
    state.order.time_of_day_original = originals.join(", ");

    let spans: Vec<(usize, usize)> = matches.iter().map(|m| (m.start, m.end)).collect();
    state.excise(&spans);
    tracing::debug!(slots = %state.order.time_of_day, "Time of day extracted");
    state
}
