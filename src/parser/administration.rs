//! Administration instructions ("with food", "on an empty stomach").

use super::{ParseContext, ParseState};

pub fn run(mut state: ParseState, ctx: &ParseContext<'_>) -> ParseState {
    let matches = ctx.lexicon.administration().find_iter(&state.residual);
    if matches.is_empty() {
        return state;
    }

    let mut instructions: Vec<&str> = Vec::new();
    for m in &matches {
        if !instructions.contains(&m.canonical.as_str()) {
            instructions.push(&m.canonical);
        }
    }
    state.order.administration = instructions.join(", ");

    let spans: Vec<(usize, usize)> = matches.iter().map(|m| (m.start, m.end)).collect();
    state.excise(&spans);
    state
}
