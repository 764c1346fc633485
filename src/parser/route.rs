//! Route of administration.

use super::{ParseContext, ParseState};

/// The earliest route phrase wins; every route phrase is removed.
pub fn run(mut state: ParseState, ctx: &ParseContext<'_>) -> ParseState {
    let matches = ctx.lexicon.routes().find_iter(&state.residual);
    let Some(first) = matches.first() else {
        return state;
    };
    if state.order.route.is_empty() {
        state.order.route = first.canonical.clone();
    }

    let spans: Vec<(usize, usize)> = matches.iter().map(|m| (m.start, m.end)).collect();
    state.excise(&spans);
    tracing::debug!(route = %state.order.route, "Route extracted");
    state
}
