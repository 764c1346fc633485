//! Release formulation (ER, DR, ODT, ...) and dosage form (tablet, patch,
//! inhaler, ...).

use super::{ParseContext, ParseState};

/// Fold release markers into their family tag and remove them.
pub fn formulation(mut state: ParseState, ctx: &ParseContext<'_>) -> ParseState {
    let matches = ctx.lexicon.formulations().find_iter(&state.residual);
    let Some(first) = matches.first() else {
        return state;
    };
    if state.order.formulation.is_empty() {
        state.order.formulation = first.canonical.clone();
    }

    let spans: Vec<(usize, usize)> = matches.iter().map(|m| (m.start, m.end)).collect();
    state.excise(&spans);
    state
}

/// Pick the dosage form by table precedence, falling back to the unit of the
/// quantity ("2 puffs" → inhaler). A form already inferred from the dose unit
/// is kept. Every form word is removed so it cannot leak into the drug name.
pub fn form(mut state: ParseState, ctx: &ParseContext<'_>) -> ParseState {
    let matches = ctx.lexicon.forms().find_iter(&state.residual);

    if state.order.form.is_empty() {
        let best = matches.iter().min_by_key(|m| (m.rank, m.start));
        if let Some(best) = best {
            state.order.form = best.canonical.clone();
        } else if let Some(implied) = ctx.lexicon.form_for_unit(&state.order.qty_unit) {
            state.order.form = implied.to_string();
        }
    }

    let spans: Vec<(usize, usize)> = matches.iter().map(|m| (m.start, m.end)).collect();
    state.excise(&spans);
    state
}
