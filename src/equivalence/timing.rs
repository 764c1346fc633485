//! Time-of-day slot comparison.

use std::str::FromStr;

use crate::lexicon::{phrase_key, Lexicon};
use crate::models::TimeSlot;

/// Canonical slot list for a time-of-day string: synonyms folded, slots
/// deduplicated and sorted morning → bedtime, joined with `", "`.
/// Unrecognized pieces are kept, lowercased, after the known slots.
pub fn normalize_time_of_day_with(lexicon: &Lexicon, text: &str) -> String {
    let lowered = phrase_key(text);
    let mut slots: Vec<TimeSlot> = Vec::new();
    let mut unknown: Vec<String> = Vec::new();

    let pieces = lowered
        .split(',')
        .flat_map(|piece| piece.split(" and "))
        .flat_map(|piece| piece.split('&'))
        .map(str::trim)
        .filter(|piece| !piece.is_empty());

    for piece in pieces {
        let slot = TimeSlot::from_str(piece).ok().or_else(|| {
            let canonical = lexicon
                .time_of_day()
                .lookup(piece)
                .map(str::to_string)
                .or_else(|| lexicon.time_of_day().find(piece).map(|m| m.canonical))?;
            TimeSlot::from_str(&canonical).ok()
        });
        match slot {
            Some(slot) if !slots.contains(&slot) => slots.push(slot),
            Some(_) => {}
            None => {
                let piece = piece.to_string();
                if !unknown.contains(&piece) {
                    unknown.push(piece);
                }
            }
        }
    }

    slots.sort();
    slots
        .iter()
        .map(|slot| slot.as_str().to_string())
        .chain(unknown)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn normalize_time_of_day(text: &str) -> String {
    normalize_time_of_day_with(Lexicon::global(), text)
}

/// Whether the time of day differs. Two blanks are unchanged; a slot on one
/// side only is a change.
pub fn tod_changed_with(lexicon: &Lexicon, a: &str, b: &str) -> bool {
    let a = normalize_time_of_day_with(lexicon, a);
    let b = normalize_time_of_day_with(lexicon, b);
    match (a.is_empty(), b.is_empty()) {
        (true, true) => false,
        (true, false) | (false, true) => true,
        (false, false) => a != b,
    }
}

pub fn tod_changed(a: &str, b: &str) -> bool {
    tod_changed_with(Lexicon::global(), a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_share_a_slot() {
        assert_eq!(normalize_time_of_day("midday"), "noon");
        assert_eq!(normalize_time_of_day("in the evenings"), "evening");
        assert_eq!(normalize_time_of_day("Evenings"), "evening");
        assert_eq!(normalize_time_of_day("nightly"), "bedtime");
        assert_eq!(normalize_time_of_day("at night"), "bedtime");
        assert_eq!(normalize_time_of_day("QAM"), "morning");
    }

    #[test]
    fn slots_are_sorted_and_deduplicated() {
        assert_eq!(
            normalize_time_of_day("bedtime, morning, every morning"),
            "morning, bedtime"
        );
        assert_eq!(normalize_time_of_day("noon and evening"), "noon, evening");
    }

    #[test]
    fn unknown_text_is_kept() {
        assert_eq!(normalize_time_of_day("with lunch"), "with lunch");
        assert_eq!(normalize_time_of_day(""), "");
    }

    #[test]
    fn blank_handling() {
        assert!(!tod_changed("", ""));
        assert!(tod_changed("", "morning"));
        assert!(tod_changed("evening", ""));
    }

    #[test]
    fn synonym_changes_are_not_changes() {
        assert!(!tod_changed("in the morning", "every morning"));
        assert!(!tod_changed("evening", "in the evenings"));
        assert!(tod_changed("morning", "evening"));
        assert!(tod_changed("evening", "bedtime"));
    }
}
