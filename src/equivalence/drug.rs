//! Drug identity: brand and generic names, salts, combination products.

use crate::lexicon::{compact, phrase_key, Lexicon};

/// Core ingredient key of a drug name: its active ingredients, sorted and
/// joined with `+`. Brand names resolve to their generics, salt words are
/// ignored, and combination names yield every ingredient. A name with no
/// known ingredient falls back to the compacted name without salt words.
pub fn core_ingredient_with(lexicon: &Lexicon, name: &str) -> String {
    let name = compact(name);
    if name.is_empty() {
        return name;
    }

    let mut working = name.clone();
    let mut ingredients: Vec<String> = Vec::new();
    for key in lexicon.ingredient_keys() {
        if key.whole_name_only {
            if name == key.key {
                ingredients.extend(key.ingredients.iter().cloned());
            }
            continue;
        }
        if working.contains(&key.key) {
            working = working.replace(&key.key, "|");
            ingredients.extend(key.ingredients.iter().cloned());
        }
    }

    if ingredients.is_empty() {
        let mut bare = name.clone();
        for salt in lexicon.salt_keys() {
            bare = bare.replace(salt.as_str(), "");
        }
        return if bare.is_empty() { name } else { bare };
    }

    let mut ingredients: Vec<String> = ingredients.iter().map(|i| phrase_key(i)).collect();
    ingredients.sort();
    ingredients.dedup();
    ingredients.join("+")
}

pub fn core_ingredient(name: &str) -> String {
    core_ingredient_with(Lexicon::global(), name)
}

/// Whether two drug names share a non-empty core ingredient.
pub fn same_drug_core_with(lexicon: &Lexicon, a: &str, b: &str) -> bool {
    let a = core_ingredient_with(lexicon, a);
    !a.is_empty() && a == core_ingredient_with(lexicon, b)
}

pub fn same_drug_core(a: &str, b: &str) -> bool {
    same_drug_core_with(Lexicon::global(), a, b)
}

/// Whether a salt swap between two names of the same drug selects a
/// different product (diclofenac sodium vs diclofenac potassium). Only
/// counts when both sides name a salt.
pub fn salt_changes_formulation_with(
    lexicon: &Lexicon,
    drug_a: &str,
    salt_a: &str,
    drug_b: &str,
    salt_b: &str,
) -> bool {
    if salt_a.is_empty() || salt_b.is_empty() || phrase_key(salt_a) == phrase_key(salt_b) {
        return false;
    }
    let core = core_ingredient_with(lexicon, drug_a);
    core == core_ingredient_with(lexicon, drug_b)
        && core.split('+').any(|i| lexicon.is_functional_salt_drug(i))
}
