//! Collection diff and filter engine
//!
//! Pure functions over the in-memory catalog and per-user quantity maps.
//! Stateless; re-evaluated on every input change (filter keystroke, quantity
//! mutation), which is fine at catalog scale (low thousands of cards).

use crate::catalog::Card;
use std::collections::HashMap;

/// Per-user mapping from card id to owned count. An absent key means
/// quantity zero; stored zeros never occur.
pub type QuantityMap = HashMap<String, u32>;

fn quantity(map: &QuantityMap, card_id: &str) -> u32 {
    map.get(card_id).copied().unwrap_or(0)
}

/// All catalog cards the user owns at least one copy of, in catalog order
pub fn owned_by(catalog: &[Card], quantities: &QuantityMap) -> Vec<Card> {
    catalog
        .iter()
        .filter(|card| quantity(quantities, &card.id) > 0)
        .cloned()
        .collect()
}

/// All catalog cards the user owns more than one copy of
pub fn owned_multiple(catalog: &[Card], quantities: &QuantityMap) -> Vec<Card> {
    catalog
        .iter()
        .filter(|card| quantity(quantities, &card.id) > 1)
        .cloned()
        .collect()
}

/// Cards `mine` owns that `theirs` does not.
///
/// Asymmetric: swapping the arguments yields the complementary exclusive set.
/// Cards owned by neither user appear in neither result.
pub fn exclusive_to(catalog: &[Card], mine: &QuantityMap, theirs: &QuantityMap) -> Vec<Card> {
    catalog
        .iter()
        .filter(|card| quantity(mine, &card.id) > 0 && quantity(theirs, &card.id) == 0)
        .cloned()
        .collect()
}

/// Compound filter over name/id-suffix, rarity, pack, and ownership flags
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Matches the card name (case-insensitive substring) or, when the
    /// trimmed text is non-empty, the last three characters of the card id
    pub name_or_suffix: String,
    /// Exact rarity match; `None` or empty means all rarities
    pub rarity: Option<String>,
    /// Exact pack match; `None` or empty means all packs
    pub pack: Option<String>,
    /// Restrict to cards the comparison partner does not own
    pub unique_only: bool,
    /// Restrict to cards owned more than once
    pub multiple_only: bool,
}

impl FilterCriteria {
    /// Text/rarity/pack predicate conjunction for one card
    fn matches(&self, card: &Card) -> bool {
        let matches_name = card
            .name
            .to_lowercase()
            .contains(&self.name_or_suffix.to_lowercase());
        let needle = self.name_or_suffix.trim();
        let matches_suffix = !needle.is_empty() && card.id_suffix().contains(needle);
        if !(matches_name || matches_suffix) {
            return false;
        }

        let matches_rarity = self
            .rarity
            .as_deref()
            .map_or(true, |r| r.is_empty() || card.rarity == r);
        let matches_pack = self
            .pack
            .as_deref()
            .map_or(true, |p| p.is_empty() || card.pack == p);

        matches_rarity && matches_pack
    }
}

/// Apply the text/rarity/pack predicates to an already-selected card set
pub fn apply_filters(cards: Vec<Card>, criteria: &FilterCriteria) -> Vec<Card> {
    cards
        .into_iter()
        .filter(|card| criteria.matches(card))
        .collect()
}

/// Select a user's cards with the exclusivity/multiplicity pre-filter stage,
/// then apply the text/rarity/pack predicates.
///
/// `unique_only` needs the comparison partner's quantities; without them it
/// degrades to the plain owned set.
pub fn filter_owned(
    catalog: &[Card],
    mine: &QuantityMap,
    theirs: Option<&QuantityMap>,
    criteria: &FilterCriteria,
) -> Vec<Card> {
    let base = if criteria.unique_only {
        match theirs {
            Some(theirs) => exclusive_to(catalog, mine, theirs),
            None => owned_by(catalog, mine),
        }
    } else if criteria.multiple_only {
        owned_multiple(catalog, mine)
    } else {
        owned_by(catalog, mine)
    };

    apply_filters(base, criteria)
}

/// Group cards by rarity, preserving input order within each group.
/// The key set is exactly the set of rarities present in the input.
pub fn group_by_rarity(cards: Vec<Card>) -> HashMap<String, Vec<Card>> {
    let mut groups: HashMap<String, Vec<Card>> = HashMap::new();
    for card in cards {
        groups.entry(card.rarity.clone()).or_default().push(card);
    }
    groups
}

/// Sorted union of two groupings' rarity keys, used to align the two
/// comparison columns row by row
pub fn union_rarity_keys(
    a: &HashMap<String, Vec<Card>>,
    b: &HashMap<String, Vec<Card>>,
) -> Vec<String> {
    let mut keys: Vec<String> = a.keys().chain(b.keys()).cloned().collect();
    keys.sort();
    keys.dedup();
    keys
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
