//! Tests for the collection diff and filter engine

use crate::catalog::{make_test_card, Card};
use crate::engine::*;
use std::collections::HashSet;

fn test_catalog() -> Vec<Card> {
    vec![
        make_test_card("a1-001", "Pikachu", "Common", "Base"),
        make_test_card("a1-002", "Charizard", "Rare", "Base"),
        make_test_card("a1-003", "Mewtwo", "Rare", "Genetic"),
        make_test_card("a1-004", "Squirtle", "Common", "Genetic"),
    ]
}

fn quantities(pairs: &[(&str, u32)]) -> QuantityMap {
    pairs
        .iter()
        .map(|(id, q)| (id.to_string(), *q))
        .collect()
}

#[test]
fn owned_by_skips_absent_and_zero() {
    let catalog = test_catalog();
    let mine = quantities(&[("a1-001", 2), ("a1-002", 0), ("a1-003", 1)]);

    let owned = owned_by(&catalog, &mine);
    let ids: Vec<&str> = owned.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["a1-001", "a1-003"]);
}

#[test]
fn owned_multiple_is_subset_of_owned_by() {
    let catalog = test_catalog();
    let mine = quantities(&[("a1-001", 3), ("a1-002", 1), ("a1-004", 2)]);

    let owned: HashSet<String> = owned_by(&catalog, &mine)
        .into_iter()
        .map(|c| c.id)
        .collect();
    let multiple: HashSet<String> = owned_multiple(&catalog, &mine)
        .into_iter()
        .map(|c| c.id)
        .collect();

    assert!(multiple.is_subset(&owned));
    assert_eq!(multiple.len(), 2);
}

#[test]
fn exclusive_sets_are_disjoint() {
    let catalog = test_catalog();
    let m1 = quantities(&[("a1-001", 1), ("a1-002", 2)]);
    let m2 = quantities(&[("a1-002", 1), ("a1-003", 1)]);

    let left: HashSet<String> = exclusive_to(&catalog, &m1, &m2)
        .into_iter()
        .map(|c| c.id)
        .collect();
    let right: HashSet<String> = exclusive_to(&catalog, &m2, &m1)
        .into_iter()
        .map(|c| c.id)
        .collect();

    assert!(left.is_disjoint(&right));
    assert_eq!(left, HashSet::from(["a1-001".to_string()]));
    assert_eq!(right, HashSet::from(["a1-003".to_string()]));
}

#[test]
fn exclusive_ignores_cards_owned_by_neither() {
    let catalog = test_catalog();
    let m1 = quantities(&[("a1-001", 1)]);
    let m2 = quantities(&[("a1-002", 1)]);

    let left = exclusive_to(&catalog, &m1, &m2);
    let right = exclusive_to(&catalog, &m2, &m1);

    // a1-003 and a1-004 are owned by neither and appear in neither result
    assert_eq!(left.len(), 1);
    assert_eq!(right.len(), 1);
}

#[test]
fn exclusive_treats_stored_zero_as_absent() {
    let catalog = test_catalog();
    let m1 = quantities(&[("a1-001", 1)]);
    let m2 = quantities(&[("a1-001", 0)]);

    let left = exclusive_to(&catalog, &m1, &m2);
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, "a1-001");
}

#[test]
fn empty_criteria_passes_everything() {
    let catalog = test_catalog();
    let filtered = apply_filters(catalog.clone(), &FilterCriteria::default());
    assert_eq!(filtered.len(), catalog.len());
}

#[test]
fn name_filter_is_case_insensitive_substring() {
    let catalog = test_catalog();
    let criteria = FilterCriteria {
        name_or_suffix: "chari".to_string(),
        ..Default::default()
    };

    let filtered = apply_filters(catalog, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "Charizard");
}

#[test]
fn id_suffix_matches_even_when_name_does_not() {
    let catalog = vec![
        make_test_card("a001", "Pikachu", "Common", "Base"),
        make_test_card("a002", "Charizard", "Rare", "Base"),
    ];
    let criteria = FilterCriteria {
        name_or_suffix: "001".to_string(),
        ..Default::default()
    };

    let filtered = apply_filters(catalog, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, "a001");
}

#[test]
fn whitespace_only_search_does_not_trigger_suffix_match() {
    let catalog = test_catalog();
    let criteria = FilterCriteria {
        name_or_suffix: "  ".to_string(),
        ..Default::default()
    };

    // The untrimmed text still drives the name predicate, and the trimmed
    // text is empty so the suffix disjunct never fires
    let filtered = apply_filters(catalog, &criteria);
    assert!(filtered.is_empty());
}

#[test]
fn rarity_and_pack_filters_are_exact_conjunction() {
    let catalog = test_catalog();
    let criteria = FilterCriteria {
        rarity: Some("Rare".to_string()),
        pack: Some("Genetic".to_string()),
        ..Default::default()
    };

    let filtered = apply_filters(catalog, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, "a1-003");
}

#[test]
fn empty_rarity_string_means_all() {
    let catalog = test_catalog();
    let criteria = FilterCriteria {
        rarity: Some(String::new()),
        pack: Some(String::new()),
        ..Default::default()
    };

    let filtered = apply_filters(catalog.clone(), &criteria);
    assert_eq!(filtered.len(), catalog.len());
}

#[test]
fn filter_owned_defaults_to_owned_set() {
    let catalog = test_catalog();
    let mine = quantities(&[("a1-001", 1), ("a1-003", 2)]);

    let cards = filter_owned(&catalog, &mine, None, &FilterCriteria::default());
    assert_eq!(cards.len(), 2);
}

#[test]
fn filter_owned_multiple_only_prefilters() {
    let catalog = test_catalog();
    let mine = quantities(&[("a1-001", 1), ("a1-003", 2)]);
    let criteria = FilterCriteria {
        multiple_only: true,
        ..Default::default()
    };

    let cards = filter_owned(&catalog, &mine, None, &criteria);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id, "a1-003");
}

#[test]
fn filter_owned_unique_only_uses_partner_map() {
    let catalog = test_catalog();
    let mine = quantities(&[("a1-001", 1), ("a1-002", 1)]);
    let theirs = quantities(&[("a1-002", 1)]);
    let criteria = FilterCriteria {
        unique_only: true,
        ..Default::default()
    };

    let cards = filter_owned(&catalog, &mine, Some(&theirs), &criteria);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id, "a1-001");

    // Without a partner map the flag degrades to the owned set
    let cards = filter_owned(&catalog, &mine, None, &criteria);
    assert_eq!(cards.len(), 2);
}

#[test]
fn prefilter_composes_with_text_filters() {
    let catalog = test_catalog();
    let mine = quantities(&[("a1-001", 2), ("a1-003", 2)]);
    let criteria = FilterCriteria {
        multiple_only: true,
        rarity: Some("Rare".to_string()),
        ..Default::default()
    };

    let cards = filter_owned(&catalog, &mine, None, &criteria);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id, "a1-003");
}

#[test]
fn group_by_rarity_preserves_input_order_within_groups() {
    let cards = vec![
        make_test_card("a1-002", "Charizard", "Rare", "Base"),
        make_test_card("a1-001", "Pikachu", "Common", "Base"),
        make_test_card("a1-003", "Mewtwo", "Rare", "Genetic"),
    ];

    let groups = group_by_rarity(cards);
    assert_eq!(groups.len(), 2);
    let rares: Vec<&str> = groups["Rare"].iter().map(|c| c.id.as_str()).collect();
    assert_eq!(rares, ["a1-002", "a1-003"]);
}

#[test]
fn group_then_flatten_reproduces_input_set() {
    let cards = test_catalog();
    let groups = group_by_rarity(cards.clone());

    let mut flattened: Vec<String> = groups
        .values()
        .flatten()
        .map(|c| c.id.clone())
        .collect();
    flattened.sort();

    let mut original: Vec<String> = cards.into_iter().map(|c| c.id).collect();
    original.sort();

    assert_eq!(flattened, original);
}

#[test]
fn union_rarity_keys_is_sorted_and_deduplicated() {
    let left = group_by_rarity(vec![
        make_test_card("a1-002", "Charizard", "Rare", "Base"),
        make_test_card("a1-001", "Pikachu", "Common", "Base"),
    ]);
    let right = group_by_rarity(vec![
        make_test_card("a1-003", "Mewtwo", "Rare", "Genetic"),
        make_test_card("a1-005", "Moltres", "Legendary", "Base"),
    ]);

    let keys = union_rarity_keys(&left, &right);
    assert_eq!(keys, ["Common", "Legendary", "Rare"]);
}

#[test]
fn union_rarity_keys_handles_empty_sides() {
    let left = group_by_rarity(vec![make_test_card("a1-001", "Pikachu", "Common", "Base")]);
    let right = group_by_rarity(Vec::new());

    assert_eq!(union_rarity_keys(&left, &right), ["Common"]);
    assert!(union_rarity_keys(&right, &right).is_empty());
}
