//! Card catalog loading and derived filter dimensions
//!
//! The catalog is a static JSON document (an array of card records) kept
//! current out-of-band via `--sync-catalog`. It is loaded once at startup and
//! read-only for the lifetime of the process.

use crate::error::{Result, TrackerError};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Upstream catalog dataset
const CATALOG_URL: &str =
    "https://raw.githubusercontent.com/chase-manning/pokemon-tcg-pocket-cards/refs/heads/main/v4.json";

/// A single catalog entry. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub rarity: String,
    pub pack: String,
    /// Upstream stores health as a string; non-numeric values become 0
    #[serde(deserialize_with = "de_health")]
    pub health: u32,
    pub artist: String,
    /// Upstream stores the EX flag as "Yes"/"No"
    #[serde(rename = "ex", deserialize_with = "de_ex")]
    pub is_ex: bool,
    pub image: String,
}

impl Card {
    /// Last three characters of the card id, used as a display/search suffix
    pub fn id_suffix(&self) -> &str {
        match self.id.char_indices().rev().nth(2) {
            Some((idx, _)) => &self.id[idx..],
            None => &self.id,
        }
    }
}

fn de_health<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        // Trainer and supporter cards have no health value
        Raw::Text(s) => Ok(s.trim().parse().unwrap_or(0)),
    }
}

fn de_ex<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Flag(b) => Ok(b),
        Raw::Text(s) => Ok(s.eq_ignore_ascii_case("yes")),
    }
}

/// In-memory card catalog with id lookup and cached filter dimensions
pub struct CardCatalog {
    cards: Vec<Card>,
    index: HashMap<String, usize>,
    rarities: Vec<String>,
    packs: Vec<String>,
}

impl CardCatalog {
    fn from_cards(cards: Vec<Card>) -> Self {
        let index = cards
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        let rarities = distinct(cards.iter().map(|c| c.rarity.as_str()));
        let packs = distinct(cards.iter().map(|c| c.pack.as_str()));

        Self {
            cards,
            index,
            rarities,
            packs,
        }
    }

    /// Load the catalog from a local JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cards: Vec<Card> = serde_json::from_str(&data)?;
        log::info!("Loaded {} cards from {}", cards.len(), path.display());
        Ok(Self::from_cards(cards))
    }

    /// Fetch the current catalog from the upstream dataset (async)
    pub async fn fetch() -> Result<Self> {
        log::info!("Fetching card catalog from upstream...");

        let client = reqwest::Client::new();
        let response = client
            .get(CATALOG_URL)
            .header("User-Agent", "pocket_tracker/1.0")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TrackerError::HttpStatus(response.status()));
        }

        let cards: Vec<Card> = response.json().await?;
        log::info!("Fetched {} cards", cards.len());
        Ok(Self::from_cards(cards))
    }

    /// Write the catalog back to disk as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.cards)?;
        std::fs::write(path, data)?;
        log::info!("Wrote {} cards to {}", self.cards.len(), path.display());
        Ok(())
    }

    /// Look up a card by its catalog id
    pub fn get(&self, card_id: &str) -> Option<&Card> {
        self.index.get(card_id).map(|&i| &self.cards[i])
    }

    /// All cards in catalog order
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Get the total number of cards
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Distinct rarities, in first-appearance order
    pub fn rarities(&self) -> &[String] {
        &self.rarities
    }

    /// Distinct packs, in first-appearance order
    pub fn packs(&self) -> &[String] {
        &self.packs
    }

    /// Iterate over all cards
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Create a CardCatalog from entries (for testing)
    #[cfg(test)]
    pub fn from_entries(cards: Vec<Card>) -> Self {
        Self::from_cards(cards)
    }
}

/// Deduplicate while preserving first-appearance order
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

#[cfg(test)]
pub use tests::make_test_card;
