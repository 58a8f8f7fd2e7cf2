//! Pocket Tracker - TCG Pocket collection tracker
//!
//! Tracks per-user owned-card quantities over a fixed card catalog, publishes
//! public profiles keyed by a shareable friend ID, and compares two users'
//! collections (exclusive sets, grouped by rarity).

pub mod catalog;
pub mod database;
pub mod engine;
pub mod error;
pub mod friend_id;
pub mod web;

pub use catalog::{Card, CardCatalog};
pub use database::{init_schema, CollectionStats, Profile};
pub use engine::{FilterCriteria, QuantityMap};
pub use error::{Result, TrackerError};
