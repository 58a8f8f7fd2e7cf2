//! Database operations for the collection tracker
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Quantity mutations are atomic server-side updates so two concurrent
//! increments for the same card cannot lose an update.

use crate::engine::QuantityMap;
use crate::error::{Result, TrackerError};
use crate::friend_id;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// Result type for plain database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// A user's public profile, keyed internally by the opaque account id and
/// externally by the shareable friend ID
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: String,
    pub friend_id: String,
    pub nickname: String,
    pub last_updated: String,
}

/// Summary counters for a collection (shown on the public profile page)
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    /// Number of distinct cards owned
    pub distinct_cards: u32,
    /// Sum of all owned quantities
    pub total_quantity: u32,
}

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `profiles`: friend ID and nickname per account
/// - `owned_cards`: per-user card quantities (quantity zero = row absent)
/// - `friend_comparisons`: one row per unordered pair of compared friend IDs
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        -- Public profiles. friend_id is UNIQUE so concurrent claims of the
        -- same ID cannot both succeed; the pre-write check only exists to
        -- produce a friendly conflict message.
        CREATE TABLE IF NOT EXISTS profiles (
            user_id      TEXT NOT NULL PRIMARY KEY,
            friend_id    TEXT NOT NULL UNIQUE,
            nickname     TEXT NOT NULL,
            last_updated TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Owned-card quantities. A quantity of zero is represented by the
        -- absence of the row, never stored.
        CREATE TABLE IF NOT EXISTS owned_cards (
            user_id      TEXT NOT NULL,
            card_id      TEXT NOT NULL,
            quantity     INTEGER NOT NULL CHECK (quantity > 0),
            last_updated TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, card_id)
        );

        CREATE INDEX IF NOT EXISTS idx_owned_cards_user ON owned_cards(user_id);

        -- Comparison history, keyed by the sorted participant pair so the
        -- same two friends produce exactly one row regardless of order.
        CREATE TABLE IF NOT EXISTS friend_comparisons (
            participant_low  TEXT NOT NULL,
            participant_high TEXT NOT NULL,
            friend_id_1      TEXT NOT NULL,
            friend_id_2      TEXT NOT NULL,
            compared_at      TEXT NOT NULL,
            PRIMARY KEY (participant_low, participant_high)
        );
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

// ── Quantity-map repository ────────────────────────────────────────────────

/// Fetch a user's full quantity map. Users with no rows get an empty map.
pub fn fetch_quantities(conn: &Connection, user_id: &str) -> DbResult<QuantityMap> {
    let mut stmt =
        conn.prepare_cached("SELECT card_id, quantity FROM owned_cards WHERE user_id = ?1")?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
    })?;
    rows.collect()
}

/// Fetch a quantity map by friend ID.
///
/// Returns `None` when no profile exists for the friend ID, and
/// `Some(empty map)` when the profile exists but owns nothing. The two cases
/// are deliberately distinguishable.
pub fn fetch_quantities_by_friend_id(
    conn: &Connection,
    friend_id: &str,
) -> DbResult<Option<QuantityMap>> {
    match get_profile_by_friend_id(conn, friend_id)? {
        Some(profile) => Ok(Some(fetch_quantities(conn, &profile.user_id)?)),
        None => Ok(None),
    }
}

/// Add one copy of a card to a user's collection.
///
/// A single upsert statement, so the increment happens server-side and never
/// races against a stale read. Returns the new quantity.
pub fn increment_quantity(conn: &Connection, user_id: &str, card_id: &str) -> DbResult<u32> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO owned_cards (user_id, card_id, quantity, last_updated)
         VALUES (?1, ?2, 1, datetime('now'))
         ON CONFLICT (user_id, card_id)
         DO UPDATE SET quantity = quantity + 1, last_updated = datetime('now')",
    )?;
    stmt.execute(params![user_id, card_id])?;

    conn.query_row(
        "SELECT quantity FROM owned_cards WHERE user_id = ?1 AND card_id = ?2",
        params![user_id, card_id],
        |row| row.get(0),
    )
}

/// Remove one copy of a card from a user's collection.
///
/// The last copy removes the row entirely (zero is represented by absence);
/// decrementing an absent card is a no-op. Returns the new quantity, 0 when
/// the row is gone.
pub fn decrement_quantity(conn: &mut Connection, user_id: &str, card_id: &str) -> DbResult<u32> {
    let tx = conn.transaction()?;

    let updated = tx.execute(
        "UPDATE owned_cards
         SET quantity = quantity - 1, last_updated = datetime('now')
         WHERE user_id = ?1 AND card_id = ?2 AND quantity > 1",
        params![user_id, card_id],
    )?;

    let quantity = if updated > 0 {
        tx.query_row(
            "SELECT quantity FROM owned_cards WHERE user_id = ?1 AND card_id = ?2",
            params![user_id, card_id],
            |row| row.get(0),
        )?
    } else {
        // Either the row holds the last copy or it does not exist at all;
        // the DELETE covers the former and is a no-op for the latter.
        tx.execute(
            "DELETE FROM owned_cards WHERE user_id = ?1 AND card_id = ?2",
            params![user_id, card_id],
        )?;
        0
    };

    tx.commit()?;
    Ok(quantity)
}

/// Delete a user's entire collection (account-deletion flow)
pub fn delete_collection(conn: &Connection, user_id: &str) -> DbResult<usize> {
    let deleted = conn.execute(
        "DELETE FROM owned_cards WHERE user_id = ?1",
        params![user_id],
    )?;
    if deleted > 0 {
        log::info!("Deleted {} owned-card rows for user {}", deleted, user_id);
    }
    Ok(deleted)
}

/// Distinct-card and total-quantity counters for a user's collection
pub fn collection_stats(conn: &Connection, user_id: &str) -> DbResult<CollectionStats> {
    conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(quantity), 0) FROM owned_cards WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(CollectionStats {
                distinct_cards: row.get(0)?,
                total_quantity: row.get(1)?,
            })
        },
    )
}

// ── Profile repository ─────────────────────────────────────────────────────

fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        user_id: row.get(0)?,
        friend_id: row.get(1)?,
        nickname: row.get(2)?,
        last_updated: row.get(3)?,
    })
}

/// Look up a profile by the internal account id
pub fn get_profile(conn: &Connection, user_id: &str) -> DbResult<Option<Profile>> {
    conn.query_row(
        "SELECT user_id, friend_id, nickname, last_updated
         FROM profiles WHERE user_id = ?1",
        params![user_id],
        profile_from_row,
    )
    .optional()
}

/// Look up a profile by the public friend ID
pub fn get_profile_by_friend_id(conn: &Connection, friend_id: &str) -> DbResult<Option<Profile>> {
    conn.query_row(
        "SELECT user_id, friend_id, nickname, last_updated
         FROM profiles WHERE friend_id = ?1",
        params![friend_id],
        profile_from_row,
    )
    .optional()
}

/// Create or update a user's profile.
///
/// Validates the friend-ID format, then rejects friend IDs that already
/// belong to a different account. The UNIQUE column backs the check, so a
/// lost race surfaces as the same conflict error instead of a silent
/// overwrite.
pub fn upsert_profile(
    conn: &Connection,
    user_id: &str,
    friend_id: &str,
    nickname: &str,
) -> Result<Profile> {
    if !friend_id::is_valid(friend_id) {
        return Err(TrackerError::InvalidFriendId(friend_id.to_string()));
    }

    if let Some(existing) = get_profile_by_friend_id(conn, friend_id)? {
        if existing.user_id != user_id {
            return Err(TrackerError::FriendIdTaken(friend_id.to_string()));
        }
    }

    let now = chrono::Utc::now().to_rfc3339();
    let result = conn.execute(
        "INSERT INTO profiles (user_id, friend_id, nickname, last_updated)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (user_id)
         DO UPDATE SET friend_id = excluded.friend_id,
                       nickname = excluded.nickname,
                       last_updated = excluded.last_updated",
        params![user_id, friend_id, nickname, now],
    );

    match result {
        Ok(_) => Ok(Profile {
            user_id: user_id.to_string(),
            friend_id: friend_id.to_string(),
            nickname: nickname.to_string(),
            last_updated: now,
        }),
        Err(e) if is_unique_violation(&e) => Err(TrackerError::FriendIdTaken(friend_id.to_string())),
        Err(e) => Err(TrackerError::Database(e)),
    }
}

/// Delete a user's profile.
///
/// Does not cascade to `owned_cards`; the account-deletion flow calls
/// [`delete_collection`] separately. Returns whether a profile existed.
pub fn delete_profile(conn: &Connection, user_id: &str) -> DbResult<bool> {
    let deleted = conn.execute("DELETE FROM profiles WHERE user_id = ?1", params![user_id])?;
    Ok(deleted > 0)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ── Comparison history ─────────────────────────────────────────────────────

/// Record that two friends were compared.
///
/// The participant pair is sorted before the keyed upsert, so comparing in
/// either order updates the same row and only the timestamp (and the
/// as-requested order columns) move on repeat comparisons.
pub fn record_comparison(conn: &Connection, friend_id_1: &str, friend_id_2: &str) -> DbResult<()> {
    let (low, high) = if friend_id_1 <= friend_id_2 {
        (friend_id_1, friend_id_2)
    } else {
        (friend_id_2, friend_id_1)
    };

    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO friend_comparisons
             (participant_low, participant_high, friend_id_1, friend_id_2, compared_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (participant_low, participant_high)
         DO UPDATE SET friend_id_1 = excluded.friend_id_1,
                       friend_id_2 = excluded.friend_id_2,
                       compared_at = excluded.compared_at",
        params![low, high, friend_id_1, friend_id_2, now],
    )?;
    Ok(())
}

/// Get total count of recorded comparisons
pub fn get_comparison_count(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM friend_comparisons", [], |row| {
        row.get(0)
    })
}
