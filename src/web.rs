//! HTTP API for the collection tracker
//!
//! Exposes the catalog browse, collection, profile, and comparison surfaces
//! as JSON endpoints. Rendering is the client's job; this layer only wires
//! the repositories and the diff/filter engine together.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::catalog::{Card, CardCatalog};
use crate::database::{self, CollectionStats, Profile};
use crate::engine::{self, FilterCriteria, QuantityMap};
use crate::error::TrackerError;
use crate::friend_id;

/// Shared application state (thread-safe database connection + catalog)
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    catalog: Arc<CardCatalog>,
}

/// Filter query parameters, shared by the browse/profile/compare endpoints
#[derive(Deserialize)]
struct FilterParams {
    #[serde(default)]
    name: String,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default)]
    pack: Option<String>,
    #[serde(default)]
    unique_only: bool,
    #[serde(default)]
    multiple_only: bool,
}

impl FilterParams {
    fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            name_or_suffix: self.name,
            rarity: self.rarity,
            pack: self.pack,
            unique_only: self.unique_only,
            multiple_only: self.multiple_only,
        }
    }
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// Error reply: status code plus the envelope with a message
type ApiError = (StatusCode, Json<ApiResponse<()>>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
}

fn tracker_error(err: TrackerError) -> ApiError {
    let status = match err {
        TrackerError::InvalidFriendId(_) => StatusCode::BAD_REQUEST,
        TrackerError::FriendIdTaken(_) => StatusCode::CONFLICT,
        TrackerError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
        _ => {
            log::error!("Internal error: {}", err);
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };
    api_error(status, err.to_string())
}

fn db_error(err: rusqlite::Error) -> ApiError {
    log::error!("Database error: {}", err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn check_friend_id(candidate: &str) -> Result<(), ApiError> {
    if friend_id::is_valid(candidate) {
        Ok(())
    } else {
        Err(tracker_error(TrackerError::InvalidFriendId(
            candidate.to_string(),
        )))
    }
}

/// Filter dimensions for the browse dropdowns
#[derive(Serialize)]
struct FilterOptions {
    rarities: Vec<String>,
    packs: Vec<String>,
}

/// New quantity after an increment/decrement
#[derive(Serialize)]
struct QuantityUpdate {
    card_id: String,
    quantity: u32,
}

/// Public profile page payload
#[derive(Serialize)]
struct PublicProfile {
    profile: Profile,
    stats: CollectionStats,
    cards: Vec<Card>,
}

/// Side-by-side comparison payload; `rarities` is the sorted union of both
/// groupings' keys so the client can align the two columns row by row
#[derive(Serialize)]
struct Comparison {
    user1_name: String,
    user2_name: String,
    rarities: Vec<String>,
    left: HashMap<String, Vec<Card>>,
    right: HashMap<String, Vec<Card>>,
}

/// GET /api/cards?name=&rarity=&pack=
async fn browse_cards_handler(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Json<ApiResponse<Vec<Card>>> {
    let criteria = params.into_criteria();
    let cards = engine::apply_filters(state.catalog.cards().to_vec(), &criteria);
    ApiResponse::ok(cards)
}

/// GET /api/filters
async fn filter_options_handler(State(state): State<AppState>) -> Json<ApiResponse<FilterOptions>> {
    ApiResponse::ok(FilterOptions {
        rarities: state.catalog.rarities().to_vec(),
        packs: state.catalog.packs().to_vec(),
    })
}

/// GET /api/users/{user_id}/collection
async fn collection_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<QuantityMap>>, ApiError> {
    let conn = state.db.lock().unwrap();
    let quantities = database::fetch_quantities(&conn, &user_id).map_err(db_error)?;
    Ok(ApiResponse::ok(quantities))
}

/// POST /api/users/{user_id}/collection/{card_id}/increment
async fn increment_handler(
    State(state): State<AppState>,
    Path((user_id, card_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<QuantityUpdate>>, ApiError> {
    if state.catalog.get(&card_id).is_none() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Unknown card id: {}", card_id),
        ));
    }

    let conn = state.db.lock().unwrap();
    let quantity = database::increment_quantity(&conn, &user_id, &card_id).map_err(db_error)?;
    Ok(ApiResponse::ok(QuantityUpdate { card_id, quantity }))
}

/// POST /api/users/{user_id}/collection/{card_id}/decrement
async fn decrement_handler(
    State(state): State<AppState>,
    Path((user_id, card_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<QuantityUpdate>>, ApiError> {
    if state.catalog.get(&card_id).is_none() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Unknown card id: {}", card_id),
        ));
    }

    let mut conn = state.db.lock().unwrap();
    let quantity = database::decrement_quantity(&mut conn, &user_id, &card_id).map_err(db_error)?;
    Ok(ApiResponse::ok(QuantityUpdate { card_id, quantity }))
}

/// Profile upsert body
#[derive(Deserialize)]
struct ProfileUpdate {
    friend_id: String,
    nickname: String,
}

/// GET /api/users/{user_id}/profile
async fn own_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let conn = state.db.lock().unwrap();
    match database::get_profile(&conn, &user_id).map_err(db_error)? {
        Some(profile) => Ok(ApiResponse::ok(profile)),
        None => Err(api_error(StatusCode::NOT_FOUND, "No profile yet")),
    }
}

/// PUT /api/users/{user_id}/profile
async fn update_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let conn = state.db.lock().unwrap();
    let profile = database::upsert_profile(&conn, &user_id, &update.friend_id, &update.nickname)
        .map_err(tracker_error)?;
    Ok(ApiResponse::ok(profile))
}

/// DELETE /api/users/{user_id}/profile
///
/// Part of the account-deletion flow: removes the profile and the owned-card
/// collection together.
async fn delete_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let conn = state.db.lock().unwrap();
    database::delete_profile(&conn, &user_id).map_err(db_error)?;
    database::delete_collection(&conn, &user_id).map_err(db_error)?;
    Ok(ApiResponse::ok(()))
}

/// GET /api/profiles/{friend_id}?name=&rarity=&pack=
async fn public_profile_handler(
    State(state): State<AppState>,
    Path(friend_id): Path<String>,
    Query(params): Query<FilterParams>,
) -> Result<Json<ApiResponse<PublicProfile>>, ApiError> {
    check_friend_id(&friend_id)?;

    let conn = state.db.lock().unwrap();
    let profile = database::get_profile_by_friend_id(&conn, &friend_id)
        .map_err(db_error)?
        .ok_or_else(|| tracker_error(TrackerError::ProfileNotFound(friend_id.clone())))?;

    let quantities = database::fetch_quantities(&conn, &profile.user_id).map_err(db_error)?;
    let stats = database::collection_stats(&conn, &profile.user_id).map_err(db_error)?;

    let criteria = params.into_criteria();
    let cards = engine::filter_owned(state.catalog.cards(), &quantities, None, &criteria);

    Ok(ApiResponse::ok(PublicProfile {
        profile,
        stats,
        cards,
    }))
}

/// GET /api/compare/{friend_id1}/{friend_id2}?name=&rarity=&pack=
///
/// Each side shows what that friend owns exclusively, filtered and grouped by
/// rarity. A friend ID without a profile is a 404, distinct from a friend
/// who owns nothing.
async fn compare_handler(
    State(state): State<AppState>,
    Path((friend_id_1, friend_id_2)): Path<(String, String)>,
    Query(params): Query<FilterParams>,
) -> Result<Json<ApiResponse<Comparison>>, ApiError> {
    check_friend_id(&friend_id_1)?;
    check_friend_id(&friend_id_2)?;

    let conn = state.db.lock().unwrap();
    let profile_1 = database::get_profile_by_friend_id(&conn, &friend_id_1)
        .map_err(db_error)?
        .ok_or_else(|| tracker_error(TrackerError::ProfileNotFound(friend_id_1.clone())))?;
    let profile_2 = database::get_profile_by_friend_id(&conn, &friend_id_2)
        .map_err(db_error)?
        .ok_or_else(|| tracker_error(TrackerError::ProfileNotFound(friend_id_2.clone())))?;

    let quantities_1 = database::fetch_quantities(&conn, &profile_1.user_id).map_err(db_error)?;
    let quantities_2 = database::fetch_quantities(&conn, &profile_2.user_id).map_err(db_error)?;

    let criteria = params.into_criteria();
    let catalog = state.catalog.cards();
    let left_cards = engine::apply_filters(
        engine::exclusive_to(catalog, &quantities_1, &quantities_2),
        &criteria,
    );
    let right_cards = engine::apply_filters(
        engine::exclusive_to(catalog, &quantities_2, &quantities_1),
        &criteria,
    );

    let left = engine::group_by_rarity(left_cards);
    let right = engine::group_by_rarity(right_cards);
    let rarities = engine::union_rarity_keys(&left, &right);

    if let Err(e) = database::record_comparison(&conn, &friend_id_1, &friend_id_2) {
        // History is best-effort; the comparison itself still succeeds
        log::warn!("Failed to record comparison: {}", e);
    }

    Ok(ApiResponse::ok(Comparison {
        user1_name: profile_1.nickname,
        user2_name: profile_2.nickname,
        rarities,
        left,
        right,
    }))
}

/// Build the API router
pub fn create_router(db: Arc<Mutex<Connection>>, catalog: Arc<CardCatalog>) -> Router {
    let state = AppState { db, catalog };

    Router::new()
        .route("/api/cards", get(browse_cards_handler))
        .route("/api/filters", get(filter_options_handler))
        .route("/api/users/{user_id}/collection", get(collection_handler))
        .route(
            "/api/users/{user_id}/collection/{card_id}/increment",
            post(increment_handler),
        )
        .route(
            "/api/users/{user_id}/collection/{card_id}/decrement",
            post(decrement_handler),
        )
        .route(
            "/api/users/{user_id}/profile",
            get(own_profile_handler)
                .put(update_profile_handler)
                .delete(delete_profile_handler),
        )
        .route("/api/profiles/{friend_id}", get(public_profile_handler))
        .route(
            "/api/compare/{friend_id1}/{friend_id2}",
            get(compare_handler),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server (async)
///
/// Binds to 0.0.0.0 (all interfaces) to work with Docker port mapping.
/// Use firewall rules or port mapping to control external exposure.
pub async fn serve(
    db: Arc<Mutex<Connection>>,
    catalog: Arc<CardCatalog>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(db, catalog);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
