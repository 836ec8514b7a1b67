//! REST API endpoint handlers for the Outpost server.
//!
//! Each handler parses its path and body, locks the game for one
//! operation, and returns the result as JSON.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness |
//! | `GET` | `/api/catalog` | Resources, equipment, biomes |
//! | `POST` | `/api/players` | Create a player |
//! | `GET` | `/api/players/{id}` | Player with capacity usage |
//! | `PATCH` | `/api/players/{id}` | Clamped stat deltas |
//! | `POST` | `/api/players/{id}/equip` | Equip an item |
//! | `POST` | `/api/players/{id}/unequip` | Empty a slot |
//! | `GET` | `/api/players/{id}/inventory` | Inventory rows |
//! | `GET` | `/api/players/{id}/storage` | Storage rows |
//! | `POST` | `/api/players/{id}/inventory/{row}/store` | Move to storage |
//! | `POST` | `/api/players/{id}/storage/{row}/withdraw` | Move to inventory |
//! | `POST` | `/api/players/{id}/inventory/store-all` | Store everything unequipped |
//! | `POST` | `/api/players/{id}/inventory/{row}/consume` | Eat or drink |
//! | `POST` | `/api/players/{id}/water/drink` | Drink from the water counter |
//! | `GET` | `/api/players/{id}/biomes/{biome}` | Biome with gating flags |
//! | `POST` | `/api/expeditions` | Start an expedition |
//! | `POST` | `/api/expeditions/estimate` | Manual run estimate |
//! | `GET` | `/api/expeditions/{id}` | Read an expedition |
//! | `POST` | `/api/expeditions/{id}/tick` | One simulation step |
//! | `POST` | `/api/expeditions/{id}/complete` | Finish and deposit |
//! | `POST` | `/api/expeditions/{id}/cancel` | Abandon |
//! | `POST` | `/api/players/{id}/auto-repeat/{biome}` | Toggle auto-repeat |
//! | `GET` | `/api/players/{id}/auto-repeat` | List auto-repeat settings |

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use outpost_core::ExpeditionPlan;
use outpost_inventory::PlayerPatch;
use outpost_types::{
    BiomeId, EquipmentSlot, ExpeditionId, InventoryItemId, ItemId, PlayerId, StorageItemId,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body for `POST /api/players`.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePlayerRequest {
    /// Display name; a default is used when absent or blank.
    #[serde(default)]
    pub name: Option<String>,
}

/// Body carrying a quantity. Kept as raw JSON so any malformed value is
/// reported as `InvalidQuantity`.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    /// Units to move, consume, or drink.
    #[serde(default, alias = "amount")]
    pub quantity: Value,
}

/// Body for `POST /api/players/{id}/equip`.
#[derive(Debug, Deserialize)]
pub struct EquipRequest {
    /// Catalog id of the equipment.
    pub item_id: ItemId,
}

/// Body for `POST /api/players/{id}/unequip`.
#[derive(Debug, Deserialize)]
pub struct UnequipRequest {
    /// Slot to empty.
    pub slot: EquipmentSlot,
}

/// Body for `POST /api/expeditions/estimate`.
#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    /// Target quantity per resource.
    pub targets: BTreeMap<ItemId, u32>,
    /// Run length in minutes.
    pub duration_minutes: u32,
}

// ---------------------------------------------------------------------------
// Health and catalog
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Every resource, piece of equipment, and biome.
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let game = state.game.lock().await;
    let catalog = game.catalog();
    let resources: Vec<_> = catalog.resources().collect();
    let equipment: Vec<_> = catalog.all_equipment().collect();
    let biomes: Vec<_> = catalog.biomes().collect();
    Json(serde_json::json!({
        "resources": resources,
        "equipment": equipment,
        "biomes": biomes,
    }))
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Create a player.
pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePlayerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.game.lock().await.create_player(body.name)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// A player with capacity usage.
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    Ok(Json(state.game.lock().await.player(id)?))
}

/// Apply clamped stat deltas.
pub async fn patch_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<PlayerPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    Ok(Json(state.game.lock().await.patch_player(id, &patch)?))
}

/// Equip a carried item.
pub async fn equip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<EquipRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    Ok(Json(state.game.lock().await.equip(id, &body.item_id)?))
}

/// Empty an equipment slot.
pub async fn unequip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UnequipRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    Ok(Json(state.game.lock().await.unequip(id, body.slot)?))
}

// ---------------------------------------------------------------------------
// Inventory and storage
// ---------------------------------------------------------------------------

/// Inventory rows with capacity usage.
pub async fn get_inventory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    Ok(Json(state.game.lock().await.inventory(id)?))
}

/// Storage rows.
pub async fn get_storage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    let items = state.game.lock().await.storage(id)?;
    Ok(Json(serde_json::json!({
        "count": items.len(),
        "items": items,
    })))
}

/// Move units of an inventory row into storage.
pub async fn store_item(
    State(state): State<Arc<AppState>>,
    Path((id, row)): Path<(String, String)>,
    Json(body): Json<QuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    let row = InventoryItemId::from(parse_uuid(&row)?);
    let quantity = parse_quantity(&body.quantity)?;
    Ok(Json(state.game.lock().await.move_to_storage(id, row, quantity)?))
}

/// Move units of a storage row into inventory.
pub async fn withdraw_item(
    State(state): State<Arc<AppState>>,
    Path((id, row)): Path<(String, String)>,
    Json(body): Json<QuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    let row = StorageItemId::from(parse_uuid(&row)?);
    let quantity = parse_quantity(&body.quantity)?;
    Ok(Json(state.game.lock().await.withdraw(id, row, quantity)?))
}

/// Move every unequipped inventory row into storage.
pub async fn store_all(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    Ok(Json(state.game.lock().await.store_all(id)?))
}

/// Eat or drink units of an inventory row.
pub async fn consume_item(
    State(state): State<Arc<AppState>>,
    Path((id, row)): Path<(String, String)>,
    Json(body): Json<QuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    let row = InventoryItemId::from(parse_uuid(&row)?);
    let quantity = parse_quantity(&body.quantity)?;
    Ok(Json(state.game.lock().await.consume(id, row, quantity)?))
}

/// Drink from the water counter.
pub async fn drink_water(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<QuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    let amount = parse_quantity(&body.quantity)?;
    Ok(Json(state.game.lock().await.drink_water(id, amount)?))
}

/// A biome's resources with per-player gating flags.
pub async fn biome_view(
    State(state): State<Arc<AppState>>,
    Path((id, biome)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    let biome = BiomeId::new(biome);
    let resources = state.game.lock().await.biome_view(id, &biome)?;
    Ok(Json(serde_json::json!({
        "biome_id": biome,
        "resources": resources,
    })))
}

// ---------------------------------------------------------------------------
// Expeditions
// ---------------------------------------------------------------------------

/// Start an expedition.
pub async fn start_expedition(
    State(state): State<Arc<AppState>>,
    Json(plan): Json<ExpeditionPlan>,
) -> Result<impl IntoResponse, ApiError> {
    let expedition = state.game.lock().await.start_expedition(&plan)?;
    Ok((StatusCode::CREATED, Json(expedition)))
}

/// Reward and cost of a manual run.
pub async fn estimate_expedition(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EstimateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let game = state.game.lock().await;
    Ok(Json(game.estimate(&body.targets, body.duration_minutes)?))
}

/// Read one expedition.
pub async fn get_expedition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ExpeditionId::from(parse_uuid(&id)?);
    Ok(Json(state.game.lock().await.expedition(id)?))
}

/// Advance one expedition by one tick.
pub async fn tick_expedition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ExpeditionId::from(parse_uuid(&id)?);
    Ok(Json(state.game.lock().await.tick_expedition(id)?))
}

/// Finish an expedition and deposit its haul.
pub async fn complete_expedition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ExpeditionId::from(parse_uuid(&id)?);
    Ok(Json(state.game.lock().await.complete_expedition(id)?))
}

/// Abandon an expedition.
pub async fn cancel_expedition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ExpeditionId::from(parse_uuid(&id)?);
    Ok(Json(state.game.lock().await.cancel_expedition(id)?))
}

// ---------------------------------------------------------------------------
// Auto-repeat
// ---------------------------------------------------------------------------

/// Toggle auto-repeat for a biome.
pub async fn toggle_auto_repeat(
    State(state): State<Arc<AppState>>,
    Path((id, biome)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    let biome = BiomeId::new(biome);
    Ok(Json(state.game.lock().await.toggle_auto_repeat(id, &biome)?))
}

/// A player's auto-repeat settings.
pub async fn list_auto_repeat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = PlayerId::from(parse_uuid(&id)?);
    let settings = state.game.lock().await.auto_repeat_settings(id)?;
    Ok(Json(serde_json::json!({
        "count": settings.len(),
        "settings": settings,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a UUID from a string, returning an [`ApiError`] on failure.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidId(format!("{s}: {e}")))
}

/// Accept only a JSON integer in `1..=u32::MAX`.
pub(crate) fn parse_quantity(value: &Value) -> Result<u32, ApiError> {
    value
        .as_u64()
        .filter(|q| *q > 0)
        .and_then(|q| u32::try_from(q).ok())
        .ok_or_else(|| ApiError::InvalidQuantity(value.to_string()))
}
