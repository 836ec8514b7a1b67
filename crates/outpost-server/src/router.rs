//! Axum router construction for the Outpost API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS and request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Outpost server.
///
/// See [`handlers`] for the route table. `GET /ws/events` streams game
/// events.
///
/// CORS is configured to allow any origin so a browser client on another
/// port can reach the API.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // WebSocket
        .route("/ws/events", get(ws::ws_events))
        // Catalog
        .route("/api/catalog", get(handlers::get_catalog))
        // Players
        .route("/api/players", post(handlers::create_player))
        .route(
            "/api/players/{id}",
            get(handlers::get_player).patch(handlers::patch_player),
        )
        .route("/api/players/{id}/equip", post(handlers::equip))
        .route("/api/players/{id}/unequip", post(handlers::unequip))
        .route("/api/players/{id}/biomes/{biome}", get(handlers::biome_view))
        // Inventory and storage
        .route("/api/players/{id}/inventory", get(handlers::get_inventory))
        .route("/api/players/{id}/storage", get(handlers::get_storage))
        .route(
            "/api/players/{id}/inventory/store-all",
            post(handlers::store_all),
        )
        .route(
            "/api/players/{id}/inventory/{row}/store",
            post(handlers::store_item),
        )
        .route(
            "/api/players/{id}/inventory/{row}/consume",
            post(handlers::consume_item),
        )
        .route(
            "/api/players/{id}/storage/{row}/withdraw",
            post(handlers::withdraw_item),
        )
        .route("/api/players/{id}/water/drink", post(handlers::drink_water))
        // Expeditions
        .route("/api/expeditions", post(handlers::start_expedition))
        .route(
            "/api/expeditions/estimate",
            post(handlers::estimate_expedition),
        )
        .route("/api/expeditions/{id}", get(handlers::get_expedition))
        .route("/api/expeditions/{id}/tick", post(handlers::tick_expedition))
        .route(
            "/api/expeditions/{id}/complete",
            post(handlers::complete_expedition),
        )
        .route(
            "/api/expeditions/{id}/cancel",
            post(handlers::cancel_expedition),
        )
        // Auto-repeat
        .route(
            "/api/players/{id}/auto-repeat",
            get(handlers::list_auto_repeat),
        )
        .route(
            "/api/players/{id}/auto-repeat/{biome}",
            post(handlers::toggle_auto_repeat),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
