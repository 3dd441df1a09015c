//! Rutas HTTP
//!
//! `/health` es pública; todo lo que cuelga de `/api` exige un token con las
//! sedes del llamador.

pub mod availability_routes;
pub mod occurrence_routes;
pub mod pattern_routes;
pub mod template_routes;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::json;

use crate::middleware::site_scope_middleware;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/patterns", pattern_routes::create_pattern_router())
        .nest("/templates", template_routes::create_template_router())
        .nest("/occurrences", occurrence_routes::create_occurrence_router())
        .nest("/bookings", occurrence_routes::create_booking_router())
        .nest("/resources", availability_routes::create_availability_router())
        .route_layer(from_fn_with_state(state.clone(), site_scope_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "tour-scheduling",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
