use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::availability_controller::AvailabilityController;
use crate::dto::availability_dto::{ResourceFreeQuery, ResourceFreeResponse};
use crate::dto::common_dto::ApiResponse;
use crate::models::ResourceKind;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_availability_router() -> Router<AppState> {
    Router::new().route("/:kind/:id/free", get(resource_free))
}

async fn resource_free(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Query(query): Query<ResourceFreeQuery>,
) -> Result<Json<ApiResponse<ResourceFreeResponse>>, AppError> {
    let kind: ResourceKind = kind.parse()?;
    let controller = AvailabilityController::new(state.engine);
    Ok(Json(controller.resource_free(kind, id, query).await?))
}
