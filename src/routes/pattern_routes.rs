use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::pattern_controller::PatternController;
use crate::dto::common_dto::{ApiResponse, ListResponse};
use crate::dto::pattern_dto::{
    CreatePatternRequest, DateQuery, PatternAvailabilityResponse, PatternFilters,
    UpdatePatternRequest,
};
use crate::models::RecurrencePattern;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_pattern_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_patterns).post(create_pattern))
        .route(
            "/:id",
            get(get_pattern).put(update_pattern).delete(delete_pattern),
        )
        .route("/:id/availability", get(pattern_availability))
}

async fn create_pattern(
    State(state): State<AppState>,
    Json(request): Json<CreatePatternRequest>,
) -> Result<Json<ApiResponse<RecurrencePattern>>, AppError> {
    let controller = PatternController::new(state.engine);
    Ok(Json(controller.create(request).await?))
}

async fn list_patterns(
    State(state): State<AppState>,
    Query(filters): Query<PatternFilters>,
) -> Result<Json<ApiResponse<ListResponse<RecurrencePattern>>>, AppError> {
    let controller = PatternController::new(state.engine);
    Ok(Json(controller.list(filters).await?))
}

async fn get_pattern(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RecurrencePattern>>, AppError> {
    let controller = PatternController::new(state.engine);
    Ok(Json(controller.get(id).await?))
}

async fn update_pattern(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePatternRequest>,
) -> Result<Json<ApiResponse<RecurrencePattern>>, AppError> {
    let controller = PatternController::new(state.engine);
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_pattern(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RecurrencePattern>>, AppError> {
    let controller = PatternController::new(state.engine);
    Ok(Json(controller.delete(id).await?))
}

async fn pattern_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DateQuery>,
) -> Result<Json<ApiResponse<PatternAvailabilityResponse>>, AppError> {
    let controller = PatternController::new(state.engine);
    Ok(Json(controller.availability(id, query.date).await?))
}
