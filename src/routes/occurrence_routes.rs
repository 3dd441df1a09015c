use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::occurrence_controller::OccurrenceController;
use crate::dto::common_dto::{ApiResponse, ListResponse};
use crate::dto::occurrence_dto::{AvailableQuery, BookingRequest, OccurrenceDetailResponse};
use crate::dto::template_dto::{AssignDriverRequest, ChangeStatusRequest};
use crate::models::{Occurrence, Reservation, ScheduleFilter, SeatAvailability, SiteScope};
use crate::services::BookableOccurrence;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_occurrence_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_occurrences))
        .route("/available", get(available_occurrences))
        .route("/:id", get(get_occurrence))
        .route("/:id/status", patch(change_occurrence_status))
        .route("/:id/driver", put(reassign_driver))
        .route("/:id/seats", get(occurrence_seats))
        .route("/:id/bookings", post(book_seats))
}

pub fn create_booking_router() -> Router<AppState> {
    Router::new().route("/:id", delete(release_booking))
}

async fn list_occurrences(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Query(filter): Query<ScheduleFilter>,
) -> Result<Json<ApiResponse<ListResponse<Occurrence>>>, AppError> {
    let controller = OccurrenceController::new(state.engine);
    Ok(Json(controller.list(&scope, filter).await?))
}

async fn available_occurrences(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<ApiResponse<ListResponse<BookableOccurrence>>>, AppError> {
    let controller = OccurrenceController::new(state.engine);
    Ok(Json(controller.available(&scope, query).await?))
}

async fn get_occurrence(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OccurrenceDetailResponse>>, AppError> {
    let controller = OccurrenceController::new(state.engine);
    Ok(Json(controller.get(&scope, id).await?))
}

async fn change_occurrence_status(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<Occurrence>>, AppError> {
    let controller = OccurrenceController::new(state.engine);
    Ok(Json(controller.change_status(&scope, id, request).await?))
}

async fn reassign_driver(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignDriverRequest>,
) -> Result<Json<ApiResponse<Occurrence>>, AppError> {
    let controller = OccurrenceController::new(state.engine);
    Ok(Json(controller.reassign_driver(&scope, id, request).await?))
}

async fn occurrence_seats(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SeatAvailability>>, AppError> {
    let controller = OccurrenceController::new(state.engine);
    Ok(Json(controller.seats(&scope, id).await?))
}

async fn book_seats(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<ApiResponse<Reservation>>, AppError> {
    let controller = OccurrenceController::new(state.engine);
    Ok(Json(controller.book(&scope, id, request).await?))
}

async fn release_booking(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Reservation>>, AppError> {
    let controller = OccurrenceController::new(state.engine);
    Ok(Json(controller.release(&scope, id).await?))
}
