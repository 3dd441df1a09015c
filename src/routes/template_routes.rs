use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::template_controller::TemplateController;
use crate::dto::common_dto::{ApiResponse, ListResponse};
use crate::dto::template_dto::{
    AssignDriverRequest, ChangeStatusRequest, CreateTemplateRequest, TemplateStatusResponse,
    UpdateTemplateRequest,
};
use crate::models::{Occurrence, ScheduleFilter, SiteScope, TourTemplate};
use crate::services::GenerationReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_template_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        .route(
            "/:id",
            get(get_template).put(update_template).delete(delete_template),
        )
        .route("/:id/status", patch(change_template_status))
        .route("/:id/driver", put(assign_driver))
        .route(
            "/:id/occurrences",
            post(generate_occurrences).get(template_occurrences),
        )
}

async fn create_template(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<Json<ApiResponse<TourTemplate>>, AppError> {
    let controller = TemplateController::new(state.engine);
    Ok(Json(controller.create(&scope, request).await?))
}

async fn list_templates(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Query(filter): Query<ScheduleFilter>,
) -> Result<Json<ApiResponse<ListResponse<TourTemplate>>>, AppError> {
    let controller = TemplateController::new(state.engine);
    Ok(Json(controller.list(&scope, filter).await?))
}

async fn get_template(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TourTemplate>>, AppError> {
    let controller = TemplateController::new(state.engine);
    Ok(Json(controller.get(&scope, id).await?))
}

async fn update_template(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<ApiResponse<TourTemplate>>, AppError> {
    let controller = TemplateController::new(state.engine);
    Ok(Json(controller.update(&scope, id, request).await?))
}

async fn delete_template(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TourTemplate>>, AppError> {
    let controller = TemplateController::new(state.engine);
    Ok(Json(controller.delete(&scope, id).await?))
}

async fn change_template_status(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<TemplateStatusResponse>>, AppError> {
    let controller = TemplateController::new(state.engine);
    Ok(Json(controller.change_status(&scope, id, request).await?))
}

async fn assign_driver(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignDriverRequest>,
) -> Result<Json<ApiResponse<TourTemplate>>, AppError> {
    let controller = TemplateController::new(state.engine);
    Ok(Json(controller.assign_driver(&scope, id, request).await?))
}

async fn generate_occurrences(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GenerationReport>>, AppError> {
    let controller = TemplateController::new(state.engine);
    Ok(Json(controller.generate(&scope, id).await?))
}

async fn template_occurrences(
    State(state): State<AppState>,
    Extension(scope): Extension<SiteScope>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ListResponse<Occurrence>>>, AppError> {
    let controller = TemplateController::new(state.engine);
    Ok(Json(controller.occurrences(&scope, id).await?))
}
