use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{ApiResponse, ListResponse};
use crate::dto::template_dto::{
    AssignDriverRequest, ChangeStatusRequest, CreateTemplateRequest, TemplateStatusResponse,
    UpdateTemplateRequest,
};
use crate::models::{Occurrence, ScheduleFilter, SiteScope, TourTemplate};
use crate::services::{GenerationReport, SchedulingEngine};
use crate::utils::errors::AppError;

pub struct TemplateController {
    engine: SchedulingEngine,
}

impl TemplateController {
    pub fn new(engine: SchedulingEngine) -> Self {
        Self { engine }
    }

    pub async fn create(
        &self,
        scope: &SiteScope,
        request: CreateTemplateRequest,
    ) -> Result<ApiResponse<TourTemplate>, AppError> {
        request.validate()?;
        let template = self.engine.templates.create(request.into(), scope).await?;
        Ok(ApiResponse::success_with_message(
            template,
            "Plantilla creada exitosamente".to_string(),
        ))
    }

    pub async fn update(
        &self,
        scope: &SiteScope,
        template_id: Uuid,
        request: UpdateTemplateRequest,
    ) -> Result<ApiResponse<TourTemplate>, AppError> {
        request.validate()?;
        let template = self
            .engine
            .templates
            .update(template_id, request.into(), scope)
            .await?;
        Ok(ApiResponse::success(template))
    }

    pub async fn delete(
        &self,
        scope: &SiteScope,
        template_id: Uuid,
    ) -> Result<ApiResponse<TourTemplate>, AppError> {
        let template = self.engine.templates.soft_delete(template_id, scope).await?;
        Ok(ApiResponse::success_with_message(
            template,
            "Plantilla eliminada exitosamente".to_string(),
        ))
    }

    pub async fn get(
        &self,
        scope: &SiteScope,
        template_id: Uuid,
    ) -> Result<ApiResponse<TourTemplate>, AppError> {
        Ok(ApiResponse::success(
            self.engine.templates.get(template_id, scope).await?,
        ))
    }

    pub async fn list(
        &self,
        scope: &SiteScope,
        filter: ScheduleFilter,
    ) -> Result<ApiResponse<ListResponse<TourTemplate>>, AppError> {
        let templates = self.engine.queries.list_templates(&filter, scope).await?;
        Ok(ApiResponse::success(templates.into()))
    }

    pub async fn change_status(
        &self,
        scope: &SiteScope,
        template_id: Uuid,
        request: ChangeStatusRequest,
    ) -> Result<ApiResponse<TemplateStatusResponse>, AppError> {
        let change = self
            .engine
            .lifecycle
            .change_template_status(template_id, request.status, scope)
            .await?;
        Ok(ApiResponse::success(TemplateStatusResponse {
            template: change.template,
            cancelled_occurrences: change.cancelled_occurrences,
        }))
    }

    pub async fn assign_driver(
        &self,
        scope: &SiteScope,
        template_id: Uuid,
        request: AssignDriverRequest,
    ) -> Result<ApiResponse<TourTemplate>, AppError> {
        let template = self
            .engine
            .templates
            .assign_driver(template_id, request.driver_id, scope)
            .await?;
        Ok(ApiResponse::success(template))
    }

    pub async fn generate(
        &self,
        scope: &SiteScope,
        template_id: Uuid,
    ) -> Result<ApiResponse<GenerationReport>, AppError> {
        let report = self.engine.generator.generate(template_id, scope).await?;
        let message = format!(
            "{} instancias creadas, {} omitidas",
            report.created,
            report.skipped.len()
        );
        Ok(ApiResponse::success_with_message(report, message))
    }

    pub async fn occurrences(
        &self,
        scope: &SiteScope,
        template_id: Uuid,
    ) -> Result<ApiResponse<ListResponse<Occurrence>>, AppError> {
        let template = self.engine.templates.get(template_id, scope).await?;
        let occurrences = self.engine.queries.occurrences_of_template(&template).await?;
        Ok(ApiResponse::success(occurrences.into()))
    }
}
