use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{ApiResponse, ListResponse};
use crate::dto::pattern_dto::{
    CreatePatternRequest, PatternAvailabilityResponse, PatternFilters, UpdatePatternRequest,
};
use crate::models::RecurrencePattern;
use crate::services::SchedulingEngine;
use crate::utils::errors::{bad_request_error, validation_error, AppError};

pub struct PatternController {
    engine: SchedulingEngine,
}

impl PatternController {
    pub fn new(engine: SchedulingEngine) -> Self {
        Self { engine }
    }

    pub async fn create(
        &self,
        request: CreatePatternRequest,
    ) -> Result<ApiResponse<RecurrencePattern>, AppError> {
        request.validate()?;

        let owner = request
            .owner()
            .ok_or_else(|| bad_request_error("exactly one owner is required"))?;
        let (start, end) = request
            .times()
            .map_err(|e| validation_error("start_time", e))?;

        let pattern = self
            .engine
            .patterns
            .create(owner, start, end, request.flags())
            .await?;

        Ok(ApiResponse::success_with_message(
            pattern,
            "Horario creado exitosamente".to_string(),
        ))
    }

    pub async fn update(
        &self,
        pattern_id: Uuid,
        request: UpdatePatternRequest,
    ) -> Result<ApiResponse<RecurrencePattern>, AppError> {
        request.validate()?;
        let times = request
            .times()
            .map_err(|e| validation_error("start_time", e))?;

        let pattern = self
            .engine
            .patterns
            .update(pattern_id, times, request.flags())
            .await?;
        Ok(ApiResponse::success(pattern))
    }

    pub async fn delete(&self, pattern_id: Uuid) -> Result<ApiResponse<RecurrencePattern>, AppError> {
        let pattern = self.engine.patterns.soft_delete(pattern_id).await?;
        Ok(ApiResponse::success_with_message(
            pattern,
            "Horario eliminado exitosamente".to_string(),
        ))
    }

    pub async fn get(&self, pattern_id: Uuid) -> Result<ApiResponse<RecurrencePattern>, AppError> {
        Ok(ApiResponse::success(self.engine.patterns.get(pattern_id).await?))
    }

    pub async fn list(
        &self,
        filters: PatternFilters,
    ) -> Result<ApiResponse<ListResponse<RecurrencePattern>>, AppError> {
        let patterns = self
            .engine
            .patterns
            .list(filters.tour_offering_id, filters.driver_id)
            .await?;
        Ok(ApiResponse::success(patterns.into()))
    }

    pub async fn availability(
        &self,
        pattern_id: Uuid,
        date: NaiveDate,
    ) -> Result<ApiResponse<PatternAvailabilityResponse>, AppError> {
        let available = self
            .engine
            .patterns
            .verify_schedule_availability(pattern_id, date)
            .await?;
        Ok(ApiResponse::success(PatternAvailabilityResponse {
            pattern_id,
            date,
            available,
        }))
    }
}
