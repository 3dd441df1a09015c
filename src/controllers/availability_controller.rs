use uuid::Uuid;
use validator::Validate;

use crate::dto::availability_dto::{ResourceFreeQuery, ResourceFreeResponse};
use crate::dto::common_dto::ApiResponse;
use crate::models::{ResourceKind, TimeSlot};
use crate::services::SchedulingEngine;
use crate::utils::errors::{validation_error, AppError};

pub struct AvailabilityController {
    engine: SchedulingEngine,
}

impl AvailabilityController {
    pub fn new(engine: SchedulingEngine) -> Self {
        Self { engine }
    }

    pub async fn resource_free(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        query: ResourceFreeQuery,
    ) -> Result<ApiResponse<ResourceFreeResponse>, AppError> {
        query.validate()?;
        let (start, end) = query.times().map_err(|e| validation_error("start", e))?;
        let slot = TimeSlot { start, end };

        let free = self
            .engine
            .queries
            .is_resource_free(kind, resource_id, query.date, slot, query.exclude_template)
            .await?;

        Ok(ApiResponse::success(ResourceFreeResponse {
            kind,
            resource_id,
            date: query.date,
            free,
        }))
    }
}
