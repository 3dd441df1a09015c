use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{ApiResponse, ListResponse};
use crate::dto::occurrence_dto::{AvailableQuery, BookingRequest, OccurrenceDetailResponse};
use crate::dto::template_dto::{AssignDriverRequest, ChangeStatusRequest};
use crate::models::{Occurrence, Reservation, ScheduleFilter, SeatAvailability, SiteScope};
use crate::services::{BookableOccurrence, SchedulingEngine};
use crate::utils::errors::AppError;

pub struct OccurrenceController {
    engine: SchedulingEngine,
}

impl OccurrenceController {
    pub fn new(engine: SchedulingEngine) -> Self {
        Self { engine }
    }

    pub async fn list(
        &self,
        scope: &SiteScope,
        filter: ScheduleFilter,
    ) -> Result<ApiResponse<ListResponse<Occurrence>>, AppError> {
        let occurrences = self.engine.queries.list_occurrences(&filter, scope).await?;
        Ok(ApiResponse::success(occurrences.into()))
    }

    pub async fn available(
        &self,
        scope: &SiteScope,
        query: AvailableQuery,
    ) -> Result<ApiResponse<ListResponse<BookableOccurrence>>, AppError> {
        let bookable = self
            .engine
            .queries
            .available_for_booking(query.date, &query.filter(), scope)
            .await?;
        Ok(ApiResponse::success(bookable.into()))
    }

    pub async fn get(
        &self,
        scope: &SiteScope,
        occurrence_id: Uuid,
    ) -> Result<ApiResponse<OccurrenceDetailResponse>, AppError> {
        let occurrence = self.engine.queries.get_occurrence(occurrence_id, scope).await?;
        let seats = self.engine.capacity.remaining_seats(occurrence_id, scope).await?;
        Ok(ApiResponse::success(OccurrenceDetailResponse { occurrence, seats }))
    }

    pub async fn seats(
        &self,
        scope: &SiteScope,
        occurrence_id: Uuid,
    ) -> Result<ApiResponse<SeatAvailability>, AppError> {
        Ok(ApiResponse::success(
            self.engine.capacity.remaining_seats(occurrence_id, scope).await?,
        ))
    }

    pub async fn change_status(
        &self,
        scope: &SiteScope,
        occurrence_id: Uuid,
        request: ChangeStatusRequest,
    ) -> Result<ApiResponse<Occurrence>, AppError> {
        let occurrence = self
            .engine
            .lifecycle
            .change_occurrence_status(occurrence_id, request.status, scope)
            .await?;
        Ok(ApiResponse::success(occurrence))
    }

    pub async fn reassign_driver(
        &self,
        scope: &SiteScope,
        occurrence_id: Uuid,
        request: AssignDriverRequest,
    ) -> Result<ApiResponse<Occurrence>, AppError> {
        let occurrence = self
            .engine
            .lifecycle
            .reassign_occurrence_driver(occurrence_id, request.driver_id, scope)
            .await?;
        Ok(ApiResponse::success(occurrence))
    }

    pub async fn book(
        &self,
        scope: &SiteScope,
        occurrence_id: Uuid,
        request: BookingRequest,
    ) -> Result<ApiResponse<Reservation>, AppError> {
        request.validate()?;
        let reservation = self
            .engine
            .bookings
            .commit_booking(occurrence_id, request.passengers, request.client_reference, scope)
            .await?;
        Ok(ApiResponse::success_with_message(
            reservation,
            "Reserva confirmada".to_string(),
        ))
    }

    pub async fn release(
        &self,
        scope: &SiteScope,
        reservation_id: Uuid,
    ) -> Result<ApiResponse<Reservation>, AppError> {
        let reservation = self
            .engine
            .bookings
            .release_booking(reservation_id, scope)
            .await?;
        Ok(ApiResponse::success_with_message(
            reservation,
            "Reserva cancelada".to_string(),
        ))
    }
}
