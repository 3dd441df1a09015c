//! Consultas filtradas por sede y disponibilidad para la venta

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Occurrence, ResourceKind, ScheduleFilter, SeatAvailability, SiteScope, TimeSlot, TourStatus,
    TourTemplate,
};
use crate::repositories::ScheduleRepository;
use crate::services::capacity_tracker::CapacityTracker;
use crate::services::conflict_checker::ConflictChecker;
use crate::services::schedule_validator::ScheduleValidator;
use crate::utils::clock::Clock;
use crate::utils::errors::AppResult;

/// Instancia vendible con su plantilla y asientos libres
#[derive(Debug, Clone, Serialize)]
pub struct BookableOccurrence {
    pub occurrence: Occurrence,
    pub template: TourTemplate,
    pub seats: SeatAvailability,
}

#[derive(Clone)]
pub struct QueryService {
    repository: Arc<dyn ScheduleRepository>,
    conflicts: ConflictChecker,
    capacity: CapacityTracker,
    validator: ScheduleValidator,
    clock: Arc<dyn Clock>,
}

impl QueryService {
    pub fn new(
        repository: Arc<dyn ScheduleRepository>,
        conflicts: ConflictChecker,
        capacity: CapacityTracker,
        validator: ScheduleValidator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            conflicts,
            capacity,
            validator,
            clock,
        }
    }

    pub async fn list_templates(
        &self,
        filter: &ScheduleFilter,
        scope: &SiteScope,
    ) -> AppResult<Vec<TourTemplate>> {
        self.repository
            .list_templates(filter, scope, self.clock.today())
            .await
    }

    pub async fn list_occurrences(
        &self,
        filter: &ScheduleFilter,
        scope: &SiteScope,
    ) -> AppResult<Vec<Occurrence>> {
        self.repository
            .list_occurrences(filter, scope, self.clock.today())
            .await
    }

    pub async fn get_occurrence(&self, occurrence_id: Uuid, scope: &SiteScope) -> AppResult<Occurrence> {
        let (occurrence, template) = self.capacity.load(occurrence_id).await?;
        self.validator
            .site_access(scope, template.site_id, "read occurrence")?;
        Ok(occurrence)
    }

    pub async fn occurrences_of_template(
        &self,
        template: &TourTemplate,
    ) -> AppResult<Vec<Occurrence>> {
        self.repository.occurrences_for_template(template.id).await
    }

    /// Instancias programadas de la fecha, con plantilla programada y vigente
    /// y al menos un asiento libre
    pub async fn available_for_booking(
        &self,
        date: NaiveDate,
        filter: &ScheduleFilter,
        scope: &SiteScope,
    ) -> AppResult<Vec<BookableOccurrence>> {
        let filter = ScheduleFilter {
            date: Some(date),
            date_from: None,
            date_to: None,
            status: Some(TourStatus::Programado),
            include_deleted: false,
            ..filter.clone()
        };

        let mut bookable = Vec::new();
        for occurrence in self.list_occurrences(&filter, scope).await? {
            let Some(template) = self
                .repository
                .find_template(occurrence.template_id)
                .await?
                .filter(|t| !t.deleted)
            else {
                continue;
            };
            if template.status != TourStatus::Programado || !template.window_contains(date) {
                continue;
            }

            let seats = self.capacity.seats_for(&occurrence, &template).await?;
            if seats.remaining > 0 {
                bookable.push(BookableOccurrence {
                    occurrence,
                    template,
                    seats,
                });
            }
        }

        Ok(bookable)
    }

    /// Consulta directa de recurso libre
    pub async fn is_resource_free(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        date: NaiveDate,
        slot: TimeSlot,
        exclude_template_id: Option<Uuid>,
    ) -> AppResult<bool> {
        self.conflicts
            .is_resource_free(kind, resource_id, date, slot, exclude_template_id)
            .await
    }
}
