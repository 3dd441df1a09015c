//! Ciclo de vida de plantillas e instancias
//!
//! Toda transición pasa por `TourStatus::transition`. Cancelar una plantilla
//! cancela en cascada sus instancias desde hoy que no estén terminadas.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{Occurrence, ResourceKind, SiteScope, TourStatus, TourTemplate};
use crate::repositories::{ResourceDirectory, ScheduleRepository};
use crate::services::capacity_tracker::CapacityTracker;
use crate::services::conflict_checker::ConflictChecker;
use crate::services::schedule_validator::ScheduleValidator;
use crate::utils::clock::Clock;
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct TemplateStatusChange {
    pub template: TourTemplate,
    pub cancelled_occurrences: u64,
}

#[derive(Clone)]
pub struct LifecycleService {
    repository: Arc<dyn ScheduleRepository>,
    directory: Arc<dyn ResourceDirectory>,
    conflicts: ConflictChecker,
    capacity: CapacityTracker,
    validator: ScheduleValidator,
    clock: Arc<dyn Clock>,
}

impl LifecycleService {
    pub fn new(
        repository: Arc<dyn ScheduleRepository>,
        directory: Arc<dyn ResourceDirectory>,
        conflicts: ConflictChecker,
        capacity: CapacityTracker,
        validator: ScheduleValidator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            directory,
            conflicts,
            capacity,
            validator,
            clock,
        }
    }

    pub async fn change_template_status(
        &self,
        template_id: Uuid,
        next: TourStatus,
        scope: &SiteScope,
    ) -> AppResult<TemplateStatusChange> {
        let mut template = self
            .repository
            .find_template(template_id)
            .await?
            .filter(|t| !t.deleted)
            .ok_or_else(|| not_found_error("TourTemplate", &template_id.to_string()))?;

        self.validator
            .site_access(scope, template.site_id, "change template status")?;

        let previous = template.status;
        template.status = previous.transition(next)?;
        let template = self.repository.update_template(&template).await?;

        let cancelled_occurrences = if next == TourStatus::Cancelado {
            self.repository
                .cancel_future_occurrences(template.id, self.clock.today())
                .await?
        } else {
            0
        };

        info!(
            "🔄 Plantilla {}: {} -> {} ({} instancias canceladas)",
            template.id, previous, next, cancelled_occurrences
        );

        Ok(TemplateStatusChange {
            template,
            cancelled_occurrences,
        })
    }

    pub async fn change_occurrence_status(
        &self,
        occurrence_id: Uuid,
        next: TourStatus,
        scope: &SiteScope,
    ) -> AppResult<Occurrence> {
        let (mut occurrence, template) = self.capacity.load(occurrence_id).await?;
        self.validator
            .site_access(scope, template.site_id, "change occurrence status")?;

        let previous = occurrence.status;
        occurrence.status = previous.transition(next)?;
        let occurrence = self.repository.update_occurrence(&occurrence).await?;

        info!(
            "🔄 Instancia {} ({}): {} -> {}",
            occurrence.id, occurrence.occurrence_date, previous, next
        );
        Ok(occurrence)
    }

    /// Cambia el chofer de una sola fecha sin tocar la plantilla
    pub async fn reassign_occurrence_driver(
        &self,
        occurrence_id: Uuid,
        driver_id: Uuid,
        scope: &SiteScope,
    ) -> AppResult<Occurrence> {
        let (mut occurrence, template) = self.capacity.load(occurrence_id).await?;
        self.validator
            .site_access(scope, template.site_id, "reassign occurrence driver")?;

        if occurrence.status.is_terminal() {
            return Err(conflict_error(
                "Occurrence",
                &occurrence_id.to_string(),
                &format!("cannot be reassigned while {}", occurrence.status),
            ));
        }

        let pattern = self
            .repository
            .find_pattern(template.recurrence_pattern_id)
            .await?
            .ok_or_else(|| {
                not_found_error("RecurrencePattern", &template.recurrence_pattern_id.to_string())
            })?;
        let slot = pattern.slot();
        let date = occurrence.occurrence_date;

        let shift = self
            .directory
            .driver_pattern(driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &driver_id.to_string()))?;
        if !shift.runs_on(date) || !shift.slot().covers(&slot) {
            return Err(conflict_error(
                "Driver",
                &driver_id.to_string(),
                &format!("is off shift on {}", date),
            ));
        }

        let calendar = self
            .conflicts
            .calendar(ResourceKind::Driver, driver_id, Some(template.id))
            .await?;
        if let Some(conflict) = calendar.conflict_on(date, slot).await? {
            return Err(conflict_error(
                "Driver",
                &driver_id.to_string(),
                &format!(
                    "is already assigned to template {} on {}",
                    conflict.template_id, date
                ),
            ));
        }

        occurrence.driver_id = Some(driver_id);
        let occurrence = self.repository.update_occurrence(&occurrence).await?;
        info!("🧑‍✈️ Instancia {} reasignada al chofer {}", occurrence.id, driver_id);
        Ok(occurrence)
    }
}
