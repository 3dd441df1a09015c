//! Horarios recurrentes de tipos de tour y turnos de chofer

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    PatternOwner, RecurrencePattern, ResourceKind, TimeSlot, WeekdayFlags,
};
use crate::repositories::{ResourceDirectory, ScheduleRepository};
use crate::services::conflict_checker::ConflictChecker;
use crate::services::schedule_validator::ScheduleValidator;
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone)]
pub struct RecurrenceService {
    repository: Arc<dyn ScheduleRepository>,
    directory: Arc<dyn ResourceDirectory>,
    conflicts: ConflictChecker,
    validator: ScheduleValidator,
}

impl RecurrenceService {
    pub fn new(
        repository: Arc<dyn ScheduleRepository>,
        directory: Arc<dyn ResourceDirectory>,
        conflicts: ConflictChecker,
        validator: ScheduleValidator,
    ) -> Self {
        Self {
            repository,
            directory,
            conflicts,
            validator,
        }
    }

    pub async fn create(
        &self,
        owner: PatternOwner,
        start: chrono::NaiveTime,
        end: chrono::NaiveTime,
        flags: WeekdayFlags,
    ) -> AppResult<RecurrencePattern> {
        let slot = self.validator.time_slot(start, end)?;
        self.validator.weekdays(&flags)?;

        if let PatternOwner::TourOffering(id) = owner {
            if !self.directory.tour_offering_active(id).await? {
                return Err(not_found_error("TourOffering", &id.to_string()));
            }
        }

        let pattern = RecurrencePattern::new(owner, slot, flags);
        let pattern = self.repository.insert_pattern(&pattern).await?;
        info!("✅ Horario {} creado ({} - {})", pattern.id, slot.start, slot.end);
        Ok(pattern)
    }

    /// `None` conserva el valor actual; el dueño no cambia
    pub async fn update(
        &self,
        pattern_id: Uuid,
        slot: Option<(chrono::NaiveTime, chrono::NaiveTime)>,
        flags: Option<WeekdayFlags>,
    ) -> AppResult<RecurrencePattern> {
        let mut pattern = self.get(pattern_id).await?;

        let TimeSlot { start, end } = match slot {
            Some((start, end)) => self.validator.time_slot(start, end)?,
            None => pattern.slot(),
        };
        let flags = flags.unwrap_or_else(|| pattern.flags());
        self.validator.weekdays(&flags)?;

        pattern.start_time = start;
        pattern.end_time = end;
        pattern.set_flags(flags);

        let pattern = self.repository.update_pattern(&pattern).await?;
        info!("✏️ Horario {} actualizado", pattern.id);
        Ok(pattern)
    }

    pub async fn soft_delete(&self, pattern_id: Uuid) -> AppResult<RecurrencePattern> {
        let mut pattern = self.get(pattern_id).await?;
        pattern.deleted = true;
        let pattern = self.repository.update_pattern(&pattern).await?;
        info!("🗑️ Horario {} eliminado", pattern.id);
        Ok(pattern)
    }

    pub async fn get(&self, pattern_id: Uuid) -> AppResult<RecurrencePattern> {
        self.repository
            .find_pattern(pattern_id)
            .await?
            .filter(|p| !p.deleted)
            .ok_or_else(|| not_found_error("RecurrencePattern", &pattern_id.to_string()))
    }

    pub async fn list(
        &self,
        tour_offering_id: Option<Uuid>,
        driver_id: Option<Uuid>,
    ) -> AppResult<Vec<RecurrencePattern>> {
        self.repository
            .list_patterns(tour_offering_id, driver_id)
            .await
    }

    /// `true` si el horario recurre ese día y ninguna plantilla activa que lo
    /// usa choca con otro compromiso de su embarcación o chofer
    pub async fn verify_schedule_availability(
        &self,
        pattern_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<bool> {
        let pattern = self.get(pattern_id).await?;
        if !pattern.runs_on(date) {
            return Ok(false);
        }
        let slot = pattern.slot();

        for template in self
            .repository
            .templates_using_pattern(pattern_id)
            .await?
            .into_iter()
            .filter(|t| t.is_active() && t.window_contains(date))
        {
            let occurrence = self.repository.find_occurrence_on(template.id, date).await?;
            if occurrence.as_ref().is_some_and(|o| !o.is_active()) {
                continue;
            }

            if !self
                .conflicts
                .is_resource_free(ResourceKind::Vessel, template.vessel_id, date, slot, Some(template.id))
                .await?
            {
                debug!("⛔ Embarcación {} ocupada el {}", template.vessel_id, date);
                return Ok(false);
            }

            let driver = match &occurrence {
                Some(o) => o.effective_driver(&template),
                None => template.driver_id,
            };
            if let Some(driver_id) = driver {
                if !self
                    .conflicts
                    .is_resource_free(ResourceKind::Driver, driver_id, date, slot, Some(template.id))
                    .await?
                {
                    debug!("⛔ Chofer {} ocupado el {}", driver_id, date);
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }
}
