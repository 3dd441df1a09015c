//! Expansión de plantillas en instancias fechadas
//!
//! Recorre la ventana de vigencia, se queda con los días que marca el horario
//! y materializa una instancia por fecha. Idempotente: una fecha que ya tiene
//! instancia se cuenta como existente y no se vuelve a crear.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Occurrence, ResourceKind, SiteScope, TourStatus, TourTemplate};
use crate::repositories::{ResourceDirectory, ScheduleRepository};
use crate::services::conflict_checker::ConflictChecker;
use crate::services::schedule_validator::ScheduleValidator;
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    VesselConflict,
    DriverConflict,
    DriverOffShift,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub template_id: Uuid,
    pub created: u32,
    pub existing: u32,
    pub skipped: Vec<SkippedDate>,
}

impl GenerationReport {
    fn skip(&mut self, date: NaiveDate, reason: SkipReason) {
        debug!("⏭️ {} omitida: {:?}", date, reason);
        self.skipped.push(SkippedDate { date, reason });
    }
}

#[derive(Clone)]
pub struct InstanceGenerator {
    repository: Arc<dyn ScheduleRepository>,
    directory: Arc<dyn ResourceDirectory>,
    conflicts: ConflictChecker,
    validator: ScheduleValidator,
}

impl InstanceGenerator {
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

    pub async fn generate(&self, template_id: Uuid, scope: &SiteScope) -> AppResult<GenerationReport> {
        let template = self
            .repository
            .find_template(template_id)
            .await?
            .filter(|t| !t.deleted)
            .ok_or_else(|| not_found_error("TourTemplate", &template_id.to_string()))?;

        self.validator
            .site_access(scope, template.site_id, "generate occurrences")?;

        if template.status != TourStatus::Programado {
            return Err(conflict_error(
                "TourTemplate",
                &template_id.to_string(),
                &format!("cannot be expanded while {}", template.status),
            ));
        }

        self.validator.generation_window(&template)?;
        self.expand(&template).await
    }

    async fn expand(&self, template: &TourTemplate) -> AppResult<GenerationReport> {
        let pattern = self
            .repository
            .find_pattern(template.recurrence_pattern_id)
            .await?
            .filter(|p| !p.deleted)
            .ok_or_else(|| {
                not_found_error("RecurrencePattern", &template.recurrence_pattern_id.to_string())
            })?;
        let slot = pattern.slot();

        let vessel = self
            .conflicts
            .calendar(ResourceKind::Vessel, template.vessel_id, Some(template.id))
            .await?;

        let driver = match template.driver_id {
            Some(driver_id) => {
                let shift = self
                    .directory
                    .driver_pattern(driver_id)
                    .await?
                    .ok_or_else(|| not_found_error("Driver", &driver_id.to_string()))?;
                let calendar = self
                    .conflicts
                    .calendar(ResourceKind::Driver, driver_id, Some(template.id))
                    .await?;
                Some((shift, calendar))
            }
            None => None,
        };

        let mut report = GenerationReport {
            template_id: template.id,
            ..Default::default()
        };

        for date in template.window_dates().filter(|d| pattern.runs_on(*d)) {
            if self
                .repository
                .find_occurrence_on(template.id, date)
                .await?
                .is_some()
            {
                report.existing += 1;
                continue;
            }

            if let Some((shift, calendar)) = &driver {
                if !shift.runs_on(date) || !shift.slot().covers(&slot) {
                    report.skip(date, SkipReason::DriverOffShift);
                    continue;
                }
                if calendar.conflict_on(date, slot).await?.is_some() {
                    report.skip(date, SkipReason::DriverConflict);
                    continue;
                }
            }

            if vessel.conflict_on(date, slot).await?.is_some() {
                report.skip(date, SkipReason::VesselConflict);
                continue;
            }

            let occurrence = Occurrence::for_template(template, date);
            if self.repository.insert_occurrence_if_absent(&occurrence).await? {
                report.created += 1;
            } else {
                report.existing += 1;
            }
        }

        info!(
            "🗓️ Plantilla {}: {} instancias creadas, {} existentes, {} omitidas",
            template.id,
            report.created,
            report.existing,
            report.skipped.len()
        );

        Ok(report)
    }
}
