//! Alta, edición y baja lógica de plantillas de tour

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    NewTemplate, Occurrence, RecurrencePattern, ResourceKind, SiteScope, TourTemplate,
};
use crate::repositories::{ResourceDirectory, ScheduleRepository};
use crate::services::conflict_checker::ConflictChecker;
use crate::services::schedule_validator::ScheduleValidator;
use crate::utils::clock::Clock;
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

/// Campos editables; `None` conserva el valor actual
#[derive(Debug, Clone, Default)]
pub struct TemplateChanges {
    pub vessel_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub recurrence_pattern_id: Option<Uuid>,
    pub nominal_date: Option<NaiveDate>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct TemplateService {
    repository: Arc<dyn ScheduleRepository>,
    directory: Arc<dyn ResourceDirectory>,
    conflicts: ConflictChecker,
    validator: ScheduleValidator,
    clock: Arc<dyn Clock>,
}

impl TemplateService {
    pub fn new(
        repository: Arc<dyn ScheduleRepository>,
        directory: Arc<dyn ResourceDirectory>,
        conflicts: ConflictChecker,
        validator: ScheduleValidator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            directory,
            conflicts,
            validator,
            clock,
        }
    }

    pub async fn create(&self, fields: NewTemplate, scope: &SiteScope) -> AppResult<TourTemplate> {
        self.validator
            .site_access(scope, fields.site_id, "create template")?;
        let pattern = self.check_fields(&fields).await?;

        let template = TourTemplate::new(fields);
        if let Some(driver_id) = template.driver_id {
            self.ensure_driver_available(&template, &pattern, driver_id)
                .await?;
        }

        let template = self.repository.insert_template(&template).await?;
        info!(
            "✅ Plantilla {} creada ({} a {})",
            template.id, template.valid_from, template.valid_until
        );
        Ok(template)
    }

    pub async fn update(
        &self,
        template_id: Uuid,
        changes: TemplateChanges,
        scope: &SiteScope,
    ) -> AppResult<TourTemplate> {
        let mut template = self.get(template_id, scope).await?;
        if template.status.is_terminal() {
            return Err(conflict_error(
                "TourTemplate",
                &template_id.to_string(),
                &format!("cannot be edited while {}", template.status),
            ));
        }

        let fields = NewTemplate {
            tour_offering_id: template.tour_offering_id,
            vessel_id: changes.vessel_id.unwrap_or(template.vessel_id),
            site_id: changes.site_id.unwrap_or(template.site_id),
            driver_id: template.driver_id,
            recurrence_pattern_id: changes
                .recurrence_pattern_id
                .unwrap_or(template.recurrence_pattern_id),
            nominal_date: changes.nominal_date.unwrap_or(template.nominal_date),
            valid_from: changes.valid_from.unwrap_or(template.valid_from),
            valid_until: changes.valid_until.unwrap_or(template.valid_until),
        };
        self.validator
            .site_access(scope, fields.site_id, "move template")?;
        let pattern = self.check_fields(&fields).await?;

        let reshaped = fields.vessel_id != template.vessel_id
            || fields.recurrence_pattern_id != template.recurrence_pattern_id
            || fields.valid_from != template.valid_from
            || fields.valid_until != template.valid_until;

        template.vessel_id = fields.vessel_id;
        template.site_id = fields.site_id;
        template.recurrence_pattern_id = fields.recurrence_pattern_id;
        template.nominal_date = fields.nominal_date;
        template.valid_from = fields.valid_from;
        template.valid_until = fields.valid_until;

        if reshaped {
            self.ensure_occurrences_fit(&template, &pattern).await?;
        }
        if let Some(driver_id) = template.driver_id {
            self.ensure_driver_available(&template, &pattern, driver_id)
                .await?;
        }

        let template = self.repository.update_template(&template).await?;
        info!("✏️ Plantilla {} actualizada", template.id);
        Ok(template)
    }

    /// Asigna o reemplaza el chofer por defecto
    pub async fn assign_driver(
        &self,
        template_id: Uuid,
        driver_id: Uuid,
        scope: &SiteScope,
    ) -> AppResult<TourTemplate> {
        let mut template = self.get(template_id, scope).await?;
        if template.status.is_terminal() {
            return Err(conflict_error(
                "TourTemplate",
                &template_id.to_string(),
                &format!("cannot change driver while {}", template.status),
            ));
        }

        let pattern = self
            .repository
            .find_pattern(template.recurrence_pattern_id)
            .await?
            .filter(|p| !p.deleted)
            .ok_or_else(|| {
                not_found_error("RecurrencePattern", &template.recurrence_pattern_id.to_string())
            })?;

        self.ensure_driver_available(&template, &pattern, driver_id)
            .await?;

        template.driver_id = Some(driver_id);
        let template = self.repository.update_template(&template).await?;
        info!("🧑‍✈️ Plantilla {} asignada al chofer {}", template.id, driver_id);
        Ok(template)
    }

    /// Baja lógica; el estado no cambia
    pub async fn soft_delete(&self, template_id: Uuid, scope: &SiteScope) -> AppResult<TourTemplate> {
        let mut template = self.get(template_id, scope).await?;
        template.deleted = true;
        let template = self.repository.update_template(&template).await?;
        info!("🗑️ Plantilla {} eliminada", template.id);
        Ok(template)
    }

    pub async fn get(&self, template_id: Uuid, scope: &SiteScope) -> AppResult<TourTemplate> {
        let template = self
            .repository
            .find_template(template_id)
            .await?
            .filter(|t| !t.deleted)
            .ok_or_else(|| not_found_error("TourTemplate", &template_id.to_string()))?;
        self.validator
            .site_access(scope, template.site_id, "read template")?;
        Ok(template)
    }

    async fn check_fields(&self, fields: &NewTemplate) -> AppResult<RecurrencePattern> {
        self.validator.template_window(fields)?;
        self.validator
            .template_references(self.directory.as_ref(), fields)
            .await?;
        let pattern = self
            .repository
            .find_pattern(fields.recurrence_pattern_id)
            .await?;
        self.validator
            .tour_pattern(pattern, fields.recurrence_pattern_id, fields.tour_offering_id)
    }

    /// Turno compatible y sin solapes en las fechas futuras de la plantilla
    async fn ensure_driver_available(
        &self,
        template: &TourTemplate,
        pattern: &RecurrencePattern,
        driver_id: Uuid,
    ) -> AppResult<()> {
        let shift = self
            .directory
            .driver_pattern(driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &driver_id.to_string()))?;

        let slot = pattern.slot();
        if !shift.slot().covers(&slot) || !pattern.flags().is_subset_of(&shift.flags()) {
            return Err(conflict_error(
                "Driver",
                &driver_id.to_string(),
                "shift does not cover the template schedule",
            ));
        }

        let calendar = self
            .conflicts
            .calendar(ResourceKind::Driver, driver_id, Some(template.id))
            .await?;
        // Más allá del horizonte de generación lo revisa la propia expansión
        let today = self.clock.today();
        let from = template.valid_from.max(today);
        let until = template.valid_until.min(self.validator.horizon_end(today));

        for date in from
            .iter_days()
            .take_while(|d| *d <= until)
            .filter(|d| pattern.runs_on(*d))
        {
            // Fechas ya reasignadas a otro chofer o canceladas no cuentan
            if let Some(own) = self
                .repository
                .find_occurrence_on(template.id, date)
                .await?
            {
                if own.driver_id.is_some() || !own.is_active() {
                    continue;
                }
            }

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
        }

        Ok(())
    }

    /// Las instancias pendientes deben seguir encajando en la plantilla editada
    async fn ensure_occurrences_fit(
        &self,
        template: &TourTemplate,
        pattern: &RecurrencePattern,
    ) -> AppResult<()> {
        let today = self.clock.today();
        let pending: Vec<Occurrence> = self
            .repository
            .occurrences_for_template(template.id)
            .await?
            .into_iter()
            .filter(|o| o.occurrence_date >= today && !o.status.is_terminal())
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        if let Some(orphan) = pending.iter().find(|o| {
            !template.window_contains(o.occurrence_date) || !pattern.runs_on(o.occurrence_date)
        }) {
            return Err(conflict_error(
                "TourTemplate",
                &template.id.to_string(),
                &format!(
                    "has a pending occurrence on {} that the new schedule would drop",
                    orphan.occurrence_date
                ),
            ));
        }

        let slot = pattern.slot();
        let vessel = self
            .conflicts
            .calendar(ResourceKind::Vessel, template.vessel_id, Some(template.id))
            .await?;

        for occurrence in &pending {
            let date = occurrence.occurrence_date;
            if let Some(conflict) = vessel.conflict_on(date, slot).await? {
                return Err(conflict_error(
                    "Vessel",
                    &template.vessel_id.to_string(),
                    &format!("is already used by template {} on {}", conflict.template_id, date),
                ));
            }

            // Choferes reasignados solo para esa fecha
            if let Some(driver_id) = occurrence.driver_id {
                let free = self
                    .conflicts
                    .is_resource_free(ResourceKind::Driver, driver_id, date, slot, Some(template.id))
                    .await?;
                if !free {
                    return Err(conflict_error(
                        "Driver",
                        &driver_id.to_string(),
                        &format!("is already busy on {}", date),
                    ));
                }
            }
        }

        Ok(())
    }
}
