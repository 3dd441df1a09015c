//! Componente de validación
//!
//! Se construye explícitamente a partir de la configuración y se pasa a cada
//! servicio; no hay estado global. Reúne las reglas de dominio que no caben en
//! los atributos `#[validate]` de los DTOs.

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::warn;
use uuid::Uuid;
use validator::ValidationError;

use crate::models::{NewTemplate, RecurrencePattern, SiteScope, TimeSlot, TourTemplate, WeekdayFlags};
use crate::repositories::ResourceDirectory;
use crate::utils::errors::{
    bad_request_error, forbidden_error, not_found_error, validation_error, AppResult,
};
use crate::utils::validation::{validate_date_order, validate_time_order, validate_weekdays};

/// Dos años, bisiesto incluido
pub const DEFAULT_MAX_GENERATION_DAYS: i64 = 731;

/// Reglas de programación configurables
#[derive(Debug, Clone, Copy)]
pub struct SchedulingRules {
    pub max_generation_days: i64,
}

impl Default for SchedulingRules {
    fn default() -> Self {
        Self {
            max_generation_days: DEFAULT_MAX_GENERATION_DAYS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleValidator {
    rules: SchedulingRules,
}

impl ScheduleValidator {
    pub fn new(rules: SchedulingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> SchedulingRules {
        self.rules
    }

    pub fn time_slot(&self, start: NaiveTime, end: NaiveTime) -> AppResult<TimeSlot> {
        validate_time_order(start, end).map_err(|e| validation_error("start_time", e))?;
        TimeSlot::new(start, end).ok_or_else(|| bad_request_error("start time must be before end time"))
    }

    pub fn weekdays(&self, flags: &WeekdayFlags) -> AppResult<()> {
        validate_weekdays(flags).map_err(|e| validation_error("weekdays", e))
    }

    /// Ventana de vigencia bien ordenada; avisa si supera el límite de generación
    pub fn template_window(&self, fields: &NewTemplate) -> AppResult<()> {
        validate_date_order(fields.valid_from, fields.valid_until)
            .map_err(|e| validation_error("valid_from", e))?;

        let days = (fields.valid_until - fields.valid_from).num_days() + 1;
        if days > self.rules.max_generation_days {
            warn!(
                "⚠️ Ventana de vigencia de {} días supera el límite de generación ({})",
                days, self.rules.max_generation_days
            );
        }
        Ok(())
    }

    /// Rechaza ventanas absurdas antes de expandirlas
    pub fn generation_window(&self, template: &TourTemplate) -> AppResult<()> {
        let days = template.window_days();
        if days > self.rules.max_generation_days {
            let mut error = ValidationError::new("validity_window");
            error.add_param("days".into(), &days);
            error.add_param("max_days".into(), &self.rules.max_generation_days);
            error.message = Some("validity window too long to expand".into());
            return Err(validation_error("valid_until", error));
        }
        Ok(())
    }

    /// Último día que se revisa al asignar recursos a partir de `today`
    pub fn horizon_end(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_signed(Duration::days(self.rules.max_generation_days - 1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn passengers(&self, passengers: i32) -> AppResult<()> {
        if passengers < 1 {
            let mut error = ValidationError::new("range");
            error.add_param("min".into(), &1);
            error.add_param("actual".into(), &passengers);
            error.message = Some("a booking needs at least one passenger".into());
            return Err(validation_error("passengers", error));
        }
        Ok(())
    }

    pub fn site_access(&self, scope: &SiteScope, site_id: Uuid, operation: &str) -> AppResult<()> {
        if scope.allows(site_id) {
            Ok(())
        } else {
            Err(forbidden_error(operation, "site outside the caller's authorized sites"))
        }
    }

    /// El horario debe existir, no estar eliminado y pertenecer al tipo de tour
    pub fn tour_pattern(
        &self,
        pattern: Option<RecurrencePattern>,
        pattern_id: Uuid,
        tour_offering_id: Uuid,
    ) -> AppResult<RecurrencePattern> {
        let pattern = pattern
            .filter(|p| !p.deleted)
            .ok_or_else(|| not_found_error("RecurrencePattern", &pattern_id.to_string()))?;

        if pattern.tour_offering_id != Some(tour_offering_id) {
            return Err(bad_request_error(
                "recurrence pattern does not belong to the template's tour offering",
            ));
        }
        Ok(pattern)
    }

    /// Existencia y estado activo de los colaboradores referenciados
    pub async fn template_references(
        &self,
        directory: &dyn ResourceDirectory,
        fields: &NewTemplate,
    ) -> AppResult<()> {
        if !directory.tour_offering_active(fields.tour_offering_id).await? {
            return Err(not_found_error("TourOffering", &fields.tour_offering_id.to_string()));
        }
        if !directory.site_active(fields.site_id).await? {
            return Err(not_found_error("Site", &fields.site_id.to_string()));
        }
        if directory.vessel_capacity(fields.vessel_id).await?.is_none() {
            return Err(not_found_error("Vessel", &fields.vessel_id.to_string()));
        }
        Ok(())
    }
}
