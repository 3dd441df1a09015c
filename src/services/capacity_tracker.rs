//! Asientos restantes por instancia
//!
//! La capacidad viene de la embarcación de la plantilla; los asientos vendidos
//! son la suma de pasajeros de reservas que retienen asiento.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::models::{Occurrence, SeatAvailability, SiteScope, TourTemplate};
use crate::repositories::{ResourceDirectory, ScheduleRepository};
use crate::services::schedule_validator::ScheduleValidator;
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone)]
pub struct CapacityTracker {
    repository: Arc<dyn ScheduleRepository>,
    directory: Arc<dyn ResourceDirectory>,
    validator: ScheduleValidator,
}

impl CapacityTracker {
    pub fn new(
        repository: Arc<dyn ScheduleRepository>,
        directory: Arc<dyn ResourceDirectory>,
        validator: ScheduleValidator,
    ) -> Self {
        Self {
            repository,
            directory,
            validator,
        }
    }

    pub async fn remaining_seats(
        &self,
        occurrence_id: Uuid,
        scope: &SiteScope,
    ) -> AppResult<SeatAvailability> {
        let (occurrence, template) = self.load(occurrence_id).await?;
        self.validator
            .site_access(scope, template.site_id, "read seat availability")?;
        self.seats_for(&occurrence, &template).await
    }

    pub async fn seats_for(
        &self,
        occurrence: &Occurrence,
        template: &TourTemplate,
    ) -> AppResult<SeatAvailability> {
        let capacity = self.capacity_of(template).await?;
        let sold = self.repository.sold_seats(occurrence.id).await?;
        let seats = SeatAvailability::derive(capacity, sold);

        if seats.is_oversold() {
            warn!(
                "🚨 Instancia {} sobrevendida: {} pasajeros para {} asientos",
                occurrence.id, seats.sold, seats.capacity
            );
        }

        Ok(seats)
    }

    pub async fn capacity_of(&self, template: &TourTemplate) -> AppResult<i32> {
        self.directory
            .vessel_capacity(template.vessel_id)
            .await?
            .ok_or_else(|| not_found_error("Vessel", &template.vessel_id.to_string()))
    }

    /// Instancia y su plantilla (no eliminada)
    pub async fn load(&self, occurrence_id: Uuid) -> AppResult<(Occurrence, TourTemplate)> {
        let occurrence = self
            .repository
            .find_occurrence(occurrence_id)
            .await?
            .ok_or_else(|| not_found_error("Occurrence", &occurrence_id.to_string()))?;

        let template = self
            .repository
            .find_template(occurrence.template_id)
            .await?
            .filter(|t| !t.deleted)
            .ok_or_else(|| not_found_error("TourTemplate", &occurrence.template_id.to_string()))?;

        Ok((occurrence, template))
    }
}
