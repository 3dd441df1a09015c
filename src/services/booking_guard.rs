//! Reserva atómica de asientos
//!
//! La lectura de asientos vendidos y la inserción de la reserva ocurren dentro
//! de una misma unidad atómica en el repositorio. Si la base aborta la
//! transacción por concurrencia se reintenta una sola vez; el segundo aborto se
//! devuelve como conflicto.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{BookingOutcome, Reservation, ReservationStatus, SiteScope};
use crate::repositories::ScheduleRepository;
use crate::services::capacity_tracker::CapacityTracker;
use crate::services::schedule_validator::ScheduleValidator;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

const MAX_ATTEMPTS: u32 = 2;

#[derive(Clone)]
pub struct BookingGuard {
    repository: Arc<dyn ScheduleRepository>,
    capacity: CapacityTracker,
    validator: ScheduleValidator,
}

impl BookingGuard {
    pub fn new(
        repository: Arc<dyn ScheduleRepository>,
        capacity: CapacityTracker,
        validator: ScheduleValidator,
    ) -> Self {
        Self {
            repository,
            capacity,
            validator,
        }
    }

    pub async fn commit_booking(
        &self,
        occurrence_id: Uuid,
        passengers: i32,
        client_reference: Option<String>,
        scope: &SiteScope,
    ) -> AppResult<Reservation> {
        self.validator.passengers(passengers)?;

        let (occurrence, template) = self.capacity.load(occurrence_id).await?;
        self.validator.site_access(scope, template.site_id, "book seats")?;

        if !occurrence.status.is_bookable() || !template.status.is_bookable() {
            return Err(conflict_error(
                "Occurrence",
                &occurrence_id.to_string(),
                &format!("is not open for booking ({})", occurrence.status),
            ));
        }

        let reservation = Reservation::confirmed(occurrence.id, passengers, client_reference);
        let mut attempt = 1;

        loop {
            // La capacidad se relee en cada intento
            let capacity = self.capacity.capacity_of(&template).await?;

            match self
                .repository
                .insert_reservation_guarded(&reservation, capacity)
                .await
            {
                Ok(BookingOutcome::Committed(stored)) => {
                    info!(
                        "🎟️ Reserva {} confirmada: {} pasajeros en instancia {}",
                        stored.id, stored.passengers, occurrence.id
                    );
                    return Ok(stored);
                }
                Ok(BookingOutcome::Exceeded { remaining }) => {
                    return Err(AppError::CapacityExceeded {
                        requested: passengers,
                        remaining,
                    });
                }
                Ok(BookingOutcome::Closed { status }) => {
                    return Err(conflict_error(
                        "Occurrence",
                        &occurrence_id.to_string(),
                        &format!("is not open for booking ({})", status),
                    ));
                }
                Err(AppError::ConcurrencyAbort(reason)) if attempt < MAX_ATTEMPTS => {
                    warn!(
                        "🔁 Reserva en instancia {} abortada por concurrencia, reintentando: {}",
                        occurrence.id, reason
                    );
                    attempt += 1;
                }
                Err(AppError::ConcurrencyAbort(reason)) => {
                    warn!(
                        "⛔ Reserva en instancia {} abortada {} veces: {}",
                        occurrence.id, attempt, reason
                    );
                    return Err(conflict_error(
                        "Occurrence",
                        &occurrence_id.to_string(),
                        "is under concurrent modification, retry later",
                    ));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Cancela la reserva y libera sus asientos
    pub async fn release_booking(&self, reservation_id: Uuid, scope: &SiteScope) -> AppResult<Reservation> {
        let reservation = self
            .repository
            .find_reservation(reservation_id)
            .await?
            .filter(|r| !r.deleted)
            .ok_or_else(|| not_found_error("Reservation", &reservation_id.to_string()))?;

        let (_, template) = self.capacity.load(reservation.occurrence_id).await?;
        self.validator
            .site_access(scope, template.site_id, "release seats")?;

        if reservation.status == ReservationStatus::Cancelada {
            return Err(conflict_error(
                "Reservation",
                &reservation_id.to_string(),
                "is already cancelled",
            ));
        }

        let released = self.repository.cancel_reservation(reservation_id).await?;
        info!(
            "🎟️ Reserva {} cancelada, {} asientos liberados",
            released.id, released.passengers
        );
        Ok(released)
    }
}
