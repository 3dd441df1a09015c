//! Implementación en memoria
//!
//! Backend para pruebas y desarrollo local. Todo el estado vive detrás de un
//! único `RwLock`, así que el check-and-insert de reservas es atómico igual que
//! con el bloqueo de fila en PostgreSQL.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::schedule_repository::{ResourceDirectory, ScheduleRepository};
use crate::models::{
    BookingOutcome, Occurrence, OccurrenceSlot, RecurrencePattern, Reservation, ReservationStatus,
    ResourceKind, ScheduleFilter, SiteScope, TourStatus, TourTemplate,
};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

#[derive(Debug, Default)]
struct MemoryState {
    patterns: HashMap<Uuid, RecurrencePattern>,
    templates: HashMap<Uuid, TourTemplate>,
    occurrences: HashMap<Uuid, Occurrence>,
    reservations: HashMap<Uuid, Reservation>,
    vessels: HashMap<Uuid, i32>,
    drivers: HashMap<Uuid, bool>,
    tour_offerings: HashMap<Uuid, bool>,
    sites: HashMap<Uuid, bool>,
}

impl MemoryState {
    fn sold_seats(&self, occurrence_id: Uuid) -> i32 {
        self.reservations
            .values()
            .filter(|r| r.occurrence_id == occurrence_id && r.holds_seats())
            .map(|r| r.passengers)
            .sum()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryScheduleRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una embarcación con su capacidad nominal
    pub async fn add_vessel(&self, vessel_id: Uuid, capacity: i32) {
        self.state.write().await.vessels.insert(vessel_id, capacity);
    }

    pub async fn add_driver(&self, driver_id: Uuid) {
        self.state.write().await.drivers.insert(driver_id, true);
    }

    pub async fn add_tour_offering(&self, tour_offering_id: Uuid, active: bool) {
        self.state
            .write()
            .await
            .tour_offerings
            .insert(tour_offering_id, active);
    }

    pub async fn add_site(&self, site_id: Uuid, active: bool) {
        self.state.write().await.sites.insert(site_id, active);
    }

    /// Inserta una reserva sin verificar capacidad (datos heredados del servicio de reservas)
    pub async fn seed_reservation(&self, reservation: Reservation) {
        self.state
            .write()
            .await
            .reservations
            .insert(reservation.id, reservation);
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn insert_pattern(&self, pattern: &RecurrencePattern) -> AppResult<RecurrencePattern> {
        let mut state = self.state.write().await;
        if state.patterns.contains_key(&pattern.id) {
            return Err(conflict_error("RecurrencePattern", &pattern.id.to_string(), "already exists"));
        }
        state.patterns.insert(pattern.id, pattern.clone());
        Ok(pattern.clone())
    }

    async fn update_pattern(&self, pattern: &RecurrencePattern) -> AppResult<RecurrencePattern> {
        let mut state = self.state.write().await;
        let stored = state
            .patterns
            .get_mut(&pattern.id)
            .ok_or_else(|| not_found_error("RecurrencePattern", &pattern.id.to_string()))?;
        *stored = RecurrencePattern {
            updated_at: Utc::now(),
            ..pattern.clone()
        };
        Ok(stored.clone())
    }

    async fn find_pattern(&self, id: Uuid) -> AppResult<Option<RecurrencePattern>> {
        Ok(self.state.read().await.patterns.get(&id).cloned())
    }

    async fn list_patterns(
        &self,
        tour_offering_id: Option<Uuid>,
        driver_id: Option<Uuid>,
    ) -> AppResult<Vec<RecurrencePattern>> {
        let state = self.state.read().await;
        let mut patterns: Vec<RecurrencePattern> = state
            .patterns
            .values()
            .filter(|p| !p.deleted)
            .filter(|p| tour_offering_id.is_none() || p.tour_offering_id == tour_offering_id)
            .filter(|p| driver_id.is_none() || p.driver_id == driver_id)
            .cloned()
            .collect();
        patterns.sort_by_key(|p| (p.start_time, p.created_at));
        Ok(patterns)
    }

    async fn insert_template(&self, template: &TourTemplate) -> AppResult<TourTemplate> {
        let mut state = self.state.write().await;
        if state.templates.contains_key(&template.id) {
            return Err(conflict_error("Template", &template.id.to_string(), "already exists"));
        }
        state.templates.insert(template.id, template.clone());
        Ok(template.clone())
    }

    async fn update_template(&self, template: &TourTemplate) -> AppResult<TourTemplate> {
        let mut state = self.state.write().await;
        let stored = state
            .templates
            .get_mut(&template.id)
            .ok_or_else(|| not_found_error("Template", &template.id.to_string()))?;
        *stored = TourTemplate {
            updated_at: Utc::now(),
            ..template.clone()
        };
        Ok(stored.clone())
    }

    async fn find_template(&self, id: Uuid) -> AppResult<Option<TourTemplate>> {
        Ok(self.state.read().await.templates.get(&id).cloned())
    }

    async fn list_templates(
        &self,
        filter: &ScheduleFilter,
        scope: &SiteScope,
        today: NaiveDate,
    ) -> AppResult<Vec<TourTemplate>> {
        let state = self.state.read().await;
        let mut templates: Vec<TourTemplate> = state
            .templates
            .values()
            .filter(|t| scope.allows(t.site_id) && filter.matches_template(t, today))
            .cloned()
            .collect();
        templates.sort_by_key(|t| (t.valid_from, t.created_at));
        Ok(templates)
    }

    async fn templates_using_pattern(&self, pattern_id: Uuid) -> AppResult<Vec<TourTemplate>> {
        let state = self.state.read().await;
        Ok(state
            .templates
            .values()
            .filter(|t| !t.deleted && t.recurrence_pattern_id == pattern_id)
            .cloned()
            .collect())
    }

    async fn templates_for_resource(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> AppResult<Vec<TourTemplate>> {
        let state = self.state.read().await;
        Ok(state
            .templates
            .values()
            .filter(|t| !t.deleted)
            .filter(|t| match kind {
                ResourceKind::Vessel => t.vessel_id == resource_id,
                ResourceKind::Driver => t.driver_id == Some(resource_id),
            })
            .cloned()
            .collect())
    }

    async fn insert_occurrence_if_absent(&self, occurrence: &Occurrence) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let exists = state.occurrences.values().any(|o| {
            o.template_id == occurrence.template_id
                && o.occurrence_date == occurrence.occurrence_date
        });
        if exists {
            return Ok(false);
        }
        state.occurrences.insert(occurrence.id, occurrence.clone());
        Ok(true)
    }

    async fn find_occurrence(&self, id: Uuid) -> AppResult<Option<Occurrence>> {
        Ok(self.state.read().await.occurrences.get(&id).cloned())
    }

    async fn find_occurrence_on(
        &self,
        template_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<Occurrence>> {
        let state = self.state.read().await;
        Ok(state
            .occurrences
            .values()
            .find(|o| o.template_id == template_id && o.occurrence_date == date)
            .cloned())
    }

    async fn occurrences_for_template(&self, template_id: Uuid) -> AppResult<Vec<Occurrence>> {
        let state = self.state.read().await;
        let mut occurrences: Vec<Occurrence> = state
            .occurrences
            .values()
            .filter(|o| o.template_id == template_id)
            .cloned()
            .collect();
        occurrences.sort_by_key(|o| o.occurrence_date);
        Ok(occurrences)
    }

    async fn list_occurrences(
        &self,
        filter: &ScheduleFilter,
        scope: &SiteScope,
        today: NaiveDate,
    ) -> AppResult<Vec<Occurrence>> {
        let state = self.state.read().await;
        let mut occurrences: Vec<Occurrence> = state
            .occurrences
            .values()
            .filter(|o| {
                state.templates.get(&o.template_id).is_some_and(|t| {
                    scope.allows(t.site_id) && filter.matches_occurrence(o, t, today)
                })
            })
            .cloned()
            .collect();
        occurrences.sort_by_key(|o| (o.occurrence_date, o.created_at));
        Ok(occurrences)
    }

    async fn update_occurrence(&self, occurrence: &Occurrence) -> AppResult<Occurrence> {
        let mut state = self.state.write().await;
        let stored = state
            .occurrences
            .get_mut(&occurrence.id)
            .ok_or_else(|| not_found_error("Occurrence", &occurrence.id.to_string()))?;
        stored.driver_id = occurrence.driver_id;
        stored.status = occurrence.status;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn cancel_future_occurrences(&self, template_id: Uuid, from: NaiveDate) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut cancelled = 0;
        for occurrence in state.occurrences.values_mut().filter(|o| {
            o.template_id == template_id && o.occurrence_date >= from && !o.status.is_terminal()
        }) {
            occurrence.status = TourStatus::Cancelado;
            occurrence.updated_at = now;
            cancelled += 1;
        }
        Ok(cancelled)
    }

    async fn occurrence_slots_on(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<OccurrenceSlot>> {
        let state = self.state.read().await;
        let slots = state
            .occurrences
            .values()
            .filter(|o| o.occurrence_date == date)
            .filter_map(|o| {
                let template = state.templates.get(&o.template_id).filter(|t| !t.deleted)?;
                let pattern = state.patterns.get(&template.recurrence_pattern_id)?;
                let driver_id = o.effective_driver(template);
                let uses_resource = match kind {
                    ResourceKind::Vessel => template.vessel_id == resource_id,
                    ResourceKind::Driver => driver_id == Some(resource_id),
                };
                uses_resource.then(|| OccurrenceSlot {
                    occurrence_id: o.id,
                    template_id: template.id,
                    occurrence_date: o.occurrence_date,
                    status: o.status,
                    vessel_id: template.vessel_id,
                    driver_id,
                    start_time: pattern.start_time,
                    end_time: pattern.end_time,
                })
            })
            .collect();
        Ok(slots)
    }

    async fn sold_seats(&self, occurrence_id: Uuid) -> AppResult<i32> {
        Ok(self.state.read().await.sold_seats(occurrence_id))
    }

    async fn insert_reservation_guarded(
        &self,
        reservation: &Reservation,
        capacity: i32,
    ) -> AppResult<BookingOutcome> {
        let mut state = self.state.write().await;
        let occurrence = state
            .occurrences
            .get(&reservation.occurrence_id)
            .ok_or_else(|| not_found_error("Occurrence", &reservation.occurrence_id.to_string()))?;
        let template = state
            .templates
            .get(&occurrence.template_id)
            .filter(|t| !t.deleted)
            .ok_or_else(|| not_found_error("TourTemplate", &occurrence.template_id.to_string()))?;
        if !occurrence.status.is_bookable() {
            return Ok(BookingOutcome::Closed {
                status: occurrence.status,
            });
        }
        if !template.status.is_bookable() {
            return Ok(BookingOutcome::Closed {
                status: template.status,
            });
        }

        let remaining = (capacity - state.sold_seats(reservation.occurrence_id)).max(0);
        if reservation.passengers > remaining {
            return Ok(BookingOutcome::Exceeded { remaining });
        }

        state.reservations.insert(reservation.id, reservation.clone());
        Ok(BookingOutcome::Committed(reservation.clone()))
    }

    async fn find_reservation(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        Ok(self.state.read().await.reservations.get(&id).cloned())
    }

    async fn cancel_reservation(&self, id: Uuid) -> AppResult<Reservation> {
        let mut state = self.state.write().await;
        let reservation = state
            .reservations
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;
        reservation.status = ReservationStatus::Cancelada;
        Ok(reservation.clone())
    }
}

#[async_trait]
impl ResourceDirectory for InMemoryScheduleRepository {
    async fn vessel_capacity(&self, vessel_id: Uuid) -> AppResult<Option<i32>> {
        Ok(self.state.read().await.vessels.get(&vessel_id).copied())
    }

    async fn driver_pattern(&self, driver_id: Uuid) -> AppResult<Option<RecurrencePattern>> {
        let state = self.state.read().await;
        if !state.drivers.get(&driver_id).copied().unwrap_or(false) {
            return Ok(None);
        }
        Ok(state
            .patterns
            .values()
            .filter(|p| !p.deleted && p.driver_id == Some(driver_id))
            .max_by_key(|p| p.updated_at)
            .cloned())
    }

    async fn tour_offering_active(&self, tour_offering_id: Uuid) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .tour_offerings
            .get(&tour_offering_id)
            .copied()
            .unwrap_or(false))
    }

    async fn site_active(&self, site_id: Uuid) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .sites
            .get(&site_id)
            .copied()
            .unwrap_or(false))
    }
}
