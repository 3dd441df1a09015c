//! Contratos de persistencia
//!
//! `ScheduleRepository` guarda horarios, plantillas e instancias y expone la
//! lectura de reservas más el check-and-insert atómico. `ResourceDirectory`
//! agrupa las lecturas de colaboradores externos (embarcaciones, choferes,
//! tipos de tour, sedes).

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    BookingOutcome, Occurrence, OccurrenceSlot, RecurrencePattern, Reservation, ResourceKind,
    ScheduleFilter, SiteScope, TourTemplate,
};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    // Horarios

    async fn insert_pattern(&self, pattern: &RecurrencePattern) -> AppResult<RecurrencePattern>;

    async fn update_pattern(&self, pattern: &RecurrencePattern) -> AppResult<RecurrencePattern>;

    /// Incluye horarios eliminados; el servicio decide
    async fn find_pattern(&self, id: Uuid) -> AppResult<Option<RecurrencePattern>>;

    /// Excluye horarios eliminados
    async fn list_patterns(
        &self,
        tour_offering_id: Option<Uuid>,
        driver_id: Option<Uuid>,
    ) -> AppResult<Vec<RecurrencePattern>>;

    // Plantillas

    async fn insert_template(&self, template: &TourTemplate) -> AppResult<TourTemplate>;

    async fn update_template(&self, template: &TourTemplate) -> AppResult<TourTemplate>;

    async fn find_template(&self, id: Uuid) -> AppResult<Option<TourTemplate>>;

    async fn list_templates(
        &self,
        filter: &ScheduleFilter,
        scope: &SiteScope,
        today: NaiveDate,
    ) -> AppResult<Vec<TourTemplate>>;

    /// Plantillas no eliminadas que usan el horario
    async fn templates_using_pattern(&self, pattern_id: Uuid) -> AppResult<Vec<TourTemplate>>;

    /// Plantillas no eliminadas cuyo chofer por defecto o embarcación es el recurso
    async fn templates_for_resource(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> AppResult<Vec<TourTemplate>>;

    // Instancias

    /// `false` si ya existe una instancia para (plantilla, fecha)
    async fn insert_occurrence_if_absent(&self, occurrence: &Occurrence) -> AppResult<bool>;

    async fn find_occurrence(&self, id: Uuid) -> AppResult<Option<Occurrence>>;

    async fn find_occurrence_on(
        &self,
        template_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<Occurrence>>;

    async fn occurrences_for_template(&self, template_id: Uuid) -> AppResult<Vec<Occurrence>>;

    async fn list_occurrences(
        &self,
        filter: &ScheduleFilter,
        scope: &SiteScope,
        today: NaiveDate,
    ) -> AppResult<Vec<Occurrence>>;

    async fn update_occurrence(&self, occurrence: &Occurrence) -> AppResult<Occurrence>;

    /// Cancela instancias con fecha >= `from` que no estén en estado terminal
    async fn cancel_future_occurrences(&self, template_id: Uuid, from: NaiveDate) -> AppResult<u64>;

    /// Instancias (de cualquier estado) de plantillas no eliminadas que usan el recurso en la fecha
    async fn occurrence_slots_on(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<OccurrenceSlot>>;

    // Reservas

    /// Suma de pasajeros de reservas no canceladas ni eliminadas
    async fn sold_seats(&self, occurrence_id: Uuid) -> AppResult<i32>;

    /// Lee los asientos vendidos e inserta la reserva como una sola unidad atómica
    async fn insert_reservation_guarded(
        &self,
        reservation: &Reservation,
        capacity: i32,
    ) -> AppResult<BookingOutcome>;

    async fn find_reservation(&self, id: Uuid) -> AppResult<Option<Reservation>>;

    async fn cancel_reservation(&self, id: Uuid) -> AppResult<Reservation>;
}

/// Lecturas de colaboradores externos
#[async_trait]
pub trait ResourceDirectory: Send + Sync {
    /// `None` si la embarcación no existe o está eliminada
    async fn vessel_capacity(&self, vessel_id: Uuid) -> AppResult<Option<i32>>;

    /// Horario de turno del chofer
    async fn driver_pattern(&self, driver_id: Uuid) -> AppResult<Option<RecurrencePattern>>;

    async fn tour_offering_active(&self, tour_offering_id: Uuid) -> AppResult<bool>;

    async fn site_active(&self, site_id: Uuid) -> AppResult<bool>;
}
