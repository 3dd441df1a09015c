//! Implementación PostgreSQL de los repositorios
//!
//! Consultas en tiempo de ejecución con `sqlx::query_as`. Los filtros opcionales
//! usan el patrón `($n IS NULL OR columna = $n)` para mantener una sola
//! sentencia por consulta.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::schedule_repository::{ResourceDirectory, ScheduleRepository};
use crate::models::{
    BookingOutcome, Occurrence, OccurrenceSlot, RecurrencePattern, Reservation, ReservationStatus,
    ResourceKind, ScheduleFilter, SiteScope, TourStatus, TourTemplate,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Clone)]
pub struct PgScheduleRepository {
    pool: PgPool,
}

impl PgScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn insert_pattern(&self, pattern: &RecurrencePattern) -> AppResult<RecurrencePattern> {
        let saved = sqlx::query_as::<_, RecurrencePattern>(
            r#"
            INSERT INTO recurrence_patterns (
                id, tour_offering_id, driver_id, start_time, end_time,
                monday, tuesday, wednesday, thursday, friday, saturday, sunday,
                deleted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(pattern.id)
        .bind(pattern.tour_offering_id)
        .bind(pattern.driver_id)
        .bind(pattern.start_time)
        .bind(pattern.end_time)
        .bind(pattern.monday)
        .bind(pattern.tuesday)
        .bind(pattern.wednesday)
        .bind(pattern.thursday)
        .bind(pattern.friday)
        .bind(pattern.saturday)
        .bind(pattern.sunday)
        .bind(pattern.deleted)
        .bind(pattern.created_at)
        .bind(pattern.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn update_pattern(&self, pattern: &RecurrencePattern) -> AppResult<RecurrencePattern> {
        sqlx::query_as::<_, RecurrencePattern>(
            r#"
            UPDATE recurrence_patterns
            SET start_time = $2, end_time = $3,
                monday = $4, tuesday = $5, wednesday = $6, thursday = $7,
                friday = $8, saturday = $9, sunday = $10,
                deleted = $11, updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(pattern.id)
        .bind(pattern.start_time)
        .bind(pattern.end_time)
        .bind(pattern.monday)
        .bind(pattern.tuesday)
        .bind(pattern.wednesday)
        .bind(pattern.thursday)
        .bind(pattern.friday)
        .bind(pattern.saturday)
        .bind(pattern.sunday)
        .bind(pattern.deleted)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("RecurrencePattern", &pattern.id.to_string()))
    }

    async fn find_pattern(&self, id: Uuid) -> AppResult<Option<RecurrencePattern>> {
        let pattern = sqlx::query_as::<_, RecurrencePattern>(
            "SELECT * FROM recurrence_patterns WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pattern)
    }

    async fn list_patterns(
        &self,
        tour_offering_id: Option<Uuid>,
        driver_id: Option<Uuid>,
    ) -> AppResult<Vec<RecurrencePattern>> {
        let patterns = sqlx::query_as::<_, RecurrencePattern>(
            r#"
            SELECT * FROM recurrence_patterns
            WHERE deleted = FALSE
              AND ($1::uuid IS NULL OR tour_offering_id = $1)
              AND ($2::uuid IS NULL OR driver_id = $2)
            ORDER BY start_time, created_at
            "#,
        )
        .bind(tour_offering_id)
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(patterns)
    }

    async fn insert_template(&self, template: &TourTemplate) -> AppResult<TourTemplate> {
        let saved = sqlx::query_as::<_, TourTemplate>(
            r#"
            INSERT INTO tour_templates (
                id, tour_offering_id, vessel_id, site_id, driver_id, recurrence_pattern_id,
                nominal_date, valid_from, valid_until, status, deleted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(template.id)
        .bind(template.tour_offering_id)
        .bind(template.vessel_id)
        .bind(template.site_id)
        .bind(template.driver_id)
        .bind(template.recurrence_pattern_id)
        .bind(template.nominal_date)
        .bind(template.valid_from)
        .bind(template.valid_until)
        .bind(template.status)
        .bind(template.deleted)
        .bind(template.created_at)
        .bind(template.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn update_template(&self, template: &TourTemplate) -> AppResult<TourTemplate> {
        sqlx::query_as::<_, TourTemplate>(
            r#"
            UPDATE tour_templates
            SET tour_offering_id = $2, vessel_id = $3, site_id = $4, driver_id = $5,
                recurrence_pattern_id = $6, nominal_date = $7, valid_from = $8,
                valid_until = $9, status = $10, deleted = $11, updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(template.id)
        .bind(template.tour_offering_id)
        .bind(template.vessel_id)
        .bind(template.site_id)
        .bind(template.driver_id)
        .bind(template.recurrence_pattern_id)
        .bind(template.nominal_date)
        .bind(template.valid_from)
        .bind(template.valid_until)
        .bind(template.status)
        .bind(template.deleted)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Template", &template.id.to_string()))
    }

    async fn find_template(&self, id: Uuid) -> AppResult<Option<TourTemplate>> {
        let template =
            sqlx::query_as::<_, TourTemplate>("SELECT * FROM tour_templates WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(template)
    }

    async fn list_templates(
        &self,
        filter: &ScheduleFilter,
        scope: &SiteScope,
        today: NaiveDate,
    ) -> AppResult<Vec<TourTemplate>> {
        let templates = sqlx::query_as::<_, TourTemplate>(
            r#"
            SELECT * FROM tour_templates
            WHERE ($1::boolean OR deleted = FALSE)
              AND ($2::uuid IS NULL OR site_id = $2)
              AND ($3::uuid IS NULL OR tour_offering_id = $3)
              AND ($4::uuid IS NULL OR driver_id = $4)
              AND ($5::uuid IS NULL OR vessel_id = $5)
              AND ($6::tour_status IS NULL OR status = $6)
              AND ($7::date IS NULL OR (valid_from <= $7 AND $7 <= valid_until))
              AND ($8::date IS NULL OR valid_until >= $8)
              AND ($9::date IS NULL OR valid_from <= $9)
              AND (NOT $10::boolean OR (valid_from <= $11 AND $11 <= valid_until))
              AND ($12::uuid[] IS NULL OR site_id = ANY($12))
            ORDER BY valid_from, created_at
            "#,
        )
        .bind(filter.include_deleted)
        .bind(filter.site_id)
        .bind(filter.tour_offering_id)
        .bind(filter.driver_id)
        .bind(filter.vessel_id)
        .bind(filter.status)
        .bind(filter.date)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.currently_valid)
        .bind(today)
        .bind(scope.site_ids())
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    async fn templates_using_pattern(&self, pattern_id: Uuid) -> AppResult<Vec<TourTemplate>> {
        let templates = sqlx::query_as::<_, TourTemplate>(
            "SELECT * FROM tour_templates WHERE recurrence_pattern_id = $1 AND deleted = FALSE",
        )
        .bind(pattern_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    async fn templates_for_resource(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> AppResult<Vec<TourTemplate>> {
        let templates = sqlx::query_as::<_, TourTemplate>(
            r#"
            SELECT * FROM tour_templates
            WHERE deleted = FALSE
              AND (($1::text = 'vessel' AND vessel_id = $2) OR ($1::text = 'driver' AND driver_id = $2))
            "#,
        )
        .bind(kind.as_str())
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    async fn insert_occurrence_if_absent(&self, occurrence: &Occurrence) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO tour_occurrences (
                id, template_id, occurrence_date, driver_id, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (template_id, occurrence_date) DO NOTHING
            "#,
        )
        .bind(occurrence.id)
        .bind(occurrence.template_id)
        .bind(occurrence.occurrence_date)
        .bind(occurrence.driver_id)
        .bind(occurrence.status)
        .bind(occurrence.created_at)
        .bind(occurrence.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_occurrence(&self, id: Uuid) -> AppResult<Option<Occurrence>> {
        let occurrence =
            sqlx::query_as::<_, Occurrence>("SELECT * FROM tour_occurrences WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(occurrence)
    }

    async fn find_occurrence_on(
        &self,
        template_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<Occurrence>> {
        let occurrence = sqlx::query_as::<_, Occurrence>(
            "SELECT * FROM tour_occurrences WHERE template_id = $1 AND occurrence_date = $2",
        )
        .bind(template_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(occurrence)
    }

    async fn occurrences_for_template(&self, template_id: Uuid) -> AppResult<Vec<Occurrence>> {
        let occurrences = sqlx::query_as::<_, Occurrence>(
            "SELECT * FROM tour_occurrences WHERE template_id = $1 ORDER BY occurrence_date",
        )
        .bind(template_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(occurrences)
    }

    async fn list_occurrences(
        &self,
        filter: &ScheduleFilter,
        scope: &SiteScope,
        today: NaiveDate,
    ) -> AppResult<Vec<Occurrence>> {
        let occurrences = sqlx::query_as::<_, Occurrence>(
            r#"
            SELECT o.* FROM tour_occurrences o
            JOIN tour_templates t ON t.id = o.template_id
            WHERE ($1::boolean OR t.deleted = FALSE)
              AND ($2::uuid IS NULL OR t.site_id = $2)
              AND ($3::uuid IS NULL OR t.tour_offering_id = $3)
              AND ($4::uuid IS NULL OR COALESCE(o.driver_id, t.driver_id) = $4)
              AND ($5::uuid IS NULL OR t.vessel_id = $5)
              AND ($6::tour_status IS NULL OR o.status = $6)
              AND ($7::date IS NULL OR o.occurrence_date = $7)
              AND ($8::date IS NULL OR o.occurrence_date >= $8)
              AND ($9::date IS NULL OR o.occurrence_date <= $9)
              AND (NOT $10::boolean OR (t.valid_from <= $11 AND $11 <= t.valid_until))
              AND ($12::uuid[] IS NULL OR t.site_id = ANY($12))
            ORDER BY o.occurrence_date, o.created_at
            "#,
        )
        .bind(filter.include_deleted)
        .bind(filter.site_id)
        .bind(filter.tour_offering_id)
        .bind(filter.driver_id)
        .bind(filter.vessel_id)
        .bind(filter.status)
        .bind(filter.date)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.currently_valid)
        .bind(today)
        .bind(scope.site_ids())
        .fetch_all(&self.pool)
        .await?;

        Ok(occurrences)
    }

    async fn update_occurrence(&self, occurrence: &Occurrence) -> AppResult<Occurrence> {
        sqlx::query_as::<_, Occurrence>(
            r#"
            UPDATE tour_occurrences
            SET driver_id = $2, status = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(occurrence.id)
        .bind(occurrence.driver_id)
        .bind(occurrence.status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Occurrence", &occurrence.id.to_string()))
    }

    async fn cancel_future_occurrences(&self, template_id: Uuid, from: NaiveDate) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE tour_occurrences
            SET status = $3, updated_at = $4
            WHERE template_id = $1
              AND occurrence_date >= $2
              AND status IN ('PROGRAMADO', 'EN_CURSO')
            "#,
        )
        .bind(template_id)
        .bind(from)
        .bind(TourStatus::Cancelado)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(
            "🚫 {} instancias canceladas en cascada para plantilla {}",
            result.rows_affected(),
            template_id
        );
        Ok(result.rows_affected())
    }

    async fn occurrence_slots_on(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<OccurrenceSlot>> {
        let slots = sqlx::query_as::<_, OccurrenceSlot>(
            r#"
            SELECT o.id AS occurrence_id, o.template_id, o.occurrence_date, o.status,
                   t.vessel_id, COALESCE(o.driver_id, t.driver_id) AS driver_id,
                   p.start_time, p.end_time
            FROM tour_occurrences o
            JOIN tour_templates t ON t.id = o.template_id
            JOIN recurrence_patterns p ON p.id = t.recurrence_pattern_id
            WHERE o.occurrence_date = $1
              AND t.deleted = FALSE
              AND (($2::text = 'vessel' AND t.vessel_id = $3)
                   OR ($2::text = 'driver' AND COALESCE(o.driver_id, t.driver_id) = $3))
            "#,
        )
        .bind(date)
        .bind(kind.as_str())
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    async fn sold_seats(&self, occurrence_id: Uuid) -> AppResult<i32> {
        let (sold,): (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(passengers), 0)::BIGINT
            FROM reservations
            WHERE occurrence_id = $1 AND status <> 'CANCELADA' AND deleted = FALSE
            "#,
        )
        .bind(occurrence_id)
        .fetch_one(&self.pool)
        .await?;

        i32::try_from(sold).map_err(|_| AppError::Internal(format!("Seat sum overflow: {}", sold)))
    }

    async fn insert_reservation_guarded(
        &self,
        reservation: &Reservation,
        capacity: i32,
    ) -> AppResult<BookingOutcome> {
        let mut tx = self.pool.begin().await.map_err(AppError::from_db_race)?;

        // Bloqueo de la fila de la instancia: serializa los check-and-insert concurrentes
        // y las cancelaciones, que también actualizan esa fila
        let locked: Option<(TourStatus, TourStatus, bool)> = sqlx::query_as(
            r#"
            SELECT o.status, t.status, t.deleted
            FROM tour_occurrences o
            JOIN tour_templates t ON t.id = o.template_id
            WHERE o.id = $1
            FOR UPDATE OF o
            "#,
        )
        .bind(reservation.occurrence_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from_db_race)?;

        let (occurrence_status, template_status, template_deleted) = locked.ok_or_else(|| {
            not_found_error("Occurrence", &reservation.occurrence_id.to_string())
        })?;

        if !occurrence_status.is_bookable() || !template_status.is_bookable() || template_deleted {
            tx.rollback().await.map_err(AppError::from_db_race)?;
            let status = if occurrence_status.is_bookable() {
                template_status
            } else {
                occurrence_status
            };
            debug!(
                "⛔ Instancia {} cerrada a reservas ({})",
                reservation.occurrence_id, status
            );
            return Ok(BookingOutcome::Closed { status });
        }

        let (sold,): (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(passengers), 0)::BIGINT
            FROM reservations
            WHERE occurrence_id = $1 AND status <> 'CANCELADA' AND deleted = FALSE
            "#,
        )
        .bind(reservation.occurrence_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from_db_race)?;

        let remaining = (i64::from(capacity) - sold).max(0);
        if i64::from(reservation.passengers) > remaining {
            tx.rollback().await.map_err(AppError::from_db_race)?;
            debug!(
                "⛔ Capacidad insuficiente en {}: solicitados {}, disponibles {}",
                reservation.occurrence_id, reservation.passengers, remaining
            );
            return Ok(BookingOutcome::Exceeded {
                remaining: remaining as i32,
            });
        }

        let saved = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (
                id, occurrence_id, passengers, status, client_reference, deleted, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.occurrence_id)
        .bind(reservation.passengers)
        .bind(reservation.status)
        .bind(&reservation.client_reference)
        .bind(reservation.deleted)
        .bind(reservation.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from_db_race)?;

        tx.commit().await.map_err(AppError::from_db_race)?;

        Ok(BookingOutcome::Committed(saved))
    }

    async fn find_reservation(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(reservation)
    }

    async fn cancel_reservation(&self, id: Uuid) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(ReservationStatus::Cancelada)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Reservation", &id.to_string()))
    }
}

/// Lecturas de colaboradores sobre las mismas tablas compartidas
#[derive(Clone)]
pub struct PgResourceDirectory {
    pool: PgPool,
}

impl PgResourceDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceDirectory for PgResourceDirectory {
    async fn vessel_capacity(&self, vessel_id: Uuid) -> AppResult<Option<i32>> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT capacity FROM vessels WHERE id = $1 AND deleted = FALSE")
                .bind(vessel_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(capacity,)| capacity))
    }

    async fn driver_pattern(&self, driver_id: Uuid) -> AppResult<Option<RecurrencePattern>> {
        let pattern = sqlx::query_as::<_, RecurrencePattern>(
            r#"
            SELECT p.* FROM recurrence_patterns p
            JOIN drivers d ON d.id = p.driver_id
            WHERE p.driver_id = $1 AND p.deleted = FALSE AND d.deleted = FALSE
            ORDER BY p.updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pattern)
    }

    async fn tour_offering_active(&self, tour_offering_id: Uuid) -> AppResult<bool> {
        let (active,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM tour_offerings WHERE id = $1 AND active = TRUE)",
        )
        .bind(tour_offering_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(active)
    }

    async fn site_active(&self, site_id: Uuid) -> AppResult<bool> {
        let (active,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM sites WHERE id = $1 AND active = TRUE)")
                .bind(site_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(active)
    }
}
