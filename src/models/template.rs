//! Modelo de TourTemplate (tour programado)
//!
//! Una plantilla liga un tipo de tour con una embarcación, una sede, un horario
//! semanal y una ventana de vigencia. La ventana, no la fecha nominal, es la que
//! se expande en instancias. `status` y `deleted` son ortogonales.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::TourStatus;

/// TourTemplate principal - mapea exactamente a la tabla tour_templates
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TourTemplate {
    pub id: Uuid,
    pub tour_offering_id: Uuid,
    pub vessel_id: Uuid,
    pub site_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub recurrence_pattern_id: Uuid,
    /// Solo informativa
    pub nominal_date: NaiveDate,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub status: TourStatus,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Campos de una plantilla nueva ya validados
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub tour_offering_id: Uuid,
    pub vessel_id: Uuid,
    pub site_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub recurrence_pattern_id: Uuid,
    pub nominal_date: NaiveDate,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
}

impl TourTemplate {
    pub fn new(fields: NewTemplate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tour_offering_id: fields.tour_offering_id,
            vessel_id: fields.vessel_id,
            site_id: fields.site_id,
            driver_id: fields.driver_id,
            recurrence_pattern_id: fields.recurrence_pattern_id,
            nominal_date: fields.nominal_date,
            valid_from: fields.valid_from,
            valid_until: fields.valid_until,
            status: TourStatus::Programado,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn window_contains(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_until
    }

    /// Días de la ventana, ambos extremos incluidos
    pub fn window_days(&self) -> i64 {
        (self.valid_until - self.valid_from).num_days() + 1
    }

    /// Plantilla que todavía reclama sus recursos
    pub fn is_active(&self) -> bool {
        !self.deleted && !self.status.is_terminal()
    }

    /// Itera cada fecha de la ventana de vigencia
    pub fn window_dates(&self) -> impl Iterator<Item = NaiveDate> {
        let until = self.valid_until;
        self.valid_from
            .iter_days()
            .take_while(move |d| *d <= until)
    }
}
