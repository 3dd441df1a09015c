//! Modelo de Occurrence (instancia de tour)
//!
//! Una fecha concreta materializada desde una plantilla. Como mucho una
//! instancia por (plantilla, fecha): índice único en `tour_occurrences`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::recurrence::TimeSlot;
use super::status::TourStatus;
use super::template::TourTemplate;

/// Occurrence principal - mapea exactamente a la tabla tour_occurrences
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Occurrence {
    pub id: Uuid,
    pub template_id: Uuid,
    pub occurrence_date: NaiveDate,
    /// Reemplazo puntual; `None` sigue al chofer por defecto de la plantilla
    pub driver_id: Option<Uuid>,
    pub status: TourStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Occurrence {
    pub fn for_template(template: &TourTemplate, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            template_id: template.id,
            occurrence_date: date,
            driver_id: None,
            status: TourStatus::Programado,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status != TourStatus::Cancelado
    }

    pub fn effective_driver(&self, template: &TourTemplate) -> Option<Uuid> {
        self.driver_id.or(template.driver_id)
    }
}

/// Una instancia con los datos de su plantilla y horario, lo que el
/// verificador de conflictos necesita para comparar franjas
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OccurrenceSlot {
    pub occurrence_id: Uuid,
    pub template_id: Uuid,
    pub occurrence_date: NaiveDate,
    pub status: TourStatus,
    pub vessel_id: Uuid,
    /// Chofer efectivo: el de la instancia o, en su defecto, el de la plantilla
    pub driver_id: Option<Uuid>,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
}

impl OccurrenceSlot {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot {
            start: self.start_time,
            end: self.end_time,
        }
    }
}
