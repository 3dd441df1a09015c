use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Occurrence, ScheduleFilter, SeatAvailability, TourStatus};

// Request para reservar asientos
#[derive(Debug, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(range(min = 1, max = 500))]
    pub passengers: i32,

    #[validate(length(min = 1, max = 100))]
    pub client_reference: Option<String>,
}

// Response de instancia con asientos
#[derive(Debug, Serialize)]
pub struct OccurrenceDetailResponse {
    pub occurrence: Occurrence,
    pub seats: SeatAvailability,
}

/// Filtros de `GET /api/occurrences/available`
#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    pub date: NaiveDate,
    pub site_id: Option<Uuid>,
    pub tour_offering_id: Option<Uuid>,
}

impl AvailableQuery {
    pub fn filter(&self) -> ScheduleFilter {
        ScheduleFilter {
            site_id: self.site_id,
            tour_offering_id: self.tour_offering_id,
            status: Some(TourStatus::Programado),
            date: Some(self.date),
            ..Default::default()
        }
    }
}
