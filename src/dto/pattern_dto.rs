use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{PatternOwner, WeekdayFlags};
use crate::utils::validation::validate_time;

fn time_field(value: &str) -> Result<(), ValidationError> {
    validate_time(value).map(|_| ())
}

fn single_owner(request: &CreatePatternRequest) -> Result<(), ValidationError> {
    if request.tour_offering_id.is_some() == request.driver_id.is_some() {
        let mut error = ValidationError::new("owner");
        error.message = Some("exactly one of tour_offering_id or driver_id is required".into());
        return Err(error);
    }
    Ok(())
}

// Request para crear un horario recurrente
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "single_owner"))]
pub struct CreatePatternRequest {
    pub tour_offering_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,

    #[validate(custom = "time_field")]
    pub start_time: String,

    #[validate(custom = "time_field")]
    pub end_time: String,

    #[validate(length(min = 1, max = 7))]
    pub days: Vec<Weekday>,
}

impl CreatePatternRequest {
    pub fn owner(&self) -> Option<PatternOwner> {
        match (self.tour_offering_id, self.driver_id) {
            (Some(id), None) => Some(PatternOwner::TourOffering(id)),
            (None, Some(id)) => Some(PatternOwner::Driver(id)),
            _ => None,
        }
    }

    /// Horas ya validadas por `time_field`
    pub fn times(&self) -> Result<(NaiveTime, NaiveTime), ValidationError> {
        Ok((validate_time(&self.start_time)?, validate_time(&self.end_time)?))
    }

    pub fn flags(&self) -> WeekdayFlags {
        WeekdayFlags::from_days(&self.days)
    }
}

// Request para actualizar un horario
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePatternRequest {
    #[validate(custom = "time_field")]
    pub start_time: Option<String>,

    #[validate(custom = "time_field")]
    pub end_time: Option<String>,

    pub days: Option<Vec<Weekday>>,
}

impl UpdatePatternRequest {
    /// Ambas horas o ninguna
    pub fn times(&self) -> Result<Option<(NaiveTime, NaiveTime)>, ValidationError> {
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => Ok(Some((validate_time(start)?, validate_time(end)?))),
            (None, None) => Ok(None),
            _ => {
                let mut error = ValidationError::new("time_slot");
                error.message = Some("start_time and end_time must be updated together".into());
                Err(error)
            }
        }
    }

    pub fn flags(&self) -> Option<WeekdayFlags> {
        self.days.as_deref().map(WeekdayFlags::from_days)
    }
}

#[derive(Debug, Deserialize)]
pub struct PatternFilters {
    pub tour_offering_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

// Response de verificación de horario
#[derive(Debug, Serialize)]
pub struct PatternAvailabilityResponse {
    pub pattern_id: Uuid,
    pub date: NaiveDate,
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_pattern_request() {
        let request: CreatePatternRequest = serde_json::from_value(json!({
            "tour_offering_id": Uuid::new_v4(),
            "start_time": "09:00",
            "end_time": "12:00",
            "days": ["Mon", "Wed", "Fri"]
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert!(request.flags().is_set(Weekday::Wed));
        assert!(!request.flags().is_set(Weekday::Tue));
        assert!(matches!(request.owner(), Some(PatternOwner::TourOffering(_))));
    }

    #[test]
    fn test_pattern_needs_exactly_one_owner() {
        let request: CreatePatternRequest = serde_json::from_value(json!({
            "tour_offering_id": Uuid::new_v4(),
            "driver_id": Uuid::new_v4(),
            "start_time": "09:00",
            "end_time": "12:00",
            "days": ["Mon"]
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_bad_time_and_empty_days() {
        let request: CreatePatternRequest = serde_json::from_value(json!({
            "driver_id": Uuid::new_v4(),
            "start_time": "9h",
            "end_time": "12:00",
            "days": []
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("start_time"));
        assert!(fields.contains_key("days"));
    }

    #[test]
    fn test_update_times_go_together() {
        let request = UpdatePatternRequest {
            start_time: Some("10:00".into()),
            end_time: None,
            days: None,
        };
        assert!(request.times().is_err());
    }
}
