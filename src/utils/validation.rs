//! Utilidades de validación
//!
//! Funciones helper para `validator` (atributos `custom` y `schema`) y
//! conversión de tipos de fecha/hora.

use chrono::{NaiveDate, NaiveTime};
use validator::ValidationError;

use crate::models::WeekdayFlags;

/// Validar y convertir string a tiempo; acepta HH:MM y HH:MM:SS
pub fn validate_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            let mut error = ValidationError::new("time");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"HH:MM[:SS]".to_string());
            error
        })
}

/// La hora de inicio debe ser anterior a la de fin
pub fn validate_time_order(start: NaiveTime, end: NaiveTime) -> Result<(), ValidationError> {
    if start >= end {
        let mut error = ValidationError::new("time_slot");
        error.add_param("start".into(), &start.to_string());
        error.add_param("end".into(), &end.to_string());
        error.message = Some("start time must be before end time".into());
        return Err(error);
    }
    Ok(())
}

/// Inicio de vigencia <= fin de vigencia
pub fn validate_date_order(from: NaiveDate, until: NaiveDate) -> Result<(), ValidationError> {
    if from > until {
        let mut error = ValidationError::new("validity_window");
        error.add_param("valid_from".into(), &from.to_string());
        error.add_param("valid_until".into(), &until.to_string());
        error.message = Some("validity start must not be after validity end".into());
        return Err(error);
    }
    Ok(())
}

/// Al menos un día marcado
pub fn validate_weekdays(flags: &WeekdayFlags) -> Result<(), ValidationError> {
    if !flags.any() {
        let mut error = ValidationError::new("weekdays");
        error.message = Some("at least one weekday must be enabled".into());
        return Err(error);
    }
    Ok(())
}
