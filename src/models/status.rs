//! Estados del ciclo de vida
//!
//! `TourStatus` es compartido por plantillas (tour programado) e instancias.
//! Las transiciones legales se resuelven con un `match` exhaustivo:
//!
//! ```text
//! PROGRAMADO ──► EN_CURSO ──► COMPLETADO
//!      │             │
//!      └──────► CANCELADO ◄──┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::Type;

use crate::utils::errors::{AppError, AppResult};

/// Estado de una plantilla o instancia - mapea al ENUM tour_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "tour_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TourStatus {
    Programado,
    EnCurso,
    Completado,
    Cancelado,
}

impl TourStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TourStatus::Programado => "PROGRAMADO",
            TourStatus::EnCurso => "EN_CURSO",
            TourStatus::Completado => "COMPLETADO",
            TourStatus::Cancelado => "CANCELADO",
        }
    }

    /// Terminal: no admite más transiciones
    pub fn is_terminal(&self) -> bool {
        matches!(self, TourStatus::Completado | TourStatus::Cancelado)
    }

    /// Solo PROGRAMADO admite reservas
    pub fn is_bookable(&self) -> bool {
        matches!(self, TourStatus::Programado)
    }

    pub fn can_transition_to(&self, next: TourStatus) -> bool {
        match (self, next) {
            (TourStatus::Programado, TourStatus::EnCurso) => true,
            (TourStatus::Programado, TourStatus::Cancelado) => true,
            (TourStatus::EnCurso, TourStatus::Completado) => true,
            (TourStatus::EnCurso, TourStatus::Cancelado) => true,
            (TourStatus::Programado, _)
            | (TourStatus::EnCurso, _)
            | (TourStatus::Completado, _)
            | (TourStatus::Cancelado, _) => false,
        }
    }

    /// Devuelve el nuevo estado o `InvalidTransition`
    pub fn transition(self, next: TourStatus) -> AppResult<TourStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::InvalidTransition { from: self, to: next })
        }
    }
}

impl fmt::Display for TourStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TourStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PROGRAMADO" => Ok(TourStatus::Programado),
            "EN_CURSO" => Ok(TourStatus::EnCurso),
            "COMPLETADO" => Ok(TourStatus::Completado),
            "CANCELADO" => Ok(TourStatus::Cancelado),
            other => Err(AppError::BadRequest(format!("Unknown tour status '{}'", other))),
        }
    }
}

/// Estado de una reserva - mapea al ENUM reservation_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "reservation_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pendiente,
    Confirmada,
    Cancelada,
}

impl ReservationStatus {
    /// Cuenta para los asientos vendidos
    pub fn holds_seats(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelada)
    }
}
