//! Modelo de Reservation (colaborador externo)
//!
//! El motor solo lee pasajeros y estado para derivar la capacidad. La única
//! escritura ocurre dentro del guardián de reservas (check-and-insert atómico).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{ReservationStatus, TourStatus};

/// Reservation - mapea a la tabla reservations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub occurrence_id: Uuid,
    pub passengers: i32,
    pub status: ReservationStatus,
    pub client_reference: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn confirmed(occurrence_id: Uuid, passengers: i32, client_reference: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurrence_id,
            passengers,
            status: ReservationStatus::Confirmada,
            client_reference,
            deleted: false,
            created_at: Utc::now(),
        }
    }

    pub fn holds_seats(&self) -> bool {
        !self.deleted && self.status.holds_seats()
    }
}

/// Capacidad derivada de una instancia en el momento de la consulta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAvailability {
    pub capacity: i32,
    pub sold: i32,
    pub remaining: i32,
}

impl SeatAvailability {
    /// `remaining` nunca es negativo
    pub fn derive(capacity: i32, sold: i32) -> Self {
        Self {
            capacity,
            sold,
            remaining: (capacity - sold).max(0),
        }
    }

    pub fn is_oversold(&self) -> bool {
        self.sold > self.capacity
    }
}

/// Resultado del check-and-insert
#[derive(Debug, Clone)]
pub enum BookingOutcome {
    Committed(Reservation),
    Exceeded { remaining: i32 },
    /// La instancia o su plantilla dejó de estar programada antes del bloqueo
    Closed { status: TourStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_is_floored() {
        let seats = SeatAvailability::derive(20, 13);
        assert_eq!(seats.remaining, 7);

        let oversold = SeatAvailability::derive(10, 12);
        assert_eq!(oversold.remaining, 0);
        assert!(oversold.is_oversold());
    }

    #[test]
    fn test_deleted_reservation_holds_nothing() {
        let mut reservation = Reservation::confirmed(Uuid::new_v4(), 4, None);
        assert!(reservation.holds_seats());
        reservation.deleted = true;
        assert!(!reservation.holds_seats());
    }
}
