//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL del motor de programación.

pub mod filters;
pub mod occurrence;
pub mod recurrence;
pub mod reservation;
pub mod status;
pub mod template;

pub use filters::{ResourceKind, ScheduleFilter, SiteScope};
pub use occurrence::{Occurrence, OccurrenceSlot};
pub use recurrence::{PatternOwner, RecurrencePattern, TimeSlot, WeekdayFlags};
pub use reservation::{BookingOutcome, Reservation, SeatAvailability};
pub use status::{ReservationStatus, TourStatus};
pub use template::{NewTemplate, TourTemplate};
