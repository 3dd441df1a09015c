//! Modelo de RecurrencePattern (horario semanal)
//!
//! Un horario es una franja horaria más siete banderas de día de la semana.
//! Pertenece a exactamente un tipo de tour o a exactamente un chofer.
//! Mapea a la tabla `recurrence_patterns`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Franja horaria [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Solapamiento estricto: los extremos que se tocan no chocan
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// `other` queda completamente dentro de esta franja
    pub fn covers(&self, other: &TimeSlot) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Banderas de lunes a domingo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayFlags {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl WeekdayFlags {
    pub fn from_days(days: &[Weekday]) -> Self {
        let mut flags = Self::default();
        for day in days {
            match day {
                Weekday::Mon => flags.monday = true,
                Weekday::Tue => flags.tuesday = true,
                Weekday::Wed => flags.wednesday = true,
                Weekday::Thu => flags.thursday = true,
                Weekday::Fri => flags.friday = true,
                Weekday::Sat => flags.saturday = true,
                Weekday::Sun => flags.sunday = true,
            }
        }
        flags
    }

    pub fn is_set(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn any(&self) -> bool {
        self.days().next().is_some()
    }

    pub fn days(&self) -> impl Iterator<Item = Weekday> + '_ {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(move |d| self.is_set(*d))
    }

    /// Todos los días marcados aquí también están marcados en `other`
    pub fn is_subset_of(&self, other: &WeekdayFlags) -> bool {
        self.days().all(|d| other.is_set(d))
    }
}

/// Dueño del horario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PatternOwner {
    TourOffering(Uuid),
    Driver(Uuid),
}

/// RecurrencePattern principal - mapea exactamente a la tabla recurrence_patterns
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecurrencePattern {
    pub id: Uuid,
    pub tour_offering_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurrencePattern {
    pub fn new(owner: PatternOwner, slot: TimeSlot, flags: WeekdayFlags) -> Self {
        let now = Utc::now();
        let (tour_offering_id, driver_id) = match owner {
            PatternOwner::TourOffering(id) => (Some(id), None),
            PatternOwner::Driver(id) => (None, Some(id)),
        };

        let mut pattern = Self {
            id: Uuid::new_v4(),
            tour_offering_id,
            driver_id,
            start_time: slot.start,
            end_time: slot.end,
            monday: false,
            tuesday: false,
            wednesday: false,
            thursday: false,
            friday: false,
            saturday: false,
            sunday: false,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        pattern.set_flags(flags);
        pattern
    }

    /// `None` si la fila viola "exactamente un dueño"
    pub fn owner(&self) -> Option<PatternOwner> {
        match (self.tour_offering_id, self.driver_id) {
            (Some(id), None) => Some(PatternOwner::TourOffering(id)),
            (None, Some(id)) => Some(PatternOwner::Driver(id)),
            _ => None,
        }
    }

    pub fn slot(&self) -> TimeSlot {
        TimeSlot {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn flags(&self) -> WeekdayFlags {
        WeekdayFlags {
            monday: self.monday,
            tuesday: self.tuesday,
            wednesday: self.wednesday,
            thursday: self.thursday,
            friday: self.friday,
            saturday: self.saturday,
            sunday: self.sunday,
        }
    }

    pub fn set_flags(&mut self, flags: WeekdayFlags) {
        self.monday = flags.monday;
        self.tuesday = flags.tuesday;
        self.wednesday = flags.wednesday;
        self.thursday = flags.thursday;
        self.friday = flags.friday;
        self.saturday = flags.saturday;
        self.sunday = flags.sunday;
    }

    pub fn runs_on(&self, date: NaiveDate) -> bool {
        self.flags().is_set(date.weekday())
    }
}
