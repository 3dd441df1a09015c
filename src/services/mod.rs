//! Services module
//!
//! Este módulo contiene la lógica de negocio del motor de programación.
//! Cada servicio recibe el repositorio, el directorio de recursos y el
//! validador ya construidos; no hay estado global.

pub mod booking_guard;
pub mod capacity_tracker;
pub mod conflict_checker;
pub mod engine;
pub mod instance_generator;
pub mod lifecycle_service;
pub mod query_service;
pub mod recurrence_service;
pub mod schedule_validator;
pub mod template_service;

pub use booking_guard::BookingGuard;
pub use capacity_tracker::CapacityTracker;
pub use conflict_checker::{ConflictChecker, ResourceCalendar, SlotConflict};
pub use engine::SchedulingEngine;
pub use instance_generator::{GenerationReport, InstanceGenerator, SkipReason, SkippedDate};
pub use lifecycle_service::{LifecycleService, TemplateStatusChange};
pub use query_service::{BookableOccurrence, QueryService};
pub use recurrence_service::RecurrenceService;
pub use schedule_validator::{ScheduleValidator, SchedulingRules, DEFAULT_MAX_GENERATION_DAYS};
pub use template_service::{TemplateChanges, TemplateService};
