//! Fachada que agrupa los servicios del motor de programación

use std::sync::Arc;

use crate::repositories::{ResourceDirectory, ScheduleRepository};
use crate::services::{
    BookingGuard, CapacityTracker, ConflictChecker, InstanceGenerator, LifecycleService,
    QueryService, RecurrenceService, ScheduleValidator, TemplateService,
};
use crate::utils::clock::Clock;

#[derive(Clone)]
pub struct SchedulingEngine {
    pub patterns: RecurrenceService,
    pub templates: TemplateService,
    pub generator: InstanceGenerator,
    pub conflicts: ConflictChecker,
    pub capacity: CapacityTracker,
    pub bookings: BookingGuard,
    pub lifecycle: LifecycleService,
    pub queries: QueryService,
}

impl SchedulingEngine {
    pub fn new(
        repository: Arc<dyn ScheduleRepository>,
        directory: Arc<dyn ResourceDirectory>,
        validator: ScheduleValidator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let conflicts = ConflictChecker::new(repository.clone());
        let capacity = CapacityTracker::new(repository.clone(), directory.clone(), validator.clone());

        Self {
            patterns: RecurrenceService::new(
                repository.clone(),
                directory.clone(),
                conflicts.clone(),
                validator.clone(),
            ),
            templates: TemplateService::new(
                repository.clone(),
                directory.clone(),
                conflicts.clone(),
                validator.clone(),
                clock.clone(),
            ),
            generator: InstanceGenerator::new(
                repository.clone(),
                directory.clone(),
                conflicts.clone(),
                validator.clone(),
            ),
            bookings: BookingGuard::new(repository.clone(), capacity.clone(), validator.clone()),
            lifecycle: LifecycleService::new(
                repository.clone(),
                directory,
                conflicts.clone(),
                capacity.clone(),
                validator.clone(),
                clock.clone(),
            ),
            queries: QueryService::new(
                repository,
                conflicts.clone(),
                capacity.clone(),
                validator,
                clock,
            ),
            conflicts,
            capacity,
        }
    }
}
