//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{PgResourceDirectory, PgScheduleRepository, ResourceDirectory, ScheduleRepository};
use crate::services::{ScheduleValidator, SchedulingEngine};
use crate::utils::clock::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppState {
    pub engine: SchedulingEngine,
    pub config: EnvironmentConfig,
}

impl AppState {
    /// Motor respaldado por PostgreSQL y el reloj del sistema
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        let repository: Arc<dyn ScheduleRepository> = Arc::new(PgScheduleRepository::new(pool.clone()));
        let directory: Arc<dyn ResourceDirectory> = Arc::new(PgResourceDirectory::new(pool));
        Self::with_backends(repository, directory, Arc::new(SystemClock), config)
    }

    pub fn with_backends(
        repository: Arc<dyn ScheduleRepository>,
        directory: Arc<dyn ResourceDirectory>,
        clock: Arc<dyn Clock>,
        config: EnvironmentConfig,
    ) -> Self {
        let validator = ScheduleValidator::new(config.scheduling_rules());
        Self {
            engine: SchedulingEngine::new(repository, directory, validator, clock),
            config,
        }
    }
}
