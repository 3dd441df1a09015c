//! Repositorios
//!
//! Contratos de persistencia y sus dos backends: PostgreSQL para producción y
//! en memoria para pruebas y desarrollo local.

pub mod memory_repository;
pub mod postgres_repository;
pub mod schedule_repository;

pub use memory_repository::InMemoryScheduleRepository;
pub use postgres_repository::{PgResourceDirectory, PgScheduleRepository};
pub use schedule_repository::{ResourceDirectory, ScheduleRepository};
