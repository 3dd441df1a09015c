//! Motor de programación de tours
//!
//! Plantillas recurrentes, instancias fechadas, detección de doble asignación
//! de embarcaciones y choferes, y reserva atómica de asientos.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
