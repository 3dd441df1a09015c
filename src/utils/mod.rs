//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT y el reloj inyectable.

pub mod clock;
pub mod errors;
pub mod jwt;
pub mod validation;
