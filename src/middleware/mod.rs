//! Middleware del sistema
//!
//! Este módulo contiene el middleware de autenticación por sede y CORS.

pub mod auth;
pub mod cors;

pub use auth::site_scope_middleware;
pub use cors::cors_layer;
