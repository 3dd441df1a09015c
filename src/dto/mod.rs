//! Objetos de transferencia de la API HTTP

pub mod availability_dto;
pub mod common_dto;
pub mod occurrence_dto;
pub mod pattern_dto;
pub mod template_dto;
