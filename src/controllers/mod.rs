//! Controladores
//!
//! Validan la entrada, llaman al motor y arman la `ApiResponse`.

pub mod availability_controller;
pub mod occurrence_controller;
pub mod pattern_controller;
pub mod template_controller;
