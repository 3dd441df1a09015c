use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{NewTemplate, TourStatus, TourTemplate};
use crate::services::TemplateChanges;
use crate::utils::validation::validate_date_order;

fn window_order(request: &CreateTemplateRequest) -> Result<(), ValidationError> {
    validate_date_order(request.valid_from, request.valid_until)
}

fn partial_window_order(request: &UpdateTemplateRequest) -> Result<(), ValidationError> {
    match (request.valid_from, request.valid_until) {
        (Some(from), Some(until)) => validate_date_order(from, until),
        _ => Ok(()),
    }
}

// Request para crear una plantilla de tour
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "window_order"))]
pub struct CreateTemplateRequest {
    pub tour_offering_id: Uuid,
    pub vessel_id: Uuid,
    pub site_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub recurrence_pattern_id: Uuid,
    /// Solo informativa; por defecto el inicio de vigencia
    pub nominal_date: Option<NaiveDate>,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
}

impl From<CreateTemplateRequest> for NewTemplate {
    fn from(request: CreateTemplateRequest) -> Self {
        NewTemplate {
            tour_offering_id: request.tour_offering_id,
            vessel_id: request.vessel_id,
            site_id: request.site_id,
            driver_id: request.driver_id,
            recurrence_pattern_id: request.recurrence_pattern_id,
            nominal_date: request.nominal_date.unwrap_or(request.valid_from),
            valid_from: request.valid_from,
            valid_until: request.valid_until,
        }
    }
}

// Request para actualizar una plantilla
#[derive(Debug, Default, Deserialize, Validate)]
#[validate(schema(function = "partial_window_order"))]
pub struct UpdateTemplateRequest {
    pub vessel_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub recurrence_pattern_id: Option<Uuid>,
    pub nominal_date: Option<NaiveDate>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
}

impl From<UpdateTemplateRequest> for TemplateChanges {
    fn from(request: UpdateTemplateRequest) -> Self {
        TemplateChanges {
            vessel_id: request.vessel_id,
            site_id: request.site_id,
            recurrence_pattern_id: request.recurrence_pattern_id,
            nominal_date: request.nominal_date,
            valid_from: request.valid_from,
            valid_until: request.valid_until,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: TourStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignDriverRequest {
    pub driver_id: Uuid,
}

// Response de cambio de estado de plantilla
#[derive(Debug, Serialize)]
pub struct TemplateStatusResponse {
    pub template: TourTemplate,
    pub cancelled_occurrences: u64,
}
