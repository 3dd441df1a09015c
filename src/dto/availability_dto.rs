use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::ResourceKind;
use crate::utils::validation::{validate_time, validate_time_order};

fn time_field(value: &str) -> Result<(), ValidationError> {
    validate_time(value).map(|_| ())
}

/// Query de `GET /api/resources/:kind/:id/free`
#[derive(Debug, Deserialize, Validate)]
pub struct ResourceFreeQuery {
    pub date: NaiveDate,

    #[validate(custom = "time_field")]
    pub start: String,

    #[validate(custom = "time_field")]
    pub end: String,

    pub exclude_template: Option<Uuid>,
}

impl ResourceFreeQuery {
    pub fn times(&self) -> Result<(NaiveTime, NaiveTime), ValidationError> {
        let start = validate_time(&self.start)?;
        let end = validate_time(&self.end)?;
        validate_time_order(start, end)?;
        Ok((start, end))
    }
}

#[derive(Debug, Serialize)]
pub struct ResourceFreeResponse {
    pub kind: ResourceKind,
    pub resource_id: Uuid,
    pub date: NaiveDate,
    pub free: bool,
}
