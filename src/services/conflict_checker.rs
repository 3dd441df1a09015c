//! Detección de doble asignación de recursos
//!
//! Un recurso queda comprometido en una fecha por:
//!
//! * instancias no canceladas de esa fecha que lo usan (embarcación de la
//!   plantilla o chofer efectivo de la instancia), y
//! * para choferes, plantillas activas que lo tienen asignado por defecto y que
//!   recurren ese día sin haber materializado todavía su instancia.
//!
//! Las embarcaciones solo se comprometen al materializar instancias, de modo
//! que dos plantillas solapadas no se bloquean mutuamente antes de generar.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::models::{RecurrencePattern, ResourceKind, TimeSlot, TourStatus, TourTemplate};
use crate::repositories::ScheduleRepository;
use crate::utils::errors::AppResult;

/// Compromiso que impide usar el recurso
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotConflict {
    pub template_id: Uuid,
    /// `None` cuando el compromiso viene de la plantilla sin instancia
    pub occurrence_id: Option<Uuid>,
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

#[derive(Clone)]
pub struct ConflictChecker {
    repository: Arc<dyn ScheduleRepository>,
}

impl ConflictChecker {
    pub fn new(repository: Arc<dyn ScheduleRepository>) -> Self {
        Self { repository }
    }

    /// `true` si ningún compromiso activo del recurso se solapa con `slot` en `date`
    pub async fn is_resource_free(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        date: NaiveDate,
        slot: TimeSlot,
        exclude_template_id: Option<Uuid>,
    ) -> AppResult<bool> {
        let calendar = self.calendar(kind, resource_id, exclude_template_id).await?;
        Ok(calendar.conflict_on(date, slot).await?.is_none())
    }

    /// Carga una vez las plantillas del recurso para consultar muchas fechas
    pub async fn calendar(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        exclude_template_id: Option<Uuid>,
    ) -> AppResult<ResourceCalendar> {
        let mut claims = Vec::new();

        if kind == ResourceKind::Driver {
            for template in self
                .repository
                .templates_for_resource(kind, resource_id)
                .await?
            {
                if !template.is_active() || Some(template.id) == exclude_template_id {
                    continue;
                }
                if let Some(pattern) = self
                    .repository
                    .find_pattern(template.recurrence_pattern_id)
                    .await?
                    .filter(|p| !p.deleted)
                {
                    claims.push((template, pattern));
                }
            }
        }

        debug!(
            "📅 Calendario de {} {}: {} plantillas con compromiso",
            kind.as_str(),
            resource_id,
            claims.len()
        );

        Ok(ResourceCalendar {
            repository: self.repository.clone(),
            kind,
            resource_id,
            exclude_template_id,
            claims,
        })
    }
}

pub struct ResourceCalendar {
    repository: Arc<dyn ScheduleRepository>,
    kind: ResourceKind,
    resource_id: Uuid,
    exclude_template_id: Option<Uuid>,
    claims: Vec<(TourTemplate, RecurrencePattern)>,
}

impl ResourceCalendar {
    /// Primer compromiso que se solapa con `slot` en `date`
    pub async fn conflict_on(
        &self,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> AppResult<Option<SlotConflict>> {
        let booked = self
            .repository
            .occurrence_slots_on(self.kind, self.resource_id, date)
            .await?;

        let materialized = booked.iter().find(|s| {
            s.status != TourStatus::Cancelado
                && Some(s.template_id) != self.exclude_template_id
                && s.slot().overlaps(&slot)
        });
        if let Some(found) = materialized {
            return Ok(Some(SlotConflict {
                template_id: found.template_id,
                occurrence_id: Some(found.occurrence_id),
                date,
                slot: found.slot(),
            }));
        }

        for (template, pattern) in &self.claims {
            if !template.window_contains(date)
                || !pattern.runs_on(date)
                || !pattern.slot().overlaps(&slot)
            {
                continue;
            }
            // Si ya hay instancia, ella decide (puede haber cambiado de chofer o estar cancelada)
            if self
                .repository
                .find_occurrence_on(template.id, date)
                .await?
                .is_some()
            {
                continue;
            }
            return Ok(Some(SlotConflict {
                template_id: template.id,
                occurrence_id: None,
                date,
                slot: pattern.slot(),
            }));
        }

        Ok(None)
    }
}
