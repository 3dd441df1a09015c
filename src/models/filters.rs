//! Filtros de consulta y alcance de sedes
//!
//! Todos los filtros son opcionales y se combinan con AND. El alcance de sedes
//! (`SiteScope`) llega como parámetro desde la capa HTTP en lugar de
//! recalcularse en cada consulta.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::occurrence::Occurrence;
use super::status::TourStatus;
use super::template::TourTemplate;

/// Recurso que no puede estar doblemente asignado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vessel,
    Driver,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Vessel => "vessel",
            ResourceKind::Driver => "driver",
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = crate::utils::errors::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vessel" | "embarcacion" => Ok(ResourceKind::Vessel),
            "driver" | "chofer" => Ok(ResourceKind::Driver),
            other => Err(crate::utils::errors::bad_request_error(&format!(
                "Unknown resource kind '{}'",
                other
            ))),
        }
    }
}

/// Sedes que el llamador puede ver y modificar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteScope {
    All,
    Sites(HashSet<Uuid>),
}

impl SiteScope {
    pub fn sites<I: IntoIterator<Item = Uuid>>(ids: I) -> Self {
        SiteScope::Sites(ids.into_iter().collect())
    }

    pub fn allows(&self, site_id: Uuid) -> bool {
        match self {
            SiteScope::All => true,
            SiteScope::Sites(ids) => ids.contains(&site_id),
        }
    }

    /// `None` = sin restricción
    pub fn site_ids(&self) -> Option<Vec<Uuid>> {
        match self {
            SiteScope::All => None,
            SiteScope::Sites(ids) => Some(ids.iter().copied().collect()),
        }
    }
}

/// Filtros para búsqueda de plantillas e instancias
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleFilter {
    pub site_id: Option<Uuid>,
    pub tour_offering_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub vessel_id: Option<Uuid>,
    pub status: Option<TourStatus>,
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub currently_valid: bool,
    #[serde(default)]
    pub include_deleted: bool,
}

impl ScheduleFilter {
    fn matches_template_refs(&self, template: &TourTemplate) -> bool {
        if !self.include_deleted && template.deleted {
            return false;
        }
        if self.site_id.is_some_and(|id| id != template.site_id) {
            return false;
        }
        if self.tour_offering_id.is_some_and(|id| id != template.tour_offering_id) {
            return false;
        }
        if self.vessel_id.is_some_and(|id| id != template.vessel_id) {
            return false;
        }
        true
    }

    /// Para plantillas las fechas se comparan contra la ventana de vigencia
    pub fn matches_template(&self, template: &TourTemplate, today: NaiveDate) -> bool {
        if !self.matches_template_refs(template) {
            return false;
        }
        if self.driver_id.is_some() && self.driver_id != template.driver_id {
            return false;
        }
        if self.status.is_some_and(|s| s != template.status) {
            return false;
        }
        if self.date.is_some_and(|d| !template.window_contains(d)) {
            return false;
        }
        if self.date_from.is_some_and(|from| template.valid_until < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| template.valid_from > to) {
            return false;
        }
        if self.currently_valid && !template.window_contains(today) {
            return false;
        }
        true
    }

    /// Para instancias las fechas se comparan contra la fecha de la instancia
    pub fn matches_occurrence(
        &self,
        occurrence: &Occurrence,
        template: &TourTemplate,
        today: NaiveDate,
    ) -> bool {
        if !self.matches_template_refs(template) {
            return false;
        }
        let effective_driver = occurrence.driver_id.or(template.driver_id);
        if self.driver_id.is_some() && self.driver_id != effective_driver {
            return false;
        }
        if self.status.is_some_and(|s| s != occurrence.status) {
            return false;
        }
        if self.date.is_some_and(|d| d != occurrence.occurrence_date) {
            return false;
        }
        if self.date_from.is_some_and(|from| occurrence.occurrence_date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| occurrence.occurrence_date > to) {
            return false;
        }
        if self.currently_valid && !template.window_contains(today) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::template::NewTemplate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn template() -> TourTemplate {
        TourTemplate::new(NewTemplate {
            tour_offering_id: Uuid::new_v4(),
            vessel_id: Uuid::new_v4(),
            site_id: Uuid::new_v4(),
            driver_id: Some(Uuid::new_v4()),
            recurrence_pattern_id: Uuid::new_v4(),
            nominal_date: d(2024, 6, 1),
            valid_from: d(2024, 6, 1),
            valid_until: d(2024, 6, 30),
        })
    }

    #[test]
    fn test_empty_filter_matches_everything_but_deleted() {
        let mut tpl = template();
        let today = d(2024, 6, 15);
        assert!(ScheduleFilter::default().matches_template(&tpl, today));

        tpl.deleted = true;
        assert!(!ScheduleFilter::default().matches_template(&tpl, today));
        let with_deleted = ScheduleFilter {
            include_deleted: true,
            ..Default::default()
        };
        assert!(with_deleted.matches_template(&tpl, today));
    }

    #[test]
    fn test_filters_combine_with_and() {
        let tpl = template();
        let today = d(2024, 6, 15);
        let filter = ScheduleFilter {
            site_id: Some(tpl.site_id),
            vessel_id: Some(tpl.vessel_id),
            status: Some(TourStatus::Programado),
            ..Default::default()
        };
        assert!(filter.matches_template(&tpl, today));

        let wrong_vessel = ScheduleFilter {
            vessel_id: Some(Uuid::new_v4()),
            ..filter
        };
        assert!(!wrong_vessel.matches_template(&tpl, today));
    }

    #[test]
    fn test_currently_valid_uses_today() {
        let tpl = template();
        let filter = ScheduleFilter {
            currently_valid: true,
            ..Default::default()
        };
        assert!(filter.matches_template(&tpl, d(2024, 6, 30)));
        assert!(!filter.matches_template(&tpl, d(2024, 7, 1)));
    }

    #[test]
    fn test_occurrence_driver_override_wins() {
        let tpl = template();
        let mut occ = Occurrence::for_template(&tpl, d(2024, 6, 3));
        let substitute = Uuid::new_v4();
        occ.driver_id = Some(substitute);

        let filter = ScheduleFilter {
            driver_id: Some(substitute),
            ..Default::default()
        };
        assert!(filter.matches_occurrence(&occ, &tpl, d(2024, 6, 1)));

        let by_range = ScheduleFilter {
            date_from: Some(d(2024, 6, 4)),
            ..Default::default()
        };
        assert!(!by_range.matches_occurrence(&occ, &tpl, d(2024, 6, 1)));
    }

    #[test]
    fn test_site_scope() {
        let site = Uuid::new_v4();
        let scope = SiteScope::sites([site]);
        assert!(scope.allows(site));
        assert!(!scope.allows(Uuid::new_v4()));
        assert!(SiteScope::All.allows(site));
        assert!(SiteScope::All.site_ids().is_none());
    }
}
