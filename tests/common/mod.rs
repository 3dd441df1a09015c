#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Weekday};
use uuid::Uuid;

use tour_scheduling::config::EnvironmentConfig;
use tour_scheduling::models::{
    NewTemplate, PatternOwner, RecurrencePattern, SiteScope, TourTemplate, WeekdayFlags,
};
use tour_scheduling::repositories::InMemoryScheduleRepository;
use tour_scheduling::services::{ScheduleValidator, SchedulingEngine, SchedulingRules};
use tour_scheduling::state::AppState;
use tour_scheduling::utils::clock::FixedClock;
use tour_scheduling::utils::errors::AppResult;

pub const JWT_SECRET: &str = "integration-secret";

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        cors_origins: vec![],
        max_generation_days: 731,
    }
}

/// Sede, tipo de tour y motor en memoria con la fecha fijada
pub struct Fixture {
    pub repo: InMemoryScheduleRepository,
    pub engine: SchedulingEngine,
    pub site: Uuid,
    pub offering: Uuid,
    pub scope: SiteScope,
    pub today: NaiveDate,
}

impl Fixture {
    pub async fn new(today: NaiveDate) -> Self {
        Self::with_rules(today, SchedulingRules::default()).await
    }

    pub async fn with_rules(today: NaiveDate, rules: SchedulingRules) -> Self {
        let repo = InMemoryScheduleRepository::new();
        let site = Uuid::new_v4();
        let offering = Uuid::new_v4();
        repo.add_site(site, true).await;
        repo.add_tour_offering(offering, true).await;

        let engine = SchedulingEngine::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            ScheduleValidator::new(rules),
            Arc::new(FixedClock(today)),
        );

        Self {
            repo,
            engine,
            site,
            offering,
            scope: SiteScope::All,
            today,
        }
    }

    /// Estado HTTP sobre el mismo repositorio
    pub fn app_state(&self) -> AppState {
        AppState::with_backends(
            Arc::new(self.repo.clone()),
            Arc::new(self.repo.clone()),
            Arc::new(FixedClock(self.today)),
            test_config(),
        )
    }

    pub async fn vessel(&self, capacity: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.repo.add_vessel(id, capacity).await;
        id
    }

    /// Chofer registrado con su turno
    pub async fn driver(&self, start: NaiveTime, end: NaiveTime, days: &[Weekday]) -> Uuid {
        let id = Uuid::new_v4();
        self.repo.add_driver(id).await;
        self.engine
            .patterns
            .create(PatternOwner::Driver(id), start, end, WeekdayFlags::from_days(days))
            .await
            .unwrap();
        id
    }

    /// Chofer disponible toda la semana todo el día
    pub async fn full_time_driver(&self) -> Uuid {
        self.driver(
            t(0, 0),
            t(23, 59),
            &[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
        )
        .await
    }

    pub async fn tour_pattern(
        &self,
        start: NaiveTime,
        end: NaiveTime,
        days: &[Weekday],
    ) -> RecurrencePattern {
        self.engine
            .patterns
            .create(
                PatternOwner::TourOffering(self.offering),
                start,
                end,
                WeekdayFlags::from_days(days),
            )
            .await
            .unwrap()
    }

    pub async fn template(
        &self,
        pattern_id: Uuid,
        vessel_id: Uuid,
        driver_id: Option<Uuid>,
        valid_from: NaiveDate,
        valid_until: NaiveDate,
    ) -> AppResult<TourTemplate> {
        self.engine
            .templates
            .create(
                NewTemplate {
                    tour_offering_id: self.offering,
                    vessel_id,
                    site_id: self.site,
                    driver_id,
                    recurrence_pattern_id: pattern_id,
                    nominal_date: valid_from,
                    valid_from,
                    valid_until,
                },
                &self.scope,
            )
            .await
    }

    /// Plantilla de junio 2024 ya expandida
    pub async fn june_template(
        &self,
        start: NaiveTime,
        end: NaiveTime,
        days: &[Weekday],
        vessel_id: Uuid,
    ) -> TourTemplate {
        let pattern = self.tour_pattern(start, end, days).await;
        let template = self
            .template(pattern.id, vessel_id, None, d(2024, 6, 1), d(2024, 6, 30))
            .await
            .unwrap();
        self.engine
            .generator
            .generate(template.id, &self.scope)
            .await
            .unwrap();
        template
    }
}
