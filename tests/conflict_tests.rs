mod common;

use chrono::Weekday;
use common::{d, t, Fixture};
use tour_scheduling::models::{ResourceKind, TimeSlot, TourStatus};
use tour_scheduling::services::{SchedulingRules, TemplateChanges};
use tour_scheduling::utils::errors::AppError;

fn slot(sh: u32, sm: u32, eh: u32, em: u32) -> TimeSlot {
    TimeSlot::new(t(sh, sm), t(eh, em)).unwrap()
}

#[tokio::test]
async fn test_driver_double_booking_is_rejected_at_assignment() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let driver = fx.full_time_driver().await;

    let morning = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Mon]).await;
    let overlapping = fx.tour_pattern(t(10, 0), t(11, 0), &[Weekday::Mon]).await;
    let afternoon = fx.tour_pattern(t(12, 0), t(14, 0), &[Weekday::Mon]).await;

    let a = fx
        .template(morning.id, fx.vessel(20).await, None, d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();
    let b = fx
        .template(overlapping.id, fx.vessel(20).await, None, d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();
    let c = fx
        .template(afternoon.id, fx.vessel(20).await, None, d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();

    fx.engine
        .templates
        .assign_driver(a.id, driver, &fx.scope)
        .await
        .unwrap();

    let rejected = fx.engine.templates.assign_driver(b.id, driver, &fx.scope).await;
    assert!(matches!(rejected, Err(AppError::Conflict(_))));

    let accepted = fx
        .engine
        .templates
        .assign_driver(c.id, driver, &fx.scope)
        .await
        .unwrap();
    assert_eq!(accepted.driver_id, Some(driver));
}

#[tokio::test]
async fn test_reassigning_the_same_template_is_not_a_conflict() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let driver = fx.full_time_driver().await;
    let pattern = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Mon]).await;
    let template = fx
        .template(pattern.id, fx.vessel(20).await, Some(driver), d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();
    fx.engine.generator.generate(template.id, &fx.scope).await.unwrap();

    // Mismo chofer otra vez sobre su propia plantilla
    assert!(fx
        .engine
        .templates
        .assign_driver(template.id, driver, &fx.scope)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_driver_shift_must_cover_template() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let weekday_mornings = fx
        .driver(t(8, 0), t(13, 0), &[Weekday::Mon, Weekday::Tue, Weekday::Wed])
        .await;

    let saturday = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Sat]).await;
    let late = fx.tour_pattern(t(12, 0), t(15, 0), &[Weekday::Mon]).await;
    let fits = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Mon, Weekday::Wed]).await;

    for pattern in [&saturday, &late] {
        let template = fx
            .template(pattern.id, fx.vessel(20).await, None, d(2024, 6, 1), d(2024, 6, 30))
            .await
            .unwrap();
        let result = fx
            .engine
            .templates
            .assign_driver(template.id, weekday_mornings, &fx.scope)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    let template = fx
        .template(fits.id, fx.vessel(20).await, None, d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();
    assert!(fx
        .engine
        .templates
        .assign_driver(template.id, weekday_mornings, &fx.scope)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_unknown_driver_is_not_found() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let pattern = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Mon]).await;
    let template = fx
        .template(pattern.id, fx.vessel(20).await, None, d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();

    let result = fx
        .engine
        .templates
        .assign_driver(template.id, uuid::Uuid::new_v4(), &fx.scope)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_is_resource_free_for_vessel() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let vessel = fx.vessel(20).await;
    let template = fx.june_template(t(9, 0), t(12, 0), &[Weekday::Mon], vessel).await;
    let checker = &fx.engine.conflicts;
    let monday = d(2024, 6, 10);

    assert!(!checker
        .is_resource_free(ResourceKind::Vessel, vessel, monday, slot(11, 0, 13, 0), None)
        .await
        .unwrap());
    assert!(checker
        .is_resource_free(ResourceKind::Vessel, vessel, monday, slot(12, 0, 13, 0), None)
        .await
        .unwrap());
    assert!(checker
        .is_resource_free(ResourceKind::Vessel, vessel, d(2024, 6, 11), slot(9, 0, 12, 0), None)
        .await
        .unwrap());
    // La propia plantilla no se cuenta
    assert!(checker
        .is_resource_free(
            ResourceKind::Vessel,
            vessel,
            monday,
            slot(9, 0, 12, 0),
            Some(template.id)
        )
        .await
        .unwrap());
}

#[tokio::test]
async fn test_cancelled_occurrence_frees_the_vessel() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let vessel = fx.vessel(20).await;
    let template = fx.june_template(t(9, 0), t(12, 0), &[Weekday::Mon], vessel).await;

    let occurrences = fx
        .engine
        .queries
        .occurrences_of_template(&template)
        .await
        .unwrap();
    let june_10 = occurrences
        .iter()
        .find(|o| o.occurrence_date == d(2024, 6, 10))
        .unwrap();
    fx.engine
        .lifecycle
        .change_occurrence_status(june_10.id, TourStatus::Cancelado, &fx.scope)
        .await
        .unwrap();

    assert!(fx
        .engine
        .conflicts
        .is_resource_free(ResourceKind::Vessel, vessel, d(2024, 6, 10), slot(10, 0, 11, 0), None)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_occurrence_driver_override() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let first = fx.full_time_driver().await;
    let second = fx.full_time_driver().await;

    let morning = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Mon]).await;
    let a = fx
        .template(morning.id, fx.vessel(20).await, Some(first), d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();
    fx.engine.generator.generate(a.id, &fx.scope).await.unwrap();

    let overlapping = fx.tour_pattern(t(10, 0), t(11, 0), &[Weekday::Mon]).await;
    let b = fx
        .template(overlapping.id, fx.vessel(20).await, Some(second), d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();
    fx.engine.generator.generate(b.id, &fx.scope).await.unwrap();

    let occurrences = fx.engine.queries.occurrences_of_template(&b).await.unwrap();
    let june_17 = occurrences
        .iter()
        .find(|o| o.occurrence_date == d(2024, 6, 17))
        .unwrap();

    // El primer chofer ya está en A ese lunes
    let clash = fx
        .engine
        .lifecycle
        .reassign_occurrence_driver(june_17.id, first, &fx.scope)
        .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    // Sacar al primero de A el 17 y luego sí se puede mover a B
    let a_occurrences = fx.engine.queries.occurrences_of_template(&a).await.unwrap();
    let a_june_17 = a_occurrences
        .iter()
        .find(|o| o.occurrence_date == d(2024, 6, 17))
        .unwrap();
    let third = fx.full_time_driver().await;
    fx.engine
        .lifecycle
        .reassign_occurrence_driver(a_june_17.id, third, &fx.scope)
        .await
        .unwrap();

    let moved = fx
        .engine
        .lifecycle
        .reassign_occurrence_driver(june_17.id, first, &fx.scope)
        .await
        .unwrap();
    assert_eq!(moved.driver_id, Some(first));
    assert_eq!(moved.effective_driver(&b), Some(first));

    // El resto de lunes de B sigue con su chofer por defecto
    let june_24 = occurrences
        .iter()
        .find(|o| o.occurrence_date == d(2024, 6, 24))
        .unwrap();
    assert_eq!(june_24.effective_driver(&b), Some(second));
}

#[tokio::test]
async fn test_single_date_override_commits_the_driver() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let busy = fx.full_time_driver().await;
    let other = fx.full_time_driver().await;

    // A usa a `other` por defecto, pero el 10 se reasigna a `busy`
    let morning = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Mon]).await;
    let a = fx
        .template(morning.id, fx.vessel(20).await, Some(other), d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();
    fx.engine.generator.generate(a.id, &fx.scope).await.unwrap();
    let a_june_10 = fx
        .engine
        .queries
        .occurrences_of_template(&a)
        .await
        .unwrap()
        .into_iter()
        .find(|o| o.occurrence_date == d(2024, 6, 10))
        .unwrap();
    fx.engine
        .lifecycle
        .reassign_occurrence_driver(a_june_10.id, busy, &fx.scope)
        .await
        .unwrap();

    // Una ventana que incluye el 10 choca; desde el 11 no
    let overlapping = fx.tour_pattern(t(10, 0), t(11, 0), &[Weekday::Mon]).await;
    let b = fx
        .template(overlapping.id, fx.vessel(20).await, None, d(2024, 6, 10), d(2024, 6, 30))
        .await
        .unwrap();
    let rejected = fx.engine.templates.assign_driver(b.id, busy, &fx.scope).await;
    assert!(matches!(rejected, Err(AppError::Conflict(_))));

    let c = fx
        .template(overlapping.id, fx.vessel(20).await, Some(busy), d(2024, 6, 11), d(2024, 6, 30))
        .await
        .unwrap();
    let report = fx.engine.generator.generate(c.id, &fx.scope).await.unwrap();
    assert_eq!(report.created, 2);
    assert!(report.skipped.is_empty());
}

#[tokio::test]
async fn test_template_cannot_move_onto_a_busy_vessel() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let shared = fx.vessel(20).await;
    let a = fx.june_template(t(9, 0), t(12, 0), &[Weekday::Mon], shared).await;
    let b = fx
        .june_template(t(10, 0), t(11, 0), &[Weekday::Mon], fx.vessel(20).await)
        .await;
    let templates = &fx.engine.templates;

    let moved = templates
        .update(
            b.id,
            TemplateChanges {
                vessel_id: Some(shared),
                ..Default::default()
            },
            &fx.scope,
        )
        .await;
    assert!(matches!(moved, Err(AppError::Conflict(_))));
    // Las instancias de B siguen fuera de la embarcación compartida
    assert!(fx
        .engine
        .conflicts
        .is_resource_free(ResourceKind::Vessel, shared, d(2024, 6, 10), slot(10, 0, 11, 0), Some(a.id))
        .await
        .unwrap());

    // Pegado a la salida de A sí cabe
    let afternoon = fx.tour_pattern(t(12, 0), t(13, 0), &[Weekday::Mon]).await;
    let moved = templates
        .update(
            b.id,
            TemplateChanges {
                vessel_id: Some(shared),
                recurrence_pattern_id: Some(afternoon.id),
                ..Default::default()
            },
            &fx.scope,
        )
        .await
        .unwrap();
    assert_eq!(moved.vessel_id, shared);

    // Alargar el horario hacia atrás vuelve a pisar a A
    let longer = fx.tour_pattern(t(11, 0), t(13, 0), &[Weekday::Mon]).await;
    let stretched = templates
        .update(
            b.id,
            TemplateChanges {
                recurrence_pattern_id: Some(longer.id),
                ..Default::default()
            },
            &fx.scope,
        )
        .await;
    assert!(matches!(stretched, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_driver_check_stops_at_generation_horizon() {
    let fx = Fixture::with_rules(
        d(2024, 5, 1),
        SchedulingRules {
            max_generation_days: 30,
        },
    )
    .await;
    let every_day = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    let morning = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Mon]).await;
    let daily = fx.tour_pattern(t(10, 0), t(11, 0), &every_day).await;

    // Julio queda fuera del horizonte de 30 días; mayo no
    let july_driver = fx.full_time_driver().await;
    fx.template(morning.id, fx.vessel(20).await, Some(july_driver), d(2024, 7, 1), d(2024, 7, 31))
        .await
        .unwrap();
    let may_driver = fx.full_time_driver().await;
    fx.template(morning.id, fx.vessel(20).await, Some(may_driver), d(2024, 5, 1), d(2024, 5, 31))
        .await
        .unwrap();

    let open_ended = fx
        .template(daily.id, fx.vessel(20).await, None, d(2024, 5, 1), d(9999, 12, 31))
        .await
        .unwrap();
    let assigned = fx
        .engine
        .templates
        .assign_driver(open_ended.id, july_driver, &fx.scope)
        .await
        .unwrap();
    assert_eq!(assigned.driver_id, Some(july_driver));

    let other = fx
        .template(daily.id, fx.vessel(20).await, None, d(2024, 5, 1), d(9999, 12, 31))
        .await
        .unwrap();
    let rejected = fx
        .engine
        .templates
        .assign_driver(other.id, may_driver, &fx.scope)
        .await;
    assert!(matches!(rejected, Err(AppError::Conflict(_))));
}

