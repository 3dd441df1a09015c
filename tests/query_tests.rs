mod common;

use chrono::Weekday;
use common::{d, t, Fixture};
use tour_scheduling::models::{
    NewTemplate, PatternOwner, Reservation, ScheduleFilter, SiteScope, TourStatus, WeekdayFlags,
};
use tour_scheduling::utils::errors::AppError;
use uuid::Uuid;

#[tokio::test]
async fn test_available_for_booking_skips_full_and_cancelled() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let monday = d(2024, 6, 10);

    let open = fx.june_template(t(8, 0), t(9, 0), &[Weekday::Mon], fx.vessel(10).await).await;
    let full = fx.june_template(t(9, 0), t(10, 0), &[Weekday::Mon], fx.vessel(10).await).await;
    let cancelled = fx.june_template(t(10, 0), t(11, 0), &[Weekday::Mon], fx.vessel(10).await).await;

    let occurrences = fx.engine.queries.occurrences_of_template(&full).await.unwrap();
    let full_monday = occurrences.iter().find(|o| o.occurrence_date == monday).unwrap();
    fx.repo
        .seed_reservation(Reservation::confirmed(full_monday.id, 10, None))
        .await;

    let occurrences = fx.engine.queries.occurrences_of_template(&cancelled).await.unwrap();
    let cancelled_monday = occurrences.iter().find(|o| o.occurrence_date == monday).unwrap();
    fx.engine
        .lifecycle
        .change_occurrence_status(cancelled_monday.id, TourStatus::Cancelado, &fx.scope)
        .await
        .unwrap();

    let available = fx
        .engine
        .queries
        .available_for_booking(monday, &ScheduleFilter::default(), &fx.scope)
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].template.id, open.id);
    assert_eq!(available[0].seats.remaining, 10);

    // Martes no hay salidas
    let tuesday = fx
        .engine
        .queries
        .available_for_booking(d(2024, 6, 11), &ScheduleFilter::default(), &fx.scope)
        .await
        .unwrap();
    assert!(tuesday.is_empty());
}

#[tokio::test]
async fn test_site_scope_hides_other_sites() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let template = fx.june_template(t(9, 0), t(12, 0), &[Weekday::Mon], fx.vessel(10).await).await;
    let outsider = SiteScope::sites([Uuid::new_v4()]);
    let local = SiteScope::sites([fx.site]);

    let hidden = fx
        .engine
        .queries
        .list_templates(&ScheduleFilter::default(), &outsider)
        .await
        .unwrap();
    assert!(hidden.is_empty());
    let visible = fx
        .engine
        .queries
        .list_templates(&ScheduleFilter::default(), &local)
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);

    let occurrences = fx
        .engine
        .queries
        .list_occurrences(&ScheduleFilter::default(), &outsider)
        .await
        .unwrap();
    assert!(occurrences.is_empty());

    let read = fx.engine.templates.get(template.id, &outsider).await;
    assert!(matches!(read, Err(AppError::Forbidden(_))));

    let generate = fx.engine.generator.generate(template.id, &outsider).await;
    assert!(matches!(generate, Err(AppError::Forbidden(_))));

    let booking_list = fx
        .engine
        .queries
        .available_for_booking(d(2024, 6, 10), &ScheduleFilter::default(), &outsider)
        .await
        .unwrap();
    assert!(booking_list.is_empty());
}

#[tokio::test]
async fn test_currently_valid_and_date_filters() {
    let fx = Fixture::new(d(2024, 6, 15)).await;
    let vessel = fx.vessel(10).await;
    let pattern = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Mon]).await;

    let june = fx
        .template(pattern.id, vessel, None, d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();
    let august = fx
        .template(pattern.id, vessel, None, d(2024, 8, 1), d(2024, 8, 31))
        .await
        .unwrap();

    let current = fx
        .engine
        .queries
        .list_templates(
            &ScheduleFilter {
                currently_valid: true,
                ..Default::default()
            },
            &fx.scope,
        )
        .await
        .unwrap();
    assert_eq!(current.iter().map(|t| t.id).collect::<Vec<_>>(), vec![june.id]);

    let on_date = fx
        .engine
        .queries
        .list_templates(
            &ScheduleFilter {
                date: Some(d(2024, 8, 5)),
                ..Default::default()
            },
            &fx.scope,
        )
        .await
        .unwrap();
    assert_eq!(on_date.iter().map(|t| t.id).collect::<Vec<_>>(), vec![august.id]);

    let by_vessel = fx
        .engine
        .queries
        .list_templates(
            &ScheduleFilter {
                vessel_id: Some(vessel),
                status: Some(TourStatus::Programado),
                ..Default::default()
            },
            &fx.scope,
        )
        .await
        .unwrap();
    assert_eq!(by_vessel.len(), 2);
}

#[tokio::test]
async fn test_deleted_templates_are_hidden() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let template = fx.june_template(t(9, 0), t(12, 0), &[Weekday::Mon], fx.vessel(10).await).await;

    fx.engine.templates.soft_delete(template.id, &fx.scope).await.unwrap();

    let listed = fx
        .engine
        .queries
        .list_templates(&ScheduleFilter::default(), &fx.scope)
        .await
        .unwrap();
    assert!(listed.is_empty());

    let with_deleted = fx
        .engine
        .queries
        .list_templates(
            &ScheduleFilter {
                include_deleted: true,
                ..Default::default()
            },
            &fx.scope,
        )
        .await
        .unwrap();
    assert_eq!(with_deleted.len(), 1);
    assert_eq!(with_deleted[0].status, TourStatus::Programado);

    let read = fx.engine.templates.get(template.id, &fx.scope).await;
    assert!(matches!(read, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_verify_schedule_availability() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let vessel = fx.vessel(20).await;
    let monday = d(2024, 6, 10);

    let morning = fx.june_template(t(9, 0), t(12, 0), &[Weekday::Mon], vessel).await;
    let late = fx.tour_pattern(t(11, 0), t(13, 0), &[Weekday::Mon]).await;
    fx.template(late.id, vessel, None, d(2024, 6, 1), d(2024, 6, 30))
        .await
        .unwrap();

    let patterns = &fx.engine.patterns;
    // La embarcación ya sale a las 9:00 ese lunes
    assert!(!patterns.verify_schedule_availability(late.id, monday).await.unwrap());
    // Martes no recurre
    assert!(!patterns
        .verify_schedule_availability(late.id, d(2024, 6, 11))
        .await
        .unwrap());
    // La instancia propia no cuenta como choque
    assert!(patterns
        .verify_schedule_availability(morning.recurrence_pattern_id, monday)
        .await
        .unwrap());

    let unused = fx.tour_pattern(t(15, 0), t(16, 0), &[Weekday::Mon]).await;
    assert!(patterns.verify_schedule_availability(unused.id, monday).await.unwrap());
}

#[tokio::test]
async fn test_pattern_lifecycle() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let patterns = &fx.engine.patterns;

    let pattern = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Mon]).await;
    assert!(pattern.runs_on(d(2024, 6, 10)));
    assert!(!pattern.runs_on(d(2024, 6, 11)));

    let updated = patterns
        .update(
            pattern.id,
            Some((t(10, 0), t(13, 0))),
            Some(WeekdayFlags::from_days(&[Weekday::Tue, Weekday::Thu])),
        )
        .await
        .unwrap();
    assert_eq!(updated.start_time, t(10, 0));
    assert!(updated.runs_on(d(2024, 6, 11)));
    assert!(!updated.runs_on(d(2024, 6, 10)));

    let inverted = patterns.update(pattern.id, Some((t(13, 0), t(10, 0))), None).await;
    assert!(matches!(inverted, Err(AppError::Validation(_))));

    let no_days = patterns
        .update(pattern.id, None, Some(WeekdayFlags::from_days(&[])))
        .await;
    assert!(matches!(no_days, Err(AppError::Validation(_))));

    let listed = patterns.list(Some(fx.offering), None).await.unwrap();
    assert_eq!(listed.len(), 1);

    patterns.soft_delete(pattern.id).await.unwrap();
    assert!(matches!(patterns.get(pattern.id).await, Err(AppError::NotFound(_))));
    assert!(patterns.list(Some(fx.offering), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_template_references_are_checked() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let vessel = fx.vessel(10).await;

    let inactive = Uuid::new_v4();
    fx.repo.add_tour_offering(inactive, false).await;
    let rejected = fx
        .engine
        .patterns
        .create(
            PatternOwner::TourOffering(inactive),
            t(9, 0),
            t(12, 0),
            WeekdayFlags::from_days(&[Weekday::Mon]),
        )
        .await;
    assert!(matches!(rejected, Err(AppError::NotFound(_))));

    // Horario de otro tipo de tour
    let other = Uuid::new_v4();
    fx.repo.add_tour_offering(other, true).await;
    let foreign = fx
        .engine
        .patterns
        .create(
            PatternOwner::TourOffering(other),
            t(9, 0),
            t(12, 0),
            WeekdayFlags::from_days(&[Weekday::Mon]),
        )
        .await
        .unwrap();
    let result = fx.template(foreign.id, vessel, None, d(2024, 6, 1), d(2024, 6, 30)).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let pattern = fx.tour_pattern(t(9, 0), t(12, 0), &[Weekday::Mon]).await;

    let unknown_vessel = fx
        .template(pattern.id, Uuid::new_v4(), None, d(2024, 6, 1), d(2024, 6, 30))
        .await;
    assert!(matches!(unknown_vessel, Err(AppError::NotFound(_))));

    let inverted = fx
        .template(pattern.id, vessel, None, d(2024, 6, 30), d(2024, 6, 1))
        .await;
    assert!(matches!(inverted, Err(AppError::Validation(_))));

    let closed_site = Uuid::new_v4();
    fx.repo.add_site(closed_site, false).await;
    let result = fx
        .engine
        .templates
        .create(
            NewTemplate {
                tour_offering_id: fx.offering,
                vessel_id: vessel,
                site_id: closed_site,
                driver_id: None,
                recurrence_pattern_id: pattern.id,
                nominal_date: d(2024, 6, 1),
                valid_from: d(2024, 6, 1),
                valid_until: d(2024, 6, 30),
            },
            &fx.scope,
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
