//! Integration tests for `ReportService`.

mod common;

use rust_decimal_macros::dec;
use timekeep_core::report::{total_time, ReportFilter};
use timekeep_service::ReportService;

use common::{day, World};

fn world_with_entries() -> World {
    let w = World::new();
    w.seed_entry(&w.bridge, &w.build, "2024-06-26", dec!(4), dec!(1));
    w.seed_entry(&w.rocket, &w.design, "2024-06-25", dec!(6), dec!(0.5));
    w.seed_entry(&w.rocket, &w.build, "2024-06-26", dec!(2), dec!(0));
    w
}

#[tokio::test]
async fn unfiltered_report_is_ordered_by_date_then_id() {
    let w = world_with_entries();
    let mut store = w.store.session();

    let rows = ReportService::generate(&mut store, &ReportFilter::default())
        .await
        .unwrap();

    let order: Vec<_> = rows
        .iter()
        .map(|r| (r.date, r.project_name.as_str(), r.category_name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (day("2024-06-25"), "Rocket", "Design"),
            (day("2024-06-26"), "Bridge", "Build"),
            (day("2024-06-26"), "Rocket", "Build"),
        ]
    );
    assert!(rows.iter().all(|r| r.user_name == "Ada Lovelace"));
    assert_eq!(rows[1].time, dec!(5));
    assert_eq!(total_time(&rows), dec!(13.5));
}

#[tokio::test]
async fn client_filter_goes_through_project() {
    let w = world_with_entries();
    let mut store = w.store.session();

    let rows = ReportService::generate(
        &mut store,
        &ReportFilter {
            client_id: Some(w.client_b),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].project_name, "Bridge");
    assert_eq!(rows[0].description, "Bridge work");
}

#[tokio::test]
async fn combined_filters_narrow_results() {
    let w = world_with_entries();
    let mut store = w.store.session();

    let rows = ReportService::generate(
        &mut store,
        &ReportFilter {
            user_id: Some(w.user.id),
            category_id: Some(w.build.id),
            start_date: Some(day("2024-06-26")),
            end_date: Some(day("2024-06-26")),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(total_time(&rows), dec!(7));
}

#[tokio::test]
async fn no_matches_gives_empty_report() {
    let w = world_with_entries();
    let mut store = w.store.session();

    let rows = ReportService::generate(
        &mut store,
        &ReportFilter {
            user_id: Some(999),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(rows.is_empty());
    assert_eq!(total_time(&rows), dec!(0));
}
