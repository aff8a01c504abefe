mod common;

use common::*;

use district_insights::comparison::{compare, ComparisonPanel};

#[tokio::test]
async fn empty_selection_makes_no_request() {
    let backend = FakeBackend::goa_and_pune();
    let rows = compare(&backend, &[]).await.unwrap();
    assert!(rows.is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn rows_keep_backend_order() {
    let backend = FakeBackend {
        rows: vec![row(2), row(1)],
        ..FakeBackend::goa_and_pune()
    };
    let rows = compare(&backend, &[1, 2]).await.unwrap();
    let ids: Vec<u32> = rows.iter().map(|r| r.district_id).collect();
    assert_eq!(ids, [2, 1]);
    assert_eq!(backend.calls(), ["/compare?districts=1,2"]);
}

#[tokio::test]
async fn changing_the_selection_clears_shown_rows() {
    let backend = FakeBackend {
        rows: vec![row(1), row(2)],
        ..FakeBackend::goa_and_pune()
    };
    let mut panel = ComparisonPanel::new();
    panel.toggle(1);
    panel.toggle(2);
    assert_eq!(panel.run(&backend).await.unwrap().len(), 2);

    panel.toggle(1);
    assert!(panel.rows().is_empty());
    assert_eq!(panel.selection(), [2]);
    assert!(!panel.is_selected(1));

    panel.run(&backend).await.unwrap();
    panel.reset();
    assert!(panel.rows().is_empty());
    assert!(panel.selection().is_empty());
}

#[tokio::test]
async fn failure_leaves_nothing_shown() {
    let backend = FakeBackend {
        rows: vec![row(1)],
        fail_compare: true,
        ..FakeBackend::goa_and_pune()
    };
    let mut panel = ComparisonPanel::new();
    panel.toggle(1);
    assert!(panel.run(&backend).await.is_err());
    assert!(panel.rows().is_empty());
}

#[tokio::test]
async fn panel_with_nothing_selected_stays_offline() {
    let backend = FakeBackend::goa_and_pune();
    let mut panel = ComparisonPanel::new();
    panel.toggle(3);
    panel.toggle(3);
    assert!(panel.run(&backend).await.unwrap().is_empty());
    assert!(backend.calls().is_empty());
}
