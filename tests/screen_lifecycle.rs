//! End-to-end tests: SQLite store -> grouping -> render pass.
//!
//! Run with: `cargo test --test screen_lifecycle`

#![cfg(feature = "persistence")]

use scan_map::{
    append_scan, group_scan_history, render_html, KeyValueStore, MapMarker, RecordingSurface,
    ScanMapError, ScanMapScreen, ScanRecord, SqliteStore, SCAN_HISTORY_KEY,
};
use tempfile::TempDir;

/// Helper: store in a temp dir holding the reference history.
fn setup_store() -> (SqliteStore, TempDir) {
    let tmp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = tmp_dir.path().join("scans.db");
    let mut store =
        SqliteStore::new(db_path.to_str().unwrap()).expect("failed to create store");

    for record in [
        ScanRecord::new("A", 1.0, 1.0).with_timestamp("d1", "t1"),
        ScanRecord::new("A", 2.0, 2.0).with_timestamp("d2", "t2"),
        ScanRecord::new("B", 5.0, 5.0).with_timestamp("d3", "t3"),
    ] {
        append_scan(&mut store, record).expect("failed to append scan");
    }

    (store, tmp_dir)
}

fn labels(markers: &[&MapMarker]) -> Vec<(String, f64, Option<String>, Option<String>)> {
    markers
        .iter()
        .map(|m| (m.city.clone(), m.lat, m.date.clone(), m.time.clone()))
        .collect()
}

#[test]
fn test_reference_history_end_to_end() {
    let (store, _tmp) = setup_store();
    let mut screen = ScanMapScreen::new(store);
    let mut surface = RecordingSurface::new();

    let summary = screen.on_enter(&mut surface).unwrap();
    assert_eq!(summary.markers_rendered, 3);
    assert_eq!(summary.lines_drawn, 2);
    assert_eq!(screen.filter_options(), vec!["all", "A", "B"]);

    screen.select_filter("A", &mut surface).unwrap();
    let a = screen.rendered_markers();
    assert_eq!(
        labels(&a),
        vec![
            ("A".to_string(), 1.0, Some("d1".to_string()), Some("t1".to_string())),
            ("A".to_string(), 2.0, Some("d1".to_string()), Some("t1".to_string())),
        ]
    );
    assert_eq!(surface.pin_count(), 2);

    screen.select_filter("B", &mut surface).unwrap();
    let b = screen.rendered_markers();
    assert_eq!(
        labels(&b),
        vec![("B".to_string(), 5.0, Some("d3".to_string()), Some("t3".to_string()))]
    );
    assert_eq!(surface.pin_count(), 1);
    // Every pass redraws the two lines of the full list on top of the old ones
    assert_eq!(surface.line_count(), 6);
}

#[test]
fn test_history_written_by_host_json() {
    let (mut store, _tmp) = setup_store();
    store
        .set(
            SCAN_HISTORY_KEY,
            r#"[{"data":"https://example.org/x"},{"data":"https://example.org/x","latitude":3.4}]"#,
        )
        .unwrap();

    let mut screen = ScanMapScreen::new(store);
    let mut surface = RecordingSurface::new();
    screen.on_enter(&mut surface).unwrap();

    let markers = screen.markers();
    assert_eq!(markers.len(), 2);
    assert_eq!((markers[0].lat, markers[0].long), (0.0, 0.0));
    assert_eq!((markers[1].lat, markers[1].long), (3.4, 0.0));
}

#[test]
fn test_malformed_history_reaches_host() {
    let (mut store, _tmp) = setup_store();
    store.set(SCAN_HISTORY_KEY, "\"not a list\"").unwrap();

    let mut screen = ScanMapScreen::new(store);
    let mut surface = RecordingSurface::new();
    let result = screen.on_enter(&mut surface);
    assert!(matches!(result, Err(ScanMapError::MalformedHistory { .. })));
    assert_eq!(surface.pin_count(), 0);
}

#[test]
fn test_export_page_from_store() {
    let (store, _tmp) = setup_store();
    let mut screen = ScanMapScreen::new(store);
    let mut surface = RecordingSurface::new();
    screen.on_enter(&mut surface).unwrap();

    let html = render_html(&screen.scene(&surface), "History").unwrap();
    assert!(html.contains("Link: A"));
    assert!(html.contains("Link: B"));
    assert!(html.contains("\"selected_filter\":\"all\""));
}

#[test]
fn test_global_screen_singleton() {
    let (store, _tmp) = setup_store();
    let mut state = scan_map::ScreenState {
        screen: ScanMapScreen::new(store),
        surface: RecordingSurface::new(),
    };
    state.screen.on_enter(&mut state.surface).unwrap();
    *scan_map::SCREEN.lock().unwrap() = Some(state);

    let pins = scan_map::with_screen(|s| {
        s.screen.select_filter("A", &mut s.surface).unwrap();
        s.surface.pin_count()
    });
    assert_eq!(pins, Some(2));

    let options = scan_map::with_screen(|s| s.screen.filter_options());
    assert_eq!(options, Some(vec!["all".to_string(), "A".to_string(), "B".to_string()]));

    *scan_map::SCREEN.lock().unwrap() = None;
    assert!(scan_map::with_screen(|s| s.surface.pin_count()).is_none());
}

#[test]
fn test_grouping_matches_screen() {
    let (store, _tmp) = setup_store();
    let history = scan_map::load_scan_history(&store).unwrap();
    let grouping = group_scan_history(&history);

    let mut screen = ScanMapScreen::new(store);
    screen.reload().unwrap();
    assert_eq!(screen.markers(), grouping.markers.as_slice());
    assert_eq!(screen.codes(), grouping.codes.as_slice());
}
