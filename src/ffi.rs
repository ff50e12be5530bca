//! FFI bindings for mobile platforms (iOS/Android).
//!
//! Stateless helpers exposed through UniFFI. The stateful screen API lives
//! in [`crate::screen::screen_ffi`]. All functions here are prefixed with
//! `ffi_` to avoid naming conflicts with the internal API.

use crate::{
    group_scan_history, init_logging, parse_scan_history, popup_html, tracking_lines, LineStyle,
    MapMarker, ScanRecord, SCAN_HISTORY_KEY,
};
use log::{error, info};

/// Parse a `scanHistory` JSON array. A value that is not an array yields an
/// empty list.
fn parse_history(history_json: &str) -> Vec<ScanRecord> {
    match parse_scan_history(SCAN_HISTORY_KEY, history_json) {
        Ok(history) => history,
        Err(e) => {
            error!("[ScanMapRust] Invalid scan history JSON: {}", e);
            Vec::new()
        }
    }
}

/// Group a scan history JSON array into markers.
#[uniffi::export]
pub fn ffi_group_scan_history(history_json: String) -> Vec<MapMarker> {
    init_logging();
    let history = parse_history(&history_json);
    let grouping = group_scan_history(&history);
    info!(
        "[ScanMapRust] Grouped {} records into {} markers",
        history.len(),
        grouping.markers.len()
    );
    grouping.markers
}

/// Grouping from typed records (no JSON round trip).
#[uniffi::export]
pub fn ffi_group_scan_records(records: Vec<ScanRecord>) -> Vec<MapMarker> {
    group_scan_history(&records).markers
}

/// Dropdown options for a scan history JSON array, "all" first.
#[uniffi::export]
pub fn ffi_filter_options(history_json: String) -> Vec<String> {
    group_scan_history(&parse_history(&history_json)).filter_options()
}

/// Popup HTML for one marker.
#[uniffi::export]
pub fn ffi_popup_html(marker: MapMarker) -> String {
    popup_html(&marker)
}

/// Tracking lines for `markers` as flat coordinates.
///
/// Every line contributes six values: `[lat0, lng0, lat1, lng1, lat2, lng2]`
/// for start, midpoint and end.
#[uniffi::export]
pub fn ffi_tracking_lines_flat(markers: Vec<MapMarker>) -> Vec<f64> {
    tracking_lines(&markers, &LineStyle::default())
        .iter()
        .flat_map(|line| line.points.iter().flat_map(|p| p.lat_lng()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_history_with_bad_record() {
        let json = r#"[{"data":"A","latitude":1.0,"longitude":1.0},
                       {"data":"B","latitude":"3.4","longitude":5.0}]"#;
        let markers = ffi_group_scan_history(json.to_string());
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[1].city, "B");
        assert_eq!(markers[1].lat, 0.0);

        assert!(ffi_group_scan_history("{}".to_string()).is_empty());
    }

    #[test]
    fn test_filter_options_keep_case() {
        let json = r#"[{"data":"ALL"},{"data":"B"}]"#;
        assert_eq!(ffi_filter_options(json.to_string()), vec!["all", "ALL", "B"]);
    }

    #[test]
    fn test_tracking_lines_flat() {
        let json = r#"[{"data":"A","latitude":1.0,"longitude":1.0},
                       {"data":"B","latitude":3.0,"longitude":3.0}]"#;
        let markers = ffi_group_scan_history(json.to_string());
        assert_eq!(
            ffi_tracking_lines_flat(markers),
            vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0]
        );
    }
}
