//! Scan grouping.
//!
//! Turns the flat scan history into one marker per (code, point) pair and
//! the list of distinct codes for the filter dropdown.

use std::collections::HashMap;

use log::debug;

use crate::filter::FILTER_ALL;
use crate::{MapMarker, ScanPoint, ScanRecord};

/// Result of grouping the scan history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanGrouping {
    /// Distinct codes in first-seen order
    pub codes: Vec<String>,
    /// Markers grouped code by code, in the same order as `codes`
    pub markers: Vec<MapMarker>,
}

impl ScanGrouping {
    /// Dropdown options: the "all" sentinel followed by every code.
    pub fn filter_options(&self) -> Vec<String> {
        if self.codes.is_empty() {
            return Vec::new();
        }
        std::iter::once(FILTER_ALL.to_string())
            .chain(self.codes.iter().cloned())
            .collect()
    }

    /// Markers belonging to `code`.
    pub fn markers_for<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a MapMarker> + 'a {
        self.markers.iter().filter(move |m| m.city == code)
    }
}

/// Per-code accumulator.
struct CodeGroup<'a> {
    code: &'a str,
    points: Vec<ScanPoint>,
    /// First record seen for this code; its date/time labels every marker
    first: &'a ScanRecord,
}

/// Group scan records by code.
///
/// Each record contributes one point (missing coordinates become 0) to the
/// group of its code. Groups keep first-seen order and every marker of a
/// group carries the date/time of the first record with that code, even
/// when later scans of the same code were taken at other times.
///
/// # Example
/// ```
/// use scan_map::{group_scan_history, ScanRecord};
///
/// let history = vec![
///     ScanRecord::new("B", 5.0, 5.0),
///     ScanRecord::new("A", 1.0, 1.0),
///     ScanRecord::new("B", 6.0, 6.0),
/// ];
/// let grouping = group_scan_history(&history);
/// assert_eq!(grouping.codes, vec!["B", "A"]);
/// assert_eq!(grouping.markers[1].lat, 6.0);
/// ```
pub fn group_scan_history(history: &[ScanRecord]) -> ScanGrouping {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<CodeGroup> = Vec::new();

    for record in history {
        let slot = *index.entry(record.data.as_str()).or_insert_with(|| {
            groups.push(CodeGroup {
                code: record.data.as_str(),
                points: Vec::new(),
                first: record,
            });
            groups.len() - 1
        });
        groups[slot].points.push(record.point());
    }

    let codes: Vec<String> = groups.iter().map(|g| g.code.to_string()).collect();
    let markers: Vec<MapMarker> = groups
        .iter()
        .flat_map(|group| {
            group.points.iter().map(move |p| MapMarker {
                lat: p.latitude,
                long: p.longitude,
                city: group.code.to_string(),
                date: group.first.date.clone(),
                time: group.first.time.clone(),
            })
        })
        .collect();

    debug!(
        "[ScanMap] Grouped {} records into {} codes",
        history.len(),
        codes.len()
    );

    ScanGrouping { codes, markers }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_history() -> Vec<ScanRecord> {
        vec![
            ScanRecord::new("A", 1.0, 1.0).with_timestamp("d1", "t1"),
            ScanRecord::new("A", 2.0, 2.0).with_timestamp("d2", "t2"),
            ScanRecord::new("B", 5.0, 5.0).with_timestamp("d3", "t3"),
        ]
    }

    #[test]
    fn test_empty_history() {
        let grouping = group_scan_history(&[]);
        assert!(grouping.markers.is_empty());
        assert!(grouping.codes.is_empty());
        assert!(grouping.filter_options().is_empty());
    }

    #[test]
    fn test_example_history() {
        let grouping = group_scan_history(&example_history());
        assert_eq!(grouping.codes, vec!["A", "B"]);
        assert_eq!(grouping.filter_options(), vec!["all", "A", "B"]);

        let a: Vec<&MapMarker> = grouping.markers_for("A").collect();
        assert_eq!(a.len(), 2);
        assert_eq!((a[0].lat, a[0].long), (1.0, 1.0));
        assert_eq!((a[1].lat, a[1].long), (2.0, 2.0));
        for marker in &a {
            assert_eq!(marker.date.as_deref(), Some("d1"));
            assert_eq!(marker.time.as_deref(), Some("t1"));
        }

        let b: Vec<&MapMarker> = grouping.markers_for("B").collect();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].date.as_deref(), Some("d3"));
        assert_eq!(b[0].time.as_deref(), Some("t3"));
    }

    #[test]
    fn test_same_code_yields_one_marker_per_record() {
        let history: Vec<ScanRecord> = (0..7)
            .map(|i| {
                ScanRecord::new("QR", i as f64, -(i as f64))
                    .with_timestamp(&format!("day-{}", i), &format!("hour-{}", i))
            })
            .collect();

        let grouping = group_scan_history(&history);
        assert_eq!(grouping.markers.len(), 7);
        assert!(grouping.markers.iter().all(|m| m.city == "QR"));
        assert!(grouping
            .markers
            .iter()
            .all(|m| m.date.as_deref() == Some("day-0") && m.time.as_deref() == Some("hour-0")));
    }

    #[test]
    fn test_interleaved_codes_are_grouped() {
        let history = vec![
            ScanRecord::new("A", 1.0, 1.0),
            ScanRecord::new("B", 5.0, 5.0),
            ScanRecord::new("A", 2.0, 2.0),
        ];
        let grouping = group_scan_history(&history);
        let order: Vec<(&str, f64)> = grouping
            .markers
            .iter()
            .map(|m| (m.city.as_str(), m.lat))
            .collect();
        assert_eq!(order, vec![("A", 1.0), ("A", 2.0), ("B", 5.0)]);
    }

    #[test]
    fn test_missing_coordinates_become_origin() {
        let history = vec![ScanRecord {
            data: "lost".to_string(),
            ..Default::default()
        }];
        let grouping = group_scan_history(&history);
        assert_eq!(grouping.markers.len(), 1);
        assert_eq!(grouping.markers[0].point(), ScanPoint::new(0.0, 0.0));
        assert_eq!(grouping.markers[0].date, None);
    }
}
