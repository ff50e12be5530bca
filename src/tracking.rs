//! Tracking lines.
//!
//! Consecutive markers are joined by a three point path
//! (start, midpoint, end). This is a visual aid only; it does not follow
//! any real route between the scans.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::config::LineStyle;
use crate::{MapMarker, ScanPoint};

/// One tracking line between two consecutive markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLine {
    /// `[start, midpoint, end]`
    pub points: Vec<ScanPoint>,
    pub style: LineStyle,
}

impl TrackLine {
    /// Build the three point path from `start` to `end`.
    pub fn between(start: ScanPoint, end: ScanPoint, style: &LineStyle) -> Self {
        Self {
            points: vec![start, start.midpoint(&end), end],
            style: style.clone(),
        }
    }

    /// First point, `None` for a line with no points.
    pub fn start(&self) -> Option<ScanPoint> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<ScanPoint> {
        self.points.last().copied()
    }

    /// Great-circle length between the endpoints in meters, 0 for an
    /// empty line.
    pub fn length_meters(&self) -> f64 {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => Haversine::distance(
                Point::new(start.longitude, start.latitude),
                Point::new(end.longitude, end.latitude),
            ),
            _ => 0.0,
        }
    }
}

/// Lines joining each consecutive pair of `markers`, in list order.
///
/// Pairs are taken across the whole list, so the last marker of one code
/// is joined to the first marker of the next. n markers give n-1 lines.
pub fn tracking_lines<'a, I>(markers: I, style: &LineStyle) -> Vec<TrackLine>
where
    I: IntoIterator<Item = &'a MapMarker>,
{
    let points: Vec<ScanPoint> = markers.into_iter().map(|m| m.point()).collect();
    points
        .windows(2)
        .map(|pair| TrackLine::between(pair[0], pair[1], style))
        .collect()
}
