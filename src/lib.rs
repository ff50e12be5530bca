//! # Scan Map
//!
//! Scan history grouping and map overlay rendering for the scan map screen.
//!
//! This library provides:
//! - Loading the `scanHistory` list from a key-value store
//! - Grouping scans by code into map markers
//! - Filtering markers by code and drawing tracking lines between them
//! - Driving a host map widget through the [`MapSurface`] trait
//!
//! ## Features
//!
//! - **`persistence`** - SQLite-backed key-value store (default)
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`cli`** - Desktop preview tool that exports a Leaflet page
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use scan_map::{group_scan_history, ScanRecord};
//!
//! let history = vec![
//!     ScanRecord::new("A", 1.0, 1.0).with_timestamp("d1", "t1"),
//!     ScanRecord::new("A", 2.0, 2.0).with_timestamp("d2", "t2"),
//!     ScanRecord::new("B", 5.0, 5.0).with_timestamp("d3", "t3"),
//! ];
//!
//! let grouping = group_scan_history(&history);
//! assert_eq!(grouping.codes, vec!["A", "B"]);
//! assert_eq!(grouping.markers.len(), 3);
//! assert_eq!(grouping.markers[1].date.as_deref(), Some("d1"));
//! ```

use geo::{BoundingRect, MultiPoint, Point};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Unified error handling
pub mod error;
pub use error::{Result, ScanMapError};

// Map configuration (center, tiles, icon, line style)
pub mod config;
pub use config::{LineStyle, MapConfig, MarkerIcon, TileLayer, TrackLineConfig};

// Key-value store and scan history loader
pub mod store;
#[cfg(feature = "persistence")]
pub use store::SqliteStore;
pub use store::{
    append_scan, load_scan_history, parse_scan_history, save_scan_history, KeyValueStore,
    MemoryStore, SCAN_HISTORY_KEY,
};

// Grouping scans by code
pub mod grouping;
pub use grouping::{group_scan_history, ScanGrouping};

// Filter selection
pub mod filter;
pub use filter::{filter_markers, FilterSelection, FILTER_ALL};

// Tracking lines between consecutive markers
pub mod tracking;
pub use tracking::{tracking_lines, TrackLine};

// Map surface abstraction and marker rendering
pub mod render;
pub use render::{
    popup_html, render_markers, LayerId, MapPin, MapSurface, RecordingSurface, RenderSummary,
};

// Stateful screen (singleton for FFI)
pub mod screen;
pub use screen::{MapScene, ScanMapScreen};
#[cfg(feature = "persistence")]
pub use screen::{with_screen, ScreenState, SCREEN};

// Standalone Leaflet page export
pub mod leaflet;
pub use leaflet::render_html;

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("ScanMapRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A coordinate pair with latitude and longitude.
///
/// # Example
/// ```
/// use scan_map::ScanPoint;
/// let point = ScanPoint::new(3.4372, -76.5225); // Cali
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ScanPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl ScanPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Point halfway between `self` and `other` in plain degree space.
    pub fn midpoint(&self, other: &ScanPoint) -> ScanPoint {
        ScanPoint::new(
            (self.latitude + other.latitude) / 2.0,
            (self.longitude + other.longitude) / 2.0,
        )
    }

    /// `[lat, lng]` pair, the order Leaflet expects.
    pub fn lat_lng(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// Bounding box around a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points. Returns `None` for an empty slice.
    pub fn from_points(points: &[ScanPoint]) -> Option<Self> {
        let multi: MultiPoint<f64> = points
            .iter()
            .map(|p| Point::new(p.longitude, p.latitude))
            .collect();
        let rect = multi.bounding_rect()?;

        Some(Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> ScanPoint {
        ScanPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// One stored scan, as written by the scanner under `scanHistory`.
///
/// Every field is optional in storage. Unknown fields are ignored and
/// `null` reads as missing. Stored histories go through
/// [`ScanRecord::from_json_value`], which never rejects a record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ScanRecord {
    /// Scanned code, the grouping key
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl ScanRecord {
    /// Create a record with a code and coordinates but no timestamp.
    pub fn new(data: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            data: data.to_string(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            date: None,
            time: None,
        }
    }

    /// Attach the date and time strings recorded with the scan.
    pub fn with_timestamp(mut self, date: &str, time: &str) -> Self {
        self.date = Some(date.to_string());
        self.time = Some(time.to_string());
        self
    }

    /// Read one stored entry without rejecting it.
    ///
    /// A number or boolean `data` becomes its text, `null` or a missing
    /// `data` becomes an empty code. Coordinates that are not numbers read
    /// as missing, as do dates and times that are not strings. Entries that
    /// are not objects become a record with an empty code at (0, 0).
    pub fn from_json_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::default();
        };
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        let data = match fields.get("data") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        Self {
            data,
            latitude: fields.get("latitude").and_then(Value::as_f64),
            longitude: fields.get("longitude").and_then(Value::as_f64),
            date: text("date"),
            time: text("time"),
        }
    }

    /// Coordinates of the scan. Missing or non-finite values read as 0.
    pub fn point(&self) -> ScanPoint {
        let or_zero = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0);
        ScanPoint::new(or_zero(self.latitude), or_zero(self.longitude))
    }
}

/// A renderable map pin derived from the scan history.
///
/// Field names follow the JSON the map page consumes: `city` carries the
/// scan code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct MapMarker {
    pub lat: f64,
    pub long: f64,
    /// Scan code this marker belongs to
    pub city: String,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl MapMarker {
    /// Position of the marker.
    pub fn point(&self) -> ScanPoint {
        ScanPoint::new(self.lat, self.long)
    }

    /// Scan code this marker belongs to.
    pub fn code(&self) -> &str {
        &self.city
    }
}

// ============================================================================
// Tests
// ============================================================================
