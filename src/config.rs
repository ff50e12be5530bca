//! Map configuration.
//!
//! Defaults reproduce the scan map screen: a light CARTO basemap centered
//! on Cali at zoom 16, a 30px pin icon, and translucent blue tracking lines.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanMapError};
use crate::ScanPoint;

/// Tile layer definition handed to the map widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png"
                .to_string(),
            attribution: "edupala.com".to_string(),
        }
    }
}

/// Marker icon bitmap and its pixel geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerIcon {
    pub icon_url: String,
    /// `[width, height]` in pixels
    pub icon_size: [u32; 2],
    /// Pixel of the icon that sits on the marker position
    pub icon_anchor: [i32; 2],
    /// Popup offset relative to the anchor
    pub popup_anchor: [i32; 2],
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            icon_url:
                "https://w7.pngwing.com/pngs/995/841/png-transparent-pin-location-map-icon.png"
                    .to_string(),
            icon_size: [30, 30],
            icon_anchor: [20, 40],
            popup_anchor: [0, -40],
        }
    }
}

/// Stroke style for tracking lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub smooth_factor: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
            weight: 3.0,
            opacity: 0.5,
            smooth_factor: 1.0,
        }
    }
}

/// Tracking line behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLineConfig {
    pub style: LineStyle,
    /// Keep lines from earlier renders, so every filter change adds a new
    /// set on top of the old ones. Set to false to replace them instead.
    /// Default: true
    pub retain_previous: bool,
}

impl Default for TrackLineConfig {
    fn default() -> Self {
        Self {
            style: LineStyle::default(),
            retain_previous: true,
        }
    }
}

/// Everything the screen needs to set up the map widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial view center. Default: 3.4372, -76.5225
    pub center: ScanPoint,
    /// Initial zoom level. Default: 16
    pub zoom: u8,
    pub tile_layer: TileLayer,
    pub marker_icon: MarkerIcon,
    pub track_lines: TrackLineConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: ScanPoint::new(3.4372, -76.5225),
            zoom: 16,
            tile_layer: TileLayer::default(),
            marker_icon: MarkerIcon::default(),
            track_lines: TrackLineConfig::default(),
        }
    }
}

impl MapConfig {
    /// Parse a config from JSON. Missing fields are an error; hosts
    /// start from `MapConfig::default()` serialized.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the map widget would reject.
    pub fn validate(&self) -> Result<()> {
        if !(self.center.latitude.is_finite() && self.center.longitude.is_finite()) {
            return Err(ScanMapError::Config {
                message: "center must be finite".to_string(),
            });
        }
        if self.zoom > 22 {
            return Err(ScanMapError::Config {
                message: format!("zoom {} is above the tile maximum of 22", self.zoom),
            });
        }
        let style = &self.track_lines.style;
        if !(0.0..=1.0).contains(&style.opacity) {
            return Err(ScanMapError::Config {
                message: format!("line opacity {} is outside 0..=1", style.opacity),
            });
        }
        if self.tile_layer.url_template.is_empty() {
            return Err(ScanMapError::Config {
                message: "tile layer url template is empty".to_string(),
            });
        }
        Ok(())
    }
}
