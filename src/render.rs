//! # Marker Rendering
//!
//! The map widget itself lives in the host. This module talks to it through
//! [`MapSurface`] and implements the render pass:
//!
//! 1. remove every existing point marker
//! 2. add one pin per marker that survives the filter, with a popup
//! 3. draw tracking lines across the whole marker list, whatever the filter
//!
//! Lines from earlier passes stay on the map unless
//! [`TrackLineConfig::retain_previous`](crate::config::TrackLineConfig) is
//! turned off.
//!
//! [`RecordingSurface`] keeps the live layers in memory. Tests use it, and
//! the Leaflet exporter reads the final layer set from it.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{MapConfig, MarkerIcon, TileLayer};
use crate::error::Result;
use crate::filter::{filter_markers, FilterSelection};
use crate::tracking::{tracking_lines, TrackLine};
use crate::{MapMarker, ScanPoint};

/// Handle for a layer added to a map surface.
pub type LayerId = u64;

/// A pin ready to be placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPin {
    pub position: ScanPoint,
    pub code: String,
    /// Popup body, HTML
    pub popup_html: String,
}

impl MapPin {
    pub fn from_marker(marker: &MapMarker) -> Self {
        Self {
            position: marker.point(),
            code: marker.city.clone(),
            popup_html: popup_html(marker),
        }
    }
}

/// Host map widget.
pub trait MapSurface {
    /// Center the view.
    fn set_view(&mut self, center: ScanPoint, zoom: u8) -> Result<()>;

    fn add_tile_layer(&mut self, layer: &TileLayer) -> Result<()>;

    /// Icon used for every subsequently added pin.
    fn set_marker_icon(&mut self, icon: &MarkerIcon) -> Result<()>;

    fn add_marker(&mut self, pin: &MapPin) -> Result<LayerId>;

    /// Remove every point marker; tile and line layers stay.
    fn remove_markers(&mut self) -> Result<()>;

    fn add_polyline(&mut self, line: &TrackLine) -> Result<LayerId>;

    /// Remove every tracking line.
    fn remove_polylines(&mut self) -> Result<()>;
}

/// Popup body for a marker: code, date, time.
///
/// Values are HTML-escaped since codes come straight from scanned content.
/// A missing date or time renders empty.
pub fn popup_html(marker: &MapMarker) -> String {
    format!(
        "<b>Link: {}</b><br>Fecha: {}<br>Hora: {}",
        escape_html(&marker.city),
        escape_html(marker.date.as_deref().unwrap_or("")),
        escape_html(marker.time.as_deref().unwrap_or("")),
    )
}

pub(crate) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Outcome of one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSummary {
    pub markers_rendered: usize,
    pub lines_drawn: usize,
}

/// Run the render pass for `markers` under `selection`.
///
/// Only pins are filtered. Tracking lines always join consecutive entries
/// of the full `markers` list.
pub fn render_markers<M: MapSurface + ?Sized>(
    surface: &mut M,
    markers: &[MapMarker],
    selection: &FilterSelection,
    config: &MapConfig,
) -> Result<RenderSummary> {
    surface.remove_markers()?;

    let visible = filter_markers(markers, selection);
    for marker in &visible {
        surface.add_marker(&MapPin::from_marker(marker))?;
    }

    if !config.track_lines.retain_previous {
        surface.remove_polylines()?;
    }
    let lines = tracking_lines(markers, &config.track_lines.style);
    for line in &lines {
        surface.add_polyline(line)?;
    }

    debug!(
        "[ScanMap] Rendered {} of {} markers ({}), {} lines",
        visible.len(),
        markers.len(),
        selection,
        lines.len()
    );

    Ok(RenderSummary {
        markers_rendered: visible.len(),
        lines_drawn: lines.len(),
    })
}

// ============================================================================
// Recording surface
// ============================================================================

/// In-memory map surface holding the current layer set.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub view: Option<(ScanPoint, u8)>,
    pub tile_layers: Vec<TileLayer>,
    pub marker_icon: Option<MarkerIcon>,
    pins: Vec<(LayerId, MapPin)>,
    lines: Vec<(LayerId, TrackLine)>,
    next_id: LayerId,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pins(&self) -> impl Iterator<Item = &MapPin> {
        self.pins.iter().map(|(_, pin)| pin)
    }

    pub fn lines(&self) -> impl Iterator<Item = &TrackLine> {
        self.lines.iter().map(|(_, line)| line)
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn allocate_id(&mut self) -> LayerId {
        self.next_id += 1;
        self.next_id
    }
}

impl MapSurface for RecordingSurface {
    fn set_view(&mut self, center: ScanPoint, zoom: u8) -> Result<()> {
        self.view = Some((center, zoom));
        Ok(())
    }

    fn add_tile_layer(&mut self, layer: &TileLayer) -> Result<()> {
        self.tile_layers.push(layer.clone());
        Ok(())
    }

    fn set_marker_icon(&mut self, icon: &MarkerIcon) -> Result<()> {
        self.marker_icon = Some(icon.clone());
        Ok(())
    }

    fn add_marker(&mut self, pin: &MapPin) -> Result<LayerId> {
        let id = self.allocate_id();
        self.pins.push((id, pin.clone()));
        Ok(id)
    }

    fn remove_markers(&mut self) -> Result<()> {
        self.pins.clear();
        Ok(())
    }

    fn add_polyline(&mut self, line: &TrackLine) -> Result<LayerId> {
        let id = self.allocate_id();
        self.lines.push((id, line.clone()));
        Ok(id)
    }

    fn remove_polylines(&mut self) -> Result<()> {
        self.lines.clear();
        Ok(())
    }
}
