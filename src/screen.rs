//! # Scan Map Screen
//!
//! Stateful component behind the scan map page.
//!
//! ## Lifecycle
//!
//! - [`ScanMapScreen::on_enter`]: load history, group it, set up the map and
//!   render everything under the current selection
//! - [`ScanMapScreen::select_filter`]: re-run the render pass only
//!
//! The host calls these one at a time from its UI thread. For FFI the
//! screen lives in a global singleton together with a [`RecordingSurface`]
//! whose layer set is handed back to the host as JSON.

#[cfg(feature = "persistence")]
use std::sync::Mutex;

use log::info;
#[cfg(feature = "persistence")]
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::{MapConfig, MarkerIcon, TileLayer};
use crate::error::Result;
use crate::filter::{filter_markers, FilterSelection};
use crate::grouping::{group_scan_history, ScanGrouping};
use crate::render::{render_markers, MapPin, MapSurface, RecordingSurface, RenderSummary};
use crate::store::{load_scan_history, KeyValueStore};
use crate::tracking::TrackLine;
use crate::{Bounds, MapMarker, ScanPoint};

/// Serializable snapshot of what the map shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapScene {
    pub center: ScanPoint,
    pub zoom: u8,
    pub tile_layer: TileLayer,
    pub marker_icon: MarkerIcon,
    /// Dropdown options, "all" first
    pub filter_options: Vec<String>,
    pub selected_filter: String,
    pub pins: Vec<MapPin>,
    pub lines: Vec<TrackLine>,
    /// Bounds of the rendered pins, if any
    pub bounds: Option<Bounds>,
}

impl MapScene {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The scan map screen.
pub struct ScanMapScreen<S: KeyValueStore> {
    store: S,
    config: MapConfig,
    grouping: ScanGrouping,
    selection: FilterSelection,
}

impl<S: KeyValueStore> ScanMapScreen<S> {
    /// Create a screen with the default map configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, MapConfig::default())
    }

    pub fn with_config(store: S, config: MapConfig) -> Self {
        Self {
            store,
            config,
            grouping: ScanGrouping::default(),
            selection: FilterSelection::All,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Screen became active: load, group, set up the map, render.
    pub fn on_enter<M: MapSurface + ?Sized>(&mut self, surface: &mut M) -> Result<RenderSummary> {
        self.reload()?;

        surface.set_view(self.config.center, self.config.zoom)?;
        surface.add_tile_layer(&self.config.tile_layer)?;
        surface.set_marker_icon(&self.config.marker_icon)?;

        self.render(surface)
    }

    /// Re-read the history and regroup it. Does not touch the map.
    pub fn reload(&mut self) -> Result<()> {
        let history = load_scan_history(&self.store)?;
        self.grouping = group_scan_history(&history);
        info!(
            "[ScanMap] {} markers across {} codes",
            self.grouping.markers.len(),
            self.grouping.codes.len()
        );
        Ok(())
    }

    /// Dropdown changed: update the selection and re-render.
    pub fn select_filter<M: MapSurface + ?Sized>(
        &mut self,
        value: &str,
        surface: &mut M,
    ) -> Result<RenderSummary> {
        self.selection = FilterSelection::parse(value);
        info!("[ScanMap] Filter set to {}", self.selection);
        self.render(surface)
    }

    /// Render pass under the current selection.
    pub fn render<M: MapSurface + ?Sized>(&self, surface: &mut M) -> Result<RenderSummary> {
        render_markers(
            surface,
            &self.grouping.markers,
            &self.selection,
            &self.config,
        )
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Every marker from the last load.
    pub fn markers(&self) -> &[MapMarker] {
        &self.grouping.markers
    }

    /// Markers under the current selection.
    pub fn rendered_markers(&self) -> Vec<&MapMarker> {
        filter_markers(&self.grouping.markers, &self.selection)
    }

    /// Dropdown options, "all" first. Empty when there is no history.
    pub fn filter_options(&self) -> Vec<String> {
        self.grouping.filter_options()
    }

    /// Distinct codes in first-seen order.
    pub fn codes(&self) -> &[String] {
        &self.grouping.codes
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MapConfig) {
        self.config = config;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Snapshot of the map as shown on `surface`.
    pub fn scene(&self, surface: &RecordingSurface) -> MapScene {
        let pins: Vec<MapPin> = surface.pins().cloned().collect();
        let positions: Vec<ScanPoint> = pins.iter().map(|p| p.position).collect();

        MapScene {
            center: self.config.center,
            zoom: self.config.zoom,
            tile_layer: self.config.tile_layer.clone(),
            marker_icon: self.config.marker_icon.clone(),
            filter_options: self.filter_options(),
            selected_filter: self.selection.to_string(),
            bounds: Bounds::from_points(&positions),
            pins,
            lines: surface.lines().cloned().collect(),
        }
    }
}

// ============================================================================
// Global Singleton
// ============================================================================

/// Screen plus the surface it renders into.
#[cfg(feature = "persistence")]
pub struct ScreenState {
    pub screen: ScanMapScreen<crate::store::SqliteStore>,
    pub surface: RecordingSurface,
}

/// Global screen instance.
///
/// This singleton allows FFI calls to access a shared screen without
/// passing state back and forth across the FFI boundary.
#[cfg(feature = "persistence")]
pub static SCREEN: Lazy<Mutex<Option<ScreenState>>> = Lazy::new(|| Mutex::new(None));

/// Get a lock on the global screen. Returns `None` before initialization.
#[cfg(feature = "persistence")]
pub fn with_screen<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut ScreenState) -> R,
{
    let mut guard = SCREEN.lock().ok()?;
    guard.as_mut().map(f)
}

// ============================================================================
// FFI Exports
// ============================================================================

#[cfg(feature = "ffi")]
pub mod screen_ffi {
    use super::*;
    use crate::store::SqliteStore;
    use log::{error, info};

    fn scene_json(state: &ScreenState) -> String {
        state
            .screen
            .scene(&state.surface)
            .to_json()
            .unwrap_or_else(|e| {
                error!("[ScanMap] Failed to serialize scene: {}", e);
                "{}".to_string()
            })
    }

    /// Open the store and enter the screen. Call once when the page is shown.
    #[uniffi::export]
    pub fn scan_map_init(db_path: String) -> bool {
        crate::init_logging();
        info!("[ScanMap] Initializing with db: {}", db_path);

        let store = match SqliteStore::new(&db_path) {
            Ok(store) => store,
            Err(e) => {
                error!("[ScanMap] Failed to open store: {}", e);
                return false;
            }
        };

        let mut state = ScreenState {
            screen: ScanMapScreen::new(store),
            surface: RecordingSurface::new(),
        };
        if let Err(e) = state.screen.on_enter(&mut state.surface) {
            error!("[ScanMap] Failed to enter screen: {}", e);
            return false;
        }

        match SCREEN.lock() {
            Ok(mut guard) => {
                *guard = Some(state);
                true
            }
            Err(_) => false,
        }
    }

    /// Replace the map configuration. Takes effect on the next render.
    #[uniffi::export]
    pub fn scan_map_set_config_json(config_json: String) -> bool {
        match MapConfig::from_json(&config_json) {
            Ok(config) => with_screen(|s| s.screen.set_config(config)).is_some(),
            Err(e) => {
                error!("[ScanMap] Rejected config: {}", e);
                false
            }
        }
    }

    /// Re-read the history and re-render. Returns the scene JSON.
    #[uniffi::export]
    pub fn scan_map_reload() -> String {
        with_screen(|s| {
            if let Err(e) = s.screen.reload() {
                error!("[ScanMap] Reload failed: {}", e);
            } else if let Err(e) = s.screen.render(&mut s.surface) {
                error!("[ScanMap] Render failed: {}", e);
            }
            scene_json(s)
        })
        .unwrap_or_default()
    }

    /// Dropdown options, "all" first.
    #[uniffi::export]
    pub fn scan_map_get_filter_options() -> Vec<String> {
        with_screen(|s| s.screen.filter_options()).unwrap_or_default()
    }

    /// Apply a dropdown change. Returns the scene JSON.
    #[uniffi::export]
    pub fn scan_map_select_filter(value: String) -> String {
        with_screen(|s| {
            if let Err(e) = s.screen.select_filter(&value, &mut s.surface) {
                error!("[ScanMap] Render failed: {}", e);
            }
            scene_json(s)
        })
        .unwrap_or_default()
    }

    /// Current scene as JSON.
    #[uniffi::export]
    pub fn scan_map_get_scene_json() -> String {
        with_screen(|s| scene_json(s)).unwrap_or_default()
    }

    /// Markers under the current selection.
    #[uniffi::export]
    pub fn scan_map_get_rendered_markers() -> Vec<MapMarker> {
        with_screen(|s| s.screen.rendered_markers().into_iter().cloned().collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
