//! Standalone Leaflet page export.
//!
//! Renders a [`MapScene`] as a single HTML file that loads Leaflet from a
//! CDN and replays the scene: view, tile layer, pins with popups, tracking
//! lines and the filter dropdown. Used for desktop previews of a history.
//!
//! The dropdown can only bring back pins that are in the scene, so export a
//! scene taken under the `"all"` selection.

use crate::error::Result;
use crate::render::escape_html;
use crate::screen::MapScene;

const LEAFLET_VERSION: &str = "1.9.4";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{TITLE}}</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="stylesheet" href="https://unpkg.com/leaflet@{{LEAFLET}}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{{LEAFLET}}/dist/leaflet.js"></script>
<style>
  html, body { height: 100%; margin: 0; }
  #filter { position: absolute; top: 10px; right: 10px; z-index: 1000; }
  #mapId3 { height: 100%; }
</style>
</head>
<body>
<select id="filter"></select>
<div id="mapId3"></div>
<script>
const scene = {{SCENE}};
const map = L.map('mapId3').setView([scene.center.latitude, scene.center.longitude], scene.zoom);
L.tileLayer(scene.tile_layer.url_template, { attribution: scene.tile_layer.attribution }).addTo(map);
const icon = L.icon({
  iconUrl: scene.marker_icon.icon_url,
  iconSize: scene.marker_icon.icon_size,
  iconAnchor: scene.marker_icon.icon_anchor,
  popupAnchor: scene.marker_icon.popup_anchor
});
const pinLayer = L.layerGroup().addTo(map);
const lineLayer = L.layerGroup().addTo(map);
const latLng = p => [p.latitude, p.longitude];

function drawLines() {
  const style = scene.lines.length > 0 ? scene.lines[0].style : { color: 'blue', weight: 3, opacity: 0.5, smooth_factor: 1 };
  for (let i = 0; i + 1 < scene.pins.length; i++) {
    const a = scene.pins[i].position, b = scene.pins[i + 1].position;
    const mid = { latitude: (a.latitude + b.latitude) / 2, longitude: (a.longitude + b.longitude) / 2 };
    L.polyline([latLng(a), latLng(mid), latLng(b)], {
      color: style.color, weight: style.weight, opacity: style.opacity, smoothFactor: style.smooth_factor
    }).addTo(lineLayer);
  }
}

function draw(selected) {
  pinLayer.clearLayers();
  const pins = scene.pins.filter(p => selected === 'all' || p.code === selected);
  for (const pin of pins) {
    L.marker(latLng(pin.position), { icon }).bindPopup(pin.popup_html).addTo(pinLayer);
  }
}

const select = document.getElementById('filter');
for (const option of scene.filter_options) {
  const el = document.createElement('option');
  el.value = option;
  el.textContent = option;
  select.appendChild(el);
}
select.value = scene.selected_filter;
select.addEventListener('change', e => draw(e.target.value));
drawLines();
draw(scene.selected_filter);
if (scene.bounds) {
  map.fitBounds([[scene.bounds.min_lat, scene.bounds.min_lng], [scene.bounds.max_lat, scene.bounds.max_lng]], { maxZoom: scene.zoom });
}
</script>
</body>
</html>
"#;

/// Render `scene` as a self-contained HTML page.
///
/// The page embeds the pins of the scene and filters them client side:
/// exactly `"all"` shows every pin, any other value only pins with that
/// code. Tracking lines join every embedded pin and do not follow the
/// dropdown.
pub fn render_html(scene: &MapScene, title: &str) -> Result<String> {
    // A literal "</" would close the script element early
    let scene_json = serde_json::to_string(scene)?.replace("</", "<\\/");

    Ok(PAGE_TEMPLATE
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{LEAFLET}}", LEAFLET_VERSION)
        .replace("{{SCENE}}", &scene_json))
}
