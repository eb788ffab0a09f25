use crate::config::AppConfig;
use crate::types::{Centroid, CentroidGroup, Quadrant};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;

/// One centroid group flattened for the map page.
#[derive(Debug, Serialize)]
struct GroupView {
    name: String,
    quadrant: &'static str,
    color: &'static str,
    /// [lat, lon], Leaflet order.
    centroid: [f64; 2],
    points: Vec<PointView>,
}

#[derive(Debug, Serialize)]
struct PointView {
    /// [lat, lon], Leaflet order.
    coords: [f64; 2],
    popup: String,
}

/// Renders the grouped points into a self-contained Leaflet page at
/// `<output.dir>/map.html`.
pub fn generate_map(
    config: &AppConfig,
    centroids: &[Centroid],
    groups: &[CentroidGroup],
) -> Result<()> {
    println!("Rendering map with {} groups...", groups.len());

    let html = build_html(config, centroids, groups)?;

    fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("Failed to create output directory: {:?}", config.output.dir))?;
    let path = config.output.dir.join("map.html");
    fs::write(&path, html).with_context(|| format!("Failed to write map: {:?}", path))?;

    println!("Wrote {:?}", path);
    Ok(())
}

/// Builds the full map page. Group data and the quadrant palette are
/// embedded as JSON; the page script draws circle markers per point, a
/// count badge per centroid, the quadrant legend, and (when enabled) a
/// density heatmap over every assigned point.
pub fn build_html(
    config: &AppConfig,
    centroids: &[Centroid],
    groups: &[CentroidGroup],
) -> Result<String> {
    let views: Vec<GroupView> = groups
        .iter()
        .map(|group| {
            let centroid = &centroids[group.centroid.0];
            GroupView {
                name: centroid.name.clone(),
                quadrant: group.quadrant.label(),
                color: group.quadrant.color(),
                centroid: [centroid.latitude, centroid.longitude],
                points: group
                    .points
                    .iter()
                    .map(|record| PointView {
                        coords: [record.point.y(), record.point.x()],
                        popup: popup_text(&config.input.popup_fields, &record.fields),
                    })
                    .collect(),
            }
        })
        .collect();

    let palette: Vec<[&str; 2]> = Quadrant::ALL.iter().map(|q| [q.label(), q.color()]).collect();

    let groups_json = serde_json::to_string(&views).context("Failed to serialize group data")?;
    let palette_json = serde_json::to_string(&palette).context("Failed to serialize palette")?;

    let (heat_script, heat_init) = if config.map.heatmap {
        (
            r#"<script src="https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js"></script>"#,
            "const heatPoints = groups.flatMap(g => g.points.map(p => p.coords));\n\
             L.heatLayer(heatPoints, { radius: 20 }).addTo(map);",
        )
    } else {
        ("", "")
    };

    let html = TEMPLATE
        .replace("__MAP_LAT__", &config.map.center_latitude.to_string())
        .replace("__MAP_LON__", &config.map.center_longitude.to_string())
        .replace("__MAP_ZOOM__", &config.map.zoom.to_string())
        .replace("__GROUPS__", &groups_json)
        .replace("__PALETTE__", &palette_json)
        .replace("__HEAT_SCRIPT__", heat_script)
        .replace("__HEAT_INIT__", heat_init);

    Ok(html)
}

/// Popup body for a marker: the configured fields in order, skipping
/// columns the record does not have.
fn popup_text(popup_fields: &[String], fields: &std::collections::HashMap<String, String>) -> String {
    popup_fields
        .iter()
        .filter_map(|name| fields.get(name).map(|value| format!("{}: {}", name, value)))
        .collect::<Vec<_>>()
        .join("<br>")
}

static TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Violation Hotspot Map</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
__HEAT_SCRIPT__
<style>
  html, body, #map { height: 100%; margin: 0; }
  .legend { background: white; padding: 8px 12px; border-radius: 4px; box-shadow: 0 1px 4px rgba(0,0,0,0.3); }
  .legend h4 { margin: 0 0 6px; }
  .color-box { display: inline-block; width: 12px; height: 12px; margin-right: 6px; }
  .cluster-icon div { border: 2px solid white; }
</style>
</head>
<body>
<div id="map"></div>
<script>
const groups = __GROUPS__;
const palette = __PALETTE__;

const map = L.map('map').setView([__MAP_LAT__, __MAP_LON__], __MAP_ZOOM__);
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);

groups.forEach(group => {
    const layer = L.featureGroup();
    group.points.forEach(p => {
        L.circleMarker(p.coords, {
            radius: 5,
            fillColor: group.color,
            color: '#000',
            weight: 1,
            opacity: 1,
            fillOpacity: 0.8
        }).bindPopup(p.popup).addTo(layer);
    });
    L.marker(group.centroid, {
        icon: L.divIcon({
            className: 'cluster-icon',
            html: `<div style="background-color: ${group.color}; color: white; border-radius: 50%; width: 30px; height: 30px; display: flex; justify-content: center; align-items: center; font-weight: bold;">${group.points.length}</div>`
        })
    }).bindPopup(`<strong>${group.name}</strong><br>Region: ${group.quadrant}<br>Violations: ${group.points.length}`).addTo(layer);
    layer.addTo(map);
});

const legend = L.control({ position: 'bottomright' });
legend.onAdd = function () {
    const div = L.DomUtil.create('div', 'legend');
    let content = '<h4>Regions</h4>';
    palette.forEach(([region, color]) => {
        content += `<div><span class="color-box" style="background-color: ${color};"></span>${region}</div>`;
    });
    div.innerHTML = content;
    return div;
};
legend.addTo(map);

__HEAT_INIT__
</script>
</body>
</html>
"#;
