use std::fs;
use std::path::{Path, PathBuf};

use geojson::{Feature, GeoJson, Geometry, Value};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::{MapError, Result};
use crate::geo::{clamp_i32, GeoPosition};
use crate::map::{RoadMap, RoadMapBuilder};
use crate::style::{LayerId, StyleSheet};

/// Square edge in micro-degrees (about 2 km of latitude)
pub const SQUARE_SIZE: i32 = 20_000;

/// Feature properties holding the road or area class, checked in order
const CLASS_KEYS: &[&str] = &["highway", "class", "kind", "waterway", "leisure", "natural", "landuse"];

/// One converted geometry, ready for the builder
enum Shape {
    Line {
        layer: LayerId,
        name: Option<String>,
        points: Vec<GeoPosition>,
    },
    Area {
        layer: LayerId,
        name: Option<String>,
        ring: Vec<GeoPosition>,
    },
}

/// Load roads and areas from a GeoJSON file, or from every `.geojson` and
/// `.json` file in a directory
pub fn load_roads(path: &Path, style: &StyleSheet) -> Result<RoadMap> {
    let files = if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|e| MapError::io(path, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("geojson") || ext.eq_ignore_ascii_case("json"))
            })
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut builder = RoadMapBuilder::new(SQUARE_SIZE);
    let mut total = 0;
    for file in &files {
        let mut bytes = fs::read(file).map_err(|e| MapError::io(file, e))?;
        let shapes = parse_shapes(&mut bytes, file, style)?;
        debug!("{}: {} shapes", file.display(), shapes.len());
        total += shapes.len();
        add_shapes(&mut builder, shapes);
    }

    if total == 0 {
        return Err(MapError::no_data(path));
    }
    info!("Loaded {} shapes from {} file(s)", total, files.len());
    Ok(builder.build())
}

fn parse_shapes(bytes: &mut [u8], path: &Path, style: &StyleSheet) -> Result<Vec<Shape>> {
    let geojson: GeoJson = simd_json::serde::from_slice(bytes).map_err(|e| MapError::json(path, e))?;
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            warn!("{}: bare geometry has no class, skipped", path.display());
            Vec::new()
        }
    };

    let shapes: Vec<Shape> = features
        .par_iter()
        .flat_map_iter(|feature| convert_feature(feature, style))
        .collect();

    let skipped = features.len().saturating_sub(shapes.len());
    if skipped > 0 {
        debug!("{}: {} features without a known class", path.display(), skipped);
    }
    Ok(shapes)
}

fn add_shapes(builder: &mut RoadMapBuilder, shapes: Vec<Shape>) {
    for shape in shapes {
        match shape {
            Shape::Line { layer, name, points } => builder.add_line(layer, name.as_deref(), points),
            Shape::Area { layer, name, ring } => builder.add_area(layer, name.as_deref(), ring),
        }
    }
}

fn property<'a>(feature: &'a Feature, key: &str) -> Option<&'a str> {
    feature.property(key).and_then(|v| v.as_str())
}

fn convert_feature(feature: &Feature, style: &StyleSheet) -> Vec<Shape> {
    let Some(layer) = CLASS_KEYS
        .iter()
        .filter_map(|key| property(feature, key))
        .find_map(|class| style.layer_for_class(class))
    else {
        return Vec::new();
    };
    let name = property(feature, "name").or_else(|| property(feature, "ref"));

    let mut shapes = Vec::new();
    if let Some(geometry) = &feature.geometry {
        collect_geometry(geometry, layer, name, &mut shapes);
    }
    shapes
}

fn to_positions(coords: &[Vec<f64>]) -> Vec<GeoPosition> {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| GeoPosition::from_degrees(c[0], c[1]))
        .collect()
}

fn collect_geometry(geometry: &Geometry, layer: LayerId, name: Option<&str>, out: &mut Vec<Shape>) {
    let name = || name.map(str::to_string);
    match &geometry.value {
        Value::LineString(coords) => out.push(Shape::Line {
            layer,
            name: name(),
            points: to_positions(coords),
        }),
        Value::MultiLineString(lines) => {
            for coords in lines {
                out.push(Shape::Line {
                    layer,
                    name: name(),
                    points: to_positions(coords),
                });
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                out.push(Shape::Area {
                    layer,
                    name: name(),
                    ring: to_positions(exterior),
                });
            }
        }
        Value::MultiPolygon(polygons) => {
            for exterior in polygons.iter().filter_map(|rings| rings.first()) {
                out.push(Shape::Area {
                    layer,
                    name: name(),
                    ring: to_positions(exterior),
                });
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geometry(g, layer, name().as_deref(), out);
            }
        }
        Value::Point(_) | Value::MultiPoint(_) => {}
    }
}

/// Block length of the synthetic street grid, in micro-degrees
const BLOCK: i32 = 2_000;
/// Blocks from the center to the grid edge
const GRID_BLOCKS: i32 = 10;

fn offset(center: GeoPosition, east_blocks: f64, north_blocks: f64) -> GeoPosition {
    let lon = center.longitude as i64 + (east_blocks * BLOCK as f64).round() as i64;
    let lat = center.latitude as i64 + (north_blocks * BLOCK as f64).round() as i64;
    GeoPosition::new(
        clamp_i32(lon).clamp(-180_000_000, 180_000_000),
        clamp_i32(lat).clamp(-90_000_000, 90_000_000),
    )
}

fn ordinal(n: i32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Deterministic synthetic city around `center`: a street grid crossed by
/// avenues, a ring freeway with ramps, a river, parks and a lake. Shown when
/// no map data is given.
pub fn sample_network(center: GeoPosition, style: &StyleSheet) -> RoadMap {
    let mut builder = RoadMapBuilder::new(SQUARE_SIZE);
    let layer = |name: &str| style.layer_by_name(name);
    let edge = GRID_BLOCKS as f64;

    if let (Some(street), Some(secondary)) = (layer("street"), layer("secondary")) {
        for i in -GRID_BLOCKS..=GRID_BLOCKS {
            let (id, name) = if i % 5 == 0 {
                (secondary, format!("{} Avenue", ordinal(i + GRID_BLOCKS + 1)))
            } else {
                (street, format!("{} Street", ordinal(i + GRID_BLOCKS + 1)))
            };
            let points = (-GRID_BLOCKS..=GRID_BLOCKS).map(|j| offset(center, j as f64, i as f64)).collect();
            builder.add_line(id, Some(&name), points);
        }
    }

    if let (Some(street), Some(primary)) = (layer("street"), layer("primary")) {
        for j in -GRID_BLOCKS..=GRID_BLOCKS {
            let letter = (b'A' + (j + GRID_BLOCKS) as u8) as char;
            let (id, name) = if j % 5 == 0 {
                (primary, format!("{letter} Boulevard"))
            } else {
                (street, format!("{letter} Lane"))
            };
            let points = (-GRID_BLOCKS..=GRID_BLOCKS).map(|i| offset(center, j as f64, i as f64)).collect();
            builder.add_line(id, Some(&name), points);
        }
    }

    let ring_radius = edge + 4.0;
    if let Some(freeway) = layer("freeway") {
        let steps = 48;
        let ring = (0..=steps)
            .map(|k| {
                let angle = k as f64 / steps as f64 * std::f64::consts::TAU;
                offset(center, ring_radius * angle.cos(), ring_radius * angle.sin())
            })
            .collect();
        builder.add_line(freeway, Some("Ring Freeway"), ring);
    }

    if let Some(ramp) = layer("ramp") {
        for (east, north) in [(0.0, 1.0), (1.0, 0.0), (0.0, -1.0), (-1.0, 0.0)] {
            let points = vec![
                offset(center, east * edge, north * edge),
                offset(center, east * ring_radius + north * 0.5, north * ring_radius + east * 0.5),
            ];
            builder.add_line(ramp, None, points);
        }
    }

    if let Some(river) = layer("river") {
        let bends = [0.0, 0.3, 0.1, -0.3];
        let points = (-18..=18)
            .map(|k: i32| offset(center, k as f64, -7.5 + bends[k.rem_euclid(4) as usize]))
            .collect();
        builder.add_line(river, Some("Mill River"), points);
    }

    if let Some(trail) = layer("trail") {
        let points = vec![
            offset(center, 1.0, 1.0),
            offset(center, 2.0, 1.6),
            offset(center, 2.6, 2.4),
            offset(center, 4.0, 3.0),
        ];
        builder.add_line(trail, Some("Park Trail"), points);
    }

    if let Some(park) = layer("park") {
        let rect = |w: f64, s: f64, e: f64, n: f64| {
            vec![
                offset(center, w, s),
                offset(center, e, s),
                offset(center, e, n),
                offset(center, w, n),
            ]
        };
        builder.add_area(park, Some("Central Park"), rect(1.0, 1.0, 4.0, 3.0));
        builder.add_area(park, Some("Riverside Park"), rect(-9.0, -7.0, -3.0, -6.0));
    }

    if let Some(water) = layer("water") {
        let steps = 12;
        let lake = (0..steps)
            .map(|k| {
                let angle = k as f64 / steps as f64 * std::f64::consts::TAU;
                offset(center, -5.0 + 1.5 * angle.cos(), 5.0 + angle.sin())
            })
            .collect();
        builder.add_area(water, Some("Mirror Lake"), lake);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{LineStore, TileIndex};

    const ROADS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"highway": "residential", "name": "Elm Street"},
             "geometry": {"type": "LineString", "coordinates": [[-81.380, 28.540], [-81.370, 28.540]]}},
            {"type": "Feature", "properties": {"highway": "motorway", "ref": "I 4"},
             "geometry": {"type": "MultiLineString", "coordinates": [
                [[-81.390, 28.530], [-81.380, 28.545]],
                [[-81.380, 28.545], [-81.375, 28.555]]]}},
            {"type": "Feature", "properties": {"leisure": "park", "name": "Lake Park"},
             "geometry": {"type": "Polygon", "coordinates": [[
                [-81.378, 28.541], [-81.376, 28.541], [-81.376, 28.543], [-81.378, 28.543], [-81.378, 28.541]]]}},
            {"type": "Feature", "properties": {"amenity": "bench"},
             "geometry": {"type": "Point", "coordinates": [-81.377, 28.542]}}
        ]
    }"#;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tui-roadmap-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_feature_collection() {
        let style = StyleSheet::road_defaults(1);
        let mut bytes = ROADS.as_bytes().to_vec();
        let shapes = parse_shapes(&mut bytes, Path::new("roads.geojson"), &style).unwrap();
        assert_eq!(shapes.len(), 4);

        let lines = shapes.iter().filter(|s| matches!(s, Shape::Line { .. })).count();
        assert_eq!(lines, 3);
        let Some(Shape::Line { layer, name, points }) = shapes.first() else {
            panic!("first shape should be a line");
        };
        assert_eq!(Some(*layer), style.layer_by_name("street"));
        assert_eq!(name.as_deref(), Some("Elm Street"));
        assert_eq!(points[0], GeoPosition::new(-81_380_000, 28_540_000));
    }

    #[test]
    fn test_ref_used_when_unnamed() {
        let style = StyleSheet::road_defaults(1);
        let mut bytes = ROADS.as_bytes().to_vec();
        let shapes = parse_shapes(&mut bytes, Path::new("roads.geojson"), &style).unwrap();
        let names: Vec<_> = shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Line { name, .. } => name.clone(),
                Shape::Area { .. } => None,
            })
            .collect();
        assert_eq!(names, vec!["Elm Street", "I 4", "I 4"]);
    }

    #[test]
    fn test_invalid_json() {
        let style = StyleSheet::road_defaults(1);
        let mut bytes = b"{\"type\": ".to_vec();
        let err = parse_shapes(&mut bytes, Path::new("bad.json"), &style);
        assert!(matches!(err, Err(MapError::Json { .. })));
    }

    #[test]
    fn test_load_file() {
        let style = StyleSheet::road_defaults(1);
        let path = temp_path("roads.geojson");
        fs::write(&path, ROADS).unwrap();
        let map = load_roads(&path, &style).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(map.polygon_count(), 1);
        assert!(map.line_count() >= 3);
        assert!(!map.lines_named("Elm Street").is_empty());
        let line = map.lines_named("I 4")[0];
        assert_eq!(map.line_name(line), Some("I 4"));
    }

    #[test]
    fn test_load_directory_and_missing_data() {
        let style = StyleSheet::road_defaults(1);
        let dir = temp_path("dir");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.geojson"), ROADS).unwrap();
        fs::write(dir.join("notes.txt"), "not map data").unwrap();
        let map = load_roads(&dir, &style).unwrap();
        assert_eq!(map.polygon_count(), 1);

        let empty = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"amenity": "bench"},
             "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}}]}"#;
        let path = dir.join("a.geojson");
        fs::write(&path, empty).unwrap();
        let err = load_roads(&path, &style);
        assert!(matches!(err, Err(MapError::NoData { .. })));

        let err = load_roads(&dir.join("missing.geojson"), &style);
        assert!(matches!(err, Err(MapError::Io { .. })));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_world_extent() {
        let world = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"highway": "primary", "name": "West Shore"},
             "geometry": {"type": "LineString", "coordinates": [[-179.99, -89.99], [-179.985, -89.985]]}},
            {"type": "Feature", "properties": {"highway": "primary", "name": "East Shore"},
             "geometry": {"type": "LineString", "coordinates": [[179.98, -89.99], [179.985, -89.985]]}},
            {"type": "Feature", "properties": {"highway": "primary", "name": "Polar West"},
             "geometry": {"type": "LineString", "coordinates": [[-179.99, 89.98], [-179.985, 89.985]]}},
            {"type": "Feature", "properties": {"highway": "primary", "name": "Polar East"},
             "geometry": {"type": "LineString", "coordinates": [[179.98, 89.98], [179.985, 89.985]]}}
        ]}"#;
        let style = StyleSheet::road_defaults(1);
        let path = temp_path("world.geojson");
        fs::write(&path, world).unwrap();
        let map = load_roads(&path, &style).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(map.square_count(), 4);
        let extent = map.extent().unwrap();
        assert!(extent.width() > 359_000_000);
        assert_eq!(map.visible_tiles(&extent).len(), 4);
        assert_eq!(map.lines_named("Polar East").len(), 1);
    }

    #[test]
    fn test_sample_network() {
        let style = StyleSheet::road_defaults(1);
        let center = GeoPosition::from_degrees(-81.38, 28.54);
        let map = sample_network(center, &style);

        assert!(map.line_count() > 42);
        assert!(map.polygon_count() > 0);
        assert!(!map.lines_named("Ring Freeway").is_empty());
        assert!(!map.lines_named("A Boulevard").is_empty());
        assert!(!map.lines_named("11th Avenue").is_empty());

        let extent = map.extent().unwrap();
        assert!(extent.contains(&center));
        assert!(!map.visible_tiles(&extent).is_empty());

        let again = sample_network(center, &style);
        assert_eq!(again.line_count(), map.line_count());
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(21), "21st");
    }
}
