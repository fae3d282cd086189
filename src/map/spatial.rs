use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use crate::geo::{clamp_i32, Area, GeoPosition};
use crate::map::line::LinePath;
use crate::map::projection::ProjectionContext;
use crate::style::LayerId;

pub type LineId = usize;
pub type TileId = usize;

/// Squares of map data, queried by the repaint driver
pub trait TileIndex {
    /// Squares whose data may intersect `area`, including squares known
    /// to the index but without loaded data
    fn visible_tiles(&self, area: &Area) -> Vec<TileId>;

    /// Bounds of everything stored in the square, `None` when the square
    /// has no data
    fn tile_edges(&self, tile: TileId) -> Option<Area>;

    /// Lines of one layer in one square, as a contiguous id range
    fn lines_in_tile(&self, tile: TileId, layer: LayerId) -> Range<LineId>;

    fn polygons_in_tile(&self, tile: TileId) -> &[MapPolygon];
}

/// Line geometry, addressed by `LineId`
pub trait LineStore {
    fn line_endpoints(&self, line: LineId) -> Option<(GeoPosition, GeoPosition)>;

    /// Index range of the shape points between the endpoints, `None` for a
    /// straight line
    fn shape_range(&self, line: LineId) -> Option<Range<usize>>;

    /// Advance `pos` to shape point `index`. Shape points are stored as
    /// deltas, so they must be walked in order starting from the line's
    /// `from` endpoint.
    fn shape_step(&self, index: usize, pos: &mut GeoPosition);

    fn line_name(&self, line: LineId) -> Option<&str>;

    fn line_path(&self, line: LineId) -> Option<LinePath> {
        let (from, to) = self.line_endpoints(line)?;
        Some(LinePath {
            from,
            to,
            shapes: self.shape_range(line),
        })
    }
}

/// Area polygon clipped to one square. `real[i]` is false for vertices
/// inserted by clipping against the square borders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapPolygon {
    pub layer: LayerId,
    pub name: Option<String>,
    pub points: Vec<GeoPosition>,
    pub real: Vec<bool>,
    pub edges: Area,
}

#[derive(Clone, Debug)]
struct LineRecord {
    from: GeoPosition,
    to: GeoPosition,
    shapes: Range<usize>,
    layer: LayerId,
    name: Option<u32>,
}

#[derive(Clone, Debug, Default)]
struct Square {
    /// Grid cell, (column, row)
    cell: (i32, i32),
    edges: Area,
    layers: Vec<(LayerId, Range<LineId>)>,
    polygons: Vec<MapPolygon>,
}

/// Road network stored by squares of fixed geographic size. Only squares
/// holding data are kept, in row-major cell order; a tile is an index
/// into that list.
#[derive(Clone, Debug, Default)]
pub struct RoadMap {
    square_size: i32,
    squares: Vec<Square>,
    /// How far square data may reach outside its own cell
    overhang: i32,
    lines: Vec<LineRecord>,
    shapes: Vec<(i32, i32)>,
    names: Vec<String>,
    extent: Option<Area>,
}

impl RoadMap {
    pub fn square_size(&self) -> i32 {
        self.square_size
    }

    /// Bounds of all the data, `None` for an empty map
    pub fn extent(&self) -> Option<Area> {
        self.extent
    }

    pub fn square_count(&self) -> usize {
        self.squares.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.squares.iter().map(|s| s.polygons.len()).sum()
    }

    pub fn line_layer(&self, line: LineId) -> Option<LayerId> {
        self.lines.get(line).map(|l| l.layer)
    }

    /// Named line passing closest to `pos`, within `max_distance` meters
    pub fn nearest_named_line(&self, ctx: &ProjectionContext, pos: GeoPosition, max_distance: i32) -> Option<LineId> {
        let mut best: Option<(i32, LineId)> = None;
        let search = Area::new(pos.longitude, pos.latitude, pos.longitude, pos.latitude).expanded(self.square_size);

        for tile in self.visible_tiles(&search) {
            let Some(square) = self.squares.get(tile) else {
                continue;
            };
            for (_, range) in &square.layers {
                for line in range.clone() {
                    if self.line_name(line).is_none() {
                        continue;
                    }
                    let Some(path) = self.line_path(line) else {
                        continue;
                    };
                    let distance = self.path_distance(ctx, &path, &pos);
                    if distance <= max_distance && best.map_or(true, |(d, _)| distance < d) {
                        best = Some((distance, line));
                    }
                }
            }
        }
        best.map(|(_, line)| line)
    }

    /// Every piece of every line called `name`
    pub fn lines_named(&self, name: &str) -> Vec<LineId> {
        let Some(id) = self.names.iter().position(|n| n == name) else {
            return Vec::new();
        };
        (0..self.lines.len())
            .filter(|&line| self.lines[line].name == Some(id as u32))
            .collect()
    }

    fn path_distance(&self, ctx: &ProjectionContext, path: &LinePath, pos: &GeoPosition) -> i32 {
        let mut best = i32::MAX;
        let mut last = path.from;
        let mut current = path.from;
        for i in path.shapes.clone().unwrap_or_default() {
            self.shape_step(i, &mut current);
            best = best.min(ctx.distance_from_segment(pos, &last, &current));
            last = current;
        }
        best.min(ctx.distance_from_segment(pos, &last, &path.to))
    }

    fn cell_area(&self, cell: (i32, i32)) -> Area {
        let size = self.square_size as i64;
        let west = clamp_i32(cell.0 as i64 * size);
        let south = clamp_i32(cell.1 as i64 * size);
        Area::new(
            west,
            south,
            clamp_i32(west as i64 + size - 1),
            clamp_i32(south as i64 + size - 1),
        )
    }
}

impl TileIndex for RoadMap {
    fn visible_tiles(&self, area: &Area) -> Vec<TileId> {
        let (Some(first), Some(last)) = (self.squares.first(), self.squares.last()) else {
            return Vec::new();
        };
        let grown = area.expanded(self.overhang);
        let (west, south) = to_cell(GeoPosition::new(grown.west, grown.south), self.square_size);
        let (east, north) = to_cell(GeoPosition::new(grown.east, grown.north), self.square_size);

        let mut tiles = Vec::new();
        for row in south.max(first.cell.1)..=north.min(last.cell.1) {
            let start = self
                .squares
                .partition_point(|s| row_major(s.cell) < (row, west));
            for (tile, square) in self.squares.iter().enumerate().skip(start) {
                let (col, square_row) = square.cell;
                if square_row != row || col > east {
                    break;
                }
                if square.edges.intersects(area) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }

    fn tile_edges(&self, tile: TileId) -> Option<Area> {
        self.squares.get(tile).map(|s| s.edges)
    }

    fn lines_in_tile(&self, tile: TileId, layer: LayerId) -> Range<LineId> {
        self.squares
            .get(tile)
            .and_then(|s| s.layers.iter().find(|(l, _)| *l == layer))
            .map(|(_, range)| range.clone())
            .unwrap_or_default()
    }

    fn polygons_in_tile(&self, tile: TileId) -> &[MapPolygon] {
        match self.squares.get(tile) {
            Some(square) => &square.polygons,
            None => &[],
        }
    }
}

impl LineStore for RoadMap {
    fn line_endpoints(&self, line: LineId) -> Option<(GeoPosition, GeoPosition)> {
        self.lines.get(line).map(|l| (l.from, l.to))
    }

    fn shape_range(&self, line: LineId) -> Option<Range<usize>> {
        self.lines
            .get(line)
            .map(|l| l.shapes.clone())
            .filter(|shapes| !shapes.is_empty())
    }

    #[inline(always)]
    fn shape_step(&self, index: usize, pos: &mut GeoPosition) {
        if let Some(&(dx, dy)) = self.shapes.get(index) {
            pos.longitude = pos.longitude.wrapping_add(dx);
            pos.latitude = pos.latitude.wrapping_add(dy);
        }
    }

    fn line_name(&self, line: LineId) -> Option<&str> {
        let name = self.lines.get(line)?.name?;
        self.names.get(name as usize).map(String::as_str)
    }
}

#[inline(always)]
fn to_cell(pos: GeoPosition, square_size: i32) -> (i32, i32) {
    (pos.longitude.div_euclid(square_size), pos.latitude.div_euclid(square_size))
}

/// Sort key of a (column, row) cell
#[inline(always)]
fn row_major(cell: (i32, i32)) -> (i32, i32) {
    (cell.1, cell.0)
}

struct Chunk {
    cell: (i32, i32),
    layer: LayerId,
    name: Option<u32>,
    points: Vec<GeoPosition>,
}

/// Collects lines and areas, then cuts them into squares
pub struct RoadMapBuilder {
    square_size: i32,
    chunks: Vec<Chunk>,
    polygons: HashMap<(i32, i32), Vec<MapPolygon>>,
    names: Vec<String>,
    name_ids: HashMap<String, u32>,
}

impl RoadMapBuilder {
    /// `square_size` in micro-degrees
    pub fn new(square_size: i32) -> Self {
        Self {
            square_size: square_size.max(1),
            chunks: Vec::new(),
            polygons: HashMap::new(),
            names: Vec::new(),
            name_ids: HashMap::new(),
        }
    }

    fn intern(&mut self, name: Option<&str>) -> Option<u32> {
        let name = name.filter(|n| !n.is_empty())?;
        if let Some(&id) = self.name_ids.get(name) {
            return Some(id);
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.name_ids.insert(name.to_string(), id);
        Some(id)
    }

    /// Add a line through `points`. The line is cut where it crosses into
    /// another square; each piece belongs to the square of its first point
    /// and keeps the point that crossed out.
    pub fn add_line(&mut self, layer: LayerId, name: Option<&str>, points: Vec<GeoPosition>) {
        if points.len() < 2 {
            return;
        }
        let name = self.intern(name);

        let mut cell = to_cell(points[0], self.square_size);
        let mut chunk = vec![points[0]];
        for &point in &points[1..] {
            chunk.push(point);
            let next_cell = to_cell(point, self.square_size);
            if next_cell != cell {
                self.chunks.push(Chunk {
                    cell,
                    layer,
                    name,
                    points: std::mem::replace(&mut chunk, vec![point]),
                });
                cell = next_cell;
            }
        }
        if chunk.len() > 1 {
            self.chunks.push(Chunk {
                cell,
                layer,
                name,
                points: chunk,
            });
        }
    }

    /// Add an area outline. The ring is clipped to every square it covers.
    pub fn add_area(&mut self, layer: LayerId, name: Option<&str>, mut ring: Vec<GeoPosition>) {
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return;
        }
        let Some(bounds) = Area::bounding(&ring) else {
            return;
        };

        let (west, south) = to_cell(GeoPosition::new(bounds.west, bounds.south), self.square_size);
        let (east, north) = to_cell(GeoPosition::new(bounds.east, bounds.north), self.square_size);
        let real = vec![true; ring.len()];

        for row in south..=north {
            for col in west..=east {
                let size = self.square_size as i64;
                let cell = Area::new(
                    clamp_i32(col as i64 * size),
                    clamp_i32(row as i64 * size),
                    clamp_i32(col as i64 * size + size),
                    clamp_i32(row as i64 * size + size),
                );
                let (points, flags) = clip_ring(&ring, &real, &cell);
                if points.len() < 3 {
                    continue;
                }
                let Some(edges) = Area::bounding(&points) else {
                    continue;
                };
                self.polygons.entry((col, row)).or_default().push(MapPolygon {
                    layer,
                    name: name.map(str::to_string),
                    points,
                    real: flags,
                    edges,
                });
            }
        }
    }

    pub fn build(self) -> RoadMap {
        let Self {
            square_size,
            mut chunks,
            polygons,
            names,
            ..
        } = self;

        chunks.sort_by_key(|c| (row_major(c.cell), c.layer));

        let mut lines = Vec::with_capacity(chunks.len());
        let mut shapes = Vec::new();
        let mut squares: BTreeMap<(i32, i32), Square> = BTreeMap::new();

        for chunk in chunks {
            let id = lines.len();
            let bounds = Area::bounding(&chunk.points).unwrap_or_default();

            let from = chunk.points[0];
            let to = chunk.points[chunk.points.len() - 1];
            let start = shapes.len();
            let mut last = from;
            for &point in &chunk.points[1..chunk.points.len() - 1] {
                shapes.push((point.longitude.wrapping_sub(last.longitude), point.latitude.wrapping_sub(last.latitude)));
                last = point;
            }
            lines.push(LineRecord {
                from,
                to,
                shapes: start..shapes.len(),
                layer: chunk.layer,
                name: chunk.name,
            });

            let square = squares.entry(row_major(chunk.cell)).or_insert_with(|| Square {
                cell: chunk.cell,
                edges: bounds,
                ..Square::default()
            });
            square.edges = square.edges.union(&bounds);
            match square.layers.last_mut() {
                Some((layer, range)) if *layer == chunk.layer => range.end = id + 1,
                _ => square.layers.push((chunk.layer, id..id + 1)),
            }
        }

        for (cell, list) in polygons {
            for polygon in list {
                let square = squares.entry(row_major(cell)).or_insert_with(|| Square {
                    cell,
                    edges: polygon.edges,
                    ..Square::default()
                });
                square.edges = square.edges.union(&polygon.edges);
                square.polygons.push(polygon);
            }
        }

        let mut map = RoadMap {
            square_size,
            squares: squares.into_values().collect(),
            overhang: 0,
            lines,
            shapes,
            names,
            extent: None,
        };

        let mut overhang = 0i64;
        for square in &map.squares {
            let cell_area = map.cell_area(square.cell);
            let e = square.edges;
            overhang = overhang
                .max(cell_area.west as i64 - e.west as i64)
                .max(cell_area.south as i64 - e.south as i64)
                .max(e.east as i64 - cell_area.east as i64)
                .max(e.north as i64 - cell_area.north as i64);
            map.extent = Some(map.extent.map_or(e, |x| x.union(&e)));
        }
        map.overhang = clamp_i32(overhang);

        log::info!(
            "Built road map: {} squares, {} lines, {} shape points, {} polygons",
            map.square_count(),
            map.lines.len(),
            map.shapes.len(),
            map.polygon_count()
        );
        map
    }
}

/// Sutherland-Hodgman clip of a ring against an axis-aligned box. Vertices
/// created on the box borders are flagged not real.
fn clip_ring(ring: &[GeoPosition], real: &[bool], bounds: &Area) -> (Vec<GeoPosition>, Vec<bool>) {
    #[derive(Clone, Copy)]
    enum Edge {
        West(i32),
        East(i32),
        South(i32),
        North(i32),
    }

    impl Edge {
        fn inside(self, p: &GeoPosition) -> bool {
            match self {
                Edge::West(x) => p.longitude >= x,
                Edge::East(x) => p.longitude <= x,
                Edge::South(y) => p.latitude >= y,
                Edge::North(y) => p.latitude <= y,
            }
        }

        fn cross(self, a: &GeoPosition, b: &GeoPosition) -> GeoPosition {
            let lerp = |a0: i32, a1: i32, b0: i32, b1: i32, at: i32| -> i32 {
                let span = a1 as i64 - a0 as i64;
                if span == 0 {
                    return b0;
                }
                clamp_i32(b0 as i64 + (b1 as i64 - b0 as i64) * (at as i64 - a0 as i64) / span)
            };
            match self {
                Edge::West(x) | Edge::East(x) => {
                    GeoPosition::new(x, lerp(a.longitude, b.longitude, a.latitude, b.latitude, x))
                }
                Edge::South(y) | Edge::North(y) => {
                    GeoPosition::new(lerp(a.latitude, b.latitude, a.longitude, b.longitude, y), y)
                }
            }
        }
    }

    let mut points = ring.to_vec();
    let mut flags = real.to_vec();

    for edge in [
        Edge::West(bounds.west),
        Edge::East(bounds.east),
        Edge::South(bounds.south),
        Edge::North(bounds.north),
    ] {
        if points.is_empty() {
            break;
        }
        let input = std::mem::take(&mut points);
        let input_flags = std::mem::take(&mut flags);
        let mut previous = input.len() - 1;
        for current in 0..input.len() {
            let (p, c) = (&input[previous], &input[current]);
            match (edge.inside(p), edge.inside(c)) {
                (true, true) => {
                    points.push(*c);
                    flags.push(input_flags[current]);
                }
                (true, false) => {
                    points.push(edge.cross(p, c));
                    flags.push(false);
                }
                (false, true) => {
                    points.push(edge.cross(p, c));
                    flags.push(false);
                    points.push(*c);
                    flags.push(input_flags[current]);
                }
                (false, false) => {}
            }
            previous = current;
        }
    }
    (points, flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: i32 = 10_000;

    fn p(x: i32, y: i32) -> GeoPosition {
        GeoPosition::new(x, y)
    }

    fn walk(map: &RoadMap, line: LineId) -> Vec<GeoPosition> {
        let path = map.line_path(line).unwrap();
        let mut points = vec![path.from];
        let mut pos = path.from;
        for i in path.shapes.unwrap_or_default() {
            map.shape_step(i, &mut pos);
            points.push(pos);
        }
        points.push(path.to);
        points
    }

    #[test]
    fn test_line_inside_one_square() {
        let mut builder = RoadMapBuilder::new(SIZE);
        builder.add_line(LayerId(1), Some("Elm"), vec![p(100, 100), p(500, 900), p(2000, 2000)]);
        let map = builder.build();

        assert_eq!(map.line_count(), 1);
        assert_eq!(map.square_count(), 1);
        assert_eq!(walk(&map, 0), vec![p(100, 100), p(500, 900), p(2000, 2000)]);
        assert_eq!(map.line_name(0), Some("Elm"));
        assert_eq!(map.tile_edges(0), Some(Area::new(100, 100, 2000, 2000)));
        assert_eq!(map.lines_in_tile(0, LayerId(1)), 0..1);
        assert_eq!(map.lines_in_tile(0, LayerId(2)), 0..0);
    }

    #[test]
    fn test_straight_line_has_no_shapes() {
        let mut builder = RoadMapBuilder::new(SIZE);
        builder.add_line(LayerId(0), None, vec![p(0, 0), p(10, 10)]);
        let map = builder.build();
        assert_eq!(map.shape_range(0), None);
        assert_eq!(map.line_name(0), None);
    }

    #[test]
    fn test_line_split_at_square_border() {
        let mut builder = RoadMapBuilder::new(SIZE);
        builder.add_line(
            LayerId(0),
            Some("Long"),
            vec![p(1000, 1000), p(9000, 1000), p(12_000, 1000), p(15_000, 1000)],
        );
        let map = builder.build();

        assert_eq!(map.line_count(), 2);
        assert_eq!(map.square_count(), 2);
        let first = walk(&map, 0);
        let second = walk(&map, 1);
        assert_eq!(first, vec![p(1000, 1000), p(9000, 1000), p(12_000, 1000)]);
        assert_eq!(second, vec![p(12_000, 1000), p(15_000, 1000)]);
        // the first square's data reaches into the second
        assert_eq!(map.tile_edges(0).unwrap().east, 12_000);
    }

    #[test]
    fn test_lines_sorted_by_square_then_layer() {
        let mut builder = RoadMapBuilder::new(SIZE);
        builder.add_line(LayerId(2), None, vec![p(100, 100), p(200, 200)]);
        builder.add_line(LayerId(1), None, vec![p(300, 300), p(400, 400)]);
        builder.add_line(LayerId(2), None, vec![p(500, 500), p(600, 600)]);
        builder.add_line(LayerId(1), None, vec![p(15_000, 100), p(16_000, 200)]);
        let map = builder.build();

        assert_eq!(map.lines_in_tile(0, LayerId(1)), 0..1);
        assert_eq!(map.lines_in_tile(0, LayerId(2)), 1..3);
        assert_eq!(map.lines_in_tile(1, LayerId(1)), 3..4);
        assert_eq!(map.line_layer(3), Some(LayerId(1)));
    }

    #[test]
    fn test_visible_tiles_skip_empty_cells() {
        let mut builder = RoadMapBuilder::new(SIZE);
        builder.add_line(LayerId(0), None, vec![p(100, 100), p(200, 200)]);
        builder.add_line(LayerId(0), None, vec![p(25_000, 25_000), p(26_000, 26_000)]);
        let map = builder.build();

        // 3x3 cells, only two hold data
        let all = map.visible_tiles(&Area::new(0, 0, 30_000, 30_000));
        assert_eq!(all, vec![0, 1]);
        assert!(all.iter().all(|&t| map.tile_edges(t).is_some()));
        assert_eq!(map.tile_edges(2), None);

        let corner = map.visible_tiles(&Area::new(0, 0, 1000, 1000));
        assert_eq!(corner, vec![0]);
        assert!(map.visible_tiles(&Area::new(-50_000, -50_000, -40_000, -40_000)).is_empty());
    }

    #[test]
    fn test_visible_tiles_follow_overhang() {
        let mut builder = RoadMapBuilder::new(SIZE);
        builder.add_line(LayerId(0), None, vec![p(9000, 5000), p(35_000, 5000)]);
        builder.add_line(LayerId(0), None, vec![p(35_000, 6000), p(36_000, 6000)]);
        let map = builder.build();

        // the long segment only lives in square 0 but crosses square 2
        let tiles = map.visible_tiles(&Area::new(21_000, 4000, 22_000, 6000));
        assert!(tiles.contains(&0));
    }

    #[test]
    fn test_area_clipped_per_square() {
        let mut builder = RoadMapBuilder::new(SIZE);
        builder.add_area(
            LayerId(5),
            Some("Park"),
            vec![p(5000, 2000), p(15_000, 2000), p(15_000, 8000), p(5000, 8000), p(5000, 2000)],
        );
        let map = builder.build();

        assert_eq!(map.polygon_count(), 2);
        let left = &map.polygons_in_tile(0)[0];
        assert_eq!(left.points.len(), 4);
        assert_eq!(left.edges, Area::new(5000, 2000, 10_000, 8000));
        assert_eq!(left.real.iter().filter(|&&r| !r).count(), 2);
        assert_eq!(left.name.as_deref(), Some("Park"));

        let right = &map.polygons_in_tile(1)[0];
        assert_eq!(right.edges, Area::new(10_000, 2000, 15_000, 8000));
    }

    #[test]
    fn test_clip_ring_keeps_inside_ring() {
        let ring = [p(1, 1), p(5, 1), p(5, 5)];
        let (points, flags) = clip_ring(&ring, &[true; 3], &Area::new(0, 0, 10, 10));
        assert_eq!(points, ring.to_vec());
        assert_eq!(flags, vec![true; 3]);
    }

    #[test]
    fn test_nearest_named_line() {
        let ctx = crate::map::test_support::ctx(400, 400);
        let mut builder = RoadMapBuilder::new(SIZE);
        builder.add_line(LayerId(0), Some("North"), vec![p(0, 1000), p(4000, 1000)]);
        builder.add_line(LayerId(0), Some("South"), vec![p(0, -1000), p(4000, -1000)]);
        builder.add_line(LayerId(0), None, vec![p(0, 100), p(4000, 100)]);
        let map = builder.build();

        let line = map.nearest_named_line(&ctx, p(2000, 700), 10_000).unwrap();
        assert_eq!(map.line_name(line), Some("North"));
        assert_eq!(map.nearest_named_line(&ctx, p(2000, 700), 1), None);
    }

    #[test]
    fn test_world_corners_stay_sparse() {
        let mut builder = RoadMapBuilder::new(SIZE);
        let corners = [(-179_990_000, -89_990_000), (179_980_000, -89_990_000), (-179_990_000, 89_980_000), (179_980_000, 89_980_000)];
        for (x, y) in corners {
            builder.add_line(LayerId(0), None, vec![p(x, y), p(x + 5000, y + 5000)]);
        }
        let map = builder.build();

        assert_eq!(map.square_count(), 4);
        let world = Area::new(-180_000_000, -90_000_000, 180_000_000, 90_000_000);
        assert_eq!(map.visible_tiles(&world), vec![0, 1, 2, 3]);
        let north_east = map.visible_tiles(&Area::new(179_000_000, 89_000_000, 180_000_000, 90_000_000));
        assert_eq!(north_east, vec![3]);
        assert_eq!(map.tile_edges(3).unwrap().west, 179_980_000);
    }

    #[test]
    fn test_empty_builder() {
        let map = RoadMapBuilder::new(SIZE).build();
        assert_eq!(map.extent(), None);
        assert!(map.visible_tiles(&Area::new(0, 0, 10, 10)).is_empty());
    }
}
