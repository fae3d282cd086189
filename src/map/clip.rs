use crate::geo::{Area, GeoPosition, GuiPoint};
use crate::map::projection::ProjectionContext;

impl ProjectionContext {
    /// Inside the visible area grown by the visibility margin
    #[inline(always)]
    pub fn point_visible(&self, pos: &GeoPosition) -> bool {
        self.visibility.contains(pos)
    }

    #[inline(always)]
    pub fn area_visible(&self, area: &Area) -> bool {
        self.visibility.intersects(area)
    }

    /// Entirely inside the visible area: nothing in it needs clipping
    #[inline(always)]
    pub fn area_inside(&self, area: &Area) -> bool {
        self.visibility.contains_area(area)
    }

    /// Cheap test: either end visible, or the bounding box crosses the view
    #[inline]
    pub fn segment_visible(&self, from: &GeoPosition, to: &GeoPosition) -> bool {
        if self.point_visible(from) || self.point_visible(to) {
            return true;
        }
        let bbox = Area::new(
            from.longitude.min(to.longitude),
            from.latitude.min(to.latitude),
            from.longitude.max(to.longitude),
            from.latitude.max(to.latitude),
        );
        self.area_visible(&bbox)
    }

    /// Screen endpoints of the visible part of `from`..`to`, in the same
    /// direction, or `None` when no part of the segment is visible
    pub fn clip_segment(&self, from: &GeoPosition, to: &GeoPosition) -> Option<(GuiPoint, GuiPoint)> {
        let from_visible = self.point_visible(from);
        let to_visible = self.point_visible(to);

        if from_visible && to_visible {
            return Some((self.geo_to_screen(from), self.geo_to_screen(to)));
        }

        let wanted = if from_visible || to_visible { 1 } else { 2 };
        let mut hits = Intersections::default();
        self.find_edge_intersections(from, to, wanted, &mut hits);
        if hits.len != wanted {
            return None;
        }

        let mut first = hits.points[0];
        let mut second = hits.points[1];
        if wanted == 2 && distance_sq(from, &first) > distance_sq(from, &second) {
            std::mem::swap(&mut first, &mut second);
        }

        let (p0, p1) = match (from_visible, to_visible) {
            (true, _) => (*from, first),
            (false, true) => (first, *to),
            (false, false) => (first, second),
        };
        Some((self.geo_to_screen(&p0), self.geo_to_screen(&p1)))
    }

    fn find_edge_intersections(&self, from: &GeoPosition, to: &GeoPosition, wanted: usize, hits: &mut Intersections) {
        let v = self.visibility;
        let d_lon = from.longitude as i64 - to.longitude as i64;
        let d_lat = from.latitude as i64 - to.latitude as i64;

        let candidates: [GeoPosition; 4];
        let count;

        if d_lon.abs() <= 1 {
            // Quasi vertical: only the north and south edges can be crossed
            candidates = [
                GeoPosition::new(from.longitude, v.north),
                GeoPosition::new(from.longitude, v.south),
                GeoPosition::default(),
                GeoPosition::default(),
            ];
            count = 2;
        } else if d_lat.abs() <= 1 {
            candidates = [
                GeoPosition::new(v.west, from.latitude),
                GeoPosition::new(v.east, from.latitude),
                GeoPosition::default(),
                GeoPosition::default(),
            ];
            count = 2;
        } else {
            // lat = a * lon + b
            let a = d_lat as f64 / d_lon as f64;
            let b = from.latitude as f64 - a * from.longitude as f64;
            let lon_at = |lat: i32| ((lat as f64 - b) / a) as i32;
            let lat_at = |lon: i32| (b + a * lon as f64) as i32;
            candidates = [
                GeoPosition::new(lon_at(v.north), v.north),
                GeoPosition::new(lon_at(v.south), v.south),
                GeoPosition::new(v.west, lat_at(v.west)),
                GeoPosition::new(v.east, lat_at(v.east)),
            ];
            count = 4;
        }

        for point in &candidates[..count] {
            if self.point_visible(point) && within_segment(from, to, point) {
                hits.push(*point);
                if hits.len == wanted {
                    return;
                }
            }
        }
    }
}

#[derive(Default)]
struct Intersections {
    points: [GeoPosition; 2],
    len: usize,
}

impl Intersections {
    /// A segment through a corner meets two edges at the same point; the
    /// second hit is dropped
    fn push(&mut self, point: GeoPosition) {
        let duplicate = self.points[..self.len].iter().any(|p| {
            (p.longitude as i64 - point.longitude as i64).abs() <= 1
                && (p.latitude as i64 - point.latitude as i64).abs() <= 1
        });
        if !duplicate && self.len < self.points.len() {
            self.points[self.len] = point;
            self.len += 1;
        }
    }
}

/// Point lies inside the segment's bounding box, with one unit of slack
fn within_segment(from: &GeoPosition, to: &GeoPosition, point: &GeoPosition) -> bool {
    let (lon, lat) = (point.longitude as i64, point.latitude as i64);
    let lon_ok = lon >= (from.longitude.min(to.longitude) as i64 - 1)
        && lon <= (from.longitude.max(to.longitude) as i64 + 1);
    let lat_ok = lat >= (from.latitude.min(to.latitude) as i64 - 1)
        && lat <= (from.latitude.max(to.latitude) as i64 + 1);
    lon_ok && lat_ok
}

#[inline(always)]
fn distance_sq(a: &GeoPosition, b: &GeoPosition) -> i64 {
    let dx = a.longitude as i64 - b.longitude as i64;
    let dy = a.latitude as i64 - b.latitude as i64;
    dx * dx + dy * dy
}

/// Crossing point of two infinite geographic lines, `None` when parallel
pub fn line_intersection(
    from1: &GeoPosition,
    to1: &GeoPosition,
    from2: &GeoPosition,
    to2: &GeoPosition,
) -> Option<GeoPosition> {
    let line = |from: &GeoPosition, to: &GeoPosition| -> Option<(f64, f64)> {
        if from.longitude == to.longitude {
            None
        } else {
            let a = (from.latitude as f64 - to.latitude as f64) / (from.longitude as f64 - to.longitude as f64);
            Some((a, from.latitude as f64 - a * from.longitude as f64))
        }
    };

    match (line(from1, to1), line(from2, to2)) {
        (None, None) => None,
        (None, Some((a, b))) => {
            let lon = from1.longitude;
            Some(GeoPosition::new(lon, (a * lon as f64 + b) as i32))
        }
        (Some((a, b)), None) => {
            let lon = from2.longitude;
            Some(GeoPosition::new(lon, (a * lon as f64 + b) as i32))
        }
        (Some((a1, b1)), Some((a2, b2))) => {
            if a1 == a2 {
                return None;
            }
            let lon = (b1 - b2) / (a2 - a1);
            Some(GeoPosition::new(lon as i32, (b1 + lon * a1) as i32))
        }
    }
}

/// Crossing point of two infinite screen lines in 1/1024 fixed point.
/// Loses accuracy for lines within a few degrees of flat or steep.
pub fn screen_intersection(f1: GuiPoint, t1: GuiPoint, f2: GuiPoint, t2: GuiPoint) -> Option<GuiPoint> {
    let line = |f: GuiPoint, t: GuiPoint| -> Option<(i64, i64)> {
        if f.x == t.x {
            None
        } else {
            let a = 1024 * (f.y - t.y) as i64 / (f.x - t.x) as i64;
            Some((a, 1024 * f.y as i64 - a * f.x as i64))
        }
    };

    let (a1, b1, a2, b2) = match (line(f1, t1), line(f2, t2)) {
        (None, None) => return None,
        (None, Some((a, b))) => {
            let x = f1.x as i64;
            return Some(GuiPoint::new(f1.x, ((a * x + b) / 1024) as i32));
        }
        (Some((a, b)), None) => {
            let x = f2.x as i64;
            return Some(GuiPoint::new(f2.x, ((a * x + b) / 1024) as i32));
        }
        (Some((a1, b1)), Some((a2, b2))) => (a1, b1, a2, b2),
    };

    if a1 == a2 {
        return None;
    }
    let x = (b1 - b2) / (a2 - a1);
    let y = if a1.abs() < a2.abs() { (b1 + x * a1) / 1024 } else { (b2 + x * a2) / 1024 };
    Some(GuiPoint::new(x as i32, y as i32))
}
