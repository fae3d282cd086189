use glam::IVec2;

/// Screen position in pixels (x grows right, y grows down)
pub type GuiPoint = IVec2;

/// Micro-degrees per degree
pub const MICRO_DEGREES: i32 = 1_000_000;

/// Geographic position in micro-degrees
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeoPosition {
    pub longitude: i32,
    pub latitude: i32,
}

impl GeoPosition {
    pub const fn new(longitude: i32, latitude: i32) -> Self {
        Self { longitude, latitude }
    }

    /// Build from floating point degrees (GeoJSON order: lon, lat)
    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self {
            longitude: (lon.clamp(-180.0, 180.0) * MICRO_DEGREES as f64).round() as i32,
            latitude: (lat.clamp(-90.0, 90.0) * MICRO_DEGREES as f64).round() as i32,
        }
    }

    #[inline(always)]
    pub fn lon_degrees(&self) -> f64 {
        self.longitude as f64 / MICRO_DEGREES as f64
    }

    #[inline(always)]
    pub fn lat_degrees(&self) -> f64 {
        self.latitude as f64 / MICRO_DEGREES as f64
    }

    /// Whole-degree latitude, used to index the trigonometry table
    #[inline(always)]
    pub fn lat_whole_degrees(&self) -> i32 {
        self.latitude / MICRO_DEGREES
    }
}

/// Geographic bounding box in micro-degrees.
/// After `normalized()`, north >= south and east >= west.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Area {
    pub north: i32,
    pub south: i32,
    pub east: i32,
    pub west: i32,
}

impl Area {
    pub const fn new(west: i32, south: i32, east: i32, north: i32) -> Self {
        Self { north, south, east, west }
    }

    pub fn normalized(self) -> Self {
        Self {
            north: self.north.max(self.south),
            south: self.north.min(self.south),
            east: self.east.max(self.west),
            west: self.east.min(self.west),
        }
    }

    /// Smallest area holding every position, `None` for an empty input
    pub fn bounding<'a>(positions: impl IntoIterator<Item = &'a GeoPosition>) -> Option<Self> {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let mut area = Self::new(first.longitude, first.latitude, first.longitude, first.latitude);
        for pos in iter {
            area.extend(pos);
        }
        Some(area)
    }

    pub fn extend(&mut self, pos: &GeoPosition) {
        self.west = self.west.min(pos.longitude);
        self.east = self.east.max(pos.longitude);
        self.south = self.south.min(pos.latitude);
        self.north = self.north.max(pos.latitude);
    }

    pub fn union(&self, other: &Area) -> Self {
        Self {
            north: self.north.max(other.north),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            west: self.west.min(other.west),
        }
    }

    pub fn expanded(&self, margin: i32) -> Self {
        Self {
            north: self.north.saturating_add(margin),
            south: self.south.saturating_sub(margin),
            east: self.east.saturating_add(margin),
            west: self.west.saturating_sub(margin),
        }
    }

    #[inline(always)]
    pub fn contains(&self, pos: &GeoPosition) -> bool {
        pos.longitude >= self.west
            && pos.longitude <= self.east
            && pos.latitude >= self.south
            && pos.latitude <= self.north
    }

    /// True when `other` lies entirely inside this area
    pub fn contains_area(&self, other: &Area) -> bool {
        other.west >= self.west
            && other.east <= self.east
            && other.south >= self.south
            && other.north <= self.north
    }

    #[inline(always)]
    pub fn intersects(&self, other: &Area) -> bool {
        other.west <= self.east
            && other.east >= self.west
            && other.south <= self.north
            && other.north >= self.south
    }

    pub fn width(&self) -> i64 {
        self.east as i64 - self.west as i64
    }

    pub fn height(&self) -> i64 {
        self.north as i64 - self.south as i64
    }

    pub fn center(&self) -> GeoPosition {
        GeoPosition::new(
            ((self.west as i64 + self.east as i64) / 2) as i32,
            ((self.south as i64 + self.north as i64) / 2) as i32,
        )
    }
}

/// Normalize an angle in degrees to [0, 360)
#[inline(always)]
pub fn normalize_orientation(direction: i32) -> i32 {
    direction.rem_euclid(360)
}

/// Smallest absolute difference between two directions, in [0, 180]
pub fn delta_direction(direction1: i32, direction2: i32) -> i32 {
    let delta = (direction2 - direction1).rem_euclid(360);
    if delta > 180 {
        360 - delta
    } else {
        delta
    }
}

/// Narrow a 64-bit intermediate back to the i32 coordinate space
#[inline(always)]
pub(crate) fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Integer division rounding half away from zero
#[inline(always)]
pub(crate) fn div_round(num: i64, den: i64) -> i64 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    if num >= 0 {
        (num + den / 2) / den
    } else {
        -((-num + den / 2) / den)
    }
}
