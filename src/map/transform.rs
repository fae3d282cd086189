use crate::geo::{clamp_i32, div_round, GeoPosition, GuiPoint};
use crate::map::projection::ProjectionContext;
use crate::map::trig::{sincos, ONE};

/// Rotate the offset (x right, y up) by the given fixed-point sin/cos.
/// Rounds to nearest so that rotating back is exact within one pixel.
#[inline(always)]
fn rotate_offset(x: i64, y: i64, sin: i32, cos: i32) -> (i64, i64) {
    let (sin, cos) = (sin as i64, cos as i64);
    (div_round(x * cos + y * sin, ONE as i64), div_round(y * cos - x * sin, ONE as i64))
}

impl ProjectionContext {
    /// Geographic position to upright screen pixel (rotation and
    /// perspective are applied later, in `rotate_and_project`)
    #[inline]
    pub fn geo_to_screen(&self, pos: &GeoPosition) -> GuiPoint {
        GuiPoint::new(
            clamp_i32((pos.longitude as i64 - self.upright.west as i64) / self.zoom_x as i64),
            clamp_i32((self.upright.north as i64 - pos.latitude as i64) / self.zoom_y as i64),
        )
    }

    /// Screen pixel back to a geographic position. With `projected`, the
    /// point is taken as a final on-screen pixel: perspective is undone
    /// first, then rotation.
    pub fn screen_to_geo(&self, point: GuiPoint, projected: bool) -> GeoPosition {
        let mut p = point;
        if projected && self.horizon != 0 {
            p = self.unproject(p);
        }
        if self.orientation != 0 {
            p = self.counter_rotate(p);
        }
        GeoPosition::new(
            clamp_i32(self.upright.west as i64 + p.x as i64 * self.zoom_x as i64),
            clamp_i32(self.upright.north as i64 - p.y as i64 * self.zoom_y as i64),
        )
    }

    /// Perspective squeeze toward the horizon line
    pub fn project(&self, point: GuiPoint) -> GuiPoint {
        let height = self.height as i64;
        let horizon = self.horizon as i64;
        let range = (height - horizon).max(1);

        let dist_y = height - point.y as i64;
        let y = height - div_round(dist_y * range, dist_y.abs() + range);

        let dist_x = point.x as i64 - (self.width / 2) as i64;
        let from_horizon = y - horizon;
        let x = div_round(dist_x * from_horizon, range) + (self.width / 2) as i64;

        GuiPoint::new(clamp_i32(x), clamp_i32(y))
    }

    /// Inverse of `project`; identity on a flat map
    pub fn unproject(&self, point: GuiPoint) -> GuiPoint {
        if self.horizon == 0 {
            return point;
        }
        let height = self.height as i64;
        let horizon = self.horizon as i64;
        let range = (height - horizon).max(1);

        let dist_x = point.x as i64 - (self.width / 2) as i64;
        let mut from_horizon = point.y as i64 - horizon;
        if from_horizon == 0 {
            from_horizon = 1;
        }
        let x = div_round(dist_x * range, from_horizon) + (self.width / 2) as i64;

        // project maps distance d from the bottom to d * range / (|d| + range)
        let from_bottom = height - point.y as i64;
        let mut den = range - from_bottom.abs();
        if den <= 0 {
            den = 1;
        }
        let y = height - div_round(from_bottom * range, den);

        GuiPoint::new(clamp_i32(x), clamp_i32(y))
    }

    /// Rotate an upright point about the screen center by the orientation
    #[inline]
    pub fn rotate_coordinates(&self, point: GuiPoint) -> GuiPoint {
        let x = (point.x - self.center_x) as i64;
        let y = (self.center_y - point.y) as i64;
        let (rx, ry) = rotate_offset(x, y, self.sin_orientation, self.cos_orientation);
        GuiPoint::new(clamp_i32(self.center_x as i64 + rx), clamp_i32(self.center_y as i64 - ry))
    }

    /// Inverse of `rotate_coordinates`
    pub fn counter_rotate(&self, point: GuiPoint) -> GuiPoint {
        let x = (point.x - self.center_x) as i64;
        let y = (self.center_y - point.y) as i64;
        let (sin, cos) = (self.sin_orientation as i64, self.cos_orientation as i64);
        let rx = div_round(x * cos - y * sin, ONE as i64);
        let ry = div_round(x * sin + y * cos, ONE as i64);
        GuiPoint::new(clamp_i32(self.center_x as i64 + rx), clamp_i32(self.center_y as i64 - ry))
    }

    /// Upright batch points to final screen pixels, in place
    pub fn rotate_and_project(&self, points: &mut [GuiPoint]) {
        if self.orientation == 0 && self.horizon == 0 {
            return;
        }
        for point in points.iter_mut() {
            if self.orientation != 0 {
                *point = self.rotate_coordinates(*point);
            }
            if self.horizon != 0 {
                *point = self.project(*point);
            }
        }
    }

    /// Rotate an object's points about `center` by its own orientation on
    /// top of the screen orientation, then apply perspective
    pub fn rotate_object(&self, points: &mut [GuiPoint], center: GuiPoint, orientation: i32) {
        let total = (self.orientation + orientation).rem_euclid(360);
        if total == 0 && self.horizon == 0 {
            return;
        }
        let (sin, cos) = sincos(total);
        for point in points.iter_mut() {
            if total != 0 {
                let x = (point.x - center.x) as i64;
                let y = (center.y - point.y) as i64;
                let (rx, ry) = rotate_offset(x, y, sin, cos);
                *point = GuiPoint::new(clamp_i32(center.x as i64 + rx), clamp_i32(center.y as i64 - ry));
            }
            if self.horizon != 0 {
                *point = self.project(*point);
            }
        }
    }
}

/// Remembers the sin/cos of the last angle used, for callers that rotate
/// many points by the same angle in one frame.
#[derive(Clone, Debug)]
pub struct RotationCache {
    angle: Option<i32>,
    sin: i32,
    cos: i32,
}

impl Default for RotationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationCache {
    pub fn new() -> Self {
        Self { angle: None, sin: 0, cos: ONE }
    }

    #[inline]
    fn trig(&mut self, angle: i32) -> (i32, i32) {
        if self.angle != Some(angle) {
            (self.sin, self.cos) = sincos(angle);
            self.angle = Some(angle);
        }
        (self.sin, self.cos)
    }

    /// Place `offset` (x right, y up, relative to `center`) rotated by
    /// `angle` degrees; perspective applies to any non-zero angle.
    pub fn rotate_point(&mut self, ctx: &ProjectionContext, offset: GuiPoint, center: GuiPoint, angle: i32) -> GuiPoint {
        let (sin, cos) = self.trig(angle);
        let (rx, ry) = rotate_offset(offset.x as i64, offset.y as i64, sin, cos);
        let point = GuiPoint::new(clamp_i32(center.x as i64 + rx), clamp_i32(center.y as i64 - ry));
        if angle != 0 && ctx.is_3d() {
            ctx.project(point)
        } else {
            point
        }
    }

    pub fn cached_angle(&self) -> Option<i32> {
        self.angle
    }
}
