use crate::config::{RenderConfig, ScaleDivisors};
use crate::geo::{clamp_i32, delta_direction, div_round, normalize_orientation, Area, GeoPosition, GuiPoint};
use crate::map::trig::{arccos, sincos, ONE};
use crate::map::units::{UnitSystem, IMPERIAL, METRIC};

/// Smallest zoom the context accepts (most detailed view)
pub const MIN_ZOOM_IN: u32 = 6;
/// Largest zoom the context accepts
pub const MAX_ZOOM_OUT: u32 = 0x10000;
/// Zoom used when none was ever set
pub const REFERENCE_ZOOM: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ZoomDirection {
    In,
    Out,
}

/// Last `zoom_in`/`zoom_out` step, so the opposite step can undo it exactly
#[derive(Clone, Copy, Debug)]
struct ZoomStep {
    direction: ZoomDirection,
    before: u32,
    after: u32,
}

/// Camera state and every quantity derived from it.
///
/// All setters go through `recompute_scale`, so the upright and current
/// visible areas are always consistent with center, zoom, size,
/// orientation and horizon.
#[derive(Clone, Debug)]
pub struct ProjectionContext {
    pub(super) center: GeoPosition,
    pub(super) zoom: u32,
    pub(super) zoom_x: i32,
    pub(super) zoom_y: i32,
    pub(super) orientation: i32,
    pub(super) sin_orientation: i32,
    pub(super) cos_orientation: i32,
    pub(super) horizon: i32,
    pub(super) width: i32,
    pub(super) height: i32,
    pub(super) center_x: i32,
    pub(super) center_y: i32,
    /// Visible area ignoring rotation and perspective
    pub(super) upright: Area,
    /// Visible area bounding the rotated and projected viewport
    pub(super) current: Area,
    pub(super) focus: Area,
    /// Focus grown by the visibility margin; what visibility tests use
    pub(super) visibility: Area,
    units: &'static UnitSystem,
    /// Dynamic per-longitude factor for (metric, imperial)
    unit_per_longitude: [f64; 2],
    fast_refresh: bool,
    display_scale: u32,
    default_zoom: u32,
    min_zoom: Option<u32>,
    margin: i32,
    hd_screen: bool,
    divisors: ScaleDivisors,
    last_step: Option<ZoomStep>,
}

impl ProjectionContext {
    pub fn new(config: &RenderConfig) -> Self {
        let mut ctx = Self {
            center: GeoPosition::default(),
            zoom: 0,
            zoom_x: 1,
            zoom_y: 1,
            orientation: 0,
            sin_orientation: 0,
            cos_orientation: ONE,
            horizon: 0,
            width: 0,
            height: 0,
            center_x: 0,
            center_y: 0,
            upright: Area::default(),
            current: Area::default(),
            focus: Area::default(),
            visibility: Area::default(),
            units: if config.metric { &METRIC } else { &IMPERIAL },
            unit_per_longitude: [0.0; 2],
            fast_refresh: false,
            display_scale: 0,
            default_zoom: config.default_zoom,
            min_zoom: config.min_zoom,
            margin: config.visibility_margin,
            hd_screen: config.hd_screen,
            divisors: config.scale_divisors,
            last_step: None,
        };
        ctx.recompute_scale();
        ctx
    }

    /// Derive scale factors and visible areas from the camera state
    pub fn recompute_scale(&mut self) {
        if self.zoom == 0 {
            self.zoom = self.clamp_zoom(if self.default_zoom == 0 { REFERENCE_ZOOM } else { self.default_zoom });
        }

        let divisor = self.divisors.pick(self.hd_screen, self.fast_refresh).max(1);
        self.display_scale = self.zoom / divisor;

        // Horizontal scale shrinks with latitude to keep the map undistorted
        let (_, cosine) = sincos(self.center.lat_whole_degrees());
        let cosine = cosine.max(1);
        self.unit_per_longitude = [
            METRIC.unit_per_latitude * cosine as f64 / ONE as f64,
            IMPERIAL.unit_per_latitude * cosine as f64 / ONE as f64,
        ];

        self.zoom_y = self.zoom as i32;
        self.zoom_x = clamp_i32(div_round(self.zoom as i64 * ONE as i64, cosine as i64)).max(1);

        self.center_x = self.width / 2;
        self.center_y = self.height / 2;

        self.upright.west = clamp_i32(self.center.longitude as i64 - self.center_x as i64 * self.zoom_x as i64);
        self.upright.north = clamp_i32(self.center.latitude as i64 + self.center_y as i64 * self.zoom_y as i64);

        let orientation = self.orientation;
        self.apply_orientation(0);
        let corner = self.screen_to_geo(GuiPoint::new(self.width, self.height), true);
        self.upright.south = corner.latitude;
        self.upright.east = corner.longitude;
        self.apply_orientation(orientation);
    }

    fn apply_orientation(&mut self, direction: i32) {
        self.orientation = direction;
        (self.sin_orientation, self.cos_orientation) = sincos(direction);

        self.current = self.upright;
        if self.orientation != 0 || self.horizon != 0 {
            let corners = [
                GuiPoint::new(0, 0),
                GuiPoint::new(self.width, 0),
                GuiPoint::new(self.width, self.height),
                GuiPoint::new(0, self.height),
            ];
            for corner in corners {
                let pos = self.screen_to_geo(corner, true);
                self.current.extend(&pos);
            }
        }
        self.release_focus();
    }

    /// Rotate the screen. Returns false when the angle did not change, or
    /// changed by 2 degrees or less away from north-up; the new angle is
    /// applied either way.
    pub fn set_orientation(&mut self, direction: i32) -> bool {
        let direction = normalize_orientation(direction);
        let changed = if direction == self.orientation {
            false
        } else {
            direction == 0 || delta_direction(direction, self.orientation) > 2
        };
        self.apply_orientation(direction);
        changed
    }

    pub fn set_center(&mut self, center: GeoPosition) {
        self.center = center;
        self.recompute_scale();
    }

    fn min_zoom(&self) -> u32 {
        self.min_zoom.map_or(MIN_ZOOM_IN, |z| z.max(MIN_ZOOM_IN))
    }

    fn clamp_zoom(&self, zoom: u32) -> u32 {
        zoom.clamp(self.min_zoom(), MAX_ZOOM_OUT)
    }

    /// Returns true when the zoom actually changed
    pub fn set_zoom(&mut self, zoom: u32) -> bool {
        self.last_step = None;
        let zoom = self.clamp_zoom(zoom);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        self.recompute_scale();
        true
    }

    fn step_zoom(&mut self, direction: ZoomDirection, next: impl FnOnce(u32) -> u32) {
        let before = self.zoom;
        let after = match self.last_step {
            Some(step) if step.direction != direction && step.after == before => step.before,
            _ => next(before),
        };
        self.last_step = Some(ZoomStep { direction, before, after });
        self.zoom = after;
        self.recompute_scale();
    }

    /// Zoom in by 2/3
    pub fn zoom_in(&mut self) {
        let min = self.min_zoom();
        self.step_zoom(ZoomDirection::In, |z| (2 * z / 3).max(min));
    }

    /// Zoom out by 3/2, unless that would pass the maximum
    pub fn zoom_out(&mut self) {
        self.step_zoom(ZoomDirection::Out, |z| {
            let zoom = 3 * z / 2;
            if zoom < MAX_ZOOM_OUT {
                zoom
            } else {
                z
            }
        });
    }

    pub fn zoom_reset(&mut self) {
        let zoom = if self.default_zoom == 0 { REFERENCE_ZOOM } else { self.default_zoom };
        self.set_zoom(zoom);
    }

    /// True when the zoom is back at its configured default
    pub fn is_zoom_reset(&self) -> bool {
        self.zoom == self.clamp_zoom(self.default_zoom)
    }

    pub fn set_horizon(&mut self, horizon: i32) {
        self.horizon = horizon.min(0);
        self.recompute_scale();
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.width = width.max(0);
        self.height = height.max(0);
        self.recompute_scale();
    }

    pub fn set_fast_refresh(&mut self, fast: bool) {
        if self.fast_refresh != fast {
            self.fast_refresh = fast;
            self.recompute_scale();
        }
    }

    /// Restrict visibility tests to `focus` (plus the margin)
    pub fn set_focus(&mut self, focus: Area) {
        self.focus = focus.normalized();
        self.visibility = self.focus.expanded(self.margin);
    }

    /// Visibility goes back to the whole screen
    pub fn release_focus(&mut self) {
        self.focus = self.current;
        self.visibility = self.focus.expanded(self.margin);
    }

    pub fn use_metric(&mut self) {
        self.units = &METRIC;
    }

    pub fn use_imperial(&mut self) {
        self.units = &IMPERIAL;
    }

    /// Restore a center and zoom pair in one recompute
    pub fn set_context(&mut self, center: GeoPosition, zoom: u32) {
        self.center = center;
        self.zoom = self.clamp_zoom(zoom);
        self.last_step = None;
        self.recompute_scale();
    }

    pub fn context(&self) -> (GeoPosition, u32) {
        (self.center, self.zoom)
    }

    pub fn center(&self) -> GeoPosition {
        self.center
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn zoom_factors(&self) -> (i32, i32) {
        (self.zoom_x, self.zoom_y)
    }

    pub fn orientation(&self) -> i32 {
        self.orientation
    }

    pub fn horizon(&self) -> i32 {
        self.horizon
    }

    #[inline(always)]
    pub fn is_3d(&self) -> bool {
        self.horizon != 0
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_fast_refresh(&self) -> bool {
        self.fast_refresh
    }

    /// Zoom reduced by the quality divisor, used to declutter layers
    pub fn display_scale(&self) -> u32 {
        self.display_scale
    }

    pub fn upright_area(&self) -> Area {
        self.upright
    }

    /// Area bounding everything currently on screen
    pub fn visible_area(&self) -> Area {
        self.current
    }

    pub fn focus(&self) -> Area {
        self.focus
    }

    pub fn units(&self) -> &'static UnitSystem {
        self.units
    }

    fn unit_factors(&self) -> (f64, f64) {
        let lon = if self.units.is_metric() {
            self.unit_per_longitude[0]
        } else {
            self.unit_per_longitude[1]
        };
        (lon, self.units.unit_per_latitude)
    }

    /// Ground distance in meters between two positions
    pub fn distance(&self, a: &GeoPosition, b: &GeoPosition) -> i32 {
        let (per_lon, per_lat) = self.unit_factors();
        let x = per_lon * (a.longitude as f64 - b.longitude as f64);
        let y = per_lat * (a.latitude as f64 - b.latitude as f64);
        (x * x + y * y).sqrt() as i32
    }

    /// Direction from `a` to `b` in degrees, 0 = north, positive = east
    pub fn azimuth(&self, a: &GeoPosition, b: &GeoPosition) -> i32 {
        let (per_lon, per_lat) = self.unit_factors();
        let x = per_lon * (b.longitude as f64 - a.longitude as f64);
        let y = per_lat * (b.latitude as f64 - a.latitude as f64);
        let d = (x * x + y * y).sqrt();
        if d < 0.0001 {
            return 0;
        }
        arccos((ONE as f64 * y / d) as i32, if x > 0.0 { 1 } else { -1 })
    }

    /// Screen angle from `p1` to `p2` in degrees, 0 = straight down
    pub fn screen_angle(&self, p1: GuiPoint, p2: GuiPoint) -> i32 {
        let x = (p2.x - p1.x) as f64;
        let y = (p2.y - p1.y) as f64;
        let d = (x * x + y * y).sqrt();
        if d < 0.0001 {
            return 0;
        }
        arccos((ONE as f64 * y / d) as i32, if x > 0.0 { 1 } else { -1 })
    }

    #[inline(always)]
    pub fn screen_distance_sq(&self, p1: GuiPoint, p2: GuiPoint) -> i64 {
        let dx = (p1.x - p2.x) as i64;
        let dy = (p1.y - p2.y) as i64;
        dx * dx + dy * dy
    }

    /// Distance in meters from `pos` to the segment `a`..`b`
    pub fn distance_from_segment(&self, pos: &GeoPosition, a: &GeoPosition, b: &GeoPosition) -> i32 {
        let (per_lon, per_lat) = self.unit_factors();
        let ax = per_lon * (a.longitude as f64 - pos.longitude as f64);
        let ay = per_lat * (a.latitude as f64 - pos.latitude as f64);
        let bx = per_lon * (b.longitude as f64 - pos.longitude as f64);
        let by = per_lat * (b.latitude as f64 - pos.latitude as f64);

        let (dx, dy) = (bx - ax, by - ay);
        let len_sq = dx * dx + dy * dy;
        let t = if len_sq < 1e-9 {
            0.0
        } else {
            (-(ax * dx + ay * dy) / len_sq).clamp(0.0, 1.0)
        };
        let (x, y) = (ax + t * dx, ay + t * dy);
        (x * x + y * y).sqrt() as i32
    }

    /// Meters covered by `pixels` horizontally at the screen center
    pub fn scale_width(&self, pixels: i32) -> i32 {
        let (per_lon, _) = self.unit_factors();
        (pixels as f64 * self.zoom_x as f64 * per_lon) as i32
    }

    /// Drawn width of a line whose nominal width is `base` pixels at the
    /// reference zoom. `declutter` is the zoom up to which the line keeps
    /// most of its width; tiers above 1 are outlines drawn thinner.
    pub fn line_thickness(&self, base: i32, declutter: i32, tier: usize, multiple_pens: bool) -> i32 {
        if base <= 0 {
            return 1;
        }
        let zoom = self.zoom as f32;
        let factor = if self.zoom < 15 { 1.5 } else { 2.5 };
        let base_f = base as f32;
        let mut ratio = factor * REFERENCE_ZOOM as f32 * base_f / zoom;

        if ratio < 0.1 / base_f {
            return 1;
        }

        let declutter = declutter.min(REFERENCE_ZOOM as i32 * 100) as f32;
        if ratio < base_f {
            ratio += (base_f - ratio) * (0.30 * declutter / zoom);
            ratio = ratio.min(base_f);
        }

        if tier > 1 {
            ratio -= (tier as f32 - 1.0) * 2.0;
        }
        if multiple_pens && ratio < 3.0 {
            ratio = 1.0;
        }
        (ratio as i32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::test_support::ctx;

    #[test]
    fn test_reference_view() {
        let ctx = ctx(400, 400);
        assert_eq!(ctx.zoom(), REFERENCE_ZOOM);
        assert_eq!(ctx.zoom_factors(), (20, 20));
        assert_eq!(ctx.upright_area(), Area::new(-4000, -4000, 4000, 4000));
        assert_eq!(ctx.visible_area(), ctx.upright_area());
        assert_eq!(ctx.display_scale(), 20 / 12);
    }

    #[test]
    fn test_zoom_x_grows_with_latitude() {
        let mut ctx = ctx(400, 400);
        ctx.set_center(GeoPosition::new(0, 60_000_000));
        let (zoom_x, zoom_y) = ctx.zoom_factors();
        assert_eq!(zoom_y, 20);
        assert!((39..=41).contains(&zoom_x), "zoom_x {}", zoom_x);
    }

    #[test]
    fn test_polar_center_does_not_collapse() {
        let mut ctx = ctx(400, 400);
        ctx.set_center(GeoPosition::new(0, 90_000_000));
        assert!(ctx.zoom_factors().0 >= 1);
        let area = ctx.upright_area();
        assert!(area.north >= area.south);
        assert!(area.east >= area.west);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut ctx = ctx(400, 300);
        ctx.set_center(GeoPosition::new(2_350_000, 48_850_000));
        ctx.set_orientation(30);
        ctx.set_horizon(-200);
        let upright = ctx.upright_area();
        let current = ctx.visible_area();
        ctx.recompute_scale();
        assert_eq!(ctx.upright_area(), upright);
        assert_eq!(ctx.visible_area(), current);
        ctx.recompute_scale();
        assert_eq!(ctx.visible_area(), current);
    }

    #[test]
    fn test_rotation_grows_visible_area() {
        let mut ctx = ctx(400, 400);
        let upright = ctx.visible_area();
        assert!(ctx.set_orientation(45));
        let rotated = ctx.visible_area();
        assert!(rotated.contains_area(&upright));
        assert!(rotated.width() > upright.width());
    }

    #[test]
    fn test_orientation_change_reporting() {
        let mut ctx = ctx(400, 400);
        assert!(!ctx.set_orientation(0));
        assert!(!ctx.set_orientation(2));
        assert_eq!(ctx.orientation(), 2);
        assert!(ctx.set_orientation(0));
        assert!(ctx.set_orientation(-90));
        assert_eq!(ctx.orientation(), 270);
        assert!(!ctx.set_orientation(630));
    }

    #[test]
    fn test_full_turn_restores_visible_area() {
        let mut ctx = ctx(400, 400);
        ctx.set_center(GeoPosition::new(-122_419_400, 37_774_900));
        let original = ctx.visible_area();
        for step in 1..=360 {
            ctx.set_orientation(ctx.orientation() + 1);
            assert_eq!(ctx.orientation(), step % 360);
        }
        let restored = ctx.visible_area();
        assert!((restored.north - original.north).abs() <= 1);
        assert!((restored.south - original.south).abs() <= 1);
        assert!((restored.east - original.east).abs() <= 1);
        assert!((restored.west - original.west).abs() <= 1);
    }

    #[test]
    fn test_zoom_in_out_restores() {
        let mut ctx = ctx(400, 400);
        for start in [20, 21, 100, 1000, MIN_ZOOM_IN, 7] {
            ctx.set_zoom(start);
            ctx.zoom_in();
            ctx.zoom_out();
            assert_eq!(ctx.zoom(), start, "in/out from {}", start);
            ctx.zoom_out();
            ctx.zoom_in();
            assert_eq!(ctx.zoom(), start, "out/in from {}", start);
        }
    }

    #[test]
    fn test_zoom_steps() {
        let mut ctx = ctx(400, 400);
        ctx.zoom_in();
        assert_eq!(ctx.zoom(), 13);
        ctx.zoom_in();
        assert_eq!(ctx.zoom(), 8);
        ctx.zoom_in();
        assert_eq!(ctx.zoom(), MIN_ZOOM_IN);
        ctx.zoom_in();
        assert_eq!(ctx.zoom(), MIN_ZOOM_IN);
        ctx.zoom_out();
        assert_eq!(ctx.zoom(), MIN_ZOOM_IN);
        ctx.zoom_out();
        assert_eq!(ctx.zoom(), 9);
    }

    #[test]
    fn test_zoom_out_stops_below_maximum() {
        let mut ctx = ctx(400, 400);
        ctx.set_zoom(50_000);
        ctx.zoom_out();
        assert_eq!(ctx.zoom(), 50_000);
        ctx.zoom_in();
        assert_eq!(ctx.zoom(), 50_000);
    }

    #[test]
    fn test_set_zoom_clamps() {
        let config = RenderConfig { min_zoom: Some(10), ..Default::default() };
        let mut ctx = ProjectionContext::new(&config);
        assert!(ctx.set_zoom(1));
        assert_eq!(ctx.zoom(), 10);
        assert!(!ctx.set_zoom(3));
        assert!(ctx.set_zoom(u32::MAX));
        assert_eq!(ctx.zoom(), MAX_ZOOM_OUT);
        ctx.zoom_reset();
        assert_eq!(ctx.zoom(), 20);
        assert!(ctx.is_zoom_reset());
    }

    #[test]
    fn test_fast_refresh_changes_display_scale() {
        let mut ctx = ctx(400, 400);
        ctx.set_zoom(84);
        assert_eq!(ctx.display_scale(), 7);
        ctx.set_fast_refresh(true);
        assert_eq!(ctx.display_scale(), 12);
        ctx.set_fast_refresh(false);
        assert_eq!(ctx.display_scale(), 7);
    }

    #[test]
    fn test_focus() {
        let mut ctx = ctx(400, 400);
        ctx.set_focus(Area::new(0, 0, 100, 100));
        assert_eq!(ctx.focus(), Area::new(0, 0, 100, 100));
        ctx.release_focus();
        assert_eq!(ctx.focus(), ctx.visible_area());
    }

    #[test]
    fn test_context_round_trip() {
        let mut ctx = ctx(400, 400);
        let saved = ctx.context();
        ctx.set_context(GeoPosition::new(1_000_000, 1_000_000), 300);
        assert_eq!(ctx.zoom(), 300);
        ctx.set_context(saved.0, saved.1);
        assert_eq!(ctx.context(), saved);
    }

    #[test]
    fn test_distance_and_azimuth() {
        let ctx = ctx(400, 400);
        let origin = GeoPosition::new(0, 0);
        let north = GeoPosition::new(0, 1_000_000);
        let east = GeoPosition::new(1_000_000, 0);
        assert_eq!(ctx.distance(&origin, &north), 111_120);
        assert_eq!(ctx.azimuth(&origin, &north), 0);
        assert_eq!(ctx.azimuth(&origin, &east), 90);
        assert_eq!(ctx.azimuth(&east, &origin), -90);
        assert_eq!(ctx.azimuth(&north, &origin), 180);

        let p = GuiPoint::new(50, 50);
        assert_eq!(ctx.screen_angle(p, GuiPoint::new(50, 60)), 0);
        assert_eq!(ctx.screen_angle(p, GuiPoint::new(60, 50)), 90);
        assert_eq!(ctx.screen_angle(p, GuiPoint::new(50, 40)), 180);
    }

    #[test]
    fn test_distance_from_segment() {
        let ctx = ctx(400, 400);
        let a = GeoPosition::new(-1_000, 0);
        let b = GeoPosition::new(1_000, 0);
        let above = GeoPosition::new(0, 100);
        assert_eq!(ctx.distance_from_segment(&above, &a, &b), 11);
        let beyond = GeoPosition::new(1_100, 0);
        assert_eq!(ctx.distance_from_segment(&beyond, &a, &b), 11);
    }

    #[test]
    fn test_line_thickness() {
        let mut ctx = ctx(400, 400);
        assert_eq!(ctx.line_thickness(4, 0, 0, false), 10);
        assert_eq!(ctx.line_thickness(4, 0, 2, false), 8);
        ctx.set_zoom(400);
        assert_eq!(ctx.line_thickness(4, 0, 0, false), 1);
        assert_eq!(ctx.line_thickness(4, 2000, 0, false), 4);
        assert_eq!(ctx.line_thickness(4, 0, 0, true), 1);
        assert_eq!(ctx.line_thickness(0, 0, 0, false), 1);
    }
}
