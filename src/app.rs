use std::time::{Duration, Instant};

use tui_roadmap::braille::BrailleLayers;
use tui_roadmap::config::RenderConfig;
use tui_roadmap::geo::{GeoPosition, GuiPoint};
use tui_roadmap::map::{
    HighlightPlugin, LineStore, MapRenderer, ProjectionContext, RefreshControl, RepaintStats, RoadMap, MAX_ZOOM_OUT,
};
use tui_roadmap::style::StyleSheet;

/// Degrees per rotation key press
const ROTATE_STEP: i32 = 15;
/// Horizon change per PgUp/PgDn
const HORIZON_STEP: i32 = 20;
/// Pick radius for highlighting, in pixels
const PICK_PIXELS: i32 = 8;

/// Application state
pub struct App {
    pub ctx: ProjectionContext,
    pub map: RoadMap,
    pub style: StyleSheet,
    pub renderer: MapRenderer,
    pub layers: BrailleLayers,
    pub highlight: HighlightPlugin,
    pub refresh: RefreshControl,
    pub should_quit: bool,
    /// Name of the highlighted road, if any
    pub highlighted: Option<String>,
    pub stats: RepaintStats,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Last mouse position for drag tracking
    last_mouse: Option<(u16, u16)>,
    dragging: bool,
    horizon_3d: i32,
    home: (GeoPosition, u32),
}

/// Map size in cells: the frame minus the border and the status bar
fn inner_size(width: usize, height: usize) -> (usize, usize) {
    (width.saturating_sub(2), height.saturating_sub(3))
}

impl App {
    pub fn new(config: &RenderConfig, map: RoadMap, style: StyleSheet, width: usize, height: usize) -> Self {
        let (cols, rows) = inner_size(width, height);
        let mut ctx = ProjectionContext::new(config);
        ctx.set_size((cols * 2) as i32, (rows * 4) as i32);
        let layers = BrailleLayers::new(cols, rows, &style);

        let mut app = Self {
            ctx,
            map,
            renderer: MapRenderer::new(config),
            layers,
            highlight: HighlightPlugin::new(None),
            refresh: RefreshControl::new(Duration::from_millis(config.flow_control_ms)),
            should_quit: false,
            highlighted: None,
            stats: RepaintStats::default(),
            mouse_pos: None,
            last_mouse: None,
            dragging: false,
            horizon_3d: if config.horizon < 0 { config.horizon } else { -100 },
            home: (GeoPosition::default(), config.default_zoom),
            style,
        };
        app.fit_map();
        app.home = app.ctx.context();
        app.camera_changed();
        app
    }

    /// Center on the map data and zoom so all of it is on screen
    fn fit_map(&mut self) {
        let Some(extent) = self.map.extent() else {
            return;
        };
        self.ctx.set_center(extent.center());
        let (zoom_x, zoom_y) = self.ctx.zoom_factors();
        let width = self.ctx.width().max(1) as i64;
        let height = self.ctx.height().max(1) as i64;
        let by_width = extent.width() * zoom_y.max(1) as i64 / (zoom_x.max(1) as i64 * width);
        let by_height = extent.height() / height;
        let zoom = by_width.max(by_height) + 1;
        self.ctx.set_zoom(zoom.clamp(0, MAX_ZOOM_OUT as i64) as u32);
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (cols, rows) = inner_size(width, height);
        self.ctx.set_size((cols * 2) as i32, (rows * 4) as i32);
        self.layers.resize(cols, rows);
        self.camera_changed();
    }

    /// Pens follow the zoom; schedule a repaint
    fn camera_changed(&mut self) {
        self.style.adjust(&self.ctx);
        self.layers.set_style(&self.style);
        self.refresh.mark_dirty();
        self.refresh.refresh(Instant::now());
    }

    /// Something other than the camera changed
    fn display_changed(&mut self) {
        self.refresh.force();
        self.refresh.refresh(Instant::now());
    }

    /// Repaint now if the scheduled repaint is due. Returns true when the
    /// map was repainted.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.refresh.take_due(now) {
            return false;
        }
        self.repaint();
        true
    }

    pub fn repaint(&mut self) {
        if !self.refresh.begin() {
            return;
        }
        self.stats = self.renderer.repaint_now(
            &mut self.ctx,
            &self.map,
            &self.style,
            &self.highlight,
            &mut self.layers,
            self.dragging,
        );
        self.refresh.end();
        log::trace!("{:?}", self.stats);
    }

    /// Pan the map by screen pixels
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let center = GuiPoint::new(self.ctx.width() / 2 + dx, self.ctx.height() / 2 + dy);
        let target = self.ctx.screen_to_geo(center, false);
        self.ctx.set_center(target);
        self.camera_changed();
    }

    pub fn zoom_in(&mut self) {
        self.ctx.zoom_in();
        self.camera_changed();
    }

    pub fn zoom_out(&mut self) {
        self.ctx.zoom_out();
        self.camera_changed();
    }

    /// Zoom keeping the position under the mouse in place (2D only)
    pub fn zoom_at(&mut self, col: u16, row: u16, zoom_in: bool) {
        let anchor = self.ctx.screen_to_geo(Self::cell_to_pixel(col, row), true);
        let before = self.ctx.zoom() as i64;
        if zoom_in {
            self.ctx.zoom_in();
        } else {
            self.ctx.zoom_out();
        }
        let after = self.ctx.zoom() as i64;
        if !self.ctx.is_3d() && before > 0 {
            let center = self.ctx.center();
            let shift = |c: i32, a: i32| (a as i64 + (c as i64 - a as i64) * after / before) as i32;
            self.ctx.set_center(GeoPosition::new(
                shift(center.longitude, anchor.longitude),
                shift(center.latitude, anchor.latitude),
            ));
        }
        self.camera_changed();
    }

    pub fn rotate(&mut self, clockwise: bool) {
        let step = if clockwise { ROTATE_STEP } else { -ROTATE_STEP };
        self.ctx.set_orientation(self.ctx.orientation() + step);
        self.camera_changed();
    }

    pub fn toggle_3d(&mut self) {
        if self.ctx.is_3d() {
            self.horizon_3d = self.ctx.horizon();
            self.ctx.set_horizon(0);
        } else {
            self.ctx.set_horizon(self.horizon_3d);
        }
        self.camera_changed();
    }

    /// Tilt the 3D view; `up` moves the horizon further up the screen
    pub fn move_horizon(&mut self, up: bool) {
        if !self.ctx.is_3d() {
            return;
        }
        let limit = -(self.ctx.height().max(HORIZON_STEP));
        let horizon = if up { self.ctx.horizon() - HORIZON_STEP } else { self.ctx.horizon() + HORIZON_STEP };
        self.ctx.set_horizon(horizon.clamp(limit, -HORIZON_STEP));
        self.camera_changed();
    }

    pub fn toggle_units(&mut self) {
        if self.ctx.units().is_metric() {
            self.ctx.use_imperial();
        } else {
            self.ctx.use_metric();
        }
    }

    pub fn toggle_squares(&mut self) {
        let settings = self.renderer.settings_mut();
        settings.show_squares = !settings.show_squares;
        self.display_changed();
    }

    pub fn toggle_areas(&mut self) {
        let settings = self.renderer.settings_mut();
        settings.show_areas = !settings.show_areas;
        self.display_changed();
    }

    pub fn toggle_labels(&mut self) {
        let settings = self.renderer.settings_mut();
        settings.show_labels = !settings.show_labels;
        self.display_changed();
    }

    pub fn toggle_freeze(&mut self) {
        if self.refresh.is_frozen() {
            self.refresh.unfreeze(Instant::now());
        } else {
            self.refresh.freeze();
        }
    }

    /// Highlight every piece of the named road closest to the cursor (or
    /// the screen center). Clears the highlight when nothing is close.
    pub fn highlight_at_cursor(&mut self) {
        let point = self
            .mouse_pos
            .map(|(col, row)| Self::cell_to_pixel(col, row))
            .unwrap_or_else(|| GuiPoint::new(self.ctx.width() / 2, self.ctx.height() / 2));
        let pos = self.ctx.screen_to_geo(point, true);
        let max_distance = self.ctx.scale_width(PICK_PIXELS).max(10);

        let name = self
            .map
            .nearest_named_line(&self.ctx, pos, max_distance)
            .and_then(|line| self.map.line_name(line))
            .map(str::to_string);
        match &name {
            Some(name) => {
                let lines = self.map.lines_named(name);
                log::info!("Highlighting {} ({} pieces)", name, lines.len());
                self.highlight.set_lines(lines);
            }
            None => self.highlight.clear(),
        }
        self.highlighted = name;
        self.display_changed();
    }

    /// Back to the starting view
    pub fn reset(&mut self) {
        let (center, zoom) = self.home;
        self.ctx.set_orientation(0);
        self.ctx.set_horizon(0);
        self.ctx.set_context(center, zoom);
        self.highlight.clear();
        self.highlighted = None;
        self.camera_changed();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Terminal cell (inside the border) to the Braille pixel at its middle
    fn cell_to_pixel(col: u16, row: u16) -> GuiPoint {
        GuiPoint::new(col.saturating_sub(1) as i32 * 2 + 1, row.saturating_sub(1) as i32 * 4 + 2)
    }

    pub fn start_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
    }

    /// Pan with the mouse. Repaints run in fast mode until the drag ends.
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            let dx = (last_col as i32 - col as i32) * 2;
            let dy = (last_row as i32 - row as i32) * 4;
            if dx != 0 || dy != 0 {
                self.dragging = true;
                self.pan(dx, dy);
            }
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
        if self.dragging {
            self.dragging = false;
            self.display_changed();
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Mouse position in map cells, for the cursor marker
    pub fn mouse_cell(&self) -> Option<(u16, u16)> {
        self.mouse_pos
            .map(|(col, row)| (col.saturating_sub(1), row.saturating_sub(1)))
    }

    pub fn zoom_label(&self) -> String {
        format!("{}", self.ctx.zoom())
    }

    /// Ground width of the whole map view
    pub fn scale_label(&self) -> String {
        self.ctx.units().format_distance(self.ctx.scale_width(self.ctx.width()))
    }

    pub fn orientation_label(&self) -> String {
        const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
        let orientation = self.ctx.orientation().rem_euclid(360);
        let point = POINTS[(((orientation + 22) / 45) % 8) as usize];
        format!("{orientation}° {point}")
    }

    pub fn view_mode(&self) -> &'static str {
        if self.ctx.is_3d() {
            "3D"
        } else {
            "2D"
        }
    }

    pub fn center_coords(&self) -> String {
        let center = self.ctx.center();
        let (lat, lon) = (center.lat_degrees(), center.lon_degrees());
        format!(
            "{:.4}°{}, {:.4}°{}",
            lat.abs(),
            if lat >= 0.0 { "N" } else { "S" },
            lon.abs(),
            if lon >= 0.0 { "E" } else { "W" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_roadmap::data::sample_network;

    fn app() -> App {
        let config = RenderConfig::default();
        let style = StyleSheet::road_defaults(config.projection_areas);
        let map = sample_network(GeoPosition::from_degrees(-81.38, 28.54), &style);
        App::new(&config, map, style, 82, 43)
    }

    #[test]
    fn test_starts_over_the_map() {
        let app = app();
        assert_eq!(app.ctx.width(), 160);
        assert_eq!(app.ctx.height(), 160);
        let extent = app.map.extent().unwrap();
        assert!(extent.contains(&app.ctx.center()));
        assert!(app.ctx.zoom() > 20);
    }

    #[test]
    fn test_pan_moves_center() {
        let mut app = app();
        let before = app.ctx.center();
        app.pan(10, 0);
        assert!(app.ctx.center().longitude > before.longitude);
        app.pan(0, 10);
        assert!(app.ctx.center().latitude < before.latitude);
    }

    #[test]
    fn test_drag_pans_against_mouse() {
        let mut app = app();
        let before = app.ctx.center();
        app.start_drag(40, 20);
        app.handle_drag(30, 20);
        assert!(app.is_dragging());
        assert!(app.ctx.center().longitude > before.longitude);
        app.end_drag();
        assert!(!app.is_dragging());
    }

    #[test]
    fn test_zoom_and_reset() {
        let mut app = app();
        let home = app.ctx.context();
        app.zoom_in();
        assert!(app.ctx.zoom() < home.1);
        app.rotate(true);
        assert_eq!(app.ctx.orientation(), 15);
        app.toggle_3d();
        assert!(app.ctx.is_3d());
        assert_eq!(app.view_mode(), "3D");

        app.reset();
        assert_eq!(app.ctx.context(), home);
        assert_eq!(app.ctx.orientation(), 0);
        assert!(!app.ctx.is_3d());
    }

    #[test]
    fn test_horizon_stays_in_3d() {
        let mut app = app();
        app.move_horizon(true);
        assert!(!app.ctx.is_3d());

        app.toggle_3d();
        for _ in 0..20 {
            app.move_horizon(false);
        }
        assert_eq!(app.ctx.horizon(), -HORIZON_STEP);
        app.move_horizon(true);
        assert_eq!(app.ctx.horizon(), -2 * HORIZON_STEP);
    }

    #[test]
    fn test_highlight_nearest_road() {
        let mut app = app();
        app.zoom_in();
        app.zoom_in();
        app.highlight_at_cursor();
        assert!(app.highlighted.is_some());
        assert!(!app.highlight.is_empty());

        app.reset();
        assert!(app.highlighted.is_none());
        assert!(app.highlight.is_empty());
    }

    #[test]
    fn test_repaint_when_due() {
        let mut app = app();
        let now = Instant::now();
        assert!(!app.tick(now));
        assert!(app.tick(now + Duration::from_secs(1)));
        assert!(app.stats.lines > 0);
        assert!(app.layers.layers().count() > 0);
        assert!(!app.tick(now + Duration::from_secs(2)));

        app.toggle_freeze();
        app.toggle_squares();
        assert!(!app.tick(now + Duration::from_secs(3)));
        app.toggle_freeze();
        assert!(app.tick(Instant::now() + Duration::from_secs(3)));
    }

    #[test]
    fn test_status_labels() {
        let mut app = app();
        assert_eq!(app.orientation_label(), "0° N");
        app.rotate(false);
        assert_eq!(app.orientation_label(), "345° N");
        for _ in 0..5 {
            app.rotate(false);
        }
        assert_eq!(app.orientation_label(), "270° W");
        assert!(app.scale_label().ends_with("km") || app.scale_label().ends_with(" m"));
        app.toggle_units();
        assert!(app.scale_label().ends_with("mi") || app.scale_label().ends_with("ft"));
    }
}
