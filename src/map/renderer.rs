//! Square repaint driver: walks the visible squares tier by tier and feeds
//! their polygons and lines through the batcher to a canvas.

use std::collections::{HashMap, HashSet};

use crate::config::{DisplaySettings, RenderConfig};
use crate::geo::{Area, GuiPoint};
use crate::map::batch::{DrawBatch, ProjectionAreas, Target, Texture};
use crate::map::canvas::Canvas;
use crate::map::line::{draw_dotted_line, draw_line, LabelInfo};
use crate::map::polygon::{draw_polygons, draw_square_edges};
use crate::map::projection::ProjectionContext;
use crate::map::spatial::{LineId, LineStore, TileId, TileIndex};
use crate::style::{LayerId, Pen, PenSource};

/// A name to print over the map, in final screen pixels
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapLabel {
    pub text: String,
    pub position: GuiPoint,
    pub pen: Pen,
    /// Longer labelled pieces win when a name appears more than once
    pub length_sq: i64,
}

/// Per-line hooks into the repaint
pub trait LinePlugin {
    /// True to leave the line out entirely
    fn override_line(&self, _line: LineId, _layer: LayerId) -> bool {
        false
    }

    /// `Some(None)` hides the line on this tier, `Some(Some(pen))` draws it
    /// with that pen. Ignored during fast refresh.
    fn override_pen(&self, _line: LineId, _layer: LayerId, _tier: usize) -> Option<Option<Pen>> {
        None
    }

    /// Low-weight lines are drawn with the layer's outer pens and marked
    /// with dots
    fn low_weight(&self, _line: LineId) -> bool {
        false
    }
}

pub struct NoPlugin;

impl LinePlugin for NoPlugin {}

/// Highlights a set of lines, either with a pen of its own or, without
/// one, with the dotted low-weight marking
#[derive(Clone, Debug, Default)]
pub struct HighlightPlugin {
    lines: HashSet<LineId>,
    pen: Option<Pen>,
}

impl HighlightPlugin {
    pub fn new(pen: Option<Pen>) -> Self {
        Self {
            lines: HashSet::new(),
            pen,
        }
    }

    pub fn set_lines(&mut self, lines: impl IntoIterator<Item = LineId>) {
        self.lines = lines.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, line: LineId) -> bool {
        self.lines.contains(&line)
    }
}

impl LinePlugin for HighlightPlugin {
    fn override_pen(&self, line: LineId, _layer: LayerId, _tier: usize) -> Option<Option<Pen>> {
        match self.pen {
            Some(pen) if self.contains(line) => Some(Some(pen)),
            _ => None,
        }
    }

    fn low_weight(&self, line: LineId) -> bool {
        self.pen.is_none() && self.contains(line)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepaintStats {
    /// Squares with data
    pub squares: usize,
    /// Squares in view without data
    pub missing: usize,
    pub lines: usize,
    pub polygons: usize,
    pub labels: usize,
}

#[derive(Clone, Copy, Debug)]
struct LayerPass {
    layer: LayerId,
    pen: Option<Pen>,
    main: Option<Pen>,
}

/// Label placement limits for one repaint
#[derive(Clone, Copy, Debug)]
struct LabelCutoff {
    lower_edge: GuiPoint,
    /// Squared distance from the lower edge beyond which labels are
    /// dropped, 0 for no limit
    distance_sq: i64,
}

impl LabelCutoff {
    /// No labels in the upper quarter of a perspective view
    fn new(ctx: &ProjectionContext) -> Self {
        let (width, height) = (ctx.width(), ctx.height());
        let upright = |p: GuiPoint| ctx.counter_rotate(ctx.unproject(p));
        let lower_edge = upright(GuiPoint::new(width / 2, height));
        if ctx.horizon() == 0 {
            return Self {
                lower_edge,
                distance_sq: 0,
            };
        }
        let cutoff = upright(GuiPoint::new(width / 2, height / 4));
        Self {
            lower_edge,
            distance_sq: ctx.screen_distance_sq(cutoff, lower_edge),
        }
    }

    fn allows(&self, ctx: &ProjectionContext, center: GuiPoint) -> bool {
        self.distance_sq == 0 || self.distance_sq > ctx.screen_distance_sq(center, self.lower_edge)
    }
}

pub struct MapRenderer {
    batch: DrawBatch,
    settings: DisplaySettings,
    labels_enabled: bool,
    projection_areas: usize,
    tiles: Vec<TileId>,
    /// Area the square list was computed for
    last_view: Option<Area>,
    last_scale: Option<u32>,
    /// Layer passes per tier, for (zoom, display scale)
    passes: Vec<Vec<LayerPass>>,
    passes_key: Option<(u32, u32)>,
    labels: Vec<MapLabel>,
    label_index: HashMap<String, usize>,
    was_fast: bool,
}

impl MapRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            batch: DrawBatch::new(config.batch_capacity),
            settings: DisplaySettings::default(),
            labels_enabled: config.labels,
            projection_areas: config.projection_areas,
            tiles: Vec::new(),
            last_view: None,
            last_scale: None,
            passes: Vec::new(),
            passes_key: None,
            labels: Vec::new(),
            label_index: HashMap::new(),
            was_fast: false,
        }
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut DisplaySettings {
        &mut self.settings
    }

    /// Labels collected by the last repaint
    pub fn labels(&self) -> &[MapLabel] {
        &self.labels
    }

    /// Squares drawn by the last repaint
    pub fn cached_tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// Forget the cached square list and layer passes, after the map or
    /// the style changed
    pub fn invalidate(&mut self) {
        self.last_view = None;
        self.last_scale = None;
        self.passes_key = None;
    }

    fn update_tiles<M: TileIndex + ?Sized>(&mut self, ctx: &ProjectionContext, map: &M) {
        let view = ctx.visible_area();
        let scale = ctx.display_scale();
        let contained = self.last_view.is_some_and(|last| last.contains_area(&view));
        if self.last_scale == Some(scale) && contained {
            return;
        }

        // query a little more than the view so that small moves reuse it
        let margin = (view.width().max(view.height()) / 4).min(i32::MAX as i64) as i32;
        let query = view.expanded(margin);
        self.tiles = map.visible_tiles(&query);
        self.last_view = Some(query);
        self.last_scale = Some(scale);
        log::debug!("{} squares in view", self.tiles.len());
    }

    fn update_passes<P: PenSource + ?Sized>(&mut self, ctx: &ProjectionContext, style: &P) {
        let key = (ctx.zoom(), ctx.display_scale());
        if self.passes_key == Some(key) {
            return;
        }
        self.passes = (0..=style.max_pen_tier())
            .map(|tier| {
                style
                    .visible_layers(tier, key.1)
                    .into_iter()
                    .map(|layer| LayerPass {
                        layer,
                        pen: style.pen_for_layer(layer, tier, 0),
                        main: style.main_pen(layer),
                    })
                    .collect()
            })
            .collect();
        self.passes_key = Some(key);
    }

    fn add_label(&mut self, label: MapLabel) {
        match self.label_index.get(&label.text) {
            Some(&i) => {
                if label.length_sq > self.labels[i].length_sq {
                    self.labels[i] = label;
                }
            }
            None => {
                self.label_index.insert(label.text.clone(), self.labels.len());
                self.labels.push(label);
            }
        }
    }

    /// Repaint the whole map into `canvas`. `fast` trades detail for
    /// speed while the map is being dragged or animated.
    pub fn repaint_now<M, P>(
        &mut self,
        ctx: &mut ProjectionContext,
        map: &M,
        style: &P,
        plugin: &dyn LinePlugin,
        canvas: &mut dyn Canvas,
        fast: bool,
    ) -> RepaintStats
    where
        M: TileIndex + LineStore + ?Sized,
        P: PenSource + ?Sized,
    {
        if fast != self.was_fast {
            log::debug!("fast refresh {}", if fast { "started" } else { "ended" });
            self.was_fast = fast;
        }
        ctx.set_fast_refresh(fast);
        let ctx: &ProjectionContext = ctx;

        self.update_tiles(ctx, map);
        self.update_passes(ctx, style);
        self.labels.clear();
        self.label_index.clear();

        let mut stats = RepaintStats::default();
        let mut polygon_labels = Vec::new();
        let with_labels = self.labels_enabled && self.settings.show_labels && !fast;
        let cutoff = LabelCutoff::new(ctx);

        self.batch
            .set_projection_areas(ProjectionAreas::compute(ctx, self.projection_areas));
        let mut out = Target::new(ctx, canvas);
        out.canvas.erase();
        self.batch.reset_pen();

        let last_tier = self.passes.len().saturating_sub(1);
        let max_tier = if fast { last_tier.min(1) } else { last_tier };

        for tier in 0..=max_tier {
            for t in (0..self.tiles.len()).rev() {
                let tile = self.tiles[t];
                let Some(edges) = map.tile_edges(tile) else {
                    if tier == 0 {
                        stats.missing += 1;
                    }
                    continue;
                };

                if tier == 0 {
                    stats.squares += 1;
                    if self.settings.show_areas {
                        let labels = with_labels.then_some(&mut polygon_labels);
                        stats.polygons += draw_polygons(&mut self.batch, &mut out, map, tile, style, labels);
                    }
                    if self.settings.show_squares {
                        if let Some(pen) = style.edges_pen() {
                            draw_square_edges(&mut self.batch, &mut out, &edges, pen);
                        }
                    }
                }

                let fully_visible = ctx.area_inside(&edges);
                for i in (0..self.passes[tier].len()).rev() {
                    let pass = self.passes[tier][i];
                    let job = LayerJob {
                        tile,
                        tier,
                        pass,
                        fast,
                        fully_visible,
                        cutoff: with_labels.then_some(cutoff),
                    };
                    stats.lines += self.draw_layer(&mut out, map, style, plugin, job);
                }
                self.batch.flush_points(&mut out);
            }
        }

        self.batch.flush_all(&mut out);

        for label in polygon_labels {
            self.add_label(label);
        }
        stats.labels = self.labels.len();

        log::debug!(
            "repaint{}: {} squares ({} missing), {} lines, {} polygons, {} labels",
            if fast { " (fast)" } else { "" },
            stats.squares,
            stats.missing,
            stats.lines,
            stats.polygons,
            stats.labels
        );
        stats
    }

    /// Lines of one layer in one square. Returns the number of lines drawn.
    fn draw_layer<M, P>(
        &mut self,
        out: &mut Target<'_>,
        map: &M,
        style: &P,
        plugin: &dyn LinePlugin,
        job: LayerJob,
    ) -> usize
    where
        M: TileIndex + LineStore + ?Sized,
        P: PenSource + ?Sized,
    {
        let lines = map.lines_in_tile(job.tile, job.pass.layer);
        if lines.is_empty() {
            return 0;
        }
        let layer_pen = if job.fast { job.pass.main } else { job.pass.pen };
        let Some(layer_pen) = layer_pen else {
            return 0;
        };
        self.batch.select_pen(out, layer_pen);

        let ctx = out.ctx;
        let layer = job.pass.layer;
        let areas = if ctx.is_3d() { self.projection_areas.max(1) } else { 1 };

        let mut pens = vec![Some(layer_pen)];
        pens.extend((1..areas).map(|a| style.pen_for_layer(layer, job.tier, a)));
        let outer_pens: Vec<Option<Pen>> = (0..areas)
            .map(|a| style.pen_for_layer(layer, 2, a).or_else(|| style.pen_for_layer(layer, 1, a)))
            .collect();

        // labels and markings go with the layer's top tier, up to tier 1
        let top_tier = if style.pen_for_layer(layer, 1, 0).is_some() { 1 } else { 0 };
        let cutoff = job.cutoff.filter(|_| job.tier == top_tier);

        let mut drawn = 0;
        for line in lines {
            if plugin.override_line(line, layer) {
                continue;
            }
            let Some(path) = map.line_path(line) else {
                continue;
            };

            let mut label = LabelInfo::default();
            let label_ref = cutoff.is_some().then_some(&mut label);
            let override_pen = if job.fast { None } else { plugin.override_pen(line, layer, job.tier) };

            let visible = match override_pen {
                Some(None) => continue,
                Some(Some(pen)) => draw_line(
                    &mut self.batch,
                    out,
                    map,
                    &path,
                    job.fully_visible,
                    &[Some(pen)],
                    label_ref,
                    Texture::NONE,
                ),
                None if job.tier == top_tier && plugin.low_weight(line) && outer_pens[0].is_some() => {
                    let visible = draw_line(
                        &mut self.batch,
                        out,
                        map,
                        &path,
                        job.fully_visible,
                        &outer_pens,
                        label_ref,
                        Texture::NONE,
                    );
                    if let Some(marker) = style.marker_pen().filter(|_| visible) {
                        draw_dotted_line(&mut self.batch, out, map, &path, marker);
                    }
                    visible
                }
                None => draw_line(
                    &mut self.batch,
                    out,
                    map,
                    &path,
                    job.fully_visible,
                    &pens,
                    label_ref,
                    Texture::NONE,
                ),
            };
            if visible {
                drawn += 1;
            }

            let Some(cutoff) = cutoff else {
                continue;
            };
            if label.length_sq == 0 || !cutoff.allows(ctx, label.center) {
                continue;
            }
            let Some(name) = map.line_name(line) else {
                continue;
            };
            let Some(pen) = style.pen_for_layer(layer, 1, 0).or_else(|| style.pen_for_layer(layer, 0, 0)) else {
                continue;
            };
            if style.pen_thickness(pen) > 1 && style.label_visible(layer, ctx.display_scale()) {
                let mut position = [label.center];
                ctx.rotate_and_project(&mut position);
                self.add_label(MapLabel {
                    text: name.to_string(),
                    position: position[0],
                    pen,
                    length_sq: label.length_sq,
                });
            }
        }

        self.batch.flush_lines(out);
        drawn
    }
}

#[derive(Clone, Copy)]
struct LayerJob {
    tile: TileId,
    tier: usize,
    pass: LayerPass,
    fast: bool,
    fully_visible: bool,
    cutoff: Option<LabelCutoff>,
}
