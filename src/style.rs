//! Layer and pen configuration for the road map.
//!
//! A layer is a road class (or an area class for polygons). Each line
//! layer has one or more pen tiers: tier 0 is drawn first (the casing),
//! higher tiers on top of it. In 3D views every tier carries one pen per
//! projection area, from the bottom of the screen to the horizon.

use crate::map::projection::ProjectionContext;
use ratatui::style::Color;

/// Opaque style handle understood by a canvas backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pen(pub u16);

impl Pen {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u16);

impl LayerId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Line,
    Area,
}

/// What the repaint driver needs to know about layers and pens
pub trait PenSource {
    /// Pen of `layer` for a tier and projection area; `None` when the
    /// layer has no such tier
    fn pen_for_layer(&self, layer: LayerId, tier: usize, area: usize) -> Option<Pen>;

    /// The single pen used for the layer during fast refresh
    fn main_pen(&self, layer: LayerId) -> Option<Pen>;

    /// Highest tier index over all layers
    fn max_pen_tier(&self) -> usize;

    /// Line layers drawn on `tier` at this display scale, in priority
    /// order (most important first)
    fn visible_layers(&self, tier: usize, display_scale: u32) -> Vec<LayerId>;

    fn layer_visible(&self, layer: LayerId, display_scale: u32) -> bool;

    fn label_visible(&self, layer: LayerId, display_scale: u32) -> bool;

    /// Current drawn width of a pen, in pixels
    fn pen_thickness(&self, pen: Pen) -> i32;

    /// Pen for the square outlines, if squares are shown at all
    fn edges_pen(&self) -> Option<Pen> {
        None
    }

    /// Pen for the dotted marks drawn over low-weight lines
    fn marker_pen(&self) -> Option<Pen> {
        None
    }
}

#[derive(Clone, Debug)]
pub struct PenStyle {
    pub name: String,
    pub color: Color,
    /// Width at the reference zoom
    pub base_thickness: i32,
    /// Width after the last `adjust`
    pub thickness: i32,
    layer: Option<LayerId>,
    tier: usize,
    area: usize,
}

#[derive(Clone, Debug)]
pub struct LayerStyle {
    pub name: &'static str,
    pub kind: LayerKind,
    /// tiers[tier][projection area]
    tiers: Vec<Vec<Pen>>,
    /// Largest display scale the layer is drawn at
    pub declutter: u32,
    /// Largest display scale the layer's names are shown at
    pub label_declutter: u32,
    pub labels: bool,
}

/// Description of one layer, handed to `StyleSheet::add_layer`
pub struct LayerSpec<'a> {
    pub name: &'static str,
    pub kind: LayerKind,
    /// (color, base thickness) per tier
    pub tiers: &'a [(Color, i32)],
    pub declutter: u32,
    pub label_declutter: u32,
    pub labels: bool,
}

/// Data class names mapped onto layer names
const CLASS_ALIASES: &[(&str, &str)] = &[
    ("motorway", "freeway"),
    ("trunk", "freeway"),
    ("highway", "freeway"),
    ("primary", "primary"),
    ("secondary", "secondary"),
    ("tertiary", "secondary"),
    ("motorway_link", "ramp"),
    ("trunk_link", "ramp"),
    ("primary_link", "ramp"),
    ("secondary_link", "ramp"),
    ("tertiary_link", "ramp"),
    ("residential", "street"),
    ("unclassified", "street"),
    ("living_street", "street"),
    ("service", "street"),
    ("road", "street"),
    ("footway", "trail"),
    ("path", "trail"),
    ("pedestrian", "trail"),
    ("cycleway", "trail"),
    ("track", "trail"),
    ("steps", "trail"),
    ("stream", "river"),
    ("canal", "river"),
    ("waterway", "river"),
    ("grass", "park"),
    ("forest", "park"),
    ("wood", "park"),
    ("garden", "park"),
    ("recreation_ground", "park"),
    ("lake", "water"),
    ("reservoir", "water"),
    ("riverbank", "water"),
];

#[derive(Clone, Debug)]
pub struct StyleSheet {
    pens: Vec<PenStyle>,
    layers: Vec<LayerStyle>,
    projection_areas: usize,
    edges: Option<Pen>,
    marker: Option<Pen>,
}

impl StyleSheet {
    pub fn new(projection_areas: usize) -> Self {
        Self {
            pens: Vec::new(),
            layers: Vec::new(),
            projection_areas: projection_areas.max(1),
            edges: None,
            marker: None,
        }
    }

    fn add_pen(&mut self, name: String, color: Color, thickness: i32, layer: Option<LayerId>, tier: usize, area: usize) -> Pen {
        let pen = Pen(self.pens.len() as u16);
        self.pens.push(PenStyle {
            name,
            color,
            base_thickness: thickness,
            thickness: thickness.max(1),
            layer,
            tier,
            area,
        });
        pen
    }

    /// Register a layer. Layers added first are the most important and
    /// are drawn last (on top).
    pub fn add_layer(&mut self, spec: LayerSpec<'_>) -> LayerId {
        let id = LayerId(self.layers.len() as u16);
        let areas = match spec.kind {
            LayerKind::Line => self.projection_areas,
            LayerKind::Area => 1,
        };
        let mut tiers = Vec::with_capacity(spec.tiers.len());
        for (tier, &(color, thickness)) in spec.tiers.iter().enumerate() {
            let pens = (0..areas)
                .map(|area| {
                    let name = format!("{}.{}.{}", spec.name, tier, area);
                    // further from the viewer, thinner
                    let width = (thickness - area as i32).max(1);
                    self.add_pen(name, color, width, Some(id), tier, area)
                })
                .collect();
            tiers.push(pens);
        }
        self.layers.push(LayerStyle {
            name: spec.name,
            kind: spec.kind,
            tiers,
            declutter: spec.declutter,
            label_declutter: spec.label_declutter,
            labels: spec.labels,
        });
        id
    }

    pub fn set_edges_color(&mut self, color: Color) {
        self.edges = Some(self.add_pen("edges".to_string(), color, 1, None, 0, 0));
    }

    pub fn set_marker_color(&mut self, color: Color) {
        self.marker = Some(self.add_pen("points_mark".to_string(), color, 1, None, 0, 0));
    }

    /// The stock road classes, most important first
    pub fn road_defaults(projection_areas: usize) -> Self {
        let mut style = Self::new(projection_areas);
        let layers = [
            LayerSpec {
                name: "freeway",
                kind: LayerKind::Line,
                tiers: &[(Color::Rgb(150, 90, 20), 4), (Color::Rgb(255, 170, 60), 3)],
                declutter: u32::MAX,
                label_declutter: 400,
                labels: true,
            },
            LayerSpec {
                name: "primary",
                kind: LayerKind::Line,
                tiers: &[(Color::Rgb(140, 120, 40), 3), (Color::Rgb(250, 220, 90), 2)],
                declutter: 2000,
                label_declutter: 60,
                labels: true,
            },
            LayerSpec {
                name: "secondary",
                kind: LayerKind::Line,
                tiers: &[(Color::Rgb(120, 120, 120), 3), (Color::White, 2)],
                declutter: 200,
                label_declutter: 20,
                labels: true,
            },
            LayerSpec {
                name: "ramp",
                kind: LayerKind::Line,
                tiers: &[(Color::Rgb(150, 90, 20), 2), (Color::Rgb(255, 170, 60), 1)],
                declutter: 100,
                label_declutter: 0,
                labels: false,
            },
            LayerSpec {
                name: "street",
                kind: LayerKind::Line,
                tiers: &[(Color::Gray, 2)],
                declutter: 12,
                label_declutter: 4,
                labels: true,
            },
            LayerSpec {
                name: "trail",
                kind: LayerKind::Line,
                tiers: &[(Color::DarkGray, 1)],
                declutter: 4,
                label_declutter: 2,
                labels: true,
            },
            LayerSpec {
                name: "river",
                kind: LayerKind::Line,
                tiers: &[(Color::Blue, 2)],
                declutter: 400,
                label_declutter: 40,
                labels: true,
            },
            LayerSpec {
                name: "park",
                kind: LayerKind::Area,
                tiers: &[(Color::Green, 1), (Color::LightGreen, 1)],
                declutter: 200,
                label_declutter: 20,
                labels: true,
            },
            LayerSpec {
                name: "water",
                kind: LayerKind::Area,
                tiers: &[(Color::Blue, 1), (Color::LightBlue, 1)],
                declutter: u32::MAX,
                label_declutter: 100,
                labels: true,
            },
        ];
        for spec in layers {
            style.add_layer(spec);
        }
        style.set_edges_color(Color::Red);
        style.set_marker_color(Color::Rgb(178, 191, 220));
        style
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerStyle> {
        self.layers.get(id.index())
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &LayerStyle)> + '_ {
        self.layers.iter().enumerate().map(|(i, l)| (LayerId(i as u16), l))
    }

    pub fn layer_by_name(&self, name: &str) -> Option<LayerId> {
        self.layers
            .iter()
            .position(|l| l.name.eq_ignore_ascii_case(name))
            .map(|i| LayerId(i as u16))
    }

    /// Layer for a data class (`motorway`, `residential`, `park`...).
    /// `*_link` classes not listed explicitly fall back to ramps.
    pub fn layer_for_class(&self, class: &str) -> Option<LayerId> {
        let class = class.trim().to_ascii_lowercase();
        if let Some(id) = self.layer_by_name(&class) {
            return Some(id);
        }
        if let Some((_, name)) = CLASS_ALIASES.iter().find(|(alias, _)| *alias == class) {
            return self.layer_by_name(name);
        }
        if class.ends_with("_link") {
            return self.layer_by_name("ramp");
        }
        None
    }

    pub fn pen_style(&self, pen: Pen) -> Option<&PenStyle> {
        self.pens.get(pen.index())
    }

    pub fn pen_count(&self) -> usize {
        self.pens.len()
    }

    pub fn projection_areas(&self) -> usize {
        self.projection_areas
    }

    /// Recompute every pen width for the current zoom
    pub fn adjust(&mut self, ctx: &ProjectionContext) {
        for pen in &mut self.pens {
            let Some(layer) = pen.layer.and_then(|id| self.layers.get(id.index())) else {
                continue;
            };
            if layer.kind == LayerKind::Area {
                continue;
            }
            let declutter = layer.declutter.min(i32::MAX as u32) as i32;
            let multiple_pens = layer.tiers.len() > 1;
            let width = ctx.line_thickness(pen.base_thickness + pen.area as i32, declutter, pen.tier, multiple_pens);
            pen.thickness = (width - pen.area as i32).max(1);
        }
    }
}

impl PenSource for StyleSheet {
    fn pen_for_layer(&self, layer: LayerId, tier: usize, area: usize) -> Option<Pen> {
        let pens = self.layers.get(layer.index())?.tiers.get(tier)?;
        pens.get(area).or_else(|| pens.last()).copied()
    }

    fn main_pen(&self, layer: LayerId) -> Option<Pen> {
        let tiers = &self.layers.get(layer.index())?.tiers;
        tiers.get(1).or_else(|| tiers.first())?.first().copied()
    }

    fn max_pen_tier(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| l.kind == LayerKind::Line)
            .map(|l| l.tiers.len())
            .max()
            .unwrap_or(1)
            .saturating_sub(1)
    }

    fn visible_layers(&self, tier: usize, display_scale: u32) -> Vec<LayerId> {
        self.layers()
            .filter(|(_, l)| l.kind == LayerKind::Line && tier < l.tiers.len() && display_scale <= l.declutter)
            .map(|(id, _)| id)
            .collect()
    }

    fn layer_visible(&self, layer: LayerId, display_scale: u32) -> bool {
        self.layer(layer).is_some_and(|l| display_scale <= l.declutter)
    }

    fn label_visible(&self, layer: LayerId, display_scale: u32) -> bool {
        self.layer(layer).is_some_and(|l| l.labels && display_scale <= l.label_declutter)
    }

    fn pen_thickness(&self, pen: Pen) -> i32 {
        self.pen_style(pen).map_or(1, |p| p.thickness)
    }

    fn edges_pen(&self) -> Option<Pen> {
        self.edges
    }

    fn marker_pen(&self) -> Option<Pen> {
        self.marker
    }
}
