use ratatui::style::Color;

use crate::braille::geometry::{draw_dot, draw_line, draw_thick_line, fill_polygon, Fill};
use crate::braille::BrailleCanvas;
use crate::geo::GuiPoint;
use crate::map::{Canvas, Texture};
use crate::style::{Pen, StyleSheet};

/// Terminal rendition of a pen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PenInk {
    pub color: Color,
    /// Line width in Braille dots
    pub stroke: i32,
}

impl PenInk {
    fn from_thickness(color: Color, thickness: i32) -> Self {
        let stroke = match thickness {
            i32::MIN..=3 => 1,
            4..=6 => 2,
            _ => 3,
        };
        Self { color, stroke }
    }
}

/// Canvas backend with one Braille canvas per pen. Terminal cells hold a
/// single color, so each pen draws into its own layer and the layers are
/// composited in the order pens were first used.
pub struct BrailleLayers {
    width: usize,
    height: usize,
    inks: Vec<PenInk>,
    layers: Vec<Option<BrailleCanvas>>,
    order: Vec<Pen>,
    current: Option<Pen>,
}

impl BrailleLayers {
    /// `width` and `height` in terminal cells
    pub fn new(width: usize, height: usize, style: &StyleSheet) -> Self {
        let mut layers = Self {
            width,
            height,
            inks: Vec::new(),
            layers: Vec::new(),
            order: Vec::new(),
            current: None,
        };
        layers.set_style(style);
        layers
    }

    /// Take a new snapshot of the pen colors and widths
    pub fn set_style(&mut self, style: &StyleSheet) {
        self.inks = (0..style.pen_count())
            .map(|i| {
                style
                    .pen_style(Pen(i as u16))
                    .map_or(PenInk { color: Color::White, stroke: 1 }, |p| PenInk::from_thickness(p.color, p.thickness))
            })
            .collect();
        self.layers.resize(self.inks.len(), None);
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.layers.iter_mut().for_each(|l| *l = None);
            self.order.clear();
        }
    }

    /// Size in Braille dots
    pub fn pixel_size(&self) -> (i32, i32) {
        ((self.width * 2) as i32, (self.height * 4) as i32)
    }

    pub fn cell_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Layers back to front
    pub fn layers(&self) -> impl Iterator<Item = (PenInk, &BrailleCanvas)> + '_ {
        self.order.iter().filter_map(|pen| {
            let canvas = self.layers.get(pen.index())?.as_ref()?;
            Some((self.ink(*pen), canvas))
        })
    }

    pub fn ink(&self, pen: Pen) -> PenInk {
        self.inks
            .get(pen.index())
            .copied()
            .unwrap_or(PenInk { color: Color::White, stroke: 1 })
    }

    fn target(&mut self) -> Option<(&mut BrailleCanvas, PenInk)> {
        let pen = self.current?;
        let ink = self.ink(pen);
        if self.layers.len() <= pen.index() {
            self.layers.resize(pen.index() + 1, None);
        }
        let slot = &mut self.layers[pen.index()];
        if slot.is_none() {
            *slot = Some(BrailleCanvas::new(self.width, self.height));
            self.order.push(pen);
        }
        slot.as_mut().map(|canvas| (canvas, ink))
    }
}

impl Canvas for BrailleLayers {
    fn select_pen(&mut self, pen: Pen) {
        self.current = Some(pen);
    }

    fn draw_lines(&mut self, counts: &[usize], points: &[GuiPoint], fast: bool) {
        let Some((canvas, ink)) = self.target() else {
            return;
        };
        let stroke = if fast { 1 } else { ink.stroke };
        let mut start = 0;
        for &count in counts {
            let Some(line) = points.get(start..start + count) else {
                break;
            };
            for pair in line.windows(2) {
                if stroke > 1 {
                    draw_thick_line(canvas, pair[0], pair[1], stroke);
                } else {
                    draw_line(canvas, pair[0], pair[1]);
                }
            }
            start += count;
        }
    }

    fn draw_textured_lines(&mut self, counts: &[usize], points: &[GuiPoint], fast: bool, _texture: Texture) {
        self.draw_lines(counts, points, fast);
    }

    fn draw_points(&mut self, points: &[GuiPoint]) {
        let Some((canvas, ink)) = self.target() else {
            return;
        };
        for &point in points {
            draw_dot(canvas, point, ink.stroke - 1);
        }
    }

    fn draw_polygons(&mut self, counts: &[usize], points: &[GuiPoint], filled: bool, _fast: bool) {
        let Some((canvas, _)) = self.target() else {
            return;
        };
        let mut start = 0;
        for &count in counts {
            let Some(ring) = points.get(start..start + count) else {
                break;
            };
            if filled {
                fill_polygon(canvas, ring, Fill::Stipple);
            } else {
                for pair in ring.windows(2) {
                    draw_line(canvas, pair[0], pair[1]);
                }
            }
            start += count;
        }
    }

    fn erase(&mut self) {
        for canvas in self.layers.iter_mut().flatten() {
            canvas.clear();
        }
        self.order.clear();
        self.layers.iter_mut().for_each(|l| *l = None);
        self.current = None;
    }
}
