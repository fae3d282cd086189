//! Per-line drawing: walks a line's shape points, clips every segment
//! against the visible area and feeds the visible pieces to the batcher.

use std::ops::Range;

use crate::geo::{GeoPosition, GuiPoint};
use crate::map::batch::{DrawBatch, Target, Texture, Vertex};
use crate::map::spatial::LineStore;
use crate::style::Pen;

/// Dot spacing of `draw_dotted_line`, in pixels (Manhattan length)
const DOT_STEP: i32 = 7;

/// Geometry of one line: its endpoints and the shape points between
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinePath {
    pub from: GeoPosition,
    pub to: GeoPosition,
    pub shapes: Option<Range<usize>>,
}

/// Where a line's name fits best: its longest visible segment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelInfo {
    pub p1: GeoPosition,
    pub p2: GeoPosition,
    /// Upright screen midpoint of the longest segment
    pub center: GuiPoint,
    /// Sum of the squared lengths of the visible segments
    pub length_sq: i64,
}

impl LabelInfo {
    fn consider(&mut self, longest: &mut i64, p0: GuiPoint, p1: GuiPoint, from: GeoPosition, to: GeoPosition) {
        let dx = (p1.x - p0.x) as i64;
        let dy = (p1.y - p0.y) as i64;
        let length_sq = dx * dx + dy * dy;
        self.length_sq += length_sq;
        if length_sq > *longest {
            *longest = length_sq;
            self.p1 = from;
            self.p2 = to;
            self.center = (p0 + p1) / 2;
        }
    }
}

/// Draw one line. `fully_visible` promises that every point of the line
/// is inside the visible area, which skips clipping entirely.
///
/// Returns true when anything was handed to the batcher.
#[allow(clippy::too_many_arguments)]
pub fn draw_line<L: LineStore + ?Sized>(
    batch: &mut DrawBatch,
    out: &mut Target<'_>,
    store: &L,
    path: &LinePath,
    fully_visible: bool,
    pens: &[Option<Pen>],
    mut label: Option<&mut LabelInfo>,
    texture: Texture,
) -> bool {
    let ctx = out.ctx;
    if let Some(label) = label.as_deref_mut() {
        *label = LabelInfo::default();
    }

    let shapes = match &path.shapes {
        Some(shapes) if !shapes.is_empty() => shapes.clone(),
        _ => return draw_straight(batch, out, path, fully_visible, pens, label, texture),
    };

    let allowed = batch.reserve(out, shapes.len() + 3);
    let last = shapes.start + allowed.saturating_sub(3).min(shapes.len());

    let mut longest = -1;
    let mut last_pos = path.from;
    let mut pos = path.from;

    if fully_visible {
        let mut previous = ctx.geo_to_screen(&path.from);
        batch.add(out, Vertex::Start(previous), pens, texture);
        for i in shapes.start..last {
            store.shape_step(i, &mut pos);
            let point = ctx.geo_to_screen(&pos);
            if let Some(label) = label.as_deref_mut() {
                label.consider(&mut longest, previous, point, last_pos, pos);
            }
            batch.add(out, Vertex::Next(point), pens, texture);
            (previous, last_pos) = (point, pos);
        }
        let point = ctx.geo_to_screen(&path.to);
        if let Some(label) = label.as_deref_mut() {
            label.consider(&mut longest, previous, point, last_pos, path.to);
        }
        batch.add(out, Vertex::End(point), pens, texture);
        return true;
    }

    let mut drawn = false;
    let mut last_visible = false;

    for i in shapes.start..last {
        store.shape_step(i, &mut pos);

        if ctx.segment_visible(&last_pos, &pos) {
            if let Some((p0, p1)) = ctx.clip_segment(&last_pos, &pos) {
                if p0 == p1 {
                    if last_visible {
                        // too short to show
                        last_pos = pos;
                        continue;
                    }
                } else if let Some(label) = label.as_deref_mut() {
                    label.consider(&mut longest, p0, p1, last_pos, pos);
                }

                if !last_visible {
                    batch.add(out, Vertex::Start(p0), pens, texture);
                }

                last_visible = ctx.point_visible(&pos);
                if last_visible {
                    batch.add(out, Vertex::Next(p1), pens, texture);
                } else {
                    // the rest of the line, if it comes back, is a new polyline
                    batch.add(out, Vertex::End(p1), pens, texture);
                    if last - i + 3 >= batch.line_room() {
                        batch.flush_lines(out);
                    }
                }
                drawn = true;
            }
        }
        last_pos = pos;
    }

    if ctx.segment_visible(&last_pos, &path.to) {
        if let Some((p0, p1)) = ctx.clip_segment(&last_pos, &path.to) {
            if p0 != p1 {
                if let Some(label) = label.as_deref_mut() {
                    label.consider(&mut longest, p0, p1, last_pos, path.to);
                }
            }
            if !last_visible {
                batch.add(out, Vertex::Start(p0), pens, texture);
            }
            batch.add(out, Vertex::Next(p1), pens, texture);
            last_visible = true;
            drawn = true;
        }
    }

    if last_visible {
        batch.add(out, Vertex::Finish, pens, texture);
        drawn = true;
    }
    drawn
}

fn draw_straight(
    batch: &mut DrawBatch,
    out: &mut Target<'_>,
    path: &LinePath,
    fully_visible: bool,
    pens: &[Option<Pen>],
    label: Option<&mut LabelInfo>,
    texture: Texture,
) -> bool {
    let ctx = out.ctx;
    if !fully_visible && !ctx.segment_visible(&path.from, &path.to) {
        return false;
    }
    let Some((p0, p1)) = ctx.clip_segment(&path.from, &path.to) else {
        return false;
    };

    if p0 == p1 {
        batch.add(out, Vertex::Dot(p0), pens, texture);
        return true;
    }

    if let Some(label) = label {
        let mut longest = -1;
        label.consider(&mut longest, p0, p1, path.from, path.to);
    }

    if batch.line_room() <= 2 {
        batch.flush_lines(out);
    }
    batch.add(out, Vertex::Start(p0), pens, texture);
    batch.add(out, Vertex::End(p1), pens, texture);
    true
}

/// Dots spaced along the visible part of a line, drawn with `pen`. Used to
/// mark lines on top of their regular stroke. Leaves the batch without a
/// current pen.
pub fn draw_dotted_line<L: LineStore + ?Sized>(
    batch: &mut DrawBatch,
    out: &mut Target<'_>,
    store: &L,
    path: &LinePath,
    pen: Pen,
) {
    batch.flush_all(out);

    let ctx = out.ctx;
    let mut dots = Vec::new();
    let mut last_pos = path.from;
    let mut pos = path.from;

    if let Some(shapes) = path.shapes.clone() {
        for i in shapes {
            store.shape_step(i, &mut pos);
            if ctx.segment_visible(&last_pos, &pos) {
                if let Some((p0, p1)) = ctx.clip_segment(&last_pos, &pos) {
                    dotted_segment(p0, p1, &mut dots);
                }
            }
            last_pos = pos;
        }
    }
    if let Some((p0, p1)) = ctx.clip_segment(&last_pos, &path.to) {
        dotted_segment(p0, p1, &mut dots);
    }

    if !dots.is_empty() {
        ctx.rotate_and_project(&mut dots);
        out.canvas.select_pen(pen);
        out.canvas.draw_points(&dots);
    }
    batch.reset_pen();
}

/// One dot every three steps, never on the endpoints
fn dotted_segment(p0: GuiPoint, p1: GuiPoint, dots: &mut Vec<GuiPoint>) {
    let delta = p1 - p0;
    let steps = (delta.x.abs() + delta.y.abs()) / DOT_STEP;
    let mut k = 1;
    while k < steps {
        dots.push(p0 + delta * k / steps);
        k += 3;
    }
}
