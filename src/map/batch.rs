//! Streaming draw batcher: coalesces segments that share a pen into as
//! few canvas calls as possible.
//!
//! Points arrive upright (before rotation and perspective). The batch is
//! rotated and projected in place right before it is handed to the
//! canvas, so each point is transformed exactly once.

use crate::geo::GuiPoint;
use crate::map::canvas::Canvas;
use crate::map::projection::ProjectionContext;
use crate::style::Pen;

/// Image drawn along a textured line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub u16);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Texture {
    pub image: Option<ImageId>,
    /// The image runs against the line direction
    pub opposite: bool,
}

impl Texture {
    pub const NONE: Texture = Texture { image: None, opposite: false };
}

/// One step of a polyline, or a lone point
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vertex {
    /// First point of a polyline
    Start(GuiPoint),
    Next(GuiPoint),
    /// Last point of a polyline
    End(GuiPoint),
    /// Close the current polyline without adding a point
    Finish,
    /// Drawn as a point sprite, not part of any polyline
    Dot(GuiPoint),
}

impl Vertex {
    #[inline(always)]
    fn point(self) -> Option<GuiPoint> {
        match self {
            Vertex::Start(p) | Vertex::Next(p) | Vertex::End(p) | Vertex::Dot(p) => Some(p),
            Vertex::Finish => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Empty,
    Accumulating,
}

/// Where flushed batches go
pub struct Target<'a> {
    pub ctx: &'a ProjectionContext,
    pub canvas: &'a mut dyn Canvas,
}

impl<'a> Target<'a> {
    pub fn new(ctx: &'a ProjectionContext, canvas: &'a mut dyn Canvas) -> Self {
        Self { ctx, canvas }
    }
}

/// Screen bands used to pick thinner pens toward the horizon of a 3D view.
///
/// Distances are squared upright-pixel distances from the middle of the
/// lower screen edge; band `i` ends at `distances[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectionAreas {
    lower_edge: GuiPoint,
    distances: Vec<i64>,
}

impl ProjectionAreas {
    /// Band limits for the current camera; empty on a flat map
    pub fn compute(ctx: &ProjectionContext, areas: usize) -> Self {
        if !ctx.is_3d() {
            return Self::default();
        }
        let upright = |p: GuiPoint| ctx.counter_rotate(ctx.unproject(p));
        let (width, height) = (ctx.width(), ctx.height());
        let areas = areas.max(1);
        let lower_edge = upright(GuiPoint::new(width / 2, height));

        let distances = (0..areas - 1)
            .map(|i| {
                let y = height / areas as i32 * (areas - 1 - i) as i32;
                ctx.screen_distance_sq(upright(GuiPoint::new(width / 2, y)), lower_edge)
            })
            .collect();
        Self { lower_edge, distances }
    }

    pub fn lower_edge(&self) -> GuiPoint {
        self.lower_edge
    }

    /// Band of an upright point, bounded by the number of pens available
    pub fn pick(&self, ctx: &ProjectionContext, point: GuiPoint, pen_count: usize) -> usize {
        let last = pen_count.saturating_sub(1);
        let distance = ctx.screen_distance_sq(point, self.lower_edge);
        for (area, &limit) in self.distances.iter().enumerate() {
            if area >= last || distance < limit {
                return area.min(last);
            }
        }
        self.distances.len().min(last)
    }
}

pub struct DrawBatch {
    capacity: usize,
    /// Point count of each committed polyline
    objects: Vec<usize>,
    /// Committed polylines followed by the one being built
    points: Vec<GuiPoint>,
    committed: usize,
    dots: Vec<GuiPoint>,
    rings: Vec<usize>,
    ring_points: Vec<GuiPoint>,
    /// False for vertices inserted by clipping
    real: Vec<bool>,
    /// Pen stroking the real edges of the queued rings
    outline: Option<Pen>,
    last_pen: Option<Pen>,
    texture: Texture,
    areas: ProjectionAreas,
    truncated: bool,
}

impl DrawBatch {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(4);
        Self {
            capacity,
            objects: Vec::with_capacity(capacity),
            points: Vec::with_capacity(capacity),
            committed: 0,
            dots: Vec::with_capacity(capacity),
            rings: Vec::new(),
            ring_points: Vec::with_capacity(capacity),
            real: Vec::with_capacity(capacity),
            outline: None,
            last_pen: None,
            texture: Texture::NONE,
            areas: ProjectionAreas::default(),
            truncated: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free line slots left before a flush is needed
    pub fn line_room(&self) -> usize {
        self.capacity - self.points.len()
    }

    pub fn state(&self) -> BatchState {
        if self.points.is_empty() && self.dots.is_empty() && self.ring_points.is_empty() {
            BatchState::Empty
        } else {
            BatchState::Accumulating
        }
    }

    pub fn last_pen(&self) -> Option<Pen> {
        self.last_pen
    }

    /// Forget which pen the canvas holds, so the next point selects its own
    pub fn reset_pen(&mut self) {
        self.last_pen = None;
    }

    /// Make `pen` current. Lines, dots and polygons queued under the old
    /// pen are drawn with it first.
    pub fn select_pen(&mut self, out: &mut Target<'_>, pen: Pen) {
        if self.last_pen == Some(pen) {
            return;
        }
        self.commit();
        self.flush_all(out);
        self.flush_polygons(out);
        out.canvas.select_pen(pen);
        self.last_pen = Some(pen);
    }

    pub fn set_projection_areas(&mut self, areas: ProjectionAreas) {
        self.areas = areas;
    }

    pub fn projection_areas(&self) -> &ProjectionAreas {
        &self.areas
    }

    #[inline]
    fn pick_pen(&self, ctx: &ProjectionContext, point: GuiPoint, pens: &[Option<Pen>]) -> Option<Pen> {
        if pens.is_empty() {
            return None;
        }
        let area = if ctx.is_3d() {
            self.areas.pick(ctx, point, pens.len())
        } else {
            0
        };
        pens[area]
    }

    /// Make room for a line of `needed` points, flushing early if it would
    /// not fit. Returns how many points the line may use; less than
    /// `needed` when a single line is larger than the whole batch.
    pub fn reserve(&mut self, out: &mut Target<'_>, needed: usize) -> usize {
        if needed >= self.line_room() {
            self.flush_lines(out);
        }
        if needed >= self.capacity {
            log::error!("cannot show all shape points ({} entries needed)", needed);
            return self.capacity - 1;
        }
        needed
    }

    fn push_line_point(&mut self, out: &mut Target<'_>, point: GuiPoint) {
        if self.points.len() >= self.capacity {
            self.flush_lines(out);
            if self.points.len() >= self.capacity {
                if !self.truncated {
                    log::error!("polyline longer than the batch ({} points), truncated", self.capacity);
                    self.truncated = true;
                }
                return;
            }
        }
        self.points.push(point);
    }

    /// Close the polyline being built. A single dangling point is dropped.
    fn commit(&mut self) {
        let pending = self.points.len() - self.committed;
        if self.last_pen.is_some() && pending > 1 {
            self.objects.push(pending);
            self.committed = self.points.len();
        } else {
            self.points.truncate(self.committed);
        }
        self.truncated = false;
    }

    /// Adopt a new pen or texture. Everything drawn with the old one is
    /// flushed before the new pen is selected.
    fn switch(&mut self, out: &mut Target<'_>, pen: Option<Pen>, texture: Texture) {
        if self.last_pen != pen {
            self.flush_lines(out);
            self.flush_points(out);
            if let Some(pen) = pen {
                out.canvas.select_pen(pen);
            }
            self.last_pen = pen;
            self.texture = texture;
        } else if self.texture != texture {
            self.flush_lines(out);
            self.texture = texture;
        }
    }

    /// Feed one vertex. The pen is picked from `pens` by projection area
    /// (always `pens[0]` on a flat map).
    pub fn add(&mut self, out: &mut Target<'_>, vertex: Vertex, pens: &[Option<Pen>], texture: Texture) {
        let pen = match vertex.point() {
            Some(point) => self.pick_pen(out.ctx, point, pens),
            None => self.last_pen,
        };

        if let Vertex::Dot(point) = vertex {
            if pen.is_none() {
                return;
            }
            if self.last_pen != pen || self.texture != texture {
                self.commit();
                self.switch(out, pen, texture);
            }
            if self.dots.len() >= self.capacity {
                self.flush_points(out);
            }
            self.dots.push(point);
            return;
        }

        if let Some(point) = vertex.point() {
            self.push_line_point(out, point);
        }

        let end = matches!(vertex, Vertex::End(_) | Vertex::Finish);
        if self.last_pen != pen || self.texture != texture || end {
            self.commit();
            self.switch(out, pen, texture);
            // the new polyline starts where the old one stopped
            if let Vertex::Start(point) | Vertex::Next(point) = vertex {
                self.push_line_point(out, point);
            }
        }
    }

    /// Draw every committed polyline. The polyline still being built is
    /// kept, moved to the front of the buffer.
    pub fn flush_lines(&mut self, out: &mut Target<'_>) {
        if self.objects.is_empty() {
            return;
        }
        assert!(
            self.points.len() <= self.capacity && self.committed <= self.points.len(),
            "line batch overrun: {} points for {} slots",
            self.points.len(),
            self.capacity
        );

        let committed = self.committed;
        out.ctx.rotate_and_project(&mut self.points[..committed]);
        let fast = out.ctx.is_fast_refresh();
        if self.texture.image.is_some() {
            out.canvas.draw_textured_lines(&self.objects, &self.points[..committed], fast, self.texture);
        } else {
            out.canvas.draw_lines(&self.objects, &self.points[..committed], fast);
        }

        self.points.drain(..committed);
        self.committed = 0;
        self.objects.clear();
    }

    pub fn flush_points(&mut self, out: &mut Target<'_>) {
        if self.dots.is_empty() {
            return;
        }
        out.ctx.rotate_and_project(&mut self.dots);
        out.canvas.draw_points(&self.dots);
        self.dots.clear();
    }

    pub fn flush_all(&mut self, out: &mut Target<'_>) {
        self.flush_lines(out);
        self.flush_points(out);
    }

    /// Queue a closed polygon ring with the per-vertex real flags. Its real
    /// edges are stroked with `outline` when the queue is flushed.
    pub fn add_polygon(&mut self, out: &mut Target<'_>, ring: &[GuiPoint], real: &[bool], outline: Option<Pen>) {
        if self.outline != outline || ring.len() > self.capacity - self.ring_points.len() {
            self.flush_polygons(out);
        }
        self.outline = outline;
        let mut count = ring.len();
        if count > self.capacity {
            log::error!("polygon with {} points does not fit the batch, truncated", count);
            count = self.capacity;
        }
        self.ring_points.extend_from_slice(&ring[..count]);
        self.real
            .extend((0..count).map(|i| real.get(i).copied().unwrap_or(true)));
        self.rings.push(count);
    }

    /// Fill the queued polygons with the current pen. When they were queued
    /// with an outline pen, the real edges of each ring are stroked on top;
    /// edges created by clipping (axis-aligned, between two synthetic
    /// vertices) are not.
    pub fn flush_polygons(&mut self, out: &mut Target<'_>) {
        if self.rings.is_empty() {
            return;
        }
        let outline = self.outline;

        if outline.is_some() {
            let mut pos = 0;
            for &count in &self.rings {
                for _ in 1..count {
                    let (a, b) = (self.ring_points[pos], self.ring_points[pos + 1]);
                    self.real[pos] = self.real[pos] || self.real[pos + 1] || (a.x != b.x && a.y != b.y);
                    pos += 1;
                }
                pos += 1;
            }
        }

        out.ctx.rotate_and_project(&mut self.ring_points);
        let fast = out.ctx.is_fast_refresh();
        out.canvas.draw_polygons(&self.rings, &self.ring_points, true, fast);

        if let Some(outline) = outline {
            out.canvas.select_pen(outline);
            let mut pos = 0;
            for &count in &self.rings {
                let mut run = 1;
                for _ in 1..count {
                    if self.real[pos] {
                        run += 1;
                    } else if run > 1 {
                        out.canvas.draw_lines(&[run], &self.ring_points[pos + 1 - run..pos + 1], fast);
                        run = 1;
                    }
                    pos += 1;
                }
                if run > 1 {
                    out.canvas.draw_lines(&[run], &self.ring_points[pos + 1 - run..pos + 1], fast);
                }
                pos += 1;
            }
            if let Some(old) = self.last_pen {
                out.canvas.select_pen(old);
            }
        }

        self.rings.clear();
        self.ring_points.clear();
        self.real.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::canvas::testing::{Call, Recorder};
    use crate::map::test_support::ctx;

    const P1: Pen = Pen(1);
    const P2: Pen = Pen(2);

    fn pt(x: i32, y: i32) -> GuiPoint {
        GuiPoint::new(x, y)
    }

    #[test]
    fn test_constant_pen_keeps_every_point() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(64);
        let pens = [Some(P1)];

        assert_eq!(batch.state(), BatchState::Empty);
        batch.add(&mut out, Vertex::Start(pt(0, 0)), &pens, Texture::NONE);
        batch.add(&mut out, Vertex::Next(pt(5, 0)), &pens, Texture::NONE);
        batch.add(&mut out, Vertex::End(pt(5, 5)), &pens, Texture::NONE);
        // a lone start is not a line
        batch.add(&mut out, Vertex::Start(pt(9, 9)), &pens, Texture::NONE);
        batch.add(&mut out, Vertex::Finish, &pens, Texture::NONE);
        batch.add(&mut out, Vertex::Start(pt(1, 1)), &pens, Texture::NONE);
        batch.add(&mut out, Vertex::End(pt(2, 2)), &pens, Texture::NONE);
        assert_eq!(batch.state(), BatchState::Accumulating);
        batch.flush_all(&mut out);
        assert_eq!(batch.state(), BatchState::Empty);

        assert_eq!(
            canvas.calls,
            vec![
                Call::SelectPen(P1),
                Call::Lines(vec![3, 2], vec![pt(0, 0), pt(5, 0), pt(5, 5), pt(1, 1), pt(2, 2)]),
            ]
        );
    }

    #[test]
    fn test_pen_change_flushes_before_select() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(64);

        batch.add(&mut out, Vertex::Start(pt(0, 0)), &[Some(P1)], Texture::NONE);
        batch.add(&mut out, Vertex::End(pt(1, 0)), &[Some(P1)], Texture::NONE);
        batch.add(&mut out, Vertex::Dot(pt(7, 7)), &[Some(P1)], Texture::NONE);
        batch.add(&mut out, Vertex::Start(pt(2, 0)), &[Some(P2)], Texture::NONE);
        batch.add(&mut out, Vertex::End(pt(3, 0)), &[Some(P2)], Texture::NONE);
        batch.flush_all(&mut out);

        assert_eq!(
            canvas.calls,
            vec![
                Call::SelectPen(P1),
                Call::Lines(vec![2], vec![pt(0, 0), pt(1, 0)]),
                Call::Points(vec![pt(7, 7)]),
                Call::SelectPen(P2),
                Call::Lines(vec![2], vec![pt(2, 0), pt(3, 0)]),
            ]
        );
    }

    #[test]
    fn test_pen_change_mid_line_splits_it() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(64);

        batch.add(&mut out, Vertex::Start(pt(0, 0)), &[Some(P1)], Texture::NONE);
        batch.add(&mut out, Vertex::Next(pt(4, 0)), &[Some(P1)], Texture::NONE);
        batch.add(&mut out, Vertex::Next(pt(8, 0)), &[Some(P2)], Texture::NONE);
        batch.add(&mut out, Vertex::End(pt(8, 4)), &[Some(P2)], Texture::NONE);
        batch.flush_all(&mut out);

        assert_eq!(
            canvas.polylines(),
            vec![vec![pt(0, 0), pt(4, 0), pt(8, 0)], vec![pt(8, 0), pt(8, 4)]]
        );
        assert_eq!(canvas.pens(), vec![P1, P2]);
    }

    #[test]
    fn test_dot_with_new_pen_is_drawn_with_it() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(64);

        batch.add(&mut out, Vertex::Dot(pt(1, 1)), &[Some(P1)], Texture::NONE);
        batch.add(&mut out, Vertex::Dot(pt(2, 2)), &[Some(P2)], Texture::NONE);
        batch.add(&mut out, Vertex::Dot(pt(3, 3)), &[None], Texture::NONE);
        batch.flush_all(&mut out);

        assert_eq!(
            canvas.calls,
            vec![
                Call::SelectPen(P1),
                Call::Points(vec![pt(1, 1)]),
                Call::SelectPen(P2),
                Call::Points(vec![pt(2, 2)]),
            ]
        );
    }

    #[test]
    fn test_flush_keeps_line_in_progress() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(64);
        let pens = [Some(P1)];

        batch.add(&mut out, Vertex::Start(pt(0, 0)), &pens, Texture::NONE);
        batch.add(&mut out, Vertex::End(pt(1, 1)), &pens, Texture::NONE);
        batch.add(&mut out, Vertex::Start(pt(10, 0)), &pens, Texture::NONE);
        batch.add(&mut out, Vertex::Next(pt(11, 0)), &pens, Texture::NONE);
        batch.flush_lines(&mut out);
        assert_eq!(canvas.polylines(), vec![vec![pt(0, 0), pt(1, 1)]]);

        let mut out = Target::new(&ctx, &mut canvas);
        batch.add(&mut out, Vertex::End(pt(12, 0)), &pens, Texture::NONE);
        batch.flush_lines(&mut out);
        assert_eq!(canvas.polylines()[1], vec![pt(10, 0), pt(11, 0), pt(12, 0)]);
    }

    #[test]
    fn test_texture_change_flushes_lines_only() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(64);
        let pens = [Some(P1)];
        let arrows = Texture { image: Some(ImageId(3)), opposite: true };

        batch.add(&mut out, Vertex::Start(pt(0, 0)), &pens, Texture::NONE);
        batch.add(&mut out, Vertex::End(pt(1, 0)), &pens, Texture::NONE);
        batch.add(&mut out, Vertex::Start(pt(2, 0)), &pens, arrows);
        batch.add(&mut out, Vertex::End(pt(3, 0)), &pens, arrows);
        batch.flush_all(&mut out);

        assert_eq!(
            canvas.calls,
            vec![
                Call::SelectPen(P1),
                Call::Lines(vec![2], vec![pt(0, 0), pt(1, 0)]),
                Call::TexturedLines(vec![2], vec![pt(2, 0), pt(3, 0)], arrows),
            ]
        );
    }

    #[test]
    fn test_long_line_is_truncated() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(16);
        let pens = [Some(P1)];

        batch.add(&mut out, Vertex::Start(pt(0, 0)), &pens, Texture::NONE);
        for x in 1..40 {
            batch.add(&mut out, Vertex::Next(pt(x, 0)), &pens, Texture::NONE);
        }
        batch.add(&mut out, Vertex::Finish, &pens, Texture::NONE);
        batch.flush_all(&mut out);

        let lines = canvas.polylines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 16);
        assert_eq!(lines[0][15], pt(15, 0));
    }

    #[test]
    fn test_capacity_forces_early_flush() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(16);
        let pens = [Some(P1)];

        for i in 0..20 {
            batch.add(&mut out, Vertex::Start(pt(i, 0)), &pens, Texture::NONE);
            batch.add(&mut out, Vertex::End(pt(i, 1)), &pens, Texture::NONE);
        }
        batch.flush_all(&mut out);
        let lines = canvas.polylines();
        assert_eq!(lines.len(), 20);
        assert!(lines.iter().all(|l| l.len() == 2));
        assert_eq!(lines[19], vec![pt(19, 0), pt(19, 1)]);
    }

    #[test]
    fn test_reserve() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(16);
        let pens = [Some(P1)];

        for i in 0..5 {
            batch.add(&mut out, Vertex::Start(pt(i, 0)), &pens, Texture::NONE);
            batch.add(&mut out, Vertex::End(pt(i, 1)), &pens, Texture::NONE);
        }
        assert_eq!(batch.line_room(), 6);
        assert_eq!(batch.reserve(&mut out, 8), 8);
        assert_eq!(batch.line_room(), 16);
        assert_eq!(batch.reserve(&mut out, 40), 15);
    }

    #[test]
    fn test_lines_are_rotated_at_flush() {
        let mut ctx = ctx(400, 400);
        ctx.set_orientation(90);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(16);
        let pens = [Some(P1)];

        batch.add(&mut out, Vertex::Start(pt(200, 200)), &pens, Texture::NONE);
        batch.add(&mut out, Vertex::End(pt(200, 100)), &pens, Texture::NONE);
        batch.flush_all(&mut out);
        assert_eq!(canvas.line_points(), vec![pt(200, 200), pt(300, 200)]);
    }

    #[test]
    fn test_polygon_outline_skips_clipped_edges() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(64);
        batch.select_pen(&mut out, P1);

        // a triangle cut by a square edge at x = 10: (10,0) and (10,10)
        // were inserted by clipping, the edge between them is synthetic
        let ring = [pt(0, 0), pt(10, 0), pt(10, 10), pt(0, 10), pt(0, 0)];
        let real = [true, false, false, true, true];
        batch.add_polygon(&mut out, &ring, &real, Some(P2));
        batch.flush_polygons(&mut out);

        assert_eq!(
            canvas.calls,
            vec![
                Call::SelectPen(P1),
                Call::Polygons(vec![5], ring.to_vec(), true),
                Call::SelectPen(P2),
                Call::Lines(vec![2], vec![pt(0, 0), pt(10, 0)]),
                Call::Lines(vec![3], vec![pt(10, 10), pt(0, 10), pt(0, 0)]),
                Call::SelectPen(P1),
            ]
        );
    }

    #[test]
    fn test_select_pen_draws_pending_dots_first() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(64);

        batch.select_pen(&mut out, P1);
        batch.add(&mut out, Vertex::Start(pt(0, 0)), &[Some(P1)], Texture::NONE);
        batch.add(&mut out, Vertex::End(pt(4, 0)), &[Some(P1)], Texture::NONE);
        batch.add(&mut out, Vertex::Dot(pt(9, 9)), &[Some(P1)], Texture::NONE);
        batch.select_pen(&mut out, P2);
        // same pen again is a no-op
        batch.select_pen(&mut out, P2);
        batch.flush_all(&mut out);

        assert_eq!(
            canvas.calls,
            vec![
                Call::SelectPen(P1),
                Call::Lines(vec![2], vec![pt(0, 0), pt(4, 0)]),
                Call::Points(vec![pt(9, 9)]),
                Call::SelectPen(P2),
            ]
        );
    }

    #[test]
    fn test_polygon_overflow_keeps_outline() {
        let ctx = ctx(400, 400);
        let mut canvas = Recorder::new();
        let mut out = Target::new(&ctx, &mut canvas);
        let mut batch = DrawBatch::new(12);
        batch.select_pen(&mut out, P1);

        let square = |x: i32| [pt(x, 0), pt(x + 5, 0), pt(x + 5, 5), pt(x, 5), pt(x, 0)];
        let real = [true; 5];
        // the third ring does not fit and forces an early flush
        for x in [0, 10, 20] {
            batch.add_polygon(&mut out, &square(x), &real, Some(P2));
        }
        batch.flush_polygons(&mut out);

        let fills = canvas.calls.iter().filter(|c| matches!(c, Call::Polygons(..))).count();
        assert_eq!(fills, 2);
        let outlined: Vec<Vec<GuiPoint>> = canvas.polylines();
        assert_eq!(outlined, vec![square(0).to_vec(), square(10).to_vec(), square(20).to_vec()]);
        assert_eq!(canvas.pens(), vec![P1, P2, P1, P2, P1]);
    }

    #[test]
    fn test_projection_areas() {
        let mut ctx = ctx(400, 400);
        assert_eq!(ProjectionAreas::compute(&ctx, 3), ProjectionAreas::default());

        ctx.set_horizon(-100);
        let areas = ProjectionAreas::compute(&ctx, 3);
        assert_eq!(areas.lower_edge(), pt(200, 400));
        assert_eq!(areas.distances.len(), 2);
        assert!(areas.distances[0] < areas.distances[1]);

        assert_eq!(areas.pick(&ctx, pt(200, 399), 3), 0);
        assert_eq!(areas.pick(&ctx, pt(200, -5000), 3), 2);
        // never beyond the pens given
        assert_eq!(areas.pick(&ctx, pt(200, -5000), 1), 0);
    }
}
