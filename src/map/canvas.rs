use crate::geo::GuiPoint;
use crate::map::batch::Texture;
use crate::style::Pen;

/// Drawing backend fed by the batcher.
///
/// Points are final screen pixels: rotation and perspective have already
/// been applied. `counts` splits `points` into consecutive polylines or
/// polygon rings.
pub trait Canvas {
    fn select_pen(&mut self, pen: Pen);

    fn draw_lines(&mut self, counts: &[usize], points: &[GuiPoint], fast: bool);

    /// Lines drawn with an image along them. Backends without textures
    /// draw plain lines.
    fn draw_textured_lines(&mut self, counts: &[usize], points: &[GuiPoint], fast: bool, texture: Texture) {
        let _ = texture;
        self.draw_lines(counts, points, fast);
    }

    fn draw_points(&mut self, points: &[GuiPoint]);

    fn draw_polygons(&mut self, counts: &[usize], points: &[GuiPoint], filled: bool, fast: bool);

    fn erase(&mut self);
}
