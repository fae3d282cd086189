use crate::braille::BrailleCanvas;
use crate::geo::GuiPoint;

/// Polygon interior pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    Solid,
    /// Every other dot, so lines drawn over the area stay readable
    Stipple,
}

/// Cut a segment to the canvas (plus a one pixel border) so Bresenham
/// never walks far off screen. Liang-Barsky.
fn clip_to_canvas(canvas: &BrailleCanvas, from: GuiPoint, to: GuiPoint) -> Option<(GuiPoint, GuiPoint)> {
    let (x0, y0) = (from.x as f64, from.y as f64);
    let (dx, dy) = (to.x as f64 - x0, to.y as f64 - y0);
    let (xmin, ymin) = (-1.0, -1.0);
    let (xmax, ymax) = (canvas.pixel_width() as f64, canvas.pixel_height() as f64);

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, x0 - xmin), (dx, xmax - x0), (-dy, y0 - ymin), (dy, ymax - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }

    let at = |t: f64| GuiPoint::new((x0 + t * dx).round() as i32, (y0 + t * dy).round() as i32);
    Some((if t0 > 0.0 { at(t0) } else { from }, if t1 < 1.0 { at(t1) } else { to }))
}

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, from: GuiPoint, to: GuiPoint) {
    let Some((from, to)) = clip_to_canvas(canvas, from, to) else {
        return;
    };
    let (x0, y0, x1, y1) = (from.x, from.y, to.x, to.y);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a line `stroke` dots wide, offset across its main direction
pub fn draw_thick_line(canvas: &mut BrailleCanvas, from: GuiPoint, to: GuiPoint, stroke: i32) {
    let d = to - from;
    let across = if d.x.abs() >= d.y.abs() { GuiPoint::new(0, 1) } else { GuiPoint::new(1, 0) };
    let first = -(stroke - 1) / 2;
    for i in first..first + stroke.max(1) {
        draw_line(canvas, from + across * i, to + across * i);
    }
}

/// Draw a filled dot of the given radius
pub fn draw_dot(canvas: &mut BrailleCanvas, center: GuiPoint, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(center.x + dx, center.y + dy);
            }
        }
    }
}

/// Scanline fill of a closed ring (the closing point may be repeated)
pub fn fill_polygon(canvas: &mut BrailleCanvas, ring: &[GuiPoint], fill: Fill) {
    if ring.len() < 3 {
        return;
    }

    let min_y = ring.iter().map(|p| p.y).min().unwrap_or(0).max(0);
    let max_y = ring.iter().map(|p| p.y).max().unwrap_or(0).min(canvas.pixel_height() - 1);
    let max_x = canvas.pixel_width() - 1;

    // Preallocate intersection buffer (reused per scanline)
    let mut intersections = Vec::with_capacity(ring.len());
    let n = ring.len();

    for y in min_y..=max_y {
        intersections.clear();
        let yf = y as f64 + 0.5;

        for i in 0..n {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            let (y1, y2) = (a.y as f64, b.y as f64);
            if (y1 <= yf && y2 > yf) || (y2 <= yf && y1 > yf) {
                let x = a.x as f64 + (yf - y1) / (y2 - y1) * (b.x as f64 - a.x as f64);
                intersections.push(x as i32);
            }
        }

        intersections.sort_unstable();
        for pair in intersections.chunks_exact(2) {
            for x in pair[0].max(0)..=pair[1].min(max_x) {
                if fill == Fill::Solid || (x + y) % 2 == 0 {
                    canvas.set_pixel_signed(x, y);
                }
            }
        }
    }
}
