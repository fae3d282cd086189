//! Area pass: the polygons of one square, filled with their layer pen and
//! outlined with the layer's second tier.

use crate::geo::{Area, GeoPosition, GuiPoint};
use crate::map::batch::{DrawBatch, Target};
use crate::map::renderer::MapLabel;
use crate::map::spatial::{TileId, TileIndex};
use crate::style::{Pen, PenSource};

/// Polygons whose screen box is smaller than this in both directions are
/// not drawn
const MIN_POLYGON_PIXELS: i32 = 5;

/// Draw the area polygons of `tile`. Returns the number of polygons drawn.
pub fn draw_polygons<M, P>(
    batch: &mut DrawBatch,
    out: &mut Target<'_>,
    map: &M,
    tile: TileId,
    style: &P,
    mut labels: Option<&mut Vec<MapLabel>>,
) -> usize
where
    M: TileIndex + ?Sized,
    P: PenSource + ?Sized,
{
    let ctx = out.ctx;
    let scale = ctx.display_scale();
    let width = ctx.width() as i64;
    let mut ring = Vec::new();
    let mut real = Vec::new();
    let mut drawn = 0;

    for polygon in map.polygons_in_tile(tile).iter().rev() {
        if !style.layer_visible(polygon.layer, scale) {
            continue;
        }
        let Some(pen) = style.pen_for_layer(polygon.layer, 0, 0) else {
            continue;
        };
        batch.select_pen(out, pen);

        if !ctx.area_visible(&polygon.edges) {
            continue;
        }
        let upper_left = ctx.geo_to_screen(&GeoPosition::new(polygon.edges.west, polygon.edges.north));
        let lower_right = ctx.geo_to_screen(&GeoPosition::new(polygon.edges.east, polygon.edges.south));
        if (lower_right.x - upper_left.x).abs() < MIN_POLYGON_PIXELS
            && (lower_right.y - upper_left.y).abs() < MIN_POLYGON_PIXELS
        {
            continue;
        }

        ring.clear();
        real.clear();
        for (pos, &is_real) in polygon.points.iter().zip(&polygon.real) {
            let point = ctx.geo_to_screen(pos);
            if ring.last() != Some(&point) {
                ring.push(point);
                real.push(is_real);
            }
        }
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
            real.pop();
        }
        if ring.len() < 3 {
            continue;
        }
        ring.push(ring[0]);
        real.push(real[0]);

        batch.add_polygon(out, &ring, &real, style.pen_for_layer(polygon.layer, 1, 0));
        batch.flush_polygons(out);
        drawn += 1;

        let Some(labels) = labels.as_deref_mut() else {
            continue;
        };
        let Some(name) = polygon.name.as_deref() else {
            continue;
        };
        let size = ctx.screen_distance_sq(upper_left, lower_right);
        if !ctx.is_fast_refresh() && size < (width * width) << 2 && style.label_visible(polygon.layer, scale) {
            let mut center = [(upper_left + lower_right) / 2];
            ctx.rotate_and_project(&mut center);
            labels.push(MapLabel {
                text: name.to_string(),
                position: center[0],
                pen,
                length_sq: size,
            });
        }
    }

    batch.flush_polygons(out);
    drawn
}

/// Outline of a square's data bounds, drawn with the edges pen
pub fn draw_square_edges(batch: &mut DrawBatch, out: &mut Target<'_>, edges: &Area, pen: Pen) {
    batch.flush_all(out);

    let ctx = out.ctx;
    let top_left = ctx.geo_to_screen(&GeoPosition::new(edges.west, edges.north));
    let top_right = ctx.geo_to_screen(&GeoPosition::new(edges.east, edges.north));
    let bottom_right = ctx.geo_to_screen(&GeoPosition::new(edges.east, edges.south));
    let bottom_left = ctx.geo_to_screen(&GeoPosition::new(edges.west, edges.south));

    // the first edge is repeated so thick corners join on both ends
    let mut points: [GuiPoint; 6] = [top_left, top_right, bottom_right, bottom_left, top_left, top_right];
    ctx.rotate_and_project(&mut points);

    out.canvas.select_pen(pen);
    out.canvas.draw_lines(&[points.len()], &points, ctx.is_fast_refresh());
    batch.reset_pen();
}
