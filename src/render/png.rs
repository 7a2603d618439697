//! Raster frames of a world: walls, seen cells tinted by their discoverer,
//! curved trails and agents.

use image::{ImageBuffer, Rgba, RgbaImage};

use super::palette::{BACKGROUND_RGB, GRID_LINE_RGB, WALL_RGB, agent_rgb, shade, tint};
use crate::game::{Position, TrailSegment, World};

/// Side length of one grid cell in pixels
pub const CELL_PX: u32 = 24;

/// Agent disc radius, in cells
const AGENT_RADIUS: f32 = 0.3;
/// Control-point offset per curve number, in cells
const CURVE_STEP: f32 = 0.05;
const SEEN_STRENGTH: f32 = 0.35;
const TRAIL_SHADE: f32 = 0.7;

fn rgba(rgb: [u8; 3]) -> Rgba<u8> {
    Rgba([rgb[0], rgb[1], rgb[2], 255])
}

/// Pixel centre `(x, y)` of a cell
fn cell_center(pos: Position) -> (f32, f32) {
    let cell = CELL_PX as f32;
    ((pos.col as f32 + 0.5) * cell, (pos.row as f32 + 0.5) * cell)
}

/// Cubic Bézier control points of a trail segment, in pixels
///
/// Both inner points sit at the middle of the edge, pushed sideways by
/// `0.05 × curve_no` cells so repeated crossings fan out.
pub fn trail_controls(segment: &TrailSegment) -> [(f32, f32); 4] {
    let start = cell_center(segment.old_pos);
    let end = cell_center(segment.new_pos);

    let mut shift = CURVE_STEP * segment.curve_no as f32 * CELL_PX as f32;
    if segment.old_pos < segment.new_pos {
        shift = -shift;
    }

    if segment.old_pos.row == segment.new_pos.row {
        let mid_x = (start.0 + end.0) / 2.0;
        [start, (mid_x, start.1 - shift), (mid_x, end.1 - shift), end]
    } else {
        let mid_y = (start.1 + end.1) / 2.0;
        [start, (start.0 - shift, mid_y), (end.0 - shift, mid_y), end]
    }
}

fn bezier(points: &[(f32, f32); 4], t: f32) -> (f32, f32) {
    let u = 1.0 - t;
    let w = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
    let x: f32 = points.iter().zip(w).map(|(p, w)| p.0 * w).sum();
    let y: f32 = points.iter().zip(w).map(|(p, w)| p.1 * w).sum();
    (x, y)
}

fn put(image: &mut RgbaImage, x: f32, y: f32, color: Rgba<u8>) {
    let (x, y) = (x.round(), y.round());
    if x >= 0.0 && y >= 0.0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_cell(image: &mut RgbaImage, pos: Position, color: Rgba<u8>) {
    let (x0, y0) = (pos.col as u32 * CELL_PX, pos.row as u32 * CELL_PX);
    for y in y0..y0 + CELL_PX {
        for x in x0..x0 + CELL_PX {
            image.put_pixel(x, y, color);
        }
    }
}

/// Draw the world into an image of `cols × rows` cells
pub fn render_image(world: &World) -> RgbaImage {
    let width = world.cols() as u32 * CELL_PX;
    let height = world.rows() as u32 * CELL_PX;
    let mut image = ImageBuffer::from_pixel(width, height, rgba(BACKGROUND_RGB));

    for cell in world.seen_cells() {
        fill_cell(&mut image, cell.pos, rgba(tint(agent_rgb(cell.agent_id), SEEN_STRENGTH)));
    }
    for wall in world.walls() {
        fill_cell(&mut image, wall.pos, rgba(WALL_RGB));
    }

    let line = rgba(GRID_LINE_RGB);
    for y in 0..height {
        for x in 0..width {
            if x % CELL_PX == 0 || y % CELL_PX == 0 {
                image.put_pixel(x, y, line);
            }
        }
    }

    let steps = 4 * CELL_PX;
    for segment in world.trails() {
        let color = rgba(shade(agent_rgb(segment.agent_id), TRAIL_SHADE));
        let controls = trail_controls(segment);
        for i in 0..=steps {
            let (x, y) = bezier(&controls, i as f32 / steps as f32);
            put(&mut image, x, y, color);
        }
    }

    let radius = AGENT_RADIUS * CELL_PX as f32;
    let reach = radius.ceil() as i32;
    for agent in world.agents() {
        let (cx, cy) = cell_center(agent.pos);
        let color = rgba(agent_rgb(agent.id));
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let (dx, dy) = (dx as f32, dy as f32);
                if (dx * dx + dy * dy).sqrt() <= radius {
                    put(&mut image, cx + dx, cy + dy, color);
                }
            }
        }
    }

    image
}
