//! Wireframe and vertex overlays.
//!
//! Overlays are emitted as [`DrawCommand`]s so a host can stroke them with its
//! own vector API, or have [`draw`] rasterize them onto a color buffer. They
//! are never depth tested.

use super::framebuffer::ColorBuffer;
use crate::colors::Rgb;

/// A vector draw command in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    /// Closed outline `p0 -> p1 -> p2 -> p0`.
    Outline { points: [[f64; 2]; 3], color: Rgb },
    /// A single-pixel mark.
    Point { at: [f64; 2], color: Rgb },
}

/// Rasterize one command onto `buffer`.
pub fn draw(command: &DrawCommand, buffer: &mut ColorBuffer) {
    match *command {
        DrawCommand::Outline { points, color } => {
            let color = color.to_argb();
            for i in 0..3 {
                let from = points[i];
                let to = points[(i + 1) % 3];
                draw_segment(buffer, from, to, color);
            }
        }
        DrawCommand::Point { at: [x, y], color } => {
            if x.is_finite() && y.is_finite() {
                buffer.set_pixel(x.floor() as i32, y.floor() as i32, color.to_argb());
            }
        }
    }
}

/// Clip a segment to `[0, width] x [0, height]` and stroke what is left.
fn draw_segment(buffer: &mut ColorBuffer, from: [f64; 2], to: [f64; 2], color: u32) {
    let Some(([x0, y0], [x1, y1])) =
        clip_segment(from, to, buffer.width() as f64, buffer.height() as f64)
    else {
        return;
    };
    draw_line_bresenham(
        buffer,
        x0.floor() as i32,
        y0.floor() as i32,
        x1.floor() as i32,
        y1.floor() as i32,
        color,
    );
}

/// Liang-Barsky clipping of a segment against `[0, max_x] x [0, max_y]`.
///
/// Returns `None` when the segment misses the rectangle or is not finite.
pub fn clip_segment(
    from: [f64; 2],
    to: [f64; 2],
    max_x: f64,
    max_y: f64,
) -> Option<([f64; 2], [f64; 2])> {
    if from.iter().chain(to.iter()).any(|c| !c.is_finite()) {
        return None;
    }

    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    // (p, q) per boundary: left, right, top, bottom.
    let edges = [
        (-dx, from[0]),
        (dx, max_x - from[0]),
        (-dy, from[1]),
        (dy, max_y - from[1]),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        [from[0] + t0 * dx, from[1] + t0 * dy],
        [from[0] + t1 * dx, from[1] + t1 * dy],
    ))
}

/// Draws a line between two points using Bresenham's line algorithm.
///
/// Bresenham's algorithm determines which pixels to illuminate using only
/// integer arithmetic. It tracks an "error" term: the distance between the
/// ideal line and the current pixel. For each step along the major axis it
/// decides whether to also step along the minor axis.
pub fn draw_line_bresenham(
    buffer: &mut ColorBuffer,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: u32,
) {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();

    // +1 if we're moving in the positive direction, -1 if negative.
    let x_incr_direction = if x0 < x1 { 1 } else { -1 };
    let y_incr_direction = if y0 < y1 { 1 } else { -1 };

    // A positive error favors x movement, negative favors y.
    let mut err = dx - dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        buffer.set_pixel(x, y, color);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        // Both conditions can hold, resulting in a diagonal step.
        if e2 > -dy {
            err -= dy;
            x += x_incr_direction;
        }
        if e2 < dx {
            err += dx;
            y += y_incr_direction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(width: u32, height: u32) -> Vec<u32> {
        vec![0; (width * height) as usize]
    }

    #[test]
    fn horizontal_line_covers_every_pixel() {
        let mut color = canvas(8, 1);
        let mut fb = ColorBuffer::new(&mut color, 8, 1);
        draw_line_bresenham(&mut fb, 1, 0, 6, 0, 9);
        assert_eq!(color, vec![0, 9, 9, 9, 9, 9, 9, 0]);
    }

    #[test]
    fn diagonal_line_steps_both_axes() {
        let mut color = canvas(4, 4);
        let mut fb = ColorBuffer::new(&mut color, 4, 4);
        draw_line_bresenham(&mut fb, 3, 3, 0, 0, 1);
        for i in 0..4 {
            assert_eq!(fb.get_pixel(i, i), Some(1));
        }
        assert_eq!(fb.get_pixel(1, 0), Some(0));
    }

    #[test]
    fn outline_is_closed() {
        let mut color = canvas(10, 10);
        let mut fb = ColorBuffer::new(&mut color, 10, 10);
        let command = DrawCommand::Outline {
            points: [[1.0, 1.0], [8.0, 1.0], [1.0, 8.0]],
            color: Rgb::GRAY,
        };
        draw(&command, &mut fb);
        let gray = Rgb::GRAY.to_argb();
        assert_eq!(fb.get_pixel(4, 1), Some(gray));
        assert_eq!(fb.get_pixel(1, 4), Some(gray));
        assert_eq!(fb.get_pixel(4, 5), Some(gray));
        assert_eq!(fb.get_pixel(3, 3), Some(0));
    }

    #[test]
    fn point_marks_floor_pixel() {
        let mut color = canvas(4, 4);
        let mut fb = ColorBuffer::new(&mut color, 4, 4);
        draw(
            &DrawCommand::Point {
                at: [2.7, 1.2],
                color: Rgb::WHITE,
            },
            &mut fb,
        );
        draw(
            &DrawCommand::Point {
                at: [f64::NAN, 1.0],
                color: Rgb::RED,
            },
            &mut fb,
        );
        assert_eq!(fb.get_pixel(2, 1), Some(Rgb::WHITE.to_argb()));
        assert_eq!(color.iter().filter(|&&c| c != 0).count(), 1);
    }

    #[test]
    fn clip_rejects_segments_outside() {
        assert_eq!(clip_segment([-5.0, -5.0], [-1.0, 20.0], 10.0, 10.0), None);
        assert_eq!(clip_segment([0.0, 0.0], [f64::INFINITY, 1.0], 10.0, 10.0), None);
    }

    #[test]
    fn clip_shortens_long_segments() {
        let (start, end) = clip_segment([-1.0e9, 5.0], [1.0e9, 5.0], 10.0, 10.0).unwrap();
        assert_eq!(start, [0.0, 5.0]);
        assert!((end[0] - 10.0).abs() < 1e-6);
        assert_eq!(end[1], 5.0);
    }

    #[test]
    fn clip_keeps_inside_segments() {
        let clipped = clip_segment([1.0, 2.0], [3.0, 4.0], 10.0, 10.0);
        assert_eq!(clipped, Some(([1.0, 2.0], [3.0, 4.0])));
    }
}
