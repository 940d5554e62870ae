//! Bounding-box triangle rasterization with barycentric coordinates.
//!
//! # Algorithm Overview
//!
//! For each triangle:
//! 1. Compute the integer bounding box (`ceil` of the minimum, `floor` of the
//!    maximum) clamped to the buffer
//! 2. For each pixel in the box, compute the three barycentric weights from
//!    edge-function ratios over the doubled signed area
//! 3. A pixel is covered when every weight lies in the closed interval [0, 1]
//! 4. Depth is interpolated from the vertex `z` values and z-tested
//!
//! # Barycentric Weights
//!
//! ```text
//! area = (v1.y - v3.y)(v2.x - v3.x) + (v2.y - v3.y)(v3.x - v1.x)
//! b1   = ((y - v3.y)(v2.x - v3.x) + (v2.y - v3.y)(v3.x - x)) / area
//! b2   = ((y - v1.y)(v3.x - v1.x) + (v3.y - v1.y)(v1.x - x)) / area
//! b3   = ((y - v2.y)(v1.x - v2.x) + (v1.y - v2.y)(v2.x - x)) / area
//! ```
//!
//! Samples are taken at integer pixel coordinates, not pixel centers.
//!
//! # Edge Cases
//!
//! The closed interval means a pixel exactly on an edge shared by two
//! triangles is covered by both; the depth test then keeps the first. A
//! zero-area triangle divides by zero, producing infinite or NaN weights that
//! fail the interval test, so nothing is written. There is no backface
//! culling: winding only flips the sign of `area`, which cancels out.

use super::framebuffer::FrameBuffer;
use crate::colors;
use crate::math::{Mat4, Vec4};
use crate::triangle::Triangle;

/// A triangle transformed into screen space, ready to fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenTriangle {
    /// Transformed vertices with x/y shifted by the viewport center.
    pub points: [Vec4; 3],
    /// `|n.z|` of the unit face normal: the unsigned cosine between the face
    /// and the view axis. NaN for a degenerate face.
    pub intensity: f64,
}

impl ScreenTriangle {
    /// Transform `triangle` and move it into screen space.
    ///
    /// The face normal is taken from the transformed vertices before the
    /// center offset is applied; the offset only touches x and y.
    pub fn project(triangle: &Triangle, transform: &Mat4, offset: (f64, f64)) -> Self {
        let [v1, v2, v3] = triangle.transformed(transform);

        let normal = (v2 - v1).to_vec3().cross((v3 - v1).to_vec3()).normalize();
        let intensity = normal.z.abs();

        let (dx, dy) = offset;
        Self {
            points: [
                v1.offset_xy(dx, dy),
                v2.offset_xy(dx, dy),
                v3.offset_xy(dx, dy),
            ],
            intensity,
        }
    }

    /// The pixel color to fill with, optionally darkened by `intensity`.
    #[inline]
    pub fn fill_color(&self, triangle: &Triangle, shade: bool) -> u32 {
        if shade {
            colors::shade(triangle.color, self.intensity).to_argb()
        } else {
            triangle.color.to_argb()
        }
    }
}

/// Inclusive pixel bounds of a triangle, already clamped to a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    pub min_x: usize,
    pub max_x: usize,
    pub min_y: usize,
    pub max_y: usize,
}

impl PixelBounds {
    /// Clamped bounding box, or `None` when it is empty or not finite.
    pub fn of(points: &[Vec4; 3], width: u32, height: u32) -> Option<Self> {
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return None;
        }
        let [v1, v2, v3] = points;

        let min_x = v1.x.min(v2.x).min(v3.x).ceil().max(0.0);
        let max_x = v1.x.max(v2.x).max(v3.x).floor().min(width as f64 - 1.0);
        let min_y = v1.y.min(v2.y).min(v3.y).ceil().max(0.0);
        let max_y = v1.y.max(v2.y).max(v3.y).floor().min(height as f64 - 1.0);

        if min_x > max_x || min_y > max_y {
            return None;
        }

        Some(Self {
            min_x: min_x as usize,
            max_x: max_x as usize,
            min_y: min_y as usize,
            max_y: max_y as usize,
        })
    }
}

/// Fill `triangle` into `buffer` with a flat `color`, depth-tested.
///
/// Returns the number of pixels that passed the depth test.
pub fn fill_triangle(triangle: &ScreenTriangle, buffer: &mut FrameBuffer, color: u32) -> usize {
    let Some(bounds) = PixelBounds::of(&triangle.points, buffer.width(), buffer.height()) else {
        return 0;
    };
    let [v1, v2, v3] = triangle.points;

    // Doubled signed area; zero for degenerate triangles.
    let area = (v1.y - v3.y) * (v2.x - v3.x) + (v2.y - v3.y) * (v3.x - v1.x);

    let mut written = 0;
    for y in bounds.min_y..=bounds.max_y {
        let py = y as f64;
        for x in bounds.min_x..=bounds.max_x {
            let px = x as f64;

            let b1 = ((py - v3.y) * (v2.x - v3.x) + (v2.y - v3.y) * (v3.x - px)) / area;
            let b2 = ((py - v1.y) * (v3.x - v1.x) + (v3.y - v1.y) * (v1.x - px)) / area;
            let b3 = ((py - v2.y) * (v1.x - v2.x) + (v1.y - v2.y) * (v2.x - px)) / area;

            let inside = (0.0..=1.0).contains(&b1)
                && (0.0..=1.0).contains(&b2)
                && (0.0..=1.0).contains(&b3);

            if inside {
                let depth = b1 * v1.z + b2 * v2.z + b3 * v3.z;
                if buffer.set_pixel_with_depth(x, y, depth, color) {
                    written += 1;
                }
            }
        }
    }
    written
}
