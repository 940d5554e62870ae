//! The per-frame software rendering pipeline.
//!
//! [`render_frame`] is a pure function of the scene, the view transform, the
//! viewport size and the [`RenderFlags`]. It owns no timer or thread; a host
//! calls it once per display tick.
//!
//! # Passes
//!
//! 1. **Fill** (if `fill`): every triangle is transformed, shaded and
//!    rasterized into a fresh ARGB color buffer with a z-buffer cleared to
//!    negative infinity. Triangles are processed in scene order.
//! 2. **Overlay** (independent of fill): every triangle is transformed again
//!    and emits an outline and/or vertex marks. Overlays are not depth tested,
//!    so occluded triangles still show their edges.
//!
//! [`Frame::composite`] draws the overlay commands on top of the fill raster.

mod framebuffer;
mod overlay;
mod rasterizer;

pub use framebuffer::{ColorBuffer, FrameBuffer};
pub use overlay::{clip_segment, draw, draw_line_bresenham, DrawCommand};
pub use rasterizer::{fill_triangle, PixelBounds, ScreenTriangle};

use crate::colors;
use crate::math::Mat4;
use crate::transform::Transform;
use crate::triangle::Triangle;

/// Independent rendering toggles. All sixteen combinations are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderFlags {
    /// Rasterize filled, depth-tested faces.
    pub fill: bool,
    /// Darken filled faces by their angle to the view axis.
    pub shade: bool,
    /// Stroke every triangle outline.
    pub edges: bool,
    /// Mark every vertex.
    pub vertices: bool,
}

impl RenderFlags {
    pub const FILLED_SHADED: Self = Self {
        fill: true,
        shade: true,
        edges: false,
        vertices: false,
    };

    pub const WIREFRAME: Self = Self {
        fill: false,
        shade: false,
        edges: true,
        vertices: false,
    };
}

/// Everything one frame needs besides the scene, passed by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFrameInputs {
    pub transform: Transform,
    pub flags: RenderFlags,
    pub width: u32,
    pub height: u32,
}

impl RenderFrameInputs {
    pub fn new(transform: Transform, flags: RenderFlags, width: u32, height: u32) -> Self {
        Self {
            transform,
            flags,
            width,
            height,
        }
    }

    /// Screen position of the model-space origin under an identity transform.
    pub fn center_offset(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub triangles: usize,
    pub pixels_written: usize,
}

/// The output of one [`render_frame`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    fill: Option<Vec<u32>>,
    overlay: Vec<DrawCommand>,
    stats: FrameStats,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The filled ARGB raster, present only when the fill flag was set.
    pub fn fill(&self) -> Option<&[u32]> {
        self.fill.as_deref()
    }

    /// Overlay commands in emission order.
    pub fn overlay(&self) -> &[DrawCommand] {
        &self.overlay
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Fill raster (or a cleared one) with the overlays drawn on top.
    pub fn composite(&self) -> Vec<u32> {
        let size = self.width as usize * self.height as usize;
        let mut color = match &self.fill {
            Some(fill) => fill.clone(),
            None => vec![colors::CLEAR; size],
        };
        let mut buffer = ColorBuffer::new(&mut color, self.width, self.height);
        for command in &self.overlay {
            overlay::draw(command, &mut buffer);
        }
        color
    }

    /// The composite as ARGB8888 bytes in native order, for texture upload.
    pub fn composite_bytes(&self) -> Vec<u8> {
        self.composite()
            .into_iter()
            .flat_map(u32::to_ne_bytes)
            .collect()
    }
}

/// Render `scene` with `inputs`.
///
/// Never fails: degenerate, NaN or off-screen geometry writes nothing.
pub fn render_frame(scene: &[Triangle], inputs: &RenderFrameInputs) -> Frame {
    let transform = inputs.transform.to_matrix();
    let offset = inputs.center_offset();
    let flags = inputs.flags;
    let mut stats = FrameStats {
        triangles: scene.len(),
        pixels_written: 0,
    };

    let fill = flags.fill.then(|| {
        let (color, pixels) = fill_pass(scene, &transform, offset, inputs);
        stats.pixels_written = pixels;
        color
    });

    let overlay = if flags.edges || flags.vertices {
        overlay_pass(scene, &transform, offset, flags)
    } else {
        Vec::new()
    };

    log::trace!(
        "rendered {} triangles, {} pixels written, {} overlay commands",
        stats.triangles,
        stats.pixels_written,
        overlay.len()
    );

    Frame {
        width: inputs.width,
        height: inputs.height,
        fill,
        overlay,
        stats,
    }
}

fn fill_pass(
    scene: &[Triangle],
    transform: &Mat4,
    offset: (f64, f64),
    inputs: &RenderFrameInputs,
) -> (Vec<u32>, usize) {
    let size = inputs.width as usize * inputs.height as usize;
    let mut color = vec![colors::CLEAR; size];
    let mut depth = vec![f64::NEG_INFINITY; size];
    let mut fb = FrameBuffer::new(&mut color, &mut depth, inputs.width, inputs.height);

    let mut written = 0;
    for triangle in scene {
        let screen = ScreenTriangle::project(triangle, transform, offset);
        let pixel = screen.fill_color(triangle, inputs.flags.shade);
        written += fill_triangle(&screen, &mut fb, pixel);
    }
    (color, written)
}

fn overlay_pass(
    scene: &[Triangle],
    transform: &Mat4,
    offset: (f64, f64),
    flags: RenderFlags,
) -> Vec<DrawCommand> {
    let per_triangle = flags.edges as usize + 3 * flags.vertices as usize;
    let mut commands = Vec::with_capacity(scene.len() * per_triangle);
    let (dx, dy) = offset;

    for triangle in scene {
        let points = triangle
            .transformed(transform)
            .map(|v| [v.x + dx, v.y + dy]);

        if flags.edges {
            commands.push(DrawCommand::Outline {
                points,
                color: colors::EDGE,
            });
        }
        if flags.vertices {
            commands.extend(points.map(|at| DrawCommand::Point {
                at,
                color: colors::VERTEX,
            }));
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Rgb;
    use crate::math::Vec4;

    fn unit_triangle(color: Rgb) -> Triangle {
        Triangle::new(
            Vec4::point(0.0, 0.0, 0.0),
            Vec4::point(1.0, 0.0, 0.0),
            Vec4::point(0.0, 1.0, 0.0),
            color,
        )
    }

    fn inputs(flags: RenderFlags, width: u32, height: u32) -> RenderFrameInputs {
        RenderFrameInputs::new(Transform::default(), flags, width, height)
    }

    fn fill_only() -> RenderFlags {
        RenderFlags {
            fill: true,
            ..RenderFlags::default()
        }
    }

    #[test]
    fn unit_triangle_fills_only_its_footprint() {
        let frame = render_frame(&[unit_triangle(Rgb::RED)], &inputs(fill_only(), 10, 10));
        let fill = frame.fill().unwrap();
        let red = Rgb::RED.to_argb();

        let covered: Vec<(usize, usize)> = (0..100)
            .filter(|&i| fill[i] != 0)
            .map(|i| (i % 10, i / 10))
            .collect();
        assert_eq!(covered, vec![(5, 5), (6, 5), (5, 6)]);
        assert!(covered.iter().all(|&(x, y)| fill[y * 10 + x] == red));
        assert_eq!(frame.stats().pixels_written, 3);
    }

    #[test]
    fn odd_viewport_centers_on_half_pixel() {
        let i = inputs(fill_only(), 11, 7);
        assert_eq!(i.center_offset(), (5.5, 3.5));
    }

    #[test]
    fn earlier_triangle_wins_equal_depth() {
        let green = Rgb::new(0, 255, 0);
        let scene = [unit_triangle(green), unit_triangle(Rgb::RED)];
        let frame = render_frame(&scene, &inputs(fill_only(), 10, 10));
        assert_eq!(frame.fill().unwrap()[5 * 10 + 5], green.to_argb());
        assert_eq!(frame.stats().pixels_written, 3);
    }

    #[test]
    fn later_nearer_triangle_overwrites() {
        let mut near = unit_triangle(Rgb::new(0, 0, 255));
        for v in [&mut near.v1, &mut near.v2, &mut near.v3] {
            v.z = 1.0;
        }
        let scene = [unit_triangle(Rgb::RED), near];
        let frame = render_frame(&scene, &inputs(fill_only(), 10, 10));
        assert_eq!(frame.fill().unwrap()[5 * 10 + 5], near.color.to_argb());
    }

    #[test]
    fn shading_darkens_tilted_faces() {
        // Normal (0, -1, 1)/sqrt(2): |n.z| = 0.707...
        let tri = Triangle::new(
            Vec4::point(-3.0, 0.0, 0.0),
            Vec4::point(3.0, 0.0, 0.0),
            Vec4::point(0.0, 3.0, 3.0),
            Rgb::new(200, 200, 200),
        );
        let flags = RenderFlags::FILLED_SHADED;
        let frame = render_frame(&[tri], &inputs(flags, 20, 20));
        let pixel = frame.fill().unwrap()[11 * 20 + 10];
        let expected = colors::shade(tri.color, std::f64::consts::FRAC_1_SQRT_2);
        assert_eq!(Rgb::from_packed(pixel), expected);
        assert!(expected.r < 200);
    }

    #[test]
    fn no_fill_means_no_raster() {
        let frame = render_frame(&[unit_triangle(Rgb::RED)], &inputs(RenderFlags::WIREFRAME, 10, 10));
        assert!(frame.fill().is_none());
        assert_eq!(frame.overlay().len(), 1);
    }

    #[test]
    fn overlays_draw_without_fill() {
        let flags = RenderFlags {
            edges: true,
            vertices: true,
            ..RenderFlags::default()
        };
        let tri = Triangle::new(
            Vec4::point(-3.0, -3.0, 0.0),
            Vec4::point(3.0, -3.0, 0.0),
            Vec4::point(-3.0, 3.0, 0.0),
            Rgb::RED,
        );
        let frame = render_frame(&[tri], &inputs(flags, 10, 10));
        assert_eq!(
            frame.overlay()[0],
            DrawCommand::Outline {
                points: [[2.0, 2.0], [8.0, 2.0], [2.0, 8.0]],
                color: colors::EDGE,
            }
        );
        assert_eq!(frame.overlay().len(), 4);

        let composite = frame.composite();
        assert_eq!(composite[2 * 10 + 5], colors::EDGE.to_argb());
        assert_eq!(composite[2 * 10 + 2], colors::VERTEX.to_argb());
        assert_eq!(composite[3 * 10 + 3], colors::CLEAR);
    }

    #[test]
    fn overlays_ignore_occlusion() {
        let mut far = unit_triangle(Rgb::RED);
        far.v1 = Vec4::point(-2.0, -2.0, -10.0);
        far.v2 = Vec4::point(2.0, -2.0, -10.0);
        far.v3 = Vec4::point(-2.0, 2.0, -10.0);
        let near = Triangle::new(
            Vec4::point(-4.0, -4.0, 10.0),
            Vec4::point(4.0, -4.0, 10.0),
            Vec4::point(-4.0, 4.0, 10.0),
            Rgb::new(0, 0, 255),
        );
        let flags = RenderFlags {
            fill: true,
            edges: true,
            ..RenderFlags::default()
        };
        let frame = render_frame(&[near, far], &inputs(flags, 20, 20));
        // Far triangle's top edge runs along y = 8 from x = 8..12, inside the near fill.
        let composite = frame.composite();
        assert_eq!(composite[8 * 20 + 9], colors::EDGE.to_argb());
        assert_eq!(frame.fill().unwrap()[8 * 20 + 9], near.color.to_argb());
    }

    #[test]
    fn empty_scene_renders_clear_frame() {
        let frame = render_frame(&[], &inputs(RenderFlags::FILLED_SHADED, 4, 4));
        assert!(frame.composite().iter().all(|&c| c == colors::CLEAR));
        assert_eq!(frame.stats(), FrameStats::default());
    }

    #[test]
    fn zero_sized_viewport_is_total() {
        let flags = RenderFlags {
            fill: true,
            shade: true,
            edges: true,
            vertices: true,
        };
        let frame = render_frame(&[unit_triangle(Rgb::RED)], &inputs(flags, 0, 0));
        assert!(frame.composite().is_empty());
    }

    #[test]
    fn translation_moves_footprint() {
        let mut transform = Transform::new();
        transform.set_translation(2.0, -1.0, 0.0);
        let i = RenderFrameInputs::new(transform, fill_only(), 10, 10);
        let frame = render_frame(&[unit_triangle(Rgb::RED)], &i);
        let fill = frame.fill().unwrap();
        assert_ne!(fill[4 * 10 + 7], 0);
        assert_eq!(fill[5 * 10 + 5], 0);
    }
}
