//! Frame buffer abstraction for 2D pixel access.
//!
//! [`FrameBuffer`] pairs color and depth for the z-buffered fill.
//! [`ColorBuffer`] is the color-only view overlays draw onto.

/// A view into color and depth buffers.
///
/// Wraps 1D slices with width/height metadata to enable 2D pixel access.
/// This is a borrowed view, not an owning type - it's meant to be created
/// temporarily when you need to pass buffers + dimensions together.
///
/// # Depth Buffer
///
/// The depth buffer stores the interpolated post-transform `z` of the nearest
/// surface written so far. Larger values are nearer the viewer; a cleared
/// buffer holds negative infinity everywhere.
pub struct FrameBuffer<'a> {
    color_buffer: &'a mut [u32],
    depth_buffer: &'a mut [f64],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    /// Create a new FrameBuffer view from buffer slices and dimensions.
    ///
    /// # Panics
    /// Panics in debug builds if buffer lengths don't match width * height
    pub fn new(
        color_buffer: &'a mut [u32],
        depth_buffer: &'a mut [f64],
        width: u32,
        height: u32,
    ) -> Self {
        debug_assert_eq!(
            color_buffer.len(),
            width as usize * height as usize,
            "Color buffer size doesn't match dimensions"
        );
        debug_assert_eq!(
            depth_buffer.len(),
            width as usize * height as usize,
            "Depth buffer size doesn't match dimensions"
        );
        Self {
            color_buffer,
            depth_buffer,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reset every pixel to `color` and every depth to negative infinity.
    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
        self.depth_buffer.fill(f64::NEG_INFINITY);
    }

    /// Write a pixel at (x, y) if it passes the depth test.
    ///
    /// The pixel is only written if the stored depth is strictly less than
    /// `depth`, so on equal depth the earlier write wins. A NaN depth never
    /// passes. Returns whether the pixel was written.
    ///
    /// Callers clamp to the buffer before calling; coordinates are not
    /// re-checked here beyond slice indexing.
    #[inline]
    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, depth: f64, color: u32) -> bool {
        let idx = y * self.width as usize + x;
        if self.depth_buffer[idx] < depth {
            self.depth_buffer[idx] = depth;
            self.color_buffer[idx] = color;
            true
        } else {
            false
        }
    }

}

/// A color-only view for drawing that is never depth tested.
pub struct ColorBuffer<'a> {
    pixels: &'a mut [u32],
    width: u32,
    height: u32,
}

impl<'a> ColorBuffer<'a> {
    /// # Panics
    /// Panics in debug builds if the buffer length doesn't match width * height
    pub fn new(pixels: &'a mut [u32], width: u32, height: u32) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "Color buffer size doesn't match dimensions"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set a pixel, silently ignoring out-of-bounds coordinates.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }

    #[cfg(test)]
    pub(crate) fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }
}
