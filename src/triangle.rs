use crate::colors::Rgb;
use crate::math::{Mat4, Vec4};

// A flat-colored face in model space, built once per model selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub v1: Vec4,
    pub v2: Vec4,
    pub v3: Vec4,
    pub color: Rgb,
}

impl Triangle {
    pub const fn new(v1: Vec4, v2: Vec4, v3: Vec4, color: Rgb) -> Self {
        Self { v1, v2, v3, color }
    }

    pub fn vertices(&self) -> [Vec4; 3] {
        [self.v1, self.v2, self.v3]
    }

    /// Vertices after applying `transform`, in winding order.
    #[inline]
    pub fn transformed(&self, transform: &Mat4) -> [Vec4; 3] {
        self.vertices().map(|v| transform.transform(v))
    }
}
