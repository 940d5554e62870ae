//! Per-frame view transform.
//!
//! Provides a [`Transform`] struct with a fluent API for the five view
//! controls: yaw, pitch and roll (degrees), uniform zoom, and translation.

use crate::math::Mat4;

/// The view controls that compose into one net matrix every frame.
///
/// Provides a fluent API where mutating methods return `&mut Self` for chaining:
///
/// ```ignore
/// transform
///     .set_yaw(30.0)
///     .set_pitch(-10.0)
///     .set_zoom(2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    yaw: f64,   // Degrees about the vertical axis
    pitch: f64, // Degrees about the horizontal axis
    roll: f64,  // Degrees about the depth axis
    zoom: f64,
    translation: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            zoom: 1.0,
            translation: [0.0; 3],
        }
    }
}

impl Transform {
    /// Create a transform with no rotation, unit zoom and no translation.
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Rotation ============

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn roll(&self) -> f64 {
        self.roll
    }

    /// Set the yaw in degrees.
    pub fn set_yaw(&mut self, degrees: f64) -> &mut Self {
        self.yaw = degrees;
        self
    }

    /// Set the pitch in degrees.
    pub fn set_pitch(&mut self, degrees: f64) -> &mut Self {
        self.pitch = degrees;
        self
    }

    /// Set the roll in degrees.
    pub fn set_roll(&mut self, degrees: f64) -> &mut Self {
        self.roll = degrees;
        self
    }

    // ============ Zoom ============

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the uniform scale factor. `1.0` means no zoom.
    pub fn set_zoom(&mut self, zoom: f64) -> &mut Self {
        self.zoom = zoom;
        self
    }

    // ============ Translation ============

    pub fn translation(&self) -> [f64; 3] {
        self.translation
    }

    pub fn set_translation(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.translation = [x, y, z];
        self
    }

    // ============ Matrix Generation ============

    pub fn yaw_matrix(&self) -> Mat4 {
        Mat4::rotation_y(self.yaw.to_radians())
    }

    pub fn pitch_matrix(&self) -> Mat4 {
        Mat4::rotation_x(self.pitch.to_radians())
    }

    pub fn roll_matrix(&self) -> Mat4 {
        Mat4::rotation_z(self.roll.to_radians())
    }

    /// Compose the net matrix.
    ///
    /// Order: Yaw * Pitch * Roll * Scale * Translate. Under the row-vector
    /// convention a vertex is yawed first and translated last.
    pub fn to_matrix(&self) -> Mat4 {
        let [tx, ty, tz] = self.translation;
        self.yaw_matrix()
            * self.pitch_matrix()
            * self.roll_matrix()
            * Mat4::uniform_scaling(self.zoom)
            * Mat4::translation(tx, ty, tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn test_default() {
        let t = Transform::default();
        assert_eq!(t.yaw(), 0.0);
        assert_eq!(t.zoom(), 1.0);
        assert_eq!(t.translation(), [0.0; 3]);
    }

    #[test]
    fn test_to_matrix_identity() {
        // Default transform should produce identity matrix
        assert_eq!(Transform::default().to_matrix(), Mat4::identity());
    }

    #[test]
    fn test_fluent_api() {
        let mut t = Transform::new();
        t.set_yaw(90.0).set_pitch(45.0).set_roll(-30.0).set_zoom(2.0);

        assert_eq!(t.yaw(), 90.0);
        assert_eq!(t.pitch(), 45.0);
        assert_eq!(t.roll(), -30.0);
        assert_eq!(t.zoom(), 2.0);
    }

    #[test]
    fn test_yaw_is_in_degrees() {
        let mut t = Transform::new();
        t.set_yaw(90.0);
        let v = Vec4::point(1.0, 0.0, 0.0) * t.to_matrix();
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zoom_scales_before_translation() {
        let mut t = Transform::new();
        t.set_zoom(2.0).set_translation(10.0, 0.0, 0.0);
        let v = Vec4::point(1.0, 1.0, 1.0) * t.to_matrix();
        // Scale first (2, 2, 2) then translate: the offset itself is not zoomed.
        assert_eq!(v, Vec4::new(12.0, 2.0, 2.0, 1.0));
    }

    #[test]
    fn test_rotation_applies_before_translation() {
        let mut t = Transform::new();
        t.set_roll(90.0).set_translation(0.0, 5.0, 0.0);
        let v = Vec4::point(1.0, 0.0, 0.0) * t.to_matrix();
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_composition_order() {
        let mut t = Transform::new();
        t.set_yaw(20.0).set_pitch(35.0).set_roll(50.0).set_zoom(1.5);
        let expected = t.yaw_matrix()
            * t.pitch_matrix()
            * t.roll_matrix()
            * Mat4::uniform_scaling(1.5)
            * Mat4::identity();
        let reversed = t.roll_matrix() * t.pitch_matrix() * t.yaw_matrix();
        assert_eq!(t.to_matrix(), expected);
        assert_ne!(t.to_matrix(), reversed * Mat4::uniform_scaling(1.5));
    }
}
