//! Mouse interaction, independent of any windowing toolkit.
//!
//! A host forwards presses, drags and scrolls to [`ViewControls`], which turns
//! them into view-transform changes. Rotation and translation are measured
//! from the last press, so every new drag starts from zero.

use crate::config::ControlsConfig;
use crate::render::{RenderFlags, RenderFrameInputs};
use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Other,
}

/// View state plus the bookkeeping the mouse gestures need.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewControls {
    transform: Transform,
    flags: RenderFlags,
    pressed_at: (f64, f64),
    zoom_step: f64,
    drag_zoom_step: f64,
    max_zoom: f64,
}

impl Default for ViewControls {
    fn default() -> Self {
        Self::from_config(&ControlsConfig::default())
    }
}

impl ViewControls {
    pub fn from_config(config: &ControlsConfig) -> Self {
        let [tx, ty, tz] = config.translate;
        let mut transform = Transform::new();
        transform
            .set_yaw(config.yaw)
            .set_pitch(config.pitch)
            .set_roll(config.roll)
            .set_zoom(config.zoom)
            .set_translation(tx, ty, tz);

        Self {
            transform,
            flags: RenderFlags {
                fill: config.fill,
                shade: config.shade,
                edges: config.edges,
                vertices: config.vertices,
            },
            pressed_at: (0.0, 0.0),
            zoom_step: config.zoom_step,
            drag_zoom_step: config.drag_zoom_step,
            max_zoom: config.max_zoom,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Direct access for slider-style hosts.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn flags(&self) -> RenderFlags {
        self.flags
    }

    pub fn flags_mut(&mut self) -> &mut RenderFlags {
        &mut self.flags
    }

    /// Remember where a drag starts.
    pub fn press(&mut self, x: f64, y: f64) {
        self.pressed_at = (x, y);
    }

    /// Primary drag rotates, or translates with `ctrl` held. Secondary drag
    /// zooms one step per event, in by dragging up and out by dragging down.
    pub fn drag(&mut self, x: f64, y: f64, button: MouseButton, ctrl: bool) {
        let (px, py) = self.pressed_at;
        match button {
            MouseButton::Primary if ctrl => {
                let [_, _, tz] = self.transform.translation();
                self.transform.set_translation(x - px, y - py, tz);
            }
            MouseButton::Primary => {
                self.transform.set_yaw(x - px).set_pitch(py - y);
            }
            MouseButton::Secondary => {
                let step = if py - y > 0.0 {
                    self.drag_zoom_step
                } else {
                    -self.drag_zoom_step
                };
                let zoom = self.transform.zoom() + step;
                self.transform.set_zoom(zoom);
            }
            MouseButton::Other => {}
        }
    }

    /// Scrolling up zooms in; anything else zooms out. The result never
    /// exceeds the configured maximum. There is no lower bound.
    pub fn scroll(&mut self, delta_y: f64) {
        let step = if delta_y > 0.0 {
            self.zoom_step
        } else {
            -self.zoom_step
        };
        let zoom = (self.transform.zoom() + step).min(self.max_zoom);
        self.transform.set_zoom(zoom);
    }

    pub fn frame_inputs(&self, width: u32, height: u32) -> RenderFrameInputs {
        RenderFrameInputs::new(self.transform, self.flags, width, height)
    }
}
