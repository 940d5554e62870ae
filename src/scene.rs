//! The triangle list of the selected model, and its hand-off to the renderer.
//!
//! A [`Scene`] is immutable once built. Selecting a different model builds a
//! new one and publishes it through a [`SceneHandle`]; a frame in progress
//! keeps reading the snapshot it started with, so the list is never mutated
//! under the rasterizer.

use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError};

use crate::triangle::Triangle;

/// An ordered, shared, read-only triangle list.
///
/// Order is face order from the source mesh; it decides depth-test ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    triangles: Arc<[Triangle]>,
}

impl Scene {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self {
            triangles: triangles.into(),
        }
    }
}

impl Deref for Scene {
    type Target = [Triangle];

    fn deref(&self) -> &Self::Target {
        &self.triangles
    }
}

/// Single point of exchange between scene replacement and frame rendering.
///
/// Cloning the handle shares the same slot. `publish` replaces the whole
/// scene; `snapshot` returns the scene current at the time of the call.
#[derive(Debug, Clone, Default)]
pub struct SceneHandle {
    current: Arc<Mutex<Scene>>,
}

impl SceneHandle {
    pub fn new(scene: Scene) -> Self {
        Self {
            current: Arc::new(Mutex::new(scene)),
        }
    }

    /// Replace the scene wholesale. Frames already holding a snapshot are unaffected.
    pub fn publish(&self, scene: Scene) {
        log::debug!("publishing scene with {} triangles", scene.len());
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = scene;
    }

    /// Drop the current model; subsequent frames render nothing.
    pub fn clear(&self) {
        self.publish(Scene::default());
    }

    pub fn snapshot(&self) -> Scene {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
