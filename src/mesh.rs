//! Decoded mesh data and its conversion into a renderable [`Scene`].
//!
//! Decoding the model byte format itself is the job of a [`MeshDecoder`]; this
//! module only validates the decoded arrays, applies the fixed orientation
//! correction and builds triangles.

use thiserror::Error;

use crate::colors;
use crate::math::Vec4;
use crate::scene::{Scene, SceneHandle};
use crate::triangle::Triangle;

/// Errors produced while turning bytes into a mesh.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("model data is empty")]
    Empty,

    #[error("vertex arrays differ in length (x: {x}, y: {y}, z: {z})")]
    VertexLengthMismatch { x: usize, y: usize, z: usize },

    #[error("face arrays differ in length (a: {a}, b: {b}, c: {c}, colors: {colors})")]
    FaceLengthMismatch {
        a: usize,
        b: usize,
        c: usize,
        colors: usize,
    },

    #[error("face {face} references vertex {index}, but the mesh has {vertices} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: usize,
        vertices: usize,
    },

    #[error("failed to parse OBJ data: {0}")]
    Obj(#[from] tobj::LoadError),
}

/// Turns raw model bytes into mesh arrays.
pub trait MeshDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedMesh, DecodeError>;
}

impl<F> MeshDecoder for F
where
    F: Fn(&[u8]) -> Result<DecodedMesh, DecodeError>,
{
    fn decode(&self, bytes: &[u8]) -> Result<DecodedMesh, DecodeError> {
        self(bytes)
    }
}

/// Vertex positions, triangular faces and a packed HSB color per face.
///
/// Invariants (checked by [`DecodedMesh::new`]): the three vertex arrays have
/// one length, the three index arrays and the color array have another, and
/// every index is a valid vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMesh {
    vertices_x: Vec<f64>,
    vertices_y: Vec<f64>,
    vertices_z: Vec<f64>,
    faces_a: Vec<usize>,
    faces_b: Vec<usize>,
    faces_c: Vec<usize>,
    colors: Vec<u16>,
}

impl DecodedMesh {
    pub fn new(
        vertices: [Vec<f64>; 3],
        faces: [Vec<usize>; 3],
        colors: Vec<u16>,
    ) -> Result<Self, DecodeError> {
        let [vertices_x, vertices_y, vertices_z] = vertices;
        let [faces_a, faces_b, faces_c] = faces;

        if vertices_x.len() != vertices_y.len() || vertices_x.len() != vertices_z.len() {
            return Err(DecodeError::VertexLengthMismatch {
                x: vertices_x.len(),
                y: vertices_y.len(),
                z: vertices_z.len(),
            });
        }

        let face_count = faces_a.len();
        if faces_b.len() != face_count || faces_c.len() != face_count || colors.len() != face_count
        {
            return Err(DecodeError::FaceLengthMismatch {
                a: faces_a.len(),
                b: faces_b.len(),
                c: faces_c.len(),
                colors: colors.len(),
            });
        }

        let vertex_count = vertices_x.len();
        for (face, indices) in [&faces_a, &faces_b, &faces_c]
            .into_iter()
            .flat_map(|list| list.iter().enumerate())
        {
            if *indices >= vertex_count {
                return Err(DecodeError::FaceIndexOutOfRange {
                    face,
                    index: *indices,
                    vertices: vertex_count,
                });
            }
        }

        Ok(Self {
            vertices_x,
            vertices_y,
            vertices_z,
            faces_a,
            faces_b,
            faces_c,
            colors,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices_x.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces_a.len()
    }

    pub fn vertex(&self, index: usize) -> [f64; 3] {
        [
            self.vertices_x[index],
            self.vertices_y[index],
            self.vertices_z[index],
        ]
    }

    /// Vertex indices of face `index`, zero-based.
    pub fn face(&self, index: usize) -> [usize; 3] {
        [self.faces_a[index], self.faces_b[index], self.faces_c[index]]
    }

    /// Packed HSB color of face `index`.
    pub fn face_color(&self, index: usize) -> u16 {
        self.colors[index]
    }

    pub fn colors(&self) -> &[u16] {
        &self.colors
    }

    /// Quarter turn clockwise about the vertical axis: `(x, z) -> (z, -x)`.
    pub fn rotate_clockwise(&mut self) {
        for (x, z) in self.vertices_x.iter_mut().zip(self.vertices_z.iter_mut()) {
            let old_x = *x;
            *x = *z;
            *z = -old_x;
        }
    }

    /// The model format faces the opposite way to the viewer; two quarter
    /// turns bring it round.
    pub fn into_viewer_orientation(mut self) -> Self {
        self.rotate_clockwise();
        self.rotate_clockwise();
        self
    }

    /// One triangle per face, in face order, with decoded flat colors.
    pub fn triangles(&self) -> Vec<Triangle> {
        (0..self.face_count())
            .map(|i| {
                let [a, b, c] = self.face(i).map(|v| {
                    let [x, y, z] = self.vertex(v);
                    Vec4::point(x, y, z)
                });
                Triangle::new(a, b, c, colors::hsb_to_rgb(self.colors[i]))
            })
            .collect()
    }
}

/// Decode `bytes`, correct the orientation and build the scene.
pub fn scene_from_bytes(decoder: &dyn MeshDecoder, bytes: &[u8]) -> Result<Scene, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let mesh = decoder.decode(bytes)?.into_viewer_orientation();
    Ok(Scene::new(mesh.triangles()))
}

/// Replace the scene behind `handle` with the model in `bytes`.
///
/// On failure the scene is cleared, so the viewer shows no model rather than
/// the previous one.
pub fn select_model(
    handle: &SceneHandle,
    decoder: &dyn MeshDecoder,
    bytes: &[u8],
) -> Result<usize, DecodeError> {
    match scene_from_bytes(decoder, bytes) {
        Ok(scene) => {
            let faces = scene.len();
            handle.publish(scene);
            Ok(faces)
        }
        Err(err) => {
            log::warn!("no model loaded: {err}");
            handle.clear();
            Err(err)
        }
    }
}
