//! Wavefront OBJ/MTL support.
//!
//! [`ObjDecoder`] reads OBJ bytes through `tobj`, so models exported by this
//! crate (or authored elsewhere) can be viewed. [`write_obj`] and
//! [`write_mtl`] emit a mesh as a vertex list, one flat-color material per
//! face and 1-based triangular faces.

use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::colors::{self, Rgb};
use crate::mesh::{DecodeError, DecodedMesh, MeshDecoder};

/// First line of every OBJ file we write.
pub const OBJ_HEADER: &str = "# Created by modelview";

/// Decodes OBJ bytes into a [`DecodedMesh`].
///
/// Polygons are triangulated. Every object in the file is merged into one
/// mesh. A face takes the diffuse color (`Kd`) of its material, quantized to
/// packed HSB; faces without a usable material are white.
#[derive(Debug, Clone, Default)]
pub struct ObjDecoder {
    material_dir: Option<PathBuf>,
}

impl ObjDecoder {
    /// A decoder that ignores `mtllib` statements.
    pub fn new() -> Self {
        Self::default()
    }

    /// A decoder that resolves `mtllib` statements relative to `dir`.
    pub fn with_material_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            material_dir: Some(dir.into()),
        }
    }

    fn load_materials(&self, path: &Path) -> tobj::MTLLoadResult {
        match &self.material_dir {
            Some(dir) => tobj::load_mtl(dir.join(path)),
            None => Err(tobj::LoadError::OpenFileFailed),
        }
    }
}

impl MeshDecoder for ObjDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedMesh, DecodeError> {
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let mut reader = BufReader::new(bytes);
        let (models, materials) =
            tobj::load_obj_buf(&mut reader, &options, |path| self.load_materials(path))?;

        let materials = materials.unwrap_or_else(|err| {
            log::debug!("OBJ materials unavailable, faces default to white: {err}");
            Vec::new()
        });
        let white = colors::rgb_to_hsb(Rgb::WHITE);
        let palette: Vec<u16> = materials
            .iter()
            .map(|material| match material.diffuse {
                Some([r, g, b]) => colors::rgb_to_hsb(Rgb::new(
                    reflectance_channel(r as f64),
                    reflectance_channel(g as f64),
                    reflectance_channel(b as f64),
                )),
                None => white,
            })
            .collect();

        let mut vertices: [Vec<f64>; 3] = Default::default();
        let mut faces: [Vec<usize>; 3] = Default::default();
        let mut face_colors = Vec::new();

        for model in &models {
            let mesh = &model.mesh;
            let base = vertices[0].len();
            for position in mesh.positions.chunks_exact(3) {
                for (axis, value) in vertices.iter_mut().zip(position) {
                    axis.push(*value as f64);
                }
            }

            let color = mesh
                .material_id
                .and_then(|id| palette.get(id).copied())
                .unwrap_or(white);
            for face in mesh.indices.chunks_exact(3) {
                for (list, index) in faces.iter_mut().zip(face) {
                    list.push(base + *index as usize);
                }
                face_colors.push(color);
            }
        }

        DecodedMesh::new(vertices, faces, face_colors)
    }
}

fn reflectance_channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Distinct face colors of `mesh` in order of first use.
pub fn palette(mesh: &DecodedMesh) -> Vec<Rgb> {
    let mut seen = Vec::new();
    for &packed in mesh.colors() {
        let rgb = colors::hsb_to_rgb(packed);
        if !seen.contains(&rgb) {
            seen.push(rgb);
        }
    }
    seen
}

/// Material name for a face color: the 24-bit RGB value in decimal.
pub fn material_name(color: Rgb) -> String {
    color.packed().to_string()
}

/// Write the material library: one `newmtl`/`Kd` block per distinct color.
pub fn write_mtl<W: Write>(mesh: &DecodedMesh, out: &mut W) -> io::Result<()> {
    for color in palette(mesh) {
        let [r, g, b] = color.reflectance();
        writeln!(out, "newmtl {}", material_name(color))?;
        writeln!(out, "Kd {r:?} {g:?} {b:?}")?;
        writeln!(out)?;
    }
    Ok(())
}

/// Write the geometry, referencing the material library `mtllib`.
pub fn write_obj<W: Write>(mesh: &DecodedMesh, mtllib: &str, out: &mut W) -> io::Result<()> {
    writeln!(out, "{OBJ_HEADER}")?;
    writeln!(out, "mtllib {mtllib}")?;

    for i in 0..mesh.vertex_count() {
        let [x, y, z] = mesh.vertex(i);
        writeln!(out, "v {x:?} {y:?} {z:?}")?;
    }

    for i in 0..mesh.face_count() {
        let [a, b, c] = mesh.face(i);
        let color = colors::hsb_to_rgb(mesh.face_color(i));
        writeln!(out, "usemtl {}", material_name(color))?;
        writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}
