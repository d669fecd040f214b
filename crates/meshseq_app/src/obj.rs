// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wavefront OBJ frame importer.
//!
//! Only vertex positions matter for shape keys, so faces, normals and
//! texture coordinates are skipped. Vertices belong to the mesh opened by the
//! last `o` (or `g`, when splitting by group) statement before them.

use meshseq_sequencer::{
    Axis, FrameFormat, FrameImporter, ImportError, ImportSettings, MeshFrame, Position,
};
use std::path::Path;

/// Reads vertex positions from `.obj` files
#[derive(Debug, Clone, Copy, Default)]
pub struct WavefrontImporter;

impl WavefrontImporter {
    /// Create a new importer
    pub fn new() -> Self {
        Self
    }
}

impl FrameImporter for WavefrontImporter {
    fn import_frame(
        &mut self,
        format: FrameFormat,
        path: &Path,
        settings: &ImportSettings,
    ) -> Result<Vec<MeshFrame>, ImportError> {
        if format != FrameFormat::Obj {
            return Err(ImportError::UnsupportedFormat(format));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let default_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut meshes = parse_obj(&content, &default_name, settings).map_err(|(line, message)| {
            ImportError::Parse {
                path: path.to_path_buf(),
                line,
                message,
            }
        })?;
        transform(&mut meshes, settings);
        tracing::debug!("Read {} mesh(es) from {}", meshes.len(), path.display());
        Ok(meshes)
    }
}

/// Split OBJ text into meshes; errors carry a 1-based line number
fn parse_obj(
    content: &str,
    default_name: &str,
    settings: &ImportSettings,
) -> Result<Vec<MeshFrame>, (usize, String)> {
    let mut meshes = vec![MeshFrame::new(default_name, Vec::new())];
    // The implicit first mesh is dropped if nothing is put in it
    let mut implicit = true;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let position = parse_position(tokens).map_err(|m| (line_number, m))?;
                if let Some(mesh) = meshes.last_mut() {
                    mesh.positions.push(position);
                }
            }
            Some("o") if settings.obj.use_split_objects => {
                open_mesh(&mut meshes, &mut implicit, tokens, default_name);
            }
            Some("g") if settings.obj.use_split_groups => {
                open_mesh(&mut meshes, &mut implicit, tokens, default_name);
            }
            _ => {}
        }
    }

    if implicit && meshes.first().is_some_and(|m| m.positions.is_empty()) {
        meshes.clear();
    }
    Ok(meshes)
}

fn open_mesh<'a>(
    meshes: &mut Vec<MeshFrame>,
    implicit: &mut bool,
    tokens: impl Iterator<Item = &'a str>,
    default_name: &str,
) {
    let name = tokens.collect::<Vec<_>>().join(" ");
    let name = if name.is_empty() { default_name.to_string() } else { name };

    let replace_implicit = *implicit && meshes.len() == 1 && meshes[0].positions.is_empty();
    *implicit = false;
    if replace_implicit {
        meshes[0].name = name;
    } else {
        meshes.push(MeshFrame::new(name, Vec::new()));
    }
}

fn parse_position<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Position, String> {
    let mut position = [0.0; 3];
    for (axis, slot) in position.iter_mut().enumerate() {
        let token = tokens
            .next()
            .ok_or_else(|| format!("vertex has {axis} coordinate(s), expected 3"))?;
        *slot = token
            .parse()
            .map_err(|_| format!("invalid vertex coordinate '{token}'"))?;
    }
    Ok(position)
}

/// Apply scale, clamp size and axis conversion to every mesh of a file
fn transform(meshes: &mut [MeshFrame], settings: &ImportSettings) {
    let mut scale = settings.scale_for(FrameFormat::Obj);

    let clamp = settings.obj.clamp_size;
    if clamp > 0.0 {
        let extent = max_extent(meshes) * scale;
        let mut clamped = extent;
        while clamped > clamp && clamped.is_finite() {
            scale /= 10.0;
            clamped /= 10.0;
        }
    }

    let [r, f, u] = axis_basis(settings.axis_forward, settings.axis_up);
    for position in meshes.iter_mut().flat_map(|m| m.positions.iter_mut()) {
        let p = position.map(|c| c * scale);
        *position = [dot(p, r), dot(p, f), dot(p, u)];
    }
}

/// Largest bounding box side over all meshes
fn max_extent(meshes: &[MeshFrame]) -> f32 {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for p in meshes.iter().flat_map(|m| m.positions.iter()) {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    (0..3)
        .map(|axis| max[axis] - min[axis])
        .filter(|side| side.is_finite())
        .fold(0.0, f32::max)
}

/// Source axes that map onto +X, +Y (forward) and +Z (up)
fn axis_basis(forward: Axis, up: Axis) -> [[f32; 3]; 3] {
    let f = forward.unit();
    let u = up.unit();
    let r = [
        f[1] * u[2] - f[2] * u[1],
        f[2] * u[0] - f[0] * u[2],
        f[0] * u[1] - f[1] * u[0],
    ];
    [r, f, u]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
