// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory collaborators shared by the unit tests.

use crate::importer::{FrameImporter, ImportError};
use crate::mesh::MeshFrame;
use crate::settings::{FrameFormat, ImportSettings};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Mesh of `vertices` vertices whose positions depend on `offset`
pub(crate) fn mesh(name: &str, vertices: usize, offset: f32) -> MeshFrame {
    let positions = (0..vertices)
        .map(|i| {
            let i = i as f32;
            [offset + i, offset * 2.0 - i, offset * 0.5]
        })
        .collect();
    MeshFrame::new(name, positions)
}

/// Importer serving canned meshes by file name
#[derive(Debug, Default)]
pub(crate) struct FakeImporter {
    frames: HashMap<String, Vec<MeshFrame>>,
    pub(crate) imported: Vec<PathBuf>,
    pub(crate) purged: usize,
}

impl FakeImporter {
    pub(crate) fn with_frame(mut self, file_name: &str, meshes: Vec<MeshFrame>) -> Self {
        self.frames.insert(file_name.to_string(), meshes);
        self
    }
}

impl FrameImporter for FakeImporter {
    fn import_frame(
        &mut self,
        _format: FrameFormat,
        path: &Path,
        _settings: &ImportSettings,
    ) -> Result<Vec<MeshFrame>, ImportError> {
        self.imported.push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.frames.get(&name).cloned().ok_or_else(|| ImportError::Io {
            path: path.to_path_buf(),
            source: std::io::ErrorKind::NotFound.into(),
        })
    }

    fn purge_orphans(&mut self) {
        self.purged += 1;
    }
}
