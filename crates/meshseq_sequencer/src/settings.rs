// SPDX-License-Identifier: MIT OR Apache-2.0
//! Import settings and sequence source configuration.
//!
//! Settings are plain data: a snapshot of them is stored on every imported
//! object so a later reload imports the frames exactly the same way. They can
//! also be kept in a RON file next to the frame sequence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Current settings file format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Smallest accepted import scale
pub const MIN_SCALE: f32 = 1e-6;
/// Largest accepted import scale
pub const MAX_SCALE: f32 = 1e6;
/// Largest accepted OBJ clamp size
pub const MAX_CLAMP_SIZE: f32 = 1000.0;

/// Error loading or validating settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed RON document
    #[error("Invalid settings file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Settings written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },

    /// Unknown file format name
    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    /// Unknown axis name
    #[error("Unknown axis: {0}")]
    UnknownAxis(String),

    /// Forward and up axes lie on the same line
    #[error("Forward axis {forward} and up axis {up} must be on different axes")]
    ParallelAxes {
        /// Forward axis
        forward: Axis,
        /// Up axis
        up: Axis,
    },

    /// Numeric setting out of range
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        /// Setting name
        name: &'static str,
        /// Offending value
        value: f32,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
}

/// Mesh file format of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FrameFormat {
    /// Wavefront OBJ
    #[default]
    Obj,
    /// Stereolithography (STL)
    Stl,
    /// Stanford PLY
    Ply,
}

impl FrameFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Stl => "stl",
            Self::Ply => "ply",
        }
    }

    /// Get the display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Obj => "Wavefront OBJ",
            Self::Stl => "Stereolithography",
            Self::Ply => "Stanford PLY",
        }
    }

    /// Get all supported formats
    pub fn all() -> &'static [FrameFormat] {
        &[FrameFormat::Obj, FrameFormat::Stl, FrameFormat::Ply]
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FrameFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim_start_matches('.');
        Self::all()
            .iter()
            .copied()
            .find(|f| f.extension().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SettingsError::UnknownFormat(s.to_string()))
    }
}

/// Signed coordinate axis used to orient imported frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// +X
    X,
    /// +Y
    Y,
    /// +Z
    Z,
    /// -X
    NegX,
    /// -Y
    NegY,
    /// -Z
    NegZ,
}

impl Axis {
    /// Short form, e.g. `-Z`
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::NegX => "-X",
            Self::NegY => "-Y",
            Self::NegZ => "-Z",
        }
    }

    /// Unit vector of this axis
    pub fn unit(&self) -> [f32; 3] {
        match self {
            Self::X => [1.0, 0.0, 0.0],
            Self::Y => [0.0, 1.0, 0.0],
            Self::Z => [0.0, 0.0, 1.0],
            Self::NegX => [-1.0, 0.0, 0.0],
            Self::NegY => [0.0, -1.0, 0.0],
            Self::NegZ => [0.0, 0.0, -1.0],
        }
    }

    /// Whether both axes lie on the same line
    pub fn is_parallel(&self, other: Axis) -> bool {
        let a = self.unit();
        let b = other.unit();
        (a[0] * b[0] + a[1] * b[1] + a[2] * b[2]).abs() > 0.5
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Axis {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let (negative, name) = match upper
            .strip_prefix('-')
            .or_else(|| upper.strip_prefix("NEGATIVE_"))
        {
            Some(rest) => (true, rest),
            None => (false, upper.as_str()),
        };
        match (negative, name) {
            (false, "X") => Ok(Self::X),
            (false, "Y") => Ok(Self::Y),
            (false, "Z") => Ok(Self::Z),
            (true, "X") => Ok(Self::NegX),
            (true, "Y") => Ok(Self::NegY),
            (true, "Z") => Ok(Self::NegZ),
            _ => Err(SettingsError::UnknownAxis(s.to_string())),
        }
    }
}

/// OBJ import options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjSettings {
    /// Uniform scale applied to positions
    pub global_scale: f32,
    /// Clamp bounds under this size (zero disables)
    pub clamp_size: f32,
    /// Import OBJ groups as vertex groups
    pub use_groups_as_vgroups: bool,
    /// Import each `o` as a separate mesh
    pub use_split_objects: bool,
    /// Import each `g` as a separate mesh
    pub use_split_groups: bool,
}

impl Default for ObjSettings {
    fn default() -> Self {
        Self {
            global_scale: 1.0,
            clamp_size: 0.0,
            use_groups_as_vgroups: false,
            use_split_objects: true,
            use_split_groups: false,
        }
    }
}

/// STL import options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StlSettings {
    /// Uniform scale applied to positions
    pub global_scale: f32,
    /// Apply the scene's unit scale
    pub use_scene_unit: bool,
    /// Use imported facet normals
    pub use_facet_normal: bool,
}

impl Default for StlSettings {
    fn default() -> Self {
        Self {
            global_scale: 1.0,
            use_scene_unit: false,
            use_facet_normal: false,
        }
    }
}

/// PLY import options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlySettings {
    /// Uniform scale applied to positions
    pub global_scale: f32,
    /// Apply the scene's unit scale
    pub use_scene_unit: bool,
}

impl Default for PlySettings {
    fn default() -> Self {
        Self {
            global_scale: 1.0,
            use_scene_unit: false,
        }
    }
}

/// Settings handed to the frame importer for every frame of a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// OBJ options
    #[serde(default)]
    pub obj: ObjSettings,
    /// STL options
    #[serde(default)]
    pub stl: StlSettings,
    /// PLY options
    #[serde(default)]
    pub ply: PlySettings,
    /// Forward axis shared by all frames
    pub axis_forward: Axis,
    /// Up axis shared by all frames
    pub axis_up: Axis,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            obj: ObjSettings::default(),
            stl: StlSettings::default(),
            ply: PlySettings::default(),
            axis_forward: Axis::NegZ,
            axis_up: Axis::Y,
        }
    }
}

/// On-disk settings document
#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    version: u32,
    settings: ImportSettings,
}

impl ImportSettings {
    /// Scale configured for a format
    pub fn scale_for(&self, format: FrameFormat) -> f32 {
        match format {
            FrameFormat::Obj => self.obj.global_scale,
            FrameFormat::Stl => self.stl.global_scale,
            FrameFormat::Ply => self.ply.global_scale,
        }
    }

    /// Check ranges and axis orientation
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.axis_forward.is_parallel(self.axis_up) {
            return Err(SettingsError::ParallelAxes {
                forward: self.axis_forward,
                up: self.axis_up,
            });
        }
        for (name, value) in [
            ("obj.global_scale", self.obj.global_scale),
            ("stl.global_scale", self.stl.global_scale),
            ("ply.global_scale", self.ply.global_scale),
        ] {
            check_range(name, value, MIN_SCALE, MAX_SCALE)?;
        }
        check_range("obj.clamp_size", self.obj.clamp_size, 0.0, MAX_CLAMP_SIZE)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Parse a RON settings document
    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile = ron::from_str(content)?;
        if file.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: file.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }
        file.settings.validate()?;
        Ok(file.settings)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        let file = SettingsFile {
            version: SETTINGS_FORMAT_VERSION,
            settings: self.clone(),
        };
        let content = ron::ser::to_string_pretty(&file, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), SettingsError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

/// Where a sequence comes from: resolver inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSource {
    /// Directory holding the frame files
    pub directory: PathBuf,
    /// Literal file name prefix
    pub prefix: String,
    /// File format
    pub format: FrameFormat,
}

impl SequenceSource {
    /// Create a new source description
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>, format: FrameFormat) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            format,
        }
    }

    /// Glob-style description of the matched files, e.g. `frame*.obj`
    pub fn file_mask(&self) -> String {
        format!("{}*.{}", self.prefix, self.format.extension())
    }
}
