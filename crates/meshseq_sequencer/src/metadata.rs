// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence metadata stored as key-value state on an object.
//!
//! Everything needed to reload a sequence lives under `mesh_sequence.*` keys of
//! the object's [`PropertyStore`]: the resolver inputs, the files that were
//! imported, a RON snapshot of the import settings and the resulting counts.

use crate::settings::{FrameFormat, ImportSettings, SequenceSource};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const KEY_INITIALIZED: &str = "mesh_sequence.initialized";
const KEY_DIRECTORY: &str = "mesh_sequence.directory";
const KEY_PREFIX: &str = "mesh_sequence.prefix";
const KEY_FORMAT: &str = "mesh_sequence.format";
const KEY_FILES: &str = "mesh_sequence.files";
const KEY_FILE_COUNT: &str = "mesh_sequence.file_count";
const KEY_FRAME_COUNT: &str = "mesh_sequence.frame_count";
const KEY_SETTINGS: &str = "mesh_sequence.settings";

/// Error reading sequence metadata
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// A required key is absent
    #[error("Missing metadata key: {0}")]
    MissingKey(&'static str),

    /// A key holds a value of the wrong kind
    #[error("Metadata key {key} should hold {expected}")]
    WrongKind {
        /// Offending key
        key: &'static str,
        /// Expected kind
        expected: &'static str,
    },

    /// Stored format is not known
    #[error("Invalid stored format: {0}")]
    Format(#[from] crate::settings::SettingsError),

    /// Settings snapshot could not be parsed
    #[error("Invalid settings snapshot: {0}")]
    Snapshot(#[from] ron::error::SpannedError),

    /// Settings snapshot could not be written
    #[error("Failed to serialize settings snapshot: {0}")]
    Serialize(#[from] ron::Error),

    /// Paths are stored as strings and must be valid UTF-8
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

/// A value in a property store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean
    Bool(bool),
    /// Unsigned integer
    Int(u64),
    /// String
    Str(String),
    /// List of strings
    StrList(Vec<String>),
}

/// Insertion-ordered key-value state attached to an object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyStore(IndexMap<String, PropertyValue>);

impl PropertyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    /// Set a value, keeping the key's position if it already exists
    pub fn set(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.0.insert(key.into(), value);
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn bool(&self, key: &'static str) -> Result<bool, MetadataError> {
        match self.get(key) {
            Some(PropertyValue::Bool(v)) => Ok(*v),
            Some(_) => Err(MetadataError::WrongKind { key, expected: "a boolean" }),
            None => Err(MetadataError::MissingKey(key)),
        }
    }

    fn int(&self, key: &'static str) -> Result<usize, MetadataError> {
        match self.get(key) {
            Some(PropertyValue::Int(v)) => usize::try_from(*v)
                .map_err(|_| MetadataError::WrongKind { key, expected: "a count" }),
            Some(_) => Err(MetadataError::WrongKind { key, expected: "an integer" }),
            None => Err(MetadataError::MissingKey(key)),
        }
    }

    fn str(&self, key: &'static str) -> Result<&str, MetadataError> {
        match self.get(key) {
            Some(PropertyValue::Str(v)) => Ok(v),
            Some(_) => Err(MetadataError::WrongKind { key, expected: "a string" }),
            None => Err(MetadataError::MissingKey(key)),
        }
    }

    fn str_list(&self, key: &'static str) -> Result<&[String], MetadataError> {
        match self.get(key) {
            Some(PropertyValue::StrList(v)) => Ok(v),
            Some(_) => Err(MetadataError::WrongKind { key, expected: "a string list" }),
            None => Err(MetadataError::MissingKey(key)),
        }
    }
}

/// Lifecycle of a sequence object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// Never ingested
    Uninitialized,
    /// Ingested at least once and reloadable
    Initialized,
}

impl SequenceState {
    /// State recorded in a property store
    pub fn of(properties: &PropertyStore) -> Self {
        match properties.get(KEY_INITIALIZED) {
            Some(PropertyValue::Bool(true)) => Self::Initialized,
            _ => Self::Uninitialized,
        }
    }
}

/// Everything needed to re-ingest a sequence into the same object
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceMetadata {
    /// Resolver inputs
    pub source: SequenceSource,
    /// Files imported by the last run, checked for existence on reload
    pub files: Vec<PathBuf>,
    /// Settings the frames were imported with
    pub settings: ImportSettings,
    /// Number of files imported
    pub file_count: usize,
    /// Number of keyed frames
    pub frame_count: usize,
    /// Whether ingestion completed
    pub initialized: bool,
}

impl SequenceMetadata {
    /// Read metadata from a property store; `None` if it was never written
    pub fn read_from(properties: &PropertyStore) -> Result<Option<Self>, MetadataError> {
        if properties.get(KEY_INITIALIZED).is_none() {
            return Ok(None);
        }

        let format: FrameFormat = properties.str(KEY_FORMAT)?.parse()?;
        let source = SequenceSource::new(
            properties.str(KEY_DIRECTORY)?,
            properties.str(KEY_PREFIX)?,
            format,
        );
        let settings = ron::from_str(properties.str(KEY_SETTINGS)?)?;

        Ok(Some(Self {
            source,
            files: properties.str_list(KEY_FILES)?.iter().map(PathBuf::from).collect(),
            settings,
            file_count: properties.int(KEY_FILE_COUNT)?,
            frame_count: properties.int(KEY_FRAME_COUNT)?,
            initialized: properties.bool(KEY_INITIALIZED)?,
        }))
    }

    /// Write metadata into a property store, overwriting earlier values.
    ///
    /// Paths are stored as strings, so a non-UTF-8 path is rejected before
    /// anything is written.
    pub fn write_to(&self, properties: &mut PropertyStore) -> Result<(), MetadataError> {
        let settings = ron::to_string(&self.settings)?;
        let directory = path_string(&self.source.directory)?;
        let files = self
            .files
            .iter()
            .map(|p| path_string(p))
            .collect::<Result<Vec<_>, _>>()?;

        properties.set(KEY_DIRECTORY, PropertyValue::Str(directory));
        properties.set(KEY_PREFIX, PropertyValue::Str(self.source.prefix.clone()));
        properties.set(KEY_FORMAT, PropertyValue::Str(self.source.format.extension().to_string()));
        properties.set(KEY_FILES, PropertyValue::StrList(files));
        properties.set(KEY_SETTINGS, PropertyValue::Str(settings));
        properties.set(KEY_FILE_COUNT, PropertyValue::Int(self.file_count as u64));
        properties.set(KEY_FRAME_COUNT, PropertyValue::Int(self.frame_count as u64));
        properties.set(KEY_INITIALIZED, PropertyValue::Bool(self.initialized));
        Ok(())
    }
}

fn path_string(path: &Path) -> Result<String, MetadataError> {
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| MetadataError::NonUtf8Path(path.to_path_buf()))
}
