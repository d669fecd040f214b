// SPDX-License-Identifier: MIT OR Apache-2.0
//! Discovery and natural ordering of sequence frame files.
//!
//! A sequence is every file in one directory matching `prefix*.ext`, ordered
//! so that embedded numbers compare by value: `f2.obj` comes before `f10.obj`.

use crate::settings::FrameFormat;
use glob::{MatchOptions, Pattern};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Error while enumerating frame files
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The constructed glob pattern is invalid
    #[error("Invalid pattern {pattern}: {source}")]
    Pattern {
        /// Pattern text
        pattern: String,
        /// Underlying error
        source: glob::PatternError,
    },

    /// A directory entry could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Entry {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Numeric chunk of a sort key, stored as its significant digits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    fn parse(digits: &str) -> Self {
        let significant = digits.trim_start_matches('0');
        Self(significant.to_string())
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        // No leading zeros, so a longer digit run is a larger integer
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One chunk of a natural sort key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SortChunk {
    /// Non-numeric run
    Text(String),
    /// Run of ASCII digits compared as an integer
    Number(Number),
}

/// Natural sort key: alternating text and number chunks, starting with text.
///
/// `"z23a"` becomes `[Text("z"), Number(23), Text("a")]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SortKey(Vec<SortChunk>);

impl SortKey {
    /// Build the key for a string
    pub fn new(text: &str) -> Self {
        let mut chunks = Vec::new();
        let mut rest = text;
        loop {
            let digits_at = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
            chunks.push(SortChunk::Text(rest[..digits_at].to_string()));
            rest = &rest[digits_at..];
            if rest.is_empty() {
                break;
            }
            let digits_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            chunks.push(SortChunk::Number(Number::parse(&rest[..digits_end])));
            rest = &rest[digits_end..];
        }
        Self(chunks)
    }

    /// Chunks of this key
    pub fn chunks(&self) -> &[SortChunk] {
        &self.0
    }
}

/// A discovered frame file with its sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFile {
    path: PathBuf,
    sort_key: SortKey,
}

impl FrameFile {
    /// Create a frame file, deriving its sort key from the path text
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sort_key = SortKey::new(&path.to_string_lossy());
        Self { path, sort_key }
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Natural sort key
    pub fn sort_key(&self) -> &SortKey {
        &self.sort_key
    }
}

/// Naturally ordered, non-empty list of frame files.
///
/// The first file is the base frame; the rest are delta frames 1..N.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    files: Vec<FrameFile>,
}

impl FrameSet {
    /// Order paths naturally; `None` if there are none.
    ///
    /// Paths with equal keys keep their input order.
    pub fn from_paths<I, P>(paths: I) -> Option<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut files: Vec<FrameFile> = paths.into_iter().map(FrameFile::new).collect();
        if files.is_empty() {
            return None;
        }
        files.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
        Some(Self { files })
    }

    /// The base frame
    pub fn base(&self) -> &FrameFile {
        &self.files[0]
    }

    /// Delta frames, in import order
    pub fn deltas(&self) -> &[FrameFile] {
        &self.files[1..]
    }

    /// All frames
    pub fn files(&self) -> &[FrameFile] {
        &self.files
    }

    /// Total frame count including the base frame
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// A resolved set is never empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of all frames, in order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Find the frames of a sequence in `directory`.
///
/// Returns `Ok(None)` when no file matches `prefix*.ext`. The directory is
/// listed non-recursively and files are never opened.
pub fn resolve(
    directory: &Path,
    prefix: &str,
    format: FrameFormat,
) -> Result<Option<FrameSet>, ResolveError> {
    let pattern = format!(
        "{}*.{}",
        Pattern::escape(&directory.join(prefix).to_string_lossy()),
        format.extension()
    );
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let entries = glob::glob_with(&pattern, options).map_err(|source| ResolveError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => {
                let path = e.path().to_path_buf();
                return Err(ResolveError::Entry {
                    path,
                    source: e.into(),
                });
            }
        }
    }

    tracing::debug!("Matched {} files with {}", paths.len(), pattern);
    Ok(FrameSet::from_paths(paths))
}
