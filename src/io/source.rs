//! Measurement file providers.
//!
//! The ingestor never walks directories itself. It asks a
//! [`MeasurementProvider`] for a lazy, single-pass sequence of
//! [`MeasurementFile`]s per category and reads each file's content on demand,
//! so reads can happen on worker threads.
//!
//! Two providers ship with the crate:
//! - [`DirectoryProvider`]: `<root>/PR/**/*.csv` and `<root>/GHI/**/*.csv`
//! - [`MemoryProvider`]: inline content, used by tests and embedders

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::Category;

/// One daily measurement file, identified by category and name.
#[derive(Debug, Clone)]
pub struct MeasurementFile {
    pub category: Category,
    /// Identifying name, expected to be an ISO date (`YYYY-MM-DD`).
    pub name: String,
    /// Where the file came from (path or label), used in diagnostics and for
    /// deterministic tie-breaking.
    pub origin: String,
    content: Content,
}

#[derive(Debug, Clone)]
enum Content {
    Path(PathBuf),
    Inline(String),
}

impl MeasurementFile {
    /// A file on disk. The name is the file stem (`2024-03-01.csv` -> `2024-03-01`).
    pub fn from_path(category: Category, path: &Path) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            category,
            name,
            origin: path.display().to_string(),
            content: Content::Path(path.to_path_buf()),
        }
    }

    /// A file whose content is already in memory.
    pub fn inline(category: Category, name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            category,
            origin: format!("{category}/{name}"),
            name,
            content: Content::Inline(content.into()),
        }
    }

    /// Read the tabular content. Only path-backed files can fail.
    pub fn read_content(&self) -> std::io::Result<String> {
        match &self.content {
            Content::Path(path) => fs::read_to_string(path),
            Content::Inline(text) => Ok(text.clone()),
        }
    }
}

/// Lazy sequence of files for one category.
pub type FileIter<'a> = Box<dyn Iterator<Item = MeasurementFile> + Send + 'a>;

/// External source of measurement files.
pub trait MeasurementProvider: Sync {
    /// Files for `category`. Consumed once; no ordering is assumed.
    fn files(&self, category: Category) -> FileIter<'_>;

    /// Human-readable description for logs and reports.
    fn describe(&self) -> String;
}

/// Walks `<root>/<CATEGORY>/` recursively and yields every `*.csv` file.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.dir_name())
    }
}

impl MeasurementProvider for DirectoryProvider {
    fn files(&self, category: Category) -> FileIter<'_> {
        let dir = self.category_dir(category);
        if !dir.is_dir() {
            log::warn!("{category} directory not found: {}", dir.display());
            return Box::new(std::iter::empty());
        }

        let iter = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    log::warn!("Skipping unreadable directory entry: {e}");
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && is_csv(e.path()))
            .map(move |e| MeasurementFile::from_path(category, e.path()));

        Box::new(iter)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("csv")
}

/// In-memory provider: `(category, name, content)` triples.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    files: Vec<MeasurementFile>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, category: Category, name: &str, content: &str) -> Self {
        self.push(category, name, content);
        self
    }

    pub fn push(&mut self, category: Category, name: &str, content: &str) {
        self.files.push(MeasurementFile::inline(category, name, content));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl MeasurementProvider for MemoryProvider {
    fn files(&self, category: Category) -> FileIter<'_> {
        Box::new(
            self.files
                .iter()
                .filter(move |f| f.category == category)
                .cloned(),
        )
    }

    fn describe(&self) -> String {
        format!("memory ({} files)", self.files.len())
    }
}
