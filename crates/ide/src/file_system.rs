use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use syntax::{TextRange, TextSize};
use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FilePath(pub PathBuf);

impl FilePath {
    pub fn join(&self, path: impl AsRef<Path>) -> FilePath {
        FilePath(self.0.join(path))
    }

    pub fn parent(&self) -> Option<FilePath> {
        self.0.parent().map(FilePath::from)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn extension(&self) -> Option<&str> {
        self.0.extension().and_then(|ext| ext.to_str())
    }

    pub fn relative_to(&self, root: &FilePath) -> &Path {
        self.0.strip_prefix(&root.0).unwrap_or(&self.0)
    }
}

impl From<&Path> for FilePath {
    fn from(value: &Path) -> Self {
        Self(value.to_path_buf())
    }
}

impl From<PathBuf> for FilePath {
    fn from(value: PathBuf) -> Self {
        Self(value)
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FilePosition {
    pub file: FilePath,
    pub position: TextSize,
}

impl FilePosition {
    pub fn new(file: FilePath, position: TextSize) -> Self {
        Self { file, position }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FileRange {
    pub file: FilePath,
    pub range: TextRange,
}

impl FileRange {
    pub fn new(file: FilePath, range: TextRange) -> Self {
        Self { file, range }
    }
}

pub trait FileSystem {
    fn read_content(&self, file_path: &FilePath) -> io::Result<String>;

    /// Every file below `root` accepted by `filter`, in a stable order.
    fn walk(&self, root: &FilePath, filter: &FileFilter) -> Vec<FilePath>;
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

#[derive(Debug, Clone)]
pub struct FileFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, ScanError> {
        Ok(Self {
            include: build_glob_set(include)?,
            exclude: build_glob_set(exclude)?,
        })
    }

    pub fn is_match(&self, relative: &Path) -> bool {
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }

    pub fn is_excluded_dir(&self, relative: &Path) -> bool {
        !relative.as_os_str().is_empty() && self.exclude.is_match(relative)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ScanError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ScanError::InvalidGlob {
        pattern: patterns.join(", "),
        source,
    })
}

pub const DEFAULT_INCLUDE: &str = "**/*.{css,scss,less,html,htm,vue,svelte,astro}";

pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "out",
    "coverage",
    ".git",
    ".svn",
    ".hg",
    "target",
];

const DEFAULT_PROGRESS_INTERVAL: usize = 50;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ScanConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Number of parsed files between two progress reports.
    pub progress_interval: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include: vec![DEFAULT_INCLUDE.to_string()],
            exclude: default_exclude(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl ScanConfig {
    pub fn filter(&self) -> Result<FileFilter, ScanError> {
        FileFilter::new(&self.include, &self.exclude)
    }
}

pub fn default_exclude() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRS
        .iter()
        .flat_map(|dir| [format!("**/{dir}"), format!("**/{dir}/**")])
        .collect()
}
