use std::collections::HashMap;
use std::fs;
use std::io;

use async_lsp::lsp_types::Url;
use ide::file_system::{FileFilter, FilePath, FileSystem};
use ide::index::DocumentKind;
use ignore::WalkBuilder;

/// Files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn read_content(&self, file_path: &FilePath) -> io::Result<String> {
        fs::read_to_string(file_path.as_path())
    }

    fn walk(&self, root: &FilePath, filter: &FileFilter) -> Vec<FilePath> {
        let root_path = root.0.clone();
        let dir_filter = filter.clone();
        let walker = WalkBuilder::new(root.as_path())
            .standard_filters(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|it| it.is_dir());
                let relative = entry.path().strip_prefix(&root_path).unwrap_or(entry.path());
                !(is_dir && dir_filter.is_excluded_dir(relative))
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(root = %root, "failed to walk: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|it| it.is_file()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root.as_path())
                .unwrap_or(entry.path());
            if filter.is_match(relative) {
                files.push(FilePath::from(entry.path()));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        files
    }
}

#[derive(Debug, Clone)]
pub struct OpenFile {
    pub text: String,
    pub version: i32,
    pub kind: DocumentKind,
}

/// Documents open in the editor layered over the disk. Reads of an open
/// document see the editor's text.
#[derive(Debug, Default)]
pub struct Vfs {
    open: HashMap<FilePath, OpenFile>,
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, path: FilePath, file: OpenFile) {
        self.open.insert(path, file);
    }

    /// Replaces the text of an open document; `None` if it is not open.
    pub fn change(&mut self, path: &FilePath, text: String, version: i32) -> Option<&OpenFile> {
        let file = self.open.get_mut(path)?;
        file.text = text;
        file.version = version;
        Some(file)
    }

    pub fn close(&mut self, path: &FilePath) -> Option<OpenFile> {
        self.open.remove(path)
    }

    pub fn is_open(&self, path: &FilePath) -> bool {
        self.open.contains_key(path)
    }

    pub fn open_files(&self) -> impl Iterator<Item = (&FilePath, &OpenFile)> + '_ {
        self.open.iter()
    }
}

impl FileSystem for Vfs {
    fn read_content(&self, file_path: &FilePath) -> io::Result<String> {
        match self.open.get(file_path) {
            Some(file) => Ok(file.text.clone()),
            None => DiskFileSystem.read_content(file_path),
        }
    }

    fn walk(&self, root: &FilePath, filter: &FileFilter) -> Vec<FilePath> {
        DiskFileSystem.walk(root, filter)
    }
}

pub(crate) trait UrlExt: Sized {
    fn to_file_path_opt(&self) -> Option<FilePath>;
    fn from_file_path_opt(path: &FilePath) -> Option<Self>;
}

impl UrlExt for Url {
    fn to_file_path_opt(&self) -> Option<FilePath> {
        match self.to_file_path() {
            Ok(path) => Some(path.into()),
            Err(()) => {
                tracing::warn!(url = %self, "not a file url");
                None
            }
        }
    }

    fn from_file_path_opt(path: &FilePath) -> Option<Self> {
        match Url::from_file_path(path.as_path()) {
            Ok(url) => Some(url),
            Err(()) => {
                tracing::warn!(%path, "cannot convert path to url");
                None
            }
        }
    }
}
