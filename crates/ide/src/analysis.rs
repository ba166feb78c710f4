use crate::file_system::{FilePath, FilePosition, FileRange, FileSystem, ScanConfig, ScanError};
use crate::handlers::completion::{self, CompletionItem};
use crate::handlers::diagnostics::{self, Diagnostic, Severity};
use crate::handlers::document_color::{self, ColorInformation};
use crate::handlers::hover::{self, Hover};
use crate::handlers::{goto_definition, references};
use crate::index::{DocumentKind, Index, Scan};
use crate::line_index::LineIndex;

#[derive(Debug, Default)]
pub struct AnalysisHost {
    index: Index,
}

impl AnalysisHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analysis(&self) -> Analysis<'_> {
        Analysis { index: &self.index }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut Index {
        &mut self.index
    }

    pub fn set_file_content(&mut self, file: FilePath, text: &str, kind: DocumentKind) {
        self.index.parse(text, file, kind);
    }

    pub fn remove_file(&mut self, file: &FilePath) {
        self.index.remove(file);
    }

    pub fn refresh_from_disk<FS: FileSystem + ?Sized>(&mut self, fs: &FS, file: &FilePath) {
        self.index.refresh_from_disk(fs, file);
    }

    pub fn scan<'a, FS: FileSystem + ?Sized>(
        &'a mut self,
        fs: &'a FS,
        roots: &[FilePath],
        config: &ScanConfig,
    ) -> Result<Scan<'a, FS>, ScanError> {
        self.index.scan(fs, roots, config)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Analysis<'a> {
    index: &'a Index,
}

impl Analysis<'_> {
    pub fn line_index(&self, file: &FilePath) -> Option<&LineIndex> {
        self.index.line_index(file)
    }

    pub fn hover(&self, pos: &FilePosition) -> Option<Hover> {
        hover::exec(self.index, pos)
    }

    pub fn completion(&self, pos: &FilePosition) -> Vec<CompletionItem> {
        completion::exec(self.index, pos)
    }

    pub fn references(
        &self,
        pos: &FilePosition,
        include_declaration: bool,
    ) -> Option<Vec<FileRange>> {
        references::exec(self.index, pos, include_declaration)
    }

    pub fn goto_definition(&self, pos: &FilePosition) -> Option<Vec<FileRange>> {
        goto_definition::exec(self.index, pos)
    }

    pub fn document_color(&self, file: &FilePath) -> Vec<ColorInformation> {
        document_color::exec(self.index, file)
    }

    pub fn diagnostics(&self, file: &FilePath, undefined: Option<Severity>) -> Vec<Diagnostic> {
        diagnostics::exec(self.index, file, undefined)
    }
}
