use async_lsp::lsp_types;
use ide::color::Color;
use ide::file_system::{FilePath, FilePosition};
use ide::line_index::{LineCol, LineIndex};
use text_size::TextSize;

use crate::server::ServerSnapshot;
use crate::vfs::UrlExt;

pub(crate) fn offset(line_index: &LineIndex, position: lsp_types::Position) -> Option<TextSize> {
    line_index.offset(LineCol {
        line: position.line,
        col: position.character,
    })
}

pub(crate) fn file(doc: &lsp_types::TextDocumentIdentifier) -> Option<FilePath> {
    doc.uri.to_file_path_opt()
}

pub(crate) fn file_pos(
    snap: &ServerSnapshot<'_>,
    doc: lsp_types::TextDocumentPositionParams,
) -> Option<FilePosition> {
    let file = file(&doc.text_document)?;
    let line_index = snap.analysis.line_index(&file)?;
    let position = offset(line_index, doc.position)?;
    Some(FilePosition::new(file, position))
}

pub(crate) fn color(color: lsp_types::Color) -> Color {
    Color::new(color.red, color.green, color.blue, color.alpha)
}
