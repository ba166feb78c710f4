use async_lsp::lsp_types;
use async_lsp::lsp_types::Url;
use ide::color::{Color, ColorFormat, format_color, rgba_components};
use ide::file_system::FileRange;
use ide::handlers::completion::{CompletionItem, CompletionItemKind};
use ide::handlers::diagnostics::{Diagnostic, Severity};
use ide::handlers::document_color::ColorInformation;
use ide::handlers::hover::Hover;
use ide::line_index::LineIndex;
use text_size::{TextRange, TextSize};

use crate::server::ServerSnapshot;
use crate::vfs::UrlExt;

const SOURCE: &str = "css-variables";

pub(crate) fn position(line_index: &LineIndex, offset: TextSize) -> Option<lsp_types::Position> {
    let line_col = line_index.line_col(offset)?;
    Some(lsp_types::Position::new(line_col.line, line_col.col))
}

pub(crate) fn range(line_index: &LineIndex, range: TextRange) -> Option<lsp_types::Range> {
    Some(lsp_types::Range::new(
        position(line_index, range.start())?,
        position(line_index, range.end())?,
    ))
}

pub(crate) fn location(snap: &ServerSnapshot<'_>, file_range: FileRange) -> Option<lsp_types::Location> {
    let line_index = snap.analysis.line_index(&file_range.file)?;
    Some(lsp_types::Location::new(
        Url::from_file_path_opt(&file_range.file)?,
        range(line_index, file_range.range)?,
    ))
}

pub(crate) fn diagnostic(line_index: &LineIndex, diag: Diagnostic) -> Option<lsp_types::Diagnostic> {
    let severity = match diag.severity {
        Severity::Error => lsp_types::DiagnosticSeverity::ERROR,
        Severity::Warning => lsp_types::DiagnosticSeverity::WARNING,
        Severity::Information => lsp_types::DiagnosticSeverity::INFORMATION,
    };
    Some(lsp_types::Diagnostic {
        range: range(line_index, diag.range)?,
        severity: Some(severity),
        source: Some(SOURCE.to_string()),
        message: diag.message,
        ..Default::default()
    })
}

pub(crate) fn hover(line_index: &LineIndex, hover: Hover, format: ColorFormat) -> lsp_types::Hover {
    lsp_types::Hover {
        contents: lsp_types::HoverContents::Markup(lsp_types::MarkupContent {
            kind: lsp_types::MarkupKind::Markdown,
            value: hover.markdown(format),
        }),
        range: range(line_index, hover.range),
    }
}

/// Clients render a color swatch for `COLOR` items whose documentation is a
/// color string.
pub(crate) fn completion_item(item: CompletionItem, format: ColorFormat) -> lsp_types::CompletionItem {
    let mut lsp_item = lsp_types::CompletionItem {
        label: item.label.to_string(),
        detail: item.detail.map(|detail| detail.to_string()),
        ..Default::default()
    };
    lsp_item.kind = Some(match item.kind {
        CompletionItemKind::Variable => lsp_types::CompletionItemKind::VARIABLE,
        CompletionItemKind::Color => lsp_types::CompletionItemKind::COLOR,
    });
    if let Some(color) = item.color {
        lsp_item.documentation = Some(lsp_types::Documentation::String(format_color(
            &color, format,
        )));
    }
    lsp_item
}

pub(crate) fn color(color: &Color) -> lsp_types::Color {
    let [red, green, blue, alpha] = rgba_components(color);
    lsp_types::Color {
        red,
        green,
        blue,
        alpha,
    }
}

pub(crate) fn color_information(
    line_index: &LineIndex,
    info: ColorInformation,
) -> Option<lsp_types::ColorInformation> {
    Some(lsp_types::ColorInformation {
        range: range(line_index, info.range)?,
        color: color(&info.color),
    })
}

pub(crate) fn color_presentation(color: &Color, format: ColorFormat) -> lsp_types::ColorPresentation {
    lsp_types::ColorPresentation {
        label: format_color(color, format),
        text_edit: None,
        additional_text_edits: None,
    }
}
