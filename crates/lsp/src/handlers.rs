use async_lsp::lsp_types::{
    ColorInformation, ColorPresentation, ColorPresentationParams, CompletionParams,
    CompletionResponse, DocumentColorParams, GotoDefinitionParams, GotoDefinitionResponse, Hover,
    HoverParams, Location, ReferenceParams,
};

use crate::server::ServerSnapshot;
use crate::{from_proto, to_proto};

pub(crate) fn hover(snap: ServerSnapshot<'_>, params: HoverParams) -> Option<Hover> {
    tracing::debug!("hover: {params:?}");
    let pos = from_proto::file_pos(&snap, params.text_document_position_params)?;
    let line_index = snap.analysis.line_index(&pos.file)?;
    let hover = snap.analysis.hover(&pos)?;
    Some(to_proto::hover(line_index, hover, snap.config.color_format))
}

pub(crate) fn completion(
    snap: ServerSnapshot<'_>,
    params: CompletionParams,
) -> Option<CompletionResponse> {
    tracing::debug!("completion: {params:?}");
    let pos = from_proto::file_pos(&snap, params.text_document_position)?;
    let items = snap
        .analysis
        .completion(&pos)
        .into_iter()
        .map(|it| to_proto::completion_item(it, snap.config.color_format))
        .collect();
    Some(CompletionResponse::Array(items))
}

pub(crate) fn definition(
    snap: ServerSnapshot<'_>,
    params: GotoDefinitionParams,
) -> Option<GotoDefinitionResponse> {
    tracing::debug!("goto_definition: {params:?}");
    let pos = from_proto::file_pos(&snap, params.text_document_position_params)?;
    let locations: Vec<_> = snap
        .analysis
        .goto_definition(&pos)?
        .into_iter()
        .filter_map(|it| to_proto::location(&snap, it))
        .collect();
    Some(GotoDefinitionResponse::Array(locations))
}

pub(crate) fn references(snap: ServerSnapshot<'_>, params: ReferenceParams) -> Option<Vec<Location>> {
    tracing::debug!("references: {params:?}");
    let include_declaration = params.context.include_declaration;
    let pos = from_proto::file_pos(&snap, params.text_document_position)?;
    let locations = snap
        .analysis
        .references(&pos, include_declaration)?
        .into_iter()
        .filter_map(|it| to_proto::location(&snap, it))
        .collect();
    Some(locations)
}

pub(crate) fn document_color(snap: ServerSnapshot<'_>, params: DocumentColorParams) -> Vec<ColorInformation> {
    tracing::debug!("document_color: {params:?}");
    let Some(file) = from_proto::file(&params.text_document) else {
        return Vec::new();
    };
    let Some(line_index) = snap.analysis.line_index(&file) else {
        return Vec::new();
    };
    snap.analysis
        .document_color(&file)
        .into_iter()
        .filter_map(|it| to_proto::color_information(line_index, it))
        .collect()
}

pub(crate) fn color_presentation(
    snap: ServerSnapshot<'_>,
    params: ColorPresentationParams,
) -> Vec<ColorPresentation> {
    tracing::debug!("color_presentation: {params:?}");
    let color = from_proto::color(params.color);
    vec![to_proto::color_presentation(&color, snap.config.color_format)]
}
