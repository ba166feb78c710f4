use ecow::EcoString;

use crate::cascade;
use crate::color::Color;
use crate::file_system::FilePosition;
use crate::index::Index;
use crate::variable::Reference;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionItem {
    pub label: EcoString,
    pub detail: Option<EcoString>,
    pub color: Option<Color>,
    pub kind: CompletionItemKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionItemKind {
    Variable,
    Color,
}

pub fn exec(index: &Index, pos: &FilePosition) -> Vec<CompletionItem> {
    let usage = match index.reference_at(&pos.file, pos.position) {
        Some(Reference::Usage(usage)) => Some(usage),
        _ => None,
    };

    let mut items: Vec<_> = index
        .variable_names()
        .map(|name| {
            let winner = cascade::explain(index, name, usage)
                .first()
                .map(|candidate| candidate.definition)
                .or_else(|| cascade::top(index.definitions(name)));
            let color =
                winner.and_then(|definition| cascade::resolve_value_color(index, &definition.value));
            CompletionItem {
                label: name.clone(),
                detail: winner.map(|definition| definition.value.clone()),
                kind: if color.is_some() {
                    CompletionItemKind::Color
                } else {
                    CompletionItemKind::Variable
                },
                color,
            }
        })
        .collect();
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items
}
