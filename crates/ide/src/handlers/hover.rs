use std::fmt::Write;

use ecow::EcoString;
use syntax::TextRange;
use syntax::specificity::Specificity;

use crate::cascade;
use crate::color::{Color, ColorFormat, format_color};
use crate::file_system::{FilePosition, FileRange};
use crate::index::Index;
use crate::variable::Reference;

#[derive(Debug, Clone, PartialEq)]
pub struct Hover {
    pub name: EcoString,
    pub range: TextRange,
    pub candidates: Vec<HoverCandidate>,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HoverCandidate {
    pub selector: EcoString,
    pub value: EcoString,
    pub important: bool,
    pub specificity: Specificity,
    pub location: FileRange,
}

pub fn exec(index: &Index, pos: &FilePosition) -> Option<Hover> {
    let reference = index.reference_at(&pos.file, pos.position)?;
    let (name, range, usage) = match reference {
        Reference::Definition(definition) => {
            (definition.name.clone(), definition.name_range(), None)
        }
        Reference::Usage(usage) => (usage.name.clone(), usage.range, Some(usage)),
    };

    let candidates: Vec<_> = cascade::explain(index, &name, usage)
        .into_iter()
        .map(|candidate| HoverCandidate {
            selector: candidate.definition.selector.clone(),
            value: candidate.definition.value.clone(),
            important: candidate.definition.important,
            specificity: candidate.specificity,
            location: candidate.definition.location(),
        })
        .collect();

    let color = match (usage, candidates.first()) {
        (None, _) => cascade::resolve_color(index, &name),
        (Some(_), Some(winner)) => cascade::resolve_value_color(index, &winner.value),
        (Some(usage), None) => usage
            .fallback
            .as_deref()
            .and_then(|fallback| cascade::resolve_value_color(index, fallback)),
    };

    Some(Hover {
        name,
        range,
        candidates,
        color,
    })
}

impl Hover {
    pub fn markdown(&self, format: ColorFormat) -> String {
        let mut out = format!("**{}**", self.name);
        if let Some(color) = &self.color {
            let _ = write!(out, ": `{}`", format_color(color, format));
        }
        out.push_str("\n\n");

        if self.candidates.is_empty() {
            out.push_str("no applicable definition");
            return out;
        }
        for (i, candidate) in self.candidates.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let important = if candidate.important {
                " !important"
            } else {
                ""
            };
            let file = candidate
                .location
                .file
                .as_path()
                .file_name()
                .map(|name| name.to_string_lossy())
                .unwrap_or_default();
            let _ = write!(
                out,
                "{}. `{}` {}{important} {}, {file}",
                i + 1,
                candidate.selector,
                candidate.value,
                candidate.specificity,
            );
        }
        out
    }
}
