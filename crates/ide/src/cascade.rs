use std::cmp::Ordering;
use std::collections::HashSet;

use ecow::EcoString;
use syntax::css::ROOT_SELECTOR;
use syntax::specificity::{self, Specificity};

use crate::color::{Color, parse_color};
use crate::index::Index;
use crate::variable::{VariableDefinition, VariableUsage};

/// `Less` when `a` wins over `b`.
pub fn compare(a: &VariableDefinition, b: &VariableDefinition) -> Ordering {
    b.important
        .cmp(&a.important)
        .then(b.inline.cmp(&a.inline))
        .then_with(|| specificity::calculate(&b.selector).cmp(&specificity::calculate(&a.selector)))
        .then(b.source_position.cmp(&a.source_position))
}

pub fn rank<'a>(
    definitions: impl IntoIterator<Item = &'a VariableDefinition>,
) -> Vec<&'a VariableDefinition> {
    let mut ranked: Vec<_> = definitions.into_iter().collect();
    ranked.sort_by(|a, b| compare(a, b));
    ranked
}

pub fn top<'a>(
    definitions: impl IntoIterator<Item = &'a VariableDefinition>,
) -> Option<&'a VariableDefinition> {
    definitions.into_iter().min_by(|a, b| compare(a, b))
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Candidate<'a> {
    pub definition: &'a VariableDefinition,
    pub specificity: Specificity,
}

pub fn explain<'a>(
    index: &'a Index,
    name: &str,
    usage: Option<&VariableUsage>,
) -> Vec<Candidate<'a>> {
    let definitions = index
        .definitions(name)
        .iter()
        .filter(|definition| usage.is_none_or(|usage| applies(index, definition, usage)));
    rank(definitions)
        .into_iter()
        .map(|definition| Candidate {
            definition,
            specificity: specificity::calculate(&definition.selector),
        })
        .collect()
}

/// Whether `definition` can reach `usage`.
///
/// With a DOM node the definition's selector is matched against the node
/// itself. Without one the test is a textual approximation: `:root` always
/// applies, equal selectors apply, and otherwise any pair of compound tokens
/// where one contains the other.
pub fn applies(index: &Index, definition: &VariableDefinition, usage: &VariableUsage) -> bool {
    let selector = definition.selector.as_str();
    if let (Some(node), Some(tree)) = (usage.dom_node, index.dom_tree(&usage.owner)) {
        return tree.matches(node, selector);
    }
    selector == ROOT_SELECTOR || selectors_overlap(selector, &usage.context)
}

fn selectors_overlap(selector: &str, context: &str) -> bool {
    if selector == context {
        return true;
    }
    let tokens = |text: &str| -> Vec<String> {
        text.split(|c: char| c.is_whitespace() || matches!(c, '>' | '+' | '~' | ','))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    };
    let context = tokens(context);
    tokens(selector).iter().any(|token| {
        context
            .iter()
            .any(|other| token.contains(other.as_str()) || other.contains(token.as_str()))
    })
}

/// Color of `name` under the top-ranked definition, following values that
/// are a single `var()` reference. Cycles and non-color values are
/// unresolved.
pub fn resolve_color(index: &Index, name: &str) -> Option<Color> {
    resolve_name(index, name, &mut HashSet::new())
}

pub fn resolve_value_color(index: &Index, value: &str) -> Option<Color> {
    resolve_value(index, value, &mut HashSet::new())
}

fn resolve_name(index: &Index, name: &str, visited: &mut HashSet<EcoString>) -> Option<Color> {
    if !visited.insert(EcoString::from(name)) {
        return None;
    }
    let definition = top(index.definitions(name))?;
    resolve_value(index, &definition.value, visited)
}

fn resolve_value(index: &Index, value: &str, visited: &mut HashSet<EcoString>) -> Option<Color> {
    match single_var(value) {
        Some((name, fallback)) => resolve_name(index, name, visited)
            .or_else(|| fallback.and_then(|fallback| resolve_value(index, fallback, visited))),
        None => parse_color(value),
    }
}

pub fn single_var(value: &str) -> Option<(&str, Option<&str>)> {
    let value = value.trim();
    if !value.get(..4)?.eq_ignore_ascii_case("var(") {
        return None;
    }
    let inner = value[4..].strip_suffix(')')?;

    let mut depth = 0usize;
    let mut comma = None;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 && comma.is_none() => comma = Some(i),
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }

    let (name, fallback) = match comma {
        Some(i) => (&inner[..i], Some(inner[i + 1..].trim())),
        None => (inner, None),
    };
    let name = name.trim();
    let valid = name.len() > 2 && name.starts_with("--") && !name.contains(char::is_whitespace);
    valid.then_some((name, fallback))
}
