use syntax::html::Element;
use syntax::selector::{
    Combinator, ComplexSelector, CompoundSelector, Nth, PseudoClass, SelectorList, SimpleSelector,
};

use super::{DomTree, NodeId};

pub(super) fn matches_list(tree: &DomTree, node: NodeId, list: &SelectorList) -> bool {
    list.selectors
        .iter()
        .any(|selector| matches_complex(tree, node, selector))
}

fn matches_complex(tree: &DomTree, node: NodeId, selector: &ComplexSelector) -> bool {
    matches_from(tree, node, selector, selector.rest.len())
}

/// Matches the compound at `index` (0 is `first`) against `node`, then the
/// compounds left of it against the elements its combinator points to.
fn matches_from(tree: &DomTree, node: NodeId, selector: &ComplexSelector, index: usize) -> bool {
    let (compound, combinator) = match index.checked_sub(1) {
        None => (&selector.first, None),
        Some(prev) => {
            let (combinator, compound) = &selector.rest[prev];
            (compound, Some(*combinator))
        }
    };
    if !matches_compound(tree, node, compound) {
        return false;
    }
    let Some(combinator) = combinator else {
        return true;
    };

    let left = index - 1;
    match combinator {
        Combinator::Descendant => tree
            .ancestors(node)
            .any(|ancestor| matches_from(tree, ancestor, selector, left)),
        Combinator::Child => tree
            .parent(node)
            .is_some_and(|parent| matches_from(tree, parent, selector, left)),
        Combinator::NextSibling => previous_siblings(tree, node)
            .next()
            .is_some_and(|sibling| matches_from(tree, sibling, selector, left)),
        Combinator::SubsequentSibling => previous_siblings(tree, node)
            .any(|sibling| matches_from(tree, sibling, selector, left)),
    }
}

fn matches_compound(tree: &DomTree, node: NodeId, compound: &CompoundSelector) -> bool {
    let Some(element) = tree.node(node) else {
        return false;
    };
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(tree, node, element, simple))
}

fn matches_simple(tree: &DomTree, node: NodeId, element: &Element, simple: &SimpleSelector) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(tag) => element.tag == *tag,
        SimpleSelector::Id(id) => element.id() == Some(id.as_str()),
        SimpleSelector::Class(class) => element.has_class(class),
        SimpleSelector::Attribute(attribute) => {
            attribute.matches(element.attribute(&attribute.name))
        }
        SimpleSelector::PseudoClass(pseudo) => matches_pseudo_class(tree, node, element, pseudo),
        SimpleSelector::PseudoElement(_) => false,
    }
}

fn matches_pseudo_class(
    tree: &DomTree,
    node: NodeId,
    element: &Element,
    pseudo: &PseudoClass,
) -> bool {
    match pseudo {
        PseudoClass::Root => element.parent.is_none() && element.tag == "html",
        PseudoClass::Empty => element.children.is_empty() && !element.has_text,
        PseudoClass::FirstChild => nth_child(tree, node, Nth { a: 0, b: 1 }, false, false),
        PseudoClass::LastChild => nth_child(tree, node, Nth { a: 0, b: 1 }, true, false),
        PseudoClass::OnlyChild => tree.siblings(node).len() == 1,
        PseudoClass::FirstOfType => nth_child(tree, node, Nth { a: 0, b: 1 }, false, true),
        PseudoClass::LastOfType => nth_child(tree, node, Nth { a: 0, b: 1 }, true, true),
        PseudoClass::OnlyOfType => {
            nth_child(tree, node, Nth { a: 0, b: 1 }, false, true)
                && nth_child(tree, node, Nth { a: 0, b: 1 }, true, true)
        }
        PseudoClass::NthChild(nth) => nth_child(tree, node, *nth, false, false),
        PseudoClass::NthLastChild(nth) => nth_child(tree, node, *nth, true, false),
        PseudoClass::NthOfType(nth) => nth_child(tree, node, *nth, false, true),
        PseudoClass::NthLastOfType(nth) => nth_child(tree, node, *nth, true, true),
        PseudoClass::Not(list) => !matches_list(tree, node, list),
        PseudoClass::Is(list) => matches_list(tree, node, list),
        PseudoClass::Link => {
            matches!(element.tag.as_str(), "a" | "area") && element.attribute("href").is_some()
        }
        PseudoClass::Dynamic(_) => false,
    }
}

/// Position test among the siblings of `node`, counted from the end when
/// `from_end` is set, and among siblings with the same tag when `of_type` is
/// set.
fn nth_child(tree: &DomTree, node: NodeId, nth: Nth, from_end: bool, of_type: bool) -> bool {
    let Some(element) = tree.node(node) else {
        return false;
    };
    let mut siblings = tree.siblings(node).iter().filter(|id| {
        !of_type || tree.node(**id).is_some_and(|other| other.tag == element.tag)
    });
    let position = if from_end {
        siblings.rev().position(|id| *id == node)
    } else {
        siblings.position(|id| *id == node)
    };
    position
        .and_then(|position| i32::try_from(position + 1).ok())
        .is_some_and(|index| nth.matches(index))
}

fn previous_siblings(tree: &DomTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    let siblings = tree.siblings(node);
    let position = siblings
        .iter()
        .position(|id| *id == node)
        .unwrap_or_default();
    siblings[..position].iter().rev().copied()
}
