mod matcher;

use id_arena::Arena;
use syntax::TextSize;
use syntax::html::{Element, ElementId, HtmlParse};
use syntax::selector::{self, SelectorList};

/// Handle to an element of a [`DomTree`]. It is only meaningful for the tree
/// of the document it was taken from, and only until that document is
/// reparsed.
pub type NodeId = ElementId;

#[derive(Debug)]
pub struct DomTree {
    elements: Arena<Element>,
    roots: Vec<NodeId>,
}

impl DomTree {
    pub fn new(elements: Arena<Element>, roots: Vec<NodeId>) -> Self {
        Self { elements, roots }
    }

    pub fn from_parse(parse: &mut HtmlParse) -> Self {
        Self::new(
            std::mem::take(&mut parse.elements),
            std::mem::take(&mut parse.roots),
        )
    }

    pub fn node(&self, id: NodeId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Deepest element whose range contains `offset`.
    pub fn node_at(&self, offset: TextSize) -> Option<NodeId> {
        let mut found = None;
        let mut candidates = self.roots.as_slice();
        while let Some(&id) = candidates
            .iter()
            .find(|id| self.elements[**id].range.contains(offset))
        {
            found = Some(id);
            candidates = &self.elements[id].children;
        }
        found
    }

    /// Whether `node` is selected by `selector`. Invalid selectors match
    /// nothing.
    pub fn matches(&self, node: NodeId, selector: &str) -> bool {
        let Ok(list) = selector::parse(selector) else {
            return false;
        };
        let scope = self.parent(node);
        self.query_in(scope, &list).contains(&node)
    }

    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        match selector::parse(selector) {
            Ok(list) => self.query_in(None, &list),
            Err(_) => Vec::new(),
        }
    }

    fn query_in(&self, scope: Option<NodeId>, list: &SelectorList) -> Vec<NodeId> {
        let start = match scope {
            Some(scope) => self.children(scope),
            None => &self.roots,
        };
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = start.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if matcher::matches_list(self, id, list) {
                found.push(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        found
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.elements.get(node)?.parent
    }

    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |id| self.parent(*id))
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.elements
            .get(node)
            .map(|element| element.children.as_slice())
            .unwrap_or_default()
    }

    fn siblings(&self, node: NodeId) -> &[NodeId] {
        match self.parent(node) {
            Some(parent) => self.children(parent),
            None => &self.roots,
        }
    }
}

#[cfg(test)]
mod tests {
    use syntax::html;

    use super::*;

    fn tree(text: &str) -> DomTree {
        DomTree::from_parse(&mut html::parse(text))
    }

    fn tags(tree: &DomTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|id| {
                let element = tree.node(*id).unwrap();
                match element.id() {
                    Some(name) => format!("{}#{name}", element.tag),
                    None => element.tag.to_string(),
                }
            })
            .collect()
    }

    const PAGE: &str = r#"<html><body>
<main id="app" class="layout dark">
  <ul><li id="a">one</li><li id="b" class="x">two</li><li id="c"></li></ul>
  <p id="d" style="color: var(--fg)">text</p>
</main>
<a id="e" href="/x"></a>
</body></html>"#;

    #[test]
    fn node_at_returns_the_deepest_element() {
        let tree = tree(PAGE);
        let offset = PAGE.find("two").unwrap();
        let node = tree.node_at(TextSize::try_from(offset).unwrap()).unwrap();
        assert_eq!(tags(&tree, &[node]), vec!["li#b"]);

        let offset = PAGE.find("color").unwrap();
        let node = tree.node_at(TextSize::try_from(offset).unwrap()).unwrap();
        assert_eq!(tags(&tree, &[node]), vec!["p#d"]);

        assert_eq!(tree.node_at(TextSize::try_from(PAGE.len()).unwrap()), None);
    }

    #[test]
    fn query_all_in_document_order() {
        let tree = tree(PAGE);
        assert_eq!(
            tags(&tree, &tree.query_all("li, #app")),
            vec!["main#app", "li#a", "li#b", "li#c"]
        );
        assert_eq!(tags(&tree, &tree.query_all(".dark > ul li.x")), vec!["li#b"]);
        assert_eq!(tags(&tree, &tree.query_all("li + li")), vec!["li#b", "li#c"]);
        assert_eq!(tags(&tree, &tree.query_all("#a ~ [id=c]")), vec!["li#c"]);
        assert_eq!(tags(&tree, &tree.query_all("main p")), vec!["p#d"]);
    }

    #[test]
    fn structural_pseudo_classes() {
        let tree = tree(PAGE);
        assert_eq!(tags(&tree, &tree.query_all(":root")), vec!["html"]);
        assert_eq!(tags(&tree, &tree.query_all("li:first-child")), vec!["li#a"]);
        assert_eq!(tags(&tree, &tree.query_all("li:last-child")), vec!["li#c"]);
        assert_eq!(tags(&tree, &tree.query_all("li:nth-child(odd)")), vec!["li#a", "li#c"]);
        assert_eq!(tags(&tree, &tree.query_all("li:empty")), vec!["li#c"]);
        assert_eq!(tags(&tree, &tree.query_all("ul:only-child")), vec![] as Vec<String>);
        assert_eq!(tags(&tree, &tree.query_all("li:not(.x, #a)")), vec!["li#c"]);
        assert_eq!(tags(&tree, &tree.query_all(":is(p, a):any-link")), vec!["a#e"]);
        assert!(tree.query_all("li:hover").is_empty());
        assert!(tree.query_all("p::before").is_empty());
    }

    #[test]
    fn matches_a_single_node() {
        let tree = tree(PAGE);
        let p = tree.query_all("#d")[0];
        assert!(tree.matches(p, "main > p"));
        assert!(tree.matches(p, "body p"));
        assert!(tree.matches(p, "ul, p[style*=var]"));
        assert!(!tree.matches(p, "ul > p"));
        assert!(!tree.matches(p, "p:unknown"));
        assert!(!tree.matches(p, "p >"));
    }

    #[test]
    fn invalid_selectors_query_nothing() {
        let tree = tree(PAGE);
        assert!(tree.query_all("li[").is_empty());
        assert!(tree.query_all("").is_empty());
    }

    #[test]
    fn ancestors_walk_up_to_the_root() {
        let tree = tree(PAGE);
        let li = tree.query_all("#a")[0];
        let ancestors: Vec<_> = tree.ancestors(li).collect();
        assert_eq!(tags(&tree, &ancestors), vec!["ul", "main#app", "body", "html"]);
    }
}
