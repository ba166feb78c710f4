use ecow::EcoString;
use id_arena::{Arena, Id};
use text_size::{TextRange, TextSize};
use unscanny::Scanner;

use crate::error::SyntaxError;
use crate::to_text_size;

pub type ElementId = Id<Element>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Attribute {
    pub name: EcoString,
    pub value: EcoString,
    pub value_range: TextRange,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Element {
    /// Lowercased tag name.
    pub tag: EcoString,
    pub attributes: Vec<Attribute>,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub has_text: bool,
    /// From the `<` of the start tag to the `>` of the end tag.
    pub range: TextRange,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|it| it == class)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FragmentKind {
    StyleElement,
    /// Value of a `style` attribute on the given element.
    StyleAttribute(ElementId),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StyleFragment {
    pub kind: FragmentKind,
    pub range: TextRange,
}

impl StyleFragment {
    /// Offset of the fragment in the document it was extracted from.
    pub fn base(&self) -> TextSize {
        self.range.start()
    }

    pub fn text<'a>(&self, document: &'a str) -> &'a str {
        &document[self.range]
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.kind, FragmentKind::StyleAttribute(_))
    }
}

#[derive(Debug)]
pub struct HtmlParse {
    pub elements: Arena<Element>,
    pub roots: Vec<ElementId>,
    pub fragments: Vec<StyleFragment>,
    pub errors: Vec<SyntaxError>,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub fn parse(text: &str) -> HtmlParse {
    let mut scanner = HtmlScanner {
        s: Scanner::new(text),
        elements: Arena::new(),
        roots: Vec::new(),
        open: Vec::new(),
        fragments: Vec::new(),
        errors: Vec::new(),
    };
    scanner.document();
    HtmlParse {
        elements: scanner.elements,
        roots: scanner.roots,
        fragments: scanner.fragments,
        errors: scanner.errors,
    }
}

struct HtmlScanner<'a> {
    s: Scanner<'a>,
    elements: Arena<Element>,
    roots: Vec<ElementId>,
    open: Vec<ElementId>,
    fragments: Vec<StyleFragment>,
    errors: Vec<SyntaxError>,
}

impl<'a> HtmlScanner<'a> {
    fn document(&mut self) {
        loop {
            let text = self.s.eat_until('<');
            if !text.trim().is_empty()
                && let Some(id) = self.open.last()
            {
                self.elements[*id].has_text = true;
            }
            if self.s.done() {
                break;
            }
            let start = self.s.cursor();
            if self.s.eat_if("<!--") {
                self.comment(start);
            } else if self.s.eat_if("</") {
                self.end_tag(start);
            } else if self.s.eat_if("<!") || self.s.eat_if("<?") {
                self.s.eat_until('>');
                self.s.eat_if('>');
            } else {
                self.s.eat();
                if self.s.at(|c: char| c.is_ascii_alphabetic()) {
                    self.start_tag(start);
                }
            }
        }

        let end = self.s.cursor();
        while let Some(id) = self.open.pop() {
            self.close(id, end);
        }
    }

    fn comment(&mut self, start: usize) {
        self.s.eat_until("-->");
        if !self.s.eat_if("-->") {
            self.error(start, "unterminated comment");
        }
    }

    fn start_tag(&mut self, start: usize) {
        let tag = self.tag_name();
        let attributes = self.attributes();
        let self_closing = self.s.eat_if("/>");
        if !self_closing && !self.s.eat_if('>') {
            self.error(start, "unterminated start tag");
        }

        let parent = self.open.last().copied();
        let id = self.elements.alloc(Element {
            tag: tag.clone(),
            attributes,
            parent,
            children: Vec::new(),
            has_text: false,
            range: self.range_from(start),
        });
        match parent {
            Some(parent) => self.elements[parent].children.push(id),
            None => self.roots.push(id),
        }

        let style_attributes: Vec<_> = self.elements[id]
            .attributes
            .iter()
            .filter(|attr| attr.name == "style")
            .map(|attr| attr.value_range)
            .collect();
        self.fragments
            .extend(style_attributes.into_iter().map(|range| StyleFragment {
                kind: FragmentKind::StyleAttribute(id),
                range,
            }));

        if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            self.raw_text(id, &tag);
            return;
        }
        self.open.push(id);
    }

    fn raw_text(&mut self, id: ElementId, tag: &str) {
        let content_start = self.s.cursor();
        let needle = format!("</{tag}");
        loop {
            self.s.eat_until('<');
            if self.s.done() {
                break;
            }
            let closes = self
                .s
                .after()
                .get(..needle.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&needle));
            if closes {
                break;
            }
            self.s.eat();
        }
        let content_end = self.s.cursor();
        self.elements[id].has_text = !self.s.get(content_start..content_end).trim().is_empty();

        if tag == "style" {
            self.fragments.push(StyleFragment {
                kind: FragmentKind::StyleElement,
                range: TextRange::new(to_text_size(content_start), to_text_size(content_end)),
            });
        }

        if self.s.done() {
            let start = self.elements[id].range.start().into();
            self.error(start, format!("unclosed <{tag}> element"));
        } else {
            self.s.eat_until('>');
            self.s.eat_if('>');
        }
        self.close(id, self.s.cursor());
    }

    fn end_tag(&mut self, start: usize) {
        let tag = self.tag_name();
        self.s.eat_until('>');
        self.s.eat_if('>');

        let Some(depth) = self
            .open
            .iter()
            .rposition(|id| self.elements[*id].tag == tag)
        else {
            return;
        };
        // Elements left open inside the closed one end where its end tag starts.
        while self.open.len() > depth + 1 {
            if let Some(id) = self.open.pop() {
                self.close(id, start);
            }
        }
        if let Some(id) = self.open.pop() {
            self.close(id, self.s.cursor());
        }
    }

    fn tag_name(&mut self) -> EcoString {
        let name = self
            .s
            .eat_while(|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'));
        EcoString::from(name.to_ascii_lowercase())
    }

    fn attributes(&mut self) -> Vec<Attribute> {
        let mut attributes: Vec<Attribute> = Vec::new();
        loop {
            self.s.eat_whitespace();
            if self.s.done() || self.s.at('>') || self.s.at("/>") {
                break;
            }
            let name_start = self.s.cursor();
            let name = self
                .s
                .eat_while(|c: char| !c.is_whitespace() && !matches!(c, '=' | '>' | '/'));
            if name.is_empty() {
                self.s.eat();
                continue;
            }
            let name = EcoString::from(name.to_ascii_lowercase());

            self.s.eat_whitespace();
            let (value, value_range) = if self.s.eat_if('=') {
                self.s.eat_whitespace();
                self.attribute_value(name_start)
            } else {
                let end = to_text_size(self.s.cursor());
                (EcoString::new(), TextRange::empty(end))
            };

            if attributes.iter().all(|attr| attr.name != name) {
                attributes.push(Attribute {
                    name,
                    value,
                    value_range,
                });
            }
        }
        attributes
    }

    fn attribute_value(&mut self, name_start: usize) -> (EcoString, TextRange) {
        match self.s.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.s.eat();
                let start = self.s.cursor();
                let value = self.s.eat_until(quote);
                let range = self.range_from(start);
                if !self.s.eat_if(quote) {
                    self.error(name_start, "unterminated attribute value");
                }
                (EcoString::from(value), range)
            }
            _ => {
                let start = self.s.cursor();
                let value = self.s.eat_while(|c: char| !c.is_whitespace() && c != '>');
                (EcoString::from(value), self.range_from(start))
            }
        }
    }

    fn close(&mut self, id: ElementId, end: usize) {
        let start = self.elements[id].range.start();
        let end = to_text_size(end).max(start);
        self.elements[id].range = TextRange::new(start, end);
    }

    fn range_from(&self, start: usize) -> TextRange {
        TextRange::new(to_text_size(start), to_text_size(self.s.cursor()))
    }

    fn error(&mut self, start: usize, message: impl Into<EcoString>) {
        let range = self.range_from(start);
        self.errors.push(SyntaxError::new(range, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(parse: &HtmlParse, ids: &[ElementId]) -> Vec<String> {
        ids.iter()
            .map(|id| parse.elements[*id].tag.to_string())
            .collect()
    }

    #[test]
    fn builds_the_element_tree() {
        let parse = parse("<!DOCTYPE html><html><body><div id=a class='x y'><br><p>hi</p></div></body></html>");
        assert_eq!(tags(&parse, &parse.roots), vec!["html"]);
        let html = &parse.elements[parse.roots[0]];
        let body = &parse.elements[html.children[0]];
        let div = &parse.elements[body.children[0]];
        assert_eq!(div.id(), Some("a"));
        assert!(div.has_class("y"));
        assert_eq!(tags(&parse, &div.children), vec!["br", "p"]);
        assert!(!div.has_text);
        assert!(parse.elements[div.children[1]].has_text);
        assert!(parse.errors.is_empty());
    }

    #[test]
    fn element_ranges_cover_start_and_end_tags() {
        let text = "<div><span>x</span></div>";
        let parse = parse(text);
        let div = &parse.elements[parse.roots[0]];
        let span = &parse.elements[div.children[0]];
        assert_eq!(&text[div.range], text);
        assert_eq!(&text[span.range], "<span>x</span>");
    }

    #[test]
    fn comments_are_not_descended_into() {
        let parse = parse("<div></div><!-- <p style=\"--a: 1\"></p> --><span></span>");
        assert_eq!(tags(&parse, &parse.roots), vec!["div", "span"]);
        assert!(parse.fragments.is_empty());
    }

    #[test]
    fn style_fragments_are_reported_with_offsets() {
        let text = "<style>:root{--a:red}</style><p style=\"color: var(--a)\">t</p>";
        let parse = parse(text);
        let fragments: Vec<_> = parse
            .fragments
            .iter()
            .map(|it| (it.is_inline(), it.text(text)))
            .collect();
        assert_eq!(
            fragments,
            vec![(false, ":root{--a:red}"), (true, "color: var(--a)")]
        );
    }

    #[test]
    fn raw_text_hides_markup() {
        let parse = parse("<script>if (a < b) { x = '<div>' }</script><p></p>");
        assert_eq!(tags(&parse, &parse.roots), vec!["script", "p"]);
        assert!(parse.elements[parse.roots[0]].children.is_empty());
    }

    #[test]
    fn unclosed_elements_end_at_the_closing_parent() {
        let text = "<ul><li>a<li>b</ul>";
        let parse = parse(text);
        let ul = &parse.elements[parse.roots[0]];
        // Without implied end tags the second item nests in the first.
        let first = &parse.elements[ul.children[0]];
        assert_eq!(&text[first.range], "<li>a<li>b");
        assert_eq!(&text[ul.range], text);
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let parse = parse("<div></span></div>");
        assert_eq!(tags(&parse, &parse.roots), vec!["div"]);
    }

    #[test]
    fn unclosed_style_is_an_error() {
        let parse = parse("<style>:root { --a: 1; }");
        assert_eq!(parse.fragments.len(), 1);
        assert_eq!(parse.errors[0].message, "unclosed <style> element");
    }
}
