use std::cmp::Ordering;
use std::fmt;

use unscanny::Scanner;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Specificity {
    pub ids: u32,
    pub classes: u32,
    pub elements: u32,
}

impl Specificity {
    pub const fn new(ids: u32, classes: u32, elements: u32) -> Self {
        Self {
            ids,
            classes,
            elements,
        }
    }

    pub fn compare(&self, other: &Specificity) -> Ordering {
        self.cmp(other)
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.ids, self.classes, self.elements)
    }
}

const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// Specificity of `selector`. A selector list yields the maximum of its
/// branches.
pub fn calculate(selector: &str) -> Specificity {
    split_top_level(selector)
        .into_iter()
        .map(branch)
        .max()
        .unwrap_or_default()
}

fn split_top_level(selector: &str) -> Vec<&str> {
    let mut s = Scanner::new(selector);
    let mut branches = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    while let Some(c) = s.eat() {
        match c {
            '"' | '\'' => skip_string(&mut s, c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                branches.push(s.from(start).trim_end_matches(','));
                start = s.cursor();
            }
            _ => {}
        }
    }
    branches.push(s.from(start));
    branches
}

fn branch(selector: &str) -> Specificity {
    let mut s = Scanner::new(selector);
    let mut specificity = Specificity::default();
    while let Some(c) = s.peek() {
        match c {
            '#' => {
                s.eat();
                if !eat_ident(&mut s).is_empty() {
                    specificity.ids += 1;
                }
            }
            '.' => {
                s.eat();
                if !eat_ident(&mut s).is_empty() {
                    specificity.classes += 1;
                }
            }
            '[' => {
                s.eat();
                skip_attribute(&mut s);
                specificity.classes += 1;
            }
            ':' => {
                s.eat();
                let element = s.eat_if(':');
                let name = eat_ident(&mut s);
                if s.eat_if('(') {
                    skip_arguments(&mut s);
                }
                if name.is_empty() {
                    continue;
                }
                let legacy = LEGACY_PSEUDO_ELEMENTS
                    .iter()
                    .any(|it| it.eq_ignore_ascii_case(name));
                if element || legacy {
                    specificity.elements += 1;
                } else {
                    specificity.classes += 1;
                }
            }
            c if is_ident_char(c) => {
                eat_ident(&mut s);
                specificity.elements += 1;
            }
            // Universal, nesting selector, combinators and anything malformed.
            _ => {
                s.eat();
            }
        }
    }
    specificity
}

fn eat_ident<'a>(s: &mut Scanner<'a>) -> &'a str {
    s.eat_while(is_ident_char)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '\\') || !c.is_ascii()
}

fn skip_string(s: &mut Scanner, quote: char) {
    while let Some(c) = s.eat() {
        match c {
            '\\' => {
                s.eat();
            }
            c if c == quote => break,
            _ => {}
        }
    }
}

fn skip_attribute(s: &mut Scanner) {
    while let Some(c) = s.eat() {
        match c {
            '"' | '\'' => skip_string(s, c),
            ']' => break,
            _ => {}
        }
    }
}

fn skip_arguments(s: &mut Scanner) {
    let mut depth = 1usize;
    while let Some(c) = s.eat() {
        match c {
            '"' | '\'' => skip_string(s, c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
}
