use ecow::EcoString;
use thiserror::Error;
use unscanny::Scanner;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    #[error("unexpected '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("expected an identifier at offset {0}")]
    ExpectedIdent(usize),
    #[error("unknown pseudo-class ':{0}'")]
    UnknownPseudoClass(EcoString),
    #[error("invalid an+b expression '{0}'")]
    InvalidNth(EcoString),
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SimpleSelector {
    /// `*`, and the nesting selector `&`.
    Universal,
    Type(EcoString),
    Id(EcoString),
    Class(EcoString),
    Attribute(AttributeSelector),
    PseudoClass(PseudoClass),
    PseudoElement(EcoString),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AttributeSelector {
    pub name: EcoString,
    pub value: Option<(AttributeOp, EcoString)>,
    pub case_insensitive: bool,
}

impl AttributeSelector {
    pub fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let Some((op, expected)) = &self.value else {
            return true;
        };
        let (actual, expected) = if self.case_insensitive {
            (actual.to_lowercase(), expected.as_str().to_lowercase())
        } else {
            (actual.to_string(), expected.to_string())
        };
        match op {
            AttributeOp::Equals => actual == expected,
            AttributeOp::Includes => actual.split_ascii_whitespace().any(|it| it == expected),
            AttributeOp::DashMatch => {
                actual == expected || actual.starts_with(&format!("{expected}-"))
            }
            AttributeOp::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttributeOp::Suffix => !expected.is_empty() && actual.ends_with(&expected),
            AttributeOp::Substring => !expected.is_empty() && actual.contains(&expected),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AttributeOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    Not(SelectorList),
    /// `:is()` and `:where()`; they only differ in specificity.
    Is(SelectorList),
    Link,
    /// User action and form state pseudo-classes, which never match a static
    /// document.
    Dynamic(EcoString),
}

const DYNAMIC_PSEUDO_CLASSES: &[&str] = &[
    "hover",
    "focus",
    "active",
    "visited",
    "focus-within",
    "focus-visible",
    "target",
    "checked",
    "disabled",
    "enabled",
];

const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Nth {
    pub a: i32,
    pub b: i32,
}

impl Nth {
    pub fn matches(self, index: i32) -> bool {
        let (a, offset) = (i64::from(self.a), i64::from(index) - i64::from(self.b));
        if a == 0 {
            return offset == 0;
        }
        offset % a == 0 && offset / a >= 0
    }

    fn parse(text: &str) -> Result<Nth, SelectorError> {
        let invalid = || SelectorError::InvalidNth(EcoString::from(text.trim()));
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "odd" => return Ok(Nth { a: 2, b: 1 }),
            "even" => return Ok(Nth { a: 2, b: 0 }),
            "" => return Err(invalid()),
            _ => {}
        }
        let Some((a, b)) = compact.split_once('n') else {
            let b = compact.parse().map_err(|_| invalid())?;
            return Ok(Nth { a: 0, b });
        };
        let a = match a {
            "" | "+" => 1,
            "-" => -1,
            _ => a.parse().map_err(|_| invalid())?,
        };
        let b = match b {
            "" => 0,
            _ if b.starts_with(['+', '-']) => b.parse().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        };
        Ok(Nth { a, b })
    }
}

pub fn parse(input: &str) -> Result<SelectorList, SelectorError> {
    let mut parser = SelectorParser {
        s: Scanner::new(input),
    };
    parser.s.eat_whitespace();
    if parser.s.done() {
        return Err(SelectorError::Empty);
    }
    let list = parser.list()?;
    parser.s.eat_whitespace();
    match parser.s.peek() {
        None => Ok(list),
        Some(found) => Err(parser.unexpected(found)),
    }
}

struct SelectorParser<'a> {
    s: Scanner<'a>,
}

impl SelectorParser<'_> {
    fn list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = vec![self.complex()?];
        loop {
            self.s.eat_whitespace();
            if !self.s.eat_if(',') {
                break;
            }
            selectors.push(self.complex()?);
        }
        Ok(SelectorList { selectors })
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        self.s.eat_whitespace();
        let first = self.compound()?;
        let mut rest = Vec::new();
        loop {
            let spaced = !self.s.eat_whitespace().is_empty();
            let combinator = match self.s.peek() {
                None | Some(',' | ')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if spaced => Combinator::Descendant,
                Some(found) => return Err(self.unexpected(found)),
            };
            if combinator != Combinator::Descendant {
                self.s.eat();
                self.s.eat_whitespace();
            }
            rest.push((combinator, self.compound()?));
        }
        Ok(ComplexSelector { first, rest })
    }

    fn compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut simples = Vec::new();
        loop {
            let simple = match self.s.peek() {
                Some('*' | '&') => {
                    self.s.eat();
                    SimpleSelector::Universal
                }
                Some('#') => {
                    self.s.eat();
                    SimpleSelector::Id(self.ident()?)
                }
                Some('.') => {
                    self.s.eat();
                    SimpleSelector::Class(self.ident()?)
                }
                Some('[') => {
                    self.s.eat();
                    SimpleSelector::Attribute(self.attribute()?)
                }
                Some(':') => {
                    self.s.eat();
                    self.pseudo()?
                }
                Some(c) if is_ident_start(c) => {
                    SimpleSelector::Type(self.ident()?.to_ascii_lowercase().into())
                }
                _ => break,
            };
            simples.push(simple);
        }
        if simples.is_empty() {
            return Err(match self.s.peek() {
                Some(found) => self.unexpected(found),
                None => SelectorError::UnexpectedEnd,
            });
        }
        Ok(CompoundSelector { simples })
    }

    fn attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.s.eat_whitespace();
        let name = EcoString::from(self.ident()?.to_ascii_lowercase());
        self.s.eat_whitespace();

        let op = if self.s.eat_if('=') {
            Some(AttributeOp::Equals)
        } else if self.s.eat_if("~=") {
            Some(AttributeOp::Includes)
        } else if self.s.eat_if("|=") {
            Some(AttributeOp::DashMatch)
        } else if self.s.eat_if("^=") {
            Some(AttributeOp::Prefix)
        } else if self.s.eat_if("$=") {
            Some(AttributeOp::Suffix)
        } else if self.s.eat_if("*=") {
            Some(AttributeOp::Substring)
        } else {
            None
        };

        let mut value = None;
        let mut case_insensitive = false;
        if let Some(op) = op {
            self.s.eat_whitespace();
            let text = match self.s.peek() {
                Some(quote @ ('"' | '\'')) => {
                    self.s.eat();
                    let text = EcoString::from(self.s.eat_until(quote));
                    if !self.s.eat_if(quote) {
                        return Err(SelectorError::UnexpectedEnd);
                    }
                    text
                }
                _ => self.ident()?,
            };
            value = Some((op, text));
            self.s.eat_whitespace();
            if self.s.eat_if(['i', 'I']) {
                case_insensitive = true;
            } else {
                self.s.eat_if(['s', 'S']);
            }
        }

        self.expect(']')?;
        Ok(AttributeSelector {
            name,
            value,
            case_insensitive,
        })
    }

    fn pseudo(&mut self) -> Result<SimpleSelector, SelectorError> {
        if self.s.eat_if(':') {
            let name = self.ident()?.to_ascii_lowercase();
            return Ok(SimpleSelector::PseudoElement(name.into()));
        }

        let name = self.ident()?.to_ascii_lowercase();
        if LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
            return Ok(SimpleSelector::PseudoElement(name.into()));
        }

        let class = if self.s.eat_if('(') {
            match name.as_str() {
                "not" => PseudoClass::Not(self.nested_list()?),
                "is" | "where" | "matches" => PseudoClass::Is(self.nested_list()?),
                "nth-child" => PseudoClass::NthChild(self.nth()?),
                "nth-last-child" => PseudoClass::NthLastChild(self.nth()?),
                "nth-of-type" => PseudoClass::NthOfType(self.nth()?),
                "nth-last-of-type" => PseudoClass::NthLastOfType(self.nth()?),
                _ => return Err(SelectorError::UnknownPseudoClass(name.into())),
            }
        } else {
            match name.as_str() {
                "root" => PseudoClass::Root,
                "empty" => PseudoClass::Empty,
                "first-child" => PseudoClass::FirstChild,
                "last-child" => PseudoClass::LastChild,
                "only-child" => PseudoClass::OnlyChild,
                "first-of-type" => PseudoClass::FirstOfType,
                "last-of-type" => PseudoClass::LastOfType,
                "only-of-type" => PseudoClass::OnlyOfType,
                "link" | "any-link" => PseudoClass::Link,
                _ if DYNAMIC_PSEUDO_CLASSES.contains(&name.as_str()) => {
                    PseudoClass::Dynamic(name.into())
                }
                _ => return Err(SelectorError::UnknownPseudoClass(name.into())),
            }
        };
        Ok(SimpleSelector::PseudoClass(class))
    }

    fn nested_list(&mut self) -> Result<SelectorList, SelectorError> {
        let list = self.list()?;
        self.s.eat_whitespace();
        self.expect(')')?;
        Ok(list)
    }

    fn nth(&mut self) -> Result<Nth, SelectorError> {
        let text = self.s.eat_until(')');
        self.expect(')')?;
        Nth::parse(text)
    }

    fn ident(&mut self) -> Result<EcoString, SelectorError> {
        let start = self.s.cursor();
        let ident = self.s.eat_while(is_ident_char);
        if ident.is_empty() || ident == "-" {
            return Err(SelectorError::ExpectedIdent(start));
        }
        Ok(ident.into())
    }

    fn expect(&mut self, c: char) -> Result<(), SelectorError> {
        if self.s.eat_if(c) {
            return Ok(());
        }
        Err(match self.s.peek() {
            Some(found) => self.unexpected(found),
            None => SelectorError::UnexpectedEnd,
        })
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            found,
            offset: self.s.cursor(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '-' | '_') || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_') || !c.is_ascii()
}
