use cssparser::{ParseError, Parser, ParserInput, SourcePosition, Token};
use ecow::EcoString;
use text_size::{TextRange, TextSize};

use crate::error::SyntaxError;
use crate::to_text_size;

pub const ROOT_SELECTOR: &str = ":root";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CustomProperty {
    pub name: EcoString,
    /// Declared value, trimmed and without the `!important` marker.
    pub value: EcoString,
    pub important: bool,
    pub selector: EcoString,
    pub range: TextRange,
    pub value_range: TextRange,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VarCall {
    pub name: EcoString,
    pub fallback: Option<EcoString>,
    pub selector: EcoString,
    pub range: TextRange,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CssParse {
    pub properties: Vec<CustomProperty>,
    pub var_calls: Vec<VarCall>,
    pub errors: Vec<SyntaxError>,
}

impl CssParse {
    /// Moves every range from fragment-relative to document-relative offsets.
    pub fn shift(&mut self, base: TextSize) {
        for property in &mut self.properties {
            property.range = property.range + base;
            property.value_range = property.value_range + base;
        }
        for call in &mut self.var_calls {
            call.range = call.range + base;
        }
        for error in &mut self.errors {
            error.shift(base);
        }
    }
}

pub fn parse(text: &str) -> CssParse {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut walker = Walker::default();
    walker.block_contents(&mut parser);
    walker.out
}

type NestedResult<'i> = Result<(), ParseError<'i, ()>>;

#[derive(Default)]
struct Walker {
    selectors: Vec<EcoString>,
    out: CssParse,
}

impl Walker {
    fn selector(&self) -> EcoString {
        self.selectors
            .last()
            .cloned()
            .unwrap_or_else(|| EcoString::from(ROOT_SELECTOR))
    }

    fn error(&mut self, start: SourcePosition, end: SourcePosition, message: &str) {
        let range = TextRange::new(offset(start), offset(end));
        self.out.errors.push(SyntaxError::new(range, message));
    }

    fn block_contents<'i>(&mut self, input: &mut Parser<'i, '_>) {
        loop {
            let start = input.position();
            let token = match input.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            match token {
                Token::WhiteSpace(_)
                | Token::Comment(_)
                | Token::Semicolon
                | Token::CDO
                | Token::CDC => {}
                Token::Ident(ref name) if name.starts_with("--") => {
                    self.custom_property(input, start, EcoString::from(&**name));
                }
                Token::AtKeyword(_) => self.at_rule(input),
                token => self.item(input, start, token),
            }
        }
    }

    /// Walks an ordinary declaration or a qualified rule, whichever the
    /// tokens turn out to be.
    fn item<'i>(&mut self, input: &mut Parser<'i, '_>, start: SourcePosition, first: Token<'i>) {
        if matches!(first, Token::CurlyBracketBlock) {
            self.rule(input, start, start);
            return;
        }
        self.value_token(input, &first, start);
        loop {
            let before = input.position();
            let token = match input.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => return,
            };
            match token {
                Token::Semicolon => return,
                Token::CurlyBracketBlock => {
                    self.rule(input, start, before);
                    return;
                }
                token => self.value_token(input, &token, before),
            }
        }
    }

    fn rule<'i>(
        &mut self,
        input: &mut Parser<'i, '_>,
        start: SourcePosition,
        brace: SourcePosition,
    ) {
        let selector = normalize_selector(input.slice(start..brace));
        self.selectors.push(selector);
        let _ = input.parse_nested_block(|body| -> NestedResult<'i> {
            self.block_contents(body);
            Ok(())
        });
        self.selectors.pop();
        self.check_closed(input, brace, "}");
    }

    /// At-rules never change the selector context; their block, if any, is
    /// walked with the enclosing selector.
    fn at_rule<'i>(&mut self, input: &mut Parser<'i, '_>) {
        loop {
            let before = input.position();
            let token = match input.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => return,
            };
            match token {
                Token::Semicolon => return,
                Token::CurlyBracketBlock => {
                    let _ = input.parse_nested_block(|body| -> NestedResult<'i> {
                        self.block_contents(body);
                        Ok(())
                    });
                    self.check_closed(input, before, "}");
                    return;
                }
                token => self.value_token(input, &token, before),
            }
        }
    }

    fn custom_property<'i>(
        &mut self,
        input: &mut Parser<'i, '_>,
        start: SourcePosition,
        name: EcoString,
    ) {
        let name_end = input.position();
        let mut terminated = false;
        let colon = loop {
            match input.next_including_whitespace_and_comments() {
                Ok(Token::WhiteSpace(_) | Token::Comment(_)) => {}
                Ok(Token::Colon) => break true,
                Ok(Token::Semicolon) | Err(_) => {
                    terminated = true;
                    break false;
                }
                Ok(_) => break false,
            }
        };
        if !colon {
            self.error(start, name_end, "expected ':' after custom property name");
            if !terminated {
                self.skip_to_semicolon(input);
            }
            return;
        }

        let value_start = input.position();
        let mut value_end = value_start;
        loop {
            let before = input.position();
            let token = match input.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            if matches!(token, Token::Semicolon) {
                break;
            }
            self.value_token(input, &token, before);
            value_end = input.position();
        }

        let raw = input.slice(value_start..value_end);
        let leading = raw.len() - raw.trim_start().len();
        let trimmed = raw.trim();
        let (value, important) = split_important(trimmed);

        let value_from = offset(value_start) + to_text_size(leading);
        let value_range = TextRange::at(value_from, to_text_size(value.len()));
        let declaration_end = value_from + to_text_size(trimmed.len());
        let range = TextRange::new(offset(start), declaration_end.max(offset(name_end)));

        self.out.properties.push(CustomProperty {
            name,
            value: EcoString::from(value),
            important,
            selector: self.selector(),
            range,
            value_range,
        });
    }

    fn skip_to_semicolon<'i>(&mut self, input: &mut Parser<'i, '_>) {
        loop {
            let before = input.position();
            let token = match input.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => return,
            };
            if matches!(token, Token::Semicolon) {
                return;
            }
            self.value_token(input, &token, before);
        }
    }

    fn value_token<'i>(&mut self, input: &mut Parser<'i, '_>, token: &Token<'i>, start: SourcePosition) {
        match token {
            Token::Function(name) if name.eq_ignore_ascii_case("var") => {
                self.var_call(input, start);
            }
            Token::Function(_) | Token::ParenthesisBlock => {
                self.values_in_block(input);
                self.check_closed(input, start, ")");
            }
            Token::SquareBracketBlock => {
                self.values_in_block(input);
                self.check_closed(input, start, "]");
            }
            Token::CurlyBracketBlock => {
                self.values_in_block(input);
                self.check_closed(input, start, "}");
            }
            Token::BadString(_) => self.error(start, input.position(), "unterminated string"),
            Token::BadUrl(_) => self.error(start, input.position(), "malformed url()"),
            Token::CloseParenthesis => self.error(start, input.position(), "unexpected ')'"),
            Token::CloseSquareBracket => self.error(start, input.position(), "unexpected ']'"),
            Token::CloseCurlyBracket => self.error(start, input.position(), "unexpected '}'"),
            _ => {}
        }
    }

    fn values_in_block<'i>(&mut self, input: &mut Parser<'i, '_>) {
        let _ = input.parse_nested_block(|block| -> NestedResult<'i> {
            self.values(block);
            Ok(())
        });
    }

    fn values<'i>(&mut self, input: &mut Parser<'i, '_>) {
        loop {
            let before = input.position();
            let token = match input.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => return,
            };
            self.value_token(input, &token, before);
        }
    }

    fn var_call<'i>(&mut self, input: &mut Parser<'i, '_>, start: SourcePosition) {
        let slot = self.out.var_calls.len();
        let mut name = None;
        let mut fallback = None;
        let _ = input.parse_nested_block(|args| -> NestedResult<'i> {
            args.skip_whitespace();
            if let Ok(Token::Ident(ident)) = args.next_including_whitespace_and_comments()
                && ident.starts_with("--")
            {
                name = Some(EcoString::from(&**ident));
            }
            let mut fallback_start = None;
            loop {
                let before = args.position();
                let token = match args.next_including_whitespace_and_comments() {
                    Ok(token) => token.clone(),
                    Err(_) => break,
                };
                if fallback_start.is_none() && matches!(token, Token::Comma) {
                    fallback_start = Some(args.position());
                    continue;
                }
                self.value_token(args, &token, before);
            }
            fallback = fallback_start.map(|from| EcoString::from(args.slice_from(from).trim()));
            Ok(())
        });
        let end = input.position();
        self.check_closed(input, start, ")");

        let Some(name) = name else {
            self.error(start, end, "expected a custom property name in var()");
            return;
        };
        let call = VarCall {
            name,
            fallback,
            selector: self.selector(),
            range: TextRange::new(offset(start), offset(end)),
        };
        self.out.var_calls.insert(slot, call);
    }

    fn check_closed<'i>(&mut self, input: &Parser<'i, '_>, start: SourcePosition, closing: &str) {
        if !input.slice_from(start).ends_with(closing) {
            let message = format!("missing closing '{closing}'");
            self.error(start, input.position(), &message);
        }
    }
}

fn offset(position: SourcePosition) -> TextSize {
    to_text_size(position.byte_index())
}

fn normalize_selector(prelude: &str) -> EcoString {
    let mut selector = EcoString::new();
    for (i, part) in prelude.split_whitespace().enumerate() {
        if i > 0 {
            selector.push(' ');
        }
        selector.push_str(part);
    }
    selector
}

/// Strips a trailing `!important` (case-insensitive, whitespace allowed after
/// the `!`) from an already trimmed value.
pub fn split_important(value: &str) -> (&str, bool) {
    let lower = value.to_ascii_lowercase();
    if let Some(head) = lower.strip_suffix("important")
        && let Some(head) = head.trim_end().strip_suffix('!')
    {
        let len = head.trim_end().len();
        return (&value[..len], true);
    }
    (value, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(text: &str, range: TextRange) -> &str {
        &text[range]
    }

    #[test]
    fn top_level_declaration_defaults_to_root() {
        let parse = parse("--a: red;");
        assert_eq!(parse.properties.len(), 1);
        assert_eq!(parse.properties[0].selector, ":root");
        assert_eq!(parse.properties[0].value, "red");
    }

    #[test]
    fn rule_selector_and_ranges() {
        let text = ".btn  >  span { color: blue; --gap :  4px  ; }";
        let parse = parse(text);
        let property = &parse.properties[0];
        assert_eq!(property.name, "--gap");
        assert_eq!(property.selector, ".btn > span");
        assert_eq!(slice(text, property.value_range), "4px");
        assert_eq!(slice(text, property.range), "--gap :  4px");
        assert!(parse.errors.is_empty());
    }

    #[test]
    fn important_is_stripped() {
        let text = ".x { --c: green ! IMPORTANT; }";
        let parse = parse(text);
        let property = &parse.properties[0];
        assert!(property.important);
        assert_eq!(property.value, "green");
        assert_eq!(slice(text, property.value_range), "green");
    }

    #[test]
    fn nested_rules_restore_the_outer_selector() {
        let text = ".card { --a: 1; &:hover { --b: 2; } --c: 3; }";
        let parse = parse(text);
        let selectors: Vec<_> = parse
            .properties
            .iter()
            .map(|it| (it.name.as_str(), it.selector.as_str()))
            .collect();
        assert_eq!(
            selectors,
            vec![("--a", ".card"), ("--b", "&:hover"), ("--c", ".card")]
        );
    }

    #[test]
    fn at_rules_do_not_push_a_selector() {
        let text = "@media (min-width: 10px) { :root { --a: 1; } --b: 2; }";
        let parse = parse(text);
        assert_eq!(parse.properties[0].selector, ":root");
        assert_eq!(parse.properties[1].selector, ":root");
    }

    #[test]
    fn var_calls_in_ordinary_and_custom_declarations() {
        let text = "a { color: var(--fg); --b: var(--c, var(--d)); }";
        let parse = parse(text);
        let calls: Vec<_> = parse
            .var_calls
            .iter()
            .map(|it| (it.name.as_str(), it.fallback.as_deref(), slice(text, it.range)))
            .collect();
        assert_eq!(
            calls,
            vec![
                ("--fg", None, "var(--fg)"),
                ("--c", Some("var(--d)"), "var(--c, var(--d))"),
                ("--d", None, "var(--d)"),
            ]
        );
        assert!(parse.var_calls.iter().all(|it| it.selector == "a"));
    }

    #[test]
    fn var_inside_other_functions() {
        let parse = parse("a { border: 1px solid rgb(var(--r) 0 0); }");
        assert_eq!(parse.var_calls[0].name, "--r");
    }

    #[test]
    fn errors_do_not_stop_extraction() {
        let text = "a { --x red; --y: blue; width: var(); } b { --z: 1";
        let parse = parse(text);
        let names: Vec<_> = parse.properties.iter().map(|it| it.name.as_str()).collect();
        assert_eq!(names, vec!["--y", "--z"]);
        let messages: Vec<_> = parse.errors.iter().map(|it| it.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "expected ':' after custom property name",
                "expected a custom property name in var()",
                "missing closing '}'",
            ]
        );
    }

    #[test]
    fn shift_moves_every_range() {
        let mut parse = parse("--a: var(--b)");
        parse.shift(TextSize::from(10));
        assert_eq!(parse.properties[0].range.start(), TextSize::from(10));
        assert_eq!(parse.var_calls[0].range.start(), TextSize::from(15));
    }

    #[test]
    fn split_important_variants() {
        assert_eq!(split_important("red !important"), ("red", true));
        assert_eq!(split_important("red!important"), ("red", true));
        assert_eq!(split_important("red"), ("red", false));
        assert_eq!(split_important("important"), ("important", false));
    }
}
