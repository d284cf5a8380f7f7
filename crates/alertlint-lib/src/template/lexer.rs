//! Lexer for Go text/template.
//!
//! Produces span-based tokens without storing text; text is sliced from source only when needed.
//!
//! Templates switch between two modes: literal text, scanned by hand up to the
//! next `{{`, and action bodies, scanned token by token with Logos. The first
//! lexing error ends the token stream with a `LexError` token and its reason
//! in [`Lexed::error`], the same way the Go lexer emits a single error item.

use logos::Logos;
use rowan::TextRange;
use std::ops::Range;

use super::cst::{SyntaxKind, token_sets};

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";
const LEFT_COMMENT: &str = "/*";
const RIGHT_COMMENT: &str = "*/";

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    /// Reason for the trailing `LexError` token, if any.
    pub error: Option<String>,
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes a template.
pub fn lex(source: &str) -> Lexed {
    let mut lexer = Lexer {
        source,
        pos: 0,
        tokens: Vec::new(),
    };
    let error = lexer.run().err();
    Lexed {
        tokens: lexer.tokens,
        error,
    }
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'q>(source: &'q str, token: &Token) -> &'q str {
    &source[std::ops::Range::<usize>::from(token.span)]
}

struct Lexer<'s> {
    source: &'s str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'s> Lexer<'s> {
    fn run(&mut self) -> Result<(), String> {
        while self.pos < self.source.len() {
            let rest = &self.source[self.pos..];
            let Some(at) = rest.find(LEFT_DELIM) else {
                self.push(SyntaxKind::Text, self.source.len());
                break;
            };
            if at > 0 {
                self.push(SyntaxKind::Text, self.pos + at);
            }

            let mut inner = self.pos + LEFT_DELIM.len();
            if has_left_trim_marker(&self.source[inner..]) {
                inner += 2;
            }

            if self.source[inner..].starts_with(LEFT_COMMENT) {
                self.lex_comment(inner)?;
            } else {
                self.push(SyntaxKind::LeftDelim, inner);
                self.lex_action()?;
            }
        }
        Ok(())
    }

    fn push(&mut self, kind: SyntaxKind, end: usize) {
        self.tokens
            .push(Token::new(kind, range_to_text_range(self.pos..end)));
        self.pos = end;
    }

    /// Records the error token and hands the reason back to `run`.
    fn fail<T>(&mut self, message: String) -> Result<T, String> {
        let end = self.source.len();
        self.tokens
            .push(Token::new(SyntaxKind::LexError, range_to_text_range(self.pos..end)));
        self.pos = end;
        Err(message)
    }

    fn lex_comment(&mut self, inner: usize) -> Result<(), String> {
        let body = inner + LEFT_COMMENT.len();
        let Some(close) = self.source[body..].find(RIGHT_COMMENT) else {
            return self.fail("unclosed comment".to_string());
        };
        let after = body + close + RIGHT_COMMENT.len();
        let Some(delim_len) = right_delim_len(&self.source[after..]) else {
            return self.fail("comment ends before closing delimiter".to_string());
        };
        self.push(SyntaxKind::Comment, after + delim_len);
        Ok(())
    }

    fn lex_action(&mut self) -> Result<(), String> {
        let mut paren_depth = 0usize;
        loop {
            let rest = &self.source[self.pos..];
            if let Some(delim_len) = right_delim_len(rest) {
                if paren_depth > 0 {
                    return self.fail("unclosed left paren".to_string());
                }
                self.push(SyntaxKind::RightDelim, self.pos + delim_len);
                return Ok(());
            }
            if rest.is_empty() {
                return self.fail("unclosed action".to_string());
            }

            let mut logos = SyntaxKind::lexer(rest);
            let Some(result) = logos.next() else {
                return self.fail("unclosed action".to_string());
            };
            let mut len = logos.span().end;
            let kind = match result {
                Ok(kind) => kind,
                Err(()) => return self.lex_failure(rest),
            };

            match kind {
                SyntaxKind::Whitespace => {
                    // ` -}}` owns the space before the marker
                    let last = len - 1;
                    if right_delim_len(&rest[last..]).is_some_and(|n| n > RIGHT_DELIM.len()) {
                        len = last;
                    }
                    if len == 0 {
                        continue;
                    }
                }
                SyntaxKind::Colon => return self.fail("expected :=".to_string()),
                SyntaxKind::ParenOpen => paren_depth += 1,
                SyntaxKind::ParenClose => {
                    if paren_depth == 0 {
                        return self.fail("unexpected right paren".to_string());
                    }
                    paren_depth -= 1;
                }
                SyntaxKind::Number => {
                    if let Some(c) = rest[len..].chars().next()
                        && is_alphanumeric(c)
                    {
                        let bad = &rest[..len + c.len_utf8()];
                        return self.fail(format!("bad number syntax: {:?}", bad));
                    }
                }
                SyntaxKind::Punct => {
                    let c = rest.chars().next().unwrap_or_default();
                    return self.fail(format!(
                        "unrecognized character in action: {}",
                        describe_char(c)
                    ));
                }
                _ => {}
            }

            if token_sets::NEEDS_TERMINATOR.contains(kind) && !at_terminator(&rest[len..]) {
                self.push(kind, self.pos + len);
                let c = self.source[self.pos..].chars().next().unwrap_or_default();
                return self.fail(format!("bad character {}", describe_char(c)));
            }

            self.push(kind, self.pos + len);
        }
    }

    /// Classifies input Logos could not match.
    fn lex_failure<T>(&mut self, rest: &str) -> Result<T, String> {
        let c = rest.chars().next().unwrap_or_default();
        let message = match c {
            '"' => "unterminated quoted string".to_string(),
            '`' => "unterminated raw quoted string".to_string(),
            '\'' => "unterminated character constant".to_string(),
            '+' | '-' => {
                let end = rest
                    .char_indices()
                    .nth(1)
                    .map_or(rest.len(), |(i, c)| i + c.len_utf8());
                format!("bad number syntax: {:?}", &rest[..end])
            }
            _ => format!("unrecognized character in action: {}", describe_char(c)),
        };
        self.fail(message)
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_alphanumeric(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// `{{- ` trims preceding text; the space is part of the marker.
fn has_left_trim_marker(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('-') && chars.next().is_some_and(is_space)
}

/// Length of the right delimiter at the start of `s`, including a ` -` trim marker.
fn right_delim_len(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    if let (Some(space), Some('-')) = (chars.next(), chars.next())
        && is_space(space)
        && s[1 + space.len_utf8()..].starts_with(RIGHT_DELIM)
    {
        return Some(space.len_utf8() + 1 + RIGHT_DELIM.len());
    }
    s.starts_with(RIGHT_DELIM).then_some(RIGHT_DELIM.len())
}

fn at_terminator(rest: &str) -> bool {
    match rest.chars().next() {
        None => true,
        Some(c) if is_space(c) => true,
        Some('.' | ',' | '|' | ':' | ')' | '(') => true,
        Some(_) => rest.starts_with(RIGHT_DELIM),
    }
}

/// `U+0023 '#'`
fn describe_char(c: char) -> String {
    format!("U+{:04X} '{}'", c as u32, c)
}
