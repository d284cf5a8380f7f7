//! Parser state machine and low-level operations.

use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

use super::TemplateError;
use super::cst::SyntaxKind;
use super::lexer::{Lexed, Token, token_text};

/// Nesting limit for parenthesized pipelines.
const MAX_DEPTH: u32 = 1000;

/// Variables every alert template starts with.
const PRELUDE_VARS: &[&str] = &[
    "$",
    "$labels",
    "$externalLabels",
    "$externalURL",
    "$value",
];

/// Trivia tokens are buffered and flushed when starting a new node.
///
/// The first error stops parsing; whatever is left is attached to the tree
/// as a single `Error` node so the CST stays lossless.
pub struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) trivia_buffer: Vec<Token>,
    pub(super) builder: GreenNodeBuilder<'static>,
    pub(super) lex_error: Option<String>,
    pub(super) error: Option<TemplateError>,
    /// Variables in scope, innermost last.
    pub(super) vars: Vec<String>,
    pub(super) range_depth: u32,
    pub(super) depth: u32,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, lexed: Lexed) -> Self {
        Self {
            source,
            tokens: lexed.tokens,
            pos: 0,
            trivia_buffer: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            lex_error: lexed.error,
            error: None,
            vars: PRELUDE_VARS.iter().map(|v| v.to_string()).collect(),
            range_depth: 0,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> (GreenNode, Option<TemplateError>) {
        self.parse_root();
        (self.builder.finish(), self.error)
    }

    pub(super) fn failed(&self) -> bool {
        self.error.is_some()
    }

    pub(super) fn current(&mut self) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.nth_raw(0)
    }

    pub(super) fn nth_raw(&self, lookahead: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + lookahead)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    /// Text of the current non-trivia token; empty at EOF.
    pub(super) fn current_text(&mut self) -> &'src str {
        self.skip_trivia_to_buffer();
        self.tokens
            .get(self.pos)
            .map_or("", |t| token_text(self.source, t))
    }

    pub(super) fn current_span(&mut self) -> TextRange {
        self.skip_trivia_to_buffer();
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn should_stop(&self) -> bool {
        self.eof() || self.failed()
    }

    /// LL(k) lookahead past trivia.
    pub(super) fn peek_nth(&mut self, n: usize) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    pub(super) fn skip_trivia_to_buffer(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.trivia_buffer.push(self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    pub(super) fn drain_trivia(&mut self) {
        for token in self.trivia_buffer.drain(..) {
            let text = token_text(self.source, &token);
            self.builder.token(token.kind.into(), text);
        }
    }

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn bump(&mut self) {
        self.skip_trivia_to_buffer();
        let Some(&token) = self.tokens.get(self.pos) else {
            return;
        };
        self.drain_trivia();

        let text = token_text(self.source, &token);
        self.builder.token(token.kind.into(), text);
        self.pos += 1;
    }

    pub(super) fn eat_token(&mut self, kind: SyntaxKind) -> bool {
        if self.current() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    /// On mismatch: record `unexpected ... in {context}` but don't consume.
    pub(super) fn expect(&mut self, kind: SyntaxKind, context: &str) -> bool {
        if self.eat_token(kind) {
            return true;
        }
        self.unexpected(context);
        false
    }

    /// Records the first error; later ones are consequences and dropped.
    pub(super) fn error(&mut self, message: impl Into<String>) {
        if self.error.is_some() {
            return;
        }
        let range = self.current_span();
        self.error = Some(TemplateError {
            message: message.into(),
            range,
        });
    }

    pub(super) fn unexpected(&mut self, context: &str) {
        if self.current() == SyntaxKind::LexError {
            let message = self
                .lex_error
                .clone()
                .unwrap_or_else(|| "invalid input".to_string());
            self.error(message);
            return;
        }
        let found = self.describe_current();
        self.error(format!("unexpected {} in {}", found, context));
    }

    /// How an offending token is named in messages.
    fn describe_current(&mut self) -> String {
        let kind = self.current();
        if self.eof() {
            return "EOF".to_string();
        }
        let text = self.current_text();
        if kind.is_keyword() || kind == SyntaxKind::Dot {
            return format!("<{}>", text);
        }
        if text.chars().count() > 10 {
            let head: String = text.chars().take(10).collect();
            return format!("{:?}...", head);
        }
        format!("{:?}", text)
    }

    /// Wraps everything not yet consumed in an `Error` node.
    pub(super) fn bump_rest_as_error(&mut self) {
        self.skip_trivia_to_buffer();
        if self.eof() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        while !self.eof() {
            self.bump();
        }
        self.finish_node();
    }

    pub(super) fn enter_recursion(&mut self) -> bool {
        if self.depth >= MAX_DEPTH {
            self.error("max expression depth exceeded");
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Runs `f` with a fresh variable scope, as for `define` and `block` bodies.
    pub(super) fn with_fresh_scope(&mut self, f: impl FnOnce(&mut Self)) {
        let vars = std::mem::replace(&mut self.vars, vec!["$".to_string()]);
        let range_depth = std::mem::replace(&mut self.range_depth, 0);
        f(self);
        self.vars = vars;
        self.range_depth = range_depth;
    }
}
