//! Grammar productions for Go text/template.
//!
//! Error reasons follow `text/template/parse` so users see the messages
//! Prometheus would print for the same template.

use super::core::Parser;
use super::cst::{SyntaxKind, token_sets};
use super::functions;
use super::literal;

use SyntaxKind::*;

/// How a list of items ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListEnd {
    /// Stopped before `{{end`.
    End,
    /// Stopped before `{{else`.
    Else,
    /// EOF or an error.
    Stopped,
}

/// The part of a command's first operand that decides whether it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperandClass {
    Bool,
    Dot,
    Nil,
    Number,
    String,
    Other,
}

impl OperandClass {
    fn is_executable(self) -> bool {
        matches!(self, OperandClass::Other)
    }
}

impl Parser<'_> {
    pub(super) fn parse_root(&mut self) {
        self.start_node(Root);

        while !self.should_stop() {
            if self.current() == LeftDelim {
                match self.peek_nth(1) {
                    KwDefine => {
                        self.parse_define();
                        continue;
                    }
                    KwEnd => {
                        self.parse_end_action();
                        self.error("unexpected {{end}}");
                        break;
                    }
                    KwElse => {
                        self.parse_stray_else();
                        self.error("unexpected {{else}}");
                        break;
                    }
                    _ => {}
                }
            }
            self.parse_item();
        }

        self.bump_rest_as_error();
        self.skip_trivia_to_buffer();
        self.drain_trivia();
        self.finish_node();
    }

    fn parse_item(&mut self) {
        match self.current() {
            Text => self.bump(),
            Comment => {
                self.start_node(CommentAction);
                self.bump();
                self.finish_node();
            }
            LeftDelim => self.parse_action(),
            _ => self.unexpected("input"),
        }
    }

    /// Items up to, but not including, the `{{end}}` or `{{else}}` that closes them.
    fn parse_list(&mut self) -> ListEnd {
        self.start_node(List);
        let end = loop {
            if self.should_stop() {
                self.error("unexpected EOF");
                break ListEnd::Stopped;
            }
            if self.current() == LeftDelim {
                match self.peek_nth(1) {
                    KwEnd => break ListEnd::End,
                    KwElse => break ListEnd::Else,
                    _ => {}
                }
            }
            self.parse_item();
        };
        self.finish_node();
        end
    }

    fn parse_action(&mut self) {
        match self.peek_nth(1) {
            KwIf => self.parse_control(IfBlock, "if"),
            KwWith => self.parse_control(WithBlock, "with"),
            KwRange => self.parse_control(RangeBlock, "range"),
            KwBlock => self.parse_block(),
            KwTemplate => self.parse_template_call(),
            KwBreak => self.parse_loop_control(Break, "break"),
            KwContinue => self.parse_loop_control(Continue, "continue"),
            _ => {
                // Declared variables persist until the enclosing `end`.
                self.start_node(Action);
                self.bump();
                self.parse_pipeline("command", RightDelim);
                self.eat_token(RightDelim);
                self.finish_node();
            }
        }
    }

    /// `if`, `with` and `range`, with their `else` branches.
    ///
    /// `{{else if x}}` and `{{else with x}}` nest a block inside the else
    /// branch that shares the outer `{{end}}`.
    fn parse_control(&mut self, kind: SyntaxKind, context: &str) {
        let mark = self.vars.len();
        self.start_node(kind);
        self.eat_token(LeftDelim);
        self.bump();
        self.parse_pipeline(context, RightDelim);
        self.eat_token(RightDelim);

        let is_range = kind == RangeBlock;
        if is_range {
            self.range_depth += 1;
        }
        let end = self.parse_list();
        if is_range {
            self.range_depth -= 1;
        }

        match end {
            ListEnd::End => self.parse_end_action(),
            ListEnd::Else => self.parse_else_branch(kind, context),
            ListEnd::Stopped => {}
        }

        self.vars.truncate(mark);
        self.finish_node();
    }

    fn parse_else_branch(&mut self, kind: SyntaxKind, context: &str) {
        self.start_node(ElseBranch);
        self.bump();
        self.bump();

        let chained = match (kind, self.current()) {
            (IfBlock, KwIf) => Some(IfBlock),
            (WithBlock, KwWith) => Some(WithBlock),
            _ => None,
        };
        if let Some(nested) = chained {
            self.parse_control(nested, context);
            self.finish_node();
            return;
        }

        // `{{else if` under `range` is left for the list to reject
        if !matches!(self.current(), KwIf | KwWith) {
            self.expect(RightDelim, "else");
        }
        let end = if self.failed() {
            ListEnd::Stopped
        } else {
            self.parse_list()
        };
        self.finish_node();

        match end {
            ListEnd::End => self.parse_end_action(),
            ListEnd::Else => {
                self.parse_stray_else();
                self.error("expected end; found {{else}}");
            }
            ListEnd::Stopped => {}
        }
    }

    fn parse_end_action(&mut self) {
        self.start_node(EndAction);
        self.bump();
        self.bump();
        self.expect(RightDelim, "end");
        self.finish_node();
    }

    /// An `{{else}}` with no block to attach to.
    fn parse_stray_else(&mut self) {
        self.start_node(ElseBranch);
        self.bump();
        self.bump();
        if !matches!(self.current(), KwIf | KwWith) {
            self.expect(RightDelim, "else");
        }
        self.finish_node();
    }

    fn parse_define(&mut self) {
        const CONTEXT: &str = "define clause";

        self.start_node(Define);
        self.bump();
        self.bump();
        self.parse_template_name(CONTEXT);
        self.expect(RightDelim, CONTEXT);
        if !self.failed() {
            self.with_fresh_scope(|p| p.parse_template_body(CONTEXT));
        }
        self.finish_node();
    }

    fn parse_block(&mut self) {
        const CONTEXT: &str = "block clause";

        self.start_node(Block);
        self.bump();
        self.bump();
        self.parse_template_name(CONTEXT);
        self.parse_pipeline(CONTEXT, RightDelim);
        self.eat_token(RightDelim);
        if !self.failed() {
            self.with_fresh_scope(|p| p.parse_template_body(CONTEXT));
        }
        self.finish_node();
    }

    fn parse_template_body(&mut self, context: &str) {
        match self.parse_list() {
            ListEnd::End => self.parse_end_action(),
            ListEnd::Else => {
                self.parse_stray_else();
                self.error(format!("unexpected {{{{else}}}} in {}", context));
            }
            ListEnd::Stopped => {}
        }
    }

    fn parse_template_call(&mut self) {
        const CONTEXT: &str = "template clause";

        self.start_node(TemplateCall);
        self.bump();
        self.bump();
        self.parse_template_name(CONTEXT);
        if !self.failed() && self.current() != RightDelim {
            self.parse_pipeline(CONTEXT, RightDelim);
        }
        self.eat_token(RightDelim);
        self.finish_node();
    }

    fn parse_template_name(&mut self, context: &str) {
        if self.failed() {
            return;
        }
        if !token_sets::TEMPLATE_NAME.contains(self.current()) {
            self.unexpected(context);
            return;
        }
        if literal::unquote(self.current_text()).is_none() {
            self.error("invalid syntax");
        }
        self.bump();
    }

    fn parse_loop_control(&mut self, kind: SyntaxKind, word: &str) {
        self.start_node(kind);
        self.bump();
        self.bump();
        let context = format!("{{{{{}}}}}", word);
        if self.expect(RightDelim, &context) && self.range_depth == 0 {
            self.error(format!("{} outside {{{{range}}}}", context));
        }
        self.finish_node();
    }

    /// Pipeline up to `end`, which is left for the caller.
    fn parse_pipeline(&mut self, context: &str, end: SyntaxKind) {
        if self.failed() {
            return;
        }
        self.start_node(Pipeline);
        self.parse_decl(context);

        let mut firsts: Vec<OperandClass> = Vec::new();
        while !self.failed() {
            let kind = self.current();
            if kind == end {
                self.check_pipeline(context, &firsts);
                break;
            }
            if !token_sets::OPERAND_FIRST.contains(kind) {
                self.unexpected(context);
                break;
            }
            if let Some(first) = self.parse_command() {
                firsts.push(first);
            }
            if self.nth_raw(0) == Pipe {
                self.bump();
            }
        }

        self.finish_node();
    }

    fn check_pipeline(&mut self, context: &str, firsts: &[OperandClass]) {
        let Some((head, rest)) = firsts.split_first() else {
            self.error(format!("missing value for {}", context));
            return;
        };
        if *head == OperandClass::Nil {
            self.error("nil is not a command");
            return;
        }
        if let Some(i) = rest.iter().position(|c| !c.is_executable()) {
            self.error(format!("non executable command in pipeline stage {}", i + 2));
        }
    }

    /// `$x :=`, `$x =`, and the two-variable form `$i, $e :=` of `range`.
    fn parse_decl(&mut self, context: &str) {
        if self.current() != Variable || !matches!(self.peek_nth(1), Declare | Assign | Comma) {
            return;
        }

        self.start_node(Decl);
        let mut declared = 0;
        loop {
            let name = self.current_text().to_string();
            self.bump();
            declared += 1;

            if matches!(self.current(), Declare | Assign) {
                self.vars.push(name);
                self.bump();
                break;
            }

            self.vars.push(name);
            self.bump();
            if context == "range" && declared < 2 {
                match self.current() {
                    Variable if matches!(self.peek_nth(1), Declare | Assign | Comma) => continue,
                    Variable | RightDelim | ParenClose => break,
                    _ => {
                        self.error("range can only initialize variables");
                        break;
                    }
                }
            }
            self.error(format!("too many declarations in {}", context));
            break;
        }
        self.finish_node();
    }

    /// Operands separated by spaces. Returns the class of the first one.
    fn parse_command(&mut self) -> Option<OperandClass> {
        self.start_node(Command);
        let mut first = None;
        let mut count = 0;

        while !self.failed() {
            if let Some(class) = self.parse_operand() {
                first.get_or_insert(class);
                count += 1;
            }
            if self.failed() {
                break;
            }
            match self.nth_raw(0) {
                Whitespace => continue,
                RightDelim | ParenClose | Pipe => break,
                _ => {
                    self.unexpected("operand");
                    break;
                }
            }
        }

        if count == 0 {
            self.error("empty command");
        }
        self.finish_node();
        first
    }

    /// A term plus any directly attached `.Field` chain.
    fn parse_operand(&mut self) -> Option<OperandClass> {
        let kind = self.current();
        let (node, class) = match kind {
            Identifier => (FuncExpr, OperandClass::Other),
            Dot => (DotExpr, OperandClass::Dot),
            KwNil => (LitExpr, OperandClass::Nil),
            Variable => (VarExpr, OperandClass::Other),
            Field => (FieldExpr, OperandClass::Other),
            KwTrue | KwFalse => (LitExpr, OperandClass::Bool),
            CharLit | Number => (LitExpr, OperandClass::Number),
            Str | RawStr => (LitExpr, OperandClass::String),
            ParenOpen => (ParenExpr, OperandClass::Other),
            _ => return None,
        };
        let text = self.current_text();

        self.start_node(node);
        match kind {
            Identifier if !functions::is_defined(text) => {
                self.error(format!("function {:?} not defined", text));
            }
            Variable if !self.vars.iter().any(|v| v == text) => {
                self.error(format!("undefined variable {:?}", text));
            }
            CharLit if !literal::is_char_constant(text) => {
                self.error(format!("malformed character constant: {}", text));
            }
            Str | RawStr if literal::unquote(text).is_none() => {
                self.error("invalid syntax");
            }
            _ => {}
        }

        if kind == ParenOpen {
            self.bump();
            if self.enter_recursion() {
                self.parse_pipeline("parenthesized pipeline", ParenClose);
                self.exit_recursion();
            }
            if !self.failed() {
                self.eat_token(ParenClose);
            }
        } else {
            self.bump();
        }

        if !self.failed() && self.nth_raw(0) == Field {
            if class.is_executable() {
                while self.nth_raw(0) == Field {
                    self.bump();
                }
            } else {
                self.error(format!("unexpected . after term {:?}", text));
            }
        }

        self.finish_node();
        Some(class)
    }
}
