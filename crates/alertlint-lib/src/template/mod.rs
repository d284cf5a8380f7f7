//! Go text/template parsing and variable extraction.
//!
//! # Architecture
//!
//! Same layering as a compiler front end:
//!
//! - `lexer` splits text from actions and tokenizes action bodies with Logos
//! - `grammar` builds a lossless Rowan CST, reproducing the Go parser's
//!   error reasons, including undefined variables and unknown functions
//! - `ast` gives typed views over the CST
//! - `extract` walks the AST and reports what the template reads: label
//!   accesses, value references with their alias chains, and function calls
//!
//! Parsing stops at the first error, as Go's parser does; the rest of the
//! input is kept in an `Error` node.

pub mod ast;
pub mod cst;
pub mod lexer;

mod core;
mod extract;
mod functions;
mod grammar;
mod literal;

#[cfg(test)]
mod lexer_tests;

use std::fmt;

use rowan::{GreenNode, TextRange};

pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};
pub use extract::{Extraction, FunctionCall, LabelAccess, ValueRef, extract};

use self::core::Parser;
use ast::Root;
use lexer::lex;

/// The reason a template was rejected, positioned within the template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    pub message: String,
    pub range: TextRange,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TemplateError {}

/// Parse result: the green tree and the error that stopped parsing, if any.
#[derive(Debug, Clone)]
pub struct Parse {
    cst: GreenNode,
    error: Option<TemplateError>,
}

impl Parse {
    pub fn as_cst(&self) -> &GreenNode {
        &self.cst
    }

    /// Creates a typed view over the immutable green tree.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.cst.clone())
    }

    pub fn root(&self) -> Root {
        Root::new(self.syntax())
    }

    pub fn error(&self) -> Option<&TemplateError> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Main entry point. Never fails; check [`Parse::error`].
pub fn parse(source: &str) -> Parse {
    let (cst, error) = Parser::new(source, lex(source)).parse();
    Parse { cst, error }
}

#[cfg(test)]
impl Parse {
    pub fn dump_cst(&self) -> String {
        use std::fmt::Write;

        fn format_cst(node: &SyntaxNode, indent: usize, w: &mut String) -> fmt::Result {
            let prefix = "  ".repeat(indent);
            writeln!(w, "{}{:?}", prefix, node.kind())?;
            for child in node.children_with_tokens() {
                match child {
                    rowan::NodeOrToken::Node(n) => format_cst(&n, indent + 1, w)?,
                    rowan::NodeOrToken::Token(t) if !t.kind().is_trivia() => {
                        writeln!(w, "{}  {:?} {:?}", prefix, t.kind(), t.text())?;
                    }
                    rowan::NodeOrToken::Token(_) => {}
                }
            }
            Ok(())
        }

        let mut out = String::new();
        format_cst(&self.syntax(), 0, &mut out).expect("String write never fails");
        out.trim_end().to_string()
    }
}
