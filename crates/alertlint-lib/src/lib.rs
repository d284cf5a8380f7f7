//! Alertlint: template checks for Prometheus alerting rules.
//!
//! # Example
//!
//! ```
//! use alertlint_lib::check::{Check, TemplateCheck};
//!
//! let source = "- alert: Foo\n  expr: sum(foo) by (job) > 0\n  annotations:\n    summary: '{{ $labels.instance }}'\n";
//!
//! let rules = alertlint_core::read_rules(source).expect("valid rule file");
//! let diagnostics = TemplateCheck::new().check(&rules[0]);
//! eprintln!("{}", diagnostics.printer().source(source).render());
//! assert_eq!(diagnostics.len(), 1);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod check;
pub mod diagnostics;
pub mod labels;
pub mod template;

pub use check::{Check, TemplateCheck};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use labels::{Boundary, Survival, survival_of};

/// Errors that can occur outside the checker itself.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The rule's query is not valid PromQL.
    #[error("cannot parse query: {0}")]
    QueryParse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
