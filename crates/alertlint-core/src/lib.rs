#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Rule model for alertlint.
//!
//! [`read_rules`] turns a rule file into [`Rule`] values. Values are decoded by
//! `serde_yaml`; line spans come from a separate indentation scan so every
//! label, annotation, and query knows where it sits in the file.

mod locate;
mod reader;
mod rule;

#[cfg(test)]
mod reader_tests;

pub use reader::read_rules;
pub use rule::{LineRange, Located, Rule, RuleKind, TemplatedEntry};

/// Errors produced while reading a rule file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Document parsed, but is not shaped like a rule file.
    #[error("unexpected rule file layout: {0}")]
    Layout(String),
}

pub type Result<T> = std::result::Result<T, Error>;
