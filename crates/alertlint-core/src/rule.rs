//! Rule data model.
//!
//! Every value that ends up in a diagnostic carries the 1-based line span it
//! occupies in the rule file, so reports can point back at the YAML.

use std::fmt;

/// Inclusive, 1-based line span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LineRange {
    pub first: usize,
    pub last: usize,
}

impl LineRange {
    pub fn new(first: usize, last: usize) -> Self {
        debug_assert!(first <= last, "line range {first}..{last} is inverted");
        Self { first, last }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    /// Smallest range covering both spans.
    pub fn cover(self, other: LineRange) -> Self {
        Self::new(self.first.min(other.first), self.last.max(other.last))
    }

    pub fn contains(&self, line: usize) -> bool {
        self.first <= line && line <= self.last
    }

    /// Every line in the span, ascending.
    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.first..=self.last
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

/// A value together with the lines it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub value: T,
    pub lines: LineRange,
}

impl<T> Located<T> {
    pub fn new(value: T, lines: LineRange) -> Self {
        Self { value, lines }
    }
}

/// One `key: value` pair of a `labels` or `annotations` mapping.
///
/// Both sides are templated text. Label keys are templates too, which is
/// how `'{{ $value }}': x` ends up being reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedEntry {
    pub key: Located<String>,
    pub value: Located<String>,
}

impl TemplatedEntry {
    pub fn new(key: Located<String>, value: Located<String>) -> Self {
        Self { key, value }
    }

    /// Lines spanned by the whole entry, from the key to the last value line.
    pub fn lines(&self) -> LineRange {
        self.key.lines.cover(self.value.lines)
    }

    /// Rendered `key: value` excerpt used in reports.
    pub fn fragment(&self) -> String {
        format!("{}: {}", self.key.value, self.value.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Alerting { name: String },
    Recording { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub kind: RuleKind,
    /// Lines of the whole rule item.
    pub lines: LineRange,
    /// Raw query text, parsed lazily by whoever needs the AST.
    pub expr: Option<Located<String>>,
    pub labels: Vec<TemplatedEntry>,
    pub annotations: Vec<TemplatedEntry>,
}

impl Rule {
    pub fn name(&self) -> &str {
        match &self.kind {
            RuleKind::Alerting { name } | RuleKind::Recording { name } => name,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.kind, RuleKind::Recording { .. })
    }
}
