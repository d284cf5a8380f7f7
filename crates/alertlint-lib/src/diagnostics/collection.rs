//! Diagnostic collection and the builder used to emit into it.

use alertlint_core::LineRange;

use super::message::{Diagnostic, DiagnosticKind, Severity};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: Diagnostic,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a diagnostic of `kind` anchored at the lines of the offending entry.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to override.
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        reporter: &'static str,
        anchor: LineRange,
    ) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: Diagnostic::new(kind, reporter, anchor),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.messages
    }

    pub fn fatal_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_fatal()).count()
    }

    pub fn bug_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_bug()).count()
    }

    /// Whether anything at or above `threshold` was reported.
    pub fn at_least(&self, threshold: Severity) -> bool {
        self.messages.iter().any(|d| d.severity >= threshold)
    }

    /// Orders by the first line of each anchor. Stable, so emission order
    /// breaks ties.
    pub fn sort_by_line(&mut self) {
        self.messages.sort_by_key(|d| d.anchor.first);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Provide custom detail for this diagnostic, rendered using the kind's template.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        let detail = msg.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.message.fragment = fragment.into();
        self
    }

    /// Adds more affected lines, e.g. the query that dropped a label.
    pub fn with_lines(mut self, lines: LineRange) -> Self {
        self.message.lines.extend(lines.lines());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.message.details.push(detail.into());
        self
    }

    pub fn emit(mut self) {
        self.message.lines.sort_unstable();
        self.message.lines.dedup();
        self.diagnostics.messages.push(self.message);
    }
}
