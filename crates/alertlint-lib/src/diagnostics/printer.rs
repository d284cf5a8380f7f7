//! Builder-pattern printer for rendering diagnostics against a rule file.

use std::fmt::Write;
use std::ops::Range;

use alertlint_core::LineRange;
use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::collection::Diagnostics;
use super::message::Severity;

/// Builder for rendering diagnostics with various options.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let Some(source) = self.source else {
            return self.format_plain(w);
        };

        if self.diagnostics.is_empty() {
            return Ok(());
        }

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        let lines = LineIndex::new(source);

        for (i, diag) in self.diagnostics.iter().enumerate() {
            let range = lines.span(diag.anchor);

            let mut snippet = Snippet::source(source).line_start(1).annotation(
                AnnotationKind::Primary
                    .span(range.clone())
                    .label(&diag.message),
            );

            if let Some(p) = self.path {
                snippet = snippet.path(p);
            }

            for extra in outside_runs(&diag.lines, diag.anchor) {
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(lines.span(extra))
                        .label("query"),
                );
            }

            for detail in &diag.details {
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(range.clone())
                        .label(detail),
                );
            }

            let level = severity_to_level(diag.severity);
            let report: Vec<Group> = vec![level.primary_title(&diag.message).element(snippet)];

            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            if let Some(p) = self.path {
                write!(w, "{}:", p)?;
            }
            write!(w, "{}", diag)?;
        }
        Ok(())
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Fatal => Level::ERROR,
        Severity::Bug => Level::WARNING,
    }
}

/// Byte offsets of line starts, for turning line spans into source ranges.
struct LineIndex<'s> {
    source: &'s str,
    starts: Vec<usize>,
}

impl<'s> LineIndex<'s> {
    fn new(source: &'s str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(at, _)| at + 1));
        Self { source, starts }
    }

    /// From the first non-blank byte of `lines.first` to the end of
    /// `lines.last`, excluding the newline. Never empty unless the source is.
    fn span(&self, lines: LineRange) -> Range<usize> {
        let len = self.source.len();
        let start = self.line_start(lines.first);
        let end = self.line_end(lines.last).max(start);

        let text = &self.source[start..end];
        let indent = text.len() - text.trim_start_matches([' ', '\t']).len();
        let start = if start + indent < end { start + indent } else { start };

        if start == end {
            return start.min(len)..(start + 1).min(len);
        }
        start..end
    }

    fn line_start(&self, line: usize) -> usize {
        let idx = line.saturating_sub(1);
        self.starts
            .get(idx)
            .copied()
            .unwrap_or(self.source.len())
    }

    fn line_end(&self, line: usize) -> usize {
        let next = self.line_start(line + 1);
        let end = if next > 0 && self.source[..next].ends_with('\n') {
            next - 1
        } else {
            next
        };
        end.max(self.line_start(line))
    }
}

/// Contiguous runs of `lines` that fall outside `anchor`.
fn outside_runs(lines: &[usize], anchor: LineRange) -> Vec<LineRange> {
    let mut runs: Vec<LineRange> = Vec::new();
    for &line in lines.iter().filter(|l| !anchor.contains(**l)) {
        match runs.last_mut() {
            Some(run) if run.last + 1 == line => run.last = line,
            _ => runs.push(LineRange::single(line)),
        }
    }
    runs
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}
