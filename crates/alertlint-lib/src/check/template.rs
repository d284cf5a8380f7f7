//! Consistency between a rule's templates and its query.

use alertlint_core::{LineRange, Rule, TemplatedEntry};
use tracing::{debug, trace};

use super::Check;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::labels::{Boundary, Survival, survival_of};
use crate::template::{Extraction, extract};

const REPORTER: &str = "template";

/// Validates label and annotation templates of alerting rules.
///
/// Reports templates that fail to parse, `$value` in labels (which gives the
/// alert a new identity on every evaluation), and label reads the query
/// cannot satisfy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCheck;

impl TemplateCheck {
    pub fn new() -> Self {
        Self
    }
}

/// Where an entry lives; labels are part of the alert identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Labels,
    Annotations,
}

/// The evaluated query and where it sits in the file.
struct QueryLabels {
    survival: Survival,
    lines: LineRange,
}

impl Check for TemplateCheck {
    fn reporter(&self) -> &'static str {
        REPORTER
    }

    fn check(&self, rule: &Rule) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        if rule.is_recording() {
            debug!(rule = rule.name(), "skipping recording rule");
            return diagnostics;
        }

        let query = rule.expr.as_ref().and_then(|expr| {
            match survival_of(&expr.value) {
                Ok(survival) => {
                    trace!(rule = rule.name(), %survival, "query labels");
                    Some(QueryLabels {
                        survival,
                        lines: expr.lines,
                    })
                }
                Err(err) => {
                    debug!(rule = rule.name(), %err, "label checks disabled");
                    None
                }
            }
        });

        for entry in &rule.labels {
            check_entry(&mut diagnostics, entry, Section::Labels, query.as_ref());
        }
        for entry in &rule.annotations {
            check_entry(&mut diagnostics, entry, Section::Annotations, query.as_ref());
        }

        diagnostics.sort_by_line();
        diagnostics
    }
}

fn check_entry(
    diagnostics: &mut Diagnostics,
    entry: &TemplatedEntry,
    section: Section,
    query: Option<&QueryLabels>,
) {
    // Label keys are rendered too, annotation keys are not.
    let texts = match section {
        Section::Labels => vec![&entry.key.value, &entry.value.value],
        Section::Annotations => vec![&entry.value.value],
    };

    for text in texts {
        let extraction = extract(text);
        if let Some(error) = extraction.errors.first() {
            diagnostics
                .report(DiagnosticKind::TemplateSyntax, REPORTER, entry.lines())
                .message(&error.message)
                .fragment(entry.fragment())
                .emit();
            continue;
        }

        if section == Section::Labels {
            report_value_refs(diagnostics, entry, &extraction);
        }
        if let Some(query) = query {
            report_removed_labels(diagnostics, entry, &extraction, query);
        }
    }
}

fn report_value_refs(diagnostics: &mut Diagnostics, entry: &TemplatedEntry, extraction: &Extraction) {
    for value in extraction.distinct_value_refs() {
        let mut builder = diagnostics
            .report(DiagnosticKind::ValueInLabels, REPORTER, entry.lines())
            .message(&value.name)
            .fragment(entry.fragment());
        if value.chain.len() > 1 {
            builder = builder.detail(format!("alias chain: {}", value.chain.join(" -> ")));
        }
        builder.emit();
    }
}

fn report_removed_labels(
    diagnostics: &mut Diagnostics,
    entry: &TemplatedEntry,
    extraction: &Extraction,
    query: &QueryLabels,
) {
    for access in &extraction.label_accesses {
        let Some(boundary) = query.survival.removes(&access.name) else {
            continue;
        };
        let kind = match boundary {
            Boundary::Aggregation => DiagnosticKind::LabelRemovedByQuery,
            Boundary::Absent => DiagnosticKind::LabelNotPassedByAbsent,
        };
        diagnostics
            .report(kind, REPORTER, entry.lines())
            .message(&access.name)
            .fragment(entry.fragment())
            .with_lines(query.lines)
            .emit();
    }
}
