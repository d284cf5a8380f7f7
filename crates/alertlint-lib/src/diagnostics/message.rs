use alertlint_core::LineRange;
use serde::Serialize;

/// Problems reported by the template check, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    // Template text cannot be parsed; nothing else is checked for that string
    TemplateSyntax,

    // Alert identity changes with every evaluation
    ValueInLabels,

    // Label-flow mismatches between the query and the template
    LabelRemovedByQuery,
    LabelNotPassedByAbsent,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::TemplateSyntax => Severity::Fatal,
            Self::ValueInLabels | Self::LabelRemovedByQuery | Self::LabelNotPassedByAbsent => {
                Severity::Bug
            }
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::TemplateSyntax => "template parse error",
            Self::ValueInLabels => {
                "using $value in labels will generate a new alert on every value change, move it to annotations"
            }
            Self::LabelRemovedByQuery => "template is using a label but the query removes it",
            Self::LabelNotPassedByAbsent => {
                "template is using a label but absent() is not passing it"
            }
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::TemplateSyntax => format!("{}: {{}}", self.fallback_message()),
            Self::ValueInLabels => {
                "using {} in labels will generate a new alert on every value change, move it to annotations"
                    .to_string()
            }
            Self::LabelRemovedByQuery => {
                "template is using \"{}\" label but the query removes it".to_string()
            }
            Self::LabelNotPassedByAbsent => {
                "template is using \"{}\" label but absent() is not passing it".to_string()
            }
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

/// `Bug` < `Fatal`, so thresholds can be compared with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Bug,
    Fatal,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Bug => write!(f, "bug"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// One reported problem, positioned by rule-file lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub reporter: &'static str,
    pub message: String,
    /// Rendered `key: value` excerpt of the offending entry.
    pub fragment: String,
    /// Every affected line, ascending and unique.
    pub lines: Vec<usize>,
    /// The entry the problem was found in; drives ordering and rendering.
    #[serde(skip)]
    pub anchor: LineRange,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl Diagnostic {
    pub(crate) fn new(kind: DiagnosticKind, reporter: &'static str, anchor: LineRange) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            reporter,
            message: kind.fallback_message().to_string(),
            fragment: String::new(),
            lines: anchor.lines().collect(),
            anchor,
            details: Vec::new(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    pub fn is_bug(&self) -> bool {
        self.severity == Severity::Bug
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self.lines.iter().map(usize::to_string).collect();
        write!(
            f,
            "{} {}: {} [{}]",
            self.severity,
            lines.join(","),
            self.message,
            self.reporter
        )?;
        for detail in &self.details {
            write!(f, " (note: {})", detail)?;
        }
        Ok(())
    }
}
