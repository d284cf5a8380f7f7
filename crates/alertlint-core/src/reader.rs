//! Rule-file reader.
//!
//! Accepts either a bare list of rules or the Prometheus `groups:` layout and
//! produces [`Rule`] values whose labels, annotations, and query carry the
//! lines they were read from.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;

use crate::locate::{KeySpan, RuleItem, Scanner};
use crate::rule::{LineRange, Located, Rule, RuleKind, TemplatedEntry};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    alert: Option<Value>,
    record: Option<Value>,
    expr: Option<Value>,
    labels: Option<IndexMap<String, Value>>,
    annotations: Option<IndexMap<String, Value>>,
}

impl RawRule {
    fn kind(&self) -> Option<RuleKind> {
        match (&self.alert, &self.record) {
            (Some(name), _) => Some(RuleKind::Alerting {
                name: scalar_text(name),
            }),
            (None, Some(name)) => Some(RuleKind::Recording {
                name: scalar_text(name),
            }),
            (None, None) => None,
        }
    }
}

/// Reads every alerting and recording rule in `source`, in document order.
pub fn read_rules(source: &str) -> Result<Vec<Rule>> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Value = serde_yaml::from_str(source)?;
    let raw_rules: Vec<RawRule> = if document.is_null() {
        Vec::new()
    } else if document.is_sequence() {
        serde_yaml::from_value(document)?
    } else if let Some(groups) = document.get("groups") {
        let groups: Vec<RawGroup> = if groups.is_null() {
            Vec::new()
        } else {
            serde_yaml::from_value(groups.clone())?
        };
        groups.into_iter().flat_map(|g| g.rules).collect()
    } else {
        return Err(Error::Layout(
            "expected a list of rules or a mapping with `groups`".to_string(),
        ));
    };
    let raw_rules: Vec<(RuleKind, RawRule)> = raw_rules
        .into_iter()
        .filter_map(|raw| raw.kind().map(|kind| (kind, raw)))
        .collect();

    let scanner = Scanner::new(source);
    let items = scanner.rule_items();
    if items.len() != raw_rules.len() {
        return Err(Error::Layout(format!(
            "found {} rules but could only locate {} of them; flow-style rule lists are not supported",
            raw_rules.len(),
            items.len()
        )));
    }

    Ok(raw_rules
        .into_iter()
        .zip(items)
        .map(|((kind, raw), item)| build_rule(&scanner, kind, raw, &item))
        .collect())
}

fn build_rule(scanner: &Scanner<'_>, kind: RuleKind, raw: RawRule, item: &RuleItem) -> Rule {
    let expr = raw.expr.as_ref().map(|expr| {
        let lines = item.key("expr").map_or(item.lines, |k| k.value);
        Located::new(scalar_text(expr), lines)
    });

    Rule {
        kind,
        lines: item.lines,
        expr,
        labels: entries(scanner, item, "labels", raw.labels),
        annotations: entries(scanner, item, "annotations", raw.annotations),
    }
}

fn entries(
    scanner: &Scanner<'_>,
    item: &RuleItem,
    section: &str,
    raw: Option<IndexMap<String, Value>>,
) -> Vec<TemplatedEntry> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let parent = item.key(section);
    let children = parent.map(|p| scanner.children(p)).unwrap_or_default();
    let fallback = parent.map_or(item.lines, KeySpan::lines);
    let by_position = children.len() == raw.len();

    raw.into_iter()
        .enumerate()
        .map(|(i, (key, value))| {
            let span = if by_position {
                children.get(i)
            } else {
                children.iter().find(|c| c.name == key)
            };
            let (key_lines, value_lines) = match span {
                Some(span) => (LineRange::single(span.key_line), span.value),
                None => (fallback, fallback),
            };
            TemplatedEntry::new(
                Located::new(key, key_lines),
                Located::new(scalar_text(&value), value_lines),
            )
        })
        .collect()
}

/// Text form of a YAML value as it would be handed to the template engine.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
