//! Indentation scanner that finds where rule items and their keys live.
//!
//! Values are decoded by `serde_yaml`, which does not expose positions. This
//! scanner walks the raw text instead and records, for block-style mappings,
//! the line of every key and the lines its value occupies. It understands
//! just enough YAML for rule files: block mappings, `- ` list items, quoted
//! keys, and `|`/`>` block scalars.

use crate::rule::LineRange;

/// Position of one `key: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeySpan {
    pub name: String,
    pub key_line: usize,
    pub indent: usize,
    pub value: LineRange,
    /// Value starts on the key line (scalar or flow collection).
    pub inline: bool,
}

impl KeySpan {
    pub fn lines(&self) -> LineRange {
        LineRange::single(self.key_line).cover(self.value)
    }
}

/// A `- ` list item that holds an `alert:` or `record:` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RuleItem {
    pub lines: LineRange,
    pub keys: Vec<KeySpan>,
}

impl RuleItem {
    pub fn key(&self, name: &str) -> Option<&KeySpan> {
        self.keys.iter().find(|k| k.name == name)
    }
}

pub(crate) struct Scanner<'src> {
    lines: Vec<&'src str>,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lines: source.lines().collect(),
        }
    }

    fn line(&self, n: usize) -> &'src str {
        self.lines[n - 1]
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    /// All rule items in document order.
    ///
    /// Text inside a rule item or a block scalar is never scanned for items,
    /// so a runbook that quotes an example rule stays a plain string.
    pub fn rule_items(&self) -> Vec<RuleItem> {
        let mut items = Vec::new();
        let mut n = 1;
        while n <= self.len() {
            let line = self.line(n);
            let indent = indent_of(line);
            let rest = &line[indent..];
            if rest == "-" || rest.starts_with("- ") {
                if let Some(item) = self.rule_item(n, indent) {
                    n = item.lines.last + 1;
                    items.push(item);
                    continue;
                }
            } else if is_block_scalar_key(rest) {
                n = self.block_end(n, indent).unwrap_or(n) + 1;
                continue;
            }
            n += 1;
        }
        items
    }

    fn rule_item(&self, dash_line: usize, dash: usize) -> Option<RuleItem> {
        let end = self.block_end(dash_line, dash).unwrap_or(dash_line);
        let lines = LineRange::new(dash_line, end);

        let after_dash = &self.line(dash_line)[dash + 1..];
        let content = after_dash.trim_start_matches(' ');
        let keys = if content.is_empty() || content.starts_with('#') {
            // Mapping starts on the next line: `-\n  alert: x`
            let first = self.next_content_line(dash_line, end)?;
            self.mapping_keys(first, indent_of(self.line(first)), end)
        } else if content.starts_with('{') {
            flow_keys(content, lines)
        } else {
            let col = dash + 1 + (after_dash.len() - content.len());
            let mut keys: Vec<KeySpan> = self.key_span(dash_line, col).into_iter().collect();
            keys.extend(self.mapping_keys_after(dash_line, col, end));
            keys
        };

        keys.iter()
            .any(|k| k.name == "alert" || k.name == "record")
            .then_some(RuleItem { lines, keys })
    }

    /// Child entries of a nested mapping value such as `labels:`.
    pub fn children(&self, parent: &KeySpan) -> Vec<KeySpan> {
        if parent.inline || parent.value.first == parent.key_line {
            return Vec::new();
        }
        let first = parent.value.first;
        self.mapping_keys(first, indent_of(self.line(first)), parent.value.last)
    }

    fn mapping_keys(&self, first: usize, col: usize, end: usize) -> Vec<KeySpan> {
        let mut keys: Vec<KeySpan> = self.key_span(first, col).into_iter().collect();
        keys.extend(self.mapping_keys_after(first, col, end));
        keys
    }

    fn mapping_keys_after(&self, after: usize, col: usize, end: usize) -> Vec<KeySpan> {
        (after + 1..=end)
            .filter(|&n| {
                let line = self.line(n);
                !is_blank(line) && indent_of(line) == col && !is_comment(line)
            })
            .filter_map(|n| self.key_span(n, col))
            .collect()
    }

    fn key_span(&self, n: usize, col: usize) -> Option<KeySpan> {
        let (name, rest) = split_key(&self.line(n)[col..])?;
        let rest = rest.trim();
        let nested = rest.is_empty() || rest.starts_with('#');
        let block_scalar = rest.starts_with('|') || rest.starts_with('>');

        let end = self.block_end(n, col);
        let value = if nested || block_scalar {
            match end.and_then(|e| self.next_content_line(n, e).map(|f| (f, e))) {
                Some((first, last)) => LineRange::new(first, last),
                None => LineRange::single(n),
            }
        } else {
            LineRange::new(n, end.unwrap_or(n))
        };

        Some(KeySpan {
            name,
            key_line: n,
            indent: col,
            value,
            inline: !nested && !block_scalar,
        })
    }

    /// Last line of the block that follows `after` and is indented deeper than `indent`.
    fn block_end(&self, after: usize, indent: usize) -> Option<usize> {
        let mut end = None;
        for n in after + 1..=self.len() {
            let line = self.line(n);
            if is_blank(line) {
                continue;
            }
            if indent_of(line) <= indent {
                if is_comment(line) {
                    continue;
                }
                break;
            }
            end = Some(n);
        }
        end
    }

    fn next_content_line(&self, after: usize, end: usize) -> Option<usize> {
        (after + 1..=end).find(|&n| !is_blank(self.line(n)))
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn is_block_scalar_key(text: &str) -> bool {
    split_key(text)
        .map(|(_, rest)| {
            let rest = rest.trim_start();
            rest.starts_with('|') || rest.starts_with('>')
        })
        .unwrap_or(false)
}

/// Splits `key: rest` into the decoded key and the text after the colon.
fn split_key(text: &str) -> Option<(String, &str)> {
    let (key, after) = match text.chars().next()? {
        '\'' => {
            let close = single_quote_end(text)?;
            (text[1..close].replace("''", "'"), &text[close + 1..])
        }
        '"' => {
            let close = double_quote_end(text)?;
            (unescape_double(&text[1..close]), &text[close + 1..])
        }
        '-' | '#' | '{' | '[' | '|' | '>' => return None,
        _ => {
            let colon = plain_key_colon(text)?;
            (text[..colon].trim_end().to_string(), &text[colon..])
        }
    };
    let after = after.trim_start_matches(' ');
    let rest = after.strip_prefix(':')?;
    if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t')) {
        return None;
    }
    Some((key, rest))
}

fn plain_key_colon(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    (0..bytes.len()).find(|&i| {
        bytes[i] == b':' && matches!(bytes.get(i + 1), None | Some(b' ') | Some(b'\t'))
    })
}

fn single_quote_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

fn double_quote_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn unescape_double(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Keys of a single-line flow mapping item: `- {alert: A, expr: up}`.
fn flow_keys(content: &str, lines: LineRange) -> Vec<KeySpan> {
    let inner = content.trim_start_matches('{');
    inner
        .split(',')
        .filter_map(|part| {
            let (name, _) = part.split_once(':')?;
            let name = name.trim().trim_matches(|c| c == '\'' || c == '"');
            (!name.is_empty()).then(|| KeySpan {
                name: name.to_string(),
                key_line: lines.first,
                indent: 0,
                value: lines,
                inline: true,
            })
        })
        .collect()
}
