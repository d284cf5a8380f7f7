//! What a template reads from the alert.
//!
//! Prometheus renders alert templates with the alert as dot and a prelude of
//! variables (`$labels`, `$value`, ...). The extractor tracks what each
//! variable and dot denote so that `$labels.job`, `.Labels.job`,
//! `$l := $labels` followed by `$l.job`, and `index $labels "job"` are all
//! seen as reads of `job`, and `$foo := $value` makes `$foo` a value alias.

use indexmap::IndexMap;
use rowan::{TextRange, TextSize};

use super::ast::{Command, ElseBranch, Item, List, Operand, Pipeline};
use super::{TemplateError, parse};

/// A read of one alert label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAccess {
    pub name: String,
    pub range: TextRange,
    /// Newlines before the access, counted from the start of the template.
    pub line: usize,
}

/// A read of the sample value, directly or through aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRef {
    /// Name the value was read through, like `$foo`, `$value` or `.Value`.
    pub name: String,
    /// `name` first, then each alias it resolves through, ending at the value.
    pub chain: Vec<String>,
    pub range: TextRange,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub range: TextRange,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// At most one entry; when present nothing else is filled in.
    pub errors: Vec<TemplateError>,
    pub label_accesses: Vec<LabelAccess>,
    pub value_refs: Vec<ValueRef>,
    pub function_calls: Vec<FunctionCall>,
}

impl Extraction {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// First reference per name, in discovery order.
    pub fn distinct_value_refs(&self) -> Vec<&ValueRef> {
        let mut by_name: IndexMap<&str, &ValueRef> = IndexMap::new();
        for value in &self.value_refs {
            by_name.entry(value.name.as_str()).or_insert(value);
        }
        by_name.into_values().collect()
    }
}

/// Parses `text` and collects what it reads.
pub fn extract(text: &str) -> Extraction {
    let parse = parse(text);
    if let Some(error) = parse.error() {
        return Extraction {
            errors: vec![error.clone()],
            ..Extraction::default()
        };
    }

    let mut extractor = Extractor::new(text);
    for item in parse.root().items() {
        extractor.item(&item);
    }
    extractor.out
}

/// What a variable, dot, or pipeline evaluates to, as far as we can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Denotes {
    /// The alert itself, with `.Labels` and `.Value`.
    Alert,
    /// The label map.
    Labels,
    /// The sample value, through the given alias chain.
    Value(Vec<String>),
    Unknown,
}

struct Extractor<'a> {
    source: &'a str,
    out: Extraction,
    /// Variable bindings, innermost last.
    scope: Vec<(String, Denotes)>,
    dot: Denotes,
}

impl<'a> Extractor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            out: Extraction::default(),
            scope: vec![
                ("$".to_string(), Denotes::Alert),
                ("$labels".to_string(), Denotes::Labels),
                ("$externalLabels".to_string(), Denotes::Unknown),
                ("$externalURL".to_string(), Denotes::Unknown),
                ("$value".to_string(), Denotes::Value(Vec::new())),
            ],
            dot: Denotes::Alert,
        }
    }

    fn line_of(&self, offset: TextSize) -> usize {
        let offset = usize::from(offset).min(self.source.len());
        self.source[..offset].matches('\n').count()
    }

    fn list(&mut self, list: Option<List>) {
        for item in list.iter().flat_map(List::items) {
            self.item(&item);
        }
    }

    fn item(&mut self, item: &Item) {
        match item {
            Item::Action(action) => {
                if let Some(pipeline) = action.pipeline() {
                    self.pipeline(&pipeline, false);
                }
            }
            Item::If(block) => {
                let mark = self.scope.len();
                if let Some(pipeline) = block.pipeline() {
                    self.pipeline(&pipeline, false);
                }
                self.list(block.body());
                self.else_branch(block.else_branch());
                self.scope.truncate(mark);
            }
            Item::With(block) => {
                let mark = self.scope.len();
                let dot = match block.pipeline() {
                    Some(pipeline) => self.pipeline(&pipeline, false),
                    None => Denotes::Unknown,
                };
                let outer = std::mem::replace(&mut self.dot, dot);
                self.list(block.body());
                self.dot = outer;
                self.else_branch(block.else_branch());
                self.scope.truncate(mark);
            }
            Item::Range(block) => {
                let mark = self.scope.len();
                if let Some(pipeline) = block.pipeline() {
                    self.pipeline(&pipeline, true);
                }
                let outer = std::mem::replace(&mut self.dot, Denotes::Unknown);
                self.list(block.body());
                self.dot = outer;
                self.else_branch(block.else_branch());
                self.scope.truncate(mark);
            }
            Item::Define(define) => self.isolated(|this| this.list(define.body())),
            Item::Block(block) => {
                if let Some(pipeline) = block.pipeline() {
                    self.pipeline(&pipeline, false);
                }
                self.isolated(|this| this.list(block.body()));
            }
            Item::Template(call) => {
                if let Some(pipeline) = call.pipeline() {
                    self.pipeline(&pipeline, false);
                }
            }
        }
    }

    fn else_branch(&mut self, branch: Option<ElseBranch>) {
        let Some(branch) = branch else {
            return;
        };
        match branch.nested() {
            Some(nested) => self.item(&nested),
            None => self.list(branch.body()),
        }
    }

    /// Template bodies are executed with whatever dot the caller passes.
    fn isolated(&mut self, f: impl FnOnce(&mut Self)) {
        let fresh = vec![("$".to_string(), Denotes::Unknown)];
        let scope = std::mem::replace(&mut self.scope, fresh);
        let dot = std::mem::replace(&mut self.dot, Denotes::Unknown);
        f(self);
        self.scope = scope;
        self.dot = dot;
    }

    fn lookup(&self, name: &str) -> Denotes {
        self.scope
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map_or(Denotes::Unknown, |(_, d)| d.clone())
    }

    fn pipeline(&mut self, pipeline: &Pipeline, in_range: bool) -> Denotes {
        let mark = self.out.value_refs.len();

        let commands: Vec<Command> = pipeline.commands().collect();
        let mut first = Denotes::Unknown;
        for (i, command) in commands.iter().enumerate() {
            let value = self.command(command);
            if i == 0 {
                first = value;
            }
        }
        // Filters like `| humanize` keep a value a value.
        let result = match first {
            Denotes::Value(_) => first,
            _ if commands.len() == 1 => first,
            _ => Denotes::Unknown,
        };

        let Some(decl) = pipeline.decl() else {
            return result;
        };
        let variables = decl.variables();
        if in_range || variables.len() != 1 {
            for variable in &variables {
                self.scope
                    .push((variable.text().to_string(), Denotes::Unknown));
            }
            return result;
        }

        // Binding the value to a variable is not a use of it; using the
        // variable later is.
        if matches!(result, Denotes::Value(_)) {
            self.out.value_refs.truncate(mark);
        }
        let name = variables[0].text().to_string();
        let existing = if decl.is_assign() {
            self.scope.iter().rposition(|(n, _)| *n == name)
        } else {
            None
        };
        match existing {
            Some(i) => self.scope[i].1 = result.clone(),
            None => self.scope.push((name, result.clone())),
        }
        result
    }

    fn command(&mut self, command: &Command) -> Denotes {
        let operands: Vec<Operand> = command.operands().collect();
        let values: Vec<Denotes> = operands.iter().map(|o| self.operand(o)).collect();

        if let Some(Operand::Func(func)) = operands.first()
            && func.name().is_some_and(|n| n.text() == "index")
            && values.get(1) == Some(&Denotes::Labels)
            && let Some(Operand::Lit(key)) = operands.get(2)
            && let Some(name) = key.string_value()
        {
            let range = key.as_cst().text_range();
            self.out.label_accesses.push(LabelAccess {
                name,
                range,
                line: self.line_of(range.start()),
            });
            return Denotes::Unknown;
        }

        match values.as_slice() {
            [single] => single.clone(),
            _ => Denotes::Unknown,
        }
    }

    fn operand(&mut self, operand: &Operand) -> Denotes {
        let base = match operand {
            Operand::Dot(_) | Operand::Field(_) => self.dot.clone(),
            Operand::Var(var) => {
                let Some(name) = var.name() else {
                    return Denotes::Unknown;
                };
                let name = name.text().to_string();
                match self.lookup(&name) {
                    Denotes::Value(chain) => {
                        let mut aliased = vec![name];
                        aliased.extend(chain);
                        Denotes::Value(aliased)
                    }
                    other => other,
                }
            }
            Operand::Func(func) => {
                if let Some(name) = func.name() {
                    let range = name.text_range();
                    self.out.function_calls.push(FunctionCall {
                        name: name.text().to_string(),
                        range,
                        line: self.line_of(range.start()),
                    });
                }
                return Denotes::Unknown;
            }
            Operand::Paren(paren) => match paren.pipeline() {
                Some(pipeline) => self.pipeline(&pipeline, false),
                None => Denotes::Unknown,
            },
            Operand::Lit(_) => return Denotes::Unknown,
        };

        let value = self.apply_fields(base, operand);
        if let Denotes::Value(chain) = &value
            && matches!(operand, Operand::Dot(_) | Operand::Field(_) | Operand::Var(_))
        {
            let range = operand.as_cst().text_range();
            self.out.value_refs.push(ValueRef {
                name: chain.first().cloned().unwrap_or_default(),
                chain: chain.clone(),
                range,
                line: self.line_of(range.start()),
            });
        }
        value
    }

    fn apply_fields(&mut self, base: Denotes, operand: &Operand) -> Denotes {
        let mut current = base;
        for field in operand.fields() {
            let name = field.text().trim_start_matches('.');
            current = match current {
                Denotes::Alert if name == "Labels" => Denotes::Labels,
                Denotes::Alert if name == "Value" => {
                    let text = operand.as_cst().text().to_string();
                    Denotes::Value(vec![text.trim().to_string()])
                }
                Denotes::Labels => {
                    let range = field.text_range();
                    self.out.label_accesses.push(LabelAccess {
                        name: name.to_string(),
                        range,
                        line: self.line_of(range.start()),
                    });
                    Denotes::Unknown
                }
                _ => Denotes::Unknown,
            };
        }
        current
    }
}
