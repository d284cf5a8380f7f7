//! Which labels a PromQL query is guaranteed to keep or drop.
//!
//! The evaluator walks the `promql-parser` AST once and produces a
//! [`Survival`] for the query's output series. It only ever proves absence:
//! a label is reported as removed when an aggregation, a vector-matching
//! clause, or `absent()` makes it impossible for the label to reach the
//! alert. Plain selectors carry arbitrary labels, so a query without any of
//! those operators never removes anything.

mod absent;
mod evaluate;

#[cfg(test)]
mod absent_tests;
#[cfg(test)]
mod evaluate_tests;

use std::collections::BTreeSet;
use std::fmt;

use crate::{Error, Result};

pub use evaluate::evaluate;

/// The operator that decided what survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Aggregation or an `on()`/`ignoring()` matching clause.
    Aggregation,
    /// The synthetic series of `absent()` or `absent_over_time()`.
    Absent,
}

impl Boundary {
    fn merge(a: Option<Boundary>, b: Option<Boundary>) -> Option<Boundary> {
        match (a, b) {
            (None, None) => None,
            (Some(x), None) | (None, Some(x)) => Some(x),
            (Some(Boundary::Absent), Some(Boundary::Absent)) => Some(Boundary::Absent),
            (Some(_), Some(_)) => Some(Boundary::Aggregation),
        }
    }
}

/// What the query's output series can carry.
///
/// `closed` means `kept` is exhaustive: nothing outside it can be present.
/// An open result only knows which labels are `excluded`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Survival {
    pub kept: BTreeSet<String>,
    pub excluded: BTreeSet<String>,
    pub closed: bool,
    pub boundary: Option<Boundary>,
}

impl Survival {
    /// Nothing known; plain series.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn closed<I, S>(labels: I, boundary: Boundary) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kept: labels.into_iter().map(Into::into).collect(),
            excluded: BTreeSet::new(),
            closed: true,
            boundary: Some(boundary),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.boundary.is_none()
    }

    /// The boundary that removes `label`, or `None` when it may be present.
    pub fn removes(&self, label: &str) -> Option<Boundary> {
        let boundary = self.boundary?;
        let dropped = self.excluded.contains(label) || (self.closed && !self.kept.contains(label));
        dropped.then_some(boundary)
    }

    /// Whether `label` can reach the output.
    pub fn may_carry(&self, label: &str) -> bool {
        !self.excluded.contains(label) && (!self.closed || self.kept.contains(label))
    }

    /// Both sides of a binary operation can produce the output series.
    pub fn combine(self, other: Survival) -> Survival {
        let kept: BTreeSet<String> = match (self.closed, other.closed) {
            (true, true) => self.kept.intersection(&other.kept).cloned().collect(),
            (true, false) => self.kept.difference(&other.excluded).cloned().collect(),
            (false, true) => other.kept.difference(&self.excluded).cloned().collect(),
            (false, false) => BTreeSet::new(),
        };
        let excluded = self
            .excluded
            .union(&other.excluded)
            .filter(|label| !kept.contains(*label))
            .cloned()
            .collect();

        Survival {
            kept,
            excluded,
            closed: self.closed || other.closed,
            boundary: Boundary::merge(self.boundary, other.boundary),
        }
    }
}

impl fmt::Display for Survival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(",");
        let boundary = match self.boundary {
            None => "none",
            Some(Boundary::Aggregation) => "aggregation",
            Some(Boundary::Absent) => "absent",
        };
        write!(
            f,
            "{} kept=[{}] excluded=[{}] boundary={}",
            if self.closed { "closed" } else { "open" },
            join(&self.kept),
            join(&self.excluded),
            boundary
        )
    }
}

/// Parses `query` and evaluates it.
pub fn survival_of(query: &str) -> Result<Survival> {
    let expr = promql_parser::parser::parse(query).map_err(Error::QueryParse)?;
    Ok(evaluate(&expr))
}
