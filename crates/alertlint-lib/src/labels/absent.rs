//! Labels on the synthetic series produced by `absent()`.
//!
//! Prometheus can only copy labels it knows the value of, which means
//! single equality matchers: `absent(foo{job="a"})` yields `{job="a"}`, while
//! regex, negative, and empty matchers contribute nothing.

use promql_parser::label::{METRIC_NAME, MatchOp, Matcher};
use promql_parser::parser::{AggregateExpr, Expr, LabelModifier, VectorSelector};

use super::evaluate::evaluate;
use super::{Boundary, Survival};

/// Evaluates the argument of an `absent()`/`absent_over_time()` call.
pub(super) fn absent_result(arg: &Expr) -> Survival {
    match arg {
        Expr::VectorSelector(selector) => selector_labels(selector),
        Expr::MatrixSelector(matrix) => selector_labels(&matrix.vs),
        Expr::Paren(paren) => absent_result(&paren.expr),
        Expr::Aggregate(aggregate) => grouped(aggregate),
        Expr::Binary(_) => evaluate(arg),
        _ => Survival::closed(Vec::<String>::new(), Boundary::Absent),
    }
}

fn selector_labels(selector: &VectorSelector) -> Survival {
    let matchers = &selector.matchers.matchers;
    let labels = matchers
        .iter()
        .filter(|m| is_copied(m, matchers))
        .map(|m| m.name.clone());
    Survival::closed(labels, Boundary::Absent)
}

fn is_copied(matcher: &Matcher, all: &[Matcher]) -> bool {
    matcher.name != METRIC_NAME
        && matches!(matcher.op, MatchOp::Equal)
        && !matcher.value.is_empty()
        && all.iter().filter(|m| m.name == matcher.name).count() == 1
}

/// One synthetic series per missing group, carrying exactly the `by` labels.
fn grouped(aggregate: &AggregateExpr) -> Survival {
    match &aggregate.modifier {
        Some(LabelModifier::Include(by)) => {
            Survival::closed(by.labels.iter().cloned(), Boundary::Aggregation)
        }
        _ => Survival::closed(Vec::<String>::new(), Boundary::Aggregation),
    }
}
