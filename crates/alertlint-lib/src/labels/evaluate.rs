//! Survival rules per expression kind.

use std::collections::BTreeSet;

use promql_parser::parser::token::{T_BOTTOMK, T_COUNT_VALUES, T_LAND, T_LOR, T_LUNLESS, T_TOPK};
use promql_parser::parser::value::ValueType;
use promql_parser::parser::{
    AggregateExpr, BinaryExpr, Call, Expr, LabelModifier, VectorMatchCardinality,
};

use super::absent::absent_result;
use super::{Boundary, Survival};

const ABSENT_FUNCTIONS: &[&str] = &["absent", "absent_over_time"];

/// Computes what the output series of `expr` can carry.
///
/// Total over the AST: shapes that say nothing about labels come back as
/// [`Survival::unknown`].
pub fn evaluate(expr: &Expr) -> Survival {
    match expr {
        Expr::Aggregate(aggregate) => aggregation(aggregate),
        Expr::Binary(binary) => binary_op(binary),
        Expr::Call(call) => function_call(call),
        Expr::Paren(paren) => evaluate(&paren.expr),
        Expr::Unary(unary) => evaluate(&unary.expr),
        Expr::Subquery(subquery) => evaluate(&subquery.expr),
        Expr::VectorSelector(_)
        | Expr::MatrixSelector(_)
        | Expr::NumberLiteral(_)
        | Expr::StringLiteral(_)
        | Expr::Extension(_) => Survival::unknown(),
    }
}

fn aggregation(aggregate: &AggregateExpr) -> Survival {
    let inner = evaluate(&aggregate.expr);
    let op = aggregate.op.id();

    // Selection, not aggregation: input series come out as they were.
    if op == T_TOPK || op == T_BOTTOMK {
        return inner;
    }

    let mut result = match &aggregate.modifier {
        Some(LabelModifier::Include(by)) => {
            let kept = by.labels.iter().filter(|l| inner.may_carry(l));
            Survival::closed(kept.cloned(), Boundary::Aggregation)
        }
        Some(LabelModifier::Exclude(without)) => {
            let mut result = inner;
            for label in &without.labels {
                result.kept.remove(label);
                result.excluded.insert(label.clone());
            }
            result.boundary = Some(Boundary::Aggregation);
            result
        }
        None => Survival::closed(Vec::<String>::new(), Boundary::Aggregation),
    };

    if op == T_COUNT_VALUES
        && let Some(param) = &aggregate.param
        && let Expr::StringLiteral(label) = param.as_ref()
    {
        result.excluded.remove(&label.val);
        result.kept.insert(label.val.clone());
    }

    result
}

fn is_scalar(expr: &Expr) -> bool {
    matches!(expr.value_type(), ValueType::Scalar)
}

fn binary_op(binary: &BinaryExpr) -> Survival {
    match (is_scalar(&binary.lhs), is_scalar(&binary.rhs)) {
        (true, true) => return Survival::unknown(),
        (true, false) => return evaluate(&binary.rhs),
        (false, true) => return evaluate(&binary.lhs),
        (false, false) => {}
    }

    let op = binary.op.id();
    // `and` only filters the left side.
    if op == T_LAND {
        return evaluate(&binary.lhs);
    }

    let lhs = evaluate(&binary.lhs);
    let rhs = evaluate(&binary.rhs);
    if op == T_LOR || op == T_LUNLESS {
        return lhs.combine(rhs);
    }

    let Some(modifier) = &binary.modifier else {
        return lhs.combine(rhs);
    };
    let on_labels: &[String] = match &modifier.matching {
        Some(LabelModifier::Include(on)) => &on.labels,
        _ => &[],
    };

    match &modifier.card {
        VectorMatchCardinality::ManyToOne(include) => group_side(lhs, on_labels, &include.labels),
        VectorMatchCardinality::OneToMany(include) => group_side(rhs, on_labels, &include.labels),
        VectorMatchCardinality::OneToOne | VectorMatchCardinality::ManyToMany => {
            match &modifier.matching {
                Some(LabelModifier::Include(on)) => {
                    Survival::closed(on.labels.iter().cloned(), Boundary::Aggregation)
                }
                // `ignoring` asserts nothing new; only the sides' exclusions carry over.
                Some(LabelModifier::Exclude(_)) => {
                    let excluded: BTreeSet<String> =
                        lhs.excluded.union(&rhs.excluded).cloned().collect();
                    Survival {
                        kept: BTreeSet::new(),
                        excluded,
                        closed: false,
                        boundary: Boundary::merge(lhs.boundary, rhs.boundary),
                    }
                }
                None => lhs.combine(rhs),
            }
        }
    }
}

/// `group_left`/`group_right`: the many side keeps its labels, and gains the
/// matching labels and the include list copied from the one side.
fn group_side(many: Survival, on_labels: &[String], include: &[String]) -> Survival {
    if many.boundary == Some(Boundary::Absent) && include.is_empty() {
        return Survival::unknown();
    }
    let mut result = many;
    for label in on_labels.iter().chain(include) {
        result.excluded.remove(label);
        result.kept.insert(label.clone());
    }
    result
}

fn function_call(call: &Call) -> Survival {
    let name = call.func.name;
    let args = &call.args.args;

    if ABSENT_FUNCTIONS.contains(&name) {
        return match args.first() {
            Some(arg) => absent_result(arg),
            None => Survival::closed(Vec::<String>::new(), Boundary::Absent),
        };
    }

    let Some(first) = args
        .iter()
        .find(|arg| matches!(arg.value_type(), ValueType::Vector | ValueType::Matrix))
    else {
        return Survival::unknown();
    };
    let mut result = evaluate(first);

    match name {
        "label_replace" | "label_join" => {
            if let Some(Expr::StringLiteral(dst)) = args.get(1).map(|a| a.as_ref()) {
                result.excluded.remove(&dst.val);
                if result.closed {
                    result.kept.insert(dst.val.clone());
                }
            }
        }
        "histogram_quantile" => {
            result.kept.remove("le");
            result.excluded.insert("le".to_string());
        }
        _ => {}
    }
    result
}
