use super::{Boundary, Survival, survival_of};
use crate::Error;

fn eval(query: &str) -> String {
    survival_of(query).unwrap().to_string()
}

#[test]
fn plain_series_are_unknown() {
    insta::assert_snapshot!(eval("foo"), @"open kept=[] excluded=[] boundary=none");
    insta::assert_snapshot!(eval(r#"rate(foo{job="a"}[5m])"#), @"open kept=[] excluded=[] boundary=none");
    insta::assert_snapshot!(eval("foo + bar"), @"open kept=[] excluded=[] boundary=none");
    insta::assert_snapshot!(eval("1 + 2"), @"open kept=[] excluded=[] boundary=none");
    insta::assert_snapshot!(eval("time()"), @"open kept=[] excluded=[] boundary=none");
    insta::assert_snapshot!(eval("vector(1)"), @"open kept=[] excluded=[] boundary=none");
}

#[test]
fn aggregation_by() {
    insta::assert_snapshot!(eval("sum(foo)"), @"closed kept=[] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("sum(foo) by (job, instance)"), @"closed kept=[instance,job] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("sum by (job) (sum without (job) (foo))"), @"closed kept=[] excluded=[] boundary=aggregation");
}

#[test]
fn aggregation_without() {
    insta::assert_snapshot!(eval("sum(foo) without (job)"), @"open kept=[] excluded=[job] boundary=aggregation");
    insta::assert_snapshot!(eval("sum without (instance) (sum by (job, instance) (foo))"), @"closed kept=[job] excluded=[instance] boundary=aggregation");
}

#[test]
fn selection_aggregations_keep_labels() {
    insta::assert_snapshot!(eval("topk(3, sum(foo) by (job))"), @"closed kept=[job] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("bottomk(1, foo)"), @"open kept=[] excluded=[] boundary=none");
    insta::assert_snapshot!(eval(r#"count_values("version", build_info) by (job)"#), @"closed kept=[job,version] excluded=[] boundary=aggregation");
}

#[test]
fn scalar_operands_are_transparent() {
    insta::assert_snapshot!(eval("sum(foo) > 0"), @"closed kept=[] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("2 * sum(foo) by (job)"), @"closed kept=[job] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("-sum(foo) by (job)"), @"closed kept=[job] excluded=[] boundary=aggregation");
}

#[test]
fn unmatched_binary_intersects() {
    insta::assert_snapshot!(eval("sum(foo) by (job) or sum(bar)"), @"closed kept=[] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("1 + sum(foo) by (job) + sum(foo) by (notjob)"), @"closed kept=[] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("sum(foo) by (job) unless sum(bar) by (job, env)"), @"closed kept=[job] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("sum(foo) without (job) + sum(bar) without (env)"), @"open kept=[] excluded=[env,job] boundary=aggregation");
}

#[test]
fn closed_side_survives_open_side() {
    insta::assert_snapshot!(eval("sum(foo) by (job) + bar"), @"closed kept=[job] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("sum(foo) by (job, env) / sum(bar) without (env)"), @"closed kept=[job] excluded=[env] boundary=aggregation");
}

#[test]
fn and_keeps_left_side() {
    insta::assert_snapshot!(eval("sum(foo) by (job) and on (job) bar"), @"closed kept=[job] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("foo and on (job) sum(bar) by (job)"), @"open kept=[] excluded=[] boundary=none");
}

#[test]
fn vector_matching() {
    insta::assert_snapshot!(eval("sum(foo) by (job) + on (instance) bar"), @"closed kept=[instance] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("foo * ignoring (instance) bar"), @"open kept=[] excluded=[] boundary=none");
    insta::assert_snapshot!(
        eval("sum by (job, instance) (foo) / ignoring (instance) sum by (job, instance) (bar)"),
        @"open kept=[] excluded=[] boundary=aggregation"
    );
    insta::assert_snapshot!(
        eval("sum without (job) (foo) / ignoring (instance) sum without (job, env) (bar)"),
        @"open kept=[] excluded=[env,job] boundary=aggregation"
    );
    insta::assert_snapshot!(
        eval("count(build_info) by (instance, version) != ignoring(package) group_left(foo) count(package_installed) by (instance, version, package)"),
        @"closed kept=[foo,instance,version] excluded=[] boundary=aggregation"
    );
    insta::assert_snapshot!(eval("foo * on (job) group_right (env) sum(bar) by (job, instance)"), @"closed kept=[env,instance,job] excluded=[] boundary=aggregation");
}

#[test]
fn functions() {
    insta::assert_snapshot!(eval(r#"label_replace(sum(foo) by (job), "dst", "$1", "job", "(.*)")"#), @"closed kept=[dst,job] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval(r#"label_join(sum(foo) without (dst), "dst", ",", "a", "b")"#), @"open kept=[] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("histogram_quantile(0.9, sum(rate(x[5m])) by (le, job))"), @"closed kept=[job] excluded=[le] boundary=aggregation");
    insta::assert_snapshot!(eval("round(sum(foo) by (job), 5)"), @"closed kept=[job] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("max_over_time(sum(foo) by (job)[5m:1m])"), @"closed kept=[job] excluded=[] boundary=aggregation");
}

#[test]
fn removes_follows_boundary() {
    let by = survival_of("sum(foo) by (job)").unwrap();
    assert_eq!(by.removes("instance"), Some(Boundary::Aggregation));
    assert_eq!(by.removes("job"), None);

    let without = survival_of("sum(foo) without (job)").unwrap();
    assert_eq!(without.removes("job"), Some(Boundary::Aggregation));
    assert_eq!(without.removes("instance"), None);

    let unknown = Survival::unknown();
    assert!(unknown.is_unknown());
    assert_eq!(unknown.removes("job"), None);
}

#[test]
fn combine_merges_boundaries() {
    let absent = Survival::closed(["job"], Boundary::Absent);
    let both = absent.clone().combine(Survival::closed(["job"], Boundary::Absent));
    assert_eq!(both.boundary, Some(Boundary::Absent));

    let mixed = absent.combine(Survival::closed(["job"], Boundary::Aggregation));
    assert_eq!(mixed.boundary, Some(Boundary::Aggregation));
    assert!(mixed.kept.contains("job"));
}

#[test]
fn unparsable_query() {
    let err = survival_of("sum(").unwrap_err();
    assert!(matches!(err, Error::QueryParse(_)), "{err}");
}
