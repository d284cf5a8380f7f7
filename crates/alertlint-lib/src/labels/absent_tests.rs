use super::survival_of;

fn eval(query: &str) -> String {
    survival_of(query).unwrap().to_string()
}

#[test]
fn equality_matchers_are_copied() {
    insta::assert_snapshot!(eval(r#"absent(foo{job="bar", instance="server1"})"#), @"closed kept=[instance,job] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval(r#"absent_over_time(foo{job="bar"}[5m])"#), @"closed kept=[job] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval(r#"absent((foo{job="bar"}))"#), @"closed kept=[job] excluded=[] boundary=absent");
}

#[test]
fn other_matchers_are_not_copied() {
    insta::assert_snapshot!(eval("absent(foo)"), @"closed kept=[] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval(r#"absent({job=~".+"})"#), @"closed kept=[] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval(r#"absent(foo{job!="a", env=""})"#), @"closed kept=[] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval(r#"absent(foo{job="a", job!="b", env="prod"})"#), @"closed kept=[env] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval(r#"absent({__name__="foo", job="a"})"#), @"closed kept=[job] excluded=[] boundary=absent");
}

#[test]
fn aggregation_argument() {
    insta::assert_snapshot!(eval("absent(sum(foo) by (job, instance))"), @"closed kept=[instance,job] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("absent(sum(foo) without (job))"), @"closed kept=[] excluded=[] boundary=aggregation");
    insta::assert_snapshot!(eval("absent(sum(foo))"), @"closed kept=[] excluded=[] boundary=aggregation");
}

#[test]
fn other_arguments_carry_nothing() {
    insta::assert_snapshot!(eval("absent(vector(1))"), @"closed kept=[] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval(r#"absent(rate(foo{job="a"}[5m]))"#), @"closed kept=[] excluded=[] boundary=absent");
}

#[test]
fn absent_in_binary_expressions() {
    insta::assert_snapshot!(eval("absent(foo) or absent(bar)"), @"closed kept=[] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval(r#"absent(foo{job="bar"}) AND on(job) foo"#), @"closed kept=[job] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval("foo and on() absent(bar)"), @"open kept=[] excluded=[] boundary=none");
}

#[test]
fn absent_with_group_modifiers() {
    insta::assert_snapshot!(eval(r#"absent(foo{job="xxx"}) * on() group_left(cluster, env) bar"#), @"closed kept=[cluster,env,job] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval(r#"bar * on() group_right(cluster, env) absent(foo{job="xxx"})"#), @"closed kept=[cluster,env,job] excluded=[] boundary=absent");
    insta::assert_snapshot!(eval(r#"absent(foo{job="xxx"}) * on() group_left() bar"#), @"open kept=[] excluded=[] boundary=none");
    insta::assert_snapshot!(eval(r#"bar * on() group_right() absent(foo{job="xxx"})"#), @"open kept=[] excluded=[] boundary=none");
}
