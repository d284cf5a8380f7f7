use std::fmt::Write;

use indoc::indoc;

use crate::{Error, Rule, read_rules};

fn dump(rules: &[Rule]) -> String {
    let mut out = String::new();
    for rule in rules {
        let kind = if rule.is_recording() { "record" } else { "alert" };
        writeln!(out, "{kind} {:?} lines={}", rule.name(), rule.lines).unwrap();
        if let Some(expr) = &rule.expr {
            writeln!(out, "  expr lines={}: {:?}", expr.lines, expr.value).unwrap();
        }
        for (section, entries) in [("label", &rule.labels), ("annotation", &rule.annotations)] {
            for entry in entries {
                writeln!(
                    out,
                    "  {section} key={} value={}: {:?}",
                    entry.key.lines,
                    entry.value.lines,
                    entry.fragment()
                )
                .unwrap();
            }
        }
    }
    out.trim_end().to_string()
}

fn read(source: &str) -> String {
    dump(&read_rules(source).unwrap())
}

#[test]
fn bare_rule_list() {
    let source = "- alert: Foo Is Down\n  expr: up{job=\"foo\"} == 0\n  annotations:\n    summary: 'Instance {{ $label.instance }} down'\n";

    insta::assert_snapshot!(read(source), @r#"
    alert "Foo Is Down" lines=1-4
      expr lines=2: "up{job=\"foo\"} == 0"
      annotation key=4 value=4: "summary: Instance {{ $label.instance }} down"
    "#);
}

#[test]
fn groups_layout_with_block_scalars() {
    let source = indoc! {r#"
        groups:
          - name: example
            rules:
              - record: job:up:sum
                expr: sum(up) by (job)
              - alert: HighLatency
                expr: |
                  histogram_quantile(0.9, rate(x[5m]))
                    > 1
                for: 5m
                labels:
                  severity: page
                annotations:
                  description: |
                    Latency is {{ $value | humanize }}
                    for {{ $labels.job }}
    "#};

    insta::assert_snapshot!(read(source), @r#"
    record "job:up:sum" lines=4-5
      expr lines=5: "sum(up) by (job)"
    alert "HighLatency" lines=6-16
      expr lines=8-9: "histogram_quantile(0.9, rate(x[5m]))\n  > 1\n"
      label key=12 value=12: "severity: page"
      annotation key=14 value=15-16: "description: Latency is {{ $value | humanize }}\nfor {{ $labels.job }}\n"
    "#);
}

#[test]
fn quoted_keys_and_non_string_values() {
    let source = indoc! {"
        - alert: foo
          expr: sum(foo)
          labels:
            foo: bar
            '{{ $value}}': bar
            priority: 1
    "};

    insta::assert_snapshot!(read(source), @r#"
    alert "foo" lines=1-6
      expr lines=2: "sum(foo)"
      label key=4 value=4: "foo: bar"
      label key=5 value=5: "{{ $value}}: bar"
      label key=6 value=6: "priority: 1"
    "#);
}

#[test]
fn leading_blank_line_shifts_positions() {
    let source = indoc! {r#"

        - alert: Foo Is Missing
          expr: absent(foo{job="bar"}) AND on(job) foo
          labels:
            instance: '{{ $labels.instance }}'
          annotations:
            summary: '{{ $labels.instance }} on {{ .Labels.foo }} is missing'
            help: '{{ $labels.xxx }}'
    "#};

    insta::assert_snapshot!(read(source), @r#"
    alert "Foo Is Missing" lines=2-8
      expr lines=3: "absent(foo{job=\"bar\"}) AND on(job) foo"
      label key=5 value=5: "instance: {{ $labels.instance }}"
      annotation key=7 value=7: "summary: {{ $labels.instance }} on {{ .Labels.foo }} is missing"
      annotation key=8 value=8: "help: {{ $labels.xxx }}"
    "#);
}

#[test]
fn mapping_on_line_after_dash() {
    let source = indoc! {"
        -
          alert: Foo
          expr: up == 0
    "};

    insta::assert_snapshot!(read(source), @r#"
    alert "Foo" lines=1-3
      expr lines=3: "up == 0"
    "#);
}

#[test]
fn block_scalar_label_value() {
    let source = "- alert: foo\n  expr: sum(foo)\n  labels:\n    foo: bar\n    baz: |\n      foo is {{  $value | humanizePercentage }}%\n";

    insta::assert_snapshot!(read(source), @r#"
    alert "foo" lines=1-6
      expr lines=2: "sum(foo)"
      label key=4 value=4: "foo: bar"
      label key=5 value=6: "baz: foo is {{  $value | humanizePercentage }}%\n"
    "#);
}

#[test]
fn example_rule_inside_block_scalar() {
    let source = indoc! {"
        - alert: A
          expr: up == 0
          annotations:
            runbook: |
              Example rule:
              - alert: B
                expr: up
        - alert: C
          expr: down
    "};

    insta::assert_snapshot!(read(source), @r#"
    alert "A" lines=1-7
      expr lines=2: "up == 0"
      annotation key=4 value=5-7: "runbook: Example rule:\n- alert: B\n  expr: up\n"
    alert "C" lines=8-9
      expr lines=9: "down"
    "#);
}

#[test]
fn empty_document() {
    assert!(read_rules("").unwrap().is_empty());
    assert!(read_rules("  \n\n").unwrap().is_empty());
}

#[test]
fn scalar_document_is_layout_error() {
    let err = read_rules("foo: bar\n").unwrap_err();
    assert!(matches!(err, Error::Layout(_)), "{err}");
}

#[test]
fn broken_yaml_is_reported() {
    let err = read_rules("- alert: [\n").unwrap_err();
    assert!(matches!(err, Error::Yaml(_)), "{err}");
}
