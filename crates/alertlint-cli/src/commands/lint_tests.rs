use alertlint_lib::{Check, Severity, TemplateCheck};
use indoc::indoc;

use super::lint::{FileReport, lint_source, render_json, render_text, summary};
use super::rule_loader::RuleFile;

const RULES: &str = indoc! {r#"
    groups:
      - name: example
        rules:
          - alert: JobDown
            expr: sum(up) without(job) == 0
            labels:
              severity: critical
            annotations:
              summary: '{{ $labels.job }} is down'
          - alert: Broken
            expr: up == 0
            annotations:
              summary: '{{ $label.job }}'
"#};

fn checks() -> Vec<Box<dyn Check>> {
    vec![Box::new(TemplateCheck::new())]
}

fn report(path: &str, source: &str) -> FileReport {
    FileReport {
        file: RuleFile {
            path: path.to_string(),
            source: source.to_string(),
        },
        result: lint_source(source, &checks()),
    }
}

#[test]
fn lint_source_collects_every_rule() {
    let diagnostics = lint_source(RULES, &checks()).unwrap();
    let lines: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();

    insta::assert_snapshot!(lines.join("\n"), @r#"
    bug 5,9: template is using "job" label but the query removes it [template]
    fatal 13: template parse error: undefined variable "$label" [template]
    "#);
}

#[test]
fn clean_file_has_no_diagnostics() {
    let source = indoc! {r#"
        - alert: Up
          expr: up == 0
          annotations:
            summary: '{{ $labels.instance }} is down'
    "#};
    let diagnostics = lint_source(source, &checks()).unwrap();

    assert!(diagnostics.is_empty());
    assert_eq!(render_text(&[report("ok.yml", source)], false), "");
}

#[test]
fn invalid_yaml_is_a_file_error() {
    let result = lint_source("- alert: [", &checks());
    assert!(result.unwrap_err().starts_with("invalid YAML"));
}

#[test]
fn fail_threshold() {
    let both = report("rules.yml", RULES);
    assert!(both.fails(Severity::Bug));
    assert!(both.fails(Severity::Fatal));

    let bug_only = report(
        "bug.yml",
        indoc! {r#"
            - alert: Foo
              expr: sum(up) == 0
              annotations:
                summary: '{{ $labels.job }}'
        "#},
    );
    assert!(bug_only.fails(Severity::Bug));
    assert!(!bug_only.fails(Severity::Fatal));

    let unreadable = FileReport {
        file: RuleFile {
            path: "bad.yml".to_string(),
            source: String::new(),
        },
        result: Err("invalid YAML".to_string()),
    };
    assert!(unreadable.fails(Severity::Fatal));
}

#[test]
fn text_output_names_the_file() {
    let text = render_text(&[report("rules/app.yml", RULES)], false);

    assert!(text.contains("rules/app.yml"), "{}", text);
    assert!(text.contains("the query removes it"), "{}", text);
    assert!(!text.contains('\u{1b}'));
}

#[test]
fn text_output_for_file_errors() {
    let failed = FileReport {
        file: RuleFile {
            path: "bad.yml".to_string(),
            source: String::new(),
        },
        result: Err("invalid YAML: oops".to_string()),
    };
    assert_eq!(
        render_text(&[failed], false),
        "error: bad.yml: invalid YAML: oops\n"
    );
}

#[test]
fn json_output() {
    let source = indoc! {r#"
        - alert: Foo
          expr: up == 0
          labels:
            value: '{{ $value }}'
    "#};
    let failed = FileReport {
        file: RuleFile {
            path: "bad.yml".to_string(),
            source: String::new(),
        },
        result: Err("invalid YAML: oops".to_string()),
    };
    let json = render_json(&[report("a.yml", source), failed]).unwrap();

    insta::assert_snapshot!(json, @r#"
    [
      {
        "path": "a.yml",
        "diagnostics": [
          {
            "kind": "value_in_labels",
            "severity": "bug",
            "reporter": "template",
            "message": "using $value in labels will generate a new alert on every value change, move it to annotations",
            "fragment": "value: {{ $value }}",
            "lines": [
              4
            ]
          }
        ]
      },
      {
        "path": "bad.yml",
        "error": "invalid YAML: oops",
        "diagnostics": []
      }
    ]
    "#);
}

#[test]
fn summary_counts_by_severity() {
    let clean = indoc! {r#"
        - alert: Up
          expr: up == 0
    "#};
    assert_eq!(summary(&[report("ok.yml", clean)]), None);

    let failed = FileReport {
        file: RuleFile {
            path: "bad.yml".to_string(),
            source: String::new(),
        },
        result: Err("invalid YAML: oops".to_string()),
    };
    assert_eq!(
        summary(&[report("rules.yml", RULES), report("ok.yml", clean), failed]).as_deref(),
        Some("1 fatal, 1 bug in 3 files (1 unreadable)")
    );
}
