use alertlint_lib::template::extract;

use super::template::{render, value_problems};

#[test]
fn render_lists_reads() {
    let extraction = extract("{{ $labels.job }}\n{{ $foo := $value }}{{ $foo | humanize }}");
    insta::assert_snapshot!(render(&extraction), @r"
    label job (line 0)
    value $foo (line 1) via $foo -> $value
    func humanize (line 1)
    ");
}

#[test]
fn value_problems_once_per_name() {
    let extraction = extract("{{ $value }} {{ $value | humanize }} {{ .Value }}");
    insta::assert_snapshot!(value_problems(&extraction).join("\n"), @r"
    using $value in labels will generate a new alert on every value change, move it to annotations
    using .Value in labels will generate a new alert on every value change, move it to annotations
    ");
}
