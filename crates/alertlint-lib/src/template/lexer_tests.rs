use std::fmt::Write;

use super::cst::SyntaxKind;
use super::lexer::{lex, token_text};

fn dump(source: &str) -> String {
    let lexed = lex(source);
    let mut out = String::new();
    for token in &lexed.tokens {
        writeln!(out, "{:?} {:?}", token.kind, token_text(source, token)).unwrap();
    }
    if let Some(error) = &lexed.error {
        writeln!(out, "error: {}", error).unwrap();
    }
    out.trim_end().to_string()
}

fn lex_error(source: &str) -> String {
    lex(source).error.unwrap_or_default()
}

#[test]
fn text_and_action() {
    insta::assert_snapshot!(dump("foo {{ $labels.job | humanize }} bar"), @r#"
    Text "foo "
    LeftDelim "{{"
    Whitespace " "
    Variable "$labels"
    Field ".job"
    Whitespace " "
    Pipe "|"
    Whitespace " "
    Identifier "humanize"
    Whitespace " "
    RightDelim "}}"
    Text " bar"
    "#);
}

#[test]
fn trim_markers() {
    insta::assert_snapshot!(dump("a {{- .Value -}} b"), @r#"
    Text "a "
    LeftDelim "{{- "
    Field ".Value"
    RightDelim " -}}"
    Text " b"
    "#);
}

#[test]
fn space_before_trim_marker_is_split() {
    insta::assert_snapshot!(dump("{{ 1  -}}"), @r#"
    LeftDelim "{{"
    Whitespace " "
    Number "1"
    Whitespace " "
    RightDelim " -}}"
    "#);
}

#[test]
fn comment_is_one_token() {
    insta::assert_snapshot!(dump("a{{/* note */}}b"), @r#"
    Text "a"
    Comment "{{/* note */}}"
    Text "b"
    "#);
}

#[test]
fn declarations_and_literals() {
    insta::assert_snapshot!(dump(r#"{{ $x := printf "%d" 1 }}"#), @r#"
    LeftDelim "{{"
    Whitespace " "
    Variable "$x"
    Whitespace " "
    Declare ":="
    Whitespace " "
    Identifier "printf"
    Whitespace " "
    Str "\"%d\""
    Whitespace " "
    Number "1"
    Whitespace " "
    RightDelim "}}"
    "#);
}

#[test]
fn keywords_are_not_identifiers() {
    let lexed = lex("{{ if true }}{{ end }}");
    let kinds: Vec<SyntaxKind> = lexed
        .tokens
        .iter()
        .map(|t| t.kind)
        .filter(|k| !k.is_trivia())
        .collect();
    assert_eq!(
        kinds,
        [
            SyntaxKind::LeftDelim,
            SyntaxKind::KwIf,
            SyntaxKind::KwTrue,
            SyntaxKind::RightDelim,
            SyntaxKind::LeftDelim,
            SyntaxKind::KwEnd,
            SyntaxKind::RightDelim,
        ]
    );
    assert!(lexed.error.is_none());
}

#[test]
fn error_stops_lexing() {
    insta::assert_snapshot!(dump(r#"{{ "abc }} tail"#), @r#"
    LeftDelim "{{"
    Whitespace " "
    LexError "\"abc }} tail"
    error: unterminated quoted string
    "#);
}

#[test]
fn lexing_errors() {
    assert_eq!(lex_error("{{ foo"), "unclosed action");
    assert_eq!(lex_error("{{ `raw }}"), "unterminated raw quoted string");
    assert_eq!(lex_error("{{ 'a }}"), "unterminated character constant");
    assert_eq!(lex_error("{{ # }}"), "unrecognized character in action: U+0023 '#'");
    assert_eq!(lex_error("{{ .Labels# }}"), "bad character U+0023 '#'");
    assert_eq!(lex_error("{{ 3x }}"), r#"bad number syntax: "3x""#);
    assert_eq!(lex_error("{{ ) }}"), "unexpected right paren");
    assert_eq!(lex_error("{{ (1 }}"), "unclosed left paren");
    assert_eq!(lex_error("{{ a : b }}"), "expected :=");
    assert_eq!(lex_error("{{/* x }}"), "unclosed comment");
    assert_eq!(lex_error("{{/* x */ }}"), "comment ends before closing delimiter");
}

#[test]
fn plain_text_has_no_actions() {
    insta::assert_snapshot!(dump("just { some } text"), @r#"Text "just { some } text""#);
    assert!(lex("").tokens.is_empty());
}
