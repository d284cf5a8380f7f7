use alertlint_lib::DiagnosticKind;
use alertlint_lib::template::{Extraction, extract};

pub struct TemplateArgs {
    pub text: String,
    pub label: bool,
}

pub fn run(args: TemplateArgs) {
    let extraction = extract(&args.text);
    if let Some(error) = extraction.errors.first() {
        eprintln!(
            "error: {}",
            DiagnosticKind::TemplateSyntax.message(Some(error.message.as_str()))
        );
        std::process::exit(1);
    }

    print!("{}", render(&extraction));

    if args.label {
        let problems = value_problems(&extraction);
        for problem in &problems {
            eprintln!("error: {}", problem);
        }
        if !problems.is_empty() {
            std::process::exit(1);
        }
    }
}

pub fn render(extraction: &Extraction) -> String {
    let mut out = String::new();
    for access in &extraction.label_accesses {
        out.push_str(&format!("label {} (line {})\n", access.name, access.line));
    }
    for value in &extraction.value_refs {
        out.push_str(&format!("value {} (line {})", value.name, value.line));
        if value.chain.len() > 1 {
            out.push_str(&format!(" via {}", value.chain.join(" -> ")));
        }
        out.push('\n');
    }
    for call in &extraction.function_calls {
        out.push_str(&format!("func {} (line {})\n", call.name, call.line));
    }
    out
}

/// Messages for value reads, as they would be reported for a label template.
pub fn value_problems(extraction: &Extraction) -> Vec<String> {
    extraction
        .distinct_value_refs()
        .into_iter()
        .map(|value| DiagnosticKind::ValueInLabels.message(Some(value.name.as_str())))
        .collect()
}
