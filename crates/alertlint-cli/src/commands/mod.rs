pub mod labels;
pub mod lint;
pub mod rule_loader;
pub mod template;

#[cfg(test)]
mod lint_tests;
#[cfg(test)]
mod rule_loader_tests;
#[cfg(test)]
mod template_tests;
