//! Rule checks.
//!
//! A check looks at one rule at a time and reports what it finds as
//! [`Diagnostics`]. Checks hold no state between rules, so callers may run
//! them on many rules in parallel.

mod template;


use alertlint_core::Rule;

use crate::diagnostics::Diagnostics;

pub use template::TemplateCheck;

pub trait Check: Send + Sync {
    /// Name shown next to every diagnostic this check emits.
    fn reporter(&self) -> &'static str;

    fn check(&self, rule: &Rule) -> Diagnostics;
}
