use std::sync::OnceLock;

use regex::Regex;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex literal")
}

/// `#include "x"` / `#include <x>` for an arbitrary directive keyword.
/// Group 1 is the opening delimiter, group 2 the target.
pub(crate) fn regex_include_directive(keyword: &str) -> Regex {
    regex(&format!(
        r#"^\s*#\s*{}\s*([<"])([^">]+)[">]"#,
        regex::escape(keyword)
    ))
}

/// `#define`-like directive for an arbitrary keyword.
pub(crate) fn regex_macro_directive(keyword: &str) -> Regex {
    regex(&format!(r#"^\s*#\s*{}\b"#, regex::escape(keyword)))
}

pub(crate) fn regex_include() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex_include_directive("include"))
}

pub(crate) fn regex_define() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex_macro_directive("define"))
}

pub(crate) fn regex_module_name_junk() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"[^a-zA-Z0-9/._-]"))
}

pub(crate) fn regex_repeated_dots() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"\.{2,}"))
}
