//! Line-based directive scanner.
//!
//! Pulls include directives and counts macro definitions out of C/C++ text.
//! No preprocessing happens: conditional blocks, macro-expanded includes and
//! block comments are all taken at face value.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use super::regexes::{
    regex_define, regex_include, regex_include_directive, regex_macro_directive,
};

pub const DEFAULT_HEADER_SUFFIXES: &[&str] = &["h", "hh", "hpp", "hxx", "inc", "ipp"];

/// Directive keywords and header suffixes, configurable from `[scan]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanRules {
    pub include_directive: String,
    pub define_directive: String,
    /// Extensions (without the dot) treated as headers
    pub header_suffixes: Vec<String>,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self {
            include_directive: "include".to_string(),
            define_directive: "define".to_string(),
            header_suffixes: DEFAULT_HEADER_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ScanRules {
    pub fn is_header(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.header_suffixes
                    .iter()
                    .any(|s| s.trim_start_matches('.').eq_ignore_ascii_case(&ext))
            })
            .unwrap_or(false)
    }

    /// Build the scanner for these rules. Default keywords reuse the shared regexes.
    pub fn scanner(&self) -> Scanner {
        let include = if self.include_directive == "include" {
            regex_include().clone()
        } else {
            regex_include_directive(&self.include_directive)
        };
        let define = if self.define_directive == "define" {
            regex_define().clone()
        } else {
            regex_macro_directive(&self.define_directive)
        };
        Scanner { include, define }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeKind {
    /// `"..."` - may name a project header
    Quoted,
    /// `<...>` - system or third-party, never a graph node
    Angle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub kind: IncludeKind,
    pub target: String,
    /// 1-based
    pub line: usize,
}

impl IncludeDirective {
    /// Target with its delimiters, e.g. `<vector>` or `"core/math.hpp"`.
    pub fn token(&self) -> String {
        match self.kind {
            IncludeKind::Quoted => format!("\"{}\"", self.target),
            IncludeKind::Angle => format!("<{}>", self.target),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Include directives in textual order
    pub includes: Vec<IncludeDirective>,
    pub macro_defines: usize,
}

#[derive(Debug, Clone)]
pub struct Scanner {
    include: Regex,
    define: Regex,
}

impl Default for Scanner {
    fn default() -> Self {
        ScanRules::default().scanner()
    }
}

impl Scanner {
    pub fn scan(&self, text: &str) -> ScanResult {
        // A leading byte order mark would hide a directive on line 1.
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut result = ScanResult::default();
        for (idx, line) in text.lines().enumerate() {
            if let Some(caps) = self.include.captures(line) {
                let kind = if &caps[1] == "<" {
                    IncludeKind::Angle
                } else {
                    IncludeKind::Quoted
                };
                let target = caps[2].trim();
                if !target.is_empty() {
                    result.includes.push(IncludeDirective {
                        kind,
                        target: target.to_string(),
                        line: idx + 1,
                    });
                }
            } else if self.define.is_match(line) {
                result.macro_defines += 1;
            }
        }
        result
    }
}

/// One-shot scan with the given rules.
pub fn scan_source(text: &str, rules: &ScanRules) -> ScanResult {
    rules.scanner().scan(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATH_HPP: &str = r#"#pragma once

#include <vector>
#include "common/config.h"
  #  include   "detail/impl.hpp"
#include_next <stdio.h>
// #include "commented.h"
#define CORE_API
#  define CORE_INLINE inline
#undef CORE_API
#ifndef X
#define X 1
#endif
"#;

    #[test]
    fn extracts_includes_in_order() {
        let result = Scanner::default().scan(MATH_HPP);
        let tokens: Vec<String> = result.includes.iter().map(|i| i.token()).collect();
        assert_eq!(
            tokens,
            vec!["<vector>", "\"common/config.h\"", "\"detail/impl.hpp\""]
        );
        assert_eq!(result.includes[0].kind, IncludeKind::Angle);
        assert_eq!(result.includes[1].kind, IncludeKind::Quoted);
        assert_eq!(result.includes[1].line, 4);
    }

    #[test]
    fn counts_macro_definitions() {
        let result = Scanner::default().scan(MATH_HPP);
        assert_eq!(result.macro_defines, 3);
    }

    #[test]
    fn custom_directive_keywords() {
        let rules = ScanRules {
            include_directive: "import".to_string(),
            define_directive: "pragma".to_string(),
            ..ScanRules::default()
        };
        let result = rules
            .scanner()
            .scan("#import \"legacy.h\"\n#include \"skip.h\"\n#pragma once\n");
        assert_eq!(result.includes.len(), 1);
        assert_eq!(result.includes[0].target, "legacy.h");
        assert_eq!(result.macro_defines, 1);
    }

    #[test]
    fn header_suffix_detection() {
        let rules = ScanRules::default();
        assert!(rules.is_header(Path::new("a/b.hpp")));
        assert!(rules.is_header(Path::new("a/B.H")));
        assert!(!rules.is_header(Path::new("a/b.cpp")));
        assert!(!rules.is_header(Path::new("a/vector")));
    }

    #[test]
    fn scan_source_matches_scanner() {
        let rules = ScanRules::default();
        assert_eq!(
            scan_source(MATH_HPP, &rules),
            Scanner::default().scan(MATH_HPP)
        );
    }

    #[test]
    fn byte_order_mark_does_not_hide_first_directive() {
        let result = Scanner::default()
            .scan("\u{feff}#include \"x.h\"\r\n#include \"y.h\"\r\n#define Z 1\r\n");
        let targets: Vec<&str> = result.includes.iter().map(|i| i.target.as_str()).collect();
        assert_eq!(targets, vec!["x.h", "y.h"]);
        assert_eq!(result.includes[0].line, 1);
        assert_eq!(result.macro_defines, 1);

        let define_first = Scanner::default().scan("\u{feff}#define ONLY 1\n");
        assert_eq!(define_first.macro_defines, 1);
    }

    #[test]
    fn empty_source_yields_nothing() {
        assert_eq!(Scanner::default().scan(""), ScanResult::default());
    }
}
