//! Terminal color helpers for the text report.
//!
//! Plain ANSI codes behind a [`Painter`] so renderers never check the
//! terminal themselves.

use std::io::IsTerminal;

use crate::analyzer::risk::RiskBand;
use crate::migration_plan::CheckStatus;
use crate::types::ColorMode;

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RESET: &str = "\x1b[0m";

pub const BRIGHT_CYAN: &str = "\x1b[96m";

/// Determines if colors should be used based on ColorMode and terminal detection.
pub fn is_enabled(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            enabled: is_enabled(mode),
        }
    }

    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn warn(&self, s: &str) -> String {
        self.wrap(s, YELLOW)
    }

    pub fn ok(&self, s: &str) -> String {
        self.wrap(s, GREEN)
    }

    pub fn path(&self, s: &str) -> String {
        self.wrap(s, CYAN)
    }

    pub fn header(&self, s: &str) -> String {
        self.wrap(s, BOLD)
    }

    pub fn dim(&self, s: &str) -> String {
        self.wrap(s, DIM)
    }

    pub fn number(&self, n: impl std::fmt::Display) -> String {
        self.wrap(&n.to_string(), BRIGHT_CYAN)
    }

    /// Band label colored by severity: low green, medium yellow, high red.
    pub fn band(&self, band: RiskBand) -> String {
        let code = match band {
            RiskBand::Low => GREEN,
            RiskBand::Medium => YELLOW,
            RiskBand::High => RED,
        };
        self.wrap(band.label(), code)
    }

    /// `[pass]` / `[warn]` marker for readiness checks.
    pub fn check_status(&self, status: CheckStatus) -> String {
        let marker = format!("[{}]", status.label());
        if status.passed() {
            self.ok(&marker)
        } else {
            self.warn(&marker)
        }
    }

    pub fn wrap(&self, s: &str, code: &str) -> String {
        if self.enabled {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }
}
