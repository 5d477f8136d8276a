//! Report renderers.
//!
//! Both renderers read a finished [`PlannerReport`] and never recompute
//! anything.

use std::fmt::Write as _;

use crate::colors::Painter;
use crate::migration_plan::StdWarning;

use super::compdb::StdStatus;
use super::runner::PlannerReport;

/// Warnings shown by the text renderer.
pub const TEXT_WARNING_LIMIT: usize = 10;
/// Rationale lines shown per candidate in text.
pub const TEXT_RATIONALE_LINES: usize = 3;

/// Pretty-printed JSON.
pub fn to_json(report: &PlannerReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

fn describe_std(warning: &StdWarning) -> String {
    match (warning.status, &warning.flag) {
        (StdStatus::Missing, _) | (_, None) => "no -std flag".to_string(),
        (_, Some(flag)) => format!("-std={} is below C++20", flag),
    }
}

/// Human-readable plan.
pub fn format_report(report: &PlannerReport, painter: &Painter) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    // String writes cannot fail.
    let _ = writeln!(out, "{}", painter.header("modpath migration plan"));
    let _ = writeln!(out, "Input: {}", painter.path(&report.input_file));
    let _ = writeln!(out, "Project root: {}", painter.path(&report.project_root));
    let _ = writeln!(
        out,
        "Scanned: {} translation units, {} headers, {} cycle-involved headers",
        painter.number(summary.translation_units),
        painter.number(summary.scanned_headers),
        painter.number(summary.cycle_header_count)
    );
    out.push('\n');

    let _ = writeln!(out, "{}", painter.header("Top migration candidates"));
    if report.candidates.is_empty() {
        out.push_str("- No project headers were discovered from the input metadata.\n");
    }
    for (idx, candidate) in report.candidates.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} (includes={}, risk={}/100 {})",
            idx + 1,
            painter.path(&candidate.header),
            candidate.include_frequency,
            candidate.risk_score,
            painter.band(candidate.risk_level)
        );
        let _ = writeln!(
            out,
            "   recommendation: {}",
            candidate.recommendation.text()
        );
        let _ = writeln!(out, "   module hint: {}", candidate.suggested_module);
        for reason in candidate.rationale.iter().take(TEXT_RATIONALE_LINES) {
            let _ = writeln!(out, "   - {}", painter.dim(reason));
        }
    }
    out.push('\n');

    let phases = &report.phases;
    let _ = writeln!(out, "{}", painter.header("Phased plan"));
    out.push_str("P1) Header units\n");
    for action in &phases.p1_header_units.actions {
        let _ = writeln!(out, "- {}", action);
    }
    out.push_str("P2) Named modules\n");
    for action in &phases.p2_named_modules.actions {
        let _ = writeln!(out, "- {}", action);
    }

    let p3 = &phases.p3_import_std_readiness;
    out.push_str("P3) import std readiness\n");
    for check in &p3.checks {
        let _ = writeln!(
            out,
            "- {} {}: {}",
            painter.check_status(check.status),
            check.title,
            check.details
        );
    }
    for warning in &p3.warnings {
        let _ = writeln!(
            out,
            "  {} {}",
            painter.path(&warning.unit),
            painter.warn(&describe_std(warning))
        );
    }

    if !report.warnings.is_empty() {
        out.push('\n');
        let shown = report.warnings.len().min(TEXT_WARNING_LIMIT);
        let _ = writeln!(
            out,
            "{}",
            painter.warn(&format!(
                "Warnings (showing {} of {}):",
                shown, summary.warning_count
            ))
        );
        for warning in report.warnings.iter().take(TEXT_WARNING_LIMIT) {
            let _ = writeln!(out, "- {}", warning);
        }
    }

    out
}
