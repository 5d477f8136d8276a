//! Phased migration plan.
//!
//! Turns scored headers into three phases:
//! - P1: header-unit pilots for low-risk shared headers, plus frequently used
//!   system headers worth checking against the toolchain
//! - P2: named-module prototypes for headers outside cycles with moderate risk
//! - P3: `import std` readiness, driven by the per-TU standard flags and four
//!   pass/warn checks
//!
//! Everything here is a pure function of the analysis output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analyzer::compdb::StdStatus;
use crate::analyzer::graph::TranslationUnit;
use crate::analyzer::risk::{Recommendation, RiskAssessment, RiskBand};

// ============================================================================
// Data Structures
// ============================================================================

/// Phase sizes, configurable from `[plan]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlanLimits {
    pub p1_limit: usize,
    pub p2_limit: usize,
    /// System headers listed in the P1 toolchain action
    pub system_header_limit: usize,
    /// Minimum directive count before a system header is listed
    pub system_header_min_uses: usize,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            p1_limit: 5,
            p2_limit: 5,
            system_header_limit: 5,
            system_header_min_uses: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
}

impl CheckStatus {
    fn from_ok(ok: bool) -> Self {
        if ok { CheckStatus::Pass } else { CheckStatus::Warn }
    }

    pub fn passed(&self) -> bool {
        matches!(self, CheckStatus::Pass)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Warn => "warn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessCheck {
    pub title: String,
    pub status: CheckStatus,
    pub details: String,
}

/// A translation unit not yet compiled as C++20.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StdWarning {
    pub unit: String,
    pub status: StdStatus,
    /// Raw flag value, absent when no `-std` was given
    pub flag: Option<String>,
}

/// P1 or P2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phase {
    pub goal: String,
    /// Headers the actions name, in action order
    pub headers: Vec<String>,
    pub actions: Vec<String>,
}

/// P3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStdPhase {
    pub goal: String,
    /// `pass` when every TU is C++20 or later
    pub status: CheckStatus,
    pub warnings: Vec<StdWarning>,
    pub checks: Vec<ReadinessCheck>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhasePlan {
    pub p1_header_units: Phase,
    pub p2_named_modules: Phase,
    pub p3_import_std_readiness: ImportStdPhase,
}

/// Analysis output the planner reads.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub assessments: &'a [RiskAssessment],
    pub units: &'a [TranslationUnit],
    /// `<...>` token -> directive count
    pub system_includes: &'a BTreeMap<String, usize>,
    pub cycle_header_count: usize,
    pub unresolved_count: usize,
    pub macro_heavy_threshold: usize,
}

const P1_GOAL: &str = "Reduce parse cost by importing stable headers as header units.";
const P2_GOAL: &str = "Promote stable components to named modules with explicit interfaces.";
const P3_GOAL: &str = "Prepare for adopting import std where supported by toolchain.";

const P1_FALLBACK: &str = "Start with one low-risk, high-frequency project header as a pilot";
const P2_FALLBACK: &str =
    "No safe named-module candidates yet; reduce macro usage and break cycles first";

const P3_ACTIONS: &[&str] = &[
    "Ensure all TUs compile in C++20+ mode",
    "Eliminate include cycles and shrink macro-heavy public headers",
    "Validate compiler/libstdc++ or libc++ support for import std in CI",
];

// ============================================================================
// Ranking
// ============================================================================

/// Headers eligible for P1/P2: at least one includer, by (risk asc, frequency desc, header asc).
pub fn ranking_pool(assessments: &[RiskAssessment]) -> Vec<&RiskAssessment> {
    let mut pool: Vec<&RiskAssessment> = assessments
        .iter()
        .filter(|a| a.include_frequency >= 1)
        .collect();
    pool.sort_by(|a, b| {
        a.risk_score
            .cmp(&b.risk_score)
            .then_with(|| b.include_frequency.cmp(&a.include_frequency))
            .then_with(|| a.header.cmp(&b.header))
    });
    pool
}

/// Report order: payoff (`12 x frequency - risk`) first, ties by frequency, risk, header.
pub fn rank_candidates(assessments: &[RiskAssessment], top: usize) -> Vec<RiskAssessment> {
    let mut ranked: Vec<&RiskAssessment> = assessments.iter().collect();
    let payoff =
        |a: &RiskAssessment| (a.include_frequency as i64).saturating_mul(12) - i64::from(a.risk_score);
    ranked.sort_by(|a, b| {
        payoff(b)
            .cmp(&payoff(a))
            .then_with(|| b.include_frequency.cmp(&a.include_frequency))
            .then_with(|| a.risk_score.cmp(&b.risk_score))
            .then_with(|| a.header.cmp(&b.header))
    });
    ranked.into_iter().take(top).cloned().collect()
}

// ============================================================================
// Readiness
// ============================================================================

pub fn std_warnings(units: &[TranslationUnit]) -> Vec<StdWarning> {
    units
        .iter()
        .filter(|unit| unit.std.status.is_gap())
        .map(|unit| StdWarning {
            unit: unit.display.clone(),
            status: unit.std.status,
            flag: unit.std.value.clone(),
        })
        .collect()
}

pub fn readiness_checks(inputs: &PlanInputs<'_>) -> Vec<ReadinessCheck> {
    let below = inputs
        .units
        .iter()
        .filter(|u| u.std.status.is_gap())
        .count();
    let macro_heavy = inputs
        .assessments
        .iter()
        .filter(|a| a.macro_defines >= inputs.macro_heavy_threshold)
        .count();

    vec![
        ReadinessCheck {
            title: "C++20 compiler mode coverage".to_string(),
            status: CheckStatus::from_ok(below == 0),
            details: if below == 0 {
                "All translation units appear to use C++20+ flags".to_string()
            } else {
                format!("{} TU(s) are below C++20 or missing -std flag", below)
            },
        },
        ReadinessCheck {
            title: "Include cycle cleanup".to_string(),
            status: CheckStatus::from_ok(inputs.cycle_header_count == 0),
            details: if inputs.cycle_header_count == 0 {
                "No include cycles detected".to_string()
            } else {
                format!(
                    "{} header(s) are part of cycle(s)",
                    inputs.cycle_header_count
                )
            },
        },
        ReadinessCheck {
            title: "Macro-heavy header reduction".to_string(),
            status: CheckStatus::from_ok(macro_heavy == 0),
            details: if macro_heavy == 0 {
                "No macro-heavy headers detected".to_string()
            } else {
                format!(
                    "{} header(s) have >= {} #define directives",
                    macro_heavy, inputs.macro_heavy_threshold
                )
            },
        },
        ReadinessCheck {
            title: "Include resolution quality".to_string(),
            status: CheckStatus::from_ok(inputs.unresolved_count == 0),
            details: if inputs.unresolved_count == 0 {
                "All scanned includes resolved".to_string()
            } else {
                format!(
                    "{} unresolved include(s); verify include paths",
                    inputs.unresolved_count
                )
            },
        },
    ]
}

// ============================================================================
// Phases
// ============================================================================

fn header_unit_phase(pool: &[&RiskAssessment], inputs: &PlanInputs<'_>, limits: &PlanLimits) -> Phase {
    let picks: Vec<&RiskAssessment> = pool
        .iter()
        .copied()
        .filter(|a| a.recommendation == Recommendation::HeaderUnitCandidate)
        .take(limits.p1_limit)
        .collect();

    let mut actions: Vec<String> = picks
        .iter()
        .map(|a| {
            format!(
                "Convert {} to a header unit pilot (risk {})",
                a.header, a.risk_score
            )
        })
        .collect();

    let mut system: Vec<(&String, usize)> = inputs
        .system_includes
        .iter()
        .filter(|(_, count)| **count >= limits.system_header_min_uses)
        .map(|(token, count)| (token, *count))
        .collect();
    system.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    system.truncate(limits.system_header_limit);
    if !system.is_empty() {
        let listed: Vec<String> = system
            .iter()
            .map(|(token, count)| format!("{} ({}x)", token, count))
            .collect();
        actions.push(format!(
            "Evaluate toolchain support for standard/third-party header units: {}",
            listed.join(", ")
        ));
    }

    if actions.is_empty() {
        actions.push(P1_FALLBACK.to_string());
    }

    Phase {
        goal: P1_GOAL.to_string(),
        headers: picks.iter().map(|a| a.header.clone()).collect(),
        actions,
    }
}

fn named_module_phase(pool: &[&RiskAssessment], limits: &PlanLimits) -> Phase {
    let picks: Vec<&RiskAssessment> = pool
        .iter()
        .copied()
        .filter(|a| {
            !a.in_cycle
                && matches!(a.risk_level, RiskBand::Low | RiskBand::Medium)
                && a.include_frequency >= 2
        })
        .take(limits.p2_limit)
        .collect();

    let mut actions: Vec<String> = picks
        .iter()
        .map(|a| {
            format!(
                "Prototype named module '{}' from {}",
                a.suggested_module, a.header
            )
        })
        .collect();
    if actions.is_empty() {
        actions.push(P2_FALLBACK.to_string());
    }

    Phase {
        goal: P2_GOAL.to_string(),
        headers: picks.iter().map(|a| a.header.clone()).collect(),
        actions,
    }
}

/// Build all three phases.
pub fn build_phase_plan(inputs: &PlanInputs<'_>, limits: &PlanLimits) -> PhasePlan {
    let pool = ranking_pool(inputs.assessments);
    let warnings = std_warnings(inputs.units);

    PhasePlan {
        p1_header_units: header_unit_phase(&pool, inputs, limits),
        p2_named_modules: named_module_phase(&pool, limits),
        p3_import_std_readiness: ImportStdPhase {
            goal: P3_GOAL.to_string(),
            status: CheckStatus::from_ok(warnings.is_empty()),
            warnings,
            checks: readiness_checks(inputs),
            actions: P3_ACTIONS.iter().map(|s| s.to_string()).collect(),
        },
    }
}
