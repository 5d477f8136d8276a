//! Per-header migration risk.
//!
//! Additive score over independent factors, each clamped to its own range
//! before summation, then the total clamped to 0-100:
//!
//! | factor   | signal                                    | range   |
//! |----------|-------------------------------------------|---------|
//! | base     | every header                              | 0..=20  |
//! | macros   | `#define` count x weight                  | 0..=40  |
//! | cycle    | header sits in an include cycle           | 0..=30  |
//! | std gap  | a dependent TU is below C++20 / no `-std` | 0..=15  |
//! | reuse    | +penalty at <=1 includer, -bonus at many  | -6..=8  |
//! | c header | `.h` extension                            | 0..=5   |
//!
//! More macros, cycle membership and std gaps never lower the score. More
//! includers never raise it.
//!
//! # Example
//!
//! ```rust
//! use modpath::analyzer::risk::{RiskBand, RiskFactors};
//!
//! let factors = RiskFactors { base: 10, macros: 8, reuse: 0, ..Default::default() };
//! assert_eq!(factors.total(), 18);
//! assert_eq!(RiskBand::from_score(factors.total()), RiskBand::Low);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize, Serializer};

use super::graph::{HeaderNode, IncludeGraph, TranslationUnit};
use super::cycles::CycleReport;
use super::regexes::{regex_module_name_junk, regex_repeated_dots};

/// Scores below this are `low`.
pub const LOW_BAND_LIMIT: u8 = 30;
/// Scores above this are `high`.
pub const HIGH_BAND_FLOOR: u8 = 60;

const BASE_RANGE: (i64, i64) = (0, 20);
const MACRO_RANGE: (i64, i64) = (0, 40);
const CYCLE_RANGE: (i64, i64) = (0, 30);
const STD_GAP_RANGE: (i64, i64) = (0, 15);
const REUSE_RANGE: (i64, i64) = (-6, 8);
const C_HEADER_RANGE: (i64, i64) = (0, 5);

/// Qualitative risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// low `< 30`, medium `30..=60`, high `> 60`.
    pub fn from_score(score: u8) -> Self {
        if score < LOW_BAND_LIMIT {
            RiskBand::Low
        } else if score <= HIGH_BAND_FLOOR {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
        }
    }
}

/// Tunable weights, configurable from `[risk]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub base: i64,
    pub macro_per_define: i64,
    pub cycle_penalty: i64,
    pub std_gap_penalty: i64,
    pub low_reuse_penalty: i64,
    pub high_reuse_bonus: i64,
    /// Includer count at which the reuse bonus applies
    pub high_reuse_threshold: usize,
    pub c_header_penalty: i64,
    /// `#define` count at which a header counts as macro-heavy
    pub macro_heavy_threshold: usize,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            base: 10,
            macro_per_define: 4,
            cycle_penalty: 30,
            std_gap_penalty: 15,
            low_reuse_penalty: 8,
            high_reuse_bonus: 6,
            high_reuse_threshold: 4,
            c_header_penalty: 5,
            macro_heavy_threshold: 8,
        }
    }
}

/// Clamped contribution of each factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskFactors {
    pub base: i64,
    pub macros: i64,
    pub cycle: i64,
    pub std_gap: i64,
    pub reuse: i64,
    pub c_header: i64,
}

impl RiskFactors {
    pub fn total(&self) -> u8 {
        let sum = self.base + self.macros + self.cycle + self.std_gap + self.reuse + self.c_header;
        sum.clamp(0, 100) as u8
    }
}

fn clamp_factor(value: i64, range: (i64, i64)) -> i64 {
    value.clamp(range.0, range.1)
}

/// What to do with a header, chosen from band and shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recommendation {
    BreakCycle,
    IsolateMacros,
    HeaderUnitCandidate,
    Opportunistic,
    NamedModulePilot,
    Defer,
}

impl Recommendation {
    pub fn text(&self) -> &'static str {
        match self {
            Recommendation::BreakCycle => "refactor include cycle before module migration",
            Recommendation::IsolateMacros => {
                "named module prototype only after moving macros to a separate config header"
            }
            Recommendation::HeaderUnitCandidate => "P1 header unit candidate",
            Recommendation::Opportunistic => "low payoff: convert opportunistically",
            Recommendation::NamedModulePilot => "P2 named module pilot",
            Recommendation::Defer => "defer until macro usage is reduced",
        }
    }
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.text())
    }
}

/// Signals about one header that feed the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSignals {
    pub include_frequency: usize,
    pub macro_defines: usize,
    pub in_cycle: bool,
    /// Dependent TUs below C++20 or without `-std`
    pub std_gap_units: usize,
    pub c_style: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub header: String,
    pub risk_score: u8,
    pub risk_level: RiskBand,
    pub recommendation: Recommendation,
    pub rationale: Vec<String>,
    pub include_frequency: usize,
    pub macro_defines: usize,
    pub in_cycle: bool,
    pub std_gap_units: usize,
    /// 0-100, grows with include frequency
    pub migration_value: u8,
    pub suggested_module: String,
    pub factors: RiskFactors,
}

pub fn score_factors(signals: &HeaderSignals, weights: &RiskWeights) -> RiskFactors {
    let macro_count = i64::try_from(signals.macro_defines).unwrap_or(i64::MAX);
    let reuse = if signals.include_frequency <= 1 {
        weights.low_reuse_penalty.max(0)
    } else if signals.include_frequency >= weights.high_reuse_threshold {
        -weights.high_reuse_bonus.max(0)
    } else {
        0
    };

    RiskFactors {
        base: clamp_factor(weights.base, BASE_RANGE),
        macros: clamp_factor(
            weights.macro_per_define.max(0).saturating_mul(macro_count),
            MACRO_RANGE,
        ),
        cycle: if signals.in_cycle {
            clamp_factor(weights.cycle_penalty, CYCLE_RANGE)
        } else {
            0
        },
        std_gap: if signals.std_gap_units > 0 {
            clamp_factor(weights.std_gap_penalty, STD_GAP_RANGE)
        } else {
            0
        },
        reuse: clamp_factor(reuse, REUSE_RANGE),
        c_header: if signals.c_style {
            clamp_factor(weights.c_header_penalty, C_HEADER_RANGE)
        } else {
            0
        },
    }
}

pub fn recommend(signals: &HeaderSignals, band: RiskBand, weights: &RiskWeights) -> Recommendation {
    if signals.in_cycle {
        return Recommendation::BreakCycle;
    }
    if signals.macro_defines >= weights.macro_heavy_threshold {
        return Recommendation::IsolateMacros;
    }
    match band {
        RiskBand::Low if signals.include_frequency >= 2 => Recommendation::HeaderUnitCandidate,
        RiskBand::Low => Recommendation::Opportunistic,
        RiskBand::Medium => Recommendation::NamedModulePilot,
        RiskBand::High => Recommendation::Defer,
    }
}

/// Scale include frequency into a 0-100 payoff signal.
pub fn migration_value(include_frequency: usize) -> u8 {
    include_frequency.saturating_mul(12).min(100) as u8
}

fn rationale(signals: &HeaderSignals, readable: bool, weights: &RiskWeights) -> Vec<String> {
    let mut lines = vec![format!(
        "reached from {} translation unit(s) or header(s)",
        signals.include_frequency
    )];

    if signals.macro_defines >= weights.macro_heavy_threshold {
        lines.push(format!(
            "macro-heavy: {} #define directives",
            signals.macro_defines
        ));
    } else if signals.macro_defines > 0 {
        lines.push(format!(
            "contains {} #define directives",
            signals.macro_defines
        ));
    } else {
        lines.push("no #define directives found".to_string());
    }
    if signals.in_cycle {
        lines.push("participates in an include cycle".to_string());
    }
    if signals.std_gap_units > 0 {
        lines.push(format!(
            "{} dependent TU(s) compile below C++20 or without -std",
            signals.std_gap_units
        ));
    }
    if signals.c_style {
        lines.push(".h extension may indicate C/C++ mixed usage".to_string());
    }
    if signals.include_frequency <= 1 {
        lines.push("low reuse means lower migration payoff".to_string());
    } else if signals.include_frequency >= weights.high_reuse_threshold {
        lines.push("high reuse improves migration payoff".to_string());
    }
    if !readable {
        lines.push("header could not be read; signals are incomplete".to_string());
    }
    lines
}

/// Module name hint from a header path: `include/core/math-ops.hpp` -> `core.math_ops`.
pub fn suggest_module_name(header: &str) -> String {
    let rel = header.strip_prefix("include/").unwrap_or(header);
    let path = Path::new(rel);
    let stem = match (path.parent(), path.file_stem()) {
        (Some(parent), Some(stem)) if !parent.as_os_str().is_empty() => {
            format!("{}/{}", parent.to_string_lossy(), stem.to_string_lossy())
        }
        (_, Some(stem)) => stem.to_string_lossy().into_owned(),
        _ => rel.to_string(),
    };

    let cleaned = regex_module_name_junk().replace_all(&stem, "");
    let dotted = cleaned.replace('/', ".").replace('-', "_");
    let collapsed = regex_repeated_dots().replace_all(&dotted, ".");
    let name = collapsed.trim_matches('.');
    if name.is_empty() {
        "unnamed.module".to_string()
    } else {
        name.to_string()
    }
}

/// Score a single header.
pub fn assess_header(
    node: &HeaderNode,
    in_cycle: bool,
    units: &[TranslationUnit],
    weights: &RiskWeights,
) -> RiskAssessment {
    let std_gap_units = node
        .dependent_units
        .iter()
        .filter_map(|idx| units.get(*idx))
        .filter(|unit| unit.std.status.is_gap())
        .count();

    let signals = HeaderSignals {
        include_frequency: node.include_frequency,
        macro_defines: node.macro_defines,
        in_cycle,
        std_gap_units,
        c_style: node.is_c_style(),
    };

    let factors = score_factors(&signals, weights);
    let risk_score = factors.total();
    let risk_level = RiskBand::from_score(risk_score);

    RiskAssessment {
        header: node.key.clone(),
        risk_score,
        risk_level,
        recommendation: recommend(&signals, risk_level, weights),
        rationale: rationale(&signals, node.readable, weights),
        include_frequency: node.include_frequency,
        macro_defines: node.macro_defines,
        in_cycle,
        std_gap_units,
        migration_value: migration_value(node.include_frequency),
        suggested_module: suggest_module_name(&node.key),
        factors,
    }
}

/// Score every header in the graph, ordered by header key.
pub fn assess_graph(
    graph: &IncludeGraph,
    cycles: &CycleReport,
    units: &[TranslationUnit],
    weights: &RiskWeights,
) -> Vec<RiskAssessment> {
    graph
        .nodes()
        .map(|node| assess_header(node, cycles.contains(&node.key), units, weights))
        .collect()
}
