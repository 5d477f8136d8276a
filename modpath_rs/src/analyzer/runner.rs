//! End-to-end analysis run.
//!
//! Database -> records -> include graph -> cycles -> risk -> plan, collected
//! into a [`PlannerReport`]. Fatal problems stop before any output is built;
//! everything else lands in the report's warnings.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::config::ModpathConfig;
use crate::error::{Diagnostic, Diagnostics, PlannerError, PlannerResult};
use crate::fs_utils::{FsSource, SourceProvider};
use crate::migration_plan::{PhasePlan, PlanInputs, ReadinessCheck, build_phase_plan, rank_candidates};
use crate::types::MAX_REPORTED_WARNINGS;

use super::compdb::{CommandRecord, parse_database, read_database};
use super::cycles::detect_cycles;
use super::graph::build_include_graph;
use super::resolvers::{infer_project_root, normalize_path};
use super::risk::{RiskAssessment, assess_graph};

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub translation_units: usize,
    pub scanned_headers: usize,
    pub cycle_header_count: usize,
    pub unresolved_include_count: usize,
    /// All soft failures, including those cut from `warnings`
    pub warning_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannerReport {
    pub input_file: String,
    pub project_root: String,
    pub summary: ReportSummary,
    pub candidates: Vec<RiskAssessment>,
    pub phases: PhasePlan,
    pub readiness_checks: Vec<ReadinessCheck>,
    /// Headers in each detected cycle, discovery order
    pub cycles: Vec<Vec<String>>,
    pub warnings: Vec<Diagnostic>,
}

/// Analyze a `compile_commands.json` on disk.
pub fn analyze_compile_commands(path: &Path, config: &ModpathConfig) -> PlannerResult<PlannerReport> {
    let absolute = std::path::absolute(path).map_err(|source| PlannerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let db_path = normalize_path(&absolute);
    let value = read_database(&db_path)?;
    let base_dir = db_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));

    analyze_database(&value, &db_path, &base_dir, &FsSource, config)
}

/// Analyze an already-parsed database.
///
/// `base_dir` must be absolute; relative `directory` fields and a relative
/// configured project root resolve against it.
pub fn analyze_database(
    value: &Value,
    input_file: &Path,
    base_dir: &Path,
    source: &dyn SourceProvider,
    config: &ModpathConfig,
) -> PlannerResult<PlannerReport> {
    let mut diagnostics = Diagnostics::new();
    let records = parse_database(value, base_dir, &mut diagnostics)?;
    if records.is_empty() {
        return Err(PlannerError::EmptyDatabase);
    }

    let project_root = match &config.project_root {
        Some(root) => normalize_path(&base_dir.join(root)),
        None => infer_root(&records, base_dir),
    };
    tracing::debug!(
        "{} records, project root {}",
        records.len(),
        project_root.display()
    );

    let build = build_include_graph(&records, &project_root, &config.scan, source);
    diagnostics.extend(build.diagnostics);
    let graph = build.graph;
    let units = build.units;

    let cycles = detect_cycles(&graph);
    let assessments = assess_graph(&graph, &cycles, &units, &config.risk);

    let unresolved_count = diagnostics.unresolved_count();
    let inputs = PlanInputs {
        assessments: &assessments,
        units: &units,
        system_includes: graph.system_includes(),
        cycle_header_count: cycles.member_count(),
        unresolved_count,
        macro_heavy_threshold: config.risk.macro_heavy_threshold,
    };
    let phases = build_phase_plan(&inputs, &config.plan);
    let candidates = rank_candidates(&assessments, config.top);

    let summary = ReportSummary {
        translation_units: units.len(),
        scanned_headers: graph.scanned_headers(),
        cycle_header_count: cycles.member_count(),
        unresolved_include_count: unresolved_count,
        warning_count: diagnostics.len(),
    };
    tracing::info!(
        "analyzed {} TUs, {} headers, {} in cycles, {} warnings",
        summary.translation_units,
        graph.len(),
        summary.cycle_header_count,
        summary.warning_count
    );

    let mut warnings = diagnostics.into_vec();
    warnings.truncate(MAX_REPORTED_WARNINGS);

    Ok(PlannerReport {
        input_file: input_file.display().to_string(),
        project_root: project_root.display().to_string(),
        summary,
        candidates,
        readiness_checks: phases.p3_import_std_readiness.checks.clone(),
        phases,
        cycles: cycles.cycles,
        warnings,
    })
}

/// Deepest directory holding every TU and every non-system include root.
fn infer_root(records: &[CommandRecord], base_dir: &Path) -> PathBuf {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for record in records {
        if let Some(parent) = record.file.parent() {
            dirs.push(parent.to_path_buf());
        }
        dirs.extend(
            record
                .include_roots
                .iter()
                .filter(|root| !root.system)
                .map(|root| root.path.clone()),
        );
    }
    infer_project_root(&dirs, base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::risk::{Recommendation, RiskBand};
    use crate::fs_utils::MemorySource;
    use crate::migration_plan::CheckStatus;
    use serde_json::json;

    fn run(value: Value, src: &MemorySource) -> PlannerResult<PlannerReport> {
        analyze_database(
            &value,
            Path::new("/p/compile_commands.json"),
            Path::new("/p"),
            src,
            &ModpathConfig::default(),
        )
    }

    fn entry(file: &str, std: Option<&str>) -> Value {
        let mut args = vec!["c++".to_string(), "-Iinclude".to_string()];
        if let Some(std) = std {
            args.push(format!("-std={}", std));
        }
        args.push("-c".to_string());
        args.push(file.to_string());
        json!({ "directory": "/p", "file": file, "arguments": args })
    }

    #[test]
    fn shared_header_becomes_p1_candidate() {
        let mut src = MemorySource::new()
            .with_file("/p/include/shared.h", "#define A 1\n#define B 2\n");
        let mut entries = Vec::new();
        for i in 0..5 {
            let file = format!("src/tu{}.cpp", i);
            let body = if i < 3 { "#include \"shared.h\"\n" } else { "int x;\n" };
            src = src.with_file(format!("/p/{}", file), body);
            entries.push(entry(&file, Some("c++20")));
        }

        let report = run(Value::Array(entries), &src).expect("report");
        let shared = &report.candidates[0];
        assert_eq!(shared.header, "include/shared.h");
        assert_eq!(shared.include_frequency, 3);
        assert_eq!(shared.risk_level, RiskBand::Low);
        assert_eq!(shared.recommendation, Recommendation::HeaderUnitCandidate);
        assert_eq!(report.phases.p1_header_units.headers, vec!["include/shared.h"]);
        assert_eq!(report.project_root, "/p");
    }

    #[test]
    fn missing_std_still_plans() {
        let src = MemorySource::new()
            .with_file("/p/src/a.cpp", "#include \"x.h\"\n")
            .with_file("/p/src/b.cpp", "#include \"x.h\"\n")
            .with_file("/p/include/x.h", "");
        let value = json!([entry("src/a.cpp", Some("c++20")), entry("src/b.cpp", None)]);

        let report = run(value, &src).expect("report");
        let p3 = &report.phases.p3_import_std_readiness;
        assert_eq!(p3.status, CheckStatus::Warn);
        assert_eq!(p3.warnings.len(), 1);
        assert_eq!(p3.warnings[0].unit, "src/b.cpp");
        assert!(!report.phases.p1_header_units.actions.is_empty());
        assert!(!report.phases.p2_named_modules.actions.is_empty());
    }

    #[test]
    fn non_array_database_is_fatal() {
        let err = run(json!({ "file": "a.cpp" }), &MemorySource::new()).unwrap_err();
        assert!(matches!(err, PlannerError::MalformedDatabase(_)));
    }

    #[test]
    fn empty_database_is_fatal() {
        let err = run(json!([]), &MemorySource::new()).unwrap_err();
        assert!(matches!(err, PlannerError::EmptyDatabase));
    }

    #[test]
    fn cycles_and_unresolved_are_reported() {
        let src = MemorySource::new()
            .with_file("/p/src/a.cpp", "#include \"a.h\"\n#include \"gone.h\"\n")
            .with_file("/p/include/a.h", "#include \"b.h\"\n")
            .with_file("/p/include/b.h", "#include \"a.h\"\n");
        let report = run(json!([entry("src/a.cpp", Some("c++20"))]), &src).expect("report");

        assert_eq!(report.summary.cycle_header_count, 2);
        assert_eq!(report.summary.unresolved_include_count, 1);
        assert_eq!(report.cycles, vec![vec!["include/a.h", "include/b.h"]]);
        assert!(report.candidates.iter().all(|c| c.in_cycle));
        assert_eq!(report.readiness_checks[1].status, CheckStatus::Warn);
        assert_eq!(report.readiness_checks[3].status, CheckStatus::Warn);
    }

    #[test]
    fn warnings_are_capped_but_counted() {
        let body: String = (0..60).map(|i| format!("#include \"missing{}.h\"\n", i)).collect();
        let src = MemorySource::new().with_file("/p/src/a.cpp", &body);
        let report = run(json!([entry("src/a.cpp", Some("c++20"))]), &src).expect("report");

        assert_eq!(report.summary.warning_count, 60);
        assert_eq!(report.warnings.len(), MAX_REPORTED_WARNINGS);
    }

    #[test]
    fn configured_root_overrides_inference() {
        let src = MemorySource::new().with_file("/p/src/a.cpp", "int x;\n");
        let config = ModpathConfig {
            project_root: Some(PathBuf::from("src")),
            ..ModpathConfig::default()
        };
        let report = analyze_database(
            &json!([entry("src/a.cpp", Some("c++20"))]),
            Path::new("/p/compile_commands.json"),
            Path::new("/p"),
            &src,
            &config,
        )
        .expect("report");
        assert_eq!(report.project_root, "/p/src");
    }
}
