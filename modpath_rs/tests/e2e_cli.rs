//! End-to-end CLI tests for modpath.
//!
//! Runs the binary against the fixture project under `tests/fixtures`.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get path to test fixtures
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn sample_db() -> PathBuf {
    fixtures_path().join("sample_project/compile_commands.json")
}

fn modpath() -> Command {
    cargo_bin_cmd!("modpath")
}

fn json_report(extra: &[&str]) -> Value {
    let output = modpath()
        .arg(sample_db())
        .arg("--json")
        .args(extra)
        .output()
        .expect("run modpath");
    assert!(output.status.success(), "modpath failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ============================================
// Basic CLI Tests
// ============================================

mod cli_basics {
    use super::*;

    #[test]
    fn shows_help() {
        modpath()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("compile_commands"))
            .stdout(predicate::str::contains("--json"))
            .stdout(predicate::str::contains("--top"));
    }

    #[test]
    fn shows_version() {
        modpath()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn rejects_unknown_color_mode() {
        modpath()
            .arg(sample_db())
            .args(["--color", "rainbow"])
            .assert()
            .failure();
    }
}

// ============================================
// Text Report
// ============================================

mod text_report {
    use super::*;

    #[test]
    fn prints_plan_sections() {
        modpath()
            .arg(sample_db())
            .args(["--color", "never"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("modpath migration plan"))
            .stdout(predicate::str::contains(
                "Scanned: 3 translation units, 4 headers, 2 cycle-involved headers",
            ))
            .stdout(predicate::str::contains(
                "1. include/core/math.hpp (includes=2, risk=10/100 low)",
            ))
            .stdout(predicate::str::contains(
                "- Convert include/core/math.hpp to a header unit pilot (risk 10)",
            ))
            .stdout(predicate::str::contains(
                "- Prototype named module 'core.math' from include/core/math.hpp",
            ))
            .stdout(predicate::str::contains("P3) import std readiness"))
            .stdout(predicate::str::contains("  src/legacy.cpp no -std flag"))
            .stdout(predicate::str::contains("\x1b").not());
    }

    #[test]
    fn lists_unresolved_includes() {
        modpath()
            .arg(sample_db())
            .args(["--color", "never"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Warnings (showing 1 of 1):"))
            .stdout(predicate::str::contains(
                "- src/legacy.cpp: unresolved include \"generated/version.h\"",
            ));
    }

    #[test]
    fn forced_color_uses_ansi() {
        modpath()
            .arg(sample_db())
            .args(["--color", "always"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\x1b["));
    }
}

// ============================================
// JSON Report
// ============================================

mod json_output {
    use super::*;

    #[test]
    fn summary_counts() {
        let report = json_report(&[]);
        let summary = &report["summary"];

        assert_eq!(summary["translation_units"], 3);
        assert_eq!(summary["scanned_headers"], 4);
        assert_eq!(summary["cycle_header_count"], 2);
        assert_eq!(summary["unresolved_include_count"], 1);
        assert_eq!(summary["warning_count"], 1);
    }

    #[test]
    fn macro_heavy_header_is_high_risk() {
        let report = json_report(&[]);
        let candidates = report["candidates"].as_array().expect("candidates");
        let config = candidates
            .iter()
            .find(|c| c["header"] == "include/common/config.h")
            .expect("config.h candidate");

        assert_eq!(config["macro_defines"], 10);
        assert_eq!(config["risk_level"], "high");
        assert!(config["risk_score"].as_u64().expect("score") >= 65);
        assert_eq!(
            config["recommendation"],
            "named module prototype only after moving macros to a separate config header"
        );
    }

    #[test]
    fn cycle_headers_are_flagged() {
        let report = json_report(&[]);
        let candidates = report["candidates"].as_array().expect("candidates");
        for name in ["include/core/cycle_a.hpp", "include/core/cycle_b.hpp"] {
            let c = candidates
                .iter()
                .find(|c| c["header"] == name)
                .expect("cycle candidate");
            assert_eq!(c["in_cycle"], true);
            assert_eq!(
                c["recommendation"],
                "refactor include cycle before module migration"
            );
        }
        assert_eq!(
            report["cycles"][0],
            serde_json::json!(["include/core/cycle_a.hpp", "include/core/cycle_b.hpp"])
        );
    }

    #[test]
    fn phases_and_readiness() {
        let report = json_report(&[]);
        let phases = &report["phases"];

        assert_eq!(phases["p1_header_units"]["headers"][0], "include/core/math.hpp");
        assert!(
            phases["p1_header_units"]["actions"][1]
                .as_str()
                .expect("system action")
                .ends_with("<vector> (3x)")
        );
        assert_eq!(phases["p3_import_std_readiness"]["status"], "warn");
        assert_eq!(
            phases["p3_import_std_readiness"]["warnings"][0]["unit"],
            "src/legacy.cpp"
        );
        assert_eq!(
            phases["p3_import_std_readiness"]["warnings"][0]["status"],
            "missing"
        );

        let statuses: Vec<&str> = report["readiness_checks"]
            .as_array()
            .expect("checks")
            .iter()
            .map(|c| c["status"].as_str().expect("status"))
            .collect();
        assert_eq!(statuses, vec!["warn", "warn", "warn", "warn"]);
    }

    #[test]
    fn top_limits_candidates() {
        let report = json_report(&["--top", "2"]);
        let headers: Vec<&str> = report["candidates"]
            .as_array()
            .expect("candidates")
            .iter()
            .map(|c| c["header"].as_str().expect("header"))
            .collect();
        assert_eq!(
            headers,
            vec!["include/core/math.hpp", "include/core/cycle_a.hpp"]
        );
    }

    #[test]
    fn logs_stay_off_stdout() {
        let output = modpath()
            .arg(sample_db())
            .args(["--json", "--log-level", "debug"])
            .output()
            .expect("run modpath");
        assert!(output.status.success());
        let parsed: Result<Value, _> = serde_json::from_slice(&output.stdout);
        assert!(parsed.is_ok());
    }
}

// ============================================
// Configuration
// ============================================

mod configuration {
    use super::*;

    #[test]
    fn explicit_config_file() {
        let temp = TempDir::new().expect("temp dir");
        let config = temp.path().join("modpath.toml");
        std::fs::write(&config, "top = 1\n\n[plan]\np2_limit = 0\n").expect("write config");

        let report = json_report(&["--config", config.to_str().expect("utf-8 path")]);
        assert_eq!(report["candidates"].as_array().map(Vec::len), Some(1));
        assert_eq!(
            report["phases"]["p2_named_modules"]["actions"][0],
            "No safe named-module candidates yet; reduce macro usage and break cycles first"
        );
    }

    #[test]
    fn config_next_to_database() {
        let temp = TempDir::new().expect("temp dir");
        let project = fixtures_path().join("sample_project");
        let db = serde_json::json!([
            {
                "directory": project.to_str().expect("utf-8 path"),
                "file": "src/math.cpp",
                "arguments": ["c++", "-std=c++20", "-Iinclude", "-c", "src/math.cpp"]
            }
        ]);
        let db_path = temp.path().join("compile_commands.json");
        std::fs::write(&db_path, db.to_string()).expect("write db");
        std::fs::create_dir_all(temp.path().join(".modpath")).expect("config dir");
        std::fs::write(
            temp.path().join(".modpath/config.toml"),
            "[risk]\nbase = 20\n",
        )
        .expect("write config");

        let output = modpath()
            .arg(&db_path)
            .arg("--json")
            .output()
            .expect("run modpath");
        assert!(output.status.success());
        let report: Value = serde_json::from_slice(&output.stdout).expect("json");
        // base 20, reuse penalty 8 for a single includer
        assert_eq!(report["candidates"][0]["risk_score"], 28);
    }
}

// ============================================
// Fatal Errors
// ============================================

mod fatal_errors {
    use super::*;

    #[test]
    fn missing_database_exits_2() {
        modpath()
            .arg(fixtures_path().join("nope/compile_commands.json"))
            .assert()
            .code(2)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("failed to read"));
    }

    #[test]
    fn non_array_database_exits_2() {
        modpath()
            .arg(fixtures_path().join("malformed/compile_commands.json"))
            .arg("--json")
            .assert()
            .code(2)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("malformed compilation database"));
    }

    #[test]
    fn empty_database_exits_2() {
        modpath()
            .arg(fixtures_path().join("empty/compile_commands.json"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no translation units"));
    }

    #[test]
    fn invalid_json_exits_2() {
        let temp = TempDir::new().expect("temp dir");
        let db = temp.path().join("compile_commands.json");
        std::fs::write(&db, "[{").expect("write db");

        modpath()
            .arg(&db)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("not valid JSON"));
    }
}
