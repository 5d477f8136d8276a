//! # modpath
//!
//! **C++20 modules migration planner** - reads a `compile_commands.json` and
//! suggests which headers to turn into header units or named modules first.
//!
//! The analysis is a static, textual approximation: no preprocessing, no
//! macro expansion, no conditional compilation. It is meant to rank work, not
//! to prove anything about the build.
//!
//! ## Features
//!
//! - **Include graph** - project headers reached from every translation unit
//! - **Cycle detection** - headers that can reach themselves
//! - **Risk scoring** - bounded 0-100 score with a rationale per header
//! - **Phased plan** - P1 header units, P2 named modules, P3 `import std` readiness
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use modpath::analyzer::analyze_compile_commands;
//! use modpath::config::ModpathConfig;
//! use std::path::Path;
//!
//! let report = analyze_compile_commands(
//!     Path::new("build/compile_commands.json"),
//!     &ModpathConfig::default(),
//! )
//! .unwrap();
//! for candidate in &report.candidates {
//!     println!("{} -> {}", candidate.header, candidate.recommendation.text());
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! modpath                               # ./compile_commands.json, text report
//! modpath build/compile_commands.json --json --top 20
//! modpath --log-level debug             # traversal progress on stderr
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// Analysis pipeline.
///
/// # Submodules
///
/// - [`analyzer::compdb`] - compilation database loading
/// - [`analyzer::scan`] - include and `#define` extraction
/// - [`analyzer::resolvers`] - path normalization and include lookup
/// - [`analyzer::graph`] - include graph and include frequency
/// - [`analyzer::cycles`] - include cycle detection
/// - [`analyzer::risk`] - per-header risk scoring
/// - [`analyzer::runner`] - end-to-end run producing a [`PlannerReport`](analyzer::PlannerReport)
/// - [`analyzer::output`] - text and JSON renderers
pub mod analyzer;

/// P1/P2/P3 plan construction from scored headers.
pub mod migration_plan;

/// Source access behind the [`SourceProvider`](fs_utils::SourceProvider) trait.
pub mod fs_utils;

// ============================================================================
// Support Modules
// ============================================================================

/// Command-line interface.
pub mod cli;

/// Terminal colors for the text report.
pub mod colors;

/// Optional `.modpath/config.toml`.
///
/// # Example
///
/// ```rust,no_run
/// use modpath::config::ModpathConfig;
/// use std::path::Path;
///
/// let config = ModpathConfig::load(Path::new("build"));
/// println!("reporting top {}", config.top);
/// ```
pub mod config;

/// Fatal errors and collected diagnostics.
pub mod error;

/// Shared constants and mode enums.
pub mod types;

pub use analyzer::{PlannerReport, analyze_compile_commands};
pub use error::{PlannerError, PlannerResult};
