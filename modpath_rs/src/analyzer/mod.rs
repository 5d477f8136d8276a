pub mod compdb;
pub mod cycles;
pub mod graph;
pub mod output;
pub mod regexes;
pub mod resolvers;
pub mod risk;
pub mod runner;
pub mod scan;

pub use runner::{PlannerReport, ReportSummary, analyze_compile_commands, analyze_database};
