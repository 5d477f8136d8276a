//! Command-line interface for the `modpath` binary.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use crate::analyzer::analyze_compile_commands;
use crate::analyzer::output::{format_report, to_json};
use crate::colors::Painter;
use crate::config::ModpathConfig;
use crate::types::{ColorMode, OutputMode};

/// Exit code for any fatal analysis error.
pub const EXIT_FATAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "modpath")]
#[command(about = "Analyze compile_commands.json and emit a practical C++20 modules migration plan")]
#[command(version)]
pub struct Args {
    /// Path to compile_commands.json
    #[arg(default_value = "./compile_commands.json")]
    pub compile_commands: PathBuf,

    /// Output machine-readable JSON for CI
    #[arg(long)]
    pub json: bool,

    /// Maximum number of candidates to report
    #[arg(long)]
    pub top: Option<usize>,

    /// Config file (default: .modpath/config.toml next to the database)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Colorize the text report
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }

    /// Config from `--config`, else from the database directory. `--top` wins over both.
    pub fn resolve_config(&self) -> ModpathConfig {
        let mut config = match &self.config {
            Some(path) => ModpathConfig::load_from_path(path),
            None => {
                let dir = self
                    .compile_commands
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                ModpathConfig::load(dir)
            }
        };
        if let Some(top) = self.top {
            config.top = top;
        }
        config
    }
}

fn init_tracing(level: &str) {
    // Logs go to stderr so JSON on stdout stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.parse().unwrap_or_default()),
        )
        .try_init();
}

fn execute(args: &Args) -> anyhow::Result<String> {
    let config = args.resolve_config();
    let report = analyze_compile_commands(&args.compile_commands, &config)
        .with_context(|| format!("cannot plan from {}", args.compile_commands.display()))?;

    match args.output_mode() {
        OutputMode::Json => to_json(&report).context("failed to serialize report"),
        OutputMode::Human => Ok(format_report(&report, &Painter::new(args.color))),
    }
}

/// Parse arguments from the process and run.
pub fn run() -> ExitCode {
    run_with(Args::parse())
}

pub fn run_with(args: Args) -> ExitCode {
    init_tracing(&args.log_level);

    match execute(&args) {
        Ok(rendered) => {
            if rendered.ends_with('\n') {
                print!("{}", rendered);
            } else {
                println!("{}", rendered);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
