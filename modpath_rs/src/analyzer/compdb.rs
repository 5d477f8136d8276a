//! Compilation database loading.
//!
//! Turns `compile_commands.json` entries into [`CommandRecord`]s: absolute
//! source path, working directory, the command line as given, include roots
//! and the detected language standard.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::{Diagnostic, Diagnostics, PlannerError, PlannerResult};

use super::resolvers::normalize_path;

/// Classification of a translation unit's `-std=` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StdStatus {
    /// C++20 or later
    Ok,
    /// Present but older than C++20 (or not a C++ standard)
    Below,
    /// No standard flag at all
    Missing,
}

impl StdStatus {
    pub fn is_gap(&self) -> bool {
        !matches!(self, StdStatus::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StdFlag {
    /// Lower-cased flag value, e.g. `c++17`
    pub value: Option<String>,
    pub status: StdStatus,
}

/// The compile command as recorded in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    Arguments(Vec<String>),
    Shell(String),
}

impl CommandLine {
    pub fn tokens(&self) -> Vec<String> {
        match self {
            CommandLine::Arguments(args) => args.clone(),
            CommandLine::Shell(command) => split_command(command),
        }
    }

    /// Compiler name without directory or `.exe`, looking past `ccache`-style launchers.
    pub fn compiler(&self) -> Option<String> {
        compiler_name(&self.tokens())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeRoot {
    pub path: PathBuf,
    /// Came from `-isystem`; usable for lookup but not for root inference
    pub system: bool,
}

#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub file: PathBuf,
    pub directory: PathBuf,
    pub command: CommandLine,
    pub std: StdFlag,
    pub include_roots: Vec<IncludeRoot>,
}

impl CommandRecord {
    /// Derive include roots and the standard flag from the command line.
    pub fn new(file: PathBuf, directory: PathBuf, command: CommandLine) -> Self {
        let mut record = Self {
            file,
            directory,
            command,
            std: StdFlag {
                value: None,
                status: StdStatus::Missing,
            },
            include_roots: Vec::new(),
        };
        let tokens = record.command.tokens();
        record.include_roots = extract_include_roots(&tokens, &record.directory);
        record.std = detect_std_flag(&tokens);
        record
    }
}

/// Read and parse the database file.
pub fn read_database(path: &Path) -> PlannerResult<Value> {
    let raw = fs::read_to_string(path).map_err(|source| PlannerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| PlannerError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert the parsed database into records.
///
/// `base_dir` is the directory containing the database; relative `directory`
/// fields are resolved against it. Entries without a command are skipped and
/// reported, anything structurally wrong is fatal.
pub fn parse_database(
    value: &Value,
    base_dir: &Path,
    diags: &mut Diagnostics,
) -> PlannerResult<Vec<CommandRecord>> {
    let entries = value.as_array().ok_or_else(|| {
        PlannerError::MalformedDatabase("top-level value must be an array of objects".into())
    })?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let obj = entry.as_object().ok_or_else(|| {
            PlannerError::MalformedDatabase(format!("entry #{} is not an object", index))
        })?;

        let file_raw = obj
            .get("file")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                PlannerError::MalformedDatabase(format!("entry #{} has no \"file\" field", index))
            })?;

        let directory = match obj.get("directory").and_then(Value::as_str) {
            Some(dir) if !dir.trim().is_empty() => absolutize(Path::new(dir), base_dir),
            _ => normalize_path(base_dir),
        };
        let file = absolutize(Path::new(file_raw), &directory);

        let command = match command_line(obj) {
            Some(command) => command,
            None => {
                diags.push(Diagnostic::SkippedRecord {
                    index,
                    file: file_raw.to_string(),
                });
                continue;
            }
        };

        records.push(CommandRecord::new(file, directory, command));
    }

    Ok(records)
}

fn command_line(obj: &serde_json::Map<String, Value>) -> Option<CommandLine> {
    if let Some(args) = obj.get("arguments").and_then(Value::as_array) {
        let tokens = args
            .iter()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect();
        return Some(CommandLine::Arguments(tokens));
    }
    obj.get("command")
        .and_then(Value::as_str)
        .map(|cmd| CommandLine::Shell(cmd.to_string()))
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Split a shell command string into arguments.
///
/// Handles single quotes, double quotes and backslash escapes. An unbalanced
/// quote makes the whole string fall back to whitespace splitting.
pub fn split_command(command: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = command.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                in_token = true;
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '\'' {
                        closed = true;
                        break;
                    }
                    current.push(c);
                }
                if !closed {
                    return command.split_whitespace().map(str::to_string).collect();
                }
            }
            '"' => {
                in_token = true;
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some(next @ ('"' | '\\' | '$' | '`')) => current.push(next),
                            Some(next) => {
                                current.push('\\');
                                current.push(next);
                            }
                            None => break,
                        },
                        _ => current.push(c),
                    }
                }
                if !closed {
                    return command.split_whitespace().map(str::to_string).collect();
                }
            }
            '\\' => {
                in_token = true;
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        args.push(current);
    }
    args
}

const LAUNCHERS: &[&str] = &["ccache", "sccache", "distcc"];
const MSVC_DRIVERS: &[&str] = &["cl", "clang-cl"];

fn compiler_name(args: &[String]) -> Option<String> {
    args.iter()
        .map(|arg| {
            let base = arg.rsplit(['/', '\\']).next().unwrap_or(arg);
            let base = base.to_ascii_lowercase();
            match base.strip_suffix(".exe") {
                Some(stem) => stem.to_string(),
                None => base,
            }
        })
        .find(|name| !LAUNCHERS.contains(&name.as_str()))
}

/// `cl` and `clang-cl` accept `/I`; elsewhere a leading `/` is an absolute path.
pub fn is_msvc_driver(args: &[String]) -> bool {
    compiler_name(args).is_some_and(|name| MSVC_DRIVERS.contains(&name.as_str()))
}

/// Collect `-I`, `-iquote` and `-isystem` directories (plus `/I` for MSVC drivers), in order, deduplicated.
pub fn extract_include_roots(args: &[String], directory: &Path) -> Vec<IncludeRoot> {
    const FLAGS: &[(&str, bool)] = &[
        ("-isystem", true),
        ("-iquote", false),
        ("-I", false),
        ("/I", false),
    ];

    let msvc = is_msvc_driver(args);
    let mut roots: Vec<IncludeRoot> = Vec::new();
    let mut idx = 0;
    while idx < args.len() {
        let token = args[idx].as_str();
        let mut found: Option<(&str, bool)> = None;

        for (flag, system) in FLAGS {
            if *flag == "/I" && !msvc {
                continue;
            }
            if token == *flag {
                if let Some(next) = args.get(idx + 1) {
                    found = Some((next.as_str(), *system));
                    idx += 1;
                }
                break;
            }
            if let Some(rest) = token.strip_prefix(flag)
                && !rest.is_empty()
            {
                found = Some((rest, *system));
                break;
            }
        }

        if let Some((value, system)) = found {
            let path = absolutize(Path::new(value), directory);
            if !roots.iter().any(|r| r.path == path) {
                roots.push(IncludeRoot { path, system });
            }
        }
        idx += 1;
    }
    roots
}

/// Find the language standard flag. The last `-std=` / `/std:` wins, as with the compilers.
pub fn detect_std_flag(args: &[String]) -> StdFlag {
    let value = args
        .iter()
        .filter_map(|token| {
            token
                .strip_prefix("-std=")
                .or_else(|| token.strip_prefix("/std:"))
                .or_else(|| token.strip_prefix("--std="))
        })
        .next_back()
        .map(|v| v.trim().to_ascii_lowercase());

    let status = match &value {
        Some(v) => classify_std(v),
        None => StdStatus::Missing,
    };
    StdFlag { value, status }
}

/// Classify a standard value such as `c++17`, `gnu++2a` or `c++latest`.
pub fn classify_std(value: &str) -> StdStatus {
    let value = value.trim().to_ascii_lowercase();
    if value == "c++latest" {
        return StdStatus::Ok;
    }
    let Some(pos) = value.find("++") else {
        return StdStatus::Below;
    };
    let version = &value[pos + 2..];
    if matches!(version, "2a" | "2b" | "2c") {
        return StdStatus::Ok;
    }

    let digits: String = version.chars().take_while(|c| c.is_ascii_digit()).collect();
    let Ok(short) = digits.parse::<u32>() else {
        return StdStatus::Below;
    };
    // Two-digit years: 98 is 1998, 03 is 2003. `c++0x`/`c++1z` parse as 0/1.
    let year = if short >= 90 { 1900 + short } else { 2000 + short };
    if year >= 2020 {
        StdStatus::Ok
    } else {
        StdStatus::Below
    }
}
