//! Project include graph.
//!
//! Built breadth-first from the direct includes of every translation unit.
//! Each project header is scanned once; its resolved quoted includes become
//! edges. Once the traversal reaches a fixed point, include frequency is
//! derived by reverse reachability over the finished edge set, so it does not
//! depend on the order headers were discovered in.
//!
//! Nodes live in a map keyed by project-relative path and edges are pairs of
//! keys. Cycles are plain data here; nothing holds references into the graph.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Diagnostic, Diagnostics};
use crate::fs_utils::SourceProvider;

use super::compdb::{CommandRecord, StdFlag};
use super::resolvers::{display_path, project_key, resolve_include};
use super::scan::{IncludeKind, ScanRules, Scanner};

/// One compiled source file.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationUnit {
    #[serde(skip)]
    pub path: PathBuf,
    /// Project-relative when inside the project
    pub display: String,
    pub std: StdFlag,
    #[serde(skip)]
    pub include_roots: Vec<PathBuf>,
    /// Direct project header keys, textual order, no duplicates
    pub includes: Vec<String>,
    /// Direct `<...>` tokens
    pub system_includes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderNode {
    pub key: String,
    #[serde(skip)]
    pub path: PathBuf,
    /// Outgoing edges in textual order, no duplicates
    pub includes: Vec<String>,
    pub macro_defines: usize,
    /// Distinct TUs and other headers that reach this header
    pub include_frequency: usize,
    pub direct_includers: usize,
    /// Indices of TUs that reach this header, ascending
    pub dependent_units: Vec<usize>,
    pub readable: bool,
    #[serde(skip)]
    scanned: bool,
}

impl HeaderNode {
    fn new(key: String, path: PathBuf) -> Self {
        Self {
            key,
            path,
            includes: Vec::new(),
            macro_defines: 0,
            include_frequency: 0,
            direct_includers: 0,
            dependent_units: Vec::new(),
            readable: true,
            scanned: false,
        }
    }

    /// `.h` headers are often shared with C code.
    pub fn is_c_style(&self) -> bool {
        Path::new(&self.key)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("h"))
    }
}

/// Finished include graph. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct IncludeGraph {
    nodes: BTreeMap<String, HeaderNode>,
    edges: BTreeSet<(String, String)>,
    system_includes: BTreeMap<String, usize>,
    scanned_headers: usize,
}

impl IncludeGraph {
    pub fn nodes(&self) -> impl Iterator<Item = &HeaderNode> {
        self.nodes.values()
    }

    pub fn node(&self, key: &str) -> Option<&HeaderNode> {
        self.nodes.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn edges(&self) -> &BTreeSet<(String, String)> {
        &self.edges
    }

    /// `<...>` token -> number of directives naming it (TUs and headers).
    pub fn system_includes(&self) -> &BTreeMap<String, usize> {
        &self.system_includes
    }

    pub fn scanned_headers(&self) -> usize {
        self.scanned_headers
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Output of a graph build: the TUs with their include sets, the graph, and soft failures.
#[derive(Debug)]
pub struct GraphBuild {
    pub units: Vec<TranslationUnit>,
    pub graph: IncludeGraph,
    pub diagnostics: Diagnostics,
}

pub struct GraphBuilder<'a> {
    source: &'a dyn SourceProvider,
    rules: &'a ScanRules,
    scanner: Scanner,
    root: PathBuf,
    header_roots: Vec<PathBuf>,
    nodes: BTreeMap<String, HeaderNode>,
    edges: BTreeSet<(String, String)>,
    system_includes: BTreeMap<String, usize>,
    queue: VecDeque<String>,
    diagnostics: Diagnostics,
}

impl<'a> GraphBuilder<'a> {
    /// `header_roots` are used when resolving includes found inside headers.
    pub fn new(
        source: &'a dyn SourceProvider,
        rules: &'a ScanRules,
        root: &Path,
        header_roots: Vec<PathBuf>,
    ) -> Self {
        Self {
            source,
            rules,
            scanner: rules.scanner(),
            root: root.to_path_buf(),
            header_roots,
            nodes: BTreeMap::new(),
            edges: BTreeSet::new(),
            system_includes: BTreeMap::new(),
            queue: VecDeque::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Scan a TU source and seed the traversal with its project includes.
    pub fn add_unit(&mut self, record: &CommandRecord) -> TranslationUnit {
        let include_roots: Vec<PathBuf> =
            record.include_roots.iter().map(|r| r.path.clone()).collect();
        let display = display_path(&record.file, &self.root);
        let mut unit = TranslationUnit {
            path: record.file.clone(),
            display,
            std: record.std.clone(),
            include_roots,
            includes: Vec::new(),
            system_includes: Vec::new(),
        };

        let text = match self.source.read_source(&record.file) {
            Ok(text) => text,
            Err(err) => {
                self.diagnostics.push(Diagnostic::UnreadableFile {
                    path: unit.display.clone(),
                    reason: err.to_string(),
                });
                return unit;
            }
        };

        tracing::debug!(
            "scanning {} ({} in {})",
            unit.display,
            record.command.compiler().as_deref().unwrap_or("unknown compiler"),
            record.directory.display()
        );
        let scanned = self.scanner.scan(&text);
        for directive in scanned.includes {
            match directive.kind {
                IncludeKind::Angle => {
                    let token = directive.token();
                    *self.system_includes.entry(token.clone()).or_default() += 1;
                    if !unit.system_includes.contains(&token) {
                        unit.system_includes.push(token);
                    }
                }
                IncludeKind::Quoted => {
                    if let Some(key) = self.resolve_quoted(
                        &directive.target,
                        &record.file,
                        &unit.include_roots,
                        &unit.display,
                    ) && !unit.includes.contains(&key)
                    {
                        unit.includes.push(key);
                    }
                }
            }
        }
        unit
    }

    /// Scan one discovered header. Already-scanned headers are left untouched.
    pub fn scan_header(&mut self, key: &str) {
        let path = match self.nodes.get(key) {
            Some(node) if !node.scanned => node.path.clone(),
            _ => return,
        };
        if let Some(node) = self.nodes.get_mut(key) {
            node.scanned = true;
        }

        let text = match self.source.read_source(&path) {
            Ok(text) => text,
            Err(err) => {
                if let Some(node) = self.nodes.get_mut(key) {
                    node.readable = false;
                }
                self.diagnostics.push(Diagnostic::UnreadableFile {
                    path: key.to_string(),
                    reason: err.to_string(),
                });
                return;
            }
        };

        let scanned = self.scanner.scan(&text);
        let roots = self.header_roots.clone();
        let mut includes: Vec<String> = Vec::new();
        for directive in scanned.includes {
            match directive.kind {
                IncludeKind::Angle => {
                    *self.system_includes.entry(directive.token()).or_default() += 1;
                }
                IncludeKind::Quoted => {
                    if let Some(target) = self.resolve_quoted(&directive.target, &path, &roots, key)
                        && !includes.contains(&target)
                    {
                        self.edges.insert((key.to_string(), target.clone()));
                        includes.push(target);
                    }
                }
            }
        }

        tracing::debug!(
            "scanned {}: {} includes, {} defines",
            key,
            includes.len(),
            scanned.macro_defines
        );
        if let Some(node) = self.nodes.get_mut(key) {
            node.includes = includes;
            node.macro_defines = scanned.macro_defines;
        }
    }

    /// Drain the discovery queue until no new headers appear.
    pub fn run(&mut self) {
        while let Some(key) = self.queue.pop_front() {
            self.scan_header(&key);
        }
    }

    pub fn node(&self, key: &str) -> Option<&HeaderNode> {
        self.nodes.get(key)
    }

    /// Resolve a quoted include to a project header key, creating its node on first sight.
    fn resolve_quoted(
        &mut self,
        target: &str,
        including_file: &Path,
        roots: &[PathBuf],
        from_display: &str,
    ) -> Option<String> {
        let Some(resolved) = resolve_include(target, including_file, roots, self.source) else {
            self.diagnostics.push(Diagnostic::UnresolvedInclude {
                from: from_display.to_string(),
                include: format!("\"{}\"", target),
            });
            return None;
        };

        if !self.rules.is_header(&resolved) {
            tracing::debug!("{}: {} is not a header, ignored", from_display, target);
            return None;
        }
        let key = project_key(&resolved, &self.root)?;

        if !self.nodes.contains_key(&key) {
            self.nodes
                .insert(key.clone(), HeaderNode::new(key.clone(), resolved));
            self.queue.push_back(key.clone());
        }
        Some(key)
    }

    /// Close the graph and compute include frequencies.
    pub fn finish(mut self, units: Vec<TranslationUnit>) -> GraphBuild {
        self.run();

        let frequencies = reverse_reachability(&self.nodes, &self.edges, &units);
        for (key, reach) in frequencies {
            if let Some(node) = self.nodes.get_mut(&key) {
                node.include_frequency = reach.frequency;
                node.direct_includers = reach.direct;
                node.dependent_units = reach.units;
            }
        }

        let scanned_headers = self
            .nodes
            .values()
            .filter(|n| n.scanned && n.readable)
            .count();
        GraphBuild {
            units,
            graph: IncludeGraph {
                nodes: self.nodes,
                edges: self.edges,
                system_includes: self.system_includes,
                scanned_headers,
            },
            diagnostics: self.diagnostics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Dependent<'a> {
    Unit(usize),
    Header(&'a str),
}

#[derive(Debug, Default)]
struct Reach {
    frequency: usize,
    direct: usize,
    units: Vec<usize>,
}

/// For every header, count distinct TUs and other headers that reach it.
fn reverse_reachability(
    nodes: &BTreeMap<String, HeaderNode>,
    edges: &BTreeSet<(String, String)>,
    units: &[TranslationUnit],
) -> BTreeMap<String, Reach> {
    let mut reverse: BTreeMap<&str, Vec<Dependent<'_>>> = BTreeMap::new();
    for (idx, unit) in units.iter().enumerate() {
        for key in &unit.includes {
            reverse
                .entry(key.as_str())
                .or_default()
                .push(Dependent::Unit(idx));
        }
    }
    for (from, to) in edges {
        reverse
            .entry(to.as_str())
            .or_default()
            .push(Dependent::Header(from.as_str()));
    }

    let mut out = BTreeMap::new();
    for key in nodes.keys() {
        let mut seen_headers: BTreeSet<&str> = BTreeSet::new();
        let mut seen_units: BTreeSet<usize> = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        seen_headers.insert(key.as_str());
        queue.push_back(key.as_str());

        while let Some(current) = queue.pop_front() {
            let Some(dependents) = reverse.get(current) else {
                continue;
            };
            for dep in dependents {
                match *dep {
                    Dependent::Unit(idx) => {
                        seen_units.insert(idx);
                    }
                    Dependent::Header(from) => {
                        if seen_headers.insert(from) {
                            queue.push_back(from);
                        }
                    }
                }
            }
        }

        let direct = reverse.get(key.as_str()).map_or(0, |d| {
            d.iter()
                .filter(|dep| **dep != Dependent::Header(key.as_str()))
                .count()
        });
        out.insert(
            key.clone(),
            Reach {
                frequency: seen_units.len() + seen_headers.len() - 1,
                direct,
                units: seen_units.into_iter().collect(),
            },
        );
    }
    out
}

/// Build the include graph for a set of records.
///
/// Quoted includes in a TU resolve against that TU's include roots; includes
/// inside headers resolve against every root seen in the database.
pub fn build_include_graph(
    records: &[CommandRecord],
    root: &Path,
    rules: &ScanRules,
    source: &dyn SourceProvider,
) -> GraphBuild {
    let mut header_roots: Vec<PathBuf> = Vec::new();
    for record in records {
        for include_root in &record.include_roots {
            if !header_roots.contains(&include_root.path) {
                header_roots.push(include_root.path.clone());
            }
        }
    }

    let mut builder = GraphBuilder::new(source, rules, root, header_roots);
    let units: Vec<TranslationUnit> = records.iter().map(|r| builder.add_unit(r)).collect();
    builder.finish(units)
}
