//! Include cycle detection.
//!
//! Three-color depth-first traversal over header keys in lexicographic
//! order. A back edge to a header on the active path records that path slice
//! as a cycle. Lowlinks are carried along the same traversal (Tarjan-style)
//! so headers that close a loop through an already-finished header are still
//! reported as members.
//!
//! The traversal is iterative and never touches the graph it reads.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::graph::IncludeGraph;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Every header that can reach itself
    pub members: BTreeSet<String>,
    /// Active-path slices closed by a back edge, in discovery order
    pub cycles: Vec<Vec<String>>,
}

impl CycleReport {
    pub fn contains(&self, key: &str) -> bool {
        self.members.contains(key)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

struct Frame<'g> {
    node: &'g str,
    next: usize,
}

#[derive(Default)]
struct Traversal<'g> {
    color: BTreeMap<&'g str, Color>,
    index: BTreeMap<&'g str, usize>,
    lowlink: BTreeMap<&'g str, usize>,
    counter: usize,
    component: Vec<&'g str>,
    on_component: BTreeSet<&'g str>,
    path: Vec<&'g str>,
    path_pos: BTreeMap<&'g str, usize>,
    frames: Vec<Frame<'g>>,
}

impl<'g> Traversal<'g> {
    fn color_of(&self, node: &str) -> Color {
        self.color.get(node).copied().unwrap_or(Color::White)
    }

    fn enter(&mut self, node: &'g str) {
        self.color.insert(node, Color::Gray);
        self.index.insert(node, self.counter);
        self.lowlink.insert(node, self.counter);
        self.counter += 1;
        self.component.push(node);
        self.on_component.insert(node);
        self.path_pos.insert(node, self.path.len());
        self.path.push(node);
        self.frames.push(Frame { node, next: 0 });
    }

    fn lower(&mut self, node: &'g str, value: usize) {
        if let Some(low) = self.lowlink.get_mut(node) {
            *low = (*low).min(value);
        }
    }
}

/// Detect cycles among the project headers of a finished graph.
pub fn detect_cycles(graph: &IncludeGraph) -> CycleReport {
    let adjacency: BTreeMap<String, Vec<String>> = graph
        .nodes()
        .map(|node| (node.key.clone(), node.includes.clone()))
        .collect();
    find_cycles(&adjacency)
}

/// Detect cycles in an adjacency map. Neighbours missing from the map's keys are ignored.
pub fn find_cycles(adjacency: &BTreeMap<String, Vec<String>>) -> CycleReport {
    let neighbours: BTreeMap<&str, Vec<&str>> = adjacency
        .iter()
        .map(|(node, targets)| {
            let mut sorted: Vec<&str> = targets
                .iter()
                .map(String::as_str)
                .filter(|t| adjacency.contains_key(*t))
                .collect();
            sorted.sort_unstable();
            sorted.dedup();
            (node.as_str(), sorted)
        })
        .collect();

    let mut report = CycleReport::default();
    let mut t = Traversal::default();

    for start in neighbours.keys().copied() {
        if t.color_of(start) != Color::White {
            continue;
        }
        t.enter(start);

        while let Some(frame) = t.frames.last_mut() {
            let node = frame.node;
            let next = neighbours
                .get(node)
                .and_then(|list| list.get(frame.next))
                .copied();

            if let Some(child) = next {
                frame.next += 1;
                match t.color_of(child) {
                    Color::White => t.enter(child),
                    Color::Gray => {
                        let child_index = t.index.get(child).copied().unwrap_or(0);
                        t.lower(node, child_index);
                        let start_pos = t.path_pos.get(child).copied().unwrap_or(0);
                        report
                            .cycles
                            .push(t.path[start_pos..].iter().map(|s| s.to_string()).collect());
                    }
                    Color::Black => {
                        if t.on_component.contains(child) {
                            let child_index = t.index.get(child).copied().unwrap_or(0);
                            t.lower(node, child_index);
                        }
                    }
                }
                continue;
            }

            // All neighbours done: retire the node.
            t.frames.pop();
            t.color.insert(node, Color::Black);
            t.path.pop();
            t.path_pos.remove(node);

            let node_low = t.lowlink.get(node).copied().unwrap_or(0);
            if let Some(parent) = t.frames.last().map(|f| f.node) {
                t.lower(parent, node_low);
            }

            if Some(&node_low) == t.index.get(node) {
                let mut scc: Vec<&str> = Vec::new();
                while let Some(member) = t.component.pop() {
                    t.on_component.remove(member);
                    scc.push(member);
                    if member == node {
                        break;
                    }
                }
                let self_loop = neighbours
                    .get(node)
                    .is_some_and(|list| list.contains(&node));
                if scc.len() > 1 || self_loop {
                    report.members.extend(scc.into_iter().map(str::to_string));
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacency(edges: &[(&str, &str)]) -> BTreeMap<String, Vec<String>> {
        let mut adj: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (from, to) in edges {
            adj.entry(from.to_string())
                .or_default()
                .push(to.to_string());
            adj.entry(to.to_string()).or_default();
        }
        adj
    }

    fn members(report: &CycleReport) -> Vec<&str> {
        report.members.iter().map(String::as_str).collect()
    }

    #[test]
    fn detects_simple_cycle() {
        let report = find_cycles(&adjacency(&[("a.h", "b.h"), ("b.h", "a.h")]));
        assert_eq!(members(&report), vec!["a.h", "b.h"]);
        assert_eq!(report.cycles, vec![vec!["a.h", "b.h"]]);
    }

    #[test]
    fn detects_self_loop() {
        let report = find_cycles(&adjacency(&[("a.h", "a.h")]));
        assert_eq!(members(&report), vec!["a.h"]);
        assert_eq!(report.cycles, vec![vec!["a.h"]]);
    }

    #[test]
    fn no_cycle() {
        let report = find_cycles(&adjacency(&[("a.h", "b.h"), ("b.h", "c.h")]));
        assert!(report.is_empty());
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn complex_cycle() {
        let report = find_cycles(&adjacency(&[
            ("a.h", "b.h"),
            ("b.h", "c.h"),
            ("c.h", "a.h"),
            ("d.h", "e.h"),
        ]));
        assert_eq!(members(&report), vec!["a.h", "b.h", "c.h"]);
    }

    #[test]
    fn multiple_cycles() {
        let report = find_cycles(&adjacency(&[
            ("a.h", "b.h"),
            ("b.h", "a.h"),
            ("c.h", "d.h"),
            ("d.h", "c.h"),
        ]));
        assert_eq!(report.member_count(), 4);
        assert_eq!(report.cycles.len(), 2);
    }

    #[test]
    fn member_closing_loop_through_finished_header() {
        // a -> b -> c -> a, plus a -> d -> b. d sees b only after b is finished.
        let report = find_cycles(&adjacency(&[
            ("a.h", "b.h"),
            ("a.h", "d.h"),
            ("b.h", "c.h"),
            ("c.h", "a.h"),
            ("d.h", "b.h"),
        ]));
        assert_eq!(members(&report), vec!["a.h", "b.h", "c.h", "d.h"]);
    }

    #[test]
    fn tail_into_cycle_is_not_a_member() {
        let report = find_cycles(&adjacency(&[
            ("entry.h", "a.h"),
            ("a.h", "b.h"),
            ("b.h", "a.h"),
        ]));
        assert_eq!(members(&report), vec!["a.h", "b.h"]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let adj = adjacency(&[
            ("z.h", "y.h"),
            ("y.h", "x.h"),
            ("x.h", "z.h"),
            ("x.h", "w.h"),
            ("w.h", "w.h"),
        ]);
        let first = find_cycles(&adj);
        let second = find_cycles(&adj);
        assert_eq!(first, second);
        assert_eq!(first.cycles, vec![vec!["w.h"], vec!["x.h", "z.h", "y.h"]]);
    }

    #[test]
    fn dangling_targets_are_ignored() {
        let mut adj = BTreeMap::new();
        adj.insert("a.h".to_string(), vec!["ghost.h".to_string()]);
        assert!(find_cycles(&adj).is_empty());
    }

    #[test]
    fn empty_graph() {
        assert!(find_cycles(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let names: Vec<String> = (0..20_000).map(|i| format!("h{:05}.h", i)).collect();
        let mut adj: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for pair in names.windows(2) {
            adj.insert(pair[0].clone(), vec![pair[1].clone()]);
        }
        adj.insert(names[names.len() - 1].clone(), vec![names[0].clone()]);

        let report = find_cycles(&adj);
        assert_eq!(report.member_count(), names.len());
    }
}
