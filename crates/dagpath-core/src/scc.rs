//! Strongly connected components via Tarjan's algorithm.
//!
//! # Algorithm
//!
//! Every vertex gets a discovery index on entry and a low-link value (the
//! smallest discovery index reachable through its DFS subtree plus at most
//! one edge back onto the stack). A vertex whose low-link equals its own
//! index is the root of a component; the stack is popped down to and
//! including it and the popped vertices are emitted together.
//!
//! Components come out in **reverse topological order** of the condensation
//! graph: a component is only emitted after every component it can reach.
//!
//! # Stack depth
//!
//! The DFS is iterative. Each [`Frame`] stores the vertex and a cursor into
//! its successor list, so a chain of a million vertices costs heap memory,
//! not call-stack frames.

#![allow(clippy::module_name_repetitions)]

use fixedbitset::FixedBitSet;
use serde::Serialize;

use crate::graph::{GraphView, Vertex};
use crate::metrics::{Metrics, NoopMetrics};

/// One strongly connected component.
///
/// Members are kept in the order Tarjan's algorithm popped them off the
/// stack (the component root is last).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Component {
    members: Vec<Vertex>,
}

impl Component {
    /// Wrap an explicit member list.
    #[must_use]
    pub const fn new(members: Vec<Vertex>) -> Self {
        Self { members }
    }

    #[must_use]
    pub fn members(&self) -> &[Vertex] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Return `true` if this component holds more than one vertex.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        self.members.len() > 1
    }

    #[must_use]
    pub fn contains(&self, v: Vertex) -> bool {
        self.members.contains(&v)
    }

    pub fn iter(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.members.iter().copied()
    }
}

impl From<Vec<Vertex>> for Component {
    fn from(members: Vec<Vertex>) -> Self {
        Self { members }
    }
}

/// Partition `graph` into strongly connected components.
#[must_use]
pub fn find_sccs(graph: &GraphView) -> Vec<Component> {
    find_sccs_with(graph, &mut NoopMetrics)
}

/// [`find_sccs`], reporting `dfs_visits` and `edge_explorations` to `metrics`.
pub fn find_sccs_with<M: Metrics + ?Sized>(graph: &GraphView, metrics: &mut M) -> Vec<Component> {
    metrics.start();

    let mut ctx = TarjanContext::new(graph);
    for v in graph.vertices() {
        if ctx.index[v].is_none() {
            ctx.strong_connect(v, metrics);
        }
    }

    metrics.stop();
    ctx.components
}

// ---------------------------------------------------------------------------
// Traversal state
// ---------------------------------------------------------------------------

/// Reified DFS call frame.
#[derive(Debug, Clone, Copy)]
struct Frame {
    vertex: Vertex,
    /// Next position in `graph.successors(vertex)` to explore.
    cursor: usize,
}

/// All state for one run; built fresh per call.
struct TarjanContext<'g> {
    graph: &'g GraphView,
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: FixedBitSet,
    stack: Vec<Vertex>,
    next_index: usize,
    components: Vec<Component>,
}

impl<'g> TarjanContext<'g> {
    fn new(graph: &'g GraphView) -> Self {
        let n = graph.vertex_count();
        Self {
            graph,
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: FixedBitSet::with_capacity(n),
            stack: Vec::new(),
            next_index: 0,
            components: Vec::new(),
        }
    }

    fn enter<M: Metrics + ?Sized>(&mut self, v: Vertex, metrics: &mut M) {
        metrics.increment("dfs_visits");
        self.index[v] = Some(self.next_index);
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack.insert(v);
    }

    fn strong_connect<M: Metrics + ?Sized>(&mut self, root: Vertex, metrics: &mut M) {
        let graph = self.graph;
        let mut frames: Vec<Frame> = Vec::new();

        self.enter(root, metrics);
        frames.push(Frame {
            vertex: root,
            cursor: 0,
        });

        while let Some(frame) = frames.last_mut() {
            let v = frame.vertex;
            let next = graph.successors(v).get(frame.cursor).map(|&(w, _)| w);
            if next.is_some() {
                frame.cursor += 1;
            }

            if let Some(w) = next {
                metrics.increment("edge_explorations");
                match self.index[w] {
                    None => {
                        self.enter(w, metrics);
                        frames.push(Frame {
                            vertex: w,
                            cursor: 0,
                        });
                    }
                    Some(w_index) if self.on_stack.contains(w) => {
                        self.lowlink[v] = self.lowlink[v].min(w_index);
                    }
                    // Already closed into an emitted component.
                    Some(_) => {}
                }
                continue;
            }

            // Every successor of `v` is done: return to the caller frame.
            frames.pop();
            if let Some(parent) = frames.last() {
                let p = parent.vertex;
                self.lowlink[p] = self.lowlink[p].min(self.lowlink[v]);
            }

            if Some(self.lowlink[v]) == self.index[v] {
                self.emit_component(v);
            }
        }
    }

    fn emit_component(&mut self, root: Vertex) {
        let mut members = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack.set(w, false);
            members.push(w);
            if w == root {
                break;
            }
        }
        self.components.push(Component::new(members));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::SimpleMetrics;

    fn graph(n: usize, edges: &[(Vertex, Vertex)]) -> GraphView {
        GraphView::from_edges(n, edges.iter().map(|&(u, v)| (u, v, 1.0))).expect("valid graph")
    }

    fn sorted(components: &[Component]) -> Vec<Vec<Vertex>> {
        let mut out: Vec<Vec<Vertex>> = components
            .iter()
            .map(|c| {
                let mut m = c.members().to_vec();
                m.sort_unstable();
                m
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn empty_graph_has_no_components() {
        assert!(find_sccs(&GraphView::empty(0)).is_empty());
    }

    #[test]
    fn chain_gives_singletons_sinks_first() {
        // 0 -> 1 -> 2
        let sccs = find_sccs(&graph(3, &[(0, 1), (1, 2)]));
        assert_eq!(sccs.len(), 3);
        assert_eq!(sccs[0].members(), &[2]);
        assert_eq!(sccs[1].members(), &[1]);
        assert_eq!(sccs[2].members(), &[0]);
    }

    #[test]
    fn single_cycle_is_one_component() {
        // 0 -> 1 -> 2 -> 0
        let sccs = find_sccs(&graph(3, &[(0, 1), (1, 2), (2, 0)]));
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].len(), 3);
        assert!(sccs[0].is_cycle());
        // Root is popped last.
        assert_eq!(sccs[0].members().last(), Some(&0));
    }

    #[test]
    fn two_two_cycles_joined_by_one_edge() {
        // 0 <-> 1, 2 <-> 3, 0 -> 2
        let sccs = find_sccs(&graph(4, &[(0, 1), (0, 2), (1, 0), (2, 3), (3, 2)]));
        assert_eq!(sorted(&sccs), vec![vec![0, 1], vec![2, 3]]);
        // {2,3} is downstream so it must be emitted first.
        assert!(sccs[0].contains(2));
    }

    #[test]
    fn isolated_vertices_are_singletons() {
        let sccs = find_sccs(&GraphView::empty(3));
        assert_eq!(sorted(&sccs), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn self_loop_stays_singleton() {
        let sccs = find_sccs(&graph(2, &[(0, 0), (0, 1)]));
        assert_eq!(sorted(&sccs), vec![vec![0], vec![1]]);
    }

    #[test]
    fn edge_into_closed_component_is_ignored() {
        // 1 -> 0 is explored after {0} closed; 2 <-> 1 cycle.
        let sccs = find_sccs(&graph(3, &[(1, 0), (1, 2), (2, 1)]));
        assert_eq!(sorted(&sccs), vec![vec![0], vec![1, 2]]);
    }

    #[test]
    fn nested_cycles_merge() {
        // 0 -> 1 -> 2 -> 1, 2 -> 3 -> 0, 3 -> 4
        let sccs = find_sccs(&graph(5, &[(0, 1), (1, 2), (2, 1), (2, 3), (3, 0), (3, 4)]));
        assert_eq!(sorted(&sccs), vec![vec![0, 1, 2, 3], vec![4]]);
    }

    #[test]
    fn long_chain_does_not_overflow_the_stack() {
        let n = 200_000;
        let edges: Vec<_> = (0..n - 1).map(|v| (v, v + 1, 1.0)).collect();
        let g = GraphView::from_edges(n, edges).expect("valid graph");
        let sccs = find_sccs(&g);
        assert_eq!(sccs.len(), n);
    }

    #[test]
    fn long_cycle_is_one_component() {
        let n = 100_000;
        let edges: Vec<_> = (0..n).map(|v| (v, (v + 1) % n, 1.0)).collect();
        let g = GraphView::from_edges(n, edges).expect("valid graph");
        let sccs = find_sccs(&g);
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].len(), n);
    }

    #[test]
    fn counters_match_graph_size() {
        let g = graph(4, &[(0, 1), (1, 0), (2, 3)]);
        let mut metrics = SimpleMetrics::new();
        let sccs = find_sccs_with(&g, &mut metrics);

        assert_eq!(sccs.len(), 3);
        assert_eq!(metrics.counter("dfs_visits"), 4);
        assert_eq!(metrics.counter("edge_explorations"), 3);
    }

    #[test]
    fn rerun_is_identical() {
        let g = graph(5, &[(0, 1), (1, 2), (2, 0), (3, 4)]);
        assert_eq!(find_sccs(&g), find_sccs(&g));
    }
}
