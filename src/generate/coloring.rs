//! Graph coloring → CNF
//!
//! Every node takes one of `k` colors and neighbouring nodes differ; both
//! rules together already forbid a node holding two colors. The search
//! climbs `k` until the instance turns satisfiable, pinning node 1 to color
//! 0 to break the color-permutation symmetry.

use super::{Instance, Sink};
use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use std::io;

/// An undirected graph as a deduplicated edge list over nodes `1..=max_node`.
#[derive(Debug, Clone)]
pub struct EdgeList {
    max_node: u32,
    edges: Vec<(u32, u32)>,
}

impl EdgeList {
    /// Read DIMACS-style edge lines (`e u v`); everything else is skipped.
    pub fn parse(text: &str) -> Result<EdgeList> {
        let mut max_node = 0;
        let mut edges: IndexSet<(u32, u32)> = IndexSet::new();

        for line in text.lines() {
            let mut tokens = line.split_ascii_whitespace();
            if tokens.next() != Some("e") {
                continue;
            }
            let from: u32 = tokens
                .next()
                .context("edge line is missing its endpoints")?
                .parse()
                .context("bad edge endpoint")?;
            let to: u32 = tokens
                .next()
                .context("edge line is missing an endpoint")?
                .parse()
                .context("bad edge endpoint")?;
            if from == 0 || to == 0 {
                bail!("nodes are numbered from 1");
            }

            max_node = max_node.max(from).max(to);
            if from != to {
                edges.insert((from.min(to), from.max(to)));
            }
        }

        Ok(EdgeList {
            max_node,
            edges: edges.into_iter().collect(),
        })
    }

    pub fn node_count(&self) -> u32 {
        self.max_node
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node and color → DIMACS variable.
    fn var(&self, node: u32, color: u32) -> i32 {
        (color * self.max_node + node) as i32
    }

    /// Write the clause set for a fixed color count.
    pub fn encode(&self, colors: u32, sink: &mut impl Sink) -> io::Result<()> {
        let clause_count = self.max_node + self.edges.len() as u32 * colors;
        sink.header(colors * self.max_node, clause_count)?;

        // Symmetry break: the first node gets the first color
        sink.clause(&[self.var(1, 0)])?;

        for node in 2..=self.max_node {
            let any: Vec<i32> = (0..colors).map(|c| self.var(node, c)).collect();
            sink.clause(&any)?;
        }

        for &(from, to) in &self.edges {
            for color in 0..colors {
                sink.clause(&[-self.var(from, color), -self.var(to, color)])?;
            }
        }

        Ok(())
    }

    /// Climb the color counts from two and stop at the first the solver can
    /// realize. Returns the count and one color per node (index 0 is node 1).
    pub fn solve(&self) -> Option<(u32, Vec<u32>)> {
        if self.max_node == 0 {
            return None;
        }

        // The upper clamp keeps a single-node graph on the first rung
        for colors in 2..=self.max_node.max(2) {
            log::info!("trying {colors} colors");
            let mut instance = Instance::new();
            self.encode(colors, &mut instance)
                .expect("in-memory sink does not fail");

            match instance.solve() {
                Ok(model) => {
                    let assignment = (1..=self.max_node)
                        .map(|node| {
                            (0..colors)
                                .find(|&c| model.value(self.var(node, c) as u32))
                                .unwrap_or(0)
                        })
                        .collect();
                    return Some((colors, assignment));
                }
                Err(reason) => {
                    log::info!("not colorable with {colors} colors: {reason}");
                }
            }
        }

        // A fresh color for every node always works, so the loop's last
        // iteration cannot fail
        unreachable!("every graph is colorable with one color per node");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dedups_edges_both_ways() {
        let graph = EdgeList::parse("c comment\ne 1 2\ne 2 1\ne 2 3\n").unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn triangle_needs_three_colors() {
        let graph = EdgeList::parse("e 1 2\ne 2 3\ne 1 3\n").unwrap();
        let (colors, assignment) = graph.solve().unwrap();
        assert_eq!(colors, 3);
        assert_ne!(assignment[0], assignment[1]);
        assert_ne!(assignment[1], assignment[2]);
        assert_ne!(assignment[0], assignment[2]);
    }

    #[test]
    fn edgeless_graph_passes_the_first_rung() {
        // Self-loops are dropped, leaving nodes but no edges; the ladder
        // still starts at two colors
        let graph = EdgeList::parse("e 3 3\n").unwrap();
        let (colors, assignment) = graph.solve().unwrap();
        assert_eq!(colors, 2);
        assert_eq!(assignment.len(), 3);
    }

    #[test]
    fn path_needs_two_colors() {
        let graph = EdgeList::parse("e 1 2\ne 2 3\n").unwrap();
        let (colors, assignment) = graph.solve().unwrap();
        assert_eq!(colors, 2);
        assert_ne!(assignment[0], assignment[1]);
        assert_ne!(assignment[1], assignment[2]);
    }
}
