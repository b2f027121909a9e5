//! The heuristic for picking which variable to decide first
//!
//! Variables that occur in many clauses of one polarity are the most
//! constraining guesses, so the search tries them first. Scores are the
//! occurrence counts of the graph as parsed; clauses the simplifier deletes
//! afterwards don't demote anyone. The candidates are whatever the
//! simplifier left unassigned, and the order is fixed once; the search loop
//! rescans it whenever backtracking frees variables up again.

use crate::data::VarId;
use crate::graph::Graph;

/// Unassigned variables, most constrained first. Ties break towards the
/// smaller id so runs are reproducible.
pub fn decision_order(graph: &Graph) -> Vec<VarId> {
    let mut order = graph.unassigned_snapshot();
    order.sort_by(|&a, &b| {
        let score_a = graph.variable(a).score();
        let score_b = graph.variable(b).score();
        score_b.cmp(&score_a).then(a.cmp(&b))
    });
    order
}
