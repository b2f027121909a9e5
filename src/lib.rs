//! A CNF satisfiability solver built on a clause/variable graph
//!
//! The pipeline is parse → simplify → search: [`parser`] installs DIMACS
//! clauses into a [`Graph`], [`simplify`] runs unit propagation and
//! pure-literal elimination to fixpoint, and [`solver`] finishes the job
//! with conflict-driven clause learning. [`generate`] holds the puzzle
//! encoders that produce CNF for the other end of the pipe.

pub mod data;
pub mod generate;
pub mod graph;
pub mod heuristic;
pub mod parser;
pub mod simplify;
pub mod solver;

pub use self::data::{ClauseId, Literal, ParseError, Unsat, VarId, VarState};
pub use self::graph::Graph;
pub use self::simplify::Simplifier;
pub use self::solver::Solver;

/// Run the full pipeline on a parsed graph.
///
/// On `Ok` the graph's assigned variables form a model; variables the
/// formula never constrained may be left unassigned.
pub fn solve(graph: &mut Graph) -> Result<(), Unsat> {
    Simplifier::new(graph).run()?;
    if graph.clause_count() > 0 {
        let mut solver = Solver::new(graph);
        solver.run()?;
        solver.verify();
    }
    Ok(())
}
