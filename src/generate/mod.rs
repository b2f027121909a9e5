//! Puzzle-to-CNF encoders
//!
//! Each encoder writes clauses through a [`Sink`]: either a DIMACS printer,
//! for handing the instance to any solver, or an in-memory [`Instance`] fed
//! straight into this crate's pipeline.

pub mod coloring;
pub mod sudoku;
pub mod triples;

use crate::data::*;
use crate::graph::Graph;
use std::io::{self, Write};

/// Where encoded clauses end up.
pub trait Sink {
    /// The `p cnf` header. Consumers must treat the counts as advisory.
    fn header(&mut self, variables: u32, clauses: u32) -> io::Result<()>;

    /// One clause as signed DIMACS literals, without the terminating zero.
    fn clause(&mut self, literals: &[i32]) -> io::Result<()>;
}

/// Prints DIMACS to a writer.
pub struct DimacsOut<W: Write> {
    out: W,
}

impl<W: Write> DimacsOut<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Sink for DimacsOut<W> {
    fn header(&mut self, variables: u32, clauses: u32) -> io::Result<()> {
        writeln!(self.out, "p cnf {variables} {clauses}")
    }

    fn clause(&mut self, literals: &[i32]) -> io::Result<()> {
        for lit in literals {
            write!(self.out, "{lit} ")?;
        }
        writeln!(self.out, "0")
    }
}

/// Collects clauses into a graph, skipping the DIMACS round trip.
#[derive(Debug, Default)]
pub struct Instance {
    graph: Graph,
}

impl Instance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solve the collected clauses; the model keeps the encoder's variable
    /// numbering for decoding.
    pub fn solve(mut self) -> Result<Model, Unsat> {
        crate::solve(&mut self.graph)?;
        Ok(Model { graph: self.graph })
    }
}

impl Sink for Instance {
    fn header(&mut self, _variables: u32, _clauses: u32) -> io::Result<()> {
        Ok(())
    }

    fn clause(&mut self, literals: &[i32]) -> io::Result<()> {
        let mut lits = Literals::new();
        for &raw in literals {
            let lit = Literal::from_dimacs(raw);
            if lits.contains(&!lit) {
                // Tautological clause, same treatment as the parser
                return Ok(());
            }
            if !lits.contains(&lit) {
                lits.push(lit);
            }
        }
        self.graph.add_clause(lits);
        Ok(())
    }
}

/// A satisfying assignment, queried by the encoder's variable numbering.
#[derive(Debug)]
pub struct Model {
    graph: Graph,
}

impl Model {
    /// Whether a variable came out true. Variables the solver never saw or
    /// left unconstrained count as false.
    pub fn value(&self, var: u32) -> bool {
        let id = VarId::new(var);
        self.graph.has_variable(id) && self.graph.variable(id).state == True
    }
}
