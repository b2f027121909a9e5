//! # Simplification / preprocessing
//!
//! The first step in SAT solving is to shrink the input as much as possible
//! before any search happens. Two rules run against the clause graph, each to
//! fixpoint:
//!
//!  - [x] Unit propagation: a clause with a single literal forces that
//!    literal true. Seeded from the clauses that were unit on arrival and
//!    kept going by clauses that shrink to one literal.
//!
//!  - [x] Pure literals: a variable occurring in only one polarity can be
//!    assigned that polarity without losing any model.
//!
//! Both rules work structurally: a satisfied clause is deleted outright, a
//! falsified literal is cut out of its clause. Deleting a clause can make
//! more variables pure and cutting a literal can make more clauses unit, so
//! the two cascade through shared worklists until nothing moves.
//!
//! Unlike the search phase, nothing here is ever undone; the assignments the
//! simplifier makes are permanent.

use crate::data::*;
use crate::graph::Graph;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct Simplifier<'g> {
    graph: &'g mut Graph,
    /// Clauses that currently hold exactly one literal.
    units: VecDeque<ClauseId>,
    /// Variables to re-examine for pureness after they lost a clause.
    pure_checks: Vec<VarId>,
}

impl<'g> Simplifier<'g> {
    pub fn new(graph: &'g mut Graph) -> Self {
        Self {
            graph,
            units: VecDeque::new(),
            pure_checks: Vec::new(),
        }
    }

    pub fn run(&mut self) -> Result<(), Unsat> {
        let clauses_before = self.graph.clause_count();
        let unassigned_before = self.graph.unassigned().len();
        log::info!(
            "simplifying {} clauses over {} variables",
            clauses_before,
            self.graph.variable_count()
        );

        // Phase A: propagate the units recorded at insertion time
        self.units.extend(self.graph.initial_units().iter().copied());
        self.propagate()?;

        // Phase B: sweep every variable still unassigned at this point;
        // assignments made mid-sweep are skipped when their turn comes
        let snapshot = self.graph.unassigned_snapshot();
        for var in snapshot {
            if self.graph.variable(var).state != Unknown {
                continue;
            }
            self.check_pure(var)?;
            self.propagate()?;
        }

        log::info!(
            "simplification removed {} clauses and assigned {} variables",
            clauses_before - self.graph.clause_count(),
            unassigned_before - self.graph.unassigned().len()
        );
        Ok(())
    }
}

/// The worklist machinery
impl Simplifier<'_> {
    /// Drain both worklists. Units run first; every assignment they make can
    /// push more entries onto either list.
    fn propagate(&mut self) -> Result<(), Unsat> {
        loop {
            if self.graph.clause_count() == 0 {
                // Formula exhausted, the accumulated assignment satisfies it
                break;
            }

            if let Some(id) = self.units.pop_front() {
                if !self.graph.has_clause(id) {
                    continue;
                }
                let clause = self.graph.clause(id);
                debug_assert_eq!(clause.literals.len(), 1);
                let lit = clause.literals[0];
                log::debug!("unit clause {id} forces {lit}");
                self.assign(lit.var_id(), !lit.is_negated())?;
            } else if let Some(var) = self.pure_checks.pop() {
                self.check_pure(var)?;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Permanently assign a variable and apply the structural rules to every
    /// clause it occurs in.
    fn assign(&mut self, var: VarId, value: bool) -> Result<(), Unsat> {
        if !self.graph.assign(var, value, false)? {
            return Ok(());
        }
        log::debug!("assigning {var} = {value}");

        let (satisfied, falsified) = self.graph.take_occurrences(var, value);

        for id in satisfied {
            let removed = self.graph.remove_clause(id);
            log::debug!("clause {id} satisfied by {var}");
            for &lit in &removed.literals {
                if lit.var_id() != var {
                    self.pure_checks.push(lit.var_id());
                }
            }
        }

        let false_lit = if value {
            !Literal::new(var)
        } else {
            Literal::new(var)
        };
        for id in falsified {
            self.graph.remove_literal(id, false_lit);
            match self.graph.clause(id).literals.len() {
                0 => {
                    log::debug!("clause {id} has no literals left");
                    return Err(Unsat::EmptyClause(id));
                }
                1 => self.units.push_back(id),
                _ => {}
            }
        }

        Ok(())
    }

    /// Assign a variable that occurs in a single polarity. A variable with no
    /// occurrences left is not touched; the search phase picks it up if it
    /// matters at all.
    fn check_pure(&mut self, var: VarId) -> Result<(), Unsat> {
        let variable = self.graph.variable(var);
        if variable.state != Unknown {
            return Ok(());
        }

        let value = if variable.negative.is_empty() && !variable.positive.is_empty() {
            true
        } else if variable.positive.is_empty() && !variable.negative.is_empty() {
            false
        } else {
            return Ok(());
        };

        log::debug!(
            "pure {} variable {var}",
            if value { "positive" } else { "negative" }
        );
        self.assign(var, value)
    }
}
