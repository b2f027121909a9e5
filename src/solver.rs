//! The conflict-driven search
//!
//! Runs on the graph the simplifier left behind. Assignments are tracked on
//! a trail of (variable, reason) steps; a conflict is resolved backwards
//! along that trail into a learned clause whose unit propagation asserts the
//! value the failed branch should have taken. Backtracking is whatever the
//! learned clause demands, not level-by-level.
//!
//! Clause evaluation is cached: a visit records whether the clause came out
//! satisfied or falsified and which variable witnessed it, and only that
//! variable's unassignment clears the cache again.

use crate::data::*;
use crate::graph::{ClauseState, Graph};
use crate::heuristic;

/// One trail entry: a variable and the clause that forced it, or `None` for
/// a decision.
#[derive(Debug, Copy, Clone)]
struct Step {
    var: VarId,
    reason: Option<ClauseId>,
}

/// What a fresh scan of a clause found.
enum Scan {
    Satisfied(VarId),
    Conflict,
    Unit(Literal),
    Open,
}

/// The main state for the search
#[derive(Debug)]
pub struct Solver<'g> {
    graph: &'g mut Graph,
    /// Ordered record of assignments, for conflict analysis and backtracking
    trail: Vec<Step>,
    /// Decision order fixed at entry; rescanned after backtracking
    order: Vec<VarId>,
    decisions: usize,
    conflicts: usize,
}

impl<'g> Solver<'g> {
    pub fn new(graph: &'g mut Graph) -> Self {
        let order = heuristic::decision_order(graph);
        Self {
            graph,
            trail: Vec::new(),
            order,
            decisions: 0,
            conflicts: 0,
        }
    }

    /// Search until every variable has a value.
    ///
    /// Returns `Ok(())` if the graph ends up satisfied and `Err` if the
    /// instance has no model.
    pub fn run(&mut self) -> Result<(), Unsat> {
        log::info!(
            "searching over {} variables and {} clauses",
            self.order.len(),
            self.graph.clause_count()
        );

        // Learning can unassign variables behind the scan position, so keep
        // sweeping the order until a pass finds everything assigned
        while !self.graph.unassigned().is_empty() {
            for i in 0..self.order.len() {
                let var = self.order[i];
                if self.graph.variable(var).state != Unknown {
                    continue;
                }

                self.decisions += 1;
                log::debug!("deciding {var} = true");
                if let Err(conflict) = self.assign(var, true, None) {
                    self.recover(conflict)?;
                }
            }
        }

        log::info!(
            "satisfiable after {} decisions and {} conflicts",
            self.decisions,
            self.conflicts
        );
        Ok(())
    }

    /// Set a variable, record the step, and revisit every clause this
    /// assignment falsifies a literal in. An `Err` carries the conflicting
    /// clause up to the decision loop.
    fn assign(&mut self, var: VarId, value: bool, reason: Option<ClauseId>) -> Result<(), ClauseId> {
        match self.graph.assign(var, value, false) {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(_) => panic!("assignment clash on variable {var} during search"),
        }
        self.trail.push(Step { var, reason });

        let variable = self.graph.variable(var);
        let opposite: Vec<ClauseId> = if value {
            variable.negative.iter().copied().collect()
        } else {
            variable.positive.iter().copied().collect()
        };

        for id in opposite {
            if self.graph.clause(id).state == ClauseState::Sat {
                continue;
            }
            self.visit_clause(id, var)?;
        }
        Ok(())
    }

    /// Rescan a clause and cache the verdict. A unit clause propagates
    /// immediately; a falsified one reports the conflict.
    fn visit_clause(&mut self, id: ClauseId, from: VarId) -> Result<(), ClauseId> {
        let scan = {
            let clause = self.graph.clause(id);
            let mut witness = None;
            let mut unit = None;
            let mut open = 0;
            for &lit in &clause.literals {
                match self.graph.literal_state(lit) {
                    True => {
                        witness = Some(lit.var_id());
                        break;
                    }
                    False => {}
                    Unknown => {
                        open += 1;
                        unit = Some(lit);
                    }
                }
            }
            match (witness, open) {
                (Some(var), _) => Scan::Satisfied(var),
                (None, 0) => Scan::Conflict,
                (None, 1) => Scan::Unit(unit.expect("counted an open literal")),
                _ => Scan::Open,
            }
        };

        match scan {
            Scan::Satisfied(var) => {
                let clause = self.graph.clause_mut(id);
                clause.state = ClauseState::Sat;
                clause.by_var = Some(var);
                Ok(())
            }
            Scan::Conflict => {
                let clause = self.graph.clause_mut(id);
                clause.state = ClauseState::Unsat;
                clause.by_var = Some(from);
                log::debug!("conflict in clause {id}");
                Err(id)
            }
            Scan::Unit(lit) => {
                // The propagation below makes this clause true; credit the
                // cache to the propagated variable so backtracking it
                // invalidates the entry
                let clause = self.graph.clause_mut(id);
                clause.state = ClauseState::Sat;
                clause.by_var = Some(lit.var_id());
                log::trace!("clause {id} forces {lit}");
                self.assign(lit.var_id(), !lit.is_negated(), Some(id))
            }
            Scan::Open => Ok(()),
        }
    }

    /// Learn from a conflict and backtrack. Loops because the learned
    /// clause's own propagation may run into the next conflict right away.
    fn recover(&mut self, mut conflict: ClauseId) -> Result<(), Unsat> {
        loop {
            self.conflicts += 1;
            let (resolvent, asserting) = self.analyze(conflict)?;
            let id = self.graph.add_clause(resolvent);
            log::debug!("learned clause {id}, asserting on {asserting}");
            match self.visit_clause(id, asserting) {
                Ok(()) => return Ok(()),
                Err(next) => conflict = next,
            }
        }
    }

    /// Resolve the conflicting clause backwards along the trail, then unwind
    /// to the asserting step. Returns the learned clause and the variable it
    /// asserts; everything from the conflict down to (and including) that
    /// step is unassigned.
    fn analyze(&mut self, conflict: ClauseId) -> Result<(Literals, VarId), Unsat> {
        let mut resolvent = self.graph.clause(conflict).literals.clone();
        log::debug!("analyzing conflict in clause {conflict}");

        loop {
            let step = match self.trail.last() {
                Some(&step) => step,
                None => panic!("conflict analysis ran out of trail"),
            };
            let reason = match step.reason {
                // The decision itself; resolution stops here
                None => break,
                Some(reason) => reason,
            };
            self.trail.pop();
            self.graph.unassign(step.var);

            // Two unrelated propagations can sit next to each other on the
            // trail; resolution only applies when this step's variable is in
            // the resolvent and its reason carries the complement
            let positive = Literal::new(step.var);
            let lit = if resolvent.contains(&positive) {
                positive
            } else if resolvent.contains(&!positive) {
                !positive
            } else {
                continue;
            };
            if !self.graph.clause(reason).contains(!lit) {
                continue;
            }

            Self::resolve(&mut resolvent, &self.graph.clause(reason).literals, step.var);
            if resolvent.is_empty() {
                log::info!("resolution produced the empty clause");
                return Err(Unsat::EmptyResolvent);
            }
        }

        // Unwind to the asserting step: the most recent assignment whose
        // falsified literal survives in the resolvent
        loop {
            let step = match self.trail.pop() {
                Some(step) => step,
                None => panic!("clause learning unwound the whole trail"),
            };
            let assigned = match self.graph.as_literal(step.var) {
                Some(lit) => lit,
                None => panic!("unassigned variable {} on the trail", step.var),
            };
            self.graph.unassign(step.var);
            if resolvent.contains(&!assigned) {
                debug_assert!(
                    !resolvent.contains(&assigned),
                    "learned clause contains the asserting variable twice"
                );
                return Ok((resolvent, step.var));
            }
        }
    }

    /// Replace `resolvent` by its resolution with `reason` on `var`.
    fn resolve(resolvent: &mut Literals, reason: &Literals, var: VarId) {
        let mut i = 0;
        while i < resolvent.len() {
            if resolvent[i].var_id() == var {
                resolvent.swap_remove(i);
            } else {
                i += 1;
            }
        }
        for &lit in reason {
            if lit.var_id() == var || resolvent.contains(&lit) {
                continue;
            }
            debug_assert!(!resolvent.contains(&!lit), "tautological resolvent");
            resolvent.push(lit);
        }
    }

    /// Check that the model satisfies every remaining clause.
    pub fn verify(&self) {
        for (id, clause) in self.graph.clauses() {
            let satisfied = clause
                .literals
                .iter()
                .any(|&lit| self.graph.literal_state(lit) == True);
            if !satisfied {
                panic!("clause {id} is not satisfied by the model");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn search(input: &[u8]) -> (Graph, Result<(), Unsat>) {
        let mut graph = parse(input).unwrap();
        let result = {
            let mut solver = Solver::new(&mut graph);
            let result = solver.run();
            if result.is_ok() {
                solver.verify();
            }
            result
        };
        (graph, result)
    }

    #[test]
    fn decides_towards_a_model() {
        let (graph, result) = search(b"1 2 0\n-1 2 0\n");
        assert_eq!(result, Ok(()));
        assert!(graph.assigned_literals().contains(&2) || graph.assigned_literals().contains(&1));
        graph.check_consistency();
    }

    #[test]
    fn learns_through_an_unrelated_propagation() {
        // Deciding 1 propagates 2 (irrelevant to the conflict) and 3 (which
        // trips the third clause); analysis must skip 2's trail step while
        // resolving on 3 and 1
        let (graph, result) = search(b"-1 2 0\n-1 3 0\n-1 -3 0\n1 -2 0\n");
        assert_eq!(result, Ok(()));
        assert_eq!(graph.assigned_literals(), vec![-1, -2, 3]);
        graph.check_consistency();
    }

    #[test]
    fn contradictory_core_is_unsat() {
        // (1 2)(1 -2)(-1 3)(-1 -3) has no model; the second learned clause
        // resolves down to nothing
        let (_, result) = search(b"1 2 0\n1 -2 0\n-1 3 0\n-1 -3 0\n");
        assert_eq!(result, Err(Unsat::EmptyResolvent));
    }

    #[test]
    fn caches_stay_honest_while_backtracking_by_hand() {
        let mut graph = parse(b"-1 2 0\n-1 3 0\n-2 -3 1 0\n2 3 4 0\n-4 1 0\n").unwrap();
        let mut trail = {
            let mut solver = Solver::new(&mut graph);
            solver.run().unwrap();
            solver.verify();
            std::mem::take(&mut solver.trail)
        };
        graph.check_consistency();

        // Unwind the whole search in reverse; the witness rule must keep
        // every surviving cache entry consistent with a fresh scan
        while let Some(step) = trail.pop() {
            graph.unassign(step.var);
            graph.check_consistency();
        }
    }
}
