//! The bipartite clause/variable store that every pipeline stage operates on
//!
//! Clauses and variables reference each other through id sets, never through
//! pointers, so removals during nested traversals stay safe. Clause ids come
//! from a monotone counter and are never reused; iteration everywhere follows
//! insertion order, which keeps runs replayable.

use crate::data::*;
use indexmap::{IndexMap, IndexSet};

/// Cached evaluation of a clause under the current partial assignment.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClauseState {
    /// Not cached; a visit has to rescan the literals.
    Unknown,
    /// Some literal is satisfied (or the clause is about to be, by a pending
    /// unit propagation).
    Sat,
    /// Every literal is falsified.
    Unsat,
}

/// A clause is the disjunction (OR) of a bunch of literals, plus the cached
/// evaluation and the variable that witnessed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub literals: Literals,
    pub state: ClauseState,
    /// The variable whose assignment set `state`; only its unassignment may
    /// clear the cache again.
    pub by_var: Option<VarId>,
}

impl Clause {
    fn new(literals: Literals) -> Self {
        Self {
            literals,
            state: ClauseState::Unknown,
            by_var: None,
        }
    }

    #[inline]
    pub fn contains(&self, lit: Literal) -> bool {
        self.literals.contains(&lit)
    }
}

/// A variable together with the clauses it occurs in, split by polarity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variable {
    pub state: VarState,
    /// Clauses containing the variable as a positive literal.
    pub positive: IndexSet<ClauseId>,
    /// Clauses containing the variable as a negative literal.
    pub negative: IndexSet<ClauseId>,
    /// Positive occurrences ever installed; never decremented, so the score
    /// keeps reflecting the graph as parsed.
    positive_total: u32,
    /// Negative counterpart of `positive_total`.
    negative_total: u32,
}

impl Variable {
    /// Decision priority: how constrained the variable was in its busier
    /// polarity when its clauses were installed. Structural removals during
    /// simplification don't lower it.
    #[inline]
    pub fn score(&self) -> usize {
        self.positive_total.max(self.negative_total) as usize
    }

    #[inline]
    pub fn occurrences(&self, negated: bool) -> &IndexSet<ClauseId> {
        if negated {
            &self.negative
        } else {
            &self.positive
        }
    }

    #[inline]
    fn occurrences_mut(&mut self, negated: bool) -> &mut IndexSet<ClauseId> {
        if negated {
            &mut self.negative
        } else {
            &mut self.positive
        }
    }
}

/// The main store: both sides of the bipartite relation plus the indices the
/// simplifier and the solver feed on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    clauses: IndexMap<ClauseId, Clause>,
    variables: IndexMap<VarId, Variable>,
    /// Source of clause ids; removed ids are never handed out again.
    counter: u32,
    /// Clauses that had exactly one literal when installed.
    initial_units: Vec<ClauseId>,
    /// Every known variable whose state is `Unknown`.
    unassigned: IndexSet<VarId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a clause and wire up the occurrence sets of its variables.
    /// Variables seen for the first time join the unassigned index.
    pub fn add_clause(&mut self, literals: Literals) -> ClauseId {
        self.counter += 1;
        let id = ClauseId(self.counter);

        for &lit in &literals {
            let var = lit.var_id();
            if !self.variables.contains_key(&var) {
                self.variables.insert(var, Variable::default());
                self.unassigned.insert(var);
            }
            let variable = &mut self.variables[&var];
            variable.occurrences_mut(lit.is_negated()).insert(id);
            if lit.is_negated() {
                variable.negative_total += 1;
            } else {
                variable.positive_total += 1;
            }
        }

        if literals.len() == 1 {
            self.initial_units.push(id);
        }
        self.clauses.insert(id, Clause::new(literals));
        id
    }

    /// Set a variable. Returns `Ok(true)` if the state changed, `Ok(false)`
    /// if it already held the requested value, and `Unsat` on a clash unless
    /// `override_previous` asks for the old value to be dropped first.
    pub fn assign(
        &mut self,
        var: VarId,
        value: bool,
        override_previous: bool,
    ) -> Result<bool, Unsat> {
        let wanted = if value { True } else { False };
        match self.variable(var).state {
            Unknown => {}
            old if old == wanted => return Ok(false),
            _ if override_previous => self.unassign(var),
            _ => return Err(Unsat::Conflicting(var)),
        }

        self.variable_mut(var).state = wanted;
        self.unassigned.swap_remove(&var);
        Ok(true)
    }

    /// Opposite of [`assign`](Self::assign): the variable becomes unknown
    /// again and re-enters the unassigned index. Clause caches witnessed by
    /// this variable are cleared; caches set by other variables stay.
    pub fn unassign(&mut self, var: VarId) {
        let variable = self.variable_mut(var);
        if variable.state == Unknown {
            panic!("double unassign of variable {var}");
        }
        variable.state = Unknown;

        let witnessed: Vec<ClauseId> = variable
            .positive
            .iter()
            .chain(variable.negative.iter())
            .copied()
            .collect();
        for id in witnessed {
            let clause = self.clause_mut(id);
            if clause.by_var == Some(var) {
                clause.state = ClauseState::Unknown;
                clause.by_var = None;
            }
        }

        self.unassigned.insert(var);
    }

    /// Delete a clause and every back-edge to it. Returns the clause so the
    /// caller can revisit the variables it mentioned.
    pub fn remove_clause(&mut self, id: ClauseId) -> Clause {
        let clause = match self.clauses.swap_remove(&id) {
            Some(clause) => clause,
            None => panic!("lost clause {id}"),
        };
        for &lit in &clause.literals {
            self.variable_mut(lit.var_id())
                .occurrences_mut(lit.is_negated())
                .swap_remove(&id);
        }
        clause
    }

    /// Drop one literal from a clause, including the variable's back-edge.
    pub fn remove_literal(&mut self, id: ClauseId, lit: Literal) {
        let clause = self.clause_mut(id);
        let index = match clause.literals.iter().position(|&l| l == lit) {
            Some(index) => index,
            None => panic!("clause {id} does not contain {lit}"),
        };
        clause.literals.swap_remove(index);
        self.variable_mut(lit.var_id())
            .occurrences_mut(lit.is_negated())
            .swap_remove(&id);
    }

    /// Detach both occurrence sets of a variable, oriented by the value it
    /// was just assigned: `(satisfied side, falsified side)`.
    pub fn take_occurrences(
        &mut self,
        var: VarId,
        value: bool,
    ) -> (IndexSet<ClauseId>, IndexSet<ClauseId>) {
        let variable = self.variable_mut(var);
        let positive = std::mem::take(&mut variable.positive);
        let negative = std::mem::take(&mut variable.negative);
        if value {
            (positive, negative)
        } else {
            (negative, positive)
        }
    }
}

/// Read accessors. Asking for an id the graph does not know is a bug in the
/// caller, not a recoverable condition.
impl Graph {
    #[inline]
    pub fn clause(&self, id: ClauseId) -> &Clause {
        match self.clauses.get(&id) {
            Some(clause) => clause,
            None => panic!("lost clause {id}"),
        }
    }

    #[inline]
    pub fn clause_mut(&mut self, id: ClauseId) -> &mut Clause {
        match self.clauses.get_mut(&id) {
            Some(clause) => clause,
            None => panic!("lost clause {id}"),
        }
    }

    #[inline]
    pub fn variable(&self, id: VarId) -> &Variable {
        match self.variables.get(&id) {
            Some(variable) => variable,
            None => panic!("lost variable {id}"),
        }
    }

    #[inline]
    pub fn variable_mut(&mut self, id: VarId) -> &mut Variable {
        match self.variables.get_mut(&id) {
            Some(variable) => variable,
            None => panic!("lost variable {id}"),
        }
    }

    #[inline]
    pub fn has_clause(&self, id: ClauseId) -> bool {
        self.clauses.contains_key(&id)
    }

    #[inline]
    pub fn has_variable(&self, id: VarId) -> bool {
        self.variables.contains_key(&id)
    }

    /// The literal's value under the current assignment.
    #[inline]
    pub fn literal_state(&self, lit: Literal) -> VarState {
        let state = self.variable(lit.var_id()).state;
        if lit.is_negated() {
            !state
        } else {
            state
        }
    }

    /// The literal a variable's current assignment makes true, if any.
    pub fn as_literal(&self, var: VarId) -> Option<Literal> {
        match self.variable(var).state {
            True => Some(Literal::new(var)),
            False => Some(!Literal::new(var)),
            Unknown => None,
        }
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn clauses(&self) -> impl Iterator<Item = (ClauseId, &Clause)> {
        self.clauses.iter().map(|(&id, clause)| (id, clause))
    }

    pub fn initial_units(&self) -> &[ClauseId] {
        &self.initial_units
    }

    pub fn unassigned(&self) -> &IndexSet<VarId> {
        &self.unassigned
    }

    pub fn unassigned_snapshot(&self) -> Vec<VarId> {
        self.unassigned.iter().copied().collect()
    }

    /// The model as signed DIMACS literals, ascending by variable id.
    /// Unassigned variables are unconstrained and do not appear.
    pub fn assigned_literals(&self) -> Vec<i32> {
        let mut vars: Vec<VarId> = self.variables.keys().copied().collect();
        vars.sort();
        vars.iter()
            .filter_map(|&var| self.as_literal(var))
            .map(Literal::to_dimacs)
            .collect()
    }
}

/// Structural self-checks, used by tests and debug builds.
impl Graph {
    /// Panic unless the bipartite relation, the caches and the indices are
    /// mutually consistent.
    pub fn check_consistency(&self) {
        for (&id, clause) in &self.clauses {
            for &lit in &clause.literals {
                assert!(
                    !clause.contains(!lit),
                    "clause {id} contains both polarities of {}",
                    lit.var_id()
                );
                let var = match self.variables.get(&lit.var_id()) {
                    Some(var) => var,
                    None => panic!("clause {id} references unknown variable {}", lit.var_id()),
                };
                assert!(
                    var.occurrences(lit.is_negated()).contains(&id),
                    "variable {} is missing the back-edge to clause {id}",
                    lit.var_id()
                );
            }

            match clause.state {
                ClauseState::Unknown => {
                    assert!(clause.by_var.is_none(), "uncached clause {id} has a witness")
                }
                ClauseState::Sat => {
                    let witness = clause.by_var.expect("cached clause without a witness");
                    assert!(
                        self.variable(witness).state != Unknown,
                        "clause {id} cached by unassigned variable {witness}"
                    );
                    assert!(
                        clause
                            .literals
                            .iter()
                            .any(|&lit| self.literal_state(lit) == True),
                        "clause {id} cached SAT but no literal is satisfied"
                    );
                }
                ClauseState::Unsat => {
                    assert!(clause.by_var.is_some(), "cached clause without a witness");
                    assert!(
                        clause
                            .literals
                            .iter()
                            .all(|&lit| self.literal_state(lit) == False),
                        "clause {id} cached UNSAT but not all literals are falsified"
                    );
                }
            }
        }

        for (&id, var) in &self.variables {
            for (&cid, negated) in var
                .positive
                .iter()
                .map(|c| (c, false))
                .chain(var.negative.iter().map(|c| (c, true)))
            {
                let clause = match self.clauses.get(&cid) {
                    Some(clause) => clause,
                    None => panic!("variable {id} references removed clause {cid}"),
                };
                let lit = if negated {
                    !Literal::new(id)
                } else {
                    Literal::new(id)
                };
                assert!(
                    clause.contains(lit),
                    "variable {id} has a back-edge to clause {cid} which lacks {lit}"
                );
            }

            assert_eq!(
                var.state == Unknown,
                self.unassigned.contains(&id),
                "unassigned index out of sync for variable {id}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(dimacs: &[i32]) -> Literals {
        dimacs.iter().map(|&l| Literal::from_dimacs(l)).collect()
    }

    #[test]
    fn add_clause_wires_occurrences() {
        let mut graph = Graph::new();
        let c1 = graph.add_clause(lits(&[1, -2]));
        let c2 = graph.add_clause(lits(&[2]));

        assert_eq!(graph.variable(VarId(1)).positive.len(), 1);
        assert!(graph.variable(VarId(2)).negative.contains(&c1));
        assert!(graph.variable(VarId(2)).positive.contains(&c2));
        assert_eq!(graph.initial_units(), &[c2]);
        assert_eq!(graph.unassigned().len(), 2);
        graph.check_consistency();
    }

    #[test]
    fn clause_ids_are_never_reused() {
        let mut graph = Graph::new();
        let c1 = graph.add_clause(lits(&[1]));
        graph.remove_clause(c1);
        let c2 = graph.add_clause(lits(&[1]));
        assert!(c2 > c1);
        assert!(!graph.has_clause(c1));
    }

    #[test]
    fn assign_unassign_round_trip() {
        let mut graph = Graph::new();
        graph.add_clause(lits(&[1, 2]));
        let before = graph.unassigned_snapshot();

        assert_eq!(graph.assign(VarId(1), true, false), Ok(true));
        assert_eq!(graph.assign(VarId(1), true, false), Ok(false));
        assert_eq!(
            graph.assign(VarId(1), false, false),
            Err(Unsat::Conflicting(VarId(1)))
        );
        assert_eq!(graph.variable(VarId(1)).state, True);
        assert!(!graph.unassigned().contains(&VarId(1)));

        graph.unassign(VarId(1));
        assert_eq!(graph.variable(VarId(1)).state, Unknown);
        assert_eq!(graph.unassigned_snapshot(), before);
        graph.check_consistency();
    }

    #[test]
    fn assign_with_override_flips_the_value() {
        let mut graph = Graph::new();
        graph.add_clause(lits(&[3]));
        graph.assign(VarId(3), true, false).unwrap();
        assert_eq!(graph.assign(VarId(3), false, true), Ok(true));
        assert_eq!(graph.variable(VarId(3)).state, False);
    }

    #[test]
    #[should_panic(expected = "double unassign")]
    fn double_unassign_is_a_bug() {
        let mut graph = Graph::new();
        graph.add_clause(lits(&[1]));
        graph.assign(VarId(1), true, false).unwrap();
        graph.unassign(VarId(1));
        graph.unassign(VarId(1));
    }

    #[test]
    fn unassign_clears_only_the_witnessing_cache() {
        let mut graph = Graph::new();
        let c1 = graph.add_clause(lits(&[1, 2]));
        let c2 = graph.add_clause(lits(&[1, -2]));
        graph.assign(VarId(1), true, false).unwrap();
        graph.assign(VarId(2), true, false).unwrap();
        graph.clause_mut(c1).state = ClauseState::Sat;
        graph.clause_mut(c1).by_var = Some(VarId(2));
        graph.clause_mut(c2).state = ClauseState::Sat;
        graph.clause_mut(c2).by_var = Some(VarId(1));

        graph.unassign(VarId(2));
        assert_eq!(graph.clause(c1).state, ClauseState::Unknown);
        assert_eq!(graph.clause(c1).by_var, None);
        assert_eq!(graph.clause(c2).state, ClauseState::Sat);
        graph.check_consistency();
    }

    #[test]
    fn remove_literal_updates_both_sides() {
        let mut graph = Graph::new();
        let c1 = graph.add_clause(lits(&[1, -2, 3]));
        graph.remove_literal(c1, Literal::from_dimacs(-2));
        assert_eq!(graph.clause(c1).literals.len(), 2);
        assert!(graph.variable(VarId(2)).negative.is_empty());
        graph.check_consistency();
    }

    #[test]
    fn assigned_literals_sorted_by_variable() {
        let mut graph = Graph::new();
        graph.add_clause(lits(&[5, -3]));
        graph.add_clause(lits(&[2]));
        graph.assign(VarId(5), true, false).unwrap();
        graph.assign(VarId(3), false, false).unwrap();
        assert_eq!(graph.assigned_literals(), vec![-3, 5]);
    }
}
