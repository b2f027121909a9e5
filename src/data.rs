//! Shared datatypes: ids, literals, assignment states, and the error taxonomy

use std::fmt::{self, Debug, Display, Formatter};
use std::ops::Not;
use thiserror::Error;
use tinyvec::TinyVec;

/// Why an instance has no solution.
///
/// Raised by the simplifier when structural rules empty a clause, and by
/// conflict analysis when resolution derives the empty clause.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum Unsat {
    #[error("clause {0} became empty")]
    EmptyClause(ClauseId),
    #[error("conflict analysis derived the empty clause")]
    EmptyResolvent,
    #[error("conflicting assignments for variable {0}")]
    Conflicting(VarId),
}

/// Malformed DIMACS input.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected byte {byte:?} on line {line}")]
    UnexpectedByte { byte: char, line: usize },
    #[error("variable id too large on line {line}")]
    VariableOutOfRange { line: usize },
    #[error("input ended in the middle of a clause")]
    UnterminatedClause,
}

/// A clause ID
///
/// Allocated from a monotonically increasing counter; ids of removed clauses
/// are never reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ClauseId(pub u32);

impl Display for ClauseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A variable ID
///
/// Numbered from 1 as in DIMACS; all ids are less than 2^31.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(pub u32);

impl VarId {
    #[inline]
    pub fn new(id: u32) -> Self {
        assert!(id > 0 && id < 1 << 31);
        Self(id)
    }
}

impl Display for VarId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A literal is either a variable or the negation of a variable
///
/// Encoded in 32 bits using a 31-bit variable id, plus a flag for whether
/// it's negated.
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Literal {
    inner: u32,
}

/// The literals of one clause, kept with set discipline: no duplicates, and
/// never both polarities of a variable.
// 6 is the most a TinyVec can store in 32 bytes given a 4-byte Literal
pub type Literals = TinyVec<[Literal; 6]>;

impl Debug for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_negated() {
            write!(f, "Literal(neg {:?})", self.var_id())
        } else {
            write!(f, "Literal({:?})", self.var_id())
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self {
        Self {
            inner: self.inner ^ 1,
        }
    }
}

/// `TinyVec` needs a default element; the null literal never appears in a
/// clause.
impl Default for Literal {
    fn default() -> Self {
        Self { inner: 0 }
    }
}

impl Literal {
    /// Make a new (non-negated) literal with the given ID.
    #[inline]
    pub fn new(id: VarId) -> Self {
        Self { inner: id.0 << 1 }
    }

    /// Decode a signed DIMACS literal. Zero is the clause terminator, not a
    /// literal.
    #[inline]
    pub fn from_dimacs(lit: i32) -> Self {
        debug_assert!(lit != 0);
        let base = Self::new(VarId::new(lit.unsigned_abs()));
        if lit < 0 {
            !base
        } else {
            base
        }
    }

    #[inline]
    pub fn to_dimacs(self) -> i32 {
        let id = self.var_id().0 as i32;
        if self.is_negated() {
            -id
        } else {
            id
        }
    }

    #[inline]
    pub fn var_id(self) -> VarId {
        VarId(self.inner >> 1)
    }

    #[inline]
    pub fn is_negated(self) -> bool {
        self.inner & 1 != 0
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum VarState {
    False,
    True,
    /// Hasn't been assigned yet
    Unknown,
}
pub use VarState::*;

impl Default for VarState {
    fn default() -> Self {
        Unknown
    }
}

impl Not for VarState {
    type Output = VarState;

    fn not(self) -> Self::Output {
        match self {
            False => True,
            True => False,
            Unknown => Unknown,
        }
    }
}
