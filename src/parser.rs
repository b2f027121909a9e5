//! DIMACS CNF ingestion
//!
//! Reads the simplified format used by the SAT competitions, with two
//! liberties real-world files need: the `p cnf` header is optional, and the
//! variable/clause counts it declares are never trusted. Clauses go straight
//! into a [`Graph`]; tautological clauses are dropped on the floor.

use crate::data::{Literal, Literals, ParseError, VarId};
use crate::graph::Graph;

/// Largest id accepted for a variable, matching the 31-bit literal encoding.
const MAX_VAR: u64 = (1 << 31) - 1;

/// Parse a whole DIMACS byte stream into a populated graph.
pub fn parse(input: &[u8]) -> Result<Graph, ParseError> {
    let mut graph = Graph::new();
    let mut buffer = Literals::new();
    let mut tautological = false;
    let mut pending = false;

    let mut pos = 0;
    let mut line = 1;
    let mut line_start = true;

    while pos < input.len() {
        let byte = input[pos];

        // Comment and header lines are skipped wholesale
        if line_start && (byte == b'c' || byte == b'p') {
            while pos < input.len() && input[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }

        match byte {
            b'\n' => {
                line += 1;
                line_start = true;
                pos += 1;
            }
            b' ' | b'\r' | b'\t' => {
                line_start = false;
                pos += 1;
            }
            b'-' | b'0'..=b'9' => {
                line_start = false;
                let negate = byte == b'-';
                if negate {
                    pos += 1;
                }
                if pos >= input.len() || !input[pos].is_ascii_digit() {
                    return Err(ParseError::UnexpectedByte { byte: '-', line });
                }

                let mut digits: u64 = 0;
                while pos < input.len() && input[pos].is_ascii_digit() {
                    digits = 10 * digits + u64::from(input[pos] - b'0');
                    if digits > MAX_VAR {
                        return Err(ParseError::VariableOutOfRange { line });
                    }
                    pos += 1;
                }

                if digits == 0 {
                    // End of clause; a stray 0 with nothing buffered is noise
                    if pending && !tautological {
                        graph.add_clause(std::mem::take(&mut buffer));
                    }
                    buffer.clear();
                    tautological = false;
                    pending = false;
                } else {
                    pending = true;
                    let mut lit = Literal::new(VarId::new(digits as u32));
                    if negate {
                        lit = !lit;
                    }
                    if buffer.contains(&!lit) {
                        tautological = true;
                    } else if !buffer.contains(&lit) {
                        buffer.push(lit);
                    }
                }
            }
            other => {
                return Err(ParseError::UnexpectedByte {
                    byte: other as char,
                    line,
                });
            }
        }
    }

    if pending {
        return Err(ParseError::UnterminatedClause);
    }
    Ok(graph)
}
