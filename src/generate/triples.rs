//! Pythagorean triples → CNF
//!
//! Two-color the integers 1..n so that no triple a² + b² = c² comes out
//! single-colored: for every such triple one clause bans all-black and one
//! bans all-white. Satisfiable up to n = 7824, famously not beyond.

use super::{Instance, Sink};
use std::io;

/// Exact integer square root.
fn isqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

/// All triples a ≤ b < c < n with a² + b² = c².
pub fn triples_below(n: u32) -> Vec<(u32, u32, u32)> {
    let mut found = Vec::new();
    for c in 1..u64::from(n) {
        for b in 1..c {
            let a_square = c * c - b * b;
            let a = isqrt(a_square);
            if a * a == a_square && a <= b {
                found.push((a as u32, b as u32, c as u32));
            }
        }
    }
    found
}

/// Write the clause set; variable k is the color of the integer k.
pub fn encode(n: u32, sink: &mut impl Sink) -> io::Result<()> {
    let triples = triples_below(n);
    sink.header(n.saturating_sub(1), 2 * triples.len() as u32)?;

    for &(a, b, c) in &triples {
        let (a, b, c) = (a as i32, b as i32, c as i32);
        sink.clause(&[a, b, c])?;
        sink.clause(&[-a, -b, -c])?;
    }
    Ok(())
}

/// Two-color 1..n. `None` when no coloring avoids a single-colored triple;
/// in a model, `true` is black.
pub fn solve(n: u32) -> Option<Vec<bool>> {
    let mut instance = Instance::new();
    encode(n, &mut instance).expect("in-memory sink does not fail");

    match instance.solve() {
        Ok(model) => Some((1..n).map(|k| model.value(k)).collect()),
        Err(reason) => {
            log::info!("no coloring below {n}: {reason}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isqrt_is_exact() {
        for n in 0..2000u64 {
            let root = isqrt(n);
            assert!(root * root <= n);
            assert!((root + 1) * (root + 1) > n);
        }
    }

    #[test]
    fn finds_the_small_triples() {
        let triples = triples_below(30);
        assert!(triples.contains(&(3, 4, 5)));
        assert!(triples.contains(&(6, 8, 10)));
        assert!(triples.contains(&(20, 21, 29)));
        assert!(!triples.contains(&(4, 3, 5)));
    }

    #[test]
    fn small_instances_are_colorable() {
        let colors = solve(30).unwrap();
        for (a, b, c) in triples_below(30) {
            let (a, b, c) = (a as usize - 1, b as usize - 1, c as usize - 1);
            assert!(
                !(colors[a] == colors[b] && colors[b] == colors[c]),
                "triple came out single-colored"
            );
        }
    }
}
