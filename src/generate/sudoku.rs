//! Sudoku → CNF
//!
//! Minimal encoding: every cell takes at least one value, no value repeats
//! within a row, column or region, and the given cells are pinned by unit
//! clauses. Uniqueness per cell is implied and not encoded separately.

use super::{Instance, Sink};
use anyhow::{bail, Context, Result};
use std::io;

/// A parsed puzzle. `region` is the box edge: a classic 9×9 Sudoku has
/// region 3. Blank cells are 0.
#[derive(Debug, Clone)]
pub struct Puzzle {
    region: usize,
    cells: Vec<u32>,
}

impl Puzzle {
    /// Read a puzzle as whitespace-separated numbers: the region size first,
    /// then every cell row by row.
    pub fn parse(text: &str) -> Result<Puzzle> {
        let mut numbers = text.split_ascii_whitespace().map(|token| {
            token
                .parse::<u32>()
                .with_context(|| format!("bad number {token:?} in puzzle"))
        });

        let region = numbers.next().context("missing region size")?? as usize;
        if region < 2 {
            bail!("region size must be at least 2");
        }
        let row = region * region;

        let cells: Vec<u32> = numbers.collect::<Result<_>>()?;
        if cells.len() != row * row {
            bail!("expected {} cells, found {}", row * row, cells.len());
        }
        if let Some(bad) = cells.iter().find(|&&value| value > row as u32) {
            bail!("cell value {bad} out of range for a {row}x{row} grid");
        }

        Ok(Puzzle { region, cells })
    }

    pub fn row_size(&self) -> usize {
        self.region * self.region
    }

    fn cell(&self, x: usize, y: usize) -> u32 {
        self.cells[y * self.row_size() + x]
    }

    /// Cell and candidate value → DIMACS variable.
    fn var(&self, x: usize, y: usize, value: u32) -> i32 {
        let row = self.row_size();
        ((y * row + x) * row) as i32 + value as i32
    }

    /// Write the clause set. No header; consumers may not rely on one.
    pub fn encode(&self, sink: &mut impl Sink) -> io::Result<()> {
        let row = self.row_size();
        let values = 1..=row as u32;

        // Every cell holds some value
        for y in 0..row {
            for x in 0..row {
                let any: Vec<i32> = values.clone().map(|v| self.var(x, y, v)).collect();
                sink.clause(&any)?;
            }
        }

        // A value appears at most once per row and per column
        for value in values.clone() {
            for fixed in 0..row {
                for a in 0..row {
                    for b in a + 1..row {
                        sink.clause(&[-self.var(a, fixed, value), -self.var(b, fixed, value)])?;
                        sink.clause(&[-self.var(fixed, a, value), -self.var(fixed, b, value)])?;
                    }
                }
            }
        }

        // ... and at most once per region; pairs sharing a row or column are
        // already covered above
        for ry in 0..self.region {
            for rx in 0..self.region {
                let cells: Vec<(usize, usize)> = (0..self.region)
                    .flat_map(|iy| {
                        (0..self.region).map(move |ix| (rx * self.region + ix, ry * self.region + iy))
                    })
                    .collect();
                for value in values.clone() {
                    for (i, &(x1, y1)) in cells.iter().enumerate() {
                        for &(x2, y2) in &cells[i + 1..] {
                            if x1 == x2 || y1 == y2 {
                                continue;
                            }
                            sink.clause(&[-self.var(x1, y1, value), -self.var(x2, y2, value)])?;
                        }
                    }
                }
            }
        }

        // Pin the givens
        for y in 0..row {
            for x in 0..row {
                let given = self.cell(x, y);
                if given > 0 {
                    sink.clause(&[self.var(x, y, given)])?;
                }
            }
        }

        Ok(())
    }

    /// Solve the puzzle. `None` means the givens admit no completion.
    pub fn solve(&self) -> Option<Vec<u32>> {
        let mut instance = Instance::new();
        self.encode(&mut instance)
            .expect("in-memory sink does not fail");

        let model = match instance.solve() {
            Ok(model) => model,
            Err(reason) => {
                log::info!("puzzle is unsolvable: {reason}");
                return None;
            }
        };

        let row = self.row_size();
        let mut grid = vec![0u32; row * row];
        for y in 0..row {
            for x in 0..row {
                for value in 1..=row as u32 {
                    if model.value(self.var(x, y, value) as u32) {
                        grid[y * row + x] = value;
                        break;
                    }
                }
            }
        }
        Some(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_checks_the_cell_count() {
        assert!(Puzzle::parse("2 1 2 3").is_err());
        assert!(Puzzle::parse("2 5 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0").is_err());

        let blank16 = "0 ".repeat(16);
        let puzzle = Puzzle::parse(&format!("2 {blank16}")).unwrap();
        assert_eq!(puzzle.row_size(), 4);
    }

    #[test]
    fn variables_start_at_one() {
        let blank16 = "0 ".repeat(16);
        let puzzle = Puzzle::parse(&format!("2 {blank16}")).unwrap();
        assert_eq!(puzzle.var(0, 0, 1), 1);
        assert_eq!(puzzle.var(3, 3, 4), 64);
    }
}
