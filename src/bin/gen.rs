use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use satgraph::generate::{coloring, sudoku, triples, DimacsOut};

/// Encode puzzle instances as CNF, or solve them with the built-in solver.
#[derive(Parser)]
#[command(name = "satgraph-gen")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a Sudoku grid
    Sudoku {
        /// Puzzle file; read from stdin when absent
        file: Option<PathBuf>,
        /// Print the DIMACS encoding instead of solving
        #[arg(long)]
        emit: bool,
    },
    /// Color a graph with as few colors as the solver can realize
    Coloring {
        /// Edge list file (`e u v` lines); read from stdin when absent
        file: Option<PathBuf>,
        /// Print the DIMACS encoding instead of solving
        #[arg(long)]
        emit: bool,
        /// Color count to encode with `--emit`
        #[arg(long, default_value_t = 2)]
        colors: u32,
    },
    /// Two-color the integers below N so no Pythagorean triple is
    /// single-colored
    Triples {
        n: u32,
        /// Print the DIMACS encoding instead of solving
        #[arg(long)]
        emit: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut stdout = DimacsOut::new(io::stdout().lock());

    match cli.command {
        Command::Sudoku { file, emit } => {
            let puzzle = sudoku::Puzzle::parse(&read_input(file)?)?;
            if emit {
                puzzle.encode(&mut stdout)?;
                return Ok(());
            }
            let grid = match puzzle.solve() {
                Some(grid) => grid,
                None => bail!("the givens admit no solution"),
            };
            let row = puzzle.row_size();
            for line in grid.chunks(row) {
                let cells: Vec<String> = line.iter().map(u32::to_string).collect();
                println!("{}", cells.join(" "));
            }
        }
        Command::Coloring { file, emit, colors } => {
            let graph = coloring::EdgeList::parse(&read_input(file)?)?;
            if graph.node_count() == 0 {
                bail!("the input contains no edges");
            }
            if emit {
                graph.encode(colors, &mut stdout)?;
                return Ok(());
            }
            let (colors, assignment) = match graph.solve() {
                Some(solution) => solution,
                None => bail!("no coloring found"),
            };
            println!("colored {} nodes with {colors} colors", graph.node_count());
            for (index, color) in assignment.iter().enumerate() {
                println!("node {} has color {color}", index + 1);
            }
        }
        Command::Triples { n, emit } => {
            if emit {
                triples::encode(n, &mut stdout)?;
                return Ok(());
            }
            let colors = match triples::solve(n) {
                Some(colors) => colors,
                None => bail!("no two-coloring exists below {n}"),
            };
            for (index, &black) in colors.iter().enumerate() {
                println!("{} is {}", index + 1, if black { "black" } else { "white" });
            }
        }
    }

    Ok(())
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("cannot read stdin")?;
            Ok(buffer)
        }
    }
}
