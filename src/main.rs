use std::io::Read;
use std::time::Instant;
use std::{env, fs, io, process};

use satgraph::{parser, Graph};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("usage: {} [<file>]", args[0]);
        process::exit(1);
    }

    let input = match args.get(1) {
        Some(path) => fs::read(path),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer).map(|_| buffer)
        }
    };
    let input = match input {
        Ok(input) => input,
        Err(err) => {
            eprintln!("cannot read input: {err}");
            process::exit(1);
        }
    };

    // Measure from here so slow disks don't skew timings
    let start = Instant::now();

    let mut graph = match parser::parse(&input) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("parse error: {err}");
            process::exit(1);
        }
    };

    match satgraph::solve(&mut graph) {
        Ok(()) => {
            eprintln!("solution found after {:?}", start.elapsed());
            println!("{}", format_model(&graph));
        }
        Err(reason) => {
            eprintln!("no solution after {:?}: {reason}", start.elapsed());
            println!("UNSAT");
            process::exit(1);
        }
    }
}

/// Assigned variables as signed literals, terminated DIMACS-style.
fn format_model(graph: &Graph) -> String {
    let mut line = String::new();
    for lit in graph.assigned_literals() {
        line.push_str(&lit.to_string());
        line.push(' ');
    }
    line.push('0');
    line
}
