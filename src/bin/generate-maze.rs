//! CLI for maze generation

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use clap::Parser;
use itertools::Itertools;
use log::info;
use prim_maze::{Layout, MazeGenerator};

/// Perfect maze generator
///
/// Dimensions that are not given are asked for on the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of rows
    #[arg(long)]
    rows: Option<usize>,

    /// Number of columns
    #[arg(long)]
    cols: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Put start and end in opposite corners
    #[arg(long)]
    corners: bool,

    /// Also find and print the shortest path
    #[arg(long)]
    solve: bool,
}

/// Ask for a positive number on stderr, read it from stdin
fn prompt(name: &str) -> anyhow::Result<usize> {
    eprint!("Enter the number of {name} for the maze: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value: i64 = line
        .trim()
        .parse()
        .with_context(|| format!("Expected a whole number of {name}, got `{}`", line.trim()))?;
    if value <= 0 {
        bail!("Number of {name} must be positive, got {value}");
    }
    Ok(usize::try_from(value)?)
}

/// Generate maze, print it
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = match args.rows {
        Some(rows) => rows,
        None => prompt("rows")?,
    };
    let cols = match args.cols {
        Some(cols) => cols,
        None => prompt("columns")?,
    };
    let layout = if args.corners {
        Layout::Corners
    } else {
        Layout::Reflected
    };

    let mut gen = MazeGenerator::new(rows, cols, args.seed)?.with_layout(layout);
    info!("generating {rows}x{cols} maze with seed {}", gen.seed());
    gen.generate();

    if args.solve {
        let path = gen.solve()?;
        println!("{}", gen.maze().render_path(&path));
        println!("Start: {}", gen.start()?);
        println!("End: {}", gen.end()?);
        println!("{}", path.iter().join(" "));
    } else {
        // Only the maze goes to stdout, so it can be piped into `solve-maze -`
        println!("{}", gen.maze());
        eprintln!("Start: {}", gen.start()?);
        eprintln!("End: {}", gen.end()?);
        eprintln!("Seed: {}", gen.seed());
    }
    Ok(())
}
