//! CLI for maze solving

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;
use prim_maze::{pathfinder, Maze};

/// Shortest way through a text maze
///
/// `#` is a wall, a space is open, `S` and `E` mark the start and the end.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Also print the maze with the path drawn in
    #[arg(short, long)]
    show_path: bool,

    /// File, where to read the maze. Use `-` for stdin.
    file: PathBuf,
}

/// Read maze from file, print the shortest path
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let text = if args.file.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut buf)
            .context("Could not read stdin")?;
        buf
    } else {
        fs::read_to_string(&args.file)
            .with_context(|| format!("Could not read {}", args.file.display()))?
    };
    let maze = Maze::parse(&text).context("Could not parse maze")?;
    let start = maze.start().context("Maze has no start `S`")?;
    let end = maze.end().context("Maze has no end `E`")?;

    let path = pathfinder::search(&maze, start, end)?;
    if path.is_empty() {
        println!("No path found from {start} to {end}.");
        return Ok(());
    }

    if args.show_path {
        println!("{}", maze.render_path(&path));
    }
    println!("The shortest path is {} steps.", path.len() - 1);
    println!("{}", path.iter().join(" "));
    Ok(())
}
