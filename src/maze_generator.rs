//! Maze generation

use log::{debug, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{pathfinder, Cell, Error, Grid, Maze, Point};

/// Placement of the start and end cells
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum Layout {
    /// Start anywhere, end at the cell diametrically opposite
    #[default]
    Reflected,
    /// Start in a random corner, end in the opposite corner
    Corners,
}

/// Perfect maze generator.
///
/// Owns the grid and a single seeded random source, so a generator built
/// with the same seed and dimensions always carves the same maze.
pub struct MazeGenerator {
    random: StdRng,
    seed: u64,
    layout: Layout,
    maze: Maze,
}

impl MazeGenerator {
    /// Carving restarts from a new cell at most this many times when the
    /// end ends up walled in.
    const MAX_ATTEMPTS: usize = 16;

    /// Generator for a `rows` × `cols` grid, filled with walls.
    ///
    /// Without a `seed`, one is drawn at random; [`Self::seed`] reports it
    /// so that the run can be reproduced.
    pub fn new(rows: usize, cols: usize, seed: Option<u64>) -> Result<Self, Error> {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        Ok(Self {
            random: StdRng::seed_from_u64(seed),
            seed,
            layout: Layout::default(),
            maze: Maze::filled(rows, cols, Cell::Wall)?,
        })
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Whether `(row, col)` is an open cell. False outside the grid.
    pub fn is_walkable(&self, row: usize, col: usize) -> bool {
        self.maze.is_walkable(Point::new(row, col))
    }

    /// Start of the maze. Fails with [`Error::NotGenerated`] before [`Self::generate`].
    pub fn start(&self) -> Result<Point, Error> {
        self.maze.start().ok_or(Error::NotGenerated)
    }

    /// End of the maze. Fails with [`Error::NotGenerated`] before [`Self::generate`].
    pub fn end(&self) -> Result<Point, Error> {
        self.maze.end().ok_or(Error::NotGenerated)
    }

    /// Shortest path from start to end, both included
    pub fn solve(&self) -> Result<Vec<Point>, Error> {
        pathfinder::search(&self.maze, self.start()?, self.end()?)
    }

    /// Carve a new perfect maze, replacing the current grid.
    ///
    /// Open cells form a tree grown from the start. If the end cell cannot
    /// be joined to that tree, carving starts over from a different cell;
    /// after [`Self::MAX_ATTEMPTS`] the end is opened regardless.
    pub fn generate(&mut self) {
        let (rows, cols) = (self.maze.rows(), self.maze.cols());

        let mut attempt = 1;
        let (start, end) = loop {
            self.maze.fill(Cell::Wall);
            let start = self.pick_start();
            let end = start.reflect(rows, cols);
            let opened = self.carve(start, end);
            debug!("attempt {attempt}: opened {opened} cells, {start} -> {end}");

            if self.settle_end(end, attempt) {
                break (start, end);
            }
            attempt += 1;
        };
        self.maze.mark(start, end);
    }

    /// Whether carving can stop after `attempt`.
    ///
    /// The end is walled in only when every neighbour of it is a wall that
    /// borders two open cells, so retries almost never run out. When they do,
    /// the end is opened anyway: it must be open, even if that costs the
    /// tree property.
    fn settle_end(&mut self, end: Point, attempt: usize) -> bool {
        if self.maze.is_walkable(end) {
            return true;
        }
        if attempt >= Self::MAX_ATTEMPTS {
            warn!("end {end} still walled in after {attempt} attempts, opening it");
            self.maze.open(end);
            return true;
        }
        debug!("attempt {attempt}: end {end} walled in, starting over");
        false
    }

    fn pick_start(&mut self) -> Point {
        let (rows, cols) = (self.maze.rows(), self.maze.cols());
        match self.layout {
            Layout::Reflected => Point::new(
                self.random.gen_range(0..rows),
                self.random.gen_range(0..cols),
            ),
            Layout::Corners => Point::new(
                if self.random.gen_bool(0.5) { 0 } else { rows - 1 },
                if self.random.gen_bool(0.5) { 0 } else { cols - 1 },
            ),
        }
    }

    /// Grow the open region from `start` until the wall frontier runs dry.
    ///
    /// Frontier walls are drawn uniformly at random and opened only when they
    /// touch exactly one open cell. `end` skips the draw: it is opened as soon
    /// as it borders the region. Returns the number of cells opened.
    fn carve(&mut self, start: Point, end: Point) -> usize {
        let mut frontier = Vec::new();
        let mut end_pending = self.open_cell(start, end, &mut frontier);
        let mut opened = 1;

        loop {
            let candidate = if std::mem::take(&mut end_pending) {
                end
            } else if frontier.is_empty() {
                break;
            } else {
                let idx = self.random.gen_range(0..frontier.len());
                frontier.swap_remove(idx)
            };

            if self.is_valid_wall(candidate) {
                end_pending = self.open_cell(candidate, end, &mut frontier);
                opened += 1;
            }
        }
        opened
    }

    /// Open `cell` and push its wall neighbours onto the frontier.
    ///
    /// `end` is never pushed; returns whether it was one of the neighbours.
    fn open_cell(&mut self, cell: Point, end: Point, frontier: &mut Vec<Point>) -> bool {
        self.maze.open(cell);

        let mut borders_end = false;
        for next in cell.neighbors(self.maze.rows(), self.maze.cols()) {
            if self.maze.is_walkable(next) {
                continue;
            }
            if next == end {
                borders_end = true;
            } else {
                frontier.push(next);
            }
        }
        borders_end
    }

    /// A wall may be opened only if exactly one of its neighbours is open
    fn is_valid_wall(&self, point: Point) -> bool {
        !self.maze.is_walkable(point)
            && point
                .neighbors(self.maze.rows(), self.maze.cols())
                .filter(|&n| self.maze.is_walkable(n))
                .count()
                == 1
    }
}
