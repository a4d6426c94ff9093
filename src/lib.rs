//! Carve a random perfect maze and find the shortest way through it
//!
//! Mazes are grown with a randomized variant of Prim's algorithm: starting
//! from one open cell, walls bordering the open region are opened one at a
//! time, but only when they touch exactly one open cell. The open cells thus
//! always form a tree. The shortest route between two cells is then found
//! with A* under the Manhattan-distance heuristic.
//!
//! # Examples
//! ## Generate and solve
//! ```
//! use prim_maze::MazeGenerator;
//!
//! let mut generator = MazeGenerator::new(15, 31, Some(7)).unwrap();
//! generator.generate();
//!
//! let path = generator.solve().unwrap();
//! assert_eq!(path.first(), Some(&generator.start().unwrap()));
//! assert_eq!(path.last(), Some(&generator.end().unwrap()));
//! println!("{}", generator.maze().render_path(&path));
//! ```
//!
//! ## Solve a hand-drawn maze
//! ```
//! use prim_maze::{pathfinder, Maze};
//!
//! let maze = Maze::parse(concat!(
//!     "S  #\n",
//!     "## #\n",
//!     "E   ",
//! ))
//! .unwrap();
//! let path = pathfinder::search(&maze, maze.start().unwrap(), maze.end().unwrap()).unwrap();
//! assert_eq!(path.len(), 7);
//! ```

use std::fmt;

use itertools::Itertools;

mod error;
pub mod maze_generator;
pub mod pathfinder;

pub use error::Error;
pub use maze_generator::{Layout, MazeGenerator};

/// Location in the maze
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Number of orthogonal steps between two points, ignoring walls
    pub fn manhattan(self, other: Point) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Orthogonal neighbours inside a `rows` × `cols` grid.
    ///
    /// Yielded in the order up, down, left, right.
    pub fn neighbors(self, rows: usize, cols: usize) -> impl Iterator<Item = Point> {
        let Point { row, col } = self;
        [
            row.checked_sub(1).map(|r| Point::new(r, col)),
            Some(Point::new(row + 1, col)),
            col.checked_sub(1).map(|c| Point::new(row, c)),
            Some(Point::new(row, col + 1)),
        ]
        .into_iter()
        .flatten()
        .filter(move |p| p.row < rows && p.col < cols)
    }

    /// The cell diametrically opposite in a `rows` × `cols` grid
    pub fn reflect(self, rows: usize, cols: usize) -> Point {
        Point::new(rows - 1 - self.row, cols - 1 - self.col)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// State of a single grid cell
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Cell {
    Wall,
    Open,
}

/// Read-only walkability view of a rectangular grid.
///
/// This is all the pathfinder needs, so any caller-owned grid can be searched.
pub trait Grid {
    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    /// Whether `point` can be stepped on. Out-of-bounds points never can.
    fn is_walkable(&self, point: Point) -> bool;

    fn contains(&self, point: Point) -> bool {
        point.row < self.rows() && point.col < self.cols()
    }
}

/// Rectangular grid of walls and open cells, with optional start and end
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    rows: usize,
    cols: usize,
    /// Row-major cell states
    cells: Vec<Cell>,
    start: Option<Point>,
    end: Option<Point>,
}

impl Maze {
    const S_WALL: char = '#';
    const S_OPEN: char = ' ';
    const S_PATH: char = '.';
    const S_START: char = 'S';
    const S_END: char = 'E';

    /// Grid of `rows` × `cols` cells, all set to `cell`.
    ///
    /// Both dimensions must be positive and the cell count must fit in a
    /// single allocation.
    pub fn filled(rows: usize, cols: usize, cell: Cell) -> Result<Self, Error> {
        let len = rows
            .checked_mul(cols)
            .filter(|&len| len > 0 && len <= isize::MAX as usize)
            .ok_or(Error::InvalidDimensions { rows, cols })?;
        Ok(Self {
            rows,
            cols,
            cells: vec![cell; len],
            start: None,
            end: None,
        })
    }

    /// Parse maze from its text representation.
    ///
    /// `#` is a wall, a space or `.` is open, `S` and `E` are open cells
    /// marking the start and the end. All rows must have the same length,
    /// and each marker may appear at most once.
    ///
    /// # Examples
    /// ```
    /// use prim_maze::{Grid, Maze, Point};
    ///
    /// let maze = Maze::parse("S #\n# E").unwrap();
    /// assert_eq!((maze.rows(), maze.cols()), (2, 3));
    /// assert_eq!(maze.start(), Some(Point::new(0, 0)));
    /// assert!(!maze.is_walkable(Point::new(0, 2)));
    /// ```
    pub fn parse(text: &str) -> Result<Self, Error> {
        let lines: Vec<&str> = text.lines().collect();
        let cols = lines.first().map_or(0, |line| line.chars().count());
        let mut maze = Self::filled(lines.len(), cols, Cell::Wall)?;

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(Error::RaggedRow {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let point = Point::new(row, col);
                let cell = match symbol {
                    Self::S_WALL => Cell::Wall,
                    Self::S_OPEN | Self::S_PATH => Cell::Open,
                    Self::S_START | Self::S_END => {
                        let marker = if symbol == Self::S_START {
                            &mut maze.start
                        } else {
                            &mut maze.end
                        };
                        if marker.replace(point).is_some() {
                            return Err(Error::DuplicateMarker { symbol, row, col });
                        }
                        Cell::Open
                    }
                    symbol => return Err(Error::UnexpectedSymbol { symbol, row, col }),
                };
                maze.cells[row * cols + col] = cell;
            }
        }
        Ok(maze)
    }

    fn index(&self, point: Point) -> Result<usize, Error> {
        if self.contains(point) {
            Ok(point.row * self.cols + point.col)
        } else {
            Err(Error::OutOfBounds {
                point,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn cell(&self, point: Point) -> Result<Cell, Error> {
        Ok(self.cells[self.index(point)?])
    }

    pub fn set(&mut self, point: Point, cell: Cell) -> Result<(), Error> {
        let idx = self.index(point)?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Number of open cells
    pub fn open_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Open).count()
    }

    pub fn start(&self) -> Option<Point> {
        self.start
    }

    pub fn end(&self) -> Option<Point> {
        self.end
    }

    pub(crate) fn mark(&mut self, start: Point, end: Point) {
        self.start = Some(start);
        self.end = Some(end);
    }

    /// Reset every cell to `cell` and drop the markers
    pub(crate) fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
        self.start = None;
        self.end = None;
    }

    /// Open `point`, if it lies inside the grid
    pub(crate) fn open(&mut self, point: Point) {
        if let Ok(idx) = self.index(point) {
            self.cells[idx] = Cell::Open;
        }
    }

    /// Text representation with `path` drawn over the open cells.
    ///
    /// Start and end markers take precedence over path glyphs. Points outside
    /// the grid are ignored.
    pub fn render_path(&self, path: &[Point]) -> String {
        let mut symbols: Vec<char> = self
            .cells
            .iter()
            .map(|cell| match cell {
                Cell::Wall => Self::S_WALL,
                Cell::Open => Self::S_OPEN,
            })
            .collect();

        for idx in path.iter().filter_map(|&p| self.index(p).ok()) {
            symbols[idx] = Self::S_PATH;
        }
        for (marker, symbol) in [(self.start, Self::S_START), (self.end, Self::S_END)] {
            if let Some(idx) = marker.and_then(|p| self.index(p).ok()) {
                symbols[idx] = symbol;
            }
        }

        symbols
            .chunks(self.cols)
            .map(|row| row.iter().join(""))
            .join("\n")
    }
}

impl Grid for Maze {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn is_walkable(&self, point: Point) -> bool {
        matches!(self.cell(point), Ok(Cell::Open))
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_path(&[]))
    }
}
