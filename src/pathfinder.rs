//! A* shortest-path search
//!
//! Movement is 4-directional with unit cost, guided by the Manhattan distance
//! to the end. Every call allocates its own node arena, so any number of
//! searches may run over the same grid at once.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use log::{debug, trace};

use crate::{Error, Grid, Point};

/// Shortest walkable path from `start` to `end`, both included.
///
/// Returns an empty path when either endpoint is a wall or no route exists.
/// Endpoints outside the grid are rejected with [`Error::OutOfBounds`].
///
/// # Examples
/// ```
/// use prim_maze::{pathfinder, Cell, Maze, Point};
///
/// let maze = Maze::filled(3, 4, Cell::Open).unwrap();
/// let path = pathfinder::search(&maze, Point::new(0, 0), Point::new(2, 3)).unwrap();
/// assert_eq!(path.len(), 6);
/// ```
pub fn search<G: Grid + ?Sized>(grid: &G, start: Point, end: Point) -> Result<Vec<Point>, Error> {
    for point in [start, end] {
        if !grid.contains(point) {
            return Err(Error::OutOfBounds {
                point,
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }
    }
    if !grid.is_walkable(start) || !grid.is_walkable(end) {
        debug!("{start} -> {end}: endpoint is a wall");
        return Ok(Vec::new());
    }

    let mut search = Search::new(grid, end);
    let path = if search.run(start) {
        search.path_to(end)
    } else {
        Vec::new()
    };
    debug!("{start} -> {end}: path of {} cells", path.len());
    Ok(path)
}

/// Per-cell bookkeeping of one search
#[derive(Clone, Debug, Default)]
struct SearchNode {
    walkable: bool,
    /// Best known cost from the start
    g: Option<usize>,
    /// Estimated remaining cost to the end
    h: usize,
    /// Predecessor on the best known path, as an index into the arena
    parent: Option<usize>,
}

/// Open-set entry; `f = g + h` is the priority
#[derive(PartialEq, Eq, Debug)]
struct Entry {
    idx: usize,
    f: usize,
    g: usize,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on f so the max-heap pops the smallest f first; on ties
        // the deeper node wins, then the lower index.
        other
            .f
            .cmp(&self.f)
            .then(self.g.cmp(&other.g))
            .then(other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Nodes waiting to be expanded.
///
/// A node relaxed while already pending gets a second heap entry; whichever
/// entry is popped first takes it out of `pending`, the other is dropped.
#[derive(Default)]
struct OpenSet {
    heap: BinaryHeap<Entry>,
    pending: HashSet<usize>,
}

impl OpenSet {
    fn push(&mut self, entry: Entry) {
        self.pending.insert(entry.idx);
        self.heap.push(entry);
    }

    /// Most promising pending entry. Its `g` is the node's best cost, since
    /// a later, cheaper entry for the same node sorts ahead of it.
    fn pop(&mut self) -> Option<Entry> {
        while let Some(entry) = self.heap.pop() {
            if self.pending.remove(&entry.idx) {
                return Some(entry);
            }
        }
        None
    }
}

struct Search<'a, G: ?Sized> {
    grid: &'a G,
    end: Point,
    /// One node per cell, row-major
    nodes: Vec<SearchNode>,
    open: OpenSet,
}

impl<'a, G: Grid + ?Sized> Search<'a, G> {
    fn new(grid: &'a G, end: Point) -> Self {
        let nodes = (0..grid.rows())
            .flat_map(|row| (0..grid.cols()).map(move |col| Point::new(row, col)))
            .map(|p| SearchNode {
                walkable: grid.is_walkable(p),
                ..SearchNode::default()
            })
            .collect();
        Self {
            grid,
            end,
            nodes,
            open: OpenSet::default(),
        }
    }

    fn idx(&self, point: Point) -> usize {
        point.row * self.grid.cols() + point.col
    }

    fn point(&self, idx: usize) -> Point {
        Point::new(idx / self.grid.cols(), idx % self.grid.cols())
    }

    /// Expand nodes until the end is popped. Returns whether it was reached.
    fn run(&mut self, start: Point) -> bool {
        let start_idx = self.idx(start);
        let end_idx = self.idx(self.end);
        self.nodes[start_idx].g = Some(0);
        self.nodes[start_idx].h = start.manhattan(self.end);
        self.enqueue(start_idx);

        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let mut expanded = 0;
        while let Some(Entry { idx: ci, g, .. }) = self.open.pop() {
            if ci == end_idx {
                trace!("reached {} after expanding {expanded} nodes", self.end);
                return true;
            }
            expanded += 1;
            let tentative_g = g + 1;

            for np in self.point(ci).neighbors(rows, cols) {
                let ni = self.idx(np);
                let n = &mut self.nodes[ni];
                if !n.walkable || n.g.is_some_and(|g| tentative_g >= g) {
                    continue;
                }
                n.g = Some(tentative_g);
                n.h = np.manhattan(self.end);
                n.parent = Some(ci);
                self.enqueue(ni);
            }
        }
        trace!("open set exhausted after expanding {expanded} nodes");
        false
    }

    /// Queue a node under its current `f = g + h`
    fn enqueue(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        if let Some(g) = node.g {
            let entry = Entry {
                idx,
                f: g + node.h,
                g,
            };
            self.open.push(entry);
        }
    }

    /// Follow predecessor links back from `to`
    fn path_to(&self, to: Point) -> Vec<Point> {
        let mut path = Vec::new();
        let mut next = Some(self.idx(to));
        while let Some(idx) = next {
            path.push(self.point(idx));
            next = self.nodes[idx].parent;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::thread;

    use crate::pathfinder::{search, Entry, OpenSet, Search};
    use crate::{Cell, Error, Grid, Maze, MazeGenerator, Point};

    /// Grid without walls
    struct OpenField {
        rows: usize,
        cols: usize,
    }

    impl Grid for OpenField {
        fn rows(&self) -> usize {
            self.rows
        }

        fn cols(&self) -> usize {
            self.cols
        }

        fn is_walkable(&self, point: Point) -> bool {
            self.contains(point)
        }
    }

    /// Breadth-first distance, for checking optimality
    fn bfs_distance(maze: &Maze, start: Point, end: Point) -> Option<usize> {
        let mut dist = HashMap::from([(start, 0)]);
        let mut queue = VecDeque::from([start]);
        while let Some(p) = queue.pop_front() {
            if p == end {
                return dist.get(&p).copied();
            }
            let d = dist[&p];
            for n in p.neighbors(maze.rows(), maze.cols()) {
                if maze.is_walkable(n) && !dist.contains_key(&n) {
                    dist.insert(n, d + 1);
                    queue.push_back(n);
                }
            }
        }
        None
    }

    fn assert_contiguous(grid: &impl Grid, path: &[Point]) {
        assert!(path.iter().all(|&p| grid.is_walkable(p)));
        assert!(
            path.windows(2).all(|w| w[0].manhattan(w[1]) == 1),
            "path jumps: {path:?}"
        );
    }

    #[test]
    fn open_five_by_five() {
        let maze = Maze::filled(5, 5, Cell::Open).unwrap();
        let (start, end) = (Point::new(0, 0), Point::new(4, 4));

        let mut search = Search::new(&maze, end);
        assert!(search.run(start));
        let path = search.path_to(end);

        assert_eq!(path.len(), 9);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        assert_contiguous(&maze, &path);

        let costs: Vec<_> = path
            .iter()
            .map(|&p| search.nodes[search.idx(p)].g)
            .collect();
        assert_eq!(costs, (0..9usize).map(Some).collect::<Vec<_>>());
        assert_eq!(search.nodes[search.idx(end)].h, 0);
    }

    #[test]
    fn relaxed_node_pops_once_with_its_best_cost() {
        let mut open = OpenSet::default();
        open.push(Entry { idx: 3, f: 10, g: 6 });
        open.push(Entry { idx: 5, f: 9, g: 4 });
        open.push(Entry { idx: 3, f: 8, g: 4 });

        assert_eq!(open.pop(), Some(Entry { idx: 3, f: 8, g: 4 }));
        assert_eq!(open.pop(), Some(Entry { idx: 5, f: 9, g: 4 }));
        assert_eq!(open.pop(), None);
    }

    #[test]
    fn open_field_paths_are_manhattan_optimal() {
        for (rows, cols) in [(1, 1), (1, 8), (8, 1), (6, 11), (30, 20)] {
            let field = OpenField { rows, cols };
            let end = Point::new(rows - 1, cols - 1);
            let path = search(&field, Point::new(0, 0), end).unwrap();

            assert_eq!(path.len(), (rows - 1) + (cols - 1) + 1);
            assert_contiguous(&field, &path);
        }
    }

    #[test]
    fn single_cell_grid() {
        let maze = Maze::filled(1, 1, Cell::Open).unwrap();
        let origin = Point::new(0, 0);
        assert_eq!(search(&maze, origin, origin), Ok(vec![origin]));
    }

    #[test]
    fn walled_off_end_is_not_found() {
        let maze = Maze::parse(concat!(
            "S #.\n",
            "  ##\n",
            "  #E",
        ))
        .unwrap();
        let path = search(&maze, maze.start().unwrap(), maze.end().unwrap()).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn separate_region_is_not_found() {
        let maze = Maze::parse(concat!(
            "S  #   \n",
            "   # E \n",
            "   #   ",
        ))
        .unwrap();
        let path = search(&maze, maze.start().unwrap(), maze.end().unwrap()).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn wall_endpoints_give_empty_path() {
        let maze = Maze::parse("  #\n#  ").unwrap();
        assert_eq!(search(&maze, Point::new(0, 2), Point::new(1, 2)), Ok(vec![]));
        assert_eq!(search(&maze, Point::new(0, 0), Point::new(1, 0)), Ok(vec![]));
    }

    #[test]
    fn out_of_bounds_endpoints_fail() {
        let maze = Maze::filled(3, 3, Cell::Open).unwrap();
        assert_eq!(
            search(&maze, Point::new(3, 0), Point::new(0, 0)),
            Err(Error::OutOfBounds {
                point: Point::new(3, 0),
                rows: 3,
                cols: 3
            })
        );
        assert!(matches!(
            search(&maze, Point::new(0, 0), Point::new(0, 7)),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn shortest_route_wins_in_grids_with_loops() {
        let layouts = [
            concat!(
                "S     #     \n",
                " #### # ### \n",
                " #    #   # \n",
                " # ###### # \n",
                " #        #E\n",
                " ########## ",
            ),
            concat!(
                "S          \n",
                " ######### \n",
                " #       # \n",
                " # ##### # \n",
                "   #   #  E\n",
                " ###   ### ",
            ),
            concat!(
                "    #    \n",
                " ## # ## \n",
                " #  S  # \n",
                " # ### # \n",
                "    E    ",
            ),
        ];
        for text in layouts {
            let maze = Maze::parse(text).unwrap();
            let (start, end) = (maze.start().unwrap(), maze.end().unwrap());
            let path = search(&maze, start, end).unwrap();

            let expected = bfs_distance(&maze, start, end).unwrap();
            assert_eq!(path.len(), expected + 1, "suboptimal path in\n{text}");
            assert_eq!(path.first(), Some(&start));
            assert_eq!(path.last(), Some(&end));
            assert_contiguous(&maze, &path);
        }
    }

    #[test]
    fn grid_is_left_untouched() {
        let maze = Maze::parse("S  \n # \n  E").unwrap();
        let before = maze.clone();
        search(&maze, Point::new(0, 0), Point::new(2, 2)).unwrap();
        assert_eq!(maze, before);
    }

    #[test]
    fn concurrent_searches_share_one_maze() {
        let mut gen = MazeGenerator::new(31, 41, Some(11)).unwrap();
        gen.generate();
        let maze = gen.maze();
        let (start, end) = (gen.start().unwrap(), gen.end().unwrap());
        let expected = search(maze, start, end).unwrap();

        thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| search(maze, start, end)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), Ok(expected.clone()));
            }
        });
    }
}
