use core::fmt;
use core::str::FromStr;

use grid_util::grid::{BoolGrid, ValueGrid};
use grid_util::point::Point;
use log::{debug, warn};
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

use crate::astar::SearchResult;
use crate::config::GridConfig;
use crate::display::{CellState, Observer};
use crate::error::{GridParseError, SearchError};

/// [PathingGrid] is the finalized grid the editor hands to the search. Cells are addressed by
/// [Point]s with `x` as the row and `y` as the column, so the [BoolGrid] is `rows` wide and
/// `cols` high. It stores only what affects traversal: which cells are walls ([true]) and which
/// cells are designated start and end. Connected components are maintained in a [UnionFind]
/// structure for cheap reachability queries. Implements [ValueGrid] by building on [BoolGrid].
#[derive(Clone, Debug)]
pub struct PathingGrid {
    pub grid: BoolGrid,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
    cell_size: u32,
    start: Option<Point>,
    end: Option<Point>,
}

impl Default for PathingGrid {
    fn default() -> PathingGrid {
        PathingGrid::from_config(GridConfig::default())
    }
}

impl PathingGrid {
    /// Creates a square grid of `config.rows` rows and columns.
    pub fn from_config(config: GridConfig) -> PathingGrid {
        let mut grid = PathingGrid::new(config.rows, config.rows, false);
        grid.cell_size = config.cell_size();
        grid
    }

    pub fn rows(&self) -> usize {
        self.grid.width()
    }
    pub fn cols(&self) -> usize {
        self.grid.height()
    }
    /// Side length of a cell in pixels; only meaningful for grids built from a [GridConfig].
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }
    pub fn start(&self) -> Option<Point> {
        self.start
    }
    pub fn end(&self) -> Option<Point> {
        self.end
    }

    /// Index of a cell in the underlying grid, [None] if it lies outside the grid.
    pub fn index_of(&self, p: &Point) -> Option<usize> {
        if self.grid.point_in_bounds(*p) {
            Some(self.grid.get_ix_point(p))
        } else {
            None
        }
    }

    /// Out of bounds cells count as walls.
    pub fn is_wall(&self, p: &Point) -> bool {
        !self.grid.point_in_bounds(*p) || self.grid.get_point(*p)
    }

    pub fn can_move_to(&self, p: &Point) -> bool {
        !self.is_wall(p)
    }

    /// Traversal-relevant state of a cell. Out of bounds cells are reported as walls.
    pub fn state(&self, p: &Point) -> CellState {
        if self.is_wall(p) {
            CellState::Wall
        } else if self.start == Some(*p) {
            CellState::Start
        } else if self.end == Some(*p) {
            CellState::End
        } else {
            CellState::Open
        }
    }

    /// The traversable 4-neighbours of a cell in the order Down, Up, Right, Left. The order
    /// decides which of several equally good cells the search expands first, so it is fixed.
    /// Computed from the current walls on every call; empty for cells outside the grid.
    pub fn neighbors_of(&self, p: &Point) -> SmallVec<[Point; 4]> {
        if !self.grid.point_in_bounds(*p) {
            return SmallVec::new();
        }
        [
            Point::new(p.x + 1, p.y),
            Point::new(p.x - 1, p.y),
            Point::new(p.x, p.y + 1),
            Point::new(p.x, p.y - 1),
        ]
        .into_iter()
        .filter(|n| self.can_move_to(n))
        .collect()
    }

    fn checked_index(&self, p: &Point, action: &str) -> Option<usize> {
        let ix = self.index_of(p);
        if ix.is_none() {
            warn!(
                "Ignoring {} on {} outside the {}x{} grid",
                action,
                p,
                self.rows(),
                self.cols()
            );
        }
        ix
    }

    /// Opens a cell and joins it to the components of its open neighbours.
    fn unblock(&mut self, p: Point, ix: usize) {
        self.grid.set_point(p, false);
        for n in self.neighbors_of(&p) {
            let n_ix = self.grid.get_ix_point(&n);
            self.components.union(ix, n_ix);
        }
    }

    /// Turns a cell into a wall. A start or end designation on that cell is dropped. Blocking
    /// may split a component, so the components are flagged as dirty and [update](Self::update)
    /// has to be called before querying reachability again.
    pub fn mark_wall(&mut self, p: Point) {
        if self.checked_index(&p, "wall").is_none() {
            return;
        }
        if self.start == Some(p) {
            self.start = None;
        }
        if self.end == Some(p) {
            self.end = None;
        }
        if !self.grid.get_point(p) {
            self.grid.set_point(p, true);
            self.components_dirty = true;
        }
    }

    /// Designates the start cell, replacing any previous start.
    pub fn mark_start(&mut self, p: Point) {
        let Some(ix) = self.checked_index(&p, "start") else {
            return;
        };
        self.unblock(p, ix);
        if self.end == Some(p) {
            self.end = None;
        }
        self.start = Some(p);
    }

    /// Designates the end cell, replacing any previous end.
    pub fn mark_end(&mut self, p: Point) {
        let Some(ix) = self.checked_index(&p, "end") else {
            return;
        };
        self.unblock(p, ix);
        if self.start == Some(p) {
            self.start = None;
        }
        self.end = Some(p);
    }

    /// Resets a cell to an open cell without designation.
    pub fn mark_open(&mut self, p: Point) {
        let Some(ix) = self.checked_index(&p, "reset") else {
            return;
        };
        self.unblock(p, ix);
        if self.start == Some(p) {
            self.start = None;
        }
        if self.end == Some(p) {
            self.end = None;
        }
    }

    /// Resets every cell to open and drops the start and end designations.
    pub fn clear(&mut self) {
        self.grid = BoolGrid::new(self.rows(), self.cols(), false);
        self.start = None;
        self.end = None;
        self.generate_components();
    }

    /// Runs A* between the designated start and end cells.
    pub fn search<O: Observer + ?Sized>(
        &self,
        observer: &mut O,
    ) -> Result<SearchResult, SearchError> {
        let start = self.start.ok_or(SearchError::StartMissing)?;
        let end = self.end.ok_or(SearchError::EndMissing)?;
        crate::run_search(self, start, end, observer)
    }

    /// Retrieves the component id a given [Point] belongs to.
    pub fn get_component(&self, point: &Point) -> Option<usize> {
        self.index_of(point).map(|ix| self.components.find(ix))
    }

    /// Checks if start and goal are on the same component.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        !self.unreachable(start, goal)
    }

    /// Checks if start and goal are not on the same component. Walls and out of bounds cells are
    /// unreachable from everywhere. The components must be up to date, see
    /// [update](Self::update).
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        debug_assert!(
            !self.components_dirty,
            "components are dirty, call update() first"
        );
        if self.is_wall(start) || self.is_wall(goal) {
            return true;
        }
        let start_ix = self.grid.get_ix_point(start);
        let goal_ix = self.grid.get_ix_point(goal);
        !self.components.equiv(start_ix, goal_ix)
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            // The components are dirty, regenerate them
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up open 4-neighbours to the same components.
    pub fn generate_components(&mut self) {
        let w = self.grid.width();
        let h = self.grid.height();
        debug!("Generating connected components of {}x{} grid", w, h);
        self.components = UnionFind::new(w * h);
        self.components_dirty = false;
        for x in 0..w as i32 {
            for y in 0..h as i32 {
                let point = Point::new(x, y);
                if self.grid.get_point(point) {
                    continue;
                }
                let parent_ix = self.grid.get_ix_point(&point);
                // Linking downwards and rightwards covers every edge once
                for n in [Point::new(x + 1, y), Point::new(x, y + 1)] {
                    if self.can_move_to(&n) {
                        let ix = self.grid.get_ix_point(&n);
                        self.components.union(parent_ix, ix);
                    }
                }
            }
        }
    }
}

impl fmt::Display for PathingGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..self.rows() as i32 {
            let line: String = (0..self.cols() as i32)
                .map(|col| self.state(&Point::new(row, col)).glyph())
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl ValueGrid<bool> for PathingGrid {
    /// Creates a `width` by `height` grid in which every cell is a wall if `default_value` is
    /// [true] and open otherwise. Components are generated right away.
    fn new(width: usize, height: usize, default_value: bool) -> Self {
        let mut base_grid = PathingGrid {
            grid: BoolGrid::new(width, height, default_value),
            components: UnionFind::new(width * height),
            components_dirty: false,
            cell_size: 0,
            start: None,
            end: None,
        };
        base_grid.generate_components();
        base_grid
    }
    fn get(&self, x: i32, y: i32) -> bool {
        self.grid.get(x, y)
    }
    /// Blocking goes through [mark_wall](PathingGrid::mark_wall); unblocking opens the cell and
    /// joins components but keeps any start or end designation.
    fn set(&mut self, x: i32, y: i32, blocked: bool) {
        let p = Point::new(x, y);
        if blocked {
            self.mark_wall(p);
        } else if let Some(ix) = self.checked_index(&p, "unblock") {
            self.unblock(p, ix);
        }
    }
    fn width(&self) -> usize {
        self.grid.width()
    }
    fn height(&self) -> usize {
        self.grid.height()
    }
}

/// Parses one row per line using `.` for open cells, `#` for walls, `S` for the start and `E`
/// for the end. Surrounding whitespace and blank lines are ignored.
impl FromStr for PathingGrid {
    type Err = GridParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let cols = lines.first().ok_or(GridParseError::Empty)?.chars().count();
        let mut grid = PathingGrid::new(lines.len(), cols, false);
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(GridParseError::RaggedRow {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let p = Point::new(row as i32, col as i32);
                match glyph {
                    '.' => {}
                    '#' => grid.mark_wall(p),
                    'S' if grid.start.is_some() => return Err(GridParseError::DuplicateStart),
                    'S' => grid.mark_start(p),
                    'E' if grid.end.is_some() => return Err(GridParseError::DuplicateEnd),
                    'E' => grid.mark_end(p),
                    glyph => return Err(GridParseError::UnknownGlyph { glyph, row, col }),
                }
            }
        }
        grid.update();
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_open() {
        let grid = PathingGrid::from_config(GridConfig::new(4, 100));
        assert_eq!((grid.rows(), grid.cols()), (4, 4));
        assert_eq!(grid.cell_size(), 25);
        assert!(grid.start().is_none() && grid.end().is_none());
        for x in 0..4 {
            for y in 0..4 {
                assert_eq!(grid.state(&Point::new(x, y)), CellState::Open);
            }
        }
    }

    #[test]
    fn index_is_checked() {
        let grid = PathingGrid::new(3, 5, false);
        assert_eq!((grid.rows(), grid.cols()), (3, 5));
        let a = grid.index_of(&Point::new(2, 3));
        let b = grid.index_of(&Point::new(1, 4));
        assert!(a.is_some() && b.is_some());
        assert_ne!(a, b);
        assert_eq!(grid.index_of(&Point::new(3, 0)), None);
        assert_eq!(grid.index_of(&Point::new(0, -1)), None);
        assert_eq!(grid.get_component(&Point::new(0, 5)), None);
    }

    #[test]
    fn value_grid_access() {
        let mut grid = PathingGrid::new(2, 3, false);
        assert_eq!((grid.width(), grid.height()), (2, 3));
        grid.mark_start(Point::new(0, 0));
        grid.set(1, 2, true);
        assert!(grid.get(1, 2));
        assert!(grid.is_wall(&Point::new(1, 2)));
        assert!(grid.components_dirty);
        grid.update();
        // Unblocking through the trait keeps designations and joins components
        grid.set(1, 2, false);
        assert!(!grid.get(1, 2));
        assert_eq!(grid.start(), Some(Point::new(0, 0)));
        assert!(grid.reachable(&Point::new(0, 0), &Point::new(1, 2)));

        let walled = PathingGrid::new(2, 2, true);
        assert_eq!(walled.to_string(), "##\n##\n");
        assert!(walled.unreachable(&Point::new(0, 0), &Point::new(1, 1)));
    }

    #[test]
    fn fresh_and_cleared_grids_are_connected() {
        let mut grid = crate::create_grid(5, 100);
        let corner = Point::new(0, 0);
        let opposite = Point::new(4, 4);
        assert!(!grid.components_dirty);
        assert!(grid.reachable(&corner, &opposite));

        for col in 0..5 {
            grid.mark_wall(Point::new(2, col));
        }
        grid.update();
        assert!(grid.unreachable(&corner, &opposite));
        grid.clear();
        assert!(!grid.components_dirty);
        assert!(grid.reachable(&corner, &opposite));
    }

    #[test]
    fn neighbours_outside_the_grid_are_empty() {
        let grid = PathingGrid::new(3, 3, false);
        assert!(grid.neighbors_of(&Point::new(i32::MAX, i32::MIN)).is_empty());
        assert!(grid.neighbors_of(&Point::new(i32::MIN, 0)).is_empty());
        assert!(grid.neighbors_of(&Point::new(-1, 0)).is_empty());
    }

    /// Neighbours come in the order Down, Up, Right, Left.
    #[test]
    fn neighbour_order() {
        let grid = PathingGrid::new(3, 3, false);
        let neighbours = grid.neighbors_of(&Point::new(1, 1));
        assert_eq!(
            neighbours.as_slice(),
            &[
                Point::new(2, 1),
                Point::new(0, 1),
                Point::new(1, 2),
                Point::new(1, 0)
            ]
        );
        let corner = grid.neighbors_of(&Point::new(0, 0));
        assert_eq!(corner.as_slice(), &[Point::new(1, 0), Point::new(0, 1)]);
    }

    #[test]
    fn neighbours_skip_walls_and_reflect_edits() {
        let mut grid = PathingGrid::new(3, 3, false);
        let center = Point::new(1, 1);
        grid.mark_wall(Point::new(2, 1));
        grid.mark_wall(Point::new(1, 0));
        let first = grid.neighbors_of(&center);
        assert_eq!(first.as_slice(), &[Point::new(0, 1), Point::new(1, 2)]);
        assert_eq!(first, grid.neighbors_of(&center));
        grid.mark_open(Point::new(2, 1));
        assert_eq!(grid.neighbors_of(&center).len(), 3);
    }

    #[test]
    fn designations_are_exclusive() {
        let mut grid = PathingGrid::new(2, 2, false);
        let a = Point::new(0, 0);
        let b = Point::new(1, 1);
        grid.mark_wall(a);
        grid.mark_start(a);
        assert!(!grid.is_wall(&a));
        assert_eq!(grid.state(&a), CellState::Start);
        // Moving the start leaves only one start
        grid.mark_start(b);
        assert_eq!(grid.state(&a), CellState::Open);
        assert_eq!(grid.start(), Some(b));
        // Designating the start as end takes the designation away from start
        grid.mark_end(b);
        assert_eq!(grid.start(), None);
        assert_eq!(grid.end(), Some(b));
        grid.mark_wall(b);
        assert_eq!(grid.end(), None);
        assert_eq!(grid.state(&b), CellState::Wall);
        // Idempotent
        grid.mark_wall(b);
        assert_eq!(grid.state(&b), CellState::Wall);
    }

    #[test]
    fn out_of_bounds_edits_are_ignored() {
        let mut grid = PathingGrid::new(2, 2, false);
        grid.mark_wall(Point::new(5, 5));
        grid.mark_start(Point::new(-1, 0));
        assert!(grid.start().is_none());
        assert_eq!(grid.to_string(), "..\n..\n");
    }

    #[test]
    fn clear_resets_everything() {
        let mut grid: PathingGrid = "S#\n#E".parse().unwrap();
        grid.clear();
        assert_eq!(grid.to_string(), "..\n..\n");
        assert!(grid.start().is_none() && grid.end().is_none());
    }

    #[test]
    fn parse_and_display() {
        let text = "S.#\n.#E\n...\n";
        let grid: PathingGrid = text.parse().unwrap();
        assert_eq!(grid.start(), Some(Point::new(0, 0)));
        assert_eq!(grid.end(), Some(Point::new(1, 2)));
        assert!(grid.is_wall(&Point::new(0, 2)));
        assert_eq!(grid.to_string(), text);
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<PathingGrid>().unwrap_err(), GridParseError::Empty);
        assert_eq!(
            "...\n..".parse::<PathingGrid>().unwrap_err(),
            GridParseError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
        assert_eq!(
            "S.S".parse::<PathingGrid>().unwrap_err(),
            GridParseError::DuplicateStart
        );
        assert_eq!(
            "E.E".parse::<PathingGrid>().unwrap_err(),
            GridParseError::DuplicateEnd
        );
        assert_eq!(
            ".?".parse::<PathingGrid>().unwrap_err(),
            GridParseError::UnknownGlyph {
                glyph: '?',
                row: 0,
                col: 1
            }
        );
    }

    /// Tests whether points are correctly mapped to different connected components
    #[test]
    fn component_generation() {
        // |S#.|
        // |.#.|
        // |.#E|
        let mut grid: PathingGrid = "S#.\n.#.\n.#E".parse().unwrap();
        let start = Point::new(0, 0);
        let end = Point::new(2, 2);
        assert!(grid.unreachable(&start, &end));
        assert!(grid.reachable(&start, &Point::new(2, 0)));
        assert!(grid.unreachable(&start, &Point::new(0, 1)));
        assert_eq!(
            grid.get_component(&end),
            grid.get_component(&Point::new(0, 2))
        );

        // Opening a gap joins the components without regeneration
        grid.mark_open(Point::new(1, 1));
        assert!(!grid.components_dirty);
        assert!(grid.reachable(&start, &end));

        // Closing it again requires regeneration
        grid.mark_wall(Point::new(1, 1));
        assert!(grid.components_dirty);
        grid.update();
        assert!(grid.unreachable(&start, &end));
    }

    #[test]
    fn search_requires_designations() {
        let mut grid = PathingGrid::new(2, 2, false);
        assert!(matches!(grid.search(&mut ()), Err(SearchError::StartMissing)));
        grid.mark_start(Point::new(0, 0));
        assert!(matches!(grid.search(&mut ()), Err(SearchError::EndMissing)));
        grid.mark_end(Point::new(1, 1));
        assert!(matches!(grid.search(&mut ()), Ok(SearchResult::Found(_))));
    }
}
