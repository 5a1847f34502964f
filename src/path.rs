use core::fmt;

use fxhash::FxHashMap;
use grid_util::point::Point;
use itertools::Itertools;

use crate::pathing_grid::PathingGrid;

/// Walks parent links from a cell back to the cell that has no parent. Parents are looked up by
/// the grid's cell index. The walk is lazy and can be consumed once.
pub struct PathWalk<'a> {
    grid: &'a PathingGrid,
    came_from: &'a FxHashMap<usize, Point>,
    next: Option<Point>,
}

impl<'a> PathWalk<'a> {
    pub fn new(
        grid: &'a PathingGrid,
        came_from: &'a FxHashMap<usize, Point>,
        end: Point,
    ) -> PathWalk<'a> {
        PathWalk {
            grid,
            came_from,
            next: Some(end),
        }
    }
}

impl<'a> Iterator for PathWalk<'a> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let current = self.next?;
        self.next = self
            .grid
            .index_of(&current)
            .and_then(|ix| self.came_from.get(&ix).copied());
        Some(current)
    }
}

/// A path found by the search, ordered from start to end with both included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    cells: Vec<Point>,
}

impl Path {
    pub(crate) fn new(cells: Vec<Point>) -> Path {
        Path { cells }
    }
    pub fn cells(&self) -> &[Point] {
        &self.cells
    }
    pub fn into_cells(self) -> Vec<Point> {
        self.cells
    }
    /// Number of cells on the path.
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    /// Number of moves, which is also the cost of the path.
    pub fn edge_count(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }
    pub fn start(&self) -> Option<Point> {
        self.cells.first().copied()
    }
    pub fn end(&self) -> Option<Point> {
        self.cells.last().copied()
    }
    /// Checks that every cell is open and that consecutive cells are 4-adjacent.
    pub fn is_contiguous(&self, grid: &PathingGrid) -> bool {
        self.cells.iter().all(|p| grid.can_move_to(p))
            && self
                .cells
                .iter()
                .tuple_windows()
                .all(|(a, b)| (a.x - b.x).abs() + (a.y - b.y).abs() == 1)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.cells.iter().join(" -> "))
    }
}
