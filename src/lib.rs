//! # grid_astar
//!
//! Shortest paths on a uniform 4-connected grid with walls, found with
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) using the
//! [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry) as heuristic and unit
//! edge costs. The search is deterministic: cells with equal estimates are expanded in the order
//! they were discovered, and neighbours are discovered in the order Down, Up, Right, Left.
//!
//! Every change of a cell's display state (frontier, visited, path) is reported to an
//! [Observer] as it happens, so an editor can animate the search without the search ever
//! writing to the grid.
//!
//! ```
//! use grid_astar::{run_search, EventLog, PathingGrid};
//! use grid_util::grid::ValueGrid;
//! use grid_util::point::Point;
//!
//! let mut grid = PathingGrid::new(3, 3, false);
//! grid.mark_wall(Point::new(1, 1));
//! let mut log = EventLog::new();
//! let result = run_search(&grid, Point::new(0, 0), Point::new(2, 2), &mut log).unwrap();
//! let path = result.into_path().unwrap();
//! assert_eq!(path.edge_count(), 4);
//! ```
pub mod astar;
pub mod cancel;
pub mod config;
pub mod display;
pub mod error;
pub mod heuristic;
pub mod path;
pub mod pathing_grid;

use grid_util::point::Point;

pub use crate::astar::{AstarSearch, SearchReport, SearchResult, SearchStats};
pub use crate::cancel::CancellationToken;
pub use crate::config::GridConfig;
pub use crate::display::{from_fn, CellState, DisplayLayer, EventLog, Observer, VisualEvent};
pub use crate::error::{GridParseError, ObserverError, SearchError};
pub use crate::heuristic::manhattan_distance;
pub use crate::path::Path;
pub use crate::pathing_grid::PathingGrid;

/// Cost of a path in moves.
pub type Cost = u32;

/// Creates a square grid of `rows × rows` open cells for a drawing surface `pixel_width`
/// pixels wide.
pub fn create_grid(rows: usize, pixel_width: u32) -> PathingGrid {
    PathingGrid::from_config(GridConfig::new(rows, pixel_width))
}

/// Searches a shortest path from `start` to `end`, reporting display changes to `observer`.
/// Precondition violations and observer failures are errors; an unreachable end is
/// [SearchResult::NotFound].
pub fn run_search<O: Observer + ?Sized>(
    grid: &PathingGrid,
    start: Point,
    end: Point,
    observer: &mut O,
) -> Result<SearchResult, SearchError> {
    AstarSearch::new(grid, start, end)?
        .run(observer)
        .map(|report| report.result)
}
