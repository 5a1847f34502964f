use grid_util::point::Point;

use crate::Cost;

/// [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry) between two cells, the
/// exact cost of an unobstructed path on a 4-connected unit-cost grid. It is therefore admissible
/// and consistent, which A* relies on to return shortest paths.
pub fn manhattan_distance(p1: &Point, p2: &Point) -> Cost {
    (p1.x - p2.x).unsigned_abs() + (p1.y - p2.y).unsigned_abs()
}
