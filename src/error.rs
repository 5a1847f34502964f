use grid_util::point::Point;
use thiserror::Error;

/// Error type returned by an [Observer](crate::display::Observer) to abort a running search.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Reasons a search could not be carried out. Failing to find a path is not one of them, see
/// [SearchResult::NotFound](crate::astar::SearchResult::NotFound).
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no start cell has been designated")]
    StartMissing,
    #[error("no end cell has been designated")]
    EndMissing,
    #[error("start {0} lies outside the grid")]
    StartOutOfBounds(Point),
    #[error("end {0} lies outside the grid")]
    EndOutOfBounds(Point),
    #[error("start {0} is a wall")]
    StartIsWall(Point),
    #[error("end {0} is a wall")]
    EndIsWall(Point),
    #[error("start and end are the same cell {0}")]
    StartEqualsEnd(Point),
    #[error("visual event observer failed: {0}")]
    Observer(#[source] ObserverError),
}

impl SearchError {
    /// True for errors detected before the search loop starts.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, SearchError::Observer(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridParseError {
    #[error("grid description contains no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
    #[error("more than one start cell")]
    DuplicateStart,
    #[error("more than one end cell")]
    DuplicateEnd,
}
