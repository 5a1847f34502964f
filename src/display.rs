//! Display side channel of the search. The engine never writes display state into the
//! [PathingGrid]; it reports [VisualEvent]s to an [Observer] supplied by the caller, which is
//! free to render them, record them or ignore them.
use core::fmt;

use grid_util::grid::{SimpleValueGrid, ValueGrid};
use grid_util::point::Point;

use crate::error::ObserverError;
use crate::pathing_grid::PathingGrid;

/// State of a cell as shown to the user. Open, Wall, Start and End follow from the grid itself;
/// Frontier, Visited and Path are only ever produced by the search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    #[default]
    Open,
    Wall,
    Start,
    End,
    Frontier,
    Visited,
    Path,
}

impl CellState {
    /// States that describe search progress rather than the grid.
    pub fn is_display_only(self) -> bool {
        matches!(
            self,
            CellState::Frontier | CellState::Visited | CellState::Path
        )
    }

    /// Wall, Start and End keep their marking for the whole run.
    pub fn is_terminal(self) -> bool {
        matches!(self, CellState::Wall | CellState::Start | CellState::End)
    }

    pub fn glyph(self) -> char {
        match self {
            CellState::Open => '.',
            CellState::Wall => '#',
            CellState::Start => 'S',
            CellState::End => 'E',
            CellState::Frontier => 'o',
            CellState::Visited => 'x',
            CellState::Path => '*',
        }
    }
}

/// A single display update emitted by the search, in the order the algorithm performs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualEvent {
    /// The given cell should now be shown in the given state.
    Mark { cell: Point, state: CellState },
    /// One expansion of the search loop has finished; a good moment to redraw.
    StepComplete,
}

/// Receiver of [VisualEvent]s. Returning an error aborts the search, which then reports
/// [SearchError::Observer](crate::error::SearchError::Observer).
pub trait Observer {
    fn on_event(&mut self, event: VisualEvent) -> Result<(), ObserverError>;
}

/// Discards every event.
impl Observer for () {
    fn on_event(&mut self, _event: VisualEvent) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// [Observer] backed by a closure, see [from_fn].
pub struct FnObserver<F>(F);

/// Wraps a closure into an [Observer].
pub fn from_fn<F>(f: F) -> FnObserver<F>
where
    F: FnMut(VisualEvent) -> Result<(), ObserverError>,
{
    FnObserver(f)
}

impl<F> Observer for FnObserver<F>
where
    F: FnMut(VisualEvent) -> Result<(), ObserverError>,
{
    fn on_event(&mut self, event: VisualEvent) -> Result<(), ObserverError> {
        (self.0)(event)
    }
}

/// Records every event for later inspection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<VisualEvent>,
}

impl EventLog {
    pub fn new() -> EventLog {
        EventLog::default()
    }
    pub fn events(&self) -> &[VisualEvent] {
        &self.events
    }
    pub fn into_events(self) -> Vec<VisualEvent> {
        self.events
    }
    /// Cells marked with the given state, in emission order.
    pub fn marked(&self, state: CellState) -> Vec<Point> {
        self.events
            .iter()
            .filter_map(|event| match event {
                VisualEvent::Mark { cell, state: s } if *s == state => Some(*cell),
                _ => None,
            })
            .collect()
    }
    pub fn steps(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, VisualEvent::StepComplete))
            .count()
    }
}

impl Observer for EventLog {
    fn on_event(&mut self, event: VisualEvent) -> Result<(), ObserverError> {
        self.events.push(event);
        Ok(())
    }
}

/// The picture an editor would draw: the grid's own states overlaid with search progress.
/// Applying events never overwrites Wall, Start or End.
#[derive(Clone, Debug)]
pub struct DisplayLayer {
    states: SimpleValueGrid<CellState>,
    frames: usize,
}

impl DisplayLayer {
    pub fn new(grid: &PathingGrid) -> DisplayLayer {
        let mut states = SimpleValueGrid::new(grid.rows(), grid.cols(), CellState::Open);
        for x in 0..grid.rows() as i32 {
            for y in 0..grid.cols() as i32 {
                let p = Point::new(x, y);
                states.set_point(p, grid.state(&p));
            }
        }
        DisplayLayer { states, frames: 0 }
    }

    pub fn state(&self, p: &Point) -> Option<CellState> {
        if self.states.point_in_bounds(*p) {
            Some(self.states.get_point(*p))
        } else {
            None
        }
    }

    /// Number of [VisualEvent::StepComplete] events seen so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn count(&self, state: CellState) -> usize {
        let (w, h) = (self.states.width() as i32, self.states.height() as i32);
        (0..w)
            .flat_map(|x| (0..h).map(move |y| Point::new(x, y)))
            .filter(|p| self.states.get_point(*p) == state)
            .count()
    }

    pub fn apply(&mut self, event: VisualEvent) {
        match event {
            VisualEvent::Mark { cell, state } => {
                if let Some(current) = self.state(&cell) {
                    if !(current.is_terminal() && state.is_display_only()) {
                        self.states.set_point(cell, state);
                    }
                }
            }
            VisualEvent::StepComplete => self.frames += 1,
        }
    }
}

impl Observer for DisplayLayer {
    fn on_event(&mut self, event: VisualEvent) -> Result<(), ObserverError> {
        self.apply(event);
        Ok(())
    }
}

impl fmt::Display for DisplayLayer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for x in 0..self.states.width() as i32 {
            let line: String = (0..self.states.height() as i32)
                .map(|y| self.states.get(x, y).glyph())
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
