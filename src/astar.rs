//! A* over a [PathingGrid] with unit edge costs and the Manhattan heuristic. Expansion order is
//! fully determined by the input: open-set entries are ordered by estimated cost and, among equal
//! estimates, by insertion order. Every change of a cell's display state is reported to an
//! [Observer] as it happens.
use fxhash::{FxHashMap, FxHashSet};
use grid_util::point::Point;
use log::{debug, info, trace};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::cancel::CancellationToken;
use crate::display::{CellState, Observer, VisualEvent};
use crate::error::SearchError;
use crate::heuristic::manhattan_distance;
use crate::path::{Path, PathWalk};
use crate::pathing_grid::PathingGrid;
use crate::Cost;

/// Entry of the open set. Cells are never updated in place; a cell reached again after it left
/// the open set gets a new entry, and entries for cells no longer in the open set are skipped.
struct OpenEntry {
    f_score: Cost,
    sequence: u64,
    index: usize,
    cell: Point,
}

impl Eq for OpenEntry {}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_score == other.f_score && self.sequence == other.sequence
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed since BinaryHeap is a max-heap: lowest estimate first, then earliest insertion
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Bookkeeping of a single run, keyed by the grid's cell index. Missing scores are infinite.
struct SearchState {
    g_score: FxHashMap<usize, Cost>,
    f_score: FxHashMap<usize, Cost>,
    came_from: FxHashMap<usize, Point>,
    open_set: BinaryHeap<OpenEntry>,
    open_members: FxHashSet<usize>,
    sequence: u64,
}

impl SearchState {
    fn new(start_ix: usize, start: Point, estimate: Cost) -> SearchState {
        let mut state = SearchState {
            g_score: FxHashMap::default(),
            f_score: FxHashMap::default(),
            came_from: FxHashMap::default(),
            open_set: BinaryHeap::new(),
            open_members: FxHashSet::default(),
            sequence: 0,
        };
        state.g_score.insert(start_ix, 0);
        state.f_score.insert(start_ix, estimate);
        state.open(start_ix, start, estimate);
        state
    }

    fn g(&self, index: usize) -> Cost {
        self.g_score.get(&index).copied().unwrap_or(Cost::MAX)
    }

    fn open(&mut self, index: usize, cell: Point, f_score: Cost) {
        self.open_set.push(OpenEntry {
            f_score,
            sequence: self.sequence,
            index,
            cell,
        });
        self.sequence += 1;
        self.open_members.insert(index);
    }
}

/// Outcome of a search that ran without errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    Found(Path),
    /// The open set ran empty without reaching the end.
    NotFound,
    /// The [CancellationToken] fired before the search finished.
    Cancelled,
}

impl SearchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found(_))
    }
    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchResult::Found(path) => Some(path),
            _ => None,
        }
    }
    pub fn into_path(self) -> Option<Path> {
        match self {
            SearchResult::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// Counters describing how much work a run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Cells taken from the open set and expanded. The end cell is not counted.
    pub expanded: usize,
    /// Entries pushed onto the open set, including the start.
    pub pushes: usize,
    /// Popped entries skipped because their cell had already left the open set.
    pub stale_discarded: usize,
    /// Cells that received a finite cost, the start included.
    pub discovered: usize,
    /// Entries still in the open set when the run returned.
    pub open_remaining: usize,
    pub peak_open: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchReport {
    pub result: SearchResult,
    pub stats: SearchStats,
}

fn emit<O: Observer + ?Sized>(observer: &mut O, event: VisualEvent) -> Result<(), SearchError> {
    observer.on_event(event).map_err(SearchError::Observer)
}

/// A single A* run between two cells of a borrowed grid. Construct a fresh one per run.
pub struct AstarSearch<'g> {
    grid: &'g PathingGrid,
    start: Point,
    end: Point,
    start_ix: usize,
    end_ix: usize,
    cancellation: Option<CancellationToken>,
}

impl<'g> AstarSearch<'g> {
    /// Validates start and end: both must lie on the grid, be open and differ.
    pub fn new(grid: &'g PathingGrid, start: Point, end: Point) -> Result<Self, SearchError> {
        let start_ix = grid
            .index_of(&start)
            .ok_or(SearchError::StartOutOfBounds(start))?;
        let end_ix = grid
            .index_of(&end)
            .ok_or(SearchError::EndOutOfBounds(end))?;
        if start_ix == end_ix {
            return Err(SearchError::StartEqualsEnd(start));
        }
        if grid.is_wall(&start) {
            return Err(SearchError::StartIsWall(start));
        }
        if grid.is_wall(&end) {
            return Err(SearchError::EndIsWall(end));
        }
        Ok(AstarSearch {
            grid,
            start,
            end,
            start_ix,
            end_ix,
            cancellation: None,
        })
    }

    /// Makes the run check the token before every step.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Runs the search to completion, reporting display changes to the observer. An observer
    /// error stops the search immediately and is returned.
    pub fn run<O: Observer + ?Sized>(self, observer: &mut O) -> Result<SearchReport, SearchError> {
        debug!("Searching path from {} to {}", self.start, self.end);
        let mut state = SearchState::new(
            self.start_ix,
            self.start,
            manhattan_distance(&self.start, &self.end),
        );
        let mut stats = SearchStats {
            pushes: 1,
            peak_open: 1,
            ..SearchStats::default()
        };

        loop {
            if self.cancelled() {
                info!("Search from {} to {} cancelled", self.start, self.end);
                stats.open_remaining = state.open_set.len();
                stats.discovered = state.g_score.len();
                return Ok(SearchReport {
                    result: SearchResult::Cancelled,
                    stats,
                });
            }
            let Some(OpenEntry { index, cell, .. }) = state.open_set.pop() else {
                break;
            };
            if !state.open_members.remove(&index) {
                stats.stale_discarded += 1;
                continue;
            }

            if index == self.end_ix {
                let path = self.reconstruct(&state, observer)?;
                emit(
                    observer,
                    VisualEvent::Mark {
                        cell: self.start,
                        state: CellState::Start,
                    },
                )?;
                stats.open_remaining = state.open_set.len();
                stats.discovered = state.g_score.len();
                debug!(
                    "Found path of {} moves after expanding {} cells",
                    path.edge_count(),
                    stats.expanded
                );
                return Ok(SearchReport {
                    result: SearchResult::Found(path),
                    stats,
                });
            }

            trace!(
                "Expanding {} with g = {}, f = {}",
                cell,
                state.g(index),
                state.f_score.get(&index).copied().unwrap_or(Cost::MAX)
            );
            stats.expanded += 1;
            let tentative_g = state.g(index) + 1;
            for neighbour in self.grid.neighbors_of(&cell) {
                let Some(n_ix) = self.grid.index_of(&neighbour) else {
                    continue;
                };
                if tentative_g >= state.g(n_ix) {
                    continue;
                }
                let f = tentative_g + manhattan_distance(&neighbour, &self.end);
                state.came_from.insert(n_ix, cell);
                state.g_score.insert(n_ix, tentative_g);
                state.f_score.insert(n_ix, f);
                if !state.open_members.contains(&n_ix) {
                    state.open(n_ix, neighbour, f);
                    stats.pushes += 1;
                    stats.peak_open = stats.peak_open.max(state.open_set.len());
                    if n_ix != self.end_ix {
                        emit(
                            observer,
                            VisualEvent::Mark {
                                cell: neighbour,
                                state: CellState::Frontier,
                            },
                        )?;
                    }
                }
            }

            emit(observer, VisualEvent::StepComplete)?;
            if index != self.start_ix {
                emit(
                    observer,
                    VisualEvent::Mark {
                        cell,
                        state: CellState::Visited,
                    },
                )?;
            }
        }

        stats.open_remaining = state.open_set.len();
        stats.discovered = state.g_score.len();
        info!(
            "No path from {} to {}, expanded {} cells",
            self.start, self.end, stats.expanded
        );
        Ok(SearchReport {
            result: SearchResult::NotFound,
            stats,
        })
    }

    /// Follows the parent links back from the end, marking every cell in between as path.
    fn reconstruct<O: Observer + ?Sized>(
        &self,
        state: &SearchState,
        observer: &mut O,
    ) -> Result<Path, SearchError> {
        let mut cells = Vec::with_capacity(state.g(self.end_ix) as usize + 1);
        for cell in PathWalk::new(self.grid, &state.came_from, self.end) {
            if cell != self.start && cell != self.end {
                emit(
                    observer,
                    VisualEvent::Mark {
                        cell,
                        state: CellState::Path,
                    },
                )?;
            }
            cells.push(cell);
        }
        cells.reverse();
        Ok(Path::new(cells))
    }
}
