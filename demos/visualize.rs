use grid_astar::{from_fn, AstarSearch, CancellationToken, DisplayLayer, PathingGrid, VisualEvent};

// In this example a path is found on the grid below and the state of the search is printed after
// every few steps, the way an editor would redraw its window.
// - # marks a wall
// - S marks the start
// - E marks the end
// While searching:
// - o marks the frontier (open set)
// - x marks visited cells
// - * marks the final path
const GRID: &str = "
    S.........
    .######...
    ......#...
    .####.#.##
    ....#.#...
    ###.#.###.
    ....#.....
    .####.###.
    ..........
    .#######.E
";
const STEPS_PER_FRAME: usize = 10;
// Stands in for the user closing the window
const MAX_STEPS: usize = 500;

fn main() {
    let grid: PathingGrid = match GRID.parse() {
        Ok(grid) => grid,
        Err(err) => {
            eprintln!("Invalid grid: {err}");
            return;
        }
    };
    println!("{}", grid);
    let (Some(start), Some(end)) = (grid.start(), grid.end()) else {
        eprintln!("Grid needs a start and an end");
        return;
    };

    let quit = CancellationToken::new();
    let quit_handle = quit.clone();
    let mut layer = DisplayLayer::new(&grid);
    let mut observer = from_fn(|event| {
        layer.apply(event);
        if event == VisualEvent::StepComplete {
            if layer.frames() % STEPS_PER_FRAME == 0 {
                println!("Step {}:\n{}", layer.frames(), layer);
            }
            if layer.frames() >= MAX_STEPS {
                quit_handle.cancel();
            }
        }
        Ok(())
    });

    let report = AstarSearch::new(&grid, start, end)
        .and_then(|search| search.with_cancellation(quit).run(&mut observer));
    drop(observer);
    match report {
        Ok(report) => {
            println!("Final state:\n{}", layer);
            match report.result.path() {
                Some(path) => println!("Path of {} moves: {}", path.edge_count(), path),
                None => println!("Result: {:?}", report.result),
            }
            println!("{:?}", report.stats);
        }
        Err(err) => eprintln!("Search failed: {err}"),
    }
}
