use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::grid::Grid;
use crate::types::{Cell, TerrainKind};

/// A* over 4-directional moves with a Manhattan heuristic and uniform edge
/// cost. Returns the first step of a shortest path from `start` toward
/// `goal`, or `None` when the goal is unreachable or `start == goal`.
///
/// The frontier is ordered by `(f, g, row, col)`, so identical inputs always
/// expand in the same order and yield the same step. Each call searches from
/// scratch: obstacles are static, but the goal moves every tick in pursue
/// mode, so cached state would be stale immediately.
pub fn next_step(
    grid: &Grid,
    start: Cell,
    goal: Cell,
    passable: impl Fn(TerrainKind) -> bool,
) -> Option<Cell> {
    if start == goal {
        return None;
    }

    let mut frontier: BinaryHeap<Reverse<(i32, i32, i32, i32)>> = BinaryHeap::new();
    frontier.push(Reverse((0, 0, start.row, start.col)));
    let mut g_score: HashMap<Cell, i32> = HashMap::from([(start, 0)]);
    let mut parent: HashMap<Cell, Cell> = HashMap::new();

    while let Some(Reverse((_, g, row, col))) = frontier.pop() {
        let current = Cell::new(row, col);
        if current == goal {
            return first_step_toward(start, goal, &parent);
        }

        for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let next = Cell::new(row + dr, col + dc);
            if !grid.in_bounds(next) || !passable(grid.kind(next)) {
                continue;
            }
            let tentative = g + 1;
            if tentative < *g_score.get(&next).unwrap_or(&i32::MAX) {
                g_score.insert(next, tentative);
                parent.insert(next, current);
                let f = tentative + next.manhattan(goal);
                frontier.push(Reverse((f, tentative, next.row, next.col)));
            }
        }
    }
    None
}

fn first_step_toward(start: Cell, goal: Cell, parent: &HashMap<Cell, Cell>) -> Option<Cell> {
    let mut cursor = goal;
    while let Some(&previous) = parent.get(&cursor) {
        if previous == start {
            return Some(cursor);
        }
        cursor = previous;
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet, VecDeque};

    use super::next_step;
    use crate::grid::Grid;
    use crate::types::{Cell, TerrainKind};

    /// Reference BFS distance used to cross-check A* optimality.
    fn bfs_distance(
        grid: &Grid,
        start: Cell,
        goal: Cell,
        passable: impl Fn(TerrainKind) -> bool,
    ) -> Option<i32> {
        let mut dist = HashMap::from([(start, 0)]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if current == goal {
                return dist.get(&goal).copied();
            }
            for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let next = Cell::new(current.row + dr, current.col + dc);
                if !grid.in_bounds(next) || !passable(grid.kind(next)) {
                    continue;
                }
                if !dist.contains_key(&next) {
                    dist.insert(next, dist[&current] + 1);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn maze_with_wall_bar() -> Grid {
        // 5x5 open grid with a wall bar across row 2, gap at column 4.
        let mut grid = Grid::filled(5, 5, TerrainKind::Path);
        for col in 0..4 {
            grid.set_kind(Cell::new(2, col), TerrainKind::Wall);
        }
        grid
    }

    #[test]
    fn step_is_adjacent_and_on_a_shortest_path() {
        let grid = maze_with_wall_bar();
        let start = Cell::new(0, 0);
        let goal = Cell::new(4, 0);
        let full_distance =
            bfs_distance(&grid, start, goal, TerrainKind::player_passable).expect("reachable");

        let step = next_step(&grid, start, goal, TerrainKind::player_passable)
            .expect("path exists");
        assert_eq!(start.manhattan(step), 1);

        let remaining =
            bfs_distance(&grid, step, goal, TerrainKind::player_passable).expect("reachable");
        assert_eq!(remaining + 1, full_distance);
    }

    #[test]
    fn every_reachable_goal_gets_an_optimal_first_step() {
        let mut rng = crate::rng::Rng::new(31);
        let exit = Cell::new(9, 9);
        let grid = Grid::generate(10, 10, exit, &mut rng);
        let start = Cell::new(0, 0);

        for row in 0..10 {
            for col in 0..10 {
                let goal = Cell::new(row, col);
                if goal == start {
                    continue;
                }
                let reference = bfs_distance(&grid, start, goal, TerrainKind::enemy_passable);
                let step = next_step(&grid, start, goal, TerrainKind::enemy_passable);
                match reference {
                    None => assert_eq!(step, None, "goal {goal:?} should be unreachable"),
                    Some(distance) => {
                        let step = step.expect("reachable goal must yield a step");
                        assert_eq!(start.manhattan(step), 1);
                        let remaining =
                            bfs_distance(&grid, step, goal, TerrainKind::enemy_passable)
                                .expect("step stays connected");
                        assert_eq!(remaining + 1, distance, "suboptimal step for {goal:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn start_equals_goal_returns_none() {
        let grid = Grid::filled(3, 3, TerrainKind::Path);
        let cell = Cell::new(1, 1);
        assert_eq!(next_step(&grid, cell, cell, TerrainKind::player_passable), None);
    }

    #[test]
    fn walled_off_goal_returns_none() {
        let mut grid = Grid::filled(3, 3, TerrainKind::Path);
        for cell in [Cell::new(0, 1), Cell::new(1, 1), Cell::new(2, 1)] {
            grid.set_kind(cell, TerrainKind::Wall);
        }
        assert_eq!(
            next_step(
                &grid,
                Cell::new(0, 0),
                Cell::new(0, 2),
                TerrainKind::player_passable
            ),
            None
        );
    }

    #[test]
    fn identical_inputs_yield_identical_steps() {
        let grid = maze_with_wall_bar();
        let start = Cell::new(0, 2);
        let goal = Cell::new(4, 2);
        let first = next_step(&grid, start, goal, TerrainKind::player_passable);
        let results: HashSet<Option<Cell>> = (0..50)
            .map(|_| next_step(&grid, start, goal, TerrainKind::player_passable))
            .collect();
        assert_eq!(results.len(), 1);
        assert!(results.contains(&first));
    }
}
