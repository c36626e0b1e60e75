use std::collections::{HashSet, VecDeque};

use crate::rng::Rng;
use crate::types::{Cell, TerrainKind};

/// Rectangular terrain map. Laid out once at match start and never mutated
/// afterwards; traps and entities are tracked by the engine, not baked into
/// cells.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cells: Vec<TerrainKind>,
}

impl Grid {
    /// Rolls a weighted random terrain per cell, forces the entry and exit
    /// corners open, and re-rolls the whole map until the exit is reachable
    /// on foot from (0,0). Termination is probabilistic: with 60% of cells
    /// open a valid map shows up within a few attempts.
    pub fn generate(rows: i32, cols: i32, exit: Cell, rng: &mut Rng) -> Self {
        loop {
            let mut cells = Vec::with_capacity((rows * cols) as usize);
            for _ in 0..rows * cols {
                cells.push(roll_terrain(rng));
            }
            let mut grid = Self { rows, cols, cells };
            grid.set(Cell::new(0, 0), TerrainKind::Path);
            grid.set(exit, TerrainKind::Path);

            if reachable(&grid, Cell::new(0, 0), exit, TerrainKind::player_passable) {
                return grid;
            }
        }
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.col >= 0 && cell.row < self.rows && cell.col < self.cols
    }

    /// Terrain at `cell`; out-of-bounds reads as Wall so callers can treat
    /// the border uniformly.
    pub fn kind(&self, cell: Cell) -> TerrainKind {
        if !self.in_bounds(cell) {
            return TerrainKind::Wall;
        }
        self.cells[(cell.row * self.cols + cell.col) as usize]
    }

    fn set(&mut self, cell: Cell, kind: TerrainKind) {
        let idx = (cell.row * self.cols + cell.col) as usize;
        self.cells[idx] = kind;
    }

    #[cfg(test)]
    pub(crate) fn filled(rows: i32, cols: i32, kind: TerrainKind) -> Self {
        Self {
            rows,
            cols,
            cells: vec![kind; (rows * cols) as usize],
        }
    }

    #[cfg(test)]
    pub(crate) fn set_kind(&mut self, cell: Cell, kind: TerrainKind) {
        self.set(cell, kind);
    }
}

/// Breadth-first reachability over 4-directional moves, restricted to cells
/// the given predicate accepts. Shared by map validation (player predicate)
/// and spawn vetting (enemy predicate).
pub fn reachable(
    grid: &Grid,
    start: Cell,
    goal: Cell,
    passable: impl Fn(TerrainKind) -> bool,
) -> bool {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            return true;
        }
        for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let next = Cell::new(current.row + dr, current.col + dc);
            if !grid.in_bounds(next) || !passable(grid.kind(next)) {
                continue;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

fn roll_terrain(rng: &mut Rng) -> TerrainKind {
    let roll = rng.next_f32();
    if roll < 0.6 {
        return TerrainKind::Path;
    }
    if roll < 0.8 {
        return TerrainKind::Wall;
    }
    if roll < 0.9 {
        return TerrainKind::Tunnel;
    }
    TerrainKind::Vine
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_grids_keep_entry_and_exit_open_and_connected() {
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let exit = Cell::new(14, 14);
            let grid = Grid::generate(15, 15, exit, &mut rng);

            assert_eq!(grid.kind(Cell::new(0, 0)), TerrainKind::Path);
            assert_eq!(grid.kind(exit), TerrainKind::Path);
            assert!(
                reachable(&grid, Cell::new(0, 0), exit, TerrainKind::player_passable),
                "seed {seed} produced a disconnected map"
            );
        }
    }

    #[test]
    fn same_seed_generates_identical_grids() {
        let exit = Cell::new(11, 19);
        let a = Grid::generate(12, 20, exit, &mut Rng::new(99));
        let b = Grid::generate(12, 20, exit, &mut Rng::new(99));
        for row in 0..a.rows() {
            for col in 0..a.cols() {
                let cell = Cell::new(row, col);
                assert_eq!(a.kind(cell), b.kind(cell));
            }
        }
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let grid = Grid::filled(4, 4, TerrainKind::Path);
        assert_eq!(grid.kind(Cell::new(-1, 0)), TerrainKind::Wall);
        assert_eq!(grid.kind(Cell::new(0, 4)), TerrainKind::Wall);
        assert_eq!(grid.kind(Cell::new(4, 0)), TerrainKind::Wall);
    }

    #[test]
    fn reachability_respects_the_passability_predicate() {
        // Row of tunnels: the player can cross, the enemy cannot.
        let mut grid = Grid::filled(1, 5, TerrainKind::Tunnel);
        grid.set_kind(Cell::new(0, 0), TerrainKind::Path);
        grid.set_kind(Cell::new(0, 4), TerrainKind::Path);

        let start = Cell::new(0, 0);
        let goal = Cell::new(0, 4);
        assert!(reachable(&grid, start, goal, TerrainKind::player_passable));
        assert!(!reachable(&grid, start, goal, TerrainKind::enemy_passable));
    }

    #[test]
    fn reachability_does_not_require_a_passable_start() {
        // An enemy boxed into a corner still reports reachability of its own
        // cell but nothing beyond it.
        let mut grid = Grid::filled(3, 3, TerrainKind::Wall);
        grid.set_kind(Cell::new(1, 1), TerrainKind::Path);
        assert!(reachable(
            &grid,
            Cell::new(0, 0),
            Cell::new(0, 0),
            TerrainKind::player_passable
        ));
        assert!(!reachable(
            &grid,
            Cell::new(0, 0),
            Cell::new(2, 2),
            TerrainKind::player_passable
        ));
    }
}
