use super::*;

const SAFE_SPAWN_ATTEMPTS: usize = 64;

impl Game {
    pub(super) fn spawn_initial_enemies(&mut self) {
        match self.mode {
            GameMode::Escape => {
                // Pursuers fill the non-entry corners in order; the exit
                // corner is only occupied at the full count of three.
                let corners = [
                    Cell::new(self.grid.rows() - 1, 0),
                    Cell::new(0, self.grid.cols() - 1),
                    Cell::new(self.grid.rows() - 1, self.grid.cols() - 1),
                ];
                for corner in corners.into_iter().take(self.tuning.pursuer_count) {
                    self.enemies.push(Enemy::new(
                        corner,
                        Behavior::Pursue,
                        self.tuning.pursue_divisor,
                    ));
                }
            }
            GameMode::Hunter => {
                if let Some(cell) = self.pick_safe_spawn() {
                    self.enemies
                        .push(Enemy::new(cell, Behavior::Flee, self.tuning.flee_divisor));
                }
            }
        }
    }

    pub(super) fn spawn_pursue_respawn(&mut self) {
        if let Some(cell) = self.pick_safe_spawn() {
            self.enemies
                .push(Enemy::new(cell, Behavior::Pursue, self.tuning.pursue_divisor));
        }
    }

    pub(super) fn spawn_flee_replacement(&mut self) {
        if let Some(cell) = self.pick_safe_spawn() {
            self.enemies
                .push(Enemy::new(cell, Behavior::Flee, self.tuning.flee_divisor));
        }
    }

    /// A bounded number of random probes, then a deterministic row-major
    /// sweep as fallback. Returns None only when no cell on the map
    /// qualifies, in which case the caller skips the spawn.
    pub(super) fn pick_safe_spawn(&mut self) -> Option<Cell> {
        for _ in 0..SAFE_SPAWN_ATTEMPTS {
            let cell = Cell::new(
                self.rng.int(0, self.grid.rows() - 1),
                self.rng.int(0, self.grid.cols() - 1),
            );
            if self.is_safe_spawn(cell) {
                return Some(cell);
            }
        }
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.cols() {
                let cell = Cell::new(row, col);
                if self.is_safe_spawn(cell) {
                    return Some(cell);
                }
            }
        }
        None
    }

    fn is_safe_spawn(&self, cell: Cell) -> bool {
        self.grid.kind(cell).enemy_passable()
            && cell != self.player.cell
            && cell.manhattan(self.exit) >= MIN_SPAWN_EXIT_DISTANCE
            && reachable(&self.grid, cell, self.exit, TerrainKind::enemy_passable)
    }
}
