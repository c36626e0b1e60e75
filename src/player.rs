use crate::constants::{
    ENERGY_MAX, ENERGY_REGEN_PER_TICK, MAX_LIVE_TRAPS, SPRINT_ENERGY_COST, TRAP_COOLDOWN_MS,
};
use crate::grid::Grid;
use crate::types::{Cell, Trap};

#[derive(Clone, Debug)]
pub struct Player {
    pub name: String,
    pub cell: Cell,
    pub energy: f32,
    pub trap_cooldown_until: u64,
}

impl Player {
    pub fn new(name: &str, cell: Cell) -> Self {
        Self {
            name: name.to_string(),
            cell,
            energy: ENERGY_MAX,
            trap_cooldown_until: 0,
        }
    }

    /// Attempts a one-cell move. Out-of-bounds or player-impassable targets
    /// are rejected. A sprint move with insufficient energy is rejected
    /// outright: no partial move, no cost charged. Non-sprint moves never
    /// touch energy.
    pub fn try_move(&mut self, dr: i32, dc: i32, grid: &Grid, sprinting: bool) -> bool {
        let target = Cell::new(self.cell.row + dr, self.cell.col + dc);
        if !grid.in_bounds(target) || !grid.kind(target).player_passable() {
            return false;
        }
        if sprinting {
            if self.energy < SPRINT_ENERGY_COST {
                return false;
            }
            self.energy -= SPRINT_ENERGY_COST;
        }
        self.cell = target;
        true
    }

    pub fn regenerate(&mut self, sprinting: bool) {
        if !sprinting {
            self.energy = (self.energy + ENERGY_REGEN_PER_TICK).min(ENERGY_MAX);
        }
    }

    /// Drops a trap at the current cell when under the live cap and off
    /// cooldown. The cap check uses the caller-supplied live count so the
    /// player never needs a back-reference to the match.
    pub fn place_trap(&mut self, now_ms: u64, live_traps: usize) -> Option<Trap> {
        if live_traps >= MAX_LIVE_TRAPS || now_ms < self.trap_cooldown_until {
            return None;
        }
        self.trap_cooldown_until = now_ms + TRAP_COOLDOWN_MS;
        Some(Trap {
            cell: self.cell,
            placed_at_ms: now_ms,
        })
    }

    pub fn trap_cooldown_remaining(&self, now_ms: u64) -> u64 {
        self.trap_cooldown_until.saturating_sub(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TerrainKind;

    fn open_grid() -> Grid {
        Grid::filled(5, 5, TerrainKind::Path)
    }

    #[test]
    fn move_rejects_walls_and_bounds() {
        let mut grid = open_grid();
        grid.set_kind(Cell::new(0, 1), TerrainKind::Wall);
        grid.set_kind(Cell::new(1, 0), TerrainKind::Vine);
        let mut player = Player::new("tester", Cell::new(0, 0));

        assert!(!player.try_move(0, 1, &grid, false));
        assert!(!player.try_move(1, 0, &grid, false));
        assert!(!player.try_move(-1, 0, &grid, false));
        assert_eq!(player.cell, Cell::new(0, 0));
        assert_eq!(player.energy, ENERGY_MAX);
    }

    #[test]
    fn player_may_enter_tunnels() {
        let mut grid = open_grid();
        grid.set_kind(Cell::new(0, 1), TerrainKind::Tunnel);
        let mut player = Player::new("tester", Cell::new(0, 0));
        assert!(player.try_move(0, 1, &grid, false));
        assert_eq!(player.cell, Cell::new(0, 1));
    }

    #[test]
    fn sprint_costs_energy_and_is_refused_when_exhausted() {
        let grid = open_grid();
        let mut player = Player::new("tester", Cell::new(2, 2));

        assert!(player.try_move(0, 1, &grid, true));
        assert_eq!(player.energy, ENERGY_MAX - SPRINT_ENERGY_COST);

        player.energy = SPRINT_ENERGY_COST - 0.5;
        let before = player.cell;
        assert!(!player.try_move(0, 1, &grid, true));
        assert_eq!(player.cell, before);
        assert_eq!(player.energy, SPRINT_ENERGY_COST - 0.5);

        // The same move without sprinting still works and costs nothing.
        assert!(player.try_move(0, 1, &grid, false));
        assert_eq!(player.energy, SPRINT_ENERGY_COST - 0.5);
    }

    #[test]
    fn energy_regenerates_only_while_not_sprinting_and_clamps() {
        let mut player = Player::new("tester", Cell::new(0, 0));
        player.energy = 10.0;
        player.regenerate(true);
        assert_eq!(player.energy, 10.0);
        player.regenerate(false);
        assert_eq!(player.energy, 10.5);

        player.energy = ENERGY_MAX - 0.2;
        player.regenerate(false);
        assert_eq!(player.energy, ENERGY_MAX);
    }

    #[test]
    fn trap_placement_honors_cap_and_cooldown_independently() {
        let mut player = Player::new("tester", Cell::new(1, 1));

        // At the cap: refused even though the cooldown is clear.
        assert!(player.place_trap(1_000, MAX_LIVE_TRAPS).is_none());
        assert_eq!(player.trap_cooldown_until, 0);

        let trap = player.place_trap(1_000, 0).expect("first placement");
        assert_eq!(trap.cell, Cell::new(1, 1));
        assert_eq!(trap.placed_at_ms, 1_000);

        // On cooldown: refused even with zero live traps.
        assert!(player.place_trap(1_000 + TRAP_COOLDOWN_MS - 1, 0).is_none());
        assert!(player.place_trap(1_000 + TRAP_COOLDOWN_MS, 0).is_some());
    }

    #[test]
    fn cooldown_remaining_counts_down_to_zero() {
        let mut player = Player::new("tester", Cell::new(0, 0));
        player.place_trap(2_000, 0).expect("placement");
        assert_eq!(player.trap_cooldown_remaining(2_000), TRAP_COOLDOWN_MS);
        assert_eq!(player.trap_cooldown_remaining(2_000 + TRAP_COOLDOWN_MS + 1), 0);
    }
}
