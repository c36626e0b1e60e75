use crate::grid::Grid;
use crate::path;
use crate::types::{Behavior, Cell, TerrainKind};

#[derive(Clone, Debug)]
pub struct Enemy {
    pub cell: Cell,
    pub behavior: Behavior,
    pub speed_divisor: u32,
    step_counter: u32,
}

impl Enemy {
    pub fn new(cell: Cell, behavior: Behavior, speed_divisor: u32) -> Self {
        Self {
            cell,
            behavior,
            speed_divisor,
            step_counter: 0,
        }
    }

    /// One tick of enemy AI. The step counter throttles movement without
    /// wall-clock timers: only every `speed_divisor`-th call actually
    /// pathfinds and moves. Returns whether a move occurred.
    pub fn step(&mut self, player: Cell, grid: &Grid, exit: Cell) -> bool {
        self.step_counter += 1;
        if self.step_counter < self.speed_divisor {
            return false;
        }
        self.step_counter = 0;

        let goal = match self.behavior {
            Behavior::Pursue => player,
            Behavior::Flee => exit,
        };
        match path::next_step(grid, self.cell, goal, TerrainKind::enemy_passable) {
            Some(next) => {
                self.cell = next;
                true
            }
            None => false,
        }
    }
}
