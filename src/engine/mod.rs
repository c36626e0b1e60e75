use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::{
    get_difficulty_tuning, DifficultyTuning, ENEMY_RESPAWN_MS, MAX_LIVE_TRAPS,
    MIN_SPAWN_EXIT_DISTANCE,
};
use crate::enemy::Enemy;
use crate::grid::{reachable, Grid};
use crate::player::Player;
use crate::rng::Rng;
use crate::score::ScoreLedger;
use crate::types::{
    Behavior, Cell, Difficulty, Direction, EnemyView, GameMode, Outcome, PlayerView, Snapshot,
    TerrainKind, Trap, TrapPlacement,
};

mod spawn_system;

#[derive(Clone, Copy, Debug)]
pub struct MatchOptions {
    pub rows: i32,
    pub cols: i32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { rows: 15, cols: 15 }
    }
}

/// One running match. Callers drive it with `advance` once per tick plus
/// the input handlers; everything else is derived state. The score ledger
/// is owned for the duration of the match and handed back by
/// `into_ledger` so leaderboards survive across matches.
#[derive(Clone, Debug)]
pub struct Game {
    pub started_at_ms: u64,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    grid: Grid,
    exit: Cell,
    tuning: DifficultyTuning,
    rng: Rng,
    player: Player,
    enemies: Vec<Enemy>,
    traps: Vec<Trap>,
    // Death timestamps of trapped pursuers awaiting respawn.
    dead_enemies: Vec<u64>,
    ledger: ScoreLedger,
    sprinting: bool,
    outcome: Option<Outcome>,
}

impl Game {
    pub fn new(
        name: &str,
        mode: GameMode,
        difficulty: Difficulty,
        seed: u32,
        options: MatchOptions,
        ledger: ScoreLedger,
    ) -> Self {
        let mut rng = Rng::new(seed);
        let exit = Cell::new(options.rows - 1, options.cols - 1);
        let grid = Grid::generate(options.rows, options.cols, exit, &mut rng);
        let mut game = Self {
            started_at_ms: now_ms(),
            mode,
            difficulty,
            grid,
            exit,
            tuning: get_difficulty_tuning(difficulty),
            rng,
            player: Player::new(name, Cell::new(0, 0)),
            enemies: Vec::new(),
            traps: Vec::new(),
            dead_enemies: Vec::new(),
            ledger,
            sprinting: false,
            outcome: None,
        };
        game.spawn_initial_enemies();
        game
    }

    /// One simulation tick at wall-clock `now_ms`. Order matters: respawns,
    /// energy regen, trap resolution, enemy movement, collisions, removals,
    /// then the escape win check. Returns the outcome once terminal;
    /// terminal matches ignore further calls.
    pub fn advance(&mut self, now_ms: u64) -> Option<Outcome> {
        if self.outcome.is_some() {
            return self.outcome;
        }

        self.handle_respawns(now_ms);
        self.player.regenerate(self.sprinting);

        // A pursuer standing on a trap dies before it can move or collide
        // this tick.
        let mut removed = vec![false; self.enemies.len()];
        for (idx, enemy) in self.enemies.iter().enumerate() {
            if enemy.behavior != Behavior::Pursue {
                continue;
            }
            if let Some(trap_idx) = self.traps.iter().position(|trap| trap.cell == enemy.cell) {
                self.traps.remove(trap_idx);
                self.dead_enemies.push(now_ms);
                self.ledger.enemy_trapped();
                removed[idx] = true;
            }
        }

        for idx in 0..self.enemies.len() {
            if removed[idx] {
                continue;
            }
            let player_cell = self.player.cell;
            let exit = self.exit;
            self.enemies[idx].step(player_cell, &self.grid, exit);
        }

        let mut flee_replacements = 0;
        for idx in 0..self.enemies.len() {
            if removed[idx] {
                continue;
            }
            if self.enemies[idx].cell == self.player.cell {
                match self.mode {
                    GameMode::Escape => {
                        self.ledger.reset_running();
                        self.outcome = Some(Outcome::Lost);
                        return self.outcome;
                    }
                    GameMode::Hunter => {
                        self.ledger.enemy_captured();
                        removed[idx] = true;
                        flee_replacements += 1;
                        continue;
                    }
                }
            }
            if self.enemies[idx].behavior == Behavior::Flee && self.enemies[idx].cell == self.exit
            {
                self.ledger.enemy_escaped();
                removed[idx] = true;
                flee_replacements += 1;
            }
        }

        let mut keep = removed.iter();
        self.enemies.retain(|_| !*keep.next().unwrap_or(&false));
        for _ in 0..flee_replacements {
            self.spawn_flee_replacement();
        }

        if self.mode == GameMode::Escape && self.player.cell == self.exit {
            let elapsed_secs = now_ms.saturating_sub(self.started_at_ms) as f64 / 1000.0;
            let name = self.player.name.clone();
            self.ledger.finalize_escape(
                &name,
                self.difficulty,
                elapsed_secs,
                self.tuning.score_multiplier,
                now_ms,
            );
            self.outcome = Some(Outcome::Won);
        }
        self.outcome
    }

    pub fn handle_move(&mut self, direction: Direction) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        let (dr, dc) = direction.delta();
        self.player.try_move(dr, dc, &self.grid, self.sprinting)
    }

    pub fn set_sprinting(&mut self, sprinting: bool) {
        self.sprinting = sprinting;
    }

    pub fn handle_place_trap(&mut self, now_ms: u64) -> TrapPlacement {
        if self.outcome.is_some() {
            return TrapPlacement::MatchOver;
        }
        if self.traps.len() >= MAX_LIVE_TRAPS {
            return TrapPlacement::AtCap;
        }
        let remaining = self.player.trap_cooldown_remaining(now_ms);
        if remaining > 0 {
            return TrapPlacement::CoolingDown {
                remaining_ms: remaining,
            };
        }
        match self.player.place_trap(now_ms, self.traps.len()) {
            Some(trap) => {
                self.traps.push(trap);
                TrapPlacement::Placed
            }
            None => TrapPlacement::AtCap,
        }
    }

    /// Hunter matches have no natural end; the player banks the running
    /// score explicitly. Escape matches and already-ended matches return
    /// None.
    pub fn finalize(&mut self, now_ms: u64) -> Option<i32> {
        if self.mode != GameMode::Hunter || self.outcome.is_some() {
            return None;
        }
        let name = self.player.name.clone();
        let score = self.ledger.finalize_hunter(&name, self.difficulty, now_ms);
        self.outcome = Some(Outcome::Won);
        Some(score)
    }

    pub fn snapshot(&self, now_ms: u64) -> Snapshot {
        Snapshot {
            elapsed_ms: now_ms.saturating_sub(self.started_at_ms),
            player: PlayerView {
                name: self.player.name.clone(),
                cell: self.player.cell,
                energy: self.player.energy,
                sprinting: self.sprinting,
            },
            enemies: self
                .enemies
                .iter()
                .map(|enemy| EnemyView {
                    cell: enemy.cell,
                    behavior: enemy.behavior,
                })
                .collect(),
            traps: self.traps.iter().map(|trap| trap.cell).collect(),
            running_score: self.ledger.running_score(),
            live_traps: self.traps.len(),
            trap_cooldown_ms: self.player.trap_cooldown_remaining(now_ms),
            outcome: self.outcome,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn into_ledger(self) -> ScoreLedger {
        self.ledger
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_ended(&self) -> bool {
        self.outcome.is_some()
    }

    fn handle_respawns(&mut self, now_ms: u64) {
        let before = self.dead_enemies.len();
        self.dead_enemies
            .retain(|died_at_ms| now_ms < died_at_ms + ENEMY_RESPAWN_MS);
        for _ in self.dead_enemies.len()..before {
            self.spawn_pursue_respawn();
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
