use crate::types::Difficulty;

pub const ENERGY_MAX: f32 = 100.0;
pub const ENERGY_REGEN_PER_TICK: f32 = 0.5;
pub const SPRINT_ENERGY_COST: f32 = 8.0;

pub const MAX_LIVE_TRAPS: usize = 3;
pub const TRAP_COOLDOWN_MS: u64 = 5_000;
pub const ENEMY_RESPAWN_MS: u64 = 10_000;
pub const MIN_SPAWN_EXIT_DISTANCE: i32 = 8;

pub const BASE_POINTS: i32 = 50;
pub const TRAP_KILL_BONUS: i32 = 10;
pub const ESCAPE_TIME_BUDGET: i32 = 5_000;
pub const ESCAPE_POINTS_PER_SECOND: i32 = 10;

pub const TOP_TABLE_LEN: usize = 5;

/// Per-difficulty tuning. Speed divisors are ticks per enemy step, so a
/// larger divisor means a slower enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyTuning {
    pub pursue_divisor: u32,
    pub pursuer_count: usize,
    pub flee_divisor: u32,
    pub score_multiplier: f32,
}

pub fn get_difficulty_tuning(difficulty: Difficulty) -> DifficultyTuning {
    match difficulty {
        Difficulty::Easy => DifficultyTuning {
            pursue_divisor: 30,
            pursuer_count: 1,
            flee_divisor: 40,
            score_multiplier: 1.0,
        },
        Difficulty::Normal => DifficultyTuning {
            pursue_divisor: 20,
            pursuer_count: 2,
            flee_divisor: 30,
            score_multiplier: 1.5,
        },
        Difficulty::Hard => DifficultyTuning {
            pursue_divisor: 10,
            pursuer_count: 3,
            flee_divisor: 20,
            score_multiplier: 2.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harder_difficulties_speed_up_enemies_and_scale_scores() {
        let easy = get_difficulty_tuning(Difficulty::Easy);
        let normal = get_difficulty_tuning(Difficulty::Normal);
        let hard = get_difficulty_tuning(Difficulty::Hard);

        assert!(easy.pursue_divisor > normal.pursue_divisor);
        assert!(normal.pursue_divisor > hard.pursue_divisor);
        assert!(easy.flee_divisor > normal.flee_divisor);
        assert!(normal.flee_divisor > hard.flee_divisor);
        assert!(easy.pursuer_count < normal.pursuer_count);
        assert!(normal.pursuer_count < hard.pursuer_count);
        assert!(easy.score_multiplier < normal.score_multiplier);
        assert!(normal.score_multiplier < hard.score_multiplier);
    }
}
