use chrono::{SecondsFormat, TimeZone, Utc};

use crate::constants::{
    BASE_POINTS, ESCAPE_POINTS_PER_SECOND, ESCAPE_TIME_BUDGET, TOP_TABLE_LEN, TRAP_KILL_BONUS,
};
use crate::types::{Difficulty, GameMode, MatchRecord, TopEntry};

/// Session-scoped scoring: the running score of the active match, one top-5
/// table per mode, and the full history of finalized matches. The ledger
/// outlives individual matches and moves from one `Game` to the next.
#[derive(Clone, Debug, Default)]
pub struct ScoreLedger {
    running: i32,
    top_escape: Vec<TopEntry>,
    top_hunter: Vec<TopEntry>,
    history: Vec<MatchRecord>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running_score(&self) -> i32 {
        self.running
    }

    /// Hunter caught an enemy: twice the base award.
    pub fn enemy_captured(&mut self) {
        self.running += BASE_POINTS * 2;
    }

    /// An enemy slipped out through the exit unpunished.
    pub fn enemy_escaped(&mut self) {
        self.running -= BASE_POINTS;
    }

    /// A pursuer walked into a live trap.
    pub fn enemy_trapped(&mut self) {
        self.running += TRAP_KILL_BONUS;
    }

    pub fn reset_running(&mut self) {
        self.running = 0;
    }

    /// Escape-mode finalization: a time bonus that decays from 5000 at 10
    /// points per second (floored at zero), plus the running score, scaled
    /// by the difficulty multiplier and truncated.
    pub fn finalize_escape(
        &mut self,
        name: &str,
        difficulty: Difficulty,
        elapsed_secs: f64,
        multiplier: f32,
        now_ms: u64,
    ) -> i32 {
        let time_bonus =
            (ESCAPE_TIME_BUDGET - (elapsed_secs * ESCAPE_POINTS_PER_SECOND as f64) as i32).max(0);
        let score = ((time_bonus + self.running) as f32 * multiplier) as i32;
        push_top(&mut self.top_escape, name, score);
        self.record(name, GameMode::Escape, difficulty, score, now_ms);
        self.running = 0;
        score
    }

    /// Hunter-mode finalization: the running score is recorded as-is. Only
    /// positive sessions make it onto the board and into the history; either
    /// way the running score resets.
    pub fn finalize_hunter(&mut self, name: &str, difficulty: Difficulty, now_ms: u64) -> i32 {
        let score = self.running;
        if score > 0 {
            push_top(&mut self.top_hunter, name, score);
            self.record(name, GameMode::Hunter, difficulty, score, now_ms);
        }
        self.running = 0;
        score
    }

    pub fn top(&self, mode: GameMode) -> &[TopEntry] {
        match mode {
            GameMode::Escape => &self.top_escape,
            GameMode::Hunter => &self.top_hunter,
        }
    }

    pub fn history(&self) -> &[MatchRecord] {
        &self.history
    }

    pub fn render_top(&self, mode: GameMode) -> String {
        let (table, title) = match mode {
            GameMode::Escape => (&self.top_escape, "TOP 5 - Escape mode"),
            GameMode::Hunter => (&self.top_hunter, "TOP 5 - Hunter mode"),
        };
        let mut text = format!("{title}\n{}\n", "=".repeat(title.len()));
        if table.is_empty() {
            text.push_str("No scores recorded yet.");
            return text;
        }
        for (rank, entry) in table.iter().enumerate() {
            text.push_str(&format!("{}. {}: {} points\n", rank + 1, entry.name, entry.score));
        }
        text
    }

    pub fn render_history(&self) -> String {
        let mut text = String::from("MATCH HISTORY\n=============\n");
        if self.history.is_empty() {
            text.push_str("No matches recorded this session.");
            return text;
        }
        for record in &self.history {
            text.push_str(&format!(
                "[{}] {} - {:?} ({:?}): {} pts\n",
                record.recorded_at, record.name, record.mode, record.difficulty, record.score
            ));
        }
        text
    }

    fn record(
        &mut self,
        name: &str,
        mode: GameMode,
        difficulty: Difficulty,
        score: i32,
        now_ms: u64,
    ) {
        self.history.push(MatchRecord {
            name: name.to_string(),
            mode,
            difficulty,
            score,
            recorded_at_ms: now_ms,
            recorded_at: format_timestamp(now_ms),
        });
        self.history
            .sort_by(|a, b| b.recorded_at_ms.cmp(&a.recorded_at_ms));
    }
}

fn push_top(table: &mut Vec<TopEntry>, name: &str, score: i32) {
    table.push(TopEntry {
        name: name.to_string(),
        score,
    });
    table.sort_by(|a, b| b.score.cmp(&a.score));
    table.truncate(TOP_TABLE_LEN);
}

fn format_timestamp(now_ms: u64) -> String {
    Utc.timestamp_millis_opt(now_ms as i64)
        .single()
        .map(|stamp| stamp.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}
