use clap::Parser;
use maze_escape::engine::{Game, MatchOptions};
use maze_escape::path;
use maze_escape::score::ScoreLedger;
use maze_escape::types::{
    Behavior, Cell, Difficulty, Direction, GameMode, Outcome, Snapshot, TerrainKind, TopEntry,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const TICK_MS: u64 = 100;
const TRAP_INTERVAL_TICKS: u64 = 40;
const SPRINT_ENERGY_FLOOR: f32 = 60.0;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    mode: Option<String>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    rows: Option<i32>,
    #[arg(long)]
    cols: Option<i32>,
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    mode: GameMode,
    difficulty: Difficulty,
    rows: i32,
    cols: i32,
    #[serde(rename = "maxTicks")]
    max_ticks: u64,
    seed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum RunReason {
    Won,
    Lost,
    Banked,
    Timeout,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    mode: GameMode,
    difficulty: Difficulty,
    reason: RunReason,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    score: i32,
    #[serde(rename = "trapKills")]
    trap_kills: i32,
    captures: i32,
    escapes: i32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct ScenarioRunResult {
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
    ledger: ScoreLedger,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: i32,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    #[serde(rename = "topEscape")]
    top_escape: Vec<TopEntry>,
    #[serde(rename = "topHunter")]
    top_hunter: Vec<TopEntry>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed_hint, run_started_at_ms));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_score = 0i64;
    let mut total_anomalies = 0usize;
    let mut ledger = ScoreLedger::new();

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "mode": scenario.mode,
                "difficulty": scenario.difficulty,
                "rows": scenario.rows,
                "cols": scenario.cols,
                "maxTicks": scenario.max_ticks,
            }),
        );
        let scenario_run = run_scenario(&scenario, ledger);
        ledger = scenario_run.ledger.clone();

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_score += scenario_run.result.score as i64;
        *reason_counts
            .entry(run_reason_key(scenario_run.result.reason))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": scenario_run.result.reason,
                "score": scenario_run.result.score,
                "durationMs": scenario_run.result.duration_ms,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        reason_counts,
        total_anomalies,
        total_score,
        &ledger,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario, ledger: ScoreLedger) -> ScenarioRunResult {
    let mut game = Game::new(
        "Simulacra",
        scenario.mode,
        scenario.difficulty,
        scenario.seed,
        MatchOptions {
            rows: scenario.rows,
            cols: scenario.cols,
        },
        ledger,
    );

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut trap_kills = 0;
    let mut captures = 0;
    let mut escapes = 0;
    let mut last_running = 0i32;
    let mut finished_tick = 0u64;
    let mut reason = RunReason::Timeout;
    let mut final_score = 0i32;

    for tick in 1..=scenario.max_ticks {
        let now = game.started_at_ms + tick * TICK_MS;
        finished_tick = tick;

        drive_player(&mut game, scenario.mode, tick, now);

        let outcome = game.advance(now);
        let snapshot = game.snapshot(now);
        for message in collect_snapshot_anomalies(&snapshot, scenario) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                tick,
                message,
            );
        }

        // Running-score deltas classify what happened this tick. Terminal
        // ticks are skipped: win and loss both reset the running score.
        if outcome.is_none() {
            let delta = snapshot.running_score - last_running;
            if delta == maze_escape::constants::TRAP_KILL_BONUS {
                trap_kills += 1;
            } else if delta == maze_escape::constants::BASE_POINTS * 2 {
                captures += 1;
            } else if delta == -maze_escape::constants::BASE_POINTS {
                escapes += 1;
            }
            last_running = snapshot.running_score;
        }

        if let Some(outcome) = outcome {
            reason = match outcome {
                Outcome::Won => RunReason::Won,
                Outcome::Lost => RunReason::Lost,
            };
            if outcome == Outcome::Won {
                final_score = game
                    .ledger()
                    .history()
                    .iter()
                    .find(|record| record.recorded_at_ms == now)
                    .map(|record| record.score)
                    .unwrap_or(0);
            }
            break;
        }
    }

    if scenario.mode == GameMode::Hunter && !game.is_ended() {
        let now = game.started_at_ms + (finished_tick + 1) * TICK_MS;
        if let Some(score) = game.finalize(now) {
            reason = RunReason::Banked;
            final_score = score;
        }
    }

    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            mode: scenario.mode,
            difficulty: scenario.difficulty,
            reason,
            duration_ms: finished_tick * TICK_MS,
            score: final_score,
            trap_kills,
            captures,
            escapes,
            anomalies,
        },
        anomaly_records,
        finished_tick,
        ledger: game.into_ledger(),
    }
}

/// Scripted input policy. Escape runs for the exit and drops the odd trap
/// behind itself; hunter chases the nearest enemy. Both fall back to
/// standing still when no path exists this tick.
fn drive_player(game: &mut Game, mode: GameMode, tick: u64, now: u64) {
    let snapshot = game.snapshot(now);
    let player = snapshot.player.cell;
    let exit = Cell::new(game.grid().rows() - 1, game.grid().cols() - 1);

    let goal = match mode {
        GameMode::Escape => Some(exit),
        GameMode::Hunter => snapshot
            .enemies
            .iter()
            .filter(|enemy| enemy.behavior == Behavior::Flee)
            .map(|enemy| enemy.cell)
            .min_by_key(|cell| cell.manhattan(player)),
    };

    game.set_sprinting(snapshot.player.energy >= SPRINT_ENERGY_FLOOR);

    if mode == GameMode::Escape && tick % TRAP_INTERVAL_TICKS == 0 {
        game.handle_place_trap(now);
    }

    let Some(goal) = goal else {
        return;
    };
    let Some(next) = path::next_step(game.grid(), player, goal, TerrainKind::player_passable)
    else {
        return;
    };
    if let Some(direction) = Direction::between(player, next) {
        game.handle_move(direction);
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, scenario: &Scenario) -> Vec<String> {
    let mut anomalies = Vec::new();
    if !snapshot.player.energy.is_finite()
        || snapshot.player.energy < 0.0
        || snapshot.player.energy > 100.0
    {
        anomalies.push(format!("player energy out of range: {}", snapshot.player.energy));
    }

    if snapshot.live_traps > 3 {
        anomalies.push(format!("live trap cap exceeded: {}", snapshot.live_traps));
    }

    let in_bounds = |cell: Cell| {
        cell.row >= 0 && cell.col >= 0 && cell.row < scenario.rows && cell.col < scenario.cols
    };
    if !in_bounds(snapshot.player.cell) {
        anomalies.push(format!(
            "player out of bounds: ({}, {})",
            snapshot.player.cell.row, snapshot.player.cell.col
        ));
    }
    for enemy in &snapshot.enemies {
        if !in_bounds(enemy.cell) {
            anomalies.push(format!(
                "enemy out of bounds: ({}, {})",
                enemy.cell.row, enemy.cell.col
            ));
        }
    }

    if snapshot.trap_cooldown_ms > 5_000 {
        anomalies.push(format!(
            "trap cooldown beyond limit: {}",
            snapshot.trap_cooldown_ms
        ));
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| rand::random::<u64>()));
    let difficulty = match cli.difficulty.as_deref() {
        None => Difficulty::Normal,
        Some(raw) => match Difficulty::parse(raw) {
            Some(difficulty) => difficulty,
            None => {
                eprintln!("unknown difficulty: {raw} (expected easy|normal|hard)");
                std::process::exit(2);
            }
        },
    };
    let mode = match cli.mode.as_deref() {
        None => GameMode::Escape,
        Some(raw) => match GameMode::parse(raw) {
            Some(mode) => mode,
            None => {
                eprintln!("unknown mode: {raw} (expected escape|hunter)");
                std::process::exit(2);
            }
        },
    };
    let rows = clamp_i32(cli.rows.unwrap_or(15), 8, 64);
    let cols = clamp_i32(cli.cols.unwrap_or(15), 8, 64);

    if cli.single || cli.mode.is_some() || cli.ticks.is_some() {
        return vec![Scenario {
            name: format!("custom-{mode:?}").to_lowercase(),
            mode,
            difficulty,
            rows,
            cols,
            max_ticks: cli.ticks.unwrap_or(3_000).clamp(10, 100_000),
            seed,
        }];
    }

    vec![
        Scenario {
            name: "escape-normal".to_string(),
            mode: GameMode::Escape,
            difficulty,
            rows,
            cols,
            max_ticks: 3_000,
            seed,
        },
        Scenario {
            name: "hunter-normal".to_string(),
            mode: GameMode::Hunter,
            difficulty,
            rows,
            cols,
            max_ticks: 3_000,
            seed: normalize_seed(seed as u64 + 1),
        },
    ]
}

fn clamp_i32(value: i32, min: i32, max: i32) -> i32 {
    value.clamp(min, max)
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

#[allow(clippy::too_many_arguments)]
fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_score: i64,
    ledger: &ScoreLedger,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_score = if scenario_count == 0 {
        0
    } else {
        (total_score / scenario_count as i64) as i32
    };
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_score,
        reason_counts,
        top_escape: ledger.top(GameMode::Escape).to_vec(),
        top_hunter: ledger.top(GameMode::Hunter).to_vec(),
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn run_reason_key(reason: RunReason) -> String {
    match reason {
        RunReason::Won => "won",
        RunReason::Lost => "lost",
        RunReason::Banked => "banked",
        RunReason::Timeout => "timeout",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
