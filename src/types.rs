use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// Direction that takes `from` to the 4-adjacent cell `to`, if any.
    pub fn between(from: Cell, to: Cell) -> Option<Self> {
        match (to.row - from.row, to.col - from.col) {
            (-1, 0) => Some(Self::Up),
            (1, 0) => Some(Self::Down),
            (0, -1) => Some(Self::Left),
            (0, 1) => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Path,
    Wall,
    Tunnel,
    Vine,
}

impl TerrainKind {
    pub fn player_passable(self) -> bool {
        matches!(self, Self::Path | Self::Tunnel)
    }

    pub fn enemy_passable(self) -> bool {
        matches!(self, Self::Path | Self::Vine)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Escape,
    Hunter,
}

impl GameMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "escape" => Some(Self::Escape),
            "hunter" => Some(Self::Hunter),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    Pursue,
    Flee,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn manhattan(self, other: Self) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    pub fn offset(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self::new(self.row + dr, self.col + dc)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Trap {
    pub cell: Cell,
    #[serde(rename = "placedAtMs")]
    pub placed_at_ms: u64,
}

/// Outcome of a trap-placement intent, granular enough for HUD feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrapPlacement {
    Placed,
    AtCap,
    CoolingDown {
        #[serde(rename = "remainingMs")]
        remaining_ms: u64,
    },
    MatchOver,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerView {
    pub name: String,
    pub cell: Cell,
    pub energy: f32,
    pub sprinting: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EnemyView {
    pub cell: Cell,
    pub behavior: Behavior,
}

/// Read-only state handed to the rendering layer after each tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub traps: Vec<Cell>,
    #[serde(rename = "runningScore")]
    pub running_score: i32,
    #[serde(rename = "liveTraps")]
    pub live_traps: usize,
    #[serde(rename = "trapCooldownMs")]
    pub trap_cooldown_ms: u64,
    pub outcome: Option<Outcome>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopEntry {
    pub name: String,
    pub score: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchRecord {
    pub name: String,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub score: i32,
    #[serde(rename = "recordedAtMs")]
    pub recorded_at_ms: u64,
    #[serde(rename = "recordedAt")]
    pub recorded_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passability_matrix_matches_terrain_kinds() {
        assert!(TerrainKind::Path.player_passable());
        assert!(TerrainKind::Path.enemy_passable());
        assert!(!TerrainKind::Wall.player_passable());
        assert!(!TerrainKind::Wall.enemy_passable());
        assert!(TerrainKind::Tunnel.player_passable());
        assert!(!TerrainKind::Tunnel.enemy_passable());
        assert!(!TerrainKind::Vine.player_passable());
        assert!(TerrainKind::Vine.enemy_passable());
    }

    #[test]
    fn direction_between_covers_the_four_neighbors() {
        let center = Cell::new(5, 5);
        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            let neighbor = center.offset(direction);
            assert_eq!(Direction::between(center, neighbor), Some(direction));
        }
        assert_eq!(Direction::between(center, center), None);
        assert_eq!(Direction::between(center, Cell::new(7, 5)), None);
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        assert_eq!(Difficulty::parse("normal"), Some(Difficulty::Normal));
        assert_eq!(Difficulty::parse("nightmare"), None);
        assert_eq!(GameMode::parse("hunter"), Some(GameMode::Hunter));
        assert_eq!(GameMode::parse("cazador"), None);
    }
}
