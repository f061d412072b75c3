use serde::{Deserialize, Deserializer, Serialize};

/// Gameplay tunables, fetched from `frogger.json` when it is served next to
/// the wasm bundle. Every field has a default, so a partial file only
/// overrides what it names.
///
/// ```json
/// { "enemy": { "max_count": 6 }, "seed": 1234 }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub enemy: EnemyConfig,
    pub gem: GemConfig,
    pub scoring: ScoringConfig,
    pub pauses: PauseConfig,
    /// Fixed seed for a replayable session
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Floor of every sampled speed, pixels per second
    pub min_speed: u32,
    /// Speed ceiling at score zero; the live ceiling is this plus the score
    pub baseline_base: u32,
    pub initial_count: usize,
    pub max_count: usize,
    pub spawn_interval_ms: f64,
}

impl EnemyConfig {
    pub fn baseline_for(&self, score: u32) -> u32 {
        self.baseline_base + score
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            min_speed: 50,
            baseline_base: 65,
            initial_count: 3,
            max_count: 8,
            spawn_interval_ms: 1500.0,
        }
    }
}

/// `offset + rand(0..range)` whole seconds
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct SecondsRange {
    pub range: u32,
    pub offset: i32,
}

impl SecondsRange {
    pub const fn new(range: u32, offset: i32) -> Self {
        SecondsRange { range, offset }
    }
}

/// A range as written in the file, either half may be missing
#[derive(Deserialize)]
struct PartialRange {
    range: Option<u32>,
    offset: Option<i32>,
}

impl PartialRange {
    fn or(self, fallback: SecondsRange) -> SecondsRange {
        SecondsRange {
            range: self.range.unwrap_or(fallback.range),
            offset: self.offset.unwrap_or(fallback.offset),
        }
    }
}

// each range falls back half by half to its own default
fn first_delay<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecondsRange, D::Error> {
    PartialRange::deserialize(deserializer).map(|partial| partial.or(FIRST_DELAY))
}

fn respawn_delay<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecondsRange, D::Error> {
    PartialRange::deserialize(deserializer).map(|partial| partial.or(RESPAWN_DELAY))
}

fn lifespan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecondsRange, D::Error> {
    PartialRange::deserialize(deserializer).map(|partial| partial.or(LIFESPAN))
}

const FIRST_DELAY: SecondsRange = SecondsRange::new(5, 1);
const RESPAWN_DELAY: SecondsRange = SecondsRange::new(5, 3);
const LIFESPAN: SecondsRange = SecondsRange::new(4, 4);

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GemConfig {
    /// Wait before the first gem once the player has scored
    #[serde(deserialize_with = "first_delay")]
    pub first_delay: SecondsRange,
    /// Wait before the next gem after one expires or is collected
    #[serde(deserialize_with = "respawn_delay")]
    pub respawn_delay: SecondsRange,
    #[serde(deserialize_with = "lifespan")]
    pub lifespan: SecondsRange,
    pub value: u32,
}

impl Default for GemConfig {
    fn default() -> Self {
        GemConfig {
            first_delay: FIRST_DELAY,
            respawn_delay: RESPAWN_DELAY,
            lifespan: LIFESPAN,
            value: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub win_value: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig { win_value: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PauseConfig {
    pub win_ms: f64,
    pub death_ms: f64,
}

impl Default for PauseConfig {
    fn default() -> Self {
        PauseConfig {
            win_ms: 1000.0,
            death_ms: 750.0,
        }
    }
}
