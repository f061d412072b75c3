use crate::config::EnemyConfig;
use crate::engine::Rect;
use crate::rng::RandomSource;
use crate::sprite::enemy::{Enemy, SpeedRange};
use crate::sprite::Entity;

/// Every bug on stage, in spawn order.
///
/// ┌──────────── Roster Size Over A Session ─────────────┐
/// │  start     →  1, +1 every 1.5s    →  initial (3)    │
/// │  win       →  +1                  →  capped at 8    │
/// │  death     →  truncate            →  initial (3)    │
/// └─────────────────────────────────────────────────────┘
/// Any score change resamples every speed, not only the next spawn.
#[derive(Debug, Clone)]
pub struct Roster {
    enemies: Vec<Enemy>,
    config: EnemyConfig,
    speed_range: SpeedRange,
}

impl Roster {
    pub fn new(config: EnemyConfig) -> Self {
        let speed_range = SpeedRange {
            min: config.min_speed,
            max: config.baseline_for(0),
        };
        Roster {
            enemies: Vec::with_capacity(config.max_count),
            config,
            speed_range,
        }
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn speed_range(&self) -> SpeedRange {
        self.speed_range
    }

    /// One step of the opening spawn-in. Adds a bug while the roster is below
    /// its initial size and reports whether another step is still needed.
    pub fn spawn_in(&mut self, rng: &mut RandomSource) -> bool {
        if self.enemies.len() < self.config.initial_count {
            self.push(rng);
        }
        self.enemies.len() < self.config.initial_count
    }

    /// Win reward: one more bug, up to the cap
    pub fn grow(&mut self, rng: &mut RandomSource) -> bool {
        if self.enemies.len() >= self.config.max_count {
            return false;
        }
        self.push(rng);
        log::debug!("roster grew to {}", self.enemies.len());
        true
    }

    pub fn rescale(&mut self, score: u32, rng: &mut RandomSource) {
        self.speed_range = SpeedRange {
            min: self.config.min_speed,
            max: self.config.baseline_for(score),
        };
        for enemy in self.enemies.iter_mut() {
            enemy.set_speed(self.speed_range, rng);
        }
    }

    /// Back to the opening roster at the score zero baseline
    pub fn reset(&mut self, rng: &mut RandomSource) {
        self.enemies.truncate(self.config.initial_count);
        self.rescale(0, rng);
        log::debug!("roster reset to {}", self.enemies.len());
    }

    pub fn update(&mut self, dt: f64, rng: &mut RandomSource) {
        for enemy in self.enemies.iter_mut() {
            enemy.update(dt, rng);
        }
    }

    pub fn hits(&self, target: &Rect) -> bool {
        self.enemies
            .iter()
            .any(|enemy| enemy.bounding_box().intersects(target))
    }

    fn push(&mut self, rng: &mut RandomSource) {
        self.enemies.push(Enemy::new(self.speed_range, rng));
    }

    #[cfg(test)]
    pub(crate) fn first_mut(&mut self) -> Option<&mut Enemy> {
        self.enemies.first_mut()
    }
}
