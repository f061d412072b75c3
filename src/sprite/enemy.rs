use crate::engine::{Point, Size};
use crate::rng::RandomSource;
use crate::sprite::{Entity, Sprite, ROW_HEIGHT, STAGE_WIDTH};

pub const ENEMY_IMAGE: &str = "images/enemy-bug.png";

const ENEMY_SIZE: Size = Size::new(90.0, 68.0);
const LANES: u32 = 3;
const LANE_TOP: f64 = 60.0;
// off stage, one bug length to the left
const START_X: f64 = -100.0;

/// Inclusive pixels per second window an enemy samples its speed from.
/// `max` is the score dependent baseline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SpeedRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    sprite: Sprite,
    speed: f64,
    lane: u8,
    speed_range: SpeedRange,
}

impl Enemy {
    /// A bug waiting off stage in a random lane
    pub fn new(speed_range: SpeedRange, rng: &mut RandomSource) -> Self {
        let mut enemy = Enemy {
            sprite: Sprite::new(ENEMY_IMAGE, ENEMY_SIZE, Point::new(START_X, LANE_TOP)),
            speed: 0.0,
            lane: 0,
            speed_range,
        };
        enemy.relocate(rng);
        enemy.set_speed(speed_range, rng);
        enemy
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn lane(&self) -> u8 {
        self.lane
    }

    pub fn speed_range(&self) -> SpeedRange {
        self.speed_range
    }

    /// Advance by `speed * dt`; once past the right edge, re-enter from the
    /// left in a fresh lane at a fresh speed
    pub fn update(&mut self, dt: f64, rng: &mut RandomSource) {
        self.sprite.position.x += self.speed * dt;
        if self.sprite.position.x > STAGE_WIDTH {
            self.relocate(rng);
            self.set_speed(self.speed_range, rng);
        }
    }

    pub fn set_speed(&mut self, speed_range: SpeedRange, rng: &mut RandomSource) {
        self.speed_range = speed_range;
        self.speed = f64::from(rng.int_between(speed_range.min, speed_range.max));
    }

    fn relocate(&mut self, rng: &mut RandomSource) {
        self.lane = rng.int(LANES, 0) as u8;
        self.sprite.position = Point::new(START_X, LANE_TOP + f64::from(self.lane) * ROW_HEIGHT);
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, position: Point, speed: f64) {
        self.sprite.position = position;
        self.speed = speed;
    }
}

impl Entity for Enemy {
    fn sprite(&self) -> &Sprite {
        &self.sprite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RANGE: SpeedRange = SpeedRange { min: 50, max: 65 };

    #[test]
    fn spawns_off_stage_in_a_lane() {
        let mut dice = RandomSource::seeded(1);
        for _ in 0..50 {
            let enemy = Enemy::new(RANGE, &mut dice);
            assert!(enemy.position().x < 0.0);
            assert!(u32::from(enemy.lane()) < LANES);
            assert_relative_eq!(
                enemy.position().y,
                LANE_TOP + f64::from(enemy.lane()) * ROW_HEIGHT
            );
            assert!((50.0..=65.0).contains(&enemy.speed()));
        }
    }

    #[test]
    fn half_second_at_eighty() {
        let mut dice = RandomSource::seeded(1);
        let mut enemy = Enemy::new(RANGE, &mut dice);
        let y = enemy.position().y;
        enemy.place(Point::new(-100.0, y), 80.0);
        enemy.update(0.5, &mut dice);
        assert_relative_eq!(enemy.position().x, -60.0);
        assert_relative_eq!(enemy.position().y, y);
        assert_relative_eq!(enemy.speed(), 80.0);
    }

    #[test]
    fn advances_monotonically_until_the_edge() {
        let mut dice = RandomSource::seeded(2);
        let mut enemy = Enemy::new(RANGE, &mut dice);
        let mut last_x = enemy.position().x;
        for _ in 0..10_000 {
            let speed = enemy.speed();
            enemy.update(1.0 / 60.0, &mut dice);
            let x = enemy.position().x;
            if x < last_x {
                // recycled: back to the left, resampled in range
                assert_relative_eq!(x, START_X);
                assert!((50.0..=65.0).contains(&enemy.speed()));
            } else {
                assert_relative_eq!(x, last_x + speed / 60.0, epsilon = 1e-9);
            }
            last_x = x;
        }
    }

    #[test]
    fn zero_dt_stands_still() {
        let mut dice = RandomSource::seeded(3);
        let mut enemy = Enemy::new(RANGE, &mut dice);
        let before = enemy.position();
        enemy.update(0.0, &mut dice);
        assert_eq!(enemy.position(), before);
    }

    #[test]
    fn leaving_the_stage_recycles() {
        let mut dice = RandomSource::seeded(4);
        let mut enemy = Enemy::new(RANGE, &mut dice);
        enemy.place(Point::new(STAGE_WIDTH - 1.0, LANE_TOP), 60.0);
        enemy.update(0.5, &mut dice);
        assert_relative_eq!(enemy.position().x, START_X);
        assert!((50.0..=65.0).contains(&enemy.speed()));
    }

    #[test]
    fn resampling_uses_the_new_baseline() {
        let mut dice = RandomSource::seeded(5);
        let mut enemy = Enemy::new(RANGE, &mut dice);
        let harder = SpeedRange { min: 50, max: 95 };
        enemy.set_speed(harder, &mut dice);
        assert_eq!(enemy.speed_range(), harder);
        assert!((50.0..=95.0).contains(&enemy.speed()));
    }
}
