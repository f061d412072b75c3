use crate::engine::{Point, Size};
use crate::rng::RandomSource;
use crate::sprite::{Direction, Entity, Sprite, Tile, SPAWN_TILE, WATER_ROW};

pub const AVATARS: [&str; 5] = [
    "images/char-boy.png",
    "images/char-cat-girl.png",
    "images/char-horn-girl.png",
    "images/char-pink-girl.png",
    "images/char-princess-girl.png",
];

const PLAYER_SIZE: Size = Size::new(60.0, 84.0);

// death shake, each axis moves by -2..=2 per tick
const JITTER_RANGE: u32 = 5;
const JITTER_OFFSET: i32 = -2;

/// What the player tells whoever drives it. The player never scores itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayerSignal {
    ReachedWater,
}

#[derive(Debug, Clone)]
pub struct Player {
    sprite: Sprite,
    tile: Tile,
    // render only offset, collision and win logic use `tile`
    jitter: Point,
    is_alive: bool,
    score: u32,
}

impl Player {
    pub fn new(image: &'static str) -> Self {
        Player {
            sprite: Sprite::new(image, PLAYER_SIZE, SPAWN_TILE.position()),
            tile: SPAWN_TILE,
            jitter: Point::default(),
            is_alive: true,
            score: 0,
        }
    }

    pub fn tile(&self) -> Tile {
        self.tile
    }

    pub fn occupies(&self, tile: Tile) -> bool {
        self.tile == tile
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_score(&mut self, points: u32) -> u32 {
        self.score += points;
        self.score
    }

    /// One tile per key. Moves that would leave the grid are dropped
    /// silently; stepping onto the water row signals a win.
    pub fn handle_input(&mut self, direction: Direction) -> Option<PlayerSignal> {
        if !self.is_alive {
            return None;
        }
        let next = self.tile.step(direction)?;
        self.move_to(next);
        (next.row == WATER_ROW).then_some(PlayerSignal::ReachedWater)
    }

    pub fn update(&mut self, rng: &mut RandomSource) {
        if !self.is_alive {
            self.jitter.x += f64::from(rng.int(JITTER_RANGE, JITTER_OFFSET));
            self.jitter.y += f64::from(rng.int(JITTER_RANGE, JITTER_OFFSET));
        }
    }

    /// Returns `false` if the player was already dead
    pub fn die(&mut self) -> bool {
        if !self.is_alive {
            return false;
        }
        self.is_alive = false;
        self.score = 0;
        true
    }

    pub fn start_over(&mut self) {
        self.reset_to_spawn();
        self.is_alive = true;
    }

    pub fn reset_to_spawn(&mut self) {
        self.move_to(SPAWN_TILE);
        self.jitter = Point::default();
    }

    fn move_to(&mut self, tile: Tile) {
        self.tile = tile;
        self.sprite.position = tile.position();
    }
}

impl Entity for Player {
    fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    fn draw_position(&self) -> Point {
        self.sprite.position.offset(self.jitter)
    }
}
