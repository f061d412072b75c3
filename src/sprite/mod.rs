// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                         Stage Layout (505 x 606)                         │
// ├──────┬─────────┬──────────────────────────────────────────────────────────┤
// │ row  │ y (px)  │ contents                                                 │
// ├──────┼─────────┼──────────────────────────────────────────────────────────┤
// │  0   │  -27.5  │ water : reaching it is a win                             │
// │  1   │   58.0  │ stone : bug lane 0, gems                                 │
// │  2   │  143.5  │ stone : bug lane 1, gems                                 │
// │  3   │  229.0  │ stone : bug lane 2, gems                                 │
// │  4   │  314.5  │ grass                                                    │
// │  5   │  400.0  │ grass : spawn at column 2 (202, 400)                     │
// └──────┴─────────┴──────────────────────────────────────────────────────────┘
// Columns are 101px wide, 5 of them.

use crate::engine::{Point, Rect, Renderer, ResourceCache, Size};

pub mod enemy;
pub mod gem;
pub mod player;

pub const STAGE_WIDTH: f64 = 505.0;
pub const STAGE_HEIGHT: f64 = 606.0;

pub const COLUMNS: u8 = 5;
pub const ROWS: u8 = 6;
pub const TILE_WIDTH: f64 = 101.0;
pub const ROW_HEIGHT: f64 = 85.5;
const ROW_ORIGIN: f64 = -27.5;

pub const WATER_ROW: u8 = 0;
pub const SPAWN_TILE: Tile = Tile::new(2, ROWS - 1);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Maps `KeyboardEvent.code`; anything that is not an arrow is ignored
    pub fn from_key(code: &str) -> Option<Direction> {
        match code {
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// A cell of the movement grid
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Tile {
    pub col: u8,
    pub row: u8,
}

impl Tile {
    pub const fn new(col: u8, row: u8) -> Self {
        Tile { col, row }
    }

    /// Top left pixel of whatever stands on this tile
    pub fn position(&self) -> Point {
        Point {
            x: f64::from(self.col) * TILE_WIDTH,
            y: ROW_ORIGIN + f64::from(self.row) * ROW_HEIGHT,
        }
    }

    /// The neighbouring tile, or `None` at the edge of the grid
    pub fn step(self, direction: Direction) -> Option<Tile> {
        let Tile { col, row } = self;
        match direction {
            Direction::Left => col.checked_sub(1).map(|col| Tile { col, row }),
            Direction::Right => (col + 1 < COLUMNS).then(|| Tile { col: col + 1, row }),
            Direction::Up => row.checked_sub(1).map(|row| Tile { col, row }),
            Direction::Down => (row + 1 < ROWS).then(|| Tile { col, row: row + 1 }),
        }
    }
}

/// Image, size and position shared by every entity. Owned by the entity
/// that embeds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub image: &'static str,
    pub size: Size,
    pub position: Point,
}

impl Sprite {
    pub fn new(image: &'static str, size: Size, position: Point) -> Self {
        Sprite {
            image,
            size,
            position,
        }
    }
}

pub trait Entity {
    fn sprite(&self) -> &Sprite;

    fn position(&self) -> Point {
        self.sprite().position
    }

    fn bounding_box(&self) -> Rect {
        Rect::new(self.sprite().position, self.sprite().size)
    }

    /// Where the image lands; may differ from the bounding box
    fn draw_position(&self) -> Point {
        self.sprite().position
    }

    fn draw(&self, renderer: &Renderer, resources: &ResourceCache) {
        if let Some(image) = resources.get(self.sprite().image) {
            renderer.draw_entire_image(image, &self.draw_position());
        }
    }
}
