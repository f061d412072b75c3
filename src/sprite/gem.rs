use crate::engine::Size;
use crate::sprite::{Entity, Sprite, Tile};
use crate::timer::TimerId;

pub const GEM_IMAGE: &str = "images/Gem-Blue.png";

const GEM_SIZE: Size = Size::new(74.0, 82.0);

/// Collectible on a stone tile. Holds the handle of its own expiry timer so
/// that whoever removes it can cancel that timer.
#[derive(Debug, Clone)]
pub struct Gem {
    sprite: Sprite,
    tile: Tile,
    lifespan: TimerId,
}

impl Gem {
    pub fn new(tile: Tile, lifespan: TimerId) -> Self {
        Gem {
            sprite: Sprite::new(GEM_IMAGE, GEM_SIZE, tile.position()),
            tile,
            lifespan,
        }
    }

    pub fn tile(&self) -> Tile {
        self.tile
    }

    pub fn lifespan(&self) -> TimerId {
        self.lifespan
    }
}

impl Entity for Gem {
    fn sprite(&self) -> &Sprite {
        &self.sprite
    }
}
