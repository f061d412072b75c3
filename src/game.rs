use crate::browser;
use crate::config::GameConfig;
use crate::engine::input::InputEvent;
use crate::engine::{Game, Point, Rect, Renderer, ResourceCache, Size, TextStyle};
use crate::session::{Event, SessionMachine, World};
use crate::sprite::enemy::ENEMY_IMAGE;
use crate::sprite::gem::GEM_IMAGE;
use crate::sprite::player::AVATARS;
use crate::sprite::{Direction, Entity, COLUMNS, ROWS, STAGE_HEIGHT, STAGE_WIDTH, TILE_WIDTH};
use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// TABLE
/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌──────────────┐   │
/// │    │  engine.rs  │  events  │   game.rs   │  Event   │  session.rs  │   │
/// │    │  GameLoop   ├─────────►│   Frogger   ├─────────►│SessionMachine│   │
/// │    │  + input    │  + dt    │             │          │  transition  │   │
/// │    └─────────────┘          └──────┬──────┘          └──────────────┘   │
/// │                                    │ draw                               │
/// │                              ┌─────┴──────┐                             │
/// │                              │  Renderer  │                             │
/// │                              │  + cache   │                             │
/// │                              └────────────┘                             │
/// │                                                                         │
/// ├──────────────────────── Call Sequence ──────────────────────────────────┤
/// │  1. key ups and clicks become `Event`s, in arrival order                │
/// │  2. one `Event::Tick(dt)` per frame: timers, movement, collisions       │
/// │  3. draw: stage, then intro or world, player last                       │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum Frogger {
    /// Config and images are still being fetched
    Loading,
    Loaded(Arcade),
}

pub struct Arcade {
    resources: ResourceCache,
    // only `None` for the instant a transition holds the machine
    machine: Option<SessionMachine>,
}

const CONFIG_PATH: &str = "frogger.json";

const WATER_BLOCK: &str = "images/water-block.png";
const STONE_BLOCK: &str = "images/stone-block.png";
const GRASS_BLOCK: &str = "images/grass-block.png";
const START_BANNER: &str = "images/start-message.png";

/// Top to bottom
const ROW_IMAGES: [&str; ROWS as usize] = [
    WATER_BLOCK,
    STONE_BLOCK,
    STONE_BLOCK,
    STONE_BLOCK,
    GRASS_BLOCK,
    GRASS_BLOCK,
];
// background tiles overlap, they are laid out tighter than their height
const BLOCK_STEP: f64 = 83.0;
const INTRO_AVATAR_Y: f64 = 400.0;

const MESSAGE_POSITION: Point = Point::new(STAGE_WIDTH / 2.0, 40.0);
const MESSAGE_STYLE: TextStyle = TextStyle {
    font: "24px sans-serif",
    color: "#a12a04",
    align: "center",
};

// avatar picker hit area, in canvas pixels, exclusive on every side
const PICKER_TOP: f64 = 430.0;
const PICKER_BOTTOM: f64 = 575.0;
const PICKER_RIGHT: f64 = 600.0;

impl Frogger {
    pub fn new() -> Self {
        Frogger::Loading
    }

    async fn load_config() -> GameConfig {
        match browser::fetch_json::<GameConfig>(CONFIG_PATH).await {
            Ok(config) => config,
            Err(err) => {
                log::warn!("{} unavailable, using defaults : {:#}", CONFIG_PATH, err);
                GameConfig::default()
            }
        }
    }
}

impl Default for Frogger {
    fn default() -> Self {
        Frogger::new()
    }
}

#[async_trait(?Send)]
impl Game for Frogger {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            Frogger::Loading => {
                let mut urls = vec![
                    WATER_BLOCK,
                    STONE_BLOCK,
                    GRASS_BLOCK,
                    ENEMY_IMAGE,
                    GEM_IMAGE,
                    START_BANNER,
                ];
                urls.extend(AVATARS);
                // the config is optional, images are not
                let (config, resources) =
                    futures::join!(Self::load_config(), ResourceCache::load(&urls));
                Ok(Box::new(Frogger::Loaded(Arcade {
                    resources: resources?,
                    machine: Some(SessionMachine::new(config)),
                })))
            }
            Frogger::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, dt: f64, input: &[InputEvent]) {
        if let Frogger::Loaded(arcade) = self {
            if let Some(mut machine) = arcade.machine.take() {
                for event in input.iter().filter_map(to_event) {
                    machine = machine.transition(event);
                }
                arcade.machine.replace(machine.transition(Event::Tick(dt)));
            }
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let Frogger::Loaded(arcade) = self {
            renderer.clear(&Rect::new(
                Point::default(),
                Size::new(STAGE_WIDTH, STAGE_HEIGHT),
            ));
            arcade.draw_stage(renderer);
            match arcade.machine.as_ref().and_then(SessionMachine::world) {
                Some(world) => arcade.draw_world(world, renderer),
                None => arcade.draw_intro(renderer),
            }
        }
    }
}

impl Arcade {
    fn draw_stage(&self, renderer: &Renderer) {
        for (row, url) in ROW_IMAGES.iter().enumerate() {
            if let Some(image) = self.resources.get(url) {
                for col in 0..COLUMNS {
                    let position =
                        Point::new(f64::from(col) * TILE_WIDTH, row as f64 * BLOCK_STEP);
                    renderer.draw_entire_image(image, &position);
                }
            }
        }
    }

    fn draw_intro(&self, renderer: &Renderer) {
        for (index, url) in AVATARS.iter().enumerate() {
            if let Some(image) = self.resources.get(url) {
                let position = Point::new(index as f64 * TILE_WIDTH, INTRO_AVATAR_Y);
                renderer.draw_entire_image(image, &position);
            }
        }
        if let Some(banner) = self.resources.get(START_BANNER) {
            renderer.draw_entire_image(banner, &Point::default());
        }
    }

    /// Draw order matters : bugs -> gem -> message -> player
    fn draw_world(&self, world: &World, renderer: &Renderer) {
        for enemy in world.roster().iter() {
            enemy.draw(renderer, &self.resources);
        }
        if let Some(gem) = world.gem() {
            gem.draw(renderer, &self.resources);
        }
        renderer.set_text_style(&MESSAGE_STYLE);
        renderer.draw_text(world.message(), &MESSAGE_POSITION);
        world.player().draw(renderer, &self.resources);
    }
}

fn to_event(input: &InputEvent) -> Option<Event> {
    match input {
        InputEvent::KeyUp(code) => Direction::from_key(code).map(Event::Move),
        InputEvent::Click { x, y } => avatar_at(*x, *y).map(Event::SelectAvatar),
    }
}

/// Index of the avatar under a canvas click, if any
pub fn avatar_at(x: f64, y: f64) -> Option<usize> {
    let inside = x > 0.0 && x < PICKER_RIGHT && y > PICKER_TOP && y < PICKER_BOTTOM;
    if !inside {
        return None;
    }
    let column = (x / TILE_WIDTH) as usize;
    Some(column.min(AVATARS.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicks_pick_the_column_under_them() {
        assert_eq!(avatar_at(50.0, 500.0), Some(0));
        assert_eq!(avatar_at(101.0, 500.0), Some(1));
        assert_eq!(avatar_at(250.0, 431.0), Some(2));
        assert_eq!(avatar_at(404.0, 574.0), Some(4));
    }

    #[test]
    fn right_margin_maps_to_the_last_avatar() {
        assert_eq!(avatar_at(520.0, 500.0), Some(4));
        assert_eq!(avatar_at(599.0, 500.0), Some(4));
    }

    #[test]
    fn clicks_outside_the_picker_are_ignored() {
        assert_eq!(avatar_at(50.0, 430.0), None);
        assert_eq!(avatar_at(50.0, 575.0), None);
        assert_eq!(avatar_at(0.0, 500.0), None);
        assert_eq!(avatar_at(600.0, 500.0), None);
        assert_eq!(avatar_at(250.0, 100.0), None);
    }

    #[test]
    fn only_arrow_keys_become_moves() {
        assert_eq!(
            to_event(&InputEvent::KeyUp("ArrowUp".into())),
            Some(Event::Move(Direction::Up))
        );
        assert_eq!(to_event(&InputEvent::KeyUp("Space".into())), None);
        assert_eq!(
            to_event(&InputEvent::Click { x: 303.0, y: 500.0 }),
            Some(Event::SelectAvatar(3))
        );
    }
}
