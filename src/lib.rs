// ==================== Imports ====================
use wasm_bindgen::prelude::*;

mod browser;
pub mod config;
pub mod engine;
pub mod game;
pub mod gem_spawner;
pub mod rng;
pub mod roster;
pub mod session;
pub mod sprite;
pub mod timer;

use engine::GameLoop;
use game::Frogger;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs panic hook and console logger
/// - loads config and images
/// - starts the frame loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&format!("logger already set : {}", err).into());
    }

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(Frogger::new()).await {
            log::error!("could not start game : {:#?}", err);
        }
    });

    Ok(())
}
