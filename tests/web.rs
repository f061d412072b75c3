//! Runs the session core inside a real browser, with `getrandom` backed by
//! the page's crypto source
#![cfg(target_arch = "wasm32")]

use frogger_arcade::config::GameConfig;
use frogger_arcade::engine::frame_delta;
use frogger_arcade::session::{Event, SessionMachine, SessionState};
use frogger_arcade::sprite::Direction;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn entropy_seeded_session_starts() {
    // the default config carries no seed
    let machine = SessionMachine::new(GameConfig::default()).transition(Event::SelectAvatar(1));
    assert_eq!(machine.state(), SessionState::Playing);
    let machine = (0..20).fold(machine, |machine, _| machine.transition(Event::Tick(0.05)));
    let world = machine.world().expect("playing has a world");
    assert!(world.roster().len() >= 1);
    assert_eq!(world.elapsed(), 1_000.0);
}

#[wasm_bindgen_test]
fn hop_to_the_water() {
    let mut machine =
        SessionMachine::new(GameConfig::default()).transition(Event::SelectAvatar(0));
    for _ in 0..5 {
        machine = machine.transition(Event::Move(Direction::Up));
    }
    assert_eq!(machine.state(), SessionState::WinPause);
    assert_eq!(machine.world().map(|world| world.score()), Some(10));
}

#[wasm_bindgen_test]
fn frame_delta_from_performance_stamps() {
    assert_eq!(frame_delta(0.0, 500.0), 0.25);
    assert_eq!(frame_delta(0.0, 100.0), 0.1);
}
