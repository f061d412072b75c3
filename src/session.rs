use crate::config::GameConfig;
use crate::gem_spawner::{GemSpawner, GemTimer};
use crate::rng::RandomSource;
use crate::roster::Roster;
use crate::sprite::gem::Gem;
use crate::sprite::player::{Player, PlayerSignal, AVATARS};
use crate::sprite::{Direction, Entity};
use crate::timer::{Scheduler, TimerId};

pub const START_MESSAGE: &str = "Use arrow keys to hop to water!";
const DEATH_MESSAGE: &str = "Ah, too bad! Start over...";

/// ELI5:
/// ┌──────────────── Session Transition Flow ─────────────────┐
/// │  From State  →  Event            →  To State             │
/// ├──────────────────────────────────────────────────────────┤
/// │  Intro       →  avatar picked    →  Playing              │
/// │  Playing     →  reached water    →  WinPause             │
/// │  Playing     →  bug collision    →  DeathPause           │
/// │  ----------     ---------------                          │
/// │  WinPause    →  1000ms elapsed   →  Playing              │
/// │  DeathPause  →  750ms elapsed    →  Playing              │
/// └──────────────────────────────────────────────────────────┘
/// Movement and collision checks only exist in `Playing`. Bugs, timers and
/// the death shake keep running in every state after the intro.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Intro,
    Playing,
    WinPause,
    DeathPause,
}

/// Payload of every timer the session schedules
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    SpawnEnemy,
    Resume,
    Gem(GemTimer),
}

impl From<GemTimer> for TimerEvent {
    fn from(timer: GemTimer) -> Self {
        TimerEvent::Gem(timer)
    }
}

/// Everything a running session owns. Only the session states mutate it,
/// from a tick or from an input event, never both at once.
pub struct World {
    config: GameConfig,
    rng: RandomSource,
    scheduler: Scheduler<TimerEvent>,
    player: Player,
    roster: Roster,
    gems: GemSpawner,
    message: String,
}

impl World {
    fn new(config: GameConfig, rng: RandomSource, avatar: &'static str) -> Self {
        let mut world = World {
            rng,
            scheduler: Scheduler::new(),
            player: Player::new(avatar),
            roster: Roster::new(config.enemy.clone()),
            gems: GemSpawner::new(config.gem.clone()),
            message: START_MESSAGE.to_string(),
            config,
        };
        // first bug right away, the rest trickle in
        if world.roster.spawn_in(&mut world.rng) {
            world
                .scheduler
                .schedule(world.config.enemy.spawn_interval_ms, TimerEvent::SpawnEnemy);
        }
        world
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn gem(&self) -> Option<&Gem> {
        self.gems.gem()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn score(&self) -> u32 {
        self.player.score()
    }

    /// Milliseconds of simulated time since the avatar was picked
    pub fn elapsed(&self) -> f64 {
        self.scheduler.now()
    }

    /// Advance the clock and run every timer that came due. Reports whether
    /// `resume` was among them.
    fn run_timers(&mut self, dt: f64, resume: Option<TimerId>) -> bool {
        self.scheduler.advance(dt * 1000.0);
        let mut resumed = false;
        while let Some((id, event)) = self.scheduler.pop_due() {
            match event {
                TimerEvent::SpawnEnemy => {
                    if self.roster.spawn_in(&mut self.rng) {
                        self.scheduler
                            .schedule(self.config.enemy.spawn_interval_ms, TimerEvent::SpawnEnemy);
                    }
                }
                TimerEvent::Gem(timer) => {
                    let player = self.player.tile();
                    self.gems
                        .on_timer(id, timer, player, &mut self.scheduler, &mut self.rng);
                }
                TimerEvent::Resume if resume == Some(id) => resumed = true,
                TimerEvent::Resume => {
                    debug_assert!(resume.is_some(), "resume timer fired outside a pause");
                    log::warn!("ignoring stale resume timer {:?}", id);
                }
            }
        }
        resumed
    }

    fn update_entities(&mut self, dt: f64) {
        self.roster.update(dt, &mut self.rng);
        self.player.update(&mut self.rng);
    }

    fn show_score(&mut self) {
        self.message = format!("Your score: {}", self.player.score());
    }
}

/// Waiting for an avatar. Holds what the world will be built from.
pub struct Intro {
    config: GameConfig,
    rng: RandomSource,
}

impl Intro {
    pub fn new(config: GameConfig) -> Self {
        let rng = RandomSource::new(config.seed);
        Intro { config, rng }
    }

    pub fn select(self, avatar: &'static str) -> Session<Playing> {
        log::info!("avatar {} selected, session starts", avatar);
        Session {
            world: World::new(self.config, self.rng, avatar),
            state: Playing,
        }
    }
}

pub struct Playing;

pub struct WinPause {
    resume: TimerId,
}

pub struct DeathPause {
    resume: TimerId,
}

/// A running session in state `S`. Transitions consume the session, so a
/// stale state can not be touched after it was left.
pub struct Session<S> {
    world: World,
    state: S,
}

impl<S> Session<S> {
    pub fn world(&self) -> &World {
        &self.world
    }
}

/// Playing can:
/// - Continue
/// - Win   (reached water)
/// - Die   (bug collision)
pub enum IsPlaying {
    Playing(Session<Playing>),
    Won(Session<WinPause>),
    Died(Session<DeathPause>),
}

/// Pauses either keep waiting or hand control back to Playing
pub enum IsPaused<S> {
    Done(Session<Playing>),
    Waiting(Session<S>),
}

impl Session<Playing> {
    pub fn handle_input(mut self, direction: Direction) -> IsPlaying {
        match self.world.player.handle_input(direction) {
            Some(PlayerSignal::ReachedWater) => IsPlaying::Won(self.win()),
            None => IsPlaying::Playing(self),
        }
    }

    /// timers → positions → collisions, in that order
    pub fn update(mut self, dt: f64) -> IsPlaying {
        self.world.run_timers(dt, None);
        self.world.update_entities(dt);

        let hitbox = self.world.player.bounding_box();
        if self.world.roster.hits(&hitbox) {
            return IsPlaying::Died(self.die());
        }

        if let Some(points) = self.world.gems.collect(
            &self.world.player,
            &mut self.world.scheduler,
            &mut self.world.rng,
        ) {
            self.world.player.add_score(points);
            self.world.show_score();
        }
        IsPlaying::Playing(self)
    }

    fn win(mut self) -> Session<WinPause> {
        let world = &mut self.world;
        let score = world.player.add_score(world.config.scoring.win_value);
        world.show_score();
        world.roster.rescale(score, &mut world.rng);
        world.roster.grow(&mut world.rng);
        if score > 0 {
            world.gems.arm(&mut world.scheduler, &mut world.rng);
        }
        let resume = world
            .scheduler
            .schedule(world.config.pauses.win_ms, TimerEvent::Resume);
        log::info!("reached the water, score {}", score);
        Session {
            world: self.world,
            state: WinPause { resume },
        }
    }

    fn die(mut self) -> Session<DeathPause> {
        let world = &mut self.world;
        world.player.die();
        world.message = DEATH_MESSAGE.to_string();
        world.roster.reset(&mut world.rng);
        world.gems.cancel(&mut world.scheduler);
        let resume = world
            .scheduler
            .schedule(world.config.pauses.death_ms, TimerEvent::Resume);
        log::info!("squashed, back to zero");
        Session {
            world: self.world,
            state: DeathPause { resume },
        }
    }
}

/// Shared shape of the two pauses
pub trait Pause {
    fn resume_timer(&self) -> TimerId;
    /// Runs once, right before play continues
    fn on_resume(world: &mut World);
}

impl Pause for WinPause {
    fn resume_timer(&self) -> TimerId {
        self.resume
    }

    fn on_resume(world: &mut World) {
        world.player.reset_to_spawn();
    }
}

impl Pause for DeathPause {
    fn resume_timer(&self) -> TimerId {
        self.resume
    }

    fn on_resume(world: &mut World) {
        world.player.start_over();
    }
}

impl Session<WinPause> {
    pub fn update(self, dt: f64) -> IsPaused<WinPause> {
        self.pause_update(dt)
    }
}

impl Session<DeathPause> {
    pub fn update(self, dt: f64) -> IsPaused<DeathPause> {
        self.pause_update(dt)
    }
}

impl<S: Pause> Session<S> {
    fn pause_update(mut self, dt: f64) -> IsPaused<S> {
        let resumed = self.world.run_timers(dt, Some(self.state.resume_timer()));
        self.world.update_entities(dt);
        if !resumed {
            return IsPaused::Waiting(self);
        }
        S::on_resume(&mut self.world);
        log::debug!("pause over, back to play");
        IsPaused::Done(Session {
            world: self.world,
            state: Playing,
        })
    }
}

/// What drives the machine: one input or one frame
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Event {
    SelectAvatar(usize),
    Move(Direction),
    Tick(f64),
}

pub enum SessionMachine {
    Intro(Intro),
    Playing(Session<Playing>),
    WinPause(Session<WinPause>),
    DeathPause(Session<DeathPause>),
}

impl From<Session<Playing>> for SessionMachine {
    fn from(session: Session<Playing>) -> Self {
        SessionMachine::Playing(session)
    }
}

impl From<Session<WinPause>> for SessionMachine {
    fn from(session: Session<WinPause>) -> Self {
        SessionMachine::WinPause(session)
    }
}

impl From<Session<DeathPause>> for SessionMachine {
    fn from(session: Session<DeathPause>) -> Self {
        SessionMachine::DeathPause(session)
    }
}

impl From<IsPlaying> for SessionMachine {
    fn from(is_playing: IsPlaying) -> Self {
        match is_playing {
            IsPlaying::Playing(session) => session.into(),
            IsPlaying::Won(session) => session.into(),
            IsPlaying::Died(session) => session.into(),
        }
    }
}

impl<S> From<IsPaused<S>> for SessionMachine
where
    SessionMachine: From<Session<S>>,
{
    fn from(is_paused: IsPaused<S>) -> Self {
        match is_paused {
            IsPaused::Done(session) => session.into(),
            IsPaused::Waiting(session) => session.into(),
        }
    }
}

impl SessionMachine {
    pub fn new(config: GameConfig) -> Self {
        SessionMachine::Intro(Intro::new(config))
    }

    /// Consumes the current state and returns the next one. Events that mean
    /// nothing in the current state (keys during a pause, clicks during play)
    /// leave it untouched.
    pub fn transition(self, event: Event) -> Self {
        match (self, event) {
            (SessionMachine::Intro(intro), Event::SelectAvatar(index)) => {
                match AVATARS.get(index) {
                    Some(&avatar) => intro.select(avatar).into(),
                    None => SessionMachine::Intro(intro),
                }
            }
            (SessionMachine::Playing(session), Event::Move(direction)) => {
                session.handle_input(direction).into()
            }
            (SessionMachine::Playing(session), Event::Tick(dt)) => session.update(dt).into(),
            (SessionMachine::WinPause(session), Event::Tick(dt)) => session.update(dt).into(),
            (SessionMachine::DeathPause(session), Event::Tick(dt)) => session.update(dt).into(),
            (machine, _) => machine,
        }
    }

    pub fn state(&self) -> SessionState {
        match self {
            SessionMachine::Intro(_) => SessionState::Intro,
            SessionMachine::Playing(_) => SessionState::Playing,
            SessionMachine::WinPause(_) => SessionState::WinPause,
            SessionMachine::DeathPause(_) => SessionState::DeathPause,
        }
    }

    /// `None` until an avatar has been picked
    pub fn world(&self) -> Option<&World> {
        match self {
            SessionMachine::Intro(_) => None,
            SessionMachine::Playing(session) => Some(session.world()),
            SessionMachine::WinPause(session) => Some(session.world()),
            SessionMachine::DeathPause(session) => Some(session.world()),
        }
    }
}
