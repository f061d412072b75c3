use crate::config::{GemConfig, SecondsRange};
use crate::rng::RandomSource;
use crate::sprite::gem::Gem;
use crate::sprite::player::Player;
use crate::sprite::{Tile, COLUMNS};
use crate::timer::{Scheduler, TimerId};

// gems only land on the stone rows
const GEM_ROWS: std::ops::RangeInclusive<u8> = 1..=3;

/// What the spawner's timers ask for when they come due
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GemTimer {
    Appear,
    Expire,
}

/// ┌─────────────────── Gem Lifecycle ────────────────────┐
/// │  Idle ──arm()──► Waiting ──Appear──► Active(gem)     │
/// │   ▲                 ▲                  │             │
/// │   │                 └─ respawn delay ──┤ Expire      │
/// │   │                                    │ collect()   │
/// │   └──────────── cancel() (death) ──────┘             │
/// └──────────────────────────────────────────────────────┘
/// Exactly one phase at a time, so at most one gem and at most one
/// outstanding timer.
#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Waiting(TimerId),
    Active(Gem),
}

#[derive(Debug, Clone)]
pub struct GemSpawner {
    phase: Phase,
    config: GemConfig,
}

impl GemSpawner {
    pub fn new(config: GemConfig) -> Self {
        GemSpawner {
            phase: Phase::Idle,
            config,
        }
    }

    pub fn gem(&self) -> Option<&Gem> {
        match &self.phase {
            Phase::Active(gem) => Some(gem),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Start the first countdown. Does nothing while a gem is pending or on
    /// stage.
    pub fn arm<E: From<GemTimer>>(
        &mut self,
        scheduler: &mut Scheduler<E>,
        rng: &mut RandomSource,
    ) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.wait(self.config.first_delay, scheduler, rng);
        true
    }

    /// Handle a due spawner timer. `player` is kept free of gems.
    pub fn on_timer<E: From<GemTimer>>(
        &mut self,
        id: TimerId,
        timer: GemTimer,
        player: Tile,
        scheduler: &mut Scheduler<E>,
        rng: &mut RandomSource,
    ) {
        let expected = match &self.phase {
            Phase::Idle => None,
            Phase::Waiting(waiting) => Some((*waiting, GemTimer::Appear)),
            Phase::Active(gem) => Some((gem.lifespan(), GemTimer::Expire)),
        };
        debug_assert_eq!(expected, Some((id, timer)), "stale gem timer fired");
        if expected != Some((id, timer)) {
            log::warn!("ignoring stale gem timer {:?}", timer);
            return;
        }
        match timer {
            GemTimer::Appear => self.appear(player, scheduler, rng),
            GemTimer::Expire => {
                log::debug!("gem expired");
                self.remove(scheduler, rng);
            }
        }
    }

    /// Pick up the gem if the player stands on it. Returns the points won.
    pub fn collect<E: From<GemTimer>>(
        &mut self,
        player: &Player,
        scheduler: &mut Scheduler<E>,
        rng: &mut RandomSource,
    ) -> Option<u32> {
        let gem = self.gem().filter(|gem| player.occupies(gem.tile()))?;
        let (tile, lifespan) = (gem.tile(), gem.lifespan());
        scheduler.cancel(lifespan);
        log::debug!("gem collected at {:?}", tile);
        self.remove(scheduler, rng);
        Some(self.config.value)
    }

    /// Drop any countdown and any gem, back to idle
    pub fn cancel<E>(&mut self, scheduler: &mut Scheduler<E>) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Waiting(id) => {
                scheduler.cancel(id);
            }
            Phase::Active(gem) => {
                scheduler.cancel(gem.lifespan());
            }
        }
    }

    // expiry and collection both end here
    fn remove<E: From<GemTimer>>(
        &mut self,
        scheduler: &mut Scheduler<E>,
        rng: &mut RandomSource,
    ) {
        self.wait(self.config.respawn_delay, scheduler, rng);
    }

    fn wait<E: From<GemTimer>>(
        &mut self,
        delay: SecondsRange,
        scheduler: &mut Scheduler<E>,
        rng: &mut RandomSource,
    ) {
        let id = scheduler.schedule(seconds(delay, rng), GemTimer::Appear.into());
        self.phase = Phase::Waiting(id);
    }

    fn appear<E: From<GemTimer>>(
        &mut self,
        player: Tile,
        scheduler: &mut Scheduler<E>,
        rng: &mut RandomSource,
    ) {
        let free: Vec<Tile> = GEM_ROWS
            .flat_map(|row| (0..COLUMNS).map(move |col| Tile::new(col, row)))
            .filter(|tile| *tile != player)
            .collect();
        let Some(tile) = rng.index(free.len()).map(|index| free[index]) else {
            self.phase = Phase::Idle;
            return;
        };
        let lifespan = scheduler.schedule(
            seconds(self.config.lifespan, rng),
            GemTimer::Expire.into(),
        );
        log::debug!("gem appeared at {:?}", tile);
        self.phase = Phase::Active(Gem::new(tile, lifespan));
    }
}

fn seconds(range: SecondsRange, rng: &mut RandomSource) -> f64 {
    f64::from(rng.int(range.range, range.offset).max(0)) * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::player::AVATARS;
    use crate::sprite::{Direction, SPAWN_TILE};

    fn spawner() -> (GemSpawner, Scheduler<GemTimer>, RandomSource) {
        (
            GemSpawner::new(GemConfig::default()),
            Scheduler::new(),
            RandomSource::seeded(23),
        )
    }

    /// Walks a fresh player from the spawn tile onto `tile`
    fn player_on(tile: Tile) -> Player {
        let mut player = Player::new(AVATARS[0]);
        while player.tile().col > tile.col {
            player.handle_input(Direction::Left);
        }
        while player.tile().col < tile.col {
            player.handle_input(Direction::Right);
        }
        while player.tile().row > tile.row {
            player.handle_input(Direction::Up);
        }
        assert_eq!(player.tile(), tile);
        player
    }

    /// Runs the clock in 100ms steps, feeding due timers back to the spawner
    fn run(
        spawner: &mut GemSpawner,
        scheduler: &mut Scheduler<GemTimer>,
        dice: &mut RandomSource,
        player: Tile,
        millis: u32,
    ) -> Vec<GemTimer> {
        let mut fired = Vec::new();
        for _ in 0..millis / 100 {
            scheduler.advance(100.0);
            while let Some((id, timer)) = scheduler.pop_due() {
                fired.push(timer);
                spawner.on_timer(id, timer, player, scheduler, dice);
            }
        }
        fired
    }

    /// Steps until the first gem shows up, returns the milliseconds waited
    fn until_gem(
        spawner: &mut GemSpawner,
        scheduler: &mut Scheduler<GemTimer>,
        dice: &mut RandomSource,
    ) -> u32 {
        let mut waited = 0;
        while spawner.gem().is_none() {
            assert!(waited <= 5_000, "no gem after {}ms", waited);
            run(spawner, scheduler, dice, SPAWN_TILE, 100);
            waited += 100;
        }
        waited
    }

    #[test]
    fn first_gem_within_one_to_five_seconds() {
        let (mut spawner, mut scheduler, mut dice) = spawner();
        assert!(spawner.arm(&mut scheduler, &mut dice));
        assert!(spawner.gem().is_none());
        let waited = until_gem(&mut spawner, &mut scheduler, &mut dice);
        assert!((1_000..=5_000).contains(&waited));
        let gem = spawner.gem().expect("gem should be on stage");
        assert!(GEM_ROWS.contains(&gem.tile().row));
        assert!(gem.tile().col < COLUMNS);
    }

    #[test]
    fn arming_twice_is_a_noop() {
        let (mut spawner, mut scheduler, mut dice) = spawner();
        assert!(spawner.arm(&mut scheduler, &mut dice));
        assert!(!spawner.arm(&mut scheduler, &mut dice));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn expired_gem_is_replaced_later() {
        let (mut spawner, mut scheduler, mut dice) = spawner();
        spawner.arm(&mut scheduler, &mut dice);
        until_gem(&mut spawner, &mut scheduler, &mut dice);
        // lifespan is at most 7s
        let fired = run(&mut spawner, &mut scheduler, &mut dice, SPAWN_TILE, 7_000);
        assert!(fired.contains(&GemTimer::Expire));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn collecting_cancels_the_lifespan() {
        let (mut spawner, mut scheduler, mut dice) = spawner();
        spawner.arm(&mut scheduler, &mut dice);
        until_gem(&mut spawner, &mut scheduler, &mut dice);
        let gem = spawner.gem().cloned().expect("gem should be on stage");

        assert_eq!(spawner.collect(&player_on(SPAWN_TILE), &mut scheduler, &mut dice), None);
        let points = spawner.collect(&player_on(gem.tile()), &mut scheduler, &mut dice);
        assert_eq!(points, Some(5));
        assert!(spawner.gem().is_none());
        assert!(!scheduler.is_pending(gem.lifespan()));

        // the respawn wait is at least 3s; nothing may fire before it
        let fired = run(&mut spawner, &mut scheduler, &mut dice, SPAWN_TILE, 2_900);
        assert!(fired.is_empty());
        assert!(spawner.gem().is_none());
    }

    #[test]
    fn collect_twice_scores_once() {
        let (mut spawner, mut scheduler, mut dice) = spawner();
        spawner.arm(&mut scheduler, &mut dice);
        until_gem(&mut spawner, &mut scheduler, &mut dice);
        let tile = spawner.gem().map(Gem::tile).expect("gem should be on stage");
        let player = player_on(tile);
        assert_eq!(spawner.collect(&player, &mut scheduler, &mut dice), Some(5));
        assert_eq!(spawner.collect(&player, &mut scheduler, &mut dice), None);
    }

    #[test]
    fn gem_never_lands_on_the_player() {
        let (mut spawner, mut scheduler, mut dice) = spawner();
        let player = Tile::new(2, 2);
        spawner.arm(&mut scheduler, &mut dice);
        for _ in 0..50 {
            run(&mut spawner, &mut scheduler, &mut dice, player, 1_000);
            if let Some(gem) = spawner.gem() {
                assert_ne!(gem.tile(), player);
            }
        }
    }

    #[test]
    fn cancel_goes_idle_and_silent() {
        let (mut spawner, mut scheduler, mut dice) = spawner();
        spawner.arm(&mut scheduler, &mut dice);
        run(&mut spawner, &mut scheduler, &mut dice, SPAWN_TILE, 5_000);
        spawner.cancel(&mut scheduler);
        assert!(spawner.is_idle());
        assert!(scheduler.is_empty());
        let fired = run(&mut spawner, &mut scheduler, &mut dice, SPAWN_TILE, 20_000);
        assert!(fired.is_empty());
    }

    #[test]
    fn at_most_one_gem_over_a_long_run() {
        let (mut spawner, mut scheduler, mut dice) = spawner();
        spawner.arm(&mut scheduler, &mut dice);
        for step in 0..2_000 {
            run(&mut spawner, &mut scheduler, &mut dice, SPAWN_TILE, 100);
            assert!(scheduler.len() <= 1);
            if step % 37 == 0 {
                if let Some(tile) = spawner.gem().map(Gem::tile) {
                    spawner.collect(&player_on(tile), &mut scheduler, &mut dice);
                }
            }
            // re-arming never stacks a second countdown
            spawner.arm(&mut scheduler, &mut dice);
            assert!(scheduler.len() <= 1);
        }
    }
}
