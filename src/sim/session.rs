//! Gameplay session
//!
//! Owns every piece of run state (pool, player, scheduler, background, RNG)
//! and advances it once per frame:
//!
//! background → player → dying check → scheduler → entities → collisions → boost
//!
//! Phases run NotStarted → Playing → Dying → GameOver, and `restart` brings a
//! finished run back to Playing. Pausing is a separate flag that freezes all
//! of the above.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Collisions;
use super::entity::{Category, ItemKind, SpawnRequest};
use super::player::Player;
use super::pool::EntityPool;
use super::scheduler::SpawnScheduler;
use crate::background::{Background, ParallaxBackground};
use crate::render::{AssetHandles, Renderer};
use crate::tuning::{Tuning, TuningError};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for `start`
    NotStarted,
    /// Active gameplay
    Playing,
    /// Player is dead, death animation counting down (no new spawns)
    Dying,
    /// Run ended
    GameOver,
}

/// Things that happened during a frame, for UI and audio
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Player missile hit an enemy that survived
    EnemyHit { score: u32 },
    EnemyDestroyed { tier: u8, pos: Vec2 },
    /// Enemy missile reached the player (damage after shields)
    PlayerHit { damage: f32 },
    /// Player touched an enemy or obstacle
    PlayerCrashed,
    ItemCollected(ItemKind),
    BoostStarted { factor: f32, duration: f32 },
    BoostEnded,
    PlayerDied,
    GameOver { score: u64, highscore: u64 },
    LevelChanged { level: u8 },
    ObstaclePhaseStarted { duration: f32 },
    ObstaclePhaseEnded,
}

/// Temporary speed-up of simulation time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    pub active: bool,
    /// Seconds elapsed since the boost started
    pub timer: f32,
    pub duration: f32,
    /// Time multiplier (1.0 when inactive)
    pub multiplier: f32,
}

impl Default for Boost {
    fn default() -> Self {
        Self {
            active: false,
            timer: 0.0,
            duration: 0.0,
            multiplier: 1.0,
        }
    }
}

impl Boost {
    /// Start a boost; a boost already running keeps its elapsed time
    pub fn start(&mut self, factor: f32, duration: f32) {
        log::debug!("Boost x{} for {}s", factor, duration);
        if !self.active {
            self.timer = 0.0;
        }
        self.active = true;
        self.duration = duration;
        self.multiplier = factor;
    }

    /// Count down in real time; returns true on the frame the boost ends
    pub fn decay(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.timer += dt;
        if self.timer >= self.duration {
            self.cancel();
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

pub struct Session<B: Background = ParallaxBackground> {
    tuning: Tuning,
    rng: Pcg32,
    pool: EntityPool,
    player: Player,
    scheduler: SpawnScheduler,
    background: B,
    assets: AssetHandles,
    boost: Boost,
    score: u64,
    highscore: u64,
    phase: GamePhase,
    paused: bool,
    /// Remaining time of the dying sequence
    gameover_timer: f32,
    /// Set until the first frame of the dying sequence has run
    just_died: bool,
    /// Reused spawn buffer, empty between frames
    requests: Vec<SpawnRequest>,
    events: Vec<GameEvent>,
}

impl Session<ParallaxBackground> {
    /// Session with default tuning, placeholder asset handles and an entropy-seeded RNG
    pub fn new() -> Self {
        let assets = AssetHandles::default();
        Self::build(
            ParallaxBackground::new(assets.background_layers),
            assets,
            Tuning::default(),
            Pcg32::from_rng(&mut rand::rng()),
        )
    }
}

impl Default for Session<ParallaxBackground> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Background> Session<B> {
    /// Session with custom background, assets and validated tuning
    pub fn with_background(
        background: B,
        assets: AssetHandles,
        tuning: Tuning,
    ) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(
            background,
            assets,
            tuning,
            Pcg32::from_rng(&mut rand::rng()),
        ))
    }

    /// Replace the RNG with a seeded one (reproducible runs in tests/tools)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }

    fn build(background: B, assets: AssetHandles, tuning: Tuning, rng: Pcg32) -> Self {
        Self {
            rng,
            pool: EntityPool::new(),
            player: Player::new(tuning.player_max_health),
            scheduler: SpawnScheduler::new(&tuning),
            background,
            assets,
            boost: Boost::default(),
            score: 0,
            highscore: 0,
            phase: GamePhase::NotStarted,
            paused: false,
            gameover_timer: tuning.gameover_delay,
            just_died: true,
            requests: Vec::new(),
            events: Vec::new(),
            tuning,
        }
    }

    /// Reset everything that belongs to a single run
    fn reset_run(&mut self) {
        self.pool.clear();
        self.player = Player::new(self.tuning.player_max_health);
        self.scheduler = SpawnScheduler::new(&self.tuning);
        self.boost = Boost::default();
        self.score = 0;
        self.gameover_timer = self.tuning.gameover_delay;
        self.just_died = true;
        self.requests.clear();
        self.events.clear();
        self.phase = GamePhase::NotStarted;
    }

    // === Commands ===

    /// Begin play (only from NotStarted)
    pub fn start(&mut self) {
        if self.phase == GamePhase::NotStarted {
            log::info!("Game started");
            self.phase = GamePhase::Playing;
        }
    }

    /// Clear the field and play again; highscore is kept
    pub fn restart(&mut self) {
        log::info!("Restarting (highscore {})", self.highscore);
        self.reset_run();
        self.start();
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Input intent: begin upward acceleration (ignored once dead)
    pub fn accelerate_up(&mut self) {
        if !self.player.is_dead() {
            self.player.set_accelerate_up(true);
        }
    }

    /// Input intent: stop upward acceleration
    pub fn stop_accelerating(&mut self) {
        self.player.set_accelerate_up(false);
    }

    /// Seed the in-memory highscore (e.g. from disk)
    pub fn set_highscore(&mut self, highscore: u64) {
        self.highscore = highscore;
    }

    // === Queries ===

    /// True while a run is in progress, including the dying sequence
    pub fn is_started(&self) -> bool {
        matches!(self.phase, GamePhase::Playing | GamePhase::Dying)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_gameover(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn highscore(&self) -> u64 {
        self.highscore
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    pub fn boost(&self) -> &Boost {
        &self.boost
    }

    pub fn background(&self) -> &B {
        &self.background
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    // === Frame ===

    /// Advance the simulation by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.paused {
            return;
        }

        // Background keeps scrolling behind menus too
        self.background
            .move_by(dt, self.boost.multiplier * self.tuning.background_speed, 0.0);

        if !self.is_started() {
            return;
        }

        self.player.update(dt, &mut self.requests);
        if self.player.is_dead() && self.process_dying(dt) {
            return;
        }

        let boost = self.boost.multiplier;
        if self.phase == GamePhase::Playing {
            self.scheduler.update(
                dt * boost,
                &self.tuning,
                &mut self.rng,
                &mut self.pool,
                self.player.gun_level(),
                self.player.gun_level_max(),
                &mut self.events,
            );
        }

        self.pool.update_all(dt, boost, &mut self.requests);
        for request in self.requests.drain(..) {
            self.pool.spawn(&request);
        }

        Collisions {
            pool: &mut self.pool,
            player: &mut self.player,
            boost: &mut self.boost,
            score: &mut self.score,
            rng: &mut self.rng,
            tuning: &self.tuning,
            events: &mut self.events,
            requests: &mut self.requests,
        }
        .resolve();

        if self.boost.decay(dt) {
            log::debug!("Boost over");
            self.events.push(GameEvent::BoostEnded);
        }
    }

    /// Run the dying countdown; returns true once the run is over
    fn process_dying(&mut self, dt: f32) -> bool {
        if self.just_died {
            self.just_died = false;
            self.boost.cancel();
            self.background.shake();
            self.events.push(GameEvent::PlayerDied);
            log::info!("Player died (score {})", self.score);
        }

        self.phase = GamePhase::Dying;
        self.gameover_timer -= dt;
        if self.gameover_timer <= 0.0 {
            self.game_over();
            return true;
        }
        false
    }

    fn game_over(&mut self) {
        self.highscore = self.highscore.max(self.score);
        self.phase = GamePhase::GameOver;
        log::info!("Game over: score {}, highscore {}", self.score, self.highscore);
        self.events.push(GameEvent::GameOver {
            score: self.score,
            highscore: self.highscore,
        });
    }

    /// Draw background, then (while a run is live) player and entities
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        self.background.draw(renderer);
        if !self.is_started() {
            return;
        }
        self.player.draw(&self.assets, renderer);
        for category in Category::ALL {
            for spawn in self.pool.active(category) {
                spawn.draw(&self.assets, renderer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::render::{DrawLog, TextureHandle, frames};
    use crate::sim::entity::MissileOwner;
    use proptest::prelude::*;

    /// Tuning where nothing spawns on its own
    fn quiet() -> Tuning {
        Tuning {
            spawn_interval: 1000.0,
            spawn_interval_items: 1000.0,
            level_duration_enemies: 1000.0,
            ..Default::default()
        }
    }

    fn session(tuning: Tuning) -> Session {
        Session::with_background(ParallaxBackground::default(), AssetHandles::default(), tuning)
            .unwrap()
            .with_seed(42)
    }

    fn snapshot(s: &Session) -> String {
        format!(
            "{:?}{:?}{:?}{:?}{:?}{}{}",
            s.pool, s.scheduler, s.player, s.boost, s.background, s.score, s.gameover_timer
        )
    }

    fn kill_player(s: &mut Session) {
        s.player.hit_unshielded(s.tuning.lethal_damage);
    }

    #[test]
    fn test_not_started_only_scrolls_background() {
        let mut s = session(Tuning::default());
        assert!(!s.is_started());
        for _ in 0..600 {
            s.update(FRAME_DT);
        }
        assert_eq!(s.phase(), GamePhase::NotStarted);
        assert_eq!(s.pool.capacity(Category::Enemy), 0);
        assert_eq!(s.player.pos.y, PLAYER_START_Y);
        assert!(s.background.layers[2].offset.x != 0.0);
    }

    #[test]
    fn test_start_spawns_enemies() {
        let mut s = session(Tuning::default());
        s.start();
        assert!(s.is_started());
        for _ in 0..90 {
            s.update(FRAME_DT);
        }
        assert!(s.pool.capacity(Category::Enemy) >= 1);
        assert!(s.pool.capacity(Category::MissilePlayer) >= 1);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut s = session(Tuning::default());
        s.start();
        for _ in 0..200 {
            s.update(FRAME_DT);
        }
        s.pause();
        s.pause();
        assert!(s.is_paused());
        let before = snapshot(&s);
        for _ in 0..200 {
            s.update(FRAME_DT);
        }
        assert_eq!(snapshot(&s), before);
        assert_eq!(s.phase(), GamePhase::Playing);

        s.resume();
        s.resume();
        assert!(!s.is_paused());
        s.update(FRAME_DT);
        assert_ne!(snapshot(&s), before);
    }

    #[test]
    fn test_dying_sequence_then_game_over() {
        let mut s = session(quiet());
        s.start();
        s.score = 120;
        s.set_highscore(100);
        kill_player(&mut s);

        s.update(1.0);
        assert_eq!(s.phase(), GamePhase::Dying);
        assert!(s.is_started());
        assert!(s.background.shake > 0.0);
        assert!(!s.is_gameover());

        s.update(0.6);
        assert!(s.is_gameover());
        assert!(!s.is_started());
        assert_eq!(s.highscore(), 120);
        let events: Vec<_> = s.drain_events().collect();
        assert!(events.contains(&GameEvent::PlayerDied));
        assert!(events.contains(&GameEvent::GameOver {
            score: 120,
            highscore: 120
        }));
    }

    #[test]
    fn test_lower_score_keeps_highscore() {
        let mut s = session(quiet());
        s.set_highscore(500);
        s.start();
        s.score = 120;
        kill_player(&mut s);
        s.update(2.0);
        assert!(s.is_gameover());
        assert_eq!(s.highscore(), 500);
    }

    #[test]
    fn test_no_spawns_while_dying() {
        let mut s = session(Tuning::default());
        s.start();
        s.scheduler.spawn_timer = s.scheduler.spawn_interval - 0.01;
        kill_player(&mut s);
        s.update(0.1);
        assert_eq!(s.phase(), GamePhase::Dying);
        assert_eq!(s.pool.capacity(Category::Enemy), 0);
        assert_eq!(s.scheduler.level_timer, 0.0);
    }

    #[test]
    fn test_death_cancels_boost() {
        let mut s = session(quiet());
        s.start();
        s.boost.start(4.0, 5.0);
        kill_player(&mut s);
        s.update(0.1);
        assert!(!s.boost.active);
        assert_eq!(s.boost.multiplier, 1.0);
    }

    #[test]
    fn test_obstacle_kills_full_health_player() {
        let mut s = session(quiet());
        s.start();
        assert_eq!(s.player.health(), 1000.0);
        let spot = s.player.collision_rect().center();
        s.pool.spawn(&SpawnRequest::Obstacle {
            tier: 0,
            pos: spot - Vec2::new(60.0, 130.0),
        });
        s.update(0.001);
        assert_eq!(s.player.health(), 0.0);
        assert!(s.player.is_dead());
    }

    #[test]
    fn test_boost_item_runs_for_its_duration() {
        let mut s = session(quiet());
        s.start();
        let spot = s.player.collision_rect().center();
        s.pool.spawn(&SpawnRequest::Item {
            kind: ItemKind::Boost,
            pos: spot - Vec2::new(32.0, 32.0),
        });
        s.update(0.0);
        assert!(s.boost.active);
        assert_eq!(s.boost.multiplier, 4.0);
        assert_eq!(s.boost.duration, 5.0);
        assert!(s.player.is_invulnerable());

        for _ in 0..9 {
            s.update(0.5);
        }
        assert!(s.boost.active);
        assert_eq!(s.boost.multiplier, 4.0);

        s.update(0.5);
        assert!(!s.boost.active);
        assert_eq!(s.boost.multiplier, 1.0);
        assert!(s.drain_events().any(|e| e == GameEvent::BoostEnded));
    }

    #[test]
    fn test_second_boost_keeps_first_deadline() {
        let mut boost = Boost::default();
        boost.start(4.0, 5.0);
        for _ in 0..8 {
            assert!(!boost.decay(0.5));
        }
        boost.start(4.0, 5.0);
        assert!(boost.active);
        assert_eq!(boost.timer, 4.0);
        assert!(!boost.decay(0.5));
        assert!(boost.decay(0.5));
        assert!(!boost.active);
        assert_eq!(boost.multiplier, 1.0);
    }

    #[test]
    fn test_second_boost_item_ends_on_time() {
        let mut s = session(quiet());
        s.start();
        let boost_item = |s: &Session| SpawnRequest::Item {
            kind: ItemKind::Boost,
            pos: s.player.collision_rect().center() - Vec2::new(32.0, 32.0),
        };
        let first = boost_item(&s);
        s.pool.spawn(&first);
        s.update(0.0);
        assert!(s.boost.active);

        for _ in 0..8 {
            s.update(0.5);
        }
        let second = boost_item(&s);
        s.pool.spawn(&second);
        s.update(0.0);
        assert!(s.boost.active);

        s.update(0.5);
        assert!(s.boost.active);
        s.update(0.5);
        assert!(!s.boost.active);
        assert_eq!(s.boost.multiplier, 1.0);
    }

    #[test]
    fn test_boost_scales_world_but_not_player_missiles() {
        let mut s = session(quiet());
        s.start();
        s.boost.start(4.0, 5.0);
        let missile = s.pool.spawn(&SpawnRequest::Missile {
            owner: MissileOwner::Player,
            pos: Vec2::new(600.0, 650.0),
            power: 10.0,
        });
        let obstacle = s.pool.spawn(&SpawnRequest::Obstacle {
            tier: 0,
            pos: Vec2::new(1000.0, 450.0),
        });
        let bg_before = s.background.layers[2].offset.x;
        s.update(0.1);

        let m = s.pool.get(missile).unwrap();
        assert!((m.pos.x - 690.0).abs() < 0.01);
        let o = s.pool.get(obstacle).unwrap();
        assert!((o.pos.x - (1000.0 - 400.0 * 0.4)).abs() < 0.01);
        let moved = s.background.layers[2].offset.x - bg_before;
        assert!((moved - (-160.0)).abs() < 0.01);
    }

    #[test]
    fn test_restart_resets_run() {
        let mut s = session(quiet());
        s.start();
        s.score = 300;
        s.pool.spawn(&SpawnRequest::Obstacle {
            tier: 0,
            pos: Vec2::new(1000.0, 450.0),
        });
        kill_player(&mut s);
        s.update(2.0);
        assert!(s.is_gameover());

        s.restart();
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.score(), 0);
        assert_eq!(s.highscore(), 300);
        assert!(!s.player.is_dead());
        assert_eq!(s.pool.capacity(Category::Obstacle), 0);
        assert_eq!(s.scheduler, SpawnScheduler::new(&s.tuning));
    }

    #[test]
    fn test_score_never_drops_during_run() {
        let mut s = session(Tuning::default());
        s.start();
        let mut last = 0;
        for frame in 0..6000 {
            // Bounce around the middle of the field
            if s.player.pos.y < 300.0 {
                s.accelerate_up();
            } else if frame % 7 == 0 {
                s.stop_accelerating();
            }
            s.update(FRAME_DT);
            assert!(s.score() >= last);
            last = s.score();
            if s.is_gameover() {
                break;
            }
        }
    }

    #[test]
    fn test_accelerate_ignored_when_dead() {
        let mut s = session(quiet());
        s.start();
        kill_player(&mut s);
        s.accelerate_up();
        assert!(!s.player.is_accelerating_up());
    }

    #[test]
    fn test_draw_order() {
        let assets = AssetHandles {
            background_layers: [TextureHandle(1), TextureHandle(2), TextureHandle(3)],
            tileset: TextureHandle(10),
            missile_player: TextureHandle(20),
            missile_enemy: TextureHandle(30),
            ..Default::default()
        };
        let mut s = Session::with_background(
            ParallaxBackground::new(assets.background_layers),
            assets,
            quiet(),
        )
        .unwrap();

        let mut log = DrawLog::default();
        s.draw(&mut log);
        assert_eq!(log.layers, 3);
        assert!(log.sprites.is_empty());

        s.start();
        let far = Vec2::new(900.0, 100.0);
        s.pool.spawn(&SpawnRequest::Obstacle { tier: 0, pos: far });
        s.pool.spawn(&SpawnRequest::Item {
            kind: ItemKind::Shield,
            pos: far,
        });
        s.pool.spawn(&SpawnRequest::Explosion {
            center: far,
            scale: 1.0,
        });
        s.pool.spawn(&SpawnRequest::Missile {
            owner: MissileOwner::Player,
            pos: far,
            power: 1.0,
        });
        s.pool.spawn(&SpawnRequest::Missile {
            owner: MissileOwner::Enemy,
            pos: far,
            power: 1.0,
        });
        s.pool.spawn(&SpawnRequest::Enemy { tier: 2, pos: far });

        log.clear();
        s.draw(&mut log);
        let order: Vec<(u32, u32)> = log
            .sprites
            .iter()
            .map(|(sprite, _)| (sprite.texture.0, sprite.frame))
            .collect();
        assert_eq!(
            order,
            vec![
                (10, frames::PLAYER),
                (10, frames::ENEMY_BASE + 2),
                (30, 0),
                (20, 0),
                (10, frames::EXPLOSION_BASE),
                (10, frames::ITEM_BASE + 2),
                (10, frames::OBSTACLE_BASE),
            ]
        );
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = Tuning {
            gameover_delay: -1.0,
            ..Default::default()
        };
        assert!(
            Session::with_background(ParallaxBackground::default(), AssetHandles::default(), tuning)
                .is_err()
        );
    }

    proptest! {
        /// Score only grows within a run and the highscore always covers it after game over
        #[test]
        fn prop_score_and_highscore(
            seed in any::<u64>(),
            inputs in prop::collection::vec((any::<bool>(), 0.001f32..0.05), 1..600),
            initial_best in 0u64..500,
        ) {
            let mut s = session(Tuning::default()).with_seed(seed);
            s.set_highscore(initial_best);
            s.start();
            let mut last = 0;
            for (up, dt) in inputs {
                if up { s.accelerate_up() } else { s.stop_accelerating() }
                s.update(dt);
                prop_assert!(s.score() >= last);
                prop_assert!(s.boost.multiplier >= 1.0);
                last = s.score();
                if s.is_gameover() {
                    prop_assert!(s.highscore() >= s.score());
                    prop_assert!(s.highscore() >= initial_best);
                    prop_assert!(!s.is_started());
                    break;
                }
            }
        }
    }
}
