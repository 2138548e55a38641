//! Spawn scheduling and difficulty escalation
//!
//! Two clocks drive the run. The level clock steps `spawn_level` through the
//! enemy tiers and alternates enemy phases with obstacle phases; the spawn
//! clocks decide when the next enemy wave, obstacle or item appears. Both run
//! on boosted time.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{ItemKind, SpawnRequest};
use super::pool::EntityPool;
use super::session::GameEvent;
use crate::consts::FIELD_WIDTH;
use crate::tuning::Tuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    /// Current enemy tier selector (0..=spawn_level_max)
    pub spawn_level: u8,
    /// Seconds between enemy waves; shrinks every wrap
    pub spawn_interval: f32,
    /// Length of the current phase
    pub level_duration: f32,
    /// Length the next obstacle phase will have
    pub level_duration_obstacles: f32,
    /// True while only obstacles spawn
    pub obstacle_phase: bool,
    /// Lane of the last obstacle (true = upper lane)
    pub obstacle_previous_up: bool,
    pub level_timer: f32,
    pub spawn_timer: f32,
    pub spawn_timer_items: f32,
}

impl SpawnScheduler {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            spawn_level: 0,
            spawn_interval: tuning.spawn_interval,
            level_duration: tuning.level_duration_enemies,
            level_duration_obstacles: tuning.level_duration_obstacles,
            obstacle_phase: false,
            obstacle_previous_up: false,
            level_timer: 0.0,
            spawn_timer: 0.0,
            spawn_timer_items: 0.0,
        }
    }

    /// Advance both clocks by `dt` (already boost-scaled) and spawn what is due
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        tuning: &Tuning,
        rng: &mut impl Rng,
        pool: &mut EntityPool,
        gun_level: u8,
        gun_level_max: u8,
        events: &mut Vec<GameEvent>,
    ) {
        self.advance_level(dt, tuning, events);
        self.spawn_objects(dt, tuning, rng, pool, gun_level, gun_level_max);
    }

    /// Step the level clock, switching phases when the current one ends
    pub fn advance_level(&mut self, dt: f32, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        self.level_timer += dt;
        if self.level_timer < self.level_duration {
            return;
        }

        if !self.obstacle_phase {
            self.spawn_level += 1;
            if self.spawn_level > tuning.spawn_level_max {
                self.spawn_level = 0;
                self.spawn_interval = (self.spawn_interval - tuning.spawn_interval_decrease_step)
                    .max(tuning.spawn_interval_minimum);
                log::info!("Level wrapped, spawn interval now {:.2}s", self.spawn_interval);
            }
            log::info!("Level {}", self.spawn_level);
            events.push(GameEvent::LevelChanged {
                level: self.spawn_level,
            });

            // Every even level is followed by an obstacle phase, each one longer
            if self.spawn_level % 2 == 0 {
                self.obstacle_phase = true;
                self.level_duration = self.level_duration_obstacles;
                self.level_duration_obstacles += tuning.level_duration_obstacles_increase_step;
                log::info!("Obstacle phase ({:.1}s)", self.level_duration);
                events.push(GameEvent::ObstaclePhaseStarted {
                    duration: self.level_duration,
                });
            }
        } else {
            self.obstacle_phase = false;
            self.level_duration = tuning.level_duration_enemies;
            log::info!("Obstacle phase over");
            events.push(GameEvent::ObstaclePhaseEnded);
        }
        self.level_timer = 0.0;
    }

    /// Step the spawn clocks and pull new entities from the pool
    pub fn spawn_objects(
        &mut self,
        dt: f32,
        tuning: &Tuning,
        rng: &mut impl Rng,
        pool: &mut EntityPool,
        gun_level: u8,
        gun_level_max: u8,
    ) {
        self.spawn_timer += dt;
        if !self.obstacle_phase {
            if self.spawn_timer >= self.spawn_interval {
                self.spawn_enemies(tuning, rng, pool);
                self.spawn_timer = 0.0;
            }
            self.spawn_timer_items += dt;
            if self.spawn_timer_items >= tuning.spawn_interval_items {
                self.spawn_item(tuning, rng, pool, gun_level, gun_level_max);
                self.spawn_timer_items = 0.0;
            }
        } else if self.spawn_timer >= tuning.spawn_interval_obstacles {
            self.spawn_obstacle(tuning, rng, pool);
            self.spawn_timer = 0.0;
        }
    }

    /// Tiers to spawn for a level: one enemy up to level 3, then two mixed tiers
    pub fn wave_tiers(level: u8) -> (u8, Option<u8>) {
        if level <= 3 {
            (level, None)
        } else {
            (level - 4, Some(level - 3))
        }
    }

    fn spawn_enemies(&self, tuning: &Tuning, rng: &mut impl Rng, pool: &mut EntityPool) {
        let (first, second) = Self::wave_tiers(self.spawn_level);
        for tier in std::iter::once(first).chain(second) {
            let pos = Vec2::new(FIELD_WIDTH + tuning.spawn_offset_x, random_y(tuning, rng));
            pool.spawn(&SpawnRequest::Enemy { tier, pos });
        }
    }

    fn spawn_obstacle(&mut self, tuning: &Tuning, rng: &mut impl Rng, pool: &mut EntityPool) {
        let up = choose_obstacle_lane(rng.random::<f32>(), self.obstacle_previous_up);
        let y = if up {
            tuning.obstacle_lane_up_y
        } else {
            tuning.obstacle_lane_down_y
        };
        pool.spawn(&SpawnRequest::Obstacle {
            tier: 0,
            pos: Vec2::new(FIELD_WIDTH + tuning.obstacle_offset_x, y),
        });
        self.obstacle_previous_up = up;
    }

    fn spawn_item(
        &self,
        tuning: &Tuning,
        rng: &mut impl Rng,
        pool: &mut EntityPool,
        gun_level: u8,
        gun_level_max: u8,
    ) {
        let kind = choose_item(rng.random::<f32>(), gun_level, gun_level_max);
        let pos = Vec2::new(FIELD_WIDTH + tuning.spawn_offset_x, random_y(tuning, rng));
        pool.spawn(&SpawnRequest::Item { kind, pos });
    }
}

fn random_y(tuning: &Tuning, rng: &mut impl Rng) -> f32 {
    rng.random_range(tuning.spawn_y_min..tuning.spawn_y_max) as f32
}

/// Pick the obstacle lane for a uniform draw `r`; true = upper lane
///
/// The threshold leans away from the previous lane so repeats are rarer.
pub fn choose_obstacle_lane(r: f32, previous_up: bool) -> bool {
    let threshold = if previous_up { 0.2 } else { 0.8 };
    r <= threshold
}

/// Pick the item kind for a uniform draw `r`
pub fn choose_item(r: f32, gun_level: u8, gun_level_max: u8) -> ItemKind {
    if r < 0.2 {
        ItemKind::Repair
    } else if r < 0.4 {
        ItemKind::Shield
    } else if r < 0.6 {
        ItemKind::Boost
    } else if r <= 0.8 && gun_level < gun_level_max {
        ItemKind::GunUpgrade(gun_level + 1)
    } else {
        ItemKind::RandomGun
    }
}
