//! Pairwise collision resolution
//!
//! Brute force per category pair: player missiles vs enemies, player vs
//! enemies, enemy missiles, obstacles and items. Every slot's active flag is
//! re-read right before use, so an entity killed earlier in the same pass is
//! simply skipped.

use rand::Rng;

use super::entity::{Category, ItemKind, SpawnKind, SpawnRequest};
use super::player::{Player, ShieldMode};
use super::pool::EntityPool;
use super::session::{Boost, GameEvent};
use crate::consts::FIELD_WIDTH;
use crate::tuning::Tuning;

/// Explosion scale for an enemy missile hitting the player
const MISSILE_EXPLOSION_SCALE: f32 = 0.6;

/// Everything a collision pass may touch
pub struct Collisions<'a, R: Rng> {
    pub pool: &'a mut EntityPool,
    pub player: &'a mut Player,
    pub boost: &'a mut Boost,
    pub score: &'a mut u64,
    pub rng: &'a mut R,
    pub tuning: &'a Tuning,
    pub events: &'a mut Vec<GameEvent>,
    /// Scratch buffer for explosions; flushed into the pool at the end
    pub requests: &'a mut Vec<SpawnRequest>,
}

impl<R: Rng> Collisions<'_, R> {
    /// Run every rule once
    pub fn resolve(mut self) {
        self.enemies();
        self.enemy_missiles();
        self.obstacles();
        self.items();

        for request in self.requests.drain(..) {
            self.pool.spawn(&request);
        }
    }

    /// Player missiles and the player's body against on-screen enemies
    fn enemies(&mut self) {
        let (enemies, missiles) = self.pool.pair_mut(Category::Enemy, Category::MissilePlayer);
        for enemy in enemies.iter_mut() {
            if !enemy.is_active() || enemy.pos.x >= FIELD_WIDTH {
                continue;
            }

            for missile in missiles.iter_mut() {
                if !enemy.is_active() {
                    break;
                }
                if !missile.is_active() || !enemy.collision_rect().overlaps(&missile.collision_rect()) {
                    continue;
                }
                missile.kill();
                let score = enemy.score();
                *self.score += score as u64;
                let center = enemy.collision_rect().center();
                if enemy.hit(missile.power()) {
                    if let SpawnKind::Enemy { tier, .. } = enemy.kind {
                        self.events.push(GameEvent::EnemyDestroyed { tier, pos: center });
                    }
                    self.requests.push(SpawnRequest::Explosion { center, scale: 1.0 });
                } else {
                    self.events.push(GameEvent::EnemyHit { score });
                }
            }

            // Body contact is lethal and ignores shields
            if enemy.is_active()
                && !self.player.is_dead()
                && self.player.collision_rect().overlaps(&enemy.collision_rect())
            {
                enemy.kill();
                self.player.hit_unshielded(self.tuning.lethal_damage);
                self.events.push(GameEvent::PlayerCrashed);
            }
        }
    }

    fn enemy_missiles(&mut self) {
        for missile in self.pool.slots_mut(Category::MissileEnemy) {
            if self.player.is_dead() {
                return;
            }
            if !missile.is_active() || !missile.collision_rect().overlaps(&self.player.collision_rect()) {
                continue;
            }
            self.requests.push(SpawnRequest::Explosion {
                center: missile.pos,
                scale: MISSILE_EXPLOSION_SCALE,
            });
            missile.kill();
            let damage = self.player.hit(missile.power());
            self.events.push(GameEvent::PlayerHit { damage });
        }
    }

    /// Obstacles kill on touch and stay where they are
    fn obstacles(&mut self) {
        for obstacle in self.pool.slots(Category::Obstacle) {
            if self.player.is_dead() {
                return;
            }
            if obstacle.is_active() && obstacle.collision_rect().overlaps(&self.player.collision_rect()) {
                self.player.hit_unshielded(self.tuning.lethal_damage);
                self.events.push(GameEvent::PlayerCrashed);
            }
        }
    }

    fn items(&mut self) {
        for index in 0..self.pool.capacity(Category::Item) {
            if self.player.is_dead() {
                return;
            }
            let item = &self.pool.slots(Category::Item)[index];
            if !item.is_active() || !item.collision_rect().overlaps(&self.player.collision_rect()) {
                continue;
            }
            let Some(kind) = item.item_kind() else {
                continue;
            };
            apply_item(kind, self.player, self.boost, &mut *self.rng, self.tuning, self.events);
            self.pool.slots_mut(Category::Item)[index].kill();
        }
    }
}

/// Apply a collected item to the player and the session boost
pub fn apply_item(
    kind: ItemKind,
    player: &mut Player,
    boost: &mut Boost,
    rng: &mut impl Rng,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    match kind {
        ItemKind::Repair => {
            player.heal(tuning.repair_fraction);
            player.show_sparkles();
        }
        ItemKind::GunUpgrade(tier) if tier <= player.gun_level_max() => {
            player.set_gun_level(tier);
        }
        ItemKind::GunUpgrade(_) => {}
        ItemKind::RandomGun => {
            let current = player.gun_level();
            // Capped at the top tier so the roll is never clamped back onto `current`
            let upper = (current + 4).min(player.gun_level_max() + 1);
            let mut roll = current;
            while roll == current {
                roll = rng.random_range(0..upper);
            }
            log::debug!("Random gun level: {}", roll);
            player.set_gun_level(roll);
        }
        ItemKind::Shield => {
            player.set_shield(tuning.shield_amount, ShieldMode::Additive);
        }
        ItemKind::Boost => {
            boost.start(tuning.boost_factor, tuning.boost_duration);
            player.set_shield(tuning.boost_duration, ShieldMode::Timed);
            events.push(GameEvent::BoostStarted {
                factor: tuning.boost_factor,
                duration: tuning.boost_duration,
            });
        }
    }
    events.push(GameEvent::ItemCollected(kind));
}
