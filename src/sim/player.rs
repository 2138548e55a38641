//! The player ship
//!
//! Fixed horizontal position, vertical motion driven by a single
//! "accelerate up" intent. Holds health, shields and the gun tier, and
//! auto-fires missiles while alive.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{MissileOwner, SpawnRequest};
use crate::Rect;
use crate::consts::*;
use crate::render::{AssetHandles, Renderer, Sprite, frames};

/// Upward acceleration while the intent is held (px/s²)
const ACCEL_UP: f32 = 1800.0;
/// Downward pull otherwise (px/s²)
const GRAVITY: f32 = 1200.0;
const MAX_VERTICAL_SPEED: f32 = 600.0;
/// Repair sparkle duration (seconds)
const SPARKLE_TIME: f32 = 1.0;
/// Vertical gap between missiles in one volley
const VOLLEY_SPACING: f32 = 16.0;

/// How a shield pickup is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldMode {
    /// Amount is added to health immediately
    Additive,
    /// Amount is a number of seconds during which `hit` does nothing
    Timed,
}

/// Gun stats for one tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gun {
    /// Missiles per volley
    pub volley: u32,
    pub power: f32,
    /// Seconds between volleys
    pub interval: f32,
}

impl Gun {
    pub fn for_level(level: u8) -> Self {
        let level = level.min(GUN_LEVEL_MAX);
        Self {
            volley: 1 + level as u32 / 2,
            power: 10.0 + 5.0 * level as f32,
            interval: 0.3 - 0.03 * level as f32,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    /// Bottom-left corner of the sprite; x never changes
    pub pos: Vec2,
    /// Vertical velocity (px/s, positive = up)
    pub velocity: f32,
    pub size: Vec2,
    /// Collision box relative to `pos`
    pub hitbox: Rect,
    health: f32,
    max_health: f32,
    gun_level: u8,
    accelerate_up: bool,
    /// Remaining timed invulnerability (seconds)
    invulnerable: f32,
    fire_timer: f32,
    sparkle_timer: f32,
}

impl Player {
    pub fn new(max_health: f32) -> Self {
        let (hx, hy, hw, hh) = PLAYER_HITBOX;
        Self {
            pos: Vec2::new(PLAYER_X, PLAYER_START_Y),
            velocity: 0.0,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            hitbox: Rect::new(hx, hy, hw, hh),
            health: max_health,
            max_health,
            gun_level: 0,
            accelerate_up: false,
            invulnerable: 0.0,
            fire_timer: 0.0,
            sparkle_timer: 0.0,
        }
    }

    /// Move, tick shields and fire; missiles are pushed to `out`
    pub fn update(&mut self, dt: f32, out: &mut Vec<SpawnRequest>) {
        let accel = if self.accelerate_up && !self.is_dead() {
            ACCEL_UP
        } else {
            -GRAVITY
        };
        self.velocity = (self.velocity + accel * dt).clamp(-MAX_VERTICAL_SPEED, MAX_VERTICAL_SPEED);
        self.pos.y += self.velocity * dt;

        let ceiling = FIELD_HEIGHT - self.size.y;
        if self.pos.y <= 0.0 {
            self.pos.y = 0.0;
            self.velocity = self.velocity.max(0.0);
        } else if self.pos.y >= ceiling {
            self.pos.y = ceiling;
            self.velocity = self.velocity.min(0.0);
        }

        self.invulnerable = (self.invulnerable - dt).max(0.0);
        self.sparkle_timer = (self.sparkle_timer - dt).max(0.0);

        if self.is_dead() {
            return;
        }

        let gun = Gun::for_level(self.gun_level);
        self.fire_timer += dt;
        if self.fire_timer >= gun.interval {
            self.fire_timer = 0.0;
            let nose = Vec2::new(self.pos.x + self.size.x, self.pos.y + self.size.y / 2.0);
            let spread = (gun.volley - 1) as f32 * VOLLEY_SPACING;
            for i in 0..gun.volley {
                let offset = i as f32 * VOLLEY_SPACING - spread / 2.0;
                out.push(SpawnRequest::Missile {
                    owner: MissileOwner::Player,
                    pos: nose + Vec2::new(0.0, offset),
                    power: gun.power,
                });
            }
        }
    }

    /// Apply damage unless a timed shield is up; returns the damage taken
    pub fn hit(&mut self, damage: f32) -> f32 {
        if self.is_invulnerable() {
            return 0.0;
        }
        self.take_damage(damage)
    }

    /// Damage that ignores every shield (body contact)
    pub fn hit_unshielded(&mut self, damage: f32) -> f32 {
        self.take_damage(damage)
    }

    fn take_damage(&mut self, damage: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - damage.max(0.0)).max(0.0);
        before - self.health
    }

    /// Restore `fraction` of max health (no effect once dead)
    pub fn heal(&mut self, fraction: f32) {
        if self.is_dead() {
            return;
        }
        self.health = (self.health + self.max_health * fraction).min(self.max_health);
    }

    pub fn set_shield(&mut self, amount: f32, mode: ShieldMode) {
        match mode {
            ShieldMode::Additive => {
                if !self.is_dead() {
                    self.health = (self.health + amount).min(self.max_health);
                }
            }
            ShieldMode::Timed => self.invulnerable = self.invulnerable.max(amount),
        }
    }

    /// Set the gun tier (clamped to the highest tier)
    pub fn set_gun_level(&mut self, level: u8) {
        self.gun_level = level.min(GUN_LEVEL_MAX);
    }

    pub fn gun_level(&self) -> u8 {
        self.gun_level
    }

    pub fn gun_level_max(&self) -> u8 {
        GUN_LEVEL_MAX
    }

    pub fn set_accelerate_up(&mut self, accelerate: bool) {
        self.accelerate_up = accelerate;
    }

    pub fn is_accelerating_up(&self) -> bool {
        self.accelerate_up
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Start the repair sparkle effect
    pub fn show_sparkles(&mut self) {
        self.sparkle_timer = SPARKLE_TIME;
    }

    pub fn is_sparkling(&self) -> bool {
        self.sparkle_timer > 0.0
    }

    pub fn collision_rect(&self) -> Rect {
        Rect::new(
            self.pos.x + self.hitbox.x,
            self.pos.y + self.hitbox.y,
            self.hitbox.w,
            self.hitbox.h,
        )
    }

    pub fn draw(&self, assets: &AssetHandles, renderer: &mut dyn Renderer) {
        let sprite = |frame| Sprite {
            texture: assets.tileset,
            frame,
        };
        renderer.draw_sprite(sprite(frames::PLAYER), self.pos, self.size, 1.0);
        if self.is_invulnerable() {
            renderer.draw_sprite(sprite(frames::PLAYER_SHIELD), self.pos, self.size, 1.0);
        }
        if self.is_sparkling() {
            renderer.draw_sprite(sprite(frames::SPARKLE), self.pos, self.size, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_clamps_at_zero() {
        let mut p = Player::new(1000.0);
        assert_eq!(p.hit(300.0), 300.0);
        assert_eq!(p.health(), 700.0);
        assert_eq!(p.hit(5000.0), 700.0);
        assert_eq!(p.health(), 0.0);
        assert!(p.is_dead());
    }

    #[test]
    fn test_timed_shield_blocks_hits_until_it_runs_out() {
        let mut p = Player::new(1000.0);
        p.set_shield(5.0, ShieldMode::Timed);
        assert_eq!(p.hit(500.0), 0.0);
        assert_eq!(p.health(), 1000.0);

        let mut out = Vec::new();
        p.update(5.0, &mut out);
        assert!(!p.is_invulnerable());
        p.hit(500.0);
        assert_eq!(p.health(), 500.0);
    }

    #[test]
    fn test_unshielded_damage_ignores_timed_shield() {
        let mut p = Player::new(1000.0);
        p.set_shield(5.0, ShieldMode::Timed);
        p.hit_unshielded(100_000.0);
        assert!(p.is_dead());
    }

    #[test]
    fn test_additive_shield_adds_health() {
        let mut p = Player::new(1000.0);
        p.hit(50.0);
        p.set_shield(10.0, ShieldMode::Additive);
        assert_eq!(p.health(), 960.0);
        p.set_shield(100.0, ShieldMode::Additive);
        assert_eq!(p.health(), 1000.0);
    }

    #[test]
    fn test_heal_clamps_and_stays_dead() {
        let mut p = Player::new(1000.0);
        p.hit(900.0);
        p.heal(0.25);
        assert_eq!(p.health(), 350.0);
        p.heal(1.0);
        assert_eq!(p.health(), 1000.0);

        p.hit(2000.0);
        p.heal(0.25);
        assert!(p.is_dead());
        assert_eq!(p.health(), 0.0);
    }

    #[test]
    fn test_gun_level_clamped() {
        let mut p = Player::new(1000.0);
        p.set_gun_level(3);
        assert_eq!(p.gun_level(), 3);
        p.set_gun_level(200);
        assert_eq!(p.gun_level(), GUN_LEVEL_MAX);
    }

    #[test]
    fn test_accelerate_up_rises_and_falls() {
        let mut p = Player::new(1000.0);
        let start = p.pos.y;
        let mut out = Vec::new();
        p.set_accelerate_up(true);
        for _ in 0..10 {
            p.update(0.01, &mut out);
        }
        assert!(p.pos.y > start);

        p.set_accelerate_up(false);
        for _ in 0..100 {
            p.update(0.01, &mut out);
        }
        assert!(p.pos.y < start);
        assert_eq!(p.pos.x, PLAYER_X);
    }

    #[test]
    fn test_position_clamped_to_field() {
        let mut p = Player::new(1000.0);
        let mut out = Vec::new();
        for _ in 0..500 {
            p.update(0.02, &mut out);
        }
        assert_eq!(p.pos.y, 0.0);

        p.set_accelerate_up(true);
        for _ in 0..500 {
            p.update(0.02, &mut out);
        }
        assert_eq!(p.pos.y, FIELD_HEIGHT - PLAYER_HEIGHT);
    }

    #[test]
    fn test_fires_volleys_by_gun_level() {
        let mut p = Player::new(1000.0);
        let mut out = Vec::new();
        p.update(0.31, &mut out);
        assert_eq!(out.len(), 1);

        out.clear();
        p.set_gun_level(4);
        p.update(0.31, &mut out);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| matches!(
            r,
            SpawnRequest::Missile { owner: MissileOwner::Player, power, .. } if *power == 30.0
        )));
    }

    #[test]
    fn test_dead_player_does_not_fire() {
        let mut p = Player::new(1000.0);
        p.hit(1000.0);
        let mut out = Vec::new();
        p.update(1.0, &mut out);
        assert!(out.is_empty());
    }
}
