//! Poolable spawn objects
//!
//! Every non-player entity is a `Spawn`: one shared record (position, size,
//! collision box, scale, active flag) plus a category-specific payload. The
//! pool owns every `Spawn` for its whole life; `initialize` revives a slot and
//! `kill` hands it back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::*;
use crate::render::{AssetHandles, Renderer, Sprite, frames};

/// Pooling and collision partition key
///
/// Declaration order is the update and draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Enemy,
    MissileEnemy,
    MissilePlayer,
    Explosion,
    Item,
    Obstacle,
}

impl Category {
    pub const COUNT: usize = 6;

    pub const ALL: [Category; Self::COUNT] = [
        Category::Enemy,
        Category::MissileEnemy,
        Category::MissilePlayer,
        Category::Explosion,
        Category::Item,
        Category::Obstacle,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether entities of this category run on boosted time
    pub fn follows_boost(self) -> bool {
        !matches!(self, Category::MissilePlayer | Category::Explosion)
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Restores a fraction of max health
    Repair,
    /// Rerolls the gun tier
    RandomGun,
    /// Additive-health shield
    Shield,
    /// Speed boost with timed invulnerability
    Boost,
    /// Sets the gun to the given tier
    GunUpgrade(u8),
}

impl ItemKind {
    /// Numeric item code (0, 1, 2, 3, 10 + tier)
    pub fn code(self) -> u8 {
        match self {
            ItemKind::Repair => 0,
            ItemKind::RandomGun => 1,
            ItemKind::Shield => 2,
            ItemKind::Boost => 3,
            ItemKind::GunUpgrade(tier) => 10 + tier,
        }
    }

    fn frame(self) -> u32 {
        match self {
            ItemKind::GunUpgrade(tier) => frames::ITEM_BASE + 4 + tier as u32,
            other => frames::ITEM_BASE + other.code() as u32,
        }
    }
}

/// Per-tier enemy stats
#[derive(Debug, Clone, Copy)]
pub struct EnemyTier {
    pub health: f32,
    /// Score awarded per missile hit
    pub score: u32,
    /// Leftward speed (px/s)
    pub speed: f32,
    /// Seconds between shots (0 = never fires)
    pub fire_interval: f32,
    pub missile_power: f32,
    /// Vertical weave amplitude (px)
    pub weave: f32,
    pub size: Vec2,
}

#[allow(clippy::too_many_arguments)]
const fn tier(
    health: f32,
    score: u32,
    speed: f32,
    fire_interval: f32,
    missile_power: f32,
    weave: f32,
    w: f32,
    h: f32,
) -> EnemyTier {
    EnemyTier {
        health,
        score,
        speed,
        fire_interval,
        missile_power,
        weave,
        size: Vec2::new(w, h),
    }
}

pub const ENEMY_TIERS: [EnemyTier; ENEMY_TIER_MAX as usize + 1] = [
    tier(10.0, 10, 300.0, 0.0, 0.0, 0.0, 110.0, 60.0),
    tier(30.0, 15, 320.0, 2.5, 50.0, 40.0, 120.0, 60.0),
    tier(60.0, 20, 340.0, 2.0, 60.0, 0.0, 130.0, 70.0),
    tier(100.0, 25, 360.0, 1.8, 80.0, 50.0, 140.0, 70.0),
    tier(150.0, 30, 380.0, 1.5, 100.0, 0.0, 150.0, 80.0),
    tier(220.0, 40, 400.0, 1.3, 120.0, 60.0, 150.0, 80.0),
    tier(300.0, 50, 420.0, 1.1, 150.0, 0.0, 160.0, 90.0),
    tier(400.0, 60, 440.0, 1.0, 200.0, 70.0, 170.0, 90.0),
];

pub fn enemy_tier(tier: u8) -> &'static EnemyTier {
    &ENEMY_TIERS[(tier as usize).min(ENEMY_TIERS.len() - 1)]
}

/// Enemy missile speed (px/s, leftward)
pub const ENEMY_MISSILE_SPEED: f32 = 600.0;
/// Player missile speed (px/s, rightward)
pub const PLAYER_MISSILE_SPEED: f32 = 900.0;
const MISSILE_SIZE: Vec2 = Vec2::new(40.0, 12.0);
/// Explosion lifetime in seconds
pub const EXPLOSION_DURATION: f32 = 0.5;
const EXPLOSION_SIZE: Vec2 = Vec2::new(128.0, 128.0);
/// Obstacles scroll with the ground layer
const OBSTACLE_SPEED: f32 = 400.0;
const OBSTACLE_SIZE: Vec2 = Vec2::new(120.0, 270.0);
const ITEM_SPEED: f32 = 250.0;
const ITEM_SIZE: Vec2 = Vec2::new(64.0, 64.0);
const ITEM_BOB: f32 = 15.0;

/// Which side fired a missile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissileOwner {
    Player,
    Enemy,
}

/// Everything needed to bring a pooled slot to life
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnRequest {
    Enemy { tier: u8, pos: Vec2 },
    Missile { owner: MissileOwner, pos: Vec2, power: f32 },
    /// Explosion centred on `center`
    Explosion { center: Vec2, scale: f32 },
    Obstacle { tier: u8, pos: Vec2 },
    Item { kind: ItemKind, pos: Vec2 },
}

impl SpawnRequest {
    pub fn category(&self) -> Category {
        match self {
            SpawnRequest::Enemy { .. } => Category::Enemy,
            SpawnRequest::Missile { owner: MissileOwner::Player, .. } => Category::MissilePlayer,
            SpawnRequest::Missile { owner: MissileOwner::Enemy, .. } => Category::MissileEnemy,
            SpawnRequest::Explosion { .. } => Category::Explosion,
            SpawnRequest::Obstacle { .. } => Category::Obstacle,
            SpawnRequest::Item { .. } => Category::Item,
        }
    }
}

/// Category-specific state
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnKind {
    Enemy {
        tier: u8,
        health: f32,
        fire_timer: f32,
        age: f32,
        base_y: f32,
    },
    Missile {
        owner: MissileOwner,
        power: f32,
        /// Signed horizontal velocity
        velocity: f32,
    },
    Explosion {
        timer: f32,
    },
    Obstacle {
        tier: u8,
    },
    Item {
        kind: ItemKind,
        age: f32,
        base_y: f32,
    },
}

impl SpawnKind {
    fn blank(category: Category) -> Self {
        match category {
            Category::Enemy => SpawnKind::Enemy {
                tier: 0,
                health: 0.0,
                fire_timer: 0.0,
                age: 0.0,
                base_y: 0.0,
            },
            Category::MissileEnemy => SpawnKind::Missile {
                owner: MissileOwner::Enemy,
                power: 0.0,
                velocity: -ENEMY_MISSILE_SPEED,
            },
            Category::MissilePlayer => SpawnKind::Missile {
                owner: MissileOwner::Player,
                power: 0.0,
                velocity: PLAYER_MISSILE_SPEED,
            },
            Category::Explosion => SpawnKind::Explosion { timer: 0.0 },
            Category::Obstacle => SpawnKind::Obstacle { tier: 0 },
            Category::Item => SpawnKind::Item {
                kind: ItemKind::Repair,
                age: 0.0,
                base_y: 0.0,
            },
        }
    }
}

/// A pooled, positioned, collidable entity
#[derive(Debug, Clone, PartialEq)]
pub struct Spawn {
    pub category: Category,
    /// Bottom-left corner of the sprite
    pub pos: Vec2,
    /// Unscaled sprite size
    pub size: Vec2,
    /// Collision box relative to `pos`, unscaled
    pub hitbox: Rect,
    pub scale: f32,
    pub kind: SpawnKind,
    active: bool,
}

impl Spawn {
    /// Fresh, inactive slot for `category`
    pub fn new(category: Category) -> Self {
        Self {
            category,
            pos: Vec2::ZERO,
            size: Vec2::ZERO,
            hitbox: Rect::default(),
            scale: 1.0,
            kind: SpawnKind::blank(category),
            active: false,
        }
    }

    /// Reactivate this slot with the request's parameters
    ///
    /// The pool only routes requests to slots of the matching category.
    pub fn initialize(&mut self, request: &SpawnRequest) {
        debug_assert_eq!(request.category(), self.category);
        self.scale = 1.0;
        match *request {
            SpawnRequest::Enemy { tier, pos } => {
                let stats = enemy_tier(tier);
                self.pos = pos;
                self.size = stats.size;
                self.hitbox = inset(stats.size, 0.15);
                self.kind = SpawnKind::Enemy {
                    tier,
                    health: stats.health,
                    fire_timer: 0.0,
                    age: 0.0,
                    base_y: pos.y,
                };
            }
            SpawnRequest::Missile { owner, pos, power } => {
                self.pos = pos;
                self.size = MISSILE_SIZE;
                self.hitbox = Rect::new(0.0, 0.0, MISSILE_SIZE.x, MISSILE_SIZE.y);
                let velocity = match owner {
                    MissileOwner::Player => PLAYER_MISSILE_SPEED,
                    MissileOwner::Enemy => -ENEMY_MISSILE_SPEED,
                };
                self.kind = SpawnKind::Missile {
                    owner,
                    power,
                    velocity,
                };
            }
            SpawnRequest::Explosion { center, scale } => {
                self.scale = scale;
                self.size = EXPLOSION_SIZE;
                self.pos = center - EXPLOSION_SIZE * scale / 2.0;
                self.hitbox = Rect::default();
                self.kind = SpawnKind::Explosion { timer: 0.0 };
            }
            SpawnRequest::Obstacle { tier, pos } => {
                self.pos = pos;
                self.size = OBSTACLE_SIZE;
                self.hitbox = inset(OBSTACLE_SIZE, 0.1);
                self.kind = SpawnKind::Obstacle { tier };
            }
            SpawnRequest::Item { kind, pos } => {
                self.pos = pos;
                self.size = ITEM_SIZE;
                self.hitbox = Rect::new(0.0, 0.0, ITEM_SIZE.x, ITEM_SIZE.y);
                self.kind = SpawnKind::Item {
                    kind,
                    age: 0.0,
                    base_y: pos.y,
                };
            }
        }
        self.active = true;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deactivate; returns false if the slot was already inactive
    pub fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }

    /// Collision box in world space
    pub fn collision_rect(&self) -> Rect {
        Rect::new(
            self.pos.x + self.hitbox.x * self.scale,
            self.pos.y + self.hitbox.y * self.scale,
            self.hitbox.w * self.scale,
            self.hitbox.h * self.scale,
        )
    }

    /// Score value of an enemy (0 for everything else)
    pub fn score(&self) -> u32 {
        match self.kind {
            SpawnKind::Enemy { tier, .. } => enemy_tier(tier).score,
            _ => 0,
        }
    }

    /// Missile damage (0 for everything else)
    pub fn power(&self) -> f32 {
        match self.kind {
            SpawnKind::Missile { power, .. } => power,
            _ => 0.0,
        }
    }

    pub fn item_kind(&self) -> Option<ItemKind> {
        match self.kind {
            SpawnKind::Item { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Apply damage to an enemy; returns true if this hit destroyed it
    pub fn hit(&mut self, damage: f32) -> bool {
        if !self.active {
            return false;
        }
        if let SpawnKind::Enemy { ref mut health, .. } = self.kind {
            *health -= damage;
            if *health <= 0.0 {
                self.active = false;
                return true;
            }
        }
        false
    }

    /// Advance one frame; shots fired are pushed to `out`
    pub fn update(&mut self, dt: f32, out: &mut Vec<SpawnRequest>) {
        if !self.active {
            return;
        }
        match self.kind {
            SpawnKind::Enemy {
                tier,
                ref mut fire_timer,
                ref mut age,
                base_y,
                ..
            } => {
                let stats = enemy_tier(tier);
                *age += dt;
                self.pos.x -= stats.speed * dt;
                if stats.weave > 0.0 {
                    self.pos.y = base_y + (*age * 2.0).sin() * stats.weave;
                }
                if stats.fire_interval > 0.0 {
                    *fire_timer += dt;
                    // Only fire once visible
                    if *fire_timer >= stats.fire_interval && self.pos.x < FIELD_WIDTH {
                        *fire_timer = 0.0;
                        out.push(SpawnRequest::Missile {
                            owner: MissileOwner::Enemy,
                            pos: Vec2::new(self.pos.x, self.pos.y + self.size.y / 2.0),
                            power: stats.missile_power,
                        });
                    }
                }
            }
            SpawnKind::Missile { velocity, .. } => {
                self.pos.x += velocity * dt;
                if self.pos.x > FIELD_WIDTH {
                    self.active = false;
                }
            }
            SpawnKind::Explosion { ref mut timer } => {
                *timer += dt;
                if *timer >= EXPLOSION_DURATION {
                    self.active = false;
                }
            }
            SpawnKind::Obstacle { .. } => {
                self.pos.x -= OBSTACLE_SPEED * dt;
            }
            SpawnKind::Item {
                ref mut age,
                base_y,
                ..
            } => {
                *age += dt;
                self.pos.x -= ITEM_SPEED * dt;
                self.pos.y = base_y + (*age * 3.0).sin() * ITEM_BOB;
            }
        }

        // Off the left edge
        if self.pos.x + self.size.x * self.scale < 0.0 {
            self.active = false;
        }
    }

    pub fn draw(&self, assets: &AssetHandles, renderer: &mut dyn Renderer) {
        if !self.active {
            return;
        }
        let sprite = match self.kind {
            SpawnKind::Enemy { tier, .. } => Sprite {
                texture: assets.tileset,
                frame: frames::ENEMY_BASE + tier as u32,
            },
            SpawnKind::Missile {
                owner: MissileOwner::Player,
                ..
            } => Sprite {
                texture: assets.missile_player,
                frame: 0,
            },
            SpawnKind::Missile {
                owner: MissileOwner::Enemy,
                ..
            } => Sprite {
                texture: assets.missile_enemy,
                frame: 0,
            },
            SpawnKind::Explosion { timer } => {
                let progress = (timer / EXPLOSION_DURATION).clamp(0.0, 1.0);
                let frame = ((progress * frames::EXPLOSION_FRAMES as f32) as u32)
                    .min(frames::EXPLOSION_FRAMES - 1);
                Sprite {
                    texture: assets.tileset,
                    frame: frames::EXPLOSION_BASE + frame,
                }
            }
            SpawnKind::Obstacle { tier } => Sprite {
                texture: assets.tileset,
                frame: frames::OBSTACLE_BASE + tier as u32,
            },
            SpawnKind::Item { kind, .. } => Sprite {
                texture: assets.tileset,
                frame: kind.frame(),
            },
        };
        renderer.draw_sprite(sprite, self.pos, self.size, self.scale);
    }
}

/// Collision box shrunk by `margin` (fraction of each side)
fn inset(size: Vec2, margin: f32) -> Rect {
    Rect::new(
        size.x * margin,
        size.y * margin,
        size.x * (1.0 - 2.0 * margin),
        size.y * (1.0 - 2.0 * margin),
    )
}
