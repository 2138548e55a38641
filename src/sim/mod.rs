//! Gameplay simulation
//!
//! Everything that moves, collides or spawns lives here. Nothing in this
//! module touches a window or a GPU; drawing goes through `crate::render`.
//! - `dt` is supplied by the caller, in seconds
//! - Randomness comes from the session's RNG only
//! - Categories are always visited in `Category::ALL` order

pub mod collision;
pub mod entity;
pub mod player;
pub mod pool;
pub mod scheduler;
pub mod session;

pub use collision::apply_item;
pub use entity::{Category, ItemKind, MissileOwner, Spawn, SpawnRequest, enemy_tier};
pub use player::{Gun, Player, ShieldMode};
pub use pool::{EntityPool, SpawnHandle};
pub use scheduler::SpawnScheduler;
pub use session::{Boost, GameEvent, GamePhase, Session};
