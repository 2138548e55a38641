//! Spacegame - simulation core of a side-scrolling arcade shooter
//!
//! Core modules:
//! - `sim`: Entities, pooling, collisions, spawn scheduling and the session state machine
//! - `background`: Parallax background (scroll + shake)
//! - `render`: Rendering/asset collaborator interface
//! - `tuning`: Data-driven game balance
//! - `highscores`: Persisted best score

pub mod background;
pub mod highscores;
pub mod render;
pub mod sim;
pub mod tuning;

pub use highscores::HighScore;
pub use sim::Session;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame step used by the headless driver (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Visible field dimensions (y axis points up, origin bottom-left)
    pub const FIELD_WIDTH: f32 = 1280.0;
    pub const FIELD_HEIGHT: f32 = 720.0;

    /// Player sprite geometry
    pub const PLAYER_WIDTH: f32 = 180.0;
    pub const PLAYER_HEIGHT: f32 = 90.0;
    pub const PLAYER_X: f32 = 70.0;
    pub const PLAYER_START_Y: f32 = 500.0;
    /// Collision area inside the player sprite (x, y, w, h)
    pub const PLAYER_HITBOX: (f32, f32, f32, f32) = (20.0, 20.0, 140.0, 50.0);

    /// Highest gun tier the player can hold
    pub const GUN_LEVEL_MAX: u8 = 5;
    /// Highest enemy tier
    pub const ENEMY_TIER_MAX: u8 = 7;
}

/// Axis-aligned rectangle (origin at the bottom-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict overlap test; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(a.overlaps(&Rect::new(2.0, 2.0, 2.0, 2.0)));
        assert!(!a.overlaps(&Rect::new(20.0, 0.0, 5.0, 5.0)));
        // Shared edge only
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_rect_center() {
        let r = Rect::new(10.0, 20.0, 4.0, 6.0);
        assert_eq!(r.center(), Vec2::new(12.0, 23.0));
    }
}
