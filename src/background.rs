//! Parallax background
//!
//! Three layers scrolling at fractions of the ground speed, plus a short
//! screen shake when the player dies. The session only talks to it through
//! the `Background` trait.

use glam::Vec2;

use crate::consts::FIELD_WIDTH;
use crate::render::{Renderer, TextureHandle};

/// Scrolling backdrop as seen by the session
pub trait Background {
    /// Scroll by `speed * dt` (px/s)
    fn move_by(&mut self, dt: f32, speed_x: f32, speed_y: f32);
    /// Start a screen shake
    fn shake(&mut self);
    fn draw(&self, renderer: &mut dyn Renderer);
}

/// A single layer moving at `factor` times the scroll speed
#[derive(Debug, Clone)]
pub struct ParallaxLayer {
    pub texture: TextureHandle,
    pub factor: f32,
    pub offset: Vec2,
}

impl ParallaxLayer {
    pub fn new(texture: TextureHandle, factor: f32) -> Self {
        Self {
            texture,
            factor,
            offset: Vec2::ZERO,
        }
    }
}

/// Shake amplitude in pixels right after `shake()`
const SHAKE_AMPLITUDE: f32 = 12.0;
/// Shake decay per second (fraction of amplitude lost)
const SHAKE_DECAY: f32 = 3.0;

#[derive(Debug, Clone)]
pub struct ParallaxBackground {
    pub layers: Vec<ParallaxLayer>,
    /// Current shake intensity (0-1)
    pub shake: f32,
    elapsed: f32,
}

impl ParallaxBackground {
    /// Back, mid and ground layers
    pub fn new(textures: [TextureHandle; 3]) -> Self {
        Self {
            layers: vec![
                ParallaxLayer::new(textures[0], 0.15),
                ParallaxLayer::new(textures[1], 0.5),
                ParallaxLayer::new(textures[2], 1.0),
            ],
            shake: 0.0,
            elapsed: 0.0,
        }
    }

    /// Pixel offset applied to every layer this frame
    pub fn shake_offset(&self) -> Vec2 {
        if self.shake == 0.0 {
            return Vec2::ZERO;
        }
        let amp = SHAKE_AMPLITUDE * self.shake;
        Vec2::new(
            (self.elapsed * 91.0).sin() * amp,
            (self.elapsed * 67.0).cos() * amp,
        )
    }
}

impl Default for ParallaxBackground {
    fn default() -> Self {
        Self::new([TextureHandle::default(); 3])
    }
}

impl Background for ParallaxBackground {
    fn move_by(&mut self, dt: f32, speed_x: f32, speed_y: f32) {
        self.elapsed += dt;
        for layer in &mut self.layers {
            layer.offset.x = (layer.offset.x + speed_x * layer.factor * dt) % FIELD_WIDTH;
            layer.offset.y += speed_y * layer.factor * dt;
        }

        self.shake = (self.shake - SHAKE_DECAY * dt).max(0.0);
    }

    fn shake(&mut self) {
        self.shake = 1.0;
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let shake = self.shake_offset();
        for layer in &self.layers {
            renderer.draw_layer(layer.texture, layer.offset.x, shake);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawLog;

    #[test]
    fn test_layers_scroll_at_their_factor() {
        let mut bg = ParallaxBackground::default();
        bg.move_by(1.0, -400.0, 0.0);
        assert!((bg.layers[0].offset.x - (-60.0)).abs() < 0.001);
        assert!((bg.layers[1].offset.x - (-200.0)).abs() < 0.001);
        assert!((bg.layers[2].offset.x - (-400.0)).abs() < 0.001);
    }

    #[test]
    fn test_offset_wraps_within_field() {
        let mut bg = ParallaxBackground::default();
        for _ in 0..100 {
            bg.move_by(0.1, -400.0, 0.0);
        }
        assert!(bg.layers[2].offset.x.abs() < FIELD_WIDTH);
    }

    #[test]
    fn test_shake_decays() {
        let mut bg = ParallaxBackground::default();
        bg.shake();
        assert_eq!(bg.shake, 1.0);
        bg.move_by(0.1, 0.0, 0.0);
        assert!(bg.shake < 1.0 && bg.shake > 0.0);
        bg.move_by(1.0, 0.0, 0.0);
        assert_eq!(bg.shake, 0.0);
        assert_eq!(bg.shake_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_draws_every_layer() {
        let bg = ParallaxBackground::default();
        let mut log = DrawLog::default();
        bg.draw(&mut log);
        assert_eq!(log.layers, 3);
    }
}
