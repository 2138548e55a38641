//! Rendering collaborator interface
//!
//! The core never loads or inspects textures. Assets are loaded elsewhere and
//! handed in as opaque handles; drawing goes through the `Renderer` trait.

use glam::Vec2;

/// Opaque texture handle issued by the asset collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureHandle(pub u32);

/// Opaque bitmap font handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FontHandle(pub u32);

/// Handles to every asset the core draws with
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetHandles {
    /// Back, mid and front background layers
    pub background_layers: [TextureHandle; 3],
    pub tileset: TextureHandle,
    pub missile_player: TextureHandle,
    pub missile_enemy: TextureHandle,
    pub font: FontHandle,
}

/// A region of a texture to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub texture: TextureHandle,
    /// Frame index inside the texture (tileset cell or animation frame)
    pub frame: u32,
}

/// Sink for draw calls, implemented by the rendering collaborator
pub trait Renderer {
    /// Draw a sprite with its bottom-left corner at `pos`
    fn draw_sprite(&mut self, sprite: Sprite, pos: Vec2, size: Vec2, scale: f32);

    /// Draw a background layer scrolled horizontally by `offset_x`
    fn draw_layer(&mut self, texture: TextureHandle, offset_x: f32, shake: Vec2);
}

/// Tileset cell layout
pub mod frames {
    /// First enemy cell; tier N uses `ENEMY_BASE + N`
    pub const ENEMY_BASE: u32 = 0;
    pub const PLAYER: u32 = 8;
    pub const PLAYER_SHIELD: u32 = 9;
    pub const SPARKLE: u32 = 10;
    /// First obstacle cell
    pub const OBSTACLE_BASE: u32 = 12;
    /// First item cell; indexed by item kind
    pub const ITEM_BASE: u32 = 16;
    /// First explosion animation cell
    pub const EXPLOSION_BASE: u32 = 24;
    pub const EXPLOSION_FRAMES: u32 = 8;
}

/// Renderer that records draw calls, used by tests and the headless driver
#[derive(Debug, Default)]
pub struct DrawLog {
    pub sprites: Vec<(Sprite, Vec2)>,
    pub layers: usize,
}

impl DrawLog {
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.layers = 0;
    }
}

impl Renderer for DrawLog {
    fn draw_sprite(&mut self, sprite: Sprite, pos: Vec2, _size: Vec2, _scale: f32) {
        self.sprites.push((sprite, pos));
    }

    fn draw_layer(&mut self, _texture: TextureHandle, _offset_x: f32, _shake: Vec2) {
        self.layers += 1;
    }
}
