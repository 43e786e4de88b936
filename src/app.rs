use anyhow::Result;
use glam::{Mat4, Vec2};

use crate::camera::CameraParams;
use crate::input::{KeyCode, MouseButton};
use crate::lighting::{Material, PointLight};
use crate::particles::ParticleSprite;

/// Lifecycle callbacks a host loop drives once per event or frame.
pub trait SceneDriver {
    /// Loads assets and prepares state before the first frame.
    fn initialize(&mut self) -> Result<()>;

    /// Advances animation by the duration of the last frame.
    fn tick(&mut self, dt: f32);

    /// Describes the current frame for the renderer.
    fn render(&self, frame: &mut FrameContext);

    fn on_key(&mut self, key: KeyCode);

    /// Pointer position in physical pixels, origin at the top left.
    fn on_pointer_move(&mut self, position: Vec2);

    fn on_pointer_button(&mut self, _button: MouseButton, _pressed: bool) {}

    fn on_scroll(&mut self, _lines: f32) {}

    fn on_resize(&mut self, _width: u32, _height: u32) {}
}

/// Geometry a lit draw refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    BackWall,
    Floor,
    Cube,
}

/// Texture a lit draw samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Wall,
    Slime,
}

/// One draw through the lit pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LitDraw {
    pub mesh: MeshKind,
    pub texture: TextureSlot,
    pub model: Mat4,
    /// Multiplier on texture coordinates; values below one stretch the image.
    pub texture_scale: f32,
    pub opacity: f32,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameContext {
    pub camera: CameraParams,
    pub lights: Vec<PointLight>,
    pub material: Material,
    /// Opaque and translucent geometry, drawn in order.
    pub draws: Vec<LitDraw>,
    /// Additive billboards, drawn after all geometry.
    pub sprites: Vec<ParticleSprite>,
}

impl FrameContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the draw lists so the context can be reused next frame.
    pub fn clear(&mut self) {
        self.lights.clear();
        self.draws.clear();
        self.sprites.clear();
    }
}
