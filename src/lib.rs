//! Core modules for the slime-lights demo scene.
//!
//! A stone room lit by three point lights whose colour follows the mouse,
//! with translucent jelly cubes that squash and stretch and a field of
//! twinkling dust. Everything except [`render`] is plain data and math, so
//! the scene can be driven and inspected headlessly.

pub mod animation;
pub mod app;
pub mod assets;
pub mod camera;
pub mod config;
pub mod input;
pub mod light_color;
pub mod lighting;
pub mod mesh;
pub mod particles;
pub mod render;
pub mod scene;

pub use animation::{AnimationClock, SlideOffset, SlimeCube};
pub use app::{FrameContext, LitDraw, MeshKind, SceneDriver, TextureSlot};
pub use assets::{load_texture, AssetError, TextureImage};
pub use camera::{CameraParams, OrbitCamera};
pub use config::SceneConfig;
pub use input::{KeyCode, MouseButton, NamedKey, PointerState, SceneAction};
pub use light_color::{LightingMode, MouseLightColor};
pub use lighting::{Material, PointLight};
pub use particles::{Particle, ParticleField, ParticleSprite};
pub use render::Renderer;
pub use scene::{Scene, SceneSummary, SceneTextures};
