use std::fmt;

use anyhow::Result;
use glam::{Mat4, Vec2, Vec3};
use log::{debug, info};

use crate::animation::{AnimationClock, SlideOffset, SlimeCube};
use crate::app::{FrameContext, LitDraw, MeshKind, SceneDriver, TextureSlot};
use crate::assets::{load_texture_or_log, TextureImage};
use crate::camera::OrbitCamera;
use crate::config::SceneConfig;
use crate::input::{KeyCode, MouseButton, PointerState, SceneAction};
use crate::light_color::{LightingMode, MouseLightColor};
use crate::lighting::{scene_lights, Material};
use crate::particles::ParticleField;

const WALL_TEXTURE_SCALE: f32 = 0.5;
const WALL_OPACITY: f32 = 1.0;
const SLIME_TEXTURE_SCALE: f32 = 1.0;
const SLIME_OPACITY: f32 = 0.5;

/// Images loaded at startup; an empty slot renders with a plain white texture.
#[derive(Debug, Clone, Default)]
pub struct SceneTextures {
    pub wall: Option<TextureImage>,
    pub slime: Option<TextureImage>,
}

impl SceneTextures {
    pub fn get(&self, slot: TextureSlot) -> Option<&TextureImage> {
        match slot {
            TextureSlot::Wall => self.wall.as_ref(),
            TextureSlot::Slime => self.slime.as_ref(),
        }
    }
}

/// The whole demo: room, slime cubes, dust and the mouse-driven lights.
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    camera: OrbitCamera,
    clock: AnimationClock,
    slide: SlideOffset,
    particles: ParticleField,
    light_color: MouseLightColor,
    pointer: PointerState,
    viewport: (u32, u32),
    textures: SceneTextures,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let particles = ParticleField::with_seed(config.particle_count, config.particle_seed);
        let viewport = (config.window_width, config.window_height);
        let mut camera = OrbitCamera::new();
        camera.set_aspect(viewport.0, viewport.1);
        Self {
            config,
            camera,
            clock: AnimationClock::new(),
            slide: SlideOffset::new(),
            particles,
            light_color: MouseLightColor::new(),
            pointer: PointerState::new(),
            viewport,
            textures: SceneTextures::default(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn slimes(&self) -> &[SlimeCube] {
        &self.config.slimes
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn textures(&self) -> &SceneTextures {
        &self.textures
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.seconds()
    }

    pub fn light_color(&self) -> &MouseLightColor {
        &self.light_color
    }

    pub fn slide_offset(&self) -> f32 {
        self.slide.value()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn apply(&mut self, action: SceneAction) {
        match action {
            SceneAction::SlideLeft => self.slide.nudge(-1.0),
            SceneAction::SlideRight => self.slide.nudge(1.0),
            SceneAction::SelectMode(mode) => {
                debug!("lighting mode {}", mode.digit());
                self.light_color.set_mode(mode);
            }
            SceneAction::ToggleLightTracking => {
                self.light_color.toggle_tracking();
                debug!("light tracking {}", self.light_color.is_tracking());
            }
        }
    }

    /// Model matrices of the slime cubes for the current frame.
    pub fn slime_transforms(&self) -> Vec<Mat4> {
        let elapsed = self.clock.seconds();
        let offset = self.slide.value();
        self.config
            .slimes
            .iter()
            .map(|slime| slime.model_matrix(elapsed, offset))
            .collect()
    }

    pub fn summary(&self) -> SceneSummary {
        let elapsed = self.clock.seconds();
        SceneSummary {
            slime_count: self.config.slimes.len(),
            particle_count: self.particles.len(),
            elapsed,
            light_color: self.light_color.color(),
            mode: self.light_color.mode(),
            tracking: self.light_color.is_tracking(),
            slide_offset: self.slide.value(),
            vertical_scales: self
                .config
                .slimes
                .iter()
                .map(|slime| slime.vertical_scale(elapsed))
                .collect(),
        }
    }
}

impl SceneDriver for Scene {
    fn initialize(&mut self) -> Result<()> {
        self.textures = SceneTextures {
            wall: load_texture_or_log(&self.config.wall_texture),
            slime: load_texture_or_log(&self.config.slime_texture),
        };
        info!(
            "scene ready: {} slime cube(s), {} particle(s)",
            self.config.slimes.len(),
            self.particles.len()
        );
        Ok(())
    }

    fn tick(&mut self, dt: f32) {
        self.clock.advance(dt);
        self.light_color
            .update(self.pointer.position(), self.viewport);
    }

    fn render(&self, frame: &mut FrameContext) {
        frame.clear();
        frame.camera = self.camera.params();
        frame.lights.extend(scene_lights(self.light_color.color()));
        frame.material = Material::scene();

        for mesh in [MeshKind::BackWall, MeshKind::Floor] {
            frame.draws.push(LitDraw {
                mesh,
                texture: TextureSlot::Wall,
                model: Mat4::IDENTITY,
                texture_scale: WALL_TEXTURE_SCALE,
                opacity: WALL_OPACITY,
            });
        }
        for model in self.slime_transforms() {
            frame.draws.push(LitDraw {
                mesh: MeshKind::Cube,
                texture: TextureSlot::Slime,
                model,
                texture_scale: SLIME_TEXTURE_SCALE,
                opacity: SLIME_OPACITY,
            });
        }

        frame.sprites = self.particles.sprites(self.clock.seconds());
    }

    fn on_key(&mut self, key: KeyCode) {
        if let Some(action) = SceneAction::for_key(key) {
            self.apply(action);
        }
    }

    fn on_pointer_move(&mut self, position: Vec2) {
        let delta = self.pointer.move_to(position);
        if self.pointer.is_button_down(MouseButton::LEFT) {
            self.camera.orbit(delta);
        }
    }

    fn on_pointer_button(&mut self, button: MouseButton, pressed: bool) {
        self.pointer.set_button(button, pressed);
    }

    fn on_scroll(&mut self, lines: f32) {
        self.camera.zoom(lines);
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.camera.set_aspect(width, height);
    }
}

/// Snapshot of the animated state, printed by headless runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub slime_count: usize,
    pub particle_count: usize,
    pub elapsed: f32,
    pub light_color: Vec3,
    pub mode: LightingMode,
    pub tracking: bool,
    pub slide_offset: f32,
    pub vertical_scales: Vec<f32>,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scene with {} slime cube(s) and {} particle(s)",
            self.slime_count, self.particle_count
        )?;
        writeln!(f, "elapsed={:.2}s", self.elapsed)?;
        writeln!(
            f,
            "light color=({:.2}, {:.2}, {:.2}) mode={} tracking={}",
            self.light_color.x,
            self.light_color.y,
            self.light_color.z,
            self.mode.digit(),
            if self.tracking { "on" } else { "off" }
        )?;
        writeln!(f, "slide offset={:.2}", self.slide_offset)?;
        for (index, scale) in self.vertical_scales.iter().enumerate() {
            writeln!(f, " - slime {index} vertical scale={scale:.2}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::NamedKey;

    fn scene() -> Scene {
        let config = SceneConfig {
            window_width: 800,
            window_height: 600,
            ..SceneConfig::default()
        };
        Scene::new(config)
    }

    #[test]
    fn centre_pointer_in_first_mode_lights_yellow() {
        let mut scene = scene();
        scene.on_pointer_move(Vec2::new(400.0, 300.0));
        scene.tick(1.0 / 60.0);
        assert_eq!(scene.light_color().color(), Vec3::new(0.5, 0.5, 0.0));

        let mut frame = FrameContext::new();
        scene.render(&mut frame);
        assert_eq!(frame.lights.len(), 3);
        assert!(frame
            .lights
            .iter()
            .all(|light| light.diffuse == Vec3::new(0.5, 0.5, 0.0)));
    }

    #[test]
    fn render_emits_room_cubes_and_dust() {
        let scene = scene();
        let mut frame = FrameContext::new();
        scene.render(&mut frame);
        scene.render(&mut frame);
        assert_eq!(frame.draws.len(), 2 + 3);
        assert_eq!(frame.sprites.len(), 50);
        let cubes: Vec<_> = frame
            .draws
            .iter()
            .filter(|draw| draw.mesh == MeshKind::Cube)
            .collect();
        assert_eq!(cubes.len(), 3);
        assert!(cubes.iter().all(|draw| draw.opacity == 0.5));
        assert!(cubes.iter().all(|draw| draw.texture == TextureSlot::Slime));
        assert_eq!(frame.draws[0].texture_scale, 0.5);
    }

    #[test]
    fn rest_pose_at_time_zero() {
        let scene = scene();
        assert!(scene.summary().vertical_scales.iter().all(|s| *s == 2.0));
    }

    #[test]
    fn arrow_keys_move_every_cube_together() {
        let mut scene = scene();
        let before = scene.slime_transforms();
        for _ in 0..10 {
            scene.on_key(KeyCode::Named(NamedKey::Right));
        }
        let after = scene.slime_transforms();
        for (a, b) in before.iter().zip(&after) {
            let shift = b.w_axis.x - a.w_axis.x;
            assert!((shift - 0.1 * 0.5).abs() < 1e-5);
        }
        for _ in 0..5000 {
            scene.on_key(KeyCode::Named(NamedKey::Left));
        }
        assert_eq!(scene.slide_offset(), -8.0);
    }

    #[test]
    fn mode_keys_and_toggle_drive_light_color() {
        let mut scene = scene();
        scene.on_pointer_move(Vec2::new(200.0, 450.0));
        scene.on_key(KeyCode::Digit(3));
        scene.tick(0.1);
        assert_eq!(scene.light_color().color(), Vec3::new(0.25, 0.75, 0.75));

        scene.on_key(KeyCode::Character('Q'));
        scene.on_pointer_move(Vec2::new(800.0, 0.0));
        scene.on_key(KeyCode::Digit(2));
        scene.tick(0.1);
        assert_eq!(scene.light_color().color(), Vec3::new(0.25, 0.75, 0.75));
        assert!(!scene.light_color().is_tracking());
    }

    #[test]
    fn dragging_orbits_the_camera() {
        let mut scene = scene();
        let mut frame = FrameContext::new();
        scene.render(&mut frame);
        let start = frame.camera.position;

        scene.on_pointer_move(Vec2::new(10.0, 10.0));
        scene.on_pointer_move(Vec2::new(60.0, 10.0));
        scene.render(&mut frame);
        assert_eq!(frame.camera.position, start);

        scene.on_pointer_button(MouseButton::LEFT, true);
        scene.on_pointer_move(Vec2::new(110.0, 10.0));
        scene.render(&mut frame);
        assert_ne!(frame.camera.position, start);
    }

    #[test]
    fn initialize_survives_missing_textures() {
        let mut scene = Scene::new(SceneConfig {
            wall_texture: "nope/wall.png".into(),
            slime_texture: "nope/slime.png".into(),
            ..SceneConfig::default()
        });
        scene.initialize().unwrap();
        assert!(scene.textures().get(TextureSlot::Wall).is_none());
        assert!(scene.textures().get(TextureSlot::Slime).is_none());
    }

    #[test]
    fn summary_formats_light_color() {
        let mut scene = scene();
        scene.on_pointer_move(Vec2::new(400.0, 300.0));
        scene.tick(0.5);
        let text = scene.summary().to_string();
        assert!(text.contains("light color=(0.50, 0.50, 0.00) mode=1 tracking=on"));
        assert!(text.contains("elapsed=0.50s"));
    }
}
