use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Selects what drives the blue channel of the light color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LightingMode {
    /// Blue held at zero.
    #[default]
    BlueOff,
    /// Blue follows the horizontal pointer position.
    BlueFromX,
    /// Blue follows the vertical pointer position.
    BlueFromY,
}

impl LightingMode {
    /// Maps the digit keys 1, 2 and 3 to a mode.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::BlueOff),
            2 => Some(Self::BlueFromX),
            3 => Some(Self::BlueFromY),
            _ => None,
        }
    }

    pub fn digit(self) -> u8 {
        match self {
            Self::BlueOff => 1,
            Self::BlueFromX => 2,
            Self::BlueFromY => 3,
        }
    }
}

/// Light color driven by the pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseLightColor {
    color: Vec3,
    mode: LightingMode,
    tracking: bool,
}

impl Default for MouseLightColor {
    fn default() -> Self {
        Self {
            color: Vec3::ZERO,
            mode: LightingMode::BlueOff,
            tracking: true,
        }
    }
}

impl MouseLightColor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn mode(&self) -> LightingMode {
        self.mode
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn set_mode(&mut self, mode: LightingMode) {
        self.mode = mode;
    }

    pub fn toggle_tracking(&mut self) {
        self.tracking = !self.tracking;
    }

    /// Recomputes the color from a pointer position in physical pixels.
    ///
    /// Does nothing while tracking is off or the viewport has no area.
    pub fn update(&mut self, pointer: Vec2, viewport: (u32, u32)) {
        if !self.tracking || viewport.0 == 0 || viewport.1 == 0 {
            return;
        }
        let x = normalize_axis(pointer.x, viewport.0);
        let y = normalize_axis(pointer.y, viewport.1);
        let blue = match self.mode {
            LightingMode::BlueOff => 0.0,
            LightingMode::BlueFromX => x,
            LightingMode::BlueFromY => y,
        };
        self.color = Vec3::new(x, y, blue);
    }
}

fn normalize_axis(value: f32, extent: u32) -> f32 {
    (value / extent as f32).clamp(0.0, 1.0)
}
