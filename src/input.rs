use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::light_color::LightingMode;

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
}

impl KeyCode {
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return None;
        };
        if ch.is_ascii_alphabetic() {
            return Some(Self::Character(ch.to_ascii_uppercase()));
        }
        ch.to_digit(10).map(|digit| Self::Digit(digit as u8))
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Left" => Left,
        "Right" => Right,
        "Escape" | "Esc" => Escape,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

/// Named keys the scene reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Left,
    Right,
    Escape,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);

    pub fn new(index: u8) -> Self {
        Self(index)
    }
}

/// What a key press does to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneAction {
    SlideLeft,
    SlideRight,
    SelectMode(LightingMode),
    ToggleLightTracking,
}

impl SceneAction {
    pub fn for_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Named(NamedKey::Left) => Some(Self::SlideLeft),
            KeyCode::Named(NamedKey::Right) => Some(Self::SlideRight),
            KeyCode::Digit(digit) => LightingMode::from_digit(digit).map(Self::SelectMode),
            KeyCode::Character('Q') => Some(Self::ToggleLightTracking),
            _ => None,
        }
    }
}

/// Pointer snapshot owned by the scene.
#[derive(Debug, Default)]
pub struct PointerState {
    position: Vec2,
    buttons: HashSet<MouseButton>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the new position and returns how far the pointer moved.
    pub fn move_to(&mut self, position: Vec2) -> Vec2 {
        let delta = position - self.position;
        self.position = position;
        delta
    }

    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }
}
