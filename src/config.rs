use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::animation::{default_slimes, SlimeCube};
use crate::particles::DEFAULT_PARTICLE_COUNT;

/// Startup configuration of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub wall_texture: PathBuf,
    pub slime_texture: PathBuf,
    pub particle_count: usize,
    /// Seed for the particle layout generated at setup.
    pub particle_seed: u64,
    pub slimes: Vec<SlimeCube>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window_width: 1024,
            window_height: 768,
            wall_texture: PathBuf::from("stonewall.png"),
            slime_texture: PathBuf::from("slimeCube.png"),
            particle_count: DEFAULT_PARTICLE_COUNT,
            particle_seed: 0,
            slimes: default_slimes(),
        }
    }
}

impl SceneConfig {
    /// Parses a scene description; missing elements keep their defaults.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        let mut config = Self::default();

        if let Some(window) = child(&root, "window") {
            config.window_width = parse_num(optional_text(&window, "width"), config.window_width)
                .context("invalid window width")?;
            config.window_height =
                parse_num(optional_text(&window, "height"), config.window_height)
                    .context("invalid window height")?;
            if config.window_width == 0 || config.window_height == 0 {
                return Err(anyhow!("window size must be non-zero"));
            }
        }

        if let Some(assets) = child(&root, "assets") {
            if let Some(wall) = optional_text(&assets, "wall") {
                config.wall_texture = PathBuf::from(wall);
            }
            if let Some(slime) = optional_text(&assets, "slime") {
                config.slime_texture = PathBuf::from(slime);
            }
        }

        if let Some(particles) = child(&root, "particles") {
            config.particle_count =
                parse_num(optional_text(&particles, "count"), config.particle_count)
                    .context("invalid particle count")?;
            config.particle_seed =
                parse_num(optional_text(&particles, "seed"), config.particle_seed)
                    .context("invalid particle seed")?;
        }

        let slimes = root
            .children()
            .filter(|node| node.has_tag_name("slime"))
            .map(|node| parse_slime(&node))
            .collect::<Result<Vec<_>>>()?;
        if !slimes.is_empty() {
            config.slimes = slimes;
        }

        Ok(config)
    }

    /// Reads a scene file; relative texture paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        let mut config = Self::from_xml(&xml)
            .with_context(|| format!("failed to parse scene {}", path.display()))?;
        if let Some(dir) = path.parent() {
            config.wall_texture = dir.join(&config.wall_texture);
            config.slime_texture = dir.join(&config.slime_texture);
        }
        Ok(config)
    }
}

fn parse_slime(node: &Node<'_, '_>) -> Result<SlimeCube> {
    let defaults = SlimeCube::default();
    let slime = SlimeCube {
        amplitude: parse_num(optional_text(node, "amplitude"), defaults.amplitude)?,
        frequency: parse_num(optional_text(node, "frequency"), defaults.frequency)?,
        y_placement: parse_num(optional_text(node, "placement"), defaults.y_placement)?,
        scale: parse_num(optional_text(node, "scale"), defaults.scale)?,
        position: parse_vec3(optional_text(node, "position"), defaults.position)?,
    };
    if slime.scale <= 0.0 {
        return Err(anyhow!("slime scale must be positive"));
    }
    if !(slime.amplitude.abs() < SlimeCube::MAX_AMPLITUDE) {
        return Err(anyhow!(
            "slime amplitude must stay below {} in magnitude",
            SlimeCube::MAX_AMPLITUDE
        ));
    }
    Ok(slime)
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let numbers = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("failed to parse vector component {component:?}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    match numbers[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(anyhow!("vector must have exactly 3 components: {value:?}")),
    }
}

fn parse_num<T>(value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value
            .parse::<T>()
            .map_err(|err| anyhow!("failed to parse {value:?}: {err}")),
        None => Ok(default),
    }
}
