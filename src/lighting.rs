use std::iter::Sum;
use std::ops::{Add, AddAssign};

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Positions of the three lights hanging above the back wall.
pub const LIGHT_POSITIONS: [Vec3; 3] = [
    Vec3::new(3.5, 2.0, 0.5),
    Vec3::new(0.0, 2.0, 0.5),
    Vec3::new(-3.5, 2.0, 0.5),
];

/// Point light with a normalized inverse-square falloff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub strength: f32,
    /// Distance at which the attenuation drops to half of `strength`.
    pub half_distance: f32,
    pub ambient: f32,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl PointLight {
    /// Light used for every lamp in the scene, tinted with `color`.
    pub fn lamp(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            strength: 10.0,
            half_distance: 1.0,
            ambient: 0.2,
            diffuse: color,
            specular: color,
        }
    }

    /// `strength * hh / (hh + d²)`; equals `strength` when the light touches the surface.
    pub fn attenuation(&self, surface: Vec3) -> f32 {
        let to_light = self.position - surface;
        let hh = self.half_distance * self.half_distance;
        self.strength * hh / (hh + to_light.dot(to_light))
    }

    /// Computes the light falling on a surface point.
    ///
    /// `normal` is expected to be unit length already.
    pub fn illuminate(
        &self,
        position: Vec3,
        normal: Vec3,
        eye: Vec3,
        material: &Material,
    ) -> LightContribution {
        let atten = self.attenuation(position);
        let light_dir = (self.position - position).normalize_or_zero();
        let view_dir = (eye - position).normalize_or_zero();

        let d = diffuse_term(normal, light_dir, self.ambient);
        let s = specular_term(normal, light_dir, view_dir, material.shininess);

        LightContribution {
            diffuse: self.diffuse * (d * atten),
            specular: self.specular * (s * atten),
        }
    }
}

/// Lambert term with an additive ambient floor.
///
/// The ambient is added, not multiplied, so the result never drops below it.
pub fn diffuse_term(normal: Vec3, light_dir: Vec3, ambient: f32) -> f32 {
    normal.dot(light_dir).max(0.0) + ambient
}

/// Blinn half-vector specular term.
pub fn specular_term(normal: Vec3, light_dir: Vec3, view_dir: Vec3, shininess: f32) -> f32 {
    let half = (light_dir + view_dir).normalize_or_zero();
    normal.dot(half).max(0.0).powf(shininess)
}

/// Surface reflectance shared by everything in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Material {
    pub fn scene() -> Self {
        Self {
            diffuse: Vec3::ONE,
            specular: Vec3::splat(0.5),
            shininess: 100.0,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::scene()
    }
}

/// Diffuse and specular light accumulated at a surface point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightContribution {
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl LightContribution {
    /// Color reflected by `material` before texturing.
    pub fn resolve(&self, material: &Material) -> Vec3 {
        self.diffuse * material.diffuse + self.specular * material.specular
    }
}

impl AddAssign for LightContribution {
    fn add_assign(&mut self, other: Self) {
        self.diffuse += other.diffuse;
        self.specular += other.specular;
    }
}

impl Add for LightContribution {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Sum for LightContribution {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Sums the contribution of every light at a surface point.
pub fn accumulate(
    position: Vec3,
    normal: Vec3,
    eye: Vec3,
    lights: &[PointLight],
    material: &Material,
) -> LightContribution {
    lights
        .iter()
        .map(|light| light.illuminate(position, normal, eye, material))
        .sum()
}

/// Full fragment evaluation: lighting, texture modulation and opacity.
pub fn shade(
    position: Vec3,
    interpolated_normal: Vec3,
    eye: Vec3,
    lights: &[PointLight],
    material: &Material,
    texel: Vec3,
    opacity: f32,
) -> Vec4 {
    let normal = interpolated_normal.normalize_or_zero();
    let fall = accumulate(position, normal, eye, lights, material);
    (fall.resolve(material) * texel).extend(opacity)
}

/// The three scene lamps, all sharing the mouse-driven color.
pub fn scene_lights(color: Vec3) -> [PointLight; 3] {
    LIGHT_POSITIONS.map(|position| PointLight::lamp(position, color))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn attenuation_at_light_position_equals_strength() {
        let light = PointLight::lamp(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE);
        assert_eq!(light.attenuation(light.position), light.strength);
    }

    #[test]
    fn attenuation_halves_at_half_distance() {
        let mut light = PointLight::lamp(Vec3::ZERO, Vec3::ONE);
        light.half_distance = 2.5;
        let surface = Vec3::new(0.0, 0.0, 2.5);
        assert!(approx(light.attenuation(surface), light.strength / 2.0));
    }

    #[test]
    fn attenuation_never_exceeds_strength() {
        let light = PointLight::lamp(Vec3::ZERO, Vec3::ONE);
        for step in 0..50 {
            let surface = Vec3::new(step as f32 * 0.1, 0.3, -0.2);
            assert!(light.attenuation(surface) <= light.strength);
        }
    }

    #[test]
    fn diffuse_term_has_ambient_floor() {
        let normal = Vec3::Y;
        let directions = [Vec3::Y, -Vec3::Y, Vec3::X, Vec3::new(0.3, -0.9, 0.1).normalize()];
        for dir in directions {
            assert!(diffuse_term(normal, dir, 0.2) >= 0.2);
        }
        assert!(approx(diffuse_term(normal, Vec3::Y, 0.2), 1.2));
    }

    #[test]
    fn light_on_surface_is_finite() {
        let light = PointLight::lamp(Vec3::new(0.0, 1.0, 0.0), Vec3::ONE);
        let fall = light.illuminate(light.position, Vec3::Y, Vec3::new(0.0, 3.0, 3.0), &Material::scene());
        assert!(fall.diffuse.is_finite());
        assert!(fall.specular.is_finite());
        // Only the ambient floor survives when the light direction is undefined.
        assert!(approx(fall.diffuse.x, light.ambient * light.strength));
    }

    #[test]
    fn specular_peaks_on_mirror_direction() {
        let normal = Vec3::Z;
        let light_dir = Vec3::new(1.0, 0.0, 1.0).normalize();
        let view_dir = Vec3::new(-1.0, 0.0, 1.0).normalize();
        assert!(approx(specular_term(normal, light_dir, view_dir, 100.0), 1.0));
        let off = Vec3::new(-0.2, 0.5, 1.0).normalize();
        assert!(specular_term(normal, light_dir, off, 100.0) < 0.5);
    }

    #[test]
    fn contributions_sum_linearly() {
        let material = Material::scene();
        let lights = scene_lights(Vec3::new(0.8, 0.4, 0.1));
        let position = Vec3::new(0.5, 0.0, 1.0);
        let normal = Vec3::Y;
        let eye = Vec3::new(0.0, 0.0, 2.0);

        let total = accumulate(position, normal, eye, &lights, &material);
        let mut manual = LightContribution::default();
        for light in lights.iter().rev() {
            manual += light.illuminate(position, normal, eye, &material);
        }
        assert!((total.diffuse - manual.diffuse).abs().max_element() < 1e-5);
        assert!((total.specular - manual.specular).abs().max_element() < 1e-5);
    }

    #[test]
    fn black_light_leaves_surface_black() {
        let lights = scene_lights(Vec3::ZERO);
        let color = shade(
            Vec3::new(0.0, 0.0, 0.5),
            Vec3::Z,
            Vec3::new(0.0, 0.0, 2.0),
            &lights,
            &Material::scene(),
            Vec3::ONE,
            0.5,
        );
        assert_eq!(color, Vec4::new(0.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn texel_modulates_resolved_color() {
        let lights = scene_lights(Vec3::ONE);
        let material = Material::scene();
        let position = Vec3::new(0.0, 0.0, 0.0);
        let eye = Vec3::new(0.0, 1.0, 2.0);
        let lit = shade(position, Vec3::Z, eye, &lights, &material, Vec3::ONE, 1.0);
        let red = shade(position, Vec3::Z, eye, &lights, &material, Vec3::X, 1.0);
        assert!(approx(red.x, lit.x));
        assert_eq!(red.y, 0.0);
        assert_eq!(red.z, 0.0);
    }

    #[test]
    fn interpolated_normal_is_normalized_once() {
        let lights = scene_lights(Vec3::ONE);
        let material = Material::scene();
        let eye = Vec3::new(0.0, 1.0, 2.0);
        let unit = shade(Vec3::ZERO, Vec3::Z, eye, &lights, &material, Vec3::ONE, 1.0);
        let long = shade(Vec3::ZERO, Vec3::Z * 4.0, eye, &lights, &material, Vec3::ONE, 1.0);
        assert!((unit - long).abs().max_element() < 1e-5);
    }

    #[test]
    fn scene_lights_share_color() {
        let color = Vec3::new(0.1, 0.2, 0.3);
        let lights = scene_lights(color);
        for (light, position) in lights.iter().zip(LIGHT_POSITIONS) {
            assert_eq!(light.position, position);
            assert_eq!(light.diffuse, color);
            assert_eq!(light.specular, color);
        }
    }
}
