use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PARTICLE_COUNT: usize = 50;

/// Base amplitude of the brightness pulse.
pub const SHIMMER_AMPLITUDE: f32 = 0.2;
/// Base frequency shared by brightness and drift.
pub const SHIMMER_FREQUENCY: f32 = 0.05;
/// Subtracted from the pulse to keep the dust dim.
pub const SHIMMER_BIAS: f32 = 0.2;
/// Base amplitude of the vertical drift.
pub const DRIFT_AMPLITUDE: f32 = 0.1;

/// A dust mote, fixed at setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub size: f32,
    /// Grayscale tint, r = g = b.
    pub tint: Vec3,
}

impl Particle {
    fn random<R: Rng>(rng: &mut R) -> Self {
        let position = Vec3::new(
            rng.gen_range(-8.0..8.0),
            rng.gen_range(0.1..2.0),
            rng.gen_range(0.0..4.0),
        );
        let size = rng.gen_range(0.05..0.15);
        let gray = rng.gen_range(0.0..0.1);
        Self {
            position,
            size,
            tint: Vec3::splat(gray),
        }
    }
}

/// Random offsets drawn for one particle in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleJitter {
    pub frequency: f32,
    pub amplitude: f32,
    pub phase: f32,
    pub drift_frequency: f32,
    pub drift_amplitude: f32,
}

impl ParticleJitter {
    /// Reseeds a stream with `index` and draws the offsets in a fixed order.
    pub fn for_index(index: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(index as u64);
        let frequency = rng.gen_range(0.0..3.0);
        let amplitude = rng.gen_range(0.0..0.1);
        let phase = rng.gen_range(0.0..100.0);
        let drift_frequency = rng.gen_range(0.0..1.0);
        let drift_amplitude = rng.gen_range(0.0..0.1);
        Self {
            frequency,
            amplitude,
            phase,
            drift_frequency,
            drift_amplitude,
        }
    }
}

/// `((amp + amp_jitter) * sin(2π (freq + freq_jitter) t + phase) + 1) / 2 - bias`
pub fn brightness(
    amplitude: f32,
    amplitude_jitter: f32,
    frequency: f32,
    frequency_jitter: f32,
    phase: f32,
    elapsed: f32,
    bias: f32,
) -> f32 {
    let wave = (TAU * (frequency + frequency_jitter) * elapsed + phase).sin();
    ((amplitude + amplitude_jitter) * wave + 1.0) / 2.0 - bias
}

/// Vertical displacement of a particle for one frame.
pub fn drift(amplitude: f32, frequency: f32, phase: f32, elapsed: f32) -> f32 {
    amplitude * (TAU * frequency * elapsed + phase).sin()
}

/// Billboard emitted for one particle in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSprite {
    pub center: Vec3,
    pub radius: f32,
    pub brightness: f32,
}

/// Fixed pool of dust particles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn generate<R: Rng>(count: usize, rng: &mut R) -> Self {
        let particles = (0..count).map(|_| Particle::random(rng)).collect();
        Self { particles }
    }

    pub fn with_seed(count: usize, seed: u64) -> Self {
        Self::generate(count, &mut StdRng::seed_from_u64(seed))
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Sprite for particle `index` at time `elapsed`.
    pub fn sprite(&self, index: usize, elapsed: f32) -> Option<ParticleSprite> {
        let particle = self.particles.get(index)?;
        let jitter = ParticleJitter::for_index(index);
        let value = brightness(
            SHIMMER_AMPLITUDE,
            jitter.amplitude,
            SHIMMER_FREQUENCY,
            jitter.frequency,
            jitter.phase,
            elapsed,
            SHIMMER_BIAS,
        );
        let offset = drift(
            DRIFT_AMPLITUDE + jitter.drift_amplitude,
            SHIMMER_FREQUENCY + jitter.drift_frequency,
            jitter.phase,
            elapsed,
        );
        Some(ParticleSprite {
            center: particle.position + Vec3::new(0.0, offset, 0.0),
            radius: particle.size,
            brightness: value,
        })
    }

    /// Sprites for every particle, in pool order.
    pub fn sprites(&self, elapsed: f32) -> Vec<ParticleSprite> {
        (0..self.particles.len())
            .filter_map(|index| self.sprite(index, elapsed))
            .collect()
    }
}
