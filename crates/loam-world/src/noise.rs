//! Fractal 2D noise in `[0, 1]`, value shaping helpers and domain warping.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::{Deserialize, Serialize};

use crate::chunk_position::SeedOffset;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseBasis {
    #[default]
    Perlin,
    Value,
    OpenSimplex2,
}

impl NoiseBasis {
    fn noise_type(self) -> NoiseType {
        match self {
            NoiseBasis::Perlin => NoiseType::Perlin,
            NoiseBasis::Value => NoiseType::Value,
            NoiseBasis::OpenSimplex2 => NoiseType::OpenSimplex2,
        }
    }
}

/// Parameters of one fractal noise field. Never mutated after construction;
/// the per-world offset is passed to [`NoiseField::sample`] instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseSettings {
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    #[serde(default = "default_redistribution_modifier")]
    pub redistribution_modifier: f32,
    #[serde(default = "default_exponent")]
    pub exponent: f32,
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(default)]
    pub seed: i32,
    #[serde(default)]
    pub basis: NoiseBasis,
}
fn default_zoom() -> f32 {
    0.01
}
fn default_octaves() -> u32 {
    5
}
fn default_persistence() -> f32 {
    0.5
}
fn default_redistribution_modifier() -> f32 {
    1.2
}
fn default_exponent() -> f32 {
    4.0
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            octaves: default_octaves(),
            persistence: default_persistence(),
            redistribution_modifier: default_redistribution_modifier(),
            exponent: default_exponent(),
            offset: [0.0, 0.0],
            seed: 0,
            basis: NoiseBasis::Perlin,
        }
    }
}

impl NoiseSettings {
    /// Checks the invariants `sample` relies on. Returns a human readable
    /// reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.octaves == 0 {
            return Err("octaves must be at least 1".into());
        }
        let finite = [
            self.zoom,
            self.persistence,
            self.redistribution_modifier,
            self.exponent,
            self.offset[0],
            self.offset[1],
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err("noise parameters must be finite".into());
        }
        if self.zoom <= 0.0 {
            return Err(format!("zoom must be positive, got {}", self.zoom));
        }
        if self.persistence < 0.0 {
            return Err(format!(
                "persistence must not be negative, got {}",
                self.persistence
            ));
        }
        if self.redistribution_modifier <= 0.0 {
            return Err(format!(
                "redistribution_modifier must be positive, got {}",
                self.redistribution_modifier
            ));
        }
        Ok(())
    }
}

/// A sampled fractal field built from [`NoiseSettings`].
pub struct NoiseField {
    settings: NoiseSettings,
    base: FastNoiseLite,
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl NoiseField {
    pub fn new(settings: NoiseSettings) -> Self {
        let mut base = FastNoiseLite::with_seed(settings.seed);
        base.set_noise_type(Some(settings.basis.noise_type()));
        base.set_frequency(Some(1.0));
        Self { settings, base }
    }

    #[inline]
    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Octave noise at world `(x, z)`, normalized into `[0, 1]`.
    pub fn sample(&self, x: f32, z: f32, world_offset: SeedOffset) -> f32 {
        let s = &self.settings;
        let sx = x * s.zoom;
        let sz = z * s.zoom;
        let ox = s.offset[0] + world_offset.x as f32;
        let oz = s.offset[1] + world_offset.z as f32;

        let mut total = 0.0f32;
        let mut frequency = 1.0f32;
        let mut amplitude = 1.0f32;
        let mut weight = 0.0f32;
        for _ in 0..s.octaves {
            total += self.base01((ox + sx) * frequency, (oz + sz) * frequency) * amplitude;
            weight += amplitude;
            amplitude *= s.persistence;
            frequency *= 2.0;
        }
        if weight <= 0.0 {
            return 0.0;
        }
        (total / weight).clamp(0.0, 1.0)
    }

    #[inline]
    fn base01(&self, x: f32, z: f32) -> f32 {
        (self.base.get_noise_2d(x, z) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// `(value * modifier) ^ exponent`.
#[inline]
pub fn redistribution(value: f32, settings: &NoiseSettings) -> f32 {
    (value * settings.redistribution_modifier).powf(settings.exponent)
}

/// Maps `[0, 1]` onto `[min, max]` and truncates toward zero.
#[inline]
pub fn remap01_to_int(value: f32, min: f32, max: f32) -> i32 {
    (value * (max - min) + min) as i32
}

#[inline]
pub fn remap_value(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

/// Perturbs sample coordinates with two independent fields before sampling
/// the terrain field.
#[derive(Debug)]
pub struct DomainWarping {
    field_x: NoiseField,
    field_z: NoiseField,
    amplitude_x: f32,
    amplitude_z: f32,
}

impl DomainWarping {
    pub fn new(noise_x: NoiseSettings, noise_z: NoiseSettings, amplitude_x: f32, amplitude_z: f32) -> Self {
        Self {
            field_x: NoiseField::new(noise_x),
            field_z: NoiseField::new(noise_z),
            amplitude_x,
            amplitude_z,
        }
    }

    /// Coordinate displacement at `(x, z)`.
    #[inline]
    pub fn offset(&self, x: f32, z: f32, world_offset: SeedOffset) -> (f32, f32) {
        (
            self.field_x.sample(x, z, world_offset) * self.amplitude_x,
            self.field_z.sample(x, z, world_offset) * self.amplitude_z,
        )
    }

    pub fn sample(&self, x: f32, z: f32, terrain: &NoiseField, world_offset: SeedOffset) -> f32 {
        let (ox, oz) = self.offset(x, z, world_offset);
        terrain.sample(x + ox, z + oz, world_offset)
    }
}
