//! Noise configuration.
//!
//! [`NoiseConfig`] is the user-facing, serde-friendly description of a noise
//! field. [`NoiseConfig::prepare`] validates it and produces the
//! [`NoiseParams`] the kernels consume.

use serde::{Deserialize, Serialize};
use vecnoise_utils::{
    CellularDistance, CellularParams, CellularReturnType, FractalType, NoiseParams, NoiseType,
    PerturbParams, PerturbType,
};

use crate::error::{NoiseError, Result};

/// Cellular noise settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularConfig {
    /// Distance metric.
    pub distance: CellularDistance,
    /// Value derived from the nearest distances.
    pub return_type: CellularReturnType,
    /// Feature point spread inside a cell, `0..=1`.
    pub jitter: f32,
}

impl Default for CellularConfig {
    fn default() -> Self {
        Self {
            distance: CellularDistance::Euclidean,
            return_type: CellularReturnType::Distance,
            jitter: 1.0,
        }
    }
}

/// Coordinate perturbation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerturbConfig {
    /// Warp kind.
    #[serde(rename = "type")]
    pub kind: PerturbType,
    /// Offset scale.
    pub amplitude: f32,
    /// Warp frequency relative to the noise frequency.
    pub frequency: f32,
    /// Octaves of the fractal warp.
    pub octaves: u32,
    /// Frequency multiplier per warp octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per warp octave.
    pub gain: f32,
    /// Target length for the normalising warps.
    pub normalise_length: f32,
}

impl Default for PerturbConfig {
    fn default() -> Self {
        Self {
            kind: PerturbType::None,
            amplitude: 1.0,
            frequency: 0.5,
            octaves: 3,
            lacunarity: 2.0,
            gain: 0.5,
            normalise_length: 1.0,
        }
    }
}

/// Full description of a noise field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Base algorithm.
    #[serde(rename = "type")]
    pub noise: NoiseType,
    /// Octave combination.
    pub fractal: FractalType,
    /// Seed of the first octave; octave `i` uses `seed + i`.
    pub seed: i32,
    /// Coordinate scale.
    pub frequency: f32,
    /// Number of octaves.
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub gain: f32,
    /// Cellular settings.
    pub cellular: CellularConfig,
    /// Perturbation settings.
    pub perturb: PerturbConfig,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            noise: NoiseType::Simplex,
            fractal: FractalType::Fbm,
            seed: 1337,
            frequency: 0.01,
            octaves: 3,
            lacunarity: 2.0,
            gain: 0.5,
            cellular: CellularConfig::default(),
            perturb: PerturbConfig::default(),
        }
    }
}

fn check_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(NoiseError::InvalidConfig(format!("{name} must be finite, got {value}")))
    }
}

/// The octave amplitudes must sum to a finite, non-zero total.
fn check_bounding(name: &str, gain: f32, octaves: u32) -> Result<()> {
    let bounding = NoiseParams::fractal_bounding(gain, octaves);
    if bounding.is_finite() && bounding != 0.0 {
        Ok(())
    } else {
        Err(NoiseError::InvalidConfig(format!(
            "{name} {gain} over {octaves} octaves cannot be normalised"
        )))
    }
}

impl NoiseConfig {
    /// A default configuration for `noise`.
    #[must_use]
    pub fn new(noise: NoiseType) -> Self {
        Self {
            noise,
            ..Self::default()
        }
    }

    /// Checks every parameter range.
    pub fn validate(&self) -> Result<()> {
        if self.octaves == 0 {
            return Err(NoiseError::InvalidConfig("octaves must be at least 1".into()));
        }
        check_finite("frequency", self.frequency)?;
        if self.frequency <= 0.0 {
            return Err(NoiseError::InvalidConfig(format!(
                "frequency must be positive, got {}",
                self.frequency
            )));
        }
        check_finite("lacunarity", self.lacunarity)?;
        check_finite("gain", self.gain)?;
        if self.fractal != FractalType::None {
            check_bounding("gain", self.gain, self.octaves)?;
        }

        let jitter = self.cellular.jitter;
        if !(0.0..=1.0).contains(&jitter) {
            return Err(NoiseError::InvalidConfig(format!(
                "cellular jitter must be within [0, 1], got {jitter}"
            )));
        }

        let perturb = &self.perturb;
        if perturb.kind != PerturbType::None {
            if perturb.octaves == 0 {
                return Err(NoiseError::InvalidConfig(
                    "perturb octaves must be at least 1".into(),
                ));
            }
            check_finite("perturb amplitude", perturb.amplitude)?;
            check_finite("perturb frequency", perturb.frequency)?;
            check_finite("perturb lacunarity", perturb.lacunarity)?;
            check_finite("perturb gain", perturb.gain)?;
            check_finite("perturb normalise length", perturb.normalise_length)?;
            check_bounding("perturb gain", perturb.gain, perturb.octaves)?;
        }
        Ok(())
    }

    /// Validates and converts into kernel parameters.
    pub fn prepare(&self) -> Result<NoiseParams> {
        self.validate()?;
        Ok(NoiseParams {
            noise: self.noise,
            fractal: self.fractal,
            seed: self.seed,
            frequency: self.frequency,
            octaves: self.octaves,
            lacunarity: self.lacunarity,
            gain: self.gain,
            bounding: NoiseParams::fractal_bounding(self.gain, self.octaves),
            cellular: CellularParams {
                distance: self.cellular.distance,
                return_type: self.cellular.return_type,
                jitter: self.cellular.jitter,
            },
            perturb: PerturbParams {
                kind: self.perturb.kind,
                amplitude: self.perturb.amplitude,
                frequency: self.perturb.frequency,
                octaves: self.perturb.octaves,
                lacunarity: self.perturb.lacunarity,
                gain: self.perturb.gain,
                normalise_length: self.perturb.normalise_length,
            },
        })
    }

    /// Builds a configuration from the integer codes a binding layer passes.
    ///
    /// Unknown codes are rejected as [`NoiseError::InvalidConfig`].
    pub fn from_codes(noise: i32, fractal: i32) -> Result<Self> {
        let noise = NoiseType::try_from(noise).map_err(|e| NoiseError::InvalidConfig(e.to_string()))?;
        let fractal =
            FractalType::try_from(fractal).map_err(|e| NoiseError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            noise,
            fractal,
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = NoiseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.noise, NoiseType::Simplex);
        assert_eq!(config.seed, 1337);
    }

    #[test]
    fn test_rejects_zero_octaves() {
        let config = NoiseConfig {
            octaves: 0,
            ..NoiseConfig::default()
        };
        assert!(matches!(config.validate(), Err(NoiseError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_frequency() {
        for frequency in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = NoiseConfig {
                frequency,
                ..NoiseConfig::default()
            };
            assert!(config.prepare().is_err(), "frequency {frequency}");
        }
    }

    #[test]
    fn test_rejects_jitter_out_of_range() {
        let mut config = NoiseConfig::new(NoiseType::Cellular);
        config.cellular.jitter = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_perturb_checked_only_when_enabled() {
        let mut config = NoiseConfig::default();
        config.perturb.octaves = 0;
        assert!(config.validate().is_ok());
        config.perturb.kind = PerturbType::GradientFractal;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unnormalisable_gain() {
        // Amplitudes 1 and -1 cancel.
        let config = NoiseConfig {
            fractal: FractalType::Fbm,
            octaves: 2,
            gain: -1.0,
            ..NoiseConfig::new(NoiseType::Perlin)
        };
        assert!(matches!(config.validate(), Err(NoiseError::InvalidConfig(_))));

        let overflowing = NoiseConfig {
            gain: 1.0e30,
            octaves: 3,
            ..config
        };
        assert!(overflowing.validate().is_err());

        // A single layer is never summed.
        let plain = NoiseConfig {
            fractal: FractalType::None,
            ..config
        };
        assert!(plain.validate().is_ok());
    }

    #[test]
    fn test_rejects_unnormalisable_perturb_gain() {
        let mut config = NoiseConfig::default();
        config.perturb.kind = PerturbType::GradientFractal;
        config.perturb.octaves = 2;
        config.perturb.gain = -1.0;
        assert!(matches!(config.validate(), Err(NoiseError::InvalidConfig(_))));
        config.perturb.gain = 0.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prepare_computes_bounding() {
        let params = NoiseConfig::default().prepare().unwrap();
        assert!((params.bounding - 1.0 / 1.75).abs() < 1e-6);
    }

    #[test]
    fn test_from_codes() {
        let config = NoiseConfig::from_codes(1, 3).unwrap();
        assert_eq!(config.noise, NoiseType::Perlin);
        assert_eq!(config.fractal, FractalType::RigidMulti);
        assert!(matches!(
            NoiseConfig::from_codes(9, 0),
            Err(NoiseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: NoiseConfig =
            serde_json::from_str(r#"{"type": "cellular", "cellular": {"return_type": "distance2_sub"}}"#)
                .unwrap();
        assert_eq!(config.noise, NoiseType::Cellular);
        assert_eq!(config.cellular.return_type, CellularReturnType::Distance2Sub);
        assert!((config.cellular.jitter - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.octaves, 3);
    }
}
