//! Engine tolerances and limits, optionally loaded from TOML.
//!
//! ```toml
//! [trace]
//! max_bounces = 30
//! hit_radius = 0.8
//!
//! [analysis]
//! convergence_tolerance = 1.0
//! ```
//!
//! Every key is optional; omitted keys keep the stock values.

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub trace: TraceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Limits applied while propagating branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Interactions a single branch may undergo before it is emitted as-is.
    #[serde(default = "default_max_bounces")]
    pub max_bounces: u32,
    /// Components closer than this along the ray are ignored (grid units).
    #[serde(default = "default_min_advance")]
    pub min_advance: f64,
    /// Maximum perpendicular miss distance that still counts as a hit (grid units).
    #[serde(default = "default_hit_radius")]
    pub hit_radius: f64,
    /// Branches weaker than this stop; split branches must exceed it to be spawned.
    #[serde(default = "default_intensity_floor")]
    pub intensity_floor: f64,
    /// Fraction of power a lens passes.
    #[serde(default = "default_lens_transmission")]
    pub lens_transmission: f64,
}

fn default_max_bounces() -> u32 {
    30
}
fn default_min_advance() -> f64 {
    0.1
}
fn default_hit_radius() -> f64 {
    0.8
}
fn default_intensity_floor() -> f64 {
    0.01
}
fn default_lens_transmission() -> f64 {
    0.95
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_bounces: default_max_bounces(),
            min_advance: default_min_advance(),
            hit_radius: default_hit_radius(),
            intensity_floor: default_intensity_floor(),
            lens_transmission: default_lens_transmission(),
        }
    }
}

/// Tolerances used when post-processing traced rays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Per-axis distance at which a path point is attributed to a component.
    #[serde(default = "default_match_tolerance")]
    pub match_tolerance: f64,
    /// Per-axis distance at which a ray's end point counts as reaching a detector.
    #[serde(default = "default_convergence_tolerance")]
    pub convergence_tolerance: f64,
    /// Fractional power lost in a lens.
    #[serde(default = "default_lens_loss")]
    pub lens_loss: f64,
}

fn default_match_tolerance() -> f64 {
    0.5
}
fn default_convergence_tolerance() -> f64 {
    1.0
}
fn default_lens_loss() -> f64 {
    0.05
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            match_tolerance: default_match_tolerance(),
            convergence_tolerance: default_convergence_tolerance(),
            lens_loss: default_lens_loss(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.trace;
        let a = &self.analysis;
        if t.max_bounces == 0 {
            return Err(EngineError::InvalidConfig("trace.max_bounces must be at least 1".into()));
        }
        let non_negative = [
            ("trace.min_advance", t.min_advance),
            ("trace.hit_radius", t.hit_radius),
            ("trace.intensity_floor", t.intensity_floor),
            ("analysis.match_tolerance", a.match_tolerance),
            ("analysis.convergence_tolerance", a.convergence_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        let fractions = [
            ("trace.lens_transmission", t.lens_transmission),
            ("analysis.lens_loss", a.lens_loss),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.trace.max_bounces, 30);
        assert_eq!(config.trace.hit_radius, 0.8);
        assert_eq!(config.trace.intensity_floor, 0.01);
        assert_eq!(config.analysis.convergence_tolerance, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("[trace]\nmax_bounces = 5\n").unwrap();
        assert_eq!(config.trace.max_bounces, 5);
        assert_eq!(config.trace.min_advance, 0.1);
        assert_eq!(config.analysis, AnalysisConfig::default());
    }

    #[test]
    fn test_empty_toml() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(EngineConfig::from_toml_str("[trace]\nmax_bounces = 0\n").is_err());
        assert!(EngineConfig::from_toml_str("[trace]\nhit_radius = -1.0\n").is_err());
        assert!(EngineConfig::from_toml_str("[analysis]\nlens_loss = 2.0\n").is_err());
        assert!(matches!(
            EngineConfig::from_toml_str("[trace]\nmax_bounces = \"many\"\n"),
            Err(EngineError::Config(_))
        ));
    }
}
