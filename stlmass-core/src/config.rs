/// Estimator configuration
use serde::Deserialize;

use crate::error::ConfigError;
use crate::estimate::DEFAULT_DENSITY_G_PER_CM3;
use crate::stl::HeaderCheck;

/// Settings for [`crate::estimate::estimate`]
///
/// Every field has a default, so an empty TOML document is a valid config:
///
/// ```toml
/// density_g_per_cm3 = 1.24
/// header_check = "strict"   # or "ignore"
/// parallel_threshold = 100000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Material density in g/cm³
    pub density_g_per_cm3: f64,
    pub header_check: HeaderCheck,
    /// Meshes with at least this many triangles are summed on the rayon pool.
    /// Ignored without the `parallel` feature.
    pub parallel_threshold: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            density_g_per_cm3: DEFAULT_DENSITY_G_PER_CM3,
            header_check: HeaderCheck::Strict,
            parallel_threshold: 100_000,
        }
    }
}

impl EstimatorConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_density(mut self, density_g_per_cm3: f64) -> Result<Self, ConfigError> {
        self.density_g_per_cm3 = density_g_per_cm3;
        self.validate()?;
        Ok(self)
    }

    pub fn with_header_check(mut self, header_check: HeaderCheck) -> Self {
        self.header_check = header_check;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let density = self.density_g_per_cm3;
        if !density.is_finite() || density < 0.0 {
            return Err(ConfigError::InvalidDensity(density));
        }
        Ok(())
    }
}
