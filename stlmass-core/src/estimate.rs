/// Volume and weight estimate for a printed part
use std::fmt;

use crate::config::EstimatorConfig;
use crate::error::MalformedInputError;
use crate::stl::StlBuffer;
use crate::volume;

/// PLA filament, g/cm³
pub const DEFAULT_DENSITY_G_PER_CM3: f64 = 1.24;

/// Weight in grams of `volume_cm3` of material at `density_g_per_cm3`
pub fn estimate_weight_g(volume_cm3: f64, density_g_per_cm3: f64) -> f64 {
    volume_cm3 * density_g_per_cm3
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub triangle_count: usize,
    pub volume_cm3: f64,
    pub weight_g: f64,
    pub density_g_per_cm3: f64,
}

impl Estimate {
    pub fn from_volume(triangle_count: usize, volume_cm3: f64, density_g_per_cm3: f64) -> Self {
        Self {
            triangle_count,
            volume_cm3,
            weight_g: estimate_weight_g(volume_cm3, density_g_per_cm3),
            density_g_per_cm3,
        }
    }

    /// Volume rounded for display, e.g. `"1.00"`
    pub fn volume_text(&self) -> String {
        format!("{:.2}", self.volume_cm3)
    }

    /// Weight rounded for display, e.g. `"1.2"`
    pub fn weight_text(&self) -> String {
        format!("{:.1}", self.weight_g)
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Volume: {} cm³ | Weight: {} g",
            self.volume_text(),
            self.weight_text()
        )
    }
}

/// Validate `data`, sum its volume and derive the weight
pub fn estimate(data: &[u8], config: &EstimatorConfig) -> Result<Estimate, MalformedInputError> {
    estimate_buffer(&StlBuffer::new(data, config.header_check)?, config)
}

/// Estimate from an already validated buffer
///
/// The buffer's header policy was applied when it was built, so
/// `config.header_check` is not consulted again.
pub fn estimate_buffer(
    buffer: &StlBuffer<'_>,
    config: &EstimatorConfig,
) -> Result<Estimate, MalformedInputError> {
    let signed_mm3 = sum_buffer(buffer, config)?;
    let estimate = Estimate::from_volume(
        buffer.len(),
        volume::to_cm3(signed_mm3),
        config.density_g_per_cm3,
    );

    tracing::debug!(
        triangles = estimate.triangle_count,
        volume_cm3 = estimate.volume_cm3,
        weight_g = estimate.weight_g,
        "estimated print volume"
    );
    Ok(estimate)
}

#[cfg(feature = "parallel")]
fn sum_buffer(buffer: &StlBuffer<'_>, config: &EstimatorConfig) -> Result<f64, MalformedInputError> {
    if buffer.len() >= config.parallel_threshold {
        volume::par_sum_signed_volume(buffer)
    } else {
        volume::sum_signed_volume(buffer.triangles())
    }
}

#[cfg(not(feature = "parallel"))]
fn sum_buffer(buffer: &StlBuffer<'_>, _config: &EstimatorConfig) -> Result<f64, MalformedInputError> {
    volume::sum_signed_volume(buffer.triangles())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::stl::{encode, HeaderCheck};

    #[test]
    fn test_weight_is_plain_product() {
        for (v, d) in [(0.0, 1.24), (1.0, 1.24), (12.345, 0.98), (1e6, 7.85)] {
            assert_eq!(estimate_weight_g(v, d), v * d);
        }
    }

    #[test]
    fn test_buffer_shared_with_mesh_decode() {
        let mut data = encode(&Mesh::cube(10.0).triangles);
        data[80..84].copy_from_slice(&99u32.to_le_bytes());
        let buffer = StlBuffer::new(&data, HeaderCheck::Ignore).unwrap();

        let estimate = estimate_buffer(&buffer, &EstimatorConfig::default()).unwrap();
        let mesh = Mesh::from_triangles(buffer.triangles()).unwrap();
        assert_eq!(estimate.triangle_count, mesh.len());
        assert!((estimate.volume_cm3 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ten_mm_cube() {
        let data = encode(&Mesh::cube(10.0).triangles);
        let estimate = estimate(&data, &EstimatorConfig::default()).unwrap();
        assert_eq!(estimate.triangle_count, 12);
        assert!((estimate.volume_cm3 - 1.0).abs() < 0.01);
        assert!((estimate.weight_g - 1.24).abs() < 0.01);
        assert_eq!(estimate.volume_text(), "1.00");
        assert_eq!(estimate.weight_text(), "1.2");
        assert_eq!(estimate.to_string(), "Volume: 1.00 cm³ | Weight: 1.2 g");
    }

    #[test]
    fn test_empty_buffer() {
        let data = encode(&[]);
        let estimate = estimate(&data, &EstimatorConfig::default()).unwrap();
        assert_eq!(estimate.triangle_count, 0);
        assert_eq!(estimate.volume_cm3, 0.0);
        assert_eq!(estimate.weight_g, 0.0);
    }

    #[test]
    fn test_parallel_threshold_gives_same_estimate() {
        let data = encode(&Mesh::cube(25.0).triangles);
        let sequential = estimate(&data, &EstimatorConfig::default()).unwrap();
        let config = EstimatorConfig {
            parallel_threshold: 0,
            ..EstimatorConfig::default()
        };
        let eager = estimate(&data, &config).unwrap();
        assert!((sequential.volume_cm3 - eager.volume_cm3).abs() < 1e-9);
    }

    #[test]
    fn test_header_check_follows_config() {
        let mut data = encode(&Mesh::cube(10.0).triangles);
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        assert!(estimate(&data, &EstimatorConfig::default()).is_err());

        let config = EstimatorConfig::default().with_header_check(HeaderCheck::Ignore);
        let estimate = estimate(&data, &config).unwrap();
        assert!((estimate.volume_cm3 - 1.0).abs() < 1e-9);
    }
}
