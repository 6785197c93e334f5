/// stlmass web - browser boundary for the STL estimator
///
/// The page reads the selected file into a `Uint8Array` and hands it over
/// once fully loaded. Rendering stays in JavaScript; `frame` returns the
/// numbers needed to center, scale and aim the camera at the mesh.
use stlmass_core::store::{self, ResultStore};
use stlmass_core::viewer::{Framing, DEFAULT_EXTENT};
use stlmass_core::{Estimate, EstimatorConfig, Mesh, StlBuffer};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct StlEstimator {
    config: EstimatorConfig,
}

#[wasm_bindgen]
impl StlEstimator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> StlEstimator {
        StlEstimator {
            config: EstimatorConfig::default(),
        }
    }

    /// Estimator for a material other than PLA
    #[wasm_bindgen(js_name = withDensity)]
    pub fn with_density(density_g_per_cm3: f64) -> Result<StlEstimator, JsValue> {
        let config = EstimatorConfig::default()
            .with_density(density_g_per_cm3)
            .map_err(to_js_error)?;
        Ok(StlEstimator { config })
    }

    #[wasm_bindgen(getter)]
    pub fn density(&self) -> f64 {
        self.config.density_g_per_cm3
    }

    /// Volume and weight of a binary STL; throws on malformed input
    pub fn estimate(&self, bytes: &[u8]) -> Result<EstimateView, JsValue> {
        let estimate = stlmass_core::estimate(bytes, &self.config).map_err(to_js_error)?;
        Ok(EstimateView { estimate })
    }

    /// Fit-to-view transform for the mesh in `bytes`
    pub fn frame(&self, bytes: &[u8]) -> Result<FramingView, JsValue> {
        let buffer = StlBuffer::new(bytes, self.config.header_check).map_err(to_js_error)?;
        let mesh = Mesh::from_triangles(buffer.triangles()).map_err(to_js_error)?;
        Ok(FramingView {
            framing: Framing::fit(mesh.bounds(), DEFAULT_EXTENT),
        })
    }
}

impl Default for StlEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
pub struct EstimateView {
    estimate: Estimate,
}

#[wasm_bindgen]
impl EstimateView {
    #[wasm_bindgen(getter, js_name = triangleCount)]
    pub fn triangle_count(&self) -> usize {
        self.estimate.triangle_count
    }

    #[wasm_bindgen(getter, js_name = volumeCm3)]
    pub fn volume_cm3(&self) -> f64 {
        self.estimate.volume_cm3
    }

    #[wasm_bindgen(getter, js_name = weightG)]
    pub fn weight_g(&self) -> f64 {
        self.estimate.weight_g
    }

    /// Volume with 2 decimals
    #[wasm_bindgen(js_name = volumeText)]
    pub fn volume_text(&self) -> String {
        self.estimate.volume_text()
    }

    /// Weight with 1 decimal
    #[wasm_bindgen(js_name = weightText)]
    pub fn weight_text(&self) -> String {
        self.estimate.weight_text()
    }
}

#[wasm_bindgen]
pub struct FramingView {
    framing: Framing,
}

#[wasm_bindgen]
impl FramingView {
    /// Bounding box center `[x, y, z]` to subtract before scaling
    pub fn center(&self) -> Vec<f32> {
        self.framing.center.coords.iter().copied().collect()
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f32 {
        self.framing.scale
    }

    #[wasm_bindgen(getter, js_name = maxDimension)]
    pub fn max_dimension(&self) -> f32 {
        self.framing.max_dimension
    }

    /// Camera position `[x, y, z]`, looking at the origin
    #[wasm_bindgen(js_name = cameraPosition)]
    pub fn camera_position(&self) -> Vec<f32> {
        self.framing.camera_position().coords.iter().copied().collect()
    }
}

/// `window.localStorage` as a result store
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn from_window() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

impl ResultStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) {
        // Quota or privacy-mode failures only lose the cached copy.
        if self.storage.set_item(key, value).is_err() {
            tracing::warn!(key, "failed to write localStorage slot");
        }
    }
}

/// Cache the estimate under `stlVolume` / `stlWeight` for another page to read
///
/// Returns false when storage is unavailable.
#[wasm_bindgen(js_name = persistEstimate)]
pub fn persist_estimate(view: &EstimateView) -> bool {
    match LocalStorage::from_window() {
        Some(storage) => {
            store::persist_estimate(&storage, &view.estimate);
            true
        }
        None => false,
    }
}

/// Last cached `[volumeCm3, weightG]`, or `undefined`
#[wasm_bindgen(js_name = readPersistedEstimate)]
pub fn read_persisted_estimate() -> Option<Vec<f64>> {
    let storage = LocalStorage::from_window()?;
    let (volume, weight) = store::read_estimate(&storage)?;
    Some(vec![volume, weight])
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stlmass_core::Triangle;

    fn binary_stl(triangles: &[Triangle]) -> Vec<u8> {
        let mut data = vec![0u8; 80];
        data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for triangle in triangles {
            data.extend_from_slice(&[0u8; 12]);
            for value in triangle.vertices.iter().flat_map(|v| v.coords.iter()) {
                data.extend_from_slice(&value.to_le_bytes());
            }
            data.extend_from_slice(&[0u8; 2]);
        }
        data
    }

    #[test]
    fn test_estimate_view_text() {
        let data = binary_stl(&Mesh::cube(10.0).triangles);
        let view = StlEstimator::new().estimate(&data).unwrap();
        assert_eq!(view.triangle_count(), 12);
        assert_eq!(view.volume_text(), "1.00");
        assert_eq!(view.weight_text(), "1.2");
    }

    #[test]
    fn test_frame_cube() {
        let data = binary_stl(&Mesh::cube(10.0).triangles);
        let framing = StlEstimator::new().frame(&data).unwrap();
        assert!((framing.scale() - 5.0).abs() < 1e-6);
        assert_eq!(framing.center(), vec![0.0, 0.0, 0.0]);
        assert_eq!(framing.camera_position(), vec![0.0, 0.0, 100.0]);
    }
}
