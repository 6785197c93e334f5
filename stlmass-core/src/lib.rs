/// stlmass core library - binary STL volume and weight estimation
///
/// Decodes binary STL buffers into a lazy triangle stream, sums signed
/// tetrahedron volumes into a printed volume (cm³) and weight (g), and
/// holds the framing state a viewer needs to display the mesh.

pub mod config;
pub mod error;
pub mod estimate;
pub mod geometry;
pub mod projection;
pub mod stl;
pub mod store;
pub mod viewer;
pub mod volume;

// Re-export commonly used types
pub use config::EstimatorConfig;
pub use error::{ConfigError, MalformedInputError};
pub use estimate::{estimate, estimate_buffer, estimate_weight_g, Estimate, DEFAULT_DENSITY_G_PER_CM3};
pub use geometry::{Bounds, Mesh, Triangle};
pub use projection::Camera;
pub use stl::{parse_triangles, HeaderCheck, StlBuffer, Triangles};
pub use store::{MemoryStore, ResultStore};
pub use viewer::{Framing, RotationState, ViewerContext};
pub use volume::{estimate_volume_cm3, signed_tetrahedron_volume};
