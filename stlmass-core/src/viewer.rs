/// Viewer state: loaded mesh, fit-to-view framing, camera and orbit rotation
///
/// Front ends own one `ViewerContext` and pass it to their render and
/// input handlers.
use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::{Bounds, Mesh};
use crate::projection::Camera;

/// Size the largest mesh dimension is scaled to
pub const DEFAULT_EXTENT: f32 = 50.0;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Rotation matrix applying Z, then Y, then X
    pub fn matrix(&self) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.z));

        rz * ry * rx
    }
}

/// Centers a mesh on its bounding box and scales it to a fixed extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    /// Bounding box center in mesh coordinates (mm)
    pub center: Point3<f32>,
    /// Largest bounding box dimension in mesh coordinates (mm)
    pub max_dimension: f32,
    /// Uniform scale applied after centering
    pub scale: f32,
    pub extent: f32,
}

impl Framing {
    /// Fit `bounds` into a cube of edge `extent`
    ///
    /// Empty or flat-to-a-point meshes keep scale 1.
    pub fn fit(bounds: Option<Bounds>, extent: f32) -> Self {
        let (center, max_dimension) = match bounds {
            Some(b) => (b.center(), b.max_dimension()),
            None => (Point3::origin(), 0.0),
        };
        let scale = if max_dimension > f32::EPSILON {
            extent / max_dimension
        } else {
            1.0
        };

        Self {
            center,
            max_dimension,
            scale,
            extent,
        }
    }

    /// Mesh coordinates to centered, scaled view coordinates
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_scaling(self.scale) * Matrix4::new_translation(&-self.center.coords)
    }

    /// Camera sits on +Z at twice the fitted extent, looking at the origin
    pub fn camera_position(&self) -> Point3<f32> {
        Point3::new(0.0, 0.0, self.extent * 2.0)
    }
}

/// Everything a front end needs to draw the current mesh
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub mesh: Mesh,
    pub camera: Camera,
    pub rotation: RotationState,
    pub framing: Framing,
}

impl ViewerContext {
    pub fn new(mesh: Mesh, width: u32, height: u32) -> Self {
        let mut context = Self {
            mesh: Mesh::new(),
            camera: Camera::new(width, height),
            rotation: RotationState::default(),
            framing: Framing::fit(None, DEFAULT_EXTENT),
        };
        context.load(mesh);
        context
    }

    /// Replace the displayed mesh and refit the camera to it
    pub fn load(&mut self, mesh: Mesh) {
        self.framing = Framing::fit(mesh.bounds(), self.framing.extent);
        self.camera
            .look_at(self.framing.camera_position(), Point3::origin());
        self.mesh = mesh;

        tracing::debug!(
            triangles = self.mesh.len(),
            max_dimension = self.framing.max_dimension,
            scale = self.framing.scale,
            "framed mesh"
        );
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn orbit(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation.rotate(dx, dy, dz);
    }

    /// Framing first, then the orbit rotation about the mesh center
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.rotation.matrix() * self.framing.matrix()
    }
}
