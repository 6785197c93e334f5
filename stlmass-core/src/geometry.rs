/// Geometry primitives for decoded STL meshes
use nalgebra::{Point3, Vector3};

use crate::error::MalformedInputError;
use crate::stl::{self, Triangles};
use crate::volume::signed_tetrahedron_volume;

/// A triangle facet as stored in a binary STL record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Normal written by the exporter. Never trusted for volume.
    pub normal: Vector3<f32>,
    pub vertices: [Point3<f32>; 3],
    /// Attribute byte count, usually zero.
    pub attribute: u16,
}

impl Triangle {
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let mut triangle = Self {
            normal: Vector3::zeros(),
            vertices: [a, b, c],
            attribute: 0,
        };
        triangle.normal = triangle.calculate_normal();
        triangle
    }

    /// Calculate the face normal from the triangle's winding
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Signed volume in mm³ of the tetrahedron spanned by this face and the origin
    pub fn signed_volume(&self) -> f64 {
        let [a, b, c] = &self.vertices;
        signed_tetrahedron_volume(a, b, c)
    }

    /// Same face with the opposite winding
    pub fn reversed(&self) -> Self {
        let [a, b, c] = self.vertices;
        Self {
            normal: -self.normal,
            vertices: [a, c, b],
            attribute: self.attribute,
        }
    }

    pub fn translated(&self, offset: &Vector3<f32>) -> Self {
        Self {
            normal: self.normal,
            vertices: self.vertices.map(|v| v + offset),
            attribute: self.attribute,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.vertices
            .iter()
            .all(|v| v.coords.iter().all(|c| c.is_finite()))
    }
}

/// Axis-aligned bounds of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn max_dimension(&self) -> f32 {
        self.size().max()
    }

    fn include(&mut self, p: &Point3<f32>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }
}

/// A triangle soup decoded from an STL buffer
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    /// Decode every record of a binary STL buffer into memory
    pub fn from_stl(data: &[u8]) -> Result<Self, MalformedInputError> {
        Self::from_triangles(stl::parse_triangles(data)?)
    }

    pub fn from_triangles(triangles: Triangles<'_>) -> Result<Self, MalformedInputError> {
        let mut mesh = Self::with_capacity(triangles.len());
        for triangle in triangles {
            mesh.add_triangle(triangle?);
        }
        Ok(mesh)
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box over all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.triangles.first()?.vertices[0];
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for v in self.triangles.iter().flat_map(|t| t.vertices.iter()) {
            bounds.include(v);
        }
        Some(bounds)
    }

    /// Sum of per-face signed tetrahedron volumes in mm³
    ///
    /// Only meaningful for a watertight, consistently wound mesh. Holes or
    /// mixed winding give a wrong but finite number; nothing here checks.
    pub fn signed_volume_mm3(&self) -> f64 {
        self.triangles.iter().map(Triangle::signed_volume).sum()
    }

    pub fn reversed(&self) -> Self {
        Self {
            triangles: self.triangles.iter().map(Triangle::reversed).collect(),
        }
    }

    pub fn translated(&self, offset: &Vector3<f32>) -> Self {
        Self {
            triangles: self.triangles.iter().map(|t| t.translated(offset)).collect(),
        }
    }

    /// Closed, outward-wound cube of edge `size` centered on the origin
    pub fn cube(size: f32) -> Self {
        Self::cube_at(size, Point3::origin())
    }

    /// Closed, outward-wound cube of edge `size` centered on `center`
    pub fn cube_at(size: f32, center: Point3<f32>) -> Self {
        // Corner index bits select +x, +y, +z.
        const FACES: [[usize; 3]; 12] = [
            [4, 5, 7], [4, 7, 6], // +z
            [0, 2, 3], [0, 3, 1], // -z
            [2, 6, 7], [2, 7, 3], // +y
            [0, 1, 5], [0, 5, 4], // -y
            [1, 3, 7], [1, 7, 5], // +x
            [0, 4, 6], [0, 6, 2], // -x
        ];

        let half = size / 2.0;
        let corner = |i: usize| {
            let sign = |bit: usize| if i & bit != 0 { half } else { -half };
            center + Vector3::new(sign(1), sign(2), sign(4))
        };

        let mut mesh = Self::with_capacity(FACES.len());
        for [a, b, c] in FACES {
            mesh.add_triangle(Triangle::new(corner(a), corner(b), corner(c)));
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_faces_point_outward() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.len(), 12);
        for triangle in &cube.triangles {
            let centroid = (triangle.vertices[0].coords
                + triangle.vertices[1].coords
                + triangle.vertices[2].coords)
                / 3.0;
            assert!(triangle.normal.dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_cube_signed_volume() {
        let cube = Mesh::cube(10.0);
        assert!((cube.signed_volume_mm3() - 1000.0).abs() < 1e-6);
        assert!((cube.reversed().signed_volume_mm3() + 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounds() {
        let cube = Mesh::cube_at(4.0, Point3::new(10.0, 0.0, -2.0));
        let bounds = cube.bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(8.0, -2.0, -4.0));
        assert_eq!(bounds.max, Point3::new(12.0, 2.0, 0.0));
        assert_eq!(bounds.center(), Point3::new(10.0, 0.0, -2.0));
        assert!((bounds.max_dimension() - 4.0).abs() < 1e-6);
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn test_from_stl() {
        let cube = Mesh::cube(6.0);
        let mesh = Mesh::from_stl(&stl::encode(&cube.triangles)).unwrap();
        assert_eq!(mesh.triangles, cube.triangles);
        assert!(Mesh::from_stl(&[0u8; 100]).is_err());
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let triangle = Triangle::new(p, p, p);
        assert_eq!(triangle.normal, Vector3::zeros());
        assert_eq!(triangle.signed_volume(), 0.0);
    }
}
