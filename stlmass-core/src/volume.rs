/// Mesh volume by signed tetrahedron decomposition
///
/// For a closed, consistently wound mesh the divergence theorem gives the
/// enclosed volume as the sum, over every face, of the signed volume of the
/// tetrahedron joining that face to a fixed apex (here the origin). Faces
/// seen from the "outside" and "inside" of the apex cancel, so the result
/// does not depend on where the mesh sits in space.
///
/// Neither watertightness nor consistent winding is verified. A mesh with
/// holes or flipped faces produces a finite but wrong volume.
use nalgebra::Point3;

use crate::error::MalformedInputError;
use crate::stl::{self, Triangles};
#[cfg(feature = "parallel")]
use crate::stl::{HeaderCheck, StlBuffer};

pub const MM3_PER_CM3: f64 = 1000.0;

/// Triangles per rayon work item
#[cfg(feature = "parallel")]
const PARALLEL_CHUNK: usize = 4096;

/// Signed volume of the tetrahedron (origin, a, b, c), i.e. the scalar
/// triple product `a · (b × c) / 6`
///
/// Evaluated in `f64` so that large meshes do not lose the small
/// per-face contributions.
pub fn signed_tetrahedron_volume(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> f64 {
    let (ax, ay, az) = (f64::from(a.x), f64::from(a.y), f64::from(a.z));
    let (bx, by, bz) = (f64::from(b.x), f64::from(b.y), f64::from(b.z));
    let (cx, cy, cz) = (f64::from(c.x), f64::from(c.y), f64::from(c.z));

    (ax * by * cz + bx * cy * az + cx * ay * bz - ax * cy * bz - bx * ay * cz - cx * by * az) / 6.0
}

/// Sum the signed volumes (mm³) of a triangle stream, stopping at the first bad record
pub fn sum_signed_volume(mut triangles: Triangles<'_>) -> Result<f64, MalformedInputError> {
    triangles.try_fold(0.0, |acc, triangle| Ok(acc + triangle?.signed_volume()))
}

/// Same sum as [`sum_signed_volume`] split over disjoint chunks on the rayon pool
///
/// Floating-point addition order differs from the sequential sum, so the
/// two may disagree in the last few bits.
#[cfg(feature = "parallel")]
pub fn par_sum_signed_volume(buffer: &StlBuffer<'_>) -> Result<f64, MalformedInputError> {
    use rayon::prelude::*;

    buffer
        .records()
        .par_chunks(stl::RECORD_LEN * PARALLEL_CHUNK)
        .enumerate()
        .map(|(chunk, records)| {
            records
                .chunks_exact(stl::RECORD_LEN)
                .enumerate()
                .try_fold(0.0, |acc, (i, record)| -> Result<f64, MalformedInputError> {
                    let triangle = stl::decode_record(record, chunk * PARALLEL_CHUNK + i)?;
                    Ok(acc + triangle.signed_volume())
                })
        })
        .try_reduce(|| 0.0, |a, b| Ok(a + b))
}

/// Convert a signed mm³ total into an unsigned cm³ volume
///
/// The absolute value makes inside-out meshes report the same magnitude.
pub fn to_cm3(signed_mm3: f64) -> f64 {
    signed_mm3.abs() / MM3_PER_CM3
}

/// Volume in cm³ of the mesh stored in a binary STL buffer
pub fn estimate_volume_cm3(data: &[u8]) -> Result<f64, MalformedInputError> {
    let signed = sum_signed_volume(stl::parse_triangles(data)?)?;
    Ok(to_cm3(signed))
}

/// [`estimate_volume_cm3`] with the per-triangle work spread over rayon
#[cfg(feature = "parallel")]
pub fn estimate_volume_cm3_parallel(data: &[u8]) -> Result<f64, MalformedInputError> {
    let buffer = StlBuffer::new(data, HeaderCheck::Strict)?;
    Ok(to_cm3(par_sum_signed_volume(&buffer)?))
}
