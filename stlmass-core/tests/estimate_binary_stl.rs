use nalgebra::{Point3, Vector3};
use stlmass_core::{
    estimate, estimate_volume_cm3, estimate_weight_g, parse_triangles, store, EstimatorConfig,
    MalformedInputError, MemoryStore, Mesh, Triangle,
};

fn binary_stl(triangles: &[Triangle]) -> Vec<u8> {
    let mut data = b"binary STL written by the estimate_binary_stl test".to_vec();
    data.resize(80, b' ');
    data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for triangle in triangles {
        let floats = triangle
            .normal
            .iter()
            .chain(triangle.vertices.iter().flat_map(|v| v.coords.iter()));
        for value in floats {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&0u16.to_le_bytes());
    }
    data
}

/// Regular octahedron with vertices at distance `r` from `center`: volume 4r³/3
fn octahedron(r: f32, center: Point3<f32>) -> Mesh {
    let px = center + Vector3::new(r, 0.0, 0.0);
    let nx = center + Vector3::new(-r, 0.0, 0.0);
    let py = center + Vector3::new(0.0, r, 0.0);
    let ny = center + Vector3::new(0.0, -r, 0.0);
    let pz = center + Vector3::new(0.0, 0.0, r);
    let nz = center + Vector3::new(0.0, 0.0, -r);

    let mut mesh = Mesh::new();
    for (a, b, c) in [
        (px, py, pz),
        (py, nx, pz),
        (nx, ny, pz),
        (ny, px, pz),
        (py, px, nz),
        (nx, py, nz),
        (ny, nx, nz),
        (px, ny, nz),
    ] {
        mesh.add_triangle(Triangle::new(a, b, c));
    }
    mesh
}

#[test]
fn cube_volume_scales_with_side_anywhere_in_space() {
    for (side, center) in [
        (10.0, Point3::origin()),
        (20.0, Point3::new(15.0, 15.0, 15.0)),
        (7.5, Point3::new(-250.0, 40.0, 1200.0)),
        (100.0, Point3::new(0.0, 0.0, 50.0)),
    ] {
        let data = binary_stl(&Mesh::cube_at(side, center).triangles);
        let expected = (f64::from(side) / 10.0).powi(3);
        let volume = estimate_volume_cm3(&data).unwrap();
        assert!(
            (volume - expected).abs() < 1e-6 * expected.max(1.0),
            "side {side}: got {volume}, expected {expected}"
        );
    }
}

#[test]
fn ten_mm_cube_weighs_pla_density() {
    let data = binary_stl(&Mesh::cube(10.0).triangles);
    let estimate = estimate(&data, &EstimatorConfig::default()).unwrap();
    assert!((estimate.volume_cm3 - 1.00).abs() < 0.01);
    assert!((estimate.weight_g - 1.24).abs() < 0.01);
}

#[test]
fn winding_reversal_and_translation_do_not_change_volume() {
    let mesh = octahedron(12.0, Point3::new(3.0, -8.0, 40.0));
    let expected = 4.0 * 12.0f64.powi(3) / 3.0 / 1000.0;

    let base = estimate_volume_cm3(&binary_stl(&mesh.triangles)).unwrap();
    let reversed = estimate_volume_cm3(&binary_stl(&mesh.reversed().triangles)).unwrap();
    let moved = mesh.translated(&Vector3::new(-500.0, 250.0, 75.0));
    let translated = estimate_volume_cm3(&binary_stl(&moved.triangles)).unwrap();

    assert!((base - expected).abs() < 1e-6);
    assert!((reversed - base).abs() < 1e-9);
    assert!((translated - base).abs() < 1e-6);
}

#[test]
fn header_only_buffer_is_empty_mesh() {
    let data = binary_stl(&[]);
    assert_eq!(data.len(), 84);

    let estimate = estimate(&data, &EstimatorConfig::default()).unwrap();
    assert_eq!(estimate.volume_cm3, 0.0);
    assert_eq!(estimate.weight_g, 0.0);
}

#[test]
fn one_byte_short_is_rejected() {
    let data = binary_stl(&Mesh::cube(10.0).triangles);
    let short = &data[..data.len() - 1];

    let err = estimate_volume_cm3(short).unwrap_err();
    assert!(matches!(
        err,
        MalformedInputError::LengthMismatch { actual, .. } if actual == short.len()
    ));
    assert!(parse_triangles(short).is_err());
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut data = binary_stl(&Mesh::cube(10.0).triangles);
    data.extend_from_slice(b"\n\n");
    assert_eq!(
        estimate_volume_cm3(&data).unwrap_err(),
        MalformedInputError::LengthMismatch {
            expected: data.len() - 2,
            actual: data.len(),
        }
    );
}

#[test]
fn weight_is_volume_times_density() {
    for volume in [0.0, 0.5, 1.0, 33.3, 1234.5678] {
        for density in [0.0, 1.04, 1.24, 1.27, 7.85] {
            assert_eq!(estimate_weight_g(volume, density), volume * density);
        }
    }
}

#[test]
fn estimate_survives_store_round_trip() {
    let data = binary_stl(&octahedron(5.0, Point3::origin()).triangles);
    let config = EstimatorConfig::default().with_density(1.27).unwrap();
    let estimate = estimate(&data, &config).unwrap();

    let cache = MemoryStore::new();
    store::persist_estimate(&cache, &estimate);
    assert_eq!(
        store::read_estimate(&cache),
        Some((estimate.volume_cm3, estimate.weight_g))
    );
}
