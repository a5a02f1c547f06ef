//! Mesh generators shared by the benchmarks.

use cgmath::Point3;
use surfio::{
    io::PrimitiveType,
    mesh::{Attribute, DataArray, PolyMesh},
};


/// A triangulated `n x n` height field with a scalar and a normal array, so
/// that every codec has something to write besides the geometry.
pub fn height_field(n: u32) -> PolyMesh {
    let points = (0..n * n)
        .map(|i| {
            let (x, y) = ((i % n) as f64, (i / n) as f64);
            Point3::new(x, y, (x * 0.3).sin() * (y * 0.2).cos())
        })
        .collect::<Vec<_>>();

    let mut triangles = Vec::with_capacity(2 * (n as usize - 1).pow(2));
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let i = y * n + x;
            triangles.push([i, i + 1, i + n]);
            triangles.push([i + 1, i + n + 1, i + n]);
        }
    }

    let num_points = points.len();
    let heights = points.iter().map(|p| p.z).collect();
    let mut mesh = PolyMesh::from_triangles(points, &triangles);

    let pd = &mut mesh.point_data;
    let scalars = pd.add_array(DataArray::from_values("height", PrimitiveType::Float32, 1, heights));
    pd.set_active(Attribute::Scalars, scalars);
    let normals = pd.add_array(DataArray::from_values(
        "Normals",
        PrimitiveType::Float32,
        3,
        (0..num_points).flat_map(|_| vec![0.0, 0.0, 1.0]).collect(),
    ));
    pd.set_active(Attribute::Normals, normals);

    mesh
}
