use byteorder::{ByteOrder, LittleEndian};
use cgmath::Point3;
use failure::Error;

use crate::{
    io::{ErrorKind, MeshWriter, PrimitiveType},
    mesh::{Attribute, DataArray, PolyMesh},
};
use super::{Config, Reader, HEADER_SIZE};


fn pyramid() -> PolyMesh {
    PolyMesh::from_triangles(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 0.5, 0.75),
        ],
        &[[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4], [0, 2, 1], [0, 3, 2]],
    )
}

fn with_all_attributes(mut mesh: PolyMesh) -> PolyMesh {
    let n = mesh.num_points();
    let ramp = |comps: usize, scale: f64| {
        (0..n * comps).map(|i| i as f64 * scale).collect::<Vec<_>>()
    };

    let pd = &mut mesh.point_data;
    let normals = pd.add_array(DataArray::from_values("N", PrimitiveType::Float64, 3, ramp(3, 0.5)));
    pd.set_active(Attribute::Normals, normals);
    pd.add_array(DataArray::from_values("Colors", PrimitiveType::Float32, 3, ramp(3, 0.125)));
    let uv = pd.add_array(DataArray::from_values("tex", PrimitiveType::Float32, 2, ramp(2, 0.25)));
    pd.set_active(Attribute::TCoords, uv);
    pd.add_array(DataArray::from_values("Labels", PrimitiveType::Int32, 1, ramp(1, 3.0)));
    let scalars = pd.add_array(DataArray::from_values("thickness", PrimitiveType::Float64, 1, ramp(1, 1.5)));
    pd.set_active(Attribute::Scalars, scalars);

    mesh
}

fn triangles(mesh: &PolyMesh) -> Vec<Vec<u32>> {
    mesh.polys.iter().map(|c| c.to_vec()).collect()
}


#[test]
fn header_layout() -> Result<(), Error> {
    let mesh = pyramid();
    let data = Config::little_endian().write_to_memory(&mesh)?;

    assert_eq!(&data[..12], b"DFS_LE v2.0\0");
    assert_eq!(LittleEndian::read_i32(&data[12..]), HEADER_SIZE as i32);
    assert_eq!(LittleEndian::read_i32(&data[24..]), 6);
    assert_eq!(LittleEndian::read_i32(&data[28..]), 5);

    // No optional sections: all offsets are zero.
    for field in 7..12 {
        assert_eq!(LittleEndian::read_i32(&data[12 + field * 4..]), 0);
    }
    assert_eq!(data.len(), HEADER_SIZE + 6 * 12 + 5 * 12);

    // The first triangle directly follows the header.
    assert_eq!(LittleEndian::read_i32(&data[HEADER_SIZE + 8..]), 4);

    Ok(())
}

#[test]
fn round_trip_geometry_only() -> Result<(), Error> {
    let mesh = pyramid();
    let data = Config::little_endian().write_to_memory(&mesh)?;
    let back = Reader::new(&data[..]).read()?;

    assert_eq!(back.points, mesh.points);
    assert_eq!(triangles(&back), triangles(&mesh));

    // Absent sections are not zero filled.
    assert!(back.point_data.is_empty());

    Ok(())
}

#[test]
fn round_trip_attributes() -> Result<(), Error> {
    let mesh = with_all_attributes(pyramid());

    for config in &[Config::little_endian(), Config::big_endian()] {
        let data = config.write_to_memory(&mesh)?;
        assert_eq!(data.len(), HEADER_SIZE + 6 * 12 + 5 * (12 + 12 + 12 + 8 + 2 + 4));

        let back = Reader::new(&data[..]).read()?;
        assert_eq!(triangles(&back), triangles(&mesh));

        let pd = &back.point_data;
        let names = pd.arrays().iter().map(|a| a.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Normals", "Colors", "UV", "Labels", "Attributes"]);

        let normals = pd.active(Attribute::Normals).unwrap();
        assert_approx_eq!(normals.values(), mesh.point_data.array(0).unwrap().values());

        let colors = pd.array_by_name("Colors").unwrap();
        assert_eq!(colors.ty(), PrimitiveType::Float32);
        assert_approx_eq!(colors.values(), mesh.point_data.array(1).unwrap().values());

        // UV is padded to three components.
        let uv = pd.active(Attribute::TCoords).unwrap();
        assert_eq!(uv.num_components(), 3);
        assert_eq!(uv.tuple(2), &[1.0, 1.25, 0.0]);

        let labels = pd.array_by_name("Labels").unwrap();
        assert_eq!(labels.ty(), PrimitiveType::Uint16);
        assert_eq!(labels.values(), &[0.0, 3.0, 6.0, 9.0, 12.0]);

        let scalars = pd.active(Attribute::Scalars).unwrap();
        assert_eq!(scalars.name(), "Attributes");
        assert_eq!(scalars.values(), &[0.0, 1.5, 3.0, 4.5, 6.0]);
    }

    Ok(())
}

#[test]
fn named_arrays_without_active_attribute() -> Result<(), Error> {
    let mut mesh = pyramid();
    mesh.point_data.add_array(DataArray::zeroed("Attributes", PrimitiveType::Float32, 1, 5));

    let back = Reader::new(&Config::little_endian().write_to_memory(&mesh)?[..]).read()?;
    assert_eq!(back.point_data.len(), 1);
    assert!(back.point_data.active(Attribute::Scalars).is_some());

    Ok(())
}

#[test]
fn skip_arrays_with_wrong_components() -> Result<(), Error> {
    let mut mesh = pyramid();
    mesh.point_data.add_array(DataArray::zeroed("Labels", PrimitiveType::Uint16, 2, 5));
    mesh.point_data.add_array(DataArray::zeroed("Colors", PrimitiveType::Float32, 4, 5));

    let data = Config::little_endian().write_to_memory(&mesh)?;
    assert_eq!(data.len(), HEADER_SIZE + 6 * 12 + 5 * 12);

    Ok(())
}

#[test]
fn reject_non_triangles() {
    let mut mesh = pyramid();
    mesh.lines.push(&[0, 1]);

    match Config::little_endian().write_to_memory(&mesh).unwrap_err().kind() {
        ErrorKind::NonTriangularFace { cell: 0, len: 2, .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }

    let mut mesh = pyramid();
    mesh.polys.push(&[0, 1, 2, 3]);
    assert!(Config::little_endian().write_to_memory(&mesh).is_err());
}

#[test]
fn reject_point_ids_beyond_i32() {
    let mut mesh = pyramid();
    mesh.polys.push(&[0, 1, u32::max_value()]);

    match Config::little_endian().write_to_memory(&mesh).unwrap_err().kind() {
        ErrorKind::IndexOutOfRange { index, .. } => assert_eq!(*index, i64::from(u32::max_value())),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn reject_short_attribute_array() {
    let mut mesh = pyramid();
    mesh.point_data.add_array(DataArray::zeroed("Colors", PrimitiveType::Float32, 3, 4));

    match Config::little_endian().write_to_memory(&mesh).unwrap_err().kind() {
        ErrorKind::SizeMismatch { expected: 5, actual: 4, .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn reject_malformed() -> Result<(), Error> {
    assert!(Reader::new(&b"DFS_"[..]).read().is_err());
    assert!(Reader::new(&[0u8; 200][..]).read().is_err());

    // Truncated vertex list.
    let data = Config::little_endian().write_to_memory(&pyramid())?;
    assert!(Reader::new(&data[..data.len() - 4]).read().is_err());

    // Triangle referencing a vertex that doesn't exist.
    let mut data = data;
    LittleEndian::write_i32(&mut data[HEADER_SIZE..], 5);
    match Reader::new(&data[..]).read().unwrap_err().kind() {
        ErrorKind::IndexOutOfRange { index: 5, len: 5, .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }

    Ok(())
}
