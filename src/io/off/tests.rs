use cgmath::Point3;
use failure::Error;

use crate::{
    io::{ErrorKind, MeshWriter},
    mesh::PolyMesh,
};
use super::{Config, Reader};


fn tetrahedron() -> PolyMesh {
    let mut mesh = PolyMesh::from_triangles(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.5),
        ],
        &[[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
    );
    mesh.verts.push(&[3]);
    mesh.lines.push(&[0, 1]);
    mesh
}

fn cells(mesh: &PolyMesh) -> Vec<Vec<u32>> {
    mesh.cells().map(|(_, c)| c.to_vec()).collect()
}


// ===========================================================================
// ===== Reading
// ===========================================================================

#[test]
fn read_tetra() -> Result<(), Error> {
    let mesh = Reader::new(include_test_file!("tetra.off")).read()?;

    assert_eq!(mesh.points, tetrahedron().points);
    assert_eq!(cells(&mesh), cells(&tetrahedron()));

    Ok(())
}

#[test]
fn read_mixed_cells() -> Result<(), Error> {
    let mesh = Reader::new(include_test_file!("mixed.off")).read()?;

    assert_eq!(mesh.num_points(), 5);
    assert_eq!(mesh.points[4], Point3::new(0.25, 0.5, 10.0));

    // The empty face is consumed but produces no cell.
    assert_eq!(mesh.num_cells(), 4);
    assert_eq!(mesh.verts.get(0), Some(&[4][..]));
    assert_eq!(mesh.lines.get(0), Some(&[0, 4][..]));
    assert_eq!(mesh.polys.get(0), Some(&[0, 1, 2, 3][..]));
    assert_eq!(mesh.polys.get(1), Some(&[1, 2, 4][..]));

    Ok(())
}

#[test]
fn read_negative_counts() -> Result<(), Error> {
    let mesh = Reader::new(&b"OFF -3 -1 0"[..]).read()?;
    assert!(mesh.is_empty());
    assert_eq!(mesh.num_cells(), 0);

    Ok(())
}

#[test]
fn reject_missing_header() {
    let res = Reader::new(&b"3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n"[..]).read();
    assert!(res.is_err());

    // Only these two spellings are accepted.
    let res = Reader::new(&b"Off 0 0 0"[..]).read();
    assert!(res.is_err());
}

#[test]
fn reject_truncated() {
    let res = Reader::new(include_test_file!("truncated.off")).read();
    match res.unwrap_err().kind() {
        ErrorKind::Parse(_) => {}
        other => panic!("unexpected error: {:?}", other),
    }

    // EOF in the middle of the vertex list.
    let res = Reader::new(&b"OFF\n2 0 0\n1 2 3\n4 5"[..]).read();
    assert!(res.is_err());
}

#[test]
fn reject_non_finite_coordinates() {
    for doc in &["OFF 1 0 0  inf 0 0", "OFF 1 0 0  0 nan 0", "OFF 1 0 0  0 0 -Infinity"] {
        match Reader::new(doc.as_bytes()).read().unwrap_err().kind() {
            ErrorKind::Parse(_) => {}
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

#[test]
fn reject_invalid_index() {
    let res = Reader::new(&b"OFF 1 1 0  0 0 0  2 0 1"[..]).read();
    match res.unwrap_err().kind() {
        ErrorKind::IndexOutOfRange { index: 1, len: 1, .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }
}


// ===========================================================================
// ===== Writing
// ===========================================================================

#[test]
fn write_tetra() -> Result<(), Error> {
    let res = Config::new().write_to_memory(&tetrahedron())?;
    assert_eq_file!(&res, "tetra.off");

    Ok(())
}

#[test]
fn write_precision() -> Result<(), Error> {
    let mesh = PolyMesh::from_points(vec![Point3::new(1.0 / 3.0, 1e-7, 123456.0)]);

    let res = Config::new().with_precision(4).write_to_memory(&mesh)?;
    assert_eq!(std::str::from_utf8(&res)?, "OFF\n1 0 0\n0.3333 1e-07 1.235e+05\n");

    Ok(())
}

#[test]
fn strips_are_written_as_plain_cells() -> Result<(), Error> {
    let mut mesh = tetrahedron();
    mesh.strips.push(&[0, 1, 2, 3]);

    let res = Config::new().write_to_memory(&mesh)?;
    let text = std::str::from_utf8(&res)?;
    assert!(text.starts_with("OFF\n4 7 0\n"));
    assert!(text.ends_with("3 0 3 2\n4 0 1 2 3\n"));

    // Reading it back turns the strip into a polygon.
    let back = Reader::new(&res[..]).read()?;
    assert_eq!(back.polys.len(), 5);
    assert!(back.strips.is_empty());

    Ok(())
}

#[test]
fn round_trip() -> Result<(), Error> {
    let mut mesh = tetrahedron();
    mesh.points[1] = Point3::new(0.1, -2.75, 1.0 / 7.0);

    let data = Config::new().write_to_memory(&mesh)?;
    let back = Reader::new(&data[..]).read()?;

    assert_eq!(cells(&back), cells(&mesh));
    let flat = |m: &PolyMesh| m.points.iter().flat_map(|p| vec![p.x, p.y, p.z]).collect::<Vec<_>>();
    assert_approx_eq!(flat(&back), flat(&mesh), 1e-11);

    Ok(())
}
