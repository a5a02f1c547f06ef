use cgmath::Point3;
use failure::Error;

use crate::{
    io::{ErrorKind, MeshWriter, PrimitiveType},
    mesh::{Attribute, DataArray, MetaData, MetaKey, PolyMesh},
};
use super::{
    convert, meta, Config, CoordSystem, Encoding, FileType, GiftiDataArray, GiftiImage, IndexOrder, Intent,
    NumericData, Reader,
};


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

    let pd = &mut mesh.point_data;
    let thickness = pd.add_array(DataArray::from_values(
        "thickness",
        PrimitiveType::Float32,
        1,
        vec![2.5, 3.0, 1.25, 4.0],
    ));
    pd.set_active(Attribute::Scalars, thickness);
    pd.add_array(DataArray::from_values(
        "labels",
        PrimitiveType::Int16,
        2,
        vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0, 4.0, -4.0],
    ));

    mesh
}

fn triangles(mesh: &PolyMesh) -> Vec<Vec<u32>> {
    mesh.polys.iter().map(|c| c.to_vec()).collect()
}

fn surface(n: usize) -> PolyMesh {
    PolyMesh::from_points((0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect())
}

fn image(arrays: Vec<GiftiDataArray>) -> GiftiImage {
    GiftiImage {
        data_arrays: arrays,
        .. GiftiImage::new()
    }
}

fn coords(dims: Vec<usize>, values: Vec<f32>) -> GiftiDataArray {
    GiftiDataArray::new(Intent::POINTSET, dims, NumericData::Float32(values))
}

fn read_back(config: &Config, mesh: &PolyMesh) -> Result<PolyMesh, Error> {
    let data = config.write_to_memory(mesh)?;
    Ok(Reader::new(&data[..]).read()?)
}


// ===========================================================================
// ===== Reading
// ===========================================================================

#[test]
fn read_ascii_surface() -> Result<(), Error> {
    let mesh = Reader::new(include_test_file!("tetra.surf.gii")).read()?;
    let expected = tetrahedron();

    assert_eq!(mesh.points, expected.points);
    assert_eq!(triangles(&mesh), triangles(&expected));

    assert_eq!(mesh.point_data.len(), 1);
    let scalars = mesh.point_data.active(Attribute::Scalars).unwrap();
    assert_eq!(scalars.name(), "thickness");
    assert_eq!(scalars.ty(), PrimitiveType::Float32);
    assert_eq!(scalars.values(), &[2.5, 3.0, 1.25, 4.0]);

    let info = &mesh.info;
    assert_eq!(info.get_str(MetaKey::SubjectId), Some("sub-01"));
    assert_eq!(info.get_double(MetaKey::TimeStep), Some(0.5));
    assert_eq!(info.get_str(MetaKey::AnatomicalStructurePrimary), Some("CortexLeft"));
    assert_eq!(info.get_str(MetaKey::GeometricType), Some("Anatomical"));
    assert_eq!(info.get_str(MetaKey::DataSpace), Some("NIFTI_XFORM_TALAIRACH"));
    assert_eq!(info.get_str(MetaKey::TopologicalType), Some("Closed"));

    // `ScannerVendor` is not a known key.
    assert_eq!(info.len(), 6);

    Ok(())
}

#[test]
fn read_image_keeps_everything() -> Result<(), Error> {
    let image = Reader::new(include_test_file!("tetra.surf.gii")).read_image()?;

    assert_eq!(image.version, "1.0");
    assert_eq!(image.meta.len(), 3);
    assert_eq!(image.meta[1], ("ScannerVendor".to_string(), "ACME".to_string()));
    assert_eq!(image.data_arrays.len(), 3);

    let points = &image.data_arrays[0];
    assert_eq!(points.intent, Intent::POINTSET);
    assert_eq!(points.encoding, Encoding::Ascii);
    assert_eq!(points.dims, vec![4, 3]);
    assert_eq!(points.coord_systems.len(), 1);
    assert_eq!(points.coord_systems[0].matrix[3], [0.0, 0.0, 0.0, 1.0]);

    Ok(())
}

#[test]
fn read_base64() -> Result<(), Error> {
    let mesh = Reader::new(include_test_file!("triangle.gii")).read()?;

    assert_eq!(mesh.points[1], Point3::new(2.0, 0.0, 0.0));
    assert_eq!(triangles(&mesh), vec![vec![0, 1, 2]]);

    // Without a `Name`, the array is named after its intent code.
    let labels = mesh.point_data.array_by_name("1002").unwrap();
    assert_eq!(labels.ty(), PrimitiveType::Uint8);
    assert_eq!(labels.values(), &[7.0, 0.0, 255.0]);

    // Without a data space in the file, it is unknown.
    assert_eq!(mesh.info.get_str(MetaKey::DataSpace), Some("NIFTI_XFORM_UNKNOWN"));

    Ok(())
}

#[cfg(feature = "gzip")]
#[test]
fn read_sparse_data_on_surface() -> Result<(), Error> {
    let surface = surface(4);
    let mesh = Reader::new(include_test_file!("sparse.func.gii"))
        .read_with_surface(Some(&surface))?;

    assert_eq!(mesh.points, surface.points);
    assert!(mesh.polys.is_empty());

    let flow = mesh.point_data.array_by_name("flow").unwrap();
    assert_eq!(flow.ty(), PrimitiveType::Float64);
    assert_eq!(flow.num_components(), 2);
    assert_eq!(flow.values(), &[0.0, 0.0, 30.0, 40.0, 0.0, 0.0, 10.0, 20.0]);

    // Only three component vectors become the active vectors.
    assert!(mesh.point_data.active(Attribute::Vectors).is_none());

    Ok(())
}

#[test]
fn column_major_coordinates() -> Result<(), Error> {
    let mut array = coords(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    array.order = IndexOrder::ColumnMajor;

    let points = convert::coordinates(&image(vec![array]), None)?.unwrap();
    assert_eq!(points, vec![Point3::new(1.0, 3.0, 5.0), Point3::new(2.0, 4.0, 6.0)]);

    Ok(())
}

#[test]
fn data_space_needs_agreeing_coord_systems() -> Result<(), Error> {
    let mut array = coords(vec![1, 3], vec![0.0; 3]);
    array.coord_systems.push(CoordSystem::identity("NIFTI_XFORM_TALAIRACH"));
    array.coord_systems.push(CoordSystem::identity("NIFTI_XFORM_MNI_152"));

    let mut info = MetaData::new();
    convert::coordinates(&image(vec![array.clone()]), Some(&mut info))?;
    assert_eq!(info.get_str(MetaKey::DataSpace), Some("NIFTI_XFORM_UNKNOWN"));

    array.coord_systems[1].data_space = "NIFTI_XFORM_TALAIRACH".into();
    convert::coordinates(&image(vec![array]), Some(&mut info))?;
    assert_eq!(info.get_str(MetaKey::DataSpace), Some("NIFTI_XFORM_TALAIRACH"));

    Ok(())
}

#[test]
fn scatter_sparse_values() -> Result<(), Error> {
    let img = image(vec![
        GiftiDataArray::new(Intent::NODE_INDEX, vec![2], NumericData::Int32(vec![2, 0])),
        GiftiDataArray::new(Intent::SHAPE, vec![2], NumericData::Float32(vec![9.0, 5.0])),
    ]);

    let mesh = convert::mesh_from_image(&img, Some(&surface(3)))?;
    let scalars = mesh.point_data.active(Attribute::Scalars).unwrap();
    assert_eq!(scalars.values(), &[5.0, 0.0, 9.0]);

    Ok(())
}

#[test]
fn missing_points() -> Result<(), Error> {
    let img = image(vec![
        GiftiDataArray::new(Intent::SHAPE, vec![3], NumericData::Float32(vec![1.0, 2.0, 3.0])),
    ]);

    match convert::mesh_from_image(&img, None).unwrap_err().kind() {
        ErrorKind::MissingPoints => {}
        other => panic!("unexpected error: {:?}", other),
    }

    // An empty surface doesn't help either.
    assert!(convert::mesh_from_image(&img, Some(&PolyMesh::new())).is_err());

    let mesh = convert::mesh_from_image(&img, Some(&surface(3)))?;
    assert_eq!(mesh.point_data.array(0).unwrap().values(), &[1.0, 2.0, 3.0]);

    Ok(())
}


// ===========================================================================
// ===== Rejected input
// ===========================================================================

fn assert_invalid_array(img: GiftiImage, intent: Intent) {
    match convert::mesh_from_image(&img, Some(&surface(3))).unwrap_err().kind() {
        ErrorKind::InvalidGiftiArray { intent: i, .. } if *i == intent => {}
        other => panic!("unexpected error: {:?}", other),
    }
}

fn invalid_coordinates() -> Vec<GiftiDataArray> {
    vec![
        // Wrong type.
        GiftiDataArray::new(Intent::POINTSET, vec![1, 3], NumericData::Float64(vec![0.0; 3])),
        // Wrong shapes.
        coords(vec![3, 2], vec![0.0; 6]),
        coords(vec![3], vec![0.0; 3]),
        coords(vec![1, 3, 1], vec![0.0; 3]),
    ]
}

#[test]
fn reject_invalid_coordinates() {
    for array in invalid_coordinates() {
        match convert::mesh_from_image(&image(vec![array]), None).unwrap_err().kind() {
            ErrorKind::InvalidGiftiArray { intent: Intent::POINTSET, .. } => {}
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

#[test]
fn invalid_coordinates_fall_back_to_surface() -> Result<(), Error> {
    let surface = surface(3);
    for array in invalid_coordinates() {
        let img = image(vec![
            array,
            GiftiDataArray::new(Intent::TRIANGLE, vec![1, 3], NumericData::Int32(vec![0, 1, 2])),
        ]);
        let mesh = convert::mesh_from_image(&img, Some(&surface))?;
        assert_eq!(mesh.points, surface.points);
        assert_eq!(triangles(&mesh), vec![vec![0, 1, 2]]);
    }

    Ok(())
}

#[test]
fn reject_invalid_triangles() {
    let points = || coords(vec![3, 3], vec![0.0; 9]);

    assert_invalid_array(
        image(vec![
            points(),
            GiftiDataArray::new(Intent::TRIANGLE, vec![1, 3], NumericData::Int64(vec![0, 1, 2])),
        ]),
        Intent::TRIANGLE,
    );
    assert_invalid_array(
        image(vec![
            points(),
            GiftiDataArray::new(Intent::TRIANGLE, vec![1, 4], NumericData::Int32(vec![0; 4])),
        ]),
        Intent::TRIANGLE,
    );

    let img = image(vec![
        points(),
        GiftiDataArray::new(Intent::TRIANGLE, vec![1, 3], NumericData::Int32(vec![0, 1, 3])),
    ]);
    match convert::mesh_from_image(&img, None).unwrap_err().kind() {
        ErrorKind::IndexOutOfRange { index: 3, len: 3, .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn reject_invalid_node_indices() {
    let data = || GiftiDataArray::new(Intent::SHAPE, vec![2], NumericData::Float32(vec![1.0, 2.0]));

    // Index equal to the number of points.
    let img = image(vec![
        GiftiDataArray::new(Intent::NODE_INDEX, vec![2], NumericData::Int32(vec![0, 3])),
        data(),
    ]);
    match convert::mesh_from_image(&img, Some(&surface(3))).unwrap_err().kind() {
        ErrorKind::IndexOutOfRange { index: 3, len: 3, .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }

    // Two dimensional index array.
    assert_invalid_array(
        image(vec![
            GiftiDataArray::new(Intent::NODE_INDEX, vec![1, 2], NumericData::Int32(vec![0, 1])),
            data(),
        ]),
        Intent::NODE_INDEX,
    );

    // More indices than points.
    let img = image(vec![
        GiftiDataArray::new(Intent::NODE_INDEX, vec![4], NumericData::Int32(vec![0, 1, 2, 0])),
    ]);
    assert!(convert::mesh_from_image(&img, Some(&surface(3))).is_err());

    // Data rows don't match the number of indices.
    let img = image(vec![
        GiftiDataArray::new(Intent::NODE_INDEX, vec![1], NumericData::Int32(vec![2])),
        data(),
    ]);
    match convert::mesh_from_image(&img, Some(&surface(3))).unwrap_err().kind() {
        ErrorKind::SizeMismatch { expected: 1, actual: 2, .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn reject_malformed_documents() {
    let read = |s: &str| Reader::new(s.as_bytes()).read_image();

    assert!(read("").is_err());
    assert!(read("<NotGifti/>").is_err());
    assert!(read("<GIFTI><DataArray").is_err());

    // Fewer values than the dimensions promise.
    let doc = r#"<GIFTI><DataArray Intent="NIFTI_INTENT_SHAPE" DataType="NIFTI_TYPE_FLOAT32"
        Dimensionality="1" Dim0="3" Encoding="ASCII"><Data>1 2</Data></DataArray></GIFTI>"#;
    match read(doc).unwrap_err().kind() {
        ErrorKind::SizeMismatch { expected: 3, actual: 2, .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }

    // Dimensions whose product overflows.
    let doc = r#"<GIFTI><DataArray Intent="NIFTI_INTENT_POINTSET" DataType="NIFTI_TYPE_FLOAT32"
        Dimensionality="2" Dim0="6148914691236517206" Dim1="3" Encoding="ASCII">
        <Data>1 2</Data></DataArray></GIFTI>"#;
    match read(doc).unwrap_err().kind() {
        ErrorKind::Malformed { .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(Reader::new(doc.as_bytes()).read().is_err());

    // Unknown data type.
    let doc = r#"<GIFTI><DataArray DataType="NIFTI_TYPE_COMPLEX64"
        Dimensionality="1" Dim0="1" Encoding="ASCII"><Data>1</Data></DataArray></GIFTI>"#;
    match read(doc).unwrap_err().kind() {
        ErrorKind::UnknownDataType(name) => assert_eq!(name, "NIFTI_TYPE_COMPLEX64"),
        other => panic!("unexpected error: {:?}", other),
    }

    // External files are not supported.
    let doc = r#"<GIFTI><DataArray DataType="NIFTI_TYPE_FLOAT32" Dimensionality="1" Dim0="1"
        Encoding="ExternalFileBinary"><Data></Data></DataArray></GIFTI>"#;
    match read(doc).unwrap_err().kind() {
        ErrorKind::UnsupportedEncoding(_) => {}
        other => panic!("unexpected error: {:?}", other),
    }
}


// ===========================================================================
// ===== Writing
// ===========================================================================

#[test]
fn round_trip_all_encodings() -> Result<(), Error> {
    let mesh = tetrahedron();

    for config in &[Config::ascii(), Config::base64(), Config::gzip_base64()] {
        let back = read_back(config, &mesh)?;

        assert_eq!(back.points, mesh.points);
        assert_eq!(triangles(&back), triangles(&mesh));
        assert_eq!(back.point_data.len(), 2);

        let scalars = back.point_data.active(Attribute::Scalars).unwrap();
        assert_eq!(scalars.name(), "thickness");
        assert_eq!(scalars.values(), mesh.point_data.array(0).unwrap().values());

        let labels = back.point_data.array_by_name("labels").unwrap();
        assert_eq!(labels.ty(), PrimitiveType::Int16);
        assert_eq!(labels.num_components(), 2);
        assert_eq!(labels.values(), mesh.point_data.array(1).unwrap().values());
    }

    Ok(())
}

#[test]
fn written_document_structure() -> Result<(), Error> {
    let data = Config::base64().write_to_memory(&tetrahedron())?;
    let text = String::from_utf8(data.clone())?;
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE GIFTI"));
    assert!(text.contains("xsi:noNamespaceSchemaLocation="));

    let image = Reader::new(&data[..]).read_image()?;
    let intents = image.data_arrays.iter().map(|a| a.intent).collect::<Vec<_>>();
    assert_eq!(intents, vec![Intent::POINTSET, Intent::TRIANGLE, Intent::SHAPE, Intent::NONE]);
    assert!(image.data_arrays.iter().all(|a| a.encoding == Encoding::Base64Binary));

    assert_eq!(image.data_arrays[0].dims, vec![4, 3]);
    assert_eq!(image.data_arrays[2].dims, vec![4]);
    assert_eq!(image.data_arrays[3].dims, vec![4, 2]);
    assert_eq!(image.data_arrays[0].coord_systems[0].data_space, "NIFTI_XFORM_UNKNOWN");

    // Date and user name are always stamped.
    let names = image.meta.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>();
    assert!(names.contains(&"Date"));
    assert!(names.contains(&"UserName"));

    Ok(())
}

#[test]
fn file_type_selects_arrays() -> Result<(), Error> {
    let mesh = tetrahedron();
    let intents = |ty| -> Result<Vec<Intent>, Error> {
        let data = Config::ascii().with_file_type(Some(ty)).write_to_memory(&mesh)?;
        let image = Reader::new(&data[..]).read_image()?;
        Ok(image.data_arrays.iter().map(|a| a.intent).collect())
    };

    assert_eq!(intents(FileType::Coord)?, vec![Intent::POINTSET]);
    assert_eq!(intents(FileType::Topo)?, vec![Intent::TRIANGLE]);
    assert_eq!(intents(FileType::Surf)?, vec![Intent::POINTSET, Intent::TRIANGLE]);
    assert_eq!(intents(FileType::Shape)?, vec![Intent::SHAPE, Intent::NONE]);

    for &ty in &[FileType::Label, FileType::Time] {
        match Config::ascii().with_file_type(Some(ty)).write_to_memory(&mesh).unwrap_err().kind() {
            ErrorKind::UnsupportedGiftiType(name) => assert_eq!(name, ty.name()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    Ok(())
}

#[test]
fn reject_non_triangles() {
    let mut mesh = tetrahedron();
    mesh.polys.push(&[0, 1, 2, 3]);

    match Config::ascii().write_to_memory(&mesh).unwrap_err().kind() {
        ErrorKind::NonTriangularFace { cell: 4, len: 4, .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }

    let mut mesh = tetrahedron();
    mesh.polys.push(&[0, 1, u32::max_value()]);
    match Config::ascii().write_to_memory(&mesh).unwrap_err().kind() {
        ErrorKind::IndexOutOfRange { .. } => {}
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn other_cells_are_dropped() -> Result<(), Error> {
    let mut mesh = tetrahedron();
    mesh.verts.push(&[0]);
    mesh.lines.push(&[0, 1]);
    mesh.strips.push(&[0, 1, 2, 3]);

    let read = read_back(&Config::ascii(), &mesh)?;
    assert_eq!(triangles(&read), triangles(&tetrahedron()));
    assert_eq!(read.num_cells(), read.polys.len());

    Ok(())
}

#[test]
fn metadata_round_trip() -> Result<(), Error> {
    let mut mesh = tetrahedron();
    let info = &mut mesh.info;
    info.set(MetaKey::Description, "white matter surface");
    info.set(MetaKey::SubjectId, "sub-07");
    info.set(MetaKey::UniqueId, "42");
    info.set(MetaKey::TimeStep, 0.5);
    info.set(MetaKey::SurfaceId, "lh.white");
    info.set(MetaKey::DataSpace, "NIFTI_XFORM_MNI_152");
    info.set(MetaKey::AnatomicalStructurePrimary, "CortexLeft");
    info.set(MetaKey::AnatomicalStructureSecondary, "GrayWhite");
    info.set(MetaKey::GeometricType, "Anatomical");
    info.set(MetaKey::TopologicalType, "Closed");
    info.set(MetaKey::Date, "yesterday");

    let array_info = mesh.point_data.array_mut(1).unwrap().info_mut();
    array_info.set(MetaKey::IntentCode, 3i64);
    array_info.set(MetaKey::IntentP1, 12.5);
    array_info.set(MetaKey::Description, "t statistic");

    let back = read_back(&Config::ascii(), &mesh)?;

    for (key, value) in mesh.info.iter().filter(|(k, _)| *k != MetaKey::Date) {
        assert_eq!(back.info.get(key), Some(value), "key {}", key);
    }
    assert_ne!(back.info.get_str(MetaKey::Date), Some("yesterday"));
    assert!(back.info.contains(MetaKey::UserName));

    let array = back.point_data.array_by_name("labels").unwrap();
    assert_eq!(array.info().get_integer(MetaKey::IntentCode), Some(3));
    assert_eq!(array.info().get_double(MetaKey::IntentP1), Some(12.5));
    assert_eq!(array.info().get_str(MetaKey::Description), Some("t statistic"));
    assert_eq!(array.info().get_str(MetaKey::Name), Some("labels"));

    Ok(())
}

#[test]
fn structural_intent_codes_are_not_reused() -> Result<(), Error> {
    let mut mesh = tetrahedron();
    mesh.point_data.array_mut(1).unwrap().info_mut().set(MetaKey::IntentCode, 1008i64);

    let data = Config::ascii().write_to_memory(&mesh)?;
    let image = Reader::new(&data[..]).read_image()?;
    assert_eq!(image.data_arrays[3].intent, Intent::NONE);

    Ok(())
}


// ===========================================================================
// ===== Enumerations
// ===========================================================================

#[test]
fn file_type_from_path() {
    assert_eq!(FileType::from_path("lh.white.surf.gii"), Some(FileType::Surf));
    assert_eq!(FileType::from_path("/data/sub/lh.thickness.shape.gii"), Some(FileType::Shape));
    assert_eq!(FileType::from_path("mesh.gii"), None);
    assert_eq!(FileType::from_path("lh.white.gii"), None);
    assert_eq!(FileType::from_path("lh.surf.vtk"), None);
}

#[test]
fn intent_names() {
    assert_eq!(Intent::SHAPE.to_string(), "NIFTI_INTENT_SHAPE");
    assert_eq!(Intent::from_name("NIFTI_INTENT_LOG10PVAL"), Some(Intent::LOG10PVAL));
    assert_eq!(Intent::from_name("2002"), Some(Intent::NODE_INDEX));
    assert_eq!(Intent::from_name("NIFTI_INTENT_BOGUS"), None);
    assert_eq!(Intent(77).to_string(), "77");

    assert!(Intent::TTEST.is_statistic());
    assert!(!Intent::ESTIMATE.is_statistic());
}

#[test]
fn metadata_key_sets() {
    assert_eq!(meta::keys_for_file().len(), 6);
    assert_eq!(meta::keys_for_data_array(None).len(), 13);
    assert_eq!(meta::keys_for_data_array(Some(Intent::POINTSET)).len(), 8);
    assert_eq!(meta::keys_for_data_array(Some(Intent::TRIANGLE)).len(), 6);
    assert_eq!(meta::keys_for_data_array(Some(Intent::CHISQ)).len(), 9);
    assert_eq!(meta::keys_for_data_array(Some(Intent::SHAPE)).len(), 5);
}
