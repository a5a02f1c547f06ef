//! Conversion between [`GiftiImage`] and [`PolyMesh`].

use std::{convert::TryFrom, env};

use cgmath::Point3;

use crate::{
    io::{Error, ErrorKind, FileFormat},
    mesh::{Attribute, CellArray, CellKind, DataArray, MetaData, MetaKey, PointData, PointId, PolyMesh},
};
use super::{
    image::{CoordSystem, GiftiDataArray, GiftiImage, NumericData},
    meta::{keys_for_data_array, keys_for_file, read_pairs, set_pair, write_pairs},
    Config, FileType, IndexOrder, Intent,
};


/// Data space used when nothing else is known.
const UNKNOWN_SPACE: &str = "NIFTI_XFORM_UNKNOWN";

/// Mesh metadata taken over from the coordinate array.
const COORDINATE_KEYS: &[MetaKey] = &[
    MetaKey::SubjectId,
    MetaKey::SurfaceId,
    MetaKey::UniqueId,
    MetaKey::Description,
    MetaKey::DataSpace,
    MetaKey::AnatomicalStructurePrimary,
    MetaKey::AnatomicalStructureSecondary,
    MetaKey::GeometricType,
];

fn invalid(array: &GiftiDataArray, msg: impl Into<String>) -> Error {
    let msg = msg.into();
    Error::new(|| ErrorKind::InvalidGiftiArray {
        intent: array.intent,
        msg,
    })
}

/// Checks that `array` is an `n x 3` array and returns `n`.
fn check_triples(array: &GiftiDataArray, what: &str) -> Result<usize, Error> {
    if array.dims.len() != 2 || array.dims[1] != 3 {
        return Err(invalid(array, format!(
            "{} must have dimensions [n, 3], but have {:?}",
            what,
            array.dims,
        )));
    }

    Ok(array.dims[0])
}

/// Returns value `j` of row `i` of an `n x 3` array.
fn at<T: Copy>(values: &[T], order: IndexOrder, n: usize, i: usize, j: usize) -> T {
    match order {
        IndexOrder::RowMajor => values[i * 3 + j],
        IndexOrder::ColumnMajor => values[j * n + i],
    }
}


// ==========================================================================
// ===== Reading
// ==========================================================================

/// Extracts the points from the first `POINTSET` array. Its metadata is
/// stored into `info`, together with the data space of its coordinate
/// systems (see [`data_space`]).
pub(crate) fn coordinates(
    image: &GiftiImage,
    info: Option<&mut MetaData>,
) -> Result<Option<Vec<Point3<f64>>>, Error> {
    let array = match image.find(Intent::POINTSET) {
        Some(a) => a,
        None => return Ok(None),
    };

    let values = array.data.as_f32()
        .ok_or_else(|| invalid(array, "coordinates must have type NIFTI_TYPE_FLOAT32"))?;
    let n = check_triples(array, "coordinates")?;

    let points = (0..n)
        .map(|i| {
            let c = |j| at(values, array.order, n, i, j) as f64;
            Point3::new(c(0), c(1), c(2))
        })
        .collect();

    if let Some(info) = info {
        read_pairs(&array.meta, info);
        info.set(MetaKey::DataSpace, data_space(array));
    }

    Ok(Some(points))
}

/// The data space shared by all coordinate systems of `array`. Without
/// coordinate systems, or if they disagree, the space is unknown.
fn data_space(array: &GiftiDataArray) -> &str {
    let mut spaces = array.coord_systems.iter().map(|cs| cs.data_space.as_str());
    match spaces.next() {
        Some(first) if !first.is_empty() && spaces.all(|s| s == first) => first,
        _ => UNKNOWN_SPACE,
    }
}

/// Extracts the triangles from the first `TRIANGLE` array. Point IDs are not
/// checked against the number of points here.
pub(crate) fn topology(
    image: &GiftiImage,
    info: Option<&mut MetaData>,
) -> Result<Option<CellArray>, Error> {
    let array = match image.find(Intent::TRIANGLE) {
        Some(a) => a,
        None => return Ok(None),
    };

    let values = array.data.as_i32()
        .ok_or_else(|| invalid(array, "triangles must have type NIFTI_TYPE_INT32"))?;
    let n = check_triples(array, "triangles")?;

    let mut cells = CellArray::with_capacity(n, 3 * n);
    for i in 0..n {
        let mut tri = [0; 3];
        for (j, id) in tri.iter_mut().enumerate() {
            let v = at(values, array.order, n, i, j);
            if v < 0 {
                return Err(invalid(array, format!("negative point index {}", v)));
            }
            *id = v as PointId;
        }
        cells.push(&tri);
    }

    if let Some(info) = info {
        read_pairs(&array.meta, info);
    }

    Ok(Some(cells))
}

/// Extracts the point IDs of a sparse data set from the first `NODE_INDEX`
/// array. The IDs are checked against `num_points`.
pub(crate) fn node_indices(
    image: &GiftiImage,
    num_points: usize,
) -> Result<Option<Vec<usize>>, Error> {
    let array = match image.find(Intent::NODE_INDEX) {
        Some(a) => a,
        None => return Ok(None),
    };

    if array.dims.len() != 1 || array.dims[0] == 0 {
        return Err(invalid(array, format!(
            "node indices must be a non-empty one dimensional array, but have dimensions {:?}",
            array.dims,
        )));
    }

    if array.dims[0] > num_points {
        return Err(Error::new(|| ErrorKind::SizeMismatch {
            what: "GIFTI node index array".into(),
            expected: num_points,
            actual: array.dims[0],
        }));
    }

    let indices = array.data.to_f64_vec()
        .into_iter()
        .map(|v| {
            if v < 0.0 || v >= num_points as f64 || v.fract() != 0.0 {
                Err(Error::new(|| ErrorKind::IndexOutOfRange {
                    what: "GIFTI node index",
                    index: v as i64,
                    len: num_points,
                }))
            } else {
                Ok(v as usize)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(indices))
}

/// Converts all arrays that are not coordinates, triangles or node indices to
/// point data. Arrays with no values are skipped.
///
/// With `num_points`, each array must have a row per point or (with
/// `indices`) a row per index. Rows are then scattered to the points named by
/// the indices and all other points are set to zero. Without `num_points`,
/// each array has as many tuples as rows.
pub(crate) fn point_data(
    image: &GiftiImage,
    num_points: Option<usize>,
    indices: Option<&[usize]>,
) -> Result<PointData, Error> {
    let mut pd = PointData::new();

    for (index, array) in image.data_arrays.iter().enumerate() {
        if array.intent.is_structural()
            || array.dims.is_empty()
            || array.dims[0] == 0
            || array.num_values() == 0
        {
            continue;
        }

        let rows = array.dims[0];
        let num_components = array.num_values() / rows;
        let num_tuples = match num_points {
            Some(num_points) => {
                let expected = indices.map(|idx| idx.len()).unwrap_or(num_points);
                if rows != expected {
                    return Err(Error::new(|| ErrorKind::SizeMismatch {
                        what: format!("GIFTI data array {} ({})", index, array.intent),
                        expected,
                        actual: rows,
                    }));
                }
                num_points
            }
            None => rows,
        };
        let indices = if num_points.is_some() { indices } else { None };

        let name = array.meta_value(MetaKey::Name.name())
            .map(|s| s.to_string())
            .unwrap_or_else(|| array.intent.0.to_string());

        let mut out = DataArray::zeroed(name, array.ty(), num_components, num_tuples);
        array.copy_into(out.values_mut(), num_components, indices);
        read_pairs(&array.meta, out.info_mut());

        let is_shape = array.intent == Intent::SHAPE;
        let is_vector = array.intent == Intent::VECTOR && num_components == 3;
        let i = pd.add_array(out);
        if is_shape && pd.active_index(Attribute::Scalars).is_none() {
            pd.set_active(Attribute::Scalars, i);
        }
        if is_vector && pd.active_index(Attribute::Vectors).is_none() {
            pd.set_active(Attribute::Vectors, i);
        }
    }

    Ok(pd)
}

/// Builds a mesh from the whole document.
///
/// Points come from the file or, if it has none or they are invalid, from
/// `surface`. Without either, the read fails with `MissingPoints`.
pub(crate) fn mesh_from_image(
    image: &GiftiImage,
    surface: Option<&PolyMesh>,
) -> Result<PolyMesh, Error> {
    let mut geometry_info = MetaData::new();
    let mut topology_info = MetaData::new();

    let from_file = match coordinates(image, Some(&mut geometry_info)) {
        Ok(points) => points,
        Err(e) if surface.is_some() => {
            log::warn!("ignoring GIFTI coordinates, using the points of the surface: {}", e);
            None
        }
        Err(e) => return Err(e),
    };
    let points = from_file
        .filter(|p| !p.is_empty())
        .or_else(|| surface.map(|s| s.points.clone()).filter(|p| !p.is_empty()))
        .ok_or_else(|| Error::new(|| ErrorKind::MissingPoints))?;
    let num_points = points.len();

    let mut mesh = PolyMesh::from_points(points);
    if let Some(polys) = topology(image, Some(&mut topology_info))? {
        if let Some(&id) = polys.connectivity().iter().find(|&&id| id as usize >= num_points) {
            return Err(Error::new(|| ErrorKind::IndexOutOfRange {
                what: "GIFTI triangle point index",
                index: id as i64,
                len: num_points,
            }));
        }
        mesh.polys = polys;
    }

    let indices = node_indices(image, num_points)?;
    mesh.point_data = point_data(image, Some(num_points), indices.as_ref().map(|v| &v[..]))?;

    read_pairs(&image.meta, &mut mesh.info);
    for &key in COORDINATE_KEYS {
        if let Some(v) = geometry_info.get(key) {
            mesh.info.set(key, v.clone());
        }
    }
    if let Some(v) = topology_info.get(MetaKey::TopologicalType) {
        mesh.info.set(MetaKey::TopologicalType, v.clone());
    }

    log::debug!(
        "read GIFTI mesh with {} points, {} triangles and {} point data arrays",
        mesh.num_points(),
        mesh.polys.len(),
        mesh.point_data.len(),
    );

    Ok(mesh)
}


// ==========================================================================
// ===== Writing
// ==========================================================================

/// Builds the document for `mesh`. What is included depends on the file type
/// of `config`.
pub(crate) fn image_from_mesh(mesh: &PolyMesh, config: &Config) -> Result<GiftiImage, Error> {
    let file_type = config.file_type();
    if let Some(ty @ FileType::Label) | Some(ty @ FileType::Time) = file_type {
        return Err(Error::new(|| ErrorKind::UnsupportedGiftiType(ty.name().to_string())));
    }

    let mut image = GiftiImage::new();
    image.extra_attrs = vec![
        ("xmlns:xsi".into(), "http://www.w3.org/2001/XMLSchema-instance".into()),
        (
            "xsi:noNamespaceSchemaLocation".into(),
            "http://brainvis.wustl.edu/caret6/xml_schemas/GIFTI_Caret.xsd".into(),
        ),
    ];

    image.meta = write_pairs(&mesh.info, keys_for_file());
    set_pair(&mut image.meta, MetaKey::Date.name(), timestamp());
    set_pair(&mut image.meta, MetaKey::UserName.name(), user_name());

    let num_points = mesh.num_points();
    if num_points > 0 && FileType::writes_points(file_type) {
        let values = mesh.points.iter()
            .flat_map(|p| vec![p.x as f32, p.y as f32, p.z as f32])
            .collect();
        let mut array = GiftiDataArray::new(
            Intent::POINTSET,
            vec![num_points, 3],
            NumericData::Float32(values),
        );
        let space = mesh.info.get_str(MetaKey::DataSpace)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SPACE);
        array.coord_systems.push(CoordSystem::identity(space));
        array.meta = write_pairs(&mesh.info, &keys_for_data_array(Some(Intent::POINTSET)));
        image.data_arrays.push(array);
    }

    if FileType::writes_triangles(file_type) {
        for &kind in &[CellKind::Vertex, CellKind::Line, CellKind::Strip] {
            let n = mesh.cells_of(kind).len();
            if n > 0 {
                log::warn!("GIFTI files only store triangles, dropping {} {}", n, kind.name());
            }
        }
    }

    if !mesh.polys.is_empty() && FileType::writes_triangles(file_type) {
        let mut values = Vec::with_capacity(mesh.polys.len() * 3);
        for (i, cell) in mesh.polys.iter().enumerate() {
            if cell.len() != 3 {
                return Err(Error::new(|| ErrorKind::NonTriangularFace {
                    format: FileFormat::Gifti,
                    cell: i,
                    len: cell.len(),
                }));
            }
            for &id in cell {
                let id = i32::try_from(id).map_err(|_| Error::new(|| ErrorKind::IndexOutOfRange {
                    what: "GIFTI triangle point index",
                    index: i64::from(id),
                    len: num_points,
                }))?;
                values.push(id);
            }
        }

        let mut array = GiftiDataArray::new(
            Intent::TRIANGLE,
            vec![mesh.polys.len(), 3],
            NumericData::Int32(values),
        );
        array.meta = write_pairs(&mesh.info, &keys_for_data_array(Some(Intent::TRIANGLE)));
        image.data_arrays.push(array);
    }

    if FileType::writes_point_data(file_type) {
        let pd = &mesh.point_data;
        for (i, src) in pd.arrays().iter().enumerate() {
            if src.num_tuples() != num_points {
                return Err(Error::new(|| ErrorKind::SizeMismatch {
                    what: format!("point data array '{}'", src.name()),
                    expected: num_points,
                    actual: src.num_tuples(),
                }));
            }

            let intent = point_data_intent(mesh, i);
            let dims = match src.num_components() {
                1 => vec![num_points],
                n => vec![num_points, n],
            };

            let mut array = GiftiDataArray::new(
                intent,
                dims,
                NumericData::from_f64(src.ty(), src.values()),
            );
            array.meta = write_pairs(src.info(), &keys_for_data_array(Some(intent)));
            set_pair(&mut array.meta, MetaKey::Name.name(), src.name().to_string());
            image.data_arrays.push(array);
        }
    }

    for array in &mut image.data_arrays {
        array.encoding = config.encoding();
    }

    Ok(image)
}

/// The intent of point data array `i`: the intent code stored in its
/// metadata (unless that is structural), else `SHAPE` for the active scalars,
/// `VECTOR` for three component active vectors and `NONE` otherwise.
fn point_data_intent(mesh: &PolyMesh, i: usize) -> Intent {
    let pd = &mesh.point_data;
    let array = &pd.arrays()[i];

    if let Some(code) = array.info().get_integer(MetaKey::IntentCode) {
        let intent = Intent(code as i32);
        if !intent.is_structural() {
            return intent;
        }
    }

    if pd.active_index(Attribute::Scalars) == Some(i) {
        Intent::SHAPE
    } else if pd.active_index(Attribute::Vectors) == Some(i) && array.num_components() == 3 {
        Intent::VECTOR
    } else {
        Intent::NONE
    }
}

/// Current local time in the classic `ctime` format.
fn timestamp() -> String {
    chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}

fn user_name() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".into())
}
