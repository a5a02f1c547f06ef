use std::{
    convert::TryFrom,
    io::{self, Write},
};

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use crate::{
    io::{Error, ErrorKind, FileFormat, MeshWriter},
    mesh::{Attribute, DataArray, PolyMesh},
};
use super::{
    Encoding, Header,
    ATTRIBUTES, COLORS, HEADER_SIZE, LABELS, MAGIC_BE, MAGIC_LE, NORMALS, UV,
};


// ===============================================================================================
// ===== DFS Config
// ===============================================================================================

/// Used to configure and create a [`Writer`].
#[derive(Clone, Debug)]
pub struct Config {
    encoding: Encoding,
}

impl Config {
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    /// Creates a config for a little endian file (what BrainSuite writes).
    pub fn little_endian() -> Self {
        Self::new(Encoding::LittleEndian)
    }

    pub fn big_endian() -> Self {
        Self::new(Encoding::BigEndian)
    }

    /// Creates a [`Writer`] with `self` as config.
    pub fn into_writer<W: io::Write>(self, writer: W) -> Writer<W> {
        Writer::new(self, writer)
    }
}

impl MeshWriter for Config {
    fn write_to(&self, mesh: &PolyMesh, writer: impl Write) -> Result<(), Error> {
        self.clone().into_writer(writer).write(mesh)
    }
}


// ===============================================================================================
// ===== DFS Writer
// ===============================================================================================

/// A writer for DFS files.
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    config: Config,
    writer: W,
}

/// The point data arrays that end up in the optional sections.
struct Sections<'a> {
    normals: Option<&'a DataArray>,
    uv: Option<&'a DataArray>,
    colors: Option<&'a DataArray>,
    labels: Option<&'a DataArray>,
    attributes: Option<&'a DataArray>,
}

impl<W: io::Write> Writer<W> {
    pub fn new(config: Config, writer: W) -> Self {
        Self { config, writer }
    }

    /// Writes the mesh. Fails before writing anything if any cell is not a
    /// triangle or if a point data array has the wrong number of tuples.
    pub fn write(self, mesh: &PolyMesh) -> Result<(), Error> {
        match self.config.encoding {
            Encoding::LittleEndian => write_impl::<LittleEndian>(self.writer, mesh, MAGIC_LE),
            Encoding::BigEndian => write_impl::<BigEndian>(self.writer, mesh, MAGIC_BE),
        }
    }
}

fn write_impl<B: ByteOrder>(mut w: impl Write, mesh: &PolyMesh, magic: &[u8]) -> Result<(), Error> {
    for (i, (_, cell)) in mesh.cells().enumerate() {
        if cell.len() != 3 {
            return Err(Error::new(|| ErrorKind::NonTriangularFace {
                format: FileFormat::Dfs,
                cell: i,
                len: cell.len(),
            }));
        }
        if let Some(&id) = cell.iter().find(|&&id| i32::try_from(id).is_err()) {
            return Err(Error::new(|| ErrorKind::IndexOutOfRange {
                what: "DFS triangle point index",
                index: i64::from(id),
                len: i32::max_value() as usize,
            }));
        }
    }

    let num_points = mesh.num_points();
    let num_triangles = mesh.num_cells();
    let sections = find_sections(mesh)?;

    // ----- Header -----------------------------------------------------------
    let mut offset = HEADER_SIZE + num_triangles * 12 + num_points * 12;
    let mut next_offset = |present: Option<&DataArray>, size: usize| {
        match present {
            Some(_) => {
                let out = offset as i32;
                offset += num_points * size;
                out
            }
            None => 0,
        }
    };

    let header = Header {
        header_size: HEADER_SIZE as i32,
        num_triangles: num_triangles as i32,
        num_vertices: num_points as i32,
        normals_offset: next_offset(sections.normals, 12),
        uv_offset: next_offset(sections.uv, 8),
        colors_offset: next_offset(sections.colors, 12),
        labels_offset: next_offset(sections.labels, 2),
        attributes_offset: next_offset(sections.attributes, 4),
        .. Header::default()
    };

    let mut buf = [0u8; HEADER_SIZE];
    buf[..magic.len()].copy_from_slice(magic);
    B::write_i32_into(&header.fields(), &mut buf[magic.len()..magic.len() + 48]);
    w.write_all(&buf)?;

    // ----- Topology and geometry --------------------------------------------
    for (_, cell) in mesh.cells() {
        for &id in cell {
            // In range, checked above.
            w.write_i32::<B>(id as i32)?;
        }
    }
    for p in &mesh.points {
        w.write_f32::<B>(p.x as f32)?;
        w.write_f32::<B>(p.y as f32)?;
        w.write_f32::<B>(p.z as f32)?;
    }

    // ----- Optional sections, in the order of their offsets -----------------
    if let Some(normals) = sections.normals {
        write_floats::<B>(&mut w, normals, 3)?;
    }
    if let Some(uv) = sections.uv {
        write_floats::<B>(&mut w, uv, 2)?;
    }
    if let Some(colors) = sections.colors {
        write_floats::<B>(&mut w, colors, 3)?;
    }
    if let Some(labels) = sections.labels {
        for &v in labels.values() {
            w.write_u16::<B>(v as u16)?;
        }
    }
    if let Some(attributes) = sections.attributes {
        write_floats::<B>(&mut w, attributes, 1)?;
    }

    Ok(())
}

/// Writes the first `num_components` components of every tuple as `f32`.
fn write_floats<B: ByteOrder>(
    w: &mut impl Write,
    array: &DataArray,
    num_components: usize,
) -> Result<(), Error> {
    for i in 0..array.num_tuples() {
        for &v in &array.tuple(i)[..num_components] {
            w.write_f32::<B>(v as f32)?;
        }
    }

    Ok(())
}

fn find_sections(mesh: &PolyMesh) -> Result<Sections<'_>, Error> {
    let pd = &mesh.point_data;
    let active_or_named = |attr: Attribute, name: &str| pd.active(attr).or_else(|| pd.array_by_name(name));

    let sections = Sections {
        normals: check(mesh, active_or_named(Attribute::Normals, NORMALS), &[3])?,
        uv: check(mesh, active_or_named(Attribute::TCoords, UV), &[2, 3])?,
        colors: check(mesh, pd.array_by_name(COLORS), &[3])?,
        labels: check(mesh, pd.array_by_name(LABELS), &[1])?,
        attributes: check(mesh, active_or_named(Attribute::Scalars, ATTRIBUTES), &[1])?,
    };

    Ok(sections)
}

/// Filters out arrays with an unexpected number of components and makes sure
/// the remaining one has a tuple per point.
fn check<'a>(
    mesh: &PolyMesh,
    array: Option<&'a DataArray>,
    num_components: &[usize],
) -> Result<Option<&'a DataArray>, Error> {
    let array = match array {
        Some(a) => a,
        None => return Ok(None),
    };

    if !num_components.contains(&array.num_components()) {
        log::warn!(
            "skipping point data array '{}' for DFS: it has {} components, expected {:?}",
            array.name(),
            array.num_components(),
            num_components,
        );
        return Ok(None);
    }

    if array.num_tuples() != mesh.num_points() {
        return Err(Error::new(|| ErrorKind::SizeMismatch {
            what: format!("point data array '{}'", array.name()),
            expected: mesh.num_points(),
            actual: array.num_tuples(),
        }));
    }

    Ok(Some(array))
}
