use std::{
    convert::TryFrom,
    fs::File,
    io::{self, Read},
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use cgmath::Point3;

use crate::{
    io::{Error, ErrorKind, FileFormat, PrimitiveType},
    mesh::{Attribute, CellArray, DataArray, PolyMesh},
};
use super::{
    Encoding, Header,
    ATTRIBUTES, COLORS, LABELS, MAGIC_BE, MAGIC_LE, NORMALS, NUM_HEADER_FIELDS, UV,
};


/// A reader for DFS files.
#[derive(Debug)]
pub struct Reader<R: io::Read> {
    reader: R,
}

impl Reader<File> {
    /// Creates a new `Reader` from the given file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: io::Read> Reader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the whole file. Optional sections are only added as point data
    /// if the header declares them.
    pub fn read(mut self) -> Result<PolyMesh, Error> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;

        match encoding_of(&data)? {
            Encoding::LittleEndian => parse::<LittleEndian>(&data),
            Encoding::BigEndian => parse::<BigEndian>(&data),
        }
    }
}

/// The first six bytes of the magic determine the byte order.
fn encoding_of(data: &[u8]) -> Result<Encoding, Error> {
    if data.len() < MAGIC_LE.len() {
        return Err(malformed("file too short for header"));
    }

    if data[..6] == MAGIC_LE[..6] {
        Ok(Encoding::LittleEndian)
    } else if data[..6] == MAGIC_BE[..6] {
        Ok(Encoding::BigEndian)
    } else {
        Err(malformed("missing 'DFS_LE'/'DFS_BE' magic"))
    }
}

fn parse<B: ByteOrder>(data: &[u8]) -> Result<PolyMesh, Error> {
    let header = read_header::<B>(data)?;

    let num_triangles = count(header.num_triangles, "triangle count")?;
    let num_points = count(header.num_vertices, "vertex count")?;
    let triangles_offset = count(header.header_size, "header size")?;
    let vertices_offset = triangles_offset + num_triangles * 12;

    // ----- Topology ---------------------------------------------------------
    let raw = section(data, triangles_offset, num_triangles * 12, "triangles")?;
    let mut polys = CellArray::with_capacity(num_triangles, num_triangles * 3);
    for chunk in raw.chunks_exact(12) {
        let mut tri = [0; 3];
        for (j, id) in tri.iter_mut().enumerate() {
            let v = B::read_i32(&chunk[j * 4..]);
            *id = u32::try_from(v)
                .ok()
                .filter(|&id| (id as usize) < num_points)
                .ok_or_else(|| Error::new(|| ErrorKind::IndexOutOfRange {
                    what: "DFS vertex index",
                    index: v as i64,
                    len: num_points,
                }))?;
        }
        polys.push(&tri);
    }

    // ----- Geometry ---------------------------------------------------------
    let raw = section(data, vertices_offset, num_points * 12, "vertices")?;
    let points = raw.chunks_exact(12)
        .map(|c| Point3::new(
            B::read_f32(&c[0..]) as f64,
            B::read_f32(&c[4..]) as f64,
            B::read_f32(&c[8..]) as f64,
        ))
        .collect();

    let mut mesh = PolyMesh {
        points,
        polys,
        .. PolyMesh::default()
    };

    // ----- Optional per-vertex sections -------------------------------------
    let pd = &mut mesh.point_data;
    if let Some(normals) = float_section::<B>(data, header.normals_offset, num_points, 3, NORMALS)? {
        let idx = pd.add_array(normals);
        pd.set_active(Attribute::Normals, idx);
    }
    if let Some(colors) = float_section::<B>(data, header.colors_offset, num_points, 3, COLORS)? {
        pd.add_array(colors);
    }
    if let Some(uv) = float_section::<B>(data, header.uv_offset, num_points, 2, UV)? {
        // Texture coordinates are stored with three components.
        let mut padded = DataArray::new(UV, PrimitiveType::Float32, 3);
        for i in 0..num_points {
            padded.push_tuple(uv.tuple(i));
        }
        let idx = pd.add_array(padded);
        pd.set_active(Attribute::TCoords, idx);
    }
    if header.labels_offset > 0 {
        let raw = section(data, header.labels_offset as usize, num_points * 2, LABELS)?;
        let values = raw.chunks_exact(2).map(|c| B::read_u16(c) as f64).collect();
        pd.add_array(DataArray::from_values(LABELS, PrimitiveType::Uint16, 1, values));
    }
    if let Some(attrs) = float_section::<B>(data, header.attributes_offset, num_points, 1, ATTRIBUTES)? {
        let idx = pd.add_array(attrs);
        pd.set_active(Attribute::Scalars, idx);
    }

    log::debug!(
        "read DFS surface with {} vertices, {} triangles and {} point data arrays",
        mesh.num_points(),
        mesh.polys.len(),
        mesh.point_data.len(),
    );

    Ok(mesh)
}

fn read_header<B: ByteOrder>(data: &[u8]) -> Result<Header, Error> {
    let raw = section(data, MAGIC_LE.len(), NUM_HEADER_FIELDS * 4, "header")?;
    let mut fields = [0; NUM_HEADER_FIELDS];
    B::read_i32_into(raw, &mut fields);

    Ok(Header::from_fields(fields))
}

/// Reads a section of `f32` tuples at `offset`. An offset of 0 (or negative)
/// means the section is absent.
fn float_section<B: ByteOrder>(
    data: &[u8],
    offset: i32,
    num_points: usize,
    num_components: usize,
    name: &str,
) -> Result<Option<DataArray>, Error> {
    if offset <= 0 {
        return Ok(None);
    }

    let raw = section(data, offset as usize, num_points * num_components * 4, name)?;
    let values = raw.chunks_exact(4).map(|c| B::read_f32(c) as f64).collect();
    Ok(Some(DataArray::from_values(name, PrimitiveType::Float32, num_components, values)))
}

fn section<'a>(data: &'a [u8], offset: usize, len: usize, what: &str) -> Result<&'a [u8], Error> {
    offset.checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| malformed(format!(
            "{} section ({} bytes at offset {}) exceeds file size ({} bytes)",
            what,
            len,
            offset,
            data.len(),
        )))
}

fn count(v: i32, what: &str) -> Result<usize, Error> {
    usize::try_from(v).map_err(|_| malformed(format!("negative {}: {}", what, v)))
}

fn malformed(msg: impl Into<String>) -> Error {
    let msg = msg.into();
    Error::new(|| ErrorKind::Malformed {
        format: FileFormat::Dfs,
        msg,
    })
}
