use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use cgmath::Point3;
use smallvec::SmallVec;

use crate::{
    io::{
        parse::{self, Tokens},
        Error, ErrorKind,
    },
    mesh::{PointId, PolyMesh},
};


/// A reader for OFF files.
#[derive(Debug)]
pub struct Reader<R: io::Read> {
    reader: R,
}

impl Reader<File> {
    /// Creates a new `Reader` from the given file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        // No `BufReader` needed: the whole file is read in one go.
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: io::Read> Reader<R> {
    /// Creates a new `Reader` from the given `io::Read` instance. If you want
    /// to open a file, rather use [`Reader::open`].
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the whole input and returns the mesh. Any error (including a
    /// premature end of the input) discards everything read so far.
    pub fn read(mut self) -> Result<PolyMesh, Error> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_mesh(&data)
    }
}

fn parse_mesh(data: &[u8]) -> Result<PolyMesh, Error> {
    let mut tokens = Tokens::new(data);

    tokens.expect_one_of(&["OFF", "off"])?;
    let num_points = count(&mut tokens, "vertex count")?;
    let num_faces = count(&mut tokens, "face count")?;
    let _num_edges: i64 = tokens.parse("edge count")?;

    // Each value needs at least two bytes, so the capacity is bounded by the
    // input size even if the header lies.
    let mut mesh = PolyMesh::new();
    mesh.points.reserve(num_points.min(data.len() / 6));
    for _ in 0..num_points {
        let x = tokens.parse_finite("x coordinate")?;
        let y = tokens.parse_finite("y coordinate")?;
        let z = tokens.parse_finite("z coordinate")?;
        mesh.points.push(Point3::new(x, y, z));
    }

    let mut cell = SmallVec::<[PointId; 8]>::new();
    for _ in 0..num_faces {
        let len: i64 = tokens.parse("face size")?;

        cell.clear();
        for _ in 0..len {
            let id: i64 = tokens.parse("point index")?;
            if id < 0 || id as usize >= num_points {
                return Err(Error::new(|| ErrorKind::IndexOutOfRange {
                    what: "OFF point index",
                    index: id,
                    len: num_points,
                }));
            }
            cell.push(id as PointId);
        }

        match len {
            1 => mesh.verts.push(&cell),
            2 => mesh.lines.push(&cell),
            n if n >= 3 => mesh.polys.push(&cell),
            _ => {}
        }
    }

    log::debug!(
        "read OFF mesh with {} points, {} verts, {} lines and {} polys",
        mesh.num_points(),
        mesh.verts.len(),
        mesh.lines.len(),
        mesh.polys.len(),
    );

    Ok(mesh)
}

/// Reads a count from the header. Negative counts are treated as 0.
fn count(tokens: &mut Tokens<'_>, what: &str) -> Result<usize, parse::Error> {
    tokens.parse::<i64>(what).map(|n| n.max(0) as usize)
}
