//! Reading and writing GIFTI surface files (`.gii`).
//!
//! A GIFTI file is an XML document holding file level metadata and a list of
//! data arrays. Each array has an intent that says what it contains:
//! `NIFTI_INTENT_POINTSET` holds the point coordinates, `NIFTI_INTENT_TRIANGLE`
//! the triangles, `NIFTI_INTENT_NODE_INDEX` the point IDs of a sparse data set
//! and everything else is per-point data. The numeric content of an array is
//! stored as ASCII, base64 or gzip compressed base64.
//!
//! The document itself is handled by [`GiftiImage`]; the functions in this
//! module convert between it and a [`PolyMesh`]. Files that only contain
//! point data can be read on top of an existing surface with
//! [`read_gifti_with_surface`].
//!
//! Writing looks at the file name: `<name>.<type>.gii` restricts what is
//! written. `coord` only writes the points, `topo` only the triangles, `surf`
//! both, and all other types (`func`, `shape`, `rgba`, `tensor`, `vector`)
//! only the point data. Without type all of it is written. `label` and
//! `time` files cannot be written.

use std::{
    fmt,
    fs::File,
    io::{self, Read},
    path::Path,
};

use cgmath::Point3;

use crate::mesh::{CellArray, MetaData, PointData, PolyMesh};
use super::{Error, ErrorKind, MeshWriter, PrimitiveType};


mod convert;
mod image;
pub mod meta;
mod xml;

#[cfg(test)]
mod tests;

pub use self::image::{CoordSystem, GiftiDataArray, GiftiImage, NumericData};


// ==========================================================================
// ===== Enumerations
// ==========================================================================

/// The intent code of a data array (`NIFTI_INTENT_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Intent(pub i32);

macro_rules! intents {
    ($($name:ident = $code:literal,)*) => {
        impl Intent {
            $( pub const $name: Intent = Intent($code); )*
        }

        static INTENT_NAMES: &[(i32, &str)] = &[
            $( ($code, concat!("NIFTI_INTENT_", stringify!($name))), )*
        ];
    };
}

intents! {
    NONE = 0,
    CORREL = 2,
    TTEST = 3,
    FTEST = 4,
    ZSCORE = 5,
    CHISQ = 6,
    BETA = 7,
    BINOM = 8,
    GAMMA = 9,
    POISSON = 10,
    NORMAL = 11,
    FTEST_NONC = 12,
    CHISQ_NONC = 13,
    LOGISTIC = 14,
    LAPLACE = 15,
    UNIFORM = 16,
    TTEST_NONC = 17,
    WEIBULL = 18,
    CHI = 19,
    INVGAUSS = 20,
    EXTVAL = 21,
    PVAL = 22,
    LOGPVAL = 23,
    LOG10PVAL = 24,
    ESTIMATE = 1001,
    LABEL = 1002,
    NEURONAME = 1003,
    GENMATRIX = 1004,
    SYMMATRIX = 1005,
    DISPVECT = 1006,
    VECTOR = 1007,
    POINTSET = 1008,
    TRIANGLE = 1009,
    QUATERNION = 1010,
    DIMLESS = 1011,
    TIME_SERIES = 2001,
    NODE_INDEX = 2002,
    RGB_VECTOR = 2003,
    RGBA_VECTOR = 2004,
    SHAPE = 2005,
}

impl Intent {
    /// The `NIFTI_INTENT_*` name, or `None` for unknown codes.
    pub fn name(&self) -> Option<&'static str> {
        INTENT_NAMES.iter().find(|(code, _)| *code == self.0).map(|(_, name)| *name)
    }

    /// Parses an intent from its `NIFTI_INTENT_*` name or its numeric code.
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        INTENT_NAMES.iter()
            .find(|(_, name)| *name == s)
            .map(|(code, _)| Intent(*code))
            .or_else(|| s.parse().ok().map(Intent))
    }

    /// Statistical intents (`CORREL` to `LOG10PVAL`) come with parameters.
    pub fn is_statistic(&self) -> bool {
        (2..=24).contains(&self.0)
    }

    /// Returns `true` for the three intents with a structural meaning
    /// (`POINTSET`, `TRIANGLE` and `NODE_INDEX`).
    pub fn is_structural(&self) -> bool {
        *self == Intent::POINTSET || *self == Intent::TRIANGLE || *self == Intent::NODE_INDEX
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => name.fmt(f),
            None => self.0.fmt(f),
        }
    }
}

/// Returns the `NIFTI_TYPE_*` name of a data type.
pub fn nifti_type_name(ty: PrimitiveType) -> &'static str {
    match ty {
        PrimitiveType::Uint8 => "NIFTI_TYPE_UINT8",
        PrimitiveType::Int8 => "NIFTI_TYPE_INT8",
        PrimitiveType::Uint16 => "NIFTI_TYPE_UINT16",
        PrimitiveType::Int16 => "NIFTI_TYPE_INT16",
        PrimitiveType::Uint32 => "NIFTI_TYPE_UINT32",
        PrimitiveType::Int32 => "NIFTI_TYPE_INT32",
        PrimitiveType::Uint64 => "NIFTI_TYPE_UINT64",
        PrimitiveType::Int64 => "NIFTI_TYPE_INT64",
        PrimitiveType::Float32 => "NIFTI_TYPE_FLOAT32",
        PrimitiveType::Float64 => "NIFTI_TYPE_FLOAT64",
    }
}

/// Returns the NIfTI code of a data type.
pub fn nifti_type_code(ty: PrimitiveType) -> i32 {
    match ty {
        PrimitiveType::Uint8 => 2,
        PrimitiveType::Int16 => 4,
        PrimitiveType::Int32 => 8,
        PrimitiveType::Float32 => 16,
        PrimitiveType::Float64 => 64,
        PrimitiveType::Int8 => 256,
        PrimitiveType::Uint16 => 512,
        PrimitiveType::Uint32 => 768,
        PrimitiveType::Int64 => 1024,
        PrimitiveType::Uint64 => 1280,
    }
}

/// Parses a data type from its `NIFTI_TYPE_*` name or its NIfTI code.
pub fn parse_nifti_type(s: &str) -> Option<PrimitiveType> {
    use self::PrimitiveType::*;

    let s = s.trim();
    let all = [Uint8, Int8, Uint16, Int16, Uint32, Int32, Uint64, Int64, Float32, Float64];
    let code = s.parse::<i32>().ok();
    all.iter()
        .find(|&&ty| nifti_type_name(ty) == s || Some(nifti_type_code(ty)) == code)
        .cloned()
}

/// Memory layout of a multi-dimensional array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrder {
    /// The last index varies fastest.
    RowMajor,
    /// The first index varies fastest.
    ColumnMajor,
}

impl IndexOrder {
    pub fn name(&self) -> &'static str {
        match self {
            IndexOrder::RowMajor => "RowMajorOrder",
            IndexOrder::ColumnMajor => "ColumnMajorOrder",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim() {
            "RowMajorOrder" => Some(IndexOrder::RowMajor),
            "ColumnMajorOrder" => Some(IndexOrder::ColumnMajor),
            _ => None,
        }
    }
}

/// How the values of a data array are stored in the `<Data>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Base64Binary,
    GZipBase64Binary,
    /// Values live in a separate file. Not supported.
    ExternalFileBinary,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Ascii => "ASCII",
            Encoding::Base64Binary => "Base64Binary",
            Encoding::GZipBase64Binary => "GZipBase64Binary",
            Encoding::ExternalFileBinary => "ExternalFileBinary",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim() {
            "ASCII" => Some(Encoding::Ascii),
            "Base64Binary" => Some(Encoding::Base64Binary),
            "GZipBase64Binary" => Some(Encoding::GZipBase64Binary),
            "ExternalFileBinary" => Some(Encoding::ExternalFileBinary),
            _ => None,
        }
    }
}

/// Byte order of binary encoded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    /// The byte order of the machine we are running on.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endian::Big => "BigEndian",
            Endian::Little => "LittleEndian",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim() {
            "BigEndian" => Some(Endian::Big),
            "LittleEndian" => Some(Endian::Little),
            _ => None,
        }
    }
}

/// The type of a GIFTI file, given by the second to last extension of its
/// name (e.g. `lh.white.surf.gii`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Coord,
    Func,
    Label,
    Rgba,
    Shape,
    Surf,
    Tensor,
    Time,
    Topo,
    Vector,
}

impl FileType {
    pub fn name(&self) -> &'static str {
        match self {
            FileType::Coord => "coord",
            FileType::Func => "func",
            FileType::Label => "label",
            FileType::Rgba => "rgba",
            FileType::Shape => "shape",
            FileType::Surf => "surf",
            FileType::Tensor => "tensor",
            FileType::Time => "time",
            FileType::Topo => "topo",
            FileType::Vector => "vector",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        let out = match s {
            "coord" => FileType::Coord,
            "func" => FileType::Func,
            "label" => FileType::Label,
            "rgba" => FileType::Rgba,
            "shape" => FileType::Shape,
            "surf" => FileType::Surf,
            "tensor" => FileType::Tensor,
            "time" => FileType::Time,
            "topo" => FileType::Topo,
            "vector" => FileType::Vector,
            _ => return None,
        };
        Some(out)
    }

    /// Determines the type from a file name. Returns `None` for untyped
    /// names (`mesh.gii`, `a.b.gii` with an unknown `b`) and for names not
    /// ending in `.gii`.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?;
        let stem = name.strip_suffix(".gii")?;
        let sub = Path::new(stem).extension()?.to_str()?;
        Self::from_name(sub)
    }

    fn writes_points(this: Option<Self>) -> bool {
        match this {
            None | Some(FileType::Coord) | Some(FileType::Surf) => true,
            _ => false,
        }
    }

    fn writes_triangles(this: Option<Self>) -> bool {
        match this {
            None | Some(FileType::Topo) | Some(FileType::Surf) => true,
            _ => false,
        }
    }

    fn writes_point_data(this: Option<Self>) -> bool {
        match this {
            Some(FileType::Coord) | Some(FileType::Topo) | Some(FileType::Surf) => false,
            _ => true,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.name().fmt(f)
    }
}


// ==========================================================================
// ===== GIFTI Config and Writer
// ==========================================================================

/// Used to configure and create a [`Writer`].
#[derive(Clone, Debug)]
pub struct Config {
    encoding: Encoding,
    file_type: Option<FileType>,
}

impl Config {
    /// Creates a config writing all data arrays with the given encoding.
    ///
    /// Without the `gzip` feature, `GZipBase64Binary` is silently replaced by
    /// `Base64Binary`.
    pub fn new(encoding: Encoding) -> Self {
        let encoding = if encoding == Encoding::GZipBase64Binary && !cfg!(feature = "gzip") {
            log::debug!("gzip support not compiled in, writing uncompressed base64");
            Encoding::Base64Binary
        } else {
            encoding
        };

        Self {
            encoding,
            file_type: None,
        }
    }

    pub fn ascii() -> Self {
        Self::new(Encoding::Ascii)
    }

    pub fn base64() -> Self {
        Self::new(Encoding::Base64Binary)
    }

    pub fn gzip_base64() -> Self {
        Self::new(Encoding::GZipBase64Binary)
    }

    /// Picks the encoding from the two flags. `ascii` wins over `compress`.
    pub fn from_flags(compress: bool, ascii: bool) -> Self {
        match (ascii, compress) {
            (true, _) => Self::ascii(),
            (false, true) => Self::gzip_base64(),
            (false, false) => Self::base64(),
        }
    }

    /// Restricts what is written, see the module documentation.
    pub fn with_file_type(self, file_type: Option<FileType>) -> Self {
        Self { file_type, .. self }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn file_type(&self) -> Option<FileType> {
        self.file_type
    }

    /// Creates a [`Writer`] with `self` as config.
    pub fn into_writer<W: io::Write>(self, writer: W) -> Writer<W> {
        Writer::new(self, writer)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::gzip_base64()
    }
}

impl MeshWriter for Config {
    fn write_to(&self, mesh: &PolyMesh, writer: impl io::Write) -> Result<(), Error> {
        self.clone().into_writer(writer).write(mesh)
    }
}

/// A writer for GIFTI files.
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    config: Config,
    writer: W,
}

impl<W: io::Write> Writer<W> {
    pub fn new(config: Config, writer: W) -> Self {
        Self { config, writer }
    }

    /// Converts the mesh into a GIFTI document and writes it.
    pub fn write(self, mesh: &PolyMesh) -> Result<(), Error> {
        let image = convert::image_from_mesh(mesh, &self.config)?;
        xml::write_image(&image, self.writer)
    }

    /// Writes an already built document.
    pub fn write_image(self, image: &GiftiImage) -> Result<(), Error> {
        xml::write_image(image, self.writer)
    }
}


// ==========================================================================
// ===== GIFTI Reader
// ==========================================================================

/// A reader for GIFTI files.
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

    /// Reads and decodes the document without interpreting it.
    pub fn read_image(mut self) -> Result<GiftiImage, Error> {
        let mut text = String::new();
        self.reader.read_to_string(&mut text)?;
        xml::parse_image(&text)
    }

    /// Reads the mesh. The file has to contain point coordinates.
    pub fn read(self) -> Result<PolyMesh, Error> {
        self.read_with_surface(None)
    }

    /// Reads the mesh, taking the points from `surface` if the file has no
    /// coordinates of its own.
    pub fn read_with_surface(self, surface: Option<&PolyMesh>) -> Result<PolyMesh, Error> {
        let image = self.read_image()?;
        convert::mesh_from_image(&image, surface)
    }
}


// ==========================================================================
// ===== File level functions
// ==========================================================================

/// Reads the GIFTI file at `path`.
pub fn read_file(path: impl AsRef<Path>) -> Result<PolyMesh, Error> {
    Reader::open(path)?.read()
}

/// Reads the GIFTI file at `path`. If it has no point coordinates, the points
/// of `surface` are used; point data is then checked against the number of
/// surface points.
pub fn read_gifti_with_surface(
    path: impl AsRef<Path>,
    surface: Option<&PolyMesh>,
) -> Result<PolyMesh, Error> {
    Reader::open(path)?.read_with_surface(surface)
}

/// Reads only the point coordinates of the file at `path`. Returns an empty
/// list if the file has no `POINTSET` array. The metadata of that array (and
/// its data space) is stored into `info`.
pub fn read_gifti_coordinates(
    path: impl AsRef<Path>,
    info: Option<&mut MetaData>,
) -> Result<Vec<Point3<f64>>, Error> {
    let image = Reader::open(path)?.read_image()?;
    Ok(convert::coordinates(&image, info)?.unwrap_or_default())
}

/// Reads only the triangles of the file at `path`. Returns `None` if the
/// file has no `TRIANGLE` array. The metadata of that array is stored into
/// `info`.
pub fn read_gifti_topology(
    path: impl AsRef<Path>,
    info: Option<&mut MetaData>,
) -> Result<Option<CellArray>, Error> {
    let image = Reader::open(path)?.read_image()?;
    convert::topology(&image, info)
}

/// Reads only the point data of the file at `path`, one tuple per row of
/// each array (node indices are not applied, as there is no point count to
/// scatter into).
pub fn read_gifti_point_data(path: impl AsRef<Path>) -> Result<PointData, Error> {
    let image = Reader::open(path)?.read_image()?;
    convert::point_data(&image, None, None)
}

/// Writes `mesh` to `path`. The file type is taken from the name, see the
/// module documentation.
pub fn write_file(
    path: impl AsRef<Path>,
    mesh: &PolyMesh,
    compress: bool,
    ascii: bool,
) -> Result<(), Error> {
    let path = path.as_ref();
    let config = Config::from_flags(compress, ascii).with_file_type(FileType::from_path(path));
    if let Some(ty @ FileType::Label) | Some(ty @ FileType::Time) = config.file_type() {
        return Err(Error::new(|| ErrorKind::UnsupportedGiftiType(ty.name().to_string())));
    }

    config.write_to_file(mesh, path)
}
