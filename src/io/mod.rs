//! Reading and writing meshes from and to files.
//!
//! Each supported format lives in its own submodule. Writers are configured
//! via a format specific `Config` which can be turned into a `Writer`
//! (`Config::into_writer`) or used directly through the [`MeshWriter`] trait.
//! Readers are created from an `io::Read` or opened from a path.
//!
//! For the common case of "just read/write this file", use [`read_mesh`] and
//! [`write_mesh`], which select the codec from the file extension.

use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, Cursor, Write},
    path::Path,
    str::FromStr,
};

use byteorder::ByteOrder;
use failure::{Backtrace, Fail};
use num_traits::NumCast;

use crate::mesh::PolyMesh;


pub mod dfs;
mod dispatch;
pub mod gifti;
pub mod off;
pub mod parse;
pub mod tetgen;
pub(crate) mod text;

pub use self::dispatch::{
    read_mesh, write_mesh, Dispatcher, ExternalCodec, NoExternalCodec, ReadOptions,
    WriteOptions,
};


/// Types that can serialize a [`PolyMesh`] into an `io::Write` destination.
///
/// The main method of this trait is `write_to`. There are some other provided
/// methods for easily writing to a file, to stdout and to memory.
pub trait MeshWriter {
    /// Writes the mesh into the given `Write` instance.
    fn write_to(&self, mesh: &PolyMesh, writer: impl Write) -> Result<(), Error>;

    /// Writes the mesh to the file given by the filename. Overwrites the file
    /// if it already exists.
    fn write_to_file(&self, mesh: &PolyMesh, path: impl AsRef<Path>) -> Result<(), Error> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(mesh, &mut w)?;
        w.flush()?;

        Ok(())
    }

    /// Writes the mesh to stdout. Locks stdout for the time the mesh is being
    /// written.
    fn write_to_stdout(&self, mesh: &PolyMesh) -> Result<(), Error> {
        let stdout = io::stdout();
        let lock = stdout.lock();
        self.write_to(mesh, lock)
    }

    /// Writes the mesh into a `Vec<u8>` which is returned on success.
    fn write_to_memory(&self, mesh: &PolyMesh) -> Result<Vec<u8>, Error> {
        let mut w = Cursor::new(Vec::new());
        self.write_to(mesh, &mut w)?;
        Ok(w.into_inner())
    }
}


// ==========================================================================
// ===== File formats
// ==========================================================================

/// Represents one of the known file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Legacy VTK (`.vtk`). Also the fallback for unknown extensions.
    VtkLegacy,
    /// VTK XML formats (`.vtp`, `.vtu`, ...).
    VtkXml,
    Stl,
    Ply,
    Obj,
    /// BrainSuite DFS surface.
    Dfs,
    Off,
    Gifti,
    TetGenNode,
    TetGenPoly,
    TetGenSMesh,
}

impl FileFormat {
    /// Determines the format from the extension of the given path. Paths
    /// without (UTF-8) extension are treated like unknown extensions.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileFormat::VtkLegacy)
    }

    /// Determines the format from an extension (without leading dot).
    ///
    /// Matching is case sensitive. Any three letter extension starting with
    /// `vt` except `vtk` is a VTK XML format. Unknown extensions map to
    /// [`FileFormat::VtkLegacy`].
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "vtk" => FileFormat::VtkLegacy,
            "stl" => FileFormat::Stl,
            "ply" => FileFormat::Ply,
            "obj" => FileFormat::Obj,
            "dfs" => FileFormat::Dfs,
            "off" => FileFormat::Off,
            "gii" => FileFormat::Gifti,
            "node" => FileFormat::TetGenNode,
            "poly" => FileFormat::TetGenPoly,
            "smesh" => FileFormat::TetGenSMesh,
            _ if ext.len() == 3 && ext.starts_with("vt") => FileFormat::VtkXml,
            _ => FileFormat::VtkLegacy,
        }
    }

    /// Returns `true` for formats that can only be written.
    pub fn is_write_only(&self) -> bool {
        match self {
            FileFormat::TetGenNode | FileFormat::TetGenPoly | FileFormat::TetGenSMesh => true,
            _ => false,
        }
    }

    /// Returns `true` if this crate reads/writes the format itself, without
    /// an [`ExternalCodec`].
    pub fn is_builtin(&self) -> bool {
        match self {
            FileFormat::VtkLegacy
            | FileFormat::VtkXml
            | FileFormat::Stl
            | FileFormat::Ply
            | FileFormat::Obj => false,
            _ => true,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FileFormat::VtkLegacy => "VTK",
            FileFormat::VtkXml => "VTK XML",
            FileFormat::Stl => "STL",
            FileFormat::Ply => "PLY",
            FileFormat::Obj => "OBJ",
            FileFormat::Dfs => "DFS",
            FileFormat::Off => "OFF",
            FileFormat::Gifti => "GIFTI",
            FileFormat::TetGenNode => "TetGen node",
            FileFormat::TetGenPoly => "TetGen poly",
            FileFormat::TetGenSMesh => "TetGen smesh",
        }.fmt(f)
    }
}


// ==========================================================================
// ===== Errors
// ==========================================================================

/// The error type of all codecs in this module.
///
/// The actual information is stored in a boxed [`ErrorKind`], which keeps
/// `Result<T, Error>` small.
#[derive(Debug)]
pub struct Error {
    kind: Box<ErrorKind>,
}

impl Error {
    /// Creates a new error. The closure is only called on the cold error path.
    #[cold]
    #[inline(never)]
    pub(crate) fn new(kind: impl FnOnce() -> ErrorKind) -> Self {
        Self {
            kind: Box::new(kind()),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.kind
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.kind.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.kind.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(|| kind)
    }
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Self::new(|| ErrorKind::Io(src))
    }
}

impl From<parse::Error> for Error {
    fn from(src: parse::Error) -> Self {
        Self::new(|| ErrorKind::Parse(src))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(src: quick_xml::Error) -> Self {
        Self::new(|| ErrorKind::Xml(src))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(src: quick_xml::events::attributes::AttrError) -> Self {
        Self::new(|| ErrorKind::Xml(src.into()))
    }
}

impl From<base64::DecodeError> for Error {
    fn from(src: base64::DecodeError) -> Self {
        Self::new(|| ErrorKind::Base64(src))
    }
}

/// All the things that can go wrong while reading or writing a mesh.
#[derive(Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),

    #[fail(display = "parsing error: {}", _0)]
    Parse(#[cause] parse::Error),

    #[fail(display = "XML error: {}", _0)]
    Xml(#[cause] quick_xml::Error),

    #[fail(display = "invalid base64 data: {}", _0)]
    Base64(#[cause] base64::DecodeError),

    #[fail(display = "malformed {} file: {}", format, msg)]
    Malformed {
        format: FileFormat,
        msg: String,
    },

    #[fail(
        display = "{} files only support triangles, but cell {} has {} points",
        format, cell, len
    )]
    NonTriangularFace {
        format: FileFormat,
        cell: usize,
        len: usize,
    },

    #[fail(display = "{} {} out of range (length is {})", what, index, len)]
    IndexOutOfRange {
        what: &'static str,
        index: i64,
        len: usize,
    },

    #[fail(display = "{} has {} entries, expected {}", what, actual, expected)]
    SizeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[fail(display = "invalid GIFTI data array with intent {}: {}", intent, msg)]
    InvalidGiftiArray {
        intent: gifti::Intent,
        msg: String,
    },

    #[fail(display = "file contains no point coordinates")]
    MissingPoints,

    #[fail(display = "unknown GIFTI data type '{}'", _0)]
    UnknownDataType(String),

    #[fail(display = "writing GIFTI files of type '{}' is not supported", _0)]
    UnsupportedGiftiType(String),

    #[fail(display = "unsupported GIFTI encoding '{}'", _0)]
    UnsupportedEncoding(String),

    #[fail(display = "no codec for {} files available", _0)]
    FormatUnavailable(FileFormat),

    #[fail(display = "{} files can only be written, not read", _0)]
    WriteOnlyFormat(FileFormat),
}


// ==========================================================================
// ===== Primitives
// ==========================================================================

/// Represents the type of an IO primitive.
///
/// Data arrays store their values as `f64` but remember the primitive type
/// they were read as (or should be written as).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Uint64,
    Int64,
    Float32,
    Float64,
}

impl PrimitiveType {
    /// Size of one value in bytes.
    pub fn size(&self) -> usize {
        match self {
            PrimitiveType::Uint8 | PrimitiveType::Int8 => 1,
            PrimitiveType::Uint16 | PrimitiveType::Int16 => 2,
            PrimitiveType::Uint32 | PrimitiveType::Int32 | PrimitiveType::Float32 => 4,
            PrimitiveType::Uint64 | PrimitiveType::Int64 | PrimitiveType::Float64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        match self {
            PrimitiveType::Float32 | PrimitiveType::Float64 => true,
            _ => false,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrimitiveType::Uint8 => "u8",
            PrimitiveType::Int8 => "i8",
            PrimitiveType::Uint16 => "u16",
            PrimitiveType::Int16 => "i16",
            PrimitiveType::Uint32 => "u32",
            PrimitiveType::Int32 => "i32",
            PrimitiveType::Uint64 => "u64",
            PrimitiveType::Int64 => "i64",
            PrimitiveType::Float32 => "f32",
            PrimitiveType::Float64 => "f64",
        }.fmt(f)
    }
}

mod internal {
    pub trait DoNotImplement {}
}

/// Abstracts over all IO primitive types.
///
/// This trait is exactly implemented for the types listed in
/// [`PrimitiveType`], so it is a closed set of types. The crate-private
/// supertrait `DoNotImplement` prevents implementations for other types.
pub trait Primitive:
    Copy + Default + fmt::Debug + fmt::Display + FromStr + NumCast + internal::DoNotImplement
{
    /// The type represented as this [`PrimitiveType`] value.
    const TY: PrimitiveType;

    /// Widens the value to `f64`.
    fn to_f64(self) -> f64;

    /// Converts from `f64` like an `as` cast: float to integer conversions
    /// truncate and saturate, `NaN` becomes 0.
    fn from_f64(v: f64) -> Self;

    /// Reads one value from the start of `buf` with byte order `B`.
    fn read_from<B: ByteOrder>(buf: &[u8]) -> Self;

    /// Writes the value to the start of `buf` with byte order `B`.
    fn write_into<B: ByteOrder>(self, buf: &mut [u8]);
}

macro_rules! impl_primitive {
    ($ty:ident, $variant:ident, |$rb:ident| $read:expr, |$wb:ident, $wv:ident| $write:expr) => {
        impl internal::DoNotImplement for $ty {}
        impl Primitive for $ty {
            const TY: PrimitiveType = PrimitiveType::$variant;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(v: f64) -> Self {
                v as $ty
            }

            fn read_from<B: ByteOrder>($rb: &[u8]) -> Self {
                $read
            }

            fn write_into<B: ByteOrder>(self, $wb: &mut [u8]) {
                let $wv = self;
                $write
            }
        }
    };
    ($ty:ident, $variant:ident, $read:ident, $write:ident) => {
        impl_primitive!($ty, $variant, |buf| B::$read(buf), |buf, v| B::$write(buf, v));
    };
}

impl_primitive!(u8, Uint8, |buf| buf[0], |buf, v| buf[0] = v);
impl_primitive!(i8, Int8, |buf| buf[0] as i8, |buf, v| buf[0] = v as u8);
impl_primitive!(u16, Uint16, read_u16, write_u16);
impl_primitive!(i16, Int16, read_i16, write_i16);
impl_primitive!(u32, Uint32, read_u32, write_u32);
impl_primitive!(i32, Int32, read_i32, write_i32);
impl_primitive!(u64, Uint64, read_u64, write_u64);
impl_primitive!(i64, Int64, read_i64, write_i64);
impl_primitive!(f32, Float32, read_f32, write_f32);
impl_primitive!(f64, Float64, read_f64, write_f64);
