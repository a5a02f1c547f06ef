//! In-memory representation of a GIFTI document.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::io::{Error, ErrorKind, FileFormat, Primitive, PrimitiveType};
use super::{Encoding, Endian, IndexOrder, Intent};


/// Runs `$body` with `$v` bound to the values vector of `$data`, whatever its
/// element type is.
macro_rules! dispatch {
    ($data:expr, |$v:ident| $body:expr) => {
        match $data {
            NumericData::Uint8($v) => $body,
            NumericData::Int8($v) => $body,
            NumericData::Uint16($v) => $body,
            NumericData::Int16($v) => $body,
            NumericData::Uint32($v) => $body,
            NumericData::Int32($v) => $body,
            NumericData::Uint64($v) => $body,
            NumericData::Int64($v) => $body,
            NumericData::Float32($v) => $body,
            NumericData::Float64($v) => $body,
        }
    };
}

/// Runs `$body` with the type alias `$t` set to the element type matching
/// the `PrimitiveType` `$ty`.
macro_rules! with_type {
    ($ty:expr, $t:ident => $body:expr) => {
        match $ty {
            PrimitiveType::Uint8 => { type $t = u8; $body }
            PrimitiveType::Int8 => { type $t = i8; $body }
            PrimitiveType::Uint16 => { type $t = u16; $body }
            PrimitiveType::Int16 => { type $t = i16; $body }
            PrimitiveType::Uint32 => { type $t = u32; $body }
            PrimitiveType::Int32 => { type $t = i32; $body }
            PrimitiveType::Uint64 => { type $t = u64; $body }
            PrimitiveType::Int64 => { type $t = i64; $body }
            PrimitiveType::Float32 => { type $t = f32; $body }
            PrimitiveType::Float64 => { type $t = f64; $body }
        }
    };
}

/// A whole GIFTI file: file level metadata and a list of data arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftiImage {
    pub version: String,
    /// Metadata name/value pairs as found in the file, unknown keys included.
    pub meta: Vec<(String, String)>,
    /// Additional attributes of the `<GIFTI>` element.
    pub extra_attrs: Vec<(String, String)>,
    pub data_arrays: Vec<GiftiDataArray>,
}

impl GiftiImage {
    pub fn new() -> Self {
        Self {
            version: "1.0".into(),
            meta: Vec::new(),
            extra_attrs: Vec::new(),
            data_arrays: Vec::new(),
        }
    }

    /// Returns the first data array with the given intent.
    pub fn find(&self, intent: Intent) -> Option<&GiftiDataArray> {
        self.data_arrays.iter().find(|a| a.intent == intent)
    }
}

impl Default for GiftiImage {
    fn default() -> Self {
        Self::new()
    }
}

/// A coordinate system attached to a data array. `matrix` maps from
/// `data_space` to `transformed_space`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordSystem {
    pub data_space: String,
    pub transformed_space: String,
    pub matrix: [[f64; 4]; 4],
}

impl CoordSystem {
    /// A coordinate system with the identity matrix.
    pub fn identity(space: impl Into<String>) -> Self {
        let space = space.into();
        let mut matrix = [[0.0; 4]; 4];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = 1.0;
        }

        Self {
            data_space: space.clone(),
            transformed_space: space,
            matrix,
        }
    }
}

/// One `<DataArray>` with its decoded values.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftiDataArray {
    pub intent: Intent,
    pub order: IndexOrder,
    pub dims: Vec<usize>,
    /// Encoding of the data in the file. Only relevant for writing.
    pub encoding: Encoding,
    pub endian: Endian,
    pub meta: Vec<(String, String)>,
    pub coord_systems: Vec<CoordSystem>,
    pub data: NumericData,
}

impl GiftiDataArray {
    /// Creates a row major array with native byte order and base64 encoding.
    pub fn new(intent: Intent, dims: Vec<usize>, data: NumericData) -> Self {
        Self {
            intent,
            order: IndexOrder::RowMajor,
            dims,
            encoding: Encoding::Base64Binary,
            endian: Endian::native(),
            meta: Vec::new(),
            coord_systems: Vec::new(),
            data,
        }
    }

    pub fn ty(&self) -> PrimitiveType {
        self.data.ty()
    }

    /// Number of values as declared by the dimensions. `None` if the product
    /// of the dimensions does not fit into `usize`.
    pub fn checked_num_values(&self) -> Option<usize> {
        checked_product(&self.dims)
    }

    /// Number of values as declared by the dimensions, saturating at
    /// `usize::MAX`.
    pub fn num_values(&self) -> usize {
        self.checked_num_values().unwrap_or(usize::MAX)
    }

    /// Looks up a metadata value by name.
    pub fn meta_value(&self, name: &str) -> Option<&str> {
        self.meta.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// Copies the `m x n` block of values (`m = dims[0]`) into `dst`, tuple
    /// `i` of the block becoming tuple `indices[i]` of `dst` (or tuple `i`
    /// without indices). `dst` is zeroed first, so tuples not named by
    /// `indices` end up as zero.
    ///
    /// The caller has to make sure that `dst` has `n` components, enough
    /// tuples and that all indices are in bounds.
    pub(crate) fn copy_into(&self, dst: &mut [f64], n: usize, indices: Option<&[usize]>) {
        let m = self.dims.first().copied().unwrap_or(0);
        for v in dst.iter_mut() {
            *v = 0.0;
        }

        dispatch!(&self.data, |src| copy_block(&src[..], m, n, self.order, indices, dst));
    }
}

fn copy_block<T: Primitive>(
    src: &[T],
    m: usize,
    n: usize,
    order: IndexOrder,
    indices: Option<&[usize]>,
    dst: &mut [f64],
) {
    for i in 0..m {
        let row = indices.map(|idx| idx[i]).unwrap_or(i);
        for j in 0..n {
            let v = match order {
                IndexOrder::RowMajor => src[i * n + j],
                IndexOrder::ColumnMajor => src[j * m + i],
            };
            dst[row * n + j] = Primitive::to_f64(v);
        }
    }
}


// ==========================================================================
// ===== Numeric data
// ==========================================================================

/// The decoded values of a data array, in one of the ten GIFTI data types.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericData {
    Uint8(Vec<u8>),
    Int8(Vec<i8>),
    Uint16(Vec<u16>),
    Int16(Vec<i16>),
    Uint32(Vec<u32>),
    Int32(Vec<i32>),
    Uint64(Vec<u64>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Primitives that can be stored in [`NumericData`].
pub(crate) trait Element: Primitive {
    fn wrap(values: Vec<Self>) -> NumericData;
}

macro_rules! impl_element {
    ($($ty:ident => $variant:ident,)*) => {
        $(
            impl Element for $ty {
                fn wrap(values: Vec<Self>) -> NumericData {
                    NumericData::$variant(values)
                }
            }
        )*
    };
}

impl_element! {
    u8 => Uint8,
    i8 => Int8,
    u16 => Uint16,
    i16 => Int16,
    u32 => Uint32,
    i32 => Int32,
    u64 => Uint64,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
}

impl NumericData {
    /// Converts `values` to the given type (like an `as` cast).
    pub fn from_f64(ty: PrimitiveType, values: &[f64]) -> Self {
        with_type!(ty, T => T::wrap(values.iter().map(|&v| T::from_f64(v)).collect()))
    }

    pub fn ty(&self) -> PrimitiveType {
        fn ty_of<T: Primitive>(_: &[T]) -> PrimitiveType {
            T::TY
        }
        dispatch!(self, |v| ty_of(&v[..]))
    }

    pub fn len(&self) -> usize {
        dispatch!(self, |v| v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the `i`-th value widened to `f64`.
    pub fn get(&self, i: usize) -> f64 {
        dispatch!(self, |v| v[i].to_f64())
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        dispatch!(self, |v| v.iter().map(|x| x.to_f64()).collect())
    }

    /// Returns the values if they are stored as `f32`.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            NumericData::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            NumericData::Int32(v) => Some(v),
            _ => None,
        }
    }

    // ----- Decoding ---------------------------------------------------------

    /// Decodes the text content of a `<Data>` element.
    pub(crate) fn decode(
        ty: PrimitiveType,
        encoding: Encoding,
        endian: Endian,
        text: &str,
    ) -> Result<Self, Error> {
        match encoding {
            Encoding::Ascii => Self::parse_ascii(ty, text),
            Encoding::Base64Binary => {
                let bytes = decode_base64(text)?;
                Self::from_bytes(ty, endian, &bytes)
            }
            Encoding::GZipBase64Binary => {
                let bytes = inflate(&decode_base64(text)?)?;
                Self::from_bytes(ty, endian, &bytes)
            }
            Encoding::ExternalFileBinary => Err(Error::new(|| {
                ErrorKind::UnsupportedEncoding(encoding.name().to_string())
            })),
        }
    }

    fn parse_ascii(ty: PrimitiveType, text: &str) -> Result<Self, Error> {
        with_type!(ty, T => {
            let values = text.split_whitespace()
                .map(|token| token.parse::<T>().map_err(|_| malformed(format!(
                    "invalid {} value '{}' in ASCII data",
                    ty,
                    token,
                ))))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(T::wrap(values))
        })
    }

    fn from_bytes(ty: PrimitiveType, endian: Endian, bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() % ty.size() != 0 {
            return Err(malformed(format!(
                "binary data of {} bytes is not a multiple of the {} size",
                bytes.len(),
                ty,
            )));
        }

        fn decode<T: Element, B: ByteOrder>(bytes: &[u8]) -> NumericData {
            T::wrap(bytes.chunks_exact(T::TY.size()).map(T::read_from::<B>).collect())
        }

        let out = with_type!(ty, T => match endian {
            Endian::Little => decode::<T, LittleEndian>(bytes),
            Endian::Big => decode::<T, BigEndian>(bytes),
        });
        Ok(out)
    }

    // ----- Encoding ---------------------------------------------------------

    /// Encodes the values as text content of a `<Data>` element. For ASCII,
    /// `row_len` values are written per line.
    pub(crate) fn encode(
        &self,
        encoding: Encoding,
        endian: Endian,
        row_len: usize,
    ) -> Result<String, Error> {
        match encoding {
            Encoding::Ascii => Ok(self.to_ascii(row_len)),
            Encoding::Base64Binary => Ok(BASE64.encode(self.to_bytes(endian))),
            Encoding::GZipBase64Binary => Ok(BASE64.encode(deflate(&self.to_bytes(endian))?)),
            Encoding::ExternalFileBinary => Err(Error::new(|| {
                ErrorKind::UnsupportedEncoding(encoding.name().to_string())
            })),
        }
    }

    fn to_ascii(&self, row_len: usize) -> String {
        use std::fmt::Write as _;

        let row_len = row_len.max(1);
        let mut out = String::new();
        dispatch!(self, |values| {
            for row in values.chunks(row_len) {
                for (j, v) in row.iter().enumerate() {
                    if j > 0 {
                        out.push(' ');
                    }
                    // Writing into a `String` cannot fail.
                    let _ = write!(out, "{}", v);
                }
                out.push('\n');
            }
        });

        out
    }

    fn to_bytes(&self, endian: Endian) -> Vec<u8> {
        fn encode<T: Primitive, B: ByteOrder>(values: &[T]) -> Vec<u8> {
            let size = T::TY.size();
            let mut out = vec![0; values.len() * size];
            for (chunk, v) in out.chunks_exact_mut(size).zip(values) {
                v.write_into::<B>(chunk);
            }
            out
        }

        dispatch!(self, |v| match endian {
            Endian::Little => encode::<_, LittleEndian>(&v[..]),
            Endian::Big => encode::<_, BigEndian>(&v[..]),
        })
    }
}

fn decode_base64(text: &str) -> Result<Vec<u8>, Error> {
    // Line breaks inside the data are common.
    let compact = text.split_ascii_whitespace().collect::<String>();
    Ok(BASE64.decode(compact)?)
}

#[cfg(feature = "gzip")]
fn inflate(bytes: &[u8]) -> Result<Vec<u8>, Error> {
    use std::io::Read;

    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(not(feature = "gzip"))]
fn inflate(_: &[u8]) -> Result<Vec<u8>, Error> {
    Err(Error::new(|| {
        ErrorKind::UnsupportedEncoding(Encoding::GZipBase64Binary.name().to_string())
    }))
}

#[cfg(feature = "gzip")]
fn deflate(bytes: &[u8]) -> Result<Vec<u8>, Error> {
    use std::io::Write;

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

#[cfg(not(feature = "gzip"))]
fn deflate(_: &[u8]) -> Result<Vec<u8>, Error> {
    Err(Error::new(|| {
        ErrorKind::UnsupportedEncoding(Encoding::GZipBase64Binary.name().to_string())
    }))
}

/// Product of `dims`, zero without dimensions and `None` on overflow.
pub(crate) fn checked_product(dims: &[usize]) -> Option<usize> {
    if dims.is_empty() {
        return Some(0);
    }
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

pub(crate) fn malformed(msg: impl Into<String>) -> Error {
    let msg = msg.into();
    Error::new(|| ErrorKind::Malformed {
        format: FileFormat::Gifti,
        msg,
    })
}
