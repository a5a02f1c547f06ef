//! The XML layer: parsing a [`GiftiImage`] from text and writing it back.

use std::{io::Write, str};

use quick_xml::{
    escape::escape,
    events::{BytesStart, Event},
    Reader,
};

use crate::io::{Error, ErrorKind, PrimitiveType};
use super::{
    image::{checked_product, malformed, CoordSystem, GiftiDataArray, GiftiImage, NumericData},
    parse_nifti_type, nifti_type_name, Encoding, Endian, IndexOrder, Intent,
};


const DOCTYPE: &str = r#"<!DOCTYPE GIFTI SYSTEM "http://www.nitrc.org/frs/download.php/115/gifti.dtd">"#;

/// Indentation of one nesting level.
const INDENT: &str = "   ";


// ==========================================================================
// ===== Parsing
// ==========================================================================

/// Parses a whole GIFTI document.
pub(crate) fn parse_image(text: &str) -> Result<GiftiImage, Error> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut parser = Parser::default();
    let mut stack = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = local_name(&e);
                parser.start(&name, &e)?;
                stack.push(name);
                text.clear();
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                parser.start(&name, &e)?;
                parser.end(&name, stack.last().map(|s: &String| s.as_str()), "")?;
            }
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => {
                let s = str::from_utf8(&e).map_err(|_| malformed("CDATA is not valid UTF-8"))?;
                text.push_str(s);
            }
            Event::End(_) => {
                // quick-xml already checks that start and end tags match.
                if let Some(name) = stack.pop() {
                    parser.end(&name, stack.last().map(|s| s.as_str()), &text)?;
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    parser.finish()
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, Error> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        out.push((key, value));
    }

    Ok(out)
}

/// A data array whose `<Data>` element may not have been seen yet.
#[derive(Debug)]
struct PartialArray {
    intent: Intent,
    ty: PrimitiveType,
    order: IndexOrder,
    dims: Vec<usize>,
    encoding: Encoding,
    endian: Endian,
    meta: Vec<(String, String)>,
    coord_systems: Vec<CoordSystem>,
    data: Option<NumericData>,
}

#[derive(Debug, Default)]
struct PartialCoordSystem {
    data_space: String,
    transformed_space: String,
    matrix: Option<[[f64; 4]; 4]>,
}

#[derive(Debug, Default)]
struct Parser {
    image: Option<GiftiImage>,
    declared_arrays: Option<usize>,
    array: Option<PartialArray>,
    coord_system: Option<PartialCoordSystem>,
    md: Option<(String, String)>,
}

impl Parser {
    fn image(&mut self) -> Result<&mut GiftiImage, Error> {
        self.image.as_mut().ok_or_else(|| malformed("root element is not <GIFTI>"))
    }

    fn start(&mut self, name: &str, e: &BytesStart<'_>) -> Result<(), Error> {
        match name {
            "GIFTI" => {
                let mut image = GiftiImage::new();
                for (key, value) in attributes(e)? {
                    match key.as_str() {
                        "Version" => image.version = value,
                        "NumberOfDataArrays" => self.declared_arrays = value.trim().parse().ok(),
                        _ => image.extra_attrs.push((key, value)),
                    }
                }
                self.image = Some(image);
            }
            "DataArray" => {
                self.image()?;
                self.array = Some(parse_array_header(&attributes(e)?)?);
            }
            "CoordinateSystemTransformMatrix" => {
                self.coord_system = Some(PartialCoordSystem::default());
            }
            "MD" => self.md = Some((String::new(), String::new())),
            _ => {}
        }

        Ok(())
    }

    fn end(&mut self, name: &str, parent: Option<&str>, text: &str) -> Result<(), Error> {
        match (name, parent) {
            ("Name", Some("MD")) => {
                if let Some(md) = &mut self.md {
                    md.0 = text.trim().to_string();
                }
            }
            ("Value", Some("MD")) => {
                if let Some(md) = &mut self.md {
                    md.1 = text.to_string();
                }
            }
            ("MD", _) => {
                if let Some(pair) = self.md.take().filter(|(n, _)| !n.is_empty()) {
                    match &mut self.array {
                        Some(array) => array.meta.push(pair),
                        None => self.image()?.meta.push(pair),
                    }
                }
            }

            ("DataSpace", _) | ("TransformedSpace", _) | ("MatrixData", _) => {
                if let Some(cs) = &mut self.coord_system {
                    match name {
                        "DataSpace" => cs.data_space = text.trim().to_string(),
                        "TransformedSpace" => cs.transformed_space = text.trim().to_string(),
                        _ => cs.matrix = Some(parse_matrix(text)?),
                    }
                }
            }
            ("CoordinateSystemTransformMatrix", _) => {
                if let (Some(cs), Some(array)) = (self.coord_system.take(), &mut self.array) {
                    array.coord_systems.push(CoordSystem {
                        data_space: cs.data_space,
                        transformed_space: cs.transformed_space,
                        matrix: cs.matrix.unwrap_or_else(|| CoordSystem::identity("").matrix),
                    });
                }
            }

            ("Data", _) => {
                if let Some(array) = &mut self.array {
                    let data = NumericData::decode(array.ty, array.encoding, array.endian, text)?;
                    array.data = Some(data);
                }
            }
            ("DataArray", _) => {
                if let Some(partial) = self.array.take() {
                    let index = self.image()?.data_arrays.len();
                    let array = finish_array(partial, index)?;
                    self.image()?.data_arrays.push(array);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn finish(self) -> Result<GiftiImage, Error> {
        let image = self.image.ok_or_else(|| malformed("missing <GIFTI> root element"))?;
        if let Some(n) = self.declared_arrays {
            if n != image.data_arrays.len() {
                log::warn!(
                    "GIFTI file declares {} data arrays, but contains {}",
                    n,
                    image.data_arrays.len(),
                );
            }
        }

        Ok(image)
    }
}

fn parse_array_header(attrs: &[(String, String)]) -> Result<PartialArray, Error> {
    let get = |name: &str| attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

    let intent = match get("Intent") {
        Some(s) => Intent::from_name(s)
            .ok_or_else(|| malformed(format!("unknown intent '{}'", s)))?,
        None => Intent::NONE,
    };

    let ty = get("DataType").ok_or_else(|| malformed("data array without DataType"))?;
    let ty = parse_nifti_type(ty)
        .ok_or_else(|| Error::new(|| ErrorKind::UnknownDataType(ty.to_string())))?;

    let order = match get("ArrayIndexingOrder") {
        Some(s) => IndexOrder::from_name(s)
            .ok_or_else(|| malformed(format!("unknown index order '{}'", s)))?,
        None => IndexOrder::RowMajor,
    };

    let num_dims = get("Dimensionality")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .ok_or_else(|| malformed("data array without valid Dimensionality"))?;
    let dims = (0..num_dims)
        .map(|i| {
            get(&format!("Dim{}", i))
                .and_then(|s| s.trim().parse::<usize>().ok())
                .ok_or_else(|| malformed(format!("data array without valid Dim{}", i)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if checked_product(&dims).is_none() {
        return Err(malformed(format!("data array dimensions {:?} are too large", dims)));
    }

    let encoding = match get("Encoding") {
        Some(s) => Encoding::from_name(s)
            .ok_or_else(|| Error::new(|| ErrorKind::UnsupportedEncoding(s.to_string())))?,
        None => Encoding::Ascii,
    };

    let endian = match get("Endian") {
        Some(s) if !s.trim().is_empty() => Endian::from_name(s)
            .ok_or_else(|| malformed(format!("unknown endianness '{}'", s)))?,
        _ => Endian::native(),
    };

    Ok(PartialArray {
        intent,
        ty,
        order,
        dims,
        encoding,
        endian,
        meta: Vec::new(),
        coord_systems: Vec::new(),
        data: None,
    })
}

fn finish_array(partial: PartialArray, index: usize) -> Result<GiftiDataArray, Error> {
    let data = match partial.data {
        Some(data) => data,
        None => NumericData::from_f64(partial.ty, &[]),
    };

    let mut array = GiftiDataArray {
        intent: partial.intent,
        order: partial.order,
        dims: partial.dims,
        encoding: partial.encoding,
        endian: partial.endian,
        meta: partial.meta,
        coord_systems: partial.coord_systems,
        data,
    };

    if array.data.len() != array.num_values() {
        return Err(Error::new(|| ErrorKind::SizeMismatch {
            what: format!("GIFTI data array {} ({})", index, array.intent),
            expected: array.num_values(),
            actual: array.data.len(),
        }));
    }

    // The data is stored in native order from now on.
    array.endian = Endian::native();
    Ok(array)
}

fn parse_matrix(text: &str) -> Result<[[f64; 4]; 4], Error> {
    let values = text.split_whitespace()
        .map(|s| s.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| malformed("invalid number in MatrixData"))?;

    if values.len() != 16 {
        return Err(malformed(format!("MatrixData has {} values, expected 16", values.len())));
    }

    let mut out = [[0.0; 4]; 4];
    for (i, v) in values.into_iter().enumerate() {
        out[i / 4][i % 4] = v;
    }

    Ok(out)
}


// ==========================================================================
// ===== Writing
// ==========================================================================

/// Writes the whole document.
pub(crate) fn write_image(image: &GiftiImage, mut w: impl Write) -> Result<(), Error> {
    let w = &mut w;

    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(w, "{}", DOCTYPE)?;
    write!(
        w,
        r#"<GIFTI Version="{}" NumberOfDataArrays="{}""#,
        escape(image.version.as_str()),
        image.data_arrays.len(),
    )?;
    for (key, value) in &image.extra_attrs {
        write!(w, "\n       {}=\"{}\"", key, escape(value.as_str()))?;
    }
    writeln!(w, ">")?;

    write_meta(w, &image.meta, 1)?;
    writeln!(w, "{}<LabelTable/>", INDENT)?;
    for array in &image.data_arrays {
        write_array(w, array)?;
    }
    writeln!(w, "</GIFTI>")?;

    Ok(())
}

fn write_meta(w: &mut impl Write, meta: &[(String, String)], level: usize) -> Result<(), Error> {
    let indent = INDENT.repeat(level);
    if meta.is_empty() {
        writeln!(w, "{}<MetaData/>", indent)?;
        return Ok(());
    }

    writeln!(w, "{}<MetaData>", indent)?;
    for (name, value) in meta {
        writeln!(w, "{}{}<MD>", indent, INDENT)?;
        writeln!(w, "{}{}{}<Name>{}</Name>", indent, INDENT, INDENT, cdata(name))?;
        writeln!(w, "{}{}{}<Value>{}</Value>", indent, INDENT, INDENT, cdata(value))?;
        writeln!(w, "{}{}</MD>", indent, INDENT)?;
    }
    writeln!(w, "{}</MetaData>", indent)?;

    Ok(())
}

fn write_array(w: &mut impl Write, array: &GiftiDataArray) -> Result<(), Error> {
    const ATTR_INDENT: &str = "              ";

    writeln!(w, "{}<DataArray Intent=\"{}\"", INDENT, array.intent)?;
    writeln!(w, "{}DataType=\"{}\"", ATTR_INDENT, nifti_type_name(array.ty()))?;
    writeln!(w, "{}ArrayIndexingOrder=\"{}\"", ATTR_INDENT, array.order.name())?;
    writeln!(w, "{}Dimensionality=\"{}\"", ATTR_INDENT, array.dims.len())?;
    for (i, dim) in array.dims.iter().enumerate() {
        writeln!(w, "{}Dim{}=\"{}\"", ATTR_INDENT, i, dim)?;
    }
    writeln!(w, "{}Encoding=\"{}\"", ATTR_INDENT, array.encoding.name())?;
    writeln!(w, "{}Endian=\"{}\"", ATTR_INDENT, array.endian.name())?;
    writeln!(w, "{}ExternalFileName=\"\"", ATTR_INDENT)?;
    writeln!(w, "{}ExternalFileOffset=\"\">", ATTR_INDENT)?;

    write_meta(w, &array.meta, 2)?;

    let indent = INDENT.repeat(2);
    for cs in &array.coord_systems {
        writeln!(w, "{}<CoordinateSystemTransformMatrix>", indent)?;
        writeln!(w, "{}{}<DataSpace>{}</DataSpace>", indent, INDENT, cdata(&cs.data_space))?;
        writeln!(
            w,
            "{}{}<TransformedSpace>{}</TransformedSpace>",
            indent,
            INDENT,
            cdata(&cs.transformed_space),
        )?;
        writeln!(w, "{}{}<MatrixData>", indent, INDENT)?;
        for row in &cs.matrix {
            writeln!(
                w,
                "{}{}{}{:.6} {:.6} {:.6} {:.6}",
                indent, INDENT, INDENT, row[0], row[1], row[2], row[3],
            )?;
        }
        writeln!(w, "{}{}</MatrixData>", indent, INDENT)?;
        writeln!(w, "{}</CoordinateSystemTransformMatrix>", indent)?;
    }

    let row_len = array.dims.iter().skip(1).product::<usize>();
    let data = array.data.encode(array.encoding, array.endian, row_len)?;
    if array.encoding == Encoding::Ascii {
        writeln!(w, "{}<Data>", indent)?;
        write!(w, "{}", data)?;
        writeln!(w, "{}</Data>", indent)?;
    } else {
        writeln!(w, "{}<Data>{}</Data>", indent, data)?;
    }

    writeln!(w, "{}</DataArray>", INDENT)?;

    Ok(())
}

/// Wraps `s` in a CDATA section. A `]]>` inside `s` is split across two
/// sections.
fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", s.replace("]]>", "]]]]><![CDATA[>"))
}
