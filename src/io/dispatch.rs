//! Choosing a codec by file extension.

use std::{path::Path, process};

use cgmath::Point3;

use crate::mesh::PolyMesh;
use super::{dfs, gifti, off, tetgen, Error, ErrorKind, FileFormat};


/// Options for [`read_mesh`] and [`Dispatcher::read`].
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// If set, a failed read or a mesh without points prints a diagnostic to
    /// stderr and terminates the process with exit code 1 instead of
    /// returning.
    pub exit_on_failure: bool,
}

impl ReadOptions {
    pub fn exit_on_failure(self) -> Self {
        Self { exit_on_failure: true, .. self }
    }
}

/// Options for [`write_mesh`] and [`Dispatcher::write`].
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Compress binary data where the format supports it (GIFTI).
    pub compress: bool,
    /// Prefer a text encoding where the format has one (GIFTI).
    pub ascii: bool,
    /// Points inside holes of the domain (TetGen `.poly`/`.smesh`).
    pub holes: Vec<Point3<f64>>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compress: true,
            ascii: false,
            holes: Vec::new(),
        }
    }
}

/// Reads and writes the formats this crate has no codec for (VTK, STL, PLY
/// and OBJ). Implement this to plug in another mesh library.
pub trait ExternalCodec {
    fn read(&self, format: FileFormat, path: &Path) -> Result<PolyMesh, Error>;

    fn write(
        &self,
        format: FileFormat,
        path: &Path,
        mesh: &PolyMesh,
        options: &WriteOptions,
    ) -> Result<(), Error>;
}

/// The default [`ExternalCodec`]: every external format is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalCodec;

impl ExternalCodec for NoExternalCodec {
    fn read(&self, format: FileFormat, _: &Path) -> Result<PolyMesh, Error> {
        Err(Error::new(|| ErrorKind::FormatUnavailable(format)))
    }

    fn write(&self, format: FileFormat, _: &Path, _: &PolyMesh, _: &WriteOptions) -> Result<(), Error> {
        Err(Error::new(|| ErrorKind::FormatUnavailable(format)))
    }
}

/// Routes reads and writes to the codec matching the file extension.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher<C: ExternalCodec = NoExternalCodec> {
    external: C,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: ExternalCodec> Dispatcher<C> {
    /// Uses `external` for all formats without built-in codec.
    pub fn with_external(external: C) -> Self {
        Self { external }
    }

    /// Reads the mesh at `path`, see [`read_mesh`].
    pub fn read(&self, path: impl AsRef<Path>, options: &ReadOptions) -> Result<PolyMesh, Error> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path);
        log::debug!("reading '{}' as {} file", path.display(), format);

        let res = match format {
            FileFormat::Dfs => dfs::read_file(path),
            FileFormat::Off => off::read_file(path),
            FileFormat::Gifti => gifti::read_file(path),
            f if f.is_write_only() => Err(Error::new(|| ErrorKind::WriteOnlyFormat(f))),
            f => self.external.read(f, path),
        };

        if options.exit_on_failure {
            let readable = match &res {
                Ok(mesh) => mesh.num_points() > 0,
                Err(e) => {
                    log::debug!("reading '{}' failed: {}", path.display(), e);
                    false
                }
            };
            if !readable {
                eprintln!(
                    "Error: File '{}' either contains no points or could not be read!",
                    path.display(),
                );
                process::exit(1);
            }
        }

        res
    }

    /// Writes `mesh` to `path`, see [`write_mesh`].
    pub fn write(
        &self,
        path: impl AsRef<Path>,
        mesh: &PolyMesh,
        options: &WriteOptions,
    ) -> Result<(), Error> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path);
        log::debug!("writing '{}' as {} file", path.display(), format);

        match format {
            FileFormat::Dfs => dfs::write_file(path, mesh),
            FileFormat::Off => off::write_file(path, mesh),
            FileFormat::Gifti => gifti::write_file(path, mesh, options.compress, options.ascii),
            FileFormat::TetGenNode => tetgen::write_file(path, mesh, tetgen::Kind::Node, &options.holes),
            FileFormat::TetGenPoly => tetgen::write_file(path, mesh, tetgen::Kind::Poly, &options.holes),
            FileFormat::TetGenSMesh => {
                tetgen::write_file(path, mesh, tetgen::Kind::SMesh, &options.holes)
            }
            f => self.external.write(f, path, mesh, options),
        }
    }
}

/// Reads the mesh at `path` with the codec selected by the file extension.
///
/// VTK, STL, PLY and OBJ files need an [`ExternalCodec`] (see
/// [`Dispatcher::with_external`]); here they fail with
/// `ErrorKind::FormatUnavailable`.
pub fn read_mesh(path: impl AsRef<Path>, options: &ReadOptions) -> Result<PolyMesh, Error> {
    Dispatcher::new().read(path, options)
}

/// Writes `mesh` to `path` with the codec selected by the file extension.
pub fn write_mesh(
    path: impl AsRef<Path>,
    mesh: &PolyMesh,
    options: &WriteOptions,
) -> Result<(), Error> {
    Dispatcher::new().write(path, mesh, options)
}
