use std::time::Duration;

use failure::{Error, ResultExt};
use surfio::{
    io::{read_mesh, FileFormat, ReadOptions},
    mesh::CellKind,
    PolyMesh,
};

use crate::ui::{self, Step};


pub mod convert;
pub mod info;


/// Reads the mesh at `path`. Fails for write-only formats before touching the
/// file.
fn load_mesh(path: &str) -> Result<(PolyMesh, Duration), Error> {
    let format = FileFormat::from_path(path);
    if format.is_write_only() {
        return Err(failure::err_msg(format!(
            "'{}' is a {} file, which can only be written",
            path,
            format,
        )));
    }

    let step = Step::start(format!("Reading {} file '{}'", format, path));
    let mesh = read_mesh(path, &ReadOptions::default())
        .context(format!("failed to read '{}'", path))?;
    let time = step.done(&summary(&mesh));

    Ok((mesh, time))
}

/// Short description of the size of a mesh, like `1,024 points, 2,044 polys`.
/// Empty cell groups are left out.
fn summary(mesh: &PolyMesh) -> String {
    let mut parts = vec![format!("{} points", ui::fmt_with_thousand_sep(mesh.num_points() as u64))];
    for &kind in CellKind::ALL.iter() {
        let n = mesh.cells_of(kind).len();
        if n > 0 {
            parts.push(format!("{} {}", ui::fmt_with_thousand_sep(n as u64), kind.name()));
        }
    }
    parts.join(", ")
}
