use std::{fs, time::Instant};

use failure::{Error, ResultExt};
use surfio::{
    io::{write_mesh, FileFormat, WriteOptions},
    PolyMesh,
};

use crate::{
    args::ConvertArgs,
    commands::{info::MeshInfo, load_mesh},
    ui::{self, Step},
};


pub fn run(args: &ConvertArgs) -> Result<(), Error> {
    let start_time = Instant::now();

    let (mesh, load_time) = load_mesh(&args.source).context("could not read source file")?;

    if !args.quiet {
        info!("Mesh information:");
        println!();
        MeshInfo::about_mesh(&mesh).print(false);
        println!();
    }

    let before_write = Instant::now();
    write_file(args, &mesh).context("could not write target file")?;
    let write_time = before_write.elapsed();

    info!(
        "Processing time: {:.2?} ({:.2?} loading, {:.2?} writing)",
        start_time.elapsed(),
        load_time,
        write_time,
    );

    Ok(())
}

fn write_file(args: &ConvertArgs, mesh: &PolyMesh) -> Result<(), Error> {
    let format = FileFormat::from_path(&args.target);

    if !args.holes.is_empty() && format != FileFormat::TetGenPoly && format != FileFormat::TetGenSMesh {
        warn!("Hole points are only written to TetGen poly and smesh files, ignoring them");
    }

    let options = WriteOptions {
        compress: !args.no_compress,
        ascii: args.ascii,
        holes: args.holes.clone(),
    };

    let step = Step::start(format!("Writing {} file '{}'", format, args.target));
    write_mesh(&args.target, mesh, &options)?;
    let size = fs::metadata(&args.target).map(|m| m.len()).unwrap_or(0);
    step.done(&format!("{} bytes", ui::fmt_with_thousand_sep(size)));

    Ok(())
}
