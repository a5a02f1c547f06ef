//! Command line arguments of the `surfio` binary.

use cgmath::Point3;
use structopt::StructOpt;


/// Reads, inspects and converts surface meshes (DFS, OFF, GIFTI, TetGen).
#[derive(StructOpt, Debug)]
#[structopt(name = "surfio", setting = structopt::clap::AppSettings::VersionlessSubcommands)]
pub struct Args {
    /// Show log messages of the library: `-v` for debug, `-vv` for trace.
    #[structopt(short = "v", long = "verbose", parse(from_occurrences), global = true)]
    pub verbosity: u8,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(StructOpt, Debug)]
pub enum Command {
    /// Shows points, cells and point data arrays of a mesh file.
    #[structopt(name = "info")]
    Info(InfoArgs),

    /// Reads a mesh file and writes it in the format of the target extension.
    #[structopt(name = "convert")]
    Convert(ConvertArgs),
}

#[derive(StructOpt, Debug)]
pub struct ConvertArgs {
    /// Mesh file to read. The format is determined by the
    /// extension: dfs, off, gii (plus vtk, vtp, stl, ply and obj if an
    /// external codec is available).
    #[structopt(name = "SOURCE")]
    pub source: String,

    /// Mesh file to write. The format is determined by the
    /// extension. Additionally to the readable formats, the TetGen formats
    /// node, poly and smesh can be written. For GIFTI, `<name>.<type>.gii`
    /// restricts what is written (e.g. `surf`, `coord`, `topo`, `shape`).
    #[structopt(name = "TARGET")]
    pub target: String,

    /// Write GIFTI data arrays as ASCII instead of base64.
    #[structopt(long = "ascii")]
    pub ascii: bool,

    /// Don't compress binary GIFTI data arrays.
    #[structopt(long = "no-compress")]
    pub no_compress: bool,

    /// A point inside a hole of the domain, as `x,y,z`. Written to TetGen
    /// poly and smesh files. Can be given multiple times.
    #[structopt(long = "hole", number_of_values = 1, parse(try_from_str = parse_point))]
    pub holes: Vec<Point3<f64>>,

    /// Don't show the summary table of the source mesh.
    #[structopt(long = "quiet", short = "q")]
    pub quiet: bool,
}

#[derive(StructOpt, Debug)]
pub struct InfoArgs {
    /// Mesh file to inspect (dfs, off or gii).
    #[structopt(name = "FILE")]
    pub path: String,

    /// Also list the metadata of the mesh and its data arrays.
    #[structopt(short = "m", long = "meta")]
    pub meta: bool,
}

fn parse_point(src: &str) -> Result<Point3<f64>, String> {
    let coords = src.split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate in '{}': {}", src, e))?;

    match coords[..] {
        [x, y, z] => Ok(Point3::new(x, y, z)),
        _ => Err(format!("expected three comma separated coordinates, found '{}'", src)),
    }
}
