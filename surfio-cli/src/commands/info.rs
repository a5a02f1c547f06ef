use std::iter;

use failure::Error;
use term_painter::{Color, ToStyle};
use surfio::{
    mesh::{Attribute, CellKind},
    MetaData, PolyMesh,
};

use crate::{
    args::InfoArgs,
    commands::load_mesh,
    ui,
};


pub fn run(args: &InfoArgs) -> Result<(), Error> {
    let (mesh, _) = load_mesh(&args.path)?;

    println!();
    MeshInfo::about_mesh(&mesh).print(args.meta);

    Ok(())
}

/// Everything we print about a mesh.
#[derive(Debug)]
pub struct MeshInfo {
    num_points: usize,
    cells: Vec<(CellKind, usize, usize)>,
    arrays: Vec<ArrayInfo>,
    meta: Vec<(String, String)>,
}

#[derive(Debug)]
struct ArrayInfo {
    name: String,
    ty: String,
    num_components: usize,
    active: Vec<&'static str>,
    meta: Vec<(String, String)>,
}

fn meta_pairs(meta: &MetaData) -> Vec<(String, String)> {
    meta.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

impl MeshInfo {
    pub fn about_mesh(mesh: &PolyMesh) -> Self {
        let pd = &mesh.point_data;
        let attributes = [
            (Attribute::Scalars, "scalars"),
            (Attribute::Vectors, "vectors"),
            (Attribute::Normals, "normals"),
            (Attribute::TCoords, "tcoords"),
        ];

        let arrays = pd.arrays().iter().enumerate().map(|(i, a)| ArrayInfo {
            name: a.name().to_string(),
            ty: a.ty().to_string(),
            num_components: a.num_components(),
            active: attributes.iter()
                .filter(|(attr, _)| pd.active_index(*attr) == Some(i))
                .map(|(_, name)| *name)
                .collect(),
            meta: meta_pairs(a.info()),
        }).collect();

        Self {
            num_points: mesh.num_points(),
            cells: CellKind::ALL.iter()
                .map(|&k| (k, mesh.cells_of(k).len(), mesh.cells_of(k).max_cell_size()))
                .collect(),
            arrays,
            meta: meta_pairs(&mesh.info),
        }
    }

    /// Pretty prints all the information.
    pub fn print(&self, with_meta: bool) {
        let count_style = Color::Green.bold();
        let label_style = Color::White.bold();

        // ----- Points and cells --------------------------------------------
        println!(
            " {: <8} {}",
            label_style.paint("points"),
            count_style.paint(ui::fmt_with_thousand_sep(self.num_points as u64)),
        );
        for &(kind, count, max_size) in &self.cells {
            if count == 0 {
                println!(" {: <8} {}", label_style.paint(kind), Color::White.dim().paint("-"));
            } else {
                println!(
                    " {: <8} {} (up to {} points each)",
                    label_style.paint(kind),
                    count_style.paint(ui::fmt_with_thousand_sep(count as u64)),
                    max_size,
                );
            }
        }

        // ----- Point data table --------------------------------------------
        if !self.arrays.is_empty() {
            println!();
            self.print_array_table();
        }

        // ----- Metadata ----------------------------------------------------
        if with_meta {
            println!();
            print_meta("mesh", &self.meta);
            for array in &self.arrays {
                print_meta(&format!("array '{}'", array.name), &array.meta);
            }
        }
    }

    fn print_array_table(&self) {
        let header = ["point data", "type", "components", "active"];
        let rows = self.arrays.iter().map(|a| vec![
            a.name.clone(),
            a.ty.clone(),
            a.num_components.to_string(),
            if a.active.is_empty() { "-".to_string() } else { a.active.join(", ") },
        ]).collect::<Vec<_>>();

        let col_widths = (0..header.len()).map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        }).collect::<Vec<_>>();

        for (col, title) in header.iter().enumerate() {
            print!(" {: ^1$} ", title, col_widths[col]);
            if col + 1 < header.len() {
                print!("│");
            }
        }
        println!();

        for (col, width) in col_widths.iter().enumerate() {
            print!("{}", iter::repeat('─').take(width + 2).collect::<String>());
            if col + 1 < header.len() {
                print!("┼");
            }
        }
        println!();

        let name_style = Color::White.bold();
        let prop_style = Color::BrightBlue.bold();
        for row in &rows {
            print!(" {} │", name_style.paint(format!("{: <1$}", row[0], col_widths[0])));
            print!(" {} │", prop_style.paint(format!("{: >1$}", row[1], col_widths[1])));
            print!(" {: >1$} │", row[2], col_widths[2]);
            println!(" {: <1$}", row[3], col_widths[3]);
        }
    }
}

fn print_meta(title: &str, meta: &[(String, String)]) {
    if meta.is_empty() {
        return;
    }

    println!(" {}:", Color::White.bold().paint(title));
    for (key, value) in meta {
        println!("   {} = {}", Color::BrightBlue.paint(key), value);
    }
}
