use super::traits::MoleculeFile;
use crate::core::error::GeometryError;
use crate::core::models::atom::Atom;
use crate::core::models::builder::MoleculeBuilder;
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Errors for Gaussian input file parsing and serialization.
#[derive(Debug, Error)]
pub enum GjfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Everything a Gaussian input file carries besides the geometry, kept so
/// a read-edit-write cycle reproduces a submittable job file.
#[derive(Debug, Clone, PartialEq)]
pub struct GjfMetadata {
    /// Link0 (`%...`) and route (`#...`) lines, verbatim.
    pub route_lines: Vec<String>,
    /// The title section.
    pub title: String,
    pub charge: i32,
    pub multiplicity: i32,
    /// Lines after the connectivity block (basis set specs, mod redundant
    /// sections), verbatim.
    pub trailing: Vec<String>,
}

impl Default for GjfMetadata {
    fn default() -> Self {
        Self {
            route_lines: vec!["#p opt geom=connectivity".to_string()],
            title: "generated structure".to_string(),
            charge: 0,
            multiplicity: 1,
            trailing: Vec::new(),
        }
    }
}

/// Gaussian input (`.gjf`) adapter: link0/route section, title,
/// charge/multiplicity, Cartesian geometry block, and the
/// `geom=connectivity` bond block.
pub struct GjfFile;

impl GjfFile {
    fn parse_charge_line(line: &str, line_no: usize) -> Result<(i32, i32), GjfError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(GjfError::Parse {
                line: line_no,
                message: format!("expected 'charge multiplicity', got '{}'", line.trim()),
            });
        }
        let charge = parts[0].parse().map_err(|_| GjfError::Parse {
            line: line_no,
            message: format!("invalid charge '{}'", parts[0]),
        })?;
        let multiplicity = parts[1].parse().map_err(|_| GjfError::Parse {
            line: line_no,
            message: format!("invalid multiplicity '{}'", parts[1]),
        })?;
        Ok((charge, multiplicity))
    }

    fn parse_geometry_line(
        builder: &mut MoleculeBuilder,
        line: &str,
        line_no: usize,
    ) -> Result<(), GjfError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(GjfError::Parse {
                line: line_no,
                message: format!("expected 'symbol x y z', got '{}'", line.trim()),
            });
        }
        let element = Element::from_symbol(parts[0]).map_err(|e| GjfError::Parse {
            line: line_no,
            message: e.to_string(),
        })?;
        let mut coords = [0.0; 3];
        for (slot, token) in coords.iter_mut().zip(&parts[1..4]) {
            *slot = token.parse().map_err(|_| GjfError::Parse {
                line: line_no,
                message: format!("invalid coordinate '{}'", token),
            })?;
        }
        builder.add_atom(Atom::new(
            element,
            Point3::new(coords[0], coords[1], coords[2]),
            0,
        )?);
        Ok(())
    }

    fn parse_connectivity_line(
        builder: &mut MoleculeBuilder,
        line: &str,
        line_no: usize,
    ) -> Result<(), GjfError> {
        let mut parts = line.split_whitespace();
        let Some(first) = parts.next() else {
            return Ok(());
        };
        let i: usize = first.parse().map_err(|_| GjfError::Parse {
            line: line_no,
            message: format!("invalid atom number '{}'", first),
        })?;
        while let Some(neighbor_token) = parts.next() {
            let j: usize = neighbor_token.parse().map_err(|_| GjfError::Parse {
                line: line_no,
                message: format!("invalid bonded atom number '{}'", neighbor_token),
            })?;
            let order_token = parts.next().ok_or_else(|| GjfError::Parse {
                line: line_no,
                message: format!("missing bond order after atom {}", j),
            })?;
            let order: f64 = order_token.parse().map_err(|_| GjfError::Parse {
                line: line_no,
                message: format!("invalid bond order '{}'", order_token),
            })?;
            builder.add_bond(i, j, order);
        }
        Ok(())
    }
}

impl MoleculeFile for GjfFile {
    type Metadata = GjfMetadata;
    type Error = GjfError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Molecule, GjfMetadata), GjfError> {
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
        let mut cursor = 0;

        let mut route_lines = Vec::new();
        while cursor < lines.len() && !lines[cursor].trim().is_empty() {
            route_lines.push(lines[cursor].trim_end().to_string());
            cursor += 1;
        }
        if route_lines.is_empty() {
            return Err(GjfError::Parse {
                line: 1,
                message: "missing link0/route section".to_string(),
            });
        }
        cursor += 1;

        let mut title_lines = Vec::new();
        while cursor < lines.len() && !lines[cursor].trim().is_empty() {
            title_lines.push(lines[cursor].trim().to_string());
            cursor += 1;
        }
        let title = title_lines.join(" ");
        if title.is_empty() {
            return Err(GjfError::Parse {
                line: cursor + 1,
                message: "missing title section".to_string(),
            });
        }
        cursor += 1;

        if cursor >= lines.len() {
            return Err(GjfError::Parse {
                line: cursor + 1,
                message: "missing charge/multiplicity line".to_string(),
            });
        }
        let (charge, multiplicity) = Self::parse_charge_line(&lines[cursor], cursor + 1)?;
        cursor += 1;

        let mut builder = MoleculeBuilder::new(&title);
        while cursor < lines.len() && !lines[cursor].trim().is_empty() {
            Self::parse_geometry_line(&mut builder, &lines[cursor], cursor + 1)?;
            cursor += 1;
        }
        if builder.atom_count() == 0 {
            return Err(GjfError::Parse {
                line: cursor + 1,
                message: "empty geometry section".to_string(),
            });
        }
        cursor += 1;

        while cursor < lines.len() && !lines[cursor].trim().is_empty() {
            Self::parse_connectivity_line(&mut builder, &lines[cursor], cursor + 1)?;
            cursor += 1;
        }
        cursor += 1;

        let trailing = if cursor < lines.len() {
            lines[cursor..]
                .iter()
                .map(|l| l.trim_end().to_string())
                .collect()
        } else {
            Vec::new()
        };

        let molecule = builder.build()?;
        Ok((
            molecule,
            GjfMetadata {
                route_lines,
                title,
                charge,
                multiplicity,
                trailing,
            },
        ))
    }

    fn write_to(
        molecule: &Molecule,
        metadata: &GjfMetadata,
        writer: &mut impl Write,
    ) -> Result<(), GjfError> {
        for line in &metadata.route_lines {
            writeln!(writer, "{}", line)?;
        }
        writeln!(writer)?;
        writeln!(writer, "{}", metadata.title)?;
        writeln!(writer)?;
        writeln!(writer, "{} {}", metadata.charge, metadata.multiplicity)?;
        for atom in molecule.atoms() {
            writeln!(writer, "{}", atom)?;
        }
        writeln!(writer)?;

        // each bond appears once, on its lower-numbered endpoint
        let mut per_atom: Vec<Vec<(usize, f64)>> = vec![Vec::new(); molecule.len()];
        for (i, j, order) in molecule.bonds() {
            per_atom[i - 1].push((j, order));
        }
        for (i, entries) in per_atom.iter_mut().enumerate() {
            entries.sort_by_key(|&(j, _)| j);
            write!(writer, " {}", i + 1)?;
            for &(j, order) in entries.iter() {
                write!(writer, " {} {:.1}", j, order)?;
            }
            writeln!(writer)?;
        }
        writeln!(writer)?;
        for line in &metadata.trailing {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}
