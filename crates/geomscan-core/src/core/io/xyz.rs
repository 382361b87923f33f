use super::traits::MoleculeFile;
use crate::core::error::GeometryError;
use crate::core::models::atom::Atom;
use crate::core::models::builder::MoleculeBuilder;
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Errors for Tinker XYZ parsing and serialization.
#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Tinker XYZ adapter: a count/title header followed by one row per atom
/// carrying number, symbol, coordinates, force-field atom type, and the
/// full bonded-neighbor list. The format has no bond orders; every bond
/// reads back as order 1.0.
///
/// The title doubles as the molecule name, so there is no separate
/// metadata to carry.
pub struct XyzFile;

impl MoleculeFile for XyzFile {
    type Metadata = ();
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Molecule, ()), XyzError> {
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
        let header = lines.first().ok_or_else(|| XyzError::Parse {
            line: 1,
            message: "empty file".to_string(),
        })?;

        let mut parts = header.split_whitespace();
        let count: usize = parts
            .next()
            .ok_or_else(|| XyzError::Parse {
                line: 1,
                message: "missing atom count".to_string(),
            })?
            .parse()
            .map_err(|_| XyzError::Parse {
                line: 1,
                message: format!("invalid atom count in '{}'", header.trim()),
            })?;
        let title = parts.collect::<Vec<_>>().join(" ");
        let name = if title.is_empty() { "unnamed" } else { &title };

        if lines.len() < count + 1 {
            return Err(XyzError::Parse {
                line: lines.len() + 1,
                message: format!("expected {} atom rows, found {}", count, lines.len() - 1),
            });
        }

        let mut builder = MoleculeBuilder::new(name);
        for (row, line) in lines[1..=count].iter().enumerate() {
            let line_no = row + 2;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 6 {
                return Err(XyzError::Parse {
                    line: line_no,
                    message: format!(
                        "expected 'number symbol x y z type [neighbors...]', got '{}'",
                        line.trim()
                    ),
                });
            }

            let element = Element::from_symbol(parts[1]).map_err(|e| XyzError::Parse {
                line: line_no,
                message: e.to_string(),
            })?;
            let mut coords = [0.0; 3];
            for (slot, token) in coords.iter_mut().zip(&parts[2..5]) {
                *slot = token.parse().map_err(|_| XyzError::Parse {
                    line: line_no,
                    message: format!("invalid coordinate '{}'", token),
                })?;
            }
            let atom_type: i32 = parts[5].parse().map_err(|_| XyzError::Parse {
                line: line_no,
                message: format!("invalid atom type '{}'", parts[5]),
            })?;

            let number = builder.add_atom(Atom::new(
                element,
                Point3::new(coords[0], coords[1], coords[2]),
                atom_type,
            )?);

            for token in &parts[6..] {
                let neighbor: usize = token.parse().map_err(|_| XyzError::Parse {
                    line: line_no,
                    message: format!("invalid bonded atom number '{}'", token),
                })?;
                // rows list both directions; the graph keeps one edge
                builder.add_bond(number, neighbor, 1.0);
            }
        }

        Ok((builder.build()?, ()))
    }

    fn write_to(
        molecule: &Molecule,
        _metadata: &(),
        writer: &mut impl Write,
    ) -> Result<(), XyzError> {
        writeln!(writer, "{:>6}  {}", molecule.len(), molecule.name())?;
        for (index, atom) in molecule.atoms().iter().enumerate() {
            let number = index + 1;
            write!(
                writer,
                "{:>6}  {:<2} {:>12.8} {:>12.8} {:>12.8} {:>6}",
                number,
                atom.element.symbol(),
                atom.position.x,
                atom.position.y,
                atom.position.z,
                atom.atom_type
            )?;
            let mut neighbors = molecule.neighbors_numbered(number)?;
            neighbors.sort();
            for neighbor in neighbors {
                write!(writer, " {:>5}", neighbor)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
     4  methanol fragment
     1  C    0.00000000   0.00000000   0.00000000      1     2     3
     2  O    1.43000000   0.00000000   0.00000000      2     1     4
     3  H   -0.36000000   1.03000000   0.00000000      5     1
     4  H    1.75000000   0.90000000   0.00000000      6     2
";

    #[test]
    fn reads_a_tinker_file() {
        let mut reader = BufReader::new(SAMPLE.as_bytes());
        let (molecule, ()) = XyzFile::read_from(&mut reader).unwrap();

        assert_eq!(molecule.len(), 4);
        assert_eq!(molecule.name(), "methanol fragment");
        assert_eq!(molecule.bond_count(), 3);
        assert!(molecule.directly_connected_numbered(1, 2));
        assert!(molecule.directly_connected_numbered(2, 4));
        assert_eq!(molecule.atom(1).unwrap().atom_type, 1);
        assert_eq!(molecule.atom(3).unwrap().atom_type, 5);
        assert_eq!(molecule.bond_order_numbered(1, 2), Some(1.0));
    }

    #[test]
    fn round_trips_through_a_temp_file() {
        let mut reader = BufReader::new(SAMPLE.as_bytes());
        let (molecule, ()) = XyzFile::read_from(&mut reader).unwrap();

        let file = NamedTempFile::new().unwrap();
        XyzFile::write_to_path(&molecule, &(), file.path()).unwrap();
        let (reread, ()) = XyzFile::read_from_path(file.path()).unwrap();

        assert_eq!(reread.name(), molecule.name());
        assert_eq!(reread.len(), molecule.len());
        assert_eq!(reread.bond_count(), molecule.bond_count());
        for (a, b) in molecule.atoms().iter().zip(reread.atoms()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn header_and_row_errors_carry_line_numbers() {
        let bad_header = "four atoms\n";
        let mut reader = BufReader::new(bad_header.as_bytes());
        assert!(matches!(
            XyzFile::read_from(&mut reader).unwrap_err(),
            XyzError::Parse { line: 1, .. }
        ));

        let short_row = "\
     1  title
     1  C    0.0   0.0
";
        let mut reader = BufReader::new(short_row.as_bytes());
        assert!(matches!(
            XyzFile::read_from(&mut reader).unwrap_err(),
            XyzError::Parse { line: 2, .. }
        ));
    }

    #[test]
    fn truncated_files_are_rejected() {
        let text = "\
     3  truncated
     1  C    0.00000000   0.00000000   0.00000000      1     2
     2  C    1.50000000   0.00000000   0.00000000      1     1
";
        let mut reader = BufReader::new(text.as_bytes());
        assert!(XyzFile::read_from(&mut reader).is_err());
    }
}
