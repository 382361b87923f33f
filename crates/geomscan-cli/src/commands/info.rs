use crate::cli::InfoArgs;
use crate::error::{CliError, Result};
use geomscan::core::io::gjf::GjfFile;
use geomscan::core::io::traits::MoleculeFile;
use geomscan::core::io::xyz::XyzFile;
use geomscan::core::models::molecule::Molecule;
use std::path::Path;

pub fn run(args: InfoArgs) -> Result<()> {
    let molecule = load(&args.input)?;

    println!("name:          {}", molecule.name());
    println!("atoms:         {}", molecule.len());
    println!("bonds:         {}", molecule.bond_count());
    println!("energy:        {}", molecule.energy());
    println!("steric score:  {:.4}", molecule.steric_energy());
    println!("close contact: {}", molecule.has_close_contact());
    println!();
    for (index, atom) in molecule.atoms().iter().enumerate() {
        let number = index + 1;
        let neighbors = molecule.neighbors_numbered(number)?;
        println!("{:>4}  {}   bonded to {:?}", number, atom, neighbors);
    }
    Ok(())
}

fn load(path: &Path) -> Result<Molecule> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("xyz") => {
            let (molecule, ()) = XyzFile::read_from_path(path)?;
            Ok(molecule)
        }
        Some("gjf") | Some("com") => {
            let (molecule, _) = GjfFile::read_from_path(path)?;
            Ok(molecule)
        }
        _ => Err(CliError::InvalidInput(format!(
            "unsupported structure format: {} (expected .gjf, .com, or .xyz)",
            path.display()
        ))),
    }
}
