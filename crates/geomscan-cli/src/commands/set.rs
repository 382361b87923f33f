use crate::cli::{EditCommand, SetArgs};
use crate::error::Result;
use geomscan::core::io::gjf::GjfFile;
use geomscan::core::io::traits::MoleculeFile;
use geomscan::core::models::torsion::IndexTorsion;
use tracing::info;

pub fn run(args: SetArgs) -> Result<()> {
    let (molecule, metadata) = GjfFile::read_from_path(&args.input)?;

    let edited = match args.edit {
        EditCommand::Distance { a, b, target } => {
            info!(a, b, target, "setting bond length");
            molecule.set_distance_numbered(a, b, target)?
        }
        EditCommand::Angle { a, b, c, target } => {
            info!(a, b, c, target, "setting bend angle");
            molecule.set_angle_numbered(a, b, c, target)?
        }
        EditCommand::Dihedral { a, b, c, d, theta } => {
            info!(a, b, c, d, theta, "setting dihedral");
            let torsion = IndexTorsion::from_molecule(&molecule, a, b, c, d)?;
            molecule.set_dihedral_index(&torsion, theta)?
        }
    };

    GjfFile::write_to_path(&edited, &metadata, &args.output)?;
    println!("wrote {}", args.output.display());
    Ok(())
}
