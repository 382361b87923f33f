use crate::cli::ScanArgs;
use crate::error::Result;
use geomscan::core::io::gjf::{GjfFile, GjfMetadata};
use geomscan::core::io::traits::MoleculeFile;
use geomscan::workflows::scan::{bond_scan, distance_grid};
use std::fs;
use tracing::info;

pub fn run(args: ScanArgs) -> Result<()> {
    let (template, metadata) = GjfFile::read_from_path(&args.input)?;
    info!(
        atoms = template.len(),
        bonds = template.bond_count(),
        "loaded scan template"
    );

    let grid = distance_grid(args.start, args.stop, args.step)?;
    let frames = bond_scan(&template, args.from, args.to, &grid)?;

    fs::create_dir_all(&args.output_dir)?;
    for frame in &frames {
        let path = args.output_dir.join(format!("{}.gjf", frame.name()));
        let frame_metadata = GjfMetadata {
            title: frame.name().to_string(),
            ..metadata.clone()
        };
        GjfFile::write_to_path(frame, &frame_metadata, &path)?;
        info!(path = %path.display(), "wrote scan point");
    }

    println!(
        "wrote {} scan points to {}",
        frames.len(),
        args.output_dir.display()
    );
    Ok(())
}
