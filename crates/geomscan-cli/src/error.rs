use geomscan::core::error::GeometryError;
use geomscan::core::io::gjf::GjfError;
use geomscan::core::io::xyz::XyzError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Gjf(#[from] GjfError),

    #[error(transparent)]
    Xyz(#[from] XyzError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("{0}")]
    InvalidInput(String),
}
