use thiserror::Error;

#[derive(Error, Debug)]
pub enum GerberError {
    /// Failures of the output sink, passed through unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Gerber code generation failed, e.g. a coordinate does not fit the coordinate format.
    #[error("Gerber code generation failed: {0}")]
    Code(gerber_types::GerberError),

    #[error("Aperture is not registered on this layer. key: {0}")]
    UnregisteredAperture(String),

    #[error("Unsupported aperture shape: {0}")]
    UnsupportedAperture(String),
}

impl From<gerber_types::GerberError> for GerberError {
    fn from(error: gerber_types::GerberError) -> Self {
        match error {
            // sink errors surface as-is, regardless of which layer of the writer hit them
            gerber_types::GerberError::IoError(error) => GerberError::Io(error),
            other => GerberError::Code(other),
        }
    }
}
