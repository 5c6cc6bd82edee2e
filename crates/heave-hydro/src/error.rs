use std::path::PathBuf;

use heave_core::CoreError;

/// Alias for `Result<T, HydroError>`.
pub type HydroResult<T> = Result<T, HydroError>;

/// Errors raised while loading coefficients or evaluating hydrodynamic loads.
#[derive(Debug, thiserror::Error)]
pub enum HydroError {
    /// The coefficient file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The coefficient file is not valid JSON for the expected layout.
    #[error("cannot parse {origin}: {source}")]
    Parse {
        /// File name, or `<string>` for in-memory input.
        origin: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// No coefficient block exists for the named body.
    #[error("no hydrodynamic data for body \"{0}\"")]
    MissingBody(String),

    /// A dataset has the wrong shape.
    #[error("{dataset}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Dataset path, e.g. `body1/hydro_coeffs/added_mass/inf_freq`.
        dataset: String,
        /// Expected shape.
        expected: String,
        /// Shape actually present.
        found: String,
    },

    /// A value is out of range or inconsistent with the rest of the file.
    #[error("invalid hydrodynamic data: {0}")]
    InvalidData(String),

    /// An error from the rigid-body system.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<HydroError> for CoreError {
    fn from(err: HydroError) -> Self {
        match err {
            HydroError::Core(inner) => inner,
            other => CoreError::Provider {
                provider: "hydro".into(),
                message: other.to_string(),
            },
        }
    }
}
