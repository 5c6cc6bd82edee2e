/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building or stepping a body system.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No body with the given name is registered.
    #[error("body not found: \"{0}\"")]
    BodyNotFound(String),

    /// A body with the same name is already registered.
    #[error("body already exists: \"{0}\"")]
    DuplicateBody(String),

    /// A body failed validation when it was added.
    #[error("invalid body \"{name}\": {reason}")]
    InvalidBody {
        /// Name of the rejected body.
        name: String,
        /// Why the body was rejected.
        reason: String,
    },

    /// The simulation configuration is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Bodies cannot be added once force providers are initialized.
    #[error("system already initialized; bodies must be added before init")]
    AlreadyInitialized,

    /// The assembled mass matrix could not be factorized.
    #[error("singular mass matrix at t = {time}")]
    SingularMassMatrix {
        /// Simulation time of the failed solve.
        time: f64,
    },

    /// A force provider returned data of the wrong size.
    #[error("force provider \"{provider}\" returned {found} components, expected {expected}")]
    ForceDimension {
        /// Name of the offending provider.
        provider: String,
        /// Expected component count (6 per body).
        expected: usize,
        /// Component count actually returned.
        found: usize,
    },

    /// A force provider failed.
    #[error("force provider \"{provider}\": {message}")]
    Provider {
        /// Name of the failing provider.
        provider: String,
        /// Description of the failure.
        message: String,
    },

    /// Writing trace output failed.
    #[error("trace output: {0}")]
    Io(#[from] std::io::Error),
}
