use delve_core::CoreError;

/// Alias for `Result<T, GenError>`.
pub type GenResult<T> = Result<T, GenError>;

/// Errors that can occur while generating a level.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// Building or placing something in the level failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The generator configuration cannot produce a level.
    #[error("invalid generator config: {0}")]
    InvalidConfig(String),
}
