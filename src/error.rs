use thiserror::Error;

/// Top-level error type for the culm solid modeler.
#[derive(Debug, Error)]
pub enum CulmError {
    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Cut(#[from] CutError),
}

/// Errors raised while validating geometry parameters.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("{parameter} must be positive, got {value}")]
    NotPositive { parameter: &'static str, value: f64 },

    #[error("inner radius {inner} must be smaller than outer radius {outer}")]
    InnerNotInsideOuter { inner: f64, outer: f64 },

    #[error("need at least {min} {parameter}, got {value}")]
    TooFew {
        parameter: &'static str,
        value: usize,
        min: usize,
    },
}

/// Errors raised while constructing cut planes.
#[derive(Debug, Error)]
pub enum CutError {
    #[error("cut plane normal has zero vertical component")]
    HorizontalNormal,
}

/// Convenience type alias for results using [`CulmError`].
pub type Result<T> = std::result::Result<T, CulmError>;
