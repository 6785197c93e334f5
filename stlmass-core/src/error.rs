/// Errors raised while validating or decoding a binary STL buffer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedInputError {
    #[error("buffer is {actual} bytes, a binary STL needs at least 84 (header + triangle count)")]
    TooShort { actual: usize },

    #[error("buffer is {actual} bytes but the nearest whole-record length is {expected} (84 + 50 x n)")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("header declares {declared} triangles but the buffer holds {inferred}")]
    HeaderCountMismatch { declared: u32, inferred: usize },

    #[error("triangle {triangle} has a non-finite vertex coordinate")]
    NonFiniteCoordinate { triangle: usize },

    #[error("triangle {triangle} could not be decoded")]
    Record { triangle: usize },
}

/// Errors raised while loading an estimator configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("density must be finite and non-negative, got {0}")]
    InvalidDensity(f64),
}
