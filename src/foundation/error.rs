/// Convenience result type used across flowvis.
pub type FlowResult<T> = Result<T, FlowError>;

/// Top-level error taxonomy used by the field store, renderer and viewer.
#[derive(thiserror::Error, Debug)]
pub enum FlowError {
    /// The flow data file does not exist.
    #[error("data missing: '{path}'")]
    DataMissing {
        /// Path that was looked up.
        path: String,
    },

    /// The flow data file ended before the expected number of samples.
    #[error("data truncated: expected {expected} floats, read {actual}")]
    DataTruncated {
        /// Floats required by the layout.
        expected: usize,
        /// Floats actually present.
        actual: usize,
    },

    /// A time or grid coordinate fell outside the field extents.
    #[error("index out of range: {axis}={index} not in [0, {bound})")]
    IndexOutOfRange {
        /// Axis name (`t`, `y` or `x`).
        axis: &'static str,
        /// Requested index.
        index: usize,
        /// Exclusive upper bound for the axis.
        bound: usize,
    },

    /// Invalid layout or in-memory data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Required asset (noise image) is missing or undecodable.
    #[error("asset error: {0}")]
    Asset(String),

    /// GPU setup, shader validation or submission failure.
    #[error("gpu error: {0}")]
    Gpu(String),

    /// Window or event loop failure.
    #[error("window error: {0}")]
    Window(String),

    /// IO failure other than a missing data file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowError {
    /// Build a [`FlowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlowError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`FlowError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`FlowError::Gpu`] value.
    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }

    /// Build a [`FlowError::Window`] value.
    pub fn window(msg: impl Into<String>) -> Self {
        Self::Window(msg.into())
    }

    pub(crate) fn out_of_range(axis: &'static str, index: usize, bound: usize) -> Self {
        Self::IndexOutOfRange { axis, index, bound }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
