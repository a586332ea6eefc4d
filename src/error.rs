use thiserror::Error;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Misuse of a configuration enum (marker style, axis mode, units...).
    #[error("unsupported {kind} variant `{value}`")]
    UnsupportedVariant { kind: &'static str, value: String },

    #[error("backend failure: {0}")]
    Backend(String),

    #[error("settings: {0}")]
    Settings(String),
}
