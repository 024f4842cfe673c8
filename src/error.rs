use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid surface size: width={width}, height={height}")]
    InvalidSurface { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("rendering context unavailable: {0}")]
    RenderContextUnavailable(String),
}
