use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tick period must be greater than zero")]
    InvalidTickPeriod,
    #[error("sample cadence must be greater than zero")]
    InvalidSampleCadence,
    #[error("buffer length must hold at least two samples, got {0}")]
    BufferTooShort(usize),
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("no chart series to render")]
    NoSeries,
    #[error("failed to render plot: {0}")]
    Render(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for PlotError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        PlotError::Render(format!("{value:?}"))
    }
}
impl From<image::ImageError> for PlotError {
    fn from(value: image::ImageError) -> Self {
        PlotError::Render(value.to_string())
    }
}
