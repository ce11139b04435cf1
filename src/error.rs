use thiserror::Error;

#[derive(Error, Debug)]
pub enum DreamError {
    #[error("Unknown backbone layer: {0}")]
    UnknownLayer(String),

    #[error("Weights load error: {0}")]
    WeightsError(#[from] burn::record::RecorderError),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Tensor data error: {0}")]
    TensorDataError(String),

    #[error("No gradient reached the input tensor")]
    MissingGradient,

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DreamError>;
