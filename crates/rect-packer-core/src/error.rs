use thiserror::Error;

#[derive(Debug, Error)]
pub enum RectPackError {
    #[error("rectangles must have positive width and height (item {index}: {width}x{height})")]
    Validation {
        index: usize,
        width: u32,
        height: u32,
    },
    #[error("Invalid bin dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Could not place every rectangle after {attempts} attempts (last bin {width}x{height})")]
    PackingFailed {
        attempts: usize,
        width: u32,
        height: u32,
    },
}

pub type Result<T> = std::result::Result<T, RectPackError>;
