use crate::types::Rect;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScratchError>;

// Every variant states *where* things went wrong.
#[derive(Error, Debug)]
pub enum ScratchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Check region {region:?} lies outside the {width}x{height} surface")]
    RegionOutOfBounds { region: Rect, width: u32, height: u32 },

    #[error("Raster is {actual_width}x{actual_height}, surface expects {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Coverage has {actual} values, surface expects {expected}")]
    CoverageLength { expected: usize, actual: usize },

    #[error("Image load error: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Window init error: {0}")]
    WindowInit(String),

    #[error("Window update error: {0}")]
    WindowUpdate(String),
}

impl ScratchError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
