use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverlessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid carrier dimensions: {width}x{height}. Both must be multiples of 8")]
    InvalidCarrierDimensions { width: u32, height: u32 },

    #[error("Capacity exceeded: payload needs {required} bits, carrier holds {capacity} bits")]
    CapacityExceeded { required: usize, capacity: usize },

    #[error("Truncated Z-code: need at least {required} bits, got {available}")]
    TruncatedZCode { required: usize, available: usize },

    #[error("Authentication failed: wrong key or wrong carrier")]
    AuthenticationFailure,

    #[error("Content decode failed: {0}")]
    ContentDecodeFailure(String),

    #[error("Invalid Z-code image: {0}")]
    InvalidZCodeImage(String),

    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    #[error("Unsupported option: {0}")]
    UnsupportedOption(String),
}

pub type Result<T> = std::result::Result<T, CoverlessError>;
