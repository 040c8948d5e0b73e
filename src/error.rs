use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model format error: {0}")]
    ModelFormat(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid weight model: {0}")]
    InvalidModel(String),

    #[error("Invalid conversion options: {0}")]
    InvalidConfiguration(String),

    #[error("Bounding box {width}x{height} centered at ({center_x}, {center_y}) has no positive extent")]
    InvalidBox {
        center_x: f32,
        center_y: f32,
        width: f32,
        height: f32,
    },

    #[error("No foreground run on the torso scan line at row {row}")]
    NoBodyLine { row: usize },

    #[error("No foreground pixels at reference column {column}")]
    EmptyColumn { column: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
