use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    #[error("index {index} is out of range for a gallery of {len} images")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no drag in progress")]
    NoActiveDrag,
}

pub type GalleryResult<T> = Result<T, GalleryError>;
