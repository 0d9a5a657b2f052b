/// Error types for viewer setup
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewerError {
    #[error("invalid viewport {width}x{height}: both dimensions must be positive")]
    InvalidViewport { width: f32, height: f32 },

    #[error("invalid clip planes near={near} far={far}: require far > near > 0")]
    InvalidClipPlanes { near: f32, far: f32 },

    #[error("invalid field of view {0} rad: must lie in (0, pi)")]
    InvalidFieldOfView(f32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
