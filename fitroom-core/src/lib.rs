/// Fitroom Core Library - Transform pipeline for the garment viewer
///
/// This library provides the platform-independent part of the viewer:
/// projection and transform composition, rotation/drag/zoom state,
/// viewer configuration and the static colored cube geometry.

pub mod config;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod state;
pub mod transform;

// Re-export commonly used types
pub use config::ViewerConfig;
pub use error::ViewerError;
pub use geometry::{ColoredVertex, IndexedMesh};
pub use projection::{project_to_screen, TransformPipeline, Viewport};
pub use state::TransformState;
pub use transform::{Mat4, TransformOp};
