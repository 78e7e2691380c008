//! 1-bit-per-pixel packed images for thermal label output.
//!
//! Pixels are stored 8 per byte, row-major, most significant bit first.
//! A set bit is "on" (rendered white), a cleared bit is "off" (rendered black).
//! Sub-views share the backing buffer with their parent and only differ in
//! the visible rectangle.

pub mod binary;
pub mod color;
pub mod geometry;
pub mod rotate;
pub mod threshold;

// Re-exports for convenience
pub use binary::BinaryImage;
pub use color::{PixelSource, Rgba16};
pub use geometry::Rect;

/// Threshold applied when a non-binary source is converted for printing.
pub const DEFAULT_THRESHOLD: u8 = 151;

/// Errors that can occur while building packed images.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BinImgError {
    #[error("Invalid dimensions {width}x{height}: both must be > 0 and width a multiple of 8")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Result type alias for bin-img operations.
pub type Result<T> = std::result::Result<T, BinImgError>;
