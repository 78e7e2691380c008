//! TSPL label printer bitmap codec.
//!
//! Encodes packed binary images as `BITMAP` commands wrapped in the label
//! setup lines, parses and decodes such commands back into images, and
//! patches pixel regions of an already encoded buffer in place.

pub mod bitmap;
pub mod command;
pub mod decode;
pub mod options;
pub mod overlay;

// Re-exports for convenience
pub use bin_img::{BinaryImage, PixelSource};
pub use bitmap::{BitmapHeader, EncodedBitmap, encode, encode_source, find_bitmap, parse_bitmap_header};
pub use command::{full_encode, full_encode_source, header};
pub use decode::{DecodedImage, decode, decode_sequence};
pub use options::TsplOptions;
pub use overlay::{overlay, overlay_at_top_left, overlay_sequence};

/// Errors that can occur while encoding, decoding, or patching bitmaps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TsplError {
    #[error(transparent)]
    InvalidDimensions(#[from] bin_img::BinImgError),

    #[error("Not a BITMAP line")]
    NotABitmapLine,

    #[error("Invalid BITMAP format: {0}")]
    InvalidHeaderFormat(String),

    #[error("Invalid image size: width {width}, height {height}")]
    InvalidImageSize { width: i64, height: i64 },

    #[error("Base body too short: need {needed} bytes, got {actual}")]
    BaseTooShort { needed: usize, actual: usize },

    #[error("Invalid overlay size: {width}x{height}")]
    InvalidOverlaySize { width: u32, height: u32 },

    #[error(
        "Overlay out of bounds: base={base_width}x{base_height}, overlay={overlay_width}x{overlay_height}, offset=({x}, {y})"
    )]
    OverlayOutOfBounds {
        base_width: i64,
        base_height: i64,
        overlay_width: u32,
        overlay_height: u32,
        x: i64,
        y: i64,
    },

    #[error("Overlay image is missing")]
    NilOverlay,

    #[error("Overlay offset must be >= 0, got ({x}, {y})")]
    NegativeOffset { x: i64, y: i64 },

    #[error("Base body is empty")]
    EmptyBase,
}

/// Result type alias for TSPL operations.
pub type Result<T> = std::result::Result<T, TsplError>;
