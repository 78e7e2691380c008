//! Threshold conversion from arbitrary pixel sources.

use tracing::debug;

use crate::Result;
use crate::binary::{BinaryImage, write_bit};
use crate::color::{PixelSource, Rgba16};

/// The black/white decision for one source pixel.
///
/// Transparent pixels are off. Otherwise the 8-bit luma must reach `threshold`.
pub fn is_on(color: Rgba16, threshold: u8) -> bool {
    !color.is_transparent() && color.luma8() >= threshold
}

impl BinaryImage {
    /// Allocate an image the size of `src` and threshold it in.
    ///
    /// Fails with `InvalidDimensions` when the source is empty or its width is
    /// not a multiple of 8.
    pub fn from_threshold<S: PixelSource + ?Sized>(src: &S, threshold: u8) -> Result<Self> {
        let b = src.bounds();
        let mut img = BinaryImage::allocate(b.width(), b.height())?;
        img.threshold_from(src, threshold);
        Ok(img)
    }

    /// Overwrite every visible pixel from `src`.
    ///
    /// The rectangles are matched at their origins: pixel `(min_x + dx, min_y + dy)`
    /// reads source pixel `(src.min_x + dx, src.min_y + dy)`. Source positions
    /// outside its bounds are whatever the source reports for them.
    pub fn threshold_from<S: PixelSource + ?Sized>(&mut self, src: &S, threshold: u8) {
        let sb = src.bounds();
        debug!(
            width = self.width(),
            height = self.height(),
            threshold,
            "Applying threshold conversion"
        );
        // The source may be a view of this very buffer, so read it fully
        // before taking the mutable borrow.
        let (w, h) = (self.width(), self.height());
        let bits: Vec<bool> = (0..h)
            .flat_map(|dy| (0..w).map(move |dx| (dx, dy)))
            .map(|(dx, dy)| is_on(src.color_at(sb.min_x + dx, sb.min_y + dy), threshold))
            .collect();

        self.with_pixels_mut(|pix, stride, rect| {
            let coords = (rect.min_y..rect.max_y).flat_map(|y| (rect.min_x..rect.max_x).map(move |x| (x, y)));
            for ((x, y), on) in coords.zip(bits) {
                write_bit(pix, stride, x, y, on);
            }
        });
    }
}
