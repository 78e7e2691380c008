//! In-place 180-degree rotation of packed images.
//!
//! Byte-aligned views take a fast path that swaps whole bytes and reverses
//! their bits; anything else swaps mirrored pixels one at a time.

use tracing::debug;

use crate::binary::{BinaryImage, read_bit, write_bit};
use crate::geometry::Rect;

impl BinaryImage {
    /// Rotate the visible rectangle by 180 degrees in place.
    ///
    /// Pixels of the shared buffer outside the rectangle are not touched.
    pub fn rotate_180(&mut self) {
        let (w, h) = (self.width(), self.height());
        if w <= 1 && h <= 1 {
            return;
        }
        let aligned = self.is_byte_aligned();
        debug!(w, h, aligned, "Rotating binary image 180 degrees");
        self.with_pixels_mut(|pix, stride, rect| {
            if aligned {
                rotate_aligned(pix, stride, rect);
            } else {
                rotate_bitwise(pix, stride, rect);
            }
        });
    }
}

/// Swap rows end-for-end: reversing a row is reversing its byte order and
/// the bit order inside every byte.
fn rotate_aligned(pix: &mut [u8], stride: usize, rect: Rect) {
    let h = rect.height() as usize;
    let row_bytes = (rect.width() / 8) as usize;
    let base = rect.min_y as usize * stride + (rect.min_x / 8) as usize;

    for y in 0..h / 2 {
        let off1 = base + y * stride;
        let off2 = base + (h - 1 - y) * stride;
        for i in 0..row_bytes {
            let j = row_bytes - 1 - i;
            let a = pix[off1 + i];
            let c = pix[off2 + j];
            pix[off1 + i] = c.reverse_bits();
            pix[off2 + j] = a.reverse_bits();
        }
    }

    // Middle row (odd height): reverse it in place.
    if h % 2 == 1 {
        let off = base + (h / 2) * stride;
        let row = &mut pix[off..off + row_bytes];
        for i in 0..row_bytes / 2 {
            let j = row_bytes - 1 - i;
            let a = row[i];
            row[i] = row[j].reverse_bits();
            row[j] = a.reverse_bits();
        }
        if row_bytes % 2 == 1 {
            let mid = row_bytes / 2;
            row[mid] = row[mid].reverse_bits();
        }
    }
}

fn rotate_bitwise(pix: &mut [u8], stride: usize, rect: Rect) {
    let (w, h) = (rect.width(), rect.height());
    let (min_x, min_y) = (rect.min_x, rect.min_y);
    let mut swap = |x1: u32, y1: u32, x2: u32, y2: u32| {
        let b1 = read_bit(pix, stride, x1, y1);
        let b2 = read_bit(pix, stride, x2, y2);
        write_bit(pix, stride, x1, y1, b2);
        write_bit(pix, stride, x2, y2, b1);
    };

    for y in 0..h / 2 {
        let y1 = min_y + y;
        let y2 = min_y + (h - 1 - y);
        for x in 0..w {
            swap(min_x + x, y1, min_x + (w - 1 - x), y2);
        }
    }
    if h % 2 == 1 {
        let y = min_y + h / 2;
        for x in 0..w / 2 {
            swap(min_x + x, y, min_x + (w - 1 - x), y);
        }
    }
}
