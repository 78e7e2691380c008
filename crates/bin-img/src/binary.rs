//! The packed 1bpp image type and its pixel accessors.

use std::cell::RefCell;
use std::rc::Rc;

use image::{GrayImage, Luma};
use tracing::debug;

use crate::color::{PixelSource, Rgba16};
use crate::geometry::Rect;
use crate::{BinImgError, Result};

/// A 1bpp (bit-packed) image view.
///
/// The backing buffer is shared between an image and every sub-view taken
/// from it, so `clone()` yields another view of the same pixels. Use
/// [`BinaryImage::deep_clone`] for an independent copy.
///
/// Pixel coordinates are buffer coordinates: a sub-view created at `(8, 2)`
/// has its first pixel at `(8, 2)`, not at `(0, 0)`.
#[derive(Debug, Clone)]
pub struct BinaryImage {
    pix: Rc<RefCell<Vec<u8>>>,
    stride: usize,
    rect: Rect,
}

impl BinaryImage {
    /// Allocate an all-off image. `width` must be a non-zero multiple of 8.
    pub fn allocate(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width % 8 != 0 {
            return Err(BinImgError::InvalidDimensions { width, height });
        }
        let stride = (width / 8) as usize;
        Ok(Self {
            pix: Rc::new(RefCell::new(vec![0; stride * height as usize])),
            stride,
            rect: Rect::from_size(width, height),
        })
    }

    /// Wrap already packed rows. `bytes` must hold exactly `width / 8 * height` bytes.
    pub fn from_packed(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        let img = Self::allocate(width, height)?;
        if bytes.len() != img.stride * height as usize {
            return Err(BinImgError::InvalidDimensions { width, height });
        }
        *img.pix.borrow_mut() = bytes;
        Ok(img)
    }

    pub fn bounds(&self) -> Rect {
        self.rect
    }

    pub fn width(&self) -> u32 {
        self.rect.width()
    }

    pub fn height(&self) -> u32 {
        self.rect.height()
    }

    /// Bytes per buffer row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Whether the visible rows start and end on byte boundaries.
    pub fn is_byte_aligned(&self) -> bool {
        self.rect.min_x % 8 == 0 && self.rect.width() % 8 == 0
    }

    /// Bytes used by the backing buffer (shared with sub-views).
    pub fn memory_usage(&self) -> usize {
        self.pix.borrow().len()
    }

    /// Whether `other` is a view on the same backing buffer.
    pub fn shares_buffer(&self, other: &BinaryImage) -> bool {
        Rc::ptr_eq(&self.pix, &other.pix)
    }

    /// Read a pixel. The position must lie inside [`Self::bounds`].
    pub fn get(&self, x: u32, y: u32) -> bool {
        debug_assert!(
            self.rect.contains(x, y),
            "pixel ({x}, {y}) outside {:?}",
            self.rect
        );
        read_bit(&self.pix.borrow(), self.stride, x, y)
    }

    /// `true` for an on pixel. Positions outside the image read as off.
    pub fn is_white(&self, x: u32, y: u32) -> bool {
        self.rect.contains(x, y) && self.get(x, y)
    }

    /// `true` for an off pixel. Positions outside the image read as off.
    pub fn is_black(&self, x: u32, y: u32) -> bool {
        !self.is_white(x, y)
    }

    /// Write a pixel. Positions outside the image are ignored.
    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if !self.rect.contains(x, y) {
            return;
        }
        write_bit(&mut self.pix.borrow_mut(), self.stride, x, y, on);
    }

    pub fn set_on(&mut self, x: u32, y: u32) {
        self.set(x, y, true);
    }

    pub fn set_off(&mut self, x: u32, y: u32) {
        self.set(x, y, false);
    }

    /// Write a pixel from a color: transparent is off, otherwise luma at
    /// mid-range or brighter is on.
    pub fn set_color(&mut self, x: u32, y: u32, color: Rgba16) {
        let on = !color.is_transparent() && color.luma16() >= 0x8000;
        self.set(x, y, on);
    }

    /// Set every visible pixel on or off.
    ///
    /// On a sub-view only the view's pixels change; the rest of the shared
    /// buffer is left alone. A view covering the whole buffer sets every byte.
    pub fn fill(&mut self, on: bool) {
        let value = if on { 0xff } else { 0x00 };
        if self.covers_buffer() {
            self.pix.borrow_mut().fill(value);
            return;
        }
        let r = self.rect;
        let mut pix = self.pix.borrow_mut();
        for y in r.min_y..r.max_y {
            for x in r.min_x..r.max_x {
                write_bit(&mut pix, self.stride, x, y, on);
            }
        }
    }

    /// A view of `r` (clipped to the bounds) sharing this image's buffer.
    pub fn sub_image(&self, r: Rect) -> BinaryImage {
        let rect = r.intersect(&self.rect);
        debug!(?rect, "Creating sub-image view");
        BinaryImage { pix: Rc::clone(&self.pix), stride: self.stride, rect }
    }

    /// Copy the visible pixels into a fresh, origin-anchored buffer.
    ///
    /// The copy's width is rounded up to a multiple of 8; padding bits are off.
    pub fn deep_clone(&self) -> BinaryImage {
        let (w, h) = (self.width(), self.height());
        let row_bytes = w.div_ceil(8) as usize;
        let mut out = vec![0u8; row_bytes * h as usize];
        self.pack_rows_into(&mut out, row_bytes);
        BinaryImage {
            pix: Rc::new(RefCell::new(out)),
            stride: row_bytes,
            rect: Rect::from_size(row_bytes as u32 * 8, h),
        }
        .sub_image(Rect::from_size(w, h))
    }

    /// Pack the visible rows MSB-first into `out`, `row_bytes` per row.
    ///
    /// Byte-aligned views copy whole bytes; others are packed pixel by pixel.
    /// Bits past the visible width are left untouched.
    pub fn pack_rows_into(&self, out: &mut [u8], row_bytes: usize) {
        let r = self.rect;
        let pix = self.pix.borrow();
        if self.is_byte_aligned() {
            let x_byte = (r.min_x / 8) as usize;
            let n = (r.width() / 8) as usize;
            for (row, y) in (r.min_y..r.max_y).enumerate() {
                let src = y as usize * self.stride + x_byte;
                let dst = row * row_bytes;
                out[dst..dst + n].copy_from_slice(&pix[src..src + n]);
            }
            return;
        }
        for (row, y) in (r.min_y..r.max_y).enumerate() {
            for (col, x) in (r.min_x..r.max_x).enumerate() {
                if read_bit(&pix, self.stride, x, y) {
                    out[row * row_bytes + col / 8] |= 0x80 >> (col & 7);
                }
            }
        }
    }

    /// Render as a grayscale image (on = 255, off = 0), anchored at the origin.
    pub fn to_gray_image(&self) -> GrayImage {
        let r = self.rect;
        GrayImage::from_fn(r.width(), r.height(), |x, y| {
            if self.get(r.min_x + x, r.min_y + y) { Luma([255]) } else { Luma([0]) }
        })
    }

    fn covers_buffer(&self) -> bool {
        let buffer_rows = self.pix.borrow().len() / self.stride.max(1);
        self.rect == Rect::from_size(self.stride as u32 * 8, buffer_rows as u32)
    }

    pub(crate) fn with_pixels_mut<T>(&mut self, f: impl FnOnce(&mut [u8], usize, Rect) -> T) -> T {
        let (stride, rect) = (self.stride, self.rect);
        f(self.pix.borrow_mut().as_mut_slice(), stride, rect)
    }
}

/// Two images are equal when their visible pixels match position by position,
/// each measured from its own origin.
impl PartialEq for BinaryImage {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.rect, other.rect);
        if a.width() != b.width() || a.height() != b.height() {
            return false;
        }
        (0..a.height()).all(|y| {
            (0..a.width()).all(|x| self.get(a.min_x + x, a.min_y + y) == other.get(b.min_x + x, b.min_y + y))
        })
    }
}

impl Eq for BinaryImage {}

impl PixelSource for BinaryImage {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn color_at(&self, x: u32, y: u32) -> Rgba16 {
        if self.is_white(x, y) { Rgba16::WHITE } else { Rgba16::BLACK }
    }
}

pub(crate) fn read_bit(pix: &[u8], stride: usize, x: u32, y: u32) -> bool {
    let i = y as usize * stride + (x / 8) as usize;
    pix[i] & (0x80 >> (x & 7)) != 0
}

pub(crate) fn write_bit(pix: &mut [u8], stride: usize, x: u32, y: u32, on: bool) {
    let i = y as usize * stride + (x / 8) as usize;
    let mask = 0x80u8 >> (x & 7);
    if on {
        pix[i] |= mask;
    } else {
        pix[i] &= !mask;
    }
}
