//! Colors and the pixel-source capability consumed by thresholding.

use image::{DynamicImage, GenericImageView, GrayImage, RgbaImage};

use crate::geometry::Rect;

/// Alpha-premultiplied color with 16-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba16 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl Rgba16 {
    pub const WHITE: Rgba16 = Rgba16::gray16(0xffff);
    pub const BLACK: Rgba16 = Rgba16::gray16(0);
    pub const TRANSPARENT: Rgba16 = Rgba16 { r: 0, g: 0, b: 0, a: 0 };

    /// Opaque gray with a 16-bit level.
    pub const fn gray16(level: u16) -> Self {
        Self { r: level, g: level, b: level, a: 0xffff }
    }

    /// Opaque gray from an 8-bit level (`0xab` widens to `0xabab`).
    pub fn from_gray8(level: u8) -> Self {
        Self::gray16(widen(level))
    }

    /// Premultiply a straight (non-premultiplied) 8-bit RGBA value.
    pub fn from_straight_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        let a16 = u32::from(widen(a));
        let mul = |c: u8| (u32::from(widen(c)) * a16 / 0xffff) as u16;
        Self { r: mul(r), g: mul(g), b: mul(b), a: a16 as u16 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Weighted luma on the 16-bit channel range.
    pub fn luma16(&self) -> u32 {
        (299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b)) / 1000
    }

    /// [`Self::luma16`] folded to 8 bits.
    pub fn luma8(&self) -> u8 {
        (self.luma16() >> 8) as u8
    }
}

fn widen(c: u8) -> u16 {
    u16::from(c) << 8 | u16::from(c)
}

/// Anything that can report its bounds and a color per pixel.
///
/// Coordinates are in the source's own space: valid positions are the ones
/// inside [`PixelSource::bounds`]. Sources are only ever read.
pub trait PixelSource {
    fn bounds(&self) -> Rect;

    fn color_at(&self, x: u32, y: u32) -> Rgba16;
}

impl PixelSource for RgbaImage {
    fn bounds(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    fn color_at(&self, x: u32, y: u32) -> Rgba16 {
        self.get_pixel_checked(x, y)
            .map_or(Rgba16::TRANSPARENT, |p| Rgba16::from_straight_rgba8(p.0))
    }
}

impl PixelSource for GrayImage {
    fn bounds(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    fn color_at(&self, x: u32, y: u32) -> Rgba16 {
        self.get_pixel_checked(x, y)
            .map_or(Rgba16::TRANSPARENT, |p| Rgba16::from_gray8(p.0[0]))
    }
}

impl PixelSource for DynamicImage {
    fn bounds(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    fn color_at(&self, x: u32, y: u32) -> Rgba16 {
        if !self.in_bounds(x, y) {
            return Rgba16::TRANSPARENT;
        }
        Rgba16::from_straight_rgba8(self.get_pixel(x, y).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    #[test]
    fn test_gray8_widening() {
        assert_eq!(Rgba16::from_gray8(0xab).r, 0xabab);
        assert_eq!(Rgba16::from_gray8(0xff), Rgba16::WHITE);
        assert_eq!(Rgba16::from_gray8(0), Rgba16::BLACK);
    }

    #[test]
    fn test_premultiply_opaque_is_identity() {
        let c = Rgba16::from_straight_rgba8([10, 20, 30, 255]);
        assert_eq!((c.r, c.g, c.b, c.a), (0x0a0a, 0x1414, 0x1e1e, 0xffff));
    }

    #[test]
    fn test_premultiply_half_alpha() {
        let c = Rgba16::from_straight_rgba8([255, 255, 255, 128]);
        assert_eq!(c.a, 0x8080);
        assert_eq!(c.r, 0x8080);
    }

    #[test]
    fn test_luma_extremes() {
        assert_eq!(Rgba16::WHITE.luma8(), 255);
        assert_eq!(Rgba16::BLACK.luma8(), 0);
        // Pure red: 299 * 0xffff / 1000 = 19594 (truncated), >> 8 = 76
        let red = Rgba16::from_straight_rgba8([255, 0, 0, 255]);
        assert_eq!(red.luma16(), 19594);
        assert_eq!(red.luma8(), 76);
    }

    #[test]
    fn test_gray_image_source() {
        let img = GrayImage::from_pixel(3, 2, Luma([200]));
        assert_eq!(img.bounds(), Rect::from_size(3, 2));
        assert_eq!(img.color_at(2, 1), Rgba16::from_gray8(200));
        assert_eq!(img.color_at(3, 0), Rgba16::TRANSPARENT);
    }

    #[test]
    fn test_dynamic_image_source_matches_rgba() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([40, 80, 120, 200]));
        let dynamic = DynamicImage::ImageRgba8(rgba.clone());
        assert_eq!(dynamic.color_at(1, 1), rgba.color_at(1, 1));
        assert_eq!(dynamic.color_at(5, 5), Rgba16::TRANSPARENT);
    }
}
