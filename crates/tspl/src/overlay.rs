//! Patch pixels of an encoded `BITMAP` command without decoding it.
//!
//! The base buffer is copied once and only the payload bits under the
//! overlay are rewritten, so the result carries no decode/re-encode
//! artifacts and the caller's buffer is never modified.

use bin_img::BinaryImage;
use tracing::debug;

use crate::bitmap::{BitmapHeader, parse_bitmap_header};
use crate::{Result, TsplError};

/// Overlay `overlay` onto the `BITMAP` command in `base` at pixel offset
/// `(x_off, y_off)`.
///
/// `base` must start with the command unless `base_header` is given, in
/// which case its offsets are used as-is. Overlay pixels overwrite the base
/// in both directions (on and off), with the encoder's bit layout.
pub fn overlay(
    base_header: Option<&BitmapHeader>,
    base: &[u8],
    overlay: Option<&BinaryImage>,
    x_off: i64,
    y_off: i64,
) -> Result<Vec<u8>> {
    let overlay = overlay.ok_or(TsplError::NilOverlay)?;
    if x_off < 0 || y_off < 0 {
        return Err(TsplError::NegativeOffset { x: x_off, y: y_off });
    }
    if base.is_empty() {
        return Err(TsplError::EmptyBase);
    }
    let header = match base_header {
        Some(h) => *h,
        None => parse_bitmap_header(base)?,
    };

    let needed = header.payload_end();
    if needed > base.len() {
        return Err(TsplError::BaseTooShort { needed, actual: base.len() });
    }

    let (ov_w, ov_h) = (overlay.width(), overlay.height());
    if ov_w == 0 || ov_h == 0 {
        return Err(TsplError::InvalidOverlaySize { width: ov_w, height: ov_h });
    }
    // A caller-supplied header may claim more width than its rows hold.
    let base_width = header.width.min(header.row_bytes.saturating_mul(8));
    let past_x = x_off.checked_add(i64::from(ov_w)).is_none_or(|end| end > base_width);
    let past_y = y_off.checked_add(i64::from(ov_h)).is_none_or(|end| end > header.height);
    if past_x || past_y {
        return Err(TsplError::OverlayOutOfBounds {
            base_width,
            base_height: header.height,
            overlay_width: ov_w,
            overlay_height: ov_h,
            x: x_off,
            y: y_off,
        });
    }

    // Bounds above keep every target inside the payload, so the offsets fit.
    let target = Target {
        header_end: header.header_end,
        row_bytes: header.row_bytes as usize,
        x_off: x_off as usize,
        y_off: y_off as usize,
    };
    let mut res = base.to_vec();
    if target.x_off % 8 == 0 && overlay.is_byte_aligned() {
        patch_bytes(&mut res, overlay, &target);
    } else {
        patch_bits(&mut res, overlay, &target);
    }

    debug!(
        ov_w,
        ov_h,
        x_off,
        y_off,
        aligned = target.x_off % 8 == 0 && overlay.is_byte_aligned(),
        "Patched BITMAP payload"
    );
    Ok(res)
}

/// [`overlay`] at offset (0, 0).
pub fn overlay_at_top_left(
    base_header: Option<&BitmapHeader>,
    base: &[u8],
    overlay_img: Option<&BinaryImage>,
) -> Result<Vec<u8>> {
    overlay(base_header, base, overlay_img, 0, 0)
}

/// [`overlay`] onto the first `BITMAP` command of a full command sequence.
pub fn overlay_sequence(base: &[u8], overlay_img: &BinaryImage, x_off: i64, y_off: i64) -> Result<Vec<u8>> {
    if base.is_empty() {
        return Err(TsplError::EmptyBase);
    }
    let header = BitmapHeader::locate(base)?;
    overlay(Some(&header), base, Some(overlay_img), x_off, y_off)
}

struct Target {
    header_end: usize,
    row_bytes: usize,
    x_off: usize,
    y_off: usize,
}

/// Whole-byte copy when both sides start on a byte boundary.
fn patch_bytes(res: &mut [u8], overlay: &BinaryImage, t: &Target) {
    let n = (overlay.width() / 8) as usize;
    let mut packed = vec![0u8; n * overlay.height() as usize];
    overlay.pack_rows_into(&mut packed, n);
    for (y, row) in packed.chunks_exact(n).enumerate() {
        let start = t.header_end + (y + t.y_off) * t.row_bytes + t.x_off / 8;
        res[start..start + n].copy_from_slice(row);
    }
}

fn patch_bits(res: &mut [u8], overlay: &BinaryImage, t: &Target) {
    let b = overlay.bounds();
    for y in 0..b.height() {
        for x in 0..b.width() {
            let on = overlay.is_white(b.min_x + x, b.min_y + y);
            set_payload_bit(res, t, x as usize + t.x_off, y as usize + t.y_off, on);
        }
    }
}

fn set_payload_bit(body: &mut [u8], t: &Target, x: usize, y: usize, on: bool) {
    let i = t.header_end + y * t.row_bytes + x / 8;
    let mask = 0x80u8 >> (x % 8);
    if on {
        body[i] |= mask;
    } else {
        body[i] &= !mask;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::encode;
    use crate::decode::decode;
    use bin_img::Rect;

    fn base_command(width: u32, height: u32, on: bool) -> Vec<u8> {
        let mut img = BinaryImage::allocate(width, height).unwrap();
        img.fill(on);
        encode(&img).bytes
    }

    fn checker(width: u32, height: u32) -> BinaryImage {
        let mut img = BinaryImage::allocate(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                img.set(x, y, (x + y) % 2 == 0);
            }
        }
        img
    }

    #[test]
    fn test_validation_order() {
        let base = base_command(16, 16, false);
        let ov = BinaryImage::allocate(8, 8).unwrap();

        assert_eq!(overlay(None, &base, None, -1, 0), Err(TsplError::NilOverlay));
        assert_eq!(
            overlay(None, &base, Some(&ov), -1, 2),
            Err(TsplError::NegativeOffset { x: -1, y: 2 })
        );
        assert_eq!(overlay(None, &[], Some(&ov), 0, 0), Err(TsplError::EmptyBase));
        assert_eq!(overlay(None, b"CLS", Some(&ov), 0, 0), Err(TsplError::NotABitmapLine));
        assert_eq!(
            overlay(None, &base[..base.len() - 1], Some(&ov), 0, 0),
            Err(TsplError::BaseTooShort { needed: base.len(), actual: base.len() - 1 })
        );
        let empty = ov.sub_image(Rect::new(0, 0, 0, 0));
        assert_eq!(
            overlay(None, &base, Some(&empty), 0, 0),
            Err(TsplError::InvalidOverlaySize { width: 0, height: 0 })
        );
    }

    #[test]
    fn test_out_of_bounds() {
        // 12x12 pixels of content inside a 16-pixel-wide command, cut to 12 rows.
        let mut body = b"BITMAP 0,0,2,12,1,".to_vec();
        body.extend(std::iter::repeat_n(0u8, 24));
        let header = BitmapHeader { row_bytes: 2, width: 12, height: 12, header_end: 18 };
        let ov = checker(16, 10).sub_image(Rect::from_size(10, 10));

        assert!(matches!(
            overlay(Some(&header), &body, Some(&ov), 5, 5),
            Err(TsplError::OverlayOutOfBounds { .. })
        ));
        assert!(overlay(Some(&header), &body, Some(&ov), 0, 0).is_ok());
        assert!(overlay(Some(&header), &body, Some(&ov), 2, 2).is_ok());
        assert!(overlay(Some(&header), &body, Some(&ov), 3, 0).is_err());
    }

    #[test]
    fn test_huge_offsets_are_out_of_bounds() {
        let base = base_command(16, 4, false);
        let ov = BinaryImage::allocate(8, 1).unwrap();
        for (x, y) in [(i64::MAX, 0), (0, i64::MAX), (i64::MAX, i64::MAX), (i64::MAX - 7, 0)] {
            assert_eq!(
                overlay(None, &base, Some(&ov), x, y),
                Err(TsplError::OverlayOutOfBounds {
                    base_width: 16,
                    base_height: 4,
                    overlay_width: 8,
                    overlay_height: 1,
                    x,
                    y,
                })
            );
        }
    }

    #[test]
    fn test_top_left_only_changes_overlay_region() {
        let base = base_command(24, 12, true);
        let ov = checker(16, 10).sub_image(Rect::from_size(10, 10));
        let patched = overlay_at_top_left(None, &base, Some(&ov)).unwrap();

        let before = decode(&base).unwrap().image;
        let after = decode(&patched).unwrap().image;
        for y in 0..12 {
            for x in 0..24 {
                if x < 10 && y < 10 {
                    assert_eq!(after.get(x, y), (x + y) % 2 == 0, "({x}, {y})");
                } else {
                    assert_eq!(after.get(x, y), before.get(x, y), "({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_base_is_not_mutated() {
        let base = base_command(16, 4, false);
        let snapshot = base.clone();
        let mut ov = BinaryImage::allocate(8, 2).unwrap();
        ov.fill(true);
        let patched = overlay(None, &base, Some(&ov), 3, 1).unwrap();
        assert_eq!(base, snapshot);
        assert_ne!(patched, base);
    }

    #[test]
    fn test_unaligned_offset_writes_exact_bits() {
        let base = base_command(16, 1, false);
        let mut ov = BinaryImage::allocate(8, 1).unwrap();
        ov.fill(true);
        let patched = overlay(None, &base, Some(&ov), 3, 0).unwrap();
        let header_end = parse_bitmap_header(&patched).unwrap().header_end;
        assert_eq!(&patched[header_end..], &[0x1f, 0xe0]);
    }

    #[test]
    fn test_overlay_clears_bits_too() {
        let base = base_command(16, 1, true);
        let ov = BinaryImage::allocate(8, 1).unwrap();
        let patched = overlay(None, &base, Some(&ov), 8, 0).unwrap();
        let header_end = parse_bitmap_header(&patched).unwrap().header_end;
        assert_eq!(&patched[header_end..], &[0xff, 0x00]);
    }

    #[test]
    fn test_aligned_and_bitwise_paths_agree() {
        let base = base_command(32, 6, false);
        let ov = checker(16, 4);
        let aligned = overlay(None, &base, Some(&ov), 8, 1).unwrap();

        // The same pixels seen through an unaligned view take the bitwise path.
        let parent = BinaryImage::allocate(24, 4).unwrap();
        let mut shifted = parent.sub_image(Rect::new(3, 0, 19, 4));
        for y in 0..4 {
            for x in 0..16 {
                shifted.set(3 + x, y, ov.get(x, y));
            }
        }
        let bitwise = overlay(None, &base, Some(&shifted), 8, 1).unwrap();
        assert_eq!(aligned, bitwise);
    }

    #[test]
    fn test_trailer_bytes_preserved() {
        let mut base = base_command(8, 1, false);
        base.extend_from_slice(b"PRINT 1,1\r\n");
        let mut ov = BinaryImage::allocate(8, 1).unwrap();
        ov.fill(true);
        let patched = overlay(None, &base, Some(&ov), 0, 0).unwrap();
        assert!(patched.ends_with(b"\xffPRINT 1,1\r\n"));
    }

    #[test]
    fn test_overlay_sequence() {
        let mut base = b"CLS\r\n".to_vec();
        base.extend_from_slice(&base_command(8, 2, false));
        let mut ov = BinaryImage::allocate(8, 1).unwrap();
        ov.fill(true);
        let patched = overlay_sequence(&base, &ov, 0, 1).unwrap();
        assert!(patched.starts_with(b"CLS\r\nBITMAP"));
        assert_eq!(&patched[patched.len() - 2..], &[0x00, 0xff]);
    }
}
