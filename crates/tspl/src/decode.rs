//! Decoding `BITMAP` commands back into packed images.

use bin_img::BinaryImage;
use tracing::{debug, warn};

use crate::bitmap::{BitmapHeader, encode, parse_bitmap_header};
use crate::{Result, TsplError};

/// Largest payload a header may declare, in bytes. The buffer is sized from
/// the header before the input is known to hold that many bytes.
pub const MAX_PAYLOAD_LEN: usize = 64 << 20;

/// A decoded command: everything before the payload, the image, and
/// everything after it, with the surrounding bytes borrowed verbatim.
#[derive(Debug, Clone)]
pub struct DecodedImage<'a> {
    pub header: &'a [u8],
    pub image: BinaryImage,
    pub trailer: &'a [u8],
}

impl DecodedImage<'_> {
    /// Header, the image packed again, and trailer.
    ///
    /// Reproduces the input exactly when its payload was complete. A truncated
    /// payload comes back zero-filled to full length.
    pub fn reassemble(&self) -> Vec<u8> {
        let payload = encode(&self.image);
        let mut out = Vec::with_capacity(self.header.len() + payload.payload().len() + self.trailer.len());
        out.extend_from_slice(self.header);
        out.extend_from_slice(payload.payload());
        out.extend_from_slice(self.trailer);
        out
    }
}

/// Decode a buffer that starts with a `BITMAP` command.
///
/// A payload cut short is not an error: pixels whose byte is missing stay off.
pub fn decode(body: &[u8]) -> Result<DecodedImage<'_>> {
    let header = parse_bitmap_header(body)?;
    decode_with(body, &header)
}

/// Decode the first `BITMAP` command of a full command sequence.
///
/// The returned header covers every byte before the payload, setup lines
/// included, so [`DecodedImage::reassemble`] yields the whole sequence.
pub fn decode_sequence(body: &[u8]) -> Result<DecodedImage<'_>> {
    let header = BitmapHeader::locate(body)?;
    decode_with(body, &header)
}

fn decode_with<'a>(body: &'a [u8], h: &BitmapHeader) -> Result<DecodedImage<'a>> {
    let invalid = || TsplError::InvalidImageSize { width: h.width, height: h.height };
    if h.width <= 0 || h.height <= 0 {
        return Err(invalid());
    }
    let width = u32::try_from(h.width).map_err(|_| invalid())?;
    let height = u32::try_from(h.height).map_err(|_| invalid())?;

    // Rows are stored exactly as the image buffer lays them out, so the
    // available payload bytes are copied as-is.
    let payload_len = h.payload_len();
    if payload_len > MAX_PAYLOAD_LEN {
        return Err(invalid());
    }
    let payload_end = h.payload_end().min(body.len());
    let available = &body[h.header_end..payload_end];
    if available.len() < payload_len {
        warn!(
            expected = payload_len,
            got = available.len(),
            "BITMAP payload truncated, missing pixels left off"
        );
    }
    let mut packed = vec![0u8; payload_len];
    packed[..available.len()].copy_from_slice(available);
    let image = BinaryImage::from_packed(width, height, packed)?;

    debug!(width, height, header_end = h.header_end, "Decoded BITMAP command");
    Ok(DecodedImage {
        header: &body[..h.header_end],
        image,
        trailer: &body[payload_end..],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_command() -> Vec<u8> {
        let mut body = b"BITMAP 0,0,2,2,1,".to_vec();
        body.extend_from_slice(&[0b1000_0001, 0x00, 0x00, 0xff]);
        body.extend_from_slice(b"PRINT 1,1\r\n");
        body
    }

    #[test]
    fn test_decode_pixels_and_parts() {
        let body = sample_command();
        let decoded = decode(&body).unwrap();
        assert_eq!(decoded.header, b"BITMAP 0,0,2,2,1,");
        assert_eq!(decoded.trailer, b"PRINT 1,1\r\n");
        let img = &decoded.image;
        assert_eq!((img.width(), img.height()), (16, 2));
        assert!(img.get(0, 0));
        assert!(img.get(7, 0));
        assert!(!img.get(8, 0));
        assert!(!img.get(0, 1));
        assert!((8..16).all(|x| img.get(x, 1)));
    }

    #[test]
    fn test_reassemble_is_exact() {
        let body = sample_command();
        assert_eq!(decode(&body).unwrap().reassemble(), body);
    }

    #[test]
    fn test_decode_truncated_payload_leaves_pixels_off() {
        let mut body = b"BITMAP 0,0,1,3,1,".to_vec();
        body.extend_from_slice(&[0xff, 0xff]);
        let decoded = decode(&body).unwrap();
        assert!((0..8).all(|x| decoded.image.get(x, 1)));
        assert!((0..8).all(|x| !decoded.image.get(x, 2)));
        assert!(decoded.trailer.is_empty());
    }

    #[test]
    fn test_decode_header_only() {
        let decoded = decode(b"BITMAP 0,0,1,1,1,").unwrap();
        assert!(!decoded.image.get(0, 0));
        assert!(decoded.trailer.is_empty());
    }

    #[test]
    fn test_decode_rejects_non_positive_size() {
        assert_eq!(
            decode(b"BITMAP 0,0,0,4,1,").unwrap_err(),
            TsplError::InvalidImageSize { width: 0, height: 4 }
        );
        assert_eq!(
            decode(b"BITMAP 0,0,2,-1,1,").unwrap_err(),
            TsplError::InvalidImageSize { width: 16, height: -1 }
        );
    }

    #[test]
    fn test_decode_rejects_oversized_header_without_allocating() {
        assert_eq!(
            decode(b"BITMAP 0,0,536870911,4000000000,1,").unwrap_err(),
            TsplError::InvalidImageSize { width: 536870911 * 8, height: 4000000000 }
        );
        // Just over the cap: 1024 row bytes by 65537 rows.
        assert!(matches!(
            decode(b"BITMAP 0,0,1024,65537,1,"),
            Err(TsplError::InvalidImageSize { .. })
        ));
    }

    #[test]
    fn test_decode_accepts_cap_sized_truncated_header() {
        // Exactly at the cap, with no payload bytes present.
        let decoded = decode(b"BITMAP 0,0,1024,65536,1,").unwrap();
        assert_eq!((decoded.image.width(), decoded.image.height()), (8192, 65536));
        assert!(decoded.trailer.is_empty());
    }

    #[test]
    fn test_decode_propagates_header_errors() {
        assert_eq!(decode(b"CLS\r\n").unwrap_err(), TsplError::NotABitmapLine);
    }

    #[test]
    fn test_decode_sequence_keeps_setup_lines_in_header() {
        let mut body = b"SIZE 1.0 mm, 0.1 mm\r\nCLS\r\n".to_vec();
        let prefix_len = body.len();
        body.extend_from_slice(&sample_command());
        let decoded = decode_sequence(&body).unwrap();
        assert_eq!(decoded.header.len(), prefix_len + 17);
        assert!(decoded.image.get(0, 0));
        assert_eq!(decoded.reassemble(), body);
    }
}
