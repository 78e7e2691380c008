//! The `BITMAP` command: packed payload encoding and header parsing.
//!
//! Wire form: `BITMAP <x>,<y>,<row_bytes>,<height>,<mode>,` directly followed
//! by `row_bytes * height` bytes, row-major, MSB first, bit 1 = white.

use bin_img::{BinaryImage, DEFAULT_THRESHOLD, PixelSource};
use serde::Serialize;
use tracing::debug;

use crate::{Result, TsplError};

/// Literal every bitmap command starts with.
pub const BITMAP_PREFIX: &[u8] = b"BITMAP";

/// Number of comma-terminated fields in the header.
const HEADER_FIELDS: usize = 5;

/// Output of [`encode`]: the header text followed by the packed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBitmap {
    /// Length of the `BITMAP ...,` text at the start of `bytes`.
    pub header_len: usize,
    pub bytes: Vec<u8>,
}

impl EncodedBitmap {
    pub fn header(&self) -> &[u8] {
        &self.bytes[..self.header_len]
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[self.header_len..]
    }
}

/// Encode the visible rectangle of `img` as a `BITMAP` command at (0, 0).
pub fn encode(img: &BinaryImage) -> EncodedBitmap {
    let (width, height) = (img.width(), img.height());
    let row_bytes = width.div_ceil(8) as usize;

    let header = format!("BITMAP 0,0,{row_bytes},{height},1,");
    let header_len = header.len();
    let mut bytes = Vec::with_capacity(header_len + row_bytes * height as usize);
    bytes.extend_from_slice(header.as_bytes());
    bytes.resize(header_len + row_bytes * height as usize, 0);
    img.pack_rows_into(&mut bytes[header_len..], row_bytes);

    debug!(width, height, row_bytes, len = bytes.len(), "Encoded BITMAP command");
    EncodedBitmap { header_len, bytes }
}

/// Threshold an arbitrary source at [`DEFAULT_THRESHOLD`], then [`encode`] it.
pub fn encode_source<S: PixelSource + ?Sized>(src: &S) -> Result<EncodedBitmap> {
    let img = BinaryImage::from_threshold(src, DEFAULT_THRESHOLD)?;
    Ok(encode(&img))
}

/// Geometry of a `BITMAP` command found in a byte buffer.
///
/// Values are kept as parsed; [`crate::decode`] rejects non-positive sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitmapHeader {
    pub row_bytes: i64,
    /// `row_bytes * 8`.
    pub width: i64,
    pub height: i64,
    /// Offset of the first payload byte.
    pub header_end: usize,
}

impl BitmapHeader {
    /// Payload size in bytes. Negative dimensions count as zero.
    pub fn payload_len(&self) -> usize {
        let row_bytes = usize::try_from(self.row_bytes.max(0)).unwrap_or(usize::MAX);
        let height = usize::try_from(self.height.max(0)).unwrap_or(usize::MAX);
        row_bytes.saturating_mul(height)
    }

    /// Offset one past the last payload byte.
    pub fn payload_end(&self) -> usize {
        self.header_end.saturating_add(self.payload_len())
    }

    /// Find the `BITMAP` line inside a full command sequence and parse it.
    ///
    /// `header_end` is relative to the start of `body`.
    pub fn locate(body: &[u8]) -> Result<BitmapHeader> {
        let start = find_bitmap(body).ok_or(TsplError::NotABitmapLine)?;
        let mut header = parse_bitmap_header(&body[start..])?;
        header.header_end += start;
        Ok(header)
    }
}

/// Parse the `BITMAP` header at the very start of `body`.
///
/// The payload starts right after the fifth comma. The five fields are x,
/// y, row bytes, height and mode; x, y and mode must be integers but are
/// otherwise ignored.
pub fn parse_bitmap_header(body: &[u8]) -> Result<BitmapHeader> {
    if !body.starts_with(BITMAP_PREFIX) {
        return Err(TsplError::NotABitmapLine);
    }

    let fifth_comma = body
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b',')
        .nth(HEADER_FIELDS - 1)
        .map(|(i, _)| i)
        .ok_or_else(|| TsplError::InvalidHeaderFormat("fewer than five commas".into()))?;
    let header_end = fifth_comma + 1;

    let text = std::str::from_utf8(&body[BITMAP_PREFIX.len()..fifth_comma])
        .map_err(|_| TsplError::InvalidHeaderFormat("header is not valid text".into()))?;
    let mut fields = [0i64; HEADER_FIELDS];
    for (slot, field) in fields.iter_mut().zip(text.split(',')) {
        *slot = field
            .trim_start()
            .parse()
            .map_err(|_| TsplError::InvalidHeaderFormat(format!("bad integer field {field:?}")))?;
    }
    let [_x, _y, row_bytes, height, _mode] = fields;

    Ok(BitmapHeader {
        row_bytes,
        width: row_bytes.saturating_mul(8),
        height,
        header_end,
    })
}

/// Offset of the first `BITMAP` command that starts a line, if any.
pub fn find_bitmap(body: &[u8]) -> Option<usize> {
    body.windows(BITMAP_PREFIX.len())
        .enumerate()
        .find(|&(i, w)| w == BITMAP_PREFIX && (i == 0 || body[i - 1] == b'\n'))
        .map(|(i, _)| i)
}
