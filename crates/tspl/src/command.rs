//! Full print job: label setup lines, the bitmap, and the print trailer.

use bin_img::{BinaryImage, PixelSource};
use tracing::debug;

use crate::Result;
use crate::bitmap::{EncodedBitmap, encode, encode_source};
use crate::options::TsplOptions;

/// Prints one copy of one label.
pub const PRINT_TRAILER: &str = "PRINT 1,1\r\n";

/// Label setup lines for a `width` x `height` dot label.
///
/// The size line is in millimetres with one decimal: dots divided by
/// [`TsplOptions::effective_dots_per_unit`].
pub fn header(width: u32, height: u32, opts: &TsplOptions) -> String {
    let dpu = f64::from(opts.effective_dots_per_unit());
    let peel = if opts.peel { "ON" } else { "OFF" };
    format!(
        "SET CUTTER OFF\r\nSET PARTICAL_CUTTER OFF\r\n\
         SET PEEL {peel}\r\nSIZE {:.1} mm, {:.1} mm\r\nCLS\r\n",
        f64::from(width) / dpu,
        f64::from(height) / dpu,
    )
}

/// Setup lines for a `width` x `height` label, `img` as a `BITMAP` at the
/// origin, then [`PRINT_TRAILER`].
pub fn full_encode(width: u32, height: u32, img: &BinaryImage, opts: &TsplOptions) -> Vec<u8> {
    assemble(width, height, &encode(img), opts)
}

/// [`full_encode`] for a non-binary source, thresholded at the default level.
pub fn full_encode_source<S: PixelSource + ?Sized>(
    width: u32,
    height: u32,
    src: &S,
    opts: &TsplOptions,
) -> Result<Vec<u8>> {
    Ok(assemble(width, height, &encode_source(src)?, opts))
}

fn assemble(width: u32, height: u32, bitmap: &EncodedBitmap, opts: &TsplOptions) -> Vec<u8> {
    let header = header(width, height, opts);
    let mut res = Vec::with_capacity(header.len() + bitmap.bytes.len() + PRINT_TRAILER.len());
    res.extend_from_slice(header.as_bytes());
    res.extend_from_slice(&bitmap.bytes);
    res.extend_from_slice(PRINT_TRAILER.as_bytes());
    debug!(width, height, peel = opts.peel, len = res.len(), "Built TSPL print job");
    res
}
