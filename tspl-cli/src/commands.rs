//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bin_img::{BinaryImage, Rect};
use clap::Args;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use serde::Serialize;
use tspl::{BitmapHeader, TsplOptions};

use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Source image (PNG)
    pub input: PathBuf,
    /// Output file for the TSPL job
    #[arg(short, long)]
    pub output: PathBuf,
    /// Luma level (0-255) at or above which a pixel is on
    #[arg(short, long)]
    pub threshold: Option<u8>,
    /// Rotate the image 180 degrees before encoding
    #[arg(long)]
    pub rotate: bool,
    /// Enable the peeler
    #[arg(long)]
    pub peel: bool,
    /// Printer dots per millimetre
    #[arg(long)]
    pub dots_per_unit: Option<u32>,
    /// Label width in dots (defaults to the padded image width)
    #[arg(long)]
    pub label_width: Option<u32>,
    /// Label height in dots (defaults to the image height)
    #[arg(long)]
    pub label_height: Option<u32>,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// TSPL job or bare BITMAP command
    pub input: PathBuf,
    /// Output PNG
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct OverlayArgs {
    /// TSPL job to patch
    pub base: PathBuf,
    /// Image to paste (PNG)
    pub image: PathBuf,
    /// Horizontal offset in pixels
    #[arg(short, default_value_t = 0)]
    pub x: i64,
    /// Vertical offset in pixels
    #[arg(short, default_value_t = 0)]
    pub y: i64,
    /// Luma level (0-255) at or above which a pixel is on
    #[arg(short, long)]
    pub threshold: Option<u8>,
    /// Output file for the patched job
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// TSPL job or bare BITMAP command
    pub input: PathBuf,
}

/// Header summary printed by `inspect`.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    /// Offset of the `BITMAP` line within the file.
    pub offset: usize,
    pub header: BitmapHeader,
    pub payload_len: usize,
    pub available: usize,
    pub truncated: bool,
    pub trailer_len: usize,
}

pub fn cmd_encode(args: &EncodeArgs, config: &AppConfig) -> anyhow::Result<()> {
    let src = open_image(&args.input)?;
    let mut img = threshold_padded(&src, args.threshold.unwrap_or(config.threshold))?;
    if args.rotate || config.rotate_print {
        img.rotate_180();
    }

    let opts = encode_options(args, config);
    let width = args.label_width.unwrap_or(img.width());
    let height = args.label_height.unwrap_or(img.height());
    let job = tspl::full_encode(width, height, &img, &opts);

    write_file(&args.output, &job)?;
    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        width,
        height,
        bytes = job.len(),
        "Encoded print job"
    );
    Ok(())
}

pub fn cmd_decode(args: &DecodeArgs) -> anyhow::Result<()> {
    let body = read_file(&args.input)?;
    let decoded = tspl::decode_sequence(&body)
        .with_context(|| format!("failed to decode {}", args.input.display()))?;
    decoded
        .image
        .to_gray_image()
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        width = decoded.image.width(),
        height = decoded.image.height(),
        "Decoded bitmap"
    );
    Ok(())
}

pub fn cmd_overlay(args: &OverlayArgs, config: &AppConfig) -> anyhow::Result<()> {
    let base = read_file(&args.base)?;
    let src = open_image(&args.image)?;
    let padded = threshold_padded(&src, args.threshold.unwrap_or(config.threshold))?;
    // Only the source pixels are pasted, never the padding.
    let ov = padded.sub_image(Rect::from_size(src.width(), src.height()));

    let patched = tspl::overlay_sequence(&base, &ov, args.x, args.y)
        .with_context(|| format!("failed to overlay {} onto {}", args.image.display(), args.base.display()))?;
    write_file(&args.output, &patched)?;
    tracing::info!(x = args.x, y = args.y, output = %args.output.display(), "Patched print job");
    Ok(())
}

pub fn cmd_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let body = read_file(&args.input)?;
    let report = inspect(&body).with_context(|| format!("failed to inspect {}", args.input.display()))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn inspect(body: &[u8]) -> tspl::Result<InspectReport> {
    let offset = tspl::find_bitmap(body).ok_or(tspl::TsplError::NotABitmapLine)?;
    let header = BitmapHeader::locate(body)?;
    let payload_len = header.payload_len();
    let available = body.len().saturating_sub(header.header_end).min(payload_len);
    Ok(InspectReport {
        offset,
        header,
        payload_len,
        available,
        truncated: available < payload_len,
        trailer_len: body.len().saturating_sub(header.payload_end()),
    })
}

/// Threshold `src` on a white canvas whose width is rounded up to whole
/// bytes. The padding columns come out on.
pub fn threshold_padded(src: &DynamicImage, threshold: u8) -> anyhow::Result<BinaryImage> {
    let (width, height) = src.dimensions();
    let padded_width = width.div_ceil(8) * 8;
    if padded_width == width {
        return Ok(BinaryImage::from_threshold(src, threshold)?);
    }

    let mut canvas = RgbaImage::from_pixel(padded_width, height, Rgba([255, 255, 255, 255]));
    image::imageops::replace(&mut canvas, &src.to_rgba8(), 0, 0);
    tracing::debug!(width, padded_width, height, "Padded image to byte width");
    Ok(BinaryImage::from_threshold(&canvas, threshold)?)
}

fn encode_options(args: &EncodeArgs, config: &AppConfig) -> TsplOptions {
    let mut opts = config.options.clone();
    if args.peel {
        opts = opts.with_peel(true);
    }
    if let Some(dpu) = args.dots_per_unit {
        opts = opts.with_dots_per_unit(dpu);
    }
    opts
}

fn open_image(path: &Path) -> anyhow::Result<DynamicImage> {
    image::open(path).with_context(|| format!("failed to open image {}", path.display()))
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
