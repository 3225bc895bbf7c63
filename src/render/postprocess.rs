//! Crop transparent margins and normalize the capture to the output size.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use log::debug;

use crate::render::RenderedImage;
use crate::{Result, Viewport};

/// Pixel rectangle inside an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Smallest rectangle containing every pixel with non-zero alpha.
///
/// Returns `None` for a fully transparent image.
pub fn opaque_bounds(img: &RgbaImage) -> Option<Bounds> {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut any = false;

    for (x, y, px) in img.enumerate_pixels() {
        if px[3] == 0 {
            continue;
        }
        any = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    any.then(|| Bounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Decode a PNG capture, crop it to its opaque area, resize to `output`
/// with Lanczos3 and re-encode.
pub fn normalize(raw: &[u8], output: Viewport) -> Result<RenderedImage> {
    let mut img = image::load_from_memory_with_format(raw, ImageFormat::Png)?.to_rgba8();
    let (w, h) = img.dimensions();

    if let Some(b) = opaque_bounds(&img) {
        if (b.x, b.y, b.width, b.height) != (0, 0, w, h) {
            debug!("cropping capture {}x{} to {:?}", w, h, b);
            img = imageops::crop_imm(&img, b.x, b.y, b.width, b.height).to_image();
        }
    }

    if img.dimensions() != (output.width, output.height) {
        img = imageops::resize(&img, output.width, output.height, FilterType::Lanczos3);
    }

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    Ok(RenderedImage {
        bytes,
        width: output.width,
        height: output.height,
    })
}
