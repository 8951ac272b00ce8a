// Loads the card artwork and converts it into buffers the surface and the window use.
// A cover becomes a 0x00RRGGBB frame plus its alpha plane (the initial coverage);
// a prize only needs the frame.

use crate::error::Result;
use crate::types::FrameBuffer;
use image::{ImageBuffer, Rgba, RgbaImage, imageops::FilterType};
use std::path::Path;

/// Decoded artwork, resized to the surface.
pub struct Layer {
    pub frame: FrameBuffer,
    pub alpha: Vec<u8>, // one byte per pixel, row-major
}

/// Decode an image file and fit it to `width x height`.
pub fn load_layer(path: &Path, width: u32, height: u32) -> Result<Layer> {
    let img = image::open(path)?.to_rgba8();
    tracing::info!(
        "Loaded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(layer_from_rgba(&img, width, height))
}

/// Fit an RGBA image to the surface and split it into colour and alpha.
pub fn layer_from_rgba(img: &RgbaImage, width: u32, height: u32) -> Layer {
    let resized;
    let img = if img.dimensions() == (width, height) {
        img
    } else {
        resized = image::imageops::resize(img, width, height, FilterType::Triangle);
        &resized
    };

    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    let mut alpha = Vec::with_capacity(pixels.capacity());
    for pixel in img.pixels() {
        // Each `pixel` is Rgba<u8>. We pack RGB as 0x00RRGGBB and keep A aside.
        let [r, g, b, a] = pixel.0;
        pixels.push(((r as u32) << 16) | ((g as u32) << 8) | b as u32);
        alpha.push(a);
    }

    Layer {
        frame: FrameBuffer {
            width: width as usize,
            height: height as usize,
            pixels,
        },
        alpha,
    }
}

/// Brushed silver foil with a diagonal sheen, used when no cover file is given.
pub fn foil_cover(width: u32, height: u32) -> RgbaImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let diag = (x + y) as f32 / (width + height).max(1) as f32;
        let sheen = (diag * std::f32::consts::TAU * 3.0).sin() * 18.0;
        let grain = ((x.wrapping_mul(7) ^ y.wrapping_mul(13)) % 9) as f32;
        let v = (170.0 + sheen + grain).clamp(0.0, 255.0) as u8;
        Rgba([v, v, v.saturating_add(8), 255])
    })
}

/// Warm vertical gradient standing in for prize artwork.
pub fn prize_backdrop(width: u32, height: u32) -> RgbaImage {
    ImageBuffer::from_fn(width, height, |_x, y| {
        let t = y as f32 / height.max(1) as f32;
        let r = 255.0 - 40.0 * t;
        let g = 190.0 - 120.0 * t;
        let b = 40.0 + 60.0 * t;
        Rgba([r as u8, g as u8, b as u8, 255])
    })
}
