// Final image assembly: the foil cover drawn over the prize, masked by what is
// still unscratched and faded out once the card completes.

use crate::error::{Result, ScratchError};
use crate::gamma::GammaLut;
use crate::raster::{OPAQUE, Raster};
use crate::types::FrameBuffer;

/// Write `cover` over `prize` into `screen`, weighting each pixel by its
/// coverage and by `opacity` (1 = solid foil, 0 = faded away).
pub fn composite_cover<R: Raster + ?Sized>(
    screen: &mut FrameBuffer,
    prize: &FrameBuffer,
    cover: &FrameBuffer,
    coverage: &R,
    opacity: f32,
    lut: &GammaLut,
) -> Result<()> {
    if !screen.same_size(prize) || !screen.same_size(cover) {
        return Err(ScratchError::DimensionMismatch {
            width: screen.width as u32,
            height: screen.height as u32,
            actual_width: cover.width.max(prize.width) as u32,
            actual_height: cover.height.max(prize.height) as u32,
        });
    }
    if coverage.width() as usize != screen.width || coverage.height() as usize != screen.height {
        return Err(ScratchError::DimensionMismatch {
            width: screen.width as u32,
            height: screen.height as u32,
            actual_width: coverage.width(),
            actual_height: coverage.height(),
        });
    }

    let opacity = opacity.clamp(0.0, 1.0);
    let w = screen.width;
    for (i, out) in screen.pixels.iter_mut().enumerate() {
        let c = coverage.get((i % w) as u32, (i / w) as u32).unwrap_or(0);
        let a = (c as f32 / OPAQUE as f32) * opacity;
        *out = if a <= 0.0 {
            prize.pixels[i]
        } else if a >= 1.0 {
            cover.pixels[i]
        } else {
            lut.mix(cover.pixels[i], prize.pixels[i], a)
        };
    }
    Ok(())
}
