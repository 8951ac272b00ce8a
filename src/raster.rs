// Coverage rasters the surface erases into.
// A coverage of 255 is untouched foil; 0 is fully scratched away.

pub const OPAQUE: u8 = 255;
pub const TRANSPARENT: u8 = 0;

/// Minimal raster backend: one coverage byte per pixel.
///
/// Hosts can put a framebuffer, a canvas bridge or a plain bitmap behind this.
pub trait Raster {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Coverage at `(x, y)`, or `None` outside the raster.
    fn get(&self, x: u32, y: u32) -> Option<u8>;

    /// Writes outside the raster are ignored.
    fn set(&mut self, x: u32, y: u32, coverage: u8);

    fn fill(&mut self, coverage: u8) {
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.set(x, y, coverage);
            }
        }
    }
}

/// Headless in-memory coverage bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverageMask {
    width: u32,
    height: u32,
    coverage: Vec<u8>, // length = width * height, row-major
}

impl CoverageMask {
    pub fn opaque(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![OPAQUE; width as usize * height as usize],
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.coverage
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl Raster for CoverageMask {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn get(&self, x: u32, y: u32) -> Option<u8> {
        self.index(x, y).map(|i| self.coverage[i])
    }

    #[inline]
    fn set(&mut self, x: u32, y: u32, coverage: u8) {
        if let Some(i) = self.index(x, y) {
            self.coverage[i] = coverage;
        }
    }

    fn fill(&mut self, coverage: u8) {
        self.coverage.fill(coverage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_in_bounds() {
        let mut mask = CoverageMask::opaque(4, 3);
        assert_eq!(mask.get(3, 2), Some(OPAQUE));
        mask.set(3, 2, TRANSPARENT);
        assert_eq!(mask.get(3, 2), Some(TRANSPARENT));
        assert_eq!(mask.as_slice()[2 * 4 + 3], TRANSPARENT);
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut mask = CoverageMask::opaque(4, 3);
        mask.set(4, 0, TRANSPARENT);
        mask.set(0, 3, TRANSPARENT);
        assert_eq!(mask.get(4, 0), None);
        assert!(mask.as_slice().iter().all(|&c| c == OPAQUE));
    }

    #[test]
    fn test_fill_overwrites_everything() {
        let mut mask = CoverageMask::opaque(3, 2);
        mask.set(1, 1, TRANSPARENT);
        mask.fill(OPAQUE);
        assert!(mask.as_slice().iter().all(|&c| c == OPAQUE));
        mask.fill(TRANSPARENT);
        assert_eq!(mask.get(2, 1), Some(TRANSPARENT));
    }
}
