use crate::error::{Result, ScratchError};
use crate::types::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BRUSH_RADIUS: f32 = 20.0;
pub const DEFAULT_COMPLETION_THRESHOLD: u8 = 70;
pub const DEFAULT_STRIDE: usize = 32;

/// What one step of `stride` advances over while sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrideUnit {
    /// Every Nth pixel of the check region, row-major.
    #[default]
    Pixels,
    /// Every Nth byte of a flattened RGBA copy of the region; a byte
    /// offset lands on pixel `offset / 4`.
    RgbaBytes,
}

impl StrideUnit {
    pub(crate) fn bytes_per_step(self) -> usize {
        match self {
            StrideUnit::Pixels => 1,
            StrideUnit::RgbaBytes => 4,
        }
    }
}

/// Maps pointer coordinates into raster coordinates before stamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordTransform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for CoordTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CoordTransform {
    pub const IDENTITY: CoordTransform = CoordTransform {
        scale_x: 1.0,
        scale_y: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn uniform(scale: f32) -> Self {
        Self { scale_x: scale, scale_y: scale, ..Self::IDENTITY }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale_x + self.offset_x, p.y * self.scale_y + self.offset_y)
    }

    fn is_usable(&self) -> bool {
        [self.scale_x, self.scale_y, self.offset_x, self.offset_y]
            .iter()
            .all(|v| v.is_finite())
            && self.scale_x != 0.0
            && self.scale_y != 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub brush_radius: f32,
    /// Percentage (0..=100) that must be exceeded to complete the card.
    pub completion_threshold: u8,
    pub check_region: Option<Rect>,
    pub stride: usize,
    pub stride_unit: StrideUnit,
    pub transform: CoordTransform,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
            check_region: None,
            stride: DEFAULT_STRIDE,
            stride_unit: StrideUnit::Pixels,
            transform: CoordTransform::IDENTITY,
        }
    }
}

impl SurfaceConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ..Self::default() }
    }

    pub fn with_brush_radius(mut self, radius: f32) -> Self {
        self.brush_radius = radius;
        self
    }

    pub fn with_threshold(mut self, percent: u8) -> Self {
        self.completion_threshold = percent;
        self
    }

    pub fn with_check_region(mut self, region: Rect) -> Self {
        self.check_region = Some(region);
        self
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_stride_unit(mut self, unit: StrideUnit) -> Self {
        self.stride_unit = unit;
        self
    }

    pub fn with_transform(mut self, transform: CoordTransform) -> Self {
        self.transform = transform;
        self
    }

    /// The rectangle sampled for completion; the whole surface when unset.
    pub fn region(&self) -> Rect {
        self.check_region
            .unwrap_or(Rect::new(0, 0, self.width, self.height))
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ScratchError::config("Surface dimensions must be non-zero"));
        }

        if !self.brush_radius.is_finite() || self.brush_radius <= 0.0 {
            return Err(ScratchError::config(format!(
                "Brush radius must be positive, got {}",
                self.brush_radius
            )));
        }

        if self.completion_threshold > 100 {
            return Err(ScratchError::config(format!(
                "Completion threshold is a percentage, got {}",
                self.completion_threshold
            )));
        }

        if self.stride == 0 {
            return Err(ScratchError::config("Stride must be at least 1"));
        }

        if !self.transform.is_usable() {
            return Err(ScratchError::config("Coordinate transform must be finite with non-zero scale"));
        }

        if let Some(region) = self.check_region {
            if region.area() == 0 {
                return Err(ScratchError::config("Check region must not be empty"));
            }
            if !region.fits_within(self.width, self.height) {
                return Err(ScratchError::RegionOutOfBounds {
                    region,
                    width: self.width,
                    height: self.height,
                });
            }
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SurfaceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
