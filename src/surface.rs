//! The scratchable layer: pointer-driven erasure plus reveal tracking.
//!
//! A surface starts `Unloaded`, becomes `Ready` once its cover image is in
//! place, and moves to `Finished` the first time the revealed percentage
//! exceeds the configured threshold. Only `reset()` or `reload()` leaves
//! `Finished`.

use crate::config::SurfaceConfig;
use crate::error::{Result, ScratchError};
use crate::raster::{CoverageMask, OPAQUE, Raster, TRANSPARENT};
use crate::stroke::{erase_disc, stamps_on_raster};
use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Unloaded,
    Ready,
    Finished,
}

/// Receives every erase stamp as it is applied (raster-space centre).
///
/// Purely cosmetic listeners hang off this; nothing they do feeds back
/// into reveal tracking.
pub trait StrokeObserver {
    fn stamped(&mut self, centre: Point, radius: f32);
}

impl StrokeObserver for () {
    fn stamped(&mut self, _centre: Point, _radius: f32) {}
}

pub struct ScratchSurface<R: Raster = CoverageMask> {
    config: SurfaceConfig,
    raster: R,
    pristine: Vec<u8>,
    state: SurfaceState,
    drawing: bool,
    last_point: Option<Point>,
    revealed: u8,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl ScratchSurface<CoverageMask> {
    /// Surface backed by an in-memory mask, fully opaque until scratched.
    pub fn new(config: SurfaceConfig) -> Result<Self> {
        let raster = CoverageMask::opaque(config.width, config.height);
        Self::with_raster(config, raster)
    }
}

impl<R: Raster> ScratchSurface<R> {
    pub fn with_raster(config: SurfaceConfig, raster: R) -> Result<Self> {
        config.validate()?;
        if raster.width() != config.width || raster.height() != config.height {
            return Err(ScratchError::DimensionMismatch {
                width: config.width,
                height: config.height,
                actual_width: raster.width(),
                actual_height: raster.height(),
            });
        }

        Ok(Self {
            config,
            raster,
            pristine: Vec::new(),
            state: SurfaceState::Unloaded,
            drawing: false,
            last_point: None,
            revealed: 0,
            on_complete: None,
        })
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn raster(&self) -> &R {
        &self.raster
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state != SurfaceState::Unloaded
    }

    pub fn is_finished(&self) -> bool {
        self.state == SurfaceState::Finished
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn last_point(&self) -> Option<Point> {
        self.last_point
    }

    /// Percentage from the most recent evaluation.
    pub fn percent_revealed(&self) -> u8 {
        self.revealed
    }

    /// Register the completion listener. It runs at most once per card;
    /// `reset()` or `reload()` arms it again for the next one.
    pub fn on_complete(&mut self, callback: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Mark the cover as loaded, keeping the raster's current contents as
    /// the state `reload()` returns to.
    pub fn load(&mut self) {
        if self.is_loaded() {
            tracing::warn!("Surface already loaded, ignoring load");
            return;
        }

        let (w, h) = (self.config.width, self.config.height);
        self.pristine.clear();
        self.pristine.reserve(w as usize * h as usize);
        for y in 0..h {
            for x in 0..w {
                self.pristine.push(self.raster.get(x, y).unwrap_or(TRANSPARENT));
            }
        }

        self.state = SurfaceState::Ready;
        self.revealed = self.measure_revealed();
        tracing::info!("Scratch surface ready ({}x{})", w, h);
    }

    /// Copy an image's alpha plane into the raster, then `load()`.
    /// Transparent parts of the cover count as already revealed.
    pub fn load_coverage(&mut self, coverage: &[u8]) -> Result<()> {
        let expected = self.config.width as usize * self.config.height as usize;
        if coverage.len() != expected {
            return Err(ScratchError::CoverageLength { expected, actual: coverage.len() });
        }
        if self.is_loaded() {
            tracing::warn!("Surface already loaded, ignoring cover coverage");
            return Ok(());
        }

        let w = self.config.width as usize;
        for (i, &c) in coverage.iter().enumerate() {
            self.raster.set((i % w) as u32, (i / w) as u32, c);
        }
        self.load();
        Ok(())
    }

    pub fn begin_stroke(&mut self, point: Point) {
        if !self.is_loaded() {
            tracing::debug!("Pointer down before cover loaded, ignoring");
            return;
        }
        self.drawing = true;
        self.last_point = Some(point);
    }

    pub fn extend_stroke(&mut self, point: Point) {
        self.extend_stroke_with(point, &mut ());
    }

    /// Erase from the last point to `point`, reporting each stamp to `observer`,
    /// then re-evaluate completion.
    pub fn extend_stroke_with<O: StrokeObserver + ?Sized>(&mut self, point: Point, observer: &mut O) {
        if !self.drawing {
            return;
        }
        let Some(from) = self.last_point else {
            return;
        };

        let radius = self.config.brush_radius;
        let (w, h) = (self.config.width, self.config.height);
        for centre in stamps_on_raster(from, point, self.config.transform, w, h, radius) {
            erase_disc(&mut self.raster, centre, radius);
            observer.stamped(centre, radius);
        }

        self.last_point = Some(point);
        self.evaluate_completion();
    }

    pub fn end_stroke(&mut self) {
        self.drawing = false;
    }

    /// Sample the check region and fire the completion listener the first
    /// time the revealed share exceeds the threshold.
    pub fn evaluate_completion(&mut self) {
        if self.state != SurfaceState::Ready {
            return;
        }

        self.revealed = self.measure_revealed();
        tracing::trace!("Revealed {}%", self.revealed);

        if self.revealed > self.config.completion_threshold {
            // Terminal before the listener runs, so a panicking listener
            // still cannot fire twice.
            self.state = SurfaceState::Finished;
            tracing::info!(
                "Card complete at {}% (threshold {}%)",
                self.revealed,
                self.config.completion_threshold
            );
            if let Some(callback) = self.on_complete.as_mut() {
                callback();
            }
        }
    }

    /// Revealed percentage of the sampled pixels, computed fresh.
    pub fn measure_revealed(&self) -> u8 {
        let region = self.config.region();
        let row = region.width as usize;
        let unit = self.config.stride_unit.bytes_per_step();

        let mut total = 0usize;
        let mut erased = 0usize;
        for offset in (0..region.area() * unit).step_by(self.config.stride) {
            let i = offset / unit;
            let x = region.x + (i % row) as u32;
            let y = region.y + (i / row) as u32;
            total += 1;
            if self.raster.get(x, y) == Some(TRANSPARENT) {
                erased += 1;
            }
        }

        if total == 0 {
            return 0;
        }
        (100.0 * erased as f64 / total as f64).round() as u8
    }

    /// Fresh card: fully opaque foil, no stroke, completion re-armed.
    pub fn reset(&mut self) {
        if !self.clear_interaction() {
            return;
        }
        self.raster.fill(OPAQUE);
        self.revealed = 0;
        tracing::info!("Scratch surface reset");
    }

    /// Like `reset()`, but puts back the coverage captured at load, so a
    /// cover with transparent areas keeps them revealed.
    pub fn reload(&mut self) {
        if !self.clear_interaction() {
            return;
        }
        let w = self.config.width as usize;
        for (i, &c) in self.pristine.iter().enumerate() {
            self.raster.set((i % w) as u32, (i / w) as u32, c);
        }
        self.revealed = self.measure_revealed();
        tracing::info!("Scratch surface reloaded from cover");
    }

    /// Drop stroke tracking and leave `Finished`; false while unloaded.
    fn clear_interaction(&mut self) -> bool {
        self.drawing = false;
        self.last_point = None;
        self.revealed = 0;
        if !self.is_loaded() {
            return false;
        }
        self.state = SurfaceState::Ready;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CoordTransform, StrideUnit};
    use crate::types::Rect;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ready(config: SurfaceConfig) -> ScratchSurface {
        let mut surface = ScratchSurface::new(config).unwrap();
        surface.load();
        surface
    }

    fn counter(surface: &mut ScratchSurface) -> Rc<Cell<u32>> {
        let fired = Rc::new(Cell::new(0));
        let hook = Rc::clone(&fired);
        surface.on_complete(move || hook.set(hook.get() + 1));
        fired
    }

    #[derive(Default)]
    struct Recorder {
        centres: Vec<Point>,
    }

    impl StrokeObserver for Recorder {
        fn stamped(&mut self, centre: Point, _radius: f32) {
            self.centres.push(centre);
        }
    }

    #[test]
    fn test_new_surface_is_unloaded() {
        let surface = ScratchSurface::new(SurfaceConfig::new(10, 10)).unwrap();
        assert_eq!(surface.state(), SurfaceState::Unloaded);
        assert!(!surface.is_drawing());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SurfaceConfig::new(10, 10).with_check_region(Rect::new(5, 5, 6, 1));
        assert!(ScratchSurface::new(config).is_err());
    }

    #[test]
    fn test_raster_size_must_match() {
        let result = ScratchSurface::with_raster(SurfaceConfig::new(10, 10), CoverageMask::opaque(10, 11));
        assert!(matches!(result, Err(ScratchError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_interaction_before_load_is_ignored() {
        let mut surface = ScratchSurface::new(SurfaceConfig::new(50, 50)).unwrap();
        let fired = counter(&mut surface);

        surface.begin_stroke(Point::new(0.0, 25.0));
        surface.extend_stroke(Point::new(50.0, 25.0));
        surface.evaluate_completion();

        assert!(!surface.is_drawing());
        assert!(surface.raster().as_slice().iter().all(|&c| c == OPAQUE));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_begin_stroke_does_not_erase() {
        let mut surface = ready(SurfaceConfig::new(20, 20));
        surface.begin_stroke(Point::new(10.0, 10.0));
        assert!(surface.is_drawing());
        assert_eq!(surface.last_point(), Some(Point::new(10.0, 10.0)));
        assert!(surface.raster().as_slice().iter().all(|&c| c == OPAQUE));
    }

    #[test]
    fn test_extend_without_begin_is_noop() {
        let mut surface = ready(SurfaceConfig::new(20, 20));
        surface.extend_stroke(Point::new(10.0, 10.0));
        assert_eq!(surface.last_point(), None);
        assert!(surface.raster().as_slice().iter().all(|&c| c == OPAQUE));
    }

    #[test]
    fn test_zero_distance_extend_is_safe() {
        let mut surface = ready(SurfaceConfig::new(20, 20).with_stride(1));
        surface.begin_stroke(Point::new(10.0, 10.0));
        surface.extend_stroke(Point::new(10.0, 10.0));
        assert_eq!(surface.percent_revealed(), 0);
        assert!(surface.is_drawing());
    }

    #[test]
    fn test_end_stroke_keeps_last_point() {
        let mut surface = ready(SurfaceConfig::new(20, 20));
        surface.begin_stroke(Point::new(1.0, 1.0));
        surface.extend_stroke(Point::new(5.0, 1.0));
        surface.end_stroke();
        assert!(!surface.is_drawing());
        assert_eq!(surface.last_point(), Some(Point::new(5.0, 1.0)));

        // Moves after pointer-up do nothing.
        let before = surface.raster().clone();
        surface.extend_stroke(Point::new(15.0, 15.0));
        assert_eq!(surface.raster(), &before);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut surface = ready(SurfaceConfig::new(40, 40).with_stride(1).with_threshold(50));
        let fired = counter(&mut surface);

        surface.begin_stroke(Point::new(0.0, 20.0));
        surface.extend_stroke(Point::new(40.0, 20.0));
        assert!(surface.is_finished());
        assert_eq!(fired.get(), 1);

        surface.extend_stroke(Point::new(0.0, 20.0));
        surface.evaluate_completion();
        surface.evaluate_completion();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_panicking_listener_cannot_fire_twice() {
        let mut surface = ready(SurfaceConfig::new(40, 40).with_stride(1).with_threshold(10));
        let calls = Rc::new(Cell::new(0));
        let hook = Rc::clone(&calls);
        surface.on_complete(move || {
            hook.set(hook.get() + 1);
            panic!("listener failed");
        });

        surface.begin_stroke(Point::new(0.0, 20.0));
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            surface.extend_stroke(Point::new(40.0, 20.0));
        }));
        assert!(outcome.is_err());
        assert_eq!(surface.state(), SurfaceState::Finished);

        surface.evaluate_completion();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_threshold_must_be_exceeded() {
        // Left half of a 10x10 surface erased by hand: exactly 50%.
        let mut mask = CoverageMask::opaque(10, 10);
        for y in 0..10 {
            for x in 0..5 {
                mask.set(x, y, TRANSPARENT);
            }
        }
        let config = SurfaceConfig::new(10, 10).with_stride(1).with_threshold(50);
        let mut surface = ScratchSurface::with_raster(config, mask).unwrap();
        surface.load();
        let fired = counter(&mut surface);

        surface.evaluate_completion();
        assert_eq!(surface.percent_revealed(), 50);
        assert_eq!(fired.get(), 0);
        assert_eq!(surface.state(), SurfaceState::Ready);
    }

    #[test]
    fn test_check_region_limits_sampling() {
        let config = SurfaceConfig::new(100, 100)
            .with_stride(1)
            .with_check_region(Rect::new(0, 0, 20, 20));
        let mut surface = ready(config);

        // Scratch only inside the region's corner area.
        surface.begin_stroke(Point::new(0.0, 10.0));
        surface.extend_stroke(Point::new(20.0, 10.0));
        assert!(surface.percent_revealed() > 70);
        assert!(surface.is_finished());
    }

    #[test]
    fn test_transform_moves_stamps() {
        let config = SurfaceConfig::new(100, 100)
            .with_brush_radius(2.0)
            .with_transform(CoordTransform::uniform(2.0));
        let mut surface = ready(config);
        let mut recorder = Recorder::default();

        surface.begin_stroke(Point::new(10.0, 10.0));
        surface.extend_stroke_with(Point::new(13.0, 10.0), &mut recorder);

        assert_eq!(recorder.centres.len(), 3);
        assert_eq!(recorder.centres[0], Point::new(20.0, 20.0));
        assert_eq!(surface.raster().get(20, 20), Some(TRANSPARENT));
        assert_eq!(surface.raster().get(10, 10), Some(OPAQUE));
    }

    #[test]
    fn test_rgba_byte_stride_samples_every_quarter_step() {
        let config = SurfaceConfig::new(8, 1)
            .with_stride(8)
            .with_stride_unit(StrideUnit::RgbaBytes);
        let mut mask = CoverageMask::opaque(8, 1);
        // Byte offsets 0, 8, 16, 24 land on pixels 0, 2, 4, 6.
        mask.set(0, 0, TRANSPARENT);
        mask.set(1, 0, TRANSPARENT);
        let mut surface = ScratchSurface::with_raster(config, mask).unwrap();
        surface.load();
        assert_eq!(surface.measure_revealed(), 25);
    }

    #[test]
    fn test_load_coverage_uses_alpha() {
        let mut surface = ScratchSurface::new(SurfaceConfig::new(2, 2).with_stride(1)).unwrap();
        assert!(surface.load_coverage(&[0, 0, 0]).is_err());

        surface.load_coverage(&[0, 255, 255, 255]).unwrap();
        assert!(surface.is_loaded());
        assert_eq!(surface.percent_revealed(), 25);
    }

    #[test]
    fn test_reset_clears_to_opaque_and_rearms() {
        let mut surface = ready(SurfaceConfig::new(30, 30).with_stride(1).with_threshold(20));
        let fired = counter(&mut surface);

        surface.begin_stroke(Point::new(0.0, 15.0));
        surface.extend_stroke(Point::new(30.0, 15.0));
        assert_eq!(fired.get(), 1);

        surface.reset();
        assert_eq!(surface.state(), SurfaceState::Ready);
        assert_eq!(surface.percent_revealed(), 0);
        assert!(!surface.is_drawing());
        assert_eq!(surface.last_point(), None);
        assert!(surface.raster().as_slice().iter().all(|&c| c == OPAQUE));

        surface.begin_stroke(Point::new(0.0, 15.0));
        surface.extend_stroke(Point::new(30.0, 15.0));
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_reset_before_load_stays_unloaded() {
        let mut surface = ScratchSurface::new(SurfaceConfig::new(5, 5)).unwrap();
        surface.reset();
        surface.reload();
        assert_eq!(surface.state(), SurfaceState::Unloaded);
    }

    #[test]
    fn test_reset_is_fully_opaque_even_for_partial_cover() {
        let mut mask = CoverageMask::opaque(10, 10);
        for x in 0..10 {
            mask.set(x, 0, TRANSPARENT);
        }
        let config = SurfaceConfig::new(10, 10).with_stride(1);
        let mut surface = ScratchSurface::with_raster(config, mask).unwrap();
        surface.load();
        assert_eq!(surface.percent_revealed(), 10);

        surface.reset();
        assert_eq!(surface.percent_revealed(), 0);
        assert_eq!(surface.measure_revealed(), 0);
        assert!(surface.raster().as_slice().iter().all(|&c| c == OPAQUE));
    }

    #[test]
    fn test_reload_restores_cover_holes() {
        let mut surface = ScratchSurface::new(SurfaceConfig::new(10, 10).with_stride(1).with_threshold(15)).unwrap();
        let mut alpha = vec![OPAQUE; 100];
        alpha[..10].fill(TRANSPARENT);
        surface.load_coverage(&alpha).unwrap();
        let fired = counter(&mut surface);

        surface.begin_stroke(Point::new(0.0, 5.0));
        surface.extend_stroke(Point::new(10.0, 5.0));
        assert_eq!(fired.get(), 1);

        surface.reload();
        assert_eq!(surface.state(), SurfaceState::Ready);
        assert_eq!(surface.percent_revealed(), 10);
        assert!(!surface.is_drawing());
        assert_eq!(surface.raster().as_slice(), alpha.as_slice());

        surface.begin_stroke(Point::new(0.0, 5.0));
        surface.extend_stroke(Point::new(10.0, 5.0));
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_far_away_move_stamps_only_near_surface() {
        let mut surface = ready(SurfaceConfig::new(10, 10).with_stride(1));
        let mut recorder = Recorder::default();

        surface.begin_stroke(Point::new(0.0, 5.0));
        surface.extend_stroke_with(Point::new(2.0e8, 5.0), &mut recorder);

        // Only stamps within a brush radius of the card are applied.
        assert!(recorder.centres.len() <= 10 + 2 * 21);
        assert!(recorder.centres.iter().all(|c| c.x <= 31.0));
        assert_eq!(surface.percent_revealed(), 100);
        assert_eq!(surface.last_point(), Some(Point::new(2.0e8, 5.0)));
    }

    #[test]
    fn test_large_transform_offset_does_not_stamp() {
        let config = SurfaceConfig::new(10, 10).with_transform(CoordTransform {
            offset_x: 1.0e9,
            ..CoordTransform::IDENTITY
        });
        let mut surface = ready(config);
        let mut recorder = Recorder::default();

        surface.begin_stroke(Point::new(0.0, 5.0));
        surface.extend_stroke_with(Point::new(-1.0e8, 5.0), &mut recorder);
        assert!(recorder.centres.is_empty());
        assert_eq!(surface.measure_revealed(), 0);
    }
}
