// Stroke geometry: turning two pointer samples into a row of erase stamps.

use crate::config::CoordTransform;
use crate::raster::{Raster, TRANSPARENT};
use crate::types::Point;

/// Unit step and stamp count for a move from `from` to `to`.
///
/// The heading is `atan2(dx, dy)`, i.e. measured from the y axis, so the
/// step is `(sin θ, cos θ)`. There is one stamp per integer `i` in `[0, d)`.
fn heading(from: Point, to: Point) -> (f32, f32, usize) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dist = from.distance(to);
    let (sin, cos) = dx.atan2(dy).sin_cos();
    let steps = if dist.is_finite() { dist.ceil() as usize } else { 0 };
    (sin, cos, steps)
}

#[inline]
fn centre_at(from: Point, sin: f32, cos: f32, i: usize) -> Point {
    let i = i as f32;
    Point::new(from.x + sin * i, from.y + cos * i)
}

/// Stamp centres from `from` towards `to`, one per whole pixel of travel.
/// Centre `i` sits at `from + i * (sin θ, cos θ)`; a zero-length move yields nothing.
pub fn stamp_centres(from: Point, to: Point) -> impl Iterator<Item = Point> {
    let (sin, cos, steps) = heading(from, to);
    (0..steps).map(move |i| centre_at(from, sin, cos, i))
}

/// Indices in `0..steps` whose coordinate `origin + i * step` lies in `[min, max]`.
fn axis_window(origin: f64, step: f64, min: f64, max: f64, steps: usize) -> (usize, usize) {
    if step == 0.0 {
        return if (min..=max).contains(&origin) { (0, steps) } else { (0, 0) };
    }
    let a = (min - origin) / step;
    let b = (max - origin) / step;
    let start = a.min(b).max(0.0).ceil();
    let end = (a.max(b).floor() + 1.0).min(steps as f64);
    if !(start < end) {
        return (0, 0);
    }
    (start as usize, end as usize)
}

/// Raster-space stamp centres for a move, keeping only those whose disc can
/// touch a `width x height` raster. Far-off pointer samples cost nothing
/// beyond the stamps that actually land.
pub fn stamps_on_raster(
    from: Point,
    to: Point,
    transform: CoordTransform,
    width: u32,
    height: u32,
    radius: f32,
) -> impl Iterator<Item = Point> {
    let (sin, cos, steps) = heading(from, to);

    // Centres move linearly with `i` in raster space too.
    let origin = transform.apply(from);
    let step_x = sin as f64 * transform.scale_x as f64;
    let step_y = cos as f64 * transform.scale_y as f64;
    let reach = radius.max(0.0) as f64 + 1.0;

    let (x0, x1) = axis_window(origin.x as f64, step_x, -reach, width as f64 + reach, steps);
    let (y0, y1) = axis_window(origin.y as f64, step_y, -reach, height as f64 + reach, steps);
    let (lo, hi) = (x0.max(y0), x1.min(y1));

    (lo..hi.max(lo)).map(move |i| transform.apply(centre_at(from, sin, cos, i)))
}

/// Clear every pixel whose centre lies within `radius` of `centre`
/// ("destination-out" paint). Returns how many pixels changed.
pub fn erase_disc<R: Raster + ?Sized>(raster: &mut R, centre: Point, radius: f32) -> usize {
    let w = raster.width() as i64;
    let h = raster.height() as i64;
    if !(centre.x.is_finite() && centre.y.is_finite()) || radius <= 0.0 {
        return 0;
    }

    // Scan just the bounding box, clipped to the raster
    let x0 = ((centre.x - radius).floor() as i64).max(0);
    let y0 = ((centre.y - radius).floor() as i64).max(0);
    let x1 = ((centre.x + radius).ceil() as i64).min(w - 1);
    let y1 = ((centre.y + radius).ceil() as i64).min(h - 1);
    if x1 < x0 || y1 < y0 {
        return 0;
    }

    let r2 = radius * radius;
    let mut cleared = 0;
    for y in y0..=y1 {
        let dy = y as f32 + 0.5 - centre.y;
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - centre.x;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            if raster.get(x, y).is_some_and(|c| c != TRANSPARENT) {
                raster.set(x, y, TRANSPARENT);
                cleared += 1;
            }
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{CoverageMask, OPAQUE};

    #[test]
    fn test_zero_length_move_has_no_stamps() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(stamp_centres(p, p).count(), 0);
    }

    #[test]
    fn test_horizontal_move_steps_along_x() {
        let centres: Vec<Point> = stamp_centres(Point::new(0.0, 3.0), Point::new(4.0, 3.0)).collect();
        assert_eq!(centres.len(), 4);
        for (i, c) in centres.iter().enumerate() {
            assert!((c.x - i as f32).abs() < 1e-4);
            assert!((c.y - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_heading_is_measured_from_y_axis() {
        // Straight down: dx = 0, dy > 0 gives θ = 0, so the step is (0, 1).
        let centres: Vec<Point> = stamp_centres(Point::new(2.0, 0.0), Point::new(2.0, 3.0)).collect();
        assert_eq!(centres.len(), 3);
        assert!((centres[2].x - 2.0).abs() < 1e-4);
        assert!((centres[2].y - 2.0).abs() < 1e-4);

        // Up and to the left.
        let last = stamp_centres(Point::new(10.0, 10.0), Point::new(7.0, 6.0)).last().unwrap();
        assert!((last.x - (10.0 - 0.6 * 4.0)).abs() < 1e-4);
        assert!((last.y - (10.0 - 0.8 * 4.0)).abs() < 1e-4);
    }

    #[test]
    fn test_fractional_distance_rounds_up_step_count() {
        assert_eq!(stamp_centres(Point::new(0.0, 0.0), Point::new(2.5, 0.0)).count(), 3);
    }

    #[test]
    fn test_far_move_only_keeps_stamps_near_raster() {
        let kept: Vec<Point> = stamps_on_raster(
            Point::new(0.0, 5.0),
            Point::new(2.0e8, 5.0),
            CoordTransform::IDENTITY,
            10,
            10,
            20.0,
        )
        .collect();
        // x from 0 up to width + radius + 1.
        assert_eq!(kept.len(), 32);
        assert_eq!(kept[0], Point::new(0.0, 5.0));
        assert!(kept.iter().all(|c| c.x <= 31.0));
    }

    #[test]
    fn test_move_entirely_off_raster_keeps_nothing() {
        let count = stamps_on_raster(
            Point::new(-1.0e6, -500.0),
            Point::new(1.0e6, -500.0),
            CoordTransform::IDENTITY,
            10,
            10,
            20.0,
        )
        .count();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_clipping_matches_unclipped_stamps_on_raster() {
        let from = Point::new(-30.0, 70.0);
        let to = Point::new(120.0, -40.0);
        let transform = CoordTransform { scale_x: 0.5, scale_y: 1.5, offset_x: 10.0, offset_y: -5.0 };

        let mut clipped = CoverageMask::opaque(50, 50);
        for c in stamps_on_raster(from, to, transform, 50, 50, 4.0) {
            erase_disc(&mut clipped, c, 4.0);
        }
        let mut full = CoverageMask::opaque(50, 50);
        for c in stamp_centres(from, to) {
            erase_disc(&mut full, transform.apply(c), 4.0);
        }
        assert_eq!(clipped, full);
        assert!(full.as_slice().contains(&TRANSPARENT));
    }

    #[test]
    fn test_erase_disc_clips_at_edges() {
        let mut mask = CoverageMask::opaque(10, 10);
        let cleared = erase_disc(&mut mask, Point::new(0.0, 0.0), 3.0);
        assert!(cleared > 0);
        assert_eq!(mask.get(0, 0), Some(TRANSPARENT));
        assert_eq!(mask.get(5, 5), Some(OPAQUE));
    }

    #[test]
    fn test_erase_disc_is_idempotent() {
        let mut mask = CoverageMask::opaque(20, 20);
        let first = erase_disc(&mut mask, Point::new(10.0, 10.0), 4.0);
        let second = erase_disc(&mut mask, Point::new(10.0, 10.0), 4.0);
        assert!(first > 40);
        assert_eq!(second, 0);
    }

    #[test]
    fn test_erase_disc_off_raster_is_noop() {
        let mut mask = CoverageMask::opaque(10, 10);
        assert_eq!(erase_disc(&mut mask, Point::new(-50.0, 4.0), 5.0), 0);
        assert_eq!(erase_disc(&mut mask, Point::new(4.0, 60.0), 5.0), 0);
        assert!(mask.as_slice().iter().all(|&c| c == OPAQUE));
    }
}
