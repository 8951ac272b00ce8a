//! Scratch-card reveal surface.
//!
//! Pointer strokes erase a coverage raster with round stamps; the surface
//! samples how much of it is gone and fires a one-shot completion callback
//! when the revealed share passes its threshold. Rendering pieces (artwork
//! loading, compositing, particle dust) sit alongside but never affect
//! completion.

pub mod compose;
pub mod config;
pub mod error;
pub mod fx;
pub mod gamma;
pub mod loader;
pub mod raster;
pub mod stroke;
pub mod surface;
pub mod types;

pub use config::{CoordTransform, StrideUnit, SurfaceConfig};
pub use error::{Result, ScratchError};
pub use raster::{CoverageMask, OPAQUE, Raster, TRANSPARENT};
pub use surface::{ScratchSurface, StrokeObserver, SurfaceState};
pub use types::{FrameBuffer, Point, Rect};
