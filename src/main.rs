// Interactive scratch card.
// • Hold Left Mouse and drag to scratch the foil off the prize.
// • Past the threshold the card completes once: sparkles, then the foil fades.
// • Leaving the window cancels the current stroke.
// • R deals a fresh card (the cover as loaded). ESC quits.

mod draw;

use clap::Parser;
use draw::{Drawer, draw_crosshair, draw_text_5x7};
use scratch_card::compose::composite_cover;
use scratch_card::fx::{CoverFade, Fx};
use scratch_card::gamma::GammaLut;
use scratch_card::loader::{Layer, foil_cover, layer_from_rgba, load_layer, prize_backdrop};
use scratch_card::{CoordTransform, FrameBuffer, Result, ScratchSurface, SurfaceConfig};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scratch-card")]
#[command(about = "Scratch a foil cover to reveal the prize underneath")]
#[command(version)]
struct Cli {
    /// Cover artwork (transparent pixels start out revealed)
    #[arg(long)]
    cover: Option<PathBuf>,

    /// Prize artwork shown under the cover
    #[arg(long)]
    prize: Option<PathBuf>,

    /// JSON surface configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Brush radius in pixels
    #[arg(long)]
    radius: Option<f32>,

    /// Percentage that must be exceeded to complete the card
    #[arg(long)]
    threshold: Option<u8>,

    /// Sample every Nth pixel when measuring the reveal
    #[arg(long)]
    stride: Option<usize>,

    /// Pointer-to-surface scale, for covers drawn at a different display size
    #[arg(long)]
    scale: Option<f32>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn surface_config(&self) -> Result<SurfaceConfig> {
        let mut config = match &self.config {
            Some(path) => SurfaceConfig::load(path)?,
            None => SurfaceConfig::default(),
        };
        if let Some(radius) = self.radius {
            config = config.with_brush_radius(radius);
        }
        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        if let Some(stride) = self.stride {
            config = config.with_stride(stride);
        }
        if let Some(scale) = self.scale {
            config = config.with_transform(CoordTransform::uniform(scale));
        }
        config.validate()?;
        Ok(config)
    }
}

fn load_or(path: Option<&PathBuf>, width: u32, height: u32, fallback: fn(u32, u32) -> image::RgbaImage) -> Result<Layer> {
    match path {
        Some(path) => load_layer(path, width, height),
        None => Ok(layer_from_rgba(&fallback(width, height), width, height)),
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("scratch_card={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.surface_config()?;
    let (w, h) = (config.width, config.height);

    let mut drawer = Drawer::new("Scratch Card", w as usize, h as usize)?;

    let mut surface = ScratchSurface::new(config)?;
    let cover = load_or(cli.cover.as_ref(), w, h, foil_cover)?;
    let prize = load_or(cli.prize.as_ref(), w, h, prize_backdrop)?;
    surface.load_coverage(&cover.alpha)?;

    let won = Rc::new(Cell::new(false));
    let hook = Rc::clone(&won);
    surface.on_complete(move || hook.set(true));

    let lut = GammaLut::new();
    let mut fx = Fx::new(800);
    let mut fade = CoverFade::new(0.6);
    let mut screen = FrameBuffer::filled(w as usize, h as usize, 0);

    let mut was_down = false;
    let mut last_frame = Instant::now();

    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();
        let dt = (now - last_frame).as_secs_f32();
        last_frame = now;

        if drawer.r_pressed_once() {
            surface.reload();
            fx.clear();
            fade.cancel();
            won.set(false);
            was_down = false;
        }

        // Pointer edges drive the stroke: down, move, up / leave.
        let down = drawer.left_mouse_down();
        let pointer = drawer.pointer();
        match (was_down, down, pointer) {
            (false, true, Some(p)) => surface.begin_stroke(p),
            (true, true, Some(p)) => surface.extend_stroke_with(p, &mut fx),
            (true, _, None) | (true, false, _) => surface.end_stroke(),
            _ => {}
        }
        was_down = down && pointer.is_some();

        if won.get() && !fade.is_started() {
            fade.start();
            fx.burst(w as f32 / 2.0, h as f32 / 2.0, 120);
        }
        fade.advance(dt);

        composite_cover(&mut screen, &prize.frame, &cover.frame, surface.raster(), fade.opacity(), &lut)?;
        fx.update_and_render(&mut screen, dt);

        if let Some(p) = pointer {
            draw_crosshair(&mut screen, p, 10, 0x00_FF_CC_33);
        }

        let hud = if surface.is_finished() {
            format!("REVEALED! {}% | R: NEW CARD", surface.percent_revealed())
        } else {
            format!("SCRATCH: {}% | R: NEW CARD", surface.percent_revealed())
        };
        draw_text_5x7(&mut screen, 8, 8, &hud, 0x00_FF_FF_FF);

        drawer.present(&screen)?;
    }

    Ok(())
}
