// FX: foil dust while scratching, a sparkle burst on completion, and the cover fade.
// All of it is cosmetic; the surface never reads anything from here.

use crate::surface::StrokeObserver;
use crate::types::{FrameBuffer, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ----------------------------- additive drawing helpers --------------------------------

/// Additive blend one RGB triplet at (x,y) with saturation to 255.
#[inline]
fn add_rgb_saturating(fb: &mut FrameBuffer, x: i32, y: i32, rgb: [u8; 3]) {
    if x < 0 || y < 0 { return; }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height { return; }

    let idx = y * fb.width + x;
    let old = fb.pixels[idx];
    let mut out = 0u32;
    for (c, shift) in rgb.into_iter().zip([16u32, 8, 0]) {
        let o = (old >> shift) & 0xFF;
        out |= (o + c as u32).min(255) << shift;
    }
    fb.pixels[idx] = out;
}

/// Soft round glow centred at (cx,cy); brightness falls off with a Gaussian.
fn draw_additive_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, base: [u8; 3], strength: f32) {
    if radius <= 0 { return; }
    let r2 = (radius * radius) as f32;
    let sigma = radius as f32 * 0.5;
    let denom = 2.0 * sigma * sigma;

    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            let dx = (x - cx) as f32;
            let dy = (y - cy) as f32;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 { continue; }

            let w = (-d2 / denom).exp() * strength;
            let scaled = base.map(|c| (c as f32 * w).round().clamp(0.0, 255.0) as u8);
            add_rgb_saturating(fb, x, y, scaled);
        }
    }
}

// ----------------------------- particles ------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Dust,
    Sparkle,
}

#[derive(Debug, Clone)]
struct Particle {
    x: f32, y: f32,        // position in pixels
    vx: f32, vy: f32,      // velocity in px/sec
    life: f32,             // remaining lifetime in seconds
    max_life: f32,         // initial lifetime (for fade)
    kind: Kind,
}

impl Particle {
    #[inline] fn alive(&self) -> bool { self.life > 0.0 }
}

/// Particle system fed by stroke stamps.
pub struct Fx {
    rng: StdRng,
    particles: Vec<Particle>,
    max_particles: usize,
    dust_chance: f64,
}

impl Fx {
    pub fn new(max_particles: usize) -> Self {
        Self::with_seed(max_particles, 0xC0FFEE)
    }

    pub fn with_seed(max_particles: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            particles: Vec::with_capacity(max_particles),
            max_particles,
            dust_chance: 0.35,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    fn spawn(&mut self, x: f32, y: f32, kind: Kind) {
        if self.particles.len() >= self.max_particles { return; }
        let (speed, life) = match kind {
            Kind::Dust => (self.rng.gen_range(10.0..40.0), self.rng.gen_range(0.3..0.6)),
            Kind::Sparkle => (self.rng.gen_range(60.0..160.0), self.rng.gen_range(0.5..1.0)),
        };
        let angle: f32 = self.rng.gen_range(0.0..std::f32::consts::TAU);
        self.particles.push(Particle {
            x, y,
            vx: speed * angle.cos(),
            vy: speed * angle.sin(),
            life,
            max_life: life,
            kind,
        });
    }

    /// Golden sparkles fanning out from (x,y) when the prize is revealed.
    pub fn burst(&mut self, x: f32, y: f32, count: usize) {
        for _ in 0..count {
            self.spawn(x, y, Kind::Sparkle);
        }
    }

    /// Step simulation and render all particles on top of `fb` (additive).
    pub fn update_and_render(&mut self, fb: &mut FrameBuffer, dt: f32) {
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];

            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vx *= 0.96;
            p.vy = p.vy * 0.96 + 60.0 * dt; // dust falls
            p.life -= dt;

            if !p.alive() {
                self.particles.swap_remove(i);
                continue;
            }

            let life01 = (p.life / p.max_life).clamp(0.0, 1.0);
            let (radius, base, strength) = match p.kind {
                Kind::Dust => ((2.0 * life01 + 1.0) as i32, [150, 150, 160], 0.6 * life01),
                Kind::Sparkle => ((5.0 * life01 + 2.0) as i32, [255, 210, 90], 0.9 * life01),
            };
            draw_additive_disc(fb, p.x as i32, p.y as i32, radius, base, strength);
            i += 1;
        }
    }
}

impl StrokeObserver for Fx {
    fn stamped(&mut self, centre: Point, radius: f32) {
        if !self.rng.gen_bool(self.dust_chance) { return; }
        // Flakes come off the rim of the brush, not its middle.
        let angle: f32 = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let x = centre.x + radius * angle.cos();
        let y = centre.y + radius * angle.sin();
        self.spawn(x, y, Kind::Dust);
    }
}

// ----------------------------- cover fade ------------------------------------

/// Timed fade of the cover layer after completion.
#[derive(Debug, Clone)]
pub struct CoverFade {
    duration: f32,
    elapsed: Option<f32>,
}

impl CoverFade {
    pub fn new(duration: f32) -> Self {
        Self { duration: duration.max(f32::EPSILON), elapsed: None }
    }

    pub fn start(&mut self) {
        if self.elapsed.is_none() {
            self.elapsed = Some(0.0);
        }
    }

    pub fn is_started(&self) -> bool {
        self.elapsed.is_some()
    }

    pub fn cancel(&mut self) {
        self.elapsed = None;
    }

    pub fn advance(&mut self, dt: f32) {
        if let Some(t) = self.elapsed.as_mut() {
            *t = (*t + dt).min(self.duration);
        }
    }

    /// Cover opacity: 1 until started, then linearly down to 0.
    pub fn opacity(&self) -> f32 {
        match self.elapsed {
            None => 1.0,
            Some(t) => 1.0 - t / self.duration,
        }
    }
}
