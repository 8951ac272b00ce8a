// Colour tables for laying the foil cover over the prize.
// `mix` weights the two layers by remaining coverage, in linear light.

pub struct GammaLut {
    // cover/prize channel byte -> linear weight input
    srgb_to_linear: [f32; 256],
    // blended linear value -> screen byte, 4096 buckets
    linear_to_srgb: [u8; 4096],
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaLut {
    /// One table per direction; the demo keeps a single instance for every frame.
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Cover pixel `top` over prize pixel `bottom`, where `a` is the cover's
    /// remaining coverage (times the fade opacity). Packed 0x00RRGGBB.
    pub fn mix(&self, top: u32, bottom: u32, a: f32) -> u32 {
        let inv = 1.0 - a;
        let mut out = 0u32;
        for shift in [16u32, 8, 0] {
            let t = self.srgb_u8_to_linear(((top >> shift) & 0xFF) as u8);
            let b = self.srgb_u8_to_linear(((bottom >> shift) & 0xFF) as u8);
            out |= (self.linear_to_srgb_u8(a * t + inv * b) as u32) << shift;
        }
        out
    }
}
