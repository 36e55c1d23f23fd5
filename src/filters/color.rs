//! Shared color math for the color-remap stages

/// Rec.601 luma weights
pub const LUMA: [f32; 3] = [0.299, 0.587, 0.114];

#[inline]
pub fn to_unit(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
pub fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA[0] * r + LUMA[1] * g + LUMA[2] * b
}

/// Precomputed 8-bit channel mapping
#[derive(Clone)]
pub struct ChannelLut([u8; 256]);

impl ChannelLut {
    pub fn from_fn<F: Fn(f32) -> f32>(f: F) -> Self {
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = to_byte(f(i as f32 / 255.0));
        }
        Self(table)
    }

    #[inline]
    pub fn get(&self, v: u8) -> u8 {
        self.0[v as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_conversion_clamps() {
        assert_eq!(to_byte(1.5), 255);
        assert_eq!(to_byte(-0.2), 0);
        assert_eq!(to_byte(to_unit(128)), 128);
    }

    #[test]
    fn test_identity_lut() {
        let lut = ChannelLut::from_fn(|v| v);
        assert!((0..=255u8).all(|v| lut.get(v) == v));
    }
}
