/// Colors for the fireworks surface.

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }

    /// Convert from HSL. `h` in degrees, `s` and `l` in 0..=1.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(360.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = h / 60.0;
        let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
        let (r1, g1, b1) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        Rgb::new((r1 + m) * 255.0, (g1 + m) * 255.0, (b1 + m) * 255.0)
    }

    /// Fully saturated firework hue at 60% lightness.
    pub fn firework(hue: f32) -> Self {
        Rgb::from_hsl(hue, 1.0, 0.6)
    }

    /// Blend `over` on top of `self` with the given opacity.
    pub fn blend(self, over: Rgb, alpha: f32) -> Rgb {
        Rgb::new(
            self.r + (over.r - self.r) * alpha,
            self.g + (over.g - self.g) * alpha,
            self.b + (over.b - self.b) * alpha,
        )
    }

    pub fn to_u8(self) -> (u8, u8, u8) {
        (
            self.r.round().clamp(0.0, 255.0) as u8,
            self.g.round().clamp(0.0, 255.0) as u8,
            self.b.round().clamp(0.0, 255.0) as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_hues() {
        assert_eq!(Rgb::from_hsl(0.0, 1.0, 0.5).to_u8(), (255, 0, 0));
        assert_eq!(Rgb::from_hsl(120.0, 1.0, 0.5).to_u8(), (0, 255, 0));
        assert_eq!(Rgb::from_hsl(240.0, 1.0, 0.5).to_u8(), (0, 0, 255));
    }

    #[test]
    fn firework_lightness_keeps_a_channel_saturated() {
        // hsl(h, 100%, 60%): max channel = 255, min channel = 51
        let (r, g, b) = Rgb::firework(200.0).to_u8();
        assert_eq!(r.max(g).max(b), 255);
        assert_eq!(r.min(g).min(b), 51);
    }

    #[test]
    fn blend_towards_black() {
        let c = Rgb::new(200.0, 100.0, 50.0).blend(Rgb::BLACK, 0.2);
        assert_eq!(c.to_u8(), (160, 80, 40));
    }
}
