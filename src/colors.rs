//! Color packing, packed-HSB decoding and face shading.
//!
//! Raster pixels are `u32` in ARGB8888 order (`0xAARRGGBB`), matching the
//! streaming texture format the viewer uploads. Face colors arrive from the
//! mesh as packed HSB: 6 bits hue, 3 bits saturation, 7 bits brightness.

/// Exponent of the power-law curve used by [`shade`].
pub const SHADE_GAMMA: f64 = 2.4;

/// A flat 24-bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GRAY: Self = Self::new(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack from `0x??RRGGBB`; the top byte is ignored.
    pub const fn from_packed(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Pack to `0x00RRGGBB`.
    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Pack to an opaque ARGB8888 pixel.
    pub const fn to_argb(self) -> u32 {
        pack_argb(self.r, self.g, self.b, 0xFF)
    }

    /// Channels as reflectance fractions in [0, 1].
    pub fn reflectance(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Color of the triangle outline overlay.
pub const EDGE: Rgb = Rgb::GRAY;
/// Color of the vertex mark overlay.
pub const VERTEX: Rgb = Rgb::WHITE;

/// Pixel value of a raster position nothing has been drawn to.
pub const CLEAR: u32 = 0x0000_0000;

/// Pack 8-bit channels into an ARGB8888 pixel.
#[inline]
pub const fn pack_argb(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Unpack an ARGB8888 pixel into `[r, g, b, a]`.
#[inline]
pub fn unpack_argb(color: u32) -> [u8; 4] {
    [
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
        (color >> 24) as u8,
    ]
}

/// Decode a packed HSB face color.
///
/// `hue = (v >> 10) & 0x3F`, `sat = (v >> 7) & 0x07`, `bri = v & 0x7F`, each
/// normalized by its field maximum before conversion.
pub fn hsb_to_rgb(packed: u16) -> Rgb {
    let hue = (packed >> 10) & 0x3F;
    let saturation = (packed >> 7) & 0x07;
    let brightness = packed & 0x7F;
    hsb_components_to_rgb(
        hue as f32 / 63.0,
        saturation as f32 / 7.0,
        brightness as f32 / 127.0,
    )
}

/// Standard HSB wheel conversion with each component in [0, 1].
///
/// Hue wraps, so `1.0` lands on the same red as `0.0`.
pub fn hsb_components_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Rgb {
    #[inline]
    fn channel(v: f32) -> u8 {
        (v * 255.0 + 0.5) as u8
    }

    if saturation == 0.0 {
        let v = channel(brightness);
        return Rgb::new(v, v, v);
    }

    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));

    let (r, g, b) = match h as u32 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        5 => (brightness, p, q),
        _ => (0.0, 0.0, 0.0),
    };
    Rgb::new(channel(r), channel(g), channel(b))
}

/// Quantize an RGB color into the packed HSB layout.
///
/// Lossy: only 64 hues, 8 saturations and 128 brightness levels survive.
pub fn rgb_to_hsb(color: Rgb) -> u16 {
    let (r, g, b) = (color.r as f32, color.g as f32, color.b as f32);
    let cmax = r.max(g).max(b);
    let cmin = r.min(g).min(b);

    let brightness = cmax / 255.0;
    let saturation = if cmax != 0.0 { (cmax - cmin) / cmax } else { 0.0 };
    let hue = if saturation == 0.0 {
        0.0
    } else {
        let span = cmax - cmin;
        let redc = (cmax - r) / span;
        let greenc = (cmax - g) / span;
        let bluec = (cmax - b) / span;
        let sector = if r == cmax {
            bluec - greenc
        } else if g == cmax {
            2.0 + redc - bluec
        } else {
            4.0 + greenc - redc
        };
        let h = sector / 6.0;
        if h < 0.0 {
            h + 1.0
        } else {
            h
        }
    };

    let h = (hue * 63.0).round() as u16 & 0x3F;
    let s = (saturation * 7.0).round() as u16 & 0x07;
    let v = (brightness * 127.0).round() as u16 & 0x7F;
    (h << 10) | (s << 7) | v
}

/// Darken `color` by a cosine-of-incidence `intensity`.
///
/// Each channel goes to linear light with `c^2.4`, is scaled by `intensity`,
/// comes back with `^(1/2.4)` and is truncated. This is a plain power curve,
/// not the piecewise sRGB transfer function.
///
/// A NaN intensity (degenerate face normal) truncates to black.
pub fn shade(color: Rgb, intensity: f64) -> Rgb {
    #[inline]
    fn channel(c: u8, intensity: f64) -> u8 {
        let linear = (c as f64).powf(SHADE_GAMMA) * intensity;
        linear.powf(1.0 / SHADE_GAMMA) as u8
    }

    Rgb::new(
        channel(color.r, intensity),
        channel(color.g, intensity),
        channel(color.b, intensity),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_hsb(hue: u16, saturation: u16, brightness: u16) -> u16 {
        (hue << 10) | (saturation << 7) | brightness
    }

    #[test]
    fn full_brightness_without_saturation_is_white() {
        assert_eq!(hsb_to_rgb(pack_hsb(0, 0, 127)), Rgb::WHITE);
    }

    #[test]
    fn zero_brightness_is_black() {
        assert_eq!(hsb_to_rgb(pack_hsb(17, 5, 0)), Rgb::BLACK);
    }

    #[test]
    fn greyscale_ignores_hue() {
        assert_eq!(hsb_to_rgb(pack_hsb(0x3F, 0, 127)), Rgb::WHITE);
        assert_eq!(hsb_to_rgb(pack_hsb(0x3F, 0, 0)), Rgb::BLACK);
    }

    #[test]
    fn hue_wraps_at_top_of_field() {
        let start = hsb_to_rgb(pack_hsb(0, 7, 127));
        let end = hsb_to_rgb(0xFFFF);
        assert_eq!(start, Rgb::RED);
        assert_eq!(end, Rgb::RED);
    }

    #[test]
    fn primary_hues() {
        // hue 21/63 = 1/3 -> green, 42/63 = 2/3 -> blue
        assert_eq!(hsb_to_rgb(pack_hsb(21, 7, 127)), Rgb::new(0, 255, 0));
        assert_eq!(hsb_to_rgb(pack_hsb(42, 7, 127)), Rgb::new(0, 0, 255));
    }

    #[test]
    fn half_brightness_rounds() {
        // 64/127 * 255 = 128.5 -> 129
        assert_eq!(hsb_to_rgb(pack_hsb(0, 0, 64)), Rgb::new(129, 129, 129));
    }

    #[test]
    fn quantize_primaries() {
        assert_eq!(rgb_to_hsb(Rgb::RED), pack_hsb(0, 7, 127));
        assert_eq!(rgb_to_hsb(Rgb::new(0, 0, 255)), pack_hsb(42, 7, 127));
        assert_eq!(rgb_to_hsb(Rgb::WHITE), pack_hsb(0, 0, 127));
        assert_eq!(rgb_to_hsb(Rgb::BLACK), 0);
    }

    #[test]
    fn quantized_colors_decode_back() {
        for packed in [pack_hsb(0, 7, 127), pack_hsb(21, 7, 127), pack_hsb(0, 0, 127)] {
            assert_eq!(rgb_to_hsb(hsb_to_rgb(packed)), packed);
        }
    }

    #[test]
    fn shade_at_full_intensity_is_identity() {
        for c in 0..=255u8 {
            let color = Rgb::new(c, 255 - c, c / 2);
            assert_eq!(shade(color, 1.0), color);
        }
    }

    #[test]
    fn shade_at_zero_intensity_is_black() {
        assert_eq!(shade(Rgb::new(200, 100, 50), 0.0), Rgb::BLACK);
    }

    #[test]
    fn shade_is_brighter_than_linear_scaling() {
        // 255 * 0.5^(1/2.4) = 191.03
        assert_eq!(shade(Rgb::new(255, 0, 0), 0.5), Rgb::new(191, 0, 0));
    }

    #[test]
    fn shade_with_nan_is_black() {
        assert_eq!(shade(Rgb::WHITE, f64::NAN), Rgb::BLACK);
    }

    #[test]
    fn argb_round_trip() {
        let pixel = Rgb::new(1, 2, 3).to_argb();
        assert_eq!(pixel, 0xFF01_0203);
        assert_eq!(unpack_argb(pixel), [1, 2, 3, 255]);
        assert_eq!(pack_argb(1, 2, 3, 255), pixel);
        assert_eq!(Rgb::from_packed(pixel), Rgb::new(1, 2, 3));
    }
}
