use serde::{Deserialize, Serialize};

/// 8-bit sRGB colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Floating point triple, used for linear light and normalized sRGB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgbf {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// IEC 61966-2-1 transfer function, encoded to linear.
pub fn srgb_to_linear(value: f64) -> f64 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(value: f64) -> f64 {
    if value <= 0.0031308 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

/// Round a 0-255 float to the nearest channel value.
pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// `#RGB` or `#RRGGBB`, the `#` optional. Anything else is `None`.
    pub fn parse_hex(value: &str) -> Option<Self> {
        let cleaned = value.trim();
        let cleaned = cleaned.strip_prefix('#').unwrap_or(cleaned);
        if !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let expanded: String = match cleaned.len() {
            3 => cleaned.chars().flat_map(|c| [c, c]).collect(),
            6 => cleaned.to_string(),
            _ => return None,
        };
        let number = u32::from_str_radix(&expanded, 16).ok()?;

        Some(Rgb {
            r: ((number >> 16) & 0xff) as u8,
            g: ((number >> 8) & 0xff) as u8,
            b: (number & 0xff) as u8,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn normalized(&self) -> Rgbf {
        Rgbf {
            r: f64::from(self.r) / 255.0,
            g: f64::from(self.g) / 255.0,
            b: f64::from(self.b) / 255.0,
        }
    }

    pub fn to_linear(&self) -> Rgbf {
        self.normalized().map(srgb_to_linear)
    }

    /// Colour from hue in degrees and saturation/value in 0..=1.
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let hue = if hue.is_finite() { hue.rem_euclid(360.0) } else { 0.0 };
        let saturation = clamp01(saturation);
        let value = clamp01(value);

        let chroma = value * saturation;
        let sector = hue / 60.0;
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = value - chroma;

        Rgb {
            r: clamp_channel((r + m) * 255.0),
            g: clamp_channel((g + m) * 255.0),
            b: clamp_channel((b + m) * 255.0),
        }
    }
}

impl Rgbf {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Rgbf { r, g, b }
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Rgbf {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        self.map(|c| c * factor)
    }

    pub fn max(&self) -> f64 {
        self.r.max(self.g).max(self.b)
    }

    pub fn min(&self) -> f64 {
        self.r.min(self.g).min(self.b)
    }

    /// Hue in degrees, 0 for greys.
    pub fn hue(&self) -> f64 {
        let max = self.max();
        let delta = max - self.min();
        if delta == 0.0 {
            0.0
        } else if max == self.r {
            (self.g - self.b) / delta * 60.0 + if self.g < self.b { 360.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / delta * 60.0 + 120.0
        } else {
            (self.r - self.g) / delta * 60.0 + 240.0
        }
    }

    /// HSV saturation, `(max - min) / max`.
    pub fn saturation(&self) -> f64 {
        let max = self.max();
        if max == 0.0 {
            0.0
        } else {
            (max - self.min()) / max
        }
    }

    pub fn to_rgb8(&self) -> Rgb {
        Rgb {
            r: clamp_channel(self.r * 255.0),
            g: clamp_channel(self.g * 255.0),
            b: clamp_channel(self.b * 255.0),
        }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse_hex("#FF7A66"), Some(Rgb::new(255, 122, 102)));
        assert_eq!(Rgb::parse_hex("ff7a66"), Some(Rgb::new(255, 122, 102)));
        assert_eq!(Rgb::parse_hex(" #abc "), Some(Rgb::new(0xaa, 0xbb, 0xcc)));
        assert_eq!(Rgb::parse_hex("#abcd"), None);
        assert_eq!(Rgb::parse_hex("#GGGGGG"), None);
        assert_eq!(Rgb::parse_hex(""), None);
    }

    #[test]
    fn test_to_hex_is_upper_case() {
        assert_eq!(Rgb::new(255, 122, 102).to_hex(), "#FF7A66");
        assert_eq!(Rgb::new(0, 10, 1).to_string(), "#000A01");
    }

    #[test]
    fn test_transfer_curve_round_trips() {
        for value in [0.0, 0.002, 0.03, 0.2, 0.5, 0.9, 1.0] {
            assert_relative_eq!(linear_to_srgb(srgb_to_linear(value)), value, epsilon = 1e-9);
        }
        assert_relative_eq!(srgb_to_linear(0.5), 0.214041, epsilon = 1e-5);
    }

    #[test]
    fn test_hue_and_saturation() {
        assert_eq!(Rgbf::new(1.0, 0.0, 0.0).hue(), 0.0);
        assert_relative_eq!(Rgbf::new(0.0, 1.0, 0.0).hue(), 120.0);
        assert_relative_eq!(Rgbf::new(1.0, 0.0, 1.0).hue(), 300.0);
        assert_relative_eq!(Rgbf::new(1.0, 0.5, 0.0).hue(), 30.0);
        assert_eq!(Rgbf::new(0.3, 0.3, 0.3).saturation(), 0.0);
        assert_relative_eq!(Rgbf::new(1.0, 0.5, 0.0).saturation(), 1.0);
    }

    #[test]
    fn test_from_hsv() {
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsv(120.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsv(240.0, 1.0, 0.5), Rgb::new(0, 0, 128));
        assert_eq!(Rgb::from_hsv(-60.0, 1.0, 1.0), Rgb::new(255, 0, 255));
        assert_eq!(Rgb::from_hsv(30.0, 0.0, 1.0), Rgb::new(255, 255, 255));
    }
}
