//! Colour or white point to per-channel DMX values for LED fixtures.

use serde::{Deserialize, Serialize};
use ylink_fixtures::{ColorChannel, ColorLayout};

use super::cct::{cct_to_linear_rgb, estimate_cct, mix_ww_cw, MAX_INPUT_KELVIN, MIN_INPUT_KELVIN};
use super::rgb::{clamp01, linear_to_srgb, Rgb};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ColorInput {
    Rgb(Rgb),
    /// Hue in degrees, saturation and value in 0..=1.
    Wheel {
        hue: f64,
        saturation: f64,
        value: f64,
    },
    /// White point. A missing or unusable kelvin uses the configured default.
    #[serde(rename_all = "camelCase")]
    Cct {
        kelvin: Option<f64>,
        intensity_percent: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Move the neutral part of a colour onto the white emitters.
    pub optimize_whites: bool,
    /// Cap white emitters at the white ceiling.
    pub limit_white: bool,
    /// Drive only R, G and B. Ignored for CCT input.
    pub rgb_only: bool,
}

/// Tunables for white and amber extraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorThresholds {
    /// Minimum neutral (smallest linear component) before white is used.
    pub white_threshold: f64,
    /// Colours at or above this saturation keep their white in RGB.
    pub saturation_cutoff: f64,
    /// White ceiling applied when `limit_white` is set.
    pub white_limit: f64,
    pub amber_hue_min: f64,
    pub amber_hue_max: f64,
    pub amber_min_saturation: f64,
    pub amber_strength: f64,
    pub default_kelvin: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelValue {
    pub channel: ColorChannel,
    /// Encoded output level in 0..=1.
    pub level: f64,
    pub dmx8: u8,
    pub dmx16: u16,
    pub coarse: u8,
    pub fine: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOutput {
    pub layout: ColorLayout,
    pub channels: Vec<ChannelValue>,
    pub preview: Rgb,
    pub preview_hex: String,
    /// White-only drive of a WW/CW fixture from a CCT input.
    pub cct_mode: bool,
    /// Effective kelvin for CCT input.
    pub kelvin: Option<f64>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            optimize_whites: true,
            limit_white: true,
            rgb_only: false,
        }
    }
}

impl Default for ColorThresholds {
    fn default() -> Self {
        Self {
            white_threshold: 0.08,
            saturation_cutoff: 0.65,
            white_limit: 0.7,
            amber_hue_min: 20.0,
            amber_hue_max: 60.0,
            amber_min_saturation: 0.2,
            amber_strength: 0.6,
            default_kelvin: 3200.0,
        }
    }
}

impl ColorThresholds {
    fn kelvin(&self, kelvin: Option<f64>) -> f64 {
        match kelvin {
            Some(k) if k.is_finite() => k.clamp(MIN_INPUT_KELVIN, MAX_INPUT_KELVIN),
            _ => self.default_kelvin.clamp(MIN_INPUT_KELVIN, MAX_INPUT_KELVIN),
        }
    }

    /// Strength of amber for `hue`: 1 at the band centre, 0 at its edges.
    fn amber_factor(&self, hue: f64) -> f64 {
        let centre = (self.amber_hue_min + self.amber_hue_max) / 2.0;
        let half_width = (self.amber_hue_max - self.amber_hue_min) / 2.0;
        if half_width <= 0.0 {
            return 0.0;
        }
        1.0 - (hue - centre).abs() / half_width
    }
}

impl ChannelValue {
    pub fn new(channel: ColorChannel, level: f64) -> Self {
        let level = clamp01(level);
        let dmx16 = to_dmx16(level);
        let (coarse, fine) = coarse_fine(dmx16);
        ChannelValue {
            channel,
            level,
            dmx8: to_dmx8(level),
            dmx16,
            coarse,
            fine,
        }
    }
}

impl ColorOutput {
    pub fn channel(&self, channel: ColorChannel) -> Option<&ChannelValue> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

pub fn to_dmx8(level: f64) -> u8 {
    (clamp01(level) * 255.0).round() as u8
}

pub fn to_dmx16(level: f64) -> u16 {
    (clamp01(level) * 65535.0).round() as u16
}

pub fn coarse_fine(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, (value & 0xff) as u8)
}

/// Linear light per emitter, before encoding.
#[derive(Default)]
struct Emitters {
    r: f64,
    g: f64,
    b: f64,
    w: f64,
    ww: f64,
    cw: f64,
    a: f64,
}

impl Emitters {
    fn level(&self, channel: ColorChannel) -> f64 {
        let linear = match channel {
            ColorChannel::Red => self.r,
            ColorChannel::Green => self.g,
            ColorChannel::Blue => self.b,
            ColorChannel::White => self.w,
            ColorChannel::WarmWhite => self.ww,
            ColorChannel::CoolWhite => self.cw,
            ColorChannel::Amber => self.a,
        };
        clamp01(linear_to_srgb(linear))
    }

    fn subtract_rgb(&mut self, amount: f64) {
        self.r = (self.r - amount).max(0.0);
        self.g = (self.g - amount).max(0.0);
        self.b = (self.b - amount).max(0.0);
    }
}

/// Compute channel values for `layout`.
///
/// Mixing happens in linear light. The neutral component of a low
/// saturation colour moves onto W (RGBW, RGBWA) or is split across WW/CW by
/// its estimated temperature (RGB+WW+CW). Orange hues feed the amber
/// emitter. A CCT input on an RGB+WW+CW fixture drives the whites only.
pub fn convert(
    input: &ColorInput,
    layout: ColorLayout,
    options: &ConversionOptions,
    thresholds: &ColorThresholds,
) -> ColorOutput {
    let is_cct = matches!(input, ColorInput::Cct { .. });
    let rgb_only = options.rgb_only && !is_cct;

    let (linear, encoded, preview, kelvin, intensity) = match input {
        ColorInput::Rgb(rgb) => (rgb.to_linear(), rgb.normalized(), *rgb, None, 1.0),
        ColorInput::Wheel {
            hue,
            saturation,
            value,
        } => {
            let rgb = Rgb::from_hsv(*hue, *saturation, *value);
            (rgb.to_linear(), rgb.normalized(), rgb, None, 1.0)
        }
        ColorInput::Cct {
            kelvin,
            intensity_percent,
        } => {
            let kelvin = thresholds.kelvin(*kelvin);
            let intensity = clamp01(intensity_percent / 100.0);
            let linear = cct_to_linear_rgb(kelvin).scale(intensity);
            let encoded = linear.map(|c| clamp01(linear_to_srgb(c)));
            (linear, encoded, encoded.to_rgb8(), Some(kelvin), intensity)
        }
    };

    let neutral = linear.min();
    let saturation = linear.saturation();
    let can_optimize = options.optimize_whites && !rgb_only && !is_cct;
    let use_white = can_optimize
        && neutral > thresholds.white_threshold
        && saturation < thresholds.saturation_cutoff;
    let white_scale = if options.limit_white {
        thresholds.white_limit
    } else {
        1.0
    };
    let cct_mode = is_cct && layout.supports_warm_cool_white() && !rgb_only;

    let mut out = Emitters {
        r: linear.r,
        g: linear.g,
        b: linear.b,
        ..Emitters::default()
    };

    if cct_mode {
        let (warm, cool) = mix_ww_cw(kelvin.unwrap_or(thresholds.default_kelvin));
        let level = intensity * white_scale;
        out = Emitters {
            ww: level * warm,
            cw: level * cool,
            ..Emitters::default()
        };
    } else {
        if layout.supports_warm_cool_white() && use_white {
            let white = neutral * white_scale;
            let (warm, cool) = mix_ww_cw(estimate_cct(linear));
            out.subtract_rgb(white);
            out.ww = white * warm;
            out.cw = white * cool;
        }

        if layout.supports_white() && use_white {
            let white = neutral * white_scale;
            out.subtract_rgb(white);
            out.w = white;
        }

        if layout.supports_amber() && can_optimize {
            let hue = encoded.hue();
            if (thresholds.amber_hue_min..=thresholds.amber_hue_max).contains(&hue)
                && encoded.saturation() > thresholds.amber_min_saturation
            {
                let amount = out.r.min(out.g) * thresholds.amber_factor(hue) * thresholds.amber_strength;
                out.a = amount;
                out.r = (out.r - amount * 0.5).max(0.0);
                out.g = (out.g - amount * 0.5).max(0.0);
            }
        }
    }

    let channels = layout
        .channels()
        .into_iter()
        .map(|channel| ChannelValue::new(channel, out.level(channel)))
        .collect();

    ColorOutput {
        layout,
        channels,
        preview,
        preview_hex: preview.to_hex(),
        cct_mode,
        kelvin,
    }
}
