use serde::{Deserialize, Serialize};

use crate::color_channels;

/// Colour channel arrangement of an LED fixture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorLayout {
    Rgb,
    #[default]
    Rgbw,
    Rgba,
    Rgbwa,
    /// RGB plus warm white and cool white emitters.
    #[serde(rename = "rgbwwcw")]
    RgbWwCw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
    White,
    WarmWhite,
    CoolWhite,
    Amber,
}

impl ColorLayout {
    pub fn supports_white(&self) -> bool {
        matches!(self, ColorLayout::Rgbw | ColorLayout::Rgbwa)
    }

    pub fn supports_warm_cool_white(&self) -> bool {
        matches!(self, ColorLayout::RgbWwCw)
    }

    pub fn supports_amber(&self) -> bool {
        matches!(self, ColorLayout::Rgba | ColorLayout::Rgbwa)
    }

    /// Output channels in the order the fixture expects them.
    pub fn channels(&self) -> Vec<ColorChannel> {
        use ColorChannel::*;
        match self {
            ColorLayout::Rgb => color_channels![Red, Green, Blue],
            ColorLayout::Rgbw => color_channels![Red, Green, Blue, White],
            ColorLayout::Rgba => color_channels![Red, Green, Blue, Amber],
            ColorLayout::Rgbwa => color_channels![Red, Green, Blue, White, Amber],
            ColorLayout::RgbWwCw => color_channels![Red, Green, Blue, WarmWhite, CoolWhite],
        }
    }

    pub fn all() -> Vec<ColorLayout> {
        vec![
            ColorLayout::Rgb,
            ColorLayout::Rgbw,
            ColorLayout::Rgba,
            ColorLayout::Rgbwa,
            ColorLayout::RgbWwCw,
        ]
    }
}

impl std::fmt::Display for ColorLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ColorLayout::Rgb => write!(f, "RGB"),
            ColorLayout::Rgbw => write!(f, "RGBW"),
            ColorLayout::Rgba => write!(f, "RGBA"),
            ColorLayout::Rgbwa => write!(f, "RGBWA"),
            ColorLayout::RgbWwCw => write!(f, "RGB+WW+CW"),
        }
    }
}

impl std::fmt::Display for ColorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ColorChannel::Red => write!(f, "Red"),
            ColorChannel::Green => write!(f, "Green"),
            ColorChannel::Blue => write!(f, "Blue"),
            ColorChannel::White => write!(f, "White"),
            ColorChannel::WarmWhite => write!(f, "Warm White"),
            ColorChannel::CoolWhite => write!(f, "Cool White"),
            ColorChannel::Amber => write!(f, "Amber"),
        }
    }
}
