pub mod cct;
pub mod conversion;
pub mod rgb;

pub use cct::{cct_to_linear_rgb, cct_to_xy, estimate_cct, mix_ww_cw, xy_to_linear_rgb};
pub use conversion::{
    coarse_fine, convert, to_dmx16, to_dmx8, ChannelValue, ColorInput, ColorOutput,
    ColorThresholds, ConversionOptions,
};
pub use rgb::{linear_to_srgb, srgb_to_linear, Rgb, Rgbf};
