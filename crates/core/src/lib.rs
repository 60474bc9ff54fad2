pub use address::{
    check_overlap, clamp_int, next_free_address, AddressPlanner, NamedOverlap, OverlapRange,
    PlacementRange, PlannerLayout, PlannerWarning,
};
pub use capacity::{capacity, CapacityReport};
pub use color::{
    convert, ChannelValue, ColorInput, ColorOutput, ColorThresholds, ConversionOptions, Rgb,
};
pub use config::{ConfigError, ConfigManager, ConfigSchema, ToolSettings};
pub use dip::{DipSwitches, MAX_DIP_ADDRESS, PRESETS as DIP_PRESETS};
pub use limits::{ToolLimits, MAX_UNIVERSE};
pub use patch::{
    decode_handoff, encode_handoff, generate, label_list, render_print_html, to_csv, validate,
    ColumnLabels, CsvOrder, ExportGrouping, FixtureSpec, HandoffError, ImportedPatchRow,
    PatchImport, PatchRow, PatchSettings, PatchSheet, PatchWarning, PrintMode, PrintOptions,
};
pub use power::{
    power_report, CircuitLoad, LoadStatus, PowerFixture, PowerReport, PowerSettings, PowerWarning,
};

pub mod address;
pub mod capacity;
pub mod color;
mod config;
pub mod dip;
pub mod limits;
pub mod patch;
pub mod power;
