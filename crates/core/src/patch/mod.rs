pub mod export;
pub mod handoff;
pub mod patch_sheet;

pub use export::{
    escape_csv, escape_html, label_list, print_pages, render_print_html, to_csv, ColumnLabels,
    CsvOrder, ExportGrouping, PrintMode, PrintOptions,
};
pub use handoff::{decode_handoff, encode_handoff, HandoffError, ImportedPatchRow, PatchImport};
pub use patch_sheet::{generate, validate, FixtureSpec, PatchRow, PatchSettings, PatchSheet, PatchWarning};
