//! CSV, label list and printable HTML renderings of a patch sheet.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patch_sheet::PatchRow;

const BOM: char = '\u{FEFF}';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvOrder {
    /// fixture, index, universe, address, channels
    #[default]
    Fixture,
    /// universe, address, fixture, index, channels
    Universe,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportGrouping {
    #[default]
    Continuous,
    Universe,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    #[default]
    Patch,
    Labels,
}

/// Column headings for CSV and the printed table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLabels {
    pub fixture: String,
    pub index: String,
    pub universe: String,
    pub address: String,
    pub channels: String,
}

/// Text and assets for the print document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrintOptions {
    pub patch_title: String,
    pub patch_subtitle: String,
    pub labels_title: String,
    pub labels_subtitle: String,
    /// `{universe}` is replaced with the universe number.
    pub universe_label: String,
    pub logo_src: String,
    pub labels_per_page: usize,
    pub columns: ColumnLabels,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            fixture: "Fixture".to_string(),
            index: "Index".to_string(),
            universe: "Universe".to_string(),
            address: "Address".to_string(),
            channels: "Channels".to_string(),
        }
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            patch_title: "DMX patch sheet".to_string(),
            patch_subtitle: "Generated with Y-Link DMX tools".to_string(),
            labels_title: "Fixture labels".to_string(),
            labels_subtitle: "Cut along the borders".to_string(),
            universe_label: "Universe {universe}".to_string(),
            logo_src: "/Y-Link-Logo.png".to_string(),
            labels_per_page: 24,
            columns: ColumnLabels::default(),
        }
    }
}

impl PrintMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrintMode::Patch => "patch",
            PrintMode::Labels => "labels",
        }
    }

    pub fn document_title(&self, date: NaiveDate) -> String {
        match self {
            PrintMode::Patch => format!("dmx-patch-sheet_{}", date.format("%Y-%m-%d")),
            PrintMode::Labels => format!("dmx-labels_{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Quote a field when it contains a separator, quote or line break.
pub fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// UTF-8 CSV with a byte order mark so spreadsheet apps pick the encoding.
pub fn to_csv(rows: &[PatchRow], order: CsvOrder, labels: &ColumnLabels) -> String {
    let header = match order {
        CsvOrder::Fixture => [
            &labels.fixture,
            &labels.index,
            &labels.universe,
            &labels.address,
            &labels.channels,
        ],
        CsvOrder::Universe => [
            &labels.universe,
            &labels.address,
            &labels.fixture,
            &labels.index,
            &labels.channels,
        ],
    }
    .map(|label| label.to_string());

    let lines = std::iter::once(header).chain(rows.iter().map(|row| match order {
        CsvOrder::Fixture => [
            row.fixture_label.clone(),
            row.index_label.clone(),
            row.universe.to_string(),
            row.address_label.clone(),
            row.channels.to_string(),
        ],
        CsvOrder::Universe => [
            row.universe.to_string(),
            row.address_label.clone(),
            row.fixture_label.clone(),
            row.index_label.clone(),
            row.channels.to_string(),
        ],
    }));

    let body = lines
        .map(|fields| {
            fields
                .iter()
                .map(|field| escape_csv(field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{}", BOM, body)
}

/// Plain text list for pasting into a label printer or chat.
pub fn label_list(rows: &[PatchRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{} -> U{} / {}",
                row.fixture_label, row.universe, row.address_label
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rows grouped by universe, in ascending universe order.
fn rows_by_universe(rows: &[PatchRow]) -> BTreeMap<u32, Vec<PatchRow>> {
    let mut groups: BTreeMap<u32, Vec<PatchRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.universe).or_default().push(row.clone());
    }
    groups
}

/// Split rows into printed pages for the given mode and grouping.
pub fn print_pages(
    rows: &[PatchRow],
    mode: PrintMode,
    grouping: ExportGrouping,
    labels_per_page: usize,
) -> Vec<(Option<u32>, Vec<PatchRow>)> {
    let per_page = labels_per_page.max(1);
    match (mode, grouping) {
        (PrintMode::Patch, ExportGrouping::Continuous) => vec![(None, rows.to_vec())],
        (PrintMode::Patch, ExportGrouping::Universe) => rows_by_universe(rows)
            .into_iter()
            .map(|(universe, rows)| (Some(universe), rows))
            .collect(),
        (PrintMode::Labels, ExportGrouping::Continuous) => rows
            .chunks(per_page)
            .map(|chunk| (None, chunk.to_vec()))
            .collect(),
        (PrintMode::Labels, ExportGrouping::Universe) => rows_by_universe(rows)
            .into_iter()
            .flat_map(|(universe, rows)| {
                rows.chunks(per_page)
                    .map(|chunk| (Some(universe), chunk.to_vec()))
                    .collect::<Vec<_>>()
            })
            .collect(),
    }
}

fn page_header(
    title: &str,
    subtitle: &str,
    universe: Option<u32>,
    options: &PrintOptions,
    logo_class: &str,
) -> String {
    let universe_block = universe
        .map(|universe| {
            format!(
                "<div class=\"universe\">{}</div>",
                escape_html(&options.universe_label.replace("{universe}", &universe.to_string()))
            )
        })
        .unwrap_or_default();

    format!(
        "<img src=\"{}\" alt=\"Y-Link\" class=\"logo {}\" />\
         <div class=\"title\">{}</div>\
         <div class=\"subtitle\">{}</div>{}",
        escape_html(&options.logo_src),
        logo_class,
        escape_html(title),
        escape_html(subtitle),
        universe_block
    )
}

fn render_patch_page(universe: Option<u32>, rows: &[PatchRow], options: &PrintOptions) -> String {
    let columns = &options.columns;
    let body: String = rows
        .iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&row.fixture_label),
                escape_html(&row.index_label),
                row.universe,
                escape_html(&row.address_label),
                row.channels
            )
        })
        .collect();

    format!(
        "<div class=\"page\">{}<table><thead><tr>\
         <th>{}</th><th>{}</th><th>{}</th><th>{}</th><th>{}</th>\
         </tr></thead><tbody>{}</tbody></table></div>",
        page_header(&options.patch_title, &options.patch_subtitle, universe, options, "logo--patch"),
        escape_html(&columns.fixture),
        escape_html(&columns.index),
        escape_html(&columns.universe),
        escape_html(&columns.address),
        escape_html(&columns.channels),
        body
    )
}

fn render_label_page(universe: Option<u32>, rows: &[PatchRow], options: &PrintOptions) -> String {
    let labels: String = rows
        .iter()
        .map(|row| {
            format!(
                "<div class=\"label\"><div class=\"label-name\">{}</div>\
                 <div class=\"label-address\">U{} / {}</div></div>",
                escape_html(&row.fixture_label),
                row.universe,
                escape_html(&row.address_label)
            )
        })
        .collect();

    format!(
        "<div class=\"page\">{}<div class=\"label-grid\">{}</div></div>",
        page_header(&options.labels_title, &options.labels_subtitle, universe, options, "logo--labels"),
        labels
    )
}

const PRINT_STYLE: &str = r#"
@page { size: A4; margin: 10mm; }
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, -apple-system, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; color: #000; background: #fff; }
.page { page-break-after: always; }
.page:last-child { page-break-after: auto; }
.logo { height: auto; margin-bottom: 6mm; }
.logo--patch { width: 30mm; }
.logo--labels { width: 25mm; }
.title { font-size: 16px; font-weight: 600; margin-bottom: 4mm; }
.subtitle { font-size: 12px; margin-bottom: 8mm; }
.universe { font-size: 12px; font-weight: 600; margin-bottom: 6mm; }
table { width: 100%; border-collapse: collapse; font-size: 12px; }
thead { display: table-header-group; }
th, td { border: 1px solid #111; padding: 4px 6px; text-align: left; }
th:nth-child(4), td:nth-child(4) { font-family: ui-monospace, Menlo, Consolas, monospace; }
.label-grid { display: grid; grid-template-columns: repeat(3, 61mm); grid-auto-rows: 28mm; column-gap: 3mm; row-gap: 3mm; min-height: calc(8 * 28mm + 7 * 3mm); }
body.mode-labels .logo { margin-bottom: 3mm; }
body.mode-labels .title { font-size: 12px; margin-bottom: 2mm; }
body.mode-labels .subtitle { font-size: 10px; margin-bottom: 4mm; }
body.mode-labels .universe { font-size: 10px; margin-bottom: 3mm; }
.label { border: 1px solid #111; padding: 4mm; display: flex; flex-direction: column; justify-content: center; gap: 2mm; }
.label-name { font-size: 12px; font-weight: 600; }
.label-address { font-size: 11px; }
"#;

/// Standalone A4 HTML document for the browser's print / save-as-PDF dialog.
pub fn render_print_html(
    rows: &[PatchRow],
    mode: PrintMode,
    grouping: ExportGrouping,
    options: &PrintOptions,
    date: NaiveDate,
) -> String {
    let pages: String = print_pages(rows, mode, grouping, options.labels_per_page)
        .iter()
        .map(|(universe, rows)| match mode {
            PrintMode::Patch => render_patch_page(*universe, rows, options),
            PrintMode::Labels => render_label_page(*universe, rows, options),
        })
        .collect();

    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
         <meta name=\"robots\" content=\"noindex\" />\n<title>{}</title>\n<style>{}</style>\n\
         </head>\n<body class=\"mode-{}\">{}</body>\n</html>\n",
        escape_html(&mode.document_title(date)),
        PRINT_STYLE,
        mode.as_str(),
        pages
    )
}
