//! DMX calculator endpoints under `/api/tools`.
//!
//! Request bodies carry raw form values. Numbers arrive as floats and are
//! clamped by the calculators, so a bad field yields a warning or a clamped
//! result instead of an error.

use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use ylink_core::dip::SWITCH_COUNT;
use ylink_core::{
    capacity, check_overlap, clamp_int, convert, decode_handoff, encode_handoff, generate,
    label_list, next_free_address, power_report, render_print_html, to_csv, validate,
    AddressPlanner, CapacityReport, ColorInput, ColorOutput, ColumnLabels, ConversionOptions,
    CsvOrder, DipSwitches, ExportGrouping, FixtureSpec, ImportedPatchRow, OverlapRange,
    PatchImport, PatchRow, PatchSettings, PatchWarning, PlacementRange, PlannerLayout,
    PlannerWarning, PowerFixture, PowerReport, PowerSettings, PrintMode, PrintOptions, Rgb,
    ToolSettings,
};
use ylink_fixtures::{ColorLayout, Fixture};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overlap", post(find_overlaps))
        .route("/next-free", post(find_next_free))
        .route("/address-planner", post(plan_addresses))
        .route("/patch-sheet", post(generate_patch_sheet))
        .route("/patch-sheet/csv", post(export_csv))
        .route("/patch-sheet/labels", post(export_labels))
        .route("/patch-sheet/print", post(export_print))
        .route("/patch-sheet/import", get(import_handoff))
        .route("/color", post(convert_color))
        .route("/capacity", post(calculate_capacity))
        .route("/dip", get(dip_from_address).post(dip_from_switches))
        .route("/power", post(calculate_power))
}

fn attachment(content_type: &str, filename: &str, body: String) -> Response {
    (
        [
            (CONTENT_TYPE, content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

// --- Overlap / next free -----------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct OverlapRequest {
    pub ranges: Vec<PlacementRange>,
}

#[derive(Debug, Serialize)]
pub struct OverlapResponse {
    pub overlaps: Vec<OverlapRange>,
}

/// POST /api/tools/overlap
async fn find_overlaps(Json(req): Json<OverlapRequest>) -> Json<OverlapResponse> {
    Json(OverlapResponse {
        overlaps: check_overlap(&req.ranges),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextFreeRequest {
    /// One entry per channel, `true` when taken.
    pub occupied: Vec<bool>,
    pub channels_needed: f64,
    #[serde(default)]
    pub start_address: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct NextFreeResponse {
    pub address: Option<u32>,
}

/// POST /api/tools/next-free
async fn find_next_free(Json(req): Json<NextFreeRequest>) -> Json<NextFreeResponse> {
    let channels = clamp_int(req.channels_needed, 0);
    let start = req.start_address.map_or(1, |address| clamp_int(address, 1));
    Json(NextFreeResponse {
        address: next_free_address(&req.occupied, channels, start),
    })
}

// --- Address planner ---------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRequest {
    pub fixture_id: String,
    /// Omitted to take the first free run.
    #[serde(default)]
    pub start_address: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddressPlannerRequest {
    pub fixtures: Vec<Fixture>,
    pub placements: Vec<PlacementRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedFixture {
    pub fixture_id: String,
    pub start_address: u32,
    pub end_address: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPlannerResponse {
    pub placements: Vec<PlacedFixture>,
    pub layout: PlannerLayout,
    pub warnings: Vec<PlannerWarning>,
    pub handoff_rows: Vec<ImportedPatchRow>,
    /// Query value for `/api/tools/patch-sheet/import`, absent when nothing is placed.
    pub handoff: Option<String>,
}

/// POST /api/tools/address-planner
///
/// Replays the placements in order, so a later placement sees the earlier ones.
async fn plan_addresses(
    State(state): State<AppState>,
    Json(req): Json<AddressPlannerRequest>,
) -> AppResult<Json<AddressPlannerResponse>> {
    let mut planner = AddressPlanner::new(&state.tools.fallback_name);
    let mut warnings = Vec::new();

    for fixture in req.fixtures {
        if let Err(warning) = planner.add_fixture(fixture) {
            warnings.push(warning);
        }
    }
    for placement in &req.placements {
        let result = match placement.start_address {
            Some(address) => planner.place_fixture(&placement.fixture_id, clamp_int(address, 1)),
            None => planner.place_next_free(&placement.fixture_id).map(|_| ()),
        };
        if let Err(warning) = result {
            warnings.push(warning);
        }
    }

    let placements = planner
        .fixtures()
        .iter()
        .filter_map(|fixture| {
            planner.placement(&fixture.id).map(|placement| PlacedFixture {
                fixture_id: fixture.id.clone(),
                start_address: placement.start_address,
                end_address: fixture.end_address(placement.start_address),
            })
        })
        .collect();

    let handoff_rows = planner.handoff_rows();
    let handoff = if handoff_rows.is_empty() {
        None
    } else {
        Some(encode_handoff(&handoff_rows)?)
    };

    Ok(Json(AddressPlannerResponse {
        placements,
        layout: planner.layout(),
        warnings,
        handoff_rows,
        handoff,
    }))
}

// --- Patch sheet -------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatchSettingsInput {
    pub start_universe: Option<f64>,
    pub start_address: Option<f64>,
    pub channels_per_universe: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureInput {
    #[serde(default)]
    pub name: String,
    pub channel_count: f64,
    #[serde(default = "one")]
    pub quantity: f64,
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PatchSheetRequest {
    pub settings: PatchSettingsInput,
    pub fixtures: Vec<FixtureInput>,
}

impl PatchSheetRequest {
    fn resolve(&self, tools: &ToolSettings) -> (PatchSettings, Vec<FixtureSpec>) {
        let settings = PatchSettings::from_raw(
            self.settings.start_universe.unwrap_or(1.0),
            self.settings.start_address.unwrap_or(1.0),
            self.settings
                .channels_per_universe
                .unwrap_or(f64::from(tools.channels_per_universe)),
        );
        let fixtures = self
            .fixtures
            .iter()
            .map(|f| {
                FixtureSpec::new(
                    &f.name,
                    clamp_int(f.channel_count, 1),
                    clamp_int(f.quantity, 1),
                )
            })
            .collect();
        (settings, fixtures)
    }

    fn rows(&self, tools: &ToolSettings) -> Vec<PatchRow> {
        let (settings, fixtures) = self.resolve(tools);
        generate(&settings, &fixtures, &tools.fallback_name, &tools.limits).rows
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSheetResponse {
    pub settings: PatchSettings,
    pub rows: Vec<PatchRow>,
    /// Problems hit while allocating.
    pub warnings: Vec<PatchWarning>,
    /// Problems with the input as entered.
    pub validation: Vec<PatchWarning>,
}

/// POST /api/tools/patch-sheet
async fn generate_patch_sheet(
    State(state): State<AppState>,
    Json(req): Json<PatchSheetRequest>,
) -> Json<PatchSheetResponse> {
    let tools = state.tools.as_ref();
    let (settings, fixtures) = req.resolve(tools);
    let validation = validate(&settings, &fixtures, &tools.fallback_name);
    let sheet = generate(&settings, &fixtures, &tools.fallback_name, &tools.limits);
    Json(PatchSheetResponse {
        settings,
        rows: sheet.rows,
        warnings: sheet.warnings,
        validation,
    })
}

#[derive(Debug, Deserialize)]
pub struct CsvRequest {
    #[serde(flatten)]
    pub sheet: PatchSheetRequest,
    #[serde(default)]
    pub order: CsvOrder,
    #[serde(default)]
    pub columns: Option<ColumnLabels>,
}

/// POST /api/tools/patch-sheet/csv
async fn export_csv(State(state): State<AppState>, Json(req): Json<CsvRequest>) -> Response {
    let tools = state.tools.as_ref();
    let rows = req.sheet.rows(tools);
    let columns = req.columns.as_ref().unwrap_or(&tools.print.columns);
    let filename = format!(
        "{}.csv",
        PrintMode::Patch.document_title(Utc::now().date_naive())
    );
    attachment(
        "text/csv; charset=utf-8",
        &filename,
        to_csv(&rows, req.order, columns),
    )
}

/// POST /api/tools/patch-sheet/labels
async fn export_labels(
    State(state): State<AppState>,
    Json(req): Json<PatchSheetRequest>,
) -> Response {
    let rows = req.rows(state.tools.as_ref());
    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        label_list(&rows),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    #[serde(flatten)]
    pub sheet: PatchSheetRequest,
    #[serde(default)]
    pub mode: PrintMode,
    #[serde(default)]
    pub grouping: ExportGrouping,
    #[serde(default)]
    pub options: Option<PrintOptions>,
}

/// POST /api/tools/patch-sheet/print
async fn export_print(State(state): State<AppState>, Json(req): Json<PrintRequest>) -> Response {
    let tools = state.tools.as_ref();
    let rows = req.sheet.rows(tools);
    let options = req.options.as_ref().unwrap_or(&tools.print);
    let html = render_print_html(
        &rows,
        req.mode,
        req.grouping,
        options,
        Utc::now().date_naive(),
    );
    ([(CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub import: Option<String>,
}

/// GET /api/tools/patch-sheet/import?import=...
async fn import_handoff(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
) -> AppResult<Json<PatchImport>> {
    let param = query
        .import
        .ok_or_else(|| AppError::BadRequest("Missing import parameter".to_string()))?;
    let import = decode_handoff(&param, &state.tools.fallback_name)?;
    log::debug!(
        "Imported {} rows from the address planner",
        import.rows.len()
    );
    Ok(Json(import))
}

// --- Colour ------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorRequest {
    #[serde(default)]
    pub input: Option<ColorInput>,
    /// Shorthand for an RGB input, `#RGB` or `#RRGGBB`.
    #[serde(default)]
    pub hex: Option<String>,
    #[serde(default)]
    pub layout: ColorLayout,
    #[serde(default)]
    pub options: ConversionOptions,
}

/// POST /api/tools/color
async fn convert_color(
    State(state): State<AppState>,
    Json(req): Json<ColorRequest>,
) -> AppResult<Json<ColorOutput>> {
    let input = match (req.input, req.hex) {
        (Some(input), _) => input,
        (None, Some(hex)) => ColorInput::Rgb(
            Rgb::parse_hex(&hex)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid hex colour: {}", hex)))?,
        ),
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either input or hex is required".to_string(),
            ))
        }
    };
    Ok(Json(convert(
        &input,
        req.layout,
        &req.options,
        &state.tools.color,
    )))
}

// --- Capacity / DIP / power ----------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityRequest {
    pub channels_per_fixture: f64,
    #[serde(default)]
    pub fixture_count: Option<f64>,
    #[serde(default)]
    pub channels_per_universe: Option<f64>,
}

/// POST /api/tools/capacity
async fn calculate_capacity(
    State(state): State<AppState>,
    Json(req): Json<CapacityRequest>,
) -> Json<CapacityReport> {
    let per_universe = req
        .channels_per_universe
        .unwrap_or(f64::from(state.tools.channels_per_universe));
    Json(capacity(
        req.channels_per_fixture,
        req.fixture_count,
        per_universe,
    ))
}

#[derive(Debug, Deserialize)]
pub struct DipQuery {
    pub address: Option<f64>,
}

/// GET /api/tools/dip?address=...
async fn dip_from_address(Query(query): Query<DipQuery>) -> Json<DipSwitches> {
    let address = query
        .address
        .filter(|address| address.is_finite())
        .map_or(1, |address| address.floor() as i64);
    Json(DipSwitches::from_address(address))
}

#[derive(Debug, Deserialize)]
pub struct DipSwitchRequest {
    pub switches: [bool; SWITCH_COUNT],
    /// 0-based switch to flip before reading the address.
    #[serde(default)]
    pub toggle: Option<usize>,
}

/// POST /api/tools/dip
async fn dip_from_switches(Json(req): Json<DipSwitchRequest>) -> Json<DipSwitches> {
    let dip = DipSwitches::from_switches(req.switches);
    Json(match req.toggle {
        Some(index) => dip.toggle(index),
        None => dip,
    })
}

#[derive(Debug, Deserialize)]
pub struct PowerRequest {
    pub fixtures: Vec<PowerFixture>,
    #[serde(default)]
    pub settings: PowerSettings,
}

/// POST /api/tools/power
async fn calculate_power(
    State(state): State<AppState>,
    Json(req): Json<PowerRequest>,
) -> Json<PowerReport> {
    Json(power_report(&req.fixtures, &req.settings, &state.tools.limits))
}
