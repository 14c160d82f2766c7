//! WASM bindings for recurrence-engine.
//!
//! Exposes occurrence previews, exclusion bookkeeping, and the final save list
//! to the event-creation form via `wasm-bindgen`. All complex types are passed
//! as JSON strings using the engine's serde shapes, with snake_case keys
//! throughout.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p recurrence-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/recurrence_engine_wasm.wasm
//! ```

use chrono::NaiveDateTime;
use recurrence_engine::{
    EventWindow, ExclusionSet, GeneratedOccurrence, OccurrenceId, RecurrenceSpec, SpecPatch,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct OccurrenceDto {
    id: String,
    start: String,
    end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    arrival: Option<String>,
}

impl From<&GeneratedOccurrence> for OccurrenceDto {
    fn from(o: &GeneratedOccurrence) -> Self {
        Self {
            id: o.id.to_string(),
            start: iso(o.start),
            end: iso(o.end),
            arrival: o.arrival.map(iso),
        }
    }
}

#[derive(Serialize)]
struct SpecUpdateDto {
    spec: RecurrenceSpec,
    kind_changed: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn iso(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn parse_json<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Duration of the base window in minutes.
///
/// `window_json` is an `EventWindow` object (`base_date`, `start_time`, `end_time`).
#[wasm_bindgen(js_name = "computeDuration")]
pub fn compute_duration(window_json: &str) -> Result<i64, JsValue> {
    let window: EventWindow = parse_json("window", window_json)?;
    recurrence_engine::compute_duration(&window)
        .map(|d| d.num_minutes())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Preview occurrences for the calendar.
///
/// Returns a JSON array of `{id, start, end, arrival?}`. A draft that cannot
/// currently be expanded (half-typed time, invalid spec) yields `[]` rather
/// than an error so the preview can always render.
#[wasm_bindgen(js_name = "materialize")]
pub fn materialize(
    window_json: &str,
    spec_json: &str,
    exclusions_json: &str,
) -> Result<String, JsValue> {
    let window: EventWindow = parse_json("window", window_json)?;
    let spec: RecurrenceSpec = parse_json("spec", spec_json)?;
    let exclusions: ExclusionSet = parse_json("exclusions", exclusions_json)?;

    let occurrences = recurrence_engine::materialize_or_empty(&window, &spec, &exclusions);
    let dtos: Vec<OccurrenceDto> = occurrences.iter().map(OccurrenceDto::from).collect();

    to_json(&dtos)
}

/// Final occurrences to persist on submit, base occurrence first.
///
/// Returns a JSON array of `{id, start, end, arrival?}`.
#[wasm_bindgen(js_name = "finalDateList")]
pub fn final_date_list(
    window_json: &str,
    spec_json: &str,
    exclusions_json: &str,
) -> Result<String, JsValue> {
    let window: EventWindow = parse_json("window", window_json)?;
    let spec: RecurrenceSpec = parse_json("spec", spec_json)?;
    let exclusions: ExclusionSet = parse_json("exclusions", exclusions_json)?;

    let occurrences = recurrence_engine::final_occurrences(&window, &spec, &exclusions)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let dtos: Vec<OccurrenceDto> = occurrences.iter().map(OccurrenceDto::from).collect();

    to_json(&dtos)
}

/// Merge a spec patch. Returns `{spec, kind_changed}`; when `kind_changed` is
/// true the caller must reset its exclusions to `[]` in the same update.
#[wasm_bindgen(js_name = "updateSpec")]
pub fn update_spec(spec_json: &str, patch_json: &str) -> Result<String, JsValue> {
    let spec: RecurrenceSpec = parse_json("spec", spec_json)?;
    let patch: SpecPatch = parse_json("patch", patch_json)?;

    let update = recurrence_engine::update_spec(&spec, &patch);

    to_json(&SpecUpdateDto {
        spec: update.spec,
        kind_changed: update.kind_changed,
    })
}

/// Exclude an occurrence by identity. Returns the new exclusion array.
#[wasm_bindgen(js_name = "toggleExclusion")]
pub fn toggle_exclusion(exclusions_json: &str, id: &str) -> Result<String, JsValue> {
    let exclusions: ExclusionSet = parse_json("exclusions", exclusions_json)?;
    to_json(&exclusions.exclude(&OccurrenceId::from(id)))
}

/// Restore a previously excluded occurrence. Returns the new exclusion array.
#[wasm_bindgen(js_name = "restoreExclusion")]
pub fn restore_exclusion(exclusions_json: &str, id: &str) -> Result<String, JsValue> {
    let exclusions: ExclusionSet = parse_json("exclusions", exclusions_json)?;
    to_json(&exclusions.restore(&OccurrenceId::from(id)))
}
