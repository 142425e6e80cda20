//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};

use connectivity_ctl::sim::controller::ConnectivityController;
use connectivity_ctl::sim::diagnostics::RecordingDiagnostics;
use connectivity_ctl::sim::types::{ControllerParams, PV_SOURCE, StepInputs, WIND_SOURCE};

/// Controller with default parameters that records its diagnostics.
pub fn recording_controller() -> ConnectivityController<RecordingDiagnostics> {
    ConnectivityController::new(ControllerParams::default(), RecordingDiagnostics::new())
}

/// PV and wind share connector `A`; the battery sits on `B`.
pub fn pv_wind_snapshot() -> Value {
    json!({
        "values": [["A"], ["A"], ["B"]],
        "sources": [PV_SOURCE, WIND_SOURCE, "Battery-0"],
    })
}

/// Step inputs wrapping [`pv_wind_snapshot`].
pub fn pv_wind_inputs() -> StepInputs {
    StepInputs::with_connections(pv_wind_snapshot())
}

/// Path of a scenario file shipped with the crate.
pub fn scenario_path(name: &str) -> String {
    format!("{}/scenarios/{name}", env!("CARGO_MANIFEST_DIR"))
}
