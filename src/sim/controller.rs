//! Connectivity controller: topology check plus time-driven load selector.

use tracing::{debug, trace};

use super::connectivity::determine_connectivity;
use super::diagnostics::{Diagnostic, DiagnosticSink, TracingDiagnostics};
use super::error::{ControllerError, ControllerResult};
use super::types::{
    ConnectionSnapshot, ControllerParams, ControllerState, PHYSICAL_CONNECTIONS, StepInputs,
    StepReport,
};

/// Default upper bound a host may pass for `max_advance`.
pub const DEFAULT_MAX_ADVANCE: u64 = 900;

/// Contract between a host simulation and a stepped controller.
pub trait Controller {
    /// Runs one step at `time` and returns the next invocation time.
    ///
    /// # Errors
    ///
    /// Returns a `ControllerError` when `inputs` are structurally invalid.
    /// No state is published in that case.
    fn step(&mut self, time: u64, inputs: &StepInputs, max_advance: u64) -> ControllerResult<u64>;

    /// State published by the most recent successful step.
    fn states(&self) -> &ControllerState;
}

/// Infers physical links between models and selects the load data file.
///
/// # Examples
///
/// ```
/// use connectivity_ctl::sim::controller::{Controller, ConnectivityController};
/// use connectivity_ctl::sim::types::StepInputs;
/// use serde_json::json;
///
/// let mut ctl = ConnectivityController::default();
/// let inputs = StepInputs::with_connections(json!({ "values": [], "sources": [] }));
/// assert_eq!(ctl.step(41, &inputs, 900).unwrap(), 42);
/// assert_eq!(ctl.states().file_index_load, 1);
/// ```
#[derive(Debug)]
pub struct ConnectivityController<D: DiagnosticSink = TracingDiagnostics> {
    params: ControllerParams,
    state: ControllerState,
    time: Option<u64>,
    diagnostics: D,
}

impl Default for ConnectivityController {
    fn default() -> Self {
        Self::new(ControllerParams::default(), TracingDiagnostics)
    }
}

impl<D: DiagnosticSink> ConnectivityController<D> {
    /// Creates a controller with `file_index_Load = 0`.
    pub fn new(params: ControllerParams, diagnostics: D) -> Self {
        Self {
            params,
            state: ControllerState::default(),
            time: None,
            diagnostics,
        }
    }

    /// Time of the last successful step, if any.
    pub fn current_time(&self) -> Option<u64> {
        self.time
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Selector value for `time`.
    pub fn file_index_at(&self, time: u64) -> u8 {
        u8::from(time > self.params.load_switch_time)
    }

    /// Runs one step and returns its full outcome.
    ///
    /// Validates everything before touching state, so an error leaves the
    /// previously published state in place.
    ///
    /// # Errors
    ///
    /// * `MissingInput` if `physical_connections` is absent
    /// * `MalformedSnapshot` if the snapshot has the wrong shape
    /// * `TimeOverflow` if the next time does not fit in a `u64`
    pub fn advance(
        &mut self,
        time: u64,
        inputs: &StepInputs,
        max_advance: u64,
    ) -> ControllerResult<StepReport> {
        trace!(time, max_advance, "controller step");

        let snapshot = ConnectionSnapshot::from_value(inputs.require(PHYSICAL_CONNECTIONS)?)?;
        let next_time = time
            .checked_add(self.params.time_step_size)
            .ok_or(ControllerError::TimeOverflow {
                time,
                step: self.params.time_step_size,
            })?;

        let connections = determine_connectivity(&snapshot);
        let pv = &self.params.pv_source;
        let wind = &self.params.wind_source;
        let pv_wind_connected = connections.iter().any(|pair| pair.links(pv, wind));
        if pv_wind_connected {
            self.diagnostics.emit(&Diagnostic::PvWindConnected {
                pv: pv.clone(),
                wind: wind.clone(),
            });
        }

        let state = ControllerState {
            file_index_load: self.file_index_at(time),
        };
        if state != self.state {
            debug!(time, file_index_load = state.file_index_load, "load selector changed");
        }
        self.state = state;
        self.time = Some(time);

        Ok(StepReport {
            time,
            next_time,
            connections,
            pv_wind_connected,
            state,
        })
    }
}

impl<D: DiagnosticSink> Controller for ConnectivityController<D> {
    fn step(&mut self, time: u64, inputs: &StepInputs, max_advance: u64) -> ControllerResult<u64> {
        self.advance(time, inputs, max_advance)
            .map(|report| report.next_time)
    }

    fn states(&self) -> &ControllerState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::sim::diagnostics::RecordingDiagnostics;
    use crate::sim::types::{PV_SOURCE, WIND_SOURCE};

    fn recording() -> ConnectivityController<RecordingDiagnostics> {
        ConnectivityController::new(ControllerParams::default(), RecordingDiagnostics::new())
    }

    fn empty_inputs() -> StepInputs {
        StepInputs::with_connections(json!({ "values": [], "sources": [] }))
    }

    fn linked_inputs() -> StepInputs {
        StepInputs::with_connections(json!({
            "values": [["A"], ["A"], ["B"]],
            "sources": [PV_SOURCE, WIND_SOURCE, "Battery-0"],
        }))
    }

    #[test]
    fn starts_with_selector_zero() {
        let ctl = recording();
        assert_eq!(ctl.states().file_index_load, 0);
        assert_eq!(ctl.current_time(), None);
    }

    #[test]
    fn threshold_is_strict() {
        let mut ctl = recording();
        for (time, expected) in [(0, 0), (40, 0), (41, 1), (1000, 1)] {
            ctl.step(time, &empty_inputs(), DEFAULT_MAX_ADVANCE).unwrap();
            assert_eq!(ctl.states().file_index_load, expected, "time {time}");
        }
    }

    #[test]
    fn selector_follows_time_both_ways() {
        let mut ctl = recording();
        ctl.step(100, &empty_inputs(), DEFAULT_MAX_ADVANCE).unwrap();
        assert_eq!(ctl.states().file_index_load, 1);
        ctl.step(5, &empty_inputs(), DEFAULT_MAX_ADVANCE).unwrap();
        assert_eq!(ctl.states().file_index_load, 0);
    }

    #[test]
    fn returns_time_plus_step_size() {
        let mut ctl = recording();
        assert_eq!(ctl.step(0, &empty_inputs(), 900).unwrap(), 1);
        assert_eq!(ctl.step(41, &empty_inputs(), 900).unwrap(), 42);

        let params = ControllerParams {
            time_step_size: 15,
            ..ControllerParams::default()
        };
        let mut ctl = ConnectivityController::new(params, RecordingDiagnostics::new());
        assert_eq!(ctl.step(30, &empty_inputs(), 900).unwrap(), 45);
    }

    #[test]
    fn emits_diagnostic_when_pv_and_wind_linked() {
        let mut ctl = recording();
        let report = ctl.advance(10, &linked_inputs(), 900).unwrap();
        assert!(report.pv_wind_connected);
        assert_eq!(ctl.diagnostics().events().len(), 1);
    }

    #[test]
    fn detects_reversed_orientation() {
        let mut ctl = recording();
        let inputs = StepInputs::with_connections(json!({
            "values": [["A"], ["A"]],
            "sources": [WIND_SOURCE, PV_SOURCE],
        }));
        assert!(ctl.advance(0, &inputs, 900).unwrap().pv_wind_connected);
        assert_eq!(ctl.diagnostics().events().len(), 1);
    }

    #[test]
    fn no_diagnostic_for_other_pairs() {
        let mut ctl = recording();
        let inputs = StepInputs::with_connections(json!({
            "values": [["A"], ["A"], ["C"]],
            "sources": [PV_SOURCE, "Battery-0", WIND_SOURCE],
        }));
        let report = ctl.advance(0, &inputs, 900).unwrap();
        assert_eq!(report.connections.len(), 1);
        assert!(!report.pv_wind_connected);
        assert!(ctl.diagnostics().events().is_empty());
    }

    #[test]
    fn missing_input_fails_without_mutation() {
        let mut ctl = recording();
        ctl.step(50, &empty_inputs(), 900).unwrap();

        let err = ctl.step(10, &StepInputs::new(), 900).unwrap_err();
        assert!(matches!(err, ControllerError::MissingInput { .. }));
        assert_eq!(ctl.states().file_index_load, 1);
        assert_eq!(ctl.current_time(), Some(50));
    }

    #[test]
    fn malformed_snapshot_fails_without_mutation() {
        let mut ctl = recording();
        let inputs = StepInputs::with_connections(json!({
            "values": [["A"], ["A"]],
            "sources": [PV_SOURCE],
        }));
        let err = ctl.step(100, &inputs, 900).unwrap_err();
        assert!(matches!(err, ControllerError::MalformedSnapshot { .. }));
        assert_eq!(ctl.states().file_index_load, 0);
        assert!(ctl.diagnostics().events().is_empty());

        let null = StepInputs::with_connections(Value::Null);
        assert!(ctl.step(100, &null, 900).is_err());
    }

    #[test]
    fn overflow_is_reported() {
        let mut ctl = recording();
        let err = ctl.step(u64::MAX, &empty_inputs(), 900).unwrap_err();
        assert!(matches!(err, ControllerError::TimeOverflow { .. }));
        assert_eq!(ctl.current_time(), None);
    }

    #[test]
    fn instances_do_not_share_state() {
        let mut a = recording();
        let b = recording();
        a.step(100, &empty_inputs(), 900).unwrap();
        assert_eq!(a.states().file_index_load, 1);
        assert_eq!(b.states().file_index_load, 0);
    }
}
