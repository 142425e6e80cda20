//! Scripted replay of a scenario through the connectivity controller.
//!
//! Stands in for a host during CLI runs and tests: it walks the scenario's
//! time window, hands the active snapshot to the controller through the same
//! JSON input boundary a host would use, and records each step.

use tracing::{debug, info};

use crate::config::{ScenarioConfig, SimulationConfig, SnapshotConfig};

use super::clock::Clock;
use super::controller::ConnectivityController;
use super::diagnostics::{DiagnosticSink, TracingDiagnostics};
use super::error::ReplayError;
use super::types::{StepInputs, StepRecord};

/// Drives one controller across a scenario's time window.
pub struct Replay<D: DiagnosticSink = TracingDiagnostics> {
    simulation: SimulationConfig,
    snapshots: Vec<SnapshotConfig>,
    controller: ConnectivityController<D>,
}

impl Replay {
    /// Builds a replay whose diagnostics go to `tracing`.
    pub fn new(config: &ScenarioConfig) -> Self {
        Self::with_diagnostics(config, TracingDiagnostics)
    }
}

impl<D: DiagnosticSink> Replay<D> {
    /// Builds a replay over `config`, ordering its snapshots by `from`.
    pub fn with_diagnostics(config: &ScenarioConfig, diagnostics: D) -> Self {
        let mut snapshots = config.snapshots.clone();
        snapshots.sort_by_key(|s| s.from);
        Self {
            simulation: config.simulation.clone(),
            snapshots,
            controller: ConnectivityController::new(config.controller.to_params(), diagnostics),
        }
    }

    pub fn controller(&self) -> &ConnectivityController<D> {
        &self.controller
    }

    /// Snapshot in effect at `time`: the last one whose `from` is not after it.
    pub fn snapshot_at(&self, time: u64) -> Option<&SnapshotConfig> {
        self.snapshots.iter().rev().find(|s| s.from <= time)
    }

    /// Host inputs for `time`. Empty when no snapshot is in effect yet.
    fn inputs_at(&self, time: u64) -> Result<StepInputs, ReplayError> {
        match self.snapshot_at(time) {
            Some(snapshot) => Ok(StepInputs::with_connections(serde_json::to_value(snapshot)?)),
            None => Ok(StepInputs::new()),
        }
    }

    /// Steps the controller from `start` until `end`.
    ///
    /// # Errors
    ///
    /// Stops at the first failed step and returns a `ReplayError`.
    pub fn run(&mut self) -> Result<Vec<StepRecord>, ReplayError> {
        let SimulationConfig {
            start,
            end,
            max_advance,
        } = self.simulation;
        info!(start, end, "replaying scenario");

        let mut clock = Clock::new(start, end);
        let mut records = Vec::new();
        while let Some(time) = clock.now() {
            let inputs = self.inputs_at(time)?;
            let report = self
                .controller
                .advance(time, &inputs, max_advance)
                .map_err(|source| ReplayError::Step { time, source })?;
            debug!(time, pairs = report.connections.len(), "step done");

            let next = report.next_time;
            records.push(StepRecord::from(&report));
            if !clock.advance_to(next) {
                return Err(ReplayError::Stalled { time, next });
            }
        }

        info!(steps = records.len(), "replay finished");
        Ok(records)
    }
}
