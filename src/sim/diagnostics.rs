//! Injected diagnostics for controller steps.
//!
//! The controller never prints. It hands each [`Diagnostic`] to a
//! [`DiagnosticSink`], which decides where the message goes.

use std::fmt;

/// Informational event raised during a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The PV and wind models share a connector.
    PvWindConnected { pv: String, wind: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PvWindConnected { pv, wind } => {
                write!(f, "PV and Wind connected ({pv} <-> {wind})")
            }
        }
    }
}

/// Receiver for step diagnostics.
///
/// `emit` cannot fail: a sink that hits an error drops the message so the
/// step still completes.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to the `tracing` subscriber at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        tracing::info!(target: "connectivity_ctl::diagnostics", "{diagnostic}");
    }
}

/// Keeps every emitted diagnostic in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingDiagnostics {
    events: Vec<Diagnostic>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.events)
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.events.push(diagnostic.clone());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        (**self).emit(diagnostic);
    }
}
