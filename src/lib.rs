//! Connectivity controller for discrete-event energy-system simulations.

pub mod config;
pub mod io;
/// Controller, connectivity inference, diagnostics and scenario replay.
pub mod sim;
