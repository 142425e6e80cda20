/// Replay clock driven by controller-requested step times.
pub mod clock;
/// Adjacency inference over shared connector identifiers.
pub mod connectivity;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod replay;
pub mod types;
