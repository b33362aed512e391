//! Baize domain types.
//!
//! Defines the chip-economy data model, the outbound domain events, and the
//! persisted session snapshot shared by the engine and its collaborators
//! (presentation, telemetry, storage).

mod chips;
mod constants;
mod events;
mod snapshot;

pub use chips::*;
pub use constants::*;
pub use events::*;
pub use snapshot::*;
