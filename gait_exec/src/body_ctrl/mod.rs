//! # Body control module
//!
//! Keeps the body at a height consistent with the terrain beneath it and the stance of its legs.
//! Two candidate heights are computed each tick, one from a ray cast down from the body and one
//! from the midpoint of the leg rest heights. The higher candidate is the target and the body is
//! smoothed towards it rather than snapped.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;
