//! # Leg control module
//!
//! Each leg is either planted (`Idle`) or stepping (`InFlight`). A step is only started through
//! [`Leg::try_step`] and only ends inside [`Leg::advance`], so the only transitions a leg can make
//! are Idle -> InFlight -> Idle. The flight state is owned by the leg itself and is polled once
//! per tick rather than completed by an external callback.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod curve;
mod leg;
mod params;
mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use curve::*;
pub use leg::*;
pub use params::*;
pub use trajectory::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Flight progress at or above which a leg is considered landed.
pub const LANDING_PROGRESS: f64 = 1.0 - 1e-9;
