//! # Gait control module
//!
//! The controller owns every leg and runs one fixed tick per call to `proc`. Within a tick the
//! stages always run in the same order, as each reads state written by the one before it:
//!
//! 1. Refresh leg rest positions from the ground below their anchors
//! 2. Schedule steps for the phase group whose turn it is
//! 3. Advance in-flight legs along their trajectories
//! 4. Calibrate the body height
//!
//! Foot positions are then written out to the IK solver. Nothing is read back from it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod ik;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use ik::*;
pub use params::*;
pub use state::*;

use crate::gait_sched::GroupingError;
use util::archive::ArchiveError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while initialising GaitCtrl.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Invalid gait control parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid phase grouping: {0}")]
    Grouping(#[from] GroupingError),

    #[error("Cannot open the gait control archives: {0}")]
    ArchiveError(#[from] ArchiveError),
}

/// Errors which can occur during GaitCtrl processing.
#[derive(Debug, thiserror::Error)]
pub enum GaitCtrlError {
    #[error("GaitCtrl must be initialised before it is processed")]
    NotInitialised,

    #[error("The tick duration must be finite and not negative, got {0}")]
    InvalidTimestep(f64),
}
