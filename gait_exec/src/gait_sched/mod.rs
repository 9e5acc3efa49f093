//! # Gait scheduler module
//!
//! Legs are partitioned into phase groups which take turns to step. While any leg of the current
//! group is in flight the turn is held. Once every leg of the group is idle the turn passes to the
//! next group, which then starts all of its eligible legs in the same tick. The cycle repeats for
//! the lifetime of the body, so legs from different groups are never airborne together.
//!
//! The scheduler holds no suspended context between ticks. The wait for a group to settle is the
//! persisted [`Turn`] plus a settled check made once per tick by [`GaitScheduler::step`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod groups;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use groups::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when building phase groups.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GroupingError {
    #[error("At least 2 phase groups are required, got {0}")]
    TooFewGroups(usize),

    #[error("{num_legs} legs cannot be split into {num_groups} phase groups")]
    TooFewLegs { num_legs: usize, num_groups: usize },

    #[error("Leg {leg} is out of range, there are {num_legs} legs")]
    LegOutOfRange { leg: usize, num_legs: usize },

    #[error("Leg {0} appears in more than one phase group")]
    DuplicateLeg(usize),

    #[error("Leg {0} is not in any phase group")]
    MissingLeg(usize),

    #[error("Phase group {0} is empty")]
    EmptyGroup(usize),
}
