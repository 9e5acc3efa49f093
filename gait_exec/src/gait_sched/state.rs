//! Gait scheduler state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::{Unit, Vector3};
use serde::Serialize;

use super::PhaseGroups;
use crate::leg_ctrl::{Leg, StepOutcome, StepParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Index of the phase group whose turn it is to step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Turn(pub usize);

/// Alternates stepping between phase groups.
#[derive(Debug, Clone)]
pub struct GaitScheduler {
    groups: PhaseGroups,

    turn: Turn,

    /// True once the current group has been given a chance to step
    turn_opened: bool,
}

/// Result of a single scheduling tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScheduleReport {
    /// Group whose turn it is after this tick
    pub turn: usize,

    /// True if the turn passed to a new group on this tick
    pub turn_changed: bool,

    /// Number of legs which started a step on this tick
    pub num_started: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GaitScheduler {
    /// Create a new scheduler starting on the turn of group 0.
    pub fn new(groups: PhaseGroups) -> Self {
        Self {
            groups,
            turn: Turn::default(),
            turn_opened: false,
        }
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn groups(&self) -> &PhaseGroups {
        &self.groups
    }

    /// Returns true if no leg in the current group is in flight.
    pub fn group_settled(&self, legs: &[Leg]) -> bool {
        self.groups
            .group(self.turn.0)
            .iter()
            .filter_map(|&i| legs.get(i))
            .all(|leg| !leg.is_in_flight())
    }

    /// Pass the turn to the next group if the current group has had its turn and has settled.
    ///
    /// Returns true if the turn changed.
    pub fn check_advance(&mut self, legs: &[Leg]) -> bool {
        if !(self.turn_opened && self.group_settled(legs)) {
            return false;
        }

        self.turn = Turn((self.turn.0 + 1) % self.groups.num_groups());
        self.turn_opened = false;

        debug!("Gait turn passed to group {}", self.turn.0);

        true
    }

    /// Run one scheduling tick.
    ///
    /// The turn is checked first, then every leg of the current group is asked to step in
    /// ascending index order.
    pub fn step(
        &mut self,
        legs: &mut [Leg],
        params: &StepParams,
        up: &Unit<Vector3<f64>>,
    ) -> ScheduleReport {
        let turn_changed = self.check_advance(legs);

        let mut num_started = 0;
        for &i in self.groups.group(self.turn.0) {
            if let Some(leg) = legs.get_mut(i) {
                if let StepOutcome::Started { .. } = leg.try_step(params, up) {
                    num_started += 1;
                }
            }
        }

        self.turn_opened = true;

        ScheduleReport {
            turn: self.turn.0,
            turn_changed,
            num_started,
        }
    }
}
