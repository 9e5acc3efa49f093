//! Leg state and the step state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::{Point3, Unit, Vector3};
use serde::Serialize;

use super::{ShapingCurve, StepParams, TrajectorySpec, LANDING_PROGRESS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single leg of the body.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    /// Index of the leg in the controller's leg array
    pub index: usize,

    /// Where the foot should be, refreshed from ground sampling
    ///
    /// Frame: W
    pub rest_position_m: Point3<f64>,

    /// Where the foot currently is, the target given to the IK solver
    ///
    /// Frame: W
    pub foot_position_m: Point3<f64>,

    motion: MotionState,
}

/// An ongoing step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Flight {
    pub traj: TrajectorySpec,

    /// Units: seconds
    pub elapsed_s: f64,
}

/// Information about a step which has just finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub leg: usize,
    pub position_m: Point3<f64>,
    pub duration_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MotionState {
    /// The foot is planted
    Idle,

    /// The foot is moving along a trajectory
    InFlight(Flight),
}

/// Result of asking a leg to step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The leg is already stepping, nothing was changed
    AlreadyInFlight,

    /// The foot is within the threshold of its rest position, nothing was changed
    Settled,

    /// A new step has begun
    Started { duration_s: f64, distance_m: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MotionState {
    fn default() -> Self {
        MotionState::Idle
    }
}

impl Flight {
    /// Progress through the flight in [0, 1].
    pub fn progress(&self) -> f64 {
        self.traj.progress(self.elapsed_s)
    }
}

impl Leg {
    /// Create an idle leg with its foot at its rest position.
    pub fn new(index: usize, position_m: Point3<f64>) -> Self {
        Self {
            index,
            rest_position_m: position_m,
            foot_position_m: position_m,
            motion: MotionState::Idle,
        }
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.motion, MotionState::InFlight(_))
    }

    /// Flight progress in [0, 1], or `None` when the leg is idle.
    pub fn flight_progress(&self) -> Option<f64> {
        match self.motion {
            MotionState::InFlight(ref f) => Some(f.progress()),
            MotionState::Idle => None,
        }
    }

    /// Distance between the foot and its rest position.
    pub fn rest_distance_m(&self) -> f64 {
        nalgebra::distance(&self.foot_position_m, &self.rest_position_m)
    }

    /// Begin a step towards the rest position if the leg is idle and the foot is further than the
    /// step threshold from it.
    ///
    /// The trajectory end point is fixed when the step starts. Later changes to the rest position
    /// are picked up by the next step.
    pub fn try_step(&mut self, params: &StepParams, up: &Unit<Vector3<f64>>) -> StepOutcome {
        if self.is_in_flight() {
            return StepOutcome::AlreadyInFlight;
        }

        let distance_m = self.rest_distance_m();
        if distance_m <= params.threshold_m {
            return StepOutcome::Settled;
        }

        let traj = TrajectorySpec::plan(self.foot_position_m, self.rest_position_m, up, params);
        let duration_s = traj.duration_s;

        self.motion = MotionState::InFlight(Flight {
            traj,
            elapsed_s: 0.0,
        });

        debug!(
            "Leg {} stepping {:.3} m over {:.3} s",
            self.index, distance_m, duration_s
        );

        StepOutcome::Started {
            duration_s,
            distance_m,
        }
    }

    /// Advance the current flight by `dt_s` using the curves from the step parameters.
    pub fn advance(&mut self, dt_s: f64, params: &StepParams) -> Option<Landing> {
        self.advance_with(dt_s, &params.vertical_curve, &params.lift_curve)
    }

    /// Advance the current flight by `dt_s`, moving the foot along its trajectory.
    ///
    /// When the flight completes the foot is placed exactly on the trajectory end point, the leg
    /// becomes idle, and the landing is returned. Idle legs are not changed.
    pub fn advance_with<V, L>(&mut self, dt_s: f64, vertical: &V, lift: &L) -> Option<Landing>
    where
        V: ShapingCurve + ?Sized,
        L: ShapingCurve + ?Sized,
    {
        let flight = match self.motion {
            MotionState::InFlight(ref mut f) => f,
            MotionState::Idle => return None,
        };

        flight.elapsed_s += dt_s.max(0.0);
        let progress = flight.progress();

        if progress >= LANDING_PROGRESS {
            let landing = Landing {
                leg: self.index,
                position_m: flight.traj.end_m,
                duration_s: flight.elapsed_s,
            };

            self.foot_position_m = flight.traj.end_m;
            self.motion = MotionState::Idle;

            debug!("Leg {} landed at {}", self.index, landing.position_m);

            return Some(landing);
        }

        self.foot_position_m = flight.traj.position_at(progress, vertical, lift);

        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const DT: f64 = 1.0 / 64.0;

    fn leg_with_rest(rest_m: Point3<f64>) -> Leg {
        let mut leg = Leg::new(0, Point3::origin());
        leg.rest_position_m = rest_m;
        leg
    }

    #[test]
    fn test_threshold_gating() {
        let params = StepParams::default();
        let up = Vector3::y_axis();

        // Exactly at the threshold
        let mut leg = leg_with_rest(Point3::new(3.0, 0.0, 0.0));
        assert_eq!(leg.try_step(&params, &up), StepOutcome::Settled);
        assert_eq!(*leg.motion(), MotionState::Idle);

        // Just beyond
        let mut leg = leg_with_rest(Point3::new(3.0 + 1e-9, 0.0, 0.0));
        assert!(matches!(leg.try_step(&params, &up), StepOutcome::Started { .. }));
        assert!(leg.is_in_flight());
    }

    #[test]
    fn test_flight_completion() {
        let params = StepParams::default();
        let up = Vector3::y_axis();
        let end = Point3::new(3.0, 0.0, 4.0);

        let mut leg = leg_with_rest(end);
        assert_eq!(
            leg.try_step(&params, &up),
            StepOutcome::Started {
                duration_s: 1.25,
                distance_m: 5.0
            }
        );

        // 1.25 s is exactly 80 ticks
        let mut landing = None;
        let mut ticks = 0;
        while landing.is_none() {
            landing = leg.advance(DT, &params);
            ticks += 1;
            assert!(ticks <= 80);
        }

        assert_eq!(ticks, 80);
        assert_eq!(leg.foot_position_m, end);
        assert_eq!(*leg.motion(), MotionState::Idle);
        assert_eq!(landing.unwrap().position_m, end);
        assert!(leg.flight_progress().is_none());
    }

    #[test]
    fn test_uneven_ticks_land_exactly() {
        let params = StepParams::default();
        let up = Vector3::y_axis();
        let end = Point3::new(1.7, 0.3, -4.1);

        let mut leg = leg_with_rest(end);
        leg.try_step(&params, &up);

        let mut ticks = 0;
        while leg.advance(0.013, &params).is_none() {
            ticks += 1;
            assert!(ticks < 1000);
        }

        assert_eq!(leg.foot_position_m, end);
    }

    #[test]
    fn test_transitions() {
        let params = StepParams::default();
        let up = Vector3::y_axis();

        let mut leg = leg_with_rest(Point3::new(5.0, 0.0, 0.0));
        let mut was_in_flight = false;
        let mut num_flights = 0;
        let mut first_traj = None;

        for _ in 0..400 {
            let outcome = leg.try_step(&params, &up);

            // A leg in flight is never restarted
            if was_in_flight {
                assert_eq!(outcome, StepOutcome::AlreadyInFlight);
            }
            if let StepOutcome::Started { .. } = outcome {
                assert!(!was_in_flight);
                num_flights += 1;
            }

            if let MotionState::InFlight(f) = leg.motion() {
                match first_traj {
                    None => first_traj = Some(f.traj),
                    Some(t) => assert_eq!(t, f.traj),
                }
            }

            leg.advance(DT, &params);
            was_in_flight = leg.is_in_flight();
        }

        // Once landed the foot is on its rest position, so there is only one flight
        assert_eq!(num_flights, 1);
        assert_eq!(*leg.motion(), MotionState::Idle);
    }

    #[test]
    fn test_apex_and_continuity() {
        let params = StepParams::default();
        let up = Vector3::y_axis();

        let mut leg = leg_with_rest(Point3::new(5.0, 0.0, 0.0));
        leg.try_step(&params, &up);

        let mut prev = leg.foot_position_m;
        let mut max_jump = 0f64;
        let mut max_height = 0f64;

        for i in 1..=80 {
            leg.advance(DT, &params);
            max_jump = max_jump.max((leg.foot_position_m - prev).norm());
            max_height = max_height.max(leg.foot_position_m.y);
            prev = leg.foot_position_m;

            // Halfway through the foot is at the apex
            if i == 40 {
                assert_eq!(leg.flight_progress(), Some(0.5));
                assert!((leg.foot_position_m - Point3::new(2.5, 2.5, 0.0)).norm() < 1e-12);
            }
        }

        assert!(max_jump < 0.2);
        assert!((max_height - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_retargeting() {
        let params = StepParams::default();
        let up = Vector3::y_axis();
        let end = Point3::new(5.0, 0.0, 0.0);

        let mut leg = leg_with_rest(end);
        leg.try_step(&params, &up);
        for _ in 0..10 {
            leg.advance(DT, &params);
        }

        // Ground moved under the stepping leg
        leg.rest_position_m = Point3::new(-5.0, 1.0, 0.0);

        while leg.advance(DT, &params).is_none() {}
        assert_eq!(leg.foot_position_m, end);

        // The new rest position is picked up by the next step
        assert!(matches!(leg.try_step(&params, &up), StepOutcome::Started { .. }));
    }

    #[test]
    fn test_custom_curves() {
        let params = StepParams::default();
        let up = Vector3::y_axis();

        let mut leg = leg_with_rest(Point3::new(4.0, 4.0, 0.0));
        leg.try_step(&params, &up);

        // Flat lift, stepped vertical
        let vertical = |p: f64| if p < 0.5 { 0.0 } else { 1.0 };
        let no_lift = |_: f64| 0.0;

        let mut heights = Vec::new();
        while leg.advance_with(0.1, &vertical, &no_lift).is_none() {
            heights.push(leg.foot_position_m.y);
        }

        assert!(heights.iter().all(|&h| h == 0.0 || h == 4.0));
        assert_eq!(leg.foot_position_m, Point3::new(4.0, 4.0, 0.0));
    }

    #[test]
    fn test_idle_advance() {
        let params = StepParams::default();
        let mut leg = leg_with_rest(Point3::new(10.0, 0.0, 0.0));
        assert!(leg.advance(DT, &params).is_none());
        assert_eq!(leg.foot_position_m, Point3::origin());
    }
}
