//! Foot trajectories

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point3, Unit, Vector3};
use serde::Serialize;

use super::{ShapingCurve, StepParams};
use util::maths::lerp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The planned path of a single step.
///
/// Horizontal components are interpolated linearly in flight progress and the vertical component
/// follows the vertical shaping curve. On top of that the foot is lifted towards `apex_m` by the
/// lift curve.
///
/// The lift is along the body's up direction at the time the step was planned. On a tilted body
/// the foot therefore swings sideways as well as up mid-flight, so only the take-off and landing
/// points lie on the straight horizontal path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectorySpec {
    /// Foot position when the step started
    ///
    /// Frame: W
    pub start_m: Point3<f64>,

    /// Rest position at the time the step started
    ///
    /// Frame: W
    pub end_m: Point3<f64>,

    /// Highest point of the step, raised above the midpoint by half the step distance along the
    /// leg's up direction
    ///
    /// Frame: W
    pub apex_m: Point3<f64>,

    /// Units: seconds
    pub duration_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectorySpec {
    /// Plan a step from `start_m` to `end_m`.
    pub fn plan(
        start_m: Point3<f64>,
        end_m: Point3<f64>,
        up: &Unit<Vector3<f64>>,
        params: &StepParams,
    ) -> Self {
        let distance_m = nalgebra::distance(&start_m, &end_m);
        let apex_m = nalgebra::center(&start_m, &end_m) + up.into_inner() * (distance_m / 2.0);
        let duration_s = (distance_m / params.move_speed_ms).max(params.min_step_duration_s);

        Self {
            start_m,
            end_m,
            apex_m,
            duration_s,
        }
    }

    /// Straight line distance between start and end.
    pub fn distance_m(&self) -> f64 {
        nalgebra::distance(&self.start_m, &self.end_m)
    }

    /// Flight progress after `elapsed_s`, in [0, 1].
    pub fn progress(&self, elapsed_s: f64) -> f64 {
        if self.duration_s > 0.0 {
            (elapsed_s / self.duration_s).max(0.0).min(1.0)
        } else {
            1.0
        }
    }

    /// Position of the foot at the given progress.
    pub fn position_at<V, L>(&self, progress: f64, vertical: &V, lift: &L) -> Point3<f64>
    where
        V: ShapingCurve + ?Sized,
        L: ShapingCurve + ?Sized,
    {
        let mut pos_m = Point3::from(self.start_m.coords.lerp(&self.end_m.coords, progress));
        pos_m.y = lerp(self.start_m.y, self.end_m.y, vertical.eval(progress));

        let raise_m = self.apex_m - nalgebra::center(&self.start_m, &self.end_m);

        pos_m + raise_m * lift.eval(progress)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_plan() {
        let params = StepParams::default();
        let traj = TrajectorySpec::plan(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
            &Vector3::y_axis(),
            &params,
        );

        assert_eq!(traj.distance_m(), 5.0);
        assert_eq!(traj.apex_m, Point3::new(1.5, 4.5, 0.0));
        assert_eq!(traj.duration_s, 1.25);

        // Clamped to the minimum duration
        let params = StepParams {
            move_speed_ms: 100.0,
            min_step_duration_s: 0.5,
            ..StepParams::default()
        };
        let traj = TrajectorySpec::plan(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            &Vector3::y_axis(),
            &params,
        );
        assert_eq!(traj.duration_s, 0.5);
    }

    #[test]
    fn test_position_at() {
        let params = StepParams::default();
        let traj = TrajectorySpec::plan(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 2.0, 0.0),
            &Vector3::y_axis(),
            &params,
        );
        let vertical = &params.vertical_curve;
        let lift = &params.lift_curve;

        assert_eq!(traj.position_at(0.0, vertical, lift), traj.start_m);
        assert_eq!(traj.position_at(1.0, vertical, lift), traj.end_m);
        assert!((traj.position_at(0.5, vertical, lift) - traj.apex_m).norm() < 1e-12);

        // The vertical curve only affects the height
        let ease_in = |p: f64| p * p;
        let pos = traj.position_at(0.5, &ease_in, lift);
        assert_eq!(pos.x, 2.0);
        assert!((pos.y - (0.5 + traj.apex_m.y - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_tilted_lift() {
        let params = StepParams::default();
        let up = Unit::new_normalize(Vector3::new(0.0, 1.0, 1.0));
        let traj = TrajectorySpec::plan(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            &up,
            &params,
        );
        let vertical = &params.vertical_curve;
        let lift = &params.lift_curve;

        // Lift follows the tilted up direction
        let mid = traj.position_at(0.5, vertical, lift);
        assert!((mid - Point3::new(1.0, 0.5f64.sqrt(), 0.5f64.sqrt())).norm() < 1e-12);

        // Take-off and landing stay on the planned points
        assert_eq!(traj.position_at(0.0, vertical, lift), traj.start_m);
        assert_eq!(traj.position_at(1.0, vertical, lift), traj.end_m);
    }

    #[test]
    fn test_zero_duration() {
        let traj = TrajectorySpec {
            start_m: Point3::origin(),
            end_m: Point3::new(1.0, 0.0, 0.0),
            apex_m: Point3::new(0.5, 0.5, 0.0),
            duration_s: 0.0,
        };
        assert_eq!(traj.progress(0.0), 1.0);
    }
}
