//! Implementations for the GaitCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use nalgebra::{Point3, UnitQuaternion, Vector2};
use serde::Serialize;

// Internal
use super::{GaitCtrlError, IkTargetSink, InitError, Params};
use crate::{
    anchor::{AnchorReport, FootAnchorSet},
    body_ctrl::{BodyFrame, BodyHeightCalibrator, HeightReport},
    debug_draw::{DebugDraw, NoDebugDraw},
    gait_sched::{GaitScheduler, GroupingError, PhaseGroups, Turn},
    ground::GroundSampler,
    leg_ctrl::{Leg, MotionState},
    loc::Pose,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gait control module state
pub struct GaitCtrl<S> {
    params: Params,

    /// Environment the legs walk on
    sampler: S,

    anchors: FootAnchorSet,
    legs: Vec<Leg>,

    /// The body, `None` until initialised
    body: Option<BodyFrame>,

    /// The scheduler, `None` when there are too few legs to form a gait
    sched: Option<GaitScheduler>,

    calib: BodyHeightCalibrator,

    debug: Box<dyn DebugDraw>,

    num_ticks: u64,

    report: StatusReport,

    arch_legs: Archiver,
    arch_body: Archiver,
}

/// Data needed to initialise GaitCtrl.
#[derive(Debug, Clone)]
pub struct InitData {
    pub params: Params,

    /// Initial pose of the body. Legs start with their feet on their anchors.
    pub body_pose: Pose,
}

/// Input data to GaitCtrl.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Duration of the tick.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// New horizontal position of the body, (x, z) in the W frame, or `None` to keep it.
    ///
    /// The vertical position of the body is owned by GaitCtrl.
    pub body_position_xz: Option<Vector2<f64>>,

    /// New attitude of the body, or `None` to keep it.
    pub body_attitude: Option<UnitQuaternion<f64>>,
}

/// Output of GaitCtrl for a single tick.
#[derive(Debug, Clone)]
pub struct OutputData {
    /// Foot position of each leg, the IK target.
    ///
    /// Frame: W
    pub foot_targets_m: Vec<Point3<f64>>,

    /// Position of the body after calibration.
    ///
    /// Frame: W
    pub body_position_m: Point3<f64>,
}

/// Status report for GaitCtrl processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// True if the controller has too few legs to walk and is doing nothing
    pub inert: bool,

    pub turn: usize,
    pub turn_changed: bool,

    pub num_in_flight: usize,
    pub num_started: usize,
    pub num_landed: usize,

    pub anchors: AnchorReport,
    pub height: HeightReport,
}

/// Row of the per-leg archive.
#[derive(Serialize)]
struct LegRecord {
    time_s: f64,
    tick: u64,
    leg: usize,
    in_flight: bool,
    progress: Option<f64>,
    foot_x_m: f64,
    foot_y_m: f64,
    foot_z_m: f64,
    rest_x_m: f64,
    rest_y_m: f64,
    rest_z_m: f64,
}

/// Row of the body archive.
#[derive(Serialize)]
struct BodyRecord {
    time_s: f64,
    tick: u64,
    turn: usize,
    x_m: f64,
    y_m: f64,
    z_m: f64,
    candidate_a_m: f64,
    ground_hit: bool,
    candidate_b_m: f64,
    target_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S: GroundSampler> GaitCtrl<S> {
    /// Create an uninitialised controller walking on `sampler`.
    pub fn new(sampler: S) -> Self {
        Self {
            params: Params::default(),
            sampler,
            anchors: FootAnchorSet::default(),
            legs: Vec::new(),
            body: None,
            sched: None,
            calib: BodyHeightCalibrator::default(),
            debug: Box::new(NoDebugDraw),
            num_ticks: 0,
            report: StatusReport::default(),
            arch_legs: Archiver::default(),
            arch_body: Archiver::default(),
        }
    }

    /// Send rest points and detection rays to the given sink.
    pub fn with_debug_draw(mut self, debug: Box<dyn DebugDraw>) -> Self {
        self.debug = debug;
        self
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn body(&self) -> Option<&BodyFrame> {
        self.body.as_ref()
    }

    /// Group whose turn it is, `None` if the controller is inert or uninitialised.
    pub fn turn(&self) -> Option<Turn> {
        self.sched.as_ref().map(|s| s.turn())
    }

    /// Returns true if the controller has been initialised without enough legs to walk.
    pub fn is_inert(&self) -> bool {
        self.body.is_some() && self.sched.is_none()
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Mutable access to the environment, for example to move the body's own colliders.
    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    /// Refresh the leg rest positions between ticks.
    ///
    /// Intended to be called at the host's frame rate, which may differ from the tick rate.
    /// Returns `None` if the controller is uninitialised or inert.
    pub fn frame_update(&mut self) -> Option<AnchorReport> {
        if self.sched.is_none() {
            return None;
        }
        let body = self.body.as_ref()?;

        Some(self.anchors.refresh(
            &mut self.legs,
            body,
            &self.sampler,
            &self.params.sensing,
            self.debug.as_mut(),
        ))
    }

    fn output(&self, body: &BodyFrame) -> OutputData {
        OutputData {
            foot_targets_m: self.legs.iter().map(|l| l.foot_position_m).collect(),
            body_position_m: body.pose.position(),
        }
    }
}

impl<S: GroundSampler> State for GaitCtrl<S> {
    type InitData = InitData;
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = GaitCtrlError;

    /// Initialise the GaitCtrl module.
    ///
    /// A leg count too small for the configured phase grouping is not an error. It is reported
    /// once and the controller stays inert.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let InitData { params, body_pose } = init_data;

        params.validate()?;

        // Feet start on their anchors
        let anchors = FootAnchorSet::new(params.anchors_m_rb());
        let legs: Vec<Leg> = (0..anchors.len())
            .filter_map(|i| anchors.anchor_m_rb(i).map(|a| Leg::new(i, body_pose.to_world(a))))
            .collect();

        let body = match legs.get(params.body.reference_leg) {
            Some(leg) => BodyFrame::new(body_pose, &leg.rest_position_m),
            None => BodyFrame {
                pose: body_pose,
                height_offset_m: 0.0,
            },
        };

        self.sched = match PhaseGroups::new(&params.grouping, legs.len()) {
            Ok(groups) => Some(GaitScheduler::new(groups)),
            Err(GroupingError::TooFewLegs {
                num_legs,
                num_groups,
            }) => {
                warn!(
                    "GaitCtrl has {} legs, too few for {} phase groups. No steps will be taken.",
                    num_legs, num_groups
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        if params.archive {
            self.arch_legs = Archiver::from_path(session, "gait_ctrl/leg_states.csv")?;
            self.arch_body = Archiver::from_path(session, "gait_ctrl/body_height.csv")?;
        }

        info!(
            "GaitCtrl initialised with {} legs, body height offset {:.3} m",
            legs.len(),
            body.height_offset_m
        );

        self.calib = BodyHeightCalibrator::new(params.body.clone());
        self.params = params;
        self.anchors = anchors;
        self.legs = legs;
        self.body = Some(body);
        self.num_ticks = 0;
        self.report = StatusReport::default();

        Ok(())
    }

    /// Perform one fixed tick of gait control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let mut body = self.body.ok_or(GaitCtrlError::NotInitialised)?;

        if !(input_data.dt_s.is_finite() && input_data.dt_s >= 0.0) {
            return Err(GaitCtrlError::InvalidTimestep(input_data.dt_s));
        }

        self.num_ticks += 1;
        self.report = StatusReport::default();

        // Inert, nothing moves
        let sched = match self.sched {
            Some(ref mut s) => s,
            None => {
                self.report.inert = true;
                return Ok((self.output(&body), self.report));
            }
        };

        // Apply host motion
        if let Some(xz) = input_data.body_position_xz {
            body.pose.position_m_w.x = xz.x;
            body.pose.position_m_w.z = xz.y;
        }
        if let Some(att) = input_data.body_attitude {
            body.pose.attitude_q_w = att;
        }

        // 1. Ground sampling
        self.report.anchors = self.anchors.refresh(
            &mut self.legs,
            &body,
            &self.sampler,
            &self.params.sensing,
            self.debug.as_mut(),
        );

        // 2. Scheduling
        let sched_report = sched.step(&mut self.legs, &self.params.step, &body.up());
        self.report.turn = sched_report.turn;
        self.report.turn_changed = sched_report.turn_changed;
        self.report.num_started = sched_report.num_started;

        // 3. Flights
        for leg in self.legs.iter_mut() {
            if leg.advance(input_data.dt_s, &self.params.step).is_some() {
                self.report.num_landed += 1;
            }
        }
        self.report.num_in_flight = self.legs.iter().filter(|l| l.is_in_flight()).count();

        // 4. Body height
        self.report.height = self.calib.calibrate(
            &mut body,
            &self.legs,
            &self.sampler,
            self.params.sensing.detection_distance_m,
        );

        self.body = Some(body);

        let output = self.output(&body);

        trace!(
            "GaitCtrl tick {}: turn {}, {} in flight, body at {}",
            self.num_ticks,
            self.report.turn,
            self.report.num_in_flight,
            output.body_position_m
        );

        Ok((output, self.report))
    }
}

impl<S> Archived for GaitCtrl<S> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let time_s = session::get_elapsed_seconds();

        if self.arch_legs.is_open() {
            for leg in self.legs.iter() {
                let progress = match leg.motion() {
                    MotionState::InFlight(f) => Some(f.progress()),
                    MotionState::Idle => None,
                };

                self.arch_legs.serialise(LegRecord {
                    time_s,
                    tick: self.num_ticks,
                    leg: leg.index,
                    in_flight: progress.is_some(),
                    progress,
                    foot_x_m: leg.foot_position_m.x,
                    foot_y_m: leg.foot_position_m.y,
                    foot_z_m: leg.foot_position_m.z,
                    rest_x_m: leg.rest_position_m.x,
                    rest_y_m: leg.rest_position_m.y,
                    rest_z_m: leg.rest_position_m.z,
                })?;
            }
        }

        if let (true, Some(body)) = (self.arch_body.is_open(), self.body) {
            let pos = body.pose.position_m_w;
            let height = self.report.height;

            self.arch_body.serialise(BodyRecord {
                time_s,
                tick: self.num_ticks,
                turn: self.report.turn,
                x_m: pos.x,
                y_m: pos.y,
                z_m: pos.z,
                candidate_a_m: height.candidate_a_m,
                ground_hit: height.ground_hit,
                candidate_b_m: height.candidate_b_m,
                target_m: height.target_m,
            })?;
        }

        Ok(())
    }
}

impl OutputData {
    /// Write the foot targets to an IK solver.
    pub fn write_targets(&self, sink: &mut dyn IkTargetSink) {
        for (leg, target_m) in self.foot_targets_m.iter().enumerate() {
            sink.set_target(leg, target_m);
        }
    }
}
