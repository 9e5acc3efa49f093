//! Gait simulation executable entry point.
//!
//! # Architecture
//!
//! The executable walks a simulated body over procedurally generated terrain:
//!
//!     - Initialise the session, logger and parameters
//!     - Build the terrain and the body's own collider
//!     - Initialise GaitCtrl
//!     - Main loop:
//!         - Move the body forward and update its collider
//!         - GaitCtrl processing
//!         - Write foot targets to the IK sink
//!         - Write archives
//!         - Frame updates of the leg rest positions
//!         - Cycle management
//!
//! A single command line argument overrides the run duration in seconds.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use gait_lib::{
    debug_draw::ArchiveDebugDraw,
    gait_ctrl::{self, GaitCtrl, IkTargetSink, InitData, InputData},
    ground::{Collider, Scene, Sphere, TerrainMap},
    loc::Pose,
    params::GaitExecParams,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, trace, warn};
use nalgebra::{Point3, Vector2};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period between status summaries in the log.
const STATUS_PERIOD_S: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// IK sink which logs the targets it receives.
#[derive(Default)]
struct LoggingIkSink {
    targets: Vec<Point3<f64>>,
}

impl IkTargetSink for LoggingIkSink {
    fn set_target(&mut self, leg: usize, target_m: &Point3<f64>) {
        trace!("IK target {}: {}", leg, target_m);
        self.targets.set_target(leg, target_m);
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("gait_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Legged Gait Simulation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: GaitExecParams =
        util::params::load("gait_sim.toml").wrap_err("Could not load exec params")?;
    let ctrl_params: gait_ctrl::Params =
        util::params::load("gait_ctrl.toml").wrap_err("Could not load GaitCtrl params")?;

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the duration
    let duration_s = match args.len() {
        1 => exec_params.duration_s,
        2 => args[1]
            .parse::<f64>()
            .wrap_err_with(|| format!("Invalid duration \"{}\"", args[1]))?,
        _ => return Err(eyre!("Expected at most one argument (the run duration in seconds)")),
    };

    if !(exec_params.cycle_period_s > 0.0) {
        return Err(eyre!(
            "The cycle period must be positive, got {}",
            exec_params.cycle_period_s
        ));
    }

    info!("Exec parameters loaded");

    // ---- BUILD THE ENVIRONMENT ----

    let terrain = TerrainMap::generate_random(&exec_params.terrain)
        .wrap_err("Could not generate the terrain")?;
    let height_range = terrain.range();

    info!(
        "Terrain generated, heights between {:.3} m and {:.3} m",
        height_range.start, height_range.end
    );

    let [start_x, start_z] = exec_params.body_start_xz_m;
    let ground_m = terrain
        .height_at(start_x, start_z)
        .ok_or_else(|| eyre!("The body starts outside the terrain"))?;
    let body_pose = Pose::from_position(start_x, ground_m + exec_params.body_height_m, start_z);

    let mut scene = Scene::new();
    scene.add(Collider::Terrain(terrain));
    let body_collider = scene.add(Collider::Sphere(Sphere::body(
        body_pose.position(),
        exec_params.body_radius_m,
    )));

    // ---- INITIALISE GAIT CONTROL ----

    let mut gait_ctrl = GaitCtrl::new(scene);
    if exec_params.debug_draw {
        gait_ctrl = gait_ctrl.with_debug_draw(Box::new(
            ArchiveDebugDraw::new(&session).wrap_err("Failed to open the debug draw archive")?,
        ));
    }

    gait_ctrl
        .init(
            InitData {
                params: ctrl_params,
                body_pose,
            },
            &session,
        )
        .wrap_err("Failed to initialise GaitCtrl")?;

    info!("GaitCtrl init complete");

    let mut ik_sink = LoggingIkSink::default();

    // ---- MAIN LOOP ----

    let num_cycles = (duration_s / exec_params.cycle_period_s).ceil() as u64;
    let status_every = ((STATUS_PERIOD_S / exec_params.cycle_period_s).round() as u64).max(1);
    let num_frames = exec_params.frames_per_cycle.max(1);
    let frame_period = Duration::from_secs_f64(exec_params.cycle_period_s / num_frames as f64);
    let mut num_consec_cycle_overruns: u64 = 0;
    let mut body_xz = Vector2::new(start_x, start_z);

    info!("Beginning main loop, {} cycles\n", num_cycles);

    for cycle in 0..num_cycles {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- BODY MOTION ----

        body_xz.x += exec_params.walk_speed_ms * exec_params.cycle_period_s;

        // Keep the body's collider with the body
        if let Some(body) = gait_ctrl.body().map(|b| b.pose.position()) {
            if let Some(Collider::Sphere(s)) = gait_ctrl.sampler_mut().get_mut(body_collider) {
                s.centre_m = Point3::new(body_xz.x, body.y, body_xz.y);
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        let input = InputData {
            dt_s: exec_params.cycle_period_s,
            body_position_xz: Some(body_xz),
            body_attitude: None,
        };

        match gait_ctrl.proc(&input) {
            Ok((output, report)) => {
                output.write_targets(&mut ik_sink);

                if cycle % status_every == 0 {
                    info!(
                        "t = {:.2} s: body at {}, turn {}, {} legs in flight, {} ground misses",
                        cycle as f64 * exec_params.cycle_period_s,
                        output.body_position_m,
                        report.turn,
                        report.num_in_flight,
                        report.anchors.num_misses
                    );
                }
            }
            Err(e) => warn!("Error during GaitCtrl processing: {}", e),
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = gait_ctrl.write() {
            warn!("Could not write GaitCtrl archives: {}", e);
        }

        // ---- FRAME UPDATES ----

        for frame in 0..num_frames {
            if frame > 0 && exec_params.realtime {
                if let Some(d) = (frame_period * frame).checked_sub(cycle_start_instant.elapsed()) {
                    thread::sleep(d);
                }
            }

            if let Some(report) = gait_ctrl.frame_update() {
                trace!("Frame {}: {} ground misses", frame, report.num_misses);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        if !exec_params.realtime {
            continue;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(exec_params.cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive)",
                    cycle_dur.as_secs_f64() - exec_params.cycle_period_s,
                    num_consec_cycle_overruns
                );
            }
        }
    }

    // ---- SHUTDOWN ----

    if let Some(body) = gait_ctrl.body() {
        info!("Walk complete, body finished at {}", body.pose.position());
    }
    for (leg, target) in ik_sink.targets.iter().enumerate() {
        debug!("Final foot target {}: {}", leg, target);
    }

    session.exit();

    Ok(())
}
