//! # Gait library.
//!
//! This library allows other crates in the workspace (and the `gait_exec` simulation) to access
//! the legged gait controller and its collaborators.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Foot anchors - per-leg home positions refreshed from the ground sampler
pub mod anchor;

/// Body control - calibrates the vertical position of the body from leg contact data
pub mod body_ctrl;

/// Debug drawing - optional observer of rest points and detection rays
pub mod debug_draw;

/// Gait control - the per-tick controller loop owning all leg state
pub mod gait_ctrl;

/// Gait scheduler - decides which phase group of legs may step
pub mod gait_sched;

/// Ground sampling - ray queries against the environment
pub mod ground;

/// Leg control - per-leg flight state machine and foot trajectories
pub mod leg_ctrl;

/// Localisation types - the pose of the body in the world frame
pub mod loc;

/// Executable parameters - the simulated environment and run configuration
pub mod params;
