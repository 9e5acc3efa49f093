//! # Gait Executable Parameters
//!
//! This module provides parameters for the gait simulation executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::ground::TerrainParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaitExecParams {
    /// Target period of one cycle, also the tick duration given to GaitCtrl.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// How long to walk for.
    ///
    /// Units: seconds
    pub duration_s: f64,

    /// If true cycles are paced to the wall clock, otherwise the simulation runs as fast as
    /// possible.
    #[serde(default = "default_realtime")]
    pub realtime: bool,

    /// Number of host frames per cycle. Leg rest positions are refreshed every frame, with the
    /// first frame straight after the tick.
    #[serde(default = "default_frames_per_cycle")]
    pub frames_per_cycle: u32,

    /// If true detection rays and rest points are archived.
    #[serde(default)]
    pub debug_draw: bool,

    /// Forward (+X) speed of the body.
    ///
    /// Units: meters/second
    pub walk_speed_ms: f64,

    /// Starting (x, z) position of the body.
    ///
    /// Units: meters,
    /// Frame: W
    pub body_start_xz_m: [f64; 2],

    /// Starting height of the body above the terrain.
    ///
    /// Units: meters
    pub body_height_m: f64,

    /// Radius of the sphere standing in for the body's own geometry.
    ///
    /// Units: meters
    pub body_radius_m: f64,

    /// The terrain to walk over
    pub terrain: TerrainParams,
}

fn default_realtime() -> bool {
    true
}

fn default_frames_per_cycle() -> u32 {
    1
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gait_ctrl;
    use std::path::PathBuf;

    fn params_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../params")
    }

    #[test]
    fn test_shipped_params() {
        let exec: GaitExecParams = util::params::load_from_path(params_dir().join("gait_sim.toml")).unwrap();
        assert!(exec.cycle_period_s > 0.0);
        assert!(exec.frames_per_cycle >= 1);

        let ctrl: gait_ctrl::Params =
            util::params::load_from_path(params_dir().join("gait_ctrl.toml")).unwrap();
        assert!(ctrl.validate().is_ok());
        assert_eq!(ctrl.legs.len(), 4);
    }

    #[test]
    fn test_frames_default() {
        let exec: GaitExecParams = util::params::from_str(
            r#"
            cycle_period_s = 0.02
            duration_s = 1.0
            walk_speed_ms = 1.0
            body_start_xz_m = [0.0, 0.0]
            body_height_m = 1.0
            body_radius_m = 0.5

            [terrain]
            cell_size_m = [0.5, 0.5]
            num_cells = [11, 11]
            centre_m = [0.0, 0.0]
            perlin_scale = [0.1, 0.1]
            perlin_seed = 1
            amplitude_m = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(exec.frames_per_cycle, 1);
        assert!(exec.realtime);
        assert!(!exec.debug_draw);
    }
}
