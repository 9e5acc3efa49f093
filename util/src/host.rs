//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the root of the software
/// workspace (the directory containing `params/`).
pub const SW_ROOT_ENV_VAR: &str = "GAIT_SW_ROOT";

/// Get the root directory of the software workspace.
///
/// Returns the `GAIT_SW_ROOT` value, or an error if it isn't set.
pub fn get_gait_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
