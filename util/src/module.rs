//! Fixed-tick module interface
//!
//! Controllers driven by the executable's cycle (currently `GaitCtrl`) are set up once from
//! parameters and then stepped with a fixed timestep. Anything varying between ticks, such as the
//! body pose set by the host, travels through `InputData`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A controller stepped once per fixed tick.
pub trait State {
    /// Parameters and initial conditions
    type InitData;
    type InitError;

    /// Per-tick commands from the host
    type InputData;
    /// Per-tick results, e.g. IK targets
    type OutputData;
    /// Counters and intermediate values for the tick, for logging and archives
    type StatusReport;
    type ProcError;

    /// Set up the controller, opening any archives inside `session`.
    ///
    /// May be called again to restart the controller from new initial conditions.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Advance the controller by one tick.
    ///
    /// Calling this before a successful `init` is an error.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
