//! Discrete-time controller family: Tustin PID/PD with matched reference
//! pre-filters, and a stateless proportional+feedforward variant.
//!
//! Design state (gains, bounds, offset) and runtime state (error/command
//! history) are kept separate: gains are plain values recomputed by the gain
//! scheduler every tick and pushed in through `update_constants`, while each
//! controller owns only its own history.

mod filter;
mod pd;
mod pf;
mod pid;

pub use filter::{PdFilter, PidFilter};
pub use pd::{PdController, PdGains};
pub use pf::PfController;
pub use pid::{PidController, PidGains};

use crate::ConfigError;

// ---------------------------------------------------------------------------
// Controller + matched pre-filter bundles
// ---------------------------------------------------------------------------

/// PID controller with its matched reference pre-filter.
///
/// `control` filters the reference first, then runs the PID on the filtered
/// value, so the closed loop keeps the pole placement of the raw PID without
/// its reference-derivative kick.
#[derive(Debug, Clone)]
pub struct FilteredPid {
    filter: PidFilter,
    pid: PidController,
}

impl FilteredPid {
    pub fn new(sample_time: f64, gains: PidGains) -> Result<Self, ConfigError> {
        let pid = PidController::new(sample_time, gains)?;
        let filter = PidFilter::new(sample_time, &gains);
        Ok(Self { filter, pid })
    }

    /// Update controller and filter coefficients together; the filter must
    /// never run with gains the controller is not using.
    pub fn update_constants(&mut self, gains: PidGains) {
        self.pid.update_constants(gains);
        self.filter.update_constants(&gains);
    }

    pub fn gains(&self) -> &PidGains {
        self.pid.gains()
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.pid.reset();
    }

    pub fn control(&mut self, yr: f64, y: f64) -> f64 {
        let filtered = self.filter.control(yr);
        self.pid.control(filtered, y)
    }
}

/// PD controller with its matched reference pre-filter.
#[derive(Debug, Clone)]
pub struct FilteredPd {
    filter: PdFilter,
    pd: PdController,
}

impl FilteredPd {
    pub fn new(sample_time: f64, gains: PdGains) -> Result<Self, ConfigError> {
        let pd = PdController::new(sample_time, gains)?;
        let filter = PdFilter::new(sample_time, &gains);
        Ok(Self { filter, pd })
    }

    pub fn update_constants(&mut self, gains: PdGains) {
        self.pd.update_constants(gains);
        self.filter.update_constants(&gains);
    }

    pub fn gains(&self) -> &PdGains {
        self.pd.gains()
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.pd.reset();
    }

    pub fn control(&mut self, yr: f64, y: f64) -> f64 {
        let filtered = self.filter.control(yr);
        self.pd.control(filtered, y)
    }
}
