use nalgebra::Vector2;

use crate::control::{FilteredPd, FilteredPid, PdGains, PidGains};
use crate::dynamics::state::VehicleState;
use crate::vehicle::VehicleParams;
use crate::ConfigError;

use super::scheduler::{ControlDesignParams, GainScheduler};

// ---------------------------------------------------------------------------
// Cascade: position -> attitude -> nozzle, vertical -> thrust
// ---------------------------------------------------------------------------

/// What the vertical loop regulates. Chosen once at setup, never switched
/// mid-run (the two loops hold incompatible integrator histories).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalMode {
    /// PI on vertical velocity; the vertical reference is a speed in m/s.
    Speed,
    /// PID on altitude; the vertical reference is a height in m.
    Altitude,
}

/// Actuator commands for one tick, plus the attitude reference the position
/// loop produced (exposed for telemetry and diagnostics).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actuation {
    pub thrust: f64,
    pub nozzle_angle: f64,
    pub attitude_ref: f64,
}

/// Wires scheduler and controllers into the two per-tick pipelines:
///
/// - horizontal: position gains → position PD → attitude reference →
///   attitude gains → attitude PD → nozzle command;
/// - vertical: speed or altitude gains → vertical PID → thrust command.
///
/// Every gain update is computed from the state passed into `control`, which
/// must be the state at the end of the *previous* integration step;
/// controllers never see dynamics caused by their own tick's actuation.
#[derive(Debug, Clone)]
pub struct CascadeController {
    scheduler: GainScheduler,
    position: FilteredPd,
    attitude: FilteredPd,
    vertical: FilteredPid,
    mode: VerticalMode,
}

impl CascadeController {
    pub fn new(
        vehicle: VehicleParams,
        design: ControlDesignParams,
        mode: VerticalMode,
        sample_time: f64,
    ) -> Result<Self, ConfigError> {
        let position = FilteredPd::new(sample_time, PdGains::symmetric(vehicle.max_attitude_ref))?;
        let attitude = FilteredPd::new(sample_time, PdGains::symmetric(vehicle.max_nozzle_angle))?;
        let vertical = FilteredPid::new(sample_time, PidGains::symmetric(vehicle.max_thrust))?;
        let scheduler = GainScheduler::new(vehicle, design)?;
        Ok(Self {
            scheduler,
            position,
            attitude,
            vertical,
            mode,
        })
    }

    pub fn mode(&self) -> VerticalMode {
        self.mode
    }

    pub fn scheduler(&self) -> &GainScheduler {
        &self.scheduler
    }

    pub fn set_design(&mut self, design: ControlDesignParams) -> Result<(), ConfigError> {
        self.scheduler.set_design(design)
    }

    pub fn set_nozzle_correction(&mut self, enabled: bool) {
        self.scheduler.set_nozzle_correction(enabled);
    }

    /// Zero every controller and filter history.
    pub fn reset(&mut self) {
        self.position.reset();
        self.attitude.reset();
        self.vertical.reset();
    }

    /// One control tick. `state` is the previous tick's integration result;
    /// `vertical_ref` is a speed or an altitude depending on the mode.
    pub fn control(
        &mut self,
        state: &VehicleState,
        wind: Vector2<f64>,
        vertical_ref: f64,
        horizontal_ref: f64,
    ) -> Actuation {
        // Horizontal pipeline: the position loop's command becomes the
        // attitude loop's reference.
        self.position
            .update_constants(self.scheduler.position_gains(state, wind));
        let attitude_ref = self.position.control(horizontal_ref, state.pos.x);

        self.attitude
            .update_constants(self.scheduler.attitude_gains(state, wind));
        let nozzle_cmd = self.attitude.control(attitude_ref, state.theta);

        // Vertical pipeline, independent of the horizontal one.
        let (gains, measured) = match self.mode {
            VerticalMode::Speed => (self.scheduler.speed_gains(state, wind), state.vel.y),
            VerticalMode::Altitude => (self.scheduler.altitude_gains(state, wind), state.pos.y),
        };
        self.vertical.update_constants(gains);
        let thrust_cmd = self.vertical.control(vertical_ref, measured);

        // Physical actuator bounds; the offsets added after controller
        // saturation can push commands past them.
        let vehicle = self.scheduler.vehicle();
        Actuation {
            thrust: thrust_cmd.clamp(0.0, vehicle.max_thrust),
            nozzle_angle: nozzle_cmd.clamp(-vehicle.max_nozzle_angle, vehicle.max_nozzle_angle),
            attitude_ref,
        }
    }
}
