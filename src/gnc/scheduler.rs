use nalgebra::Vector2;

use crate::control::{PdGains, PidGains};
use crate::dynamics::state::VehicleState;
use crate::dynamics::wind_force;
use crate::vehicle::VehicleParams;
use crate::ConfigError;

// ---------------------------------------------------------------------------
// Control design targets
// ---------------------------------------------------------------------------

/// Damping ratio and natural frequency targets per control loop, plus the
/// relative placement `k_z` of the altitude loop's third pole (at
/// `k_z * xi_z * omega_z`).
///
/// These are design-time tuning inputs; the scheduler turns them into
/// concrete gains at every operating point. They are the knobs an external
/// parameter search optimizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlDesignParams {
    pub xi_x: f64,
    pub omega_x: f64,
    pub xi_theta: f64,
    pub omega_theta: f64,
    pub xi_z: f64,
    pub omega_z: f64,
    pub k_z: f64,
}

impl ControlDesignParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("xi_x", self.xi_x),
            ("omega_x", self.omega_x),
            ("xi_theta", self.xi_theta),
            ("omega_theta", self.omega_theta),
            ("xi_z", self.xi_z),
            ("omega_z", self.omega_z),
            ("k_z", self.k_z),
        ];
        for (name, value) in fields {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

/// Defaults tuned for the reference vehicle. The horizontal loop sits well
/// below the plant's right-half-plane zero `sqrt(F*nozzle_offset/I)` (about
/// 1.1 rad/s at hover thrust): pushing `omega_x` toward that zero trades the
/// clean settling for a growing limit cycle.
impl Default for ControlDesignParams {
    fn default() -> Self {
        Self {
            xi_x: 1.0,
            omega_x: 0.2,
            xi_theta: 1.3,
            omega_theta: 2.0,
            xi_z: 0.8,
            omega_z: 1.0,
            k_z: 7.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Gain scheduler
// ---------------------------------------------------------------------------

/// Recomputes controller gains and offsets every tick so that the closed
/// loop, linearized at the current operating point, matches the requested
/// `(xi, omega)` pair of each loop.
///
/// Two nonlinearities are compensated:
///
/// - quadratic drag `k*(w-v)*|w-v|`, linearized to a damping `2*k*|w-v|`
///   around the current relative wind;
/// - the affine actuation channel: nozzle-to-lateral-force and
///   nozzle-to-torque gains scale with thrust, so position and attitude
///   gains divide by `max(thrust, thrust_threshold)`. Below the threshold
///   the gains are those computed at exactly the threshold: linearization
///   accuracy is traded for numerical stability near engine shutdown.
///
/// Offsets cancel the known steady biases (gravity, drag at the hold point,
/// aerodynamic torque), so each controller only works on the residual error.
/// All methods are pure functions of the vehicle constants, the design
/// targets and the sampled state; scheduling itself has no side effects.
#[derive(Debug, Clone)]
pub struct GainScheduler {
    vehicle: VehicleParams,
    design: ControlDesignParams,
    nozzle_correction: bool,
}

impl GainScheduler {
    pub fn new(vehicle: VehicleParams, design: ControlDesignParams) -> Result<Self, ConfigError> {
        vehicle.validate()?;
        design.validate()?;
        Ok(Self {
            vehicle,
            design,
            nozzle_correction: false,
        })
    }

    pub fn vehicle(&self) -> &VehicleParams {
        &self.vehicle
    }

    pub fn design(&self) -> &ControlDesignParams {
        &self.design
    }

    pub fn set_design(&mut self, design: ControlDesignParams) -> Result<(), ConfigError> {
        design.validate()?;
        self.design = design;
        Ok(())
    }

    /// Enable subtracting the current nozzle deflection from the horizontal
    /// offset, cancelling the gimbal's direct lateral force. Off by default:
    /// it removes the steady-wind position bias but feeds the nozzle's
    /// high-frequency motion back into the attitude reference.
    pub fn set_nozzle_correction(&mut self, enabled: bool) {
        self.nozzle_correction = enabled;
    }

    pub fn nozzle_correction(&self) -> bool {
        self.nozzle_correction
    }

    fn effective_thrust(&self, thrust: f64) -> f64 {
        thrust.max(self.vehicle.thrust_threshold)
    }

    /// Horizontal position loop: PD producing an attitude reference.
    ///
    /// Linearized plant `x'' = (-a*x' + F*theta)/m` with
    /// `a = 2*drag_x*|w - vx|`; pole placement against
    /// `s^2 + 2*xi*omega*s + omega^2`. Where natural drag damping already
    /// exceeds the target, the derivative gain floors at zero rather than
    /// turning negative (a negative `kd` rings the Tustin differentiator
    /// against the saturation bound).
    pub fn position_gains(&self, state: &VehicleState, wind: Vector2<f64>) -> PdGains {
        let v = &self.vehicle;
        let d = &self.design;
        let f = self.effective_thrust(state.thrust);
        let damping = 2.0 * v.drag_x * (wind.x - state.vel.x).abs();

        let kp = v.mass * d.omega_x * d.omega_x / f;
        let kd = (2.0 * d.xi_x * d.omega_x * v.mass - damping).max(0.0) / f;

        // Steady lean against the wind at the hold point (vx = 0). Using the
        // instantaneous vehicle velocity here instead would cancel the drag
        // damping the gains above rely on.
        let mut offset = -wind_force(v.drag_x, wind.x, 0.0) / f;
        if self.nozzle_correction {
            offset -= state.nozzle_angle;
        }

        PdGains {
            kp,
            kd,
            min_command: -v.max_attitude_ref,
            max_command: v.max_attitude_ref,
            offset,
        }
    }

    /// Attitude loop: PD producing the nozzle deflection.
    ///
    /// Plant `I*theta'' = -F*nozzle_offset*alpha + torque_bias`; the negative
    /// input gain makes both computed gains negative. The offset holds the
    /// nozzle where thrust torque balances the aerodynamic torque from the
    /// current relative wind.
    pub fn attitude_gains(&self, state: &VehicleState, wind: Vector2<f64>) -> PdGains {
        let v = &self.vehicle;
        let d = &self.design;
        let channel = self.effective_thrust(state.thrust) * v.nozzle_offset;

        let kp = -v.inertia * d.omega_theta * d.omega_theta / channel;
        let kd = -2.0 * d.xi_theta * d.omega_theta * v.inertia / channel;

        let drag_x = wind_force(v.drag_x, wind.x, state.vel.x);
        let drag_z = wind_force(v.drag_z, wind.y, state.vel.y);
        let offset =
            v.cp_offset * (drag_x * state.theta.cos() - drag_z * state.theta.sin()) / channel;

        PdGains {
            kp,
            kd,
            min_command: -v.max_nozzle_angle,
            max_command: v.max_nozzle_angle,
            offset,
        }
    }

    /// Vertical speed loop: PI on vertical velocity, commanding thrust.
    ///
    /// First-order plant `m*vz' = -a*vz + u` with `a = 2*drag_z*|w - vz|`;
    /// the integral term absorbs any residual bias, so the offset only
    /// carries gravity and the steady wind drag.
    pub fn speed_gains(&self, state: &VehicleState, wind: Vector2<f64>) -> PidGains {
        let v = &self.vehicle;
        let d = &self.design;
        let damping = 2.0 * v.drag_z * (wind.y - state.vel.y).abs();

        PidGains {
            kp: (2.0 * d.xi_z * d.omega_z * v.mass - damping).max(0.0),
            ki: v.mass * d.omega_z * d.omega_z,
            kd: 0.0,
            min_command: -v.max_thrust,
            max_command: v.max_thrust,
            offset: self.vertical_offset(wind),
        }
    }

    /// Vertical altitude loop: PID on altitude, commanding thrust.
    ///
    /// Third-order closed loop; the dominant pair matches `(xi_z, omega_z)`
    /// and the extra real pole sits at `k_z * xi_z * omega_z`.
    pub fn altitude_gains(&self, state: &VehicleState, wind: Vector2<f64>) -> PidGains {
        let v = &self.vehicle;
        let d = &self.design;
        let damping = 2.0 * v.drag_z * (wind.y - state.vel.y).abs();
        let (xi, omega, k) = (d.xi_z, d.omega_z, d.k_z);

        PidGains {
            kp: v.mass * omega * omega * (1.0 + 2.0 * k * xi * xi),
            ki: v.mass * k * xi * omega * omega * omega,
            kd: (v.mass * xi * omega * (2.0 + k) - damping).max(0.0),
            min_command: -v.max_thrust,
            max_command: v.max_thrust,
            offset: self.vertical_offset(wind),
        }
    }

    /// Gravity plus the steady vertical wind drag at the hold point.
    fn vertical_offset(&self, wind: Vector2<f64>) -> f64 {
        let v = &self.vehicle;
        v.mass * v.gravity - wind_force(v.drag_z, wind.y, 0.0)
    }
}
