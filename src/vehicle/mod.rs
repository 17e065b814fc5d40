//! Physical constants of a simulated vehicle, with builder and validation.

use std::f64::consts::PI;

use crate::ConfigError;

// ---------------------------------------------------------------------------
// Vehicle definition
// ---------------------------------------------------------------------------

/// Immutable physical constants of one vehicle.
///
/// Validated once at construction; the integrator and gain scheduler trust
/// these values unconditionally afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleParams {
    pub mass: f64,    // kg
    pub inertia: f64, // kg*m^2, about the center of mass
    /// Quadratic drag coefficient along the body-independent x axis (N/(m/s)^2).
    pub drag_x: f64,
    /// Quadratic drag coefficient along the vertical axis.
    pub drag_z: f64,
    pub gravity: f64, // m/s^2
    /// Lever arm from the center of mass down to the nozzle pivot, m.
    pub nozzle_offset: f64,
    /// Lever arm from the center of mass to the center of pressure, m
    /// (negative = CP below the CM).
    pub cp_offset: f64,
    pub max_thrust: f64, // N
    /// Floor substituted for the actual thrust in thrust-scaled gain
    /// formulas, so gains stay finite when the engine is near shutdown.
    pub thrust_threshold: f64,
    pub max_nozzle_angle: f64, // rad
    /// Saturation of the attitude reference produced by the position loop, rad.
    pub max_attitude_ref: f64,
    /// Thrust change per manual command, N.
    pub thrust_step: f64,
    /// Nozzle deflection per manual command, rad.
    pub nozzle_step: f64,
    /// Per-tick nozzle return-to-center under manual actuation, rad.
    pub nozzle_return_rate: f64,
}

impl VehicleParams {
    pub fn builder() -> VehicleParamsBuilder {
        VehicleParamsBuilder::new()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("mass", self.mass),
            ("inertia", self.inertia),
            ("gravity", self.gravity),
            ("nozzle_offset", self.nozzle_offset),
            ("max_thrust", self.max_thrust),
            ("thrust_threshold", self.thrust_threshold),
            ("max_nozzle_angle", self.max_nozzle_angle),
            ("max_attitude_ref", self.max_attitude_ref),
            ("thrust_step", self.thrust_step),
            ("nozzle_step", self.nozzle_step),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        let non_negative = [
            ("drag_x", self.drag_x),
            ("drag_z", self.drag_z),
            ("nozzle_return_rate", self.nozzle_return_rate),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }
        Ok(())
    }
}

/// Reference vehicle: a 1 t hopper, 20 m tall, with the nozzle pivot 2/3 of
/// the height below the center of mass and the center of pressure at mid
/// height. Thrust tops out at five times its weight.
impl Default for VehicleParams {
    fn default() -> Self {
        const HEIGHT: f64 = 20.0;
        const MASS: f64 = 1000.0;
        const GRAVITY: f64 = 9.81;
        const MAX_THRUST: f64 = 5.0 * MASS * GRAVITY;
        Self {
            mass: MASS,
            inertia: 100_000.0,
            drag_x: 100.0,
            drag_z: 10.0,
            gravity: GRAVITY,
            nozzle_offset: 2.0 * HEIGHT / 3.0,
            cp_offset: HEIGHT / 2.0 - 2.0 * HEIGHT / 3.0,
            max_thrust: MAX_THRUST,
            thrust_threshold: MAX_THRUST / 10.0,
            max_nozzle_angle: 45.0 * PI / 180.0,
            max_attitude_ref: PI / 90.0,
            thrust_step: 500.0,
            nozzle_step: PI / 360.0,
            nozzle_return_rate: PI / 900.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct VehicleParamsBuilder {
    params: VehicleParams,
}

impl VehicleParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: VehicleParams::default(),
        }
    }

    pub fn mass(mut self, v: f64) -> Self {
        self.params.mass = v;
        self
    }
    pub fn inertia(mut self, v: f64) -> Self {
        self.params.inertia = v;
        self
    }
    pub fn drag_x(mut self, v: f64) -> Self {
        self.params.drag_x = v;
        self
    }
    pub fn drag_z(mut self, v: f64) -> Self {
        self.params.drag_z = v;
        self
    }
    pub fn gravity(mut self, v: f64) -> Self {
        self.params.gravity = v;
        self
    }
    pub fn nozzle_offset(mut self, v: f64) -> Self {
        self.params.nozzle_offset = v;
        self
    }
    pub fn cp_offset(mut self, v: f64) -> Self {
        self.params.cp_offset = v;
        self
    }
    pub fn max_thrust(mut self, v: f64) -> Self {
        self.params.max_thrust = v;
        self
    }
    pub fn thrust_threshold(mut self, v: f64) -> Self {
        self.params.thrust_threshold = v;
        self
    }
    pub fn max_nozzle_angle(mut self, v: f64) -> Self {
        self.params.max_nozzle_angle = v;
        self
    }
    pub fn max_attitude_ref(mut self, v: f64) -> Self {
        self.params.max_attitude_ref = v;
        self
    }
    pub fn thrust_step(mut self, v: f64) -> Self {
        self.params.thrust_step = v;
        self
    }
    pub fn nozzle_step(mut self, v: f64) -> Self {
        self.params.nozzle_step = v;
        self
    }
    pub fn nozzle_return_rate(mut self, v: f64) -> Self {
        self.params.nozzle_return_rate = v;
        self
    }

    pub fn build(self) -> Result<VehicleParams, ConfigError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl Default for VehicleParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
