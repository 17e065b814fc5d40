use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Planar vehicle state
// ---------------------------------------------------------------------------

/// Who drives the actuators.
///
/// The mode changes integrator behavior, not just the input source: under
/// `Manual` actuation the nozzle mechanically relaxes toward center each
/// tick, while a closed-loop controller is assumed to hold it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationMode {
    Manual,
    ClosedLoop,
}

/// Rigid-body state in the vertical plane.
///
/// `pos.x`/`vel.x` are horizontal, `pos.y`/`vel.y` vertical (altitude z).
/// `theta` is the tilt from vertical (rad, positive leans toward +x) and
/// `nozzle_angle` the gimbal deflection relative to the body axis.
///
/// Mutated once per tick by the integrator (and by the actuation write-back
/// of the simulation loop); the gain scheduler and cascade only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    pub time: f64,
    pub pos: Vector2<f64>,
    pub theta: f64,
    pub vel: Vector2<f64>,
    pub omega: f64,
    pub thrust: f64,
    pub nozzle_angle: f64,
}

impl VehicleState {
    /// State at rest at the given pose, engines off.
    pub fn at_rest(pos: Vector2<f64>, theta: f64) -> Self {
        Self {
            time: 0.0,
            pos,
            theta,
            vel: Vector2::zeros(),
            omega: 0.0,
            thrust: 0.0,
            nozzle_angle: 0.0,
        }
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::at_rest(Vector2::zeros(), 0.0)
    }
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0, // 60 Hz control rate
            max_time: 120.0,
        }
    }
}
