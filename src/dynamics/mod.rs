//! Rigid-body dynamics: quadratic wind/drag forces and the fixed-step
//! explicit-Euler integrator.

pub mod state;

use std::f64::consts::PI;

use nalgebra::Vector2;

use crate::vehicle::VehicleParams;
use self::state::{ActuationMode, VehicleState};

/// Deadband under which velocities are snapped to exactly zero, stopping
/// perpetual micro-drift from floating-point residue.
pub const EPS: f64 = 1e-4;

/// Aerodynamic force along one axis from the relative wind: `k*(w-v)*|w-v|`
/// (quadratic in the relative speed, signed toward the wind).
pub fn wind_force(coeff: f64, wind: f64, velocity: f64) -> f64 {
    let dv = wind - velocity;
    coeff * dv * dv.abs()
}

/// Sign of `x` with a `±EPS` deadband.
pub fn sgn(x: f64) -> f64 {
    if x > EPS {
        1.0
    } else if x < -EPS {
        -1.0
    } else {
        0.0
    }
}

/// Advance the vehicle one fixed step of `dt` seconds.
///
/// Step order is part of the contract: position and orientation integrate the
/// *previous* tick's velocities before forces are evaluated, so controllers
/// running earlier in the same tick never see dynamics produced by their own
/// actuation.
///
/// This function cannot fail; malformed constants are rejected when the
/// [`VehicleParams`] are built, not here.
pub fn step(
    state: &mut VehicleState,
    vehicle: &VehicleParams,
    wind: Vector2<f64>,
    mode: ActuationMode,
    dt: f64,
) {
    // Kinematics from previous-tick velocities.
    state.pos += state.vel * dt;
    state.theta += state.omega * dt;

    let drag_x = wind_force(vehicle.drag_x, wind.x, state.vel.x);
    let drag_z = wind_force(vehicle.drag_z, wind.y, state.vel.y);

    let pointing = state.theta + state.nozzle_angle;
    let force_x = drag_x + state.thrust * pointing.sin();
    let force_z = drag_z + state.thrust * pointing.cos() - vehicle.mass * vehicle.gravity;

    // Lateral drag and thrust-vector misalignment couple into rotation
    // through the CM-CP lever arm and the nozzle arm.
    let torque = vehicle.cp_offset * (drag_x * state.theta.cos() - drag_z * state.theta.sin())
        - state.thrust * vehicle.nozzle_offset * state.nozzle_angle.sin();

    state.vel.x += force_x / vehicle.mass * dt;
    state.vel.y += force_z / vehicle.mass * dt;
    state.omega += torque / vehicle.inertia * dt;

    if mode == ActuationMode::Manual {
        // Mechanical return-to-center. A closed-loop controller is assumed to
        // hold the gimbal, so relaxation only applies under manual actuation.
        // The final partial step snaps to zero instead of crossing it.
        if state.nozzle_angle.abs() <= vehicle.nozzle_return_rate {
            state.nozzle_angle = 0.0;
        } else {
            state.nozzle_angle -= sgn(state.nozzle_angle) * vehicle.nozzle_return_rate;
        }
    }

    if state.nozzle_angle.abs() < 2.0 * EPS * PI {
        state.nozzle_angle = 0.0;
    }
    if state.vel.x.abs() < EPS {
        state.vel.x = 0.0;
    }
    if state.vel.y.abs() < EPS {
        state.vel.y = 0.0;
    }

    state.time += dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 60.0;

    fn vehicle() -> VehicleParams {
        VehicleParams::default()
    }

    #[test]
    fn wind_force_is_quadratic_and_signed() {
        assert_relative_eq!(wind_force(100.0, 2.0, 0.0), 400.0);
        assert_relative_eq!(wind_force(100.0, -2.0, 0.0), -400.0);
        assert_relative_eq!(wind_force(100.0, 0.0, 3.0), -900.0);
    }

    #[test]
    fn sgn_deadband() {
        assert_eq!(sgn(0.5), 1.0);
        assert_eq!(sgn(-0.5), -1.0);
        assert_eq!(sgn(EPS / 2.0), 0.0);
        assert_eq!(sgn(-EPS / 2.0), 0.0);
    }

    #[test]
    fn hover_equilibrium_is_static() {
        let v = vehicle();
        let mut s = VehicleState::default();
        s.thrust = v.mass * v.gravity;
        for _ in 0..600 {
            step(&mut s, &v, Vector2::zeros(), ActuationMode::ClosedLoop, DT);
        }
        assert_relative_eq!(s.pos.x, 0.0);
        assert_relative_eq!(s.pos.y, 0.0);
        assert_eq!(s.vel, Vector2::zeros());
        assert_eq!(s.omega, 0.0);
    }

    #[test]
    fn free_fall_without_thrust() {
        let v = vehicle();
        let mut s = VehicleState::default();
        step(&mut s, &v, Vector2::zeros(), ActuationMode::ClosedLoop, DT);
        assert_relative_eq!(s.vel.y, -v.gravity * DT, max_relative = 1e-12);
        // Position still zero: kinematics used the previous (zero) velocity.
        assert_relative_eq!(s.pos.y, 0.0);
    }

    #[test]
    fn position_updates_from_previous_velocity() {
        let v = vehicle();
        let mut s = VehicleState::default();
        s.vel.x = 3.0;
        step(&mut s, &v, Vector2::zeros(), ActuationMode::ClosedLoop, DT);
        // One step moves by exactly v*dt even though drag decelerates vel.
        assert_relative_eq!(s.pos.x, 3.0 * DT, max_relative = 1e-12);
        assert!(s.vel.x < 3.0);
    }

    #[test]
    fn positive_nozzle_deflection_pitches_negative() {
        let v = vehicle();
        let mut s = VehicleState::default();
        s.thrust = v.mass * v.gravity;
        s.nozzle_angle = 0.1;
        step(&mut s, &v, Vector2::zeros(), ActuationMode::ClosedLoop, DT);
        assert!(
            s.omega < 0.0,
            "thrust through an offset nozzle must torque opposite the deflection"
        );
        // and push the vehicle laterally toward +x
        assert!(s.vel.x > 0.0);
    }

    #[test]
    fn lateral_wind_torques_through_cp_lever() {
        let v = vehicle();
        let mut s = VehicleState::default();
        step(&mut s, &v, Vector2::new(5.0, 0.0), ActuationMode::ClosedLoop, DT);
        let expected = v.cp_offset * wind_force(v.drag_x, 5.0, 0.0) / v.inertia * DT;
        assert_relative_eq!(s.omega, expected, max_relative = 1e-12);
    }

    #[test]
    fn nozzle_relaxes_only_under_manual_control() {
        let v = vehicle();
        let start = 0.1;

        let mut manual = VehicleState::default();
        manual.nozzle_angle = start;
        step(&mut manual, &v, Vector2::zeros(), ActuationMode::Manual, DT);
        assert_relative_eq!(
            manual.nozzle_angle,
            start - v.nozzle_return_rate,
            max_relative = 1e-12
        );

        let mut auto = VehicleState::default();
        auto.nozzle_angle = start;
        step(&mut auto, &v, Vector2::zeros(), ActuationMode::ClosedLoop, DT);
        assert_relative_eq!(auto.nozzle_angle, start, max_relative = 1e-12);
    }

    #[test]
    fn nozzle_relaxation_settles_to_exact_zero() {
        let v = vehicle();
        let mut s = VehicleState::default();
        s.nozzle_angle = 0.01;
        for _ in 0..20 {
            step(&mut s, &v, Vector2::zeros(), ActuationMode::Manual, DT);
        }
        assert_eq!(s.nozzle_angle, 0.0, "relaxation must not oscillate around zero");
    }

    #[test]
    fn tiny_velocities_snap_to_zero() {
        let v = vehicle();
        let mut s = VehicleState::default();
        s.vel.x = EPS / 2.0;
        s.vel.y = -EPS / 2.0;
        s.thrust = v.mass * v.gravity;
        step(&mut s, &v, Vector2::zeros(), ActuationMode::ClosedLoop, DT);
        assert_eq!(s.vel.x, 0.0);
        assert_eq!(s.vel.y, 0.0);
    }
}
