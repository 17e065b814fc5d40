use nalgebra::Vector2;

use tvc_sim::sim::{self, tracking_cost, Simulation};
use tvc_sim::types::{ControlDesignParams, SimConfig, VehicleParams, VerticalMode};

fn main() {
    // -----------------------------------------------------------------------
    // Vehicle: reference 1 t hopper, altitude-hold mode
    // -----------------------------------------------------------------------
    let vehicle = VehicleParams::default();
    let design = ControlDesignParams::default();
    let config = SimConfig {
        dt: 1.0 / 60.0,
        max_time: 90.0,
    };

    let x_ref = 10.0;
    let z_ref = 5.0;
    let wind = Vector2::new(1.0, 0.0);

    let mut simulation = Simulation::new(
        vehicle.clone(),
        design,
        VerticalMode::Altitude,
        config.dt,
    )
    .expect("reference configuration is valid");

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------
    let records = sim::run(&mut simulation, wind, z_ref, x_ref, &config);

    let max_thrust_seen = records.iter().map(|r| r.thrust).fold(0.0_f64, f64::max);
    let max_lean = records
        .iter()
        .map(|r| r.theta.abs())
        .fold(0.0_f64, f64::max);
    let max_nozzle = records
        .iter()
        .map(|r| r.nozzle_angle.abs())
        .fold(0.0_f64, f64::max);

    // First tick after which the vehicle stays inside a 10 cm box around the
    // target with negligible velocity.
    let settled_at = records
        .iter()
        .rev()
        .take_while(|r| {
            (r.x - x_ref).abs() < 0.1
                && (r.z - z_ref).abs() < 0.1
                && r.vx.abs() < 1e-2
                && r.vz.abs() < 1e-2
        })
        .last()
        .map(|r| r.time);

    // -----------------------------------------------------------------------
    // Report
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  THRUST-VECTORED HOVER FLIGHT - gain-scheduled cascade");
    println!("====================================================================");
    println!();
    println!("  Vehicle");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mass:          {:>8.0} kg    Inertia:      {:>8.0} kg·m²",
        vehicle.mass, vehicle.inertia
    );
    println!(
        "  Max thrust:    {:>8.0} N     Max nozzle:   {:>8.1}°",
        vehicle.max_thrust,
        vehicle.max_nozzle_angle.to_degrees()
    );
    println!(
        "  Drag (x/z):    {:>4.0}/{:<4.0} N/(m/s)²",
        vehicle.drag_x, vehicle.drag_z
    );
    println!();
    println!("  Scenario");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Target:        ({:.1}, {:.1}) m     Wind:  ({:.1}, {:.1}) m/s",
        x_ref, z_ref, wind.x, wind.y
    );
    println!(
        "  Duration:      {:>6.0} s at {:.0} Hz",
        config.max_time,
        1.0 / config.dt
    );
    println!();
    println!("  Flight");
    println!("  ──────────────────────────────────────────────────────────────────");
    match settled_at {
        Some(t) => println!("  Settled at     {:>6.1} s", t),
        None => println!("  Did not settle within the run"),
    }
    println!(
        "  Final pos:     ({:>7.3}, {:>7.3}) m   vel: ({:>8.1e}, {:>8.1e}) m/s",
        simulation.position().x,
        simulation.position().y,
        simulation.velocity().x,
        simulation.velocity().y
    );
    println!(
        "  Peak thrust:   {:>8.0} N     Peak lean:    {:>8.2}°",
        max_thrust_seen,
        max_lean.to_degrees()
    );
    println!(
        "  Peak nozzle:   {:>8.2}°     Tracking cost: {:>9.1}",
        max_nozzle.to_degrees(),
        tracking_cost(&records)
    );
    println!();

    // -----------------------------------------------------------------------
    // Sampled trajectory
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>8}  {:>8}  {:>8}  {:>9}  {:>8}",
        "t (s)", "x (m)", "z (m)", "θ (deg)", "thrust(N)", "α (deg)"
    );
    println!("  {}", "─".repeat(58));

    let sample_interval = (records.len() / 20).max(1);
    for (i, r) in records.iter().enumerate() {
        if i % sample_interval != 0 && i != records.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.2}  {:>8.3}  {:>8.3}  {:>8.3}  {:>9.0}  {:>8.3}",
            r.time,
            r.x,
            r.z,
            r.theta.to_degrees(),
            r.thrust,
            r.nozzle_angle.to_degrees(),
        );
    }

    println!();
    println!(
        "  Simulation: {} steps, dt = {:.4} s",
        records.len(),
        config.dt
    );
    println!("====================================================================");
    println!();
}
