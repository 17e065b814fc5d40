use std::io::{self, Write};

use crate::sim::record::Record;

/// Write a recorded run as CSV.
///
/// Columns: time, x, z, theta, vx, vz, omega, thrust, nozzle_angle,
///          attitude_ref, x_ref, vertical_ref
pub fn write_trajectory<W: Write>(writer: &mut W, records: &[Record]) -> io::Result<()> {
    writeln!(
        writer,
        "time,x,z,theta,vx,vz,omega,thrust,nozzle_angle,attitude_ref,x_ref,vertical_ref"
    )?;

    for r in records {
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.6},{:.4},{:.4},{:.6},{:.2},{:.6},{:.6},{:.4},{:.4}",
            r.time,
            r.x,
            r.z,
            r.theta,
            r.vx,
            r.vz,
            r.omega,
            r.thrust,
            r.nozzle_angle,
            r.attitude_ref,
            r.x_ref,
            r.vertical_ref,
        )?;
    }

    Ok(())
}

/// Write a recorded run to a CSV file at the given path.
pub fn write_trajectory_file(path: &str, records: &[Record]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, records)
}
