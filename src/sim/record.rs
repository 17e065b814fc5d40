// ---------------------------------------------------------------------------
// Recorded tracking runs
// ---------------------------------------------------------------------------

/// One sample of a recorded tracking run.
///
/// `vertical` holds the quantity the vertical loop regulates (altitude in
/// altitude mode, vertical speed in speed mode) so costs and plots read the
/// same way in both modes; the full state is recorded alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub time: f64,
    pub x: f64,
    pub z: f64,
    pub theta: f64,
    pub vx: f64,
    pub vz: f64,
    pub omega: f64,
    pub thrust: f64,
    pub nozzle_angle: f64,
    pub attitude_ref: f64,
    pub x_ref: f64,
    pub vertical: f64,
    pub vertical_ref: f64,
}

/// Sum of squared tracking errors over a run.
///
/// This is the scalar an external parameter-search loop minimizes when it
/// replays the simulation as a black box with different design parameters;
/// determinism of the simulation makes the comparison meaningful.
pub fn tracking_cost(records: &[Record]) -> f64 {
    records
        .iter()
        .map(|r| {
            let ex = r.x - r.x_ref;
            let ev = r.vertical - r.vertical_ref;
            ex * ex + ev * ev
        })
        .sum()
}
