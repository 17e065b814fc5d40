use crate::ConfigError;

// ---------------------------------------------------------------------------
// Proportional + feedforward controller
// ---------------------------------------------------------------------------

/// Stateless proportional + feedforward law for first-order plants:
///
/// ```text
/// u = kx * (yr - y) + kff * yr
/// ```
///
/// saturated to `[-max_command, max_command]`. Where a subsystem has no
/// inertia to fight, this replaces a full PID: the feedforward term carries
/// the reference and the proportional term cleans up the residual.
#[derive(Debug, Clone, Copy)]
pub struct PfController {
    pub kx: f64,
    pub kff: f64,
    max_command: f64,
}

impl PfController {
    pub fn new(kx: f64, kff: f64, max_command: f64) -> Result<Self, ConfigError> {
        if max_command <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "max_command",
                value: max_command,
            });
        }
        Ok(Self {
            kx,
            kff,
            max_command,
        })
    }

    /// No internal state to clear.
    pub fn reset(&mut self) {}

    pub fn control(&self, yr: f64, y: f64) -> f64 {
        let u = self.kx * (yr - y) + self.kff * yr;
        u.clamp(-self.max_command, self.max_command)
    }
}
