use crate::ConfigError;

// ---------------------------------------------------------------------------
// Discrete PD controller (first-order Tustin form)
// ---------------------------------------------------------------------------

/// Gains, saturation bounds and feedforward offset for a PD controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdGains {
    pub kp: f64,
    pub kd: f64,
    pub min_command: f64,
    pub max_command: f64,
    pub offset: f64,
}

impl PdGains {
    /// Zero gains with symmetric saturation at `max_command`.
    pub fn symmetric(max_command: f64) -> Self {
        Self {
            kp: 0.0,
            kd: 0.0,
            min_command: -max_command,
            max_command,
            offset: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_command > self.max_command {
            return Err(ConfigError::InvalidSaturation {
                min: self.min_command,
                max: self.max_command,
            });
        }
        Ok(())
    }
}

/// Discrete PD controller, Tustin discretization of `C(s) = kd*s + kp`:
///
/// ```text
/// u[k] = -u[k-1] + b0*e[k] + b1*e[k-1]
/// ```
///
/// Saturation and offset policy match [`PidController`]: clamp before the
/// command enters the history, add `offset` after.
///
/// [`PidController`]: crate::control::PidController
#[derive(Debug, Clone)]
pub struct PdController {
    gains: PdGains,
    t: f64,
    b0: f64,
    b1: f64,
    // e[k-1], u[k-1]
    ep: f64,
    up: f64,
}

impl PdController {
    pub fn new(sample_time: f64, gains: PdGains) -> Result<Self, ConfigError> {
        if sample_time <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "sample_time",
                value: sample_time,
            });
        }
        gains.validate()?;
        let mut pd = Self {
            gains,
            t: sample_time,
            b0: 0.0,
            b1: 0.0,
            ep: 0.0,
            up: 0.0,
        };
        pd.calculate_factors();
        Ok(pd)
    }

    fn calculate_factors(&mut self) {
        let PdGains { kp, kd, .. } = self.gains;
        self.b0 = kp + 2.0 * kd / self.t;
        self.b1 = kp - 2.0 * kd / self.t;
    }

    /// Replace gains, bounds and offset atomically; callable every tick.
    pub fn update_constants(&mut self, gains: PdGains) {
        debug_assert!(gains.validate().is_ok());
        self.gains = gains;
        self.calculate_factors();
    }

    pub fn gains(&self) -> &PdGains {
        &self.gains
    }

    pub fn factors(&self) -> (f64, f64) {
        (self.b0, self.b1)
    }

    pub fn reset(&mut self) {
        self.ep = 0.0;
        self.up = 0.0;
    }

    pub fn control(&mut self, yr: f64, y: f64) -> f64 {
        let error = yr - y;
        let u = -self.up + self.b0 * error + self.b1 * self.ep;
        let u = u.clamp(self.gains.min_command, self.gains.max_command);

        self.ep = error;
        self.up = u;

        u + self.gains.offset
    }
}
