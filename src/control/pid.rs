use crate::ConfigError;

// ---------------------------------------------------------------------------
// Discrete PID controller (Tustin / bilinear transform)
// ---------------------------------------------------------------------------

/// Gains, saturation bounds and feedforward offset for a PID controller.
///
/// `offset` is added after saturation of the error-driven command; the gain
/// scheduler uses it to cancel known steady biases (gravity, steady drag) so
/// the controller only corrects the residual error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub min_command: f64,
    pub max_command: f64,
    pub offset: f64,
}

impl PidGains {
    /// Zero gains with symmetric saturation at `max_command`.
    pub fn symmetric(max_command: f64) -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
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

/// Discrete PID controller, exact Tustin discretization of
/// `C(s) = kd*s + kp + ki/s`.
///
/// The difference equation keeps the last two errors and the last two
/// commands:
///
/// ```text
/// u[k] = u[k-2] + b0*e[k] + b1*e[k-1] + b2*e[k-2]
/// ```
///
/// Anti-windup is done by clamping: the command is saturated to
/// `[min_command, max_command]` *before* it is stored as `u[k-1]`, so the
/// recursion never sees an unbounded value. The feedforward `offset` is added
/// after the clamp and is not part of the stored history.
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    t: f64,
    b0: f64,
    b1: f64,
    b2: f64,
    // e[k-1], e[k-2], u[k-1], u[k-2]
    ep: f64,
    epp: f64,
    up: f64,
    upp: f64,
}

impl PidController {
    pub fn new(sample_time: f64, gains: PidGains) -> Result<Self, ConfigError> {
        if sample_time <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "sample_time",
                value: sample_time,
            });
        }
        gains.validate()?;
        let mut pid = Self {
            gains,
            t: sample_time,
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
            ep: 0.0,
            epp: 0.0,
            up: 0.0,
            upp: 0.0,
        };
        pid.calculate_factors();
        Ok(pid)
    }

    /// Multiplying factors of the Tustin difference equation.
    fn calculate_factors(&mut self) {
        let PidGains { kp, ki, kd, .. } = self.gains;
        self.b0 = kp + ki * self.t / 2.0 + 2.0 * kd / self.t;
        self.b1 = ki * self.t - 4.0 * kd / self.t;
        self.b2 = -kp + ki * self.t / 2.0 + 2.0 * kd / self.t;
    }

    /// Replace gains, bounds and offset atomically and recompute the Tustin
    /// factors. Safe to call every tick before [`control`](Self::control);
    /// the caller must keep the bounds valid (`min <= max`).
    pub fn update_constants(&mut self, gains: PidGains) {
        debug_assert!(gains.validate().is_ok());
        self.gains = gains;
        self.calculate_factors();
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    pub fn factors(&self) -> (f64, f64, f64) {
        (self.b0, self.b1, self.b2)
    }

    /// Zero the error/command history. Required on vehicle reset so no
    /// integrator action survives into the next run.
    pub fn reset(&mut self) {
        self.ep = 0.0;
        self.epp = 0.0;
        self.up = 0.0;
        self.upp = 0.0;
    }

    /// Compute the command `u[k]` for reference `yr` and measurement `y`.
    pub fn control(&mut self, yr: f64, y: f64) -> f64 {
        let error = yr - y;
        let u = self.upp + self.b0 * error + self.b1 * self.ep + self.b2 * self.epp;
        let u = u.clamp(self.gains.min_command, self.gains.max_command);

        self.epp = self.ep;
        self.ep = error;
        self.upp = self.up;
        self.up = u;

        u + self.gains.offset
    }
}
