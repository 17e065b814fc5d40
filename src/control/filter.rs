use super::pd::PdGains;
use super::pid::PidGains;

// ---------------------------------------------------------------------------
// Reference pre-filters matched to the Tustin controllers
// ---------------------------------------------------------------------------
//
// A PID introduces the zeros of `kd*s^2 + kp*s + ki` into the closed loop;
// filtering the reference through `F(s) = ki / (kd*s^2 + kp*s + ki)` cancels
// them so a step command produces no derivative kick. The PD variant uses
// `F(s) = kp / (kd*s + kp)`. Both are discretized with the same bilinear
// substitution as the controllers, so the cancellation is exact in discrete
// time.

/// Second-order pre-filter matched to a [`PidController`].
///
/// `update_constants` must be called whenever the controller gains change,
/// before the next `control` call; stale coefficients are used otherwise.
/// With all-zero gains the filter is transparent.
///
/// [`PidController`]: crate::control::PidController
#[derive(Debug, Clone)]
pub struct PidFilter {
    t: f64,
    u1: f64,
    u2: f64,
    xc: f64,
    direct: bool,
    // x[k-1], x[k-2], u[k-1], u[k-2]
    xp: f64,
    xpp: f64,
    up: f64,
    upp: f64,
}

impl PidFilter {
    /// `sample_time` is validated by the owning controller wrapper.
    pub fn new(sample_time: f64, gains: &PidGains) -> Self {
        let mut filter = Self {
            t: sample_time,
            u1: 0.0,
            u2: 0.0,
            xc: 0.0,
            direct: true,
            xp: 0.0,
            xpp: 0.0,
            up: 0.0,
            upp: 0.0,
        };
        filter.update_constants(gains);
        filter
    }

    pub fn update_constants(&mut self, gains: &PidGains) {
        let (kp, ki, kd, t) = (gains.kp, gains.ki, gains.kd, self.t);
        let u0 = 4.0 * kd + 2.0 * kp * t + t * t * ki;
        if u0.abs() < 1e-12 {
            self.direct = true;
            return;
        }
        self.direct = false;
        self.u1 = (2.0 * t * t * ki - 8.0 * kd) / u0;
        self.u2 = (4.0 * kd - 2.0 * t * kp + t * t * ki) / u0;
        self.xc = ki * t * t / u0;
    }

    pub fn reset(&mut self) {
        self.xp = 0.0;
        self.xpp = 0.0;
        self.up = 0.0;
        self.upp = 0.0;
    }

    /// Filter one reference sample.
    pub fn control(&mut self, xr: f64) -> f64 {
        if self.direct {
            return xr;
        }
        let u = self.xc * (xr + 2.0 * self.xp + self.xpp) - self.u1 * self.up - self.u2 * self.upp;

        self.upp = self.up;
        self.up = u;
        self.xpp = self.xp;
        self.xp = xr;

        u
    }
}

/// First-order pre-filter matched to a [`PdController`].
///
/// [`PdController`]: crate::control::PdController
#[derive(Debug, Clone)]
pub struct PdFilter {
    t: f64,
    xc: f64,
    u1: f64,
    direct: bool,
    // x[k-1], u[k-1]
    xp: f64,
    up: f64,
}

impl PdFilter {
    pub fn new(sample_time: f64, gains: &PdGains) -> Self {
        let mut filter = Self {
            t: sample_time,
            xc: 0.0,
            u1: 0.0,
            direct: true,
            xp: 0.0,
            up: 0.0,
        };
        filter.update_constants(gains);
        filter
    }

    pub fn update_constants(&mut self, gains: &PdGains) {
        let u0 = gains.kp + 2.0 * gains.kd / self.t;
        if u0.abs() < 1e-12 {
            self.direct = true;
            return;
        }
        self.direct = false;
        self.xc = gains.kp / u0;
        self.u1 = (gains.kp - 2.0 * gains.kd / self.t) / u0;
    }

    pub fn reset(&mut self) {
        self.xp = 0.0;
        self.up = 0.0;
    }

    pub fn control(&mut self, xr: f64) -> f64 {
        if self.direct {
            return xr;
        }
        let u = self.xc * (xr + self.xp) - self.u1 * self.up;

        self.up = u;
        self.xp = xr;

        u
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const T: f64 = 1.0 / 60.0;

    #[test]
    fn pid_filter_unit_dc_gain() {
        let gains = PidGains {
            kp: 9960.0,
            ki: 5600.0,
            kd: 7200.0,
            ..PidGains::symmetric(1.0)
        };
        let mut filter = PidFilter::new(T, &gains);
        let mut out = 0.0;
        for _ in 0..20_000 {
            out = filter.control(1.0);
        }
        assert_relative_eq!(out, 1.0, max_relative = 1e-6);
    }

    #[test]
    fn pid_filter_starts_slow() {
        let gains = PidGains {
            kp: 2.0,
            ki: 1.0,
            kd: 0.5,
            ..PidGains::symmetric(1.0)
        };
        let mut filter = PidFilter::new(T, &gains);
        let first = filter.control(1.0);
        // Second-order lag: the first filtered sample of a unit step is tiny.
        assert!(first.abs() < 0.01, "kick leaked through the filter: {first}");
    }

    #[test]
    fn pd_filter_unit_dc_gain() {
        let gains = PdGains {
            kp: 0.12,
            kd: 0.18,
            ..PdGains::symmetric(1.0)
        };
        let mut filter = PdFilter::new(T, &gains);
        let mut out = 0.0;
        for _ in 0..20_000 {
            out = filter.control(1.0);
        }
        assert_relative_eq!(out, 1.0, max_relative = 1e-6);
    }

    #[test]
    fn pd_filter_tracks_negative_gain_pairs() {
        // Attitude-loop gains are both negative; the filter only depends on
        // their ratio and must stay stable and settle to unity.
        let gains = PdGains {
            kp: -31.9,
            kd: -4.25,
            ..PdGains::symmetric(1.0)
        };
        let mut filter = PdFilter::new(T, &gains);
        let mut out = 0.0;
        for _ in 0..40_000 {
            out = filter.control(2.5);
        }
        assert_relative_eq!(out, 2.5, max_relative = 1e-6);
    }

    #[test]
    fn zero_gains_pass_through() {
        let mut pid = PidFilter::new(T, &PidGains::symmetric(1.0));
        let mut pd = PdFilter::new(T, &PdGains::symmetric(1.0));
        assert_eq!(pid.control(3.25), 3.25);
        assert_eq!(pd.control(-1.5), -1.5);
    }

    #[test]
    fn reset_restores_initial_response() {
        let gains = PidGains {
            kp: 2.0,
            ki: 1.0,
            kd: 0.5,
            ..PidGains::symmetric(1.0)
        };
        let mut filter = PidFilter::new(T, &gains);
        let first = filter.control(1.0);
        for _ in 0..50 {
            filter.control(1.0);
        }
        filter.reset();
        assert_eq!(filter.control(1.0), first);
    }
}
