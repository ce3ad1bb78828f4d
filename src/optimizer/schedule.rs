//! Geometric cooling schedule.

/// `T(t) = T0 * (Tf / T0)^(t / max(1, iterations - 1))`.
#[derive(Debug, Clone, Copy)]
pub struct CoolingSchedule {
    initial_temp: f64,
    final_temp: f64,
    span: f64,
}

impl CoolingSchedule {
    /// Create a schedule over `iterations` steps.
    ///
    /// Runs of zero or one iteration use a span of 1, so the only
    /// temperature ever produced is `initial_temp`.
    pub fn new(initial_temp: f64, final_temp: f64, iterations: usize) -> Self {
        Self {
            initial_temp,
            final_temp,
            span: iterations.saturating_sub(1).max(1) as f64,
        }
    }

    /// Temperature at iteration `t`.
    #[inline]
    pub fn temperature(&self, t: usize) -> f64 {
        self.initial_temp * (self.final_temp / self.initial_temp).powf(t as f64 / self.span)
    }
}
