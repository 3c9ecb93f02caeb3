use crate::engine::error::AssayError;

/// Dilution descriptor for one drug: start concentration and constant dilution factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DilutionSeries {
    start: f64,
    factor: f64,
}

impl DilutionSeries {
    /// Validates and creates a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`AssayError::InvalidValue`] if either number is not finite or the
    /// factor is zero.
    pub fn new(start: f64, factor: f64) -> Result<Self, AssayError> {
        if !start.is_finite() {
            return Err(AssayError::invalid_value(
                "start concentration",
                format!("expected a finite number, got {start}"),
            ));
        }
        if !factor.is_finite() || factor == 0.0 {
            return Err(AssayError::invalid_value(
                "dilution factor",
                format!("expected a finite non-zero number, got {factor}"),
            ));
        }
        Ok(Self { start, factor })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Concentrations for `steps` dilution steps, optionally as base-10 logarithms.
    ///
    /// # Errors
    ///
    /// Returns [`AssayError::InvalidValue`] when a term overflows, or when `log_scale` is
    /// requested for a series that would contain non-positive concentrations (including
    /// terms that underflow to zero).
    pub fn concentrations(&self, steps: usize, log_scale: bool) -> Result<Vec<f64>, AssayError> {
        let series = generate_series(self.start, self.factor, steps);
        if let Some(step) = series.iter().position(|term| !term.is_finite()) {
            return Err(AssayError::invalid_value(
                "dilution series",
                format!("step {} overflows to {}", step + 1, series[step]),
            ));
        }
        if !log_scale {
            return Ok(series);
        }
        if self.start <= 0.0 || self.factor < 0.0 {
            return Err(AssayError::invalid_value(
                "dilution series",
                format!(
                    "log scale needs a positive start and factor (start {}, factor {})",
                    self.start, self.factor
                ),
            ));
        }
        if let Some(step) = series.iter().position(|&term| term <= 0.0) {
            return Err(AssayError::invalid_value(
                "dilution series",
                format!(
                    "step {} underflows to zero and has no logarithm (start {}, factor {})",
                    step + 1,
                    self.start,
                    self.factor
                ),
            ));
        }
        Ok(to_log10(&series))
    }
}

/// `n` terms of `start, start / factor, start / factor^2, ...`.
pub fn generate_series(start: f64, factor: f64, n: usize) -> Vec<f64> {
    std::iter::successors(Some(start), |term| Some(term / factor))
        .take(n)
        .collect()
}

/// Elementwise base-10 logarithm.
pub fn to_log10(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.log10()).collect()
}
