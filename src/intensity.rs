/// Scales raw region values into `[0, 1]` against a reference maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityNormalizer {
    max_value: f64,
}

impl IntensityNormalizer {
    pub fn new(max_value: f64) -> Self {
        Self { max_value }
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn set_max_value(&mut self, max_value: f64) {
        self.max_value = max_value;
    }

    /// `value / max`, clamped to 1. A non-positive maximum yields 0.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max_value <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        (value / self.max_value).clamp(0.0, 1.0)
    }

    /// Intensity of a left/right pair, driven by the busier side.
    pub fn normalize_bilateral(&self, left: f64, right: f64) -> f64 {
        self.normalize(left.max(right))
    }

    /// Intensity of the mean of `values`; an empty slice is 0.
    pub fn normalize_average(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        self.normalize(values.iter().sum::<f64>() / values.len() as f64)
    }
}
