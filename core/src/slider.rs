//! Bounded, stepped value input (the rate and pitch sliders).

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slider {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Slider {
    /// Speech rate slider: 0.5–2.0 in steps of 0.1
    pub const RATE: Slider = Slider {
        min: 0.5,
        max: 2.0,
        step: 0.1,
    };

    /// Speech pitch slider, same domain as rate
    pub const PITCH: Slider = Slider {
        min: 0.5,
        max: 2.0,
        step: 0.1,
    };

    /// Clamp into range and round to the nearest step.
    ///
    /// Rounding divides by the step count per unit so that values already on
    /// the grid come back bit-identical (`1.3` stays `1.3`).
    pub fn snap(&self, value: f64) -> f64 {
        let value = if value.is_finite() { value } else { self.min };
        let per_unit = (1.0 / self.step).round();
        let snapped = (value.clamp(self.min, self.max) * per_unit).round() / per_unit;
        snapped.clamp(self.min, self.max)
    }

    /// True when `value` lies in range and on the step grid (within tolerance).
    pub fn accepts(&self, value: f64) -> bool {
        value.is_finite()
            && value >= self.min - 1e-9
            && value <= self.max + 1e-9
            && (self.snap(value) - value).abs() < 1e-9
    }

    /// Every value the slider can produce, in ascending order.
    pub fn positions(&self) -> Vec<f64> {
        let per_unit = (1.0 / self.step).round();
        let lo = (self.min * per_unit).round() as i64;
        let hi = (self.max * per_unit).round() as i64;
        (lo..=hi).map(|i| i as f64 / per_unit).collect()
    }
}
