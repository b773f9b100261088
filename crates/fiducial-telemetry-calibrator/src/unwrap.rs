use nalgebra::Vector3;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Per-axis turn counting for rotation vectors.
///
/// A component that jumps from above `π/2` to below `-π/2` between two calls
/// crossed `+π` and gains a turn; the reverse jump loses one. The output is
/// the raw value plus `turns * 2π`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RotationUnwrapper {
    turns: [i64; 3],
    prev: Option<Vector3<f64>>,
}

impl RotationUnwrapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unwrap `raw`. The first call only seeds the previous value.
    pub fn adjust(&mut self, raw: Vector3<f64>) -> Vector3<f64> {
        let Some(prev) = self.prev.replace(raw) else {
            return raw;
        };
        for i in 0..3 {
            if raw[i] * prev[i] < 0.0 {
                if raw[i] < -FRAC_PI_2 && prev[i] > FRAC_PI_2 {
                    self.turns[i] += 1;
                } else if raw[i] > FRAC_PI_2 && prev[i] < -FRAC_PI_2 {
                    self.turns[i] -= 1;
                }
            }
        }
        raw + Vector3::from_fn(|i, _| self.turns[i] as f64 * TAU)
    }

    #[inline]
    pub fn turns(&self) -> [i64; 3] {
        self.turns
    }

    /// Forget turns and the previous value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
