use serde::{Deserialize, Serialize};

/// Settling-window configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    /// Number of consecutive samples that must agree.
    pub window: usize,
    /// Per-axis translation spread must stay strictly below this.
    pub position_spread: f64,
    /// Per-axis rotation spread (radians) must stay strictly below this.
    pub rotation_spread: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            window: 10,
            position_spread: 3.0,
            rotation_spread: 1f64.to_radians(),
        }
    }
}
