use serde::{Deserialize, Serialize};
use std::fmt;

/// Robot-relative planar pose for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub x: f64,
    pub y: f64,
    /// Unwrapped heading in radians; may leave `[-π, π]`.
    pub heading: f64,
    /// Timestamp of the source frame, seconds.
    pub timestamp: f64,
}

impl Telemetry {
    pub fn new(x: f64, y: f64, heading: f64, timestamp: f64) -> Self {
        Self {
            x,
            y,
            heading,
            timestamp,
        }
    }

    #[inline]
    pub fn heading_degrees(&self) -> f64 {
        self.heading.to_degrees()
    }

    /// `x`, `y`, `heading` as three packed little-endian `f32`.
    pub fn to_le_bytes(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        for (chunk, v) in out.chunks_exact_mut(4).zip([self.x, self.y, self.heading]) {
            chunk.copy_from_slice(&(v as f32).to_le_bytes());
        }
        out
    }

    /// Inverse of [`Telemetry::to_le_bytes`].
    pub fn from_le_bytes(bytes: [u8; 12], timestamp: f64) -> Self {
        let f = |i: usize| {
            f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]) as f64
        };
        Self::new(f(0), f(4), f(8), timestamp)
    }
}

/// Same line format the robot firmware logs: `[Tel] X: … Y: … O: …`.
impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Tel] X: {:.3} Y: {:.3} O: {:.3}",
            self.x, self.y, self.heading
        )
    }
}
