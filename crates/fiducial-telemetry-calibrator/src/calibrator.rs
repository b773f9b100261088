use crate::{CalibrationParams, RotationUnwrapper, Telemetry};
use fiducial_telemetry_core::RawPose;
use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Observable calibrator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationPhase {
    Calibrating,
    Calibrated,
}

#[derive(Clone, Debug)]
enum State {
    Calibrating {
        window: VecDeque<(Vector3<f64>, Vector3<f64>)>,
    },
    Calibrated {
        base_rotation: Rotation3<f64>,
        base_translation: Vector3<f64>,
    },
}

/// Turns raw per-frame poses into robot-relative telemetry.
///
/// The only stage with cross-frame state. One instance per tracking
/// session; [`TelemetryCalibrator::reset`] starts over.
#[derive(Clone, Debug)]
pub struct TelemetryCalibrator {
    params: CalibrationParams,
    unwrapper: RotationUnwrapper,
    state: State,
}

impl TelemetryCalibrator {
    pub fn new(params: CalibrationParams) -> Self {
        let window = params.window.max(1);
        Self {
            params,
            unwrapper: RotationUnwrapper::new(),
            state: State::Calibrating {
                window: VecDeque::with_capacity(window),
            },
        }
    }

    #[inline]
    pub fn params(&self) -> &CalibrationParams {
        &self.params
    }

    pub fn phase(&self) -> CalibrationPhase {
        match self.state {
            State::Calibrating { .. } => CalibrationPhase::Calibrating,
            State::Calibrated { .. } => CalibrationPhase::Calibrated,
        }
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.phase() == CalibrationPhase::Calibrated
    }

    /// Samples currently held in the settling window (0 once calibrated).
    pub fn samples_collected(&self) -> usize {
        match &self.state {
            State::Calibrating { window } => window.len(),
            State::Calibrated { .. } => 0,
        }
    }

    /// Base pose, once calibrated.
    pub fn base_pose(&self) -> Option<RawPose> {
        match &self.state {
            State::Calibrated {
                base_rotation,
                base_translation,
            } => Some(RawPose::new(base_rotation.scaled_axis(), *base_translation)),
            State::Calibrating { .. } => None,
        }
    }

    /// Drop the base pose and start collecting a new window.
    pub fn reset(&mut self) {
        *self = Self::new(self.params);
    }

    /// Feed one raw pose. Returns telemetry only once calibrated.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip(self, pose), fields(phase = ?self.phase()))
    )]
    pub fn update(&mut self, pose: &RawPose, timestamp: f64) -> Option<Telemetry> {
        match &mut self.state {
            State::Calibrating { window } => {
                let rotation = self.unwrapper.adjust(pose.rotation);
                if window.len() == self.params.window.max(1) {
                    window.pop_front();
                }
                window.push_back((rotation, pose.translation));

                if let Some((base_rotation, base_translation)) = settled(window, &self.params) {
                    log::debug!(
                        "calibrated after a window of {}: base translation {:?}",
                        window.len(),
                        base_translation.as_slice()
                    );
                    self.state = State::Calibrated {
                        base_rotation,
                        base_translation,
                    };
                    self.unwrapper.reset();
                }
                None
            }
            State::Calibrated {
                base_rotation,
                base_translation,
            } => {
                let rb_t = base_rotation.inverse();
                let rel_t = rb_t * (pose.translation - *base_translation);
                let rel_r = (rb_t * pose.rotation_matrix()).scaled_axis();
                let rel_r = self.unwrapper.adjust(rel_r);
                Some(Telemetry::new(rel_t.x, rel_t.y, rel_r.z, timestamp))
            }
        }
    }
}

/// Mean pose of a full window whose per-axis spreads are below the limits.
fn settled(
    window: &VecDeque<(Vector3<f64>, Vector3<f64>)>,
    params: &CalibrationParams,
) -> Option<(Rotation3<f64>, Vector3<f64>)> {
    if window.len() < params.window.max(1) {
        return None;
    }

    let spread = |pick: fn(&(Vector3<f64>, Vector3<f64>)) -> Vector3<f64>| {
        let mut lo = Vector3::repeat(f64::INFINITY);
        let mut hi = Vector3::repeat(f64::NEG_INFINITY);
        for s in window {
            let v = pick(s);
            lo = lo.inf(&v);
            hi = hi.sup(&v);
        }
        hi - lo
    };
    let rot_spread = spread(|s| s.0);
    let pos_spread = spread(|s| s.1);
    let still = pos_spread.iter().all(|&d| d < params.position_spread)
        && rot_spread.iter().all(|&d| d < params.rotation_spread);
    if !still {
        return None;
    }

    let n = window.len() as f64;
    let (rsum, tsum) = window
        .iter()
        .fold((Vector3::<f64>::zeros(), Vector3::<f64>::zeros()), |(r, t), (a, b)| {
            (r + a, t + b)
        });
    Some((Rotation3::from_scaled_axis(rsum / n), tsum / n))
}
