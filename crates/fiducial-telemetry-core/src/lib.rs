//! Core types and utilities for fiducial marker tracking.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete image type: blob extraction lives in
//! `fiducial-telemetry-blobs`, everything here works on points.

mod camera;
mod geometry;
mod homography;
mod logger;
mod pose;
mod ransac;

pub use camera::{
    CameraCalibration, CameraError, CameraModel, Distortion, Intrinsics, UndistortConfig,
};
pub use geometry::{
    convex_hull_indices, find_in_proximity, polygon_centroid, polygon_moments, PolygonMoments,
};
pub use homography::{
    estimate_homography, fit_homography_ransac, homography_from_4pt, Homography, HomographyFit,
    RansacParams,
};
pub use pose::RawPose;
pub use ransac::sample_indices;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

/// 2D point type used across the workspace.
pub type Point2 = nalgebra::Point2<f64>;
/// 3D point type used across the workspace.
pub type Point3 = nalgebra::Point3<f64>;
