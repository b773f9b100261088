//! Point-to-layout matching.
//!
//! Detected dots arrive unordered. The matcher recovers which dot is which
//! marker point from the structure alone: convex hull ring, center of the
//! ring, radial points pointing at specific hull points, and one "lonely"
//! hull point that fixes the rotation. A RANSAC homography then checks the
//! whole assignment.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::{MatchError, MatchErrorKind};
pub use params::MatchParams;
pub use pipeline::PatternMatcher;
pub use result::{Correspondence, MatchResult};
