//! Identity-preserving matching of detected marker dots.
//!
//! [`ReferenceLayout`] describes the physical 16-point marker,
//! [`PatternMatcher`] assigns every unordered detection to its layout slot
//! and validates the assignment with a robust homography.

mod draw;
mod layout;
mod matcher;

pub use draw::draw_correspondence;
pub use layout::{
    LayoutError, ReferenceLayout, LONELY_OFFSET, RADIAL_POINTS, RADIAL_PREDICTION_SCALE,
};
pub use matcher::{
    Correspondence, MatchError, MatchErrorKind, MatchParams, MatchResult, PatternMatcher,
};
