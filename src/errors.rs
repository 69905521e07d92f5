//! Validation and synthesis errors

use crate::float_types::Real;

/// All the ways a gear synthesis can fail.
///
/// Invalid configuration is reported before any curve work begins; geometric
/// impossibility during synthesis propagates synchronously with no retry.
/// Precision edge cases (near-zero chords, near-zero turns) are not errors;
/// they are normalized silently by the path recorder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GearError {
    /// Fewer than four teeth never form a valid conjugate profile.
    #[error("a gear needs at least 4 teeth, got {0}")]
    TooFewTeeth(u32),
    /// An internal gear must have strictly more teeth than its pinion.
    #[error("internal gear must have more teeth than its pinion ({gear} vs {pinion})")]
    InternalTeethOrder { gear: u32, pinion: u32 },
    /// `size` must be finite and positive regardless of sizing convention.
    #[error("size must be finite and positive, got {0}")]
    InvalidSize(Real),
    /// A root fillet construction could not be completed.
    #[error("fillet construction failed: {0}")]
    Fillet(String),
    /// The rack envelope produced no usable tooth boundary.
    #[error("envelope synthesis failed: {0}")]
    Envelope(String),
}
