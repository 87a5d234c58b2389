use std::fmt;

use thiserror::Error;

use crate::rig::ViewpointId;

/// Which orientation axis a threshold belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Forward,
    Up,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Forward => f.write_str("forward"),
            Axis::Up => f.write_str("up"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BlendError {
    #[error("{axis} angle range is inverted or empty: min {min} must be below max {max}")]
    InvertedRange { axis: Axis, min: f32, max: f32 },

    #[error("{axis} angle threshold is not a finite number")]
    NonFiniteThreshold { axis: Axis },

    #[error("curve needs at least one control point")]
    EmptyCurve,

    #[error("curve control point {index} is not after the previous one")]
    UnsortedCurve { index: usize },

    #[error("curve contains a non-finite control value")]
    NonFiniteCurve,

    #[error("lookup table needs at least 2 samples, got {got}")]
    TooFewSamples { got: usize },

    #[error("constraint slot {index} out of range (constraint has {len} sources)")]
    SlotOutOfRange { index: usize, len: usize },

    #[error("no viewpoint registered as {0}")]
    UnknownViewpoint(ViewpointId),

    #[error("cannot build an orientation from a zero or parallel look direction")]
    DegenerateFrame,
}

pub type Result<T> = std::result::Result<T, BlendError>;
