//! Alignment weight for one viewpoint against a reference orientation.
//!
//! Two angular deviations are measured: how far the forward directions
//! disagree and how far the up directions disagree. Each is mapped onto an
//! alignment factor through a reversed, clamped inverse lerp (`min` angle or
//! better gives 1, `max` angle or worse gives 0). The factors are multiplied,
//! so a viewpoint only gains influence when both facing and roll agree, and
//! the easing curve is applied to the product.

use glam::Vec3;

use crate::constants::{
    DEFAULT_MAX_ANGLE_FWD, DEFAULT_MAX_ANGLE_UP, DEFAULT_MIN_ANGLE_FWD, DEFAULT_MIN_ANGLE_UP,
};
use crate::curve::Curve;
use crate::error::{Axis, BlendError, Result};
use crate::frame::OrientationFrame;

/// Falloff band for one axis, in degrees. `min` is always below `max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleRange {
    min: f32,
    max: f32,
}

impl AngleRange {
    pub fn new(axis: Axis, min: f32, max: f32) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(BlendError::NonFiniteThreshold { axis });
        }
        if min >= max {
            return Err(BlendError::InvertedRange { axis, min, max });
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn min(&self) -> f32 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Alignment factor for an angle: 1 at or below `min`, 0 at or above `max`.
    #[inline]
    pub fn factor(&self, angle_deg: f32) -> f32 {
        axis_factor(angle_deg, self.min, self.max)
    }
}

/// Forward and up falloff bands for one viewpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleThresholds {
    pub forward: AngleRange,
    pub up: AngleRange,
}

impl Default for AngleThresholds {
    fn default() -> Self {
        Self {
            forward: AngleRange {
                min: DEFAULT_MIN_ANGLE_FWD,
                max: DEFAULT_MAX_ANGLE_FWD,
            },
            up: AngleRange {
                min: DEFAULT_MIN_ANGLE_UP,
                max: DEFAULT_MAX_ANGLE_UP,
            },
        }
    }
}

impl AngleThresholds {
    /// Validates both bands; an inverted band is rejected rather than
    /// silently producing a weight that grows with misalignment.
    pub fn new(min_fwd: f32, max_fwd: f32, min_up: f32, max_up: f32) -> Result<Self> {
        Ok(Self {
            forward: AngleRange::new(Axis::Forward, min_fwd, max_fwd)?,
            up: AngleRange::new(Axis::Up, min_up, max_up)?,
        })
    }
}

/// Everything computed during one evaluation. Only `weight` is consumed by
/// the sink; the rest is kept for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeightBreakdown {
    pub angle_fwd: f32,
    pub angle_up: f32,
    pub t_fwd: f32,
    pub t_up: f32,
    pub raw: f32,
    pub weight: f32,
}

/// Unsigned angle between two directions in degrees, in `[0, 180]`.
///
/// Inputs must be non-zero; they do not need to be normalized. Identical
/// directions give exactly 0.
#[inline]
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    debug_assert!(
        a.length_squared() > 0.0 && b.length_squared() > 0.0,
        "angle_between called with a zero-length vector"
    );
    let sin = a.cross(b).length();
    let cos = a.dot(b);
    sin.atan2(cos).to_degrees()
}

/// Position of `v` between `a` and `b`, clamped to `[0, 1]`.
///
/// `a` may be greater than `b`; the mapping then runs backwards. When the
/// bounds coincide there is no band to interpolate across: the result is 1
/// exactly at the bound and 0 anywhere else.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    let span = b - a;
    if span == 0.0 {
        return if v == b { 1.0 } else { 0.0 };
    }
    ((v - a) / span).clamp(0.0, 1.0)
}

/// Alignment factor for a single axis: `inverse_lerp(max, min, angle)`.
#[inline]
pub fn axis_factor(angle_deg: f32, min_deg: f32, max_deg: f32) -> f32 {
    inverse_lerp(max_deg, min_deg, angle_deg)
}

/// Weight from already-measured angles.
pub fn evaluate_angles(
    angle_fwd: f32,
    angle_up: f32,
    thresholds: &AngleThresholds,
    curve: &dyn Curve,
) -> WeightBreakdown {
    let t_fwd = thresholds.forward.factor(angle_fwd);
    let t_up = thresholds.up.factor(angle_up);
    let raw = t_fwd * t_up;
    WeightBreakdown {
        angle_fwd,
        angle_up,
        t_fwd,
        t_up,
        raw,
        weight: curve.evaluate(raw),
    }
}

/// Weight of a viewpoint whose basis is `(self_forward, self_up)` against a
/// reference basis `(ref_forward, ref_up)`.
///
/// The result is in `[0, 1]` whenever the curve maps `[0, 1]` into `[0, 1]`;
/// it is not clamped afterwards.
pub fn evaluate(
    self_forward: Vec3,
    self_up: Vec3,
    ref_forward: Vec3,
    ref_up: Vec3,
    thresholds: &AngleThresholds,
    curve: &dyn Curve,
) -> f32 {
    evaluate_detailed(self_forward, self_up, ref_forward, ref_up, thresholds, curve).weight
}

pub fn evaluate_detailed(
    self_forward: Vec3,
    self_up: Vec3,
    ref_forward: Vec3,
    ref_up: Vec3,
    thresholds: &AngleThresholds,
    curve: &dyn Curve,
) -> WeightBreakdown {
    evaluate_angles(
        angle_between(self_forward, ref_forward),
        angle_between(self_up, ref_up),
        thresholds,
        curve,
    )
}

pub fn evaluate_frames(
    this: &OrientationFrame,
    reference: &OrientationFrame,
    thresholds: &AngleThresholds,
    curve: &dyn Curve,
) -> WeightBreakdown {
    evaluate_detailed(
        this.forward(),
        this.up(),
        reference.forward(),
        reference.up(),
        thresholds,
        curve,
    )
}
