//! Easing curves applied to the combined alignment factor.
//!
//! The evaluator treats a curve as a black box mapping `[0, 1]` onto (usually)
//! `[0, 1]`. Nothing here enforces monotonicity; authors are free to shape the
//! response however they like. All implementations clamp outside their
//! defined domain instead of extrapolating; a NaN input maps to the start
//! of the domain.

use glam::Vec2;
use smallvec::SmallVec;

use crate::constants::DEFAULT_LUT_SAMPLES;
use crate::error::{BlendError, Result};

/// A shaping function evaluated once per tick on the raw weight.
pub trait Curve {
    fn evaluate(&self, t: f32) -> f32;
}

impl<F> Curve for F
where
    F: Fn(f32) -> f32,
{
    #[inline]
    fn evaluate(&self, t: f32) -> f32 {
        self(t)
    }
}

/// Identity easing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Linear;

impl Curve for Linear {
    #[inline]
    fn evaluate(&self, t: f32) -> f32 {
        t
    }
}

/// Straight segments between sorted control points.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecewiseLinear {
    points: SmallVec<[Vec2; 8]>,
}

impl PiecewiseLinear {
    /// Points are `(input, output)` pairs with strictly increasing inputs.
    pub fn new<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let points: SmallVec<[Vec2; 8]> = points.into_iter().collect();
        if points.is_empty() {
            return Err(BlendError::EmptyCurve);
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(BlendError::NonFiniteCurve);
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[1].x <= pair[0].x {
                return Err(BlendError::UnsortedCurve { index: i + 1 });
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

impl Curve for PiecewiseLinear {
    fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return t,
        };
        if t.is_nan() || t <= first.x {
            return first.y;
        }
        if t >= last.x {
            return last.y;
        }
        // first point whose input is past t; guaranteed to be in 1..len
        let hi = self.points.partition_point(|p| p.x <= t);
        let a = self.points[hi - 1];
        let b = self.points[hi];
        let s = (t - a.x) / (b.x - a.x);
        a.y + (b.y - a.y) * s
    }
}

/// How a keyframe segment is interpolated towards the next key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Cubic Hermite using the keys' tangents.
    #[default]
    Smooth,
    /// Straight line, tangents ignored.
    Linear,
    /// Hold this key's value until the next key.
    Constant,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
    /// Applies to the segment leaving this key.
    pub interpolation: Interpolation,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
            interpolation: Interpolation::Smooth,
        }
    }

    pub fn with_tangents(mut self, in_tangent: f32, out_tangent: f32) -> Self {
        self.in_tangent = in_tangent;
        self.out_tangent = out_tangent;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.value.is_finite()
            && self.in_tangent.is_finite()
            && self.out_tangent.is_finite()
    }
}

/// Keyframed curve with per-key tangents, the usual authoring-tool shape.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeCurve {
    keys: Vec<Keyframe>,
}

impl Default for KeyframeCurve {
    fn default() -> Self {
        Self::ease_in_out(0.0, 0.0, 1.0, 1.0)
    }
}

impl KeyframeCurve {
    pub fn new(keys: Vec<Keyframe>) -> Result<Self> {
        if keys.is_empty() {
            return Err(BlendError::EmptyCurve);
        }
        if keys.iter().any(|k| !k.is_finite()) {
            return Err(BlendError::NonFiniteCurve);
        }
        for (i, pair) in keys.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(BlendError::UnsortedCurve { index: i + 1 });
            }
        }
        Ok(Self { keys })
    }

    /// Two keys with flat tangents: slow start, slow finish.
    ///
    /// Falls back to a constant curve at `v0` when `t1 <= t0`.
    pub fn ease_in_out(t0: f32, v0: f32, t1: f32, v1: f32) -> Self {
        if t1 <= t0 {
            return Self::constant(v0);
        }
        Self {
            keys: vec![Keyframe::new(t0, v0), Keyframe::new(t1, v1)],
        }
    }

    /// Two keys joined by a straight Hermite segment.
    pub fn linear(t0: f32, v0: f32, t1: f32, v1: f32) -> Self {
        if t1 <= t0 {
            return Self::constant(v0);
        }
        let slope = (v1 - v0) / (t1 - t0);
        Self {
            keys: vec![
                Keyframe::new(t0, v0).with_tangents(slope, slope),
                Keyframe::new(t1, v1).with_tangents(slope, slope),
            ],
        }
    }

    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, value)],
        }
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }
}

impl Curve for KeyframeCurve {
    fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return t,
        };
        if t.is_nan() || t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }
        let hi = self.keys.partition_point(|k| k.time <= t);
        let k0 = &self.keys[hi - 1];
        let k1 = &self.keys[hi];
        let dt = k1.time - k0.time;
        let s = (t - k0.time) / dt;
        match k0.interpolation {
            Interpolation::Constant => k0.value,
            Interpolation::Linear => k0.value + (k1.value - k0.value) * s,
            Interpolation::Smooth => hermite(
                k0.value,
                k0.out_tangent * dt,
                k1.value,
                k1.in_tangent * dt,
                s,
            ),
        }
    }
}

#[inline]
fn hermite(p0: f32, m0: f32, p1: f32, m1: f32, s: f32) -> f32 {
    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}

/// Evenly spaced samples over `[0, 1]`, linearly interpolated.
#[derive(Clone, Debug, PartialEq)]
pub struct LookupTable {
    samples: Vec<f32>,
}

impl LookupTable {
    pub fn new(samples: Vec<f32>) -> Result<Self> {
        if samples.len() < 2 {
            return Err(BlendError::TooFewSamples { got: samples.len() });
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(BlendError::NonFiniteCurve);
        }
        Ok(Self { samples })
    }

    /// Sample any curve into a table of `count` entries.
    pub fn bake(curve: &dyn Curve, count: usize) -> Result<Self> {
        if count < 2 {
            return Err(BlendError::TooFewSamples { got: count });
        }
        let step = 1.0 / (count - 1) as f32;
        Self::new((0..count).map(|i| curve.evaluate(i as f32 * step)).collect())
    }

    pub fn bake_default(curve: &dyn Curve) -> Result<Self> {
        Self::bake(curve, DEFAULT_LUT_SAMPLES)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl Curve for LookupTable {
    fn evaluate(&self, t: f32) -> f32 {
        let n = self.samples.len();
        if n == 0 {
            return t;
        }
        if t.is_nan() {
            return self.samples[0];
        }
        let last = n - 1;
        let x = t.clamp(0.0, 1.0) * last as f32;
        let i = (x.floor() as usize).min(last);
        if i == last {
            return self.samples[last];
        }
        let frac = x - i as f32;
        self.samples[i] + (self.samples[i + 1] - self.samples[i]) * frac
    }
}
