//! Oriented frames sampled from the host scene once per tick.
//!
//! Frames follow glam's right-handed convention: forward is the rotated
//! `-Z` axis, up the rotated `+Y` and right the rotated `+X`. The core only
//! ever reads forward and up; frames are never mutated by the evaluator.

use glam::{Mat3, Quat, Vec3};

use crate::error::{BlendError, Result};

/// A position plus an orthonormal basis expressed as a rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationFrame {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for OrientationFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl OrientationFrame {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation: rotation.normalize(),
        }
    }

    /// Frame at the origin with the given rotation.
    pub fn from_rotation(rotation: Quat) -> Self {
        Self::new(Vec3::ZERO, rotation)
    }

    /// Frame at `eye` facing `target`, rolled so its up axis is as close to
    /// `up_hint` as the facing allows.
    pub fn looking_at(eye: Vec3, target: Vec3, up_hint: Vec3) -> Result<Self> {
        let forward = (target - eye)
            .try_normalize()
            .ok_or(BlendError::DegenerateFrame)?;
        let right = forward
            .cross(up_hint)
            .try_normalize()
            .ok_or(BlendError::DegenerateFrame)?;
        let up = right.cross(forward);
        let basis = Mat3::from_cols(right, up, -forward);
        Ok(Self {
            position: eye,
            rotation: Quat::from_mat3(&basis).normalize(),
        })
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Same position, extra rotation applied in world space.
    pub fn rotated(&self, delta: Quat) -> Self {
        Self::new(self.position, delta * self.rotation)
    }
}
