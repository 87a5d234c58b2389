//! Weighted-average position constraint fed by viewpoint sources.

use glam::Vec3;
use smallvec::SmallVec;

use crate::error::{BlendError, Result};

/// Write access to indexed source weights; the seam the sink writes through.
pub trait ConstraintSources {
    fn source_count(&self) -> usize;
    fn source_weight(&self, index: usize) -> Option<f32>;
    fn set_source_weight(&mut self, index: usize, weight: f32) -> Result<()>;
}

/// One contributor to the blended position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SourceWeight {
    pub position: Vec3,
    pub weight: f32,
}

/// Blends source positions by weight. Weights are not required to sum to 1;
/// they are normalized when the position is read.
#[derive(Clone, Debug, Default)]
pub struct PositionConstraint {
    sources: SmallVec<[SourceWeight; 4]>,
}

impl PositionConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source with zero weight and returns its slot index.
    pub fn add_source(&mut self, position: Vec3) -> usize {
        self.sources.push(SourceWeight {
            position,
            weight: 0.0,
        });
        self.sources.len() - 1
    }

    /// Removes a slot; every later slot moves down by one.
    pub fn remove_source(&mut self, index: usize) -> Result<SourceWeight> {
        let len = self.sources.len();
        if index >= len {
            return Err(BlendError::SlotOutOfRange { index, len });
        }
        Ok(self.sources.remove(index))
    }

    pub fn set_source_position(&mut self, index: usize, position: Vec3) -> Result<()> {
        let len = self.sources.len();
        let source = self
            .sources
            .get_mut(index)
            .ok_or(BlendError::SlotOutOfRange { index, len })?;
        source.position = position;
        Ok(())
    }

    pub fn sources(&self) -> &[SourceWeight] {
        &self.sources
    }

    pub fn total_weight(&self) -> f32 {
        self.sources.iter().map(|s| s.weight.max(0.0)).sum()
    }

    /// Weight-normalized average of the source positions, `None` while no
    /// source carries any weight. Negative weights count as zero.
    pub fn blended_position(&self) -> Option<Vec3> {
        let total = self.total_weight();
        if total <= 0.0 {
            return None;
        }
        let sum = self
            .sources
            .iter()
            .fold(Vec3::ZERO, |acc, s| acc + s.position * s.weight.max(0.0));
        Some(sum / total)
    }
}

impl ConstraintSources for PositionConstraint {
    fn source_count(&self) -> usize {
        self.sources.len()
    }

    fn source_weight(&self, index: usize) -> Option<f32> {
        self.sources.get(index).map(|s| s.weight)
    }

    fn set_source_weight(&mut self, index: usize, weight: f32) -> Result<()> {
        let len = self.sources.len();
        let source = self
            .sources
            .get_mut(index)
            .ok_or(BlendError::SlotOutOfRange { index, len })?;
        source.weight = weight;
        Ok(())
    }
}
