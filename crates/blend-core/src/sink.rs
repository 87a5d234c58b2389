use crate::constants::DEFAULT_WEIGHT_EPSILON;
use crate::constraint::ConstraintSources;
use crate::error::Result;

/// Forwards evaluated weights into one constraint slot, skipping writes that
/// would not change the stored value by more than `epsilon`.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceWeightSink {
    index: usize,
    epsilon: f32,
    last_weight: Option<f32>,
}

impl SourceWeightSink {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            epsilon: DEFAULT_WEIGHT_EPSILON,
            last_weight: None,
        }
    }

    /// Negative values count by magnitude; non-finite ones fall back to
    /// [`DEFAULT_WEIGHT_EPSILON`].
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = if epsilon.is_finite() {
            epsilon.abs()
        } else {
            DEFAULT_WEIGHT_EPSILON
        };
        self
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Last weight written into the slot; 0 before the first write.
    #[inline]
    pub fn current_weight(&self) -> f32 {
        self.last_weight.unwrap_or(0.0)
    }

    /// Point the sink at a different slot, e.g. after an earlier slot was
    /// removed from the constraint.
    pub fn reindex(&mut self, index: usize) {
        self.index = index;
    }

    /// Forget the last written value so the next `apply` always writes.
    pub fn reset(&mut self) {
        self.last_weight = None;
    }

    /// Returns whether the slot was written.
    pub fn apply<C>(&mut self, weight: f32, target: &mut C) -> Result<bool>
    where
        C: ConstraintSources + ?Sized,
    {
        if let Some(last) = self.last_weight {
            if (weight - last).abs() <= self.epsilon {
                return Ok(false);
            }
        }
        target.set_source_weight(self.index, weight)?;
        self.last_weight = Some(weight);
        log::trace!("slot {} weight -> {weight:.4}", self.index);
        Ok(true)
    }
}
