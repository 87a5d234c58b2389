//! Host-side wiring: one weighter per viewpoint, all feeding one constraint.
//!
//! Each viewpoint carries a fixed reference orientation. One tracked frame
//! (the "self" frame, typically the head or camera being followed) moves
//! freely; every tick its orientation is compared against each viewpoint's
//! reference and the resulting weights drive a shared position constraint.
//!
//! The rig owns no timer or loop. The host is expected to move the tracked
//! frame for the current tick first and call [`ViewpointRig::tick`]
//! afterwards, so that all orientations sampled during the tick are settled
//! and consistent.

use std::fmt;
use std::sync::Arc;

use fnv::FnvHashMap;
use glam::Vec3;

use crate::constants::DEFAULT_WEIGHT_EPSILON;
use crate::constraint::{ConstraintSources, PositionConstraint};
use crate::curve::{Curve, KeyframeCurve};
use crate::error::{BlendError, Result};
use crate::frame::OrientationFrame;
use crate::sink::SourceWeightSink;
use crate::weight::{evaluate_frames, AngleThresholds, WeightBreakdown};

pub type SharedCurve = Arc<dyn Curve + Send + Sync>;

/// Per-viewpoint settings, fixed at setup time.
#[derive(Clone)]
pub struct ViewpointConfig {
    pub thresholds: AngleThresholds,
    pub curve: SharedCurve,
    pub epsilon: f32,
}

impl Default for ViewpointConfig {
    fn default() -> Self {
        Self {
            thresholds: AngleThresholds::default(),
            curve: Arc::new(KeyframeCurve::default()),
            epsilon: DEFAULT_WEIGHT_EPSILON,
        }
    }
}

impl fmt::Debug for ViewpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewpointConfig")
            .field("thresholds", &self.thresholds)
            .field("epsilon", &self.epsilon)
            .finish_non_exhaustive()
    }
}

impl ViewpointConfig {
    pub fn new(thresholds: AngleThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    pub fn with_curve<C>(mut self, curve: C) -> Self
    where
        C: Curve + Send + Sync + 'static,
    {
        self.curve = Arc::new(curve);
        self
    }

    pub fn with_shared_curve(mut self, curve: SharedCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Non-finite values fall back to [`DEFAULT_WEIGHT_EPSILON`].
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = if epsilon.is_finite() {
            epsilon.abs()
        } else {
            DEFAULT_WEIGHT_EPSILON
        };
        self
    }
}

/// One evaluator bound to one constraint slot.
#[derive(Clone, Debug)]
pub struct ViewpointWeighter {
    config: ViewpointConfig,
    sink: SourceWeightSink,
}

impl ViewpointWeighter {
    pub fn new(index: usize, config: ViewpointConfig) -> Self {
        let sink = SourceWeightSink::new(index).with_epsilon(config.epsilon);
        Self { config, sink }
    }

    pub fn config(&self) -> &ViewpointConfig {
        &self.config
    }

    pub fn index(&self) -> usize {
        self.sink.index()
    }

    pub fn current_weight(&self) -> f32 {
        self.sink.current_weight()
    }

    pub fn evaluate(
        &self,
        tracked: &OrientationFrame,
        reference: &OrientationFrame,
    ) -> WeightBreakdown {
        evaluate_frames(tracked, reference, &self.config.thresholds, &*self.config.curve)
    }

    /// Evaluate and forward the weight into the constraint slot.
    pub fn tick<C>(
        &mut self,
        tracked: &OrientationFrame,
        reference: &OrientationFrame,
        constraint: &mut C,
    ) -> Result<WeightBreakdown>
    where
        C: ConstraintSources + ?Sized,
    {
        let breakdown = self.evaluate(tracked, reference);
        log::trace!(
            "slot {}: fwd {:.2}deg up {:.2}deg -> t_fwd {:.3} t_up {:.3} raw {:.3} weight {:.3}",
            self.sink.index(),
            breakdown.angle_fwd,
            breakdown.angle_up,
            breakdown.t_fwd,
            breakdown.t_up,
            breakdown.raw,
            breakdown.weight,
        );
        self.sink.apply(breakdown.weight, constraint)?;
        Ok(breakdown)
    }

    fn reindex(&mut self, index: usize) {
        self.sink.reindex(index);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewpointId(u64);

impl fmt::Display for ViewpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewpoint#{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct Viewpoint {
    /// Reference orientation; its position is the constraint source.
    frame: OrientationFrame,
    weighter: ViewpointWeighter,
}

/// A tracked frame, a set of candidate viewpoints and the constraint their
/// weights drive.
#[derive(Clone, Debug, Default)]
pub struct ViewpointRig {
    tracked: OrientationFrame,
    constraint: PositionConstraint,
    viewpoints: FnvHashMap<ViewpointId, Viewpoint>,
    next_id: u64,
}

impl ViewpointRig {
    pub fn new(tracked: OrientationFrame) -> Self {
        Self {
            tracked,
            ..Self::default()
        }
    }

    /// Adds a constraint slot for the viewpoint and binds a weighter to it.
    pub fn register(&mut self, frame: OrientationFrame, config: ViewpointConfig) -> ViewpointId {
        let id = ViewpointId(self.next_id);
        self.next_id += 1;
        let index = self.constraint.add_source(frame.position);
        log::debug!("registered {id} at slot {index} ({:?})", config.thresholds);
        self.viewpoints.insert(
            id,
            Viewpoint {
                frame,
                weighter: ViewpointWeighter::new(index, config),
            },
        );
        id
    }

    /// Removes the viewpoint and its slot. Later slots shift down and their
    /// weighters follow.
    pub fn unregister(&mut self, id: ViewpointId) -> Result<()> {
        let index = self
            .viewpoints
            .get(&id)
            .map(|vp| vp.weighter.index())
            .ok_or(BlendError::UnknownViewpoint(id))?;
        self.constraint.remove_source(index)?;
        self.viewpoints.remove(&id);
        for vp in self.viewpoints.values_mut() {
            let i = vp.weighter.index();
            if i > index {
                vp.weighter.reindex(i - 1);
            }
        }
        log::debug!("unregistered {id} from slot {index}");
        Ok(())
    }

    pub fn set_viewpoint_frame(&mut self, id: ViewpointId, frame: OrientationFrame) -> Result<()> {
        let vp = self
            .viewpoints
            .get_mut(&id)
            .ok_or(BlendError::UnknownViewpoint(id))?;
        vp.frame = frame;
        self.constraint
            .set_source_position(vp.weighter.index(), frame.position)
    }

    pub fn set_tracked(&mut self, tracked: OrientationFrame) {
        self.tracked = tracked;
    }

    pub fn tracked(&self) -> &OrientationFrame {
        &self.tracked
    }

    pub fn viewpoint_frame(&self, id: ViewpointId) -> Option<&OrientationFrame> {
        self.viewpoints.get(&id).map(|vp| &vp.frame)
    }

    pub fn constraint(&self) -> &PositionConstraint {
        &self.constraint
    }

    pub fn len(&self) -> usize {
        self.viewpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewpoints.is_empty()
    }

    /// Registered ids in registration order.
    pub fn viewpoint_ids(&self) -> Vec<ViewpointId> {
        let mut ids: Vec<_> = self.viewpoints.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn slot_of(&self, id: ViewpointId) -> Option<usize> {
        self.viewpoints.get(&id).map(|vp| vp.weighter.index())
    }

    pub fn current_weight(&self, id: ViewpointId) -> Option<f32> {
        self.viewpoints.get(&id).map(|vp| vp.weighter.current_weight())
    }

    /// Viewpoint with the highest current weight; ties go to the earliest
    /// registered. `None` when nothing carries weight.
    pub fn dominant(&self) -> Option<(ViewpointId, f32)> {
        self.viewpoints
            .iter()
            .map(|(id, vp)| (*id, vp.weighter.current_weight()))
            .filter(|(_, w)| *w > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
    }

    /// Late-phase update: evaluate the tracked frame against every
    /// viewpoint, push the weights into the constraint and return the
    /// blended position.
    pub fn tick(&mut self) -> Result<Option<Vec3>> {
        for vp in self.viewpoints.values_mut() {
            vp.weighter
                .tick(&self.tracked, &vp.frame, &mut self.constraint)?;
        }
        Ok(self.constraint.blended_position())
    }
}

/// Authoring-side helper that assembles a rig from plain values.
#[derive(Clone, Debug, Default)]
pub struct RigBuilder {
    tracked: OrientationFrame,
    viewpoints: Vec<(OrientationFrame, ViewpointConfig)>,
}

impl RigBuilder {
    pub fn new(tracked: OrientationFrame) -> Self {
        Self {
            tracked,
            viewpoints: Vec::new(),
        }
    }

    pub fn viewpoint(mut self, frame: OrientationFrame, config: ViewpointConfig) -> Self {
        self.viewpoints.push((frame, config));
        self
    }

    /// Same config for every frame.
    pub fn viewpoints<I>(mut self, frames: I, config: &ViewpointConfig) -> Self
    where
        I: IntoIterator<Item = OrientationFrame>,
    {
        self.viewpoints
            .extend(frames.into_iter().map(|f| (f, config.clone())));
        self
    }

    /// Slots are assigned in the order viewpoints were added.
    pub fn build(self) -> ViewpointRig {
        let mut rig = ViewpointRig::new(self.tracked);
        for (frame, config) in self.viewpoints {
            rig.register(frame, config);
        }
        rig
    }
}
