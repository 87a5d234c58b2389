// Host-side tests for the rig: registration, late-phase ticking and the
// cross-fade between neighbouring viewpoints.

use std::sync::Arc;

use blend_core::*;
use glam::{Quat, Vec3};

const RADIUS: f32 = 3.0;

/// Viewpoint on a circle around the origin, facing outwards at `yaw_deg`.
fn viewpoint(yaw_deg: f32) -> OrientationFrame {
    let yaw = yaw_deg.to_radians();
    OrientationFrame::new(
        Vec3::new(yaw.sin(), 0.0, -yaw.cos()) * RADIUS,
        Quat::from_rotation_y(-yaw),
    )
}

fn tracked(yaw_deg: f32, roll_deg: f32) -> OrientationFrame {
    OrientationFrame::from_rotation(
        Quat::from_rotation_y(-yaw_deg.to_radians()) * Quat::from_rotation_z(roll_deg.to_radians()),
    )
}

fn wide_config() -> ViewpointConfig {
    let th = AngleThresholds::new(0.0, 50.0, 0.0, 45.0).unwrap();
    ViewpointConfig::new(th).with_curve(Linear)
}

fn three_way_rig(tracked_yaw: f32) -> ViewpointRig {
    RigBuilder::new(tracked(tracked_yaw, 0.0))
        .viewpoints([viewpoint(0.0), viewpoint(60.0), viewpoint(180.0)], &wide_config())
        .build()
}

/// Counts slot writes made by a single weighter.
#[derive(Default)]
struct CountingSlots {
    weight: f32,
    writes: usize,
}

impl ConstraintSources for CountingSlots {
    fn source_count(&self) -> usize {
        1
    }

    fn source_weight(&self, index: usize) -> Option<f32> {
        (index == 0).then_some(self.weight)
    }

    fn set_source_weight(&mut self, index: usize, weight: f32) -> Result<(), BlendError> {
        if index != 0 {
            return Err(BlendError::SlotOutOfRange { index, len: 1 });
        }
        self.weight = weight;
        self.writes += 1;
        Ok(())
    }
}

#[test]
fn viewpoint_helper_faces_outwards() {
    let vp = viewpoint(90.0);
    assert!((vp.forward() - Vec3::X).length() < 1e-5);
    assert!((vp.position.normalize() - Vec3::X).length() < 1e-5);
}

#[test]
fn builder_assigns_slots_in_order() {
    let rig = three_way_rig(0.0);
    let ids = rig.viewpoint_ids();
    assert_eq!(ids.len(), 3);
    assert_eq!(rig.len(), 3);
    for (slot, id) in ids.iter().enumerate() {
        assert_eq!(rig.slot_of(*id), Some(slot));
    }
    assert_eq!(rig.constraint().source_count(), 3);
    assert_eq!(rig.constraint().sources()[1].position, viewpoint(60.0).position);
}

#[test]
fn aligned_viewpoint_takes_full_weight() {
    let mut rig = three_way_rig(0.0);
    let ids = rig.viewpoint_ids();
    let blended = rig.tick().unwrap().unwrap();

    assert!((rig.current_weight(ids[0]).unwrap() - 1.0).abs() < 1e-5);
    assert_eq!(rig.current_weight(ids[1]), Some(0.0));
    assert_eq!(rig.current_weight(ids[2]), Some(0.0));
    assert!((blended - viewpoint(0.0).position).length() < 1e-4);
    assert_eq!(rig.dominant().map(|(id, _)| id), Some(ids[0]));
}

#[test]
fn halfway_between_neighbours_cross_fades_evenly() {
    let mut rig = three_way_rig(30.0);
    let ids = rig.viewpoint_ids();
    let blended = rig.tick().unwrap().unwrap();

    let w0 = rig.current_weight(ids[0]).unwrap();
    let w1 = rig.current_weight(ids[1]).unwrap();
    // 30 degrees into a 0..50 band on both sides
    assert!((w0 - 0.4).abs() < 1e-4, "w0 = {w0}");
    assert!((w1 - 0.4).abs() < 1e-4, "w1 = {w1}");
    assert_eq!(rig.current_weight(ids[2]), Some(0.0));

    let expected = (viewpoint(0.0).position + viewpoint(60.0).position) * 0.5;
    assert!((blended - expected).length() < 1e-3, "blended {blended:?}");
}

#[test]
fn weight_follows_the_tracked_frame_across_ticks() {
    let mut rig = three_way_rig(0.0);
    let ids = rig.viewpoint_ids();
    let mut prev_w0 = f32::INFINITY;
    let mut prev_w1 = f32::NEG_INFINITY;
    for step in 0..=12 {
        rig.set_tracked(tracked(step as f32 * 5.0, 0.0));
        rig.tick().unwrap();
        let w0 = rig.current_weight(ids[0]).unwrap();
        let w1 = rig.current_weight(ids[1]).unwrap();
        assert!(w0 <= prev_w0 + 1e-5, "w0 rose at step {step}");
        assert!(w1 >= prev_w1 - 1e-5, "w1 fell at step {step}");
        prev_w0 = w0;
        prev_w1 = w1;
    }
    assert!(prev_w0 < 1e-4);
    assert!((prev_w1 - 1.0).abs() < 1e-4);
}

#[test]
fn rolling_the_tracked_frame_fades_everything_out() {
    let mut rig = three_way_rig(0.0);
    rig.set_tracked(tracked(0.0, 90.0));
    assert_eq!(rig.tick().unwrap(), None);
    assert_eq!(rig.dominant(), None);
    assert_eq!(rig.constraint().total_weight(), 0.0);
}

#[test]
fn unregister_shifts_slots_and_keeps_weights_consistent() {
    let mut rig = three_way_rig(60.0);
    let ids = rig.viewpoint_ids();
    rig.tick().unwrap();

    rig.unregister(ids[0]).unwrap();
    assert_eq!(rig.len(), 2);
    assert_eq!(rig.slot_of(ids[0]), None);
    assert_eq!(rig.slot_of(ids[1]), Some(0));
    assert_eq!(rig.slot_of(ids[2]), Some(1));
    assert_eq!(rig.constraint().source_count(), 2);

    rig.set_tracked(tracked(180.0, 0.0));
    rig.tick().unwrap();
    for id in [ids[1], ids[2]] {
        let slot = rig.slot_of(id).unwrap();
        assert_eq!(
            rig.constraint().source_weight(slot),
            rig.current_weight(id),
            "slot {slot} out of sync for {id}"
        );
    }
    assert_eq!(rig.dominant().map(|(id, _)| id), Some(ids[2]));
}

#[test]
fn unknown_viewpoints_are_reported() {
    let mut rig = three_way_rig(0.0);
    let id = rig.viewpoint_ids()[1];
    rig.unregister(id).unwrap();
    assert_eq!(rig.unregister(id), Err(BlendError::UnknownViewpoint(id)));
    assert_eq!(
        rig.set_viewpoint_frame(id, viewpoint(10.0)),
        Err(BlendError::UnknownViewpoint(id))
    );
    assert_eq!(rig.current_weight(id), None);
}

#[test]
fn moving_a_viewpoint_moves_its_source() {
    let mut rig = three_way_rig(0.0);
    let id = rig.viewpoint_ids()[0];
    let moved = OrientationFrame::new(Vec3::new(0.0, 2.0, -5.0), viewpoint(0.0).rotation);
    rig.set_viewpoint_frame(id, moved).unwrap();
    assert_eq!(rig.viewpoint_frame(id), Some(&moved));
    let blended = rig.tick().unwrap().unwrap();
    assert!((blended - moved.position).length() < 1e-4);
}

#[test]
fn registering_after_build_appends_a_slot() {
    let mut rig = three_way_rig(0.0);
    let id = rig.register(viewpoint(270.0), ViewpointConfig::default());
    assert_eq!(rig.slot_of(id), Some(3));
    assert!(!rig.is_empty());
    assert_eq!(rig.viewpoint_ids().last(), Some(&id));
}

#[test]
fn dominant_prefers_earlier_registration_on_ties() {
    let mut rig = RigBuilder::new(tracked(0.0, 0.0))
        .viewpoints([viewpoint(0.0), viewpoint(0.0)], &wide_config())
        .build();
    rig.tick().unwrap();
    let ids = rig.viewpoint_ids();
    assert_eq!(rig.dominant().map(|(id, _)| id), Some(ids[0]));
}

#[test]
fn weighter_skips_writes_when_nothing_moved() {
    let mut weighter = ViewpointWeighter::new(0, wide_config());
    let mut slots = CountingSlots::default();
    let reference = viewpoint(0.0);
    let head = tracked(20.0, 0.0);

    for _ in 0..5 {
        weighter.tick(&head, &reference, &mut slots).unwrap();
    }
    assert_eq!(slots.writes, 1);
    assert!((slots.weight - weighter.current_weight()).abs() < f32::EPSILON);

    weighter.tick(&tracked(40.0, 0.0), &reference, &mut slots).unwrap();
    assert_eq!(slots.writes, 2);
}

#[test]
fn weighter_breakdown_matches_free_function() {
    let config = wide_config();
    let weighter = ViewpointWeighter::new(0, config.clone());
    let reference = viewpoint(0.0);
    let head = tracked(25.0, 10.0);
    let via_weighter = weighter.evaluate(&head, &reference);
    let direct = evaluate_frames(&head, &reference, &config.thresholds, &Linear);
    assert_eq!(via_weighter, direct);
    assert!((via_weighter.angle_fwd - 25.0).abs() < 1e-3);
}

#[test]
fn default_config_uses_default_thresholds_and_epsilon() {
    let config = ViewpointConfig::default();
    assert_eq!(config.thresholds, AngleThresholds::default());
    assert_eq!(config.epsilon, DEFAULT_WEIGHT_EPSILON);
    // Default curve is an ease-in-out over [0, 1]
    assert_eq!(config.curve.evaluate(0.0), 0.0);
    assert_eq!(config.curve.evaluate(1.0), 1.0);
    assert!(config.curve.evaluate(0.25) < 0.25);
}

#[test]
fn viewpoints_can_share_one_curve() {
    let shared: SharedCurve = Arc::new(|t: f32| t * t);
    let config = ViewpointConfig::new(AngleThresholds::new(0.0, 50.0, 0.0, 45.0).unwrap())
        .with_shared_curve(Arc::clone(&shared));
    let mut rig = RigBuilder::new(tracked(30.0, 0.0))
        .viewpoint(viewpoint(0.0), config.clone())
        .viewpoint(viewpoint(60.0), config)
        .build();
    // Builder clones plus the local handle
    assert_eq!(Arc::strong_count(&shared), 3);

    rig.tick().unwrap();
    for id in rig.viewpoint_ids() {
        // 0.4 before easing on both sides
        assert!((rig.current_weight(id).unwrap() - 0.16).abs() < 1e-4);
    }
}

#[test]
fn weighter_keeps_its_config() {
    let config = wide_config().with_epsilon(0.01);
    let weighter = ViewpointWeighter::new(2, config);
    assert_eq!(weighter.index(), 2);
    assert_eq!(weighter.config().epsilon, 0.01);
    assert_eq!(weighter.config().thresholds.forward.max(), 50.0);
    assert_eq!(weighter.config().curve.evaluate(0.3), 0.3);
}

#[test]
fn non_finite_epsilon_falls_back_to_default() {
    assert_eq!(
        wide_config().with_epsilon(f32::NAN).epsilon,
        DEFAULT_WEIGHT_EPSILON
    );
    assert_eq!(wide_config().with_epsilon(-0.5).epsilon, 0.5);

    // A NaN written straight into the field is caught by the sink
    let mut config = wide_config();
    config.epsilon = f32::NAN;
    let mut weighter = ViewpointWeighter::new(0, config);
    let mut slots = CountingSlots::default();
    for _ in 0..3 {
        weighter
            .tick(&tracked(20.0, 0.0), &viewpoint(0.0), &mut slots)
            .unwrap();
    }
    assert_eq!(slots.writes, 1);
}

#[test]
fn set_tracked_replaces_the_tracked_frame() {
    let mut rig = three_way_rig(0.0);
    assert_eq!(rig.tracked(), &tracked(0.0, 0.0));
    let moved = tracked(45.0, 10.0);
    rig.set_tracked(moved);
    assert_eq!(rig.tracked(), &moved);
}

#[test]
fn unregister_keeps_viewpoints_and_slots_in_step() {
    let mut rig = three_way_rig(0.0);
    let ids = rig.viewpoint_ids();
    for (removed, id) in ids.iter().enumerate() {
        rig.unregister(*id).unwrap();
        assert_eq!(rig.len(), ids.len() - removed - 1);
        assert_eq!(rig.constraint().source_count(), rig.len());
    }
    assert!(rig.is_empty());
    assert_eq!(rig.tick().unwrap(), None);
}

#[test]
fn ids_are_never_reused() {
    let mut rig = three_way_rig(0.0);
    let before = rig.viewpoint_ids();
    let last = *before.last().unwrap();
    rig.unregister(last).unwrap();
    let fresh = rig.register(viewpoint(90.0), wide_config());
    assert_ne!(fresh, last);
    assert!(fresh > last);
    assert_eq!(rig.slot_of(fresh), Some(2));
}
