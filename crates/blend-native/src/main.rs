use std::f32::consts::TAU;

use anyhow::Context;
use glam::{Quat, Vec3};
use instant::Instant;
use rand::prelude::*;

use blend_core::{
    AngleThresholds, KeyframeCurve, LookupTable, OrientationFrame, RigBuilder, ViewpointConfig,
    ViewpointRig,
};

// Simulation timing
const TICK_HZ: f32 = 60.0;
const DEFAULT_TICKS: u32 = 1200;
const LOG_EVERY_TICKS: u32 = 30;

// Tracked frame motion
const ORBIT_DEG_PER_SEC: f32 = 24.0; // yaw sweep of the tracked head
const ROLL_AMPLITUDE_DEG: f32 = 35.0;
const ROLL_HZ: f32 = 0.2;

// Viewpoint layout: evenly spaced around the origin, slightly jittered
const VIEWPOINT_COUNT: usize = 3;
const VIEWPOINT_RADIUS: f32 = 3.0;
const VIEWPOINT_HEIGHT: f32 = 1.6;
const VIEWPOINT_YAW_JITTER_DEG: f32 = 8.0;
const LAYOUT_SEED: u64 = 0x5EED_F00D;

// Falloff bands wide enough that neighbouring viewpoints overlap
const MIN_ANGLE_FWD: f32 = 20.0;
const MAX_ANGLE_FWD: f32 = 90.0;
const MIN_ANGLE_UP: f32 = 15.0;
const MAX_ANGLE_UP: f32 = 45.0;

fn viewpoint_frame(yaw_deg: f32) -> OrientationFrame {
    let yaw = yaw_deg.to_radians();
    let dir = Vec3::new(yaw.sin(), 0.0, -yaw.cos());
    OrientationFrame::new(
        dir * VIEWPOINT_RADIUS + Vec3::Y * VIEWPOINT_HEIGHT,
        Quat::from_rotation_y(-yaw),
    )
}

fn tracked_pose(t_sec: f32) -> OrientationFrame {
    let yaw = (ORBIT_DEG_PER_SEC * t_sec).to_radians();
    let roll = ROLL_AMPLITUDE_DEG.to_radians() * (TAU * ROLL_HZ * t_sec).sin();
    OrientationFrame::new(
        Vec3::Y * VIEWPOINT_HEIGHT,
        Quat::from_rotation_y(-yaw) * Quat::from_rotation_z(roll),
    )
}

fn build_rig(rng: &mut StdRng) -> anyhow::Result<ViewpointRig> {
    let thresholds = AngleThresholds::new(MIN_ANGLE_FWD, MAX_ANGLE_FWD, MIN_ANGLE_UP, MAX_ANGLE_UP)
        .context("invalid demo thresholds")?;
    // Bake the ease curve once; every viewpoint shares the same table
    let curve = LookupTable::bake_default(&KeyframeCurve::default())?;
    let config = ViewpointConfig::new(thresholds).with_curve(curve);

    let spacing = 360.0 / VIEWPOINT_COUNT as f32;
    let frames = (0..VIEWPOINT_COUNT).map(|i| {
        let jitter = rng.gen_range(-VIEWPOINT_YAW_JITTER_DEG..=VIEWPOINT_YAW_JITTER_DEG);
        viewpoint_frame(i as f32 * spacing + jitter)
    });
    Ok(RigBuilder::new(tracked_pose(0.0))
        .viewpoints(frames, &config)
        .build())
}

fn parse_ticks(arg: Option<String>) -> anyhow::Result<u32> {
    match arg {
        Some(s) => s
            .parse::<u32>()
            .with_context(|| format!("tick count must be a positive integer, got {s:?}")),
        None => Ok(DEFAULT_TICKS),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let ticks = parse_ticks(std::env::args().nth(1))?;
    let mut rng = StdRng::seed_from_u64(LAYOUT_SEED);
    let mut rig = build_rig(&mut rng)?;
    let ids = rig.viewpoint_ids();
    log::info!("rig ready with {} viewpoints, running {ticks} ticks", ids.len());

    let dt = 1.0 / TICK_HZ;
    let start = Instant::now();
    let mut last_dominant = None;
    for tick in 0..ticks {
        // Move first, then evaluate once everything for this tick has settled
        rig.set_tracked(tracked_pose(tick as f32 * dt));
        let blended = rig.tick()?;

        let dominant = rig.dominant().map(|(id, _)| id);
        if dominant != last_dominant {
            match dominant {
                Some(id) => log::info!("tick {tick}: {id} now dominant"),
                None => log::info!("tick {tick}: no viewpoint aligned"),
            }
            last_dominant = dominant;
        }
        if tick % LOG_EVERY_TICKS == 0 {
            let weights: Vec<String> = ids
                .iter()
                .map(|id| format!("{:.3}", rig.current_weight(*id).unwrap_or(0.0)))
                .collect();
            match blended {
                Some(p) => log::info!(
                    "tick {tick}: weights [{}] -> position ({:.2}, {:.2}, {:.2})",
                    weights.join(", "),
                    p.x,
                    p.y,
                    p.z
                ),
                None => log::info!("tick {tick}: weights [{}] -> no position", weights.join(", ")),
            }
        }
    }
    log::info!("ran {ticks} ticks in {:?}", start.elapsed());
    Ok(())
}
