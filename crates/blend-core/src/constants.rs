// Shared tuning defaults used by the evaluator, the sink and the rig host.

// Forward-axis falloff (degrees): full weight at or below MIN, none at or above MAX
pub const DEFAULT_MIN_ANGLE_FWD: f32 = 10.0;
pub const DEFAULT_MAX_ANGLE_FWD: f32 = 30.0;

// Up-axis falloff (degrees); roll tolerance is looser than facing tolerance
pub const DEFAULT_MIN_ANGLE_UP: f32 = 30.0;
pub const DEFAULT_MAX_ANGLE_UP: f32 = 60.0;

// Change gate for slot writes; only suppresses repeats of the same value
pub const DEFAULT_WEIGHT_EPSILON: f32 = f32::EPSILON;

// Angular distance between two directions never leaves this range
pub const MAX_ANGLE_DEG: f32 = 180.0;

// Default lookup-table resolution when baking a curve
pub const DEFAULT_LUT_SAMPLES: usize = 64;
