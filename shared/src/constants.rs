use std::time::Duration;

/// Number of fixed physics substeps each rendered frame is divided into.
pub const STEPS_PER_FRAME: u32 = 5;

/// Longest frame delta (seconds) the physics core will integrate in one frame.
///
/// Frame-rate hitches longer than this are simply lost time; integrating them
/// would let the capsule tunnel through thin geometry.
pub const MAX_FRAME_DT: f32 = 0.05;

/// Downward acceleration in meters per second squared (positive value).
pub const GRAVITY: f32 = 5.0;

/// Exponential velocity damping rate (1/s) applied every substep.
pub const DAMPING_RATE: f32 = 4.0;

/// Fraction of the ground damping that still applies while airborne.
pub const AIR_DAMPING_SCALE: f32 = 0.1;

/// Largest impulse (m/s) applied against a steep surface per substep.
pub const MAX_SLIDING_FORCE: f32 = 10.0;

/// Speed cap (m/s) while sliding down steep terrain.
pub const MAX_SLIDING_SPEED: f32 = 5.0;

/// Fraction of `GRAVITY` added as extra downward velocity while sliding.
pub const SLIDE_GRAVITY_SCALE: f32 = 0.1;

/// Steepest surface, in degrees from horizontal, that still counts as floor.
pub const MAX_FLOOR_SLOPE_DEG: f32 = 50.0;

/// Slope angle (degrees) at which the sliding force reaches `MAX_SLIDING_FORCE`.
pub const GRAZING_SLOPE_DEG: f32 = 90.0;

/// Acceleration (m/s²) from movement input while on the floor.
pub const GROUND_SPEED: f32 = 4.0;

/// Acceleration (m/s²) from movement input while airborne.
pub const AIR_SPEED: f32 = 2.0;

/// Vertical velocity (m/s) set by a jump.
pub const JUMP_VELOCITY: f32 = 2.0;

/// Players whose capsule drops below this height are respawned.
pub const OUT_OF_BOUNDS_Y: f32 = -25.0;

/// Capsule radius of the player body (meters).
pub const PLAYER_RADIUS: f32 = 0.35;

/// Spawn position of the bottom sphere center of the player capsule.
pub const SPAWN_START: [f32; 3] = [0.0, 0.35, 0.0];

/// Spawn position of the top sphere center (the eye) of the player capsule.
pub const SPAWN_END: [f32; 3] = [0.0, 1.0, 0.0];

/// Mouse-look rotation in radians per pixel of pointer motion.
pub const MOUSE_RADIANS_PER_PIXEL: f32 = 1.0 / 250.0;

/// Camera pitch limit in degrees, above and below the horizon.
pub const MAX_PITCH_DEG: f32 = 89.0;

/// Angular frequency (rad/s) of the critically damped spring that steers the
/// camera toward a hand-aimed orientation.
pub const LOOK_SPRING_FREQUENCY: f32 = 6.0;

/// Pinch distance (detector units) that maps to zero speed.
pub const PINCH_MIN: f32 = 0.05;

/// Pinch distance (detector units) that maps to full speed.
pub const PINCH_MAX: f32 = 0.15;

/// How often the hand-pose detector is polled.
pub const HAND_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A hand with fewer 3D keypoints than this is treated as a degenerate sample.
pub const MIN_HAND_KEYPOINTS: usize = 9;
