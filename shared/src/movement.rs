use crate::{
    collision::{CollisionResult, DEPTH_EPSILON, PlayerCapsule, Vec3, WorldCollider},
    constants::{
        AIR_DAMPING_SCALE, AIR_SPEED, DAMPING_RATE, GRAVITY, GRAZING_SLOPE_DEG, GROUND_SPEED,
        JUMP_VELOCITY, MAX_FLOOR_SLOPE_DEG, MAX_FRAME_DT, MAX_SLIDING_FORCE, MAX_SLIDING_SPEED,
        OUT_OF_BOUNDS_Y, SLIDE_GRAVITY_SCALE, STEPS_PER_FRAME,
    },
    input::ControlSignal,
    look::ViewRig,
    utils::normalize_or_zero,
};

/// Tunables for the player physics core.
///
/// Defaults reproduce the shipped feel; the qualitative shape (floor threshold,
/// sliding force zero at the threshold and maximal at the grazing angle) holds
/// for any values with `grazing_slope_deg > max_floor_slope_deg`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSettings {
    pub steps_per_frame: u32,
    pub max_frame_dt: f32,
    pub gravity: f32,
    pub damping_rate: f32,
    pub air_damping_scale: f32,
    pub max_sliding_force: f32,
    pub max_sliding_speed: f32,
    pub slide_gravity_scale: f32,
    pub max_floor_slope_deg: f32,
    pub grazing_slope_deg: f32,
    pub ground_speed: f32,
    pub air_speed: f32,
    pub jump_velocity: f32,
    pub out_of_bounds_y: f32,
    /// Penetrations shallower than this are left uncorrected.
    pub depth_epsilon: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            steps_per_frame: STEPS_PER_FRAME,
            max_frame_dt: MAX_FRAME_DT,
            gravity: GRAVITY,
            damping_rate: DAMPING_RATE,
            air_damping_scale: AIR_DAMPING_SCALE,
            max_sliding_force: MAX_SLIDING_FORCE,
            max_sliding_speed: MAX_SLIDING_SPEED,
            slide_gravity_scale: SLIDE_GRAVITY_SCALE,
            max_floor_slope_deg: MAX_FLOOR_SLOPE_DEG,
            grazing_slope_deg: GRAZING_SLOPE_DEG,
            ground_speed: GROUND_SPEED,
            air_speed: AIR_SPEED,
            jump_velocity: JUMP_VELOCITY,
            out_of_bounds_y: OUT_OF_BOUNDS_Y,
            depth_epsilon: DEPTH_EPSILON,
        }
    }
}

/// Everything the physics core owns about the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerState {
    pub capsule: PlayerCapsule,
    pub velocity: Vec3,
    /// Recomputed every substep from the latest collision query.
    pub on_floor: bool,
    pub view: ViewRig,
}

impl PlayerState {
    pub fn new(capsule: PlayerCapsule) -> Self {
        Self {
            capsule,
            velocity: Vec3::zeros(),
            on_floor: false,
            view: ViewRig::default(),
        }
    }

    /// Fresh player at the spawn point, at rest, facing -Z.
    pub fn spawn() -> Self {
        Self::new(PlayerCapsule::spawn())
    }

    /// Capsule midpoint. Used for trigger zones.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.capsule.center()
    }

    /// Where the camera sits: the top sphere center of the capsule.
    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.capsule.end
    }

    fn respawn(&mut self) {
        *self = Self::spawn();
    }
}

/// How the last collision query classified the surface under the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceContact {
    /// Angle between the contact normal and +Y, in degrees.
    pub slope_deg: f32,
    pub on_floor: bool,
    /// Impulse magnitude applied against the normal. Zero on floor.
    pub sliding_force: f32,
}

/// Output of one `step_player()` frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub substeps: u32,
    pub substep_dt: f32,
    /// Camera position for this frame.
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub on_floor: bool,
    /// The player fell out of the world and was put back at the spawn point.
    pub respawned: bool,
}

/// Classify a contact normal as floor or slope and compute the sliding force.
///
/// The force is linear in slope angle from 0 at the floor threshold to
/// `max_sliding_force` at the grazing angle, and capped beyond it (ceilings and
/// overhangs get the cap).
pub fn classify_surface(normal: &Vec3, settings: &PlayerSettings) -> SurfaceContact {
    let cos = normal.dot(&Vec3::y()).clamp(-1.0, 1.0);
    let slope_deg = cos.acos().to_degrees();
    let on_floor = slope_deg <= settings.max_floor_slope_deg && normal.y > 0.0;

    let sliding_force = if on_floor {
        0.0
    } else {
        let span = (settings.grazing_slope_deg - settings.max_floor_slope_deg).max(f32::EPSILON);
        let force =
            settings.max_sliding_force * (slope_deg - settings.max_floor_slope_deg) / span;
        force.clamp(0.0, settings.max_sliding_force)
    };

    SurfaceContact {
        slope_deg,
        on_floor,
        sliding_force,
    }
}

/// Substep part 1: gravity, damping, position integration.
pub fn integrate(state: &mut PlayerState, settings: &PlayerSettings, dt: f32) {
    let mut damping = (-settings.damping_rate * dt).exp() - 1.0;
    if !state.on_floor {
        state.velocity.y -= settings.gravity * dt;
        damping *= settings.air_damping_scale;
    }
    state.velocity += state.velocity * damping;

    let delta = state.velocity * dt;
    state.capsule.translate(&delta);
}

/// Substep part 2: query the world, classify the surface, slide, push out.
///
/// Returns the contact classification if the capsule touched anything.
pub fn resolve_collision(
    state: &mut PlayerState,
    world: &WorldCollider,
    settings: &PlayerSettings,
) -> Option<SurfaceContact> {
    state.on_floor = false;
    let hit = world.intersect_capsule(&state.capsule)?;

    let contact = classify_surface(&hit.normal, settings);
    state.on_floor = contact.on_floor;

    if !contact.on_floor {
        state.velocity -= hit.normal * contact.sliding_force;
        state.velocity.y -= settings.gravity * settings.slide_gravity_scale;

        let speed = state.velocity.norm();
        if speed > settings.max_sliding_speed {
            state.velocity *= settings.max_sliding_speed / speed;
        }
    }

    push_out(&mut state.capsule, &hit, settings.depth_epsilon);
    Some(contact)
}

/// Move the capsule out of the surface. Depths under `depth_epsilon` are
/// ignored so repeated queries at rest do not drift.
///
/// Returns true if the capsule moved.
pub fn push_out(capsule: &mut PlayerCapsule, hit: &CollisionResult, depth_epsilon: f32) -> bool {
    if hit.depth >= depth_epsilon {
        capsule.translate(&(hit.normal * hit.depth));
        true
    } else {
        false
    }
}

/// Substep part 3: movement input, jump, look.
pub fn apply_control(
    state: &mut PlayerState,
    signal: &ControlSignal,
    settings: &PlayerSettings,
    dt: f32,
    substeps: u32,
) {
    let speed = if state.on_floor {
        settings.ground_speed
    } else {
        settings.air_speed
    };

    let direction = normalize_or_zero(&signal.move_intent);
    let scale = signal.speed_scale.clamp(0.0, 1.0);
    state.velocity += direction * (speed * scale * dt);

    if signal.jump && state.on_floor {
        state.velocity.y = settings.jump_velocity;
    }

    state.view.apply(&signal.look, dt, substeps);
}

/// Advance the player by one rendered frame.
///
/// The frame time is clamped to `max_frame_dt` and split into
/// `steps_per_frame` equal substeps. Each substep integrates, resolves
/// collisions, then applies the control signal, so input is sampled at the
/// collision rate. Never fails: a non-finite velocity is discarded and a
/// player below `out_of_bounds_y` is respawned.
pub fn step_player(
    state: &mut PlayerState,
    world: &WorldCollider,
    signal: &ControlSignal,
    settings: &PlayerSettings,
    frame_dt: f32,
) -> FrameReport {
    let substeps = settings.steps_per_frame.max(1);
    let frame_dt = if frame_dt.is_finite() {
        frame_dt.clamp(0.0, settings.max_frame_dt)
    } else {
        0.0
    };
    let dt = frame_dt / substeps as f32;

    for _ in 0..substeps {
        integrate(state, settings, dt);
        resolve_collision(state, world, settings);
        apply_control(state, signal, settings, dt, substeps);

        if !state.velocity.iter().all(|v| v.is_finite()) {
            log::warn!("discarding non-finite player velocity {:?}", state.velocity);
            state.velocity = Vec3::zeros();
        }
    }

    let respawned = state.capsule.end.y < settings.out_of_bounds_y
        || !state.capsule.start.iter().all(|v| v.is_finite());
    if respawned {
        log::warn!(
            "player left the world at {:?}; respawning",
            state.capsule.center()
        );
        state.respawn();
    }

    FrameReport {
        substeps,
        substep_dt: dt,
        eye: state.eye(),
        yaw: state.view.yaw,
        pitch: state.view.pitch,
        on_floor: state.on_floor,
        respawned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision::{Quat, TriangleMesh},
        look::LookCommand,
    };
    use nalgebra as na;

    const FRAME: f32 = 1.0 / 60.0;

    fn flat_world() -> WorldCollider {
        WorldCollider::build_from_meshes(&[TriangleMesh::cuboid(
            Vec3::new(20.0, 0.5, 20.0),
            Vec3::new(0.0, -0.5, 0.0),
            Quat::identity(),
        )])
    }

    /// A ramp whose top surface passes through the origin, tilted `deg` about Z.
    fn slope_world(deg: f32) -> (WorldCollider, Vec3) {
        let rotation = Quat::from_axis_angle(&na::Vector3::z_axis(), deg.to_radians());
        let normal = rotation * Vec3::y();
        let world = WorldCollider::build_from_meshes(&[TriangleMesh::cuboid(
            Vec3::new(20.0, 0.5, 20.0),
            -(rotation * Vec3::new(0.0, 0.5, 0.0)),
            rotation,
        )]);
        (world, normal)
    }

    fn settle(state: &mut PlayerState, world: &WorldCollider, frames: usize) {
        let settings = PlayerSettings::default();
        for _ in 0..frames {
            step_player(state, world, &ControlSignal::idle(), &settings, FRAME);
        }
    }

    #[test]
    fn frame_is_split_into_five_equal_substeps() {
        let world = WorldCollider::empty();
        let settings = PlayerSettings::default();
        for dt in [0.001, FRAME, 0.033, 0.05] {
            let mut state = PlayerState::spawn();
            let report = step_player(&mut state, &world, &ControlSignal::idle(), &settings, dt);
            assert_eq!(report.substeps, 5);
            assert!((report.substep_dt - dt / 5.0).abs() < 1.0e-7);
        }
    }

    #[test]
    fn hitches_are_clamped() {
        let world = WorldCollider::empty();
        let settings = PlayerSettings::default();
        let mut state = PlayerState::spawn();

        let report = step_player(&mut state, &world, &ControlSignal::idle(), &settings, 1.0);
        assert!((report.substep_dt - 0.01).abs() < 1.0e-7);

        for dt in [-1.0, f32::NAN, f32::INFINITY] {
            let before = state;
            let report = step_player(&mut state, &world, &ControlSignal::idle(), &settings, dt);
            assert_eq!(report.substep_dt, 0.0);
            assert_eq!(state.capsule, before.capsule);
        }
    }

    #[test]
    fn falls_under_gravity_in_empty_world() {
        let world = WorldCollider::empty();
        let mut state = PlayerState::spawn();
        settle(&mut state, &world, 30);
        assert!(!state.on_floor);
        assert!(state.velocity.y < 0.0);
        assert!(state.capsule.start.y < 0.35);
    }

    #[test]
    fn rests_on_flat_ground() {
        let world = flat_world();
        let mut state = PlayerState::spawn();
        settle(&mut state, &world, 300);

        assert!(state.on_floor);
        assert!(state.velocity.norm() < 1.0e-3, "velocity {:?}", state.velocity);
        assert!((state.capsule.start.y - 0.35).abs() < 1.0e-3);

        let before = state.velocity.y;
        settle(&mut state, &world, 1);
        assert!(state.on_floor);
        assert!((state.velocity.y - before).abs() < 1.0e-3);
    }

    #[test]
    fn camera_sits_on_the_capsule_top() {
        let world = flat_world();
        let mut state = PlayerState::spawn();
        let report = step_player(
            &mut state,
            &world,
            &ControlSignal::idle(),
            &PlayerSettings::default(),
            FRAME,
        );
        assert_eq!(report.eye, state.capsule.end);
        assert!((report.eye.y - 1.0).abs() < 1.0e-2);
    }

    #[test]
    fn floor_threshold_is_fifty_degrees() {
        let settings = PlayerSettings::default();
        let tilt = |deg: f32| {
            let r = deg.to_radians();
            Vec3::new(-r.sin(), r.cos(), 0.0)
        };

        assert!(classify_surface(&Vec3::y(), &settings).on_floor);
        assert!(classify_surface(&tilt(49.9), &settings).on_floor);
        let near_limit = classify_surface(&tilt(50.01), &settings);
        assert!(!near_limit.on_floor);
        assert!(near_limit.sliding_force < 0.01);

        let steep = classify_surface(&tilt(51.0), &settings);
        assert!(!steep.on_floor);
        assert!(steep.sliding_force > 0.0);
    }

    #[test]
    fn sliding_force_grows_with_angle_up_to_the_cap() {
        let settings = PlayerSettings::default();
        let mut last = 0.0;
        for deg in (51..=90).map(|d| d as f32) {
            let r = deg.to_radians();
            let force = classify_surface(&Vec3::new(-r.sin(), r.cos(), 0.0), &settings).sliding_force;
            assert!(force > last, "{deg}: {force} <= {last}");
            assert!(force <= MAX_SLIDING_FORCE + 1.0e-4);
            last = force;
        }
        assert!((last - MAX_SLIDING_FORCE).abs() < 1.0e-3);

        let ceiling = classify_surface(&-Vec3::y(), &settings);
        assert!(!ceiling.on_floor);
        assert_eq!(ceiling.sliding_force, MAX_SLIDING_FORCE);
    }

    #[test]
    fn steep_slope_is_never_floor_and_pushes_downhill() {
        let (world, normal) = slope_world(51.0);
        let settings = PlayerSettings::default();
        let start = normal * 0.3;
        let capsule =
            PlayerCapsule::upright(start, start + Vec3::new(0.0, 0.65, 0.0), 0.35).unwrap();
        let mut state = PlayerState::new(capsule);

        let contact = resolve_collision(&mut state, &world, &settings).unwrap();
        assert!(!state.on_floor);
        assert!((contact.slope_deg - 51.0).abs() < 0.5);
        assert!(contact.sliding_force > 0.0);
        assert!(state.velocity.x > 0.0, "velocity {:?}", state.velocity);
        assert!(state.velocity.y < 0.0);
        assert!(state.velocity.norm() <= MAX_SLIDING_SPEED + 1.0e-4);
        // Pushed back out of the ramp.
        assert!(state.capsule.start.dot(&normal) > 0.3);
    }

    #[test]
    fn sliding_speed_is_capped() {
        let (world, normal) = slope_world(80.0);
        let settings = PlayerSettings::default();
        let start = normal * 0.3;
        let mut state = PlayerState::new(
            PlayerCapsule::upright(start, start + Vec3::new(0.0, 0.65, 0.0), 0.35).unwrap(),
        );
        state.velocity = Vec3::new(0.0, -20.0, 0.0);

        resolve_collision(&mut state, &world, &settings).unwrap();
        assert!((state.velocity.norm() - MAX_SLIDING_SPEED).abs() < 1.0e-3);
    }

    #[test]
    fn tiny_depths_cause_no_correction() {
        let epsilon = PlayerSettings::default().depth_epsilon;
        let mut capsule = PlayerCapsule::spawn();
        let before = capsule;
        let moved = push_out(
            &mut capsule,
            &CollisionResult {
                normal: Vec3::y(),
                depth: 1.0e-11,
            },
            epsilon,
        );
        assert!(!moved);
        assert_eq!(capsule, before);

        assert!(push_out(
            &mut capsule,
            &CollisionResult {
                normal: Vec3::y(),
                depth: 1.0e-3,
            },
            epsilon,
        ));
        assert!((capsule.start.y - before.start.y - 1.0e-3).abs() < 1.0e-6);
    }

    #[test]
    fn depth_epsilon_is_a_setting() {
        let world = flat_world();
        let sunk = |state: &mut PlayerState| {
            state.capsule.translate(&Vec3::new(0.0, -1.0e-3, 0.0));
        };

        let coarse = PlayerSettings {
            depth_epsilon: 1.0e-2,
            ..PlayerSettings::default()
        };
        let mut state = PlayerState::spawn();
        sunk(&mut state);
        let before = state.capsule;
        resolve_collision(&mut state, &world, &coarse);
        assert!(state.on_floor);
        assert_eq!(state.capsule, before);

        let mut state = PlayerState::spawn();
        sunk(&mut state);
        resolve_collision(&mut state, &world, &PlayerSettings::default());
        assert!((state.capsule.start.y - 0.35).abs() < 1.0e-5);
    }

    #[test]
    fn repeated_queries_at_rest_do_not_drift() {
        let world = flat_world();
        let settings = PlayerSettings::default();
        let mut state = PlayerState::spawn();
        let start = state.capsule.start;
        for _ in 0..50 {
            resolve_collision(&mut state, &world, &settings);
            assert!(state.on_floor);
        }
        assert!((state.capsule.start - start).norm() < 1.0e-5);
    }

    #[test]
    fn walks_where_the_camera_faces() {
        let world = flat_world();
        let settings = PlayerSettings::default();
        let mut state = PlayerState::spawn();
        settle(&mut state, &world, 10);

        let signal = ControlSignal {
            move_intent: state.view.forward(),
            speed_scale: 1.0,
            ..ControlSignal::idle()
        };
        for _ in 0..60 {
            step_player(&mut state, &world, &signal, &settings, FRAME);
        }
        assert!(state.capsule.start.z < -0.2, "z = {}", state.capsule.start.z);
        assert!(state.capsule.start.x.abs() < 1.0e-3);
        assert!(state.on_floor);
    }

    #[test]
    fn zero_speed_scale_stands_still() {
        let world = flat_world();
        let settings = PlayerSettings::default();
        let mut state = PlayerState::spawn();
        settle(&mut state, &world, 10);
        let before = state.capsule.start;

        let signal = ControlSignal {
            move_intent: state.view.forward(),
            speed_scale: 0.0,
            ..ControlSignal::idle()
        };
        for _ in 0..30 {
            step_player(&mut state, &world, &signal, &settings, FRAME);
        }
        assert!((state.capsule.start.xz() - before.xz()).norm() < 1.0e-4);
    }

    #[test]
    fn jumps_only_from_the_floor() {
        let settings = PlayerSettings::default();
        let jump = ControlSignal {
            jump: true,
            ..ControlSignal::idle()
        };

        let mut airborne = PlayerState::spawn();
        airborne.capsule.translate(&Vec3::new(0.0, 5.0, 0.0));
        apply_control(&mut airborne, &jump, &settings, 0.01, 5);
        assert_eq!(airborne.velocity.y, 0.0);

        let world = flat_world();
        let mut grounded = PlayerState::spawn();
        settle(&mut grounded, &world, 30);
        step_player(&mut grounded, &world, &jump, &settings, FRAME);
        assert!(grounded.velocity.y > 1.0);

        settle(&mut grounded, &world, 2);
        assert!(grounded.capsule.start.y > 0.36);
    }

    #[test]
    fn mouse_look_is_applied_in_full_each_frame() {
        let world = flat_world();
        let mut state = PlayerState::spawn();
        let signal = ControlSignal {
            look: LookCommand::Delta {
                yaw: 0.4,
                pitch: 0.1,
            },
            ..ControlSignal::idle()
        };
        let report = step_player(
            &mut state,
            &world,
            &signal,
            &PlayerSettings::default(),
            FRAME,
        );
        assert!((report.yaw - 0.4).abs() < 1.0e-5);
        assert!((report.pitch - 0.1).abs() < 1.0e-5);
    }

    #[test]
    fn falling_out_of_the_world_respawns() {
        let world = flat_world();
        let mut state = PlayerState::spawn();
        state.capsule.translate(&Vec3::new(50.0, -40.0, 0.0));
        state.velocity = Vec3::new(0.0, -10.0, 0.0);

        let report = step_player(
            &mut state,
            &world,
            &ControlSignal::idle(),
            &PlayerSettings::default(),
            FRAME,
        );
        assert!(report.respawned);
        assert_eq!(state, PlayerState::spawn());
    }

    /// Collects every record so tests can check what was logged and how loudly.
    struct CaptureLog(std::sync::Mutex<Vec<(log::Level, String)>>);

    impl log::Log for CaptureLog {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut records) = self.0.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureLog = CaptureLog(std::sync::Mutex::new(Vec::new()));

    #[test]
    fn respawn_is_logged_as_a_warning() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);

        let mut state = PlayerState::spawn();
        state.capsule.translate(&Vec3::new(0.0, -60.0, 0.0));
        step_player(
            &mut state,
            &WorldCollider::empty(),
            &ControlSignal::idle(),
            &PlayerSettings::default(),
            FRAME,
        );

        let records = CAPTURE.0.lock().unwrap();
        assert!(
            records
                .iter()
                .any(|(level, message)| *level == log::Level::Warn && message.contains("respawning")),
            "{records:?}"
        );
    }
}
