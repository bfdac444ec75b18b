//! Input unification: keyboard/mouse state and hand-pose signals both resolve
//! to the same [`ControlSignal`] consumed by the physics core.

use nalgebra::Vector2;

use crate::{
    collision::Vec3,
    constants::{MOUSE_RADIANS_PER_PIXEL, PINCH_MAX, PINCH_MIN},
    hand_pose::HandSignals,
    look::{LookCommand, ViewRig, aim_to_angles},
    utils::remap_unit,
};

/// Which device drives the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ControlMode {
    #[default]
    Keyboard,
    Webcam,
}

/// What a control mode is allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeCapabilities {
    pub jump: bool,
    pub strafe: bool,
}

/// Tunables for turning raw input into control signals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputSettings {
    pub mouse_radians_per_pixel: f32,
    /// Pinch distance mapped to zero speed.
    pub pinch_min: f32,
    /// Pinch distance mapped to full speed.
    pub pinch_max: f32,
    pub keyboard: ModeCapabilities,
    pub webcam: ModeCapabilities,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            mouse_radians_per_pixel: MOUSE_RADIANS_PER_PIXEL,
            pinch_min: PINCH_MIN,
            pinch_max: PINCH_MAX,
            keyboard: ModeCapabilities {
                jump: true,
                strafe: true,
            },
            webcam: ModeCapabilities {
                jump: false,
                strafe: false,
            },
        }
    }
}

impl InputSettings {
    pub fn capabilities(&self, mode: ControlMode) -> ModeCapabilities {
        match mode {
            ControlMode::Keyboard => self.keyboard,
            ControlMode::Webcam => self.webcam,
        }
    }
}

/// Keyboard and mouse state, updated by device event handlers and read once
/// per frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Pointer motion in pixels accumulated since the last frame.
    pub look_delta: Vector2<f32>,
}

impl InputState {
    /// Accumulate pointer motion (only while the pointer is captured).
    pub fn add_look_delta(&mut self, dx: f32, dy: f32) {
        self.look_delta += Vector2::new(dx, dy);
    }

    /// Drop any accumulated pointer motion, e.g. at the start of a frame.
    pub fn reset_look_delta(&mut self) {
        self.look_delta = Vector2::zeros();
    }

    /// Hand over the accumulated pointer motion and reset it.
    pub fn take_look_delta(&mut self) -> Vector2<f32> {
        std::mem::replace(&mut self.look_delta, Vector2::zeros())
    }
}

/// Per-frame control for the physics core, independent of the input device.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ControlSignal {
    /// World-space sum of the horizontal basis vectors the player asked for.
    /// Zero means stand still.
    pub move_intent: Vec3,
    /// Multiplier on movement speed in `[0, 1]`.
    pub speed_scale: f32,
    pub look: LookCommand,
    /// Jump requested this frame. Only honored while on the floor.
    pub jump: bool,
}

impl ControlSignal {
    /// Stand still and keep looking where we look.
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Resolve the active device's state into a [`ControlSignal`].
///
/// `view` is the current camera orientation; keyboard movement is relative to
/// where the camera faces on the horizontal plane. Missing input for the
/// active mode resolves to an idle signal.
pub fn resolve(
    mode: ControlMode,
    settings: &InputSettings,
    view: &ViewRig,
    keyboard: Option<&InputState>,
    hands: Option<&HandSignals>,
) -> ControlSignal {
    let caps = settings.capabilities(mode);
    match mode {
        ControlMode::Keyboard => keyboard
            .map(|keys| resolve_keyboard(keys, caps, settings, view))
            .unwrap_or_default(),
        ControlMode::Webcam => {
            let mut signal = hands
                .map(|hands| resolve_hands(hands, settings, view))
                .unwrap_or_default();
            // Keys still work alongside hand tracking where the mode allows it.
            if let Some(keys) = keyboard {
                signal.jump = caps.jump && keys.jump;
                if caps.strafe {
                    signal.move_intent += strafe(keys, view);
                }
            }
            signal
        }
    }
}

fn resolve_keyboard(
    keys: &InputState,
    caps: ModeCapabilities,
    settings: &InputSettings,
    view: &ViewRig,
) -> ControlSignal {
    let forward = view.forward();
    let mut intent = Vec3::zeros();
    if keys.forward {
        intent += forward;
    }
    if keys.backward {
        intent -= forward;
    }
    if caps.strafe {
        intent += strafe(keys, view);
    }

    let look = if keys.look_delta == Vector2::zeros() {
        LookCommand::Hold
    } else {
        LookCommand::Delta {
            yaw: -keys.look_delta.x * settings.mouse_radians_per_pixel,
            pitch: -keys.look_delta.y * settings.mouse_radians_per_pixel,
        }
    };

    ControlSignal {
        move_intent: intent,
        speed_scale: 1.0,
        look,
        jump: caps.jump && keys.jump,
    }
}

fn strafe(keys: &InputState, view: &ViewRig) -> Vec3 {
    let right = view.right();
    let mut side = Vec3::zeros();
    if keys.right {
        side += right;
    }
    if keys.left {
        side -= right;
    }
    side
}

fn resolve_hands(hands: &HandSignals, settings: &InputSettings, view: &ViewRig) -> ControlSignal {
    let speed_scale = remap_unit(hands.pinch_distance, settings.pinch_min, settings.pinch_max);
    let look = aim_to_angles(&hands.aim_direction)
        .map(|(yaw, pitch)| LookCommand::Target { yaw, pitch })
        .unwrap_or(LookCommand::Hold);

    ControlSignal {
        // Always forward; the pinch decides how fast.
        move_intent: view.forward(),
        speed_scale,
        look,
        jump: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> InputState {
        InputState::default()
    }

    #[test]
    fn no_keys_is_a_valid_standstill() {
        let signal = resolve(
            ControlMode::Keyboard,
            &InputSettings::default(),
            &ViewRig::default(),
            Some(&keys()),
            None,
        );
        assert_eq!(signal.move_intent, Vec3::zeros());
        assert_eq!(signal.look, LookCommand::Hold);
        assert!(!signal.jump);
    }

    #[test]
    fn diagonal_keys_add_basis_vectors() {
        let mut state = keys();
        state.forward = true;
        state.right = true;
        let view = ViewRig::default();
        let signal = resolve(
            ControlMode::Keyboard,
            &InputSettings::default(),
            &view,
            Some(&state),
            None,
        );

        assert!((signal.move_intent - (view.forward() + view.right())).norm() < 1.0e-6);
        assert!(signal.move_intent.norm() <= 2.0);
        assert_eq!(signal.speed_scale, 1.0);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut state = keys();
        state.forward = true;
        state.backward = true;
        let signal = resolve(
            ControlMode::Keyboard,
            &InputSettings::default(),
            &ViewRig::default(),
            Some(&state),
            None,
        );
        assert!(signal.move_intent.norm() < 1.0e-6);
    }

    #[test]
    fn mouse_delta_rotates_with_canonical_sensitivity() {
        let mut state = keys();
        state.add_look_delta(250.0, -125.0);
        let signal = resolve(
            ControlMode::Keyboard,
            &InputSettings::default(),
            &ViewRig::default(),
            Some(&state),
            None,
        );
        match signal.look {
            LookCommand::Delta { yaw, pitch } => {
                assert!((yaw + 1.0).abs() < 1.0e-6);
                assert!((pitch - 0.5).abs() < 1.0e-6);
            }
            other => panic!("expected a delta, got {other:?}"),
        }
        assert_eq!(state.take_look_delta(), Vector2::new(250.0, -125.0));
        assert_eq!(state.look_delta, Vector2::zeros());
    }

    #[test]
    fn resetting_look_delta_keeps_the_keys() {
        let mut state = InputState {
            forward: true,
            ..keys()
        };
        state.add_look_delta(3.0, 4.0);
        state.reset_look_delta();
        assert_eq!(state.look_delta, Vector2::zeros());
        assert!(state.forward);
    }

    #[test]
    fn pinch_maps_to_clamped_speed_scale() {
        let settings = InputSettings::default();
        let view = ViewRig::default();
        let scale = |pinch: f32| {
            let hands = HandSignals {
                aim_direction: Vec3::new(0.0, 0.0, 1.0),
                pinch_distance: pinch,
            };
            resolve(ControlMode::Webcam, &settings, &view, None, Some(&hands)).speed_scale
        };

        assert_eq!(scale(0.0), 0.0);
        assert_eq!(scale(0.05), 0.0);
        assert!((scale(0.10) - 0.5).abs() < 1.0e-5);
        assert_eq!(scale(0.15), 1.0);
        assert_eq!(scale(0.4), 1.0);
    }

    #[test]
    fn webcam_moves_forward_and_targets_the_aim() {
        let mut state = keys();
        state.left = true;
        state.jump = true;
        let view = ViewRig::default();
        let hands = HandSignals {
            aim_direction: Vec3::new(1.0, 0.0, 0.0),
            pinch_distance: 0.15,
        };
        let signal = resolve(
            ControlMode::Webcam,
            &InputSettings::default(),
            &view,
            Some(&state),
            Some(&hands),
        );

        // No strafing or jumping in webcam mode by default.
        assert!((signal.move_intent - view.forward()).norm() < 1.0e-6);
        assert!(!signal.jump);
        match signal.look {
            LookCommand::Target { yaw, pitch } => {
                assert!((yaw - std::f32::consts::FRAC_PI_2).abs() < 1.0e-6);
                assert!(pitch.abs() < 1.0e-6);
            }
            other => panic!("expected a target, got {other:?}"),
        }
    }

    #[test]
    fn webcam_jump_is_a_capability_flag() {
        let mut settings = InputSettings::default();
        settings.webcam.jump = true;
        let mut state = keys();
        state.jump = true;

        let signal = resolve(
            ControlMode::Webcam,
            &settings,
            &ViewRig::default(),
            Some(&state),
            Some(&HandSignals::default()),
        );
        assert!(signal.jump);
    }

    #[test]
    fn webcam_without_signals_stands_still() {
        let signal = resolve(
            ControlMode::Webcam,
            &InputSettings::default(),
            &ViewRig::default(),
            None,
            Some(&HandSignals::default()),
        );
        assert_eq!(signal.speed_scale, 0.0);
        assert_eq!(signal.look, LookCommand::Hold);
    }
}
