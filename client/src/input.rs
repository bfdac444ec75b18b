use bevy::{
    prelude::*,
    window::{CursorGrabMode, CursorOptions, PrimaryWindow},
};
use leafwing_input_manager::prelude::*;
use storybook_shared::{HandSignals, InputSettings, InputState, resolve};

use crate::{
    ActiveMode, PlayingSystems,
    player::{Control, Player},
};

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    #[actionlike(DualAxis)]
    Look,
    /// Capture the pointer for mouse look.
    Grab,
    /// Give the pointer back.
    Release,
}

/// Device state read by the control resolver. Rebuilt from the action state
/// every frame.
#[derive(Resource, Default)]
pub struct KeyboardState(pub InputState);

/// Most recent hand signals published by hand tracking. Up to one polling
/// period stale.
#[derive(Resource, Default)]
pub struct LatestHands(pub Option<HandSignals>);

/// Input tunables for this session.
#[derive(Resource, Default)]
pub struct InputTuning(pub InputSettings);

/// Input resolution runs after device sampling within the input set.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResolveControl;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    app.insert_resource(default_input_map());
    app.insert_resource(ActionState::<InputAction>::default());
    app.init_resource::<KeyboardState>();
    app.init_resource::<LatestHands>();
    app.init_resource::<InputTuning>();

    app.add_systems(
        Update,
        (
            sample_keyboard,
            resolve_control.in_set(ResolveControl),
        )
            .chain()
            .in_set(PlayingSystems::Input),
    );
}

fn default_input_map() -> InputMap<InputAction> {
    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Forward, KeyCode::KeyW);
    input_map.insert(InputAction::Forward, KeyCode::ArrowUp);
    input_map.insert(InputAction::Backward, KeyCode::KeyS);
    input_map.insert(InputAction::Backward, KeyCode::ArrowDown);
    input_map.insert(InputAction::Left, KeyCode::KeyA);
    input_map.insert(InputAction::Left, KeyCode::ArrowLeft);
    input_map.insert(InputAction::Right, KeyCode::KeyD);
    input_map.insert(InputAction::Right, KeyCode::ArrowRight);
    input_map.insert(InputAction::Jump, KeyCode::Space);
    input_map.insert_dual_axis(InputAction::Look, MouseMove::default());
    input_map.insert(InputAction::Grab, MouseButton::Left);
    input_map.insert(InputAction::Release, KeyCode::Escape);
    input_map
}

fn sample_keyboard(
    actions: Res<ActionState<InputAction>>,
    cursor: Single<&CursorOptions, With<PrimaryWindow>>,
    mut keyboard: ResMut<KeyboardState>,
) {
    let state = &mut keyboard.0;
    state.forward = actions.pressed(&InputAction::Forward);
    state.backward = actions.pressed(&InputAction::Backward);
    state.left = actions.pressed(&InputAction::Left);
    state.right = actions.pressed(&InputAction::Right);
    state.jump = actions.pressed(&InputAction::Jump);

    state.reset_look_delta();
    // Mouse look only while the pointer is captured.
    if cursor.grab_mode != CursorGrabMode::None {
        let delta = actions.axis_pair(&InputAction::Look);
        state.add_look_delta(delta.x, delta.y);
    }
}

fn resolve_control(
    mode: Res<ActiveMode>,
    tuning: Res<InputTuning>,
    keyboard: Res<KeyboardState>,
    hands: Res<LatestHands>,
    player: Res<Player>,
    mut control: ResMut<Control>,
) {
    control.0 = resolve(
        mode.0,
        &tuning.0,
        &player.0.view,
        Some(&keyboard.0),
        hands.0.as_ref(),
    );
}
