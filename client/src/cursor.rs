use bevy::{
    prelude::*,
    window::{CursorGrabMode, CursorOptions, PrimaryWindow, WindowFocused},
};
use leafwing_input_manager::prelude::ActionState;
use storybook_shared::ControlMode;

use crate::{ActiveMode, AppState, PlayingSystems, input::InputAction};

/// Whether the player wants the pointer captured. The OS can take the grab
/// away (focus loss); this remembers to restore it.
#[derive(Resource, Default)]
struct PointerLock {
    wanted: bool,
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<PointerLock>();

    app.add_systems(
        Update,
        (toggle_pointer_lock, reapply_on_focus)
            .chain()
            .in_set(PlayingSystems::Input)
            .before(crate::input::ResolveControl),
    );
    app.add_systems(
        Update,
        apply_pointer_lock
            .run_if(resource_changed::<PointerLock>)
            .after(PlayingSystems::Input),
    );
    app.add_systems(OnExit(AppState::Playing), release_pointer);
}

fn toggle_pointer_lock(
    actions: Res<ActionState<InputAction>>,
    mode: Res<ActiveMode>,
    mut lock: ResMut<PointerLock>,
) {
    if actions.just_pressed(&InputAction::Release) && lock.wanted {
        lock.wanted = false;
    } else if actions.just_pressed(&InputAction::Grab)
        && !lock.wanted
        && mode.0 == ControlMode::Keyboard
    {
        lock.wanted = true;
    }
}

fn apply_pointer_lock(
    mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>,
    lock: Res<PointerLock>,
) {
    set_grab(&mut cursor, lock.wanted);
}

// Re-apply on focus to avoid OS/browser resets
fn reapply_on_focus(
    mut messages: MessageReader<WindowFocused>,
    mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>,
    lock: Res<PointerLock>,
) {
    for message in messages.read() {
        if message.focused {
            set_grab(&mut cursor, lock.wanted);
        } else {
            set_grab(&mut cursor, false);
        }
    }
}

fn release_pointer(
    mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>,
    mut lock: ResMut<PointerLock>,
) {
    lock.wanted = false;
    set_grab(&mut cursor, false);
}

fn set_grab(cursor: &mut CursorOptions, grabbed: bool) {
    let mode = if grabbed {
        CursorGrabMode::Locked
    } else {
        CursorGrabMode::None
    };
    // Only touch the component when something changes.
    if cursor.grab_mode != mode {
        cursor.grab_mode = mode;
        cursor.visible = !grabbed;
    }
}
