// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod camera;
mod convert;
mod cursor;
mod hand_tracking;
mod input;
mod level;
mod narration;
mod player;
mod splash;

#[cfg(target_os = "macos")]
use bevy::window::CompositeAlphaMode;

use bevy::prelude::*;
use storybook_shared::ControlMode;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

/// Top-level flow: pick a controller, build the level, play.
#[derive(States, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AppState {
    #[default]
    Splash,
    Loading,
    Playing,
}

/// Per-frame ordering while playing: sample devices, step the simulation,
/// then present the result.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayingSystems {
    Input,
    Simulate,
    Present,
}

/// Control mode chosen on the splash screen. Hand tracking failures switch it
/// back to keyboard.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActiveMode(pub ControlMode);

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: "The Last Survivor".to_string(),
                fit_canvas_to_parent: true,
                #[cfg(target_os = "macos")]
                composite_alpha_mode: CompositeAlphaMode::PostMultiplied,
                ..default()
            }
            .into(),
            ..default()
        }));

        app.init_state::<AppState>();
        app.init_resource::<ActiveMode>();
        app.configure_sets(
            Update,
            (
                PlayingSystems::Input,
                PlayingSystems::Simulate,
                PlayingSystems::Present,
            )
                .chain()
                .run_if(in_state(AppState::Playing)),
        );

        app.add_plugins((
            splash::plugin,
            level::plugin,
            camera::plugin,
            input::plugin,
            cursor::plugin,
            hand_tracking::plugin,
            player::plugin,
            narration::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}
