//! Debug/performance tooling for native dev builds.
//!
//! Gated behind `dev_native` in `main.rs`. Adds the perf overlay, a physics
//! readout, and wireframes for the narration zones.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;

use crate::{
    ActiveMode, AppState, PlayingSystems, convert::from_na, narration::Narration, player::Player,
};

#[derive(Component)]
struct PhysicsReadout;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(OnEnter(AppState::Playing), spawn_readout);
    app.add_systems(
        Update,
        (update_readout, draw_zones)
            .after(PlayingSystems::Present)
            .run_if(in_state(AppState::Playing)),
    );
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn spawn_readout(mut commands: Commands) {
    commands.spawn((
        PhysicsReadout,
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::WHITE),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            right: Val::Px(10.0),
            padding: UiRect::all(Val::Px(8.0)),
            ..default()
        },
    ));
}

fn update_readout(
    player: Res<Player>,
    mode: Res<ActiveMode>,
    mut readout: Single<&mut Text, With<PhysicsReadout>>,
) {
    let state = &player.0;
    let position = state.position();
    readout.0 = format!(
        "mode: {:?}\non floor: {}\nspeed: {:.2} m/s\npos: ({:.1}, {:.1}, {:.1})\nyaw/pitch: {:.0}/{:.0}",
        mode.0,
        state.on_floor,
        state.velocity.norm(),
        position.x,
        position.y,
        position.z,
        state.view.yaw.to_degrees(),
        state.view.pitch.to_degrees(),
    );
}

fn draw_zones(mut gizmos: Gizmos, narration: Res<Narration>) {
    for (_, zone) in narration.0.iter() {
        let color = if zone.has_fired() {
            Color::srgba(0.5, 0.5, 0.5, 0.3)
        } else {
            Color::srgba(0.07, 0.27, 0.99, 0.6)
        };
        gizmos.sphere(
            Isometry3d::from_translation(from_na(&zone.position)),
            zone.radius,
            color,
        );
    }
}
