use bevy::prelude::*;
use storybook_shared::{ControlSignal, PlayerSettings, PlayerState, step_player};

use crate::{AppState, PlayingSystems, level::LevelCollider};

/// The simulated player, owned by the systems in this module.
#[derive(Resource)]
pub struct Player(pub PlayerState);

/// Physics tunables for this session.
#[derive(Resource, Default)]
pub struct PlayerTuning(pub PlayerSettings);

/// This frame's resolved control signal.
#[derive(Resource, Default)]
pub struct Control(pub ControlSignal);

impl Default for Player {
    fn default() -> Self {
        Self(PlayerState::spawn())
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Player>();
    app.init_resource::<PlayerTuning>();
    app.init_resource::<Control>();

    app.add_systems(OnEnter(AppState::Playing), reset_player);
    app.add_systems(
        Update,
        advance_player
            .in_set(PlayingSystems::Simulate)
            .run_if(resource_exists::<LevelCollider>),
    );
}

pub(crate) fn reset_player(mut player: ResMut<Player>) {
    player.0 = PlayerState::spawn();
}

fn advance_player(
    time: Res<Time>,
    level: Res<LevelCollider>,
    control: Res<Control>,
    tuning: Res<PlayerTuning>,
    mut player: ResMut<Player>,
) {
    let report = step_player(
        &mut player.0,
        &level.0,
        &control.0,
        &tuning.0,
        time.delta_secs(),
    );
    if report.respawned {
        info!("player fell out of the world; back to the infirmary");
    }
}
