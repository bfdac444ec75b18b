use bevy::{camera::Exposure, core_pipeline::tonemapping::Tonemapping, prelude::*};

use crate::{
    PlayingSystems,
    convert::{from_na, view_rotation},
    player::Player,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(Update, sync_camera.in_set(PlayingSystems::Present));
}

const NIGHT_FOG: Color = Color::srgb(0.024, 0.031, 0.071);

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Exposure { ev100: 9.0 },
        Tonemapping::AcesFitted,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 50f32.to_radians(),
            near: 0.1,
            far: 500.0,
            ..default()
        }),
        Transform::from_xyz(0.0, 2.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: NIGHT_FOG,
            falloff: FogFalloff::Exponential { density: 0.02 },
            ..default()
        },
    ));
}

/// The camera sits on the capsule's top sphere and looks along the view rig.
fn sync_camera(mut camera: Single<&mut Transform, With<Camera3d>>, player: Res<Player>) {
    let state = &player.0;
    camera.translation = from_na(&state.eye());
    camera.rotation = view_rotation(state.view.yaw, state.view.pitch);
}
