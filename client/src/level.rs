use bevy::prelude::*;
use storybook_shared::{TriangleMesh, WorldCollider};

use crate::{
    AppState,
    convert::{quat_to_na, to_na},
};

/// Static collision world, built once while loading.
#[derive(Resource)]
pub struct LevelCollider(pub WorldCollider);

/// Marker for rendered level geometry.
#[derive(Component)]
pub struct LevelGeometry;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(AppState::Loading), (spawn_loading_screen, setup));
    app.add_systems(
        Update,
        finish_loading
            .run_if(in_state(AppState::Loading))
            .run_if(resource_exists::<LevelCollider>),
    );
}

/// An oriented box of blockout geometry. The same block feeds the renderer
/// and the collider.
#[derive(Clone, Copy, Debug)]
pub struct Block {
    pub center: Vec3,
    pub size: Vec3,
    pub rotation: Quat,
    pub color: Color,
}

const GROUND: Color = Color::srgb(0.32, 0.30, 0.27);
const ROCK: Color = Color::srgb(0.45, 0.42, 0.40);
const BUILDING: Color = Color::srgb(0.62, 0.60, 0.55);
const RAMP: Color = Color::srgb(0.50, 0.44, 0.36);
const CLIFF: Color = Color::srgb(0.38, 0.33, 0.30);

const RAMP_THICKNESS: f32 = 0.5;

impl Block {
    fn new(center: Vec3, size: Vec3, color: Color) -> Self {
        Self {
            center,
            size,
            rotation: Quat::IDENTITY,
            color,
        }
    }

    fn yawed(mut self, degrees: f32) -> Self {
        self.rotation = Quat::from_rotation_y(degrees.to_radians()) * self.rotation;
        self
    }

    /// A slab whose top surface runs from `bottom` up to `top`.
    fn ramp(bottom: Vec3, top: Vec3, width: f32, color: Color) -> Self {
        let delta = top - bottom;
        let run = Vec2::new(delta.x, delta.z).length();
        let tilt = delta.y.atan2(run);
        let yaw = (-delta.x).atan2(-delta.z);
        let rotation = Quat::from_rotation_y(yaw) * Quat::from_rotation_x(tilt);

        let up = rotation * Vec3::Y;
        Self {
            center: (bottom + top) * 0.5 - up * (RAMP_THICKNESS * 0.5),
            size: Vec3::new(width, RAMP_THICKNESS, delta.length()),
            rotation,
            color,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.center).with_rotation(self.rotation)
    }

    pub fn triangle_mesh(&self) -> TriangleMesh {
        TriangleMesh::cuboid(
            to_na(self.size * 0.5),
            to_na(self.center),
            quat_to_na(self.rotation),
        )
    }
}

/// Blockout of the storybook terrain: the infirmary at the spawn point, the
/// mining trail climbing west, a steep scree slope, and the eastern plateau.
pub fn blockout() -> Vec<Block> {
    let mut blocks = vec![
        // Ground
        Block::new(
            Vec3::new(20.0, -0.5, -60.0),
            Vec3::new(220.0, 1.0, 220.0),
            GROUND,
        ),
        // Infirmary, open toward -Z
        Block::new(Vec3::new(0.0, 1.5, 3.0), Vec3::new(6.0, 3.0, 0.3), BUILDING),
        Block::new(Vec3::new(-3.0, 1.5, 0.0), Vec3::new(0.3, 3.0, 6.0), BUILDING),
        Block::new(Vec3::new(3.0, 1.5, 0.0), Vec3::new(0.3, 3.0, 6.0), BUILDING),
        // Toolbox
        Block::new(Vec3::new(-3.0, 0.4, -16.0), Vec3::new(2.0, 0.8, 1.0), BUILDING).yawed(20.0),
        // Mining trail
        Block::ramp(
            Vec3::new(-10.0, 0.0, -18.0),
            Vec3::new(-10.0, 3.5, -28.0),
            5.0,
            RAMP,
        ),
        Block::new(Vec3::new(-10.0, 3.0, -32.0), Vec3::new(8.0, 1.0, 8.0), ROCK),
        Block::ramp(
            Vec3::new(-14.0, 3.5, -34.0),
            Vec3::new(-21.0, 4.0, -40.0),
            4.0,
            RAMP,
        ),
        Block::new(Vec3::new(-26.0, 3.5, -44.0), Vec3::new(14.0, 1.0, 14.0), ROCK),
        Block::ramp(
            Vec3::new(-28.0, 4.0, -51.0),
            Vec3::new(-38.0, 8.5, -79.0),
            5.0,
            RAMP,
        ),
        Block::new(Vec3::new(-40.0, 8.0, -89.0), Vec3::new(20.0, 1.0, 20.0), ROCK),
        // Scree: too steep to stand on
        Block::ramp(
            Vec3::new(15.0, 0.0, -30.0),
            Vec3::new(15.0, 12.0, -37.0),
            8.0,
            CLIFF,
        ),
        // Eastern plateau and the climb to the city view
        Block::ramp(
            Vec3::new(25.0, 0.0, -60.0),
            Vec3::new(35.0, 8.0, -70.0),
            6.0,
            RAMP,
        ),
        Block::new(Vec3::new(50.0, 7.0, -80.0), Vec3::new(40.0, 2.0, 50.0), CLIFF),
        Block::ramp(
            Vec3::new(60.0, 8.0, -105.0),
            Vec3::new(70.0, 18.0, -120.0),
            6.0,
            RAMP,
        ),
        Block::new(Vec3::new(77.0, 17.5, -130.0), Vec3::new(20.0, 2.0, 20.0), CLIFF),
    ];

    // Scattered rocks
    for (x, z, size, yaw) in [
        (-6.0, -9.0, 0.8, 15.0),
        (5.0, -12.0, 1.2, 40.0),
        (-15.0, -22.0, 0.6, 70.0),
        (8.0, -25.0, 1.0, 5.0),
        (-30.0, -60.0, 1.4, 33.0),
        (20.0, -45.0, 0.9, 58.0),
    ] {
        blocks.push(
            Block::new(Vec3::new(x, size * 0.4, z), Vec3::splat(size), ROCK).yawed(yaw),
        );
    }

    blocks
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let blocks = blockout();

    for block in &blocks {
        commands.spawn((
            LevelGeometry,
            block.transform(),
            Mesh3d(meshes.add(Cuboid::from_size(block.size))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: block.color,
                perceptual_roughness: 0.9,
                metallic: 0.0,
                ..default()
            })),
        ));
    }

    // Low warm sun from the east, dim fill from above.
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(0.81, 0.53, 0.27),
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(100.0, 50.0, -20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(0.88, 0.62, 0.20),
            illuminance: 1_500.0,
            ..default()
        },
        Transform::from_xyz(-15.0, 100.0, -50.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let meshes: Vec<TriangleMesh> = blocks.iter().map(Block::triangle_mesh).collect();
    commands.insert_resource(LevelCollider(WorldCollider::build_from_meshes(&meshes)));
    info!("level ready: {} blocks", blocks.len());
}

fn spawn_loading_screen(mut commands: Commands) {
    commands.spawn((
        DespawnOnExit(AppState::Loading),
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..default()
        },
        BackgroundColor(Color::srgb(0.12, 0.12, 0.14)),
        children![(
            Text::new("Loading..."),
            TextFont {
                font_size: 28.0,
                ..default()
            },
            TextColor(Color::WHITE),
        )],
    ));
}

fn finish_loading(mut next: ResMut<NextState<AppState>>) {
    next.set(AppState::Playing);
}
