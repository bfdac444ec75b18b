use bevy::prelude::*;
use storybook_shared::ControlMode;

use crate::{ActiveMode, AppState};

#[derive(Component, Clone, Copy)]
struct ModeButton(ControlMode);

const BUTTON_IDLE: Color = Color::srgb(0.82, 0.82, 0.82);
const BUTTON_HOVER: Color = Color::srgb(0.53, 0.94, 0.67);

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(AppState::Splash), spawn_splash);
    app.add_systems(
        Update,
        (highlight_buttons, choose_by_click, choose_by_key).run_if(in_state(AppState::Splash)),
    );
}

fn spawn_splash(mut commands: Commands) {
    commands.spawn((
        DespawnOnExit(AppState::Splash),
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            row_gap: Val::Px(16.0),
            ..default()
        },
        BackgroundColor(Color::WHITE),
        children![
            title("The Last Survivor", 64.0),
            title("An Interactive Storybook Experience", 22.0),
            title(
                "Move with your keyboard and look with the mouse, or steer with one hand \
                 and set your pace by pinching the other (requires webcam).",
                14.0,
            ),
            (
                Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(32.0),
                    margin: UiRect::top(Val::Px(24.0)),
                    ..default()
                },
                children![
                    mode_button("[K] Keyboard & Cursor", ControlMode::Keyboard),
                    mode_button("[H] Hands & Webcam", ControlMode::Webcam),
                ],
            ),
        ],
    ));
}

fn title(text: &'static str, size: f32) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(Color::BLACK),
    )
}

fn mode_button(label: &'static str, mode: ControlMode) -> impl Bundle {
    (
        Button,
        ModeButton(mode),
        Node {
            padding: UiRect::axes(Val::Px(24.0), Val::Px(12.0)),
            ..default()
        },
        BackgroundColor(BUTTON_IDLE),
        children![(
            Text::new(label),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(Color::srgb(0.2, 0.2, 0.2)),
        )],
    )
}

fn highlight_buttons(
    mut buttons: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<ModeButton>)>,
) {
    for (interaction, mut background) in &mut buttons {
        background.0 = match interaction {
            Interaction::Hovered | Interaction::Pressed => BUTTON_HOVER,
            Interaction::None => BUTTON_IDLE,
        };
    }
}

fn choose_by_click(
    buttons: Query<(&Interaction, &ModeButton), Changed<Interaction>>,
    mut mode: ResMut<ActiveMode>,
    mut next: ResMut<NextState<AppState>>,
) {
    for (interaction, button) in &buttons {
        if *interaction == Interaction::Pressed {
            start(button.0, &mut mode, &mut next);
        }
    }
}

fn choose_by_key(
    keys: Res<ButtonInput<KeyCode>>,
    mut mode: ResMut<ActiveMode>,
    mut next: ResMut<NextState<AppState>>,
) {
    if keys.just_pressed(KeyCode::KeyK) {
        start(ControlMode::Keyboard, &mut mode, &mut next);
    } else if keys.just_pressed(KeyCode::KeyH) {
        start(ControlMode::Webcam, &mut mode, &mut next);
    }
}

fn start(choice: ControlMode, mode: &mut ActiveMode, next: &mut NextState<AppState>) {
    info!("control mode selected: {choice:?}");
    mode.0 = choice;
    next.set(AppState::Loading);
}
