//! Keyboard bindings for the shading controls and the text HUD reporting them.

use bevy::prelude::*;

use crate::orbital::{BodyRole, CelestialBody, LightDirection, SceneClock};
use crate::ui::MainCamera;
use crate::ui::selection::PointerState;
use crate::ui::state::{ShadingControls, SunSource, UIState};
use crate::visualization::shading::day_factor;

/// Radians per second while an arrow key is held.
const SUN_ANGLE_RATE: f32 = 1.0;
const BAND_STEP: f32 = 1.25;

const KEY_HELP: &str = "arrows: sun  M: sun source  C: palette  E: reflections  [ ]: terminator  \
                        space: pause  R: restart  H: hide text  P: hide panel";

/// Named atmosphere color pairs, cycled with `C`.
pub fn atmosphere_palette(index: usize) -> (&'static str, Color, Color) {
    match index % 3 {
        0 => (
            "Earth",
            Srgba::rgb_u8(0x00, 0xaa, 0xff).into(),
            Srgba::rgb_u8(0xff, 0x66, 0x00).into(),
        ),
        1 => (
            "Mars",
            Srgba::rgb_u8(0xd9, 0x8c, 0x5f).into(),
            Srgba::rgb_u8(0x4f, 0x8f, 0xd6).into(),
        ),
        _ => (
            "Alien",
            Srgba::rgb_u8(0x7c, 0xff, 0x9e).into(),
            Srgba::rgb_u8(0xc0, 0x3c, 0xff).into(),
        ),
    }
}

/// Marks the HUD text node.
#[derive(Component)]
pub struct HudText;

pub fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgba(0.7, 0.9, 1.0, 0.9)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        HudText,
        Pickable::IGNORE,
    ));
}

pub fn handle_control_keys(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut controls: ResMut<ShadingControls>,
    mut clock: ResMut<SceneClock>,
    mut ui_state: ResMut<UIState>,
) {
    let step = SUN_ANGLE_RATE * time.delta_secs();
    let mut azimuth = 0.0;
    let mut elevation = 0.0;
    if keys.pressed(KeyCode::ArrowLeft) {
        azimuth -= step;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        azimuth += step;
    }
    if keys.pressed(KeyCode::ArrowUp) {
        elevation -= step;
    }
    if keys.pressed(KeyCode::ArrowDown) {
        elevation += step;
    }
    if azimuth != 0.0 || elevation != 0.0 {
        controls.sun_azimuth += azimuth;
        controls.sun_elevation += elevation;
        *controls = controls.clamped();
    }

    if keys.just_pressed(KeyCode::KeyM) {
        controls.sun_source = match controls.sun_source {
            SunSource::Bodies => SunSource::Manual,
            SunSource::Manual => SunSource::Bodies,
        };
        info!("Sun source: {:?}", controls.sun_source);
    }
    if keys.just_pressed(KeyCode::KeyC) {
        ui_state.palette = (ui_state.palette + 1) % 3;
        let (name, day, twilight) = atmosphere_palette(ui_state.palette);
        controls.atmosphere_day_color = day;
        controls.atmosphere_twilight_color = twilight;
        info!("Atmosphere palette: {name}");
    }
    if keys.just_pressed(KeyCode::KeyE) {
        controls.environment_reflections = !controls.environment_reflections;
    }
    if keys.just_pressed(KeyCode::BracketLeft) {
        controls.terminator_band /= BAND_STEP;
        *controls = controls.clamped();
    }
    if keys.just_pressed(KeyCode::BracketRight) {
        controls.terminator_band *= BAND_STEP;
        *controls = controls.clamped();
    }

    if keys.just_pressed(KeyCode::Space) {
        clock.paused = !clock.paused;
        info!("Scene clock {}", if clock.paused { "paused" } else { "resumed" });
    }
    if keys.just_pressed(KeyCode::KeyR) {
        clock.restart();
    }
    if keys.just_pressed(KeyCode::KeyH) {
        ui_state.show_hud = !ui_state.show_hud;
    }
    if keys.just_pressed(KeyCode::KeyP) {
        ui_state.show_panel = !ui_state.show_panel;
    }
}

/// Everything the HUD prints, gathered by `update_hud`.
pub struct HudSnapshot<'a> {
    pub controls: &'a ShadingControls,
    pub clock: &'a SceneClock,
    pub palette: usize,
    pub hovered: Option<&'a str>,
    /// Daylight fraction of the planet point facing the camera.
    pub camera_side_daylight: Option<f32>,
}

pub fn hud_text(snapshot: &HudSnapshot) -> String {
    let controls = snapshot.controls;
    let sun = match controls.sun_source {
        SunSource::Bodies => "star position".to_string(),
        SunSource::Manual => format!(
            "manual (azimuth {:.2}, elevation {:.2})",
            controls.sun_azimuth, controls.sun_elevation
        ),
    };
    let (palette, _, _) = atmosphere_palette(snapshot.palette);
    let clock = &snapshot.clock;

    let mut lines = vec![
        format!("Sun: {sun}"),
        format!(
            "Terminator band {:.3}  Reflections {}  Palette {palette}",
            controls.terminator_band,
            if controls.environment_reflections { "on" } else { "off" },
        ),
        format!(
            "Time {:.1} s  x{:.1}{}",
            clock.elapsed_secs(),
            clock.time_scale,
            if clock.paused { "  [paused]" } else { "" }
        ),
        format!("Hover: {}", snapshot.hovered.unwrap_or("-")),
    ];
    if let Some(daylight) = snapshot.camera_side_daylight {
        lines.push(format!("Facing camera: {:.0}% daylight", daylight * 100.0));
    }
    lines.push(KEY_HELP.to_string());
    lines.join("\n")
}

pub fn update_hud(
    ui_state: Res<UIState>,
    controls: Res<ShadingControls>,
    clock: Res<SceneClock>,
    pointer: Res<PointerState>,
    names: Query<&Name>,
    planets: Query<(&CelestialBody, &GlobalTransform, &LightDirection)>,
    camera: Single<&GlobalTransform, With<MainCamera>>,
    hud: Single<(&mut Text, &mut Visibility), With<HudText>>,
) {
    let (mut text, mut visibility) = hud.into_inner();
    visibility.set_if_neq(if ui_state.show_hud {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    });
    if !ui_state.show_hud {
        return;
    }

    let band = controls.clamped().terminator_band;
    let camera_side_daylight = planets
        .iter()
        .find(|(body, _, _)| body.role == BodyRole::Planet)
        .and_then(|(_, transform, light)| {
            let normal = (camera.translation() - transform.translation()).try_normalize()?;
            Some(day_factor(normal.dot(light.0), band))
        });

    let snapshot = HudSnapshot {
        controls: &controls,
        clock: &clock,
        palette: ui_state.palette,
        hovered: pointer
            .hovered
            .and_then(|entity| names.get(entity).ok())
            .map(Name::as_str),
        camera_side_daylight,
    };
    text.0 = hud_text(&snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use std::time::Duration;

    fn control_world() -> World {
        let mut world = World::new();
        world.insert_resource(ButtonInput::<KeyCode>::default());
        world.insert_resource(Time::<()>::default());
        world.insert_resource(ShadingControls::default());
        world.insert_resource(SceneClock::default());
        world.insert_resource(UIState::default());
        world
    }

    fn press(world: &mut World, key: KeyCode) {
        let mut input = world.resource_mut::<ButtonInput<KeyCode>>();
        input.clear();
        input.press(key);
    }

    #[test]
    fn test_sun_source_toggle() {
        let mut world = control_world();
        press(&mut world, KeyCode::KeyM);
        world.run_system_once(handle_control_keys).unwrap();
        assert_eq!(world.resource::<ShadingControls>().sun_source, SunSource::Manual);
    }

    #[test]
    fn test_palette_cycle_updates_colors() {
        let mut world = control_world();
        press(&mut world, KeyCode::KeyC);
        world.run_system_once(handle_control_keys).unwrap();

        let (_, day, twilight) = atmosphere_palette(1);
        let controls = world.resource::<ShadingControls>();
        assert_eq!(controls.atmosphere_day_color, day);
        assert_eq!(controls.atmosphere_twilight_color, twilight);
        assert_eq!(world.resource::<UIState>().palette, 1);
    }

    #[test]
    fn test_band_keys_stay_in_range() {
        let mut world = control_world();
        for _ in 0..40 {
            press(&mut world, KeyCode::BracketRight);
            world.run_system_once(handle_control_keys).unwrap();
        }
        assert_eq!(world.resource::<ShadingControls>().terminator_band, 2.0);

        for _ in 0..80 {
            press(&mut world, KeyCode::BracketLeft);
            world.run_system_once(handle_control_keys).unwrap();
        }
        assert_eq!(world.resource::<ShadingControls>().terminator_band, 0.01);
    }

    #[test]
    fn test_pause_and_restart_keys() {
        let mut world = control_world();
        world.resource_mut::<SceneClock>().elapsed = Duration::from_secs(42);

        press(&mut world, KeyCode::Space);
        world.run_system_once(handle_control_keys).unwrap();
        assert!(world.resource::<SceneClock>().paused);

        press(&mut world, KeyCode::KeyR);
        world.run_system_once(handle_control_keys).unwrap();
        let clock = world.resource::<SceneClock>();
        assert_eq!(clock.elapsed, Duration::ZERO);
        assert!(clock.restart_pending);
    }

    #[test]
    fn test_panel_key_hides_panel() {
        let mut world = control_world();
        press(&mut world, KeyCode::KeyP);
        world.run_system_once(handle_control_keys).unwrap();
        assert!(!world.resource::<UIState>().show_panel);
        assert!(world.resource::<UIState>().show_hud);
    }

    #[test]
    fn test_hud_text_reports_state() {
        let controls = ShadingControls {
            sun_source: SunSource::Manual,
            environment_reflections: true,
            ..default()
        };
        let clock = SceneClock {
            paused: true,
            ..default()
        };
        let text = hud_text(&HudSnapshot {
            controls: &controls,
            clock: &clock,
            palette: 0,
            hovered: Some("Earth"),
            camera_side_daylight: Some(0.5),
        });
        assert!(text.contains("manual"));
        assert!(text.contains("Reflections on"));
        assert!(text.contains("[paused]"));
        assert!(text.contains("Hover: Earth"));
        assert!(text.contains("50% daylight"));
    }

    #[test]
    fn test_default_palette_matches_default_controls() {
        let (_, day, twilight) = atmosphere_palette(0);
        let controls = ShadingControls::default();
        assert_eq!(day, controls.atmosphere_day_color);
        assert_eq!(twilight, controls.atmosphere_twilight_color);
    }
}
