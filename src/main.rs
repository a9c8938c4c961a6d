use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};

use bevy_feathers::FeathersPlugins;
use bevy_feathers::dark_theme::create_dark_theme;
use bevy_feathers::palette;
use bevy_feathers::theme::UiTheme;
use bevy_input_focus::directional_navigation::DirectionalNavigationPlugin;
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

#[cfg(feature = "dev")]
use bevy::dev_tools::fps_overlay::FpsOverlayPlugin;

mod config;
mod core;
mod orbital;
mod ui;
mod visualization;

use config::{ConfigPlugin, SceneConfig};
use core::framing::CameraFrame;
use core::orbit_camera::OrbitPose;
use orbital::OrbitalPlugin;
use ui::{MainCamera, UiPlugin};
use visualization::VisualizationPlugin;

pub fn setup_camera(mut commands: Commands, config: Res<SceneConfig>) {
    let camera_cfg = &config.camera;
    let [x, y, z] = camera_cfg.eye;
    let pose = OrbitPose::from_frame(&CameraFrame {
        eye: Vec3::new(x, y, z),
        target: Vec3::ZERO,
        up: Vec3::Y,
    });

    let pan_orbit = PanOrbitCamera {
        focus: pose.focus,
        radius: Some(pose.radius),
        yaw: Some(pose.yaw),
        pitch: Some(pose.pitch),
        force_update: true,
        ..default()
    };

    commands.insert_resource(ClearColor(config.background_color()));
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera_cfg.fov_degrees.to_radians(),
            near: camera_cfg.near,
            far: camera_cfg.far,
            ..default()
        }),
        pan_orbit,
        MainCamera,
        // body shaders output display colors already
        Tonemapping::None,
        Transform::from_translation(pose.eye()).looking_at(pose.focus, Vec3::Y),
        Name::new("Main Camera"),
    ));
}

/// Dark feathers theme with the panel's slider and checkbox colors filled in.
fn panel_theme() -> UiTheme {
    let mut theme = UiTheme(create_dark_theme());
    theme.set_color("feathers.window.bg", Color::srgba(0.02, 0.04, 0.07, 0.85));
    theme.set_color("feathers.text.main", palette::LIGHT_GRAY_1);
    theme.set_color("feathers.text.dim", palette::LIGHT_GRAY_2);
    theme.set_color("feathers.focus", palette::ACCENT);
    theme.set_color("feathers.slider.bg", Color::srgba(0.04, 0.08, 0.12, 0.9));
    theme.set_color("feathers.slider.bar", Color::srgba(0.18, 0.7, 0.8, 0.7));
    theme.set_color(
        "feathers.slider.bar.disabled",
        Color::srgba(0.1, 0.3, 0.35, 0.45),
    );
    theme.set_color("feathers.slider.text", Color::srgba(0.5, 0.9, 0.95, 0.95));
    theme.set_color(
        "feathers.slider.text.disabled",
        Color::srgba(0.4, 0.55, 0.6, 0.7),
    );
    theme.set_color("feathers.checkbox.bg", Color::srgba(0.04, 0.08, 0.12, 0.9));
    theme.set_color(
        "feathers.checkbox.bg.checked",
        Color::srgba(0.18, 0.7, 0.8, 0.9),
    );
    theme.set_color("feathers.checkbox.border", Color::srgba(0.3, 0.6, 0.7, 0.9));
    theme.set_color("feathers.checkbox.mark", Color::srgba(0.6, 1.0, 1.0, 1.0));
    theme
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Bevy Solar System".to_string(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }));

    #[cfg(feature = "dev")]
    app.add_plugins(FpsOverlayPlugin::default());

    // Feathers initializes `UiTheme` but does not populate it by default.
    app.insert_resource(panel_theme());
    app.add_plugins(FeathersPlugins);
    app.add_plugins(DirectionalNavigationPlugin);

    app.add_plugins(PanOrbitCameraPlugin);

    app.add_plugins(ConfigPlugin);
    app.add_plugins(OrbitalPlugin);
    app.add_plugins(VisualizationPlugin);
    app.add_plugins(UiPlugin);
    app.add_systems(Startup, setup_camera);

    app.run();
}
