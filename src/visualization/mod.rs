//! Visualization module
//!
//! Custom body materials and their shaders, the texture library, the sky
//! background and the startup scene spawn.

use bevy::prelude::*;
use bevy::transform::TransformSystems;
use bevy_panorbit_camera::PanOrbitCameraSystemSet;

pub mod assets;
pub mod materials;
pub mod shading;
pub mod sky_material;
pub mod solar_system;

use materials::{AtmosphereMaterial, PlanetMaterial, StarAtmosphereMaterial, StarMaterial};
use sky_material::SkyMaterial;

use crate::orbital::TickSet;

/// Startup ordering so texture handles exist before the scene spawns.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum StartupSet {
    Assets,
    Scene,
}

/// Plugin for body rendering and the background
pub struct VisualizationPlugin;

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            MaterialPlugin::<PlanetMaterial>::default(),
            MaterialPlugin::<AtmosphereMaterial>::default(),
            MaterialPlugin::<StarMaterial>::default(),
            MaterialPlugin::<StarAtmosphereMaterial>::default(),
            MaterialPlugin::<SkyMaterial>::default(),
        ))
        .configure_sets(Startup, (StartupSet::Assets, StartupSet::Scene).chain())
        .add_systems(
            Startup,
            (
                assets::load_scene_textures.in_set(StartupSet::Assets),
                solar_system::spawn_solar_system.in_set(StartupSet::Scene),
            ),
        )
        .add_systems(
            Update,
            (
                // bound before the push so the flags match this frame's textures
                assets::bind_loaded_textures
                    .in_set(TickSet::Uniforms)
                    .before(crate::orbital::scheduler::push_planet_uniforms),
                assets::report_failed_loads,
            ),
        )
        .add_systems(
            PostUpdate,
            sky_material::follow_camera
                .after(PanOrbitCameraSystemSet)
                .before(TransformSystems::Propagate),
        );
    }
}
