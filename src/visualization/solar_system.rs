//! Spawns the star, the orbiting planet, their atmosphere shells and the sky.

use bevy::prelude::*;

use crate::config::SceneConfig;
use crate::orbital::{
    BodySurface, CelestialBody, Illuminator, LightDirection, OrbitPath, Spin, StarClock,
};
use crate::ui::selection::Selectable;
use crate::ui::state::ShadingControls;
use crate::visualization::materials::{
    AtmosphereMaterial, PlanetMaterial, PlanetShading, StarAtmosphereMaterial, StarMaterial,
    StarShading,
};
use crate::visualization::sky_material::{SkyDome, SkyMaterial};

const SPHERE_SECTORS: u32 = 64;
const SPHERE_STACKS: u32 = 64;
/// Kept inside the camera far plane since the dome is centered on the camera.
const SKY_DOME_RADIUS: f32 = 80.0;

/// Parent of every body; framing "everything" means its descendants.
#[derive(Component)]
pub struct SolarSystemRoot;

/// Marks the atmosphere shell child of a body.
#[derive(Component)]
pub struct AtmosphereShell;

pub fn spawn_solar_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut planet_materials: ResMut<Assets<PlanetMaterial>>,
    mut atmosphere_materials: ResMut<Assets<AtmosphereMaterial>>,
    mut star_materials: ResMut<Assets<StarMaterial>>,
    mut star_atmosphere_materials: ResMut<Assets<StarAtmosphereMaterial>>,
    mut sky_materials: ResMut<Assets<SkyMaterial>>,
    config: Res<SceneConfig>,
    controls: Res<ShadingControls>,
) {
    let controls = controls.clamped();
    let root = commands
        .spawn((
            SolarSystemRoot,
            Transform::default(),
            Visibility::default(),
            Name::new("Solar System"),
        ))
        .id();

    // Star
    let star_cfg = &config.star;
    let star_mesh = meshes.add(
        Sphere::new(star_cfg.radius)
            .mesh()
            .uv(SPHERE_SECTORS, SPHERE_STACKS),
    );
    let star_shading = StarShading {
        surface: star_materials.add(StarMaterial::new(config.star_fallback_color())),
        atmosphere: star_atmosphere_materials
            .add(StarAtmosphereMaterial::new(controls.star_atmosphere_color)),
    };
    let star = commands
        .spawn((
            CelestialBody::star(star_cfg.radius, star_cfg.rotation_rate),
            Spin::default(),
            StarClock::default(),
            Selectable {
                radius: star_cfg.radius * star_cfg.atmosphere_scale.max(1.0),
            },
            Transform::default(),
            Visibility::default(),
            Name::new("Sun"),
            ChildOf(root),
        ))
        .with_children(|body| {
            body.spawn((
                BodySurface,
                Mesh3d(star_mesh.clone()),
                MeshMaterial3d(star_shading.surface.clone()),
                Transform::default(),
            ));
            body.spawn((
                AtmosphereShell,
                Mesh3d(star_mesh),
                MeshMaterial3d(star_shading.atmosphere.clone()),
                Transform::from_scale(Vec3::splat(star_cfg.atmosphere_scale)),
            ));
        })
        .insert(star_shading)
        .id();

    // Planet
    let planet_cfg = &config.planet;
    let planet_mesh = meshes.add(
        Sphere::new(planet_cfg.radius)
            .mesh()
            .uv(SPHERE_SECTORS, SPHERE_STACKS),
    );
    let orbit = OrbitPath {
        center: Vec3::ZERO,
        radius: planet_cfg.orbit_radius,
        angular_speed: planet_cfg.orbit_speed,
    };
    let planet_shading = PlanetShading {
        surface: planet_materials.add(PlanetMaterial::new(
            &controls,
            config.planet_fallback_color(),
        )),
        atmosphere: atmosphere_materials.add(AtmosphereMaterial::new(&controls)),
    };
    commands
        .spawn((
            CelestialBody::planet(planet_cfg.radius, planet_cfg.rotation_rate),
            Spin::default(),
            LightDirection::default(),
            Illuminator(star),
            orbit,
            Selectable {
                radius: planet_cfg.radius * planet_cfg.atmosphere_scale.max(1.0),
            },
            Transform::from_translation(orbit.position_at(0.0)),
            Visibility::default(),
            Name::new("Earth"),
            ChildOf(root),
        ))
        .with_children(|body| {
            body.spawn((
                BodySurface,
                Mesh3d(planet_mesh.clone()),
                MeshMaterial3d(planet_shading.surface.clone()),
                Transform::default(),
            ));
            body.spawn((
                AtmosphereShell,
                Mesh3d(planet_mesh),
                MeshMaterial3d(planet_shading.atmosphere.clone()),
                Transform::from_scale(Vec3::splat(planet_cfg.atmosphere_scale)),
            ));
        })
        .insert(planet_shading);

    // Background
    commands.spawn((
        SkyDome,
        Mesh3d(meshes.add(
            Sphere::new(SKY_DOME_RADIUS)
                .mesh()
                .uv(SPHERE_SECTORS, SPHERE_STACKS),
        )),
        MeshMaterial3d(sky_materials.add(SkyMaterial::new(config.background_color()))),
        Transform::default(),
        Name::new("Sky"),
    ));

    info!(
        "Spawned solar system: star r={}, planet r={} on orbit r={}",
        star_cfg.radius, planet_cfg.radius, planet_cfg.orbit_radius
    );
}
