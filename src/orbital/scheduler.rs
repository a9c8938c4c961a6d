//! Per-frame body update and uniform push.
//!
//! The systems here run in the chained [`TickSet`](super::TickSet) order, so
//! every uniform the renderer extracts reflects this frame's body positions.

use bevy::prelude::*;

use crate::core::hierarchy::TransformNodes;
use crate::core::math::direction_between;
use crate::orbital::bodies::{
    BodyRole, BodySurface, CelestialBody, Illuminator, OrbitPath, Spin, StarClock,
    advance_rotation,
};
use crate::orbital::time::SceneClock;
use crate::ui::state::{ShadingControls, SunSource};
use crate::visualization::materials::{
    AtmosphereMaterial, PlanetMaterial, PlanetShading, StarAtmosphereMaterial, StarMaterial,
    StarShading,
};
use crate::visualization::shading::STAR_FLICKER_PERIOD;

/// Most recent unit direction from a planet towards its star.
#[derive(Component, Clone, Copy, Debug)]
pub struct LightDirection(pub Vec3);

impl Default for LightDirection {
    fn default() -> Self {
        Self(Vec3::X)
    }
}

/// Direction from `planet` to `star`; keeps `previous` when the two coincide.
pub fn light_direction(star: Vec3, planet: Vec3, previous: Vec3) -> Vec3 {
    direction_between(planet, star).unwrap_or(previous)
}

/// Put spin and star time back to zero after a clock restart.
pub fn reset_body_state(
    mut clock: ResMut<SceneClock>,
    mut spins: Query<&mut Spin>,
    mut star_clocks: Query<&mut StarClock>,
) {
    if !clock.restart_pending {
        return;
    }
    for mut spin in &mut spins {
        spin.angle = 0.0;
    }
    for mut star_clock in &mut star_clocks {
        star_clock.time = 0.0;
    }
    clock.restart_pending = false;
    info!("Scene clock restarted");
}

/// Step 1: place orbiting bodies from absolute scene time.
pub fn update_orbits(clock: Res<SceneClock>, mut bodies: Query<(&OrbitPath, &mut Transform)>) {
    for (path, mut transform) in &mut bodies {
        transform.translation = path.position_at(clock.elapsed_secs());
    }
}

/// Step 2: advance self-rotation and apply it to the body's surface mesh.
pub fn update_spin(
    clock: Res<SceneClock>,
    mut bodies: Query<(&CelestialBody, &mut Spin, &Children)>,
    mut surfaces: Query<&mut Transform, With<BodySurface>>,
) {
    for (body, mut spin, children) in &mut bodies {
        spin.angle = advance_rotation(spin.angle, body.rotation_rate, clock.delta);
        for child in children.iter() {
            if let Ok(mut transform) = surfaces.get_mut(child) {
                transform.rotation = Quat::from_rotation_y(spin.angle);
            }
        }
    }
}

/// Step 3: recompute each planet's light direction from world positions.
pub fn update_light_directions(
    controls: Res<ShadingControls>,
    nodes: TransformNodes,
    bodies: Query<&CelestialBody>,
    mut planets: Query<(Entity, Option<&Illuminator>, &mut LightDirection)>,
) {
    for (planet, illuminator, mut light) in &mut planets {
        let star_position = match controls.sun_source {
            SunSource::Manual => None,
            SunSource::Bodies => illuminator
                .map(|i| i.0)
                .filter(|star| bodies.get(*star).is_ok_and(|b| b.role == BodyRole::Star))
                .and_then(|star| nodes.world_translation(star)),
        };

        light.0 = match (star_position, nodes.world_translation(planet)) {
            (Some(star), Some(planet)) => light_direction(star, planet, light.0),
            _ => controls.manual_sun_direction(),
        };
    }
}

/// Step 4: copy light direction and current controls into planet uniforms.
pub fn push_planet_uniforms(
    controls: Res<ShadingControls>,
    planets: Query<(&LightDirection, &PlanetShading)>,
    mut surfaces: ResMut<Assets<PlanetMaterial>>,
    mut atmospheres: ResMut<Assets<AtmosphereMaterial>>,
) {
    let controls = controls.clamped();
    for (light, shading) in &planets {
        if let Some(material) = surfaces.get_mut(&shading.surface) {
            material.set_lighting(light.0, &controls);
        }
        if let Some(material) = atmospheres.get_mut(&shading.atmosphere) {
            material.set_lighting(light.0, &controls);
        }
    }
}

/// Step 5: advance star time and push it with the glow color.
pub fn advance_star_clocks(
    clock: Res<SceneClock>,
    controls: Res<ShadingControls>,
    mut stars: Query<(&mut StarClock, &StarShading)>,
    mut surfaces: ResMut<Assets<StarMaterial>>,
    mut atmospheres: ResMut<Assets<StarAtmosphereMaterial>>,
) {
    let glow = controls.clamped().star_atmosphere_color;
    for (mut star_clock, shading) in &mut stars {
        // The flicker is periodic, so wrapping keeps precision without a visible jump.
        star_clock.time = (star_clock.time + clock.delta).rem_euclid(STAR_FLICKER_PERIOD);
        if let Some(material) = surfaces.get_mut(&shading.surface) {
            material.set_time(star_clock.time);
        }
        if let Some(material) = atmospheres.get_mut(&shading.atmosphere) {
            material.set_color(glow);
        }
    }
}
