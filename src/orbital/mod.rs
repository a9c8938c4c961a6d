//! Body motion and the per-frame lighting update
//!
//! Everything a frame needs happens in one chained pass: advance the scene
//! clock, move and spin bodies, derive each planet's light direction, then
//! copy the results into the material uniforms.

use bevy::prelude::*;

pub mod bodies;
pub mod scheduler;
pub mod time;

pub use bodies::{BodyRole, BodySurface, CelestialBody, Illuminator, OrbitPath, Spin, StarClock};
pub use scheduler::LightDirection;
pub use time::{SceneClock, advance_scene_clock};

/// Ordered steps of one scene tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TickSet {
    Clock,
    Orbits,
    Spin,
    Light,
    Uniforms,
    Star,
}

/// Plugin for body motion and uniform updates
pub struct OrbitalPlugin;

impl Plugin for OrbitalPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneClock>()
            .configure_sets(
                Update,
                (
                    TickSet::Clock,
                    TickSet::Orbits,
                    TickSet::Spin,
                    TickSet::Light,
                    TickSet::Uniforms,
                    TickSet::Star,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    (advance_scene_clock, scheduler::reset_body_state)
                        .chain()
                        .in_set(TickSet::Clock),
                    scheduler::update_orbits.in_set(TickSet::Orbits),
                    scheduler::update_spin.in_set(TickSet::Spin),
                    scheduler::update_light_directions.in_set(TickSet::Light),
                    scheduler::push_planet_uniforms.in_set(TickSet::Uniforms),
                    scheduler::advance_star_clocks.in_set(TickSet::Star),
                ),
            );
    }
}
