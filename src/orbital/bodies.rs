//! Celestial body components and their per-tick evolution.

use bevy::prelude::*;

use crate::core::math::wrap_tau;

/// Which shading model and uniform set a body uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyRole {
    Star,
    Planet,
}

/// Immutable physical parameters of a body.
#[derive(Component, Clone, Copy, Debug)]
pub struct CelestialBody {
    pub radius: f32,
    /// Self-rotation about local +Y, radians per second.
    pub rotation_rate: f32,
    pub role: BodyRole,
}

impl CelestialBody {
    pub fn star(radius: f32, rotation_rate: f32) -> Self {
        Self {
            radius,
            rotation_rate,
            role: BodyRole::Star,
        }
    }

    pub fn planet(radius: f32, rotation_rate: f32) -> Self {
        Self {
            radius,
            rotation_rate,
            role: BodyRole::Planet,
        }
    }
}

/// Current self-rotation angle, wrapped into `[0, 2π)`.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Spin {
    pub angle: f32,
}

/// Marker for the mesh that carries a body's spin (the atmosphere shell does not).
#[derive(Component)]
pub struct BodySurface;

/// Circular orbit in the XZ plane of the body's parent.
#[derive(Component, Clone, Copy, Debug)]
pub struct OrbitPath {
    pub center: Vec3,
    pub radius: f32,
    /// Radians per second of scene time.
    pub angular_speed: f32,
}

impl OrbitPath {
    /// Position after `elapsed` seconds. Phase 0 sits at `center + (radius, 0, 0)`.
    ///
    /// The phase is reduced in `f64` so long sessions keep sub-frame precision.
    pub fn position_at(&self, elapsed: f64) -> Vec3 {
        let phase = (elapsed * f64::from(self.angular_speed)).rem_euclid(std::f64::consts::TAU);
        let phase = phase as f32;
        self.center + Vec3::new(self.radius * phase.cos(), 0.0, self.radius * phase.sin())
    }

    /// Time for one full revolution, `None` for a stationary path.
    pub fn period(&self) -> Option<f32> {
        (self.angular_speed.abs() > f32::EPSILON)
            .then(|| std::f32::consts::TAU / self.angular_speed.abs())
    }
}

/// Star-owned animation time, fed to the star shader.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct StarClock {
    pub time: f32,
}

/// The star lighting a planet.
#[derive(Component, Clone, Copy, Debug)]
pub struct Illuminator(pub Entity);

/// Advance a spin angle by `rate * dt`, wrapping to keep precision over long sessions.
pub fn advance_rotation(angle: f32, rate: f32, dt: f32) -> f32 {
    wrap_tau(angle + rate * dt)
}
