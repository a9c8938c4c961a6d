//! CPU reference of the body shaders.
//!
//! Every function here has a line-for-line WGSL counterpart under
//! `assets/shaders/`. Directions follow the shader conventions: `normal` is
//! the outward surface normal, `view` points from the camera to the fragment
//! and `sun` points from the fragment towards the star.

use bevy::prelude::*;

use crate::core::math::{mix, reflect, smoothstep};

pub const DEFAULT_TERMINATOR_BAND: f32 = 0.1;
pub const MIN_TERMINATOR_BAND: f32 = 0.01;
pub const MAX_TERMINATOR_BAND: f32 = 2.0;

const CLOUD_COLOR: Vec3 = Vec3::ONE;
const SPECULAR_EXPONENT: f32 = 32.0;
const ENVIRONMENT_STRENGTH: f32 = 0.35;
const STAR_FLICKER_AMPLITUDE: f32 = 0.06;
const STAR_FLICKER_SPEED: f32 = 0.8;
const STAR_FLICKER_SCALE: f32 = 24.0;

/// Time after which the star flicker repeats exactly.
pub const STAR_FLICKER_PERIOD: f32 = std::f32::consts::TAU / STAR_FLICKER_SPEED;

/// Geometry of one fragment.
#[derive(Clone, Copy, Debug)]
pub struct Fragment {
    pub normal: Vec3,
    pub view: Vec3,
}

impl Fragment {
    /// Renormalizes both vectors; scaled transforms leave them off unit length.
    pub fn new(normal: Vec3, view: Vec3) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            view: view.normalize_or_zero(),
        }
    }

    pub fn sun_facing(&self, sun: Vec3) -> f32 {
        self.normal.dot(sun)
    }
}

/// Uniform inputs shared by the planet surface and its atmosphere.
#[derive(Clone, Copy, Debug)]
pub struct PlanetLighting {
    pub sun_direction: Vec3,
    pub terminator_band: f32,
    pub atmosphere_day_color: Vec3,
    pub atmosphere_twilight_color: Vec3,
    pub fallback_color: Vec3,
}

/// Texture samples at the fragment; `None` while a texture is still loading.
#[derive(Clone, Copy, Debug, Default)]
pub struct SurfaceSamples {
    pub day: Option<Vec3>,
    pub night: Option<Vec3>,
    /// `x` = specular mask, `y` = cloud mask.
    pub specular_clouds: Option<Vec2>,
    /// Panorama sampled along the reflected view ray, when reflections are on.
    pub environment: Option<Vec3>,
}

/// Soft day/night blend factor: 0 on the night side, 1 on the day side.
///
/// The band is centered on the terminator, so `sun_facing == 0` yields 0.5.
pub fn day_factor(sun_facing: f32, band: f32) -> f32 {
    let half = 0.5 * band.clamp(MIN_TERMINATOR_BAND, MAX_TERMINATOR_BAND);
    smoothstep(-half, half, sun_facing)
}

/// How strongly the atmosphere tints the surface rim.
pub fn atmosphere_day_mix(sun_facing: f32) -> f32 {
    smoothstep(-0.5, 1.0, sun_facing)
}

/// Rim factor for a back-face shell: 0 at the shell edge, 1 just outside the planet silhouette.
pub fn rim_factor(fragment: &Fragment) -> f32 {
    smoothstep(0.0, 0.5, fragment.view.dot(fragment.normal))
}

/// Atmosphere color at this fragment, from twilight to day.
pub fn atmosphere_color(sun_facing: f32, lighting: &PlanetLighting) -> Vec3 {
    mix(
        lighting.atmosphere_twilight_color,
        lighting.atmosphere_day_color,
        day_factor(sun_facing, lighting.terminator_band),
    )
}

pub fn shade_planet_surface(
    fragment: &Fragment,
    lighting: &PlanetLighting,
    samples: &SurfaceSamples,
) -> Vec3 {
    let sun = lighting.sun_direction;
    let sun_facing = fragment.sun_facing(sun);
    let day_mix = day_factor(sun_facing, lighting.terminator_band);

    let mut color = match (samples.day, samples.night) {
        (Some(day), Some(night)) => mix(night, day, day_mix),
        _ => lighting.fallback_color,
    };

    let mask = samples.specular_clouds.unwrap_or(Vec2::ZERO);
    let cloud_mix = smoothstep(0.5, 1.0, mask.y);
    color = mix(color, CLOUD_COLOR, cloud_mix);

    let fresnel = (fragment.view.dot(fragment.normal) + 1.0).powi(2);
    let rim_mix = atmosphere_day_mix(sun_facing);
    let rim_color = mix(
        lighting.atmosphere_twilight_color,
        lighting.atmosphere_day_color,
        rim_mix,
    );
    color = mix(color, rim_color, fresnel * rim_mix);

    let reflection = reflect(-sun, fragment.normal);
    let specular = (-reflection.dot(fragment.view)).max(0.0).powf(SPECULAR_EXPONENT) * mask.x;
    color += specular * mix(Vec3::ONE, rim_color, fresnel.min(1.0));

    if let Some(environment) = samples.environment {
        color += environment * mask.x * ENVIRONMENT_STRENGTH * day_mix;
    }

    color
}

/// Atmosphere shell color and alpha; fades out on the night side.
pub fn shade_planet_atmosphere(fragment: &Fragment, lighting: &PlanetLighting) -> Vec4 {
    let sun_facing = fragment.sun_facing(lighting.sun_direction);
    let color = atmosphere_color(sun_facing, lighting);
    let fade = smoothstep(-0.5, 0.0, sun_facing);
    color.extend(rim_factor(fragment) * fade)
}

/// Slow brightness modulation of the star surface.
pub fn star_flicker(time: f32, uv: Vec2) -> f32 {
    1.0 + STAR_FLICKER_AMPLITUDE * (time * STAR_FLICKER_SPEED + (uv.x + uv.y) * STAR_FLICKER_SCALE).sin()
}

/// Emissive star surface; no lighting term.
pub fn shade_star_surface(uv: Vec2, time: f32, sample: Option<Vec3>, fallback: Vec3) -> Vec3 {
    sample.unwrap_or(fallback) * star_flicker(time, uv)
}

/// Single-color glow around the star.
pub fn shade_star_atmosphere(fragment: &Fragment, color: Vec3) -> Vec4 {
    color.extend(rim_factor(fragment))
}
