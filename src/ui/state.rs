//! UI state management

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::core::math::{clamp_color, spherical_to_cartesian};
use crate::visualization::shading::{
    DEFAULT_TERMINATOR_BAND, MAX_TERMINATOR_BAND, MIN_TERMINATOR_BAND,
};

/// Where the planets' light direction comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SunSource {
    /// Derived each tick from the star and planet world positions.
    #[default]
    Bodies,
    /// Taken from `sun_azimuth` / `sun_elevation`.
    Manual,
}

/// Live shading parameters; read by the scheduler at uniform-push time.
#[derive(Resource, Clone, Debug)]
pub struct ShadingControls {
    pub atmosphere_day_color: Color,
    pub atmosphere_twilight_color: Color,
    pub star_atmosphere_color: Color,
    /// Radians in `[-π, π]`, around +Y starting at +Z.
    pub sun_azimuth: f32,
    /// Polar angle from +Y, radians in `[0, π]`.
    pub sun_elevation: f32,
    pub terminator_band: f32,
    pub sun_source: SunSource,
    pub environment_reflections: bool,
}

impl Default for ShadingControls {
    fn default() -> Self {
        Self {
            atmosphere_day_color: Srgba::rgb_u8(0x00, 0xaa, 0xff).into(),
            atmosphere_twilight_color: Srgba::rgb_u8(0xff, 0x66, 0x00).into(),
            star_atmosphere_color: Srgba::rgb_u8(0x88, 0x08, 0x08).into(),
            sun_azimuth: 0.5,
            sun_elevation: FRAC_PI_2,
            terminator_band: DEFAULT_TERMINATOR_BAND,
            sun_source: SunSource::Bodies,
            environment_reflections: false,
        }
    }
}

impl ShadingControls {
    /// Copy with every value forced into its documented range.
    pub fn clamped(&self) -> Self {
        Self {
            atmosphere_day_color: clamp_color(self.atmosphere_day_color),
            atmosphere_twilight_color: clamp_color(self.atmosphere_twilight_color),
            star_atmosphere_color: clamp_color(self.star_atmosphere_color),
            sun_azimuth: clamp_finite(self.sun_azimuth, -PI, PI, 0.0),
            sun_elevation: clamp_finite(self.sun_elevation, 0.0, PI, FRAC_PI_2),
            terminator_band: clamp_finite(
                self.terminator_band,
                MIN_TERMINATOR_BAND,
                MAX_TERMINATOR_BAND,
                DEFAULT_TERMINATOR_BAND,
            ),
            sun_source: self.sun_source,
            environment_reflections: self.environment_reflections,
        }
    }

    /// Unit sun direction from the azimuth/elevation controls.
    pub fn manual_sun_direction(&self) -> Vec3 {
        let clamped = self.clamped();
        spherical_to_cartesian(1.0, clamped.sun_elevation, clamped.sun_azimuth)
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Main UI state resource
#[derive(Resource)]
pub struct UIState {
    pub show_hud: bool,
    pub show_panel: bool,
    /// Index into the atmosphere palette presets.
    pub palette: usize,
}

impl Default for UIState {
    fn default() -> Self {
        Self {
            show_hud: true,
            show_panel: true,
            palette: 0,
        }
    }
}
