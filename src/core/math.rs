//! Small vector and color helpers shared by the shading model and the scheduler.

use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

/// Hermite interpolation between two edges, as in WGSL `smoothstep`.
///
/// Callers must keep `edge0 < edge1`; the result is clamped to `[0, 1]`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear blend between two colors, as in WGSL `mix`.
pub fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_tau(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest signed difference `to - from`, in `[-π, π]`.
pub fn shortest_angle(from: f32, to: f32) -> f32 {
    (to - from + PI).rem_euclid(TAU) - PI
}

/// Unit vector from spherical angles.
///
/// `polar` is measured from +Y (0 = straight up, π = straight down) and
/// `azimuth` rotates around +Y starting at +Z towards +X.
pub fn spherical_to_cartesian(radius: f32, polar: f32, azimuth: f32) -> Vec3 {
    let sin_polar = polar.sin();
    Vec3::new(
        radius * sin_polar * azimuth.sin(),
        radius * polar.cos(),
        radius * sin_polar * azimuth.cos(),
    )
}

/// Normalized `to - from`, or `None` when the points coincide.
pub fn direction_between(from: Vec3, to: Vec3) -> Option<Vec3> {
    (to - from).try_normalize()
}

/// Equirectangular texture coordinates for a view direction.
pub fn equirect_uv(direction: Vec3) -> Vec2 {
    let dir = direction.normalize_or_zero();
    let u = 0.5 + dir.x.atan2(dir.z) / TAU;
    let v = 0.5 - dir.y.clamp(-1.0, 1.0).asin() / PI;
    Vec2::new(u, v)
}

/// Reflect `incident` about `normal`, as in WGSL `reflect`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Linear RGB triple of a color, clamped to `[0, 1]`.
pub fn linear_rgb(color: Color) -> Vec3 {
    let linear = color.to_linear();
    Vec3::new(linear.red, linear.green, linear.blue).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Clamp every sRGB channel of a color into `[0, 1]`, keeping alpha opaque.
pub fn clamp_color(color: Color) -> Color {
    let srgba = color.to_srgba();
    Color::srgb(
        sanitize_channel(srgba.red),
        sanitize_channel(srgba.green),
        sanitize_channel(srgba.blue),
    )
}

fn sanitize_channel(value: f32) -> f32 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}
