//! Drive `bevy_panorbit_camera` towards a computed camera frame.
//!
//! PanOrbit stores the camera as focus + radius + yaw/pitch and eases its
//! current values towards the `target_*` ones, so a frame is converted into
//! that parameterisation before it is handed over.

use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;

use crate::core::framing::CameraFrame;
use crate::core::math::shortest_angle;

/// Camera placement in PanOrbit's orbit parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitPose {
    pub focus: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl OrbitPose {
    pub fn from_frame(frame: &CameraFrame) -> Self {
        let offset = frame.eye - frame.target;
        let radius = offset.length();
        let direction = offset.try_normalize().unwrap_or(Vec3::Z);
        Self {
            focus: frame.target,
            radius,
            yaw: direction.x.atan2(direction.z),
            pitch: direction.y.clamp(-1.0, 1.0).asin(),
        }
    }

    /// World-space camera position for this pose.
    pub fn eye(&self) -> Vec3 {
        self.focus
            + Vec3::new(
                self.radius * self.pitch.cos() * self.yaw.sin(),
                self.radius * self.pitch.sin(),
                self.radius * self.pitch.cos() * self.yaw.cos(),
            )
    }
}

/// Current PanOrbit placement as a camera frame.
pub fn current_frame(camera: &PanOrbitCamera, transform: &Transform) -> CameraFrame {
    CameraFrame {
        eye: transform.translation,
        target: camera.focus,
        up: Vec3::Y,
    }
}

/// Point the orbit camera at `pose`.
///
/// Yaw takes the short way round from the current target so the camera never
/// spins a full turn. With `snap` the current values jump there as well.
pub fn apply_pose(camera: &mut PanOrbitCamera, pose: OrbitPose, snap: bool) {
    let yaw = camera.target_yaw + shortest_angle(camera.target_yaw, pose.yaw);

    camera.target_focus = pose.focus;
    camera.target_radius = pose.radius;
    camera.target_yaw = yaw;
    camera.target_pitch = pose.pitch;

    if snap {
        camera.focus = pose.focus;
        camera.radius = Some(pose.radius);
        camera.yaw = Some(yaw);
        camera.pitch = Some(pose.pitch);
        camera.force_update = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_pose_round_trips_eye() {
        let frame = CameraFrame {
            eye: Vec3::new(12.0, 5.0, 4.0),
            target: Vec3::new(1.0, 0.0, -2.0),
            up: Vec3::Y,
        };
        let pose = OrbitPose::from_frame(&frame);
        assert!((pose.eye() - frame.eye).length() < EPSILON);
        assert_eq!(pose.focus, frame.target);
    }

    #[test]
    fn test_pose_on_positive_z_has_zero_angles() {
        let frame = CameraFrame {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        };
        let pose = OrbitPose::from_frame(&frame);
        assert!(pose.yaw.abs() < EPSILON);
        assert!(pose.pitch.abs() < EPSILON);
        assert!((pose.radius - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_apply_pose_sets_targets_only() {
        let mut camera = PanOrbitCamera {
            focus: Vec3::ZERO,
            radius: Some(5.0),
            ..default()
        };
        let pose = OrbitPose {
            focus: Vec3::new(8.0, 0.0, 0.0),
            radius: 3.0,
            yaw: 0.4,
            pitch: 0.2,
        };
        apply_pose(&mut camera, pose, false);

        assert_eq!(camera.target_focus, pose.focus);
        assert_eq!(camera.target_radius, 3.0);
        assert_eq!(camera.focus, Vec3::ZERO);
        assert_eq!(camera.radius, Some(5.0));
    }

    #[test]
    fn test_apply_pose_snap_updates_current_values() {
        let mut camera = PanOrbitCamera::default();
        let pose = OrbitPose {
            focus: Vec3::ONE,
            radius: 7.0,
            yaw: -0.3,
            pitch: FRAC_PI_2 * 0.5,
        };
        apply_pose(&mut camera, pose, true);

        assert_eq!(camera.focus, Vec3::ONE);
        assert_eq!(camera.radius, Some(7.0));
        assert_eq!(camera.pitch, Some(pose.pitch));
        assert!(camera.force_update);
    }

    #[test]
    fn test_apply_pose_takes_short_yaw_path() {
        let mut camera = PanOrbitCamera {
            target_yaw: 2.0 * PI + 3.0,
            ..default()
        };
        let pose = OrbitPose {
            focus: Vec3::ZERO,
            radius: 1.0,
            yaw: -3.0,
            pitch: 0.0,
        };
        apply_pose(&mut camera, pose, false);

        let travelled = camera.target_yaw - (2.0 * PI + 3.0);
        assert!(travelled.abs() < PI);
        assert!((travelled - (2.0 * PI - 6.0)).abs() < EPSILON);
    }
}
