//! Scene clock driving orbits, spin and star animation

use std::time::Duration;

use bevy::prelude::*;

/// Scene time resource.
///
/// `elapsed` is the monotonic time since the scene (re)started; orbits are
/// evaluated from it directly so variable frame timing cannot drift them.
/// `delta` is the scaled time since the previous tick, zero while paused.
/// `elapsed` is kept as a `Duration` so it does not lose precision as the
/// session grows.
#[derive(Resource, Debug, Clone)]
pub struct SceneClock {
    pub elapsed: Duration,
    pub delta: f32,
    pub time_scale: f32,
    pub paused: bool,
    /// Set by `restart`; consumed by the tick to reset body-owned state.
    pub restart_pending: bool,
}

impl Default for SceneClock {
    fn default() -> Self {
        Self {
            elapsed: Duration::ZERO,
            delta: 0.0,
            time_scale: 1.0,
            paused: false,
            restart_pending: false,
        }
    }
}

impl SceneClock {
    pub fn with_time_scale(time_scale: f32) -> Self {
        Self {
            time_scale: time_scale.max(0.0),
            ..default()
        }
    }

    /// Advance by `real_delta` real seconds.
    pub fn advance(&mut self, real_delta: f32) {
        self.delta = if self.paused {
            0.0
        } else {
            (real_delta * self.time_scale).max(0.0)
        };
        self.elapsed += Duration::try_from_secs_f32(self.delta).unwrap_or_default();
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Go back to `elapsed = 0`; body state is reset on the next tick.
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.delta = 0.0;
        self.restart_pending = true;
    }
}

/// System to advance the scene clock from Bevy's frame time
pub fn advance_scene_clock(time: Res<Time>, mut clock: ResMut<SceneClock>) {
    if clock.restart_pending {
        // the restart frame itself reproduces t = 0
        clock.delta = 0.0;
        return;
    }
    clock.advance(time.delta_secs());
}
