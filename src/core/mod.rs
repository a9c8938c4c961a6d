//! Scene-independent math, hierarchy and camera helpers

pub mod framing;
pub mod hierarchy;
pub mod math;
pub mod orbit_camera;
