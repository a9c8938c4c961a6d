//! Bounds-fit camera framing, ray picking and the click/drag discriminator.

use bevy::prelude::*;

/// Sphere enclosing a body (or a union of bodies).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Smallest sphere containing both `self` and `other`.
    pub fn union(&self, other: &BoundingSphere) -> BoundingSphere {
        let offset = other.center - self.center;
        let distance = offset.length();
        if distance + other.radius <= self.radius {
            return *self;
        }
        if distance + self.radius <= other.radius {
            return *other;
        }
        let radius = 0.5 * (distance + self.radius + other.radius);
        // distance > 0 here, otherwise one sphere would contain the other
        let center = self.center + offset * ((radius - self.radius) / distance);
        BoundingSphere { center, radius }
    }

    /// Union of all spheres, `None` for an empty set.
    pub fn enclosing(spheres: impl IntoIterator<Item = BoundingSphere>) -> Option<BoundingSphere> {
        spheres.into_iter().reduce(|acc, s| acc.union(&s))
    }

    /// Distance along the ray to the first intersection, if any.
    pub fn ray_hit(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let dir = direction.try_normalize()?;
        let to_center = self.center - origin;
        let along = to_center.dot(dir);
        let closest_sq = to_center.length_squared() - along * along;
        let radius_sq = self.radius * self.radius;
        if closest_sq > radius_sq {
            return None;
        }
        let half_chord = (radius_sq - closest_sq).sqrt();
        let near = along - half_chord;
        let far = along + half_chord;
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            // ray starts inside the sphere
            Some(0.0)
        } else {
            None
        }
    }
}

/// A camera pose: where it sits, what it looks at, and which way is up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

/// Projection parameters the framing has to respect.
#[derive(Clone, Copy, Debug)]
pub struct FramingLens {
    /// Vertical field of view, radians.
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
    /// Multiplier on the tight-fit distance; 1.0 touches the viewport edges.
    pub margin: f32,
}

impl FramingLens {
    /// Horizontal field of view derived from the vertical one.
    pub fn fov_x(&self) -> f32 {
        2.0 * ((self.fov_y * 0.5).tan() * self.aspect.max(f32::EPSILON)).atan()
    }

    /// Camera distance at which a sphere of `radius` fills the narrower axis.
    pub fn fit_distance(&self, radius: f32) -> f32 {
        let half_angle = 0.5 * self.fov_y.min(self.fov_x());
        self.margin * radius / half_angle.sin().max(f32::EPSILON)
    }
}

/// Frame `bounds`, keeping the direction the camera currently looks from.
pub fn frame_bounds(current: &CameraFrame, bounds: &BoundingSphere, lens: &FramingLens) -> CameraFrame {
    let direction = (current.eye - current.target)
        .try_normalize()
        .or_else(|| (current.eye - bounds.center).try_normalize())
        .unwrap_or(Vec3::Z);
    CameraFrame {
        eye: bounds.center + direction * lens.fit_distance(bounds.radius),
        target: bounds.center,
        up: Vec3::Y,
    }
}

/// Frame the union of `selection`; `None` (leave the camera alone) when empty.
pub fn frame_selection(
    current: &CameraFrame,
    selection: impl IntoIterator<Item = BoundingSphere>,
    lens: &FramingLens,
) -> Option<CameraFrame> {
    let bounds = BoundingSphere::enclosing(selection)?;
    Some(frame_bounds(current, &bounds, lens))
}

/// Near/far planes for a camera `distance` away from what it frames.
///
/// Far never drops below `min_far` so the sky dome stays inside the frustum.
pub fn clip_planes(distance: f32, min_far: f32) -> (f32, f32) {
    let distance = distance.max(f32::EPSILON);
    (distance / 100.0, (distance * 100.0).max(min_far))
}

/// Nearest candidate hit by the ray.
pub fn pick_nearest<T>(
    origin: Vec3,
    direction: Vec3,
    candidates: impl IntoIterator<Item = (T, BoundingSphere)>,
) -> Option<T> {
    candidates
        .into_iter()
        .filter_map(|(item, sphere)| sphere.ray_hit(origin, direction).map(|t| (item, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(item, _)| item)
}

/// Primary-button gesture on the 3D viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PointerGesture {
    #[default]
    Idle,
    /// Button is down but the pointer has not travelled past the threshold yet.
    PossibleDrag { origin: Vec2 },
    Dragging,
}

/// What a finished gesture amounted to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureOutcome {
    Click(Vec2),
    Drag,
}

impl PointerGesture {
    pub fn press(&mut self, at: Vec2) {
        *self = PointerGesture::PossibleDrag { origin: at };
    }

    pub fn moved(&mut self, at: Vec2, threshold_px: f32) {
        if let PointerGesture::PossibleDrag { origin } = *self
            && origin.distance(at) > threshold_px
        {
            *self = PointerGesture::Dragging;
        }
    }

    /// Finish the gesture. Releases without a matching press are ignored.
    pub fn release(&mut self, at: Vec2, threshold_px: f32) -> Option<GestureOutcome> {
        self.moved(at, threshold_px);
        let outcome = match *self {
            PointerGesture::Idle => None,
            PointerGesture::PossibleDrag { .. } => Some(GestureOutcome::Click(at)),
            PointerGesture::Dragging => Some(GestureOutcome::Drag),
        };
        *self = PointerGesture::Idle;
        outcome
    }
}
