//! Explicit world-transform queries over the scene hierarchy.
//!
//! Bevy only propagates `GlobalTransform` in `PostUpdate`, after the tick has
//! already moved bodies. The scheduler needs positions that include this
//! frame's parent motion, so it composes the local transforms itself.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Read access to every node's local transform and parent link.
#[derive(SystemParam)]
pub struct TransformNodes<'w, 's> {
    nodes: Query<'w, 's, (&'static Transform, Option<&'static ChildOf>)>,
}

impl TransformNodes<'_, '_> {
    /// World transform of `entity`, composed from the root down.
    ///
    /// Returns `None` if the entity (or any ancestor) has no `Transform`.
    pub fn world_transform(&self, entity: Entity) -> Option<Transform> {
        let (local, parent) = self.nodes.get(entity).ok()?;
        let mut world = *local;
        let mut next = parent.map(ChildOf::parent);
        while let Some(ancestor) = next {
            let (ancestor_local, ancestor_parent) = self.nodes.get(ancestor).ok()?;
            world = ancestor_local.mul_transform(world);
            next = ancestor_parent.map(ChildOf::parent);
        }
        Some(world)
    }

    /// World-space position of `entity`.
    pub fn world_translation(&self, entity: Entity) -> Option<Vec3> {
        self.world_transform(entity).map(|t| t.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::SystemState;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_world_translation_of_root_is_local() {
        let mut world = World::new();
        let root = world.spawn(Transform::from_xyz(1.0, 2.0, 3.0)).id();

        let mut state: SystemState<TransformNodes> = SystemState::new(&mut world);
        let nodes = state.get(&world);
        let pos = nodes.world_translation(root).unwrap();
        assert!((pos - Vec3::new(1.0, 2.0, 3.0)).length() < EPSILON);
    }

    #[test]
    fn test_child_inherits_moving_group() {
        let mut world = World::new();
        let group = world.spawn(Transform::from_xyz(8.0, 0.0, 0.0)).id();
        let child = world
            .spawn((Transform::from_xyz(0.0, 1.0, 0.0), ChildOf(group)))
            .id();

        {
            let mut state: SystemState<TransformNodes> = SystemState::new(&mut world);
            let nodes = state.get(&world);
            let pos = nodes.world_translation(child).unwrap();
            assert!((pos - Vec3::new(8.0, 1.0, 0.0)).length() < EPSILON);
        }

        // Move the group; no propagation pass runs, the query still sees it.
        world.get_mut::<Transform>(group).unwrap().translation = Vec3::new(0.0, 0.0, -8.0);
        let mut state: SystemState<TransformNodes> = SystemState::new(&mut world);
        let nodes = state.get(&world);
        let pos = nodes.world_translation(child).unwrap();
        assert!((pos - Vec3::new(0.0, 1.0, -8.0)).length() < EPSILON);
    }

    #[test]
    fn test_parent_rotation_and_scale_apply_to_child_offset() {
        let mut world = World::new();
        let group = world
            .spawn(
                Transform::from_xyz(0.0, 0.0, 5.0)
                    .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
                    .with_scale(Vec3::splat(2.0)),
            )
            .id();
        let child = world
            .spawn((Transform::from_xyz(1.0, 0.0, 0.0), ChildOf(group)))
            .id();

        let mut state: SystemState<TransformNodes> = SystemState::new(&mut world);
        let nodes = state.get(&world);
        let pos = nodes.world_translation(child).unwrap();
        // +X rotated a quarter turn about Y lands on -Z, then scaled by 2.
        assert!((pos - Vec3::new(0.0, 0.0, 3.0)).length() < EPSILON);
    }

    #[test]
    fn test_missing_transform_yields_none() {
        let mut world = World::new();
        let bare = world.spawn_empty().id();
        let mut state: SystemState<TransformNodes> = SystemState::new(&mut world);
        let nodes = state.get(&world);
        assert!(nodes.world_transform(bare).is_none());
    }
}
