//! Click-to-frame selection and hover tracking for the 3D viewport.

use bevy::picking::hover::HoverMap;
use bevy::picking::pointer::PointerId;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, SystemCursorIcon, WindowResized};
use bevy_feathers::cursor::{DefaultCursor, EntityCursor};
use bevy_panorbit_camera::PanOrbitCamera;

use crate::config::SceneConfig;
use crate::core::framing::{
    BoundingSphere, FramingLens, GestureOutcome, PointerGesture, clip_planes, frame_selection,
    pick_nearest,
};
use crate::core::hierarchy::TransformNodes;
use crate::core::orbit_camera::{OrbitPose, apply_pose, current_frame};
use crate::ui::MainCamera;

/// Body the cursor can select, with the radius framing should fit.
#[derive(Component, Clone, Copy, Debug)]
pub struct Selectable {
    pub radius: f32,
}

#[derive(Resource, Clone, Copy, Debug)]
pub struct SelectionSettings {
    /// Pointer travel (px) past which a press becomes a drag.
    pub drag_threshold_px: f32,
    pub margin: f32,
    pub snap: bool,
    /// Lower bound for the far plane after framing.
    pub min_far: f32,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            drag_threshold_px: 2.0,
            margin: 1.2,
            snap: false,
            min_far: 100.0,
        }
    }
}

impl SelectionSettings {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            drag_threshold_px: config.camera.drag_threshold_px.max(0.0),
            margin: config.camera.framing_margin.max(1.0),
            snap: config.camera.snap_to_frame,
            min_far: config.camera.far.max(1.0),
        }
    }
}

#[derive(Resource, Default, Debug)]
pub struct PointerState {
    pub gesture: PointerGesture,
    pub hovered: Option<Entity>,
    /// Mouse is over a UI node this frame.
    pub over_ui: bool,
    /// The current press started on the UI; the 3D view ignores it until release.
    pub ui_capture: bool,
}

/// What the camera should frame next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionTarget {
    Body(Entity),
    /// Click on empty space: fit every body.
    Everything,
}

#[derive(Resource, Default, Debug)]
pub struct PendingSelection(pub Option<SelectionTarget>);

/// Last target framed, re-fitted when the window changes shape.
#[derive(Resource, Default, Debug)]
pub struct FramedTarget(pub Option<SelectionTarget>);

/// World-space bounding sphere of every selectable body.
fn body_bounds(
    bodies: &Query<(Entity, &Selectable)>,
    nodes: &TransformNodes,
) -> impl Iterator<Item = (Entity, BoundingSphere)> {
    bodies.iter().filter_map(move |(entity, selectable)| {
        let center = nodes.world_translation(entity)?;
        Some((entity, BoundingSphere::new(center, selectable.radius)))
    })
}

fn cursor_ray(window: &Window, camera: &Camera, transform: &GlobalTransform) -> Option<Ray3d> {
    let cursor = window.cursor_position()?;
    camera.viewport_to_world(transform, cursor).ok()
}

fn pointer_over_ui(hover_map: Option<&HoverMap>, ui_nodes: &Query<(), With<Node>>) -> bool {
    hover_map
        .and_then(|map| map.get(&PointerId::Mouse))
        .is_some_and(|hits| hits.keys().any(|entity| ui_nodes.contains(*entity)))
}

/// Whether the orbit camera may react to mouse input this frame.
pub fn orbit_input_allowed(pointer: &PointerState, any_button_down: bool) -> bool {
    if any_button_down {
        !pointer.ui_capture
    } else {
        !pointer.over_ui
    }
}

pub fn track_pointer_gesture(
    buttons: Res<ButtonInput<MouseButton>>,
    hover_map: Option<Res<HoverMap>>,
    ui_nodes: Query<(), With<Node>>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform), With<MainCamera>>,
    bodies: Query<(Entity, &Selectable)>,
    nodes: TransformNodes,
    settings: Res<SelectionSettings>,
    mut pointer: ResMut<PointerState>,
    mut pending: ResMut<PendingSelection>,
) {
    let over_ui = pointer_over_ui(hover_map.as_deref(), &ui_nodes);
    pointer.over_ui = over_ui;
    if buttons.get_just_pressed().next().is_some() {
        pointer.ui_capture = over_ui;
    }
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let threshold = settings.drag_threshold_px;

    if buttons.just_pressed(MouseButton::Left) {
        if pointer.ui_capture {
            pointer.gesture = PointerGesture::Idle;
        } else {
            pointer.gesture.press(cursor);
        }
    } else if buttons.pressed(MouseButton::Left) {
        pointer.gesture.moved(cursor, threshold);
    }

    if !buttons.just_released(MouseButton::Left) {
        return;
    }
    let Some(GestureOutcome::Click(_)) = pointer.gesture.release(cursor, threshold) else {
        return;
    };

    let (camera, camera_transform) = *camera;
    let hit = cursor_ray(&window, camera, camera_transform).and_then(|ray| {
        pick_nearest(ray.origin, *ray.direction, body_bounds(&bodies, &nodes))
    });
    pending.0 = Some(match hit {
        Some(entity) => SelectionTarget::Body(entity),
        None => SelectionTarget::Everything,
    });
    debug!("Selection click: {:?}", pending.0);
}

/// Track which body is under the cursor; cleared while dragging.
pub fn update_hover(
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform), With<MainCamera>>,
    bodies: Query<(Entity, &Selectable)>,
    nodes: TransformNodes,
    mut pointer: ResMut<PointerState>,
) {
    let hovered = if pointer.gesture == PointerGesture::Dragging || pointer.over_ui {
        None
    } else {
        let (camera, camera_transform) = *camera;
        cursor_ray(&window, camera, camera_transform).and_then(|ray| {
            pick_nearest(ray.origin, *ray.direction, body_bounds(&bodies, &nodes))
        })
    };
    if pointer.hovered != hovered {
        pointer.hovered = hovered;
    }
}

/// Pointer icon over the 3D view: a hand while a body is under the cursor.
///
/// The window cursor itself is owned by the widget layer, which falls back to
/// `DefaultCursor` whenever no widget is hovered.
pub fn update_body_cursor(pointer: Res<PointerState>, mut cursor: ResMut<DefaultCursor>) {
    let icon = if pointer.hovered.is_some() {
        SystemCursorIcon::Pointer
    } else {
        SystemCursorIcon::Default
    };
    let wanted = EntityCursor::System(icon);
    if cursor.0 != wanted {
        cursor.0 = wanted;
    }
}

/// Keep the orbit camera from reacting to presses and scrolls aimed at the panel.
pub fn gate_orbit_input(
    buttons: Res<ButtonInput<MouseButton>>,
    pointer: Res<PointerState>,
    camera: Single<&mut PanOrbitCamera, With<MainCamera>>,
) {
    let mut pan_orbit = camera.into_inner();
    let enabled = orbit_input_allowed(&pointer, buttons.get_pressed().next().is_some());
    if pan_orbit.enabled != enabled {
        pan_orbit.enabled = enabled;
    }
}

/// Re-fit the last framed target after the window changes shape.
pub fn refit_on_resize(
    mut resized: MessageReader<WindowResized>,
    framed: Res<FramedTarget>,
    mut pending: ResMut<PendingSelection>,
) {
    if resized.read().last().is_none() {
        return;
    }
    if pending.0.is_none() {
        pending.0 = framed.0;
    }
}

/// Move the orbit camera to frame the pending selection.
pub fn apply_framing(
    mut pending: ResMut<PendingSelection>,
    mut framed: ResMut<FramedTarget>,
    settings: Res<SelectionSettings>,
    bodies: Query<(Entity, &Selectable)>,
    nodes: TransformNodes,
    window: Option<Single<&Window, With<PrimaryWindow>>>,
    camera: Single<(&mut PanOrbitCamera, &Transform, &mut Projection), With<MainCamera>>,
) {
    let Some(target) = pending.0.take() else {
        return;
    };
    let (mut pan_orbit, transform, mut projection) = camera.into_inner();
    let Projection::Perspective(perspective) = projection.as_mut() else {
        warn!("apply_framing: main camera is not perspective");
        return;
    };
    // the projection's aspect only catches up with a resize in PostUpdate
    let aspect = window
        .map(|window| window.width() / window.height())
        .filter(|aspect| aspect.is_finite() && *aspect > 0.0)
        .unwrap_or(perspective.aspect_ratio);
    let lens = FramingLens {
        fov_y: perspective.fov,
        aspect,
        margin: settings.margin,
    };

    let selection: Vec<BoundingSphere> = body_bounds(&bodies, &nodes)
        .filter(|(entity, _)| match target {
            SelectionTarget::Body(selected) => *entity == selected,
            SelectionTarget::Everything => true,
        })
        .map(|(_, sphere)| sphere)
        .collect();

    let current = current_frame(&pan_orbit, transform);
    let Some(frame) = frame_selection(&current, selection, &lens) else {
        debug!("Nothing to frame for {target:?}");
        return;
    };
    apply_pose(&mut pan_orbit, OrbitPose::from_frame(&frame), settings.snap);
    let (near, far) = clip_planes(frame.eye.distance(frame.target), settings.min_far);
    perspective.near = near;
    perspective.far = far;
    framed.0 = Some(target);
    debug!("Framing {target:?}: eye {:?} target {:?}", frame.eye, frame.target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;

    const EPSILON: f32 = 1e-3;

    struct FramingScene {
        world: World,
        camera: Entity,
        planet: Entity,
    }

    fn lens() -> FramingLens {
        FramingLens {
            fov_y: 25.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            margin: 1.2,
        }
    }

    fn framing_scene() -> FramingScene {
        let mut world = World::new();
        world.insert_resource(SelectionSettings::default());
        world.init_resource::<PendingSelection>();
        world.init_resource::<FramedTarget>();

        let eye = Vec3::new(12.0, 5.0, 4.0);
        let camera = world
            .spawn((
                MainCamera,
                PanOrbitCamera::default(),
                Transform::from_translation(eye).looking_at(Vec3::ZERO, Vec3::Y),
                Projection::Perspective(PerspectiveProjection {
                    fov: 25.0_f32.to_radians(),
                    aspect_ratio: 16.0 / 9.0,
                    ..default()
                }),
            ))
            .id();
        world.spawn((Selectable { radius: 2.08 }, Transform::default()));
        let planet = world
            .spawn((
                Selectable { radius: 0.64 },
                Transform::from_xyz(8.0, 0.0, 0.0),
            ))
            .id();

        FramingScene {
            world,
            camera,
            planet,
        }
    }

    fn pan_orbit(scene: &FramingScene) -> &PanOrbitCamera {
        scene.world.get::<PanOrbitCamera>(scene.camera).unwrap()
    }

    #[test]
    fn test_click_on_body_frames_it() {
        let mut scene = framing_scene();
        scene.world.resource_mut::<PendingSelection>().0 =
            Some(SelectionTarget::Body(scene.planet));
        scene.world.run_system_once(apply_framing).unwrap();

        let camera = pan_orbit(&scene);
        assert!((camera.target_focus - Vec3::new(8.0, 0.0, 0.0)).length() < EPSILON);
        assert!((camera.target_radius - lens().fit_distance(0.64)).abs() < EPSILON);
        assert!(scene.world.resource::<PendingSelection>().0.is_none());
    }

    #[test]
    fn test_click_on_empty_space_frames_everything() {
        let mut scene = framing_scene();
        scene.world.resource_mut::<PendingSelection>().0 = Some(SelectionTarget::Everything);
        scene.world.run_system_once(apply_framing).unwrap();

        let all = BoundingSphere::new(Vec3::ZERO, 2.08)
            .union(&BoundingSphere::new(Vec3::new(8.0, 0.0, 0.0), 0.64));
        let camera = pan_orbit(&scene);
        assert!((camera.target_focus - all.center).length() < EPSILON);
        assert!((camera.target_radius - lens().fit_distance(all.radius)).abs() < EPSILON);
    }

    #[test]
    fn test_framing_keeps_view_direction() {
        let mut scene = framing_scene();
        scene.world.resource_mut::<PendingSelection>().0 = Some(SelectionTarget::Everything);
        scene.world.run_system_once(apply_framing).unwrap();

        let camera = pan_orbit(&scene);
        let pose = OrbitPose {
            focus: camera.target_focus,
            radius: camera.target_radius,
            yaw: camera.target_yaw,
            pitch: camera.target_pitch,
        };
        // PanOrbitCamera::default() focuses the origin
        let before = Vec3::new(12.0, 5.0, 4.0).normalize();
        let after = (pose.eye() - pose.focus).normalize();
        assert!((before - after).length() < EPSILON);
    }

    #[test]
    fn test_missing_body_is_a_no_op() {
        let mut scene = framing_scene();
        let before = pan_orbit(&scene).target_radius;
        let gone = scene.world.spawn_empty().id();
        scene.world.despawn(gone);
        scene.world.resource_mut::<PendingSelection>().0 = Some(SelectionTarget::Body(gone));
        scene.world.run_system_once(apply_framing).unwrap();

        assert_eq!(pan_orbit(&scene).target_radius, before);
    }

    #[test]
    fn test_no_pending_selection_leaves_camera() {
        let mut scene = framing_scene();
        let before = pan_orbit(&scene).target_focus;
        scene.world.run_system_once(apply_framing).unwrap();
        assert_eq!(pan_orbit(&scene).target_focus, before);
    }

    #[test]
    fn test_framing_clips_to_target_distance() {
        let mut scene = framing_scene();
        scene.world.resource_mut::<PendingSelection>().0 =
            Some(SelectionTarget::Body(scene.planet));
        scene.world.run_system_once(apply_framing).unwrap();

        let distance = lens().fit_distance(0.64);
        let Some(Projection::Perspective(perspective)) =
            scene.world.get::<Projection>(scene.camera)
        else {
            panic!("main camera lost its perspective projection");
        };
        assert!((perspective.near - distance / 100.0).abs() < EPSILON);
        assert!((perspective.far - distance * 100.0).abs() < 1e-2);
        assert_eq!(
            scene.world.resource::<FramedTarget>().0,
            Some(SelectionTarget::Body(scene.planet))
        );
    }

    #[test]
    fn test_resize_refits_last_framed_target() {
        let mut world = World::new();
        world.init_resource::<Messages<WindowResized>>();
        world.init_resource::<PendingSelection>();
        world.insert_resource(FramedTarget(Some(SelectionTarget::Everything)));

        world.run_system_once(refit_on_resize).unwrap();
        assert!(world.resource::<PendingSelection>().0.is_none());

        let window = world.spawn_empty().id();
        world.write_message(WindowResized {
            window,
            width: 800.0,
            height: 600.0,
        });
        world.run_system_once(refit_on_resize).unwrap();
        assert_eq!(
            world.resource::<PendingSelection>().0,
            Some(SelectionTarget::Everything)
        );
    }

    #[test]
    fn test_hovering_a_body_shows_pointer_cursor() {
        let mut world = World::new();
        world.init_resource::<DefaultCursor>();
        let body = world.spawn_empty().id();
        world.insert_resource(PointerState {
            hovered: Some(body),
            ..default()
        });
        world.run_system_once(update_body_cursor).unwrap();
        assert_eq!(
            world.resource::<DefaultCursor>().0,
            EntityCursor::System(SystemCursorIcon::Pointer)
        );

        world.resource_mut::<PointerState>().hovered = None;
        world.run_system_once(update_body_cursor).unwrap();
        assert_eq!(
            world.resource::<DefaultCursor>().0,
            EntityCursor::System(SystemCursorIcon::Default)
        );
    }

    #[test]
    fn test_panel_presses_do_not_reach_the_orbit_camera() {
        let over_panel = PointerState {
            over_ui: true,
            ..default()
        };
        assert!(!orbit_input_allowed(&over_panel, false));

        // a slider drag that leaves the panel stays with the slider
        let slider_drag = PointerState {
            ui_capture: true,
            ..default()
        };
        assert!(!orbit_input_allowed(&slider_drag, true));

        // an orbit drag that crosses the panel keeps orbiting
        let orbit_drag = PointerState {
            over_ui: true,
            ..default()
        };
        assert!(orbit_input_allowed(&orbit_drag, true));
        assert!(orbit_input_allowed(&PointerState::default(), false));
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = SceneConfig::default();
        config.camera.framing_margin = 0.5;
        config.camera.snap_to_frame = true;
        let settings = SelectionSettings::from_config(&config);
        assert_eq!(settings.margin, 1.0);
        assert_eq!(settings.drag_threshold_px, 2.0);
        assert!(settings.snap);
        assert_eq!(settings.min_far, config.camera.far);
    }
}
