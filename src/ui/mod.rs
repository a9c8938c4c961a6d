//! User interface module
//!
//! The feathers control panel, keyboard shortcuts, the text HUD and
//! click-to-frame selection on top of the PanOrbit camera.

use bevy::prelude::*;

pub mod controls;
pub mod panel;
pub mod selection;
pub mod state;

use state::{ShadingControls, UIState};

use crate::config::SceneConfig;
use crate::orbital::TickSet;
use selection::{FramedTarget, PendingSelection, PointerState, SelectionSettings};

/// Marker for the camera the user looks through.
#[derive(Component)]
pub struct MainCamera;

/// Plugin for user interface management
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UIState>()
            .init_resource::<ShadingControls>()
            .init_resource::<PointerState>()
            .init_resource::<PendingSelection>()
            .init_resource::<FramedTarget>()
            .add_observer(panel::on_slider_change)
            .add_observer(panel::on_toggle_change)
            .add_systems(
                Startup,
                (
                    init_selection_settings,
                    controls::setup_hud,
                    panel::setup_panel,
                ),
            )
            .add_systems(
                Update,
                (
                    // control changes land in this frame's uniform push
                    (
                        controls::handle_control_keys,
                        panel::sync_panel_widgets,
                        panel::update_panel_visibility,
                    )
                        .chain()
                        .before(TickSet::Clock),
                    (
                        selection::refit_on_resize,
                        selection::track_pointer_gesture,
                        selection::update_hover,
                        selection::update_body_cursor,
                        selection::gate_orbit_input,
                        selection::apply_framing,
                    )
                        .chain()
                        .after(TickSet::Star),
                    controls::update_hud.after(selection::update_hover),
                ),
            );
    }
}

fn init_selection_settings(mut commands: Commands, config: Res<SceneConfig>) {
    commands.insert_resource(SelectionSettings::from_config(&config));
}
