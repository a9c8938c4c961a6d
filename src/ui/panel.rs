//! Feathers control panel for the live shading parameters.
//!
//! Every widget maps onto one field of `ShadingControls`. Widget changes are
//! written straight into the resource, and `sync_panel_widgets` pushes changes
//! made elsewhere (keyboard shortcuts, palette cycling) back onto the widgets.

use std::f32::consts::PI;

use bevy::prelude::*;
use bevy::ui::Checked;
use bevy_feathers::controls::{
    ColorChannel, ColorSliderProps, SliderBaseColor, SliderProps, checkbox, color_slider, slider,
};
use bevy_feathers::theme::{ThemeBackgroundColor, ThemeFontColor, ThemedText};
use bevy_feathers::tokens;
use bevy_ui_widgets::{SliderPrecision, SliderStep, SliderValue, ValueChange};

use crate::ui::state::{ShadingControls, SunSource, UIState};
use crate::visualization::shading::{MAX_TERMINATOR_BAND, MIN_TERMINATOR_BAND};

const PANEL_WIDTH: f32 = 260.0;

/// Root node of the control panel.
#[derive(Component)]
pub struct ControlPanel;

/// Which shading color a color slider edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorTarget {
    AtmosphereDay,
    AtmosphereTwilight,
    StarAtmosphere,
}

impl ColorTarget {
    fn label(self) -> &'static str {
        match self {
            ColorTarget::AtmosphereDay => "Atmosphere day",
            ColorTarget::AtmosphereTwilight => "Atmosphere twilight",
            ColorTarget::StarAtmosphere => "Star glow",
        }
    }

    fn get(self, controls: &ShadingControls) -> Color {
        match self {
            ColorTarget::AtmosphereDay => controls.atmosphere_day_color,
            ColorTarget::AtmosphereTwilight => controls.atmosphere_twilight_color,
            ColorTarget::StarAtmosphere => controls.star_atmosphere_color,
        }
    }

    fn get_mut(self, controls: &mut ShadingControls) -> &mut Color {
        match self {
            ColorTarget::AtmosphereDay => &mut controls.atmosphere_day_color,
            ColorTarget::AtmosphereTwilight => &mut controls.atmosphere_twilight_color,
            ColorTarget::StarAtmosphere => &mut controls.star_atmosphere_color,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RgbChannel {
    Red,
    Green,
    Blue,
}

impl RgbChannel {
    const ALL: [RgbChannel; 3] = [RgbChannel::Red, RgbChannel::Green, RgbChannel::Blue];

    fn widget_channel(self) -> ColorChannel {
        match self {
            RgbChannel::Red => ColorChannel::Red,
            RgbChannel::Green => ColorChannel::Green,
            RgbChannel::Blue => ColorChannel::Blue,
        }
    }
}

/// The `ShadingControls` field a slider edits.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelSlider {
    SunAzimuth,
    SunElevation,
    TerminatorBand,
    Color(ColorTarget, RgbChannel),
}

impl PanelSlider {
    /// Current value of the field, in the units the slider shows.
    pub fn read(self, controls: &ShadingControls) -> f32 {
        match self {
            PanelSlider::SunAzimuth => controls.sun_azimuth,
            PanelSlider::SunElevation => controls.sun_elevation,
            PanelSlider::TerminatorBand => controls.terminator_band,
            PanelSlider::Color(target, channel) => {
                let srgba = target.get(controls).to_srgba();
                match channel {
                    RgbChannel::Red => srgba.red,
                    RgbChannel::Green => srgba.green,
                    RgbChannel::Blue => srgba.blue,
                }
            }
        }
    }

    /// Write `value` into the field; the result is clamped to the field's range.
    pub fn write(self, controls: &mut ShadingControls, value: f32) {
        match self {
            PanelSlider::SunAzimuth => controls.sun_azimuth = value,
            PanelSlider::SunElevation => controls.sun_elevation = value,
            PanelSlider::TerminatorBand => controls.terminator_band = value,
            PanelSlider::Color(target, channel) => {
                let color = target.get_mut(controls);
                let mut srgba = color.to_srgba();
                match channel {
                    RgbChannel::Red => srgba.red = value,
                    RgbChannel::Green => srgba.green = value,
                    RgbChannel::Blue => srgba.blue = value,
                }
                *color = srgba.into();
            }
        }
        *controls = controls.clamped();
    }
}

/// The `ShadingControls` switch a checkbox edits.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelToggle {
    ManualSun,
    Reflections,
}

impl PanelToggle {
    pub fn read(self, controls: &ShadingControls) -> bool {
        match self {
            PanelToggle::ManualSun => controls.sun_source == SunSource::Manual,
            PanelToggle::Reflections => controls.environment_reflections,
        }
    }

    pub fn write(self, controls: &mut ShadingControls, on: bool) {
        match self {
            PanelToggle::ManualSun => {
                controls.sun_source = if on {
                    SunSource::Manual
                } else {
                    SunSource::Bodies
                };
            }
            PanelToggle::Reflections => controls.environment_reflections = on,
        }
    }
}

fn section_label(text: &'static str) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: 12.0,
            ..default()
        },
        ThemedText,
        ThemeFontColor(tokens::TEXT_DIM),
    )
}

fn value_slider(
    label: &'static str,
    field: PanelSlider,
    range: (f32, f32),
    value: f32,
) -> impl Bundle {
    (
        Node {
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(2.0),
            ..default()
        },
        children![
            section_label(label),
            slider(
                SliderProps {
                    value,
                    min: range.0,
                    max: range.1,
                },
                (field, SliderStep(0.01), SliderPrecision(3)),
            ),
        ],
    )
}

fn rgb_slider(target: ColorTarget, channel: RgbChannel, color: Color) -> impl Bundle {
    let srgba = color.to_srgba();
    let value = match channel {
        RgbChannel::Red => srgba.red,
        RgbChannel::Green => srgba.green,
        RgbChannel::Blue => srgba.blue,
    };
    color_slider(
        ColorSliderProps {
            value,
            channel: channel.widget_channel(),
        },
        (PanelSlider::Color(target, channel), SliderBaseColor(color)),
    )
}

fn color_group(target: ColorTarget, color: Color) -> impl Bundle {
    let [red, green, blue] = RgbChannel::ALL;
    (
        Node {
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(4.0),
            ..default()
        },
        children![
            section_label(target.label()),
            rgb_slider(target, red, color),
            rgb_slider(target, green, color),
            rgb_slider(target, blue, color),
        ],
    )
}

/// Spawned unchecked; `sync_panel_widgets` sets `Checked` on the first frame.
fn toggle(label: &'static str, field: PanelToggle) -> impl Bundle {
    checkbox(field, Spawn((Text::new(label), ThemedText)))
}

pub fn setup_panel(mut commands: Commands, controls: Res<ShadingControls>) {
    let controls = controls.clamped();
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            right: Val::Px(12.0),
            width: Val::Px(PANEL_WIDTH),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(8.0),
            padding: UiRect::all(Val::Px(10.0)),
            ..default()
        },
        ThemeBackgroundColor(tokens::WINDOW_BG),
        ThemeFontColor(tokens::TEXT_MAIN),
        ControlPanel,
        Name::new("Control Panel"),
        children![
            toggle("Manual sun direction", PanelToggle::ManualSun),
            value_slider(
                "Sun azimuth",
                PanelSlider::SunAzimuth,
                (-PI, PI),
                controls.sun_azimuth,
            ),
            value_slider(
                "Sun elevation",
                PanelSlider::SunElevation,
                (0.0, PI),
                controls.sun_elevation,
            ),
            value_slider(
                "Terminator band",
                PanelSlider::TerminatorBand,
                (MIN_TERMINATOR_BAND, MAX_TERMINATOR_BAND),
                controls.terminator_band,
            ),
            color_group(ColorTarget::AtmosphereDay, controls.atmosphere_day_color),
            color_group(
                ColorTarget::AtmosphereTwilight,
                controls.atmosphere_twilight_color,
            ),
            color_group(ColorTarget::StarAtmosphere, controls.star_atmosphere_color),
            toggle("Environment reflections", PanelToggle::Reflections),
        ],
    ));
}

pub fn on_slider_change(
    change: On<ValueChange<f32>>,
    sliders: Query<&PanelSlider>,
    mut controls: ResMut<ShadingControls>,
) {
    let Ok(field) = sliders.get(change.source) else {
        return;
    };
    field.write(&mut controls, change.value);
}

pub fn on_toggle_change(
    change: On<ValueChange<bool>>,
    toggles: Query<&PanelToggle>,
    mut controls: ResMut<ShadingControls>,
) {
    let Ok(field) = toggles.get(change.source) else {
        return;
    };
    field.write(&mut controls, change.value);
    debug!("{field:?} -> {}", change.value);
}

/// Mirror `ShadingControls` onto the widgets, so keyboard shortcuts and
/// palette cycling show up on the panel.
pub fn sync_panel_widgets(
    controls: Res<ShadingControls>,
    mut commands: Commands,
    mut sliders: Query<(&PanelSlider, &mut SliderValue, Option<&mut SliderBaseColor>)>,
    toggles: Query<(Entity, &PanelToggle, Has<Checked>)>,
) {
    for (field, mut value, base_color) in &mut sliders {
        let wanted = field.read(&controls);
        if (value.0 - wanted).abs() > f32::EPSILON {
            value.0 = wanted;
        }
        if let (PanelSlider::Color(target, _), Some(mut base_color)) = (*field, base_color) {
            let color = target.get(&controls);
            if base_color.0 != color {
                base_color.0 = color;
            }
        }
    }
    for (entity, field, checked) in &toggles {
        match (field.read(&controls), checked) {
            (true, false) => {
                commands.entity(entity).insert(Checked);
            }
            (false, true) => {
                commands.entity(entity).remove::<Checked>();
            }
            _ => {}
        }
    }
}

pub fn update_panel_visibility(
    ui_state: Res<UIState>,
    panel: Single<&mut Visibility, With<ControlPanel>>,
) {
    let mut visibility = panel.into_inner();
    visibility.set_if_neq(if ui_state.show_panel {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    });
}
