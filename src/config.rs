//! Scene configuration persisted as JSON in the platform config directory.

use anyhow::Context;
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::orbital::SceneClock;
use crate::ui::state::{ShadingControls, SunSource};

const CONFIG_FILE: &str = "scene.json";

/// Texture paths relative to the `assets/` directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub planet_day: String,
    pub planet_night: String,
    pub planet_specular_clouds: String,
    pub star_surface: String,
    /// Equirectangular sky panorama; the flat background color is used when absent.
    pub background_panorama: Option<String>,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            planet_day: "earth/day.jpg".to_string(),
            planet_night: "earth/night.jpg".to_string(),
            planet_specular_clouds: "earth/specularClouds.jpg".to_string(),
            star_surface: "sun/8k_sun.jpg".to_string(),
            background_panorama: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub radius: f32,
    pub rotation_rate: f32,
    /// Glow shell radius as a multiple of `radius`.
    pub atmosphere_scale: f32,
    pub fallback_color: String,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            rotation_rate: 0.05,
            atmosphere_scale: 1.04,
            fallback_color: "#ffb347".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    pub radius: f32,
    pub rotation_rate: f32,
    pub orbit_radius: f32,
    pub orbit_speed: f32,
    pub atmosphere_scale: f32,
    pub fallback_color: String,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            radius: 0.6,
            rotation_rate: 0.1,
            orbit_radius: 8.0,
            orbit_speed: 0.015,
            atmosphere_scale: 0.32 / 0.3,
            fallback_color: "#2a5ca8".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: [f32; 3],
    pub background_color: String,
    pub framing_margin: f32,
    pub drag_threshold_px: f32,
    /// Jump straight to a framed pose instead of easing towards it.
    pub snap_to_frame: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 25.0,
            near: 0.1,
            far: 100.0,
            eye: [12.0, 5.0, 4.0],
            background_color: "#000011".to_string(),
            framing_margin: 1.2,
            drag_threshold_px: 2.0,
            snap_to_frame: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    pub atmosphere_day_color: String,
    pub atmosphere_twilight_color: String,
    pub star_atmosphere_color: String,
    pub terminator_band: f32,
    pub sun_source: SunSource,
    pub environment_reflections: bool,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            atmosphere_day_color: "#00aaff".to_string(),
            atmosphere_twilight_color: "#ff6600".to_string(),
            star_atmosphere_color: "#880808".to_string(),
            terminator_band: 0.1,
            sun_source: SunSource::Bodies,
            environment_reflections: false,
        }
    }
}

/// Everything the scene reads at startup.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub textures: TextureConfig,
    pub star: StarConfig,
    pub planet: PlanetConfig,
    pub camera: CameraConfig,
    pub shading: ShadingConfig,
    pub time_scale: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            textures: TextureConfig::default(),
            star: StarConfig::default(),
            planet: PlanetConfig::default(),
            camera: CameraConfig::default(),
            shading: ShadingConfig::default(),
            time_scale: 1.0,
        }
    }
}

impl SceneConfig {
    /// Initial control values; unparsable colors keep their defaults.
    pub fn shading_controls(&self) -> ShadingControls {
        let defaults = ShadingControls::default();
        ShadingControls {
            atmosphere_day_color: color_or(
                &self.shading.atmosphere_day_color,
                defaults.atmosphere_day_color,
            ),
            atmosphere_twilight_color: color_or(
                &self.shading.atmosphere_twilight_color,
                defaults.atmosphere_twilight_color,
            ),
            star_atmosphere_color: color_or(
                &self.shading.star_atmosphere_color,
                defaults.star_atmosphere_color,
            ),
            terminator_band: self.shading.terminator_band,
            sun_source: self.shading.sun_source,
            environment_reflections: self.shading.environment_reflections,
            ..defaults
        }
        .clamped()
    }

    pub fn background_color(&self) -> Color {
        color_or(&self.camera.background_color, Color::srgb_u8(0x00, 0x00, 0x11))
    }

    pub fn star_fallback_color(&self) -> Color {
        color_or(&self.star.fallback_color, Color::srgb_u8(0xff, 0xb3, 0x47))
    }

    pub fn planet_fallback_color(&self) -> Color {
        color_or(&self.planet.fallback_color, Color::srgb_u8(0x2a, 0x5c, 0xa8))
    }
}

/// Parse `#rrggbb` / `#rgb` (with or without `#`) into a color.
pub fn parse_hex_color(hex: &str) -> anyhow::Result<Color> {
    let srgba = Srgba::hex(hex.trim()).with_context(|| format!("invalid hex color {hex:?}"))?;
    Ok(srgba.into())
}

fn color_or(hex: &str, fallback: Color) -> Color {
    match parse_hex_color(hex) {
        Ok(color) => color,
        Err(err) => {
            warn!("{err:#}; using default");
            fallback
        }
    }
}

/// Reads and writes `scene.json`.
pub struct ConfigStore {
    config_dir: PathBuf,
}

impl ConfigStore {
    /// Store in the platform config directory:
    /// - macOS: ~/Library/Application Support/bevysolar/
    /// - Linux: ~/.config/bevysolar/
    /// - Windows: %APPDATA%\bevysolar\config\
    pub fn new() -> anyhow::Result<Self> {
        let proj_dirs = ProjectDirs::from("", "", "bevysolar")
            .ok_or_else(|| anyhow::anyhow!("Failed to resolve config directory"))?;
        Self::new_in_dir(proj_dirs.config_dir().to_path_buf())
    }

    pub fn new_in_dir(config_dir: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("creating {}", config_dir.display()))?;
        Ok(Self { config_dir })
    }

    pub fn path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Returns Ok(None) when no config file exists yet.
    pub fn read(&self) -> anyhow::Result<Option<SceneConfig>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn write(&self, config: &SceneConfig) -> anyhow::Result<()> {
        let path = self.path();
        let contents = serde_json::to_string_pretty(config)?;
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Load the config, writing the defaults out on first run.
pub fn load_or_init(store: &ConfigStore) -> anyhow::Result<SceneConfig> {
    match store.read()? {
        Some(config) => {
            info!("Loaded scene config from {}", store.path().display());
            Ok(config)
        }
        None => {
            let config = SceneConfig::default();
            store.write(&config)?;
            info!("Wrote default scene config to {}", store.path().display());
            Ok(config)
        }
    }
}

fn load_scene_config(mut commands: Commands) {
    let config = match ConfigStore::new().and_then(|store| load_or_init(&store)) {
        Ok(config) => config,
        Err(err) => {
            warn!("Scene config unavailable ({err:#}); using defaults");
            SceneConfig::default()
        }
    };

    commands.insert_resource(config.shading_controls());
    commands.insert_resource(SceneClock::with_time_scale(config.time_scale));
    commands.insert_resource(config);
}

/// Loads `SceneConfig` before any startup system reads it
pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_scene_config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    const EPSILON: f32 = 1e-5;

    fn unique_temp_dir(test_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "bevysolar-config-{}-{}-{}",
            test_name,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn test_missing_file_reads_none() {
        let store = ConfigStore::new_in_dir(unique_temp_dir("missing")).expect("store");
        assert!(store.read().expect("read").is_none());
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let store = ConfigStore::new_in_dir(unique_temp_dir("first_run")).expect("store");
        let config = load_or_init(&store).expect("load");
        assert_eq!(config, SceneConfig::default());
        assert!(store.path().exists());
        assert_eq!(store.read().expect("read"), Some(SceneConfig::default()));
    }

    #[test]
    fn test_write_and_read() {
        let store = ConfigStore::new_in_dir(unique_temp_dir("write_and_read")).expect("store");
        let mut config = SceneConfig::default();
        config.time_scale = 4.0;
        config.planet.orbit_radius = 12.0;
        config.shading.sun_source = SunSource::Manual;
        store.write(&config).expect("write");

        let read = store.read().expect("read").expect("config present");
        assert_eq!(read, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let store = ConfigStore::new_in_dir(unique_temp_dir("partial")).expect("store");
        fs::write(store.path(), r#"{ "planet": { "radius": 1.5 }, "time_scale": 2.0 }"#)
            .expect("write");

        let config = store.read().expect("read").expect("config present");
        assert_eq!(config.planet.radius, 1.5);
        assert_eq!(config.planet.orbit_radius, 8.0);
        assert_eq!(config.time_scale, 2.0);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let store = ConfigStore::new_in_dir(unique_temp_dir("invalid")).expect("store");
        fs::write(store.path(), "{ not json").expect("write");
        assert!(store.read().is_err());
        assert!(load_or_init(&store).is_err());
    }

    #[test]
    fn test_parse_hex_color() {
        let color = parse_hex_color("#00aaff").expect("valid color").to_srgba();
        assert!((color.red - 0.0).abs() < EPSILON);
        assert!((color.green - 170.0 / 255.0).abs() < EPSILON);
        assert!((color.blue - 1.0).abs() < EPSILON);
        assert!(parse_hex_color("not a color").is_err());
    }

    #[test]
    fn test_shading_controls_from_config() {
        let mut config = SceneConfig::default();
        config.shading.atmosphere_day_color = "bogus".to_string();
        config.shading.terminator_band = 10.0;
        config.shading.environment_reflections = true;

        let controls = config.shading_controls();
        let defaults = ShadingControls::default();
        assert_eq!(controls.atmosphere_day_color, defaults.atmosphere_day_color);
        assert_eq!(controls.terminator_band, 2.0);
        assert!(controls.environment_reflections);
    }
}
