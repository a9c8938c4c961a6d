//! Texture library keyed by logical name.
//!
//! Materials start without textures and draw their fallback color. Once a
//! texture is present in `Assets<Image>` it is bound to every material that
//! uses it; a failed load is reported once and the fallback stays.

use bevy::asset::LoadState;
use bevy::image::ImageLoaderSettings;
use bevy::platform::collections::{HashMap, HashSet};
use bevy::prelude::*;

use crate::config::SceneConfig;
use crate::ui::state::ShadingControls;
use crate::visualization::materials::{PlanetMaterial, PlanetShading, StarMaterial, StarShading};
use crate::visualization::sky_material::{SkyDome, SkyMaterial};

pub const PLANET_DAY: &str = "planet-day";
pub const PLANET_NIGHT: &str = "planet-night";
pub const PLANET_SPECULAR_CLOUDS: &str = "planet-specular-clouds";
pub const STAR_SURFACE: &str = "star-surface";
pub const BACKGROUND_PANORAMA: &str = "background-panorama";

/// Logical texture name -> image handle.
#[derive(Resource, Default)]
pub struct AssetLibrary {
    images: HashMap<&'static str, Handle<Image>>,
    reported_failures: HashSet<&'static str>,
}

impl AssetLibrary {
    pub fn insert(&mut self, name: &'static str, handle: Handle<Image>) {
        self.images.insert(name, handle);
    }

    pub fn handle(&self, name: &str) -> Option<&Handle<Image>> {
        self.images.get(name)
    }

    /// True once the named image is decoded and available.
    pub fn is_ready(&self, name: &str, images: &Assets<Image>) -> bool {
        self.handle(name).is_some_and(|handle| images.contains(handle))
    }

    /// Handle for the named image, only when it can be sampled.
    pub fn ready(&self, name: &str, images: &Assets<Image>) -> Option<Handle<Image>> {
        self.handle(name)
            .filter(|handle| images.contains(*handle))
            .cloned()
    }
}

/// Queue every configured texture for loading.
pub fn load_scene_textures(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<SceneConfig>,
) {
    let textures = &config.textures;
    let mut library = AssetLibrary::default();

    library.insert(PLANET_DAY, asset_server.load(textures.planet_day.clone()));
    library.insert(PLANET_NIGHT, asset_server.load(textures.planet_night.clone()));
    // specular strength and cloud cover are data, not color
    library.insert(
        PLANET_SPECULAR_CLOUDS,
        asset_server.load_with_settings(
            textures.planet_specular_clouds.clone(),
            |settings: &mut ImageLoaderSettings| settings.is_srgb = false,
        ),
    );
    library.insert(STAR_SURFACE, asset_server.load(textures.star_surface.clone()));
    if let Some(panorama) = &textures.background_panorama {
        library.insert(BACKGROUND_PANORAMA, asset_server.load(panorama.clone()));
    }

    info!("Loading {} scene textures", library.images.len());
    commands.insert_resource(library);
}

/// Bind textures that finished loading into the materials that use them.
pub fn bind_loaded_textures(
    library: Res<AssetLibrary>,
    images: Res<Assets<Image>>,
    controls: Res<ShadingControls>,
    planets: Query<&PlanetShading>,
    stars: Query<&StarShading>,
    domes: Query<&MeshMaterial3d<SkyMaterial>, With<SkyDome>>,
    mut planet_materials: ResMut<Assets<PlanetMaterial>>,
    mut star_materials: ResMut<Assets<StarMaterial>>,
    mut sky_materials: ResMut<Assets<SkyMaterial>>,
) {
    let day = library.ready(PLANET_DAY, &images);
    let night = library.ready(PLANET_NIGHT, &images);
    let specular_clouds = library.ready(PLANET_SPECULAR_CLOUDS, &images);
    let panorama = library.ready(BACKGROUND_PANORAMA, &images);
    let environment = panorama.clone().filter(|_| controls.environment_reflections);

    for shading in &planets {
        let Some(material) = planet_materials.get(&shading.surface) else {
            continue;
        };
        if material.day_texture == day
            && material.night_texture == night
            && material.specular_clouds_texture == specular_clouds
            && material.environment_texture == environment
        {
            continue;
        }
        if let Some(material) = planet_materials.get_mut(&shading.surface) {
            material.day_texture = day.clone();
            material.night_texture = night.clone();
            material.specular_clouds_texture = specular_clouds.clone();
            material.environment_texture = environment.clone();
        }
    }

    if let Some(surface) = library.ready(STAR_SURFACE, &images) {
        for shading in &stars {
            let bound = star_materials
                .get(&shading.surface)
                .is_some_and(|m| m.surface_texture.as_ref() == Some(&surface));
            if !bound && let Some(material) = star_materials.get_mut(&shading.surface) {
                material.surface_texture = Some(surface.clone());
            }
        }
    }

    if let Some(panorama) = panorama {
        for handle in &domes {
            let bound = sky_materials
                .get(&handle.0)
                .is_some_and(|m| m.panorama.as_ref() == Some(&panorama));
            if !bound && let Some(material) = sky_materials.get_mut(&handle.0) {
                material.set_panorama(panorama.clone());
            }
        }
    }
}

/// Log each failed texture once; its materials keep the fallback color.
pub fn report_failed_loads(asset_server: Res<AssetServer>, mut library: ResMut<AssetLibrary>) {
    let library = &mut *library;
    for (name, handle) in &library.images {
        if library.reported_failures.contains(name) {
            continue;
        }
        if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle.id()) {
            warn!("Texture {name} failed to load ({err}); using fallback color");
            library.reported_failures.insert(*name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::materials::{AtmosphereMaterial, PLANET_SURFACE_READY};
    use bevy::ecs::system::RunSystemOnce;

    fn test_world() -> World {
        let mut world = World::new();
        world.init_resource::<Assets<Image>>();
        world.init_resource::<Assets<PlanetMaterial>>();
        world.init_resource::<Assets<AtmosphereMaterial>>();
        world.init_resource::<Assets<StarMaterial>>();
        world.init_resource::<Assets<SkyMaterial>>();
        world.insert_resource(ShadingControls::default());
        world.insert_resource(AssetLibrary::default());
        world
    }

    fn spawn_planet(world: &mut World) -> PlanetShading {
        let controls = ShadingControls::default();
        let shading = PlanetShading {
            surface: world
                .resource_mut::<Assets<PlanetMaterial>>()
                .add(PlanetMaterial::new(&controls, Color::WHITE)),
            atmosphere: world
                .resource_mut::<Assets<AtmosphereMaterial>>()
                .add(AtmosphereMaterial::new(&controls)),
        };
        world.spawn(shading.clone());
        shading
    }

    fn add_image(world: &mut World, name: &'static str) -> Handle<Image> {
        let handle = world.resource_mut::<Assets<Image>>().add(Image::default());
        world
            .resource_mut::<AssetLibrary>()
            .insert(name, handle.clone());
        handle
    }

    fn planet_material(world: &World, shading: &PlanetShading) -> PlanetMaterial {
        world
            .resource::<Assets<PlanetMaterial>>()
            .get(&shading.surface)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_is_ready_requires_loaded_image() {
        let mut world = test_world();
        assert!(
            !world
                .resource::<AssetLibrary>()
                .is_ready(PLANET_DAY, world.resource::<Assets<Image>>())
        );

        world
            .resource_mut::<AssetLibrary>()
            .insert(PLANET_NIGHT, Handle::default());
        assert!(
            !world
                .resource::<AssetLibrary>()
                .is_ready(PLANET_NIGHT, world.resource::<Assets<Image>>())
        );

        add_image(&mut world, PLANET_DAY);
        assert!(
            world
                .resource::<AssetLibrary>()
                .is_ready(PLANET_DAY, world.resource::<Assets<Image>>())
        );
    }

    #[test]
    fn test_unloaded_textures_stay_unbound() {
        let mut world = test_world();
        let shading = spawn_planet(&mut world);
        world
            .resource_mut::<AssetLibrary>()
            .insert(PLANET_DAY, Handle::default());

        world.run_system_once(bind_loaded_textures).unwrap();

        let material = planet_material(&world, &shading);
        assert!(material.day_texture.is_none());
        assert_eq!(material.uniform.flags, 0);
    }

    #[test]
    fn test_loaded_textures_are_bound() {
        let mut world = test_world();
        let shading = spawn_planet(&mut world);
        let day = add_image(&mut world, PLANET_DAY);
        let night = add_image(&mut world, PLANET_NIGHT);

        world.run_system_once(bind_loaded_textures).unwrap();

        let mut material = planet_material(&world, &shading);
        assert_eq!(material.day_texture, Some(day));
        assert_eq!(material.night_texture, Some(night));
        assert!(material.specular_clouds_texture.is_none());

        material.set_lighting(Vec3::X, &ShadingControls::default());
        assert_eq!(material.uniform.flags, PLANET_SURFACE_READY);
    }

    #[test]
    fn test_environment_follows_reflection_toggle() {
        let mut world = test_world();
        let shading = spawn_planet(&mut world);
        let panorama = add_image(&mut world, BACKGROUND_PANORAMA);

        world.run_system_once(bind_loaded_textures).unwrap();
        assert!(planet_material(&world, &shading).environment_texture.is_none());

        world
            .resource_mut::<ShadingControls>()
            .environment_reflections = true;
        world.run_system_once(bind_loaded_textures).unwrap();
        assert_eq!(
            planet_material(&world, &shading).environment_texture,
            Some(panorama)
        );

        world
            .resource_mut::<ShadingControls>()
            .environment_reflections = false;
        world.run_system_once(bind_loaded_textures).unwrap();
        assert!(planet_material(&world, &shading).environment_texture.is_none());
    }

    #[test]
    fn test_star_and_sky_bind_when_ready() {
        let mut world = test_world();
        let star_shading = StarShading {
            surface: world
                .resource_mut::<Assets<StarMaterial>>()
                .add(StarMaterial::new(Color::WHITE)),
            atmosphere: Handle::default(),
        };
        world.spawn(star_shading.clone());
        let sky = world
            .resource_mut::<Assets<SkyMaterial>>()
            .add(SkyMaterial::new(Color::BLACK));
        world.spawn((SkyDome, MeshMaterial3d(sky.clone())));

        let surface = add_image(&mut world, STAR_SURFACE);
        let panorama = add_image(&mut world, BACKGROUND_PANORAMA);
        world.run_system_once(bind_loaded_textures).unwrap();

        let star = world
            .resource::<Assets<StarMaterial>>()
            .get(&star_shading.surface)
            .unwrap();
        assert_eq!(star.surface_texture, Some(surface));
        let sky = world.resource::<Assets<SkyMaterial>>().get(&sky).unwrap();
        assert_eq!(sky.panorama, Some(panorama));
    }
}
