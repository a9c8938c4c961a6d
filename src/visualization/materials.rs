//! Shader materials for the star, the planet and their atmosphere shells.
//!
//! Each material owns its uniform value; the scheduler copies fresh values in
//! every tick, so no two surfaces ever share uniform storage.

use bevy::mesh::MeshVertexBufferLayoutRef;
use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::render::render_resource::{
    AsBindGroup, Face, RenderPipelineDescriptor, ShaderType, SpecializedMeshPipelineError,
};
use bevy::shader::ShaderRef;

use crate::core::math::linear_rgb;
use crate::ui::state::ShadingControls;

pub const PLANET_SURFACE_READY: u32 = 1 << 0;
pub const PLANET_CLOUDS_READY: u32 = 1 << 1;
pub const PLANET_ENVIRONMENT_READY: u32 = 1 << 2;
pub const STAR_SURFACE_READY: u32 = 1 << 0;

fn rgba(color: Color) -> Vec4 {
    linear_rgb(color).extend(1.0)
}

/// Uniform block of the planet surface shader.
#[derive(ShaderType, Clone, Copy, Debug)]
pub struct PlanetUniform {
    pub sun_direction: Vec3,
    pub terminator_band: f32,
    pub atmosphere_day_color: Vec4,
    pub atmosphere_twilight_color: Vec4,
    pub fallback_color: Vec4,
    pub flags: u32,
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct PlanetMaterial {
    #[uniform(0)]
    pub uniform: PlanetUniform,
    #[texture(1)]
    #[sampler(2)]
    pub day_texture: Option<Handle<Image>>,
    #[texture(3)]
    #[sampler(4)]
    pub night_texture: Option<Handle<Image>>,
    #[texture(5)]
    #[sampler(6)]
    pub specular_clouds_texture: Option<Handle<Image>>,
    #[texture(7)]
    #[sampler(8)]
    pub environment_texture: Option<Handle<Image>>,
}

impl PlanetMaterial {
    pub fn new(controls: &ShadingControls, fallback_color: Color) -> Self {
        let mut material = Self {
            uniform: PlanetUniform {
                sun_direction: Vec3::X,
                terminator_band: controls.terminator_band,
                atmosphere_day_color: rgba(controls.atmosphere_day_color),
                atmosphere_twilight_color: rgba(controls.atmosphere_twilight_color),
                fallback_color: rgba(fallback_color),
                flags: 0,
            },
            day_texture: None,
            night_texture: None,
            specular_clouds_texture: None,
            environment_texture: None,
        };
        material.set_lighting(Vec3::X, controls);
        material
    }

    /// Copy the current light direction and control values into the uniform.
    pub fn set_lighting(&mut self, sun_direction: Vec3, controls: &ShadingControls) {
        self.uniform.sun_direction = sun_direction;
        self.uniform.terminator_band = controls.terminator_band;
        self.uniform.atmosphere_day_color = rgba(controls.atmosphere_day_color);
        self.uniform.atmosphere_twilight_color = rgba(controls.atmosphere_twilight_color);
        self.uniform.flags = self.texture_flags();
    }

    fn texture_flags(&self) -> u32 {
        let mut flags = 0;
        if self.day_texture.is_some() && self.night_texture.is_some() {
            flags |= PLANET_SURFACE_READY;
        }
        if self.specular_clouds_texture.is_some() {
            flags |= PLANET_CLOUDS_READY;
        }
        if self.environment_texture.is_some() {
            flags |= PLANET_ENVIRONMENT_READY;
        }
        flags
    }
}

impl Material for PlanetMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/planet.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Opaque
    }
}

/// Uniform block of the planet atmosphere shell.
#[derive(ShaderType, Clone, Copy, Debug)]
pub struct AtmosphereUniform {
    pub sun_direction: Vec3,
    pub terminator_band: f32,
    pub day_color: Vec4,
    pub twilight_color: Vec4,
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct AtmosphereMaterial {
    #[uniform(0)]
    pub uniform: AtmosphereUniform,
}

impl AtmosphereMaterial {
    pub fn new(controls: &ShadingControls) -> Self {
        let mut material = Self {
            uniform: AtmosphereUniform {
                sun_direction: Vec3::X,
                terminator_band: controls.terminator_band,
                day_color: Vec4::ZERO,
                twilight_color: Vec4::ZERO,
            },
        };
        material.set_lighting(Vec3::X, controls);
        material
    }

    pub fn set_lighting(&mut self, sun_direction: Vec3, controls: &ShadingControls) {
        self.uniform.sun_direction = sun_direction;
        self.uniform.terminator_band = controls.terminator_band;
        self.uniform.day_color = rgba(controls.atmosphere_day_color);
        self.uniform.twilight_color = rgba(controls.atmosphere_twilight_color);
    }
}

impl Material for AtmosphereMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/atmosphere.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Blend
    }

    fn specialize(
        _pipeline: &MaterialPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        back_faces_only(descriptor);
        Ok(())
    }
}

/// Uniform block of the emissive star surface.
#[derive(ShaderType, Clone, Copy, Debug)]
pub struct StarUniform {
    pub fallback_color: Vec4,
    pub time: f32,
    pub flags: u32,
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct StarMaterial {
    #[uniform(0)]
    pub uniform: StarUniform,
    #[texture(1)]
    #[sampler(2)]
    pub surface_texture: Option<Handle<Image>>,
}

impl StarMaterial {
    pub fn new(fallback_color: Color) -> Self {
        Self {
            uniform: StarUniform {
                fallback_color: rgba(fallback_color),
                time: 0.0,
                flags: 0,
            },
            surface_texture: None,
        }
    }

    pub fn set_time(&mut self, time: f32) {
        self.uniform.time = time;
        self.uniform.flags = if self.surface_texture.is_some() {
            STAR_SURFACE_READY
        } else {
            0
        };
    }
}

impl Material for StarMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/star.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Opaque
    }
}

/// Uniform block of the single-color star glow.
#[derive(ShaderType, Clone, Copy, Debug)]
pub struct StarAtmosphereUniform {
    pub color: Vec4,
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct StarAtmosphereMaterial {
    #[uniform(0)]
    pub uniform: StarAtmosphereUniform,
}

impl StarAtmosphereMaterial {
    pub fn new(color: Color) -> Self {
        Self {
            uniform: StarAtmosphereUniform { color: rgba(color) },
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.uniform.color = rgba(color);
    }
}

impl Material for StarAtmosphereMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/star_atmosphere.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Blend
    }

    fn specialize(
        _pipeline: &MaterialPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        back_faces_only(descriptor);
        Ok(())
    }
}

/// Shells are drawn inside-out so they halo the body without covering it.
fn back_faces_only(descriptor: &mut RenderPipelineDescriptor) {
    descriptor.primitive.cull_mode = Some(Face::Front);
    if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
        depth_stencil.depth_write_enabled = false;
    }
}

/// Material handles owned by a planet body.
#[derive(Component, Clone, Debug)]
pub struct PlanetShading {
    pub surface: Handle<PlanetMaterial>,
    pub atmosphere: Handle<AtmosphereMaterial>,
}

/// Material handles owned by a star body.
#[derive(Component, Clone, Debug)]
pub struct StarShading {
    pub surface: Handle<StarMaterial>,
    pub atmosphere: Handle<StarAtmosphereMaterial>,
}
