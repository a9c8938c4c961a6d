use bevy::mesh::MeshVertexBufferLayoutRef;
use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::render::render_resource::{
    AsBindGroup, CompareFunction, RenderPipelineDescriptor, ShaderType,
    SpecializedMeshPipelineError,
};
use bevy::shader::ShaderRef;

use crate::core::math::linear_rgb;

pub const SKY_PANORAMA_READY: u32 = 1 << 0;

#[derive(ShaderType, Clone, Copy, Debug)]
pub struct SkyUniform {
    /// Multiplies the panorama; drawn flat while the panorama is loading.
    pub tint: Vec4,
    pub flags: u32,
}

/// Equirectangular panorama painted on a sphere around the camera.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct SkyMaterial {
    #[uniform(0)]
    pub uniform: SkyUniform,
    #[texture(1)]
    #[sampler(2)]
    pub panorama: Option<Handle<Image>>,
}

impl SkyMaterial {
    pub fn new(placeholder: Color) -> Self {
        Self {
            uniform: SkyUniform {
                tint: linear_rgb(placeholder).extend(1.0),
                flags: 0,
            },
            panorama: None,
        }
    }

    pub fn set_panorama(&mut self, panorama: Handle<Image>) {
        self.panorama = Some(panorama);
        self.uniform.tint = Vec4::ONE;
        self.uniform.flags = SKY_PANORAMA_READY;
    }
}

impl Material for SkyMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/sky_material.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Opaque
    }

    fn specialize(
        _pipeline: &MaterialPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        descriptor.primitive.cull_mode = None;
        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = false;
            depth_stencil.depth_compare = CompareFunction::LessEqual;
        }
        Ok(())
    }
}

/// Marker for the background sphere.
#[derive(Component)]
pub struct SkyDome;

/// Keep the background sphere centered on the camera.
pub fn follow_camera(
    camera: Single<&Transform, (With<Camera3d>, Without<SkyDome>)>,
    mut domes: Query<&mut Transform, With<SkyDome>>,
) {
    for mut transform in &mut domes {
        transform.translation = camera.translation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_until_panorama_arrives() {
        let mut material = SkyMaterial::new(Color::srgb(0.0, 0.0, 0.0));
        assert_eq!(material.uniform.flags, 0);
        assert_eq!(material.uniform.tint, Vec4::new(0.0, 0.0, 0.0, 1.0));

        material.set_panorama(Handle::default());
        assert_eq!(material.uniform.flags, SKY_PANORAMA_READY);
        assert_eq!(material.uniform.tint, Vec4::ONE);
    }
}
