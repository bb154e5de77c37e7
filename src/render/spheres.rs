use super::environment::{upload_environment, EnvironmentMap};
use super::{helpers, GpuContext, DEPTH_FORMAT};
use crate::constants::ENV_FACE_SIZE;
use ballpit_core::{
    default_sphere, Camera, RoomEnvironment, SceneUniforms, ShadingPipeline, SphereInstance,
    SphereSystem, UniformInputs, SPHERES_WGSL,
};
use wgpu::util::DeviceExt;

/// One instanced draw of the shared sphere mesh.
///
/// Every buffer and texture is sized for the system it was built from; a
/// new sphere count means a new renderer.
pub struct SphereRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    env: EnvironmentMap,
    shading: ShadingPipeline,
    released: bool,
}

impl SphereRenderer {
    pub fn new(gpu: &GpuContext, system: &SphereSystem) -> Self {
        let device = &gpu.device;
        let config = system.config();
        let shading = ShadingPipeline::physical(&config.material, &config.scattering);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spheres_shader"),
            source: wgpu::ShaderSource::Wgsl(SPHERES_WGSL.into()),
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mesh = default_sphere();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_vb"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_ib"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_count = system.instances().len() as u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sphere_instances"),
            size: (std::mem::size_of::<SphereInstance>() * system.instances().len().max(1)) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let env = upload_environment(device, &gpu.queue, &RoomEnvironment::generate(ENV_FACE_SIZE));

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("spheres_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("spheres_bg"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&env.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&env.sampler),
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spheres_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = helpers::make_sphere_pipeline(
            device,
            &pipeline_layout,
            &shader,
            shading.fragment_entry(),
            gpu.format(),
            DEPTH_FORMAT,
        );
        log::info!(
            "[spheres] renderer built: instances={} stages={} entry={}",
            instance_count,
            shading.stages().len(),
            shading.fragment_entry()
        );

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            instance_buffer,
            instance_count,
            env,
            shading,
            released: false,
        }
    }

    /// Copy this frame's instances and uniforms to the GPU.
    pub fn upload(&self, gpu: &GpuContext, system: &SphereSystem, camera: &Camera) {
        if self.released {
            return;
        }
        let instances = system.instances();
        let n = instances.len().min(self.instance_count as usize);
        gpu.queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&instances[..n]),
        );
        let config = system.config();
        let uniforms = SceneUniforms::compose(&UniformInputs {
            camera,
            lights: system.lights(),
            material: &config.material,
            pipeline: &self.shading,
            instance_colors: system.uses_instance_colors(),
            env_mip_count: self.env.mip_count,
        });
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        if self.released {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }

    /// Destroy every buffer and texture this renderer owns. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.instance_buffer.destroy();
        self.uniform_buffer.destroy();
        self.env.texture.destroy();
        log::debug!("[spheres] renderer released ({} instances)", self.instance_count);
    }
}
