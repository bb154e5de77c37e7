use ballpit_core::environment::{RoomEnvironment, FACE_COUNT};

pub struct EnvironmentMap {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub mip_count: u32,
}

/// Upload every mip level of every face into a cube texture.
pub fn upload_environment(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    env: &RoomEnvironment,
) -> EnvironmentMap {
    let size = env.face_size();
    let mip_count = env.mip_count();
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("room_env"),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: FACE_COUNT as u32,
        },
        mip_level_count: mip_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    for (mip, level) in env.levels().iter().enumerate() {
        for face in 0..FACE_COUNT {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip as u32,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: face as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &level.face_rgba8(face),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level.size),
                    rows_per_image: Some(level.size),
                },
                wgpu::Extent3d {
                    width: level.size,
                    height: level.size,
                    depth_or_array_layers: 1,
                },
            );
        }
    }
    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("room_env_view"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("room_env_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });
    EnvironmentMap {
        texture,
        view,
        sampler,
        mip_count,
    }
}
