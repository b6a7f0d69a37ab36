use std::path::Path;

use anyhow::Context as _;

use crate::{
    assets::{NoiseImage, load_noise},
    field::store::FlowField,
    foundation::{
        config::FlowConfig,
        error::{FlowError, FlowResult},
    },
    playback::ActiveFrame,
    render::{
        camera::{CameraFit, Viewport},
        gpu::GpuContext,
        renderer::FrameRenderer,
    },
};

/// Offscreen color format. sRGB like the viewer's preferred surface format,
/// so exported PNGs match what the window shows.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// sRGB-encoded RGBA8 pixels read back from an offscreen render.
#[derive(Clone, Debug)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

impl FrameImage {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.rgba8[i],
            self.rgba8[i + 1],
            self.rgba8[i + 2],
            self.rgba8[i + 3],
        ]
    }

    pub fn write_png(&self, path: &Path) -> FlowResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        image::save_buffer_with_format(
            path,
            &self.rgba8,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Render time step `time_index` offscreen, loading the noise from `config`.
pub fn render_frame(
    gpu: &GpuContext,
    config: &FlowConfig,
    field: &FlowField,
    time_index: usize,
    viewport: Viewport,
) -> FlowResult<FrameImage> {
    let noise = load_noise(&config.noise_path)?;
    render_frame_with_noise(gpu, config, field, &noise, time_index, viewport)
}

#[tracing::instrument(skip(gpu, config, field, noise))]
pub fn render_frame_with_noise(
    gpu: &GpuContext,
    config: &FlowConfig,
    field: &FlowField,
    noise: &NoiseImage,
    time_index: usize,
    viewport: Viewport,
) -> FlowResult<FrameImage> {
    gpu.check_texture_size("offscreen", viewport.width, viewport.height)?;
    let mut renderer = FrameRenderer::setup_with_noise(gpu, OFFSCREEN_FORMAT, config, noise)?;
    let mut frame = ActiveFrame::new(field.time_steps())?;
    frame.seek(time_index)?;

    let extent = wgpu::Extent3d {
        width: viewport.width,
        height: viewport.height,
        depth_or_array_layers: 1,
    };
    let target = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("flowvis_offscreen"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: OFFSCREEN_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    let camera = CameraFit::for_layout(field.layout()).matrices(viewport);
    renderer.draw(gpu, &target, field, &mut frame, &camera, viewport)?;

    read_rgba8(gpu, &target)
}

/// Copy an RGBA8 render target back to the CPU. The texture needs
/// `COPY_SRC` usage.
pub fn read_rgba8(gpu: &GpuContext, texture: &wgpu::Texture) -> FlowResult<FrameImage> {
    if !matches!(
        texture.format(),
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb
    ) {
        return Err(FlowError::validation(format!(
            "readback expects an rgba8 target, got {:?}",
            texture.format()
        )));
    }
    let viewport = Viewport::new(texture.width(), texture.height());
    let row_bytes = viewport
        .width
        .checked_mul(4)
        .ok_or_else(|| FlowError::validation("render target width overflow"))?;
    let padded_row_bytes = align_to(row_bytes, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
    let buffer_size = (padded_row_bytes as u64)
        .checked_mul(viewport.height as u64)
        .ok_or_else(|| FlowError::validation("readback buffer size overflow"))?;

    let readback = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("flowvis_readback"),
        size: buffer_size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("flowvis_readback_encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row_bytes),
                rows_per_image: Some(viewport.height),
            },
        },
        wgpu::Extent3d {
            width: viewport.width,
            height: viewport.height,
            depth_or_array_layers: 1,
        },
    );
    gpu.queue.submit(Some(encoder.finish()));

    let buffer_slice = readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });
    gpu.device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| FlowError::gpu(format!("wgpu poll failed: {e:?}")))?;
    rx.recv()
        .map_err(|_| FlowError::gpu("readback channel closed"))?
        .map_err(|e| FlowError::gpu(format!("readback map failed: {e:?}")))?;

    let mapped = buffer_slice.get_mapped_range();
    let mut out = Vec::with_capacity(row_bytes as usize * viewport.height as usize);
    for row in 0..viewport.height as usize {
        let start = row * padded_row_bytes as usize;
        out.extend_from_slice(&mapped[start..start + row_bytes as usize]);
    }
    drop(mapped);
    readback.unmap();

    Ok(FrameImage {
        width: viewport.width,
        height: viewport.height,
        rgba8: out,
    })
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}
