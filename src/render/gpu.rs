use crate::foundation::error::{FlowError, FlowResult};

/// Optional adapter capabilities the renderer adapts to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GpuCaps {
    /// `AddressMode::ClampToBorder` is usable.
    pub clamp_to_border: bool,
    /// `Rg32Float` may be sampled with a filtering sampler.
    pub float32_filterable: bool,
}

impl GpuCaps {
    pub fn from_features(features: wgpu::Features) -> Self {
        Self {
            clamp_to_border: features.contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER),
            float32_filterable: features.contains(wgpu::Features::FLOAT32_FILTERABLE),
        }
    }

    /// Features to request from the device for these caps.
    pub fn features(&self) -> wgpu::Features {
        let mut f = wgpu::Features::empty();
        if self.clamp_to_border {
            f |= wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER;
        }
        if self.float32_filterable {
            f |= wgpu::Features::FLOAT32_FILTERABLE;
        }
        f
    }

    /// Sampler for the velocity texture: border reads as zero, no wrapping.
    pub fn velocity_sampler_desc(&self) -> wgpu::SamplerDescriptor<'static> {
        let (address, border) = if self.clamp_to_border {
            (
                wgpu::AddressMode::ClampToBorder,
                Some(wgpu::SamplerBorderColor::TransparentBlack),
            )
        } else {
            (wgpu::AddressMode::ClampToEdge, None)
        };
        let filter = if self.float32_filterable {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        };
        wgpu::SamplerDescriptor {
            label: Some("flowvis_velocity_sampler"),
            address_mode_u: address,
            address_mode_v: address,
            address_mode_w: address,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            border_color: border,
            ..Default::default()
        }
    }

    /// Sampler for the noise texture: mirrored tiling, linear.
    pub fn noise_sampler_desc(&self) -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("flowvis_noise_sampler"),
            address_mode_u: wgpu::AddressMode::MirrorRepeat,
            address_mode_v: wgpu::AddressMode::MirrorRepeat,
            address_mode_w: wgpu::AddressMode::MirrorRepeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        }
    }

    pub fn velocity_sample_type(&self) -> wgpu::TextureSampleType {
        wgpu::TextureSampleType::Float {
            filterable: self.float32_filterable,
        }
    }

    pub fn velocity_sampler_binding(&self) -> wgpu::SamplerBindingType {
        if self.float32_filterable {
            wgpu::SamplerBindingType::Filtering
        } else {
            wgpu::SamplerBindingType::NonFiltering
        }
    }
}

/// Device, queue and the adapter they came from.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub caps: GpuCaps,
}

impl GpuContext {
    /// Context without a presentation surface, for offscreen rendering.
    pub fn headless() -> FlowResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        Self::with_instance(instance, None)
    }

    /// Context whose adapter can present to `surface`.
    pub fn for_surface(
        instance: wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> FlowResult<Self> {
        Self::with_instance(instance, Some(surface))
    }

    fn with_instance(
        instance: wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> FlowResult<Self> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: surface,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                FlowError::gpu("no gpu adapter available")
            }
            other => FlowError::gpu(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let caps = GpuCaps::from_features(adapter.features());
        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            backend = ?info.backend,
            clamp_to_border = caps.clamp_to_border,
            float32_filterable = caps.float32_filterable,
            "gpu adapter selected"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("flowvis_device"),
            required_features: caps.features(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| FlowError::gpu(format!("wgpu request_device failed: {e:?}")))?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            caps,
        })
    }

    /// Reject a 2D texture size the device cannot allocate, before wgpu
    /// turns it into an uncaptured validation error.
    pub fn check_texture_size(&self, what: &str, width: u32, height: u32) -> FlowResult<()> {
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(FlowError::gpu(format!(
                "{what} texture {width}x{height} is outside the device limit of 1..={max}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/gpu.rs"]
mod tests;
