use super::*;

#[test]
fn caps_round_trip_through_features() {
    let all = wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER | wgpu::Features::FLOAT32_FILTERABLE;
    let caps = GpuCaps::from_features(all | wgpu::Features::DEPTH_CLIP_CONTROL);
    assert!(caps.clamp_to_border && caps.float32_filterable);
    assert_eq!(caps.features(), all);
    assert_eq!(GpuCaps::default().features(), wgpu::Features::empty());
}

#[test]
fn velocity_sampler_prefers_border_and_linear() {
    let caps = GpuCaps {
        clamp_to_border: true,
        float32_filterable: true,
    };
    let d = caps.velocity_sampler_desc();
    assert_eq!(d.address_mode_u, wgpu::AddressMode::ClampToBorder);
    assert_eq!(d.address_mode_v, wgpu::AddressMode::ClampToBorder);
    assert_eq!(d.border_color, Some(wgpu::SamplerBorderColor::TransparentBlack));
    assert_eq!(d.mag_filter, wgpu::FilterMode::Linear);
    assert_eq!(
        caps.velocity_sampler_binding(),
        wgpu::SamplerBindingType::Filtering
    );
}

#[test]
fn velocity_sampler_falls_back_without_features() {
    let caps = GpuCaps::default();
    let d = caps.velocity_sampler_desc();
    assert_eq!(d.address_mode_u, wgpu::AddressMode::ClampToEdge);
    assert_eq!(d.border_color, None);
    assert_eq!(d.min_filter, wgpu::FilterMode::Nearest);
    assert_eq!(
        caps.velocity_sample_type(),
        wgpu::TextureSampleType::Float { filterable: false }
    );
    assert_eq!(
        caps.velocity_sampler_binding(),
        wgpu::SamplerBindingType::NonFiltering
    );
}

#[test]
fn noise_sampler_mirrors() {
    let d = GpuCaps::default().noise_sampler_desc();
    assert_eq!(d.address_mode_u, wgpu::AddressMode::MirrorRepeat);
    assert_eq!(d.address_mode_v, wgpu::AddressMode::MirrorRepeat);
    assert_eq!(d.mag_filter, wgpu::FilterMode::Linear);
}
