use std::path::Path;

use crate::foundation::error::{FlowError, FlowResult};

/// Decoded noise image, straight RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoiseImage {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

pub fn decode_noise(bytes: &[u8]) -> FlowResult<NoiseImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FlowError::asset(format!("decode noise image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(FlowError::asset("noise image has zero size"));
    }
    Ok(NoiseImage {
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}

/// Read and decode the noise texture; a missing file is fatal for rendering.
#[tracing::instrument(fields(path = %path.display()), skip(path))]
pub fn load_noise(path: &Path) -> FlowResult<NoiseImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| FlowError::asset(format!("read noise image '{}': {e}", path.display())))?;
    let img = decode_noise(&bytes)?;
    tracing::debug!(width = img.width, height = img.height, "noise image decoded");
    Ok(img)
}
