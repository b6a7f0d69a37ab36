//! flowvis renders a precomputed 2D time-varying vector field as a
//! line-integral-convolution style picture.
//!
//! # Overview
//!
//! 1. **Load**: a raw little-endian f32 file becomes a [`FlowField`], laid out
//!    as `(t, y, x, component)` per [`FieldLayout`].
//! 2. **Select**: an [`ActiveFrame`] tracks the current time step and which
//!    step the GPU holds.
//! 3. **Draw**: [`FrameRenderer`] uploads the velocity slice only when the
//!    step changed, then draws the field quad with the flow shader.
//!
//! The `gpu` feature (on by default) adds the renderer, the winit viewer and
//! offscreen PNG export. Without it the crate is a pure field store.
#![forbid(unsafe_code)]

mod assets;
mod field;
mod foundation;
mod playback;
mod render;

#[cfg(feature = "gpu")]
mod app;

pub use assets::{NoiseImage, decode_noise, load_noise};
pub use field::slice::FieldSlice;
pub use field::store::{FlowField, LoadReport, LoadStatus};
pub use foundation::config::{FieldLayout, FlowConfig, LoadPolicy, WindowSettings};
pub use foundation::error::{FlowError, FlowResult};
pub use playback::ActiveFrame;
pub use render::camera::{CameraFit, CameraMatrices, Viewport};
pub use render::mesh::{QUAD_INDICES, QuadVertex, quad_vertices};

#[cfg(feature = "gpu")]
pub use app::{FlowApp, ViewerCommand, command_for_key, run};
#[cfg(feature = "gpu")]
pub use render::gpu::{GpuCaps, GpuContext};
#[cfg(feature = "gpu")]
pub use render::headless::{
    FrameImage, OFFSCREEN_FORMAT, read_rgba8, render_frame, render_frame_with_noise,
};
#[cfg(feature = "gpu")]
pub use render::renderer::{DEPTH_FORMAT, FrameRenderer};
