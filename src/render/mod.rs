pub mod camera;
pub mod mesh;

#[cfg(feature = "gpu")]
pub mod gpu;
#[cfg(feature = "gpu")]
pub mod headless;
#[cfg(feature = "gpu")]
pub mod renderer;
