use glam::{Mat4, Vec3};

use crate::foundation::config::FieldLayout;

/// Framebuffer size in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Projection and view matrices handed to the renderer each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMatrices {
    pub projection: Mat4,
    pub view: Mat4,
}

/// Fixed camera looking down -Z at the field quad, sized so the whole domain
/// is visible for any aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFit {
    center: Vec3,
    half_width: f32,
    half_height: f32,
    fovy: f32,
}

impl CameraFit {
    pub const DEFAULT_FOVY_DEGREES: f32 = 45.0;

    pub fn for_layout(layout: &FieldLayout) -> Self {
        let c = layout.center();
        Self {
            center: Vec3::new(c.x, c.y, 0.0),
            half_width: layout.radius(),
            half_height: (layout.y_end - layout.y_start) * 0.5,
            fovy: Self::DEFAULT_FOVY_DEGREES.to_radians(),
        }
    }

    /// Eye distance from the quad plane for `viewport`.
    pub fn distance(&self, viewport: Viewport) -> f32 {
        let tan_half = (self.fovy * 0.5).tan();
        let fit_w = self.half_width / (viewport.aspect() * tan_half);
        let fit_h = self.half_height / tan_half;
        fit_w.max(fit_h)
    }

    pub fn matrices(&self, viewport: Viewport) -> CameraMatrices {
        let distance = self.distance(viewport);
        let eye = self.center + Vec3::Z * distance;
        CameraMatrices {
            projection: Mat4::perspective_rh(
                self.fovy,
                viewport.aspect(),
                distance * 0.01,
                distance * 10.0,
            ),
            view: Mat4::look_at_rh(eye, self.center, Vec3::Y),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/camera.rs"]
mod tests;
