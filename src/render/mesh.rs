use crate::foundation::config::FieldLayout;

/// One vertex of the field quad: position, normal, texcoord.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

/// Two triangles over the four corners.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Corner vertices spanning the physical domain in the z=0 plane.
///
/// Texture row 0 (data row `y = 0`) sits at `y_end`.
pub fn quad_vertices(layout: &FieldLayout) -> [QuadVertex; 4] {
    let n = [0.0, 0.0, 1.0];
    let (x0, x1, y0, y1) = (layout.x_start, layout.x_end, layout.y_start, layout.y_end);
    [
        QuadVertex {
            position: [x0, y1, 0.0],
            normal: n,
            texcoord: [0.0, 0.0],
        },
        QuadVertex {
            position: [x1, y1, 0.0],
            normal: n,
            texcoord: [1.0, 0.0],
        },
        QuadVertex {
            position: [x1, y0, 0.0],
            normal: n,
            texcoord: [1.0, 1.0],
        },
        QuadVertex {
            position: [x0, y0, 0.0],
            normal: n,
            texcoord: [0.0, 1.0],
        },
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/render/mesh.rs"]
mod tests;
