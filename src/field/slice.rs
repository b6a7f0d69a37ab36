use glam::Vec2;

use crate::foundation::error::{FlowError, FlowResult};

/// Read-only view of one time step: `height` rows of `width` (u, v) pairs,
/// row-major.
#[derive(Clone, Copy, Debug)]
pub struct FieldSlice<'a> {
    pairs: &'a [[f32; 2]],
    width: usize,
    height: usize,
}

impl<'a> FieldSlice<'a> {
    pub(crate) fn new(pairs: &'a [[f32; 2]], width: usize, height: usize) -> Self {
        debug_assert_eq!(pairs.len(), width * height);
        Self {
            pairs,
            width,
            height,
        }
    }

    /// Columns (X).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows (Y).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of (u, v) pairs, always `width * height`.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Vector at row `y`, column `x`.
    pub fn get(&self, y: usize, x: usize) -> FlowResult<Vec2> {
        if y >= self.height {
            return Err(FlowError::out_of_range("y", y, self.height));
        }
        if x >= self.width {
            return Err(FlowError::out_of_range("x", x, self.width));
        }
        Ok(Vec2::from_array(self.pairs[y * self.width + x]))
    }

    pub fn pairs(&self) -> &'a [[f32; 2]] {
        self.pairs
    }

    /// Flat `u, v, u, v, ...` view.
    pub fn as_floats(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.pairs)
    }

    /// Raw bytes in texel order, ready for an `Rg32Float` upload.
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.pairs)
    }

    /// Row `y` as a slice of pairs.
    pub fn row(&self, y: usize) -> FlowResult<&'a [[f32; 2]]> {
        if y >= self.height {
            return Err(FlowError::out_of_range("y", y, self.height));
        }
        let start = y * self.width;
        Ok(&self.pairs[start..start + self.width])
    }
}
