use std::{
    fs::File,
    io::{ErrorKind, Read},
    path::Path,
};

use glam::Vec2;
use tracing::{info, warn};

use crate::{
    field::slice::FieldSlice,
    foundation::{
        config::{FieldLayout, LoadPolicy},
        error::{FlowError, FlowResult},
    },
};

/// How complete the on-disk data was.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// Every expected value was read.
    Complete,
    /// The file ended early; the tail is zero.
    Truncated,
    /// No file; the whole field is zero.
    Missing,
    /// Built from memory rather than a file.
    InMemory,
}

/// Outcome of reading the data file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadReport {
    pub expected_floats: usize,
    pub read_floats: usize,
    pub status: LoadStatus,
}

/// A time-varying 2D vector field, immutable after load.
///
/// Samples are stored as `(u, v)` pairs in `(t, y, x)` order, so the pair at
/// `(t, y, x)` lives at float offset `2 * (t*Y*X + y*X + x)`, the same layout
/// as the raw file.
#[derive(Clone, Debug)]
pub struct FlowField {
    layout: FieldLayout,
    samples: Vec<[f32; 2]>,
    report: LoadReport,
}

impl FlowField {
    /// Read a raw little-endian f32 file laid out per `layout`.
    ///
    /// Extra bytes past `T*Y*X*2` floats are ignored. A missing or short file
    /// is zero-filled under [`LoadPolicy::Lenient`] and rejected under
    /// [`LoadPolicy::Strict`].
    #[tracing::instrument(skip(path, layout), fields(path = %path.display()))]
    pub fn load(path: &Path, layout: FieldLayout, policy: LoadPolicy) -> FlowResult<Self> {
        layout.validate()?;
        let expected = layout.total_floats()?;
        if expected.checked_mul(4).is_none() {
            return Err(FlowError::validation("dataset byte size overflows usize"));
        }

        let mut samples = vec![[0.0f32; 2]; expected / 2];
        let read_bytes = match File::open(path) {
            Ok(mut f) => Some(read_full(&mut f, bytemuck::cast_slice_mut(&mut samples))?),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let Some(read_bytes) = read_bytes else {
            if policy == LoadPolicy::Strict {
                return Err(FlowError::DataMissing {
                    path: path.display().to_string(),
                });
            }
            warn!(expected, "data file not found, using an all-zero field");
            return Ok(Self {
                layout,
                samples,
                report: LoadReport {
                    expected_floats: expected,
                    read_floats: 0,
                    status: LoadStatus::Missing,
                },
            });
        };

        let read = read_bytes / 4;
        if read < expected && policy == LoadPolicy::Strict {
            return Err(FlowError::DataTruncated {
                expected,
                actual: read,
            });
        }

        // a trailing partial float is not data
        let raw: &mut [u8] = bytemuck::cast_slice_mut(&mut samples);
        raw[read * 4..read_bytes].fill(0);
        let flat: &mut [f32] = bytemuck::cast_slice_mut(&mut samples);
        for v in &mut flat[..read] {
            *v = f32::from_bits(u32::from_le(v.to_bits()));
        }

        let status = if read < expected {
            warn!(expected, read, "data file truncated, zero-filling the tail");
            LoadStatus::Truncated
        } else {
            info!(floats = expected, "loaded flow data");
            LoadStatus::Complete
        };

        Ok(Self {
            layout,
            samples,
            report: LoadReport {
                expected_floats: expected,
                read_floats: read,
                status,
            },
        })
    }

    /// Build a field from flat `u, v, ...` values already in memory.
    pub fn from_values(layout: FieldLayout, values: Vec<f32>) -> FlowResult<Self> {
        layout.validate()?;
        let expected = layout.total_floats()?;
        if values.len() != expected {
            return Err(FlowError::validation(format!(
                "expected {expected} floats for layout, got {}",
                values.len()
            )));
        }
        let samples = values
            .chunks_exact(2)
            .map(|uv| [uv[0], uv[1]])
            .collect::<Vec<_>>();
        Ok(Self {
            layout,
            samples,
            report: LoadReport {
                expected_floats: expected,
                read_floats: expected,
                status: LoadStatus::InMemory,
            },
        })
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    /// Number of time steps (T).
    pub fn time_steps(&self) -> usize {
        self.layout.t_cells
    }

    /// All samples as flat floats, file order.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.samples)
    }

    /// The Y×X slice for time step `t`.
    pub fn slice(&self, t: usize) -> FlowResult<FieldSlice<'_>> {
        if t >= self.layout.t_cells {
            return Err(FlowError::out_of_range("t", t, self.layout.t_cells));
        }
        let n = self.layout.cells_per_slice();
        let start = t * n;
        Ok(FieldSlice::new(
            &self.samples[start..start + n],
            self.layout.x_cells,
            self.layout.y_cells,
        ))
    }

    /// The (u, v) vector at time `t`, row `y`, column `x`.
    pub fn vector_at(&self, t: usize, y: usize, x: usize) -> FlowResult<Vec2> {
        self.slice(t)?.get(y, x)
    }
}

/// Fill `buf` from `reader` until it is full or the reader hits EOF, returning
/// the number of bytes written.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
#[path = "../../tests/unit/field/store.rs"]
mod tests;
