use std::path::{Path, PathBuf};

use glam::Vec2;

use crate::foundation::error::{FlowError, FlowResult};

/// Grid extents and physical domain of a flow dataset.
///
/// The defaults describe the bundled channel-flow dataset: 400×50 cells over
/// `[-0.5, 7.5] × [-0.5, 0.5]`, 1001 time steps over `[15, 23]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FieldLayout {
    /// Number of cells along x (texture width).
    pub x_cells: usize,
    /// Number of cells along y (texture height).
    pub y_cells: usize,
    /// Number of time steps.
    pub t_cells: usize,
    /// Left edge of the spatial domain.
    pub x_start: f32,
    /// Right edge of the spatial domain.
    pub x_end: f32,
    /// Bottom edge of the spatial domain.
    pub y_start: f32,
    /// Top edge of the spatial domain.
    pub y_end: f32,
    /// Physical time of the first step.
    pub t_start: f32,
    /// Physical time at the end of the last step.
    pub t_end: f32,
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            x_cells: 400,
            y_cells: 50,
            t_cells: 1001,
            x_start: -0.5,
            x_end: 7.5,
            y_start: -0.5,
            y_end: 0.5,
            t_start: 15.0,
            t_end: 23.0,
        }
    }
}

impl FieldLayout {
    /// Check extents are non-zero and domains are non-empty.
    pub fn validate(&self) -> FlowResult<()> {
        if self.x_cells == 0 || self.y_cells == 0 || self.t_cells == 0 {
            return Err(FlowError::validation(format!(
                "layout extents must be non-zero (x={}, y={}, t={})",
                self.x_cells, self.y_cells, self.t_cells
            )));
        }
        let finite = [
            self.x_start,
            self.x_end,
            self.y_start,
            self.y_end,
            self.t_start,
            self.t_end,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(FlowError::validation("layout domain bounds must be finite"));
        }
        if self.x_end <= self.x_start || self.y_end <= self.y_start {
            return Err(FlowError::validation(
                "layout spatial domain must have end > start",
            ));
        }
        if self.t_end < self.t_start {
            return Err(FlowError::validation("layout time domain must have end >= start"));
        }
        self.total_floats()?;
        Ok(())
    }

    /// Number of (u, v) pairs in one time slice.
    pub fn cells_per_slice(&self) -> usize {
        self.y_cells * self.x_cells
    }

    /// Total number of f32 values in the dataset (`T*Y*X*2`).
    pub fn total_floats(&self) -> FlowResult<usize> {
        self.t_cells
            .checked_mul(self.y_cells)
            .and_then(|v| v.checked_mul(self.x_cells))
            .and_then(|v| v.checked_mul(2))
            .ok_or_else(|| FlowError::validation("layout size overflows usize"))
    }

    /// Physical width of one cell.
    pub fn x_step(&self) -> f32 {
        (self.x_end - self.x_start) / self.x_cells as f32
    }

    /// Physical height of one cell.
    pub fn y_step(&self) -> f32 {
        (self.y_end - self.y_start) / self.y_cells as f32
    }

    /// Physical duration of one time step.
    pub fn t_step(&self) -> f32 {
        (self.t_end - self.t_start) / self.t_cells as f32
    }

    /// Physical time of step `t`.
    pub fn time_at(&self, t: usize) -> f32 {
        self.t_start + t as f32 * self.t_step()
    }

    /// Center of the spatial domain.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.x_end + self.x_start) * 0.5,
            (self.y_end + self.y_start) * 0.5,
        )
    }

    /// Half the domain width; the framing radius for the camera.
    pub fn radius(&self) -> f32 {
        self.x_end - self.center().x
    }

    /// `(X, Y)` as floats, the shader's `cell_dim`.
    pub fn cell_dim(&self) -> Vec2 {
        Vec2::new(self.x_cells as f32, self.y_cells as f32)
    }
}

/// What to do when the data file is missing or shorter than the layout needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Keep whatever was read, zero-fill the rest, log a warning.
    #[default]
    Lenient,
    /// Fail with `DataMissing` / `DataTruncated`.
    Strict,
}

/// Initial window parameters for the interactive viewer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "flowvis".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Everything the viewer needs besides the data itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Raw little-endian f32 dataset.
    pub data_path: PathBuf,
    /// Noise image sampled by the fragment stage.
    pub noise_path: PathBuf,
    pub layout: FieldLayout,
    pub load_policy: LoadPolicy,
    pub window: WindowSettings,
    /// Background color, straight RGBA8.
    pub clear_rgba: [u8; 4],
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("flow.raw"),
            noise_path: PathBuf::from("assets/noisy-texture.png"),
            layout: FieldLayout::default(),
            load_policy: LoadPolicy::default(),
            window: WindowSettings::default(),
            clear_rgba: [0, 0, 0, 255],
        }
    }
}

impl FlowConfig {
    /// Parse a JSON config; missing keys fall back to the defaults.
    pub fn from_json(text: &str) -> FlowResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| FlowError::config(format!("parse config JSON: {e}")))?;
        cfg.layout.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &Path) -> FlowResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| FlowError::config(format!("read '{}': {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Clear color as normalized floats.
    pub fn clear_color(&self) -> [f64; 4] {
        self.clear_rgba.map(|c| c as f64 / 255.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
