use crate::foundation::error::{FlowError, FlowResult};

/// Time cursor plus the step currently resident in the velocity texture.
///
/// `uploaded_index` lags `time_index` only between [`ActiveFrame::advance_time`]
/// and the next [`ActiveFrame::sync`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveFrame {
    time_index: usize,
    uploaded_index: Option<usize>,
    time_steps: usize,
}

impl ActiveFrame {
    /// Start at step 0 with nothing uploaded.
    pub fn new(time_steps: usize) -> FlowResult<Self> {
        if time_steps == 0 {
            return Err(FlowError::validation("time step count must be non-zero"));
        }
        Ok(Self {
            time_index: 0,
            uploaded_index: None,
            time_steps,
        })
    }

    pub fn time_index(&self) -> usize {
        self.time_index
    }

    pub fn uploaded_index(&self) -> Option<usize> {
        self.uploaded_index
    }

    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// True when the GPU copy does not match `time_index`.
    pub fn is_stale(&self) -> bool {
        self.uploaded_index != Some(self.time_index)
    }

    /// Step forward one frame, wrapping to 0 after the last.
    pub fn advance_time(&mut self) {
        self.time_index = (self.time_index + 1) % self.time_steps;
    }

    /// Jump to `t`.
    pub fn seek(&mut self, t: usize) -> FlowResult<()> {
        if t >= self.time_steps {
            return Err(FlowError::out_of_range("t", t, self.time_steps));
        }
        self.time_index = t;
        Ok(())
    }

    /// Run `upload(time_index)` if stale and record the result.
    ///
    /// Returns whether an upload happened. A failed upload leaves the frame
    /// stale so the next call retries.
    pub fn sync<F>(&mut self, upload: F) -> FlowResult<bool>
    where
        F: FnOnce(usize) -> FlowResult<()>,
    {
        if !self.is_stale() {
            return Ok(false);
        }
        upload(self.time_index)?;
        self.uploaded_index = Some(self.time_index);
        Ok(true)
    }

    /// Forget the resident step, e.g. after the texture was recreated.
    pub fn invalidate(&mut self) {
        self.uploaded_index = None;
    }
}

#[cfg(test)]
#[path = "../tests/unit/playback.rs"]
mod tests;
