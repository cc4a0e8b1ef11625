//! Cooperative precomputation of the whole sequence's warp geometry.
//!
//! The prerenderer computes exactly one frame per [`Prerenderer::step`] call,
//! giving the host a yield point between frames. Frames are processed
//! strictly in order; the table only becomes available once the last frame
//! has been computed (partial results are not usable).

use std::sync::Arc;

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{PinwarpError, PinwarpResult};
use crate::tracking::model::TrackingSequence;
use crate::warp::geometry::{FrameGeometry, prerender_frame};

/// Result of a single prerender step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrerenderProgress {
    /// Geometry for this frame was just computed.
    Frame(FrameIndex),
    /// All frames have been computed.
    Complete,
}

pub struct Prerenderer {
    sequence: Arc<TrackingSequence>,
    image_size: Canvas,
    frames: Vec<FrameGeometry>,
}

impl Prerenderer {
    pub fn new(sequence: Arc<TrackingSequence>, image_size: Canvas) -> Self {
        let capacity = sequence.len();
        Self {
            sequence,
            image_size,
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Compute geometry for the next frame. Idempotent once complete.
    #[tracing::instrument(skip(self))]
    pub fn step(&mut self) -> PinwarpResult<PrerenderProgress> {
        let idx = self.frames.len();
        let Some(corners) = self.sequence.corners(FrameIndex(idx as u64)) else {
            return Ok(PrerenderProgress::Complete);
        };

        let geometry = prerender_frame(corners, self.image_size)
            .map_err(|e| PinwarpError::meta(format!("prerendering frame {idx}: {e}")))?;
        self.frames.push(geometry);
        tracing::debug!(frame = idx, "prerendered frame geometry");
        Ok(PrerenderProgress::Frame(FrameIndex(idx as u64)))
    }

    pub fn is_complete(&self) -> bool {
        self.frames.len() == self.sequence.len()
    }

    /// Drive [`step`](Self::step) until every frame is done.
    pub fn run_to_completion(&mut self) -> PinwarpResult<()> {
        while !self.is_complete() {
            self.step()?;
        }
        Ok(())
    }

    /// Consume the prerenderer, yielding the immutable geometry table.
    /// Fails if precomputation has not covered the whole sequence.
    pub fn into_table(self) -> PinwarpResult<GeometryTable> {
        if !self.is_complete() {
            return Err(PinwarpError::render(format!(
                "prerendering incomplete: {} of {} frames computed",
                self.frames.len(),
                self.sequence.len()
            )));
        }
        Ok(GeometryTable {
            frames: self.frames,
        })
    }
}

/// Per-frame geometry table, written once by the prerenderer and read-only
/// thereafter.
#[derive(Clone, Debug)]
pub struct GeometryTable {
    frames: Vec<FrameGeometry>,
}

impl GeometryTable {
    /// Out-of-range frame indices yield `None` ("no geometry available").
    pub fn get(&self, frame: FrameIndex) -> Option<&FrameGeometry> {
        usize::try_from(frame.0)
            .ok()
            .and_then(|idx| self.frames.get(idx))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/warp/prerender.rs"]
mod tests;
