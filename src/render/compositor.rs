//! Per-tick frame compositing.
//!
//! [`FrameCompositor`] is the body of the render loop: one call to
//! [`FrameCompositor::composite`] is one complete, non-reentrant tick. It
//! owns the intermediate off-screen surface across ticks so the playback
//! controller never sees it.

use crate::foundation::core::{FrameIndex, Vec2};
use crate::foundation::error::{PinwarpError, PinwarpResult};
use crate::render::surface::Surface;
use crate::tracking::model::TrackingSequence;
use crate::warp::prerender::GeometryTable;

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Raw video only; the frame is inside the configured delay lead-in.
    DelayHold,
    /// Raw video only; no precomputed geometry for this frame index.
    NoGeometry,
    /// Video plus warped overlay.
    Rendered,
    /// Stage-2 compositing hit a geometry edge case; the overlay was dropped
    /// for this tick (logged, not raised).
    OverlaySkipped,
    /// The last valid frame was reached; the caller should cancel the loop.
    Finished,
}

pub struct FrameCompositor {
    scratch: Surface,
    delay: u64,
}

impl FrameCompositor {
    /// `delay` is the number of leading frames during which no overlay is
    /// drawn.
    pub fn new(delay: u64) -> Self {
        Self {
            scratch: Surface::new(0, 0),
            delay,
        }
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    /// Run one tick: draw the video frame as background, then (outside the
    /// delay lead-in, and when geometry exists) the two-stage warped overlay.
    pub fn composite(
        &mut self,
        target: &mut Surface,
        video_frame: &Surface,
        image: &Surface,
        table: &GeometryTable,
        sequence: &TrackingSequence,
        frame: FrameIndex,
    ) -> PinwarpResult<TickOutcome> {
        target.copy_from(video_frame);

        if frame.0 < self.delay {
            return Ok(TickOutcome::DelayHold);
        }

        let outcome = match table.get(frame) {
            None => TickOutcome::NoGeometry,
            Some(geometry) => {
                let corners = sequence.corners(frame).ok_or_else(|| {
                    PinwarpError::render(format!(
                        "corner data missing for prerendered frame {}",
                        frame.0
                    ))
                })?;

                self.scratch
                    .resize(geometry.width.floor().max(0.0) as u32, geometry.height);

                // Compensation for quads whose bottom-left corner sits left of
                // the top-left corner: stage-1 rows would land at negative x
                // and clip, so the drawing origin shifts right. The opposite
                // lean receives no compensation (known one-sided behavior).
                let origin = if corners.bottom_left.x < corners.top_left.x {
                    Vec2::new(corners.top_left.x - corners.bottom_left.x, 0.0)
                } else {
                    Vec2::ZERO
                };

                for pair in &geometry.stage1 {
                    self.scratch.blit_scaled(image, pair.src, pair.dst, origin)?;
                }

                let mut outcome = TickOutcome::Rendered;
                for pair in &geometry.stage2 {
                    if let Err(err) = target.blit_scaled(&self.scratch, pair.src, pair.dst, Vec2::ZERO)
                    {
                        tracing::warn!(frame = frame.0, %err, "overlay dropped for this tick");
                        outcome = TickOutcome::OverlaySkipped;
                        break;
                    }
                }
                outcome
            }
        };

        if frame >= sequence.last_frame() {
            return Ok(TickOutcome::Finished);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
