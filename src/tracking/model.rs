use crate::foundation::core::{Fps, FrameIndex, Point};
use crate::foundation::error::{PinwarpError, PinwarpResult};

/// One tracked quad for one video frame.
///
/// The corner ordering contract (top-left, top-right, bottom-left,
/// bottom-right) comes from the pin file's block order and is enforced at the
/// data-loading boundary via [`FrameCorners::validate`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameCorners {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl FrameCorners {
    pub fn new(top_left: Point, top_right: Point, bottom_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// Reject quads the warp cannot express: the top and bottom edge widths
    /// are divisors in the geometry precomputation, so both must be positive.
    pub fn validate(&self) -> PinwarpResult<()> {
        if self.top_right.x <= self.top_left.x {
            return Err(PinwarpError::meta(
                "corner ordering violated: top-right x must be greater than top-left x",
            ));
        }
        if self.bottom_right.x <= self.bottom_left.x {
            return Err(PinwarpError::meta(
                "corner ordering violated: bottom-right x must be greater than bottom-left x",
            ));
        }
        Ok(())
    }
}

/// Header metadata shared by pin and tracking exports.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackMeta {
    pub fps: Fps,
    pub width: u32,
    pub height: u32,
    pub source_pixel_aspect: f64,
    pub comp_pixel_aspect: f64,
}

/// The full per-frame corner track: one [`FrameCorners`] per video frame,
/// indexed directly by frame number. Length is fixed at load time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TrackingSequence {
    pub meta: TrackMeta,
    frames: Vec<FrameCorners>,
}

impl TrackingSequence {
    /// Builds a sequence, validating every frame's corner ordering up front.
    pub fn new(meta: TrackMeta, frames: Vec<FrameCorners>) -> PinwarpResult<Self> {
        if frames.is_empty() {
            return Err(PinwarpError::meta("tracking sequence must be non-empty"));
        }
        for (idx, corners) in frames.iter().enumerate() {
            corners.validate().map_err(|e| {
                PinwarpError::meta(format!("frame {idx}: {e}"))
            })?;
        }
        Ok(Self { meta, frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Out-of-range indices yield `None`, never undefined geometry.
    pub fn corners(&self, frame: FrameIndex) -> Option<&FrameCorners> {
        usize::try_from(frame.0)
            .ok()
            .and_then(|idx| self.frames.get(idx))
    }

    pub fn last_frame(&self) -> FrameIndex {
        FrameIndex(self.frames.len() as u64 - 1)
    }

    pub fn frames(&self) -> &[FrameCorners] {
        &self.frames
    }
}

/// Anchor/position/scale/rotation channels from the tracking export.
///
/// Retained for completeness; the warp pipeline consumes only the header
/// metadata of this file, not the motion channels.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionChannels {
    pub anchor: Vec<[f64; 3]>,
    pub position: Vec<[f64; 3]>,
    pub scale: Vec<[f64; 3]>,
    pub rotation: Vec<f64>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TrackingData {
    pub meta: TrackMeta,
    pub channels: MotionChannels,
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/model.rs"]
mod tests;
