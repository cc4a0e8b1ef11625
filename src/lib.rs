//! Pinwarp overlays a perspective-warped image onto a quadrilateral region of
//! a playing video, driven by per-frame corner-tracking data exported from a
//! compositing tool.
//!
//! # Pipeline overview
//!
//! 1. **Parse**: pin/tracking text exports -> [`TrackingSequence`] (per-frame
//!    corner quads plus frame-rate metadata)
//! 2. **Prerender**: [`Prerenderer`] converts every frame's quad into
//!    two-stage scanline warp geometry ahead of playback, one frame per
//!    cooperative step
//! 3. **Play**: [`Player`] runs a fixed-rate render loop synchronized to the
//!    playback clock; each tick composites the current video frame and the
//!    warped overlay onto the visible [`Surface`]
//!
//! The warp itself is a two-pass affine-scanline approximation of a
//! projective transform (rows first, then columns), not true perspective
//! texture mapping; see [`prerender_frame`]. Rendering is CPU-only over
//! premultiplied RGBA8 surfaces.
#![forbid(unsafe_code)]

mod foundation;
mod media;
mod player;
mod render;
mod tracking;
mod warp;

pub use foundation::core::{Canvas, Fps, FrameIndex, Point, Vec2};
pub use foundation::error::{PinwarpError, PinwarpResult};
pub use media::image::{decode_image, load_image};
pub use media::video::{FfmpegVideoSource, VideoSource, VideoSourceInfo};
pub use player::controller::{
    ActivateConfig, ImageSource, MetaSources, PLAY_RETRY_INTERVAL, Player, PlayerEvent,
    PollOutcome,
};
pub use player::timer::{IntervalTimer, PlaybackClock};
pub use render::compositor::{FrameCompositor, TickOutcome};
pub use render::surface::Surface;
pub use tracking::model::{
    FrameCorners, MotionChannels, TrackMeta, TrackingData, TrackingSequence,
};
pub use tracking::parse::{parse_meta, parse_pin, parse_tracking};
pub use warp::geometry::{FrameGeometry, ScanlinePair, SliceRect, prerender_frame};
pub use warp::prerender::{GeometryTable, Prerenderer, PrerenderProgress};
